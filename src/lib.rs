//! # dio-port
//!
//! A channel-oriented digital I/O layer and pin configuration driver for
//! microcontrollers whose GPIO is organised as port register blocks
//! (by default four 16-bit ports, GPIOA-GPIOD, as on the STM32F1).
//!
//! The crate is hardware-agnostic: all register traffic goes through the
//! [`PortRegisters`] trait, so the same driver runs on a memory-mapped
//! backend on target and on [`SimulatedPorts`] in host tests.
//!
//! ## Features
//!
//! *   Flat channel addressing (`ChannelId`) resolved to (port, bit) by a
//!     configurable [`PortLayout`].
//! *   DIO services on [`DioController`]:
//!     *   Single channel (`read_channel`, `write_channel`, `write_channel_raw`, `flip_channel`).
//!     *   Whole port (`read_port`, `read_port_input`, `write_port`, `masked_write_port`).
//!     *   Channel groups (`read_channel_group`, `write_channel_group`).
//! *   Port configuration:
//!     *   Declarative per-pin records ([`PinConfig`]) deployed with `deploy_pin`.
//!     *   [`PortConfigurator`] state machine: `init_all`, `set_pin_direction`,
//!         `set_pin_mode`, `refresh_port_direction`.
//! *   Selectable error handling ([`ErrorMode`]): strict typed errors, or the
//!     silent no-op behaviour of the reference driver with development error
//!     reports for invalid port reads.
//!
//! ## Basic Usage
//!
//! ```
//! use dio_port::{
//!     ChannelGroup, ChannelId, DioController, Level, PinConfig, PortConfigurator, PortId,
//!     Result, SimulatedPorts,
//! };
//!
//! static PINS: [PinConfig; 2] = [
//!     // PC13, push-pull output, default HIGH
//!     PinConfig::new(PortId::C, 45).output(Level::High),
//!     // PB8, pull-up input, direction may change at runtime
//!     PinConfig::new(PortId::B, 24).direction_changeable(true),
//! ];
//!
//! fn main() -> Result<()> {
//!     // Optional: Initialize logging
//!     // env_logger::init();
//!
//!     let mut dio = DioController::new(SimulatedPorts::default());
//!     let mut port = PortConfigurator::new();
//!     port.init_all(&mut dio, Some(&PINS[..]))?;
//!
//!     let led = ChannelId(45);
//!     assert_eq!(dio.read_channel(led)?, Level::High);
//!     dio.flip_channel(led)?;
//!     assert_eq!(dio.read_channel(led)?, Level::Low);
//!
//!     let nibble = ChannelGroup::new(PortId::A, 0x0F00)?;
//!     dio.write_channel_group(&nibble, 0x0A)?;
//!     assert_eq!(dio.read_channel_group(&nibble)?, 0x0A);
//!     Ok(())
//! }
//! ```
//!
//! ## Error Handling
//!
//! Every service returns [`Result`]. With [`ErrorMode::Compatibility`] (the
//! default) invalid identifiers and illegal state transitions are absorbed:
//! the call returns `Ok` with a default value (`Level::Low`, `0`, `()`),
//! and only `read_port` with an invalid port reaches the [`ErrorReporter`].
//! With [`ErrorMode::Strict`] the same conditions are returned as [`Error`].
//!
//! ## Concurrency
//!
//! The driver is single-threaded and non-reentrant. `flip_channel`,
//! `write_channel_group` and `masked_write_port` are read-modify-write
//! sequences; if an interrupt handler touches the same port, wrap the call
//! in a critical section.
//!
//! ## Pin Mapping
//!
//! *   Channels 0-15 map to GPIOA pins 0-15.
//! *   Channels 16-31 map to GPIOB pins 0-15.
//! *   Channels 32-47 map to GPIOC pins 0-15.
//! *   Channels 48-63 map to GPIOD pins 0-15.
//!
//! ## License
//!
//! This project is licensed under the WTFPL.

// Make internal modules private, re-export public types
mod consts;
mod device;
mod dio;
mod error;
pub mod gpio; // Keep gpio public for its enums/structs
pub mod layout;
pub mod port;
pub mod registers;
pub mod sim;

pub use device::{
    DetReport, DioConfig, DioController, ErrorMode, ErrorReporter, LogReporter,
    RecordingReporter, VersionInfo,
};
pub use error::{Error, ErrorKind, Result};
pub use gpio::{
    ChannelGroup, ChannelId, Direction, ElectricalMode, Level, PinMode, PortId, PortLevel, Pull,
    Speed,
};
pub use layout::{PortLayout, ResolvedChannel};
pub use port::{ConfigState, PinConfig, PinOverride, PortConfigurator};
pub use registers::PortRegisters;
pub use sim::{AccessStats, SimulatedPorts};

/// Development error codes reported through [`ErrorReporter`].
pub mod det {
    pub use crate::consts::det::*;
    pub use crate::consts::{INSTANCE_ID, MODULE_ID};
}
