//! Register access contract consumed by the DIO and Port layers.

use crate::gpio::{ElectricalMode, PortId, PortLevel, Speed};

/// Raw access to the port register blocks and their clock gates.
///
/// Implementations map a [`PortId`] to the hardware block and perform the
/// access directly; the driver only ever passes ports that exist in its
/// [`PortLayout`](crate::PortLayout). Accesses are assumed to always succeed.
///
/// Concurrent access (interrupt handlers, other cores) must be serialised by
/// the caller around read-modify-write sequences.
pub trait PortRegisters {
    /// Enables the clock domain of `port`. Irrevocable.
    fn enable_clock(&mut self, port: PortId);

    /// Reads the input-state word of `port`.
    fn read_input(&self, port: PortId) -> PortLevel;

    /// Reads the output-state (latch) word of `port`.
    fn read_output(&self, port: PortId) -> PortLevel;

    /// Replaces the output-state word of `port`.
    fn write_output(&mut self, port: PortId, value: PortLevel);

    /// Drives the pins in `mask` high.
    fn set_bits(&mut self, port: PortId, mask: PortLevel);

    /// Drives the pins in `mask` low.
    fn clear_bits(&mut self, port: PortId, mask: PortLevel);

    /// Applies an electrical configuration to the pins in `mask`.
    fn configure_pins(&mut self, port: PortId, mask: PortLevel, mode: ElectricalMode, speed: Speed);
}

impl<T: PortRegisters + ?Sized> PortRegisters for &mut T {
    fn enable_clock(&mut self, port: PortId) {
        (**self).enable_clock(port)
    }
    fn read_input(&self, port: PortId) -> PortLevel {
        (**self).read_input(port)
    }
    fn read_output(&self, port: PortId) -> PortLevel {
        (**self).read_output(port)
    }
    fn write_output(&mut self, port: PortId, value: PortLevel) {
        (**self).write_output(port, value)
    }
    fn set_bits(&mut self, port: PortId, mask: PortLevel) {
        (**self).set_bits(port, mask)
    }
    fn clear_bits(&mut self, port: PortId, mask: PortLevel) {
        (**self).clear_bits(port, mask)
    }
    fn configure_pins(&mut self, port: PortId, mask: PortLevel, mode: ElectricalMode, speed: Speed) {
        (**self).configure_pins(port, mask, mode, speed)
    }
}
