//! In-memory port register backend with access accounting.
//!
//! `SimulatedPorts` models the output latch, externally driven input levels
//! and per-pin electrical configuration of every port in a layout. Pins
//! configured as outputs read back their latch on the input register, as on
//! real hardware; all other pins read the externally driven level.
//!
//! Every mutating access is counted so tests can assert that an operation
//! did (or did not) touch the hardware.

use crate::gpio::{ElectricalMode, PortId, PortLevel, Speed};
use crate::layout::PortLayout;
use crate::registers::PortRegisters;
use log::trace;

/// Counters of mutating register accesses.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct AccessStats {
    /// Writes to an output register (word, set-bits or clear-bits).
    pub output_writes: usize,
    /// Pin configuration writes.
    pub configure_calls: usize,
    /// Clock enable requests.
    pub clock_enables: usize,
}

impl AccessStats {
    /// Total number of hardware writes (output + configuration).
    pub fn hardware_writes(&self) -> usize {
        self.output_writes + self.configure_calls
    }
}

#[derive(Debug, Clone, Default)]
struct SimPort {
    clock_enabled: bool,
    output: PortLevel,
    external: PortLevel,
    modes: [Option<ElectricalMode>; 16],
    speeds: [Option<Speed>; 16],
}

impl SimPort {
    fn output_pins(&self) -> PortLevel {
        self.modes
            .iter()
            .enumerate()
            .filter(|(_, mode)| mode.is_some_and(ElectricalMode::is_output))
            .fold(0, |acc, (bit, _)| acc | (1 << bit))
    }
}

/// Simulated register blocks for every port of a [`PortLayout`].
#[derive(Debug, Clone)]
pub struct SimulatedPorts {
    layout: PortLayout,
    ports: Vec<SimPort>,
    stats: AccessStats,
}

impl Default for SimulatedPorts {
    fn default() -> Self {
        Self::new(PortLayout::default())
    }
}

impl SimulatedPorts {
    /// Creates register blocks in their reset state (all zero, unconfigured).
    pub fn new(layout: PortLayout) -> Self {
        Self {
            layout,
            ports: vec![SimPort::default(); usize::from(layout.port_count())],
            stats: AccessStats::default(),
        }
    }

    pub fn layout(&self) -> PortLayout {
        self.layout
    }

    /// Returns the access counters accumulated so far.
    pub fn stats(&self) -> AccessStats {
        self.stats
    }

    /// Clears the access counters.
    pub fn reset_stats(&mut self) {
        self.stats = AccessStats::default();
    }

    /// Sets the externally driven level of the pins in `mask`.
    pub fn drive_input(&mut self, port: PortId, mask: PortLevel, levels: PortLevel) {
        let port_mask = self.layout.port_mask();
        if let Some(p) = self.port_mut(port) {
            p.external = (p.external & !mask) | (levels & mask & port_mask);
        }
    }

    /// Loads an output latch value without counting it as an access.
    pub fn preset_output(&mut self, port: PortId, value: PortLevel) {
        let port_mask = self.layout.port_mask();
        if let Some(p) = self.port_mut(port) {
            p.output = value & port_mask;
        }
    }

    /// Current output latch of `port` (0 for unknown ports).
    pub fn output(&self, port: PortId) -> PortLevel {
        self.port(port).map_or(0, |p| p.output)
    }

    /// Electrical configuration last applied to a pin.
    pub fn pin_mode(&self, port: PortId, bit: u8) -> Option<ElectricalMode> {
        self.port(port)
            .and_then(|p| p.modes.get(usize::from(bit)).copied().flatten())
    }

    /// Speed class last applied to a pin.
    pub fn pin_speed(&self, port: PortId, bit: u8) -> Option<Speed> {
        self.port(port)
            .and_then(|p| p.speeds.get(usize::from(bit)).copied().flatten())
    }

    pub fn is_clock_enabled(&self, port: PortId) -> bool {
        self.port(port).is_some_and(|p| p.clock_enabled)
    }

    fn port(&self, port: PortId) -> Option<&SimPort> {
        self.ports.get(usize::from(port.index()))
    }

    fn port_mut(&mut self, port: PortId) -> Option<&mut SimPort> {
        self.ports.get_mut(usize::from(port.index()))
    }
}

impl PortRegisters for SimulatedPorts {
    fn enable_clock(&mut self, port: PortId) {
        self.stats.clock_enables += 1;
        if let Some(p) = self.port_mut(port) {
            p.clock_enabled = true;
        }
    }

    fn read_input(&self, port: PortId) -> PortLevel {
        self.port(port).map_or(0, |p| {
            let driven = p.output_pins();
            (p.output & driven) | (p.external & !driven)
        })
    }

    fn read_output(&self, port: PortId) -> PortLevel {
        self.output(port)
    }

    fn write_output(&mut self, port: PortId, value: PortLevel) {
        self.stats.output_writes += 1;
        let port_mask = self.layout.port_mask();
        trace!("sim: {} ODR <- 0x{:04X}", port, value & port_mask);
        if let Some(p) = self.port_mut(port) {
            p.output = value & port_mask;
        }
    }

    fn set_bits(&mut self, port: PortId, mask: PortLevel) {
        self.stats.output_writes += 1;
        let port_mask = self.layout.port_mask();
        trace!("sim: {} BSRR <- 0x{:04X}", port, mask);
        if let Some(p) = self.port_mut(port) {
            p.output |= mask & port_mask;
        }
    }

    fn clear_bits(&mut self, port: PortId, mask: PortLevel) {
        self.stats.output_writes += 1;
        trace!("sim: {} BRR <- 0x{:04X}", port, mask);
        if let Some(p) = self.port_mut(port) {
            p.output &= !mask;
        }
    }

    fn configure_pins(&mut self, port: PortId, mask: PortLevel, mode: ElectricalMode, speed: Speed) {
        self.stats.configure_calls += 1;
        trace!(
            "sim: {} configure mask=0x{:04X} mode={:?} speed={:?}",
            port,
            mask,
            mode,
            speed
        );
        let bits = usize::from(self.layout.bits_per_port());
        if let Some(p) = self.port_mut(port) {
            for bit in (0..bits).filter(|b| mask & (1 << b) != 0) {
                p.modes[bit] = Some(mode);
                p.speeds[bit] = Some(speed);
            }
        }
    }
}
