//! Channel, port and channel group I/O services.

use crate::consts::det;
use crate::device::{DioController, ErrorReporter};
use crate::error::Result;
use crate::gpio::{ChannelGroup, ChannelId, Level, PortId, PortLevel};
use crate::layout::ResolvedChannel;
use crate::registers::PortRegisters;
use log::{debug, trace};

impl<R: PortRegisters, E: ErrorReporter> DioController<R, E> {
    #[inline]
    fn resolve_channel(&self, channel: ChannelId) -> Result<ResolvedChannel> {
        self.config.layout.try_resolve(channel)
    }

    #[inline]
    fn check_group(&self, group: &ChannelGroup) -> Result<()> {
        self.config.layout.check_port(group.port())?;
        group.validate(self.config.layout.port_mask())
    }

    // --- Single Channel ---
    /// Reads the level of a channel from its port's input-state register.
    ///
    /// The pin is expected to be configured as input; for an output pin the
    /// pad's driven state is returned.
    pub fn read_channel(&self, channel: ChannelId) -> Result<Level> {
        let result = self.resolve_channel(channel).map(|rc| {
            let reg_val = self.regs.read_input(rc.port);
            trace!(
                "Read {} IDR {}: mask=0x{:04X}, value=0x{:04X}",
                channel,
                rc.port,
                rc.mask(),
                reg_val
            );
            Level::from_bit(reg_val & rc.mask() != 0)
        });
        self.absorb(result, Level::Low)
    }

    /// Drives a channel high or low through the set/clear primitives.
    pub fn write_channel(&mut self, channel: ChannelId, level: Level) -> Result<()> {
        let rc = match self.resolve_channel(channel) {
            Ok(rc) => rc,
            Err(e) => return self.absorb(Err(e), ()),
        };
        let mask = rc.mask();
        match level {
            Level::High => {
                trace!("Setting {} HIGH ({} mask=0x{:04X})", channel, rc.port, mask);
                self.regs.set_bits(rc.port, mask);
            }
            Level::Low => {
                trace!("Setting {} LOW ({} mask=0x{:04X})", channel, rc.port, mask);
                self.regs.clear_bits(rc.port, mask);
            }
        }
        Ok(())
    }

    /// Writes a raw level constant (`0` = LOW, `1` = HIGH).
    ///
    /// Any other value is ignored ([`Error::InvalidLevel`](crate::Error::InvalidLevel)
    /// in strict mode).
    pub fn write_channel_raw(&mut self, channel: ChannelId, raw: u8) -> Result<()> {
        match Level::try_from(raw) {
            Ok(level) => self.write_channel(channel, level),
            Err(e) => self.absorb(Err(e), ()),
        }
    }

    /// Inverts the level of a channel and returns the new level.
    ///
    /// This is a read followed by a write, not an atomic toggle.
    pub fn flip_channel(&mut self, channel: ChannelId) -> Result<Level> {
        if let Err(e) = self.resolve_channel(channel) {
            return self.absorb(Err(e), Level::Low);
        }
        let current = self.read_channel(channel)?;
        let new_level = !current;
        self.write_channel(channel, new_level)?;
        trace!("Flipped {}: {:?} -> {:?}", channel, current, new_level);
        Ok(new_level)
    }

    // --- Whole Port ---
    /// Reads the output-state word of a port.
    ///
    /// An invalid port is reported to the [`ErrorReporter`] when development
    /// error detection is enabled.
    pub fn read_port(&mut self, port: PortId) -> Result<PortLevel> {
        if let Err(e) = self.config.layout.check_port(port) {
            self.report_dev_error(det::API_READ_PORT, &e);
            return self.absorb(Err(e), 0);
        }
        let value = self.regs.read_output(port) & self.config.layout.port_mask();
        trace!("Read {} ODR: value=0x{:04X}", port, value);
        Ok(value)
    }

    /// Reads the input-state word of a port.
    pub fn read_port_input(&self, port: PortId) -> Result<PortLevel> {
        let result = self.config.layout.check_port(port).map(|()| {
            let value = self.regs.read_input(port) & self.config.layout.port_mask();
            trace!("Read {} IDR: value=0x{:04X}", port, value);
            value
        });
        self.absorb(result, 0)
    }

    /// Writes all pins of a port. Pins configured as input are unaffected.
    pub fn write_port(&mut self, port: PortId, level: PortLevel) -> Result<()> {
        if let Err(e) = self.config.layout.check_port(port) {
            return self.absorb(Err(e), ());
        }
        let value = level & self.config.layout.port_mask();
        trace!("Writing {} ODR: value=0x{:04X}", port, value);
        self.regs.write_output(port, value);
        Ok(())
    }

    /// Writes the bits of `level` selected by `mask`; all other bits keep their value.
    pub fn masked_write_port(
        &mut self,
        port: PortId,
        level: PortLevel,
        mask: PortLevel,
    ) -> Result<()> {
        if let Err(e) = self.config.layout.check_port(port) {
            return self.absorb(Err(e), ());
        }
        let mask = mask & self.config.layout.port_mask();
        if mask == 0 {
            return Ok(());
        }
        let current_val = self.regs.read_output(port);
        let new_val = (current_val & !mask) | (level & mask);
        if new_val != current_val {
            debug!(
                "Masked write {}: mask=0x{:04X}, 0x{:04X} -> 0x{:04X}",
                port, mask, current_val, new_val
            );
            self.regs.write_output(port, new_val);
        } else {
            trace!("{} already 0x{:04X} under mask 0x{:04X}", port, current_val, mask);
        }
        Ok(())
    }

    // --- Channel Groups ---
    /// Reads a channel group, shifted down so the group's lowest bit is bit 0.
    pub fn read_channel_group(&self, group: &ChannelGroup) -> Result<PortLevel> {
        let result = self.check_group(group).map(|()| {
            let port_val = self.regs.read_output(group.port());
            let value = (port_val & group.mask()) >> group.offset();
            trace!(
                "Read group {} mask=0x{:04X}: port=0x{:04X}, value=0x{:04X}",
                group.port(),
                group.mask(),
                port_val,
                value
            );
            value
        });
        self.absorb(result, 0)
    }

    /// Writes a channel group. `level` is given relative to the group's lowest bit;
    /// only bits inside the group's mask change.
    pub fn write_channel_group(&mut self, group: &ChannelGroup, level: PortLevel) -> Result<()> {
        if let Err(e) = self.check_group(group) {
            return self.absorb(Err(e), ());
        }
        let port = group.port();
        let mask = group.mask();
        let current_val = self.regs.read_output(port);
        let new_val = (current_val & !mask) | ((level << group.offset()) & mask);
        if new_val != current_val {
            debug!(
                "Writing group {} mask=0x{:04X}: 0x{:04X} -> 0x{:04X}",
                port, mask, current_val, new_val
            );
            self.regs.write_output(port, new_val);
        } else {
            trace!("Group {} mask=0x{:04X} already holds 0x{:04X}", port, mask, level);
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use crate::device::{DioConfig, DioController};
    use crate::error::Error;
    use crate::gpio::{ChannelGroup, ChannelId, Level, PortId};
    use crate::sim::SimulatedPorts;

    fn strict() -> DioController<SimulatedPorts> {
        DioController::with_config(SimulatedPorts::default(), DioConfig::strict())
    }

    #[test]
    fn test_write_channel_uses_set_and_clear() {
        let mut dio = strict();
        dio.registers_mut().preset_output(PortId::B, 0x00F0);
        dio.write_channel(ChannelId(16), Level::High).unwrap();
        dio.write_channel(ChannelId(20), Level::Low).unwrap();
        assert_eq!(dio.registers().output(PortId::B), 0x00E1);
        assert_eq!(dio.registers().stats().output_writes, 2);
    }

    #[test]
    fn test_invalid_raw_level_is_ignored() {
        let mut dio = DioController::new(SimulatedPorts::default());
        dio.write_channel_raw(ChannelId(3), 2).unwrap();
        assert_eq!(dio.registers().stats().output_writes, 0);
        dio.write_channel_raw(ChannelId(3), 1).unwrap();
        assert_eq!(dio.registers().output(PortId::A), 0x0008);

        let mut dio = strict();
        assert_eq!(
            dio.write_channel_raw(ChannelId(3), 0xFF),
            Err(Error::InvalidLevel(0xFF))
        );
    }

    #[test]
    fn test_group_write_skips_unchanged_value() {
        let mut dio = strict();
        dio.registers_mut().preset_output(PortId::A, 0x0A00);
        let group = ChannelGroup::new(PortId::A, 0x0F00).unwrap();
        dio.write_channel_group(&group, 0x0A).unwrap();
        assert_eq!(dio.registers().stats().output_writes, 0);
    }

    #[test]
    fn test_masked_write_ignores_bits_outside_port() {
        let layout = crate::PortLayout::new(4, 8).unwrap();
        let mut dio = DioController::with_config(
            SimulatedPorts::new(layout),
            DioConfig::strict().with_layout(layout),
        );
        dio.masked_write_port(PortId::A, 0xFFFF, 0xFF0F).unwrap();
        assert_eq!(dio.registers().output(PortId::A), 0x000F);
        // Mask entirely outside the port width is a no-op
        dio.masked_write_port(PortId::A, 0xFFFF, 0xFF00).unwrap();
        assert_eq!(dio.registers().stats().output_writes, 1);
    }

    #[test]
    fn test_flip_channel_reads_input_and_writes_once() {
        let mut dio = strict();
        // Input pin held high externally; latch bit starts low
        dio.registers_mut().drive_input(PortId::A, 0x0004, 0x0004);
        assert_eq!(dio.flip_channel(ChannelId(2)).unwrap(), Level::Low);
        assert_eq!(dio.registers().output(PortId::A), 0x0000);
        assert_eq!(dio.registers().stats().output_writes, 1);

        dio.registers_mut().drive_input(PortId::A, 0x0004, 0x0000);
        assert_eq!(dio.flip_channel(ChannelId(2)).unwrap(), Level::High);
        assert_eq!(dio.registers().output(PortId::A), 0x0004);
        assert_eq!(dio.registers().stats().output_writes, 2);
    }
}
