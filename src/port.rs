//! Pin configuration records, deployment, and the runtime reconfiguration
//! state machine.
//!
//! The configuration table is an immutable baseline borrowed from the
//! application. Runtime direction/mode changes are always derived from the
//! baseline record plus an explicit [`PinOverride`], so repeated changes
//! never accumulate drift.

use crate::device::{DioController, ErrorReporter, VersionInfo, VERSION_INFO};
use crate::error::{Error, Result};
use crate::gpio::{ChannelId, Direction, ElectricalMode, Level, PinMode, PortId, Pull, Speed};
use crate::layout::PortLayout;
use crate::registers::PortRegisters;
use log::{debug, trace};

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Declarative configuration of one pin, applied at deployment time.
///
/// `pin_id` is either the bit number within `port` or the flat channel
/// number of that pin (e.g. `45` for PC13 on a 4 x 16 layout).
/// `direction` and `level` are only meaningful for [`PinMode::Dio`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct PinConfig {
    pub port: PortId,
    pub pin_id: u16,
    pub mode: PinMode,
    pub direction: Direction,
    pub speed: Speed,
    pub pull: Pull,
    /// Default output level, written when the pin is deployed as output.
    pub level: Level,
    /// Runtime direction changes allowed.
    pub direction_changeable: bool,
    /// Runtime mode changes allowed.
    pub mode_changeable: bool,
}

impl PinConfig {
    /// A digital input with pull-up, 2 MHz, not changeable at runtime.
    pub const fn new(port: PortId, pin_id: u16) -> Self {
        PinConfig {
            port,
            pin_id,
            mode: PinMode::Dio,
            direction: Direction::Input,
            speed: Speed::Mhz2,
            pull: Pull::Up,
            level: Level::Low,
            direction_changeable: false,
            mode_changeable: false,
        }
    }

    pub const fn with_mode(self, mode: PinMode) -> Self {
        PinConfig { mode, ..self }
    }

    pub const fn with_direction(self, direction: Direction) -> Self {
        PinConfig { direction, ..self }
    }

    /// Output with the given default level.
    pub const fn output(self, level: Level) -> Self {
        PinConfig {
            direction: Direction::Output,
            level,
            ..self
        }
    }

    pub const fn with_pull(self, pull: Pull) -> Self {
        PinConfig { pull, ..self }
    }

    pub const fn with_speed(self, speed: Speed) -> Self {
        PinConfig { speed, ..self }
    }

    pub const fn direction_changeable(self, allowed: bool) -> Self {
        PinConfig {
            direction_changeable: allowed,
            ..self
        }
    }

    pub const fn mode_changeable(self, allowed: bool) -> Self {
        PinConfig {
            mode_changeable: allowed,
            ..self
        }
    }

    /// Returns the bit of this pin within its port.
    pub fn bit(&self, layout: PortLayout) -> Result<u8> {
        layout.check_port(self.port)?;
        if self.pin_id < u16::from(layout.bits_per_port()) {
            return Ok(self.pin_id as u8);
        }
        let rc = layout.try_resolve(ChannelId(self.pin_id))?;
        if rc.port != self.port {
            return Err(Error::PinPortMismatch {
                pin_id: self.pin_id,
                port: self.port.index(),
            });
        }
        Ok(rc.bit)
    }

    /// Electrical configuration this record derives to.
    pub fn electrical_mode(&self) -> ElectricalMode {
        ElectricalMode::derive(self.mode, self.direction, self.pull)
    }
}

/// Attribute overrides applied on top of a baseline [`PinConfig`] when it is deployed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct PinOverride {
    pub direction: Option<Direction>,
    pub mode: Option<PinMode>,
}

impl PinOverride {
    /// Deploy the record as-is.
    pub const NONE: PinOverride = PinOverride {
        direction: None,
        mode: None,
    };

    pub const fn direction(direction: Direction) -> Self {
        PinOverride {
            direction: Some(direction),
            mode: None,
        }
    }

    pub const fn mode(mode: PinMode) -> Self {
        PinOverride {
            direction: None,
            mode: Some(mode),
        }
    }

    /// Returns a working copy of `baseline` with the overrides applied.
    pub fn apply(&self, baseline: &PinConfig) -> PinConfig {
        PinConfig {
            direction: self.direction.unwrap_or(baseline.direction),
            mode: self.mode.unwrap_or(baseline.mode),
            ..*baseline
        }
    }
}

impl<R: PortRegisters, E: ErrorReporter> DioController<R, E> {
    /// Applies a pin configuration record (plus overrides) to the hardware.
    ///
    /// Enables the port clock, configures the pin's electrical mode and
    /// speed, and for outputs writes the default level. A record with an
    /// invalid port or pin has no hardware effect.
    pub fn deploy_pin(&mut self, pin: &PinConfig, overrides: PinOverride) -> Result<()> {
        let result = self.try_deploy_pin(pin, overrides);
        self.absorb(result, ())
    }

    fn try_deploy_pin(&mut self, pin: &PinConfig, overrides: PinOverride) -> Result<()> {
        let bit = pin.bit(self.config.layout)?;
        let mask = 1 << bit;
        let effective = overrides.apply(pin);
        let mode = effective.electrical_mode();

        self.regs.enable_clock(pin.port);
        debug!(
            "Deploying {} pin {}: {:?} {:?} -> {:?}, {:?}",
            pin.port, bit, effective.mode, effective.direction, mode, effective.speed
        );
        self.regs.configure_pins(pin.port, mask, mode, effective.speed);

        if effective.direction == Direction::Output {
            trace!(
                "Default level {} pin {}: {:?}",
                pin.port,
                bit,
                effective.level
            );
            match effective.level {
                Level::High => self.regs.set_bits(pin.port, mask),
                Level::Low => self.regs.clear_bits(pin.port, mask),
            }
        }
        Ok(())
    }
}

/// Lifecycle of the pin configuration.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ConfigState<'t> {
    /// No deployment pass has run.
    #[default]
    Uninitialized,
    /// The table has been deployed and is the baseline for runtime changes.
    Initialized { pins: &'t [PinConfig] },
}

/// Owns the initialization state and gates runtime reconfiguration.
///
/// Constructed uninitialized; [`init_all`](Self::init_all) transitions it to
/// initialized. There is no reverse transition.
#[derive(Debug, Clone, Copy, Default)]
pub struct PortConfigurator<'t> {
    state: ConfigState<'t>,
}

#[derive(Debug, Clone, Copy)]
enum Attribute {
    Direction,
    Mode,
}

impl<'t> PortConfigurator<'t> {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn state(&self) -> ConfigState<'t> {
        self.state
    }

    pub fn is_initialized(&self) -> bool {
        matches!(self.state, ConfigState::Initialized { .. })
    }

    /// The deployed configuration table, once initialized.
    pub fn baseline(&self) -> Option<&'t [PinConfig]> {
        match self.state {
            ConfigState::Initialized { pins } => Some(pins),
            ConfigState::Uninitialized => None,
        }
    }

    /// Returns the module version information.
    pub fn version_info() -> VersionInfo {
        VERSION_INFO
    }

    /// Deploys every record of `table` in order, then marks the driver initialized.
    ///
    /// `None` is a no-op. In strict mode the first invalid record aborts the
    /// pass and the state is left unchanged.
    pub fn init_all<R: PortRegisters, E: ErrorReporter>(
        &mut self,
        dio: &mut DioController<R, E>,
        table: Option<&'t [PinConfig]>,
    ) -> Result<()> {
        let Some(pins) = table else {
            debug!("init_all: no configuration table");
            return Ok(());
        };
        for pin in pins {
            dio.deploy_pin(pin, PinOverride::NONE)?;
        }
        if self.is_initialized() {
            debug!("Port configuration redeployed ({} pins)", pins.len());
        } else {
            debug!("Port configuration initialized ({} pins)", pins.len());
        }
        self.state = ConfigState::Initialized { pins };
        Ok(())
    }

    /// Changes the direction of a pin whose record allows it.
    ///
    /// Requires an initialized configurator and a baseline record with
    /// `direction_changeable` set; otherwise nothing is deployed.
    pub fn set_pin_direction<R: PortRegisters, E: ErrorReporter>(
        &self,
        dio: &mut DioController<R, E>,
        pin: usize,
        direction: Direction,
    ) -> Result<()> {
        let baseline = match self.changeable_pin(pin, Attribute::Direction) {
            Ok(baseline) => baseline,
            Err(e) => return dio.absorb(Err(e), ()),
        };
        debug!("Pin {}: direction -> {:?}", pin, direction);
        dio.deploy_pin(baseline, PinOverride::direction(direction))
    }

    /// Changes the mode of a pin whose record allows it.
    ///
    /// Same gating as [`set_pin_direction`](Self::set_pin_direction), keyed on
    /// the mode-changeable flag.
    pub fn set_pin_mode<R: PortRegisters, E: ErrorReporter>(
        &self,
        dio: &mut DioController<R, E>,
        pin: usize,
        mode: PinMode,
    ) -> Result<()> {
        let baseline = match self.changeable_pin(pin, Attribute::Mode) {
            Ok(baseline) => baseline,
            Err(e) => return dio.absorb(Err(e), ()),
        };
        debug!("Pin {}: mode -> {:?}", pin, mode);
        dio.deploy_pin(baseline, PinOverride::mode(mode))
    }

    /// Redeploys every pin whose direction is not changeable at runtime.
    pub fn refresh_port_direction<R: PortRegisters, E: ErrorReporter>(
        &self,
        dio: &mut DioController<R, E>,
    ) -> Result<()> {
        let Some(pins) = self.baseline() else {
            return dio.absorb(Err(Error::NotInitialized), ());
        };
        let mut refreshed = 0usize;
        for pin in pins.iter().filter(|p| !p.direction_changeable) {
            dio.deploy_pin(pin, PinOverride::NONE)?;
            refreshed += 1;
        }
        debug!("Refreshed {} fixed-direction pins", refreshed);
        Ok(())
    }

    fn changeable_pin(&self, pin: usize, attribute: Attribute) -> Result<&'t PinConfig> {
        let pins = self.baseline().ok_or(Error::NotInitialized)?;
        let baseline = pins.get(pin).ok_or(Error::PinIndexOutOfRange {
            pin,
            pin_count: pins.len(),
        })?;
        match attribute {
            Attribute::Direction if !baseline.direction_changeable => {
                Err(Error::DirectionNotChangeable { pin })
            }
            Attribute::Mode if !baseline.mode_changeable => Err(Error::ModeNotChangeable { pin }),
            _ => Ok(baseline),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_pin_bit_from_local_and_flat_ids() {
        let layout = PortLayout::STM32F1;
        assert_eq!(PinConfig::new(PortId::C, 13).bit(layout), Ok(13));
        assert_eq!(PinConfig::new(PortId::C, 45).bit(layout), Ok(13));
        assert_eq!(PinConfig::new(PortId::B, 24).bit(layout), Ok(8));
        assert_eq!(
            PinConfig::new(PortId::A, 45).bit(layout),
            Err(Error::PinPortMismatch {
                pin_id: 45,
                port: 0
            })
        );
        assert!(matches!(
            PinConfig::new(PortId(4), 1).bit(layout),
            Err(Error::InvalidPort { port: 4, .. })
        ));
        assert!(matches!(
            PinConfig::new(PortId::D, 64).bit(layout),
            Err(Error::ChannelOutOfRange { channel: 64, .. })
        ));
    }

    #[test]
    fn test_override_produces_working_copy() {
        let baseline = PinConfig::new(PortId::A, 3)
            .output(Level::High)
            .direction_changeable(true);
        let copy = PinOverride::direction(Direction::Input).apply(&baseline);
        assert_eq!(copy.direction, Direction::Input);
        assert_eq!(copy.mode, PinMode::Dio);
        assert_eq!(copy.level, Level::High);
        assert_eq!(baseline.direction, Direction::Output);

        let copy = PinOverride::mode(PinMode::Analog).apply(&baseline);
        assert_eq!(copy.mode, PinMode::Analog);
        assert_eq!(copy.direction, Direction::Output);
        assert_eq!(PinOverride::NONE.apply(&baseline), baseline);
    }

    #[test]
    fn test_builder_defaults() {
        const PIN: PinConfig = PinConfig::new(PortId::B, 8)
            .with_pull(Pull::Down)
            .with_speed(Speed::Mhz50)
            .mode_changeable(true);
        assert_eq!(PIN.mode, PinMode::Dio);
        assert_eq!(PIN.direction, Direction::Input);
        assert!(!PIN.direction_changeable);
        assert!(PIN.mode_changeable);
        assert_eq!(PIN.electrical_mode(), ElectricalMode::InputPullDown);
    }

    #[test]
    fn test_configurator_starts_uninitialized() {
        let cfg = PortConfigurator::new();
        assert_eq!(cfg.state(), ConfigState::Uninitialized);
        assert!(!cfg.is_initialized());
        assert!(cfg.baseline().is_none());
        assert!(matches!(
            cfg.changeable_pin(0, Attribute::Direction),
            Err(Error::NotInitialized)
        ));
    }
}
