use crate::error::{invalid_group, Error, Result};
use crate::layout::PortLayout;
use std::fmt;
use std::ops::Not;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Raw word of one port register (one bit per pin).
pub type PortLevel = u16;

/// Logic level of a single channel.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum Level {
    Low,
    High,
}

impl Level {
    /// Raw value of the LOW constant.
    pub const RAW_LOW: u8 = 0x00;
    /// Raw value of the HIGH constant.
    pub const RAW_HIGH: u8 = 0x01;

    /// Maps a register bit test to a level.
    #[inline]
    pub fn from_bit(set: bool) -> Self {
        if set {
            Level::High
        } else {
            Level::Low
        }
    }

    /// Returns the raw constant (`0` or `1`).
    #[inline]
    pub fn as_raw(self) -> u8 {
        match self {
            Level::Low => Self::RAW_LOW,
            Level::High => Self::RAW_HIGH,
        }
    }
}

impl Not for Level {
    type Output = Level;

    fn not(self) -> Level {
        match self {
            Level::Low => Level::High,
            Level::High => Level::Low,
        }
    }
}

impl TryFrom<u8> for Level {
    type Error = Error;

    fn try_from(raw: u8) -> Result<Self> {
        match raw {
            Self::RAW_LOW => Ok(Level::Low),
            Self::RAW_HIGH => Ok(Level::High),
            other => Err(Error::InvalidLevel(other)),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum Direction {
    Input,
    Output,
}

/// Operating mode of a pin.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum PinMode {
    /// Digital input/output.
    Dio,
    /// Analog (e.g. ADC input).
    Analog,
    /// Alternate function (e.g. timer/PWM output).
    AlternateFunction,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum Pull {
    Up,
    Down,
}

/// Output slew rate class.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum Speed {
    Mhz2,
    Mhz10,
    Mhz50,
}

/// Concrete electrical configuration applied to a pin.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum ElectricalMode {
    InputPullUp,
    InputPullDown,
    OutputPushPull,
    OutputOpenDrain,
    /// Analog category, passed through without derivation.
    Analog,
    /// Alternate-function category, passed through without derivation.
    AlternateFunction,
}

impl ElectricalMode {
    /// Derives the electrical configuration from a pin's declared intent.
    ///
    /// Only digital I/O pins are derived; for those the pull selects between
    /// push-pull (up) and open-drain (down) on outputs.
    pub fn derive(mode: PinMode, direction: Direction, pull: Pull) -> Self {
        match mode {
            PinMode::Dio => match (direction, pull) {
                (Direction::Input, Pull::Up) => ElectricalMode::InputPullUp,
                (Direction::Input, Pull::Down) => ElectricalMode::InputPullDown,
                (Direction::Output, Pull::Up) => ElectricalMode::OutputPushPull,
                (Direction::Output, Pull::Down) => ElectricalMode::OutputOpenDrain,
            },
            PinMode::Analog => ElectricalMode::Analog,
            PinMode::AlternateFunction => ElectricalMode::AlternateFunction,
        }
    }

    /// Returns true if the pin drives its output latch onto the pad.
    #[inline]
    pub fn is_output(self) -> bool {
        matches!(
            self,
            ElectricalMode::OutputPushPull | ElectricalMode::OutputOpenDrain
        )
    }
}

/// Flat channel identifier addressing one pin across all ports.
///
/// Validity depends on the [`PortLayout`](crate::PortLayout) the channel is
/// resolved against.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct ChannelId(pub u16);

impl ChannelId {
    /// Returns the underlying channel number.
    #[inline]
    pub fn number(&self) -> u16 {
        self.0
    }

    /// Port owning this channel, or `None` if it is outside `layout`.
    pub fn port_index(&self, layout: PortLayout) -> Option<PortId> {
        layout.resolve(*self).map(|rc| rc.port)
    }

    /// Bit position within the owning port, or `None` if outside `layout`.
    pub fn bit_index(&self, layout: PortLayout) -> Option<u8> {
        layout.resolve(*self).map(|rc| rc.bit)
    }

    /// Single-bit mask within the owning port, or `None` if outside `layout`.
    pub fn mask(&self, layout: PortLayout) -> Option<PortLevel> {
        layout.resolve(*self).map(|rc| rc.mask())
    }
}

impl From<u16> for ChannelId {
    fn from(value: u16) -> Self {
        ChannelId(value)
    }
}

impl fmt::Display for ChannelId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "ch{}", self.0)
    }
}

/// Identifier of one port register block.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct PortId(pub u8);

impl PortId {
    pub const A: PortId = PortId(0);
    pub const B: PortId = PortId(1);
    pub const C: PortId = PortId(2);
    pub const D: PortId = PortId(3);

    /// Returns the underlying port index.
    #[inline]
    pub fn index(&self) -> u8 {
        self.0
    }
}

impl fmt::Display for PortId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.0 < 26 {
            write!(f, "GPIO{}", (b'A' + self.0) as char)
        } else {
            write!(f, "GPIO#{}", self.0)
        }
    }
}

/// A contiguous set of bits within one port, read and written as one value.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct ChannelGroup {
    pub(crate) port: PortId,
    pub(crate) mask: PortLevel,
    pub(crate) offset: u8,
}

impl ChannelGroup {
    /// Creates a group from a contiguous mask; the offset is the mask's lowest set bit.
    pub fn new(port: PortId, mask: PortLevel) -> Result<Self> {
        let group = ChannelGroup {
            port,
            mask,
            offset: mask.trailing_zeros() as u8,
        };
        group.check_mask()?;
        Ok(group)
    }

    /// Creates a group from raw parts, as found in static configuration tables.
    ///
    /// The descriptor is validated when it is used.
    pub const fn from_raw_parts(port: PortId, mask: PortLevel, offset: u8) -> Self {
        ChannelGroup { port, mask, offset }
    }

    #[inline]
    pub fn port(&self) -> PortId {
        self.port
    }

    #[inline]
    pub fn mask(&self) -> PortLevel {
        self.mask
    }

    #[inline]
    pub fn offset(&self) -> u8 {
        self.offset
    }

    /// Number of channels in the group.
    #[inline]
    pub fn width(&self) -> u32 {
        self.mask.count_ones()
    }

    fn check_mask(&self) -> Result<()> {
        if self.mask == 0 {
            return Err(invalid_group(self.mask, self.offset, "mask is empty"));
        }
        if u32::from(self.offset) != self.mask.trailing_zeros() {
            return Err(invalid_group(
                self.mask,
                self.offset,
                "offset must match lowest mask bit",
            ));
        }
        let shifted = u32::from(self.mask) >> self.offset;
        if shifted & (shifted + 1) != 0 {
            return Err(invalid_group(self.mask, self.offset, "mask is not contiguous"));
        }
        Ok(())
    }

    /// Validates the descriptor against the width of its port.
    pub(crate) fn validate(&self, port_mask: PortLevel) -> Result<()> {
        self.check_mask()?;
        if self.mask & !port_mask != 0 {
            return Err(invalid_group(
                self.mask,
                self.offset,
                "mask exceeds port width",
            ));
        }
        Ok(())
    }
}
