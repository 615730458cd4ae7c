//! Channel resolver: flat channel identifiers to (port, bit) pairs.

use crate::consts;
use crate::error::{Error, Result};
use crate::gpio::{ChannelId, PortId, PortLevel};

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Port geometry used to decompose flat channel identifiers.
///
/// Channel `i` lives on port `i / bits_per_port`, bit `i % bits_per_port`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(
    feature = "serde",
    derive(Serialize, Deserialize),
    serde(try_from = "RawPortLayout")
)]
pub struct PortLayout {
    port_count: u8,
    bits_per_port: u8,
}

// Deserialized geometry goes through `PortLayout::new`
#[cfg(feature = "serde")]
#[derive(Deserialize)]
struct RawPortLayout {
    port_count: u8,
    bits_per_port: u8,
}

#[cfg(feature = "serde")]
impl TryFrom<RawPortLayout> for PortLayout {
    type Error = Error;

    fn try_from(raw: RawPortLayout) -> Result<Self> {
        PortLayout::new(raw.port_count, raw.bits_per_port)
    }
}

/// A channel resolved to its owning port and bit.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ResolvedChannel {
    pub port: PortId,
    pub bit: u8,
}

impl ResolvedChannel {
    /// Returns the single-bit mask (1 << bit) for register operations.
    #[inline]
    pub fn mask(&self) -> PortLevel {
        1 << self.bit
    }
}

impl Default for PortLayout {
    fn default() -> Self {
        Self::STM32F1
    }
}

impl PortLayout {
    /// Four 16-bit ports (GPIOA-GPIOD).
    pub const STM32F1: PortLayout = PortLayout {
        port_count: consts::DEFAULT_PORT_COUNT,
        bits_per_port: consts::DEFAULT_BITS_PER_PORT,
    };

    /// Creates a layout, returning an error if the geometry cannot be addressed.
    pub fn new(port_count: u8, bits_per_port: u8) -> Result<Self> {
        if port_count == 0 {
            return Err(Error::InvalidLayout(
                "at least one port is required".to_string(),
            ));
        }
        if bits_per_port == 0 || bits_per_port > consts::MAX_BITS_PER_PORT {
            return Err(Error::InvalidLayout(format!(
                "bits per port must be 1-{}, got {}",
                consts::MAX_BITS_PER_PORT,
                bits_per_port
            )));
        }
        Ok(PortLayout {
            port_count,
            bits_per_port,
        })
    }

    #[inline]
    pub fn port_count(&self) -> u8 {
        self.port_count
    }

    #[inline]
    pub fn bits_per_port(&self) -> u8 {
        self.bits_per_port
    }

    /// Total number of addressable channels.
    #[inline]
    pub fn channel_count(&self) -> u16 {
        u16::from(self.port_count) * u16::from(self.bits_per_port)
    }

    /// Mask covering every pin of one port.
    #[inline]
    pub fn port_mask(&self) -> PortLevel {
        (((1u32) << self.bits_per_port) - 1) as PortLevel
    }

    /// Resolves a flat channel identifier. Returns `None` outside the layout.
    #[inline]
    pub fn resolve(&self, channel: ChannelId) -> Option<ResolvedChannel> {
        if channel.0 >= self.channel_count() {
            return None;
        }
        let bits = u16::from(self.bits_per_port);
        Some(ResolvedChannel {
            port: PortId((channel.0 / bits) as u8),
            bit: (channel.0 % bits) as u8,
        })
    }

    /// Like [`resolve`](Self::resolve), but with a typed error.
    pub fn try_resolve(&self, channel: ChannelId) -> Result<ResolvedChannel> {
        self.resolve(channel).ok_or(Error::ChannelOutOfRange {
            channel: channel.0,
            channel_count: self.channel_count(),
        })
    }

    /// Inverse of [`resolve`](Self::resolve).
    pub fn channel(&self, port: PortId, bit: u8) -> Option<ChannelId> {
        if !self.contains_port(port) || bit >= self.bits_per_port {
            return None;
        }
        Some(ChannelId(
            u16::from(port.0) * u16::from(self.bits_per_port) + u16::from(bit),
        ))
    }

    #[inline]
    pub fn contains_port(&self, port: PortId) -> bool {
        port.0 < self.port_count
    }

    /// Returns an error if the port does not map to a register block.
    pub fn check_port(&self, port: PortId) -> Result<()> {
        if self.contains_port(port) {
            Ok(())
        } else {
            Err(Error::InvalidPort {
                port: port.0,
                port_count: self.port_count,
            })
        }
    }

    /// Iterates all valid port identifiers.
    pub fn ports(&self) -> impl Iterator<Item = PortId> {
        (0..self.port_count).map(PortId)
    }
}
