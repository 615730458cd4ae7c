use thiserror::Error;

/// Errors that can occur when addressing or configuring DIO channels.
///
/// Every variant belongs to one of two categories, see [`ErrorKind`]. There
/// is no hardware fault category: register access is assumed to always
/// succeed.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum Error {
    /// Flat channel identifier is outside the configured layout.
    #[error("Channel {channel} out of range (layout has {channel_count} channels)")]
    ChannelOutOfRange {
        /// The invalid channel identifier.
        channel: u16,
        /// Total number of channels in the layout.
        channel_count: u16,
    },
    /// Port identifier does not map to a known register block.
    #[error("Port {port} out of range (layout has {port_count} ports)")]
    InvalidPort {
        /// The invalid port identifier.
        port: u8,
        /// Number of ports in the layout.
        port_count: u8,
    },
    /// Channel group descriptor violates the mask/offset invariants.
    #[error("Invalid channel group (mask=0x{mask:04X}, offset={offset}): {message}")]
    InvalidChannelGroup {
        /// The group's mask.
        mask: u16,
        /// The group's offset.
        offset: u8,
        /// Which invariant was violated.
        message: String,
    },
    /// Raw level value is neither the LOW nor the HIGH constant.
    #[error("Invalid level value {0} (expected 0 or 1)")]
    InvalidLevel(u8),
    /// Runtime pin index is outside the configuration table.
    #[error("Pin index {pin} out of range (table has {pin_count} pins)")]
    PinIndexOutOfRange {
        /// The invalid pin index.
        pin: usize,
        /// Number of records in the configuration table.
        pin_count: usize,
    },
    /// Pin record names a flat channel that belongs to a different port.
    #[error("Pin id {pin_id} does not belong to port {port}")]
    PinPortMismatch {
        /// The record's pin id.
        pin_id: u16,
        /// The record's port id.
        port: u8,
    },
    /// Port geometry cannot be represented.
    #[error("Invalid port layout: {0}")]
    InvalidLayout(String),
    /// Runtime reconfiguration requested before the deployment pass.
    #[error("Port driver not initialized")]
    NotInitialized,
    /// Pin record forbids runtime direction changes.
    #[error("Direction of pin {pin} is not changeable at runtime")]
    DirectionNotChangeable {
        /// The pin index.
        pin: usize,
    },
    /// Pin record forbids runtime mode changes.
    #[error("Mode of pin {pin} is not changeable at runtime")]
    ModeNotChangeable {
        /// The pin index.
        pin: usize,
    },
}

/// Coarse classification of an [`Error`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// A channel, port, pin, group or level identifier is out of range.
    InvalidIdentifier,
    /// The driver state or the pin record does not permit the request.
    IllegalState,
}

impl Error {
    /// Returns the category of this error.
    pub fn kind(&self) -> ErrorKind {
        match self {
            Error::NotInitialized
            | Error::DirectionNotChangeable { .. }
            | Error::ModeNotChangeable { .. } => ErrorKind::IllegalState,
            _ => ErrorKind::InvalidIdentifier,
        }
    }
}

/// Result type alias for DIO and Port operations.
///
/// This is a convenience alias for `std::result::Result<T, Error>` used
/// throughout the crate to reduce boilerplate.
pub type Result<T> = std::result::Result<T, Error>;

// Helpers for creating InvalidChannelGroup errors
pub(crate) fn invalid_group(mask: u16, offset: u8, message: &str) -> Error {
    Error::InvalidChannelGroup {
        mask,
        offset,
        message: message.to_string(),
    }
}
