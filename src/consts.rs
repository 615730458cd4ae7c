//! Internal constants: default port geometry, module identification and
//! development error codes.

// --- Default Geometry (STM32F1, GPIOA-GPIOD) ---
/// Number of port register blocks on the reference device.
pub const DEFAULT_PORT_COUNT: u8 = 4;
/// Number of pins controlled by one port register block.
pub const DEFAULT_BITS_PER_PORT: u8 = 16;
/// Widest port supported by the `u16` port word.
pub const MAX_BITS_PER_PORT: u8 = 16;

// --- Module Identification ---
/// Vendor ID reported by `version_info`.
pub const VENDOR_ID: u16 = 1001;
/// Module ID reported by `version_info` (shared by the DIO and Port layers).
pub const MODULE_ID: u16 = 120;
/// Instance ID used in development error reports.
pub const INSTANCE_ID: u8 = 0;
pub const SW_MAJOR_VERSION: u8 = 1;
pub const SW_MINOR_VERSION: u8 = 0;
pub const SW_PATCH_VERSION: u8 = 0;

// --- Development Error Reporting ---
pub mod det {
    // Service IDs. Only `API_READ_PORT` is reported by this driver; the rest
    // identify the remaining DIO services for custom reporters.
    pub const API_READ_CHANNEL: u8 = 0x00;
    pub const API_WRITE_CHANNEL: u8 = 0x01;
    pub const API_READ_PORT: u8 = 0x02;
    pub const API_WRITE_PORT: u8 = 0x03;
    pub const API_READ_CHANNEL_GROUP: u8 = 0x04;
    pub const API_WRITE_CHANNEL_GROUP: u8 = 0x05;
    pub const API_FLIP_CHANNEL: u8 = 0x11;
    pub const API_MASKED_WRITE_PORT: u8 = 0x13;

    // Error codes
    /// Invalid port identifier passed to a port-wide service.
    pub const E_PARAM_INVALID_PORT_ID: u8 = 0x14;
}
