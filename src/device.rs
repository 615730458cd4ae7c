//! Driver handle, configuration and development error reporting.

use crate::consts;
use crate::error::{Error, Result};
use crate::layout::PortLayout;
use crate::registers::PortRegisters;
use log::{debug, error, warn};

/// How the driver treats invalid identifiers and illegal state transitions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ErrorMode {
    /// Violations are returned as `Err`.
    Strict,
    /// Violations are absorbed as silent no-ops returning a default value.
    /// Only an invalid port on `read_port` reaches the [`ErrorReporter`].
    #[default]
    Compatibility,
}

/// Driver configuration.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DioConfig {
    /// Port geometry used to resolve channels.
    pub layout: PortLayout,
    /// Strict errors or silent no-ops.
    pub error_mode: ErrorMode,
    /// Report development errors to the [`ErrorReporter`].
    pub dev_error_detect: bool,
}

impl Default for DioConfig {
    fn default() -> Self {
        Self {
            layout: PortLayout::default(),
            error_mode: ErrorMode::Compatibility,
            dev_error_detect: true,
        }
    }
}

impl DioConfig {
    /// Violations surface as typed errors.
    pub fn strict() -> Self {
        Self {
            error_mode: ErrorMode::Strict,
            ..Self::default()
        }
    }

    /// Violations are silent no-ops, as in the reference driver.
    pub fn compatibility() -> Self {
        Self::default()
    }

    pub fn with_layout(mut self, layout: PortLayout) -> Self {
        self.layout = layout;
        self
    }

    pub fn with_error_mode(mut self, error_mode: ErrorMode) -> Self {
        self.error_mode = error_mode;
        self
    }

    pub fn with_dev_error_detect(mut self, enabled: bool) -> Self {
        self.dev_error_detect = enabled;
        self
    }
}

/// A development error report.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DetReport {
    pub module_id: u16,
    pub instance_id: u8,
    pub api_id: u8,
    pub error_id: u8,
}

/// Receives development error reports.
pub trait ErrorReporter {
    fn report(&mut self, report: DetReport);
}

/// Forwards development error reports to the `log` facade.
#[derive(Debug, Clone, Copy, Default)]
pub struct LogReporter;

impl ErrorReporter for LogReporter {
    fn report(&mut self, report: DetReport) {
        error!(
            "DET: module={} instance={} api=0x{:02X} error=0x{:02X}",
            report.module_id, report.instance_id, report.api_id, report.error_id
        );
    }
}

/// Collects development error reports in memory.
#[derive(Debug, Clone, Default)]
pub struct RecordingReporter {
    pub reports: Vec<DetReport>,
}

impl ErrorReporter for RecordingReporter {
    fn report(&mut self, report: DetReport) {
        self.reports.push(report);
    }
}

/// Module version information.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct VersionInfo {
    pub vendor_id: u16,
    pub module_id: u16,
    pub sw_major_version: u8,
    pub sw_minor_version: u8,
    pub sw_patch_version: u8,
}

pub(crate) const VERSION_INFO: VersionInfo = VersionInfo {
    vendor_id: consts::VENDOR_ID,
    module_id: consts::MODULE_ID,
    sw_major_version: consts::SW_MAJOR_VERSION,
    sw_minor_version: consts::SW_MINOR_VERSION,
    sw_patch_version: consts::SW_PATCH_VERSION,
};

/// A handle to the port register blocks.
///
/// Provides the channel/port/group I/O services and applies pin
/// configuration records. All register traffic goes through the owned
/// [`PortRegisters`] backend.
/// **Note:** Read-modify-write services are not atomic with respect to other
/// owners of the same hardware.
#[derive(Debug)]
pub struct DioController<R, E = LogReporter> {
    pub(crate) regs: R,
    pub(crate) config: DioConfig,
    pub(crate) reporter: E,
}

impl<R: PortRegisters> DioController<R, LogReporter> {
    /// Creates a controller with the default configuration.
    pub fn new(regs: R) -> Self {
        Self::with_config(regs, DioConfig::default())
    }

    /// Creates a controller reporting development errors to the log.
    pub fn with_config(regs: R, config: DioConfig) -> Self {
        Self::with_reporter(regs, config, LogReporter)
    }
}

impl<R: PortRegisters, E: ErrorReporter> DioController<R, E> {
    /// Creates a controller with a custom development error reporter.
    pub fn with_reporter(regs: R, config: DioConfig, reporter: E) -> Self {
        debug!(
            "DIO controller: {} ports x {} bits, {:?}",
            config.layout.port_count(),
            config.layout.bits_per_port(),
            config.error_mode
        );
        Self {
            regs,
            config,
            reporter,
        }
    }

    pub fn config(&self) -> &DioConfig {
        &self.config
    }

    pub fn layout(&self) -> PortLayout {
        self.config.layout
    }

    pub fn error_mode(&self) -> ErrorMode {
        self.config.error_mode
    }

    pub fn registers(&self) -> &R {
        &self.regs
    }

    pub fn registers_mut(&mut self) -> &mut R {
        &mut self.regs
    }

    pub fn reporter(&self) -> &E {
        &self.reporter
    }

    /// Consumes the controller, returning the register backend.
    pub fn into_registers(self) -> R {
        self.regs
    }

    /// Returns the module version information.
    pub fn version_info() -> VersionInfo {
        VERSION_INFO
    }

    // Applies the configured error mode to a failed operation
    pub(crate) fn absorb<T>(&self, result: Result<T>, default: T) -> Result<T> {
        match (result, self.config.error_mode) {
            (Ok(value), _) => Ok(value),
            (Err(e), ErrorMode::Strict) => Err(e),
            (Err(e), ErrorMode::Compatibility) => {
                warn!("Ignored: {}", e);
                Ok(default)
            }
        }
    }

    pub(crate) fn report_dev_error(&mut self, api_id: u8, err: &Error) {
        if !self.config.dev_error_detect {
            return;
        }
        let error_id = match err {
            Error::InvalidPort { .. } => consts::det::E_PARAM_INVALID_PORT_ID,
            _ => return,
        };
        self.reporter.report(DetReport {
            module_id: consts::MODULE_ID,
            instance_id: consts::INSTANCE_ID,
            api_id,
            error_id,
        });
    }
}
