//! Error types for brightness-control operations.

use thiserror::Error;

/// Primary error type for brightness-control operations.
#[derive(Error, Debug)]
pub enum BctlError {
    // Detection errors
    #[error("ddcutil not found on PATH")]
    ToolMissing,

    #[error("ddcutil detect failed: {reason}")]
    DetectionFailed { reason: String },

    #[error("Could not parse ddcutil detect output: {0}")]
    DetectionParse(String),

    #[error("No DDC/CI capable monitors detected")]
    NoMonitorsFound,

    // Slot errors
    #[error("Unknown monitor slot {slot}: {max} monitor(s) connected (slots 1-{max})")]
    UnknownSlot { slot: u32, max: u32 },

    // Actuator errors
    #[error("Monitor on {bus} did not respond: {reason}")]
    Actuator { bus: String, reason: String },

    #[error("Permission denied accessing {bus}")]
    PermissionDenied { bus: String },

    #[error("Invalid brightness value {value}: must be 0-100")]
    InvalidBrightness { value: u32 },

    // General errors
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("{0}")]
    Other(String),
}

impl BctlError {
    /// Returns true if the error is recoverable by the user.
    pub const fn is_user_recoverable(&self) -> bool {
        matches!(
            self,
            Self::ToolMissing
                | Self::NoMonitorsFound
                | Self::UnknownSlot { .. }
                | Self::PermissionDenied { .. }
                | Self::InvalidBrightness { .. }
        )
    }

    /// Returns a suggestion for how to fix the error.
    pub fn suggestion(&self) -> Option<&'static str> {
        match self {
            Self::ToolMissing => Some("Install with: sudo apt install ddcutil"),
            Self::NoMonitorsFound => Some("Check cable connections and enable DDC/CI in the monitor's OSD menu"),
            Self::UnknownSlot { .. } => Some("Run: brightness-control --detect"),
            Self::PermissionDenied { .. } => {
                Some("Add yourself to the i2c group (sudo usermod -aG i2c $USER), then log out and back in")
            }
            Self::InvalidBrightness { .. } => Some("Use a value between 0 and 100"),
            _ => None,
        }
    }
}

/// Convenience type alias for Results using BctlError.
pub type Result<T> = std::result::Result<T, BctlError>;
