//! Abstraction layer over the external DDC/CI tool (`ddcutil`).
//!
//! This module provides a trait-based seam between the resolution pipeline
//! and the `ddcutil` subprocess, enabling testability without monitors.
//! The trait deals in raw command output; parsing lives with the consumers
//! (`monitor::parse` for detection, `brightness` for VCP readings), so tests
//! can drive the real parsers with canned tool output.

pub mod mock;
mod real;

pub use real::DdcProcess;

use crate::error::Result;

/// VCP feature code for brightness (luminance).
pub const VCP_BRIGHTNESS: u8 = 0x10;

/// Operations the external DDC/CI tool must provide.
///
/// Implementations return the tool's stdout verbatim. All three operations
/// map one-to-one onto a single subprocess invocation; none of them retries —
/// the user's next keypress is the retry mechanism.
pub trait Ddc {
    /// Run display detection and return the tool's raw output.
    ///
    /// # Errors
    ///
    /// Fails when the tool is absent from PATH or exits non-zero.
    fn detect(&self) -> Result<String>;

    /// Read a VCP feature on the given I2C bus and return the raw output.
    ///
    /// # Errors
    ///
    /// Fails when the tool is absent, the bus does not respond, or the
    /// invoking user lacks I2C permissions.
    fn get_vcp(&self, bus: &str, feature: u8) -> Result<String>;

    /// Write a VCP feature value on the given I2C bus.
    ///
    /// # Errors
    ///
    /// Fails when the tool is absent, the bus does not respond, or the
    /// invoking user lacks I2C permissions.
    fn set_vcp(&self, bus: &str, feature: u8, value: u8) -> Result<()>;
}
