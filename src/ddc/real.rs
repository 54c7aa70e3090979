//! Real `ddcutil` backend: one subprocess per operation.

use std::io::ErrorKind;
use std::process::{Command, Output};

use tracing::{debug, trace};

use crate::error::{BctlError, Result};

/// Multiplier for ddcutil's internal I2C sleeps. The protocol-mandated
/// delays are very conservative; 0.1 keeps detect under a second on
/// common hardware without corrupting replies.
const SLEEP_MULTIPLIER: &str = ".1";

/// Invokes the `ddcutil` binary for detection and VCP get/set.
#[derive(Debug, Clone, Default)]
pub struct DdcProcess {
    /// Binary name or path; overridable for packaging setups that ship
    /// ddcutil outside PATH.
    program: Option<String>,
}

impl DdcProcess {
    /// Create a backend invoking `ddcutil` from PATH.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a backend invoking a specific binary.
    #[must_use]
    pub fn with_program(program: impl Into<String>) -> Self {
        Self {
            program: Some(program.into()),
        }
    }

    fn program(&self) -> &str {
        self.program.as_deref().unwrap_or("ddcutil")
    }

    fn run(&self, args: &[&str]) -> Result<Output> {
        trace!(program = self.program(), ?args, "Spawning ddcutil");
        Command::new(self.program())
            .args(args)
            .output()
            .map_err(|e| match e.kind() {
                ErrorKind::NotFound => BctlError::ToolMissing,
                _ => BctlError::Io(e),
            })
    }
}

impl super::Ddc for DdcProcess {
    fn detect(&self) -> Result<String> {
        let output = self.run(&["detect", "--sleep-multiplier", SLEEP_MULTIPLIER])?;
        if !output.status.success() {
            return Err(BctlError::DetectionFailed {
                reason: stderr_excerpt(&output),
            });
        }
        let stdout = String::from_utf8_lossy(&output.stdout).into_owned();
        debug!(bytes = stdout.len(), "ddcutil detect completed");
        Ok(stdout)
    }

    fn get_vcp(&self, bus: &str, feature: u8) -> Result<String> {
        let bus_num = extract_bus_number(bus)?;
        let feature = format!("0x{feature:02x}");
        let output = self.run(&[
            "--bus",
            &bus_num,
            "--sleep-multiplier",
            SLEEP_MULTIPLIER,
            "getvcp",
            &feature,
        ])?;
        if !output.status.success() {
            return Err(classify_bus_failure(bus, &output));
        }
        Ok(String::from_utf8_lossy(&output.stdout).into_owned())
    }

    fn set_vcp(&self, bus: &str, feature: u8, value: u8) -> Result<()> {
        let bus_num = extract_bus_number(bus)?;
        let feature = format!("0x{feature:02x}");
        let value = value.to_string();
        // --noverify skips the read-back confirmation, roughly halving
        // the write latency per keypress.
        let output = self.run(&[
            "--bus",
            &bus_num,
            "--noverify",
            "--sleep-multiplier",
            SLEEP_MULTIPLIER,
            "setvcp",
            &feature,
            &value,
        ])?;
        if !output.status.success() {
            return Err(classify_bus_failure(bus, &output));
        }
        debug!(bus, value, "ddcutil setvcp completed");
        Ok(())
    }
}

/// Extract the numeric bus number from an I2C bus path like `/dev/i2c-4`.
fn extract_bus_number(bus: &str) -> Result<String> {
    bus.rsplit("i2c-")
        .next()
        .filter(|num| !num.is_empty() && num.bytes().all(|b| b.is_ascii_digit()))
        .map(ToOwned::to_owned)
        .ok_or_else(|| BctlError::Actuator {
            bus: bus.to_string(),
            reason: "invalid I2C bus path".to_string(),
        })
}

/// Map a non-zero getvcp/setvcp exit onto the error taxonomy.
fn classify_bus_failure(bus: &str, output: &Output) -> BctlError {
    let stderr = stderr_excerpt(output);
    let lowered = stderr.to_lowercase();
    if lowered.contains("permission denied") || lowered.contains("errno 13") {
        return BctlError::PermissionDenied {
            bus: bus.to_string(),
        };
    }
    BctlError::Actuator {
        bus: bus.to_string(),
        reason: stderr,
    }
}

fn stderr_excerpt(output: &Output) -> String {
    let text = String::from_utf8_lossy(&output.stderr);
    let trimmed = text.trim();
    if trimmed.is_empty() {
        output.status.to_string()
    } else {
        trimmed.to_string()
    }
}
