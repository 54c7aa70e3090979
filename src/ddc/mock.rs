//! Mock DDC tool implementation for unit testing.
//!
//! Records every invocation and serves canned `ddcutil`-shaped output, so
//! the real parsers run against realistic text without hardware.
//!
//! # Example
//!
//! ```rust,ignore
//! use bctl::ddc::mock::{MockDdc, Operation};
//! use bctl::ddc::{Ddc, VCP_BRIGHTNESS};
//!
//! let mock = MockDdc::two_monitors();
//! mock.set_vcp("/dev/i2c-4", VCP_BRIGHTNESS, 60).unwrap();
//! assert_eq!(mock.set_calls(), 1);
//! ```

use std::collections::HashMap;
use std::sync::Mutex;

use tracing::trace;

use super::Ddc;
use crate::error::{BctlError, Result};

/// Recorded operation for assertions.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Operation {
    Detect,
    GetVcp { bus: String, feature: u8 },
    SetVcp { bus: String, feature: u8, value: u8 },
}

/// Per-bus VCP state held by the mock.
#[derive(Debug, Clone, Copy)]
struct VcpState {
    current: u8,
    max: u8,
}

/// Mock DDC tool for testing without monitors.
///
/// Serves a fixed detect transcript, tracks per-bus brightness, and
/// supports one-shot error injection for failure-path tests.
#[derive(Default)]
pub struct MockDdc {
    detect_output: String,
    vcp: Mutex<HashMap<String, VcpState>>,
    operation_log: Mutex<Vec<Operation>>,
    error_injection: Mutex<Option<BctlError>>,
}

impl MockDdc {
    /// Create a mock with the given detect transcript.
    #[must_use]
    pub fn new(detect_output: impl Into<String>) -> Self {
        Self {
            detect_output: detect_output.into(),
            ..Default::default()
        }
    }

    /// A mock mirroring a common desk setup: a Dell and an LG monitor,
    /// with the LG reported first to exercise order independence.
    #[must_use]
    pub fn two_monitors() -> Self {
        let mock = Self::new(
            "Display 1\n\
             \x20  I2C bus:  /dev/i2c-5\n\
             \x20  EDID synopsis:\n\
             \x20     Mfg id:               GSM\n\
             \x20     Model:                LG 27GN950\n\
             \x20     Serial number:        XYZ789\n\
             \x20  VCP version:         2.1\n\
             Display 2\n\
             \x20  I2C bus:  /dev/i2c-4\n\
             \x20  EDID synopsis:\n\
             \x20     Mfg id:               DEL\n\
             \x20     Model:                U2720Q\n\
             \x20     Serial number:        ABC123\n\
             \x20  VCP version:         2.1\n",
        );
        mock.set_brightness("/dev/i2c-4", 50, 100);
        mock.set_brightness("/dev/i2c-5", 50, 100);
        mock
    }

    /// Seed the brightness state for a bus.
    pub fn set_brightness(&self, bus: &str, current: u8, max: u8) {
        self.vcp
            .lock()
            .expect("vcp lock poisoned")
            .insert(bus.to_string(), VcpState { current, max });
    }

    /// Current brightness the mock holds for a bus, if seeded.
    #[must_use]
    pub fn brightness(&self, bus: &str) -> Option<u8> {
        self.vcp
            .lock()
            .expect("vcp lock poisoned")
            .get(bus)
            .map(|state| state.current)
    }

    /// Inject an error to be returned by the next operation.
    pub fn inject_error(&self, error: BctlError) {
        *self.error_injection.lock().expect("error lock poisoned") = Some(error);
    }

    /// All operations performed so far, in order.
    #[must_use]
    pub fn operations(&self) -> Vec<Operation> {
        self.operation_log
            .lock()
            .expect("operation log poisoned")
            .clone()
    }

    /// Number of detect invocations.
    #[must_use]
    pub fn detect_calls(&self) -> usize {
        self.operations()
            .iter()
            .filter(|op| matches!(op, Operation::Detect))
            .count()
    }

    /// Number of `set_vcp` invocations.
    #[must_use]
    pub fn set_calls(&self) -> usize {
        self.operations()
            .iter()
            .filter(|op| matches!(op, Operation::SetVcp { .. }))
            .count()
    }

    /// Assert the exact sequence of operations performed.
    ///
    /// # Panics
    ///
    /// Panics with a diff-style message when the log differs.
    pub fn assert_operations(&self, expected: &[Operation]) {
        let actual = self.operations();
        assert_eq!(
            actual, expected,
            "operation log mismatch:\n actual: {actual:?}\n expected: {expected:?}"
        );
    }

    fn record(&self, op: Operation) {
        trace!(?op, "Mock DDC operation");
        self.operation_log
            .lock()
            .expect("operation log poisoned")
            .push(op);
    }

    fn take_injected_error(&self) -> Option<BctlError> {
        self.error_injection
            .lock()
            .expect("error lock poisoned")
            .take()
    }
}

impl Ddc for MockDdc {
    fn detect(&self) -> Result<String> {
        self.record(Operation::Detect);
        if let Some(err) = self.take_injected_error() {
            return Err(err);
        }
        Ok(self.detect_output.clone())
    }

    fn get_vcp(&self, bus: &str, feature: u8) -> Result<String> {
        self.record(Operation::GetVcp {
            bus: bus.to_string(),
            feature,
        });
        if let Some(err) = self.take_injected_error() {
            return Err(err);
        }
        let state = self
            .vcp
            .lock()
            .expect("vcp lock poisoned")
            .get(bus)
            .copied()
            .ok_or_else(|| BctlError::Actuator {
                bus: bus.to_string(),
                reason: "No monitor detected on bus".to_string(),
            })?;
        Ok(format!(
            "VCP code 0x{feature:02x} (Brightness                    ): current value = {:5}, max value = {:5}\n",
            state.current, state.max
        ))
    }

    fn set_vcp(&self, bus: &str, feature: u8, value: u8) -> Result<()> {
        self.record(Operation::SetVcp {
            bus: bus.to_string(),
            feature,
            value,
        });
        if let Some(err) = self.take_injected_error() {
            return Err(err);
        }
        let mut vcp = self.vcp.lock().expect("vcp lock poisoned");
        let state = vcp.get_mut(bus).ok_or_else(|| BctlError::Actuator {
            bus: bus.to_string(),
            reason: "No monitor detected on bus".to_string(),
        })?;
        state.current = value;
        Ok(())
    }
}
