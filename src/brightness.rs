//! Brightness actuation: read the current VCP value, step or set, clamp,
//! and write back only when something actually changes.

use tracing::{debug, info};

use crate::ddc::{Ddc, VCP_BRIGHTNESS};
use crate::error::{BctlError, Result};

/// Step applied per `up`/`down` keypress.
pub const BRIGHTNESS_STEP: u8 = 10;

/// Hard ceiling for brightness; the tool's reported max lowers it, never
/// raises it.
const BRIGHTNESS_LIMIT: u8 = 100;

/// Requested brightness change.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Adjustment {
    /// One step brighter.
    Up,
    /// One step dimmer.
    Down,
    /// Absolute target, 0-100.
    Set(u8),
}

/// Current and maximum value reported by a getvcp read.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct VcpReading {
    pub current: u8,
    pub max: u8,
}

/// Apply an adjustment to the monitor on `bus` and return the new value.
///
/// The write is skipped when the clamped target equals the current value,
/// so `up` at the ceiling (or `down` at zero) is a successful no-op rather
/// than a redundant bus transaction.
///
/// # Errors
///
/// Fails when the bus no longer responds, when the getvcp output cannot be
/// parsed, or when an absolute target exceeds 100.
pub fn adjust(ddc: &dyn Ddc, bus: &str, adjustment: Adjustment) -> Result<u8> {
    if let Adjustment::Set(value) = adjustment {
        if value > BRIGHTNESS_LIMIT {
            return Err(BctlError::InvalidBrightness {
                value: u32::from(value),
            });
        }
    }

    let raw = ddc.get_vcp(bus, VCP_BRIGHTNESS)?;
    let reading = parse_vcp(&raw, bus)?;
    let ceiling = reading.max.min(BRIGHTNESS_LIMIT);

    let target = match adjustment {
        Adjustment::Up => reading.current.saturating_add(BRIGHTNESS_STEP),
        Adjustment::Down => reading.current.saturating_sub(BRIGHTNESS_STEP),
        Adjustment::Set(value) => value,
    }
    .min(ceiling);

    if target == reading.current {
        debug!(bus, value = target, "Brightness already at target, skipping write");
        return Ok(target);
    }

    ddc.set_vcp(bus, VCP_BRIGHTNESS, target)?;
    info!(bus, from = reading.current, to = target, "Brightness changed");
    Ok(target)
}

/// Parse a getvcp reply like
/// `VCP code 0x10 (Brightness): current value =    80, max value =   100`.
///
/// A missing max defaults to 100; a missing current value is an actuator
/// failure, since there is nothing safe to step from.
pub fn parse_vcp(output: &str, bus: &str) -> Result<VcpReading> {
    let current = field_value(output, "current value").ok_or_else(|| BctlError::Actuator {
        bus: bus.to_string(),
        reason: format!("unparsable getvcp output: {}", output.trim()),
    })?;
    let max = field_value(output, "max value").unwrap_or(u32::from(BRIGHTNESS_LIMIT));
    Ok(VcpReading {
        current: clamp_u8(current),
        max: clamp_u8(max),
    })
}

/// Extract the integer following `<label> =` in tool output.
fn field_value(output: &str, label: &str) -> Option<u32> {
    let start = output.find(label)? + label.len();
    let rest = output[start..].trim_start().strip_prefix('=')?;
    let digits: String = rest
        .trim_start()
        .chars()
        .take_while(char::is_ascii_digit)
        .collect();
    digits.parse().ok()
}

fn clamp_u8(value: u32) -> u8 {
    u8::try_from(value.min(u32::from(u8::MAX))).unwrap_or(u8::MAX)
}
