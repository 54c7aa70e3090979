//! Monitor records and stable identity derivation.
//!
//! A monitor's I2C bus number can change across reboots and cable shuffles,
//! so nothing durable may key off it. Identity is instead derived from the
//! EDID fields (manufacturer, model, serial), which stay put for a given
//! physical panel.

mod parse;

pub use parse::parse_detect;

use tracing::debug;

use crate::ddc::Ddc;
use crate::error::Result;

/// A monitor as reported by one detection pass.
///
/// Produced fresh on every enumeration and never mutated; the cache
/// persists derived slot entries, not these records.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DisplayRecord {
    /// I2C bus path, e.g. `/dev/i2c-4`. Valid only until the topology changes.
    pub bus: String,
    /// EDID manufacturer id, e.g. `DEL`.
    pub manufacturer: String,
    /// EDID model name, e.g. `U2720Q`.
    pub model: String,
    /// EDID serial number. May be empty on cheap panels.
    pub serial: String,
}

impl DisplayRecord {
    /// Derive the stable identity string for this monitor.
    ///
    /// Deterministic in (manufacturer, model, serial) alone; detection order
    /// and bus address never influence it. An empty serial still yields a
    /// usable id, just one that cannot distinguish two identical panels.
    #[must_use]
    pub fn stable_id(&self) -> String {
        format!(
            "{}-{}-{}",
            normalize(&self.manufacturer),
            normalize(&self.model),
            normalize(&self.serial)
        )
    }
}

/// Lower-case a field and fold anything path-unsafe into `-`.
fn normalize(field: &str) -> String {
    let mut out = String::with_capacity(field.len());
    let mut last_dash = true;
    for ch in field.chars() {
        if ch.is_ascii_alphanumeric() {
            out.push(ch.to_ascii_lowercase());
            last_dash = false;
        } else if !last_dash {
            out.push('-');
            last_dash = true;
        }
    }
    while out.ends_with('-') {
        out.pop();
    }
    out
}

/// Run detection through the external tool and parse its output.
///
/// Records come back in whatever order the tool reports them; callers must
/// not rely on that order (slot assignment sorts by stable id).
pub fn enumerate(ddc: &dyn Ddc) -> Result<Vec<DisplayRecord>> {
    let raw = ddc.detect()?;
    let records = parse_detect(&raw)?;
    debug!(count = records.len(), "Enumerated displays");
    Ok(records)
}
