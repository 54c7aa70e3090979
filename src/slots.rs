//! Slot assignment: stable, order-independent numbering for monitors.
//!
//! Slots are what the keybinding layer addresses ("monitor 1 up"), so they
//! must come out identical no matter what order the external tool happened
//! to report displays in. Ranking by stable id gives that; bus address only
//! breaks ties between physically identical panels.

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::{BctlError, Result};
use crate::monitor::DisplayRecord;

/// One resolved slot: the rank, the identity it was ranked by, and the
/// bus address valid for this resolution.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SlotEntry {
    /// 1-based slot number.
    pub slot: u32,
    /// Stable identity, possibly `-bus<N>`-suffixed to disambiguate twins.
    pub stable_id: String,
    /// I2C bus path for this resolution only.
    pub bus: String,
}

/// An ordered slot → identity → bus mapping from one resolution pass.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SlotMapping {
    entries: Vec<SlotEntry>,
}

impl SlotMapping {
    /// Assign slot numbers to a set of freshly enumerated displays.
    ///
    /// Sorts by stable id ascending (plain byte order), bus address breaking
    /// ties, then numbers the result 1..N. Two panels with identical EDID
    /// identity get a `-bus<N>` suffix on the later one so the surfaced
    /// identities stay distinct.
    #[must_use]
    pub fn resolve(records: &[DisplayRecord]) -> Self {
        let mut keyed: Vec<(String, &DisplayRecord)> = records
            .iter()
            .map(|record| (record.stable_id(), record))
            .collect();
        keyed.sort_by(|a, b| (&a.0, bus_rank(&a.1.bus)).cmp(&(&b.0, bus_rank(&b.1.bus))));

        let mut entries = Vec::with_capacity(keyed.len());
        let mut previous_id: Option<String> = None;
        for (index, (mut stable_id, record)) in keyed.into_iter().enumerate() {
            if previous_id.as_deref() == Some(stable_id.as_str()) {
                stable_id = format!("{stable_id}-bus{}", bus_suffix(&record.bus));
            } else {
                previous_id = Some(stable_id.clone());
            }
            entries.push(SlotEntry {
                slot: u32::try_from(index).unwrap_or(u32::MAX).saturating_add(1),
                stable_id,
                bus: record.bus.clone(),
            });
        }
        debug!(slots = entries.len(), "Resolved slot mapping");
        Self { entries }
    }

    /// Look up the entry for a slot number.
    ///
    /// # Errors
    ///
    /// Fails with an unknown-slot error for slot 0 or slot > N.
    pub fn lookup(&self, slot: u32) -> Result<&SlotEntry> {
        let max = u32::try_from(self.entries.len()).unwrap_or(u32::MAX);
        if slot == 0 || slot > max {
            return Err(BctlError::UnknownSlot { slot, max });
        }
        Ok(&self.entries[(slot - 1) as usize])
    }

    /// Entries in slot order.
    #[must_use]
    pub fn entries(&self) -> &[SlotEntry] {
        &self.entries
    }

    /// Number of slots.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// True when no monitors were resolved.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// Trailing bus number for dedup suffixes; falls back to the whole path.
fn bus_suffix(bus: &str) -> &str {
    bus.rsplit('-').next().unwrap_or(bus)
}

/// Tie-break key for identical stable ids: bus number ascending, so
/// `/dev/i2c-9` sorts before `/dev/i2c-10`. Unparsable paths rank last,
/// falling back to the lexicographic path.
fn bus_rank(bus: &str) -> (u32, &str) {
    (bus_suffix(bus).parse().unwrap_or(u32::MAX), bus)
}
