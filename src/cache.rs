//! Time-bounded on-disk cache for the slot → bus mapping.
//!
//! Detection through the external tool costs the better part of a second;
//! a keypress repeat rate is far faster than that. The last resolution is
//! therefore persisted as a small JSON document in the temp directory,
//! scoped by user, and served for `CACHE_TTL` before a fresh detection.
//!
//! The file is shared by independent short-lived processes (one per
//! keypress), with no locking: readers treat anything stale, missing, or
//! corrupt as a miss, and writers replace the file atomically via a
//! temp-file rename so readers never see a partial document. Two processes
//! racing on a miss both resolve and both write; the last writer wins and
//! either mapping is self-consistent.

use std::path::{Path, PathBuf};
use std::time::Instant;
use std::{env, fs};

use chrono::{DateTime, TimeDelta, Utc};
use serde::{Deserialize, Serialize};
use tempfile::NamedTempFile;
use tracing::{debug, warn};

use crate::ddc::Ddc;
use crate::error::Result;
use crate::monitor;
use crate::slots::SlotMapping;

/// How long a resolved mapping stays valid.
pub const CACHE_TTL_SECS: i64 = 60;

/// One persisted resolution. Replaced wholesale, never edited in place.
#[derive(Debug, Clone, Serialize, Deserialize)]
struct CacheEntry {
    created_at: DateTime<Utc>,
    mapping: SlotMapping,
}

/// The slot-mapping cache file and its TTL policy.
#[derive(Debug, Clone)]
pub struct BusCache {
    path: PathBuf,
    ttl: TimeDelta,
}

impl Default for BusCache {
    fn default() -> Self {
        Self {
            path: default_cache_path(),
            ttl: TimeDelta::seconds(CACHE_TTL_SECS),
        }
    }
}

impl BusCache {
    /// A cache at an explicit path with an explicit TTL (used by tests and
    /// anything embedding the library).
    #[must_use]
    pub fn at_path(path: impl Into<PathBuf>, ttl: TimeDelta) -> Self {
        Self {
            path: path.into(),
            ttl,
        }
    }

    /// Path of the cache file.
    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Return the current slot mapping, consulting the cache first.
    ///
    /// Serves the persisted mapping when the file is readable, parses, and
    /// was created less than the TTL before `now` (and `force_refresh` is
    /// off). Anything else — absent, stale, corrupt, or forced — runs the
    /// full enumerate → resolve pipeline and replaces the file.
    ///
    /// # Errors
    ///
    /// Fails only when a fresh detection is needed and the external tool
    /// fails; cache problems alone never surface.
    pub fn get_mapping(
        &self,
        ddc: &dyn Ddc,
        now: DateTime<Utc>,
        force_refresh: bool,
    ) -> Result<SlotMapping> {
        let started = Instant::now();
        if !force_refresh {
            if let Some(mapping) = self.read_fresh(now) {
                debug!(
                    elapsed_ms = started.elapsed().as_millis() as u64,
                    slots = mapping.len(),
                    "Cache hit"
                );
                return Ok(mapping);
            }
        }

        let records = monitor::enumerate(ddc)?;
        let mapping = SlotMapping::resolve(&records);
        if let Err(e) = self.store(&mapping, now) {
            // A lost cache write only costs the next invocation a re-detect.
            warn!(path = %self.path.display(), error = %e, "Failed to write slot cache");
        }
        debug!(
            elapsed_ms = started.elapsed().as_millis() as u64,
            slots = mapping.len(),
            "Fresh resolution"
        );
        Ok(mapping)
    }

    /// Read the cached mapping if it is valid at `now`; `None` otherwise.
    ///
    /// A missing, unreadable, or corrupt file is indistinguishable from a
    /// stale one by design: every failure mode degrades to a miss.
    #[must_use]
    pub fn read_fresh(&self, now: DateTime<Utc>) -> Option<SlotMapping> {
        let raw = fs::read_to_string(&self.path).ok()?;
        let entry: CacheEntry = match serde_json::from_str(&raw) {
            Ok(entry) => entry,
            Err(e) => {
                debug!(path = %self.path.display(), error = %e, "Discarding corrupt slot cache");
                return None;
            }
        };
        let age = now.signed_duration_since(entry.created_at);
        if age >= self.ttl {
            debug!(age_secs = age.num_seconds(), "Slot cache expired");
            return None;
        }
        Some(entry.mapping)
    }

    /// Persist a mapping with `created_at = now`, atomically.
    ///
    /// Writes the document to a temp file in the same directory and renames
    /// it into place, so concurrent readers observe either the old file or
    /// the new one, never a prefix.
    pub fn store(&self, mapping: &SlotMapping, now: DateTime<Utc>) -> Result<()> {
        let entry = CacheEntry {
            created_at: now,
            mapping: mapping.clone(),
        };
        let dir = self.path.parent().unwrap_or_else(|| Path::new("."));
        fs::create_dir_all(dir)?;
        let tmp = NamedTempFile::new_in(dir)?;
        serde_json::to_writer_pretty(tmp.as_file(), &entry)
            .map_err(|e| crate::error::BctlError::Other(format!("cache serialize: {e}")))?;
        tmp.persist(&self.path).map_err(|e| e.error)?;
        Ok(())
    }

    /// Delete the cache file; missing is fine.
    pub fn invalidate(&self) {
        if let Err(e) = fs::remove_file(&self.path) {
            if e.kind() != std::io::ErrorKind::NotFound {
                warn!(path = %self.path.display(), error = %e, "Failed to remove slot cache");
            }
        }
    }
}

/// Cache file location, scoped by user so users on one host do not collide.
/// Lives in the temp directory: survives process exits, not reboots.
fn default_cache_path() -> PathBuf {
    let user = env::var("USER").unwrap_or_else(|_| "unknown".to_string());
    env::temp_dir().join(format!("brightness-control-{user}-bus-cache.json"))
}
