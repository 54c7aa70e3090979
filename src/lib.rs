//! brightness-control library - DDC/CI brightness control with stable slot numbering.
//!
//! This library exposes the core functionality of the `brightness-control`
//! CLI for use in tests.
//!
//! # Modules
//!
//! - `ddc`: Trait seam over the external `ddcutil` tool, with a mock
//! - `monitor`: Display records, detect-output parsing, stable identities
//! - `slots`: Order-independent slot assignment and lookup
//! - `cache`: Time-bounded on-disk cache for the slot → bus mapping
//! - `brightness`: Step/clamp actuation over a resolved bus
//! - `error`: Error types with user-recoverable hints
#![forbid(unsafe_code)]

pub mod brightness;
pub mod cache;
pub mod cli;
pub mod ddc;
pub mod error;
pub mod logging;
pub mod monitor;
pub mod slots;
