//! brightness-control - adjust external monitor brightness from a keybinding.
//!
//! Thin dispatcher: resolve the requested slot through the cache, actuate,
//! print, exit. All the interesting work lives in the `bctl` library.
#![forbid(unsafe_code)]

use std::io::{self, IsTerminal};

use clap::Parser;
use colored::Colorize;
use serde::Serialize;

use bctl::brightness::{self, Adjustment};
use bctl::cache::BusCache;
use bctl::cli::Cli;
use bctl::ddc::{Ddc, DdcProcess};
use bctl::error::{BctlError, Result};
use bctl::logging;

fn main() {
    let cli = Cli::parse();

    // Handle no-color flag or non-TTY
    if cli.no_color || !io::stdout().is_terminal() {
        colored::control::set_override(false);
    }

    logging::init_logging(cli.verbose, cli.quiet);

    if let Err(e) = run(&cli) {
        output_error(&cli, &e);
        std::process::exit(1);
    }
}

fn run(cli: &Cli) -> Result<()> {
    let ddc = DdcProcess::new();
    let cache = BusCache::default();

    if cli.detect {
        return cmd_detect(cli, &ddc, &cache);
    }
    if let (Some(slot), Some(adjustment)) = (cli.monitor, cli.action()) {
        return cmd_adjust(cli, &ddc, &cache, slot, adjustment);
    }
    print_quick_start();
    Ok(())
}

// === Detect ===

/// Force a fresh resolution and print the slot table. The only place
/// stable identities are surfaced to the user.
fn cmd_detect(cli: &Cli, ddc: &dyn Ddc, cache: &BusCache) -> Result<()> {
    // Drop the old mapping up front: if the forced detection fails, a
    // stale file must not keep serving a pre-topology-change mapping.
    cache.invalidate();
    let mapping = cache.get_mapping(ddc, chrono::Utc::now(), true)?;

    if cli.json {
        println!("{}", serde_json::to_string_pretty(mapping.entries())
            .map_err(|e| BctlError::Other(format!("serialize slot table: {e}")))?);
        return Ok(());
    }

    if mapping.is_empty() {
        println!("No DDC/CI monitors detected.");
        return Ok(());
    }

    println!(
        "{:<6} {:<40} {}",
        "SLOT".bold(),
        "IDENTITY".bold(),
        "BUS".bold()
    );
    for entry in mapping.entries() {
        println!("{:<6} {:<40} {}", entry.slot, entry.stable_id, entry.bus);
    }
    Ok(())
}

// === Adjust ===

#[derive(Serialize)]
struct AdjustReport<'a> {
    slot: u32,
    stable_id: &'a str,
    bus: &'a str,
    brightness: u8,
}

fn cmd_adjust(
    cli: &Cli,
    ddc: &dyn Ddc,
    cache: &BusCache,
    slot: u32,
    adjustment: Adjustment,
) -> Result<()> {
    let mapping = cache.get_mapping(ddc, chrono::Utc::now(), false)?;
    if mapping.is_empty() {
        return Err(BctlError::NoMonitorsFound);
    }
    // An unknown slot propagates as-is: the user's next keypress after a
    // --detect is the retry mechanism.
    let entry = mapping.lookup(slot)?.clone();
    let value = brightness::adjust(ddc, &entry.bus, adjustment)?;

    if cli.json {
        let report = AdjustReport {
            slot: entry.slot,
            stable_id: &entry.stable_id,
            bus: &entry.bus,
            brightness: value,
        };
        println!("{}", serde_json::to_string(&report)
            .map_err(|e| BctlError::Other(format!("serialize report: {e}")))?);
    } else if !cli.quiet {
        println!("{}: {}%", entry.stable_id, value.to_string().bold());
    }
    Ok(())
}

// === Shared output helpers ===

fn print_quick_start() {
    println!("{}", "brightness-control".bold());
    println!("Adjust external monitor brightness over DDC/CI.\n");
    println!("  {}   list monitors and their slot numbers", "brightness-control --detect".cyan());
    println!("  {}  step slot 1 brighter", "brightness-control -m 1 -a up".cyan());
    println!("  {}  step slot 2 dimmer", "brightness-control -m 2 -a down".cyan());
    println!("  {}  set slot 1 to 40%", "brightness-control -m 1 --set 40".cyan());
    println!("\nSlots are stable across invocations while the same monitors stay");
    println!("connected. See --help for all options.");
}

#[derive(Serialize)]
struct ErrorReport<'a> {
    error: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    suggestion: Option<&'a str>,
}

fn output_error(cli: &Cli, error: &BctlError) {
    if cli.json {
        let report = ErrorReport {
            error: error.to_string(),
            suggestion: error.suggestion(),
        };
        if let Ok(json) = serde_json::to_string(&report) {
            eprintln!("{json}");
        } else {
            eprintln!("{{\"error\":\"{error}\"}}");
        }
        return;
    }

    eprintln!("{} {error}", "error:".red().bold());
    if let Some(suggestion) = error.suggestion() {
        eprintln!("{} {suggestion}", "hint:".yellow());
    }
}
