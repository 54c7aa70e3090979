//! CLI argument definitions.
//!
//! The surface is flag-based rather than subcommand-based because the
//! primary caller is a keybinding, not a human: `-m 1 -a up` must stay
//! short enough to live inside a GNOME custom-shortcut command string.

use clap::{ArgAction, Parser, ValueEnum};

use crate::brightness::Adjustment;

/// Adjust external monitor brightness over DDC/CI, addressing monitors by
/// stable slot number instead of raw I2C bus address.
#[derive(Parser, Debug)]
#[command(name = "brightness-control", version, about, long_about = None)]
#[command(group(clap::ArgGroup::new("action").args(["adjust", "set"])))]
pub struct Cli {
    /// Monitor slot number (1-based; run --detect to list slots)
    #[arg(short = 'm', long = "monitor", value_name = "SLOT", requires = "action")]
    pub monitor: Option<u32>,

    /// Relative brightness adjustment
    #[arg(
        short = 'a',
        long = "adjust",
        value_enum,
        requires = "monitor",
        conflicts_with = "set"
    )]
    pub adjust: Option<Direction>,

    /// Absolute brightness target (0-100)
    #[arg(
        long,
        value_name = "VALUE",
        value_parser = clap::value_parser!(u8).range(0..=100),
        requires = "monitor"
    )]
    pub set: Option<u8>,

    /// Force a fresh detection and print the resolved slot table
    #[arg(long, conflicts_with_all = ["monitor", "adjust", "set"])]
    pub detect: bool,

    /// JSON output for scripts
    #[arg(long)]
    pub json: bool,

    /// Verbose output (-v debug, -vv trace)
    #[arg(short = 'v', long, action = ArgAction::Count)]
    pub verbose: u8,

    /// Quiet mode (suppress non-essential output)
    #[arg(short = 'q', long)]
    pub quiet: bool,

    /// Disable colored output
    #[arg(long, env = "NO_COLOR")]
    pub no_color: bool,
}

impl Cli {
    /// The requested brightness action, if any.
    #[must_use]
    pub fn action(&self) -> Option<Adjustment> {
        if let Some(direction) = self.adjust {
            return Some(direction.into());
        }
        self.set.map(Adjustment::Set)
    }
}

/// Direction for relative adjustment.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum Direction {
    /// One step brighter
    Up,
    /// One step dimmer
    Down,
}

impl From<Direction> for Adjustment {
    fn from(direction: Direction) -> Self {
        match direction {
            Direction::Up => Self::Up,
            Direction::Down => Self::Down,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn cli_definition_is_consistent() {
        Cli::command().debug_assert();
    }

    #[test]
    fn parses_keybinding_invocation() {
        let cli = Cli::parse_from(["brightness-control", "-m", "1", "-a", "up"]);
        assert_eq!(cli.monitor, Some(1));
        assert_eq!(cli.action(), Some(Adjustment::Up));
    }

    #[test]
    fn parses_absolute_set() {
        let cli = Cli::parse_from(["brightness-control", "-m", "2", "--set", "40"]);
        assert_eq!(cli.action(), Some(Adjustment::Set(40)));
    }

    #[test]
    fn rejects_set_above_100() {
        let result = Cli::try_parse_from(["brightness-control", "-m", "1", "--set", "150"]);
        assert!(result.is_err());
    }

    #[test]
    fn adjust_without_monitor_is_rejected() {
        let result = Cli::try_parse_from(["brightness-control", "-a", "up"]);
        assert!(result.is_err());
    }

    #[test]
    fn monitor_without_an_action_is_rejected() {
        let result = Cli::try_parse_from(["brightness-control", "-m", "1"]);
        assert!(result.is_err());
    }

    #[test]
    fn detect_conflicts_with_adjustment() {
        let result = Cli::try_parse_from(["brightness-control", "--detect", "-m", "1"]);
        assert!(result.is_err());
    }
}
