//! Command-line argument parsing.

use std::path::PathBuf;

use clap::Parser;

/// Look up sunrise/sunset for a coordinate and get reminded five minutes
/// before each.
#[derive(Parser, Debug, Clone, PartialEq)]
#[command(name = "sunalert", version, about)]
pub struct Cli {
    /// Coordinates to look up right away, as "lat,lon" (e.g. "40.7128,-74.0060").
    /// Put `--` before a negative latitude: `sunalert -- -33.87,151.21`
    #[arg(value_name = "COORDS")]
    pub coords: Option<String>,

    /// Print the sun times once and exit without scheduling alerts
    #[arg(long)]
    pub once: bool,

    /// Reject latitudes outside [-90, 90] and longitudes outside [-180, 180]
    #[arg(long)]
    pub strict: bool,

    /// Read settings from this file instead of the user config directory
    #[arg(long, value_name = "PATH")]
    pub config: Option<PathBuf>,

    /// Enable detailed debug output
    #[arg(short, long)]
    pub debug: bool,
}

/// What the binary should do after parsing.
#[derive(Debug, Clone, PartialEq)]
pub enum CliAction {
    /// Interactive session, optionally starting with a lookup.
    Run { initial: Option<String> },
    /// Single lookup without alerts.
    Once { coords: Option<String> },
}

impl Cli {
    /// `--once` prints only the result unless debug output was requested.
    pub fn quiet(&self) -> bool {
        self.once && !self.debug
    }

    pub fn action(&self) -> CliAction {
        if self.once {
            CliAction::Once {
                coords: self.coords.clone(),
            }
        } else {
            CliAction::Run {
                initial: self.coords.clone(),
            }
        }
    }
}
