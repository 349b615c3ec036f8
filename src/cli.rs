use clap::{Parser, Subcommand, ValueEnum};
use std::path::PathBuf;
use strum::Display;

/// driver-selection - per-app graphics driver overrides
#[derive(Parser)]
#[command(name = "driver-selection")]
#[command(about = "Manage which graphics driver each application loads")]
#[command(version)]
pub struct Cli {
    /// Path to a JSON configuration file
    #[arg(short, long, global = true)]
    pub config: Option<PathBuf>,

    /// Settings store directory (overrides the config file)
    #[arg(short, long, global = true)]
    pub store: Option<PathBuf>,

    /// Log at debug level unless RUST_LOG says otherwise
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Load the store and apply predetermined defaults
    Init {
        /// Packages predetermined to use ANGLE (comma-separated)
        #[arg(long, value_delimiter = ',')]
        angle: Vec<String>,
        /// Packages predetermined to use the native driver (comma-separated)
        #[arg(long, value_delimiter = ',')]
        native: Vec<String>,
    },
    /// Print the driver a package will load
    Get {
        /// Package name (e.g., com.example.game)
        package: String,
    },
    /// Select a driver for a package ("default" removes the override)
    Set {
        /// Package name
        package: String,
        /// Driver value (default, native, angle, ...)
        value: String,
    },
    /// List all overrides
    List,
    /// Remove all overrides
    Reset,
    /// Show or change the driver-in-use notice flag
    Notice {
        /// New state; omit to print the current one
        state: Option<Toggle>,
    },
    /// Reset every driver selection setting to factory state
    ClearAll,
    /// Resync on SIGHUP until SIGINT/SIGTERM
    Watch,
    /// Tell a running watcher that the selection keys changed
    Notify {
        /// Process id of the watcher
        pid: i32,
    },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum, Display)]
#[strum(serialize_all = "lowercase")]
pub enum Toggle {
    On,
    Off,
}

impl From<bool> for Toggle {
    fn from(on: bool) -> Self {
        if on { Self::On } else { Self::Off }
    }
}

impl Cli {
    pub fn parse_args() -> Self {
        <Self as clap::Parser>::parse()
    }
}
