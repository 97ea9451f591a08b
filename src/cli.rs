use clap::{Parser, Subcommand, ValueEnum};

#[derive(Parser, Debug)]
#[command(name = "clipdeck")]
#[command(about = "A terminal clipboard history with pinned clips", long_about = None)]
#[command(version)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Option<Commands>,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Record clipboard history without the terminal UI (until Ctrl-C)
    Watch,
    /// Print pinned clips
    List {
        /// Only show clips containing this text (case-insensitive)
        #[arg(short, long)]
        search: Option<String>,
    },
    /// Save text as a pinned clip
    Pin { text: String },
    /// Delete a pinned clip by id prefix
    Delete {
        id: String,

        /// Skip the confirmation prompt
        #[arg(short, long)]
        yes: bool,
    },
    /// Turn trimming of leading/trailing whitespace on new clips on or off
    Trim { state: Toggle },
}

#[derive(ValueEnum, Debug, Clone, Copy, PartialEq, Eq)]
pub enum Toggle {
    On,
    Off,
}

impl Toggle {
    pub fn enabled(self) -> bool {
        self == Toggle::On
    }
}
