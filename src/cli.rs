use clap::{ArgAction, Parser, Subcommand, ValueEnum};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Select messages from an MBOX archive with a boolean filter expression
#[derive(Parser)]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Path to a TOML configuration file
    #[arg(long, global = true, env = "MAILFILTER_CONFIG")]
    pub config: Option<PathBuf>,

    /// Output format for summaries (defaults to the config file, then text)
    #[arg(short = 'F', long, global = true, value_enum)]
    pub format: Option<OutputFormat>,

    /// When to use colors
    #[arg(long, global = true, value_enum, default_value_t = ColorMode::Auto)]
    pub color: ColorMode,

    /// Increase log verbosity (-v, -vv, -vvv)
    #[arg(short, long, global = true, action = ArgAction::Count)]
    pub verbose: u8,

    /// Only print errors
    #[arg(short, long, global = true)]
    pub quiet: bool,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Count how many messages match
    Count {
        /// MBOX archive to scan
        file: PathBuf,

        /// Filter expression, e.g. 'subject=~/invoice/i and from$=@example.org'
        filter: Option<String>,

        /// Group matching messages by the value of this field
        #[arg(long, value_name = "FIELD")]
        by: Option<String>,
    },
    /// Write matching messages verbatim, in archive order
    Extract {
        /// MBOX archive to scan
        file: PathBuf,

        /// Filter expression, e.g. 'subject=~/invoice/i and from$=@example.org'
        filter: Option<String>,

        /// Write messages to this file instead of stdout
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, ValueEnum, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    #[default]
    Text,
    Json,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum ColorMode {
    Auto,
    Always,
    Never,
}

pub fn cli_parse() -> Cli {
    Cli::parse()
}
