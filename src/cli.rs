//! Command-line interface definitions.
//!
//! Lives in the library so `xtask` can generate the man page from the same
//! definitions the binary parses.

use std::path::PathBuf;
use std::sync::OnceLock;

use clap::{Args, Parser, Subcommand, ValueEnum};

use crate::bwf::TimeReferencePolicy;

/// Version string with git hash and build date.
pub fn long_version() -> &'static str {
    static VERSION: OnceLock<String> = OnceLock::new();
    VERSION.get_or_init(|| {
        let date = option_env!("MARKWAV_BUILD_DATE").unwrap_or("unknown");
        match option_env!("VERGEN_GIT_SHA") {
            Some(sha) if !sha.is_empty() && sha != "unknown" => {
                format!("{} ({} {})", env!("CARGO_PKG_VERSION"), sha, date)
            }
            _ => format!("{} ({})", env!("CARGO_PKG_VERSION"), date),
        }
    })
}

#[derive(Parser, Debug)]
#[command(name = "markwav")]
#[command(version, long_version = long_version())]
#[command(about = "Convert CSV timecode logs into Broadcast Wave marker files")]
#[command(
    long_about = "Convert CSV timecode logs into Broadcast Wave marker files.\n\n\
    Each CSV row becomes a cue point in a silent WAV file. Import the file into \
    your DAW to get the markers on its timeline.\n\n\
    Accepted time formats: seconds (12.5), MM:SS, HH:MM:SS and HH:MM:SS:FF."
)]
pub struct Cli {
    /// Increase log verbosity (-v info, -vv debug). MARKWAV_LOG overrides.
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Convert one or more CSV logs into WAV marker files
    #[command(long_about = "Convert one or more CSV logs into WAV marker files.\n\n\
    The time column is detected from the header (time, timecode, tc, smpte, \
    timestamp) unless given with --time-column. Without --label, every other \
    column contributes to the marker name.\n\n\
    EXAMPLES:\n    \
    markwav convert log.csv\n    \
    markwav convert log.csv -o markers.wav --fps 25 -l Scene -l Take\n    \
    markwav convert day1.csv day2.csv -o exports/\n    \
    markwav convert log.csv -o - > markers.wav")]
    Convert(ConvertArgs),

    /// Show the columns of a CSV log and what would be detected
    Columns {
        /// CSV file to examine
        file: PathBuf,
    },

    /// List the cue markers stored in a WAV file
    Inspect {
        /// WAV file to read
        file: PathBuf,
        /// Print JSON instead of a table
        #[arg(long)]
        json: bool,
        /// Frame rate used to display positions as timecode
        #[arg(long, default_value_t = 30.0)]
        fps: f64,
    },

    /// Manage the configuration file
    #[command(subcommand)]
    Config(ConfigCommands),

    /// Generate shell completions
    Completions {
        /// Target shell
        #[arg(value_enum)]
        shell: clap_complete::Shell,
    },
}

#[derive(Args, Debug, Clone)]
pub struct ConvertArgs {
    /// CSV log file(s)
    #[arg(required = true)]
    pub inputs: Vec<PathBuf>,

    /// Output file, `-` for stdout, or a directory when converting several logs
    #[arg(short, long)]
    pub output: Option<PathBuf>,

    /// Frame rate for HH:MM:SS:FF timecodes (detected when omitted)
    #[arg(long)]
    pub fps: Option<f64>,

    /// Column holding the marker times
    #[arg(short, long)]
    pub time_column: Option<String>,

    /// Column(s) joined into the marker name (repeatable or comma-separated)
    #[arg(short, long = "label", value_delimiter = ',')]
    pub labels: Vec<String>,

    /// Write a file even when no row has a usable time
    #[arg(long)]
    pub allow_empty: bool,

    /// Skip the configured import hook
    #[arg(long)]
    pub no_hook: bool,

    /// What to write into the BWF TimeReference field
    #[arg(long, value_enum)]
    pub time_reference: Option<TimeReferenceArg>,

    /// Refuse timelines longer than this many seconds
    #[arg(long)]
    pub max_duration: Option<u64>,
}

#[derive(Subcommand, Debug)]
pub enum ConfigCommands {
    /// Print the effective configuration as TOML
    Show,
    /// Print the configuration file path
    Path,
    /// Write a configuration file with default settings
    Init {
        /// Overwrite an existing file
        #[arg(long)]
        force: bool,
    },
}

#[derive(ValueEnum, Debug, Clone, Copy, PartialEq, Eq)]
pub enum TimeReferenceArg {
    /// Always 0: the file starts at timeline zero
    Zero,
    /// The session start hour of the earliest marker
    SessionStart,
}

impl From<TimeReferenceArg> for TimeReferencePolicy {
    fn from(arg: TimeReferenceArg) -> Self {
        match arg {
            TimeReferenceArg::Zero => TimeReferencePolicy::Zero,
            TimeReferenceArg::SessionStart => TimeReferencePolicy::SessionStart,
        }
    }
}
