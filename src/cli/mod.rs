use clap::{Parser, Subcommand};
use std::path::PathBuf;

pub mod cooldown_cmd;
pub mod process;
pub mod profiles;

pub use cooldown_cmd::run_cooldown;
pub use process::run_process;
pub use profiles::run_profiles;

#[derive(Parser)]
#[command(name = "icad-tone-core")]
#[command(author, version, about = "Paging-tone extraction and matching engine")]
#[command(long_about = "Detects Quick-Call II, long, hi-low, and DTMF paging tones in \
    recorded radio traffic, matches them against a configured tone-profile catalog, \
    and produces trimmed, normalized audio segments for non-suppressed matches.")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Enable verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Suppress non-essential output
    #[arg(short, long, global = true)]
    pub quiet: bool,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Run the detection pipeline against a single audio file
    Process {
        /// Path to the audio file (mp3, wav, or m4a)
        #[arg(short, long)]
        file: PathBuf,

        /// Stream scope (e.g. the radio system's short name)
        #[arg(short, long)]
        scope: String,

        /// Talkgroup ID the call was recorded on
        #[arg(short, long, default_value = "0")]
        talkgroup: u64,

        /// Unix timestamp the call started at
        #[arg(long, default_value = "0")]
        start_time: i64,

        /// Call length in seconds
        #[arg(long, default_value = "0")]
        call_length: f64,

        /// Path to the TOML profile catalog
        #[arg(long)]
        catalog: PathBuf,

        /// Directory to write segmented artifacts to
        #[arg(short, long, default_value = ".")]
        output: PathBuf,
    },

    /// List the tone profiles configured for a stream scope
    Profiles {
        /// Path to the TOML profile catalog
        #[arg(long)]
        catalog: PathBuf,

        /// Stream scope to list profiles for
        #[arg(short, long)]
        scope: String,
    },

    /// Print the current cooldown snapshot for a stream scope
    Cooldown {
        /// Stream scope to inspect
        #[arg(short, long)]
        scope: String,
    },
}
