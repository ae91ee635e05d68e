//! icad-tone-core - paging-tone extraction, matching, and segmentation CLI.
//!
//! Detects Quick-Call II, long, hi-low, and DTMF paging tones in recorded
//! radio traffic, matches them against a configured tone-profile catalog,
//! and produces trimmed, normalized audio segments for non-suppressed
//! matches.

#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]
#![allow(clippy::cast_possible_truncation)]
#![allow(clippy::cast_sign_loss)]
#![allow(clippy::cast_precision_loss)]
#![allow(clippy::cast_possible_wrap)]
#![allow(clippy::cast_lossless)]
#![allow(clippy::similar_names)]
#![allow(clippy::too_many_lines)]
#![allow(clippy::struct_excessive_bools)]
#![allow(clippy::uninlined_format_args)]
#![allow(clippy::needless_pass_by_value)]
#![allow(clippy::items_after_statements)]
#![allow(clippy::redundant_closure_for_method_calls)]
#![allow(clippy::map_unwrap_or)]
#![allow(clippy::trivially_copy_pass_by_ref)]
#![allow(clippy::match_same_arms)]
#![allow(clippy::wrong_self_convention)]
#![allow(clippy::struct_field_names)]
#![allow(clippy::enum_variant_names)]

mod cli;

use clap::Parser;
use cli::{Cli, Commands};
use std::process::Command;
use tracing::warn;
use tracing_subscriber::EnvFilter;

use cli::cooldown_cmd::CooldownOptions;
use cli::process::ProcessOptions;
use cli::profiles::ProfilesOptions;

/// Check if ffmpeg is available in PATH.
fn check_ffmpeg_available() -> bool {
    Command::new("ffmpeg")
        .arg("-version")
        .stdout(std::process::Stdio::null())
        .stderr(std::process::Stdio::null())
        .status()
        .map(|s| s.success())
        .unwrap_or(false)
}

/// Check runtime dependencies and warn if missing.
fn check_runtime_dependencies(quiet: bool) {
    if !check_ffmpeg_available() {
        if !quiet {
            eprintln!("Warning: ffmpeg not found in PATH");
            eprintln!("  Audio extraction, filtering, and loudness normalization will not be available.");
            eprintln!("  Install ffmpeg: apt install ffmpeg (Debian/Ubuntu)");
            eprintln!();
        }
        warn!("ffmpeg not found - segmenting and normalization disabled");
    }
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let args = Cli::parse();

    let filter = if args.verbose {
        EnvFilter::new("debug")
    } else if args.quiet {
        EnvFilter::new("error")
    } else {
        EnvFilter::new("info")
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .init();

    if matches!(args.command, Commands::Process { .. }) {
        check_runtime_dependencies(args.quiet);
    }

    match args.command {
        Commands::Process {
            file,
            scope,
            talkgroup,
            start_time,
            call_length,
            catalog,
            output,
        } => {
            cli::run_process(ProcessOptions {
                file,
                scope,
                talkgroup,
                start_time,
                call_length,
                catalog,
                output,
            })?;
        }
        Commands::Profiles { catalog, scope } => {
            cli::run_profiles(ProfilesOptions { catalog, scope })?;
        }
        Commands::Cooldown { scope } => {
            cli::run_cooldown(CooldownOptions { scope })?;
        }
    }

    Ok(())
}
