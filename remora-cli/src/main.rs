// remora-cli/src/main.rs
//
// Command-line interface for the Remora transcoding system. Parses
// arguments, configures logging, and dispatches to the core library.

mod cli;
mod commands;
mod local;

use clap::Parser;
use cli::{Cli, Commands};
use console::style;
use env_logger::Env;
use std::error::Error as _;
use std::process;

fn main() {
    let cli = Cli::parse();

    let default_filter = if cli.verbose { "debug" } else { "info" };
    env_logger::Builder::from_env(Env::default().default_filter_or(default_filter))
        .format_timestamp_secs()
        .init();

    let result = match cli.command {
        Commands::Encode {
            input,
            format,
            resolution,
            video_bitrate,
            watermark,
            options,
            no_progress,
        } => commands::run_encode(
            input,
            format,
            resolution,
            video_bitrate,
            watermark,
            options,
            no_progress,
        ),
        Commands::Replace { input, reference, format } => {
            commands::run_replace(input, reference, format)
        }
        Commands::Info { input } => commands::run_info(input),
    };

    if let Err(err) = result {
        eprintln!("{} {err}", style("Error:").red().bold());
        let mut cause = err.source();
        while let Some(inner) = cause {
            eprintln!("  caused by: {inner}");
            cause = inner.source();
        }
        process::exit(1);
    }
}
