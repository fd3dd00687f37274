use clap::{Parser, Subcommand};
use std::path::PathBuf;

#[derive(Parser)]
#[command(
    author,
    version,
    about = "Remora: attachment transcoding tool",
    long_about = "Transcodes media files in place by driving external encoder \
                  binaries, with progress reporting and atomic replacement."
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Enable verbose logging
    #[arg(short, long, help = "Enable detailed logging output")]
    pub verbose: bool,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Encode a media file in place to a target format
    Encode {
        /// Input file, replaced by the encoded result on success
        #[arg(value_name = "INPUT")]
        input: PathBuf,

        /// Target container format
        #[arg(short, long, default_value = "mp4")]
        format: String,

        /// Output resolution as WIDTHxHEIGHT, or "same" to copy the source
        #[arg(short, long, value_name = "RES")]
        resolution: Option<String>,

        /// Video bitrate such as 1500k, or "same" to copy the source
        #[arg(short = 'b', long, value_name = "RATE")]
        video_bitrate: Option<String>,

        /// Watermark image overlaid on the output
        #[arg(long, value_name = "IMAGE")]
        watermark: Option<PathBuf>,

        /// JSON file holding a full option bag; flags override its values
        #[arg(long, value_name = "FILE")]
        options: Option<PathBuf>,

        /// Disable the progress bar
        #[arg(long)]
        no_progress: bool,
    },

    /// Run the content-replacement pipeline against a media file
    Replace {
        /// Input file, replaced by the remuxed result on success
        #[arg(value_name = "INPUT")]
        input: PathBuf,

        /// Reference file handed to the replacement tool
        #[arg(short = 'w', long = "with", value_name = "REFERENCE")]
        reference: PathBuf,

        /// Target container format
        #[arg(short, long, default_value = "mp4")]
        format: String,
    },

    /// Probe a media file and print its properties
    Info {
        /// File to probe
        #[arg(value_name = "INPUT")]
        input: PathBuf,
    },
}
