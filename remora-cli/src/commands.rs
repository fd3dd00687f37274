//! Subcommand implementations over the core library.

use crate::local::LocalFile;
use console::style;
use indicatif::{ProgressBar, ProgressStyle};
use remora_core::{
    NullHost, ProgressSpec, RawOptions, ReplacementRef, Watermark, WatermarkPosition,
};
use std::error::Error;
use std::fs;
use std::path::PathBuf;
use std::sync::Arc;

pub fn run_encode(
    input: PathBuf,
    format: String,
    resolution: Option<String>,
    video_bitrate: Option<String>,
    watermark: Option<PathBuf>,
    options_file: Option<PathBuf>,
    no_progress: bool,
) -> Result<(), Box<dyn Error>> {
    let mut raw = load_options(options_file)?;

    if let Some(spec) = resolution {
        raw.resolution = Some(spec.parse()?);
    }
    if let Some(spec) = video_bitrate {
        raw.video_bitrate = Some(spec.parse()?);
    }
    if let Some(path) = watermark {
        raw.watermark = Some(Watermark {
            path,
            position: WatermarkPosition::default(),
            margin: 10,
        });
    }

    let bar = if no_progress {
        None
    } else {
        let bar = ProgressBar::new(100);
        bar.set_style(ProgressStyle::default_bar());
        let sink_bar = bar.clone();
        raw.progress = ProgressSpec::Sink(Arc::new(move |fraction: f32| {
            sink_bar.set_position((fraction * 100.0).round() as u64);
        }));
        Some(bar)
    };

    let mut uploader = LocalFile::open(input.clone())?;
    let result = remora_core::encode_video(&mut uploader, &NullHost, &format, raw);
    if let Some(bar) = bar {
        bar.finish_and_clear();
    }
    result?;

    println!(
        "{} {} re-encoded as {}",
        style("Done:").green().bold(),
        input.display(),
        format
    );
    Ok(())
}

pub fn run_replace(
    input: PathBuf,
    reference: PathBuf,
    format: String,
) -> Result<(), Box<dyn Error>> {
    let raw = RawOptions {
        replacement: Some(ReplacementRef::Path(reference)),
        ..RawOptions::default()
    };

    let mut uploader = LocalFile::open(input.clone())?;
    remora_core::replace_video(&mut uploader, &NullHost, &format, raw)?;

    println!("{} {} replaced", style("Done:").green().bold(), input.display());
    Ok(())
}

pub fn run_info(input: PathBuf) -> Result<(), Box<dyn Error>> {
    let probe = remora_core::probe(&input)?;

    println!("{}", style(input.display().to_string()).bold());
    println!("  resolution:  {}x{}", probe.width, probe.height);
    match probe.video_bitrate_kbps {
        Some(kbps) => println!("  bitrate:     {kbps} kbit/s"),
        None => println!("  bitrate:     unknown"),
    }
    match probe.duration_secs {
        Some(secs) => println!(
            "  duration:    {}",
            remora_core::format_duration_seconds(secs)
        ),
        None => println!("  duration:    unknown"),
    }
    Ok(())
}

fn load_options(path: Option<PathBuf>) -> Result<RawOptions, Box<dyn Error>> {
    let Some(path) = path else {
        return Ok(RawOptions::default());
    };
    let contents = fs::read_to_string(&path)
        .map_err(|e| format!("could not read options file {}: {e}", path.display()))?;
    let raw = serde_json::from_str(&contents)
        .map_err(|e| format!("could not parse options file {}: {e}", path.display()))?;
    Ok(raw)
}
