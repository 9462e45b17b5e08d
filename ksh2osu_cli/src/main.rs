use std::{
    io::Write,
    path::{Path, PathBuf},
};

use anyhow::Context;
use clap::{Args, Parser, Subcommand};
use ksh_converter::{ChartMetadata, Conversion, ConvertOptions};
use osu_schema::{KeyMode, Timeline};
use serde::Serialize;

mod package;
mod preview;

#[derive(Debug, Parser)]
#[command(name = "ksh2osu")]
#[command(about = "Convert KSH charts to osu!mania beatmaps", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Convert a chart into an .osz package (or a bare .osu file)
    Convert {
        input: PathBuf,
        #[arg(short, long)]
        output: Option<PathBuf>,
        #[command(flatten)]
        mode: ModeArgs,
    },
    /// Print the converted timeline as JSON
    Inspect {
        input: PathBuf,
        #[command(flatten)]
        mode: ModeArgs,
    },
    /// Print a column grid of the converted timeline
    Preview {
        input: PathBuf,
        #[command(flatten)]
        mode: ModeArgs,
    },
}

#[derive(Debug, Args)]
struct ModeArgs {
    /// Convert to 4K, dropping FX lanes
    #[arg(long = "4k", conflicts_with = "six_key")]
    four_key: bool,
    /// Convert to 6K (default)
    #[arg(long = "6k")]
    six_key: bool,
    /// Offset adjustment in milliseconds, added to the chart offset
    #[arg(long, default_value_t = 0, allow_negative_numbers = true)]
    offset: i64,
}

impl ModeArgs {
    fn options(&self) -> ConvertOptions {
        ConvertOptions {
            key_mode: if self.four_key && !self.six_key {
                KeyMode::Four
            } else {
                KeyMode::Six
            },
            offset_ms: self.offset,
        }
    }
}

#[derive(Serialize)]
struct InspectReport<'a> {
    metadata: &'a ChartMetadata,
    timeline: &'a Timeline,
    warnings: Vec<String>,
}

fn main() -> anyhow::Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();
    let cli = Cli::parse();

    match cli.command {
        Command::Convert {
            input,
            output,
            mode,
        } => convert(&input, output, &mode.options())?,
        Command::Inspect { input, mode } => {
            let conversion = load(&input, &mode.options())?;
            let report = InspectReport {
                metadata: &conversion.metadata,
                timeline: &conversion.timeline,
                warnings: conversion.warnings.iter().map(ToString::to_string).collect(),
            };
            let json =
                serde_json::to_string_pretty(&report).context("failed to serialize timeline")?;
            println!("{json}");
        }
        Command::Preview { input, mode } => {
            let conversion = load(&input, &mode.options())?;
            preview::run_preview(&conversion.timeline)?;
        }
    }

    Ok(())
}

fn load(input: &Path, options: &ConvertOptions) -> anyhow::Result<Conversion> {
    let conversion = ksh_converter::convert_file(input, options)
        .with_context(|| format!("conversion failed: {}", input.display()))?;
    for warning in &conversion.warnings {
        log::warn!("{warning}");
    }
    Ok(conversion)
}

fn convert(input: &Path, output: Option<PathBuf>, options: &ConvertOptions) -> anyhow::Result<()> {
    log::info!("Converting {}...", input.display());
    log::info!("Mode: {}K", options.key_mode.num_lanes());
    if options.offset_ms != 0 {
        log::info!("Offset: {}ms", options.offset_ms);
    }

    let conversion = load(input, options)?;
    let osu = conversion.to_osu();
    let out_path = output.unwrap_or_else(|| default_output_path(input));

    if is_osu_path(&out_path) {
        package::write_atomically(&out_path, |mut file| {
            file.write_all(osu.as_bytes())?;
            Ok(())
        })
        .with_context(|| format!("failed to write: {}", out_path.display()))?;
    } else {
        let chart_dir = input.parent().unwrap_or_else(|| Path::new("."));
        let report = package::build_osz(
            &out_path,
            &osu_entry_name(input),
            &osu,
            &conversion.metadata,
            chart_dir,
        )
        .with_context(|| format!("failed to write: {}", out_path.display()))?;
        log::debug!(
            "packaged {} media files, skipped {}",
            report.added.len(),
            report.skipped.len()
        );
    }
    log::info!("Created {}", out_path.display());

    print_song_info(&conversion.metadata);
    Ok(())
}

fn print_song_info(meta: &ChartMetadata) {
    println!();
    println!("Song Information:");
    println!("  Title: {}", meta.get_or("title", "Unknown"));
    println!("  Artist: {}", meta.get_or("artist", "Unknown"));
    println!(
        "  Difficulty: {} {}",
        meta.get_or("difficulty", "Unknown"),
        meta.get_or("level", "")
    );
    println!("  BPM: {}", meta.get_or("t", "120"));
    println!("  Offset: {}ms", meta.get_or("o", "0"));
}

fn is_osu_path(path: &Path) -> bool {
    path.extension()
        .is_some_and(|ext| ext.eq_ignore_ascii_case("osu"))
}

fn default_output_path(input: &Path) -> PathBuf {
    input.with_extension("osz")
}

fn osu_entry_name(input: &Path) -> String {
    let stem = input
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_else(|| "chart".to_string());
    format!("{stem} (converted).osu")
}
