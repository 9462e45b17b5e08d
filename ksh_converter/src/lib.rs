//! KSH (K-Shoot MANIA) chart to osu!mania beatmap conversion.

use std::{fs, path::Path};

use osu_schema::{KeyMode, Milliseconds, Timeline};

mod error;
mod generate;
mod hold;
mod lane;
mod parser;
mod render;
mod time_map;

pub use error::{ConvertError, ConvertWarning};
pub use lane::{column_pixel_x, map_lane, SourceLane};
pub use parser::{extract_metadata, ChartMetadata};
pub use render::render_osu;

use generate::TimelineBuilder;
use parser::{classify_line, split_lines};
use time_map::{initial_bpm, start_time_ms};

#[derive(Debug, Clone, Copy, Default)]
pub struct ConvertOptions {
    pub key_mode: KeyMode,
    /// Added to the chart's own offset.
    pub offset_ms: Milliseconds,
}

#[derive(Debug, Clone)]
pub struct Conversion {
    pub metadata: ChartMetadata,
    pub timeline: Timeline,
    pub warnings: Vec<ConvertWarning>,
}

impl Conversion {
    pub fn to_osu(&self) -> String {
        render_osu(&self.metadata, &self.timeline)
    }
}

pub fn convert_file(
    path: impl AsRef<Path>,
    options: &ConvertOptions,
) -> Result<Conversion, ConvertError> {
    let path = path.as_ref();
    let bytes = fs::read(path).map_err(|e| {
        ConvertError::new("E2001", format!("failed to read chart {}: {e}", path.display()))
            .with_file(path.display().to_string())
    })?;
    let src = String::from_utf8_lossy(&bytes);
    Ok(convert_str(&src, options))
}

/// Converts chart text. Malformed input never fails; it is converted on a
/// best-effort basis and anything worth reporting ends up in `warnings`.
pub fn convert_str(src: &str, options: &ConvertOptions) -> Conversion {
    let lines = split_lines(src);
    let (metadata, body_start) = extract_metadata(&lines);
    let body: Vec<_> = lines[body_start..]
        .iter()
        .map(|line| classify_line(line))
        .collect();

    let mut warnings = Vec::new();
    let start_ms = start_time_ms(&metadata, options.offset_ms, &mut warnings);
    let bpm = initial_bpm(&metadata);
    log::debug!(
        "building timeline: {} body lines, start={start_ms}ms, bpm={bpm}",
        body.len()
    );
    let timeline = TimelineBuilder::new(options.key_mode, bpm, start_ms).build(&body);

    Conversion {
        metadata,
        timeline,
        warnings,
    }
}
