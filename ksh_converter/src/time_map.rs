use osu_schema::Milliseconds;

use crate::parser::{parse_tempo, ChartMetadata};
use crate::ConvertWarning;

pub(crate) const DEFAULT_BPM: f64 = 120.0;
pub(crate) const DEFAULT_BEATS_PER_MEASURE: u32 = 4;
pub(crate) const MAX_OFFSET_MS: f64 = 30_000.0;

/// Tempo changes at or below this are not treated as changes.
pub(crate) const TEMPO_EPSILON: f64 = 0.001;

pub(crate) fn initial_bpm(meta: &ChartMetadata) -> f64 {
    meta.get("t").and_then(parse_tempo).unwrap_or(DEFAULT_BPM)
}

/// Chart offset `o` plus the caller's adjustment. Unparsable offsets are 0;
/// offsets beyond ±30s are replaced by 0 with a warning.
pub(crate) fn start_time_ms(
    meta: &ChartMetadata,
    adjust_ms: Milliseconds,
    warnings: &mut Vec<ConvertWarning>,
) -> Milliseconds {
    let raw = meta.get("o").unwrap_or("").trim();
    let mut offset = if raw.is_empty() {
        0.0
    } else {
        raw.parse::<f64>().unwrap_or_else(|_| {
            log::debug!("ignoring invalid offset value: {raw:?}");
            0.0
        })
    };
    if !offset.is_finite() {
        offset = 0.0;
    }
    if offset.abs() > MAX_OFFSET_MS {
        warnings.push(ConvertWarning::OffsetOutOfRange {
            offset_ms: offset,
            limit_ms: MAX_OFFSET_MS,
        });
        offset = 0.0;
    }
    (offset as Milliseconds).saturating_add(adjust_ms)
}

pub(crate) fn measure_duration_ms(bpm: f64, beats_per_measure: u32) -> f64 {
    60_000.0 / bpm * beats_per_measure as f64
}

/// Truncates toward zero, the rounding used for every emitted time.
pub(crate) fn to_ms(time: f64) -> Milliseconds {
    time as Milliseconds
}

/// Places the note rows of one measure evenly over its duration.
///
/// A tempo or signature change partway through starts a new segment: rows
/// before it keep their times, rows after it are spaced by the new duration.
#[derive(Debug, Clone)]
pub(crate) struct MeasureClock {
    rows: usize,
    segment_start: f64,
    segment_row: usize,
    segment_duration: f64,
}

impl MeasureClock {
    pub(crate) fn new(start: f64, duration: f64, rows: usize) -> Self {
        Self {
            rows,
            segment_start: start,
            segment_row: 0,
            segment_duration: duration,
        }
    }

    /// Time of row `row`, which may equal `rows` for the measure end.
    pub(crate) fn time_at(&self, row: usize) -> f64 {
        let step = self.segment_duration / self.rows as f64;
        self.segment_start + (row - self.segment_row) as f64 * step
    }

    pub(crate) fn rebase(&mut self, row: usize, duration: f64) {
        self.segment_start = self.time_at(row);
        self.segment_row = row;
        self.segment_duration = duration;
    }

    pub(crate) fn end_time(&self) -> f64 {
        let remaining = (self.rows - self.segment_row) as f64 / self.rows as f64;
        self.segment_start + self.segment_duration * remaining
    }
}
