use serde::{Deserialize, Serialize};

pub type Milliseconds = i64;

/// Width of the osu!mania playfield coordinate space.
pub const PLAYFIELD_WIDTH: f64 = 512.0;

/// Fixed y coordinate of every mania hit object.
pub const HIT_OBJECT_Y: i32 = 192;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum KeyMode {
    #[serde(rename = "4k")]
    Four,
    #[default]
    #[serde(rename = "6k")]
    Six,
}

impl KeyMode {
    pub fn num_lanes(self) -> usize {
        match self {
            KeyMode::Four => 4,
            KeyMode::Six => 6,
        }
    }

    /// Center of the column's slice of the 512 unit playfield, rounded to the
    /// nearest integer.
    pub fn column_x(self, column: u8) -> i32 {
        let width = PLAYFIELD_WIDTH / self.num_lanes() as f64;
        (column as f64 * width + width * 0.5).round() as i32
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct TempoMarker {
    pub time_ms: Milliseconds,
    pub ms_per_beat: f64,
    pub beats_per_measure: u32,
}

impl TempoMarker {
    pub fn from_bpm(time_ms: Milliseconds, bpm: f64, beats_per_measure: u32) -> Self {
        Self {
            time_ms,
            ms_per_beat: 60_000.0 / bpm,
            beats_per_measure,
        }
    }

    pub fn bpm(&self) -> f64 {
        60_000.0 / self.ms_per_beat
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct HitObject {
    pub column: u8,
    pub time_ms: Milliseconds,
    #[serde(flatten)]
    pub kind: HitObjectKind,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(tag = "type")]
pub enum HitObjectKind {
    #[serde(rename = "tap")]
    Tap,

    #[serde(rename = "hold")]
    Hold { end_time_ms: Milliseconds },
}

impl HitObjectKind {
    pub fn end_time_ms(&self) -> Option<Milliseconds> {
        match self {
            HitObjectKind::Tap => None,
            HitObjectKind::Hold { end_time_ms } => Some(*end_time_ms),
        }
    }

    /// osu! object type flag.
    pub fn type_flag(&self) -> u32 {
        match self {
            HitObjectKind::Tap => 1,
            HitObjectKind::Hold { .. } => 128,
        }
    }
}

impl HitObject {
    pub fn tap(column: u8, time_ms: Milliseconds) -> Self {
        Self {
            column,
            time_ms,
            kind: HitObjectKind::Tap,
        }
    }

    pub fn hold(column: u8, time_ms: Milliseconds, end_time_ms: Milliseconds) -> Self {
        Self {
            column,
            time_ms,
            kind: HitObjectKind::Hold { end_time_ms },
        }
    }

    pub fn is_hold(&self) -> bool {
        matches!(self.kind, HitObjectKind::Hold { .. })
    }
}

/// Converted chart in emission order. Markers and objects are never re-sorted.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct Timeline {
    pub key_mode: KeyMode,
    pub tempo_markers: Vec<TempoMarker>,
    pub hit_objects: Vec<HitObject>,
}
