use osu_schema::KeyMode;

/// A source lane of the chart format.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SourceLane {
    /// BT-A..BT-D, index 0..=3.
    Button(usize),
    /// FX-L (0) and FX-R (1).
    Effect(usize),
}

/// Destination column for a source lane, or `None` when the lane is dropped.
///
/// 4K keeps the buttons only. 6K puts FX-L and FX-R on the outer columns and
/// the buttons on columns 1..=4. Button indices clamp to the last button
/// column; every effect index other than 0 is FX-R.
pub fn map_lane(mode: KeyMode, lane: SourceLane) -> Option<u8> {
    match (mode, lane) {
        (KeyMode::Four, SourceLane::Effect(_)) => None,
        (KeyMode::Four, SourceLane::Button(idx)) => Some(idx.min(3) as u8),
        (KeyMode::Six, SourceLane::Effect(0)) => Some(0),
        (KeyMode::Six, SourceLane::Effect(_)) => Some(5),
        (KeyMode::Six, SourceLane::Button(idx)) => Some(1 + idx.min(3) as u8),
    }
}

pub fn column_pixel_x(mode: KeyMode, column: u8) -> i32 {
    mode.column_x(column)
}
