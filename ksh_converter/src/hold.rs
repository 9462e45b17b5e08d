use osu_schema::{HitObject, KeyMode, Milliseconds};

use crate::lane::{map_lane, SourceLane};
use crate::parser::NoteRow;

/// What a single chart character asks for on its column.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum CellAction {
    Tap,
    Hold,
    Empty,
    Ignore,
}

impl CellAction {
    /// Buttons: `1` tap, `2` hold.
    pub(crate) fn for_button(ch: char) -> Self {
        match ch {
            '1' => Self::Tap,
            '2' => Self::Hold,
            '0' | ' ' => Self::Empty,
            _ => Self::Ignore,
        }
    }

    /// Effects use the opposite digits: `2` tap, `1` hold.
    pub(crate) fn for_effect(ch: char) -> Self {
        match ch {
            '2' => Self::Tap,
            '1' => Self::Hold,
            '0' | ' ' => Self::Empty,
            _ => Self::Ignore,
        }
    }

    pub(crate) fn for_lane(lane: SourceLane, ch: char) -> Self {
        match lane {
            SourceLane::Button(_) => Self::for_button(ch),
            SourceLane::Effect(_) => Self::for_effect(ch),
        }
    }
}

/// Iterates the present characters of a row with their source lanes, buttons
/// first.
pub(crate) fn row_cells(row: &NoteRow) -> impl Iterator<Item = (SourceLane, char)> + '_ {
    let buttons = row
        .buttons
        .iter()
        .enumerate()
        .filter_map(|(i, ch)| ch.map(|ch| (SourceLane::Button(i), ch)));
    let effects = row
        .effects
        .iter()
        .enumerate()
        .filter_map(|(i, ch)| ch.map(|ch| (SourceLane::Effect(i), ch)));
    buttons.chain(effects)
}

/// Start time of the open hold on each destination column.
#[derive(Debug, Clone)]
pub(crate) struct HoldTable {
    open: Vec<Option<Milliseconds>>,
}

impl HoldTable {
    pub(crate) fn new(mode: KeyMode) -> Self {
        Self {
            open: vec![None; mode.num_lanes()],
        }
    }

    pub(crate) fn is_open(&self, column: u8) -> bool {
        self.open[column as usize].is_some()
    }

    pub(crate) fn open(&mut self, column: u8, time_ms: Milliseconds) {
        let slot = &mut self.open[column as usize];
        if slot.is_none() {
            *slot = Some(time_ms);
        }
    }

    /// Closes the hold on `column`, if any, as a hold object ending at `end_ms`.
    pub(crate) fn close(&mut self, column: u8, end_ms: Milliseconds) -> Option<HitObject> {
        let start = self.open[column as usize].take()?;
        Some(HitObject::hold(column, start, end_ms.max(start)))
    }

    /// Closes every open hold in column order.
    pub(crate) fn drain(&mut self, end_ms: Milliseconds) -> Vec<HitObject> {
        (0..self.open.len() as u8)
            .filter_map(|column| self.close(column, end_ms))
            .collect()
    }

    pub(crate) fn is_empty(&self) -> bool {
        self.open.iter().all(Option::is_none)
    }
}

/// Applies one character to its column and appends the resulting objects.
pub(crate) fn apply_cell(
    holds: &mut HoldTable,
    out: &mut Vec<HitObject>,
    column: u8,
    action: CellAction,
    time_ms: Milliseconds,
) {
    match action {
        CellAction::Tap => {
            out.extend(holds.close(column, time_ms));
            out.push(HitObject::tap(column, time_ms));
        }
        CellAction::Hold => holds.open(column, time_ms),
        CellAction::Empty => out.extend(holds.close(column, time_ms)),
        CellAction::Ignore => {}
    }
}

/// At a measure boundary, ends every open hold whose column is empty on the
/// first row of the next measure. Holds continued by that row stay open.
pub(crate) fn resolve_measure_boundary(
    holds: &mut HoldTable,
    out: &mut Vec<HitObject>,
    mode: KeyMode,
    next_row: &NoteRow,
    boundary_ms: Milliseconds,
) {
    for (lane, ch) in row_cells(next_row) {
        let Some(column) = map_lane(mode, lane) else {
            continue;
        };
        if holds.is_open(column) && CellAction::for_lane(lane, ch) == CellAction::Empty {
            out.extend(holds.close(column, boundary_ms));
        }
    }
}
