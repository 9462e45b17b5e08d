use osu_schema::{HitObject, KeyMode, Milliseconds, TempoMarker, Timeline};

use crate::hold::{apply_cell, resolve_measure_boundary, row_cells, CellAction, HoldTable};
use crate::lane::map_lane;
use crate::parser::{first_note_row, split_measures, ChartLine, NoteRow};
use crate::time_map::{
    measure_duration_ms, to_ms, MeasureClock, DEFAULT_BEATS_PER_MEASURE, TEMPO_EPSILON,
};

/// Walks the chart body measure by measure, keeping tempo, signature, the
/// absolute time and the open holds of every column.
#[derive(Debug)]
pub(crate) struct TimelineBuilder {
    mode: KeyMode,
    bpm: f64,
    beats_per_measure: u32,
    time: f64,
    holds: HoldTable,
    tempo_markers: Vec<TempoMarker>,
    hit_objects: Vec<HitObject>,
}

impl TimelineBuilder {
    pub(crate) fn new(mode: KeyMode, bpm: f64, start_ms: Milliseconds) -> Self {
        Self {
            mode,
            bpm,
            beats_per_measure: DEFAULT_BEATS_PER_MEASURE,
            time: start_ms as f64,
            holds: HoldTable::new(mode),
            tempo_markers: vec![TempoMarker::from_bpm(
                start_ms,
                bpm,
                DEFAULT_BEATS_PER_MEASURE,
            )],
            hit_objects: Vec::new(),
        }
    }

    pub(crate) fn build(mut self, body: &[ChartLine]) -> Timeline {
        let measures = split_measures(body);
        for (idx, measure) in measures.iter().enumerate() {
            let next_row = measures.get(idx + 1).and_then(|m| first_note_row(m));
            self.process_measure(measure, next_row);
        }
        self.finish()
    }

    fn measure_duration(&self) -> f64 {
        measure_duration_ms(self.bpm, self.beats_per_measure)
    }

    /// Returns true if the tempo actually changed.
    fn change_tempo(&mut self, bpm: f64, at: f64) -> bool {
        if (bpm - self.bpm).abs() <= TEMPO_EPSILON {
            return false;
        }
        self.bpm = bpm;
        self.tempo_markers
            .push(TempoMarker::from_bpm(to_ms(at), bpm, self.beats_per_measure));
        true
    }

    fn process_measure(&mut self, measure: &[ChartLine], next_row: Option<&NoteRow>) {
        let rows = measure
            .iter()
            .filter(|l| matches!(l, ChartLine::Note(_)))
            .count();
        let measure_start = self.time;

        if rows == 0 {
            for line in measure {
                match line {
                    ChartLine::Tempo(bpm) => {
                        self.change_tempo(*bpm, measure_start);
                    }
                    ChartLine::Beat(beats) => self.beats_per_measure = *beats,
                    _ => {}
                }
            }
            self.time = measure_start + self.measure_duration();
            return;
        }

        let mut clock = MeasureClock::new(measure_start, self.measure_duration(), rows);
        let mut row_idx = 0;
        for line in measure {
            match line {
                ChartLine::Tempo(bpm) => {
                    if self.change_tempo(*bpm, clock.time_at(row_idx)) {
                        clock.rebase(row_idx, self.measure_duration());
                    }
                }
                ChartLine::Beat(beats) => {
                    self.beats_per_measure = *beats;
                    clock.rebase(row_idx, self.measure_duration());
                }
                ChartLine::Note(row) => {
                    self.apply_row(row, to_ms(clock.time_at(row_idx)));
                    row_idx += 1;
                }
                ChartLine::Delimiter | ChartLine::Blank | ChartLine::Ignored => {}
            }
        }

        let measure_end = clock.end_time();
        if let Some(next_row) = next_row {
            resolve_measure_boundary(
                &mut self.holds,
                &mut self.hit_objects,
                self.mode,
                next_row,
                to_ms(measure_end),
            );
        }
        self.time = measure_end;
    }

    fn apply_row(&mut self, row: &NoteRow, time_ms: Milliseconds) {
        for (lane, ch) in row_cells(row) {
            let Some(column) = map_lane(self.mode, lane) else {
                continue;
            };
            let action = CellAction::for_lane(lane, ch);
            apply_cell(&mut self.holds, &mut self.hit_objects, column, action, time_ms);
        }
    }

    fn finish(mut self) -> Timeline {
        let end_ms = to_ms(self.time);
        let closed = self.holds.drain(end_ms);
        self.hit_objects.extend(closed);
        debug_assert!(self.holds.is_empty());

        Timeline {
            key_mode: self.mode,
            tempo_markers: self.tempo_markers,
            hit_objects: self.hit_objects,
        }
    }
}
