use std::collections::BTreeMap;

use serde::Serialize;

pub(crate) const MEASURE_DELIMITER: &str = "--";

const BOM: char = '\u{feff}';

/// Header key/value pairs of a chart. No key is required; readers fall back
/// to their own defaults.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct ChartMetadata {
    fields: BTreeMap<String, String>,
}

impl ChartMetadata {
    pub fn get(&self, key: &str) -> Option<&str> {
        self.fields.get(key).map(String::as_str)
    }

    pub fn get_or<'a>(&'a self, key: &str, default: &'a str) -> &'a str {
        self.get(key).unwrap_or(default)
    }

    /// Value of `key` if present and non-empty.
    pub fn non_empty(&self, key: &str) -> Option<&str> {
        self.get(key).filter(|v| !v.is_empty())
    }

    /// First entry of the `m` key. KSH allows `a.ogg;a_f.ogg`.
    pub fn audio_file(&self) -> Option<&str> {
        self.non_empty("m")
            .and_then(|m| m.split(';').next())
            .map(str::trim)
            .filter(|m| !m.is_empty())
    }

    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.fields.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    pub(crate) fn insert(&mut self, key: String, value: String) {
        self.fields.insert(key, value);
    }
}

impl FromIterator<(String, String)> for ChartMetadata {
    fn from_iter<I: IntoIterator<Item = (String, String)>>(iter: I) -> Self {
        Self {
            fields: iter.into_iter().collect(),
        }
    }
}

/// Splits chart text into lines. `\n`, `\r\n` and a bare `\r` all end a line;
/// a trailing terminator does not start an extra empty line.
pub(crate) fn split_lines(src: &str) -> Vec<&str> {
    let mut lines: Vec<&str> = src
        .split('\n')
        .flat_map(|line| line.strip_suffix('\r').unwrap_or(line).split('\r'))
        .collect();
    if lines.last().is_some_and(|line| line.is_empty()) {
        lines.pop();
    }
    lines
}

/// Reads the header up to the first measure delimiter. Returns the metadata
/// and the index of the first body line (`lines.len()` if there is no
/// delimiter).
pub fn extract_metadata<S: AsRef<str>>(lines: &[S]) -> (ChartMetadata, usize) {
    let mut meta = ChartMetadata::default();
    let mut first_key = true;

    for (i, raw_line) in lines.iter().enumerate() {
        let line = raw_line.as_ref().trim();
        if line == MEASURE_DELIMITER {
            return (meta, i + 1);
        }
        if line.is_empty() || is_comment(line) {
            continue;
        }
        let Some((key, value)) = line.split_once('=') else {
            continue;
        };

        let mut key = key.trim();
        if first_key {
            key = key.trim_start_matches(BOM);
            first_key = false;
        }
        if key.is_empty() {
            log::debug!("skipping header line with empty key: {line}");
            continue;
        }
        meta.insert(key.to_string(), value.trim().to_string());
    }

    (meta, lines.len())
}

fn is_comment(line: &str) -> bool {
    line.starts_with('#') || line.starts_with("//")
}

/// One classified line of the chart body.
#[derive(Debug, Clone, PartialEq)]
pub(crate) enum ChartLine {
    Delimiter,
    Blank,
    Tempo(f64),
    Beat(u32),
    /// Control lines the note layout has no use for (`fx-l=`, `zoom_top=`,
    /// malformed `t=`, ...) and comments.
    Ignored,
    Note(NoteRow),
}

/// Characters of a note-data line. Only the first four button and first two
/// effect characters are kept; a short segment leaves trailing slots `None`.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub(crate) struct NoteRow {
    pub(crate) buttons: [Option<char>; 4],
    pub(crate) effects: [Option<char>; 2],
}

impl NoteRow {
    pub(crate) fn parse(line: &str) -> Self {
        let mut parts = line.split('|');
        let mut row = NoteRow::default();
        fill(&mut row.buttons, parts.next().unwrap_or(""));
        fill(&mut row.effects, parts.next().unwrap_or(""));
        row
    }
}

fn fill(slots: &mut [Option<char>], segment: &str) {
    for (slot, ch) in slots.iter_mut().zip(segment.chars()) {
        *slot = Some(ch);
    }
}

pub(crate) fn classify_line(raw_line: &str) -> ChartLine {
    let line = raw_line.trim();
    if line.is_empty() {
        return ChartLine::Blank;
    }
    if line == MEASURE_DELIMITER {
        return ChartLine::Delimiter;
    }
    if line.starts_with("//") {
        return ChartLine::Ignored;
    }

    if let Some((key, value)) = line.split_once('=') {
        return match key {
            "t" => parse_tempo(value).map_or(ChartLine::Ignored, ChartLine::Tempo),
            "beat" => parse_beat(value).map_or(ChartLine::Ignored, ChartLine::Beat),
            _ => ChartLine::Ignored,
        };
    }

    if line.contains('|') {
        return ChartLine::Note(NoteRow::parse(line));
    }
    ChartLine::Ignored
}

/// Positive, finite tempo. The header form may be a display range such as
/// `120-240`, in which case the first number is used.
pub(crate) fn parse_tempo(value: &str) -> Option<f64> {
    let value = value.trim();
    let bpm = value.parse::<f64>().ok().or_else(|| {
        let (first, _) = value.split_once('-')?;
        first.trim().parse::<f64>().ok()
    });
    match bpm {
        Some(bpm) if bpm.is_finite() && bpm > 0.0 => Some(bpm),
        _ => {
            log::debug!("ignoring invalid tempo value: {value:?}");
            None
        }
    }
}

/// Beats per measure from `4` or `4/4`; only the numerator counts.
pub(crate) fn parse_beat(value: &str) -> Option<u32> {
    let numerator = value.split('/').next().unwrap_or("").trim();
    match numerator.parse::<u32>() {
        Ok(n) if n > 0 => Some(n),
        _ => {
            log::debug!("ignoring invalid beat value: {value:?}");
            None
        }
    }
}

/// Splits classified body lines into measures. A trailing segment with no
/// closing delimiter only counts if it holds something other than blank lines.
pub(crate) fn split_measures(body: &[ChartLine]) -> Vec<&[ChartLine]> {
    let mut measures = Vec::new();
    let mut start = 0;
    for (i, line) in body.iter().enumerate() {
        if *line == ChartLine::Delimiter {
            measures.push(&body[start..i]);
            start = i + 1;
        }
    }
    let tail = &body[start..];
    if tail.iter().any(|l| *l != ChartLine::Blank) {
        measures.push(tail);
    }
    measures
}

pub(crate) fn first_note_row(measure: &[ChartLine]) -> Option<&NoteRow> {
    measure.iter().find_map(|line| match line {
        ChartLine::Note(row) => Some(row),
        _ => None,
    })
}
