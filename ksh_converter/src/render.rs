use std::path::Path;

use osu_schema::{HitObject, HitObjectKind, TempoMarker, Timeline, HIT_OBJECT_Y};

use crate::parser::ChartMetadata;

const EVENT_COMMENTS: [&str; 8] = [
    "//Background and Video events",
    "//Break Periods",
    "//Storyboard Layer 0 (Background)",
    "//Storyboard Layer 1 (Fail)",
    "//Storyboard Layer 2 (Pass)",
    "//Storyboard Layer 3 (Foreground)",
    "//Storyboard Layer 4 (Overlay)",
    "//Storyboard Sound Samples",
];

/// Renders an osu!mania v14 beatmap. Markers and objects are written in the
/// order given.
pub fn render_osu(meta: &ChartMetadata, timeline: &Timeline) -> String {
    let keys = timeline.key_mode.num_lanes();

    let title = meta.get_or("title", "Untitled");
    let artist = meta.get_or("artist", "Unknown Artist");
    let creator = meta.get_or("effect", "ksh2osu");
    let difficulty = meta.get_or("difficulty", "converted");
    let level = meta.get_or("level", "");
    let version = format!("{difficulty} {level}");
    let audio = meta.audio_file().map_or("audio.ogg", base_name);
    let illustrator = meta.get_or("illustrator", "");
    let tags = format!("{illustrator} {keys}K KSH");

    let mut lines: Vec<String> = vec![
        "osu file format v14".into(),
        String::new(),
        "[General]".into(),
        format!("AudioFilename: {audio}"),
        "AudioLeadIn: 0".into(),
        "PreviewTime: -1".into(),
        "Countdown: 0".into(),
        "SampleSet: Normal".into(),
        "StackLeniency: 0.7".into(),
        "Mode: 3".into(),
        "LetterboxInBreaks: 0".into(),
        "SpecialStyle: 0".into(),
        "WidescreenStoryboard: 0".into(),
        String::new(),
        "[Editor]".into(),
        "DistanceSpacing: 1".into(),
        "BeatDivisor: 4".into(),
        "GridSize: 4".into(),
        "TimelineZoom: 1".into(),
        String::new(),
        "[Metadata]".into(),
        format!("Title:{title}"),
        format!("TitleUnicode:{title}"),
        format!("Artist:{artist}"),
        format!("ArtistUnicode:{artist}"),
        format!("Creator:{creator}"),
        format!("Version:{} {keys}K", version.trim()),
        "Source:".into(),
        format!("Tags:{}", tags.trim()),
        "BeatmapID:0".into(),
        "BeatmapSetID:-1".into(),
        String::new(),
        "[Difficulty]".into(),
        "HPDrainRate:7".into(),
        format!("CircleSize:{keys}"),
        "OverallDifficulty:8".into(),
        "ApproachRate:5".into(),
        "SliderMultiplier:1.4".into(),
        "SliderTickRate:1".into(),
        String::new(),
        "[Events]".into(),
    ];
    lines.extend(EVENT_COMMENTS.iter().map(|c| c.to_string()));
    if let Some(bg) = meta.non_empty("bg") {
        lines.push(format!("0,0,\"{}\",0,0", base_name(bg)));
    }

    lines.push(String::new());
    lines.push("[TimingPoints]".into());
    lines.extend(timeline.tempo_markers.iter().map(timing_point_line));

    lines.push(String::new());
    lines.push("[HitObjects]".into());
    lines.extend(
        timeline
            .hit_objects
            .iter()
            .map(|obj| hit_object_line(obj, timeline)),
    );

    lines.join("\n")
}

pub(crate) fn timing_point_line(marker: &TempoMarker) -> String {
    format!(
        "{},{:.6},{},1,0,100,1,0",
        marker.time_ms, marker.ms_per_beat, marker.beats_per_measure
    )
}

pub(crate) fn hit_object_line(obj: &HitObject, timeline: &Timeline) -> String {
    let x = timeline.key_mode.column_x(obj.column);
    let extras = match obj.kind {
        HitObjectKind::Tap => "0:0:0:0:".to_string(),
        HitObjectKind::Hold { end_time_ms } => format!("{end_time_ms}:0:0:0:0:"),
    };
    format!(
        "{x},{HIT_OBJECT_Y},{},{},0,{extras}",
        obj.time_ms,
        obj.kind.type_flag()
    )
}

fn base_name(path: &str) -> &str {
    Path::new(path)
        .file_name()
        .and_then(|n| n.to_str())
        .unwrap_or(path)
}
