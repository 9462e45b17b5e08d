use std::collections::BTreeSet;

use osu_schema::Timeline;

/// Prints one row per distinct event time: `N` tap, `H` hold head, `|` hold
/// body, `#` hold tail, `.` empty.
pub fn run_preview(timeline: &Timeline) -> anyhow::Result<()> {
    let lanes = timeline.key_mode.num_lanes();

    let mut time_points = BTreeSet::new();
    for obj in &timeline.hit_objects {
        time_points.insert(obj.time_ms);
        if let Some(end) = obj.kind.end_time_ms() {
            time_points.insert(end);
        }
    }
    for marker in &timeline.tempo_markers {
        time_points.insert(marker.time_ms);
    }

    if timeline.hit_objects.is_empty() {
        println!("Chart is empty.");
        return Ok(());
    }

    let header: Vec<String> = (0..lanes).map(|c| c.to_string()).collect();
    println!("Time(ms) | {} | Info", header.join(" "));
    println!("---------|-{}-|------------------", "-".repeat(lanes * 2 - 1));

    let mut holding = vec![false; lanes];
    for &t in &time_points {
        let mut info_parts = Vec::new();
        for marker in timeline.tempo_markers.iter().filter(|m| m.time_ms == t) {
            info_parts.push(format!("BPM: {:.1}", marker.bpm()));
        }

        let mut lane_chars: Vec<char> = holding
            .iter()
            .map(|&h| if h { '|' } else { '.' })
            .collect();

        for obj in &timeline.hit_objects {
            let col = obj.column as usize;
            if obj.time_ms == t {
                if obj.is_hold() {
                    lane_chars[col] = 'H';
                    holding[col] = true;
                } else {
                    lane_chars[col] = 'N';
                }
            }
            if obj.kind.end_time_ms() == Some(t) {
                lane_chars[col] = '#';
                holding[col] = false;
            }
        }

        let lane_str: Vec<String> = lane_chars.iter().map(char::to_string).collect();
        println!("{:8} | {} | {}", t, lane_str.join(" "), info_parts.join(", "));
    }

    Ok(())
}
