//! Turns raw segment fragments into an ordered, densely numbered timeline.
//!
//! Only the batch parse can fail. Everything after it is total: unparsable
//! timestamps pass through, out-of-range ones are corrected or clamped, and an
//! empty batch becomes a single segment covering the whole asset.

use serde::Deserialize;

use crate::{
    format::{correct_timestamp, format_seconds, parse_timestamp},
    types::Segment,
};

/// Segment as the model sends it. Its sequence number is ignored.
#[derive(Deserialize)]
struct RawSegment {
    start: String,
    end: String,
    #[serde(default)]
    script: String,
}

/// A fragment is one segment object or an array of them.
#[derive(Deserialize)]
#[serde(untagged)]
enum Fragment {
    One(RawSegment),
    Many(Vec<RawSegment>),
}

impl Fragment {
    fn into_raw(self) -> Vec<RawSegment> {
        match self {
            Fragment::One(raw) => vec![raw],
            Fragment::Many(raws) => raws,
        }
    }
}

/// Join every fragment into one JSON array and parse it as a whole.
///
/// A single malformed fragment fails the batch.
pub fn parse_fragments(fragments: &[String]) -> serde_json::Result<Vec<Segment>> {
    let document = format!("[ {} ]", fragments.join(","));
    let parsed: Vec<Fragment> = serde_json::from_str(&document)?;

    Ok(parsed
        .into_iter()
        .flat_map(Fragment::into_raw)
        .map(|raw| Segment {
            sequence_number: 0,
            start: raw.start,
            end: raw.end,
            script: raw.script,
        })
        .collect())
}

pub fn fallback_segment(script: &str, length_in_seconds: u32) -> Segment {
    Segment {
        sequence_number: 0,
        start: "00:00:00".to_string(),
        end: format_seconds(length_in_seconds),
        script: script.to_string(),
    }
}

pub fn repair_timestamps(segments: &mut [Segment], length_in_seconds: u32) {
    for segment in segments {
        segment.start = correct_timestamp(&segment.start, length_in_seconds);
        segment.end = correct_timestamp(&segment.end, length_in_seconds);
    }
}

/// Stable sort by start time, then number segments by position.
/// Starts that do not parse sort as `00:00:00`.
pub fn sort_and_sequence(segments: &mut [Segment]) {
    segments.sort_by_key(|s| parse_timestamp(&s.start).unwrap_or(0));
    for (i, segment) in segments.iter_mut().enumerate() {
        segment.sequence_number = i;
    }
}

/// Fallback, repair, sort and renumber already parsed segments.
pub fn finalize_segments(
    mut segments: Vec<Segment>,
    fallback_script: &str,
    length_in_seconds: u32,
) -> Vec<Segment> {
    if segments.is_empty() {
        segments.push(fallback_segment(fallback_script, length_in_seconds));
    }
    repair_timestamps(&mut segments, length_in_seconds);
    sort_and_sequence(&mut segments);
    segments
}

pub fn assemble_timeline(
    fragments: &[String],
    fallback_script: &str,
    length_in_seconds: u32,
) -> serde_json::Result<Vec<Segment>> {
    let segments = parse_fragments(fragments)?;
    Ok(finalize_segments(segments, fallback_script, length_in_seconds))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn segment(start: &str, end: &str, script: &str) -> Segment {
        Segment {
            sequence_number: 99,
            start: start.to_string(),
            end: end.to_string(),
            script: script.to_string(),
        }
    }

    #[test]
    fn parses_objects_and_arrays_together() {
        let fragments = vec![
            r#"{"sequenceNumber": 7, "start": "00:01:00", "end": "00:02:00", "script": "B"}"#.to_string(),
            r#"[{"start": "00:00:00", "end": "00:00:30", "script": "A1"},
                {"start": "00:00:30", "end": "00:01:00", "script": "A2"}]"#
                .to_string(),
        ];

        let segments = parse_fragments(&fragments).unwrap();

        assert_eq!(segments.len(), 3);
        assert_eq!(segments[0].script, "B");
        assert_eq!(segments[0].sequence_number, 0);
        assert_eq!(segments[2].script, "A2");
    }

    #[test]
    fn one_bad_fragment_fails_the_batch() {
        let fragments = vec![
            r#"{"start": "00:01:00", "end": "00:02:00", "script": "B"}"#.to_string(),
            r#"{"start": "00:02:00", "end": "#.to_string(),
        ];

        assert!(parse_fragments(&fragments).is_err());
    }

    #[test]
    fn fragment_without_times_is_a_structural_mismatch() {
        let fragments = vec![r#"{"script": "no times"}"#.to_string()];

        assert!(parse_fragments(&fragments).is_err());
    }

    #[test]
    fn missing_script_defaults_to_empty() {
        let fragments = vec![r#"{"start": "00:00:05", "end": "00:00:09"}"#.to_string()];

        let segments = parse_fragments(&fragments).unwrap();

        assert_eq!(segments[0].script, "");
    }

    #[test]
    fn no_fragments_yields_the_fallback() {
        let segments = assemble_timeline(&[], "The whole story.", 5400).unwrap();

        assert_eq!(
            segments,
            vec![Segment {
                sequence_number: 0,
                start: "00:00:00".to_string(),
                end: "01:30:00".to_string(),
                script: "The whole story.".to_string(),
            }]
        );
    }

    #[test]
    fn repairs_start_and_end_independently() {
        let mut segments = vec![segment("45:30:00", "00:50:00", "x"), segment("bad", "99:99:99", "y")];

        repair_timestamps(&mut segments, 3600);

        assert_eq!(segments[0].start, "00:45:30");
        assert_eq!(segments[0].end, "00:50:00");
        assert_eq!(segments[1].start, "bad");
        assert_eq!(segments[1].end, "01:00:00");
    }

    #[test]
    fn sort_is_stable_and_renumbers() {
        let mut segments = vec![
            segment("00:02:00", "00:03:00", "c"),
            segment("00:01:00", "00:02:00", "b1"),
            segment("not a time", "00:00:10", "garbage"),
            segment("00:01:00", "00:01:30", "b2"),
        ];

        sort_and_sequence(&mut segments);

        let order: Vec<_> = segments.iter().map(|s| s.script.as_str()).collect();
        assert_eq!(order, vec!["garbage", "b1", "b2", "c"]);
        let numbers: Vec<_> = segments.iter().map(|s| s.sequence_number).collect();
        assert_eq!(numbers, vec![0, 1, 2, 3]);
    }

    #[test]
    fn repaired_values_are_sorted_by_their_corrected_time() {
        let fragments = vec![
            r#"{"start": "00:30:00", "end": "00:31:00", "script": "late"}"#.to_string(),
            r#"{"start": "10:00:00", "end": "10:30:00", "script": "early"}"#.to_string(),
        ];

        let segments = assemble_timeline(&fragments, "", 3600).unwrap();

        assert_eq!(segments[0].script, "early");
        assert_eq!(segments[0].start, "00:10:00");
        assert_eq!(segments[0].end, "00:10:30");
        assert_eq!(segments[1].script, "late");
    }

    #[test]
    fn finalize_is_idempotent() {
        let once = finalize_segments(
            vec![
                segment("00:02:00", "00:03:00", "c"),
                segment("45:30:00", "99:99:99", "b"),
                segment("00:00:00", "00:01:00", "a"),
            ],
            "",
            3600,
        );
        let twice = finalize_segments(once.clone(), "", 3600);

        assert_eq!(once, twice);
    }
}
