//! Property-based tests for timeline assembly.
//!
//! Whatever the model answers, the assembled timeline is ordered, densely
//! numbered and never points past the end of the media.

use proptest::prelude::*;
use scriptline_core::{
    Segment, correct_timestamp, parse_timestamp,
    timeline::{assemble_timeline, finalize_segments},
};

fn timestamp() -> impl Strategy<Value = String> {
    prop_oneof![
        4 => (0i64..200, 0i64..200, 0i64..200).prop_map(|(h, m, s)| format!("{h:02}:{m:02}:{s:02}")),
        1 => (-50i64..50, -50i64..50, -50i64..50).prop_map(|(h, m, s)| format!("{h}:{m}:{s}")),
        1 => "[a-z?:]{0,8}",
    ]
}

fn segments() -> impl Strategy<Value = Vec<Segment>> {
    prop::collection::vec((timestamp(), timestamp(), "[a-z ]{0,12}"), 0..24).prop_map(|rows| {
        rows.into_iter()
            .map(|(start, end, script)| Segment {
                sequence_number: 0,
                start,
                end,
                script,
            })
            .collect()
    })
}

#[test]
fn proptest_timeline_is_ordered_and_numbered() {
    proptest!(|(input in segments(), length in 0u32..20_000)| {
        let out = finalize_segments(input.clone(), "fallback", length);

        prop_assert_eq!(out.len(), input.len().max(1));
        for (i, segment) in out.iter().enumerate() {
            prop_assert_eq!(segment.sequence_number, i);
        }
        let starts: Vec<i64> = out
            .iter()
            .map(|s| parse_timestamp(&s.start).unwrap_or(0))
            .collect();
        prop_assert!(starts.windows(2).all(|w| w[0] <= w[1]));
    });
}

#[test]
fn proptest_parsable_times_stay_within_media() {
    proptest!(|(input in segments(), length in 0u32..20_000)| {
        let out = finalize_segments(input, "fallback", length);

        for segment in &out {
            for value in [&segment.start, &segment.end] {
                if let Some(seconds) = parse_timestamp(value) {
                    prop_assert!((0..=i64::from(length)).contains(&seconds), "{value} outside 0..={length}");
                }
            }
        }
    });
}

#[test]
fn proptest_finalizing_twice_changes_nothing() {
    proptest!(|(input in segments(), length in 0u32..20_000)| {
        let once = finalize_segments(input, "fallback", length);
        let twice = finalize_segments(once.clone(), "fallback", length);

        prop_assert_eq!(once, twice);
    });
}

#[test]
fn proptest_correction_is_idempotent() {
    proptest!(|(value in timestamp(), length in 0u32..20_000)| {
        let once = correct_timestamp(&value, length);
        prop_assert_eq!(correct_timestamp(&once, length), once);
    });
}

#[test]
fn proptest_scripts_survive_assembly() {
    proptest!(|(scripts in prop::collection::vec("[a-z ]{1,12}", 1..12))| {
        let fragments: Vec<String> = scripts
            .iter()
            .enumerate()
            .map(|(i, script)| {
                serde_json::json!({
                    "start": format!("00:{i:02}:00"),
                    "end": format!("00:{:02}:00", i + 1),
                    "script": script,
                })
                .to_string()
            })
            .collect();

        let out = assemble_timeline(&fragments, "fallback", 3600).unwrap();
        let assembled: Vec<&str> = out.iter().map(|s| s.script.as_str()).collect();
        let expected: Vec<&str> = scripts.iter().map(String::as_str).collect();
        prop_assert_eq!(assembled, expected);
    });
}
