use serde::{Deserialize, Serialize};
use uuid::Uuid;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CastMember {
    pub character_name: String,
    pub actor_name: String,
}

/// A `(start, end)` slice of the media, both in `HH:MM:SS` form.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TimeWindow {
    pub start: String,
    pub end: String,
}

impl TimeWindow {
    pub fn new(start: impl Into<String>, end: impl Into<String>) -> Self {
        Self {
            start: start.into(),
            end: end.into(),
        }
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct MediaSummary {
    pub title: String,
    pub summary: String,
    pub cast: Vec<CastMember>,
    pub category: String,
    pub director: String,
    pub release_year: u32,
    pub genre: String,
    pub rating: String,
    pub media_url: String,
    pub length_in_seconds: u32,
    pub segment_time_stamps: Vec<TimeWindow>,
}

/// Location of the asset the inference service should look at.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MediaRef {
    pub uri: String,
    pub mime_type: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Segment {
    pub sequence_number: usize,
    pub start: String,
    pub end: String,
    pub script: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Media {
    pub id: String,
    pub title: String,
    pub category: String,
    pub summary: String,
    pub media_url: String,
    pub length_in_seconds: u32,
    pub director: String,
    pub release_year: u32,
    pub genre: String,
    pub rating: String,
    pub cast: Vec<CastMember>,
    pub segments: Vec<Segment>,
}

impl Media {
    /// Builds a media aggregate with a fresh identity and the summary's metadata.
    pub fn from_summary(summary: &MediaSummary, length_in_seconds: u32, segments: Vec<Segment>) -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            title: summary.title.clone(),
            category: summary.category.clone(),
            summary: summary.summary.clone(),
            media_url: summary.media_url.clone(),
            length_in_seconds,
            director: summary.director.clone(),
            release_year: summary.release_year,
            genre: summary.genre.clone(),
            rating: summary.rating.clone(),
            cast: summary.cast.clone(),
            segments,
        }
    }
}

/// Example handed to the model so it mirrors the expected segment shape.
pub fn example_segment() -> Segment {
    Segment {
        sequence_number: 0,
        start: "00:00:00".to_string(),
        end: "00:01:00".to_string(),
        script: "Narrator: The city wakes up as the first train pulls into the station.".to_string(),
    }
}

pub fn example_json() -> String {
    serde_json::to_string(&example_segment()).unwrap_or_default()
}

/// JSON schema for a single segment object, sent as the output shape hint.
pub fn segment_schema() -> serde_json::Value {
    serde_json::json!({
        "type": "object",
        "properties": {
            "sequenceNumber": { "type": "integer" },
            "start": { "type": "string", "description": "Start time in HH:MM:SS" },
            "end": { "type": "string", "description": "End time in HH:MM:SS" },
            "script": { "type": "string" }
        },
        "required": ["start", "end", "script"]
    })
}
