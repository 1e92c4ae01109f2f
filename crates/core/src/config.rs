use serde::{Deserialize, Serialize};

pub const SEGMENT_EXTRACTOR: &str = "segment_extractor";
pub const MEDIA_ASSEMBLY: &str = "media_assembly";

/// Stage wiring: worker count and the context keys each stage reads and writes.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ExtractorConfig {
    pub workers: usize,
    pub summary_param: String,
    pub media_param: String,
    pub content_type_param: String,
    pub segments_param: String,
    pub media_object_param: String,
    pub length_param: String,
}

impl Default for ExtractorConfig {
    fn default() -> Self {
        Self {
            workers: 4,
            summary_param: "media_summary".to_string(),
            media_param: "media_ref".to_string(),
            content_type_param: "content_type".to_string(),
            segments_param: "media_segments".to_string(),
            media_object_param: "media_object".to_string(),
            length_param: "media_length".to_string(),
        }
    }
}
