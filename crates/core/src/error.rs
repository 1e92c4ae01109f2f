use thiserror::Error;

use crate::{inference::InferenceError, template::RenderError};

#[derive(Error, Debug)]
pub enum ScriptlineError {
    #[error("Prompt rendering failed for window {start}-{end}: {source}")]
    RenderFailed {
        start: String,
        end: String,
        #[source]
        source: RenderError,
    },

    #[error("Inference failed for window {start}-{end}: {source}")]
    InferenceFailed {
        start: String,
        end: String,
        #[source]
        source: InferenceError,
    },

    #[error("Segment fragments are not valid JSON: {0}")]
    FragmentParse(#[from] serde_json::Error),

    #[error("Missing context value: {key}")]
    MissingValue { key: String },

    #[error("Context value {key} is not a {expected}")]
    UnexpectedType { key: String, expected: &'static str },

    #[error("Lost {missing} of {dispatched} segment outcomes")]
    LostOutcomes { missing: usize, dispatched: usize },
}

pub type Result<T> = std::result::Result<T, ScriptlineError>;
