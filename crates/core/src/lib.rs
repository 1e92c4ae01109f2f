//! Scriptline Core Library
//!
//! Extracts a time-segmented script from a long video by asking a multimodal
//! model about one time window at a time, then assembles the fragments into
//! one ordered, validated timeline.

pub mod aggregate;
pub mod client;
pub mod command;
pub mod config;
pub mod context;
pub mod dispatch;
pub mod error;
pub mod format;
pub mod inference;
pub mod metrics;
pub mod pipeline;
pub mod provider;
pub mod stages;
pub mod template;
pub mod timeline;
pub mod types;

// Re-export commonly used items at crate root
pub use client::ChatCompletionsClient;
pub use command::{Chain, Command};
pub use config::ExtractorConfig;
pub use context::{CTX_OUT, Context, StageError};
pub use error::{Result, ScriptlineError};
pub use format::{correct_timestamp, format_seconds, format_timeline, parse_timestamp};
pub use inference::{Completion, Inference, InferenceError, InferenceRequest, TokenUsage};
pub use metrics::{MetricsSnapshot, StageMetrics};
pub use pipeline::{ScriptPipeline, ScriptReport};
pub use provider::{Provider, ProviderConfig, ProviderError};
pub use template::{PromptRenderer, TemplateService};
pub use types::{CastMember, Media, MediaRef, MediaSummary, Segment, TimeWindow};
