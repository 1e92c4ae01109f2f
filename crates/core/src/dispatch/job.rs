use crate::{
    error::ScriptlineError,
    inference::InferenceRequest,
    template::{PromptRenderer, RenderError, SEQUENCE, TIME_END, TIME_START, Vocabulary},
    types::{MediaRef, TimeWindow},
};

/// Everything a worker needs to extract one window.
pub struct SegmentJob {
    pub sequence: usize,
    pub window: TimeWindow,
    /// The rendered request, or why it could not be rendered.
    pub request: Result<InferenceRequest, RenderError>,
    pub span: tracing::Span,
}

/// Variables shared by every job of one run.
pub struct JobTemplate<'a> {
    pub stage: &'a str,
    pub template_key: &'a str,
    pub renderer: &'a dyn PromptRenderer,
    pub vocabulary: &'a Vocabulary,
    pub media: &'a MediaRef,
    pub output_schema: &'a serde_json::Value,
}

impl SegmentJob {
    pub fn create(template: &JobTemplate<'_>, sequence: usize, window: TimeWindow) -> Self {
        let span = tracing::info_span!(
            "segment_genai",
            stage = template.stage,
            sequence,
            start = %window.start,
            end = %window.end,
            status = tracing::field::Empty,
        );

        let mut vocabulary = template.vocabulary.clone();
        vocabulary.insert(SEQUENCE, sequence.to_string());
        vocabulary.insert(TIME_START, window.start.clone());
        vocabulary.insert(TIME_END, window.end.clone());

        let request = template
            .renderer
            .render(template.template_key, &vocabulary)
            .map(|prompt| InferenceRequest {
                prompt,
                media: template.media.clone(),
                output_schema: template.output_schema.clone(),
            });

        Self {
            sequence,
            window,
            request,
            span,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EmptyReason {
    /// Nothing but whitespace came back.
    Blank,
    /// The model answered with the literal `{}`.
    EmptyObject,
}

#[derive(Debug)]
pub enum Outcome {
    Fragment(String),
    Empty(EmptyReason),
    Failed(ScriptlineError),
}

impl Outcome {
    /// Any answer that decodes to an object with no fields counts as
    /// `{}`, whatever whitespace it carries.
    pub fn from_text(text: String) -> Self {
        let trimmed = text.trim();
        if trimmed.is_empty() {
            return Outcome::Empty(EmptyReason::Blank);
        }
        if serde_json::from_str::<serde_json::Map<String, serde_json::Value>>(trimmed)
            .is_ok_and(|object| object.is_empty())
        {
            return Outcome::Empty(EmptyReason::EmptyObject);
        }
        Outcome::Fragment(text)
    }
}

/// Exactly one of these is produced per dispatched job.
#[derive(Debug)]
pub struct SegmentResult {
    pub sequence: usize,
    pub window: TimeWindow,
    pub outcome: Outcome,
}
