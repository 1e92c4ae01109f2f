use std::sync::Arc;

use async_trait::async_trait;

use crate::{
    command::Command,
    config::ExtractorConfig,
    context::{CTX_OUT, Context},
    metrics::StageMetrics,
    timeline::assemble_timeline,
    types::{Media, MediaSummary},
};

/// Parses the extracted fragments into a validated timeline and builds the
/// final [`Media`].
///
/// The media length comes from the length key when present, otherwise from
/// the summary itself.
pub struct MediaAssembly {
    name: String,
    metrics: Arc<StageMetrics>,
    summary_param: String,
    segments_param: String,
    media_object_param: String,
    length_param: String,
}

impl MediaAssembly {
    pub fn new(name: impl Into<String>, config: &ExtractorConfig, metrics: Arc<StageMetrics>) -> Self {
        Self {
            name: name.into(),
            metrics,
            summary_param: config.summary_param.clone(),
            segments_param: config.segments_param.clone(),
            media_object_param: config.media_object_param.clone(),
            length_param: config.length_param.clone(),
        }
    }
}

#[async_trait]
impl Command for MediaAssembly {
    fn name(&self) -> &str {
        &self.name
    }

    fn is_executable(&self, ctx: &Context) -> bool {
        ctx.contains(&self.summary_param) && ctx.contains(&self.segments_param)
    }

    async fn execute(&self, ctx: &mut Context) {
        let inputs = ctx
            .expect_shared::<MediaSummary>(&self.summary_param)
            .and_then(|summary| Ok((summary, ctx.expect_shared::<Vec<String>>(&self.segments_param)?)));
        let (summary, fragments) = match inputs {
            Ok(inputs) => inputs,
            Err(e) => {
                self.metrics.record_failure();
                ctx.add_error(&self.name, e);
                return;
            }
        };
        let length = ctx
            .get::<u32>(&self.length_param)
            .copied()
            .unwrap_or(summary.length_in_seconds);

        let segments = match assemble_timeline(&fragments, &summary.summary, length) {
            Ok(segments) => segments,
            Err(e) => {
                tracing::error!(stage = %self.name, fragments = fragments.len(), "fragment batch rejected: {e}");
                self.metrics.record_failure();
                ctx.add_error(&self.name, e.into());
                return;
            }
        };

        let media = Arc::new(Media::from_summary(&summary, length, segments));
        tracing::info!(
            stage = %self.name,
            media_id = %media.id,
            segments = media.segments.len(),
            "media assembled"
        );

        self.metrics.record_success();
        ctx.set_shared(self.media_object_param.clone(), Arc::clone(&media));
        ctx.set_shared(CTX_OUT, media);
    }
}
