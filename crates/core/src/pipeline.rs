use std::sync::Arc;

use crate::{
    command::Chain,
    config::{ExtractorConfig, MEDIA_ASSEMBLY, SEGMENT_EXTRACTOR},
    context::{Context, StageError},
    inference::Inference,
    metrics::{MetricsSnapshot, StageMetrics},
    stages::{MediaAssembly, SegmentExtractor},
    template::PromptRenderer,
    types::{Media, MediaRef, MediaSummary},
};

/// Outcome of one extraction run.
pub struct ScriptReport {
    /// `None` only when assembly itself failed.
    pub media: Option<Arc<Media>>,
    pub errors: Vec<StageError>,
    pub extraction: MetricsSnapshot,
    pub assembly: MetricsSnapshot,
}

/// Extraction followed by assembly, with fresh counters for every run.
pub struct ScriptPipeline {
    config: ExtractorConfig,
    inference: Arc<dyn Inference>,
    renderer: Arc<dyn PromptRenderer>,
}

impl ScriptPipeline {
    pub fn new(
        config: ExtractorConfig,
        inference: Arc<dyn Inference>,
        renderer: Arc<dyn PromptRenderer>,
    ) -> Self {
        Self {
            config,
            inference,
            renderer,
        }
    }

    pub async fn run(&self, summary: MediaSummary, media: MediaRef, content_type: &str) -> ScriptReport {
        let extraction = Arc::new(StageMetrics::new(SEGMENT_EXTRACTOR));
        let assembly = Arc::new(StageMetrics::new(MEDIA_ASSEMBLY));

        let chain = Chain::new("script_extraction")
            .then(SegmentExtractor::new(
                SEGMENT_EXTRACTOR,
                Arc::clone(&self.inference),
                Arc::clone(&self.renderer),
                &self.config,
                Arc::clone(&extraction),
            ))
            .then(MediaAssembly::new(
                MEDIA_ASSEMBLY,
                &self.config,
                Arc::clone(&assembly),
            ));

        let mut ctx = Context::new();
        ctx.set(self.config.summary_param.clone(), summary);
        ctx.set(self.config.media_param.clone(), media);
        ctx.set(self.config.content_type_param.clone(), content_type.to_string());

        chain.execute(&mut ctx).await;

        ScriptReport {
            media: ctx.get_shared::<Media>(&self.config.media_object_param),
            errors: ctx.into_errors(),
            extraction: extraction.snapshot(),
            assembly: assembly.snapshot(),
        }
    }
}
