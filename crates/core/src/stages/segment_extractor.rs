use std::sync::Arc;

use async_trait::async_trait;

use crate::{
    aggregate::aggregate_results,
    command::Command,
    config::ExtractorConfig,
    context::{CTX_OUT, Context},
    dispatch::{JobTemplate, SegmentJob, WorkerPool},
    format::summary_document,
    inference::Inference,
    metrics::StageMetrics,
    template::{EXAMPLE_JSON, PromptRenderer, SUMMARY_DOCUMENT, Vocabulary},
    types::{MediaRef, MediaSummary, example_json, segment_schema},
};

/// Content type used when the context does not name one.
pub const DEFAULT_CONTENT_TYPE: &str = "default";

/// Fans one inference call per time window out over a worker pool and
/// publishes the raw fragments that came back.
///
/// Reads: summary, media reference, optional content type.
/// Writes: `Vec<String>` of fragments under the segments key and [`CTX_OUT`].
pub struct SegmentExtractor {
    name: String,
    inference: Arc<dyn Inference>,
    renderer: Arc<dyn PromptRenderer>,
    pool: WorkerPool,
    metrics: Arc<StageMetrics>,
    summary_param: String,
    media_param: String,
    content_type_param: String,
    output_param: String,
}

impl SegmentExtractor {
    pub fn new(
        name: impl Into<String>,
        inference: Arc<dyn Inference>,
        renderer: Arc<dyn PromptRenderer>,
        config: &ExtractorConfig,
        metrics: Arc<StageMetrics>,
    ) -> Self {
        Self {
            name: name.into(),
            inference,
            renderer,
            pool: WorkerPool::new(config.workers),
            metrics,
            summary_param: config.summary_param.clone(),
            media_param: config.media_param.clone(),
            content_type_param: config.content_type_param.clone(),
            output_param: config.segments_param.clone(),
        }
    }

    fn build_jobs(&self, summary: &MediaSummary, media: &MediaRef, content_type: &str) -> Vec<SegmentJob> {
        let vocabulary = Vocabulary::from([
            (SUMMARY_DOCUMENT, summary_document(summary)),
            (EXAMPLE_JSON, example_json()),
        ]);
        let schema = segment_schema();
        let template = JobTemplate {
            stage: &self.name,
            template_key: content_type,
            renderer: self.renderer.as_ref(),
            vocabulary: &vocabulary,
            media,
            output_schema: &schema,
        };

        summary
            .segment_time_stamps
            .iter()
            .enumerate()
            .map(|(i, window)| SegmentJob::create(&template, i, window.clone()))
            .collect()
    }
}

#[async_trait]
impl Command for SegmentExtractor {
    fn name(&self) -> &str {
        &self.name
    }

    fn is_executable(&self, ctx: &Context) -> bool {
        ctx.contains(&self.summary_param) && ctx.contains(&self.media_param)
    }

    async fn execute(&self, ctx: &mut Context) {
        let inputs = ctx
            .expect_shared::<MediaSummary>(&self.summary_param)
            .and_then(|summary| Ok((summary, ctx.expect_shared::<MediaRef>(&self.media_param)?)));
        let (summary, media) = match inputs {
            Ok(inputs) => inputs,
            Err(e) => {
                self.metrics.record_failure();
                ctx.add_error(&self.name, e);
                return;
            }
        };
        let content_type = ctx
            .get::<String>(&self.content_type_param)
            .map(String::as_str)
            .unwrap_or(DEFAULT_CONTENT_TYPE)
            .to_string();

        tracing::info!(
            stage = %self.name,
            windows = summary.segment_time_stamps.len(),
            workers = self.pool.workers(),
            content_type = %content_type,
            "extracting segments"
        );

        let jobs = self.build_jobs(&summary, &media, &content_type);
        let dispatched = self
            .pool
            .run(jobs, Arc::clone(&self.inference), Arc::clone(&self.metrics))
            .await;
        let aggregation = aggregate_results(&self.name, dispatched, ctx, &self.metrics).await;

        let fragments = Arc::new(aggregation.fragments);
        ctx.set_shared(self.output_param.clone(), Arc::clone(&fragments));
        ctx.set_shared(CTX_OUT, fragments);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        error::ScriptlineError,
        inference::{Completion, InferenceError, InferenceRequest},
        template::TemplateService,
        types::TimeWindow,
    };

    /// Answers with the rendered prompt so tests can see which template ran.
    struct PromptEcho;

    #[async_trait]
    impl Inference for PromptEcho {
        async fn infer(
            &self,
            request: &InferenceRequest,
            _metrics: &StageMetrics,
        ) -> Result<Completion, InferenceError> {
            Ok(Completion::text(request.prompt.clone()))
        }
    }

    fn extractor(config: &ExtractorConfig, metrics: Arc<StageMetrics>) -> SegmentExtractor {
        let templates = TemplateService::new("default {{ TIME_START }}")
            .with_template("news", "news {{ .TIME_START }}");
        SegmentExtractor::new("extract", Arc::new(PromptEcho), Arc::new(templates), config, metrics)
    }

    fn context(config: &ExtractorConfig, content_type: Option<&str>) -> Context {
        let mut ctx = Context::new();
        ctx.set(
            config.summary_param.clone(),
            MediaSummary {
                summary: "Evening bulletin.".to_string(),
                length_in_seconds: 120,
                segment_time_stamps: vec![
                    TimeWindow::new("00:00:00", "00:01:00"),
                    TimeWindow::new("00:01:00", "00:02:00"),
                ],
                ..Default::default()
            },
        );
        ctx.set(
            config.media_param.clone(),
            MediaRef {
                uri: "gs://bucket/bulletin.mp4".to_string(),
                mime_type: "video/mp4".to_string(),
            },
        );
        if let Some(content_type) = content_type {
            ctx.set(config.content_type_param.clone(), content_type.to_string());
        }
        ctx
    }

    fn fragments(ctx: &Context, key: &str) -> Vec<String> {
        let mut fragments = ctx.get_shared::<Vec<String>>(key).unwrap().to_vec();
        fragments.sort();
        fragments
    }

    #[tokio::test]
    async fn content_type_selects_its_template() {
        let config = ExtractorConfig::default();
        let metrics = Arc::new(StageMetrics::new("extract"));
        let stage = extractor(&config, Arc::clone(&metrics));
        let mut ctx = context(&config, Some("news"));

        assert!(stage.is_executable(&ctx));
        stage.execute(&mut ctx).await;

        assert_eq!(
            fragments(&ctx, &config.segments_param),
            vec!["news 00:00:00", "news 00:01:00"]
        );
        let out = ctx.get_shared::<Vec<String>>(CTX_OUT).unwrap();
        let published = ctx.get_shared::<Vec<String>>(&config.segments_param).unwrap();
        assert!(Arc::ptr_eq(&out, &published));
        assert!(!ctx.has_errors());
        assert_eq!(metrics.snapshot().successes, 1);
    }

    #[tokio::test]
    async fn missing_or_unknown_content_type_uses_the_default_template() {
        let config = ExtractorConfig::default();
        let stage = extractor(&config, Arc::new(StageMetrics::new("extract")));

        for content_type in [None, Some("documentary")] {
            let mut ctx = context(&config, content_type);
            stage.execute(&mut ctx).await;

            assert_eq!(
                fragments(&ctx, &config.segments_param),
                vec!["default 00:00:00", "default 00:01:00"]
            );
        }
        assert_eq!(DEFAULT_CONTENT_TYPE, "default");
    }

    #[tokio::test]
    async fn mistyped_summary_is_a_stage_error() {
        let config = ExtractorConfig::default();
        let metrics = Arc::new(StageMetrics::new("extract"));
        let stage = extractor(&config, Arc::clone(&metrics));
        let mut ctx = context(&config, None);
        ctx.set(config.summary_param.clone(), "not a summary".to_string());

        assert!(stage.is_executable(&ctx));
        stage.execute(&mut ctx).await;

        assert_eq!(ctx.errors().len(), 1);
        assert_eq!(ctx.errors()[0].stage, "extract");
        assert!(matches!(
            ctx.errors()[0].error,
            ScriptlineError::UnexpectedType { ref key, .. } if *key == config.summary_param
        ));
        assert!(!ctx.contains(&config.segments_param));
        assert!(!ctx.contains(CTX_OUT));
        assert_eq!(metrics.snapshot().failures, 1);
        assert_eq!(metrics.snapshot().successes, 0);
    }

    #[test]
    fn not_executable_without_media() {
        let config = ExtractorConfig::default();
        let stage = extractor(&config, Arc::new(StageMetrics::new("extract")));
        let mut ctx = Context::new();
        ctx.set(config.summary_param.clone(), MediaSummary::default());

        assert!(!stage.is_executable(&ctx));
    }
}
