use std::{path::Path, sync::Arc, time::Duration};

use anyhow::{Context as _, Result};
use scriptline_core::{
    ChatCompletionsClient, ExtractorConfig, MediaSummary, Provider, ScriptPipeline, TemplateService,
};
use tokio::fs;

use crate::Cli;

pub async fn load_summary(path: &Path) -> Result<MediaSummary> {
    let raw = fs::read_to_string(path)
        .await
        .with_context(|| format!("failed to read summary {}", path.display()))?;
    serde_json::from_str(&raw).with_context(|| format!("invalid summary JSON in {}", path.display()))
}

/// Wire the chat-completions client and prompt templates into a pipeline.
pub async fn build_pipeline(cli: &Cli, provider: &Provider) -> Result<ScriptPipeline> {
    let mut client = ChatCompletionsClient::new(
        provider,
        cli.model.clone(),
        Some(Duration::from_secs(cli.timeout)),
        cli.max_retries,
    )?;
    if let Some(api_url) = &cli.api_url {
        tracing::info!(api_url = %api_url, "using custom chat-completions endpoint");
        client = client.with_api_url(api_url.clone());
    }

    let mut templates = TemplateService::default();
    if let Some(path) = &cli.template {
        let template = fs::read_to_string(path)
            .await
            .with_context(|| format!("failed to read template {}", path.display()))?;
        tracing::info!(content_type = %cli.content_type, path = %path.display(), "registered prompt template");
        templates = templates.with_template(cli.content_type.clone(), template);
    }

    let config = ExtractorConfig {
        workers: cli.workers,
        ..Default::default()
    };

    Ok(ScriptPipeline::new(config, Arc::new(client), Arc::new(templates)))
}
