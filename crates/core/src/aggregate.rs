use crate::{
    context::Context,
    dispatch::{Dispatched, EmptyReason, Outcome},
    error::ScriptlineError,
    metrics::StageMetrics,
};

/// What a drained dispatch amounted to.
#[derive(Debug, Default)]
pub struct Aggregation {
    /// Raw payloads in the order they were read, not window order.
    pub fragments: Vec<String>,
    pub failures: usize,
    pub empty: usize,
}

/// Drain every result of a finished dispatch.
///
/// Failures go to the context's error list under `stage` and bump the failure
/// counter; they never stop the drain. The success counter is bumped only when
/// this stage reported no errors at all.
pub async fn aggregate_results(
    stage: &str,
    mut dispatched: Dispatched,
    ctx: &mut Context,
    metrics: &StageMetrics,
) -> Aggregation {
    let mut aggregation = Aggregation::default();
    let mut received = 0;

    while let Some(result) = dispatched.results.recv().await {
        received += 1;
        match result.outcome {
            Outcome::Fragment(text) => aggregation.fragments.push(text),
            Outcome::Empty(reason) => {
                aggregation.empty += 1;
                match reason {
                    EmptyReason::Blank => tracing::debug!(
                        stage,
                        sequence = result.sequence,
                        "blank response for {}-{}, no segment",
                        result.window.start,
                        result.window.end
                    ),
                    EmptyReason::EmptyObject => tracing::debug!(
                        stage,
                        sequence = result.sequence,
                        "empty object for {}-{}, no segment",
                        result.window.start,
                        result.window.end
                    ),
                }
            }
            Outcome::Failed(error) => {
                tracing::warn!(stage, sequence = result.sequence, "{error}");
                aggregation.failures += 1;
                metrics.record_failure();
                ctx.add_error(stage, error);
            }
        }
    }

    if received < dispatched.dispatched {
        let missing = dispatched.dispatched - received;
        tracing::error!(stage, missing, "segment outcomes lost");
        aggregation.failures += 1;
        metrics.record_failure();
        ctx.add_error(
            stage,
            ScriptlineError::LostOutcomes {
                missing,
                dispatched: dispatched.dispatched,
            },
        );
    }

    if aggregation.failures == 0 {
        metrics.record_success();
    }

    tracing::info!(
        stage,
        dispatched = dispatched.dispatched,
        fragments = aggregation.fragments.len(),
        empty = aggregation.empty,
        failures = aggregation.failures,
        "segment extraction drained"
    );

    aggregation
}
