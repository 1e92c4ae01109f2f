use std::sync::atomic::{AtomicU64, Ordering};

/// Monotonic counters for one stage of one pipeline run.
///
/// Created by the caller and handed to the command that owns it, so two runs
/// (or two tests) never share counts.
#[derive(Debug)]
pub struct StageMetrics {
    stage: String,
    successes: AtomicU64,
    failures: AtomicU64,
    input_tokens: AtomicU64,
    output_tokens: AtomicU64,
    retries: AtomicU64,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct MetricsSnapshot {
    pub successes: u64,
    pub failures: u64,
    pub input_tokens: u64,
    pub output_tokens: u64,
    pub retries: u64,
}

impl StageMetrics {
    pub fn new(stage: impl Into<String>) -> Self {
        Self {
            stage: stage.into(),
            successes: AtomicU64::new(0),
            failures: AtomicU64::new(0),
            input_tokens: AtomicU64::new(0),
            output_tokens: AtomicU64::new(0),
            retries: AtomicU64::new(0),
        }
    }

    pub fn stage(&self) -> &str {
        &self.stage
    }

    pub fn record_success(&self) {
        self.successes.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_failure(&self) {
        self.failures.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_tokens(&self, input: u64, output: u64) {
        self.input_tokens.fetch_add(input, Ordering::Relaxed);
        self.output_tokens.fetch_add(output, Ordering::Relaxed);
    }

    /// Called by inference implementations for each internal retry.
    pub fn record_retry(&self) {
        self.retries.fetch_add(1, Ordering::Relaxed);
    }

    pub fn snapshot(&self) -> MetricsSnapshot {
        MetricsSnapshot {
            successes: self.successes.load(Ordering::Relaxed),
            failures: self.failures.load(Ordering::Relaxed),
            input_tokens: self.input_tokens.load(Ordering::Relaxed),
            output_tokens: self.output_tokens.load(Ordering::Relaxed),
            retries: self.retries.load(Ordering::Relaxed),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn counters_are_independent() {
        let metrics = StageMetrics::new("extract");
        metrics.record_success();
        metrics.record_failure();
        metrics.record_failure();
        metrics.record_tokens(10, 3);
        metrics.record_tokens(5, 2);
        metrics.record_retry();

        assert_eq!(
            metrics.snapshot(),
            MetricsSnapshot {
                successes: 1,
                failures: 2,
                input_tokens: 15,
                output_tokens: 5,
                retries: 1,
            }
        );
        assert_eq!(metrics.stage(), "extract");
    }
}
