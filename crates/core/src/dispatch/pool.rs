use std::sync::Arc;

use tokio::{sync::mpsc, task::JoinSet};
use tracing::Instrument;

use crate::{
    dispatch::{
        job::{Outcome, SegmentJob, SegmentResult},
        queue::JobQueue,
    },
    error::ScriptlineError,
    inference::Inference,
    metrics::StageMetrics,
};

/// Results of one dispatch, readable once every worker has finished.
pub struct Dispatched {
    pub dispatched: usize,
    pub results: mpsc::Receiver<SegmentResult>,
}

/// Fixed number of workers draining one shared job queue.
pub struct WorkerPool {
    workers: usize,
}

impl WorkerPool {
    pub fn new(workers: usize) -> Self {
        if workers == 0 {
            tracing::warn!("worker count of 0 requested, using 1");
        }
        Self {
            workers: workers.max(1),
        }
    }

    pub fn workers(&self) -> usize {
        self.workers
    }

    /// Run every job and wait for all workers to finish.
    ///
    /// The returned receiver holds one result per job that reached a worker
    /// and is already closed, so draining it never waits.
    pub async fn run(
        &self,
        jobs: Vec<SegmentJob>,
        inference: Arc<dyn Inference>,
        metrics: Arc<StageMetrics>,
    ) -> Dispatched {
        let dispatched = jobs.len();
        let (results_tx, results_rx) = mpsc::channel(dispatched.max(1));
        let queue = Arc::new(JobQueue::new(jobs));

        let mut workers = JoinSet::new();
        for _ in 0..self.workers.min(dispatched) {
            workers.spawn(segment_worker(
                Arc::clone(&queue),
                results_tx.clone(),
                Arc::clone(&inference),
                Arc::clone(&metrics),
            ));
        }
        drop(results_tx);

        while let Some(joined) = workers.join_next().await {
            if let Err(e) = joined {
                tracing::error!(stage = metrics.stage(), "segment worker died: {e}");
            }
        }

        Dispatched {
            dispatched,
            results: results_rx,
        }
    }
}

async fn segment_worker(
    queue: Arc<JobQueue<SegmentJob>>,
    results: mpsc::Sender<SegmentResult>,
    inference: Arc<dyn Inference>,
    metrics: Arc<StageMetrics>,
) {
    while let Some(job) = queue.pop() {
        let result = process(job, inference.as_ref(), &metrics).await;
        if results.send(result).await.is_err() {
            break;
        }
    }
}

async fn process(job: SegmentJob, inference: &dyn Inference, metrics: &StageMetrics) -> SegmentResult {
    let SegmentJob {
        sequence,
        window,
        request,
        span,
    } = job;

    let outcome = match request {
        Err(source) => {
            span.record("status", "error");
            Outcome::Failed(ScriptlineError::RenderFailed {
                start: window.start.clone(),
                end: window.end.clone(),
                source,
            })
        }
        Ok(request) => {
            match inference
                .infer(&request, metrics)
                .instrument(span.clone())
                .await
            {
                Ok(completion) => {
                    metrics.record_tokens(completion.usage.input_tokens, completion.usage.output_tokens);
                    span.record("status", "ok");
                    Outcome::from_text(completion.text)
                }
                Err(source) => {
                    span.record("status", "error");
                    Outcome::Failed(ScriptlineError::InferenceFailed {
                        start: window.start.clone(),
                        end: window.end.clone(),
                        source,
                    })
                }
            }
        }
    };

    SegmentResult {
        sequence,
        window,
        outcome,
    }
}
