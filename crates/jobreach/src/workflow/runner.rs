//! Single-worker workflow runner.
//!
//! The automation client represents one authenticated browser session,
//! so jobs are processed strictly one at a time from a FIFO queue. One
//! tokio task owns the session; enqueueing from other tasks is cheap.

use std::sync::Arc;

use tokio::sync::mpsc;
use tokio::task::JoinHandle;

use crate::shutdown::Shutdown;
use crate::workflow::{Orchestrator, StepOutcome, WorkflowError};

/// Handle to the background worker consuming the job queue.
pub struct WorkflowRunner {
    queue_tx: mpsc::UnboundedSender<String>,
    handle: JoinHandle<()>,
}

impl WorkflowRunner {
    /// Spawns the worker task. The runner drains jobs until the queue
    /// closes or `shutdown` fires.
    pub fn start(orchestrator: Arc<Orchestrator>, shutdown: Shutdown) -> Self {
        let (queue_tx, queue_rx) = mpsc::unbounded_channel();
        let handle = tokio::spawn(run_worker(orchestrator, queue_rx, shutdown));
        Self { queue_tx, handle }
    }

    /// Queues a job for processing. Jobs run in submission order.
    pub fn enqueue(&self, job_id: &str) -> Result<(), WorkflowError> {
        self.queue_tx
            .send(job_id.to_string())
            .map_err(|_| WorkflowError::JobNotFound(job_id.to_string()))
    }

    /// Waits for the worker to finish. Call after signalling shutdown.
    pub async fn join(self) {
        drop(self.queue_tx);
        if let Err(e) = self.handle.await {
            log::error!("Workflow worker panicked: {:?}", e);
        }
    }
}

async fn run_worker(
    orchestrator: Arc<Orchestrator>,
    mut queue_rx: mpsc::UnboundedReceiver<String>,
    mut shutdown: Shutdown,
) {
    log::info!("Workflow worker started");

    loop {
        let job_id = tokio::select! {
            _ = shutdown.wait() => break,
            job = queue_rx.recv() => match job {
                Some(id) => id,
                None => break,
            },
        };

        drive_job(&orchestrator, &job_id).await;
    }

    log::info!("Workflow worker stopped");
}

/// Advances one job until it pauses, waits, fails or gets interrupted.
async fn drive_job(orchestrator: &Orchestrator, job_id: &str) {
    loop {
        match orchestrator.advance(job_id).await {
            Ok(StepOutcome::Advanced(step)) => {
                log::debug!("Job {} advanced to {}", job_id, step.as_str());
            }
            Ok(StepOutcome::Paused(reason)) => {
                log::info!("Job {} paused for input: {:?}", job_id, reason);
                break;
            }
            Ok(StepOutcome::Waiting(step)) => {
                log::debug!("Job {} waiting at {}", job_id, step.as_str());
                break;
            }
            Ok(StepOutcome::Truncated(step)) => {
                log::info!(
                    "Job {} hit the daily quota at {}, resuming next cycle",
                    job_id,
                    step.as_str()
                );
                break;
            }
            Ok(StepOutcome::Interrupted) => {
                log::info!("Job {} interrupted by shutdown", job_id);
                break;
            }
            Ok(StepOutcome::Terminal(status)) => {
                log::debug!("Job {} terminal: {}", job_id, status.as_str());
                break;
            }
            Err(e) => {
                log::error!("Job {} errored: {}", job_id, e);
                break;
            }
        }
    }
}
