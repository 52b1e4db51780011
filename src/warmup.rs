//! Warm-up scheduling
//!
//! Pre-compiles a schema's root validator off the caller's path so the
//! first real `validate` call finds it cached. Scheduling is best-effort:
//! a job may run late, race a real validation (harmless, the cache compiles
//! once), or never run at all before the process exits.

use std::collections::VecDeque;
use std::panic::{self, AssertUnwindSafe};
use std::sync::mpsc::{self, Sender};
use std::sync::{Arc, Mutex};
use std::thread;

use tracing::{debug, warn};

use crate::cache::ValidatorCache;
use crate::config::{WarmupConfig, WarmupMode};
use crate::schema::{Schema, SchemaSource};

/// A unit of low-priority work
pub type Job = Box<dyn FnOnce() + Send + 'static>;

/// Accepts low-priority work without blocking the caller
pub trait WarmupScheduler: Send + Sync {
    fn schedule(&self, job: Job);
}

/// Runs jobs one at a time on a dedicated background thread
///
/// A panicking job is logged and skipped; later jobs still run.
///
/// Dropping the worker closes the queue; the thread finishes the job in
/// hand and exits. Queued jobs do not hold the process open.
pub struct IdleWorker {
    sender: Mutex<Sender<Job>>,
}

impl IdleWorker {
    pub fn spawn(thread_name: impl Into<String>) -> std::io::Result<Self> {
        let (sender, receiver) = mpsc::channel::<Job>();
        thread::Builder::new()
            .name(thread_name.into())
            .spawn(move || {
                while let Ok(job) = receiver.recv() {
                    if panic::catch_unwind(AssertUnwindSafe(job)).is_err() {
                        warn!("Warm-up job panicked, worker continues");
                    }
                }
                debug!("Warm-up worker stopped");
            })?;
        Ok(Self {
            sender: Mutex::new(sender),
        })
    }
}

impl WarmupScheduler for IdleWorker {
    fn schedule(&self, job: Job) {
        let sender = self.sender.lock().unwrap_or_else(|p| p.into_inner());
        if sender.send(job).is_err() {
            debug!("Warm-up worker unavailable, job dropped");
        }
    }
}

/// Queues jobs until the host runs them at an idle point
#[derive(Default)]
pub struct DeferredScheduler {
    queue: Mutex<VecDeque<Job>>,
}

impl DeferredScheduler {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn pending(&self) -> usize {
        self.queue.lock().unwrap_or_else(|p| p.into_inner()).len()
    }

    /// Run every queued job, returning how many ran
    ///
    /// Jobs scheduled while draining run in the same call.
    pub fn run_pending(&self) -> usize {
        let mut ran = 0;
        loop {
            let job = self.queue.lock().unwrap_or_else(|p| p.into_inner()).pop_front();
            match job {
                Some(job) => {
                    job();
                    ran += 1;
                }
                None => return ran,
            }
        }
    }
}

impl WarmupScheduler for DeferredScheduler {
    fn schedule(&self, job: Job) {
        self.queue.lock().unwrap_or_else(|p| p.into_inner()).push_back(job);
    }
}

/// Discards every job
#[derive(Debug, Default, Clone, Copy)]
pub struct NoopScheduler;

impl WarmupScheduler for NoopScheduler {
    fn schedule(&self, _job: Job) {}
}

/// Build the scheduler selected by configuration
pub fn scheduler_from_config(config: &WarmupConfig) -> std::io::Result<Arc<dyn WarmupScheduler>> {
    let scheduler: Arc<dyn WarmupScheduler> = match config.mode {
        WarmupMode::Background => Arc::new(IdleWorker::spawn(config.thread_name.clone())?),
        WarmupMode::Deferred => Arc::new(DeferredScheduler::new()),
        WarmupMode::Disabled => Arc::new(NoopScheduler),
    };
    Ok(scheduler)
}

/// Schedule compilation of the root validator for `schema`
///
/// Compile failures are logged and discarded; they surface again on the
/// first real `validate` call.
pub fn warm_up(scheduler: &dyn WarmupScheduler, cache: &Arc<ValidatorCache>, schema: &Arc<Schema>) {
    let cache = Arc::clone(cache);
    let schema = Arc::clone(schema);
    scheduler.schedule(Box::new(move || {
        match cache.get_or_compile(schema.as_ref(), "") {
            Ok(_) => debug!(schema_hash = schema.hash().short(), "Root validator warmed up"),
            Err(e) => warn!(
                schema_hash = schema.hash().short(),
                schema_name = schema.name.as_deref().unwrap_or(""),
                error = %e,
                "Warm-up compilation failed"
            ),
        }
    }));
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use std::sync::mpsc::channel;
    use std::time::Duration;

    #[test]
    fn test_deferred_runs_on_demand() {
        let scheduler = DeferredScheduler::new();
        let cache = Arc::new(ValidatorCache::default());
        let schema = Arc::new(Schema::new(json!({"type": "object"})));

        warm_up(&scheduler, &cache, &schema);
        assert_eq!(scheduler.pending(), 1);
        assert!(cache.is_empty());

        assert_eq!(scheduler.run_pending(), 1);
        assert!(cache.contains(schema.hash(), ""));
        assert_eq!(scheduler.pending(), 0);
    }

    #[test]
    fn test_warmup_failure_is_swallowed() {
        let scheduler = DeferredScheduler::new();
        let cache = Arc::new(ValidatorCache::default());
        let broken = Arc::new(Schema::new(json!({"type": 42})));

        warm_up(&scheduler, &cache, &broken);
        assert_eq!(scheduler.run_pending(), 1);
        assert!(cache.is_empty());
        assert_eq!(cache.stats().compile_failures, 1);
    }

    #[test]
    fn test_idle_worker_runs_jobs() {
        let worker = IdleWorker::spawn("test-warmup").unwrap();
        let (tx, rx) = channel();
        worker.schedule(Box::new(move || {
            tx.send(thread::current().name().map(String::from)).unwrap();
        }));

        let name = rx.recv_timeout(Duration::from_secs(5)).unwrap();
        assert_eq!(name.as_deref(), Some("test-warmup"));
    }

    #[test]
    fn test_idle_worker_survives_panicking_job() {
        let worker = IdleWorker::spawn("test-warmup-panic").unwrap();
        let (tx, rx) = channel();
        worker.schedule(Box::new(|| panic!("engine blew up")));
        worker.schedule(Box::new(move || {
            tx.send(()).unwrap();
        }));

        assert!(rx.recv_timeout(Duration::from_secs(5)).is_ok());
    }

    #[test]
    fn test_noop_drops_jobs() {
        let cache = Arc::new(ValidatorCache::default());
        let schema = Arc::new(Schema::new(json!({"type": "string"})));
        warm_up(&NoopScheduler, &cache, &schema);
        assert!(cache.is_empty());
    }
}
