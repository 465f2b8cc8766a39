use std::time::Duration;
use config::Config;
use futures::prelude::*;
use futures::stream::FuturesUnordered;
use tokio::task::JoinError;
use tokio::time::timeout;

use crate::{AppError, AppResult, Context, SharedRef};

pub type SpawnResult = tokio::task::JoinHandle<AppResult<String>>;
pub type WorkerRef = Box<dyn Worker + Send + Sync>;

/// Default time other workers get to finish once the first one has exited
pub const DEFAULT_WORKER_TIMEOUT_MILLIS: u64 = 5000;

/// A trait that defines an interface for a worker
pub trait Worker {
    /// Spawns a new worker into a tokio task
    fn spawn(&mut self) -> SpawnResult;

    /// Checks if the worker is running
    fn is_running(&self) -> bool {
        true
    }
}

#[derive(Default, Clone)]
pub struct RunningFlag {
    running: SharedRef<bool>,
}

impl RunningFlag {
    pub fn stop(&self) {
        *self.running.lock() = false;
    }

    pub fn is_running(&self) -> bool {
        *self.running.lock()
    }

    pub fn start(&self) {
        *self.running.lock() = true;
    }
}

/// A group of workers that live and die together.
///
/// The first worker to finish makes the group send an exit signal to the
/// others, which then get `worker_timeout_millis` to wind down.
pub struct Workers {
    context: Context,
    delay_millis: u64,
    workers: Vec<WorkerRef>,
    running: RunningFlag
}


impl Workers {
    pub fn new(context: Context, delay_millis: u64) -> Self {
        Self {
            context,
            delay_millis,
            workers: vec![],
            running: RunningFlag::default(),
        }
    }

    pub fn add_worker(&mut self, worker: WorkerRef) {
        self.workers.push(worker);
    }

    pub fn len(&self) -> usize {
        self.workers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.workers.is_empty()
    }

    pub async fn run(&mut self) -> AppResult<String> {
        self.spawn()
            .await
            .map_err(|e| AppError::Unrecoverable(format!("{} workers panicked: {}", self.context.name, e)))?
    }
}


/// Time the remaining workers get once the first one exits, after which they
/// are considered failed. Missing, negative or malformed values fall back to
/// the default.
fn worker_timeout_millis(config: &Config) -> u64 {
    config
        .get_int("worker_timeout_millis")
        .ok()
        .and_then(|millis| u64::try_from(millis).ok())
        .unwrap_or(DEFAULT_WORKER_TIMEOUT_MILLIS)
}

/// Logs the outcome of a single worker, returning whether it failed
fn log_worker_result(name: &str, result: Result<AppResult<String>, JoinError>) -> bool {
    match result {
        Ok(Ok(worker)) => {
            log::info!("worker {} exited", worker);
            false
        }
        Ok(Err(err)) => {
            log::error!("{} worker failed with error: {:?}", name, err);
            true
        }
        Err(err) => {
            log::error!("worker error - {:?}", err);
            true
        }
    }
}


impl Worker for Workers {
    fn is_running(&self) -> bool {
        self.running.is_running()
    }

    fn spawn(&mut self) -> SpawnResult {
        let workers = self.workers.drain(..).collect::<Vec<WorkerRef>>();
        let running = self.running.clone();
        let context = self.context.clone();
        let delay_millis = self.delay_millis;
        let timeout_millis = worker_timeout_millis(&context.config);

        log::info!("Starting workers for {}", context.name);
        tokio::spawn(async move {
            running.start();
            tokio::time::sleep(Duration::from_millis(delay_millis)).await;

            let mut futures = vec![];
            for mut worker in workers {
                futures.push(worker.spawn());
            }

            log::info!("{} spawned {} workers", context.name, futures.len());
            // Results arrive as workers complete, in no specific order
            let mut futures = futures.into_iter().collect::<FuturesUnordered<_>>();

            let mut failed = false;
            if let Some(result) = futures.next().await {
                failed |= log_worker_result(&context.name, result);
            }

            // Sending exit signal to the other workers
            if !futures.is_empty() && !context.exit() {
                log::error!("failed to exit");
            }

            if !futures.is_empty() {
                log::warn!("waiting for other workers to complete");
                let timeout_duration = Duration::from_millis(timeout_millis);

                let waited = timeout(timeout_duration, async {
                    let mut failed = false;
                    while let Some(result) = futures.next().await {
                        failed |= log_worker_result(&context.name, result);
                    }
                    failed
                })
                .await;

                match waited {
                    Ok(others_failed) => {
                        failed |= others_failed;
                        log::info!("all workers exited");
                    }
                    Err(_) => {
                        failed = true;
                        log::error!("{} workers did not exit within timeout of {} ms", context.name, timeout_millis);
                    }
                }
            }

            running.stop();
            if failed {
                context.exit_on_failure();
                return Err(AppError::Unrecoverable(format!("{} workers failed", context.name)));
            }
            context.log_and_exit("stopped")
        })
    }
}
