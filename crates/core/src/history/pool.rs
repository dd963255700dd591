//! Fork-join worker pool with bounded waits
//!
//! Each task runs on a rayon pool and hands its result back through its own
//! one-shot channel. The caller collects handles in submission order; every
//! wait is bounded by a shared deadline, and a task that panics is reported
//! instead of blocking the caller.

use std::sync::mpsc::{sync_channel, Receiver, RecvTimeoutError};
use std::time::Instant;
use tracing::error;

/// Why a task handle produced no value
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WaitError {
    /// The deadline passed first
    Timeout,
    /// The task ended without sending (it panicked)
    Disconnected,
}

/// Pending result of a spawned task
#[derive(Debug)]
pub struct TaskHandle<T> {
    receiver: Receiver<T>,
}

impl<T> TaskHandle<T> {
    /// Block until the task delivers or `deadline` passes
    pub fn wait_until(self, deadline: Instant) -> Result<T, WaitError> {
        let remaining = deadline.saturating_duration_since(Instant::now());
        self.receiver.recv_timeout(remaining).map_err(|err| match err {
            RecvTimeoutError::Timeout => WaitError::Timeout,
            RecvTimeoutError::Disconnected => WaitError::Disconnected,
        })
    }
}

/// Thread pool running independent aggregation tasks
#[derive(Debug)]
pub struct WorkerPool {
    pool: rayon::ThreadPool,
}

impl WorkerPool {
    /// Build a pool with `threads` workers (0 = rayon default)
    pub fn new(threads: usize) -> Result<Self, rayon::ThreadPoolBuildError> {
        let pool = rayon::ThreadPoolBuilder::new()
            .num_threads(threads)
            .thread_name(|index| format!("wind-worker-{index}"))
            .panic_handler(|payload| {
                let message = payload
                    .downcast_ref::<&str>()
                    .map(ToString::to_string)
                    .or_else(|| payload.downcast_ref::<String>().cloned())
                    .unwrap_or_else(|| "unknown panic".to_string());
                error!("Aggregation worker panicked: {message}");
            })
            .build()?;
        Ok(Self { pool })
    }

    pub fn threads(&self) -> usize {
        self.pool.current_num_threads()
    }

    /// Run `task` on the pool and return a handle to its result
    pub fn spawn<T, F>(&self, task: F) -> TaskHandle<T>
    where
        T: Send + 'static,
        F: FnOnce() -> T + Send + 'static,
    {
        let (sender, receiver) = sync_channel(1);
        self.pool.spawn(move || {
            // The receiver is gone when the caller already timed out
            let _ = sender.send(task());
        });
        TaskHandle { receiver }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    #[test]
    fn test_results_arrive_in_submission_order() {
        let pool = WorkerPool::new(4).unwrap();
        let handles: Vec<_> = (0..12u64)
            .map(|month| {
                pool.spawn(move || {
                    std::thread::sleep(Duration::from_millis(12 - month));
                    month * 10
                })
            })
            .collect();

        let deadline = Instant::now() + Duration::from_secs(10);
        let results: Vec<u64> = handles
            .into_iter()
            .map(|handle| handle.wait_until(deadline).unwrap())
            .collect();
        assert_eq!(results, (0..12).map(|m| m * 10).collect::<Vec<_>>());
    }

    #[test]
    fn test_slow_task_times_out() {
        let pool = WorkerPool::new(1).unwrap();
        let handle = pool.spawn(|| {
            std::thread::sleep(Duration::from_millis(500));
            1
        });
        let deadline = Instant::now() + Duration::from_millis(20);
        assert_eq!(handle.wait_until(deadline), Err(WaitError::Timeout));
    }

    #[test]
    fn test_panicking_task_is_reported() {
        let pool = WorkerPool::new(1).unwrap();
        let handle = pool.spawn(|| -> u32 { panic!("boom") });
        let deadline = Instant::now() + Duration::from_secs(10);
        assert_eq!(handle.wait_until(deadline), Err(WaitError::Disconnected));
    }
}
