use parking_lot::Mutex;
use shared::{Error, Result};
use std::panic::{self, AssertUnwindSafe};
use std::sync::Arc;
use std::sync::mpsc;
use std::thread;
use tokio::sync::oneshot;
use tracing::{debug, error};

type Job = Box<dyn FnOnce() + Send + 'static>;

/// Fixed-size pool of OS threads for blocking jobs.
///
/// Submissions never block and are never rejected: jobs queue unbounded until
/// a worker frees up, so the worker count is the only bound on concurrently
/// running jobs. A panicking job is delivered to its handle as an error and
/// the worker moves on.
///
/// Dropping the pool closes the queue, lets the workers drain what is already
/// queued, and joins them.
pub struct WorkerPool {
    sender: Option<mpsc::Sender<Job>>,
    workers: Vec<thread::JoinHandle<()>>,
}

/// Awaitable handle to a submitted job.
pub struct JobHandle<T> {
    receiver: oneshot::Receiver<Result<T>>,
}

impl<T> JobHandle<T> {
    /// Wait for the job to finish and yield its outcome.
    pub async fn join(self) -> Result<T> {
        match self.receiver.await {
            Ok(outcome) => outcome,
            Err(_) => Err(Error::Internal("worker pool dropped the job".into())),
        }
    }
}

impl WorkerPool {
    pub fn new(workers: usize) -> Self {
        assert!(workers > 0, "worker pool needs at least one worker");
        let (sender, receiver) = mpsc::channel::<Job>();
        let receiver = Arc::new(Mutex::new(receiver));
        let workers = (0..workers)
            .map(|id| {
                let receiver = Arc::clone(&receiver);
                thread::Builder::new()
                    .name(format!("timbre-worker-{id}"))
                    .spawn(move || worker_loop(id, receiver))
                    .expect("failed to spawn worker thread")
            })
            .collect();
        Self {
            sender: Some(sender),
            workers,
        }
    }

    /// Queue a blocking job and return immediately with a handle for its
    /// result.
    pub fn submit<T, F>(&self, job: F) -> JobHandle<T>
    where
        T: Send + 'static,
        F: FnOnce() -> Result<T> + Send + 'static,
    {
        let (tx, rx) = oneshot::channel();
        let wrapped: Job = Box::new(move || {
            let outcome = panic::catch_unwind(AssertUnwindSafe(job))
                .unwrap_or_else(|_| Err(Error::Internal("worker job panicked".into())));
            // The submitter may have stopped waiting; its result is dropped.
            let _ = tx.send(outcome);
        });
        match &self.sender {
            Some(sender) => {
                if sender.send(wrapped).is_err() {
                    error!("worker pool queue is closed, dropping job");
                }
            }
            None => error!("worker pool is shut down, dropping job"),
        }
        JobHandle { receiver: rx }
    }

    pub fn workers(&self) -> usize {
        self.workers.len()
    }
}

impl Drop for WorkerPool {
    fn drop(&mut self) {
        drop(self.sender.take());
        for worker in self.workers.drain(..) {
            if worker.join().is_err() {
                error!("worker thread panicked during shutdown");
            }
        }
    }
}

fn worker_loop(id: usize, receiver: Arc<Mutex<mpsc::Receiver<Job>>>) {
    debug!(worker = id, "worker started");
    loop {
        // Only the thread holding the lock blocks in recv; the guard is
        // released before the job runs, so jobs execute in parallel.
        let job = {
            let guard = receiver.lock();
            guard.recv()
        };
        match job {
            Ok(job) => job(),
            // Queue closed and drained.
            Err(_) => break,
        }
    }
    debug!(worker = id, "worker stopped");
}
