//! Bounded worker pool for subvolume tasks.
//!
//! With the `rayon` feature the pool is a dedicated `rayon::ThreadPool` sized
//! to the worker count. Without it, a fixed set of named threads drains a
//! shared job channel. Jobs must not panic; the engine wraps every task in
//! `catch_unwind` before handing it over.

use crate::util::{CorrDistError, CorrDistResult};

#[cfg(not(feature = "rayon"))]
use std::sync::{mpsc, Arc, Mutex};

#[cfg(not(feature = "rayon"))]
type Job = Box<dyn FnOnce() + Send + 'static>;

pub(crate) struct WorkerPool {
    workers: usize,
    #[cfg(feature = "rayon")]
    pool: rayon::ThreadPool,
    #[cfg(not(feature = "rayon"))]
    jobs: mpsc::Sender<Job>,
}

impl WorkerPool {
    #[cfg(feature = "rayon")]
    pub(crate) fn new(workers: usize) -> CorrDistResult<Self> {
        let workers = workers.max(1);
        let pool = rayon::ThreadPoolBuilder::new()
            .num_threads(workers)
            .thread_name(|idx| format!("corrdist-worker-{idx}"))
            .build()
            .map_err(|err| CorrDistError::WorkerPool(err.to_string()))?;
        Ok(Self { workers, pool })
    }

    #[cfg(not(feature = "rayon"))]
    pub(crate) fn new(workers: usize) -> CorrDistResult<Self> {
        let workers = workers.max(1);
        let (jobs, queue) = mpsc::channel::<Job>();
        let queue = Arc::new(Mutex::new(queue));
        for idx in 0..workers {
            let queue = Arc::clone(&queue);
            std::thread::Builder::new()
                .name(format!("corrdist-worker-{idx}"))
                .spawn(move || loop {
                    let next = match queue.lock() {
                        Ok(rx) => rx.recv(),
                        Err(_) => break,
                    };
                    match next {
                        Ok(job) => job(),
                        Err(_) => break,
                    }
                })
                .map_err(|err| CorrDistError::WorkerPool(err.to_string()))?;
        }
        Ok(Self { workers, jobs })
    }

    pub(crate) fn workers(&self) -> usize {
        self.workers
    }

    #[cfg(feature = "rayon")]
    pub(crate) fn spawn(&self, job: impl FnOnce() + Send + 'static) -> CorrDistResult<()> {
        self.pool.spawn(job);
        Ok(())
    }

    #[cfg(not(feature = "rayon"))]
    pub(crate) fn spawn(&self, job: impl FnOnce() + Send + 'static) -> CorrDistResult<()> {
        self.jobs
            .send(Box::new(job))
            .map_err(|_| CorrDistError::WorkerPool("worker threads exited".to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::WorkerPool;
    use std::sync::mpsc;

    #[test]
    fn pool_runs_every_job() {
        let pool = WorkerPool::new(3).unwrap();
        assert_eq!(pool.workers(), 3);
        let (tx, rx) = mpsc::channel();
        for idx in 0..10usize {
            let tx = tx.clone();
            pool.spawn(move || {
                let _ = tx.send(idx * idx);
            })
            .unwrap();
        }
        drop(tx);
        let mut seen: Vec<usize> = rx.iter().collect();
        seen.sort_unstable();
        assert_eq!(seen, (0..10).map(|i| i * i).collect::<Vec<_>>());
    }
}
