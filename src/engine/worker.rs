// Worker pool for parallel file encoding

use std::collections::VecDeque;
use std::path::{Path, PathBuf};
use std::sync::mpsc;
use std::sync::{Arc, Mutex, PoisonError};
use std::thread;

use super::TranscodeOutcome;

/// Message from worker to main thread
#[derive(Debug, Clone)]
pub enum WorkerMessage {
    /// File picked up by a worker
    FileStarted { worker_id: usize, index: usize },

    /// File finished, successfully or not
    FileFinished {
        worker_id: usize,
        index: usize,
        outcome: TranscodeOutcome,
    },

    /// Worker found the queue empty and exited
    WorkerIdle { worker_id: usize },
}

/// Bounded pool running one file per worker at a time
pub struct WorkerPool {
    max_workers: usize,
    active_workers: Arc<Mutex<usize>>,
}

impl WorkerPool {
    /// Create a new worker pool
    pub fn new(max_workers: usize) -> Self {
        Self {
            max_workers: max_workers.max(1),
            active_workers: Arc::new(Mutex::new(0)),
        }
    }

    /// Get the maximum number of workers
    pub fn max_workers(&self) -> usize {
        self.max_workers
    }

    /// Get the number of workers currently encoding
    pub fn active_count(&self) -> usize {
        *self
            .active_workers
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
    }

    /// Process `files` with up to `max_workers` threads.
    ///
    /// `job` runs on the worker threads; `on_message` runs on the calling
    /// thread, which stays the single writer for any shared reporting.
    pub fn run<J, H>(&self, files: &[PathBuf], job: J, mut on_message: H)
    where
        J: Fn(usize, &Path) -> TranscodeOutcome + Sync,
        H: FnMut(WorkerMessage),
    {
        let queue: Mutex<VecDeque<(usize, &Path)>> = Mutex::new(
            files
                .iter()
                .enumerate()
                .map(|(i, p)| (i, p.as_path()))
                .collect(),
        );
        let workers = self.max_workers.min(files.len());
        let (tx, rx) = mpsc::channel();

        thread::scope(|scope| {
            for worker_id in 0..workers {
                let tx = tx.clone();
                let queue = &queue;
                let job = &job;
                let active = self.active_workers.clone();

                scope.spawn(move || {
                    loop {
                        let next = queue
                            .lock()
                            .unwrap_or_else(PoisonError::into_inner)
                            .pop_front();
                        let Some((index, path)) = next else {
                            break;
                        };

                        *active.lock().unwrap_or_else(PoisonError::into_inner) += 1;
                        let _ = tx.send(WorkerMessage::FileStarted { worker_id, index });

                        let outcome = job(index, path);

                        *active.lock().unwrap_or_else(PoisonError::into_inner) -= 1;
                        let _ = tx.send(WorkerMessage::FileFinished {
                            worker_id,
                            index,
                            outcome,
                        });
                    }

                    let _ = tx.send(WorkerMessage::WorkerIdle { worker_id });
                });
            }

            // Receiver ends once every worker has dropped its sender
            drop(tx);
            for message in rx {
                on_message(message);
            }
        });
    }
}
