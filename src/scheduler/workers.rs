use std::io;
use std::panic::{self, AssertUnwindSafe};
use std::thread::{self, JoinHandle};

use crossbeam::channel::{bounded, SendError, Sender};
use tracing::{debug, error};

use super::scheduler::{Scheduler, UnmarshalWork};
use crate::error::Result;

/// Fixed set of worker threads fed through a bounded channel.
///
/// The channel holds one pending unit per worker, so `schedule` blocks once
/// every worker is busy and the queue is full.
pub struct WorkerPool {
    tx: Option<Sender<Box<dyn UnmarshalWork>>>,
    workers: Vec<JoinHandle<()>>,
}

impl WorkerPool {
    pub fn new(workers: usize) -> Result<Self> {
        let workers = workers.max(1);
        let (tx, rx) = bounded::<Box<dyn UnmarshalWork>>(workers);

        let handles = (0..workers)
            .map(|i| {
                let rx = rx.clone();
                thread::Builder::new()
                    .name(format!("unmarshal-{}", i))
                    .spawn(move || {
                        for work in rx.iter() {
                            let done = panic::catch_unwind(AssertUnwindSafe(|| work.unmarshal()));
                            if done.is_err() {
                                error!("unmarshal work panicked");
                            }
                        }
                    })
            })
            .collect::<io::Result<Vec<_>>>()
            .map_err(|e| ("cannot start unmarshal workers", e))?;

        debug!(workers, "started unmarshal workers");
        Ok(Self {
            tx: Some(tx),
            workers: handles,
        })
    }

    pub fn len(&self) -> usize {
        self.workers.len()
    }
}

impl Scheduler for WorkerPool {
    fn schedule(&self, work: Box<dyn UnmarshalWork>) {
        let work = match &self.tx {
            Some(tx) => match tx.send(work) {
                Ok(()) => return,
                Err(SendError(work)) => work,
            },
            None => work,
        };
        // No workers left.
        work.unmarshal();
    }
}

impl Drop for WorkerPool {
    fn drop(&mut self) {
        self.tx.take();
        for worker in self.workers.drain(..) {
            let _ = worker.join();
        }
    }
}
