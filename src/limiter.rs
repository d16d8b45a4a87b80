//! Limits the number of ingestion streams reading at the same time.
//!
//! A [`LimitedReader`] takes a token from its [`ConcurrencyLimiter`] on the
//! first read after a hand-off and keeps it until the caller releases it
//! through a [`ReleaseHandle`], normally right after the block it read has
//! been scheduled for decoding. Slow decoding therefore throttles reading
//! instead of piling up buffered blocks.

use std::cell::Cell;
use std::io::{self, Read};
use std::rc::Rc;
use std::sync::Arc;
use std::time::Duration;

use crossbeam::channel::{bounded, Receiver, RecvTimeoutError, Sender};
use tracing::warn;

pub const DEFAULT_MAX_QUEUE_DURATION: Duration = Duration::from_secs(60);

pub struct ConcurrencyLimiter {
    tokens_tx: Sender<()>,
    tokens_rx: Receiver<()>,
    capacity: usize,
    max_queue_duration: Duration,
}

impl ConcurrencyLimiter {
    pub fn new(max_concurrent: usize, max_queue_duration: Duration) -> Self {
        let capacity = max_concurrent.max(1);
        let (tokens_tx, tokens_rx) = bounded(capacity);
        for _ in 0..capacity {
            let _ = tokens_tx.try_send(());
        }
        Self {
            tokens_tx,
            tokens_rx,
            capacity,
            max_queue_duration,
        }
    }

    #[inline]
    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Number of tokens nobody holds right now.
    #[inline]
    pub fn available(&self) -> usize {
        self.tokens_rx.len()
    }

    pub fn reader<R: Read>(self: &Arc<Self>, inner: R) -> LimitedReader<R> {
        LimitedReader {
            inner,
            limiter: Arc::clone(self),
            held: Rc::new(Cell::new(false)),
        }
    }

    fn acquire(&self) -> io::Result<()> {
        if self.tokens_rx.try_recv().is_ok() {
            return Ok(());
        }
        match self.tokens_rx.recv_timeout(self.max_queue_duration) {
            Ok(()) => Ok(()),
            Err(RecvTimeoutError::Timeout) | Err(RecvTimeoutError::Disconnected) => {
                warn!(
                    concurrency = self.capacity,
                    "insert request waited too long for a free slot"
                );
                Err(io::Error::new(
                    io::ErrorKind::TimedOut,
                    format!(
                        "cannot process insert request for {:.3} seconds because {} concurrent insert requests are executed",
                        self.max_queue_duration.as_secs_f64(),
                        self.capacity
                    ),
                ))
            }
        }
    }

    #[inline]
    fn release(&self) {
        let _ = self.tokens_tx.try_send(());
    }
}

pub struct LimitedReader<R> {
    inner: R,
    limiter: Arc<ConcurrencyLimiter>,
    held: Rc<Cell<bool>>,
}

impl<R> LimitedReader<R> {
    /// Handle that releases the token held by this reader, if any.
    pub fn release_handle(&self) -> ReleaseHandle {
        ReleaseHandle {
            limiter: Arc::clone(&self.limiter),
            held: Rc::clone(&self.held),
        }
    }
}

impl<R: Read> Read for LimitedReader<R> {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        if !self.held.get() {
            self.limiter.acquire()?;
            self.held.set(true);
        }
        self.inner.read(buf)
    }
}

impl<R> Drop for LimitedReader<R> {
    fn drop(&mut self) {
        if self.held.replace(false) {
            self.limiter.release();
        }
    }
}

pub struct ReleaseHandle {
    limiter: Arc<ConcurrencyLimiter>,
    held: Rc<Cell<bool>>,
}

impl ReleaseHandle {
    #[inline]
    pub fn release(&self) {
        if self.held.replace(false) {
            self.limiter.release();
        }
    }
}
