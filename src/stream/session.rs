use std::io::Read;
use std::mem;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use crossbeam::sync::WaitGroup;
use tracing::warn;

use super::lines::read_lines_block;
use super::pool::{shrink_oversized, Reset};
use super::stats::Stats;
use super::stream::StreamOptions;
use crate::error::{Error, Result};

/// State shared between a session and the work units it scheduled.
#[derive(Debug, Default)]
pub(super) struct Shared {
    callback_err: Mutex<Option<Error>>,
}

impl Shared {
    fn lock(&self) -> MutexGuard<'_, Option<Error>> {
        self.callback_err
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
    }

    pub(super) fn has_callback_error(&self) -> bool {
        self.lock().is_some()
    }

    /// Keeps the first error; later ones are dropped.
    pub(super) fn record_callback_error(&self, err: Error) {
        let mut slot = self.lock();
        if slot.is_none() {
            warn!(error = %err, "callback failed; no more data will be read");
            *slot = Some(err);
        }
    }

    fn take_callback_error(&self) -> Option<Error> {
        self.lock().take()
    }
}

/// Per-call reading state.
pub(super) struct Session {
    pub(super) req_buf: Vec<u8>,
    tail_buf: Vec<u8>,
    err: Option<Error>,
    eof: bool,
    pending: WaitGroup,
    shared: Arc<Shared>,
}

impl Default for Session {
    fn default() -> Self {
        Self {
            req_buf: Vec::new(),
            tail_buf: Vec::new(),
            err: None,
            eof: false,
            pending: WaitGroup::new(),
            shared: Arc::new(Shared::default()),
        }
    }
}

impl Session {
    /// Reads the next block into `req_buf`. Returns `false` at the end of the
    /// stream, on a read error, or once any callback has failed.
    pub(super) fn read<R: Read + ?Sized>(
        &mut self,
        r: &mut R,
        opts: &StreamOptions,
        stats: &Stats,
    ) -> bool {
        stats.record_read_call();
        if self.eof || self.err.is_some() || self.shared.has_callback_error() {
            return false;
        }

        match read_lines_block(
            r,
            &mut self.req_buf,
            &mut self.tail_buf,
            opts.block_size,
            opts.max_line_len,
        ) {
            Ok(true) => true,
            Ok(false) => {
                self.eof = true;
                false
            }
            Err(err) => {
                stats.record_read_error();
                warn!(error = %err, "cannot read zabbixconnector data");
                self.err = Some(("cannot read zabbixconnector data", err).into());
                false
            }
        }
    }

    /// Registers one more outstanding work unit. The unit signals completion
    /// by dropping the returned guard.
    #[inline]
    pub(super) fn track(&self) -> WaitGroup {
        self.pending.clone()
    }

    pub(super) fn shrink_buffers(&mut self, limit: usize) {
        shrink_oversized(&mut self.req_buf, limit);
        shrink_oversized(&mut self.tail_buf, limit);
    }

    #[inline]
    pub(super) fn shared(&self) -> Arc<Shared> {
        Arc::clone(&self.shared)
    }

    /// Blocks until every tracked unit is done, then reports the read error
    /// or, failing that, the first callback error.
    pub(super) fn finish(&mut self) -> Result<()> {
        mem::replace(&mut self.pending, WaitGroup::new()).wait();

        if let Some(err) = self.err.take() {
            return Err(err);
        }
        match self.shared.take_callback_error() {
            Some(err) => Err(err),
            None => Ok(()),
        }
    }
}

impl Reset for Session {
    fn reset(&mut self) {
        self.req_buf.clear();
        self.tail_buf.clear();
        self.err = None;
        self.eof = false;
        self.pending = WaitGroup::new();
        self.shared.take_callback_error();
    }
}
