use std::any::Any;
use std::panic::{self, AssertUnwindSafe};
use std::sync::Arc;

use crossbeam::sync::WaitGroup;

use super::pool::{shrink_oversized, Pool, Reset};
use super::session::Shared;
use super::stats::Stats;
use super::stream::Callback;
use crate::decoder::{Batch, DecodeOptions};
use crate::error::Error;
use crate::scheduler::UnmarshalWork;

/// One block of lines on its way to the callback.
#[derive(Default)]
pub(super) struct Work {
    pub(super) req_buf: Vec<u8>,
    batch: Batch,
    opts: DecodeOptions,
    retain: usize,
    callback: Option<Callback>,
    shared: Option<Arc<Shared>>,
    pending: Option<WaitGroup>,
    stats: Option<Arc<Stats>>,
    pool: Option<Arc<Pool<Box<Work>>>>,
}

impl Work {
    pub(super) fn attach(
        &mut self,
        opts: DecodeOptions,
        retain: usize,
        callback: Callback,
        shared: Arc<Shared>,
        pending: WaitGroup,
        stats: Arc<Stats>,
        pool: Arc<Pool<Box<Work>>>,
    ) {
        self.opts = opts;
        self.retain = retain;
        self.callback = Some(callback);
        self.shared = Some(shared);
        self.pending = Some(pending);
        self.stats = Some(stats);
        self.pool = Some(pool);
    }

    fn run_callback(&mut self) {
        if let (Some(callback), Some(shared)) = (&self.callback, &self.shared) {
            let points = self.batch.points();
            let result = panic::catch_unwind(AssertUnwindSafe(|| callback(points)))
                .unwrap_or_else(|payload| Err(panicked(payload)));
            if let Err(err) = result {
                shared.record_callback_error(("error when processing imported data", err).into());
            }
        }
        // Done.
        self.pending.take();
    }
}

fn panicked(payload: Box<dyn Any + Send>) -> Error {
    let reason = payload
        .downcast_ref::<&str>()
        .map(|s| s.to_string())
        .or_else(|| payload.downcast_ref::<String>().cloned())
        .unwrap_or_else(|| "unknown reason".to_owned());
    format!("callback panicked: {}", reason).into()
}

impl UnmarshalWork for Work {
    fn unmarshal(mut self: Box<Self>) {
        let Work {
            req_buf,
            batch,
            opts,
            ..
        } = &mut *self;
        batch.unmarshal(&req_buf[..], *opts);

        if let Some(stats) = &self.stats {
            stats.record_rows_read(self.batch.len());
        }
        self.run_callback();

        if let Some(pool) = self.pool.take() {
            let retain = self.retain;
            shrink_oversized(&mut self.req_buf, retain);
            pool.put(self);
        }
    }
}

impl Reset for Work {
    fn reset(&mut self) {
        self.req_buf.clear();
        self.batch.reset();
        self.opts = DecodeOptions::default();
        self.retain = 0;
        self.callback = None;
        self.shared = None;
        self.pending = None;
        self.stats = None;
        self.pool = None;
    }
}
