use std::io::Read;
use std::sync::Arc;

use flate2::read::MultiGzDecoder;
use tracing::{debug, trace};

use super::pool::Pool;
use super::session::Session;
use super::stats::Stats;
use super::work::Work;
use super::AVAILABLE_CPUS;
use crate::decoder::DecodeOptions;
use crate::error::Result;
use crate::limiter::ConcurrencyLimiter;
use crate::model::Point;
use crate::scheduler::Scheduler;

pub const DEFAULT_MAX_LINE_LEN: usize = 32 * 1024 * 1024;
pub const DEFAULT_BLOCK_SIZE: usize = 64 * 1024;

// Pooled buffers larger than this many blocks are released.
const RETAINED_BLOCKS: usize = 4;

/// Receives the points of one block. The slice is only valid for the
/// duration of the call; copy whatever has to be kept.
pub type Callback = Arc<dyn Fn(&[Point]) -> Result<()> + Send + Sync>;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StreamOptions {
    pub decode: DecodeOptions,
    pub max_line_len: usize,
    pub block_size: usize,
}

impl Default for StreamOptions {
    fn default() -> Self {
        Self {
            decode: DecodeOptions::default(),
            max_line_len: DEFAULT_MAX_LINE_LEN,
            block_size: DEFAULT_BLOCK_SIZE,
        }
    }
}

/// Splits a stream of records into blocks and hands each block to the
/// scheduler for decoding.
pub struct Stream {
    opts: StreamOptions,
    scheduler: Arc<dyn Scheduler>,
    limiter: Arc<ConcurrencyLimiter>,
    sessions: Pool<Session>,
    works: Arc<Pool<Box<Work>>>,
    stats: Arc<Stats>,
}

impl Stream {
    pub fn new(
        opts: StreamOptions,
        scheduler: Arc<dyn Scheduler>,
        limiter: Arc<ConcurrencyLimiter>,
    ) -> Self {
        Self {
            opts,
            scheduler,
            limiter,
            sessions: Pool::new(*AVAILABLE_CPUS),
            works: Arc::new(Pool::new(*AVAILABLE_CPUS)),
            stats: Arc::new(Stats::default()),
        }
    }

    #[inline]
    pub fn stats(&self) -> &Arc<Stats> {
        &self.stats
    }

    /// Decodes the whole stream, calling `callback` once per scheduled
    /// block. Returns after every scheduled block has been processed.
    ///
    /// A read error takes precedence over a callback error. After the first
    /// callback error no more data is read.
    pub fn parse<R: Read>(&self, r: R, is_gzipped: bool, callback: Callback) -> Result<()> {
        let mut lr = self.limiter.reader(r);
        let handle = lr.release_handle();

        if is_gzipped {
            let mut gz = MultiGzDecoder::new(&mut lr);
            self.parse_lines(&mut gz, &callback, || handle.release())
        } else {
            self.parse_lines(&mut lr, &callback, || handle.release())
        }
    }

    fn parse_lines<R, F>(&self, r: &mut R, callback: &Callback, on_scheduled: F) -> Result<()>
    where
        R: Read + ?Sized,
        F: Fn(),
    {
        let retain = self.opts.block_size.saturating_mul(RETAINED_BLOCKS);
        let mut session = self.sessions.get();
        debug!("stream session started");

        while session.read(r, &self.opts, &self.stats) {
            let mut work = self.works.get();
            work.attach(
                self.opts.decode,
                retain,
                Arc::clone(callback),
                session.shared(),
                session.track(),
                Arc::clone(&self.stats),
                Arc::clone(&self.works),
            );
            std::mem::swap(&mut work.req_buf, &mut session.req_buf);

            trace!(bytes = work.req_buf.len(), "scheduling block");
            self.stats.record_block_scheduled();
            self.scheduler.schedule(work);
            on_scheduled();
        }

        let result = session.finish();
        debug!(ok = result.is_ok(), "stream session finished");
        session.shrink_buffers(retain);
        self.sessions.put(session);
        result
    }
}
