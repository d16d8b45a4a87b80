use std::sync::atomic::{AtomicU64, Ordering};

/// Ingestion counters. Updated with relaxed ordering; read them through
/// `snapshot`.
#[derive(Debug, Default)]
pub struct Stats {
    read_calls: AtomicU64,
    read_errors: AtomicU64,
    rows_read: AtomicU64,
    blocks_scheduled: AtomicU64,
    rows_inserted: AtomicU64,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct StatsSnapshot {
    pub read_calls: u64,
    pub read_errors: u64,
    pub rows_read: u64,
    pub blocks_scheduled: u64,
    pub rows_inserted: u64,
}

impl Stats {
    #[inline]
    pub fn record_read_call(&self) {
        self.read_calls.fetch_add(1, Ordering::Relaxed);
    }

    #[inline]
    pub fn record_read_error(&self) {
        self.read_errors.fetch_add(1, Ordering::Relaxed);
    }

    #[inline]
    pub fn record_rows_read(&self, n: usize) {
        self.rows_read.fetch_add(n as u64, Ordering::Relaxed);
    }

    #[inline]
    pub fn record_block_scheduled(&self) {
        self.blocks_scheduled.fetch_add(1, Ordering::Relaxed);
    }

    #[inline]
    pub fn record_rows_inserted(&self, n: usize) {
        self.rows_inserted.fetch_add(n as u64, Ordering::Relaxed);
    }

    pub fn snapshot(&self) -> StatsSnapshot {
        StatsSnapshot {
            read_calls: self.read_calls.load(Ordering::Relaxed),
            read_errors: self.read_errors.load(Ordering::Relaxed),
            rows_read: self.rows_read.load(Ordering::Relaxed),
            blocks_scheduled: self.blocks_scheduled.load(Ordering::Relaxed),
            rows_inserted: self.rows_inserted.load(Ordering::Relaxed),
        }
    }
}
