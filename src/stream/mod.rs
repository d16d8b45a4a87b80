//! Stream coordination: reading blocks of lines, handing them to the
//! scheduler, and collecting the outcome.

mod lines;
mod pool;
mod session;
mod stats;
mod stream;
mod work;

use std::thread;

use lazy_static::lazy_static;

pub use lines::read_lines_block;
pub use pool::{Pool, Reset};
pub use stats::{Stats, StatsSnapshot};
pub use stream::{Callback, Stream, StreamOptions, DEFAULT_BLOCK_SIZE, DEFAULT_MAX_LINE_LEN};

lazy_static! {
    pub static ref AVAILABLE_CPUS: usize = thread::available_parallelism()
        .map(|n| n.get())
        .unwrap_or(1);
}
