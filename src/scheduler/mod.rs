mod scheduler;
mod workers;

pub use scheduler::{InlineScheduler, Scheduler, UnmarshalWork};
pub use workers::WorkerPool;
