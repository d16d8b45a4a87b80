/// A unit of work that runs to completion once started.
pub trait UnmarshalWork: Send {
    fn unmarshal(self: Box<Self>);
}

/// Runs submitted work at some point after submission, on any thread.
///
/// `schedule` may block while the scheduler is saturated.
pub trait Scheduler: Send + Sync {
    fn schedule(&self, work: Box<dyn UnmarshalWork>);
}

/// Runs every unit on the submitting thread before `schedule` returns.
#[derive(Debug, Default)]
pub struct InlineScheduler;

impl Scheduler for InlineScheduler {
    #[inline]
    fn schedule(&self, work: Box<dyn UnmarshalWork>) {
        work.unmarshal();
    }
}
