use crate::error::Result;
use crate::model::Point;

/// Storage write path. Called concurrently from decode workers.
pub trait Sink: Send + Sync {
    fn write(&self, points: &[Point]) -> Result<()>;

    fn flush(&self) -> Result<()> {
        Ok(())
    }
}
