use std::sync::{Mutex, PoisonError};

use super::encoder::Encoder;
use super::writer::Writer;
use crate::error::Result;
use crate::ingest::Sink;
use crate::model::Point;

/// Sink that encodes every point into one line of the underlying writer.
pub struct Output {
    writer: Mutex<Box<dyn Writer>>,
    encoder: Box<dyn Encoder>,
}

impl Output {
    pub fn new(writer: Box<dyn Writer>, encoder: Box<dyn Encoder>) -> Self {
        Self {
            writer: Mutex::new(writer),
            encoder,
        }
    }
}

impl Sink for Output {
    fn write(&self, points: &[Point]) -> Result<()> {
        let lines = points
            .iter()
            .map(|p| self.encoder.encode(p))
            .collect::<Result<Vec<_>>>()?;

        // Lines of one batch stay together.
        let mut writer = self.writer.lock().unwrap_or_else(PoisonError::into_inner);
        for line in &lines {
            writer
                .write(line)
                .map_err(|e| ("writer failed with error", e))?;
        }
        Ok(())
    }

    fn flush(&self) -> Result<()> {
        self.writer
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .flush()
            .map_err(|e| ("cannot flush output", e).into())
    }
}
