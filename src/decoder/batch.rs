use tracing::trace;

use super::decoder::{DecodeOptions, RecordDecoder};
use crate::model::Point;

/// Points decoded from one block of lines.
///
/// The batch is reused across blocks: `unmarshal` starts from an empty
/// batch, and `reset` drops the points while keeping the allocation.
#[derive(Debug, Default)]
pub struct Batch {
    points: Vec<Point>,
}

impl Batch {
    #[inline]
    pub fn points(&self) -> &[Point] {
        &self.points
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.points.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    pub fn reset(&mut self) {
        self.points.clear();
    }

    /// Decodes every `\n`-separated record in `buf`, skipping blank lines
    /// and records that fail validation.
    pub fn unmarshal(&mut self, buf: &[u8], opts: DecodeOptions) {
        self.reset();

        let decoder = RecordDecoder::new(opts);
        for line in buf.split(|b| *b == b'\n') {
            let line = trim_ascii(line);
            if line.is_empty() {
                continue;
            }

            match decoder.decode(line) {
                Ok(point) => self.points.push(point),
                Err(err) => {
                    trace!(
                        error = %err,
                        line = %String::from_utf8_lossy(line),
                        "dropping invalid record"
                    );
                }
            }
        }
    }
}

fn trim_ascii(mut line: &[u8]) -> &[u8] {
    while let [first, rest @ ..] = line {
        if !first.is_ascii_whitespace() {
            break;
        }
        line = rest;
    }
    while let [rest @ .., last] = line {
        if !last.is_ascii_whitespace() {
            break;
        }
        line = rest;
    }
    line
}
