use std::io::Read;
use std::sync::Arc;

use tracing::trace;

use super::sink::Sink;
use crate::error::Result;
use crate::model::{Labels, Point, TimestampTrait};
use crate::stream::{Callback, Stats, Stream};

/// Feeds decoded points into a sink, adding the configured extra labels.
pub struct Ingester {
    stream: Stream,
    extra_labels: Arc<Labels>,
    sink: Arc<dyn Sink>,
}

impl Ingester {
    pub fn new(stream: Stream, extra_labels: Labels, sink: Arc<dyn Sink>) -> Self {
        Self {
            stream,
            extra_labels: Arc::new(extra_labels),
            sink,
        }
    }

    #[inline]
    pub fn stats(&self) -> &Arc<Stats> {
        self.stream.stats()
    }

    pub fn ingest<R: Read>(&self, r: R, is_gzipped: bool) -> Result<()> {
        let callback = insert_rows(
            Arc::clone(&self.sink),
            Arc::clone(&self.extra_labels),
            Arc::clone(self.stream.stats()),
        );
        self.stream.parse(r, is_gzipped, callback)
    }

    pub fn flush(&self) -> Result<()> {
        self.sink.flush()
    }
}

fn insert_rows(sink: Arc<dyn Sink>, extra_labels: Arc<Labels>, stats: Arc<Stats>) -> Callback {
    Arc::new(move |points: &[Point]| -> Result<()> {
        let mut rows = Vec::with_capacity(points.len());
        for point in points {
            if point.labels.is_empty() && extra_labels.is_empty() {
                trace!("skipping point without labels");
                continue;
            }
            let mut row = point.clone();
            row.labels.extend(extra_labels.iter().cloned());
            rows.push(row);
        }

        let (first, last) = match (rows.first(), rows.last()) {
            (Some(first), Some(last)) => (first.timestamp, last.timestamp),
            _ => return Ok(()),
        };
        trace!(
            rows = rows.len(),
            first = %first.to_string_millis(),
            last = %last.to_string_millis(),
            "inserting rows"
        );
        sink.write(&rows)?;
        stats.record_rows_inserted(rows.len());
        Ok(())
    })
}
