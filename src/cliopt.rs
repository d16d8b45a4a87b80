use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use structopt::StructOpt;

use crate::decoder::DecodeOptions;
use crate::error::Result;
use crate::ingest::{Ingester, Sink};
use crate::limiter::ConcurrencyLimiter;
use crate::model::Label;
use crate::output::Encoding;
use crate::parser::{parse_bytes, parse_duration};
use crate::scheduler::WorkerPool;
use crate::stream::{Stream, StreamOptions, AVAILABLE_CPUS};

#[derive(Debug, StructOpt)]
#[structopt(name = "zbxstream", about = "zbxstream command line arguments")]
pub struct CliOpt {
    /// Zabbix connector export file; stdin when absent.
    #[structopt(parse(from_os_str))]
    pub input: Option<PathBuf>,

    /// Add a `<group>=1` label per host group.
    #[structopt(long = "include-groups")]
    pub include_groups: bool,

    /// Keep tags with an empty value as `<tag>=1`.
    #[structopt(long = "include-empty-tag-values")]
    pub include_empty_tag_values: bool,

    #[structopt(long = "max-line-len", default_value = "32MiB", parse(try_from_str = parse_bytes))]
    pub max_line_len: usize,

    #[structopt(long = "block-size", default_value = "64KiB", parse(try_from_str = parse_bytes))]
    pub block_size: usize,

    #[structopt(long = "gzip", short = "z")]
    pub gzip: bool,

    /// Decode workers; defaults to the number of available CPUs.
    #[structopt(long = "workers", short = "w")]
    pub workers: Option<usize>,

    /// Defaults to twice the number of available CPUs.
    #[structopt(long = "max-concurrent-inserts")]
    pub max_concurrent_inserts: Option<usize>,

    #[structopt(long = "max-queue-duration", default_value = "1m", parse(try_from_str = parse_duration))]
    pub max_queue_duration: Duration,

    #[structopt(long = "extra-label", short = "l", number_of_values = 1, parse(try_from_str = parse_label))]
    pub extra_labels: Vec<Label>,

    #[structopt(long = "encode", short = "e", default_value = "json")]
    pub encode: Encoding,

    #[structopt(long = "log-level", default_value = "info")]
    pub log_level: String,
}

impl CliOpt {
    pub fn stream_options(&self) -> StreamOptions {
        StreamOptions {
            decode: DecodeOptions {
                include_groups: self.include_groups,
                include_empty_tag_values: self.include_empty_tag_values,
            },
            max_line_len: self.max_line_len,
            block_size: self.block_size,
        }
    }

    pub fn ingester(&self, sink: Arc<dyn Sink>) -> Result<Ingester> {
        let workers = self.workers.unwrap_or(*AVAILABLE_CPUS);
        let limiter = ConcurrencyLimiter::new(
            self.max_concurrent_inserts.unwrap_or(2 * *AVAILABLE_CPUS),
            self.max_queue_duration,
        );

        let stream = Stream::new(
            self.stream_options(),
            Arc::new(WorkerPool::new(workers)?),
            Arc::new(limiter),
        );
        Ok(Ingester::new(stream, self.extra_labels.clone(), sink))
    }
}

fn parse_label(s: &str) -> Result<Label> {
    Label::parse(s).ok_or_else(|| format!("invalid label `{}`; expected `name=value`", s).into())
}
