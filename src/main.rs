use std::fs::File;
use std::io::{self, BufWriter};
use std::sync::Arc;

use structopt::StructOpt;
use tracing::info;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use zbxstream::cliopt::CliOpt;
use zbxstream::output::{LineWriter, Output};

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let opt = CliOpt::from_args();
    init_logging(&opt.log_level)?;

    let output = Arc::new(Output::new(
        Box::new(LineWriter::new(BufWriter::new(io::stdout()))),
        opt.encode.encoder(),
    ));
    let ingester = opt.ingester(output)?;

    match &opt.input {
        Some(path) => {
            let file = File::open(path)
                .map_err(|e| format!("cannot open {}: {}", path.display(), e))?;
            ingester.ingest(file, opt.gzip)?;
        }
        None => ingester.ingest(io::stdin(), opt.gzip)?,
    }
    ingester.flush()?;

    let stats = ingester.stats().snapshot();
    info!(
        read_calls = stats.read_calls,
        read_errors = stats.read_errors,
        rows_read = stats.rows_read,
        blocks = stats.blocks_scheduled,
        rows_inserted = stats.rows_inserted,
        "ingestion finished"
    );

    Ok(())
}

fn init_logging(level: &str) -> Result<(), Box<dyn std::error::Error>> {
    let filter = EnvFilter::try_new(level)
        .or_else(|_| EnvFilter::try_new("info"))
        .map_err(|e| format!("invalid log level: {}", e))?;

    tracing_subscriber::registry()
        .with(fmt::layer().with_writer(io::stderr).with_target(true))
        .with(filter)
        .init();

    Ok(())
}
