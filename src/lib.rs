pub mod cliopt;
pub mod decoder;
pub mod error;
pub mod ingest;
pub mod limiter;
pub mod model;
pub mod output;
pub mod parser;
pub mod scheduler;
pub mod stream;
