mod ingester;
mod sink;

pub use ingester::Ingester;
pub use sink::Sink;
