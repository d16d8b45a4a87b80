mod encoder;
mod output;
mod writer;

pub use encoder::{Encoder, Encoding, JsonEncoder, PromEncoder};
pub use output::Output;
pub use writer::{LineWriter, Writer};
