mod bytesize;
mod duration;
mod result;

pub use bytesize::parse_bytes;
pub use duration::parse_duration;
