mod batch;
mod decoder;
mod value_type;

pub use batch::Batch;
pub use decoder::{DecodeOptions, RecordDecoder};
pub use value_type::{ValueType, NUMERIC_VALUE_TYPES};
