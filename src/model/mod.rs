mod labels;
mod point;
mod timestamp;

pub use labels::*;
pub use point::*;
pub use timestamp::*;
