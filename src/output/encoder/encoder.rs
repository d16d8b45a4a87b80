use crate::error::Result;
use crate::model::Point;

pub trait Encoder: Send + Sync {
    fn encode(&self, point: &Point) -> Result<Vec<u8>>;
}
