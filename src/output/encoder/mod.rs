mod encoder;
mod json;
mod prom;

use std::str::FromStr;

pub use encoder::Encoder;
pub use json::JsonEncoder;
pub use prom::PromEncoder;

use crate::error::Error;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Encoding {
    Json,
    Prom,
}

impl Encoding {
    pub fn encoder(self) -> Box<dyn Encoder> {
        match self {
            Encoding::Json => Box::new(JsonEncoder::new()),
            Encoding::Prom => Box::new(PromEncoder::new()),
        }
    }
}

impl Default for Encoding {
    fn default() -> Self {
        Encoding::Json
    }
}

impl FromStr for Encoding {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "json" => Ok(Encoding::Json),
            "prom" => Ok(Encoding::Prom),
            _ => Err(format!("unknown encoding `{}`; expected `json` or `prom`", s).into()),
        }
    }
}
