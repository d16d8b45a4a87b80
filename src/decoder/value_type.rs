use std::convert::TryFrom;

use crate::error::{Error, Result};

/// Item value types as enumerated by the Zabbix agent.
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub enum ValueType {
    Float,     // 0
    Character, // 1
    Log,       // 2
    Unsigned,  // 3
    Text,      // 4
    Binary,    // 5
}

/// Value types whose history values can be stored as samples.
pub const NUMERIC_VALUE_TYPES: [ValueType; 2] = [ValueType::Float, ValueType::Unsigned];

impl ValueType {
    #[inline]
    pub fn is_numeric(&self) -> bool {
        NUMERIC_VALUE_TYPES.contains(self)
    }
}

impl TryFrom<u64> for ValueType {
    type Error = Error;

    fn try_from(t: u64) -> Result<Self> {
        use ValueType::*;

        match t {
            0 => Ok(Float),
            1 => Ok(Character),
            2 => Ok(Log),
            3 => Ok(Unsigned),
            4 => Ok(Text),
            5 => Ok(Binary),
            _ => Err(format!("unknown value type {}", t).into()),
        }
    }
}
