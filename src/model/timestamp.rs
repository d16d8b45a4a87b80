use chrono::prelude::*;

// Unix timestamp in milliseconds.
pub type Timestamp = i64;

const MILLIS_PER_SECOND: i64 = 1000;
const NANOS_PER_MILLI: i64 = 1_000_000;

pub trait TimestampTrait: Sized {
    fn from_clock(clock: i64, ns: i64) -> Option<Self>;
    fn to_string_millis(&self) -> String;
}

impl TimestampTrait for Timestamp {
    /// Combines the agent's `clock` (seconds) and `ns` (nanoseconds) fields.
    /// The sub-millisecond part is floored, never rounded.
    #[inline]
    fn from_clock(clock: i64, ns: i64) -> Option<Self> {
        clock
            .checked_mul(MILLIS_PER_SECOND)?
            .checked_add(ns.div_euclid(NANOS_PER_MILLI))
    }

    fn to_string_millis(&self) -> String {
        match Utc.timestamp_millis_opt(*self).single() {
            Some(ts) => ts.format("%Y-%m-%dT%H:%M:%S%.3f").to_string(),
            None => self.to_string(),
        }
    }
}
