use super::labels::{Label, Labels};
use super::timestamp::Timestamp;

pub type SampleValue = f64;

/// One decoded measurement.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Point {
    pub labels: Labels,
    pub value: SampleValue,
    pub timestamp: Timestamp,
}

impl Point {
    pub fn new(labels: Labels, value: SampleValue, timestamp: Timestamp) -> Self {
        Self {
            labels,
            value,
            timestamp,
        }
    }

    #[inline]
    pub fn push_label<K, V>(&mut self, key: K, value: V)
    where
        K: Into<Vec<u8>>,
        V: Into<Vec<u8>>,
    {
        self.labels.push(Label::new(key, value));
    }
}
