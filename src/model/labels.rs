use std::fmt;

pub const LABEL_NAME: &str = "__name__";
pub const LABEL_HOST: &str = "host";
pub const LABEL_HOSTNAME: &str = "hostname";

/// Value used for presence-only labels (groups and tags without a value).
pub const PRESENCE_VALUE: &str = "1";

/// A single `key=value` pair. Both sides are raw bytes, exactly as they
/// appeared on the wire.
#[derive(Clone, Default, PartialEq, Eq)]
pub struct Label {
    pub key: Vec<u8>,
    pub value: Vec<u8>,
}

impl Label {
    pub fn new<K, V>(key: K, value: V) -> Self
    where
        K: Into<Vec<u8>>,
        V: Into<Vec<u8>>,
    {
        Self {
            key: key.into(),
            value: value.into(),
        }
    }

    /// Parses the `name=value` form used on the command line.
    pub fn parse(s: &str) -> Option<Self> {
        let (key, value) = s.split_at(s.find('=')?);
        if key.is_empty() {
            return None;
        }
        Some(Self::new(key, &value[1..]))
    }
}

impl fmt::Debug for Label {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(
            f,
            "{}={:?}",
            String::from_utf8_lossy(&self.key),
            String::from_utf8_lossy(&self.value)
        )
    }
}

/// Ordered label set. Insertion order is significant and keys are not
/// deduplicated.
pub type Labels = Vec<Label>;

pub trait LabelsTrait {
    fn name(&self) -> Option<&[u8]>;
    fn value_of(&self, key: &str) -> Option<&[u8]>;
}

impl LabelsTrait for Labels {
    fn name(&self) -> Option<&[u8]> {
        self.value_of(LABEL_NAME)
    }

    fn value_of(&self, key: &str) -> Option<&[u8]> {
        self.iter()
            .find(|l| l.key == key.as_bytes())
            .map(|l| l.value.as_slice())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_label() {
        #[rustfmt::skip]
        let tests = [
            ("env=prod", Some(Label::new("env", "prod"))),
            ("env=", Some(Label::new("env", ""))),
            ("env=a=b", Some(Label::new("env", "a=b"))),
            ("=prod", None),
            ("env", None),
        ];

        for (input, expected) in &tests {
            assert_eq!(expected, &Label::parse(input), "while parsing {}", input);
        }
    }

    #[test]
    fn test_labels_lookup() {
        let labels: Labels = vec![
            Label::new(LABEL_HOST, "h1"),
            Label::new(LABEL_NAME, "in1"),
            Label::new("g1", PRESENCE_VALUE),
        ];
        assert_eq!(Some(&b"in1"[..]), labels.name());
        assert_eq!(Some(&b"1"[..]), labels.value_of("g1"));
        assert_eq!(None, labels.value_of("hostname"));
    }
}
