use std::convert::TryFrom;

use serde_json::{self, Map, Value};

use super::value_type::ValueType;
use crate::error::{Error, Result};
use crate::model::{
    Point, SampleValue, Timestamp, TimestampTrait, LABEL_HOST, LABEL_HOSTNAME, LABEL_NAME,
    PRESENCE_VALUE,
};

/// Label construction toggles, captured once per scheduled block.
#[derive(Copy, Clone, Debug, Default, Eq, PartialEq)]
pub struct DecodeOptions {
    /// Add every host group as a `group="1"` label.
    pub include_groups: bool,
    /// Keep item tags without a (string) value as `tag="1"` labels.
    pub include_empty_tag_values: bool,
}

/// Decodes a single history record:
///
/// ```text
/// {"host":{"host":"h1","name":"n1"},"groups":["g1"],
///  "item_tags":[{"tag":"tn1","value":"tv1"}],"itemid":1,"name":"in1",
///  "clock":1712417868,"ns":425677241,"value":1,"type":0}
/// ```
///
/// Every field is read as an untyped JSON value first and then matched
/// against the single shape it is allowed to have.
pub struct RecordDecoder {
    opts: DecodeOptions,
}

struct Tag {
    name: String,
    value: Option<String>,
}

impl RecordDecoder {
    pub fn new(opts: DecodeOptions) -> Self {
        Self { opts }
    }

    pub fn decode(&self, line: &[u8]) -> Result<Point> {
        let mut record = match serde_json::from_slice(line) {
            Ok(Value::Object(o)) => o,
            Ok(_) => return Err(Error::new("record must be a JSON object")),
            Err(e) => return Err(("JSON decoding failed", e).into()),
        };

        let (host, hostname) = decode_host(record.remove("host"))?;
        let name = non_empty_string(record.remove("name"), "name")?;
        let clock = integer(&record, "clock")?;
        let ns = integer(&record, "ns")?;
        let value = sample_value(&record)?;
        decode_value_type(&record)?;
        let groups = decode_groups(record.remove("groups"))?;
        let tags = decode_tags(record.remove("item_tags"))?;

        let timestamp =
            Timestamp::from_clock(clock, ns).ok_or_else(|| Error::new("timestamp overflow"))?;

        let mut point = Point::new(
            Vec::with_capacity(3 + groups.len() + tags.len()),
            value,
            timestamp,
        );
        point.push_label(LABEL_HOST, host);
        point.push_label(LABEL_HOSTNAME, hostname);
        point.push_label(LABEL_NAME, name);

        if self.opts.include_groups {
            for group in groups {
                point.push_label(group, PRESENCE_VALUE);
            }
        }

        for tag in tags {
            match tag.value {
                Some(value) => point.push_label(tag.name, value),
                None if self.opts.include_empty_tag_values => {
                    point.push_label(tag.name, PRESENCE_VALUE)
                }
                None => (),
            }
        }

        if point.labels.is_empty() {
            return Err(Error::new("record has no labels"));
        }
        Ok(point)
    }
}

fn invalid_field(field: &str) -> Error {
    Error::from(format!("missing or invalid `{}` field", field))
}

fn non_empty_string(value: Option<Value>, field: &str) -> Result<String> {
    match value {
        Some(Value::String(s)) if !s.is_empty() => Ok(s),
        _ => Err(invalid_field(field)),
    }
}

fn decode_host(value: Option<Value>) -> Result<(String, String)> {
    let mut host = match value {
        Some(Value::Object(o)) => o,
        _ => return Err(invalid_field("host")),
    };
    Ok((
        non_empty_string(host.remove("host"), "host.host")?,
        non_empty_string(host.remove("name"), "host.name")?,
    ))
}

fn integer(record: &Map<String, Value>, field: &str) -> Result<i64> {
    match record.get(field) {
        Some(Value::Number(n)) => n.as_i64().ok_or_else(|| invalid_field(field)),
        _ => Err(invalid_field(field)),
    }
}

fn sample_value(record: &Map<String, Value>) -> Result<SampleValue> {
    match record.get("value") {
        Some(Value::Number(n)) => n.as_f64().ok_or_else(|| invalid_field("value")),
        _ => Err(invalid_field("value")),
    }
}

fn decode_value_type(record: &Map<String, Value>) -> Result<ValueType> {
    let t = match record.get("type") {
        Some(Value::Number(n)) => n.as_u64().ok_or_else(|| invalid_field("type"))?,
        _ => return Err(invalid_field("type")),
    };
    let value_type = ValueType::try_from(t)?;
    if !value_type.is_numeric() {
        return Err(format!("unsupported value type {:?}", value_type).into());
    }
    Ok(value_type)
}

fn decode_groups(value: Option<Value>) -> Result<Vec<String>> {
    let groups = match value {
        None => return Ok(vec![]),
        Some(Value::Array(a)) => a,
        Some(_) => return Err(invalid_field("groups")),
    };

    groups
        .into_iter()
        .map(|g| match g {
            Value::String(s) => Ok(s),
            _ => Err(invalid_field("groups")),
        })
        .collect()
}

fn decode_tags(value: Option<Value>) -> Result<Vec<Tag>> {
    let tags = match value {
        None => return Ok(vec![]),
        Some(Value::Array(a)) => a,
        Some(_) => return Err(invalid_field("item_tags")),
    };

    let mut decoded = Vec::with_capacity(tags.len());
    for tag in tags {
        let mut tag = match tag {
            Value::Object(o) => o,
            _ => return Err(invalid_field("item_tags")),
        };
        let name = match tag.remove("tag") {
            Some(Value::String(s)) => s,
            _ => return Err(invalid_field("item_tags.tag")),
        };
        if name.is_empty() {
            continue;
        }
        let value = match tag.remove("value") {
            Some(Value::String(s)) if !s.is_empty() => Some(s),
            _ => None,
        };
        decoded.push(Tag { name, value });
    }
    Ok(decoded)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::Label;

    const ALL: DecodeOptions = DecodeOptions {
        include_groups: true,
        include_empty_tag_values: true,
    };

    const NONE: DecodeOptions = DecodeOptions {
        include_groups: false,
        include_empty_tag_values: false,
    };

    fn labels(pairs: &[(&str, &str)]) -> Vec<Label> {
        pairs.iter().map(|(k, v)| Label::new(*k, *v)).collect()
    }

    #[test]
    fn test_invalid_records() {
        #[rustfmt::skip]
        let tests = [
            // Not a JSON object.
            "foo",
            "123",
            "[1,3]",
            "{}",
            "[]",
            r#"{"foo":"bar"}"#,
            // Invalid type.
            r#"{"host":{"host":"h1","name":"n1"},"groups":["g1"],"item_tags":[{"tag":"tn1","value":"tv1"}],"itemid":1,"name":"in1","clock":1712417868,"ns":425677241,"value":1}"#,
            r#"{"host":{"host":"h1","name":"n1"},"groups":["g1"],"item_tags":[{"tag":"tn1","value":"tv1"}],"itemid":1,"name":"in1","clock":1712417868,"ns":425677241,"value":1,"type":"0"}"#,
            r#"{"host":{"host":"h1","name":"n1"},"groups":["g1"],"item_tags":[{"tag":"tn1","value":"tv1"}],"itemid":1,"name":"in1","clock":1712417868,"ns":425677241,"value":1,"type":[]}"#,
            r#"{"host":{"host":"h1","name":"n1"},"groups":["g1"],"item_tags":[{"tag":"tn1","value":"tv1"}],"itemid":1,"name":"in1","clock":1712417868,"ns":425677241,"value":1,"type":2}"#,
            r#"{"host":{"host":"h1","name":"n1"},"groups":["g1"],"item_tags":[{"tag":"tn1","value":"tv1"}],"itemid":1,"name":"in1","clock":1712417868,"ns":425677241,"value":1,"type":4}"#,
            r#"{"host":{"host":"h1","name":"n1"},"groups":["g1"],"item_tags":[{"tag":"tn1","value":"tv1"}],"itemid":1,"name":"in1","clock":1712417868,"ns":425677241,"value":1,"type":10}"#,
            r#"{"host":{"host":"h1","name":"n1"},"groups":["g1"],"item_tags":[{"tag":"tn1","value":"tv1"}],"itemid":1,"name":"in1","clock":1712417868,"ns":425677241,"value":1,"type":-1}"#,
            // Invalid host object.
            r#"{"groups":["g1"],"item_tags":[{"tag":"tn1","value":"tv1"}],"itemid":1,"name":"in1","clock":1712417868,"ns":425677241,"value":1,"type":0}"#,
            r#"{"host":{"name":"n1"},"groups":["g1"],"item_tags":[{"tag":"tn1","value":"tv1"}],"itemid":1,"name":"in1","clock":1712417868,"ns":425677241,"value":1,"type":0}"#,
            r#"{"host":{"host":"h1"},"groups":["g1"],"item_tags":[{"tag":"tn1","value":"tv1"}],"itemid":1,"name":"in1","clock":1712417868,"ns":425677241,"value":1,"type":0}"#,
            r#"{"host":{"host":"h1","name":""},"groups":["g1"],"item_tags":[{"tag":"tn1","value":"tv1"}],"itemid":1,"name":"in1","clock":1712417868,"ns":425677241,"value":1,"type":0}"#,
            r#"{"host":{"host":"h1","name":1},"groups":["g1"],"item_tags":[{"tag":"tn1","value":"tv1"}],"itemid":1,"name":"in1","clock":1712417868,"ns":425677241,"value":1,"type":0}"#,
            r#"{"host":{"host":"h1","name":[]},"groups":["g1"],"item_tags":[{"tag":"tn1","value":"tv1"}],"itemid":1,"name":"in1","clock":1712417868,"ns":425677241,"value":1,"type":0}"#,
            r#"{"host":{"host":1,"name":"n1"},"groups":["g1"],"item_tags":[{"tag":"tn1","value":"tv1"}],"itemid":1,"name":"in1","clock":1712417868,"ns":425677241,"value":1,"type":0}"#,
            r#"{"host":{"host":{},"name":"n1"},"groups":["g1"],"item_tags":[{"tag":"tn1","value":"tv1"}],"itemid":1,"name":"in1","clock":1712417868,"ns":425677241,"value":1,"type":0}"#,
            r#"{"host":"1","groups":["g1"],"item_tags":[{"tag":"tn1","value":"tv1"}],"itemid":1,"name":"in1","clock":1712417868,"ns":425677241,"value":1,"type":0}"#,
            r#"{"host":[],"groups":["g1"],"item_tags":[{"tag":"tn1","value":"tv1"}],"itemid":1,"name":"in1","clock":1712417868,"ns":425677241,"value":1,"type":0}"#,
            // Invalid item name.
            r#"{"host":{"host":"h1","name":"n1"},"groups":["g1"],"item_tags":[{"tag":"tn1","value":"tv1"}],"itemid":1,"clock":1712417868,"ns":425677241,"value":1,"type":0}"#,
            r#"{"host":{"host":"h1","name":"n1"},"groups":["g1"],"item_tags":[{"tag":"tn1","value":"tv1"}],"itemid":1,"name":"","clock":1712417868,"ns":425677241,"value":1,"type":0}"#,
            r#"{"host":{"host":"h1","name":"n1"},"groups":["g1"],"item_tags":[{"tag":"tn1","value":"tv1"}],"itemid":1,"name":1,"clock":1712417868,"ns":425677241,"value":1,"type":0}"#,
            r#"{"host":{"host":"h1","name":"n1"},"groups":["g1"],"item_tags":[{"tag":"tn1","value":"tv1"}],"itemid":1,"name":{},"clock":1712417868,"ns":425677241,"value":1,"type":0}"#,
            // Invalid item value.
            r#"{"host":{"host":"h1","name":"n1"},"groups":["g1"],"item_tags":[{"tag":"tn1","value":"tv1"}],"itemid":1,"name":"in1","clock":1712417868,"ns":425677241,"type":0}"#,
            r#"{"host":{"host":"h1","name":"n1"},"groups":["g1"],"item_tags":[{"tag":"tn1","value":"tv1"}],"itemid":1,"name":"in1","clock":1712417868,"ns":425677241,"value":"1","type":0}"#,
            r#"{"host":{"host":"h1","name":"n1"},"groups":["g1"],"item_tags":[{"tag":"tn1","value":"tv1"}],"itemid":1,"name":"in1","clock":1712417868,"ns":425677241,"value":[],"type":0}"#,
            // Invalid clock.
            r#"{"host":{"host":"h1","name":"n1"},"groups":["g1"],"item_tags":[{"tag":"tn1","value":"tv1"}],"itemid":1,"name":"in1","ns":425677241,"value":1,"type":0}"#,
            r#"{"host":{"host":"h1","name":"n1"},"groups":["g1"],"item_tags":[{"tag":"tn1","value":"tv1"}],"itemid":1,"name":"in1","clock":"1712417868","ns":425677241,"value":1,"type":0}"#,
            r#"{"host":{"host":"h1","name":"n1"},"groups":["g1"],"item_tags":[{"tag":"tn1","value":"tv1"}],"itemid":1,"name":"in1","clock":[],"ns":425677241,"value":1,"type":0}"#,
            r#"{"host":{"host":"h1","name":"n1"},"groups":["g1"],"item_tags":[{"tag":"tn1","value":"tv1"}],"itemid":1,"name":"in1","clock":1.1,"ns":425677241,"value":1,"type":0}"#,
            // Invalid ns.
            r#"{"host":{"host":"h1","name":"n1"},"groups":["g1"],"item_tags":[{"tag":"tn1","value":"tv1"}],"itemid":1,"name":"in1","clock":1712417868,"value":1,"type":0}"#,
            r#"{"host":{"host":"h1","name":"n1"},"groups":["g1"],"item_tags":[{"tag":"tn1","value":"tv1"}],"itemid":1,"name":"in1","clock":1712417868,"ns":"425677241","value":1,"type":0}"#,
            r#"{"host":{"host":"h1","name":"n1"},"groups":["g1"],"item_tags":[{"tag":"tn1","value":"tv1"}],"itemid":1,"name":"in1","clock":1712417868,"ns":{},"value":1,"type":0}"#,
            r#"{"host":{"host":"h1","name":"n1"},"groups":["g1"],"item_tags":[{"tag":"tn1","value":"tv1"}],"itemid":1,"name":"in1","clock":1712417868,"ns":1.2,"value":1,"type":0}"#,
            // Timestamp overflow.
            r#"{"host":{"host":"h1","name":"n1"},"groups":["g1"],"item_tags":[],"itemid":1,"name":"in1","clock":9223372036854775807,"ns":0,"value":1,"type":0}"#,
            // Invalid groups.
            r#"{"host":{"host":"h1","name":"n1"},"groups":1,"item_tags":[{"tag":"tn1","value":"tv1"}],"itemid":1,"name":"in1","clock":1712417868,"ns":425677241,"value":1,"type":0}"#,
            r#"{"host":{"host":"h1","name":"n1"},"groups":{},"item_tags":[{"tag":"tn1","value":"tv1"}],"itemid":1,"name":"in1","clock":1712417868,"ns":425677241,"value":1,"type":0}"#,
            r#"{"host":{"host":"h1","name":"n1"},"groups":["g1",2],"item_tags":[{"tag":"tn1","value":"tv1"}],"itemid":1,"name":"in1","clock":1712417868,"ns":425677241,"value":1,"type":0}"#,
            // Invalid item_tags.
            r#"{"host":{"host":"h1","name":"n1"},"groups":["g1"],"item_tags":1,"itemid":1,"name":"in1","clock":1712417868,"ns":425677241,"value":1,"type":0}"#,
            r#"{"host":{"host":"h1","name":"n1"},"groups":["g1"],"item_tags":{},"itemid":1,"name":"in1","clock":1712417868,"ns":425677241,"value":1,"type":0}"#,
            r#"{"host":{"host":"h1","name":"n1"},"groups":["g1"],"item_tags":["tn1"],"itemid":1,"name":"in1","clock":1712417868,"ns":425677241,"value":1,"type":0}"#,
            r#"{"host":{"host":"h1","name":"n1"},"groups":["g1"],"item_tags":[{"tag":1,"value":"tv1"}],"itemid":1,"name":"in1","clock":1712417868,"ns":425677241,"value":1,"type":0}"#,
            r#"{"host":{"host":"h1","name":"n1"},"groups":["g1"],"item_tags":[{"value":"tv1"}],"itemid":1,"name":"in1","clock":1712417868,"ns":425677241,"value":1,"type":0}"#,
        ];

        for opts in &[ALL, NONE] {
            let decoder = RecordDecoder::new(*opts);
            for input in &tests {
                let ret = decoder.decode(input.as_bytes());
                assert!(
                    ret.is_err(),
                    "Expected error, got {:?} while decoding {}",
                    ret,
                    input
                );
            }
        }
    }

    #[test]
    fn test_label_policy() {
        let line = br#"{"host":{"host":"h1","name":"n1"},"groups":["g1"],"item_tags":[{"tag":"tn1","value":"tv1"},{"tag":"tn2","value":""}],"itemid":1,"name":"in1","clock":1712417868,"ns":425677241,"value":1,"type":0}"#;

        #[rustfmt::skip]
        let tests = [
            (ALL, labels(&[("host", "h1"), ("hostname", "n1"), ("__name__", "in1"), ("g1", "1"), ("tn1", "tv1"), ("tn2", "1")])),
            (NONE, labels(&[("host", "h1"), ("hostname", "n1"), ("__name__", "in1"), ("tn1", "tv1")])),
            (
                DecodeOptions { include_groups: false, include_empty_tag_values: true },
                labels(&[("host", "h1"), ("hostname", "n1"), ("__name__", "in1"), ("tn1", "tv1"), ("tn2", "1")]),
            ),
            (
                DecodeOptions { include_groups: true, include_empty_tag_values: false },
                labels(&[("host", "h1"), ("hostname", "n1"), ("__name__", "in1"), ("g1", "1"), ("tn1", "tv1")]),
            ),
        ];

        for (opts, expected) in &tests {
            let point = RecordDecoder::new(*opts).decode(line).unwrap();
            assert_eq!(expected, &point.labels, "with {:?}", opts);
            assert_eq!(1.0, point.value);
            assert_eq!(1712417868425, point.timestamp);
        }
    }

    #[test]
    fn test_non_string_tag_values() {
        let line = br#"{"host":{"host":"h1","name":"n1"},"groups":["g1"],"item_tags":[{"tag":"tn1","value":{}},{"tag":"tn2","value":""},{"tag":"tn3"},{"tag":"","value":"x"}],"itemid":1,"name":"in1","clock":1712417868,"ns":425677241,"value":1,"type":0}"#;

        let point = RecordDecoder::new(ALL).decode(line).unwrap();
        assert_eq!(
            labels(&[
                ("host", "h1"),
                ("hostname", "n1"),
                ("__name__", "in1"),
                ("g1", "1"),
                ("tn1", "1"),
                ("tn2", "1"),
                ("tn3", "1"),
            ]),
            point.labels
        );

        let point = RecordDecoder::new(NONE).decode(line).unwrap();
        assert_eq!(
            labels(&[("host", "h1"), ("hostname", "n1"), ("__name__", "in1")]),
            point.labels
        );
    }

    #[test]
    fn test_optional_groups_and_tags() {
        #[rustfmt::skip]
        let tests = [
            r#"{"host":{"host":"h1","name":"n1"},"groups":[],"item_tags":[],"itemid":1,"name":"in1","clock":1712417868,"ns":425677241,"value":1,"type":0}"#,
            r#"{"host":{"host":"h1","name":"n1"},"itemid":1,"name":"in1","clock":1712417868,"ns":425677241,"value":1,"type":0}"#,
            r#"{"host":{"host":"h1","name":"n1"},"item_tags":[],"name":"in1","clock":1712417868,"ns":425677241,"value":1,"type":0}"#,
        ];

        for input in &tests {
            let point = RecordDecoder::new(ALL).decode(input.as_bytes()).unwrap();
            assert_eq!(
                labels(&[("host", "h1"), ("hostname", "n1"), ("__name__", "in1")]),
                point.labels,
                "while decoding {}",
                input
            );
        }
    }

    #[test]
    fn test_values_and_timestamps() {
        #[rustfmt::skip]
        let tests = [
            (r#"{"host":{"host":"h","name":"n"},"name":"i","clock":1712417868,"ns":425677241,"value":1.5,"type":0}"#, 1.5, 1712417868425),
            (r#"{"host":{"host":"h","name":"n"},"name":"i","clock":1712417868,"ns":999999,"value":18446744073709551615,"type":3}"#, 18446744073709551615.0, 1712417868000),
            (r#"{"host":{"host":"h","name":"n"},"name":"i","clock":0,"ns":0,"value":-2e3,"type":0}"#, -2000.0, 0),
        ];

        for (input, value, timestamp) in &tests {
            let point = RecordDecoder::new(NONE).decode(input.as_bytes()).unwrap();
            assert_eq!(*value, point.value, "while decoding {}", input);
            assert_eq!(*timestamp, point.timestamp, "while decoding {}", input);
        }
    }
}
