use std::fmt::Write;

use super::encoder::Encoder;
use crate::error::Result;
use crate::model::{Point, SampleValue, LABEL_NAME};

/// Prometheus text exposition lines: `name{k="v",...} value timestamp`.
///
/// Metric and label names are rewritten to the exposition charset: every
/// other character becomes `_`, and a leading digit gets a `_` prefix.
pub struct PromEncoder {}

impl PromEncoder {
    pub fn new() -> Self {
        Self {}
    }
}

impl Encoder for PromEncoder {
    fn encode(&self, point: &Point) -> Result<Vec<u8>> {
        let mut line = String::new();
        let mut labels = vec![];
        for label in &point.labels {
            if label.key == LABEL_NAME.as_bytes() {
                sanitize_into(&mut line, &String::from_utf8_lossy(&label.value), true);
            } else {
                labels.push(label);
            }
        }

        if !labels.is_empty() {
            line.push('{');
            for (i, label) in labels.iter().enumerate() {
                if i > 0 {
                    line.push(',');
                }
                sanitize_into(&mut line, &String::from_utf8_lossy(&label.key), false);
                line.push_str("=\"");
                escape_into(&mut line, &String::from_utf8_lossy(&label.value));
                line.push('"');
            }
            line.push('}');
        }

        write!(line, " {} {}", format_value(point.value), point.timestamp)
            .map_err(|e| ("cannot format sample", e))?;
        Ok(line.into_bytes())
    }
}

fn sanitize_into(dst: &mut String, name: &str, is_metric: bool) {
    if name.is_empty() || name.starts_with(|c: char| c.is_ascii_digit()) {
        dst.push('_');
    }
    for c in name.chars() {
        let valid = c.is_ascii_alphanumeric() || c == '_' || (is_metric && c == ':');
        dst.push(if valid { c } else { '_' });
    }
}

fn escape_into(dst: &mut String, value: &str) {
    for c in value.chars() {
        match c {
            '\\' => dst.push_str("\\\\"),
            '"' => dst.push_str("\\\""),
            '\n' => dst.push_str("\\n"),
            c => dst.push(c),
        }
    }
}

fn format_value(v: SampleValue) -> String {
    if v.is_nan() {
        "NaN".to_owned()
    } else if v == SampleValue::INFINITY {
        "+Inf".to_owned()
    } else if v == SampleValue::NEG_INFINITY {
        "-Inf".to_owned()
    } else {
        v.to_string()
    }
}
