use std::fmt::Write;

use chrono::{DateTime, SecondsFormat, Utc};

use crate::value::CanonicalValue;

/// Encode a canonical value to its single canonical string.
pub fn encode(value: &CanonicalValue) -> String {
    let mut out = String::new();
    write_value(&mut out, value);
    out
}

/// Fixed-point decimal text with no exponent.
///
/// Trailing fractional zeros and a trailing `.` are stripped and `-0`
/// becomes `0`. Non-finite values encode as `null`.
pub fn format_number(value: f64) -> String {
    if !value.is_finite() {
        return "null".to_owned();
    }
    // f64 Display is shortest round-trip and never uses exponent notation.
    let mut text = value.to_string();
    if text.contains('.') {
        let trimmed = text.trim_end_matches('0').trim_end_matches('.').len();
        text.truncate(trimmed);
    }
    if text == "-0" {
        text = "0".to_owned();
    }
    text
}

pub(crate) fn format_timestamp(ts: &DateTime<Utc>) -> String {
    ts.to_rfc3339_opts(SecondsFormat::AutoSi, true)
}

fn write_value(out: &mut String, value: &CanonicalValue) {
    match value {
        CanonicalValue::Null => out.push_str("null"),
        CanonicalValue::Bool(true) => out.push_str("true"),
        CanonicalValue::Bool(false) => out.push_str("false"),
        CanonicalValue::Int(i) => {
            let _ = write!(out, "{i}");
        }
        CanonicalValue::Float(f) => out.push_str(&format_number(*f)),
        CanonicalValue::String(s) => write_string(out, s),
        CanonicalValue::Timestamp(ts) => write_string(out, &format_timestamp(ts)),
        CanonicalValue::Array(items) => {
            out.push('[');
            for (i, item) in items.iter().enumerate() {
                if i > 0 {
                    out.push(',');
                }
                write_value(out, item);
            }
            out.push(']');
        }
        CanonicalValue::Object(map) => {
            // BTreeMap iterates in lexicographic key order.
            out.push('{');
            for (i, (key, item)) in map.iter().enumerate() {
                if i > 0 {
                    out.push(',');
                }
                write_string(out, key);
                out.push(':');
                write_value(out, item);
            }
            out.push('}');
        }
    }
}

fn write_string(out: &mut String, s: &str) {
    out.push('"');
    for c in s.chars() {
        match c {
            '\\' => out.push_str("\\\\"),
            '"' => out.push_str("\\\""),
            '\n' => out.push_str("\\n"),
            '\r' => out.push_str("\\r"),
            '\t' => out.push_str("\\t"),
            c if (c as u32) < 0x20 => {
                let _ = write!(out, "\\u{:04x}", c as u32);
            }
            c => out.push(c),
        }
    }
    out.push('"');
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn numbers_have_no_exponent() {
        assert_eq!(format_number(1e-6), "0.000001");
        assert_eq!(format_number(1.2300), "1.23");
        assert_eq!(format_number(2.0), "2");
        assert_eq!(format_number(-0.0), "0");
        assert_eq!(format_number(1e21), "1000000000000000000000");
        assert_eq!(format_number(-12.5), "-12.5");
    }

    #[test]
    fn non_finite_encodes_as_null() {
        assert_eq!(format_number(f64::NAN), "null");
        assert_eq!(format_number(f64::NEG_INFINITY), "null");
    }

    #[test]
    fn objects_sorted_by_key() {
        let value = CanonicalValue::from(json!({"b": 1, "a": [true, null], "c": "x"}));
        assert_eq!(encode(&value), r#"{"a":[true,null],"b":1,"c":"x"}"#);
    }

    #[test]
    fn strings_minimally_escaped() {
        let value = CanonicalValue::from("a\"b\\c\nd\re\tf/é");
        assert_eq!(encode(&value), "\"a\\\"b\\\\c\\nd\\re\\tf/é\"");
    }

    #[test]
    fn exponent_free_document() {
        let value = CanonicalValue::from(json!({"small": 1e-6, "trail": 1.2300, "whole": 2.0}));
        let text = encode(&value);
        assert!(text.contains("0.000001"));
        assert!(text.contains("1.23"));
        assert!(text.contains("\"whole\":2"));
        assert!(!text.contains("e-") && !text.contains("e+"));
    }
}
