use std::collections::BTreeMap;

use crate::encode::format_timestamp;
use crate::rules::{is_excluded, is_identifier, OrderingRule};
use crate::value::CanonicalValue;

/// Normalize `value` into canonical form.
pub fn canonicalize(value: &CanonicalValue) -> CanonicalValue {
    canonicalize_under(value, None)
}

fn canonicalize_under(value: &CanonicalValue, parent_key: Option<&str>) -> CanonicalValue {
    match value {
        CanonicalValue::Float(f) if !f.is_finite() => CanonicalValue::Null,
        CanonicalValue::Timestamp(ts) => CanonicalValue::String(format_timestamp(ts)),
        CanonicalValue::String(s) if parent_key.is_some_and(is_identifier) => {
            CanonicalValue::String(s.trim().to_owned())
        }
        CanonicalValue::Array(items) => canonicalize_list(items, parent_key),
        CanonicalValue::Object(map) => {
            let canonical: BTreeMap<String, CanonicalValue> = map
                .iter()
                .filter(|(key, _)| !is_excluded(key))
                .map(|(key, item)| (key.clone(), canonicalize_under(item, Some(key))))
                .collect();
            CanonicalValue::Object(canonical)
        }
        other => other.clone(),
    }
}

fn canonicalize_list(items: &[CanonicalValue], parent_key: Option<&str>) -> CanonicalValue {
    let normalized = items
        .iter()
        .filter(|item| !item.is_non_finite())
        .map(|item| canonicalize_under(item, None));

    match parent_key.and_then(OrderingRule::for_parent) {
        Some(rule) => {
            let mut keyed: Vec<_> = normalized.map(|item| (rule.full_key(&item), item)).collect();
            keyed.sort_by(|a, b| a.0.cmp(&b.0));
            CanonicalValue::Array(keyed.into_iter().map(|(_, item)| item).collect())
        }
        None => CanonicalValue::Array(normalized.collect()),
    }
}
