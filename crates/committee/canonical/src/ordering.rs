use crate::canonicalize::canonicalize;
use crate::rules::OrderingRule;
use crate::value::CanonicalValue;

/// Paths of known sorted lists inside `value` whose elements are out of order.
///
/// Only the primary sort key is compared: elements sharing a key (for
/// example duplicate holding ids) are not a violation.
pub fn ordering_violations(value: &CanonicalValue) -> Vec<String> {
    let mut violations = Vec::new();
    walk(value, "$", None, &mut violations);
    violations
}

fn walk(value: &CanonicalValue, path: &str, parent_key: Option<&str>, out: &mut Vec<String>) {
    match value {
        CanonicalValue::Object(map) => {
            for (key, item) in map {
                walk(item, &format!("{path}.{key}"), Some(key), out);
            }
        }
        CanonicalValue::Array(items) => {
            if let Some(rule) = parent_key.and_then(OrderingRule::for_parent) {
                let keys: Vec<_> = items
                    .iter()
                    .filter(|item| !item.is_non_finite())
                    .map(|item| rule.key_of(&canonicalize(item)))
                    .collect();
                if keys.windows(2).any(|w| w[0] > w[1]) {
                    out.push(path.to_owned());
                }
            }
            for (i, item) in items.iter().enumerate() {
                walk(item, &format!("{path}[{i}]"), None, out);
            }
        }
        _ => {}
    }
}
