use serde::Serialize;

use crate::canonicalize::canonicalize;
use crate::error::CanonicalError;
use crate::rules::OrderingRule;
use crate::value::CanonicalValue;

/// Sort typed items into the order canonicalization would give them under `rule`.
pub fn sort_canonically<T: Serialize>(
    items: Vec<T>,
    rule: OrderingRule,
) -> Result<Vec<T>, CanonicalError> {
    let mut keyed = items
        .into_iter()
        .map(|item| {
            let canonical = canonicalize(&CanonicalValue::from_serialize(&item)?);
            Ok((rule.full_key(&canonical), item))
        })
        .collect::<Result<Vec<_>, CanonicalError>>()?;
    keyed.sort_by(|a, b| a.0.cmp(&b.0));
    Ok(keyed.into_iter().map(|(_, item)| item).collect())
}
