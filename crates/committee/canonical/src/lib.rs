//! Canonicalization and content hashing.
//!
//! A decision packet is only auditable if the same logical content always
//! produces the same bytes. This crate turns arbitrary structured values
//! into a canonical form and encodes that form to a single string that is
//! then hashed with SHA-256.
//!
//! ## Canonical form
//!
//! - Excluded keys ([`rules::EXCLUDED_KEYS`]) are dropped wherever they
//!   appear as object keys.
//! - Lists under known parent keys ([`rules::OrderingRule`]) are re-sorted
//!   by a key-specific comparator; all other lists keep input order.
//! - Non-finite floats become `null`, and are dropped inside lists.
//! - Timestamps become ISO-8601 strings.
//! - Identifier strings (`holding_id`, `agent_name`) are trimmed.
//!
//! ## Encoding
//!
//! Objects are written with keys in lexicographic order, numbers in
//! fixed-point decimal with no exponent, strings minimally escaped.
//!
//! ## Guarantees
//!
//! - `canonicalize(canonicalize(x)) == canonicalize(x)`.
//! - `encode(canonicalize(x))` is unchanged by object key order, by the
//!   order of known sorted lists, and by excluded fields.

pub mod canonicalize;
pub mod encode;
pub mod error;
pub mod hash;
pub mod ordering;
pub mod rules;
pub mod sort;
pub mod value;

pub use canonicalize::canonicalize;
pub use encode::{encode, format_number};
pub use error::CanonicalError;
pub use hash::{hash_serialize, hash_text, hash_value, RunHashComponents};
pub use ordering::ordering_violations;
pub use rules::OrderingRule;
pub use sort::sort_canonically;
pub use value::CanonicalValue;
