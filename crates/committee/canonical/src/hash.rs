use serde::Serialize;
use sha2::{Digest, Sha256};

use crate::canonicalize::canonicalize;
use crate::encode::encode;
use crate::error::CanonicalError;
use crate::value::CanonicalValue;

/// SHA-256 hex digest of the UTF-8 bytes of `text`.
pub fn hash_text(text: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(text.as_bytes());
    hex::encode(hasher.finalize())
}

/// Digest of the canonical encoding of `value`.
pub fn hash_value(value: &CanonicalValue) -> String {
    hash_text(&encode(&canonicalize(value)))
}

/// Digest of the canonical encoding of any serializable value.
pub fn hash_serialize<T: Serialize + ?Sized>(value: &T) -> Result<String, CanonicalError> {
    Ok(hash_value(&CanonicalValue::from_serialize(value)?))
}

/// The five component digests a run hash is composed from.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct RunHashComponents {
    pub snapshot_hash: String,
    pub config_hash: String,
    pub run_config_hash: String,
    pub committee_packet_hash: String,
    pub decision_hash: String,
}

impl RunHashComponents {
    /// Digest of the encoded composite object.
    ///
    /// Every composite key is itself an excluded hash field, so the object
    /// is encoded directly rather than passed through [`canonicalize`].
    /// Encoding orders keys, which makes the result independent of the
    /// order the components were supplied in.
    pub fn run_hash(&self) -> String {
        let composite = CanonicalValue::object([
            ("snapshot_hash", CanonicalValue::from(self.snapshot_hash.as_str())),
            ("config_hash", CanonicalValue::from(self.config_hash.as_str())),
            ("run_config_hash", CanonicalValue::from(self.run_config_hash.as_str())),
            (
                "committee_packet_hash",
                CanonicalValue::from(self.committee_packet_hash.as_str()),
            ),
            ("decision_hash", CanonicalValue::from(self.decision_hash.as_str())),
        ]);
        hash_text(&encode(&composite))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn hash_text_matches_known_digest() {
        assert_eq!(
            hash_text("abc"),
            "ba7816bf8f01cfea414140de5dae2223b00361a396177a9cb410ff61f20015ad"
        );
    }

    #[test]
    fn excluded_fields_do_not_move_the_hash() {
        let base = json!({"portfolio_id": "P1", "holdings": []});
        let noisy = json!({
            "portfolio_id": "P1",
            "holdings": [],
            "run_id": "r-42",
            "generated_at": "2024-06-01T00:00:00Z",
            "notes": "rerun"
        });
        assert_eq!(
            hash_value(&CanonicalValue::from(base)),
            hash_value(&CanonicalValue::from(noisy))
        );
    }

    #[test]
    fn run_hash_changes_with_any_component() {
        let components = RunHashComponents {
            snapshot_hash: "a".into(),
            config_hash: "b".into(),
            run_config_hash: "c".into(),
            committee_packet_hash: "d".into(),
            decision_hash: "e".into(),
        };
        let mut changed = components.clone();
        changed.decision_hash = "f".into();
        assert_eq!(components.run_hash(), components.clone().run_hash());
        assert_ne!(components.run_hash(), changed.run_hash());
        assert_eq!(components.run_hash().len(), 64);
    }

    #[test]
    fn serialize_and_value_paths_agree() {
        let raw = json!({"b": [1, 2], "a": "x"});
        assert_eq!(
            hash_serialize(&raw).unwrap(),
            hash_value(&CanonicalValue::from(raw))
        );
    }
}
