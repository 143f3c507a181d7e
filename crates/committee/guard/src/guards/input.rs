use committee_types::{GuardId, GuardResult, GuardViolation, RunOutcome};

use crate::context::GuardContext;
use crate::traits::Guard;

/// G0: Input Schema
///
/// Surfaces validation errors collected while parsing the inputs, then
/// checks the release manifest's hash pins against the hashes computed for
/// the supplied config files. Without a manifest only the schema errors
/// are checked.
#[derive(Clone, Copy, Debug, Default)]
pub struct InputSchemaGuard;

impl InputSchemaGuard {
    pub fn new() -> Self {
        Self
    }
}

impl Guard for InputSchemaGuard {
    fn id(&self) -> GuardId {
        GuardId::G0
    }

    fn evaluate(&self, context: &GuardContext<'_>) -> GuardResult {
        let fail = |reason: &str| GuardViolation::portfolio(GuardId::G0, RunOutcome::Failed, reason);

        let mut violations: Vec<GuardViolation> =
            context.schema_errors.iter().map(|e| fail(e.as_str())).collect();

        if let Some(manifest) = context.manifest {
            let pins = [
                (
                    "run_config_hash",
                    manifest.run_config_hash.as_deref(),
                    context.config_hashes.run_config_hash.as_deref(),
                ),
                (
                    "config_snapshot_hash",
                    manifest.config_snapshot_hash.as_deref(),
                    context.config_hashes.config_snapshot_hash.as_deref(),
                ),
            ];
            for (name, pinned, computed) in pins {
                match pinned {
                    None => violations.push(fail(&format!("manifest_missing_{name}"))),
                    Some(pinned) if Some(pinned) != computed => {
                        violations.push(fail(&format!("{name}_mismatch")))
                    }
                    Some(_) => {}
                }
            }
        }

        GuardResult::from_violations(GuardId::G0, violations)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::Fixture;
    use committee_types::{GuardVerdict, Manifest};

    #[test]
    fn passes_without_manifest_or_errors() {
        let fixture = Fixture::new(&["H1"]);
        assert!(InputSchemaGuard::new().evaluate(&fixture.context()).is_pass());
    }

    #[test]
    fn schema_errors_fail_the_portfolio() {
        let mut fixture = Fixture::new(&["H1"]);
        fixture.schema_errors = vec!["holdings[0].weight:negative".into()];
        let result = InputSchemaGuard::new().evaluate(&fixture.context());
        assert_eq!(
            result.verdict,
            GuardVerdict::Fail {
                outcome: RunOutcome::Failed
            }
        );
        assert_eq!(result.reasons, vec!["holdings[0].weight:negative"]);
        assert!(result.violations.iter().all(|v| v.is_portfolio()));
    }

    #[test]
    fn matching_pins_pass() {
        let mut fixture = Fixture::new(&["H1"]);
        fixture.manifest = Some(Manifest {
            run_config_hash: Some("rc-hash".into()),
            config_snapshot_hash: Some("cs-hash".into()),
        });
        assert!(InputSchemaGuard::new().evaluate(&fixture.context()).is_pass());
    }

    #[test]
    fn mismatched_and_missing_pins_fail() {
        let mut fixture = Fixture::new(&["H1"]);
        fixture.manifest = Some(Manifest {
            run_config_hash: Some("other".into()),
            config_snapshot_hash: None,
        });
        let result = InputSchemaGuard::new().evaluate(&fixture.context());
        assert!(result.is_fail());
        assert_eq!(
            result.reasons,
            vec!["manifest_missing_config_snapshot_hash", "run_config_hash_mismatch"]
        );
    }

    #[test]
    fn pin_without_computed_hash_is_a_mismatch() {
        let mut fixture = Fixture::new(&["H1"]);
        fixture.config_hashes.config_snapshot_hash = None;
        fixture.manifest = Some(Manifest {
            run_config_hash: Some("rc-hash".into()),
            config_snapshot_hash: Some("cs-hash".into()),
        });
        let result = InputSchemaGuard::new().evaluate(&fixture.context());
        assert_eq!(result.reasons, vec!["config_snapshot_hash_mismatch"]);
    }
}
