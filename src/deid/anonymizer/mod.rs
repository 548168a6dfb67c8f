//! Anonymization
//!
//! Normalizes entity positions against the text, then splices replacements
//! right-to-left so earlier offsets stay valid.

pub mod pseudonym;
pub mod redaction;
pub mod substitution;

use crate::deid::models::{AnonymizationMethod, Entity};

pub use pseudonym::PseudonymStrategy;
pub use redaction::{MaskStrategy, RedactStrategy, REDACTED};
pub use substitution::{normalize_positions, substitute, SubstitutionOutcome};

/// Produces the replacement string for one entity
pub trait ReplacementStrategy: Send {
    fn replacement(&mut self, entity: &Entity) -> String;
}

/// Fresh strategy for one anonymization call
pub fn strategy_for(method: AnonymizationMethod) -> Box<dyn ReplacementStrategy> {
    match method {
        AnonymizationMethod::Redact => Box::new(RedactStrategy),
        AnonymizationMethod::Mask | AnonymizationMethod::Generalize => Box::new(MaskStrategy),
        AnonymizationMethod::Pseudonymize => Box::new(PseudonymStrategy::new()),
    }
}

/// Replace `entities` in `text` according to `method`
///
/// Never fails: entities whose span cannot be verified are left unmasked and
/// reported in the outcome's warnings.
pub fn anonymize(text: &str, entities: &[Entity], method: AnonymizationMethod) -> SubstitutionOutcome {
    let (normalized, mut warnings) = normalize_positions(text, entities);
    let mut strategy = strategy_for(method);
    let mut outcome = substitute(text, &normalized, strategy.as_mut());

    warnings.append(&mut outcome.warnings);
    outcome.warnings = warnings;

    tracing::debug!(
        method = %method,
        applied = outcome.applied,
        skipped = outcome.skipped,
        "Text anonymized"
    );

    outcome
}
