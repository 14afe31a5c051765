//! # Field Validation Engine
//!
//! Pure evaluation of one value against one compiled rule. No store access
//! happens here; the caller hands in a [`CompiledRuleSet`] built from a
//! snapshot.
//!
//! Order of checks for a field:
//!
//! 1. Required-ness. An empty required value yields one `error` finding and
//!    skips the pattern and every value-dependent constraint. `custom`
//!    constraints still run; the handler decides what empty means.
//! 2. Pattern, against the original value and then the transformed one.
//! 3. Each active constraint, independently.
//! 4. The transform, producing the normalized value. A failed transform
//!    keeps the original.
//!
//! Messages always quote the value as supplied.

use std::collections::{BTreeMap, HashMap};
use std::fmt;
use std::sync::{Arc, OnceLock};

use regex::Regex;
use serde::Serialize;
use shipcomply_core::{
    ComplianceRule, ConstraintId, FindingKind, Shipment, ValidationFinding, ValidationLevel,
};

use crate::compiled::{CompiledConstraint, CompiledRule, CompiledRuleSet, ConstraintCheck};
use crate::error::TransformError;
use crate::transform;

/// Host-provided check selected by a `custom` constraint's value.
///
/// `Err(message)` is a violation. An empty message falls back to the
/// constraint's own error message.
pub trait CustomConstraint: Send + Sync {
    fn check(&self, value: &str, rule: &ComplianceRule) -> Result<(), String>;
}

impl<F> CustomConstraint for F
where
    F: Fn(&str, &ComplianceRule) -> Result<(), String> + Send + Sync,
{
    fn check(&self, value: &str, rule: &ComplianceRule) -> Result<(), String> {
        self(value, rule)
    }
}

/// Named `custom` constraint handlers.
#[derive(Clone, Default)]
pub struct CustomConstraints {
    handlers: HashMap<String, Arc<dyn CustomConstraint>>,
}

impl CustomConstraints {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register `handler` under `name`, replacing any previous one.
    pub fn register(&mut self, name: impl Into<String>, handler: impl CustomConstraint + 'static) {
        self.handlers.insert(name.into(), Arc::new(handler));
    }

    pub fn get(&self, name: &str) -> Option<&dyn CustomConstraint> {
        self.handlers.get(name).map(|h| h.as_ref())
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.handlers.keys().map(String::as_str)
    }
}

impl fmt::Debug for CustomConstraints {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut names: Vec<_> = self.names().collect();
        names.sort_unstable();
        f.debug_struct("CustomConstraints")
            .field("handlers", &names)
            .finish()
    }
}

/// A `custom` constraint whose handler is not registered.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UnevaluatedConstraint {
    pub field_key: String,
    pub constraint_id: ConstraintId,
    pub handler: String,
}

/// Result of validating one field.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FieldOutcome {
    pub findings: Vec<ValidationFinding>,
    /// Transformed value, or the original when there is no transform or it
    /// failed.
    pub normalized_value: String,
    pub unevaluated: Vec<UnevaluatedConstraint>,
}

impl FieldOutcome {
    pub fn is_valid(&self) -> bool {
        !self
            .findings
            .iter()
            .any(|f| f.level == ValidationLevel::Error)
    }
}

/// Result of validating every active rule against a shipment.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ShipmentValidation {
    pub findings: Vec<ValidationFinding>,
    /// Normalized values of the non-empty fields that have a rule.
    pub normalized: BTreeMap<String, String>,
    pub unevaluated: Vec<UnevaluatedConstraint>,
    /// No `error` findings.
    pub is_valid: bool,
}

impl ShipmentValidation {
    /// Findings at `level`.
    pub fn at_level(&self, level: ValidationLevel) -> impl Iterator<Item = &ValidationFinding> {
        self.findings.iter().filter(move |f| f.level == level)
    }
}

fn number_re() -> Option<&'static Regex> {
    static RE: OnceLock<Option<Regex>> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"-?\d+(?:,\d+)*(?:\.\d+)?").ok())
        .as_ref()
}

/// First numeric token in `value`. A comma followed by exactly three digits
/// is a thousands separator; a single comma followed by anything else is a
/// decimal comma. `"1,250.5 kg"` → `1250.5`, `"1,5 kg"` → `1.5`.
pub fn first_number(value: &str) -> Option<f64> {
    let token = number_re()?.find(value)?.as_str();
    let groups: Vec<&str> = token.split(',').collect();
    let thousands = token.contains('.')
        || groups.len() > 2
        || groups[1..].iter().all(|group| group.len() == 3);
    if thousands {
        token.replace(',', "").parse().ok()
    } else {
        token.replace(',', ".").parse().ok()
    }
}

/// Validates values against compiled rules.
#[derive(Debug, Clone, Default)]
pub struct FieldValidator {
    custom: CustomConstraints,
}

impl FieldValidator {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_custom(custom: CustomConstraints) -> Self {
        Self { custom }
    }

    pub fn custom(&self) -> &CustomConstraints {
        &self.custom
    }

    /// Validate one value against one compiled rule.
    pub fn validate_field(&self, value: &str, compiled: &CompiledRule) -> FieldOutcome {
        let rule = &compiled.rule;
        let mut outcome = FieldOutcome {
            normalized_value: value.to_string(),
            ..Default::default()
        };

        if value.trim().is_empty() {
            if rule.is_required {
                outcome.findings.push(finding(
                    rule,
                    ValidationLevel::Error,
                    FindingKind::Required,
                    format!("{} is required", rule.display_name),
                    value,
                ));
            }
            for c in &compiled.constraints {
                if let ConstraintCheck::Custom(handler) = &c.check {
                    self.run_custom(handler, c, value, rule, &mut outcome);
                }
            }
            record_findings(&outcome.findings);
            return outcome;
        }

        let transformed = rule.transform_function.map(|kind| transform::apply(kind, value));

        if let Some(re) = &compiled.pattern {
            let matches = re.is_match(value)
                || matches!(&transformed, Some(Ok(t)) if re.is_match(t));
            if !matches {
                outcome.findings.push(finding(
                    rule,
                    ValidationLevel::Error,
                    FindingKind::Pattern,
                    rule.validation_message.clone(),
                    value,
                ));
            }
        }

        for c in &compiled.constraints {
            match &c.check {
                ConstraintCheck::Custom(handler) => {
                    self.run_custom(handler, c, value, rule, &mut outcome)
                }
                check => {
                    if let Some(message) = violation(check, c, value, rule) {
                        outcome
                            .findings
                            .push(constraint_finding(rule, c, message, value));
                    }
                }
            }
        }

        match transformed {
            Some(Ok(normalized)) => outcome.normalized_value = normalized,
            Some(Err(TransformError::Reserved)) => {
                tracing::warn!(
                    field_key = %rule.field_key,
                    "rule names the reserved `custom` transform; keeping original value"
                );
            }
            Some(Err(e)) => {
                tracing::debug!(field_key = %rule.field_key, error = %e, "transform failed");
            }
            None => {}
        }

        record_findings(&outcome.findings);
        outcome
    }

    /// Run every rule of `rules` over `shipment`. With a region, regional
    /// overrides for it replace the base rules.
    pub fn validate_shipment(
        &self,
        shipment: &Shipment,
        rules: &CompiledRuleSet,
        region: Option<&str>,
    ) -> ShipmentValidation {
        let selected: Vec<&CompiledRule> = match region {
            Some(region) => rules.for_region(region).collect(),
            None => rules.rules().iter().collect(),
        };

        let mut result = ShipmentValidation::default();
        for compiled in selected {
            let key = &compiled.rule.field_key;
            let value = shipment.get_ignore_case(key).unwrap_or("");
            let outcome = self.validate_field(value, compiled);
            if !value.trim().is_empty() {
                result
                    .normalized
                    .insert(key.clone(), outcome.normalized_value);
            }
            result.findings.extend(outcome.findings);
            result.unevaluated.extend(outcome.unevaluated);
        }
        result.is_valid = !result
            .findings
            .iter()
            .any(|f| f.level == ValidationLevel::Error);

        tracing::debug!(
            findings = result.findings.len(),
            valid = result.is_valid,
            region = region.unwrap_or("-"),
            "shipment fields validated"
        );
        result
    }

    fn run_custom(
        &self,
        handler: &str,
        c: &CompiledConstraint,
        value: &str,
        rule: &ComplianceRule,
        outcome: &mut FieldOutcome,
    ) {
        let Some(custom) = self.custom.get(handler) else {
            tracing::warn!(
                field_key = %rule.field_key,
                constraint_id = %c.constraint.id,
                handler,
                "no handler registered for custom constraint"
            );
            outcome.unevaluated.push(UnevaluatedConstraint {
                field_key: rule.field_key.clone(),
                constraint_id: c.constraint.id,
                handler: handler.to_string(),
            });
            return;
        };
        if let Err(message) = custom.check(value, rule) {
            let message = if message.is_empty() {
                default_message(c, rule)
            } else {
                message
            };
            outcome
                .findings
                .push(constraint_finding(rule, c, message, value));
        }
    }
}

/// Message for a failed built-in constraint, or `None` when it passes.
fn violation(
    check: &ConstraintCheck,
    c: &CompiledConstraint,
    value: &str,
    rule: &ComplianceRule,
) -> Option<String> {
    let passes = match check {
        ConstraintCheck::Min(bound) | ConstraintCheck::Max(bound) => {
            let Some(n) = first_number(value) else {
                return Some(format!(
                    "{} value {value:?} is not numeric",
                    rule.display_name
                ));
            };
            if matches!(check, ConstraintCheck::Min(_)) {
                n >= *bound
            } else {
                n <= *bound
            }
        }
        ConstraintCheck::Equal(expected) => value == expected,
        ConstraintCheck::Pattern(re) => re.is_match(value),
        ConstraintCheck::Custom(_) => true,
    };
    (!passes).then(|| default_message(c, rule))
}

fn default_message(c: &CompiledConstraint, rule: &ComplianceRule) -> String {
    if !c.constraint.error_message.is_empty() {
        return c.constraint.error_message.clone();
    }
    let name = &rule.display_name;
    match &c.check {
        ConstraintCheck::Min(bound) => format!("{name} must be at least {bound}"),
        ConstraintCheck::Max(bound) => format!("{name} must be at most {bound}"),
        ConstraintCheck::Equal(expected) => format!("{name} must equal {expected:?}"),
        ConstraintCheck::Pattern(_) => format!("{name} has an invalid format"),
        ConstraintCheck::Custom(handler) => format!("{name} failed check `{handler}`"),
    }
}

fn finding(
    rule: &ComplianceRule,
    level: ValidationLevel,
    kind: FindingKind,
    message: String,
    value: &str,
) -> ValidationFinding {
    ValidationFinding {
        field_key: rule.field_key.clone(),
        level,
        kind,
        message,
        value: value.to_string(),
    }
}

fn constraint_finding(
    rule: &ComplianceRule,
    c: &CompiledConstraint,
    message: String,
    value: &str,
) -> ValidationFinding {
    finding(
        rule,
        c.constraint.validation_level,
        FindingKind::Constraint {
            constraint_id: c.constraint.id,
            constraint_type: c.constraint.constraint_type,
        },
        message,
        value,
    )
}

fn record_findings(findings: &[ValidationFinding]) {
    for f in findings {
        metrics::counter!("shipcomply_findings_total", "level" => f.level.as_str()).increment(1);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use shipcomply_core::{
        CategoryId, ConstraintDraft, ConstraintType, RuleDraft, TransformKind,
        ValidationConstraint,
    };

    fn rule(draft: RuleDraft) -> ComplianceRule {
        ComplianceRule::create(RuleDraft {
            category_id: Some(CategoryId::new()),
            ..draft
        })
        .unwrap()
    }

    fn constraint(
        rule: &ComplianceRule,
        ty: ConstraintType,
        value: &str,
        level: ValidationLevel,
    ) -> ValidationConstraint {
        ValidationConstraint::create(ConstraintDraft {
            rule_id: Some(rule.id),
            constraint_type: Some(ty),
            constraint_value: Some(value.into()),
            validation_level: Some(level),
            ..Default::default()
        })
        .unwrap()
    }

    fn compile(rule: ComplianceRule, constraints: &[ValidationConstraint]) -> CompiledRule {
        let (compiled, issues) = CompiledRule::compile(rule, constraints);
        assert!(issues.is_empty(), "{issues:?}");
        compiled
    }

    #[test]
    fn test_first_number() {
        assert_eq!(first_number("2.5 kg"), Some(2.5));
        assert_eq!(first_number("USD 1,250.75"), Some(1250.75));
        assert_eq!(first_number("-3"), Some(-3.0));
        assert_eq!(first_number("none"), None);
        assert_eq!(first_number("1,5 kg"), Some(1.5));
        assert_eq!(first_number("0,75kg"), Some(0.75));
        assert_eq!(first_number("12,000 kg"), Some(12000.0));
        assert_eq!(first_number("1,234,567"), Some(1234567.0));
    }

    #[test]
    fn test_required_empty_value_yields_single_error() {
        let r = rule(RuleDraft {
            field_key: Some("recipientName".into()),
            is_required: Some(true),
            validation_pattern: Some(r"^.{2,}$".into()),
            ..Default::default()
        });
        let min = constraint(&r, ConstraintType::Min, "1", ValidationLevel::Error);
        let compiled = compile(r, &[min]);

        let outcome = FieldValidator::new().validate_field("   ", &compiled);
        assert_eq!(outcome.findings.len(), 1);
        let f = &outcome.findings[0];
        assert_eq!(f.kind, FindingKind::Required);
        assert_eq!(f.level, ValidationLevel::Error);
        assert_eq!(f.message, "Recipient Name is required");
        assert!(!outcome.is_valid());
    }

    #[test]
    fn test_empty_optional_value_has_no_findings() {
        let r = rule(RuleDraft {
            field_key: Some("orderNumber".into()),
            validation_pattern: Some(r"^\d+$".into()),
            ..Default::default()
        });
        let compiled = compile(r, &[]);
        let outcome = FieldValidator::new().validate_field("", &compiled);
        assert!(outcome.findings.is_empty());
    }

    #[test]
    fn test_pattern_accepts_transformed_value() {
        let r = rule(RuleDraft {
            field_key: Some("recipientCountry".into()),
            validation_pattern: Some(r"^[A-Z]{2}$".into()),
            transform_function: Some(TransformKind::Uppercase2LetterCode),
            ..Default::default()
        });
        let compiled = compile(r, &[]);
        let outcome = FieldValidator::new().validate_field("Germany", &compiled);
        assert!(outcome.findings.is_empty());
        assert_eq!(outcome.normalized_value, "DE");
    }

    #[test]
    fn test_pattern_failure_uses_rule_message_and_original_value() {
        let r = rule(RuleDraft {
            field_key: Some("currency".into()),
            validation_pattern: Some(r"^[A-Z]{3}$".into()),
            validation_message: Some("Currency must be a 3-letter ISO code".into()),
            transform_function: Some(TransformKind::Uppercase),
            ..Default::default()
        });
        let compiled = compile(r, &[]);
        let outcome = FieldValidator::new().validate_field("euros", &compiled);
        assert_eq!(outcome.findings.len(), 1);
        assert_eq!(outcome.findings[0].kind, FindingKind::Pattern);
        assert_eq!(outcome.findings[0].value, "euros");
        assert_eq!(
            outcome.findings[0].message,
            "Currency must be a 3-letter ISO code"
        );
        assert_eq!(outcome.normalized_value, "EUROS");
    }

    #[test]
    fn test_non_numeric_value_fails_bound_at_constraint_level() {
        let r = rule(RuleDraft {
            field_key: Some("packageCount".into()),
            ..Default::default()
        });
        let min = constraint(&r, ConstraintType::Min, "1", ValidationLevel::Warning);
        let compiled = compile(r, &[min]);
        let outcome = FieldValidator::new().validate_field("several", &compiled);
        assert_eq!(outcome.findings.len(), 1);
        assert_eq!(outcome.findings[0].level, ValidationLevel::Warning);
        assert!(outcome.findings[0].message.contains("not numeric"));
    }

    #[test]
    fn test_equal_and_pattern_constraints() {
        let r = rule(RuleDraft {
            field_key: Some("serviceType".into()),
            ..Default::default()
        });
        let eq = constraint(&r, ConstraintType::Equal, "EXPRESS", ValidationLevel::Info);
        let pat = constraint(&r, ConstraintType::Pattern, "^[A-Z]+$", ValidationLevel::Error);
        let compiled = compile(r, &[eq, pat]);
        let v = FieldValidator::new();

        assert!(v.validate_field("EXPRESS", &compiled).findings.is_empty());
        let outcome = v.validate_field("ground", &compiled);
        let levels: Vec<_> = outcome.findings.iter().map(|f| f.level).collect();
        assert_eq!(levels, vec![ValidationLevel::Info, ValidationLevel::Error]);
    }

    #[test]
    fn test_custom_constraint_dispatch() {
        let r = rule(RuleDraft {
            field_key: Some("eoriNumber".into()),
            ..Default::default()
        });
        let known = constraint(&r, ConstraintType::Custom, "eoriChecksum", ValidationLevel::Error);
        let unknown = constraint(&r, ConstraintType::Custom, "vatLookup", ValidationLevel::Error);
        let compiled = compile(r, &[known, unknown]);

        let mut custom = CustomConstraints::new();
        custom.register("eoriChecksum", |value: &str, _: &ComplianceRule| {
            if value.starts_with("GB") {
                Ok(())
            } else {
                Err(String::new())
            }
        });
        let v = FieldValidator::with_custom(custom);

        let ok = v.validate_field("GB123456789000", &compiled);
        assert!(ok.findings.is_empty());
        assert_eq!(ok.unevaluated.len(), 1);
        assert_eq!(ok.unevaluated[0].handler, "vatLookup");

        let bad = v.validate_field("FR1", &compiled);
        assert_eq!(bad.findings.len(), 1);
        assert_eq!(bad.findings[0].message, "Eori Number failed check `eoriChecksum`");
    }

    #[test]
    fn test_custom_constraint_runs_on_empty_value() {
        let r = rule(RuleDraft {
            field_key: Some("eoriNumber".into()),
            ..Default::default()
        });
        let c = constraint(&r, ConstraintType::Custom, "nonEmpty", ValidationLevel::Warning);
        let compiled = compile(r, &[c]);
        let mut custom = CustomConstraints::new();
        custom.register("nonEmpty", |value: &str, _: &ComplianceRule| {
            if value.is_empty() {
                Err("EORI recommended".to_string())
            } else {
                Ok(())
            }
        });
        let outcome = FieldValidator::with_custom(custom).validate_field("", &compiled);
        assert_eq!(outcome.findings.len(), 1);
        assert_eq!(outcome.findings[0].message, "EORI recommended");
        assert!(outcome.is_valid());
    }

    #[test]
    fn test_failed_transform_keeps_original() {
        let r = rule(RuleDraft {
            field_key: Some("shipDate".into()),
            transform_function: Some(TransformKind::NormalizeDateIso),
            ..Default::default()
        });
        let compiled = compile(r, &[]);
        let outcome = FieldValidator::new().validate_field("soon", &compiled);
        assert!(outcome.findings.is_empty());
        assert_eq!(outcome.normalized_value, "soon");
    }
}
