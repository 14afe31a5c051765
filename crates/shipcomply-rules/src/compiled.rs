//! # Compiled Rule Sets
//!
//! Stored patterns and numeric bounds are strings. They are compiled once
//! per snapshot into a [`CompiledRuleSet`] keyed by rule id, never per
//! field evaluation. Entries that fail to compile are reported as
//! [`RuleLoadIssue`]s and skipped; everything else still loads.

use std::collections::HashMap;

use regex::Regex;
use shipcomply_core::{ComplianceRule, ConstraintType, RegionalRule, RuleId, ValidationConstraint};
use shipcomply_store::RuleSnapshot;

use crate::error::RuleLoadIssue;

/// Ready-to-run form of one constraint.
#[derive(Debug, Clone)]
pub enum ConstraintCheck {
    Min(f64),
    Max(f64),
    Equal(String),
    Pattern(Regex),
    /// Name of the host handler to delegate to.
    Custom(String),
}

#[derive(Debug, Clone)]
pub struct CompiledConstraint {
    pub constraint: ValidationConstraint,
    pub check: ConstraintCheck,
}

/// A rule with its pattern and active constraints compiled.
#[derive(Debug, Clone)]
pub struct CompiledRule {
    pub rule: ComplianceRule,
    /// `None` when the rule has no pattern or the pattern failed to compile.
    pub pattern: Option<Regex>,
    pub constraints: Vec<CompiledConstraint>,
}

impl CompiledRule {
    /// Compile `rule` and its constraints. Inactive constraints are dropped.
    pub fn compile(
        rule: ComplianceRule,
        constraints: &[ValidationConstraint],
    ) -> (Self, Vec<RuleLoadIssue>) {
        let mut issues = Vec::new();

        let pattern = match compile_pattern(&rule.validation_pattern) {
            Ok(p) => p,
            Err(error) => {
                issues.push(RuleLoadIssue::InvalidPattern {
                    rule_id: rule.id,
                    field_key: rule.field_key.clone(),
                    error,
                });
                None
            }
        };

        let mut compiled = Vec::new();
        for constraint in constraints.iter().filter(|c| c.is_active) {
            match compile_constraint(constraint) {
                Ok(check) => compiled.push(CompiledConstraint {
                    constraint: constraint.clone(),
                    check,
                }),
                Err(issue) => issues.push(issue),
            }
        }

        (
            Self {
                rule,
                pattern,
                constraints: compiled,
            },
            issues,
        )
    }

    /// Copy of this rule with a regional override applied. Constraints are
    /// shared with the base rule.
    fn with_override(&self, regional: &RegionalRule) -> Result<Self, RuleLoadIssue> {
        let rule = regional.apply_to(&self.rule);
        let pattern = match &regional.validation_pattern {
            Some(source) => {
                compile_pattern(source).map_err(|error| RuleLoadIssue::InvalidRegionalPattern {
                    rule_id: self.rule.id,
                    region: regional.region.clone(),
                    error,
                })?
            }
            None => self.pattern.clone(),
        };
        Ok(Self {
            rule,
            pattern,
            constraints: self.constraints.clone(),
        })
    }
}

fn compile_pattern(source: &str) -> Result<Option<Regex>, String> {
    if source.trim().is_empty() {
        return Ok(None);
    }
    Regex::new(source).map(Some).map_err(|e| e.to_string())
}

fn compile_constraint(c: &ValidationConstraint) -> Result<ConstraintCheck, RuleLoadIssue> {
    let bound = || {
        c.constraint_value
            .trim()
            .parse::<f64>()
            .ok()
            .filter(|v| v.is_finite())
            .ok_or_else(|| RuleLoadIssue::InvalidBound {
                constraint_id: c.id,
                rule_id: c.rule_id,
                value: c.constraint_value.clone(),
            })
    };
    Ok(match c.constraint_type {
        ConstraintType::Min => ConstraintCheck::Min(bound()?),
        ConstraintType::Max => ConstraintCheck::Max(bound()?),
        ConstraintType::Equal => ConstraintCheck::Equal(c.constraint_value.clone()),
        ConstraintType::Pattern => {
            let re = Regex::new(&c.constraint_value).map_err(|e| {
                RuleLoadIssue::InvalidConstraintPattern {
                    constraint_id: c.id,
                    rule_id: c.rule_id,
                    error: e.to_string(),
                }
            })?;
            ConstraintCheck::Pattern(re)
        }
        ConstraintType::Custom => ConstraintCheck::Custom(c.constraint_value.trim().to_string()),
    })
}

/// Every active rule of a snapshot, compiled, plus per-region variants.
#[derive(Debug, Clone, Default)]
pub struct CompiledRuleSet {
    rules: Vec<CompiledRule>,
    by_id: HashMap<RuleId, usize>,
    /// (rule id, uppercased region) → merged rule.
    regional: HashMap<(RuleId, String), CompiledRule>,
    issues: Vec<RuleLoadIssue>,
}

impl CompiledRuleSet {
    /// Compile a rule snapshot. Load issues are logged and kept on the set.
    pub fn from_snapshot(snapshot: &RuleSnapshot) -> Self {
        let mut set = Self::default();

        for rule in &snapshot.rules {
            let (compiled, issues) =
                CompiledRule::compile(rule.clone(), snapshot.constraints_for(rule.id));
            set.issues.extend(issues);

            for regional in snapshot.regional_rules.get(&rule.id).into_iter().flatten() {
                match compiled.with_override(regional) {
                    Ok(merged) => {
                        set.regional
                            .insert((rule.id, regional.region.to_uppercase()), merged);
                    }
                    Err(issue) => set.issues.push(issue),
                }
            }

            set.by_id.insert(rule.id, set.rules.len());
            set.rules.push(compiled);
        }

        for issue in &set.issues {
            tracing::warn!(issue = %issue, "skipping uncompilable rule entry");
        }
        tracing::debug!(
            rules = set.rules.len(),
            regional = set.regional.len(),
            issues = set.issues.len(),
            "rule set compiled"
        );
        set
    }

    /// Rules in evaluation order.
    pub fn rules(&self) -> &[CompiledRule] {
        &self.rules
    }

    pub fn get(&self, id: RuleId) -> Option<&CompiledRule> {
        self.by_id.get(&id).map(|&i| &self.rules[i])
    }

    /// Rule for `field_key`, if one is active.
    pub fn by_field_key(&self, field_key: &str) -> Option<&CompiledRule> {
        self.rules.iter().find(|r| r.rule.field_key == field_key)
    }

    /// Rules in evaluation order with overrides for `region` applied.
    pub fn for_region<'a>(&'a self, region: &str) -> impl Iterator<Item = &'a CompiledRule> + 'a {
        let region = region.trim().to_uppercase();
        self.rules.iter().map(move |base| {
            self.regional
                .get(&(base.rule.id, region.clone()))
                .unwrap_or(base)
        })
    }

    /// Entries skipped while compiling.
    pub fn issues(&self) -> &[RuleLoadIssue] {
        &self.issues
    }

    pub fn len(&self) -> usize {
        self.rules.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rules.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use shipcomply_core::{
        CategoryId, ConstraintDraft, RegionalRuleDraft, RuleDraft, ValidationLevel,
    };

    fn rule(pattern: &str) -> ComplianceRule {
        ComplianceRule::create(RuleDraft {
            category_id: Some(CategoryId::new()),
            field_key: Some("postalCode".into()),
            validation_pattern: Some(pattern.into()),
            ..Default::default()
        })
        .unwrap()
    }

    fn constraint(rule_id: RuleId, ty: ConstraintType, value: &str) -> ValidationConstraint {
        ValidationConstraint::create(ConstraintDraft {
            rule_id: Some(rule_id),
            constraint_type: Some(ty),
            constraint_value: Some(value.into()),
            validation_level: Some(ValidationLevel::Warning),
            ..Default::default()
        })
        .unwrap()
    }

    #[test]
    fn test_bad_rule_pattern_is_an_issue_not_a_failure() {
        let (compiled, issues) = CompiledRule::compile(rule("(unclosed"), &[]);
        assert!(compiled.pattern.is_none());
        assert!(matches!(issues[..], [RuleLoadIssue::InvalidPattern { .. }]));
    }

    #[test]
    fn test_bad_constraints_are_skipped() {
        let r = rule(r"^\d{5}$");
        let constraints = vec![
            constraint(r.id, ConstraintType::Min, "ten"),
            constraint(r.id, ConstraintType::Pattern, "[z-a]"),
            constraint(r.id, ConstraintType::Max, "99999"),
        ];
        let (compiled, issues) = CompiledRule::compile(r, &constraints);
        assert_eq!(issues.len(), 2);
        assert_eq!(compiled.constraints.len(), 1);
        assert!(matches!(compiled.constraints[0].check, ConstraintCheck::Max(v) if v == 99999.0));
    }

    #[test]
    fn test_inactive_constraints_are_dropped() {
        let r = rule("");
        let mut c = constraint(r.id, ConstraintType::Equal, "x");
        c.is_active = false;
        let (compiled, issues) = CompiledRule::compile(r, &[c]);
        assert!(issues.is_empty());
        assert!(compiled.constraints.is_empty());
        assert!(compiled.pattern.is_none());
    }

    #[test]
    fn test_regional_variant_replaces_base_rule() {
        let base = rule(r"^\d{5}$");
        let regional = RegionalRule::create(RegionalRuleDraft {
            base_rule_id: Some(base.id),
            region: Some("UK".into()),
            validation_pattern: Some(r"^[A-Z]{1,2}\d".into()),
            ..Default::default()
        })
        .unwrap();
        let mut snapshot = RuleSnapshot::default();
        snapshot.regional_rules.insert(base.id, vec![regional]);
        snapshot.rules.push(base);

        let set = CompiledRuleSet::from_snapshot(&snapshot);
        let uk: Vec<_> = set.for_region("uk").collect();
        let us: Vec<_> = set.for_region("US").collect();
        assert!(uk[0].pattern.as_ref().unwrap().is_match("SW1A 1AA"));
        assert!(!us[0].pattern.as_ref().unwrap().is_match("SW1A 1AA"));
    }
}
