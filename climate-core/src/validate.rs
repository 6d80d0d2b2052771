//! Declarative input validation.
//!
//! Types describe their constraints through [`Validate`]; a [`Validator`]
//! evaluates them. The client only talks to the trait, so tests can swap in
//! a validator that accepts or rejects everything.

use std::fmt::{self, Debug};

/// A single constraint on a text field.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Rule {
    /// Field must not be empty (whitespace counts as empty).
    Required,
    /// Exact length in characters.
    Len(usize),
    /// ASCII digits only.
    Numeric,
    /// ASCII letters only.
    Alpha,
}

impl Rule {
    fn check(&self, value: &str) -> Result<(), String> {
        match self {
            Rule::Required if value.trim().is_empty() => Err("is required".to_string()),
            Rule::Len(len) if value.chars().count() != *len => {
                Err(format!("must be exactly {len} characters"))
            }
            Rule::Numeric if !value.chars().all(|c| c.is_ascii_digit()) => {
                Err("must contain only digits".to_string())
            }
            Rule::Alpha if !value.chars().all(|c| c.is_ascii_alphabetic()) => {
                Err("must contain only letters".to_string())
            }
            _ => Ok(()),
        }
    }
}

/// The rules that apply to one field of a value.
#[derive(Debug, Clone)]
pub struct FieldRules<'a> {
    pub field: &'static str,
    pub value: &'a str,
    pub rules: &'static [Rule],
}

/// Implemented by types that carry a declarative constraint set.
pub trait Validate {
    fn field_rules(&self) -> Vec<FieldRules<'_>>;
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("invalid {field}: {reason}")]
pub struct FieldViolation {
    pub field: &'static str,
    pub reason: String,
}

/// All violations found for one value.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ValidationErrors(Vec<FieldViolation>);

impl ValidationErrors {
    pub fn violations(&self) -> &[FieldViolation] {
        &self.0
    }

    pub fn has_field(&self, field: &str) -> bool {
        self.0.iter().any(|v| v.field == field)
    }
}

impl From<Vec<FieldViolation>> for ValidationErrors {
    fn from(violations: Vec<FieldViolation>) -> Self {
        Self(violations)
    }
}

impl fmt::Display for ValidationErrors {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let parts: Vec<String> = self.0.iter().map(ToString::to_string).collect();
        f.write_str(&parts.join("; "))
    }
}

impl std::error::Error for ValidationErrors {}

/// Structural validation capability injected into the client.
pub trait Validator: Send + Sync + Debug {
    fn validate(&self, target: &dyn Validate) -> Result<(), ValidationErrors>;
}

/// Evaluates the rules declared by [`Validate::field_rules`].
///
/// A failed [`Rule::Required`] stops the remaining rules for that field;
/// every other failure is collected.
#[derive(Debug, Clone, Copy, Default)]
pub struct RuleValidator;

impl Validator for RuleValidator {
    fn validate(&self, target: &dyn Validate) -> Result<(), ValidationErrors> {
        let mut violations = Vec::new();

        for field in target.field_rules() {
            for rule in field.rules {
                if let Err(reason) = rule.check(field.value) {
                    violations.push(FieldViolation { field: field.field, reason });
                    if *rule == Rule::Required {
                        break;
                    }
                }
            }
        }

        if violations.is_empty() { Ok(()) } else { Err(violations.into()) }
    }
}
