//! # Input Validation Module
//!
//! Declarative input-shape schemas for procedures.
//!
//! A schema is checked before the handler runs; on failure the handler
//! is never invoked and the caller receives field-level detail that
//! enumerates EVERY failing field, not just the first. Codes are
//! machine-readable and stable.

use crate::types::{ValidationDetail, WicketError};
use serde_json::Value;

// =============================================================================
// FAILURE CODES
// =============================================================================

/// Detail key used when the input as a whole is unusable.
pub const INPUT_FIELD: &str = "_input";

const CODE_REQUIRED: &str = "required";
const CODE_TOO_SHORT: &str = "too_short";
const CODE_TOO_LONG: &str = "too_long";
const CODE_INVALID_EMAIL: &str = "invalid_email";
const CODE_EXPECTED_STRING: &str = "expected_string";
const CODE_EXPECTED_OBJECT: &str = "expected_object";
const CODE_UNKNOWN_FIELD: &str = "unknown_field";

// =============================================================================
// RULES
// =============================================================================

/// A single constraint on a string field.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Rule {
    /// Value must not be empty.
    NonEmpty,
    /// Value must be at least this many bytes.
    MinLen(usize),
    /// Value must be at most this many bytes.
    MaxLen(usize),
    /// Value must look like an email address.
    Email,
}

impl Rule {
    /// Check one rule against a string value, returning the failure code.
    fn check(&self, value: &str) -> Option<&'static str> {
        match self {
            Self::NonEmpty => value.is_empty().then_some(CODE_TOO_SHORT),
            Self::MinLen(min) => (value.len() < *min).then_some(CODE_TOO_SHORT),
            Self::MaxLen(max) => (value.len() > *max).then_some(CODE_TOO_LONG),
            Self::Email => (!looks_like_email(value)).then_some(CODE_INVALID_EMAIL),
        }
    }
}

/// Structural email check: one `@`, non-empty local part, domain with a
/// dot, no whitespace. Deliverability is the provider's problem, not
/// this boundary's.
fn looks_like_email(value: &str) -> bool {
    if value.chars().any(char::is_whitespace) {
        return false;
    }
    let Some((local, domain)) = value.split_once('@') else {
        return false;
    };
    !local.is_empty() && domain.contains('.') && !domain.starts_with('.') && !domain.ends_with('.')
}

// =============================================================================
// FIELD SPEC
// =============================================================================

/// Declared constraints for one named field.
#[derive(Debug, Clone)]
struct FieldSpec {
    name: String,
    required: bool,
    rules: Vec<Rule>,
}

impl FieldSpec {
    /// Check this field against the input object, recording at most one
    /// failure code (the first rule that fails).
    fn check(&self, input: &serde_json::Map<String, Value>, detail: &mut ValidationDetail) {
        let value = input.get(&self.name).filter(|v| !v.is_null());

        let Some(value) = value else {
            if self.required {
                detail.insert(self.name.clone(), CODE_REQUIRED.to_string());
            }
            return;
        };

        let Some(text) = value.as_str() else {
            detail.insert(self.name.clone(), CODE_EXPECTED_STRING.to_string());
            return;
        };

        if let Some(code) = self.rules.iter().find_map(|rule| rule.check(text)) {
            detail.insert(self.name.clone(), code.to_string());
        }
    }
}

// =============================================================================
// INPUT SCHEMA
// =============================================================================

/// Declarative shape validator for a procedure's JSON input.
///
/// Built once at registration time, immutable thereafter. `check`
/// collects every failing field into a [`ValidationDetail`] with
/// deterministic field order.
#[derive(Debug, Clone, Default)]
pub struct InputSchema {
    fields: Vec<FieldSpec>,
    deny_unknown: bool,
}

impl InputSchema {
    /// Create an empty schema (accepts any object).
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Declare a field that must be present and non-null.
    #[must_use]
    pub fn required(mut self, name: &str, rules: impl Into<Vec<Rule>>) -> Self {
        self.fields.push(FieldSpec {
            name: name.to_string(),
            required: true,
            rules: rules.into(),
        });
        self
    }

    /// Declare a field that may be absent; rules apply when present.
    #[must_use]
    pub fn optional(mut self, name: &str, rules: impl Into<Vec<Rule>>) -> Self {
        self.fields.push(FieldSpec {
            name: name.to_string(),
            required: false,
            rules: rules.into(),
        });
        self
    }

    /// Reject fields the schema does not declare.
    #[must_use]
    pub fn deny_unknown(mut self) -> Self {
        self.deny_unknown = true;
        self
    }

    /// Check input against the schema.
    ///
    /// Non-object input (including `null`) fails as a whole under the
    /// `_input` key. Otherwise every declared field is checked and every
    /// failure recorded.
    pub fn check(&self, input: &Value) -> Result<(), WicketError> {
        let Some(object) = input.as_object() else {
            let mut detail = ValidationDetail::new();
            detail.insert(INPUT_FIELD.to_string(), CODE_EXPECTED_OBJECT.to_string());
            return Err(WicketError::Validation(detail));
        };

        let mut detail = ValidationDetail::new();
        for field in &self.fields {
            field.check(object, &mut detail);
        }

        if self.deny_unknown {
            for key in object.keys() {
                if !self.fields.iter().any(|f| f.name == *key) {
                    detail.insert(key.clone(), CODE_UNKNOWN_FIELD.to_string());
                }
            }
        }

        if detail.is_empty() {
            Ok(())
        } else {
            Err(WicketError::Validation(detail))
        }
    }
}

// =============================================================================
// TESTS
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    /// Extract validation detail; any other outcome yields an empty map,
    /// which the per-test assertions then reject.
    fn detail_of(result: Result<(), WicketError>) -> ValidationDetail {
        match result {
            Err(WicketError::Validation(detail)) => detail,
            _ => ValidationDetail::new(),
        }
    }

    #[test]
    fn empty_schema_accepts_any_object() {
        let schema = InputSchema::new();
        assert!(schema.check(&json!({})).is_ok());
        assert!(schema.check(&json!({"anything": 1})).is_ok());
    }

    #[test]
    fn non_object_input_fails_as_a_whole() {
        let schema = InputSchema::new();
        let detail = detail_of(schema.check(&json!(null)));
        assert_eq!(detail.get(INPUT_FIELD).map(String::as_str), Some("expected_object"));

        let detail = detail_of(schema.check(&json!([1, 2])));
        assert_eq!(detail.get(INPUT_FIELD).map(String::as_str), Some("expected_object"));
    }

    #[test]
    fn missing_required_field_reports_required() {
        let schema = InputSchema::new().required("name", [Rule::NonEmpty]);
        let detail = detail_of(schema.check(&json!({})));
        assert_eq!(detail.get("name").map(String::as_str), Some("required"));
    }

    #[test]
    fn null_counts_as_missing() {
        let schema = InputSchema::new()
            .required("name", [Rule::NonEmpty])
            .optional("email", [Rule::Email]);
        let detail = detail_of(schema.check(&json!({"name": null, "email": null})));
        assert_eq!(detail.get("name").map(String::as_str), Some("required"));
        // Optional + null: no failure recorded.
        assert!(!detail.contains_key("email"));
    }

    #[test]
    fn empty_string_fails_non_empty_as_too_short() {
        let schema = InputSchema::new().required("name", [Rule::NonEmpty]);
        let detail = detail_of(schema.check(&json!({"name": ""})));
        assert_eq!(detail.get("name").map(String::as_str), Some("too_short"));
    }

    #[test]
    fn every_failing_field_is_enumerated() {
        let schema = InputSchema::new()
            .required("name", [Rule::NonEmpty])
            .required("email", [Rule::Email])
            .required("bio", [Rule::MaxLen(4)]);
        let detail = detail_of(schema.check(&json!({
            "name": "",
            "email": "not-an-email",
            "bio": "way too long",
        })));
        assert_eq!(detail.len(), 3);
        assert_eq!(detail.get("name").map(String::as_str), Some("too_short"));
        assert_eq!(detail.get("email").map(String::as_str), Some("invalid_email"));
        assert_eq!(detail.get("bio").map(String::as_str), Some("too_long"));
    }

    #[test]
    fn non_string_value_reports_expected_string() {
        let schema = InputSchema::new().required("name", [Rule::NonEmpty]);
        let detail = detail_of(schema.check(&json!({"name": 42})));
        assert_eq!(detail.get("name").map(String::as_str), Some("expected_string"));
    }

    #[test]
    fn unknown_fields_rejected_when_denied() {
        let schema = InputSchema::new()
            .optional("name", [Rule::NonEmpty])
            .deny_unknown();
        let detail = detail_of(schema.check(&json!({"name": "ok", "extra": 1})));
        assert_eq!(detail.get("extra").map(String::as_str), Some("unknown_field"));
    }

    #[test]
    fn email_shape_check() {
        assert!(looks_like_email("alice@example.com"));
        assert!(looks_like_email("a.b+tag@sub.example.org"));
        assert!(!looks_like_email("alice"));
        assert!(!looks_like_email("alice@"));
        assert!(!looks_like_email("@example.com"));
        assert!(!looks_like_email("alice@nodot"));
        assert!(!looks_like_email("alice@.com"));
        assert!(!looks_like_email("al ice@example.com"));
    }
}
