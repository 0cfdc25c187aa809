use std::sync::OnceLock;

use regex::Regex;
use serde_json::Value;

use crate::domain::{RuleKind, ValidationRule};

/// Evaluates a field's rules, in declared order, against a candidate value.
/// Returns the first failing rule's message, or `None` when every rule
/// passes. Pure: no UI state is consulted.
pub fn evaluate_rules(rules: &[ValidationRule], value: Option<&Value>) -> Option<String> {
    for rule in rules {
        let failed = match rule.kind {
            RuleKind::Required => is_absent(value),
            // Length and format rules only apply to present values;
            // absence is Required's concern.
            RuleKind::MinLength => present_text(value)
                .is_some_and(|text| char_len(&text) < rule.threshold.unwrap_or(0)),
            RuleKind::MaxLength => present_text(value)
                .is_some_and(|text| char_len(&text) > rule.threshold.unwrap_or(u32::MAX)),
            RuleKind::Email => present_text(value).is_some_and(|text| !email_shape().is_match(&text)),
            RuleKind::Password => {
                present_text(value).is_some_and(|text| !password_satisfied(&text))
            }
        };
        if failed {
            return Some(rule.message.clone());
        }
    }
    None
}

/// A value is absent when it was never entered, was cleared back to JSON
/// null or the empty string, or is an empty checkbox-group selection.
pub fn is_absent(value: Option<&Value>) -> bool {
    match value {
        None | Some(Value::Null) => true,
        Some(Value::String(text)) => text.is_empty(),
        Some(Value::Array(items)) => items.is_empty(),
        Some(_) => false,
    }
}

/// String form of a present value, for length and format checks.
fn present_text(value: Option<&Value>) -> Option<String> {
    if is_absent(value) {
        return None;
    }
    match value? {
        Value::String(text) => Some(text.clone()),
        Value::Array(items) => Some(
            items
                .iter()
                .map(value_text)
                .collect::<Vec<_>>()
                .join(","),
        ),
        other => Some(value_text(other)),
    }
}

fn value_text(value: &Value) -> String {
    match value {
        Value::String(text) => text.clone(),
        other => other.to_string(),
    }
}

fn char_len(text: &str) -> u32 {
    text.chars().count() as u32
}

// local@domain.tld shape: no whitespace, a single @, a dot after it.
fn email_shape() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"^[^\s@]+@[^\s@]+\.[^\s@]+$").expect("email pattern"))
}

// The regex crate has no lookahead, so the original's (?=.*\d).{8,} is
// spelled out directly.
fn password_satisfied(text: &str) -> bool {
    char_len(text) >= 8 && text.chars().any(|ch| ch.is_ascii_digit())
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn required() -> ValidationRule {
        ValidationRule::new(RuleKind::Required, "This field is required")
    }

    fn min_length(threshold: u32) -> ValidationRule {
        ValidationRule::new(RuleKind::MinLength, "Too short").with_threshold(threshold)
    }

    #[test]
    fn passes_when_no_rules() {
        assert_eq!(evaluate_rules(&[], Some(&json!("anything"))), None);
    }

    #[test]
    fn required_fails_on_missing_null_and_empty() {
        let rules = [required()];
        assert!(evaluate_rules(&rules, None).is_some());
        assert!(evaluate_rules(&rules, Some(&Value::Null)).is_some());
        assert!(evaluate_rules(&rules, Some(&json!(""))).is_some());
        assert_eq!(evaluate_rules(&rules, Some(&json!("x"))), None);
    }

    #[test]
    fn required_fails_on_empty_checkbox_group() {
        let rules = [required()];
        assert!(evaluate_rules(&rules, Some(&json!([]))).is_some());
        assert_eq!(evaluate_rules(&rules, Some(&json!(["cheese"]))), None);
    }

    #[test]
    fn first_failing_rule_wins() {
        let rules = [required(), min_length(5)];
        // On empty input the required rule masks the length rule.
        assert_eq!(
            evaluate_rules(&rules, Some(&json!(""))).as_deref(),
            Some("This field is required")
        );
        assert_eq!(
            evaluate_rules(&rules, Some(&json!("abc"))).as_deref(),
            Some("Too short")
        );
        assert_eq!(evaluate_rules(&rules, Some(&json!("abcdef"))), None);
    }

    #[test]
    fn length_rules_skip_absent_values() {
        let rules = [min_length(3)];
        assert_eq!(evaluate_rules(&rules, None), None);
        assert_eq!(evaluate_rules(&rules, Some(&json!(""))), None);
    }

    #[test]
    fn max_length_counts_chars() {
        let rules = [ValidationRule::new(RuleKind::MaxLength, "Too long").with_threshold(4)];
        assert_eq!(evaluate_rules(&rules, Some(&json!("abcd"))), None);
        assert!(evaluate_rules(&rules, Some(&json!("abcde"))).is_some());
    }

    #[test]
    fn length_rules_apply_to_numbers_via_string_form() {
        let rules = [min_length(3)];
        assert!(evaluate_rules(&rules, Some(&json!(42))).is_some());
        assert_eq!(evaluate_rules(&rules, Some(&json!(123))), None);
    }

    #[test]
    fn email_shape_check() {
        let rules = [ValidationRule::new(RuleKind::Email, "Invalid email")];
        assert!(evaluate_rules(&rules, Some(&json!("not-an-email"))).is_some());
        assert!(evaluate_rules(&rules, Some(&json!("user @example.com"))).is_some());
        assert!(evaluate_rules(&rules, Some(&json!("user@example"))).is_some());
        assert_eq!(evaluate_rules(&rules, Some(&json!("user@example.com"))), None);
    }

    #[test]
    fn password_needs_length_and_digit() {
        let rules = [ValidationRule::new(RuleKind::Password, "Weak password")];
        assert_eq!(evaluate_rules(&rules, Some(&json!("abcdefg1"))), None);
        assert!(evaluate_rules(&rules, Some(&json!("abcdefg"))).is_some());
        assert!(evaluate_rules(&rules, Some(&json!("abcdefgh"))).is_some());
        assert!(evaluate_rules(&rules, Some(&json!("ab1"))).is_some());
    }
}
