use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use uuid::Uuid;

/// The constraint kinds a field may carry. Rules are evaluated in the
/// order they are attached; the first failing rule wins.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum RuleKind {
    Required,
    MinLength,
    MaxLength,
    Email,
    Password,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ValidationRule {
    pub kind: RuleKind,
    /// Length bound for `MinLength`/`MaxLength`; ignored by other kinds.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub threshold: Option<u32>,
    pub message: String,
}

impl ValidationRule {
    pub fn new(kind: RuleKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            threshold: None,
            message: message.into(),
        }
    }

    pub fn with_threshold(mut self, threshold: u32) -> Self {
        self.threshold = Some(threshold);
        self
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FieldType {
    Text,
    Number,
    Textarea,
    Select,
    Radio,
    Checkbox,
    Date,
    Password,
}

impl FieldType {
    /// Whether the type renders from a fixed option list. Option-backed
    /// fields must carry a non-empty `options` list once committed into
    /// a form.
    pub fn has_options(&self) -> bool {
        matches!(self, FieldType::Select | FieldType::Radio | FieldType::Checkbox)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FormField {
    pub id: String,
    #[serde(rename = "type")]
    pub field_type: FieldType,
    pub label: String,
    pub required: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub default_value: Option<Value>,
    #[serde(default)]
    pub validations: Vec<ValidationRule>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub options: Vec<String>,
    #[serde(default)]
    pub is_derived: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub derived_formula: Option<String>,
}

impl FormField {
    /// Creates a field with a fresh id. The id is generated once here and
    /// never reused, even if the field is later deleted.
    pub fn new(field_type: FieldType, label: impl Into<String>) -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            field_type,
            label: label.into(),
            required: false,
            default_value: None,
            validations: Vec::new(),
            options: Vec::new(),
            is_derived: false,
            derived_formula: None,
        }
    }

    pub fn with_required(mut self, required: bool) -> Self {
        self.required = required;
        self
    }

    pub fn with_default(mut self, value: Value) -> Self {
        self.default_value = Some(value);
        self
    }

    pub fn with_rule(mut self, rule: ValidationRule) -> Self {
        self.validations.push(rule);
        self
    }

    pub fn with_options(mut self, options: Vec<String>) -> Self {
        self.options = options;
        self
    }

    pub fn derived(mut self, formula: impl Into<String>) -> Self {
        self.is_derived = true;
        self.derived_formula = Some(formula.into());
        self
    }

    /// An option-backed field is only committable with at least one option.
    pub fn options_satisfied(&self) -> bool {
        !self.field_type.has_options() || !self.options.is_empty()
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FormSchema {
    pub id: String,
    pub name: String,
    pub fields: Vec<FormField>,
    pub created_at: DateTime<Utc>,
}

impl FormSchema {
    /// A fresh unnamed schema, as created when the user starts a new form.
    /// `name` and `created_at` are finalized at save time.
    pub fn draft() -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            name: String::new(),
            fields: Vec::new(),
            created_at: Utc::now(),
        }
    }
}
