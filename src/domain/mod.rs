mod schema;

pub use schema::{FieldType, FormField, FormSchema, RuleKind, ValidationRule};
