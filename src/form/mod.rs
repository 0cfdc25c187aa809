mod derived;
mod error;
mod store;
mod validation;

use indexmap::IndexMap;
use serde_json::Value;

pub use derived::evaluate_formula;
pub use error::{SaveOutcome, StoreError};
pub use store::FormStore;
pub use validation::evaluate_rules;

/// Live values entered while filling a form, keyed by field id. Ephemeral:
/// rebuilt when a form is opened for preview, discarded on clear.
pub type FormData = IndexMap<String, Value>;

/// Currently active per-field error messages. Absence of a key means the
/// field has no error.
pub type ValidationErrorMap = IndexMap<String, String>;
