use std::fmt;

/// Precondition failures on state-container operations. These are surfaced
/// explicitly instead of being swallowed as silent no-ops, so callers can
/// tell a rejected mutation from an accepted one.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StoreError {
    /// An operation needed a form-in-edit and none exists.
    NoCurrentForm,
    /// A field index was outside the current form's field list.
    IndexOutOfRange { index: usize, len: usize },
    /// An option-backed field (select/radio/checkbox) was committed with an
    /// empty option list.
    MissingOptions { label: String },
    /// No saved form with the given id exists in the catalog.
    UnknownForm { id: String },
}

impl fmt::Display for StoreError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            StoreError::NoCurrentForm => write!(f, "no form is currently being edited"),
            StoreError::IndexOutOfRange { index, len } => {
                write!(f, "field index {index} is out of range (form has {len} fields)")
            }
            StoreError::MissingOptions { label } => {
                write!(f, "field \"{label}\" needs at least one option")
            }
            StoreError::UnknownForm { id } => write!(f, "no saved form with id {id}"),
        }
    }
}

impl std::error::Error for StoreError {}

/// Result of a save: the catalog upsert always happens in memory; the
/// durable write may still have failed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SaveOutcome {
    /// Catalog updated and written through to durable storage.
    Persisted,
    /// Catalog updated in memory only; the durable write failed and was
    /// logged. The in-session state is not rolled back.
    MemoryOnly,
}
