#![deny(rust_2018_idioms)]

mod domain;
mod form;
mod io;

pub use domain::{FieldType, FormField, FormSchema, RuleKind, ValidationRule};
pub use form::{
    FormData, FormStore, SaveOutcome, StoreError, ValidationErrorMap, evaluate_formula,
    evaluate_rules,
};
pub use io::{CatalogStore, FileCatalog, MemoryCatalog};

pub mod prelude {
    pub use super::{
        CatalogStore, FieldType, FileCatalog, FormField, FormSchema, FormStore, MemoryCatalog,
        RuleKind, SaveOutcome, StoreError, ValidationRule,
    };
}
