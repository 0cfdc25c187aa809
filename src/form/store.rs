use chrono::Utc;
use serde_json::Value;

use crate::domain::{FormField, FormSchema};
use crate::io::CatalogStore;

use super::{
    FormData, ValidationErrorMap, derived,
    error::{SaveOutcome, StoreError},
    validation,
};

/// The central state container: owns the form being edited, the saved-form
/// catalog, and the live fill-mode state (values and errors). All mutation
/// goes through the intent methods below; each runs synchronously to
/// completion. The container is the single writer of everything it owns, so
/// a multi-threaded embedder must wrap it in a mutex.
pub struct FormStore {
    current_form: Option<FormSchema>,
    saved_forms: Vec<FormSchema>,
    form_data: FormData,
    validation_errors: ValidationErrorMap,
    catalog: Box<dyn CatalogStore>,
}

impl FormStore {
    /// Builds a store backed by the given catalog adapter. The saved-form
    /// catalog is read immediately; a missing or corrupt slot loads as an
    /// empty catalog.
    pub fn new(catalog: Box<dyn CatalogStore>) -> Self {
        let saved_forms = catalog.load();
        Self {
            current_form: None,
            saved_forms,
            form_data: FormData::new(),
            validation_errors: ValidationErrorMap::new(),
            catalog,
        }
    }

    pub fn current_form(&self) -> Option<&FormSchema> {
        self.current_form.as_ref()
    }

    pub fn saved_forms(&self) -> &[FormSchema] {
        &self.saved_forms
    }

    pub fn form_data(&self) -> &FormData {
        &self.form_data
    }

    pub fn validation_errors(&self) -> &ValidationErrorMap {
        &self.validation_errors
    }

    /// Replaces the form-in-edit with a fresh draft (new id, empty name).
    pub fn create_new_form(&mut self) -> &FormSchema {
        self.current_form.insert(FormSchema::draft())
    }

    /// Appends a field to the form-in-edit.
    pub fn add_field(&mut self, field: FormField) -> Result<(), StoreError> {
        check_options(&field)?;
        let form = self.current_form.as_mut().ok_or(StoreError::NoCurrentForm)?;
        form.fields.push(field);
        Ok(())
    }

    /// Replaces the field at `index` with an edited copy.
    pub fn update_field(&mut self, index: usize, field: FormField) -> Result<(), StoreError> {
        check_options(&field)?;
        let form = self.current_form.as_mut().ok_or(StoreError::NoCurrentForm)?;
        let len = form.fields.len();
        let slot = form
            .fields
            .get_mut(index)
            .ok_or(StoreError::IndexOutOfRange { index, len })?;
        *slot = field;
        Ok(())
    }

    /// Removes the field at `index`; later fields shift down one position.
    pub fn delete_field(&mut self, index: usize) -> Result<(), StoreError> {
        let form = self.current_form.as_mut().ok_or(StoreError::NoCurrentForm)?;
        let len = form.fields.len();
        if index >= len {
            return Err(StoreError::IndexOutOfRange { index, len });
        }
        form.fields.remove(index);
        Ok(())
    }

    /// Moves the field at `from` to position `to`, keeping the relative
    /// order of every other field (a stable move, not a swap).
    pub fn reorder_fields(&mut self, from: usize, to: usize) -> Result<(), StoreError> {
        let form = self.current_form.as_mut().ok_or(StoreError::NoCurrentForm)?;
        let len = form.fields.len();
        if from >= len {
            return Err(StoreError::IndexOutOfRange { index: from, len });
        }
        if to >= len {
            return Err(StoreError::IndexOutOfRange { index: to, len });
        }
        let field = form.fields.remove(from);
        form.fields.insert(to, field);
        Ok(())
    }

    /// Names the form-in-edit, refreshes its timestamp, upserts it into the
    /// saved catalog, and writes the catalog through the persistence
    /// adapter. The in-memory upsert is never rolled back; a failed durable
    /// write is logged and reported as `SaveOutcome::MemoryOnly`.
    ///
    /// The caller is expected to enforce a non-empty name and at least one
    /// field; whatever is given is persisted as-is.
    pub fn save_form(&mut self, name: &str) -> Result<SaveOutcome, StoreError> {
        let form = self.current_form.as_mut().ok_or(StoreError::NoCurrentForm)?;
        form.name = name.to_string();
        form.created_at = Utc::now();

        // Snapshot by clone: later edits to the form-in-edit must not reach
        // into the saved catalog entry.
        let snapshot = form.clone();
        match self.saved_forms.iter().position(|saved| saved.id == snapshot.id) {
            Some(index) => self.saved_forms[index] = snapshot,
            None => self.saved_forms.push(snapshot),
        }

        match self.catalog.store(&self.saved_forms) {
            Ok(()) => Ok(SaveOutcome::Persisted),
            Err(err) => {
                log::error!("failed to persist form catalog: {err:#}");
                Ok(SaveOutcome::MemoryOnly)
            }
        }
    }

    /// Opens a saved form for editing or preview, replacing the form-in-edit
    /// with a copy of the catalog entry.
    pub fn load_form(&mut self, id: &str) -> Result<(), StoreError> {
        let form = self
            .saved_forms
            .iter()
            .find(|saved| saved.id == id)
            .ok_or_else(|| StoreError::UnknownForm { id: id.to_string() })?;
        self.current_form = Some(form.clone());
        Ok(())
    }

    /// Records a value entered in fill mode, re-validates that field, and
    /// recomputes derived fields. Derived fields are not validated here;
    /// they are never entered manually.
    pub fn update_form_data(&mut self, field_id: &str, value: Value) {
        self.form_data.insert(field_id.to_string(), value);
        self.revalidate_field(field_id);
        self.recompute_derived();
    }

    /// Sets or clears the error message for one field.
    pub fn set_validation_error(&mut self, field_id: &str, error: Option<String>) {
        match error {
            Some(message) => {
                self.validation_errors.insert(field_id.to_string(), message);
            }
            None => {
                self.validation_errors.shift_remove(field_id);
            }
        }
    }

    /// Discards all fill-mode state.
    pub fn clear_form_data(&mut self) {
        self.form_data.clear();
        self.validation_errors.clear();
    }

    /// Reseeds fill-mode values from each field's declared default and
    /// clears all errors. Called on entering preview mode; calling it twice
    /// without intervening edits yields the same data.
    pub fn initialize_form_data(&mut self) -> Result<(), StoreError> {
        let form = self.current_form.as_ref().ok_or(StoreError::NoCurrentForm)?;
        let mut seeded = FormData::new();
        for field in &form.fields {
            if let Some(default) = &field.default_value {
                seeded.insert(field.id.clone(), default.clone());
            }
        }
        self.form_data = seeded;
        self.validation_errors.clear();
        self.recompute_derived();
        Ok(())
    }

    /// Submit-time sweep: validates every non-derived field against the
    /// current values, fills the error map, and reports whether the form is
    /// submittable.
    pub fn validate_all(&mut self) -> bool {
        let Some(form) = self.current_form.clone() else {
            return false;
        };
        let mut ok = true;
        for field in &form.fields {
            if field.is_derived {
                continue;
            }
            let error = validation::evaluate_rules(&field.validations, self.form_data.get(&field.id));
            if error.is_some() {
                ok = false;
            }
            self.set_validation_error(&field.id, error);
        }
        ok
    }

    fn revalidate_field(&mut self, field_id: &str) {
        let Some(form) = self.current_form.as_ref() else {
            return;
        };
        let Some(field) = form.fields.iter().find(|field| field.id == field_id) else {
            return;
        };
        if field.is_derived {
            return;
        }
        let error = validation::evaluate_rules(&field.validations, self.form_data.get(field_id));
        self.set_validation_error(field_id, error);
    }

    /// Recomputes every derived field in display order over the
    /// progressively updated values, so a formula may reference an earlier
    /// derived field. A recomputed value is only written back when it
    /// differs from the stored one.
    fn recompute_derived(&mut self) {
        let Some(form) = self.current_form.as_ref() else {
            return;
        };
        let formulas: Vec<(String, String)> = form
            .fields
            .iter()
            .filter(|field| field.is_derived)
            .filter_map(|field| {
                field
                    .derived_formula
                    .clone()
                    .map(|formula| (field.id.clone(), formula))
            })
            .collect();

        for (field_id, formula) in formulas {
            let value = derived::evaluate_formula(&formula, &self.form_data)
                .map(number_value)
                .unwrap_or_else(|| Value::String(String::new()));
            if self.form_data.get(&field_id) != Some(&value) {
                self.form_data.insert(field_id, value);
            }
        }
    }
}

// Whole results stay integers so the stored value matches what the user
// sees ("11", not "11.0").
fn number_value(result: f64) -> Value {
    if result.fract() == 0.0 && result.abs() < i64::MAX as f64 {
        Value::from(result as i64)
    } else {
        serde_json::Number::from_f64(result)
            .map(Value::Number)
            .unwrap_or_else(|| Value::String(String::new()))
    }
}

fn check_options(field: &FormField) -> Result<(), StoreError> {
    if field.options_satisfied() {
        Ok(())
    } else {
        Err(StoreError::MissingOptions {
            label: field.label.clone(),
        })
    }
}
