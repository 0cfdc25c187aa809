use std::fs;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};

use anyhow::{Context, Result};

use crate::domain::FormSchema;

/// Durable home of the saved-form catalog: one named slot holding the whole
/// catalog as a JSON array. Reading fails soft — a missing or corrupt slot
/// is an empty catalog, never an error.
pub trait CatalogStore {
    fn load(&self) -> Vec<FormSchema>;
    fn store(&mut self, forms: &[FormSchema]) -> Result<()>;
}

/// Catalog slot backed by a single JSON file.
#[derive(Debug, Clone)]
pub struct FileCatalog {
    path: PathBuf,
}

impl FileCatalog {
    pub fn new(path: impl AsRef<Path>) -> Self {
        Self {
            path: path.as_ref().to_path_buf(),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl CatalogStore for FileCatalog {
    fn load(&self) -> Vec<FormSchema> {
        let contents = match fs::read_to_string(&self.path) {
            Ok(contents) => contents,
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => {
                log::debug!(
                    "no form catalog at {}, starting empty",
                    self.path.display()
                );
                return Vec::new();
            }
            Err(err) => {
                log::warn!(
                    "could not read form catalog at {}: {err}",
                    self.path.display()
                );
                return Vec::new();
            }
        };
        parse_catalog(&contents)
    }

    fn store(&mut self, forms: &[FormSchema]) -> Result<()> {
        let payload = serialize_catalog(forms)?;
        if let Some(parent) = self.path.parent()
            && !parent.as_os_str().is_empty()
        {
            fs::create_dir_all(parent).with_context(|| {
                format!("failed to create catalog directory {}", parent.display())
            })?;
        }
        fs::write(&self.path, payload)
            .with_context(|| format!("failed to write form catalog to {}", self.path.display()))
    }
}

/// Catalog slot held in memory as one serialized string, the same shape the
/// original kept under a single localStorage key. Clones share the slot, so
/// one instance can back several stores in tests.
#[derive(Debug, Clone, Default)]
pub struct MemoryCatalog {
    slot: Arc<Mutex<Option<String>>>,
}

impl MemoryCatalog {
    pub fn new() -> Self {
        Self::default()
    }

    /// Raw slot contents, for inspecting the persisted shape in tests.
    pub fn raw(&self) -> Option<String> {
        self.lock_slot().clone()
    }

    fn lock_slot(&self) -> std::sync::MutexGuard<'_, Option<String>> {
        // Single-writer model; a poisoned lock can only mean a panicked
        // test, so take the data as-is.
        self.slot.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

impl CatalogStore for MemoryCatalog {
    fn load(&self) -> Vec<FormSchema> {
        match self.lock_slot().as_deref() {
            Some(contents) => parse_catalog(contents),
            None => Vec::new(),
        }
    }

    fn store(&mut self, forms: &[FormSchema]) -> Result<()> {
        let payload = serialize_catalog(forms)?;
        *self.lock_slot() = Some(payload);
        Ok(())
    }
}

fn serialize_catalog(forms: &[FormSchema]) -> Result<String> {
    serde_json::to_string_pretty(forms).context("failed to serialize form catalog")
}

fn parse_catalog(contents: &str) -> Vec<FormSchema> {
    match serde_json::from_str(contents) {
        Ok(forms) => forms,
        Err(err) => {
            log::warn!("form catalog is corrupt, starting empty: {err}");
            Vec::new()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{FieldType, FormField, FormSchema, RuleKind, ValidationRule};
    use std::time::{SystemTime, UNIX_EPOCH};

    fn temp_path(tag: &str) -> PathBuf {
        let nanos = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .unwrap()
            .as_nanos();
        std::env::temp_dir().join(format!("formforge-test-{tag}-{nanos}.json"))
    }

    fn sample_form(name: &str) -> FormSchema {
        let mut form = FormSchema::draft();
        form.name = name.to_string();
        form.fields.push(
            FormField::new(FieldType::Text, "Email")
                .with_required(true)
                .with_rule(ValidationRule::new(RuleKind::Required, "Required"))
                .with_rule(ValidationRule::new(RuleKind::Email, "Invalid email")),
        );
        form.fields
            .push(FormField::new(FieldType::Select, "Plan").with_options(vec![
                "free".to_string(),
                "pro".to_string(),
            ]));
        form
    }

    #[test]
    fn missing_file_loads_as_empty_catalog() {
        let catalog = FileCatalog::new(temp_path("missing"));
        assert!(catalog.load().is_empty());
    }

    #[test]
    fn corrupt_file_loads_as_empty_catalog() {
        let path = temp_path("corrupt");
        fs::write(&path, "{ not json []").unwrap();
        let catalog = FileCatalog::new(&path);
        assert!(catalog.load().is_empty());
        let _ = fs::remove_file(path);
    }

    #[test]
    fn file_round_trip_preserves_the_catalog() {
        let path = temp_path("roundtrip");
        let mut catalog = FileCatalog::new(&path);

        for forms in [
            Vec::new(),
            vec![sample_form("One")],
            vec![sample_form("One"), sample_form("Two"), sample_form("Three")],
        ] {
            catalog.store(&forms).unwrap();
            assert_eq!(catalog.load(), forms);
        }
        let _ = fs::remove_file(path);
    }

    #[test]
    fn round_trip_keeps_field_and_rule_order() {
        let path = temp_path("order");
        let mut catalog = FileCatalog::new(&path);
        let form = sample_form("Ordered");
        catalog.store(std::slice::from_ref(&form)).unwrap();

        let loaded = catalog.load();
        let rules: Vec<RuleKind> = loaded[0].fields[0]
            .validations
            .iter()
            .map(|rule| rule.kind)
            .collect();
        assert_eq!(rules, [RuleKind::Required, RuleKind::Email]);
        assert_eq!(loaded[0].fields[1].label, "Plan");
        let _ = fs::remove_file(path);
    }

    #[test]
    fn memory_catalog_round_trips_and_shares_its_slot() {
        let mut catalog = MemoryCatalog::new();
        let forms = vec![sample_form("Shared")];
        catalog.store(&forms).unwrap();

        let other = catalog.clone();
        assert_eq!(other.load(), forms);
        assert!(other.raw().unwrap().contains("\"Shared\""));
    }

    #[test]
    fn memory_catalog_fails_soft_on_corrupt_slot() {
        let catalog = MemoryCatalog::new();
        *catalog.lock_slot() = Some("not an array".to_string());
        assert!(catalog.load().is_empty());
    }

    #[test]
    fn catalog_serializes_dates_as_iso8601() {
        let mut catalog = MemoryCatalog::new();
        catalog.store(&[sample_form("Dated")]).unwrap();
        let raw = catalog.raw().unwrap();
        assert!(raw.contains("createdAt"));
        // RFC 3339 timestamp, e.g. "2026-08-27T12:00:00.123456Z".
        assert!(raw.contains("T") && raw.contains("Z"));
    }
}
