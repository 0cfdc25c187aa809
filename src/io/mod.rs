mod catalog;

pub use catalog::{CatalogStore, FileCatalog, MemoryCatalog};
