//! Catalog Loader
//!
//! Loads the model table from the built-in defaults and optional override files.

use crate::config::catalog::{ensure_unique_keys, CatalogFile, ModelCatalog, ModelEntry};
use crate::error::{RelayError, Result};
use indexmap::IndexMap;
use std::path::{Path, PathBuf};

const TRACING_TARGET: &str = "llmrelay::config::loader";

/// Catalog loader with support for multiple sources
pub struct CatalogLoader {
    entries: IndexMap<String, ModelEntry>,
    default_model: Option<String>,
}

impl CatalogLoader {
    /// Create a new loader and load from default locations
    pub fn new() -> Result<Self> {
        let mut loader = Self::empty();

        // Built-in defaults first
        loader.load_builtin_defaults()?;

        // Then the file system (can override built-ins)
        loader.load_from_default_paths()?;

        Ok(loader)
    }

    /// Create a loader with a specific override file
    pub fn from_path(path: impl AsRef<Path>) -> Result<Self> {
        let mut loader = Self::empty();

        loader.load_builtin_defaults()?;
        loader.load_from_file(path)?;

        Ok(loader)
    }

    /// Create a loader holding only the built-in table
    pub fn builtin() -> Result<Self> {
        let mut loader = Self::empty();
        loader.load_builtin_defaults()?;
        Ok(loader)
    }

    fn empty() -> Self {
        Self {
            entries: IndexMap::new(),
            default_model: None,
        }
    }

    /// Load built-in model defaults
    fn load_builtin_defaults(&mut self) -> Result<()> {
        let defaults = include_str!("../../models.json");
        let file: CatalogFile = serde_json::from_str(defaults).map_err(|e| {
            RelayError::Config(format!("Failed to parse built-in models.json: {}", e))
        })?;

        self.merge(file)
    }

    /// Load overrides from the default search paths
    fn load_from_default_paths(&mut self) -> Result<()> {
        for path in Self::get_config_paths() {
            if path.exists() {
                self.load_from_file(&path)?;
            }
        }

        Ok(())
    }

    /// Get list of override paths to check
    fn get_config_paths() -> Vec<PathBuf> {
        let mut paths = vec![PathBuf::from("models.json")];

        if let Some(config_dir) = dirs::config_dir() {
            paths.push(config_dir.join("llmrelay").join("models.json"));
        }

        paths
    }

    /// Load an override file
    fn load_from_file(&mut self, path: impl AsRef<Path>) -> Result<()> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path).map_err(|e| {
            RelayError::Config(format!("Failed to read {}: {}", path.display(), e))
        })?;

        let file: CatalogFile = serde_json::from_str(&content).map_err(|e| {
            RelayError::Config(format!("Failed to parse {}: {}", path.display(), e))
        })?;

        tracing::info!(
            target: TRACING_TARGET,
            path = %path.display(),
            models = file.models.len(),
            "Loaded model overrides"
        );

        self.merge(file)
    }

    /// Merge a file into the table (later files override earlier by key, in place)
    fn merge(&mut self, file: CatalogFile) -> Result<()> {
        ensure_unique_keys(&file.models)?;

        for entry in file.models {
            self.entries.insert(entry.key.clone(), entry);
        }

        if let Some(default_model) = file.default_model {
            self.default_model = Some(default_model);
        }

        Ok(())
    }

    /// Freeze the merged table into an immutable catalog
    pub fn into_catalog(self) -> Result<ModelCatalog> {
        let default_model = self
            .default_model
            .ok_or_else(|| RelayError::Config("No default model configured".to_string()))?;

        ModelCatalog::new(self.entries.into_values().collect(), &default_model)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    #[test]
    fn test_load_builtin_defaults() {
        let catalog = CatalogLoader::builtin().unwrap().into_catalog().unwrap();
        assert_eq!(catalog.len(), 31);
        assert_eq!(catalog.default_entry().key, "qwen3-coder");
        assert_eq!(catalog.default_entry().upstream_id, "qwen/qwen3-coder:free");

        let vision: Vec<&str> = catalog
            .entries()
            .values()
            .filter(|e| e.supports_vision)
            .map(|e| e.key.as_str())
            .collect();
        assert_eq!(vision, vec!["qwen2.5-vl-32b"]);

        let keys: Vec<&str> = catalog.keys().collect();
        assert_eq!(keys.first(), Some(&"qwen3-coder"));
        assert_eq!(keys.last(), Some(&"venice-uncensored"));
    }

    #[test]
    fn test_models_json_in_working_directory_overrides() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(
            dir.path().join("models.json"),
            r#"{
                "models": [{
                    "key": "kimi-k2",
                    "id": "house/kimi-override",
                    "name": "Kimi K2 (house)",
                    "category": "medium",
                    "system": "You are Kimi K2."
                }]
            }"#,
        )
        .unwrap();

        let original = std::env::current_dir().unwrap();
        std::env::set_current_dir(dir.path()).unwrap();
        let loaded = CatalogLoader::new();
        std::env::set_current_dir(original).unwrap();

        let catalog = loaded.unwrap().into_catalog().unwrap();
        assert_eq!(
            catalog.get("kimi-k2").unwrap().upstream_id,
            "house/kimi-override"
        );
        assert_eq!(catalog.len(), 31);
    }

    #[test]
    fn test_load_from_custom_file() {
        let mut file = NamedTempFile::new().unwrap();
        writeln!(
            file,
            r#"{{
                "default_model": "house-model",
                "models": [{{
                    "key": "house-model",
                    "id": "house/model-1",
                    "name": "House Model",
                    "cost": "paid",
                    "category": "powerful",
                    "system": "You are the house model."
                }}]
            }}"#
        )
        .unwrap();

        let catalog = CatalogLoader::from_path(file.path())
            .unwrap()
            .into_catalog()
            .unwrap();
        assert_eq!(catalog.len(), 32);
        assert_eq!(catalog.default_entry().upstream_id, "house/model-1");
    }

    #[test]
    fn test_override_replaces_by_key() {
        let mut file = NamedTempFile::new().unwrap();
        writeln!(
            file,
            r#"{{
                "models": [{{
                    "key": "kimi-k2",
                    "id": "moonshotai/kimi-k2",
                    "name": "Kimi K2 (paid)",
                    "cost": "paid",
                    "category": "powerful",
                    "system": "You are Kimi K2."
                }}]
            }}"#
        )
        .unwrap();

        let catalog = CatalogLoader::from_path(file.path())
            .unwrap()
            .into_catalog()
            .unwrap();
        let position = |c: &ModelCatalog| c.keys().position(|k| k == "kimi-k2");
        let builtin = CatalogLoader::builtin().unwrap().into_catalog().unwrap();

        assert_eq!(catalog.len(), 31);
        assert_eq!(
            catalog.get("kimi-k2").unwrap().upstream_id,
            "moonshotai/kimi-k2"
        );
        assert_eq!(position(&catalog), position(&builtin));
        assert_eq!(catalog.default_entry().key, "qwen3-coder");
    }

    #[test]
    fn test_duplicate_keys_in_file_rejected() {
        let mut file = NamedTempFile::new().unwrap();
        writeln!(
            file,
            r#"{{
                "models": [
                    {{"key": "x", "id": "a/x", "name": "X", "category": "medium", "system": "x"}},
                    {{"key": "x", "id": "a/y", "name": "Y", "category": "medium", "system": "y"}}
                ]
            }}"#
        )
        .unwrap();

        assert!(CatalogLoader::from_path(file.path()).is_err());
    }

    #[test]
    fn test_missing_file_is_config_error() {
        let result = CatalogLoader::from_path("/nonexistent/llmrelay/models.json");
        assert!(matches!(result, Err(RelayError::Config(_))));
    }
}
