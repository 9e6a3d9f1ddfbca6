//! Model Catalog
//!
//! Defines the static model table and the lookup-with-default combinator.

use crate::error::{RelayError, Result};
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;

/// On-disk catalog layout (built-in `models.json` or an override file)
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CatalogFile {
    /// Key of the entry used when the caller's key is missing or unknown
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub default_model: Option<String>,

    /// Model entries; keys must be unique within a file
    #[serde(default)]
    pub models: Vec<ModelEntry>,
}

/// Configuration for a single upstream model
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ModelEntry {
    /// Short caller-facing identifier
    pub key: String,

    /// Provider-specific model identifier sent upstream
    #[serde(rename = "id")]
    pub upstream_id: String,

    /// Human readable name
    #[serde(rename = "name")]
    pub display_name: String,

    /// Pricing tier
    #[serde(rename = "cost", default)]
    pub cost_tier: CostTier,

    /// Rough capability bucket
    pub category: Category,

    /// Whether image attachments are forwarded as multimodal content
    #[serde(rename = "vision", default, skip_serializing_if = "is_false")]
    pub supports_vision: bool,

    /// System prompt prepended to every conversation
    #[serde(rename = "system")]
    pub system_prompt: String,
}

fn is_false(value: &bool) -> bool {
    !*value
}

/// Pricing tier of an upstream model
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CostTier {
    #[default]
    Free,
    Paid,
}

/// Capability bucket of an upstream model
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Category {
    Powerful,
    Medium,
    Lightweight,
}

/// Result of a catalog lookup
#[derive(Debug, Clone, Copy)]
pub struct Selection<'a> {
    /// The entry that will serve the request
    pub entry: &'a ModelEntry,

    /// True when the requested key was absent or unknown
    pub fallback: bool,
}

/// Immutable model table keyed by caller-facing key, in table order
#[derive(Debug, Clone)]
pub struct ModelCatalog {
    entries: IndexMap<String, ModelEntry>,
    default_entry: ModelEntry,
}

impl ModelCatalog {
    /// Build a catalog, rejecting duplicate keys and an unknown default
    pub fn new(entries: Vec<ModelEntry>, default_key: &str) -> Result<Self> {
        ensure_unique_keys(&entries)?;

        let entries: IndexMap<String, ModelEntry> = entries
            .into_iter()
            .map(|entry| (entry.key.clone(), entry))
            .collect();

        let default_entry = entries.get(default_key).cloned().ok_or_else(|| {
            RelayError::Config(format!(
                "Default model '{}' is not present in the model table",
                default_key
            ))
        })?;

        Ok(Self {
            entries,
            default_entry,
        })
    }

    /// Look up an entry by key
    pub fn get(&self, key: &str) -> Option<&ModelEntry> {
        self.entries.get(key)
    }

    /// Look up an entry, falling back to the default entry
    pub fn get_or_default(&self, key: Option<&str>) -> Selection<'_> {
        match key.and_then(|k| self.get(k)) {
            Some(entry) => Selection {
                entry,
                fallback: false,
            },
            None => Selection {
                entry: &self.default_entry,
                fallback: true,
            },
        }
    }

    /// The designated default entry
    pub fn default_entry(&self) -> &ModelEntry {
        &self.default_entry
    }

    /// All entries keyed by caller-facing key
    pub fn entries(&self) -> &IndexMap<String, ModelEntry> {
        &self.entries
    }

    /// Caller-facing keys in table order
    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.entries.keys().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// Fail on the first key that appears more than once
pub(crate) fn ensure_unique_keys(entries: &[ModelEntry]) -> Result<()> {
    let mut seen = HashSet::with_capacity(entries.len());
    for entry in entries {
        if !seen.insert(entry.key.as_str()) {
            return Err(RelayError::Config(format!(
                "Duplicate model key '{}'",
                entry.key
            )));
        }
    }
    Ok(())
}
