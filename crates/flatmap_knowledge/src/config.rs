//! Store configuration
//!
//! Config file (TOML), every key optional:
//!
//! ```toml
//! store_directory = "/var/lib/flatmaps"
//! knowledge_base = "knowledgebase.db"
//! create = true
//! read_only = false
//! sckan_version = "production"
//! clean_connectivity = false
//!
//! [options]
//! log_build = true
//! ```
//!
//! Entries under `[options]` are not interpreted here; they are handed to the
//! knowledge base unchanged.

use crate::error::Result;
use crate::release::{KnowledgeRelease, PRODUCTION_VERSION};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};

/// Default knowledge base file name inside the store directory
pub const KNOWLEDGE_BASE: &str = "knowledgebase.db";

/// Construction options for a flatmap knowledge store
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct StoreConfig {
    /// Directory holding the knowledge base file
    pub store_directory: PathBuf,

    /// Knowledge base file name
    pub knowledge_base: String,

    /// Create the knowledge base (and flatmap tables) when missing
    pub create: bool,

    /// Open the knowledge base read-only
    pub read_only: bool,

    /// SCKAN version selector, see [`KnowledgeRelease::from_sckan_version`]
    pub sckan_version: String,

    /// Ask the knowledge base to clean connectivity paths
    pub clean_connectivity: bool,

    /// Pass-through options for the knowledge base
    pub options: BTreeMap<String, serde_json::Value>,
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            store_directory: PathBuf::from("."),
            knowledge_base: KNOWLEDGE_BASE.to_string(),
            create: true,
            read_only: false,
            sckan_version: PRODUCTION_VERSION.to_string(),
            clean_connectivity: false,
            options: BTreeMap::new(),
        }
    }
}

impl StoreConfig {
    /// Defaults rooted at a store directory
    pub fn new(store_directory: impl Into<PathBuf>) -> Self {
        Self {
            store_directory: store_directory.into(),
            ..Self::default()
        }
    }

    pub fn with_knowledge_base(mut self, knowledge_base: impl Into<String>) -> Self {
        self.knowledge_base = knowledge_base.into();
        self
    }

    pub fn with_create(mut self, create: bool) -> Self {
        self.create = create;
        self
    }

    pub fn with_read_only(mut self, read_only: bool) -> Self {
        self.read_only = read_only;
        self
    }

    pub fn with_sckan_version(mut self, sckan_version: impl Into<String>) -> Self {
        self.sckan_version = sckan_version.into();
        self
    }

    pub fn with_clean_connectivity(mut self, clean_connectivity: bool) -> Self {
        self.clean_connectivity = clean_connectivity;
        self
    }

    pub fn with_option(mut self, key: impl Into<String>, value: serde_json::Value) -> Self {
        self.options.insert(key.into(), value);
        self
    }

    /// Parse a TOML document
    pub fn from_toml_str(contents: &str) -> Result<Self> {
        Ok(toml::from_str(contents)?)
    }

    /// Load a TOML config file
    pub fn load(path: &Path) -> Result<Self> {
        let contents = fs::read_to_string(path)?;
        Self::from_toml_str(&contents)
    }

    /// Full path of the knowledge base file
    pub fn db_path(&self) -> PathBuf {
        self.store_directory.join(&self.knowledge_base)
    }

    /// Knowledge source release selected by `sckan_version`
    pub fn release(&self) -> KnowledgeRelease {
        KnowledgeRelease::from_sckan_version(&self.sckan_version)
    }
}
