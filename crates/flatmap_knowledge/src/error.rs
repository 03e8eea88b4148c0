//! Error types for the flatmap knowledge store

use std::path::PathBuf;

/// Flatmap knowledge store errors
#[derive(Debug, thiserror::Error)]
pub enum KnowledgeError {
    /// The knowledge base has no open connection (missing file, closed, or
    /// opened without create against a fresh path)
    #[error("knowledge base is unavailable: {}", .0.display())]
    Unavailable(PathBuf),

    #[error("database error: {0}")]
    Database(#[from] rusqlite::Error),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("configuration error: {0}")]
    Config(#[from] toml::de::Error),
}

impl KnowledgeError {
    /// True when the error only signals a missing connection
    pub fn is_unavailable(&self) -> bool {
        matches!(self, Self::Unavailable(_))
    }
}

/// Result alias used throughout the crate
pub type Result<T> = std::result::Result<T, KnowledgeError>;
