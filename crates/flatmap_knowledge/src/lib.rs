//! Flatmap Knowledge - flatmap entity bookkeeping for a knowledge base
//!
//! Records, per flatmap, the anatomical entities it references together with
//! its models, creation time and knowledge source. Knowledge resolution itself
//! belongs to the knowledge base; this crate only adds the `flatmaps` and
//! `flatmap_entities` tables and the operations over them.

pub mod config;
pub mod error;
pub mod flatmap;
pub mod knowledge_base;
pub mod release;
pub mod schema;
pub mod store;

pub use config::{StoreConfig, KNOWLEDGE_BASE};
pub use error::{KnowledgeError, Result};
pub use flatmap::{Flatmap, FlatmapLike, FlatmapMetadata};
pub use knowledge_base::{KnowledgeBase, SqliteKnowledgeBase};
pub use release::{KnowledgeRelease, SCICRUNCH_PRODUCTION, SCICRUNCH_STAGING};
pub use store::FlatmapKnowledgeStore;

/// Crate version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
