//! Flatmap records

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Anything that can be recorded as a flatmap
pub trait FlatmapLike {
    /// Stable flatmap identifier
    fn uuid(&self) -> &str;

    /// Anatomical model set the flatmap represents
    fn models(&self) -> &str;

    fn created(&self) -> DateTime<Utc>;

    /// Entity identifiers referenced by the flatmap, duplicates allowed
    fn entities(&self) -> Vec<&str>;
}

/// A flatmap and the entities it references
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Flatmap {
    pub uuid: String,
    pub models: String,
    pub created: DateTime<Utc>,
    #[serde(default)]
    pub entities: Vec<String>,
}

impl Flatmap {
    pub fn new(uuid: impl Into<String>, models: impl Into<String>, created: DateTime<Utc>) -> Self {
        Self {
            uuid: uuid.into(),
            models: models.into(),
            created,
            entities: Vec::new(),
        }
    }

    pub fn with_entities<I, S>(mut self, entities: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.entities = entities.into_iter().map(Into::into).collect();
        self
    }
}

impl FlatmapLike for Flatmap {
    fn uuid(&self) -> &str {
        &self.uuid
    }

    fn models(&self) -> &str {
        &self.models
    }

    fn created(&self) -> DateTime<Utc> {
        self.created
    }

    fn entities(&self) -> Vec<&str> {
        self.entities.iter().map(String::as_str).collect()
    }
}

/// Stored flatmap metadata row
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FlatmapMetadata {
    pub id: String,
    pub models: Option<String>,
    pub created: Option<DateTime<Utc>>,
    pub knowledge_source: Option<String>,
}
