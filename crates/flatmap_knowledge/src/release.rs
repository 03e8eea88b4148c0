//! Knowledge source releases
//!
//! The knowledge base resolves entities against one of two SciCrunch/SCKAN
//! releases. Callers select it with a version string: `"production"` picks the
//! production release, anything else picks staging.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Release identifier of the production SCKAN knowledge source
pub const SCICRUNCH_PRODUCTION: &str = "sckan-scicrunch";

/// Release identifier of the staging SCKAN knowledge source
pub const SCICRUNCH_STAGING: &str = "sckan-scicrunch-staging";

/// Version selector that maps to [`KnowledgeRelease::Production`]
pub const PRODUCTION_VERSION: &str = "production";

/// Knowledge source release
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum KnowledgeRelease {
    Production,
    Staging,
}

impl KnowledgeRelease {
    /// Select a release from an SCKAN version string
    pub fn from_sckan_version(version: &str) -> Self {
        if version == PRODUCTION_VERSION {
            Self::Production
        } else {
            Self::Staging
        }
    }

    /// Release identifier passed to the knowledge base
    pub fn identifier(&self) -> &'static str {
        match self {
            Self::Production => SCICRUNCH_PRODUCTION,
            Self::Staging => SCICRUNCH_STAGING,
        }
    }
}

impl Default for KnowledgeRelease {
    fn default() -> Self {
        Self::Production
    }
}

impl fmt::Display for KnowledgeRelease {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.identifier())
    }
}
