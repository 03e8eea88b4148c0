//! Knowledge base connection capability
//!
//! The flatmap store does not own knowledge resolution. It only needs a
//! connection to the knowledge base file, which something else opens, re-opens
//! in a different mode and closes. [`KnowledgeBase`] is that seam;
//! [`SqliteKnowledgeBase`] is the plain file-backed implementation.

use crate::config::StoreConfig;
use crate::error::Result;
use crate::release::KnowledgeRelease;
use rusqlite::{Connection, OpenFlags};
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::time::Duration;
use tracing::{debug, warn};

/// Connection-providing knowledge base
pub trait KnowledgeBase {
    /// Path of the knowledge base file
    fn db_path(&self) -> &Path;

    /// Knowledge source release the base resolves against
    fn release(&self) -> KnowledgeRelease;

    /// (Re-)open the knowledge base. Any current connection is closed first.
    /// Leaves no connection when the file is missing and cannot be created.
    fn open(&mut self, create: bool, read_only: bool) -> Result<()>;

    /// Current connection, `None` when unavailable
    fn connection(&self) -> Option<&Connection>;

    fn connection_mut(&mut self) -> Option<&mut Connection>;

    /// Drop the current connection
    fn close(&mut self);

    /// True if there is a connection and it was opened read-only
    fn is_read_only(&self) -> bool;
}

/// File-backed knowledge base
#[derive(Debug)]
pub struct SqliteKnowledgeBase {
    db_path: PathBuf,
    release: KnowledgeRelease,
    sckan_version: String,
    clean_connectivity: bool,
    options: BTreeMap<String, serde_json::Value>,
    read_only: bool,
    conn: Option<Connection>,
}

impl SqliteKnowledgeBase {
    /// Build an unopened knowledge base from store configuration
    pub fn from_config(config: &StoreConfig) -> Self {
        Self {
            db_path: config.db_path(),
            release: config.release(),
            sckan_version: config.sckan_version.clone(),
            clean_connectivity: config.clean_connectivity,
            options: config.options.clone(),
            read_only: config.read_only,
            conn: None,
        }
    }

    pub fn sckan_version(&self) -> &str {
        &self.sckan_version
    }

    pub fn clean_connectivity(&self) -> bool {
        self.clean_connectivity
    }

    /// Pass-through options as received
    pub fn options(&self) -> &BTreeMap<String, serde_json::Value> {
        &self.options
    }

    fn open_flags(create: bool, read_only: bool) -> OpenFlags {
        let mut flags = OpenFlags::SQLITE_OPEN_NO_MUTEX;
        if read_only {
            flags |= OpenFlags::SQLITE_OPEN_READ_ONLY;
        } else {
            flags |= OpenFlags::SQLITE_OPEN_READ_WRITE;
            if create {
                flags |= OpenFlags::SQLITE_OPEN_CREATE;
            }
        }
        flags
    }
}

impl KnowledgeBase for SqliteKnowledgeBase {
    fn db_path(&self) -> &Path {
        &self.db_path
    }

    fn release(&self) -> KnowledgeRelease {
        self.release
    }

    fn open(&mut self, create: bool, read_only: bool) -> Result<()> {
        self.close();
        self.read_only = read_only;

        if !self.db_path.exists() {
            if !create || read_only {
                warn!(
                    "Knowledge base {} does not exist and will not be created",
                    self.db_path.display()
                );
                return Ok(());
            }
            if let Some(parent) = self.db_path.parent() {
                std::fs::create_dir_all(parent)?;
            }
        }

        debug!(
            path = %self.db_path.display(),
            release = %self.release,
            clean_connectivity = self.clean_connectivity,
            options = self.options.len(),
            read_only,
            "Opening knowledge base"
        );

        let conn = Connection::open_with_flags(&self.db_path, Self::open_flags(create, read_only))?;
        conn.busy_timeout(Duration::from_secs(5))?;
        self.conn = Some(conn);
        Ok(())
    }

    fn connection(&self) -> Option<&Connection> {
        self.conn.as_ref()
    }

    fn connection_mut(&mut self) -> Option<&mut Connection> {
        self.conn.as_mut()
    }

    fn close(&mut self) {
        if let Some(conn) = self.conn.take() {
            if let Err((_, err)) = conn.close() {
                warn!("Failed to close knowledge base {}: {}", self.db_path.display(), err);
            }
        }
    }

    fn is_read_only(&self) -> bool {
        self.read_only && self.conn.is_some()
    }
}

impl Drop for SqliteKnowledgeBase {
    fn drop(&mut self) {
        self.close();
    }
}
