//! Flatmap Knowledge Store
//!
//! Records which entities each flatmap references, next to the knowledge
//! base the entities were resolved against. Location:
//! `<store_directory>/knowledgebase.db` unless configured otherwise.
//!
//! The store owns a [`KnowledgeBase`] and only adds two tables to it. When the
//! knowledge base has no connection every operation returns
//! [`KnowledgeError::Unavailable`] rather than an empty result.

use crate::config::StoreConfig;
use crate::error::{KnowledgeError, Result};
use crate::flatmap::{FlatmapLike, FlatmapMetadata};
use crate::knowledge_base::{KnowledgeBase, SqliteKnowledgeBase};
use crate::release::KnowledgeRelease;
use crate::schema;
use rusqlite::{params, Connection, OptionalExtension};
use std::path::Path;
use tracing::{debug, info, warn};

/// Flatmap bookkeeping on top of a knowledge base
#[derive(Debug)]
pub struct FlatmapKnowledgeStore<K: KnowledgeBase = SqliteKnowledgeBase> {
    base: K,
}

impl FlatmapKnowledgeStore<SqliteKnowledgeBase> {
    /// Open (or create) the store described by `config`
    pub fn open(config: &StoreConfig) -> Result<Self> {
        let base = SqliteKnowledgeBase::from_config(config);
        Self::with_base(base, config.create, config.read_only)
    }

    /// Open (or create) `knowledgebase.db` in a directory with default options
    pub fn open_default(store_directory: impl AsRef<Path>) -> Result<Self> {
        Self::open(&StoreConfig::new(store_directory.as_ref()))
    }
}

impl<K: KnowledgeBase> FlatmapKnowledgeStore<K> {
    /// Open `base`, adding the flatmap tables when it is created here.
    ///
    /// A fresh knowledge base is always created read-write; when `read_only`
    /// was asked for it is re-opened read-only once the tables exist.
    pub fn with_base(mut base: K, create: bool, read_only: bool) -> Result<Self> {
        let new_db = !base.db_path().exists();

        if create && new_db {
            base.open(true, false)?;
            if let Some(conn) = base.connection() {
                if let Err(err) = schema::apply(conn) {
                    warn!(
                        "Failed to create flatmap tables in {}: {}",
                        base.db_path().display(),
                        err
                    );
                    base.close();
                    if let Err(io_err) = std::fs::remove_file(base.db_path()) {
                        warn!("Failed to remove {}: {}", base.db_path().display(), io_err);
                    }
                    return Err(err.into());
                }
                info!("Created flatmap knowledge base at {}", base.db_path().display());
                if read_only {
                    base.open(false, true)?;
                    debug!("Re-opened {} read-only", base.db_path().display());
                }
            }
        } else {
            base.open(create, read_only)?;
        }

        Ok(Self { base })
    }

    /// The underlying knowledge base
    pub fn base(&self) -> &K {
        &self.base
    }

    pub fn db_path(&self) -> &Path {
        self.base.db_path()
    }

    pub fn release(&self) -> KnowledgeRelease {
        self.base.release()
    }

    /// True while the knowledge base has a connection
    pub fn is_available(&self) -> bool {
        self.base.connection().is_some()
    }

    pub fn is_read_only(&self) -> bool {
        self.base.is_read_only()
    }

    /// Re-open the existing knowledge base in another mode
    pub fn reopen(&mut self, read_only: bool) -> Result<()> {
        self.base.open(false, read_only)
    }

    pub fn close(&mut self) {
        self.base.close();
    }

    fn conn(&self) -> Result<&Connection> {
        match self.base.connection() {
            Some(conn) => Ok(conn),
            None => Err(self.unavailable()),
        }
    }

    fn conn_mut(&mut self) -> Result<&mut Connection> {
        let path = self.base.db_path().to_path_buf();
        match self.base.connection_mut() {
            Some(conn) => Ok(conn),
            None => {
                debug!("No connection to {}", path.display());
                Err(KnowledgeError::Unavailable(path))
            }
        }
    }

    fn unavailable(&self) -> KnowledgeError {
        debug!("No connection to {}", self.base.db_path().display());
        KnowledgeError::Unavailable(self.base.db_path().to_path_buf())
    }

    /// Replace a flatmap's metadata and entity set.
    ///
    /// Entities are stored as given, so duplicates produce duplicate rows.
    pub fn record<F>(&mut self, flatmap: &F, knowledge_source: Option<&str>) -> Result<()>
    where
        F: FlatmapLike + ?Sized,
    {
        let uuid = flatmap.uuid();
        let conn = self.conn_mut()?;
        let tx = conn.transaction()?;

        tx.execute(
            "replace into flatmaps(id, models, created, knowledge_source) values (?1, ?2, ?3, ?4)",
            params![uuid, flatmap.models(), flatmap.created(), knowledge_source],
        )?;
        tx.execute("delete from flatmap_entities where flatmap = ?1", params![uuid])?;

        let mut inserted = 0usize;
        {
            let mut stmt = tx.prepare("insert into flatmap_entities(flatmap, entity) values (?1, ?2)")?;
            for entity in flatmap.entities() {
                stmt.execute(params![uuid, entity])?;
                inserted += 1;
            }
        }

        tx.commit()?;
        debug!("Recorded flatmap {} with {} entities", uuid, inserted);
        Ok(())
    }

    /// Distinct entities, sorted, for one flatmap id or across all flatmaps
    pub fn entities(&self, flatmap: Option<&str>) -> Result<Vec<String>> {
        let conn = self.conn()?;

        let mut select = vec!["select distinct entity from flatmap_entities"];
        if flatmap.is_some() {
            select.push("where flatmap = ?1");
        }
        select.push("order by entity");

        let mut stmt = conn.prepare(&select.join(" "))?;
        let entities = match flatmap {
            Some(id) => stmt
                .query_map(params![id], |row| row.get(0))?
                .collect::<rusqlite::Result<Vec<String>>>()?,
            None => stmt
                .query_map([], |row| row.get(0))?
                .collect::<rusqlite::Result<Vec<String>>>()?,
        };
        Ok(entities)
    }

    /// Distinct entities of one flatmap
    pub fn flatmap_entities<F>(&self, flatmap: &F) -> Result<Vec<String>>
    where
        F: FlatmapLike + ?Sized,
    {
        self.entities(Some(flatmap.uuid()))
    }

    /// Distinct entities across every recorded flatmap
    pub fn all_entities(&self) -> Result<Vec<String>> {
        self.entities(None)
    }

    /// Ids of the flatmaps referencing an entity
    pub fn entity_flatmaps(&self, entity: &str) -> Result<Vec<String>> {
        let conn = self.conn()?;
        let mut stmt = conn.prepare(
            "select distinct flatmap from flatmap_entities where entity = ?1 order by flatmap",
        )?;
        let rows = stmt.query_map(params![entity], |row| row.get(0))?;
        Ok(rows.collect::<rusqlite::Result<Vec<String>>>()?)
    }

    /// Stored metadata of one flatmap
    pub fn flatmap(&self, id: &str) -> Result<Option<FlatmapMetadata>> {
        let conn = self.conn()?;
        let metadata = conn
            .query_row(
                "select id, models, created, knowledge_source from flatmaps where id = ?1",
                params![id],
                metadata_from_row,
            )
            .optional()?;
        Ok(metadata)
    }

    /// Metadata of every recorded flatmap, ordered by id
    pub fn flatmaps(&self) -> Result<Vec<FlatmapMetadata>> {
        let conn = self.conn()?;
        let mut stmt =
            conn.prepare("select id, models, created, knowledge_source from flatmaps order by id")?;
        let rows = stmt.query_map([], metadata_from_row)?;
        Ok(rows.collect::<rusqlite::Result<Vec<_>>>()?)
    }
}

fn metadata_from_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<FlatmapMetadata> {
    Ok(FlatmapMetadata {
        id: row.get(0)?,
        models: row.get(1)?,
        created: row.get(2)?,
        knowledge_source: row.get(3)?,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::flatmap::Flatmap;
    use chrono::{TimeZone, Utc};
    use std::path::PathBuf;
    use tempfile::tempdir;

    fn test_store() -> (FlatmapKnowledgeStore, tempfile::TempDir) {
        let dir = tempdir().unwrap();
        let store = FlatmapKnowledgeStore::open_default(dir.path()).unwrap();
        (store, dir)
    }

    fn flatmap(uuid: &str, entities: &[&str]) -> Flatmap {
        let created = Utc.with_ymd_and_hms(2024, 5, 17, 9, 30, 0).unwrap();
        Flatmap::new(uuid, "NCBITaxon:10114", created).with_entities(entities.iter().copied())
    }

    /// Knowledge base that never has a connection
    #[derive(Debug)]
    struct DetachedBase {
        path: PathBuf,
        opens: usize,
    }

    impl KnowledgeBase for DetachedBase {
        fn db_path(&self) -> &Path {
            &self.path
        }

        fn release(&self) -> KnowledgeRelease {
            KnowledgeRelease::Staging
        }

        fn open(&mut self, _create: bool, _read_only: bool) -> Result<()> {
            self.opens += 1;
            Ok(())
        }

        fn connection(&self) -> Option<&Connection> {
            None
        }

        fn connection_mut(&mut self) -> Option<&mut Connection> {
            None
        }

        fn close(&mut self) {}

        fn is_read_only(&self) -> bool {
            false
        }
    }

    fn detached_store() -> FlatmapKnowledgeStore<DetachedBase> {
        let base = DetachedBase {
            path: PathBuf::from("/nonexistent/knowledgebase.db"),
            opens: 0,
        };
        FlatmapKnowledgeStore::with_base(base, true, true).unwrap()
    }

    #[test]
    fn test_record_and_query() {
        let (mut store, _dir) = test_store();
        let map1 = flatmap("map1", &["E2", "E1"]);

        store.record(&map1, None).unwrap();
        assert_eq!(store.flatmap_entities(&map1).unwrap(), vec!["E1", "E2"]);
    }

    #[test]
    fn test_record_replaces_previous_entities() {
        let (mut store, _dir) = test_store();

        store.record(&flatmap("map1", &["E1", "E2"]), None).unwrap();
        store.record(&flatmap("map1", &["E3"]), None).unwrap();

        assert_eq!(store.entities(Some("map1")).unwrap(), vec!["E3"]);
        assert_eq!(store.flatmaps().unwrap().len(), 1);
    }

    #[test]
    fn test_duplicates_are_stored_but_queried_distinct() {
        let (mut store, _dir) = test_store();
        store.record(&flatmap("map1", &["E1", "E1", "E2"]), None).unwrap();

        assert_eq!(store.entities(Some("map1")).unwrap(), vec!["E1", "E2"]);

        let rows: i64 = store
            .conn()
            .unwrap()
            .query_row(
                "select count(*) from flatmap_entities where flatmap = 'map1'",
                [],
                |row| row.get(0),
            )
            .unwrap();
        assert_eq!(rows, 3);
    }

    #[test]
    fn test_all_entities_is_sorted_union() {
        let (mut store, _dir) = test_store();
        store.record(&flatmap("map1", &["UBERON:2", "UBERON:1"]), None).unwrap();
        store.record(&flatmap("map2", &["UBERON:3", "UBERON:1"]), None).unwrap();

        assert_eq!(
            store.all_entities().unwrap(),
            vec!["UBERON:1", "UBERON:2", "UBERON:3"]
        );
        assert_eq!(store.entities(None).unwrap(), store.all_entities().unwrap());
    }

    #[test]
    fn test_unknown_flatmap_has_no_entities() {
        let (store, _dir) = test_store();
        assert!(store.entities(Some("missing")).unwrap().is_empty());
        assert!(store.flatmap("missing").unwrap().is_none());
    }

    #[test]
    fn test_empty_entity_set_clears_associations() {
        let (mut store, _dir) = test_store();
        store.record(&flatmap("map1", &["E1"]), None).unwrap();
        store.record(&flatmap("map1", &[]), None).unwrap();

        assert!(store.entities(Some("map1")).unwrap().is_empty());
        assert!(store.flatmap("map1").unwrap().is_some());
    }

    #[test]
    fn test_metadata_round_trip() {
        let (mut store, _dir) = test_store();
        let map1 = flatmap("map1", &["E1"]);
        store.record(&map1, Some("sckan-2024-03-04")).unwrap();

        let metadata = store.flatmap("map1").unwrap().unwrap();
        assert_eq!(metadata.id, "map1");
        assert_eq!(metadata.models.as_deref(), Some("NCBITaxon:10114"));
        assert_eq!(metadata.created, Some(map1.created));
        assert_eq!(metadata.knowledge_source.as_deref(), Some("sckan-2024-03-04"));
    }

    #[test]
    fn test_rerecord_replaces_whole_metadata_row() {
        let (mut store, _dir) = test_store();
        store.record(&flatmap("map1", &["E1"]), Some("production")).unwrap();
        store.record(&flatmap("map1", &["E1"]), None).unwrap();

        let metadata = store.flatmap("map1").unwrap().unwrap();
        assert_eq!(metadata.knowledge_source, None);
    }

    #[test]
    fn test_entity_flatmaps() {
        let (mut store, _dir) = test_store();
        store.record(&flatmap("map2", &["E1", "E2"]), None).unwrap();
        store.record(&flatmap("map1", &["E1"]), None).unwrap();

        assert_eq!(store.entity_flatmaps("E1").unwrap(), vec!["map1", "map2"]);
        assert_eq!(store.entity_flatmaps("E2").unwrap(), vec!["map2"]);
        assert!(store.entity_flatmaps("E9").unwrap().is_empty());
    }

    #[test]
    fn test_flatmaps_ordered_by_id() {
        let (mut store, _dir) = test_store();
        store.record(&flatmap("b", &[]), None).unwrap();
        store.record(&flatmap("a", &[]), None).unwrap();

        let ids: Vec<String> = store.flatmaps().unwrap().into_iter().map(|m| m.id).collect();
        assert_eq!(ids, vec!["a", "b"]);
    }

    #[test]
    fn test_empty_id_is_an_ordinary_flatmap() {
        let (mut store, _dir) = test_store();
        store.record(&flatmap("", &["E1"]), None).unwrap();

        assert_eq!(store.entities(Some("")).unwrap(), vec!["E1"]);
        assert_eq!(store.flatmap("").unwrap().unwrap().id, "");
        assert_eq!(store.entity_flatmaps("E1").unwrap(), vec![""]);
    }

    #[test]
    fn test_detached_base_reports_unavailable() {
        let mut store = detached_store();
        assert!(!store.is_available());
        assert_eq!(store.base().opens, 1);

        let err = store.record(&flatmap("map1", &["E1"]), None).unwrap_err();
        assert!(err.is_unavailable());
        assert!(store.entities(None).unwrap_err().is_unavailable());
        assert!(store.flatmap("map1").unwrap_err().is_unavailable());
        assert!(store.flatmaps().unwrap_err().is_unavailable());
        assert!(store.entity_flatmaps("E1").unwrap_err().is_unavailable());
    }

    #[test]
    fn test_closed_store_is_unavailable_until_reopened() {
        let (mut store, _dir) = test_store();
        store.record(&flatmap("map1", &["E1"]), None).unwrap();

        store.close();
        assert!(!store.is_available());
        assert!(store.all_entities().unwrap_err().is_unavailable());

        store.reopen(true).unwrap();
        assert!(store.is_read_only());
        assert_eq!(store.all_entities().unwrap(), vec!["E1"]);
    }

    #[test]
    fn test_release_comes_from_config() {
        let dir = tempdir().unwrap();
        let config = StoreConfig::new(dir.path()).with_sckan_version("staging");
        let store = FlatmapKnowledgeStore::open(&config).unwrap();
        assert_eq!(store.release(), KnowledgeRelease::Staging);
        assert_eq!(store.db_path(), config.db_path());
    }

    /// File-backed base whose fresh files already hold a conflicting `flatmaps` table
    #[derive(Debug)]
    struct ClashingBase(SqliteKnowledgeBase);

    impl KnowledgeBase for ClashingBase {
        fn db_path(&self) -> &Path {
            self.0.db_path()
        }

        fn release(&self) -> KnowledgeRelease {
            self.0.release()
        }

        fn open(&mut self, create: bool, read_only: bool) -> Result<()> {
            self.0.open(create, read_only)?;
            if let Some(conn) = self.0.connection() {
                if !read_only {
                    conn.execute_batch("create table if not exists flatmaps(name text);")?;
                }
            }
            Ok(())
        }

        fn connection(&self) -> Option<&Connection> {
            self.0.connection()
        }

        fn connection_mut(&mut self) -> Option<&mut Connection> {
            self.0.connection_mut()
        }

        fn close(&mut self) {
            self.0.close();
        }

        fn is_read_only(&self) -> bool {
            self.0.is_read_only()
        }
    }

    #[test]
    fn test_failed_schema_removes_fresh_file() {
        let dir = tempdir().unwrap();
        let config = StoreConfig::new(dir.path());
        let base = ClashingBase(SqliteKnowledgeBase::from_config(&config));

        let err = FlatmapKnowledgeStore::with_base(base, true, false).unwrap_err();
        assert!(matches!(err, KnowledgeError::Database(_)));
        assert!(!config.db_path().exists());

        let mut store = FlatmapKnowledgeStore::open(&config).unwrap();
        store.record(&flatmap("map1", &["E1"]), None).unwrap();
        assert_eq!(store.all_entities().unwrap(), vec!["E1"]);
    }
}
