//! Flatmap tables
//!
//! Applied once, when the store creates a fresh knowledge base. Existing
//! knowledge bases are assumed to already carry these tables.

use rusqlite::Connection;

/// Flatmap metadata table
pub const FLATMAPS_TABLE: &str = "flatmaps";

/// Flatmap to entity association table
pub const FLATMAP_ENTITIES_TABLE: &str = "flatmap_entities";

/// Index names, in creation order
pub const FLATMAP_INDEXES: [&str; 4] = [
    "flatmaps_index",
    "flatmaps_models_index",
    "flatmap_entities_flatmap_index",
    "flatmap_entities_entity_index",
];

/// DDL script for the flatmap tables. `created` is declared as `timestamp` and
/// holds chrono `DateTime<Utc>` values.
pub const FLATMAP_SCHEMA: &str = r#"
    begin;
    create table flatmaps(id text primary key, models text, created timestamp, knowledge_source text);
    create unique index flatmaps_index on flatmaps(id);
    create index flatmaps_models_index on flatmaps(models);

    create table flatmap_entities (flatmap text, entity text);
    create index flatmap_entities_flatmap_index on flatmap_entities(flatmap);
    create index flatmap_entities_entity_index on flatmap_entities(entity);
    commit;
"#;

/// Run the schema script on a fresh knowledge base
pub(crate) fn apply(conn: &Connection) -> rusqlite::Result<()> {
    conn.execute_batch(FLATMAP_SCHEMA)
}
