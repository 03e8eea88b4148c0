//! Command execution
//!
//! Each command opens the store once, does its work and writes plain text
//! (or JSON with `--json`) to the given writer.

use crate::cli::{Cli, Commands};
use anyhow::{bail, Context, Result};
use chrono::{DateTime, Utc};
use flatmap_knowledge::{Flatmap, FlatmapKnowledgeStore, FlatmapMetadata, StoreConfig};
use std::io::Write;
use tracing::info;

/// Run a parsed command line against `config`
pub fn run<W: Write>(cli: &Cli, config: &StoreConfig, out: &mut W) -> Result<()> {
    let mut store = FlatmapKnowledgeStore::open(config)
        .with_context(|| format!("Failed to open {}", config.db_path().display()))?;

    match &cli.command {
        Commands::Init => {
            if !store.is_available() {
                bail!("Knowledge base {} is unavailable", store.db_path().display());
            }
            writeln!(out, "{} ({})", store.db_path().display(), store.release())?;
        }

        Commands::Record {
            id,
            models,
            created,
            source,
            entities,
        } => {
            let created = parse_created(created.as_deref())?;
            let flatmap = Flatmap::new(id.as_str(), models.as_str(), created)
                .with_entities(entities.iter().cloned());
            store.record(&flatmap, source.as_deref())?;
            info!("Recorded {} entities for {}", flatmap.entities.len(), flatmap.uuid);
            writeln!(out, "recorded {} ({} entities)", flatmap.uuid, flatmap.entities.len())?;
        }

        Commands::Entities { flatmap, json } => {
            let entities = store.entities(flatmap.as_deref())?;
            write_list(out, &entities, *json)?;
        }

        Commands::Flatmaps { json } => {
            let flatmaps = store.flatmaps()?;
            if *json {
                writeln!(out, "{}", serde_json::to_string_pretty(&flatmaps)?)?;
            } else {
                for metadata in &flatmaps {
                    writeln!(out, "{}", summary_line(metadata))?;
                }
            }
        }

        Commands::Show { id, json } => {
            let Some(metadata) = store.flatmap(id)? else {
                bail!("Unknown flatmap: {}", id);
            };
            if *json {
                writeln!(out, "{}", serde_json::to_string_pretty(&metadata)?)?;
            } else {
                writeln!(out, "id:               {}", metadata.id)?;
                writeln!(out, "models:           {}", metadata.models.as_deref().unwrap_or("-"))?;
                writeln!(
                    out,
                    "created:          {}",
                    metadata.created.map(|c| c.to_rfc3339()).unwrap_or_else(|| "-".to_string())
                )?;
                writeln!(
                    out,
                    "knowledge source: {}",
                    metadata.knowledge_source.as_deref().unwrap_or("-")
                )?;
                writeln!(out, "entities:         {}", store.entities(Some(id.as_str()))?.len())?;
            }
        }

        Commands::MapsFor { entity, json } => {
            let flatmaps = store.entity_flatmaps(entity)?;
            write_list(out, &flatmaps, *json)?;
        }
    }

    Ok(())
}

fn parse_created(created: Option<&str>) -> Result<DateTime<Utc>> {
    match created {
        Some(value) => Ok(DateTime::parse_from_rfc3339(value)
            .with_context(|| format!("Invalid --created timestamp: {}", value))?
            .with_timezone(&Utc)),
        None => Ok(Utc::now()),
    }
}

fn write_list<W: Write>(out: &mut W, items: &[String], json: bool) -> Result<()> {
    if json {
        writeln!(out, "{}", serde_json::to_string(items)?)?;
    } else {
        for item in items {
            writeln!(out, "{}", item)?;
        }
    }
    Ok(())
}

fn summary_line(metadata: &FlatmapMetadata) -> String {
    format!(
        "{}\t{}\t{}",
        metadata.id,
        metadata.models.as_deref().unwrap_or("-"),
        metadata.knowledge_source.as_deref().unwrap_or("-")
    )
}
