//! CLI - Command-line argument parsing
//!
//! Defines the CLI structure using clap.
//! Keeps argument parsing separate from execution logic.

use clap::{Parser, Subcommand};
use std::path::PathBuf;

/// Flatmap knowledge store CLI
#[derive(Parser, Debug)]
#[command(name = "flatmapctl")]
#[command(about = "Inspect and update the flatmap entities of a knowledge base", long_about = None)]
#[command(version)]
#[command(disable_help_subcommand = true)]
pub struct Cli {
    /// Config file (overrides $FLATMAP_KNOWLEDGE_CONFIG and the user config)
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    /// Directory holding the knowledge base
    #[arg(long, global = true)]
    pub store_dir: Option<PathBuf>,

    /// Knowledge base file name
    #[arg(long, global = true)]
    pub knowledge_base: Option<String>,

    /// SCKAN version ("production" or anything else for staging)
    #[arg(long, global = true)]
    pub sckan_version: Option<String>,

    /// Open the knowledge base read-only
    #[arg(long, global = true, conflicts_with = "read_write")]
    pub read_only: bool,

    /// Open the knowledge base read-write (overrides `read_only` in the config file)
    #[arg(long, global = true)]
    pub read_write: bool,

    /// Do not create the knowledge base when it is missing
    #[arg(long, global = true, conflicts_with = "create")]
    pub no_create: bool,

    /// Create the knowledge base when it is missing (overrides `create = false`)
    #[arg(long, global = true)]
    pub create: bool,

    /// Debug logging on stderr
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Commands,
}

/// Available commands
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Create the knowledge base and flatmap tables if missing
    Init,

    /// Record a flatmap and the entities it references
    Record {
        /// Flatmap id
        #[arg(long)]
        id: String,

        /// Anatomical models the flatmap represents
        #[arg(long)]
        models: String,

        /// Creation time (RFC 3339), defaults to now
        #[arg(long)]
        created: Option<String>,

        /// Knowledge source label
        #[arg(long)]
        source: Option<String>,

        /// Entity identifiers
        entities: Vec<String>,
    },

    /// List distinct entities
    Entities {
        /// Only entities of this flatmap
        #[arg(long)]
        flatmap: Option<String>,

        /// Output JSON only
        #[arg(long)]
        json: bool,
    },

    /// List recorded flatmaps
    Flatmaps {
        /// Output JSON only
        #[arg(long)]
        json: bool,
    },

    /// Show one flatmap's metadata
    Show {
        /// Flatmap id
        id: String,

        /// Output JSON only
        #[arg(long)]
        json: bool,
    },

    /// List flatmaps referencing an entity
    MapsFor {
        /// Entity identifier
        entity: String,

        /// Output JSON only
        #[arg(long)]
        json: bool,
    },
}
