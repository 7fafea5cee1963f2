use std::path::PathBuf;

use anyhow::{bail, Result};
use chrono::{DateTime, Utc};
use clap::{Parser, ValueEnum};

use crate::attributes::Attributes;

pub const DEFAULT_LOG_FILTER: &str = "remapper=info,remapper_lib=info";

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    Text,
    Json,
}

/// Where the skill catalog comes from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CatalogSource {
    Json(PathBuf),
    Sde(PathBuf),
}

/// Find the neural remap that trains your skill queue fastest
#[derive(Parser, Debug, Clone)]
#[command(name = "remapper", version)]
pub struct Config {
    /// Skill catalog JSON ({"categories": [...], "skills": [...]})
    #[arg(long, env = "REMAPPER_CATALOG")]
    pub catalog: Option<PathBuf>,

    /// EVE static data SQLite database, used when no catalog JSON is given
    #[arg(long, env = "REMAPPER_SDE_DB")]
    pub sde_db: Option<PathBuf>,

    /// Character snapshot JSON with attributes, skills and skill queue
    #[arg(long)]
    pub character: PathBuf,

    #[arg(long, value_enum, default_value_t = OutputFormat::Text)]
    pub format: OutputFormat,

    /// Age the live queue to this time (RFC 3339) instead of now
    #[arg(long)]
    pub now: Option<DateTime<Utc>>,

    /// Use these remappable attributes instead of the snapshot's,
    /// as "int,mem,per,wil,cha"
    #[arg(long)]
    pub attributes: Option<Attributes>,
}

impl Config {
    pub fn catalog_source(&self) -> Result<CatalogSource> {
        match (&self.catalog, &self.sde_db) {
            (Some(path), _) => Ok(CatalogSource::Json(path.clone())),
            (None, Some(path)) => Ok(CatalogSource::Sde(path.clone())),
            (None, None) => bail!("no skill catalog given; pass --catalog or --sde-db"),
        }
    }

    pub fn now(&self) -> DateTime<Utc> {
        self.now.unwrap_or_else(Utc::now)
    }
}
