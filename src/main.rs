use std::sync::Arc;

use anyhow::{Context, Result};
use clap::Parser;
use tracing_subscriber::EnvFilter;

use remapper_lib::catalog::{sde, StaticSkillData};
use remapper_lib::config::{CatalogSource, Config, OutputFormat, DEFAULT_LOG_FILTER};
use remapper_lib::report::Report;
use remapper_lib::service::{OptimizerService, Outcome};
use remapper_lib::skill_queue::CharacterSkills;

async fn load_catalog(source: &CatalogSource) -> Result<StaticSkillData> {
    match source {
        CatalogSource::Json(path) => StaticSkillData::load(path),
        CatalogSource::Sde(path) => {
            let pool = sde::connect(path).await?;
            let catalog = sde::load_catalog(&pool).await;
            pool.close().await;
            catalog
        }
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok();

    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(DEFAULT_LOG_FILTER));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();

    let config = Config::parse();

    let catalog = Arc::new(load_catalog(&config.catalog_source()?).await?);
    tracing::info!(skills = catalog.len(), "loaded catalog");

    let mut character = CharacterSkills::load(&config.character)?;
    if let Some(attributes) = config.attributes {
        character.attributes = attributes;
        character.implants = None;
    }

    let completed = character
        .advance_to(config.now(), &*catalog)
        .context("failed to bring the skill queue up to date")?;
    if completed > 0 {
        tracing::info!(completed, "removed finished skill queue entries");
    }

    let service = OptimizerService::new(Arc::clone(&catalog));
    match service.optimize(character.clone()).await? {
        Outcome::Ready(result) => match config.format {
            OutputFormat::Json => {
                println!("{}", serde_json::to_string_pretty(&result)?);
            }
            OutputFormat::Text => {
                print!(
                    "{}",
                    Report::new(&result, &*catalog)
                        .with_character_name(character.character_name.as_deref())
                );
            }
        },
        Outcome::EmptyQueue => {
            println!("The skill queue is empty. Queue skills in-game and refresh the snapshot.");
        }
        Outcome::Stale => {
            tracing::warn!("optimization was superseded by a newer request");
        }
    }

    Ok(())
}
