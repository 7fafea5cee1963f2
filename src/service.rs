use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use anyhow::{Context, Result};

use crate::catalog::SkillCatalog;
use crate::optimizer::{OptimizationResult, Optimizer};
use crate::skill_queue::CharacterSkills;

#[derive(Debug, Clone, PartialEq)]
pub enum Outcome {
    Ready(OptimizationResult),
    EmptyQueue,
    /// A newer request for the same character was issued while this one ran.
    Stale,
}

type OptimizerMap = Mutex<HashMap<i64, Optimizer>>;
type GenerationMap = Mutex<HashMap<i64, u64>>;

/// Runs optimizations on the blocking pool so async callers stay responsive.
/// Each character gets its own `Optimizer`, so allocation caches never mix.
pub struct OptimizerService<C> {
    catalog: Arc<C>,
    optimizers: Arc<OptimizerMap>,
    generations: Arc<GenerationMap>,
}

impl<C> Clone for OptimizerService<C> {
    fn clone(&self) -> Self {
        Self {
            catalog: Arc::clone(&self.catalog),
            optimizers: Arc::clone(&self.optimizers),
            generations: Arc::clone(&self.generations),
        }
    }
}

impl<C> OptimizerService<C>
where
    C: SkillCatalog + Send + Sync + 'static,
{
    pub fn new(catalog: Arc<C>) -> Self {
        Self {
            catalog,
            optimizers: Arc::new(Mutex::new(HashMap::new())),
            generations: Arc::new(Mutex::new(HashMap::new())),
        }
    }

    pub async fn optimize(&self, character: CharacterSkills) -> Result<Outcome> {
        let character_id = character.character_id;
        let generation = self.next_generation(character_id)?;

        let catalog = Arc::clone(&self.catalog);
        let optimizers = Arc::clone(&self.optimizers);
        let result = tokio::task::spawn_blocking(move || -> Result<Option<OptimizationResult>> {
            let mut optimizer = optimizers
                .lock()
                .map_err(|e| anyhow::anyhow!("Failed to lock optimizers: {}", e))?
                .remove(&character_id)
                .unwrap_or_default();

            let result = optimizer.optimize(&character, &*catalog);

            optimizers
                .lock()
                .map_err(|e| anyhow::anyhow!("Failed to lock optimizers: {}", e))?
                .insert(character_id, optimizer);

            let context = format!("failed to optimize character {}", character_id);
            result.context(context)
        })
        .await
        .context("optimizer task failed")??;

        if !self.is_current(character_id, generation)? {
            tracing::debug!(character_id, generation, "discarding stale optimization");
            return Ok(Outcome::Stale);
        }

        Ok(match result {
            Some(result) => Outcome::Ready(result),
            None => Outcome::EmptyQueue,
        })
    }

    /// Drops the cached state kept for a character.
    pub fn forget(&self, character_id: i64) -> Result<()> {
        self.optimizers
            .lock()
            .map_err(|e| anyhow::anyhow!("Failed to lock optimizers: {}", e))?
            .remove(&character_id);
        Ok(())
    }

    fn next_generation(&self, character_id: i64) -> Result<u64> {
        let mut generations = self
            .generations
            .lock()
            .map_err(|e| anyhow::anyhow!("Failed to lock generations: {}", e))?;
        let generation = generations.entry(character_id).or_insert(0);
        *generation += 1;
        Ok(*generation)
    }

    fn is_current(&self, character_id: i64, generation: u64) -> Result<bool> {
        let generations = self
            .generations
            .lock()
            .map_err(|e| anyhow::anyhow!("Failed to lock generations: {}", e))?;
        Ok(generations.get(&character_id) == Some(&generation))
    }
}
