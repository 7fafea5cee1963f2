pub mod allocation;
pub mod duration;
pub mod relevance;
pub mod search;

use std::sync::Arc;

use serde::Serialize;

use crate::attributes::Attributes;
use crate::catalog::SkillCatalog;
use crate::error::Result;
use crate::skill_queue::{CharacterSkills, SkillQueueItem};
use crate::utils::ImplantGrade;

use allocation::{Allocation, AllocationCache, CacheStats, RateBuckets, SPAllocation};
use duration::{bounded_total, queue_durations};
use search::{optimize_segment_with, Incumbent, Segment};

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AttributeMapping {
    pub attributes: Attributes,
    /// Time to clear the queue at implant grades 0 through 5.
    pub duration_per_implant_grade: [f64; 6],
}

impl AttributeMapping {
    pub fn duration(&self, implant: ImplantGrade) -> f64 {
        self.duration_per_implant_grade[implant.grade() as usize]
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct OptimizationResult {
    pub current: AttributeMapping,
    pub best: AttributeMapping,
    pub best_allocation: Vec<SPAllocation>,
}

impl OptimizationResult {
    /// Time saved by remapping, assuming a full implant set.
    pub fn savings(&self) -> f64 {
        self.current.duration(ImplantGrade::MAX) - self.best.duration(ImplantGrade::MAX)
    }

    pub fn is_optimized(&self) -> bool {
        self.current.attributes == self.best.attributes
    }
}

/// Runs the whole optimization for one character at a time and keeps the
/// allocation cache warm between runs.
///
/// The search only evaluates candidates at the maximum implant grade and
/// assumes the winner stays best at lower grades; those grades are evaluated
/// for the chosen vector only.
#[derive(Debug, Default)]
pub struct Optimizer {
    cache: AllocationCache,
    last_queue: Option<Vec<SkillQueueItem>>,
}

impl Optimizer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn cache_stats(&self) -> CacheStats {
        self.cache.stats()
    }

    /// Returns `None` for an empty queue, which says nothing about which
    /// attributes matter.
    pub fn optimize<C: SkillCatalog + ?Sized>(
        &mut self,
        character: &CharacterSkills,
        catalog: &C,
    ) -> Result<Option<OptimizationResult>> {
        let items = character.queue_items(catalog)?;
        if items.is_empty() {
            tracing::debug!(
                character_id = character.character_id,
                "skill queue is empty"
            );
            return Ok(None);
        }

        // Cached allocations are only valid for the queue they were made for.
        if self.last_queue.as_deref() != Some(&items[..]) {
            self.cache.invalidate();
            self.last_queue = Some(items.clone());
        }

        let character_id = character.character_id;
        let unallocated_sp = character.unallocated_sp;
        let current_attributes = character.base_attributes();
        if !current_attributes.is_legal() {
            tracing::warn!(
                character_id,
                attributes = %current_attributes,
                "current attributes are not a legal remap"
            );
        }

        let (current_durations, current_allocation) = self.mapping(
            character_id,
            unallocated_sp,
            &items,
            &current_attributes,
        );

        let segment = Segment::new(
            items,
            current_attributes,
            current_durations[ImplantGrade::MAX.grade() as usize],
        );
        // An illegal current vector must lose to any legal candidate.
        let incumbent = Incumbent {
            attributes: segment.attributes,
            duration: if current_attributes.is_legal() {
                segment.duration
            } else {
                f64::INFINITY
            },
            payload: current_allocation,
        };

        let cache = &mut self.cache;
        let items = &segment.items;
        let best = optimize_segment_with(&segment, incumbent, |attributes, bound| {
            let allocation = cache.allocation(
                character_id,
                unallocated_sp,
                items,
                RateBuckets::partition(items, attributes, ImplantGrade::MAX),
            );
            let durations = queue_durations(items, attributes, ImplantGrade::MAX)
                .with_credits(&allocation.credits);
            bounded_total(durations, bound).map(|d| (d, allocation))
        })?;

        let (best_durations, _) = self.mapping(
            character_id,
            unallocated_sp,
            &segment.items,
            &best.attributes,
        );

        let result = OptimizationResult {
            current: AttributeMapping {
                attributes: current_attributes,
                duration_per_implant_grade: current_durations,
            },
            best: AttributeMapping {
                attributes: best.attributes,
                duration_per_implant_grade: best_durations,
            },
            best_allocation: best.payload.allocations.clone(),
        };

        let stats = self.cache.stats();
        tracing::debug!(
            hits = stats.hits,
            misses = stats.misses,
            hit_rate = stats.hit_rate(),
            entries = self.cache.len(),
            "allocation cache"
        );
        tracing::info!(
            character_id,
            best = %result.best.attributes,
            savings_seconds = result.savings(),
            "optimized attribute mapping"
        );

        Ok(Some(result))
    }

    /// Queue duration at every implant grade, plus the allocation used at the
    /// maximum grade.
    fn mapping(
        &mut self,
        character_id: i64,
        unallocated_sp: i64,
        items: &[SkillQueueItem],
        attributes: &Attributes,
    ) -> ([f64; 6], Arc<Allocation>) {
        let mut durations = [0.0; 6];
        let mut allocation = Arc::new(Allocation::default());

        for implant in ImplantGrade::ALL {
            allocation = self.cache.allocation(
                character_id,
                unallocated_sp,
                items,
                RateBuckets::partition(items, attributes, implant),
            );
            durations[implant.grade() as usize] = queue_durations(items, attributes, implant)
                .with_credits(&allocation.credits)
                .last()
                .unwrap_or(0.0);
        }

        (durations, allocation)
    }
}
