use std::collections::{BTreeMap, BTreeSet, HashMap};
use std::sync::Arc;

use serde::{Deserialize, Serialize};

use crate::attributes::{AttributePair, Attributes};
use crate::skill_queue::SkillQueueItem;
use crate::utils::{self, ImplantGrade};

/// Attribute pairs of a queue grouped by their SP rate under one attribute
/// vector, slowest bucket first. Pairs within a bucket are sorted so equal
/// partitions compare and hash equal.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct RateBuckets(Vec<Vec<AttributePair>>);

impl RateBuckets {
    pub fn partition(
        items: &[SkillQueueItem],
        attributes: &Attributes,
        implant: ImplantGrade,
    ) -> Self {
        // Rates step in halves of an SP/minute, so twice the rate is a whole number.
        let mut buckets: BTreeMap<i64, BTreeSet<AttributePair>> = BTreeMap::new();
        for item in items {
            let rate =
                utils::training_rate_per_minute(attributes, item.attribute) + implant.bonus();
            buckets
                .entry((rate * 2.0).round() as i64)
                .or_default()
                .insert(item.attribute);
        }
        Self(
            buckets
                .into_values()
                .map(|pairs| pairs.into_iter().collect())
                .collect(),
        )
    }

    pub fn buckets(&self) -> &[Vec<AttributePair>] {
        &self.0
    }
}

/// Unallocated SP applied to one queue entry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SPAllocation {
    pub skill_id: i64,
    pub level: i64,
    pub sp: i64,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Allocation {
    /// Allocation records in the order they were made.
    pub allocations: Vec<SPAllocation>,
    /// SP credited to each queue position. Empty when nothing was allocated.
    pub credits: Vec<i64>,
}

impl Allocation {
    pub fn allocated_sp(&self) -> i64 {
        self.allocations.iter().map(|a| a.sp).sum()
    }
}

/// Spends the pool on the slowest-training skills first, since SP put there
/// saves the most time.
pub fn allocate(
    unallocated_sp: i64,
    items: &[SkillQueueItem],
    buckets: &RateBuckets,
) -> Allocation {
    if unallocated_sp <= 0 {
        return Allocation::default();
    }

    let mut remaining = unallocated_sp;
    let mut allocations = Vec::new();
    let mut credits = vec![0i64; items.len()];

    'buckets: for bucket in buckets.buckets() {
        for (idx, item) in items.iter().enumerate() {
            if !bucket.contains(&item.attribute) {
                continue;
            }
            let sp = remaining.min(item.sp_to_finish);
            if sp <= 0 {
                continue;
            }
            allocations.push(SPAllocation {
                skill_id: item.skill_id,
                level: item.target_level,
                sp,
            });
            credits[idx] += sp;
            remaining -= sp;
            if remaining == 0 {
                break 'buckets;
            }
        }
    }

    Allocation {
        allocations,
        credits,
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CacheStats {
    pub hits: u64,
    pub misses: u64,
}

impl CacheStats {
    pub fn hit_rate(&self) -> f64 {
        let total = self.hits + self.misses;
        if total == 0 {
            0.0
        } else {
            self.hits as f64 / total as f64
        }
    }
}

/// Memoized allocations for one character. Candidate vectors that bucket the
/// queue the same way share one entry; changing the character or the pool
/// size drops every entry.
#[derive(Debug, Default)]
pub struct AllocationCache {
    key: Option<(i64, i64)>,
    entries: HashMap<RateBuckets, Arc<Allocation>>,
    stats: CacheStats,
}

impl AllocationCache {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn allocation(
        &mut self,
        character_id: i64,
        unallocated_sp: i64,
        items: &[SkillQueueItem],
        buckets: RateBuckets,
    ) -> Arc<Allocation> {
        if unallocated_sp == 0 {
            return Arc::new(Allocation::default());
        }

        if self.key != Some((character_id, unallocated_sp)) {
            self.invalidate();
            self.key = Some((character_id, unallocated_sp));
        }

        if let Some(cached) = self.entries.get(&buckets) {
            self.stats.hits += 1;
            return Arc::clone(cached);
        }

        self.stats.misses += 1;
        let allocation = Arc::new(allocate(unallocated_sp, items, &buckets));
        self.entries.insert(buckets, Arc::clone(&allocation));
        allocation
    }

    pub fn invalidate(&mut self) {
        self.entries.clear();
        self.key = None;
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn stats(&self) -> CacheStats {
        self.stats
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testdata::fixtures;

    fn mixed_items() -> Vec<SkillQueueItem> {
        // Advanced Spaceship Command, Science, Leadership
        vec![
            fixtures::create_item(20342, 5, 10200),
            fixtures::create_item(3402, 5, 10200),
            fixtures::create_item(3348, 5, 1),
        ]
    }

    #[test]
    fn test_partition_orders_slowest_first() {
        let items = mixed_items();
        let attributes = fixtures::create_attributes(17, 17, 27, 21, 17);

        let buckets = RateBuckets::partition(&items, &attributes, ImplantGrade::NONE);
        let names: Vec<Vec<String>> = buckets
            .buckets()
            .iter()
            .map(|b| b.iter().map(|p| p.to_string()).collect())
            .collect();
        assert_eq!(
            names,
            vec![
                vec!["intelligence/memory".to_string()],
                vec!["charisma/willpower".to_string()],
                vec!["perception/willpower".to_string()],
            ]
        );
    }

    #[test]
    fn test_partition_groups_equal_rates() {
        let items = mixed_items();
        let attributes = fixtures::create_attributes(27, 21, 17, 17, 17);

        let buckets = RateBuckets::partition(&items, &attributes, ImplantGrade::MAX);
        assert_eq!(buckets.buckets().len(), 2);
        assert_eq!(buckets.buckets()[0].len(), 2);
        assert_eq!(
            buckets,
            RateBuckets::partition(&items, &attributes, ImplantGrade::NONE)
        );
    }

    #[test]
    fn test_allocate_slowest_first_in_queue_order() {
        let items = mixed_items();
        let attributes = fixtures::create_attributes(27, 21, 17, 17, 17);
        let buckets = RateBuckets::partition(&items, &attributes, ImplantGrade::NONE);

        let allocation = allocate(15000, &items, &buckets);
        assert_eq!(
            allocation.allocations,
            vec![
                SPAllocation {
                    skill_id: 20342,
                    level: 5,
                    sp: 10200,
                },
                SPAllocation {
                    skill_id: 3348,
                    level: 5,
                    sp: 1,
                },
                SPAllocation {
                    skill_id: 3402,
                    level: 5,
                    sp: 4799,
                },
            ]
        );
        assert_eq!(allocation.credits, vec![10200, 4799, 1]);
        assert_eq!(allocation.allocated_sp(), 15000);
    }

    #[test]
    fn test_allocate_leaves_surplus_unspent() {
        let items = mixed_items();
        let attributes = fixtures::create_attributes(27, 21, 17, 17, 17);
        let buckets = RateBuckets::partition(&items, &attributes, ImplantGrade::NONE);

        let allocation = allocate(1_000_000, &items, &buckets);
        assert_eq!(allocation.allocated_sp(), 20401);
        assert_eq!(allocation.credits, vec![10200, 10200, 1]);
    }

    #[test]
    fn test_allocate_nothing_without_pool() {
        let items = mixed_items();
        let attributes = fixtures::create_attributes(27, 21, 17, 17, 17);
        let buckets = RateBuckets::partition(&items, &attributes, ImplantGrade::NONE);

        assert_eq!(allocate(0, &items, &buckets), Allocation::default());
    }

    #[test]
    fn test_cache_shares_equal_partitions() {
        let items = mixed_items();
        let partition = |int, mem, per, wil, cha| {
            let attributes = fixtures::create_attributes(int, mem, per, wil, cha);
            RateBuckets::partition(&items, &attributes, ImplantGrade::MAX)
        };
        let mut cache = AllocationCache::new();

        let int_mem = partition(27, 21, 17, 17, 17);
        let first = cache.allocation(1, 5000, &items, int_mem);
        // int/mem drops from 37.5 to 37.0 but stays the fastest bucket
        let int_mem = partition(26, 22, 17, 17, 17);
        let second = cache.allocation(1, 5000, &items, int_mem);

        assert!(Arc::ptr_eq(&first, &second));
        assert_eq!(cache.stats(), CacheStats { hits: 1, misses: 1 });
        assert_eq!(cache.len(), 1);

        let per_wil = partition(17, 17, 27, 21, 17);
        cache.allocation(1, 5000, &items, per_wil);
        assert_eq!(cache.len(), 2);
    }

    #[test]
    fn test_cache_invalidates_on_key_change() {
        let items = mixed_items();
        let attributes = fixtures::create_attributes(27, 21, 17, 17, 17);
        let buckets = RateBuckets::partition(&items, &attributes, ImplantGrade::MAX);
        let mut cache = AllocationCache::new();

        cache.allocation(1, 5000, &items, buckets.clone());
        assert_eq!(cache.len(), 1);

        let other_pool = cache.allocation(1, 6000, &items, buckets.clone());
        assert_eq!(cache.len(), 1);
        assert_eq!(other_pool.allocated_sp(), 6000);

        cache.allocation(2, 6000, &items, buckets.clone());
        assert_eq!(cache.stats().misses, 3);

        let empty = cache.allocation(2, 0, &items, buckets);
        assert!(empty.allocations.is_empty());
        assert_eq!(cache.stats().misses, 3);
    }
}
