//! Weighted pool — the sampling engine.
//!
//! Entries live in one vector of `(item, weight, cumulative)` records in
//! insertion order. `cumulative` is the inclusive prefix sum of weights, so it
//! is non-decreasing and its last value is the pool's total weight. Sampling
//! scales a uniform draw by the total and binary-searches that prefix sum.
//!
//! Mutation costs:
//! - `add_item`: amortized O(1), storage grows per [`ResizePolicy`]
//! - `remove` / `set_weight`: O(n), the cumulative suffix is rebuilt
//! - sampling: O(log n)
//!
//! Lookups by item are linear scans on `PartialEq`; duplicates are allowed and
//! every by-item operation acts on the first match.
//!
//! The pool holds no locks. Callers sharing it across threads must serialize
//! access themselves.

use tracing::{debug, trace};

use crate::error::PoolError;
use crate::policy::ResizePolicy;
use crate::rng::{RandomSource, ThreadRandom};
use crate::weight::Weight;

#[derive(Debug, Clone)]
struct Entry<T, W> {
    item: T,
    weight: W,
    cumulative: W,
}

/// A mutable pool of items drawn with probability `weight / total_weight`.
#[derive(Debug, Clone)]
pub struct WeightedPool<T, W: Weight, R: RandomSource = ThreadRandom> {
    entries: Vec<Entry<T, W>>,
    /// Logical capacity under `policy`; the vector is reserved to match.
    capacity: usize,
    total_weight: W,
    policy: ResizePolicy,
    source: R,
}

impl<T, W: Weight> WeightedPool<T, W, ThreadRandom> {
    /// Empty pool drawing from the thread-local generator.
    pub fn new() -> Self {
        Self::with_source(ThreadRandom::new())
    }
}

impl<T, W: Weight> Default for WeightedPool<T, W, ThreadRandom> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T, W: Weight, R: RandomSource> WeightedPool<T, W, R> {
    pub fn with_source(source: R) -> Self {
        Self {
            entries: Vec::new(),
            capacity: 0,
            total_weight: W::ZERO,
            policy: ResizePolicy::default(),
            source,
        }
    }

    /// Empty pool with a custom resize policy.
    pub fn with_policy(source: R, policy: ResizePolicy) -> Result<Self, PoolError> {
        policy.validate()?;
        let mut pool = Self::with_source(source);
        pool.policy = policy;
        Ok(pool)
    }

    /// Pool pre-seeded with `entries`, each inserted through [`add_item`].
    ///
    /// [`add_item`]: WeightedPool::add_item
    pub fn from_entries<I>(source: R, entries: I) -> Result<Self, PoolError>
    where
        I: IntoIterator<Item = (T, W)>,
    {
        let mut pool = Self::with_source(source);
        for (item, weight) in entries {
            pool.add_item(item, weight)?;
        }
        Ok(pool)
    }

    // ── Accessors ──────────────────────────────────────────────────────

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    pub fn total_weight(&self) -> W {
        self.total_weight
    }

    pub fn policy(&self) -> &ResizePolicy {
        &self.policy
    }

    /// Items and their own weights, in insertion order.
    pub fn iter(&self) -> impl Iterator<Item = (&T, W)> + '_ {
        self.entries.iter().map(|e| (&e.item, e.weight))
    }

    /// The prefix-sum index used for sampling, in insertion order.
    pub fn cumulative_weights(&self) -> impl Iterator<Item = W> + '_ {
        self.entries.iter().map(|e| e.cumulative)
    }

    /// Every item with its current selection probability.
    pub fn proc_chances(&self) -> Vec<(&T, f64)> {
        self.entries
            .iter()
            .map(|e| (&e.item, self.chance_of(e.weight)))
            .collect()
    }

    // ── Mutation ───────────────────────────────────────────────────────

    /// Append `item` with `weight`.
    ///
    /// Fails without touching the pool if the weight is negative (or NaN /
    /// infinite for floats) or if the running total would overflow.
    pub fn add_item(&mut self, item: T, weight: W) -> Result<(), PoolError> {
        if !weight.is_valid() {
            return Err(PoolError::InvalidArgument(format!(
                "invalid weight {weight}: must be finite and >= 0"
            )));
        }
        let cumulative = self.total_weight.checked_add(weight).ok_or_else(|| {
            PoolError::InvalidArgument(format!(
                "weight {weight} overflows total weight {}",
                self.total_weight
            ))
        })?;

        self.ensure_capacity();
        self.entries.push(Entry {
            item,
            weight,
            cumulative,
        });
        self.total_weight = cumulative;
        trace!(%weight, total = %self.total_weight, len = self.entries.len(), "item added");
        Ok(())
    }

    /// Drop every entry. Capacity is kept.
    pub fn clear(&mut self) {
        self.entries.clear();
        self.total_weight = W::ZERO;
    }

    fn ensure_capacity(&mut self) {
        let len = self.entries.len();
        let next = self.policy.next_capacity(len, self.capacity);
        if next == self.capacity {
            return;
        }
        debug!(from = self.capacity, to = next, len, "growing pool storage");
        let mut grown = Vec::with_capacity(next);
        grown.append(&mut self.entries);
        self.entries = grown;
        self.capacity = next;
    }

    /// Rebuild `cumulative` for every entry from `start` onward, then the total.
    ///
    /// Callers must have checked that the new total fits in `W`.
    fn rebuild_suffix(&mut self, start: usize) {
        let mut running = match start.checked_sub(1) {
            Some(prev) => self.entries[prev].cumulative,
            None => W::ZERO,
        };
        for entry in &mut self.entries[start..] {
            running = running.add(entry.weight);
            entry.cumulative = running;
        }
        self.total_weight = self.entries.last().map_or(W::ZERO, |e| e.cumulative);
    }

    // ── Sampling ───────────────────────────────────────────────────────

    /// Draw one item using the pool's own randomness source.
    pub fn get_random_item(&mut self) -> Result<&T, PoolError> {
        self.check_sampleable()?;
        let unit = self.source.next_unit();
        self.select(unit)
    }

    /// Draw one item using a caller-supplied source.
    pub fn sample_with<S: RandomSource + ?Sized>(&self, source: &mut S) -> Result<&T, PoolError> {
        self.check_sampleable()?;
        self.select(source.next_unit())
    }

    /// Map a uniform draw `unit` in `[0, 1)` onto an item.
    ///
    /// The target `unit * total_weight` is computed in `f64`. Integer weights
    /// take the ceiling of the target before conversion: truncating would
    /// credit every fractional target to the bucket below it. The result is the
    /// first entry whose cumulative weight is `>=` the target, skipping any
    /// leading zero-weight entries.
    pub fn select(&self, unit: f64) -> Result<&T, PoolError> {
        self.check_sampleable()?;
        if !(0.0..1.0).contains(&unit) {
            return Err(PoolError::InvalidArgument(format!(
                "draw {unit} is outside [0, 1)"
            )));
        }

        let mut scaled = unit * self.total_weight.to_f64();
        if W::DISCRETE {
            scaled = scaled.ceil();
        }
        let mut target = W::from_f64(scaled);
        // f64 rounding on very large totals can overshoot.
        if target > self.total_weight {
            target = self.total_weight;
        }

        let index = self
            .entries
            .partition_point(|e| e.cumulative < target || e.cumulative <= W::ZERO);
        debug_assert!(index < self.entries.len(), "target within total weight");
        Ok(&self.entries[index].item)
    }

    fn check_sampleable(&self) -> Result<(), PoolError> {
        if self.entries.is_empty() {
            return Err(PoolError::EmptyPool);
        }
        if self.total_weight <= W::ZERO {
            return Err(PoolError::ZeroTotalWeight);
        }
        Ok(())
    }

    fn chance_of(&self, weight: W) -> f64 {
        let total = self.total_weight.to_f64();
        if total > 0.0 {
            weight.to_f64() / total
        } else {
            0.0
        }
    }
}

impl<T: PartialEq, W: Weight, R: RandomSource> WeightedPool<T, W, R> {
    fn position(&self, item: &T) -> Option<usize> {
        self.entries.iter().position(|e| e.item == *item)
    }

    pub fn contains(&self, item: &T) -> bool {
        self.position(item).is_some()
    }

    /// Remove the first entry equal to `item`. Returns `false` if none matched.
    pub fn remove(&mut self, item: &T) -> bool {
        let Some(index) = self.position(item) else {
            return false;
        };
        let removed = self.entries.remove(index);
        self.rebuild_suffix(index);
        trace!(weight = %removed.weight, index, total = %self.total_weight, "item removed");
        true
    }

    /// Weight of the first entry equal to `item`, or zero if absent.
    pub fn get_weight(&self, item: &T) -> W {
        self.position(item)
            .map_or(W::ZERO, |index| self.entries[index].weight)
    }

    /// `weight / total_weight` for the first entry equal to `item`, or `0.0`
    /// if absent.
    pub fn get_proc_chance(&self, item: &T) -> f64 {
        self.position(item)
            .map_or(0.0, |index| self.chance_of(self.entries[index].weight))
    }

    /// Replace the weight of the first entry equal to `item`.
    ///
    /// Returns `Ok(false)` if no entry matched. Validation matches
    /// [`add_item`](WeightedPool::add_item); on error the pool is unchanged.
    pub fn set_weight(&mut self, item: &T, weight: W) -> Result<bool, PoolError> {
        if !weight.is_valid() {
            return Err(PoolError::InvalidArgument(format!(
                "invalid weight {weight}: must be finite and >= 0"
            )));
        }
        let Some(index) = self.position(item) else {
            return Ok(false);
        };
        let old = self.entries[index].weight;
        self.total_weight
            .sub(old)
            .checked_add(weight)
            .ok_or_else(|| {
                PoolError::InvalidArgument(format!("weight {weight} overflows total weight"))
            })?;

        self.entries[index].weight = weight;
        self.rebuild_suffix(index);
        trace!(from = %old, to = %weight, index, "weight updated");
        Ok(true)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Replays a fixed list of draws.
    struct Scripted {
        draws: Vec<f64>,
        next: usize,
    }

    impl Scripted {
        fn new(draws: &[f64]) -> Self {
            Self {
                draws: draws.to_vec(),
                next: 0,
            }
        }
    }

    impl RandomSource for Scripted {
        fn next_unit(&mut self) -> f64 {
            let draw = self.draws[self.next % self.draws.len()];
            self.next += 1;
            draw
        }
    }

    fn abc() -> WeightedPool<&'static str, i32, Scripted> {
        WeightedPool::from_entries(Scripted::new(&[0.0]), [("a", 1), ("b", 2), ("c", 3)]).unwrap()
    }

    #[test]
    fn cumulative_weights_are_inclusive_prefix_sums() {
        let pool = abc();
        let cumulative: Vec<i32> = pool.cumulative_weights().collect();
        assert_eq!(cumulative, vec![1, 3, 6]);
        assert_eq!(pool.total_weight(), 6);
        assert_eq!(pool.len(), 3);
    }

    #[test]
    fn negative_weight_leaves_pool_unchanged() {
        let mut pool = abc();
        let err = pool.add_item("d", -1).unwrap_err();
        assert!(matches!(err, PoolError::InvalidArgument(_)));
        assert_eq!(pool.len(), 3);
        assert_eq!(pool.total_weight(), 6);
    }

    #[test]
    fn overflow_leaves_pool_unchanged() {
        let mut pool: WeightedPool<u8, i32> = WeightedPool::new();
        pool.add_item(1, i32::MAX - 1).unwrap();
        assert!(pool.add_item(2, 2).is_err());
        assert_eq!(pool.len(), 1);
        assert_eq!(pool.total_weight(), i32::MAX - 1);
    }

    #[test]
    fn nan_weight_is_rejected() {
        let mut pool: WeightedPool<u8, f64> = WeightedPool::new();
        let err = pool.add_item(1, f64::NAN).unwrap_err();
        assert!(pool.is_empty());
        assert_eq!(
            err.to_string(),
            "invalid argument: invalid weight NaN: must be finite and >= 0"
        );

        pool.add_item(2, 1.0).unwrap();
        let err = pool.set_weight(&2, f64::INFINITY).unwrap_err();
        assert_eq!(
            err.to_string(),
            "invalid argument: invalid weight inf: must be finite and >= 0"
        );
        assert_eq!(pool.get_weight(&2), 1.0);
    }

    #[test]
    fn zero_total_float_pool_samples_once_weighted() {
        let mut pool: WeightedPool<u8, f32> = WeightedPool::new();
        pool.add_item(1, 0.0).unwrap();
        assert_eq!(pool.get_random_item().unwrap_err(), PoolError::ZeroTotalWeight);
        pool.add_item(2, 0.5).unwrap();
        assert_eq!(*pool.get_random_item().unwrap(), 2);
    }

    #[test]
    fn integer_targets_use_ceiling() {
        let pool = abc();
        // 6 * 0.1 = 0.6 -> 1 -> "a"
        assert_eq!(*pool.select(0.1).unwrap(), "a");
        // 6 * 0.17 = 1.02 -> 2 -> "b"
        assert_eq!(*pool.select(0.17).unwrap(), "b");
        // 6 * 0.5 = 3.0 -> 3 -> "b" (upper bound inclusive)
        assert_eq!(*pool.select(0.5).unwrap(), "b");
        // 6 * 0.51 = 3.06 -> 4 -> "c"
        assert_eq!(*pool.select(0.51).unwrap(), "c");
        assert_eq!(*pool.select(0.999_999).unwrap(), "c");
    }

    #[test]
    fn float_targets_are_not_rounded() {
        let pool: WeightedPool<&str, f64, Scripted> =
            WeightedPool::from_entries(Scripted::new(&[0.0]), [("a", 1.0), ("b", 2.0), ("c", 3.0)])
                .unwrap();
        // 6 * 0.1 = 0.6 -> "a"; 6 * 0.17 = 1.02 -> "b"
        assert_eq!(*pool.select(0.1).unwrap(), "a");
        assert_eq!(*pool.select(0.17).unwrap(), "b");
        assert_eq!(*pool.select(0.99).unwrap(), "c");
    }

    #[test]
    fn zero_draw_skips_leading_zero_weights() {
        let pool: WeightedPool<&str, i32, Scripted> =
            WeightedPool::from_entries(Scripted::new(&[0.0]), [("none", 0), ("some", 5)]).unwrap();
        assert_eq!(*pool.select(0.0).unwrap(), "some");
    }

    #[test]
    fn zero_weight_entries_are_never_drawn() {
        let pool: WeightedPool<&str, f64, Scripted> = WeightedPool::from_entries(
            Scripted::new(&[0.0]),
            [("a", 1.0), ("ghost", 0.0), ("b", 1.0)],
        )
        .unwrap();
        for step in 0..1000 {
            let unit = step as f64 / 1000.0;
            assert_ne!(*pool.select(unit).unwrap(), "ghost");
        }
        assert_eq!(pool.get_weight(&"ghost"), 0.0);
        assert!(pool.contains(&"ghost"));
    }

    #[test]
    fn select_rejects_out_of_range_draws() {
        let pool = abc();
        assert!(matches!(pool.select(1.0), Err(PoolError::InvalidArgument(_))));
        assert!(matches!(pool.select(-0.1), Err(PoolError::InvalidArgument(_))));
        assert!(matches!(pool.select(f64::NAN), Err(PoolError::InvalidArgument(_))));
    }

    #[test]
    fn empty_and_zero_total_pools_cannot_sample() {
        let mut pool: WeightedPool<&str, i32, Scripted> =
            WeightedPool::with_source(Scripted::new(&[0.5]));
        assert_eq!(pool.get_random_item(), Err(PoolError::EmptyPool));

        pool.add_item("zero", 0).unwrap();
        assert_eq!(pool.get_random_item(), Err(PoolError::ZeroTotalWeight));
        assert_eq!(pool.len(), 1);
    }

    #[test]
    fn get_random_item_consumes_source() {
        let mut pool: WeightedPool<&str, i32, Scripted> = WeightedPool::from_entries(
            Scripted::new(&[0.05, 0.4, 0.9]),
            [("a", 1), ("b", 2), ("c", 3)],
        )
        .unwrap();
        assert_eq!(*pool.get_random_item().unwrap(), "a");
        assert_eq!(*pool.get_random_item().unwrap(), "b");
        assert_eq!(*pool.get_random_item().unwrap(), "c");
    }

    #[test]
    fn remove_shifts_cumulative_suffix() {
        let mut pool = abc();
        assert!(pool.remove(&"b"));
        let cumulative: Vec<i32> = pool.cumulative_weights().collect();
        assert_eq!(cumulative, vec![1, 4]);
        assert_eq!(pool.total_weight(), 4);
        assert!(!pool.remove(&"b"));
        assert_eq!(pool.get_weight(&"b"), 0);
        assert_eq!(pool.get_proc_chance(&"b"), 0.0);
    }

    #[test]
    fn remove_last_item_empties_total() {
        let mut pool: WeightedPool<&str, f32> = WeightedPool::new();
        pool.add_item("only", 2.5).unwrap();
        assert!(pool.remove(&"only"));
        assert!(pool.is_empty());
        assert_eq!(pool.total_weight(), 0.0);
    }

    #[test]
    fn duplicates_act_on_first_match() {
        let mut pool: WeightedPool<&str, i64> = WeightedPool::new();
        pool.add_item("dup", 10).unwrap();
        pool.add_item("other", 1).unwrap();
        pool.add_item("dup", 30).unwrap();

        assert_eq!(pool.get_weight(&"dup"), 10);
        assert!(pool.remove(&"dup"));
        assert_eq!(pool.get_weight(&"dup"), 30);
        assert_eq!(pool.total_weight(), 31);
    }

    #[test]
    fn proc_chance_is_weight_over_total() {
        let pool = abc();
        assert!((pool.get_proc_chance(&"a") - 1.0 / 6.0).abs() < 1e-12);
        assert!((pool.get_proc_chance(&"c") - 0.5).abs() < 1e-12);
        assert_eq!(pool.get_proc_chance(&"missing"), 0.0);

        let sum: f64 = pool.proc_chances().iter().map(|(_, p)| p).sum();
        assert!((sum - 1.0).abs() < 1e-12);
    }

    #[test]
    fn proc_chance_of_zero_total_pool_is_zero() {
        let mut pool: WeightedPool<&str, i32> = WeightedPool::new();
        pool.add_item("zero", 0).unwrap();
        assert_eq!(pool.get_proc_chance(&"zero"), 0.0);
    }

    #[test]
    fn set_weight_rebuilds_suffix() {
        let mut pool = abc();
        assert!(pool.set_weight(&"a", 4).unwrap());
        let cumulative: Vec<i32> = pool.cumulative_weights().collect();
        assert_eq!(cumulative, vec![4, 6, 9]);
        assert_eq!(pool.total_weight(), 9);

        assert!(!pool.set_weight(&"missing", 1).unwrap());
        assert!(pool.set_weight(&"a", -1).is_err());
        assert_eq!(pool.total_weight(), 9);
    }

    #[test]
    fn set_weight_overflow_leaves_pool_unchanged() {
        let mut pool: WeightedPool<u8, i32> = WeightedPool::new();
        pool.add_item(1, 10).unwrap();
        pool.add_item(2, 10).unwrap();
        assert!(pool.set_weight(&1, i32::MAX).is_err());
        assert_eq!(pool.get_weight(&1), 10);
        assert_eq!(pool.total_weight(), 20);
    }

    #[test]
    fn capacity_follows_policy() {
        let mut pool: WeightedPool<usize, i32> = WeightedPool::new();
        assert_eq!(pool.capacity(), 0);
        pool.add_item(0, 1).unwrap();
        assert_eq!(pool.capacity(), 32);
        for i in 1..26 {
            pool.add_item(i, 1).unwrap();
        }
        assert_eq!(pool.capacity(), 32);
        // 26 / 32 > 0.8 -> grow before the 27th insert
        pool.add_item(26, 1).unwrap();
        assert_eq!(pool.capacity(), 48);
    }

    #[test]
    fn clear_keeps_capacity() {
        let mut pool = abc();
        pool.clear();
        assert!(pool.is_empty());
        assert_eq!(pool.total_weight(), 0);
        assert_eq!(pool.capacity(), 32);
    }

    #[test]
    fn with_policy_validates() {
        let bad = ResizePolicy {
            base_capacity: 0,
            ..Default::default()
        };
        let result: Result<WeightedPool<u8, i32>, _> = WeightedPool::with_policy(ThreadRandom::new(), bad);
        assert!(matches!(result, Err(PoolError::InvalidConfiguration(_))));

        let small = ResizePolicy {
            base_capacity: 2,
            ..Default::default()
        };
        let mut pool: WeightedPool<u8, i32> =
            WeightedPool::with_policy(ThreadRandom::new(), small).unwrap();
        pool.add_item(1, 1).unwrap();
        assert_eq!(pool.capacity(), 2);
        pool.add_item(2, 1).unwrap();
        // 1 / 2 = 0.5, no growth yet
        assert_eq!(pool.capacity(), 2);
        pool.add_item(3, 1).unwrap();
        assert_eq!(pool.capacity(), 3);
    }
}
