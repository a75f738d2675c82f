//! Capacity growth policy for the pool's entry storage.

use serde::{Deserialize, Serialize};

use crate::error::PoolError;

/// When and how far the pool grows its storage.
///
/// Growth is checked before every insertion: an empty pool jumps straight to
/// `base_capacity`; otherwise, once `len / capacity` exceeds `load_factor`,
/// the capacity is multiplied by `growth_factor` (floored, and never by less
/// than one slot).
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ResizePolicy {
    pub base_capacity: usize,
    pub load_factor: f64,
    pub growth_factor: f64,
}

impl Default for ResizePolicy {
    fn default() -> Self {
        Self {
            base_capacity: 32,
            load_factor: 0.8,
            growth_factor: 1.5,
        }
    }
}

impl ResizePolicy {
    pub fn validate(&self) -> Result<(), PoolError> {
        if self.base_capacity == 0 {
            return Err(PoolError::InvalidConfiguration(
                "base_capacity must be > 0".into(),
            ));
        }
        if !(self.load_factor > 0.0 && self.load_factor <= 1.0) {
            return Err(PoolError::InvalidConfiguration(format!(
                "load_factor must be in (0, 1], got {}",
                self.load_factor
            )));
        }
        if !(self.growth_factor.is_finite() && self.growth_factor > 1.0) {
            return Err(PoolError::InvalidConfiguration(format!(
                "growth_factor must be a finite value > 1, got {}",
                self.growth_factor
            )));
        }
        Ok(())
    }

    /// Capacity required before inserting into a pool holding `len` entries
    /// with the given current `capacity`. Returns `capacity` unchanged when no
    /// growth is due.
    pub fn next_capacity(&self, len: usize, capacity: usize) -> usize {
        if capacity == 0 {
            return self.base_capacity.max(len + 1);
        }
        let load = len as f64 / capacity as f64;
        if load > self.load_factor || len >= capacity {
            let grown = (capacity as f64 * self.growth_factor).floor() as usize;
            grown.max(capacity + 1)
        } else {
            capacity
        }
    }
}
