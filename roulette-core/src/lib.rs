//! Roulette Core — weighted random selection over a mutable pool.
//!
//! This crate contains:
//! - The weighted pool: add, remove, re-weight and O(log n) sampling over a
//!   cumulative-weight index
//! - Weight representations (`i32`, `i64`, `f32`, `f64`) behind one sealed trait
//! - Randomness sources, including a seeded hierarchy for reproducible draws
//! - Storage growth policy
//! - TOML loot-table loading
//!
//! ```
//! use roulette_core::{SeededRandom, WeightedPool};
//!
//! let mut pool = WeightedPool::with_source(SeededRandom::new(7));
//! pool.add_item("common", 90).unwrap();
//! pool.add_item("rare", 10).unwrap();
//!
//! let loot = pool.get_random_item().unwrap();
//! assert!(*loot == "common" || *loot == "rare");
//! assert_eq!(pool.get_proc_chance(&"rare"), 0.1);
//! ```

pub mod error;
pub mod policy;
pub mod pool;
pub mod rng;
pub mod table;
pub mod weight;

pub use error::{ErrorKind, PoolError};
pub use policy::ResizePolicy;
pub use pool::WeightedPool;
pub use rng::{RandomSource, RngHierarchy, SeededRandom, ThreadRandom};
pub use table::{TableConfig, TableEntry, TableWeight};
pub use weight::{Weight, WeightKind};
