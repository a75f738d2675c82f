//! Loot-table configuration — a pool described in TOML.
//!
//! ```toml
//! weight_type = "i32"
//!
//! [resize]
//! base_capacity = 32
//!
//! [[entries]]
//! item = "sword"
//! weight = 1200
//! ```
//!
//! The weight representation is named at runtime, so this is where an
//! unsupported representation surfaces as `InvalidConfiguration`.

use serde::{Deserialize, Serialize};
use std::path::Path;

use crate::error::PoolError;
use crate::policy::ResizePolicy;
use crate::pool::WeightedPool;
use crate::rng::RandomSource;
use crate::weight::{Weight, WeightKind};

/// A weight as written in the file: TOML keeps integers and floats apart.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum TableWeight {
    Integer(i64),
    Float(f64),
}

impl TableWeight {
    /// Convert into `W`.
    ///
    /// Fractional or out-of-range values are refused for integer kinds. Float
    /// kinds refuse values outside their range and whole numbers they cannot
    /// hold exactly; other fractions round to the nearest representable value.
    pub fn to_weight<W: Weight>(self) -> Result<W, PoolError> {
        match self {
            Self::Integer(value) => W::from_i64(value).ok_or_else(|| {
                PoolError::InvalidConfiguration(format!(
                    "weight {value} does not fit in {}",
                    W::KIND
                ))
            }),
            Self::Float(value) if W::DISCRETE => {
                if value.fract() != 0.0 || !value.is_finite() {
                    return Err(PoolError::InvalidConfiguration(format!(
                        "weight {value} is not an integer ({} table)",
                        W::KIND
                    )));
                }
                if value.abs() >= i64::MAX as f64 {
                    return Err(PoolError::InvalidConfiguration(format!(
                        "weight {value} does not fit in {}",
                        W::KIND
                    )));
                }
                Self::Integer(value as i64).to_weight::<W>()
            }
            Self::Float(value) => {
                let converted = W::from_f64(value);
                let out_of_range = !value.is_finite() || !converted.to_f64().is_finite();
                let inexact_integer = value.fract() == 0.0 && converted.to_f64() != value;
                if out_of_range || inexact_integer {
                    return Err(PoolError::InvalidConfiguration(format!(
                        "weight {value} is not representable in {}",
                        W::KIND
                    )));
                }
                Ok(converted)
            }
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TableEntry {
    pub item: String,
    pub weight: TableWeight,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct TableConfig {
    /// One of `i32`, `i64`, `f32`, `f64` (aliases: `int`, `long`, `float`, `double`).
    pub weight_type: String,

    #[serde(default)]
    pub resize: Option<ResizePolicy>,

    #[serde(default)]
    pub entries: Vec<TableEntry>,
}

impl TableConfig {
    /// Load a table from a TOML file.
    pub fn from_file(path: &Path) -> Result<Self, PoolError> {
        let content = std::fs::read_to_string(path).map_err(|e| {
            PoolError::InvalidConfiguration(format!("read table {}: {e}", path.display()))
        })?;
        Self::from_toml(&content)
    }

    /// Parse a table from a TOML string.
    pub fn from_toml(content: &str) -> Result<Self, PoolError> {
        toml::from_str(content)
            .map_err(|e| PoolError::InvalidConfiguration(format!("parse table TOML: {e}")))
    }

    pub fn weight_kind(&self) -> Result<WeightKind, PoolError> {
        self.weight_type.parse()
    }

    /// Build a pool of `W` weights from this table.
    ///
    /// `W` must be the representation named by `weight_type`; hosts dispatch
    /// on [`weight_kind`](TableConfig::weight_kind) to pick it.
    pub fn build_pool<W: Weight, R: RandomSource>(
        &self,
        source: R,
    ) -> Result<WeightedPool<String, W, R>, PoolError> {
        let kind = self.weight_kind()?;
        if kind != W::KIND {
            return Err(PoolError::InvalidConfiguration(format!(
                "table declares {kind} weights, pool requested {}",
                W::KIND
            )));
        }

        let policy = self.resize.unwrap_or_default();
        let mut pool = WeightedPool::with_policy(source, policy)?;
        for entry in &self.entries {
            let weight = entry.weight.to_weight::<W>()?;
            pool.add_item(entry.item.clone(), weight)?;
        }
        Ok(pool)
    }
}
