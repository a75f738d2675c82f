//! Error type shared by every pool operation.

use thiserror::Error;

/// Coarse classification of a [`PoolError`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// The pool (or the weight representation it was asked for) cannot be built.
    InvalidConfiguration,
    /// A caller-supplied argument was rejected; the pool is unchanged.
    InvalidArgument,
    /// The operation is not valid for the pool's current contents.
    InvalidOperation,
}

/// Errors from pool construction, mutation and sampling.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum PoolError {
    #[error("invalid configuration: {0}")]
    InvalidConfiguration(String),

    #[error("invalid argument: {0}")]
    InvalidArgument(String),

    #[error("cannot sample: no items")]
    EmptyPool,

    #[error("cannot sample: zero total weight")]
    ZeroTotalWeight,
}

impl PoolError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::InvalidConfiguration(_) => ErrorKind::InvalidConfiguration,
            Self::InvalidArgument(_) => ErrorKind::InvalidArgument,
            Self::EmptyPool | Self::ZeroTotalWeight => ErrorKind::InvalidOperation,
        }
    }
}
