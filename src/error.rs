use thiserror::Error;

use crate::{BuildError, RegistryError};

/// Unified error type covering building, registry loading, and I/O.
///
/// Returned by convenience methods like
/// [`FormatRegistry::from_file()`](crate::FormatRegistry::from_file).
#[derive(Debug, Error)]
pub enum Error {
    #[error(transparent)]
    Build(#[from] BuildError),

    #[error(transparent)]
    Registry(#[from] RegistryError),

    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error(transparent)]
    Json(#[from] serde_json::Error),
}
