//! Errors surfaced to the boundary layer.

use thiserror::Error;

/// Outcome of a failed view request.
#[derive(Clone, Debug, Error, PartialEq, Eq)]
pub enum ViewError {
    /// The requested root entity is not in the catalog for the given scope.
    #[error("not found: {0}")]
    NotFound(String),

    /// Composition failed unexpectedly; details are logged, never returned.
    #[error("internal error")]
    Internal,
}
