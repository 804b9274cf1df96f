use thiserror::Error;
use uuid::Uuid;

use crate::models::NodeKind;

pub type Result<T, E = Error> = std::result::Result<T, E>;

/// Errors surfaced by the store and the hierarchy service.
#[derive(Debug, Error)]
pub enum Error {
    /// A target or parent id did not resolve.
    #[error("{kind} not found: {id}")]
    NotFound { kind: NodeKind, id: Uuid },

    /// Caller input was rejected before anything was written.
    #[error("Invalid input: {0}")]
    Validation(String),

    #[error("Database error: {0}")]
    Database(#[from] rusqlite::Error),

    #[error("Migration failed: {0:#}")]
    Migration(#[source] anyhow::Error),
}

impl Error {
    pub fn not_found(kind: NodeKind, id: Uuid) -> Self {
        Self::NotFound { kind, id }
    }

    /// Errors that are the caller's fault and safe to show them verbatim.
    pub fn is_client_error(&self) -> bool {
        matches!(self, Self::NotFound { .. } | Self::Validation(_))
    }
}
