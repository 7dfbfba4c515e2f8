//! The judging core: group partitioning, claim brokering, skill-level
//! classification and progress aggregation, plus the operations around them
//! that complete the claim lifecycle.
//!
//! Every service checks the caller's permission before it touches the store.

pub mod claim;
pub mod classifier;
pub mod evaluation;
pub mod groups;
pub mod moderation;
pub mod partition;
pub mod progress;
pub mod settings;

use common::{Actor, Permission, has_permission};
use sea_orm::DbErr;

#[derive(Debug, thiserror::Error)]
pub enum JudgingError {
    #[error("permission denied")]
    Forbidden,
    #[error("{0} not found")]
    NotFound(String),
    #[error("there are no active judging groups")]
    NoActiveGroups,
    #[error("{0}")]
    Validation(String),
    #[error("database error while {context}: {source}")]
    Database {
        context: &'static str,
        source: DbErr,
    },
}

pub type JudgingResult<T> = Result<T, JudgingError>;

/// Fail with `Forbidden` unless `actor` holds `permission`.
pub fn ensure(actor: &Actor, permission: Permission) -> JudgingResult<()> {
    if has_permission(Some(actor), permission) {
        Ok(())
    } else {
        Err(JudgingError::Forbidden)
    }
}

/// Fail with `Forbidden` unless `actor` is an unlocked admin.
pub fn ensure_admin(actor: &Actor) -> JudgingResult<()> {
    if actor.is_effective_admin() {
        Ok(())
    } else {
        Err(JudgingError::Forbidden)
    }
}

/// Attach an operation name to a persistence failure.
pub trait DbContext<T> {
    fn context(self, context: &'static str) -> JudgingResult<T>;
}

impl<T> DbContext<T> for Result<T, DbErr> {
    fn context(self, context: &'static str) -> JudgingResult<T> {
        self.map_err(|source| JudgingError::Database { context, source })
    }
}
