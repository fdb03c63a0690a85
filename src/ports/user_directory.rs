//! User directory port.
//!
//! Resolves a FastSpring account identifier to the local user that owns it.
//! The host application owns user records; this crate only reads the link.

use async_trait::async_trait;

use crate::domain::foundation::{DomainError, UserId};

/// Read-only lookup of local users by their FastSpring account.
#[async_trait]
pub trait UserDirectory: Send + Sync {
    /// Returns the user linked to `fastspring_id`, or `None` when no local
    /// user carries that account.
    ///
    /// # Errors
    ///
    /// - `DatabaseError` on lookup failure
    async fn find_by_fastspring_id(&self, fastspring_id: &str)
        -> Result<Option<UserId>, DomainError>;
}
