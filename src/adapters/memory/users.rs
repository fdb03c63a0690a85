use std::collections::HashMap;

use async_trait::async_trait;
use tokio::sync::RwLock;

use crate::domain::foundation::{DomainError, UserId};
use crate::ports::UserDirectory;

/// Map of FastSpring account ids to local users.
#[derive(Default)]
pub struct InMemoryUserDirectory {
    links: RwLock<HashMap<String, UserId>>,
}

impl InMemoryUserDirectory {
    pub fn new() -> Self {
        Self::default()
    }

    /// Links a FastSpring account to a user, replacing any previous link.
    pub async fn link(&self, fastspring_id: impl Into<String>, user_id: UserId) {
        self.links.write().await.insert(fastspring_id.into(), user_id);
    }
}

#[async_trait]
impl UserDirectory for InMemoryUserDirectory {
    async fn find_by_fastspring_id(
        &self,
        fastspring_id: &str,
    ) -> Result<Option<UserId>, DomainError> {
        Ok(self.links.read().await.get(fastspring_id).cloned())
    }
}
