//! Collaboration platform skills provider trait.

use crate::types::skill_card::{SkillCard, Status};
use crate::Error;
use async_trait::async_trait;

/// Invocation-level update sent together with a status card.
#[derive(Debug, Clone, PartialEq)]
pub struct InvocationUpdate {
    pub file_id: String,
    pub status: Status,
    pub cards: Vec<SkillCard>,
}

/// Skill API scoped to one invocation's read and write tokens.
#[async_trait]
pub trait Provider: Send + Sync {
    /// Download the content of the file that triggered the invocation.
    async fn file_contents(&self, file_id: &str) -> std::result::Result<Vec<u8>, Error>;

    /// Report invocation progress and replace the file's cards with a status card.
    async fn update_invocation(
        &self,
        skill_id: &str,
        update: InvocationUpdate,
    ) -> std::result::Result<(), Error>;

    /// Attach cards to a file.
    async fn create_cards(
        &self,
        file_id: &str,
        cards: Vec<SkillCard>,
    ) -> std::result::Result<(), Error>;

    /// Remove every skill card from a file.
    async fn delete_cards(&self, file_id: &str) -> std::result::Result<(), Error>;
}
