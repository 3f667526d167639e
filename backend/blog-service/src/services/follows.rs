use sqlx::PgPool;
use uuid::Uuid;

use crate::db::{follow_repo, user_repo};
use crate::error::{AppError, Result};
use crate::models::User;

/// Follow-relationship resolver.
///
/// Creation and removal are idempotent: repeated calls settle on the same
/// state and never error. A viewer may not follow themselves; the self case
/// is a silent no-op here, mirroring the request-handling boundary of the
/// platform rather than a data-layer rule.
#[derive(Clone)]
pub struct FollowService {
    pool: PgPool,
}

impl FollowService {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Whether viewer currently follows author; no side effect.
    pub async fn is_following(&self, viewer: Uuid, author: Uuid) -> Result<bool> {
        Ok(follow_repo::follow_exists(&self.pool, viewer, author).await?)
    }

    /// Idempotent follow; returns true if a new relationship was created.
    pub async fn follow(&self, viewer: Uuid, author: Uuid) -> Result<bool> {
        if viewer == author {
            return Ok(false);
        }

        Ok(follow_repo::insert_follow(&self.pool, viewer, author).await?)
    }

    /// Idempotent unfollow; returns true if a relationship was removed.
    pub async fn unfollow(&self, viewer: Uuid, author: Uuid) -> Result<bool> {
        if viewer == author {
            return Ok(false);
        }

        Ok(follow_repo::delete_follow(&self.pool, viewer, author).await?)
    }

    /// Follow an author resolved by username; NotFound for unknown names.
    pub async fn follow_username(&self, viewer: Uuid, username: &str) -> Result<User> {
        let author = self.resolve_author(username).await?;
        self.follow(viewer, author.id).await?;
        Ok(author)
    }

    /// Unfollow an author resolved by username; NotFound for unknown names.
    pub async fn unfollow_username(&self, viewer: Uuid, username: &str) -> Result<User> {
        let author = self.resolve_author(username).await?;
        self.unfollow(viewer, author.id).await?;
        Ok(author)
    }

    async fn resolve_author(&self, username: &str) -> Result<User> {
        user_repo::find_user_by_username(&self.pool, username)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("user '{}'", username)))
    }
}
