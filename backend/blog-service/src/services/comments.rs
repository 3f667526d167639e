/// Comment service - comment creation on posts.
use serde::{Deserialize, Serialize};
use sqlx::PgPool;
use uuid::Uuid;
use validator::Validate;

use crate::db::{comment_repo, post_repo};
use crate::error::{AppError, FieldErrors, Result};
use crate::models::Comment;
use crate::services::validation::field_errors;

/// Submitted comment form data.
#[derive(Debug, Clone, Deserialize, Validate)]
pub struct NewComment {
    #[validate(length(min = 1, max = 2000, message = "the comment text must not be empty"))]
    pub text: String,
}

/// Comment form view-model embedded in the post detail page.
#[derive(Debug, Serialize)]
pub struct CommentFormView {
    pub text: String,
    pub errors: FieldErrors,
}

impl CommentFormView {
    pub fn empty() -> Self {
        Self {
            text: String::new(),
            errors: FieldErrors::new(),
        }
    }
}

#[derive(Clone)]
pub struct CommentService {
    pool: PgPool,
}

impl CommentService {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Create a comment on a post; the post must exist.
    pub async fn add_comment(
        &self,
        post_id: Uuid,
        author_id: Uuid,
        input: &NewComment,
    ) -> Result<Comment> {
        if let Err(errors) = input.validate() {
            return Err(AppError::Validation(field_errors(&errors)));
        }

        if post_repo::find_post_by_id(&self.pool, post_id)
            .await?
            .is_none()
        {
            return Err(AppError::NotFound(format!("post {}", post_id)));
        }

        let comment =
            comment_repo::create_comment(&self.pool, post_id, author_id, &input.text).await?;

        tracing::info!(comment_id = %comment.id, post_id = %post_id, "comment created");
        Ok(comment)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_comment_fails_validation() {
        let input = NewComment {
            text: String::new(),
        };
        assert!(input.validate().is_err());
    }
}
