/// Post service - creation, editing, deletion, and detail composition.
///
/// Writes are validated up front and performed as a single statement, so a
/// failed submission never leaves a partial row behind. Ownership outcomes
/// are explicit: handlers translate `NotAuthor` into the platform's
/// redirect-to-detail behavior instead of a hard denial.
use serde::{Deserialize, Serialize};
use sqlx::PgPool;
use uuid::Uuid;
use validator::Validate;

use crate::db::{comment_repo, group_repo, post_repo};
use crate::error::{AppError, FieldErrors, Result};
use crate::models::{CommentView, Group, Post, PostView};
use crate::services::comments::CommentFormView;
use crate::services::validation::field_errors;

/// Submitted post form data.
#[derive(Debug, Clone, Deserialize, Validate)]
pub struct NewPost {
    #[validate(length(min = 1, max = 4000, message = "the post text must not be empty"))]
    pub text: String,
    pub group_id: Option<Uuid>,
    pub image_key: Option<String>,
}

/// Result of an edit attempt by some identity.
#[derive(Debug)]
pub enum EditOutcome {
    Updated(Post),
    NotAuthor,
}

/// Result of a delete attempt by some identity.
#[derive(Debug)]
pub enum DeleteOutcome {
    Deleted,
    NotAuthor,
}

/// Post form view-model: submitted values, selectable groups, field errors.
#[derive(Debug, Serialize)]
pub struct PostFormView {
    pub text: String,
    pub group_id: Option<Uuid>,
    pub image_key: Option<String>,
    pub groups: Vec<Group>,
    pub errors: FieldErrors,
    pub is_edit: bool,
}

/// Post detail view-model.
#[derive(Debug, Serialize)]
pub struct PostDetail {
    pub post: PostView,
    /// Total number of posts by this post's author
    pub author_posts_count: i64,
    pub comment_count: i64,
    pub comments: Vec<CommentView>,
    pub comment_form: CommentFormView,
}

#[derive(Clone)]
pub struct PostService {
    pool: PgPool,
}

impl PostService {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Validate submitted form data, including the group reference.
    async fn validate_input(&self, input: &NewPost) -> Result<()> {
        let mut fields = match input.validate() {
            Ok(()) => FieldErrors::new(),
            Err(errors) => field_errors(&errors),
        };

        if let Some(group_id) = input.group_id {
            if group_repo::find_group_by_id(&self.pool, group_id)
                .await?
                .is_none()
            {
                fields
                    .entry("group".to_string())
                    .or_default()
                    .push("select a group from the list".to_string());
            }
        }

        if fields.is_empty() {
            Ok(())
        } else {
            Err(AppError::Validation(fields))
        }
    }

    /// Create a post for the author; all-or-nothing.
    pub async fn create(&self, author_id: Uuid, input: &NewPost) -> Result<Post> {
        self.validate_input(input).await?;

        let post = post_repo::create_post(
            &self.pool,
            author_id,
            &input.text,
            input.group_id,
            input.image_key.as_deref(),
        )
        .await?;

        tracing::info!(post_id = %post.id, author_id = %author_id, "post created");
        Ok(post)
    }

    /// Edit a post. Only the author may change it; anyone else gets
    /// `NotAuthor` with the post untouched.
    pub async fn edit(&self, post_id: Uuid, editor_id: Uuid, input: &NewPost) -> Result<EditOutcome> {
        let post = post_repo::find_post_by_id(&self.pool, post_id)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("post {}", post_id)))?;

        if post.author_id != editor_id {
            return Ok(EditOutcome::NotAuthor);
        }

        self.validate_input(input).await?;

        post_repo::update_post(
            &self.pool,
            post_id,
            &input.text,
            input.group_id,
            input.image_key.as_deref(),
        )
        .await?;

        let updated = post_repo::find_post_by_id(&self.pool, post_id)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("post {}", post_id)))?;

        Ok(EditOutcome::Updated(updated))
    }

    /// Delete a post; comments cascade at the storage layer.
    pub async fn delete(&self, post_id: Uuid, requester_id: Uuid) -> Result<DeleteOutcome> {
        let post = post_repo::find_post_by_id(&self.pool, post_id)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("post {}", post_id)))?;

        if post.author_id != requester_id {
            return Ok(DeleteOutcome::NotAuthor);
        }

        post_repo::delete_post(&self.pool, post_id).await?;
        tracing::info!(post_id = %post_id, "post deleted");

        Ok(DeleteOutcome::Deleted)
    }

    /// Compose the post detail page: the post, its author's total post
    /// count, the comment thread, and an empty comment form.
    pub async fn detail(&self, post_id: Uuid) -> Result<PostDetail> {
        let post = post_repo::find_post_view_by_id(&self.pool, post_id)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("post {}", post_id)))?;

        let author_posts_count = post_repo::count_by_author(&self.pool, post.author_id).await?;
        let comments = comment_repo::list_by_post(&self.pool, post_id).await?;
        let comment_count = comments.len() as i64;

        Ok(PostDetail {
            post,
            author_posts_count,
            comment_count,
            comments,
            comment_form: CommentFormView::empty(),
        })
    }

    /// Empty form view-model for `GET /create/`.
    pub async fn blank_form(&self) -> Result<PostFormView> {
        let groups = group_repo::list_groups(&self.pool).await?;

        Ok(PostFormView {
            text: String::new(),
            group_id: None,
            image_key: None,
            groups,
            errors: FieldErrors::new(),
            is_edit: false,
        })
    }

    /// Form view-model populated from an existing post, for `GET .../edit/`.
    pub async fn edit_form(&self, post: &Post) -> Result<PostFormView> {
        let groups = group_repo::list_groups(&self.pool).await?;

        Ok(PostFormView {
            text: post.text.clone(),
            group_id: post.group_id,
            image_key: post.image_key.clone(),
            groups,
            errors: FieldErrors::new(),
            is_edit: true,
        })
    }

    /// Form view-model re-rendered after a failed submission.
    pub async fn form_with_errors(
        &self,
        input: &NewPost,
        errors: FieldErrors,
        is_edit: bool,
    ) -> Result<PostFormView> {
        let groups = group_repo::list_groups(&self.pool).await?;

        Ok(PostFormView {
            text: input.text.clone(),
            group_id: input.group_id,
            image_key: input.image_key.clone(),
            groups,
            errors,
            is_edit,
        })
    }

    /// Fetch a post row, surfacing NotFound for unknown ids.
    pub async fn get_post(&self, post_id: Uuid) -> Result<Post> {
        post_repo::find_post_by_id(&self.pool, post_id)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("post {}", post_id)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_text_fails_validation() {
        let input = NewPost {
            text: String::new(),
            group_id: None,
            image_key: None,
        };
        let errors = input.validate().unwrap_err();
        let fields = field_errors(&errors);
        assert!(fields.contains_key("text"));
    }

    #[test]
    fn plain_text_passes_validation() {
        let input = NewPost {
            text: "a new post".to_string(),
            group_id: None,
            image_key: None,
        };
        assert!(input.validate().is_ok());
    }
}
