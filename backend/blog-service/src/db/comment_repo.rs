use crate::models::{Comment, CommentView};
use sqlx::{PgPool, Row};
use uuid::Uuid;

/// Create a new comment on a post
pub async fn create_comment(
    pool: &PgPool,
    post_id: Uuid,
    author_id: Uuid,
    text: &str,
) -> Result<Comment, sqlx::Error> {
    let comment = sqlx::query_as::<_, Comment>(
        r#"
        INSERT INTO comments (post_id, author_id, text)
        VALUES ($1, $2, $3)
        RETURNING id, post_id, author_id, text, created_at
        "#,
    )
    .bind(post_id)
    .bind(author_id)
    .bind(text)
    .fetch_one(pool)
    .await?;

    Ok(comment)
}

/// All comments on a post, oldest first (thread reading order)
pub async fn list_by_post(pool: &PgPool, post_id: Uuid) -> Result<Vec<CommentView>, sqlx::Error> {
    let comments = sqlx::query_as::<_, CommentView>(
        r#"
        SELECT c.id, c.post_id, c.author_id, u.username AS author_username,
               c.text, c.created_at
        FROM comments c
        JOIN users u ON u.id = c.author_id
        WHERE c.post_id = $1
        ORDER BY c.created_at ASC
        "#,
    )
    .bind(post_id)
    .fetch_all(pool)
    .await?;

    Ok(comments)
}

/// Count comments on a post
pub async fn count_by_post(pool: &PgPool, post_id: Uuid) -> Result<i64, sqlx::Error> {
    let row = sqlx::query("SELECT COUNT(*) AS count FROM comments WHERE post_id = $1")
        .bind(post_id)
        .fetch_one(pool)
        .await?;

    Ok(row.get::<i64, _>("count"))
}
