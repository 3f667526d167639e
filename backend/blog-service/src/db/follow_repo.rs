use sqlx::{PgPool, Row};
use uuid::Uuid;

/// Idempotent create follow; returns true if a new row was inserted.
///
/// Concurrent callers serialize on the (follower_id, followee_id) unique
/// constraint, so the at-most-one-row invariant holds without locking.
pub async fn insert_follow(
    pool: &PgPool,
    follower_id: Uuid,
    followee_id: Uuid,
) -> Result<bool, sqlx::Error> {
    let inserted = sqlx::query_as::<_, (Uuid,)>(
        r#"
        INSERT INTO follows (follower_id, followee_id)
        VALUES ($1, $2)
        ON CONFLICT (follower_id, followee_id) DO NOTHING
        RETURNING id
        "#,
    )
    .bind(follower_id)
    .bind(followee_id)
    .fetch_optional(pool)
    .await?;

    Ok(inserted.is_some())
}

/// Idempotent delete; returns true if a row was removed.
pub async fn delete_follow(
    pool: &PgPool,
    follower_id: Uuid,
    followee_id: Uuid,
) -> Result<bool, sqlx::Error> {
    let affected = sqlx::query(
        r#"
        DELETE FROM follows
        WHERE follower_id = $1 AND followee_id = $2
        "#,
    )
    .bind(follower_id)
    .bind(followee_id)
    .execute(pool)
    .await?
    .rows_affected();

    Ok(affected > 0)
}

/// Whether follower currently follows followee
pub async fn follow_exists(
    pool: &PgPool,
    follower_id: Uuid,
    followee_id: Uuid,
) -> Result<bool, sqlx::Error> {
    let row = sqlx::query(
        r#"
        SELECT EXISTS(
            SELECT 1 FROM follows WHERE follower_id = $1 AND followee_id = $2
        ) AS present
        "#,
    )
    .bind(follower_id)
    .bind(followee_id)
    .fetch_one(pool)
    .await?;

    Ok(row.get::<bool, _>("present"))
}
