/// Database access layer
///
/// One module per entity, free functions over `&PgPool` returning
/// `Result<_, sqlx::Error>`. All feed listings share the same ordering:
/// `published_at DESC, created_at DESC`.
pub mod comment_repo;
pub mod follow_repo;
pub mod group_repo;
pub mod post_repo;
pub mod user_repo;
