/// Comment handlers - comment submission on a post.
use actix_web::http::header;
use actix_web::{web, HttpResponse};
use sqlx::PgPool;
use uuid::Uuid;

use crate::error::Result;
use crate::middleware::Viewer;
use crate::services::comments::NewComment;
use crate::services::CommentService;

fn detail_location(post_id: Uuid) -> String {
    format!("/posts/{}/", post_id)
}

/// Create a comment and return to the post detail page.
///
/// The `Viewer` extractor turns an anonymous request into a login redirect
/// carrying this route as the `next` destination.
pub async fn add_comment(
    pool: web::Data<PgPool>,
    post_id: web::Path<Uuid>,
    viewer: Viewer,
    input: web::Json<NewComment>,
) -> Result<HttpResponse> {
    CommentService::new((**pool).clone())
        .add_comment(*post_id, viewer.0, &input)
        .await?;

    Ok(HttpResponse::Found()
        .insert_header((header::LOCATION, detail_location(*post_id)))
        .finish())
}

/// A browser GET on the comment route has nothing to show of its own; an
/// authenticated viewer is sent straight to the post detail page.
pub async fn comment_redirect(
    post_id: web::Path<Uuid>,
    _viewer: Viewer,
) -> Result<HttpResponse> {
    Ok(HttpResponse::Found()
        .insert_header((header::LOCATION, detail_location(*post_id)))
        .finish())
}
