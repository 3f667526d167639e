/// Post handlers - detail page, creation, editing, deletion.
use actix_web::http::header;
use actix_web::{web, HttpResponse};
use sqlx::PgPool;
use uuid::Uuid;

use crate::db::user_repo;
use crate::error::{AppError, Result};
use crate::middleware::Viewer;
use crate::services::posts::{DeleteOutcome, EditOutcome, NewPost};
use crate::services::PostService;

fn detail_location(post_id: Uuid) -> String {
    format!("/posts/{}/", post_id)
}

async fn viewer_profile_location(pool: &PgPool, viewer_id: Uuid) -> Result<String> {
    let user = user_repo::find_user_by_id(pool, viewer_id)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("user {}", viewer_id)))?;

    Ok(format!("/profile/{}/", user.username))
}

/// Post detail: the post, author's post count, and the comment thread.
pub async fn post_detail(
    pool: web::Data<PgPool>,
    post_id: web::Path<Uuid>,
) -> Result<HttpResponse> {
    let detail = PostService::new((**pool).clone()).detail(*post_id).await?;

    Ok(HttpResponse::Ok().json(detail))
}

/// Empty post form for the create page.
pub async fn post_create_form(pool: web::Data<PgPool>, _viewer: Viewer) -> Result<HttpResponse> {
    let form = PostService::new((**pool).clone()).blank_form().await?;

    Ok(HttpResponse::Ok().json(form))
}

/// Create a post; on success redirects to the author's profile. A failed
/// validation re-renders the form with field errors and writes nothing.
pub async fn post_create(
    pool: web::Data<PgPool>,
    viewer: Viewer,
    input: web::Json<NewPost>,
) -> Result<HttpResponse> {
    let service = PostService::new((**pool).clone());

    match service.create(viewer.0, &input).await {
        Ok(_post) => {
            let location = viewer_profile_location(&pool, viewer.0).await?;
            Ok(HttpResponse::Found()
                .insert_header((header::LOCATION, location))
                .finish())
        }
        Err(AppError::Validation(fields)) => {
            let form = service.form_with_errors(&input, fields, false).await?;
            Ok(HttpResponse::Ok().json(form))
        }
        Err(other) => Err(other),
    }
}

/// Post form populated with the current values, for the author only.
/// Anyone else is sent back to the detail page.
pub async fn post_edit_form(
    pool: web::Data<PgPool>,
    post_id: web::Path<Uuid>,
    viewer: Viewer,
) -> Result<HttpResponse> {
    let service = PostService::new((**pool).clone());
    let post = service.get_post(*post_id).await?;

    if post.author_id != viewer.0 {
        return Ok(HttpResponse::Found()
            .insert_header((header::LOCATION, detail_location(*post_id)))
            .finish());
    }

    let form = service.edit_form(&post).await?;
    Ok(HttpResponse::Ok().json(form))
}

/// Edit a post. The author is redirected to the detail page on success; a
/// non-author is redirected there without any change being made.
pub async fn post_edit(
    pool: web::Data<PgPool>,
    post_id: web::Path<Uuid>,
    viewer: Viewer,
    input: web::Json<NewPost>,
) -> Result<HttpResponse> {
    let service = PostService::new((**pool).clone());

    match service.edit(*post_id, viewer.0, &input).await {
        Ok(EditOutcome::Updated(_)) | Ok(EditOutcome::NotAuthor) => {
            Ok(HttpResponse::Found()
                .insert_header((header::LOCATION, detail_location(*post_id)))
                .finish())
        }
        Err(AppError::Validation(fields)) => {
            let form = service.form_with_errors(&input, fields, true).await?;
            Ok(HttpResponse::Ok().json(form))
        }
        Err(other) => Err(other),
    }
}

/// Delete a post (author only); comments cascade. The author lands on their
/// profile, a non-author is bounced to the detail page.
pub async fn post_delete(
    pool: web::Data<PgPool>,
    post_id: web::Path<Uuid>,
    viewer: Viewer,
) -> Result<HttpResponse> {
    let service = PostService::new((**pool).clone());

    match service.delete(*post_id, viewer.0).await? {
        DeleteOutcome::Deleted => {
            let location = viewer_profile_location(&pool, viewer.0).await?;
            Ok(HttpResponse::Found()
                .insert_header((header::LOCATION, location))
                .finish())
        }
        DeleteOutcome::NotAuthor => Ok(HttpResponse::Found()
            .insert_header((header::LOCATION, detail_location(*post_id)))
            .finish()),
    }
}
