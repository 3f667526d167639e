/// Profile handlers - author feed and follow/unfollow actions.
use actix_web::http::header;
use actix_web::{web, HttpResponse};
use sqlx::PgPool;

use crate::error::Result;
use crate::middleware::{MaybeViewer, Viewer};
use crate::pagination::PageQuery;
use crate::services::{FeedService, FollowService};

fn profile_location(username: &str) -> String {
    format!("/profile/{}/", username)
}

/// Author feed; follow state is exposed when the viewer is authenticated.
pub async fn profile(
    pool: web::Data<PgPool>,
    username: web::Path<String>,
    viewer: MaybeViewer,
    query: web::Query<PageQuery>,
) -> Result<HttpResponse> {
    let feed = FeedService::new((**pool).clone())
        .profile(&username, viewer.0, query.page)
        .await?;

    Ok(HttpResponse::Ok().json(feed))
}

/// Idempotent follow; redirects back to the profile.
pub async fn profile_follow(
    pool: web::Data<PgPool>,
    username: web::Path<String>,
    viewer: Viewer,
) -> Result<HttpResponse> {
    let author = FollowService::new((**pool).clone())
        .follow_username(viewer.0, &username)
        .await?;

    Ok(HttpResponse::Found()
        .insert_header((header::LOCATION, profile_location(&author.username)))
        .finish())
}

/// Idempotent unfollow; redirects back to the profile.
pub async fn profile_unfollow(
    pool: web::Data<PgPool>,
    username: web::Path<String>,
    viewer: Viewer,
) -> Result<HttpResponse> {
    let author = FollowService::new((**pool).clone())
        .unfollow_username(viewer.0, &username)
        .await?;

    Ok(HttpResponse::Found()
        .insert_header((header::LOCATION, profile_location(&author.username)))
        .finish())
}
