/// Feed handlers - the paginated listing pages.
use actix_web::http::header::ContentType;
use actix_web::{web, HttpResponse};
use sqlx::PgPool;
use std::sync::Arc;

use crate::cache::FeedCache;
use crate::error::Result;
use crate::middleware::Viewer;
use crate::pagination::PageQuery;
use crate::services::FeedService;

/// Global feed: every post, newest first.
///
/// The rendered body is cached per page for the configured window; within
/// that window repeated requests return the cached bytes unchanged, even if
/// posts were created or deleted in between.
pub async fn index(
    pool: web::Data<PgPool>,
    cache: web::Data<Arc<FeedCache>>,
    query: web::Query<PageQuery>,
) -> Result<HttpResponse> {
    let cache_page = query.page.unwrap_or(1).max(1);

    if let Some(body) = cache.get_page(cache_page).await {
        return Ok(HttpResponse::Ok()
            .content_type(ContentType::json())
            .body(body));
    }

    let feed = FeedService::new((**pool).clone()).index(query.page).await?;
    let body = serde_json::to_string(&feed)?;
    cache.set_page(cache_page, &body).await;

    Ok(HttpResponse::Ok()
        .content_type(ContentType::json())
        .body(body))
}

/// Group feed: posts of one community; 404 for an unknown slug.
pub async fn group_posts(
    pool: web::Data<PgPool>,
    slug: web::Path<String>,
    query: web::Query<PageQuery>,
) -> Result<HttpResponse> {
    let feed = FeedService::new((**pool).clone())
        .group(&slug, query.page)
        .await?;

    Ok(HttpResponse::Ok().json(feed))
}

/// Followed-authors feed for the authenticated viewer.
pub async fn follow_index(
    pool: web::Data<PgPool>,
    viewer: Viewer,
    query: web::Query<PageQuery>,
) -> Result<HttpResponse> {
    let feed = FeedService::new((**pool).clone())
        .following(viewer.0, query.page)
        .await?;

    Ok(HttpResponse::Ok().json(feed))
}
