/// HTTP handlers for blog-service
pub mod comments;
pub mod feed;
pub mod posts;
pub mod profiles;

use actix_web::HttpResponse;

/// Custom not-found page served for any unmatched path.
pub async fn not_found() -> HttpResponse {
    HttpResponse::NotFound().json(serde_json::json!({
        "error": "page not found",
        "status": 404,
    }))
}
