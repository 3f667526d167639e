use actix_cors::Cors;
use actix_web::{middleware::Logger, web, App, HttpResponse, HttpServer, Responder};
use anyhow::{Context, Result};
use chrono::Utc;
use redis::aio::ConnectionManager;
use redis::RedisError;
use serde::Serialize;
use sqlx::postgres::{PgConnectOptions, PgPoolOptions};
use sqlx::PgPool;
use std::collections::HashMap;
use std::str::FromStr;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use blog_service::cache::FeedCache;
use blog_service::handlers;
use blog_service::middleware::SessionAuth;
use blog_service::Config;

struct HealthState {
    db_pool: PgPool,
    redis: ConnectionManager,
}

#[derive(Serialize, Clone)]
#[serde(rename_all = "lowercase")]
enum ComponentStatus {
    Healthy,
    Unhealthy,
}

#[derive(Serialize)]
struct ComponentCheck {
    status: ComponentStatus,
    message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    latency_ms: Option<u64>,
}

#[derive(Serialize)]
struct ReadinessResponse {
    ready: bool,
    checks: HashMap<String, ComponentCheck>,
    timestamp: String,
}

impl HealthState {
    async fn check_postgres(&self) -> std::result::Result<(), sqlx::Error> {
        sqlx::query("SELECT 1")
            .fetch_one(&self.db_pool)
            .await
            .map(|_| ())
    }

    async fn check_redis(&self) -> std::result::Result<(), RedisError> {
        let mut conn = self.redis.clone();
        let pong: String = redis::cmd("PING").query_async(&mut conn).await?;
        if pong == "PONG" {
            Ok(())
        } else {
            Err(RedisError::from((
                redis::ErrorKind::ResponseError,
                "unexpected PING response",
            )))
        }
    }
}

async fn health_summary(state: web::Data<HealthState>) -> HttpResponse {
    match state.check_postgres().await {
        Ok(_) => HttpResponse::Ok().json(serde_json::json!({
            "status": "ok",
            "service": "blog-service",
            "version": env!("CARGO_PKG_VERSION")
        })),
        Err(e) => HttpResponse::ServiceUnavailable().json(serde_json::json!({
            "status": "unhealthy",
            "error": format!("PostgreSQL connection failed: {}", e),
            "service": "blog-service"
        })),
    }
}

async fn readiness_summary(state: web::Data<HealthState>) -> HttpResponse {
    let mut checks = HashMap::new();
    let mut ready = true;

    let start = Instant::now();
    let pg_result = state.check_postgres().await;
    let pg_latency = Some(start.elapsed().as_millis() as u64);
    let postgres_check = match pg_result {
        Ok(_) => ComponentCheck {
            status: ComponentStatus::Healthy,
            message: "PostgreSQL connection successful".to_string(),
            latency_ms: pg_latency,
        },
        Err(e) => {
            ready = false;
            ComponentCheck {
                status: ComponentStatus::Unhealthy,
                message: format!("PostgreSQL connection failed: {}", e),
                latency_ms: pg_latency,
            }
        }
    };
    checks.insert("postgresql".to_string(), postgres_check);

    let start = Instant::now();
    let redis_result = state.check_redis().await;
    let redis_latency = Some(start.elapsed().as_millis() as u64);
    let redis_check = match redis_result {
        Ok(_) => ComponentCheck {
            status: ComponentStatus::Healthy,
            message: "Redis ping successful".to_string(),
            latency_ms: redis_latency,
        },
        Err(e) => {
            ready = false;
            ComponentCheck {
                status: ComponentStatus::Unhealthy,
                message: format!("Redis ping failed: {}", e),
                latency_ms: redis_latency,
            }
        }
    };
    checks.insert("redis".to_string(), redis_check);

    let response = ReadinessResponse {
        ready,
        checks,
        timestamp: Utc::now().to_rfc3339(),
    };

    if ready {
        HttpResponse::Ok().json(response)
    } else {
        HttpResponse::ServiceUnavailable().json(response)
    }
}

/// Drop every cached feed page. The global feed otherwise serves stale
/// content until the cache window expires.
async fn cache_clear(cache: web::Data<Arc<FeedCache>>) -> impl Responder {
    match cache.clear().await {
        Ok(removed) => HttpResponse::Ok().json(serde_json::json!({
            "cleared": removed,
        })),
        Err(e) => HttpResponse::InternalServerError().body(format!("error: {}", e)),
    }
}

#[actix_web::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok();

    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info,actix_web=debug,sqlx=warn".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    info!("Starting blog-service v{}", env!("CARGO_PKG_VERSION"));

    // Load configuration
    let config = Config::from_env().context("Failed to load configuration")?;
    info!(
        "Configuration loaded: env={}, port={}",
        config.app.env, config.app.port
    );

    // Initialize database pool
    let connect_options = PgConnectOptions::from_str(&config.database.url)
        .context("Failed to parse DATABASE_URL")?;

    let db_pool = PgPoolOptions::new()
        .max_connections(config.database.max_connections)
        .min_connections(config.database.min_connections)
        .acquire_timeout(Duration::from_secs(10))
        .idle_timeout(Duration::from_secs(600))
        .connect_with(connect_options)
        .await
        .context("Failed to connect to database")?;

    // Verify database connection
    sqlx::query("SELECT 1")
        .execute(&db_pool)
        .await
        .context("Failed to verify database connection")?;

    // Run database migrations
    sqlx::migrate!("./migrations")
        .run(&db_pool)
        .await
        .context("Failed to run database migrations")?;
    info!("Database pool created, migrations applied");

    // Initialize Redis connection
    let redis_client =
        redis::Client::open(config.redis.url.as_str()).context("Failed to create Redis client")?;
    let redis_conn = ConnectionManager::new(redis_client)
        .await
        .context("Failed to connect to Redis")?;
    info!("Redis connection established");

    let feed_cache = Arc::new(FeedCache::new(
        redis_conn.clone(),
        config.cache.feed_ttl_secs,
    ));
    let feed_cache_data = web::Data::new(feed_cache);

    let health_state = web::Data::new(HealthState {
        db_pool: db_pool.clone(),
        redis: redis_conn,
    });

    let bind_address = format!("{}:{}", config.app.host, config.app.port);
    info!("Starting HTTP server at {}", bind_address);

    let allowed_origins = config.app.allowed_origins.clone();
    let session_secret = config.auth.session_secret.clone();
    let admin_enabled = config.app.admin_enabled;

    HttpServer::new(move || {
        let mut cors = Cors::default();
        for origin in allowed_origins.split(',') {
            let origin = origin.trim();
            if origin == "*" {
                cors = cors.allow_any_origin();
            } else {
                cors = cors.allowed_origin(origin);
            }
        }
        cors = cors.allow_any_method().allow_any_header().max_age(3600);

        let mut app = App::new()
            .app_data(web::Data::new(db_pool.clone()))
            .app_data(feed_cache_data.clone())
            .app_data(health_state.clone())
            .wrap(cors)
            .wrap(Logger::default())
            .wrap(tracing_actix_web::TracingLogger::default())
            .wrap(SessionAuth::new(&session_secret))
            .route("/metrics", web::get().to(blog_service::metrics::serve_metrics))
            .route("/health", web::get().to(health_summary))
            .route("/ready", web::get().to(readiness_summary));

        if admin_enabled {
            app = app.route("/admin/cache/clear", web::post().to(cache_clear));
        }

        app.service(web::resource("/").route(web::get().to(handlers::feed::index)))
            .service(
                web::resource("/group/{slug}/")
                    .route(web::get().to(handlers::feed::group_posts)),
            )
            .service(
                web::resource("/follow/").route(web::get().to(handlers::feed::follow_index)),
            )
            .service(
                web::resource("/create/")
                    .route(web::get().to(handlers::posts::post_create_form))
                    .route(web::post().to(handlers::posts::post_create)),
            )
            .service(
                web::resource("/posts/{post_id}/")
                    .route(web::get().to(handlers::posts::post_detail)),
            )
            .service(
                web::resource("/posts/{post_id}/edit/")
                    .route(web::get().to(handlers::posts::post_edit_form))
                    .route(web::post().to(handlers::posts::post_edit)),
            )
            .service(
                web::resource("/posts/{post_id}/delete/")
                    .route(web::post().to(handlers::posts::post_delete)),
            )
            .service(
                web::resource("/posts/{post_id}/comment/")
                    .route(web::get().to(handlers::comments::comment_redirect))
                    .route(web::post().to(handlers::comments::add_comment)),
            )
            .service(
                web::resource("/profile/{username}/")
                    .route(web::get().to(handlers::profiles::profile)),
            )
            .service(
                web::resource("/profile/{username}/follow/")
                    .route(web::get().to(handlers::profiles::profile_follow)),
            )
            .service(
                web::resource("/profile/{username}/unfollow/")
                    .route(web::get().to(handlers::profiles::profile_unfollow)),
            )
            .default_service(web::route().to(handlers::not_found))
    })
    .bind(&bind_address)
    .context("Failed to bind HTTP server")?
    .run()
    .await
    .context("HTTP server error")?;

    info!("blog-service shutting down");
    Ok(())
}
