pub mod auth;
pub mod config;
pub mod db;
pub mod error;
pub mod feed;
pub mod interests;

use std::sync::Arc;
use std::time::Duration;

use actix_web::{web, HttpResponse};
use sqlx::PgPool;

pub use error::AppError;
pub type Result<T> = std::result::Result<T, AppError>;
pub use config::Settings;

pub use auth::{AuthService, TokenAuthenticator, Viewer};
pub use db::{DbOperations, User, UserStore};
pub use feed::{FeedPage, FeedPolicy, FeedRanker, FeedStore};

/// Health check endpoint handler
/// Returns a JSON response with server status and timestamp
pub async fn health_check() -> HttpResponse {
    HttpResponse::Ok().json(serde_json::json!({
        "status": "healthy",
        "timestamp": chrono::Utc::now().to_rfc3339()
    }))
}

/// Registers every HTTP route. Handlers expect `web::Data<AppState>`.
pub fn routes(cfg: &mut web::ServiceConfig) {
    cfg.route("/health", web::get().to(health_check))
        .route("/auth/register", web::post().to(auth::handlers::register))
        .route("/auth/login", web::post().to(auth::handlers::login))
        .route("/auth/me", web::get().to(auth::handlers::me))
        .route("/feed", web::get().to(feed::handlers::get_feed))
        .route("/me/interests", web::get().to(interests::handlers::get_interests))
        .route("/me/interests", web::put().to(interests::handlers::replace_interests));
}

/// Application state shared across all components
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<Settings>,
    pub auth_service: Arc<AuthService>,
    pub users: Arc<dyn UserStore>,
    pub feed: Arc<FeedRanker>,
    db_pool: Option<Arc<PgPool>>,
}

impl AppState {
    pub async fn new(config: Settings) -> Result<Self> {
        let db = DbOperations::new_with_options(
            &config.database.url,
            config.database.max_connections,
            Duration::from_secs(5),
        )
        .await?;
        db.run_migrations().await?;

        let pool = db.pool();
        let db = Arc::new(db);
        let mut state = Self::from_stores(config, db.clone(), db)?;
        state.db_pool = Some(pool);
        Ok(state)
    }

    /// Wires the services over caller-supplied storage.
    pub fn from_stores(
        config: Settings,
        users: Arc<dyn UserStore>,
        feed_store: Arc<dyn FeedStore>,
    ) -> Result<Self> {
        let tokens = Arc::new(TokenAuthenticator::new(
            config.auth.token_secret.as_bytes(),
            config.auth.token_ttl_seconds,
        )?);
        let auth_service = Arc::new(AuthService::new(users.clone(), tokens));
        let feed = Arc::new(FeedRanker::new(feed_store, FeedPolicy::from(&config.feed)));

        Ok(Self {
            config: Arc::new(config),
            auth_service,
            users,
            feed,
            db_pool: None,
        })
    }

    pub async fn shutdown(&self) -> Result<()> {
        if let Some(pool) = &self.db_pool {
            pool.close().await;
        }
        Ok(())
    }
}
