pub mod authentication;
pub mod config;
pub mod data_formats;
pub mod db_helpers;
pub mod errors;
mod handlers;
pub mod logger;
pub mod markdown;
pub mod middleware;
pub mod models;
pub mod session;
pub mod uploads;

use std::{str::FromStr, sync::Arc};

use anyhow::Context;
pub use anyhow::Result;
use axum::{
    extract::DefaultBodyLimit,
    http::StatusCode,
    routing::{delete, get, post, put},
    Json, Router,
};
use handlers::*;
use sqlx::{
    migrate::MigrateDatabase,
    sqlite::{SqliteConnectOptions, SqlitePoolOptions},
    Sqlite, SqlitePool,
};
use tower_http::{services::ServeDir, trace::TraceLayer};

use crate::{
    authentication::{TokenService, JWT_EXPIRY_DURATION},
    config::Config,
};

pub type JsonResponse<T> = (StatusCode, Json<T>);

/// Largest accepted request body: a 5 MiB image plus the rest of the form.
pub const MAX_BODY_BYTES: usize = 6 * 1024 * 1024;

/// Shared by every handler.
#[derive(Clone)]
pub struct AppState {
    pub pool: SqlitePool,
    pub config: Arc<Config>,
    pub tokens: TokenService,
}

impl AppState {
    pub fn new(pool: SqlitePool, config: Config) -> Self {
        let tokens = TokenService::new(&config.jwt_secret, JWT_EXPIRY_DURATION);
        AppState {
            pool,
            config: Arc::new(config),
            tokens,
        }
    }
}

pub async fn run_app(config: Config) -> Result<()> {
    let address = config.address()?;
    let pool = init_db(&config.database_url).await?;
    let app = make_router(AppState::new(pool, config));

    let listener = tokio::net::TcpListener::bind(address)
        .await
        .with_context(|| format!("Failed to bind {address}"))?;
    tracing::info!(%address, "Server started");
    axum::serve(listener, app).await?;
    Ok(())
}

pub async fn init_db(db_url: &str) -> Result<SqlitePool> {
    if !Sqlite::database_exists(db_url).await.unwrap_or(false) {
        tracing::info!(db_url, "Creating database");
        Sqlite::create_database(db_url)
            .await
            .with_context(|| format!("Failed to create database {db_url}"))?;
    } else {
        tracing::debug!(db_url, "Database already exists");
    }

    let options = SqliteConnectOptions::from_str(db_url)?.foreign_keys(true);
    let pool = SqlitePoolOptions::new().connect_with(options).await?;
    tracing::info!("Running migrations");
    sqlx::migrate!("./migrations")
        .run(&pool)
        .await
        .context("Failed to run migrations")?;
    tracing::info!("Migrations completed");
    Ok(pool)
}

pub fn make_router(state: AppState) -> Router {
    let uploads = ServeDir::new(state.config.upload_root.join("uploads"));

    let pages = Router::new()
        .route("/", get(home_page))
        .route("/login", get(login_page).post(login_user))
        .route("/register", get(register_page).post(register_user))
        .route("/logout", post(logout_user))
        .route("/articles/:id", get(article_page))
        .route("/profile/:id", get(profile_page))
        .route("/mypage", get(my_page))
        .route("/post", get(new_post_page))
        .route("/post/:id/edit", get(edit_post_page))
        .route("/admin", get(dashboard))
        .route("/admin/users", get(list_users))
        .route("/admin/tags", get(list_tags))
        .route("/admin/hero-images", get(list_hero_images))
        .route("/admin/activities", get(list_activities));

    let api = Router::new()
        .route("/articles", get(list_articles).post(create_article))
        .route("/articles/:id", put(update_article).delete(delete_article))
        .route("/articles/:id/comments", get(list_comments).post(add_comment))
        .route("/articles/:id/bookmark", post(toggle_bookmark))
        .route("/comments/:id", delete(delete_comment))
        .route("/uploads", post(upload_image))
        .route("/me/profile", put(update_profile))
        .route("/me/account", put(update_account))
        .route("/admin/users/:id", delete(delete_user))
        .route("/admin/users/:id/role", put(change_user_role))
        .route("/admin/tags", post(create_tag))
        .route("/admin/tags/:id", put(update_tag).delete(delete_tag))
        .route("/admin/hero-images", post(upload_hero_image))
        .route("/admin/hero-images/order", put(reorder_hero_images))
        .route("/admin/hero-images/:id", delete(delete_hero_image))
        .route("/admin/hero-images/:id/active", put(toggle_hero_image))
        .route("/admin/hero-images/:id/move", post(move_hero_image));

    Router::new()
        .route("/check_health", get(alive))
        .merge(pages)
        .nest("/api", api)
        .nest_service("/uploads", uploads)
        .fallback(not_found)
        .layer(axum::middleware::from_fn_with_state(
            state.clone(),
            middleware::route_guard,
        ))
        .layer(DefaultBodyLimit::max(MAX_BODY_BYTES))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
