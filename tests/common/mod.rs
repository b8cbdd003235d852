#![allow(dead_code)]

use std::{path::PathBuf, str::FromStr};

use axum::{body::Body, http::Response, Router};
use http_body_util::BodyExt;
use quill::{
    authentication::SessionClaims,
    config::{Config, Environment},
    db_helpers::{insert_user_in_db, update_user_role_in_db, NewUser},
    make_router,
    models::{Role, User},
    AppState,
};
use sqlx::{
    sqlite::{SqliteConnectOptions, SqlitePoolOptions},
    SqlitePool,
};

pub const TEST_SECRET: &str = "integration-test-secret";

/// A fresh in-memory database with the schema applied. A single connection
/// keeps every query on the same in-memory database.
pub async fn test_pool() -> SqlitePool {
    let options = SqliteConnectOptions::from_str("sqlite::memory:")
        .unwrap()
        .foreign_keys(true);
    let pool = SqlitePoolOptions::new()
        .max_connections(1)
        .idle_timeout(None)
        .max_lifetime(None)
        .connect_with(options)
        .await
        .unwrap();
    sqlx::migrate!("./migrations").run(&pool).await.unwrap();
    pool
}

pub fn test_config(upload_root: PathBuf) -> Config {
    Config {
        database_url: "sqlite::memory:".to_string(),
        jwt_secret: TEST_SECRET.to_string(),
        environment: Environment::Development,
        host: "127.0.0.1".to_string(),
        port: 0,
        upload_root,
    }
}

pub struct TestApp {
    pub state: AppState,
    pub router: Router,
    pub upload_dir: tempfile::TempDir,
}

impl TestApp {
    pub async fn new() -> Self {
        let upload_dir = tempfile::tempdir().unwrap();
        let state = AppState::new(test_pool().await, test_config(upload_dir.path().to_path_buf()));
        let router = make_router(state.clone());
        TestApp {
            state,
            router,
            upload_dir,
        }
    }

    pub fn pool(&self) -> &SqlitePool {
        &self.state.pool
    }

    /// `Cookie` header value for a signed-in user.
    pub fn cookie_for(&self, user: &User) -> String {
        let token = self.state.tokens.issue(&SessionClaims::for_user(user)).unwrap();
        format!("auth-token={token}")
    }
}

pub async fn create_user(pool: &SqlitePool, email: &str) -> User {
    insert_user_in_db(
        pool,
        NewUser {
            email: email.to_string(),
            // Not a real hash; login tests create users through the form.
            password_hash: "unused".to_string(),
            first_name: "Taro".to_string(),
            last_name: "Yamada".to_string(),
            nickname: None,
        },
    )
    .await
    .unwrap()
}

pub async fn create_admin(pool: &SqlitePool, email: &str) -> User {
    let user = create_user(pool, email).await;
    update_user_role_in_db(pool, user.id, Role::Admin).await.unwrap()
}

pub async fn body_json(response: Response<Body>) -> serde_json::Value {
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    serde_json::from_slice(&bytes).unwrap()
}

/// A `multipart/form-data` body made of text fields and optional files
/// `(field, file name, content type, bytes)`.
pub fn multipart_body(
    boundary: &str,
    fields: &[(&str, &str)],
    files: &[(&str, &str, &str, &[u8])],
) -> Vec<u8> {
    let mut body = Vec::new();
    for (name, value) in fields {
        body.extend_from_slice(
            format!(
                "--{boundary}\r\nContent-Disposition: form-data; name=\"{name}\"\r\n\r\n{value}\r\n"
            )
            .as_bytes(),
        );
    }
    for (name, file_name, content_type, data) in files {
        body.extend_from_slice(
            format!(
                "--{boundary}\r\nContent-Disposition: form-data; name=\"{name}\"; filename=\"{file_name}\"\r\nContent-Type: {content_type}\r\n\r\n"
            )
            .as_bytes(),
        );
        body.extend_from_slice(data);
        body.extend_from_slice(b"\r\n");
    }
    body.extend_from_slice(format!("--{boundary}--\r\n").as_bytes());
    body
}
