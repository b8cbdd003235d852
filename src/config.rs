use std::{net::SocketAddr, path::PathBuf};

use anyhow::{bail, Context, Result};

/// Server configuration loaded from environment variables.
///
/// | Env Var        | Required | Default      |
/// |----------------|----------|--------------|
/// | `DATABASE_URL` | **yes**  | --           |
/// | `JWT_SECRET`   | **yes**  | --           |
/// | `APP_ENV`      | no       | `production` |
/// | `HOST`         | no       | `127.0.0.1`  |
/// | `PORT`         | no       | `3001`       |
/// | `UPLOAD_ROOT`  | no       | `public`     |
#[derive(Debug, Clone)]
pub struct Config {
    pub database_url: String,
    pub jwt_secret: String,
    pub environment: Environment,
    pub host: String,
    pub port: u16,
    /// Directory that holds `uploads/`; files are served from `/uploads`.
    pub upload_root: PathBuf,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Environment {
    Development,
    Production,
}

impl Config {
    pub fn from_env() -> Result<Self> {
        let database_url = std::env::var("DATABASE_URL").context("DATABASE_URL must be set")?;

        // No fallback secret: a missing key must stop the server.
        let jwt_secret = std::env::var("JWT_SECRET").context("JWT_SECRET must be set")?;
        if jwt_secret.trim().is_empty() {
            bail!("JWT_SECRET must not be empty");
        }

        let environment = match std::env::var("APP_ENV").as_deref() {
            Ok("development") | Ok("dev") => Environment::Development,
            _ => Environment::Production,
        };

        let host = std::env::var("HOST").unwrap_or_else(|_| "127.0.0.1".into());
        let port = std::env::var("PORT")
            .unwrap_or_else(|_| "3001".into())
            .parse()
            .context("PORT must be a valid u16")?;
        let upload_root = std::env::var("UPLOAD_ROOT")
            .map(PathBuf::from)
            .unwrap_or_else(|_| PathBuf::from("public"));

        Ok(Self {
            database_url,
            jwt_secret,
            environment,
            host,
            port,
            upload_root,
        })
    }

    pub fn address(&self) -> Result<SocketAddr> {
        format!("{}:{}", self.host, self.port)
            .parse()
            .context("HOST/PORT do not form a socket address")
    }

    /// Session cookies carry `Secure` everywhere except local development.
    pub fn secure_cookies(&self) -> bool {
        self.environment != Environment::Development
    }
}
