//! The `auth-token` session cookie.

use axum::http::{
    header::{InvalidHeaderValue, COOKIE},
    HeaderMap, HeaderValue,
};

use crate::authentication::{SessionClaims, TokenService, JWT_EXPIRY_DURATION};

pub const AUTH_COOKIE_NAME: &str = "auth-token";

/// `Set-Cookie` value carrying a freshly issued token.
pub fn auth_cookie(token: &str, secure: bool) -> Result<HeaderValue, InvalidHeaderValue> {
    let max_age = JWT_EXPIRY_DURATION.whole_seconds();
    let mut cookie =
        format!("{AUTH_COOKIE_NAME}={token}; Path=/; HttpOnly; SameSite=Lax; Max-Age={max_age}");
    if secure {
        cookie.push_str("; Secure");
    }
    HeaderValue::from_str(&cookie)
}

/// `Set-Cookie` value that makes the browser drop the session.
pub fn clear_auth_cookie(secure: bool) -> Result<HeaderValue, InvalidHeaderValue> {
    let mut cookie = format!("{AUTH_COOKIE_NAME}=; Path=/; HttpOnly; SameSite=Lax; Max-Age=0");
    if secure {
        cookie.push_str("; Secure");
    }
    HeaderValue::from_str(&cookie)
}

pub fn read_auth_token(headers: &HeaderMap) -> Option<String> {
    headers
        .get_all(COOKIE)
        .iter()
        .filter_map(|value| value.to_str().ok())
        .flat_map(|value| value.split(';'))
        .find_map(|pair| {
            let (key, value) = pair.trim().split_once('=')?;
            (key.trim() == AUTH_COOKIE_NAME && !value.trim().is_empty())
                .then(|| value.trim().to_string())
        })
}

pub fn current_user(headers: &HeaderMap, tokens: &TokenService) -> Option<SessionClaims> {
    let token = read_auth_token(headers)?;
    tokens.verify(&token)
}
