use axum::{
    extract::State,
    http::{header::SET_COOKIE, HeaderValue},
    response::{AppendHeaders, Html, IntoResponse, Redirect},
    Form,
};

use crate::{
    authentication::{
        hash_password_argon2, verify_password_argon2, MaybeUser, SessionClaims,
    },
    data_formats::{LoginForm, RegisterForm},
    db_helpers::{get_user_by_email, insert_user_in_db, NewUser},
    errors::RequestError,
    models::User,
    session::{auth_cookie, clear_auth_cookie},
    AppState,
};

const LOGIN_PAGE: &str = r#"<!doctype html>
<title>Log in</title>
<form method="post" action="/login">
  <label>Email <input type="email" name="email" required></label>
  <label>Password <input type="password" name="password" required></label>
  <button type="submit">Log in</button>
</form>
<a href="/register">Create an account</a>
"#;

const REGISTER_PAGE: &str = r#"<!doctype html>
<title>Register</title>
<form method="post" action="/register">
  <label>Last name <input name="lastName" required></label>
  <label>First name <input name="firstName" required></label>
  <label>Email <input type="email" name="email" required></label>
  <label>Password <input type="password" name="password" required></label>
  <button type="submit">Register</button>
</form>
<a href="/login">Log in</a>
"#;

fn session_cookie(state: &AppState, user: &User) -> Result<HeaderValue, RequestError> {
    let token = state.tokens.issue(&SessionClaims::for_user(user))?;
    auth_cookie(&token, state.config.secure_cookies())
        .map_err(|e| RequestError::ServerError(anyhow::anyhow!("Invalid cookie value: {e}")))
}

// ----------------- Auth Pages -----------------
pub async fn login_page() -> Html<&'static str> {
    Html(LOGIN_PAGE)
}

pub async fn register_page() -> Html<&'static str> {
    Html(REGISTER_PAGE)
}

// ----------------- Auth Handlers -----------------
pub async fn login_user(
    State(state): State<AppState>,
    Form(request): Form<LoginForm>,
) -> Result<impl IntoResponse, RequestError> {
    let email = request.email.trim();
    if email.is_empty() || request.password.is_empty() {
        return Err(RequestError::validation("Email and password are required"));
    }

    let invalid = || RequestError::validation("Invalid email or password");
    let user = get_user_by_email(&state.pool, email)
        .await?
        .ok_or_else(invalid)?;
    let is_password_correct = verify_password_argon2(request.password, &user.password).await?;
    if !is_password_correct {
        tracing::info!(user_id = user.id, "Login rejected");
        return Err(invalid());
    }

    let cookie = session_cookie(&state, &user)?;
    tracing::info!(user_id = user.id, "User logged in");
    Ok((AppendHeaders([(SET_COOKIE, cookie)]), Redirect::to("/mypage")))
}

pub async fn register_user(
    State(state): State<AppState>,
    Form(request): Form<RegisterForm>,
) -> Result<impl IntoResponse, RequestError> {
    let last_name = request.last_name.trim();
    let first_name = request.first_name.trim();
    let email = request.email.trim();
    if last_name.is_empty() || first_name.is_empty() || email.is_empty() || request.password.is_empty() {
        return Err(RequestError::validation("All fields are required"));
    }
    if get_user_by_email(&state.pool, email).await?.is_some() {
        return Err(RequestError::Conflict(
            "A user with this email already exists".to_string(),
        ));
    }

    let password_hash = hash_password_argon2(request.password).await?;
    let user = insert_user_in_db(
        &state.pool,
        NewUser {
            email: email.to_owned(),
            password_hash,
            first_name: first_name.to_owned(),
            last_name: last_name.to_owned(),
            nickname: Some(format!("{last_name} {first_name}")),
        },
    )
    .await?;

    let cookie = session_cookie(&state, &user)?;
    tracing::info!(user_id = user.id, "User registered");
    Ok((AppendHeaders([(SET_COOKIE, cookie)]), Redirect::to("/mypage")))
}

pub async fn logout_user(
    State(state): State<AppState>,
    MaybeUser(session): MaybeUser,
) -> Result<impl IntoResponse, RequestError> {
    let cookie = clear_auth_cookie(state.config.secure_cookies())
        .map_err(|e| RequestError::ServerError(anyhow::anyhow!("Invalid cookie value: {e}")))?;
    if let Some(session) = session {
        tracing::info!(user_id = session.user_id, "User logged out");
    }
    Ok((AppendHeaders([(SET_COOKIE, cookie)]), Redirect::to("/login")))
}
