use axum::{
    extract::{Multipart, State},
    Json,
};

use crate::{
    authentication::{hash_password_argon2, verify_password_argon2, AuthUser},
    data_formats::{ActionResponse, UpdateAccountRequest},
    db_helpers::{
        get_user_by_email, get_user_by_id, update_account_in_db, update_profile_in_db,
        ProfileUpdate,
    },
    errors::RequestError,
    uploads::{discard_image, store_image, MultipartForm, UploadKind},
    AppState,
};

use super::{profile_path, JsonResult};

pub const GITHUB_URL_PREFIX: &str = "https://github.com/";
pub const MIN_PASSWORD_CHARS: usize = 8;

/// Blank strings clear a profile field.
fn optional_field(form: &MultipartForm, name: &str) -> Option<String> {
    form.non_empty(name).map(str::to_owned)
}

fn non_blank(value: Option<String>) -> Option<String> {
    value.filter(|v| !v.is_empty())
}

// ----------------- User Handlers -----------------
pub async fn update_profile(
    State(state): State<AppState>,
    AuthUser(session): AuthUser,
    multipart: Multipart,
) -> JsonResult<ActionResponse> {
    let form = MultipartForm::read(multipart).await?;
    let github_url = optional_field(&form, "githubUrl");
    if let Some(url) = &github_url {
        if !url.starts_with(GITHUB_URL_PREFIX) {
            return Err(RequestError::validation(format!(
                "GitHub URL must start with {GITHUB_URL_PREFIX}"
            )));
        }
    }

    let current = get_user_by_id(&state.pool, session.user_id)
        .await?
        .ok_or(RequestError::NotFound("User not found"))?;
    let upload_root = &state.config.upload_root;
    let avatar_url = match form.file("avatar") {
        Some(upload) => Some(store_image(upload_root, UploadKind::Avatar, session.user_id, upload).await?),
        None => None,
    };

    let result = update_profile_in_db(
        &state.pool,
        session.user_id,
        ProfileUpdate {
            nickname: optional_field(&form, "nickname"),
            bio: optional_field(&form, "bio"),
            github_url,
            avatar_url: avatar_url.clone(),
        },
    )
    .await;
    if let Err(e) = result {
        if let Some(url) = &avatar_url {
            discard_image(upload_root, UploadKind::Avatar, url).await;
        }
        return Err(e);
    }
    if let (Some(_), Some(old)) = (&avatar_url, &current.avatar_url) {
        discard_image(upload_root, UploadKind::Avatar, old).await;
    }

    tracing::info!(user_id = session.user_id, "Profile updated");
    Ok(Json(ActionResponse::ok([
        "/mypage".to_string(),
        "/mypage/profile".to_string(),
        profile_path(session.user_id),
    ])))
}

pub async fn update_account(
    State(state): State<AppState>,
    AuthUser(session): AuthUser,
    Json(request): Json<UpdateAccountRequest>,
) -> JsonResult<ActionResponse> {
    let email = request.email.trim().to_owned();
    if email.is_empty() {
        return Err(RequestError::validation("Email is required"));
    }
    let user = get_user_by_id(&state.pool, session.user_id)
        .await?
        .ok_or(RequestError::NotFound("User not found"))?;

    let password_hash = match non_blank(request.new_password) {
        Some(new_password) => {
            if Some(&new_password) != request.confirm_password.as_ref() {
                return Err(RequestError::validation(
                    "New password and confirmation do not match",
                ));
            }
            let current_password = non_blank(request.current_password)
                .ok_or_else(|| RequestError::validation("Current password is required"))?;
            if !verify_password_argon2(current_password, &user.password).await? {
                return Err(RequestError::validation("Invalid current password"));
            }
            if new_password.chars().count() < MIN_PASSWORD_CHARS {
                return Err(RequestError::validation(format!(
                    "New password must be at least {MIN_PASSWORD_CHARS} characters long"
                )));
            }
            Some(hash_password_argon2(new_password).await?)
        }
        None => None,
    };

    if email != user.email && get_user_by_email(&state.pool, &email).await?.is_some() {
        return Err(RequestError::Conflict("This email is already in use".to_string()));
    }

    update_account_in_db(&state.pool, user.id, email, password_hash).await?;
    tracing::info!(user_id = user.id, "Account updated");
    Ok(Json(ActionResponse::ok(["/mypage", "/mypage/account"])))
}
