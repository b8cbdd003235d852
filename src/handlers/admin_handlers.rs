use axum::{
    extract::{Multipart, Path, State},
    Json,
};

use crate::{
    authentication::AdminUser,
    data_formats::{
        ActionResponse, ActivityListResponse, ActivityResponse, AdminUserResponse,
        DashboardResponse, HeroImageListResponse, HeroImageResponse, HeroOrderEntry, MoveRequest,
        ProfileResponse, RoleRequest, TagListResponse, TagRequest, TagResponse, UserListResponse,
    },
    db_helpers::{
        create_hero_image_in_db, create_tag_in_db, dashboard_counts_in_db,
        delete_hero_image_in_db, delete_tag_in_db, delete_user_in_db, get_hero_image_in_db,
        get_tag_in_db, get_user_by_id, list_hero_images_in_db, list_tags_with_counts_in_db,
        list_users_with_counts_in_db, move_hero_image_in_db, recent_activities_in_db,
        recent_users_in_db, record_activity_in_db, reorder_hero_images_in_db,
        toggle_hero_image_active_in_db, update_tag_in_db, update_user_role_in_db, NewActivity,
        DEFAULT_TAG_COLOR,
    },
    errors::RequestError,
    models::{ActivityType, PublishStatus, Role, TargetType},
    uploads::{discard_image, store_image, MultipartForm, UploadError, UploadKind},
    AppState,
};

use super::JsonResult;

const RECENT_USERS: i64 = 5;
const RECENT_ACTIVITIES: i64 = 10;
const ACTIVITY_FEED_SIZE: i64 = 50;

fn hero_paths() -> [&'static str; 2] {
    ["/admin/hero-images", "/"]
}

/// Tag names end up in comma separated lists, so commas are not allowed.
pub fn validate_tag_name(name: &str) -> Result<&str, RequestError> {
    let name = name.trim();
    if name.is_empty() {
        return Err(RequestError::validation("Tag name is required"));
    }
    if name.contains(',') {
        return Err(RequestError::validation("Tag name must not contain commas"));
    }
    Ok(name)
}

// ----------------- Dashboard Handlers -----------------
pub async fn dashboard(
    State(state): State<AppState>,
    AdminUser(_admin): AdminUser,
) -> JsonResult<DashboardResponse> {
    let stats = dashboard_counts_in_db(&state.pool).await?.into();
    let recent_users = recent_users_in_db(&state.pool, RECENT_USERS)
        .await?
        .into_iter()
        .map(ProfileResponse::new)
        .collect();
    let recent_activities = recent_activities_in_db(&state.pool, RECENT_ACTIVITIES)
        .await?
        .into_iter()
        .map(ActivityResponse::from)
        .collect();
    Ok(Json(DashboardResponse {
        stats,
        recent_users,
        recent_activities,
    }))
}

pub async fn list_activities(
    State(state): State<AppState>,
    AdminUser(_admin): AdminUser,
) -> JsonResult<ActivityListResponse> {
    let activities = recent_activities_in_db(&state.pool, ACTIVITY_FEED_SIZE)
        .await?
        .into_iter()
        .map(ActivityResponse::from)
        .collect();
    Ok(Json(ActivityListResponse { activities }))
}

// ----------------- User Management Handlers -----------------
pub async fn list_users(
    State(state): State<AppState>,
    AdminUser(_admin): AdminUser,
) -> JsonResult<UserListResponse> {
    let users = list_users_with_counts_in_db(&state.pool)
        .await?
        .into_iter()
        .map(AdminUserResponse::from)
        .collect();
    Ok(Json(UserListResponse { users }))
}

pub async fn change_user_role(
    State(state): State<AppState>,
    AdminUser(admin): AdminUser,
    Path(user_id): Path<i64>,
    Json(RoleRequest { role }): Json<RoleRequest>,
) -> JsonResult<ActionResponse> {
    if user_id == admin.id {
        return Err(RequestError::Forbidden("You cannot change your own role"));
    }
    let user = update_user_role_in_db(&state.pool, user_id, role).await?;

    let (action_type, description) = match role {
        Role::Admin => (ActivityType::PromoteUser, "Promoted user to admin"),
        Role::General => (ActivityType::DemoteUser, "Demoted user to general"),
    };
    record_activity_in_db(
        &state.pool,
        NewActivity {
            admin_id: admin.id,
            action_type,
            target_type: TargetType::User,
            target_id: user.id,
            target_name: &user.display_name(),
            description: description.to_string(),
        },
    )
    .await?;
    Ok(Json(ActionResponse::ok(["/admin/users"])))
}

pub async fn delete_user(
    State(state): State<AppState>,
    AdminUser(admin): AdminUser,
    Path(user_id): Path<i64>,
) -> JsonResult<ActionResponse> {
    if user_id == admin.id {
        return Err(RequestError::Forbidden("You cannot delete your own account"));
    }
    let user = get_user_by_id(&state.pool, user_id)
        .await?
        .ok_or(RequestError::NotFound("User not found"))?;

    let covers = delete_user_in_db(&state.pool, user_id).await?;
    let upload_root = &state.config.upload_root;
    for url in &covers {
        discard_image(upload_root, UploadKind::Article, url).await;
    }
    if let Some(avatar) = &user.avatar_url {
        discard_image(upload_root, UploadKind::Avatar, avatar).await;
    }

    record_activity_in_db(
        &state.pool,
        NewActivity {
            admin_id: admin.id,
            action_type: ActivityType::DeleteUser,
            target_type: TargetType::User,
            target_id: user.id,
            target_name: &user.display_name(),
            description: format!("Deleted user {}", user.email),
        },
    )
    .await?;
    Ok(Json(ActionResponse::ok(["/admin/users", "/"])))
}

// ----------------- Tag Management Handlers -----------------
pub async fn list_tags(
    State(state): State<AppState>,
    AdminUser(_admin): AdminUser,
) -> JsonResult<TagListResponse> {
    let tags = list_tags_with_counts_in_db(&state.pool)
        .await?
        .into_iter()
        .map(TagResponse::from)
        .collect();
    Ok(Json(TagListResponse { tags }))
}

pub async fn create_tag(
    State(state): State<AppState>,
    AdminUser(_admin): AdminUser,
    Json(request): Json<TagRequest>,
) -> JsonResult<TagResponse> {
    let name = validate_tag_name(&request.name)?;
    let color = request.color.as_deref().unwrap_or(DEFAULT_TAG_COLOR);
    let tag = create_tag_in_db(
        &state.pool,
        name,
        color,
        request.status.unwrap_or(PublishStatus::Published),
    )
    .await?;
    Ok(Json(tag.into()))
}

pub async fn update_tag(
    State(state): State<AppState>,
    AdminUser(admin): AdminUser,
    Path(tag_id): Path<i64>,
    Json(request): Json<TagRequest>,
) -> JsonResult<TagResponse> {
    let name = validate_tag_name(&request.name)?;
    let existing = get_tag_in_db(&state.pool, tag_id)
        .await?
        .ok_or(RequestError::NotFound("Tag not found"))?;
    let color = request.color.as_deref().unwrap_or(&existing.color);
    let tag = update_tag_in_db(
        &state.pool,
        tag_id,
        name,
        color,
        request.status.unwrap_or(existing.status),
    )
    .await?;

    record_activity_in_db(
        &state.pool,
        NewActivity {
            admin_id: admin.id,
            action_type: ActivityType::UpdateTag,
            target_type: TargetType::Tag,
            target_id: tag.id,
            target_name: &tag.name,
            description: format!("Updated tag {} (was {})", tag.name, existing.name),
        },
    )
    .await?;
    Ok(Json(tag.into()))
}

pub async fn delete_tag(
    State(state): State<AppState>,
    AdminUser(admin): AdminUser,
    Path(tag_id): Path<i64>,
) -> JsonResult<ActionResponse> {
    let tag = get_tag_in_db(&state.pool, tag_id)
        .await?
        .ok_or(RequestError::NotFound("Tag not found"))?;
    delete_tag_in_db(&state.pool, tag_id).await?;

    record_activity_in_db(
        &state.pool,
        NewActivity {
            admin_id: admin.id,
            action_type: ActivityType::DeleteTag,
            target_type: TargetType::Tag,
            target_id: tag.id,
            target_name: &tag.name,
            description: format!("Deleted tag {}", tag.name),
        },
    )
    .await?;
    Ok(Json(ActionResponse::ok(["/admin/tags", "/"])))
}

// ----------------- Hero Image Handlers -----------------
pub async fn list_hero_images(
    State(state): State<AppState>,
    AdminUser(_admin): AdminUser,
) -> JsonResult<HeroImageListResponse> {
    let hero_images = list_hero_images_in_db(&state.pool, false)
        .await?
        .into_iter()
        .map(HeroImageResponse::from)
        .collect();
    Ok(Json(HeroImageListResponse { hero_images }))
}

pub async fn upload_hero_image(
    State(state): State<AppState>,
    AdminUser(admin): AdminUser,
    multipart: Multipart,
) -> JsonResult<ActionResponse> {
    let form = MultipartForm::read(multipart).await?;
    let upload = form
        .file("image")
        .ok_or(RequestError::Upload(UploadError::Empty))?;
    let upload_root = &state.config.upload_root;
    let url = store_image(upload_root, UploadKind::Hero, admin.id, upload).await?;

    match create_hero_image_in_db(&state.pool, &url).await {
        Ok(image) => {
            tracing::info!(hero_image_id = image.id, "Hero image added");
            Ok(Json(ActionResponse::ok(hero_paths()).with_url(url)))
        }
        Err(e) => {
            discard_image(upload_root, UploadKind::Hero, &url).await;
            Err(e)
        }
    }
}

pub async fn delete_hero_image(
    State(state): State<AppState>,
    AdminUser(_admin): AdminUser,
    Path(image_id): Path<i64>,
) -> JsonResult<ActionResponse> {
    let image = get_hero_image_in_db(&state.pool, image_id)
        .await?
        .ok_or(RequestError::NotFound("Hero image not found"))?;
    discard_image(&state.config.upload_root, UploadKind::Hero, &image.url).await;
    delete_hero_image_in_db(&state.pool, image_id).await?;
    Ok(Json(ActionResponse::ok(hero_paths())))
}

pub async fn toggle_hero_image(
    State(state): State<AppState>,
    AdminUser(_admin): AdminUser,
    Path(image_id): Path<i64>,
) -> JsonResult<ActionResponse> {
    let image = toggle_hero_image_active_in_db(&state.pool, image_id).await?;
    tracing::debug!(hero_image_id = image.id, is_active = image.is_active, "Hero image toggled");
    Ok(Json(ActionResponse::ok(hero_paths())))
}

pub async fn reorder_hero_images(
    State(state): State<AppState>,
    AdminUser(_admin): AdminUser,
    Json(entries): Json<Vec<HeroOrderEntry>>,
) -> JsonResult<ActionResponse> {
    let orders: Vec<(i64, i64)> = entries.iter().map(|entry| (entry.id, entry.order)).collect();
    reorder_hero_images_in_db(&state.pool, &orders).await?;
    Ok(Json(ActionResponse::ok(hero_paths())))
}

pub async fn move_hero_image(
    State(state): State<AppState>,
    AdminUser(_admin): AdminUser,
    Path(image_id): Path<i64>,
    Json(MoveRequest { direction }): Json<MoveRequest>,
) -> JsonResult<ActionResponse> {
    move_hero_image_in_db(&state.pool, image_id, direction).await?;
    Ok(Json(ActionResponse::ok(hero_paths())))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn tag_names_are_trimmed_and_checked() {
        assert_eq!(validate_tag_name("  Rust ").unwrap(), "Rust");
        assert!(validate_tag_name("   ").is_err());
        assert!(validate_tag_name("a,b").is_err());
    }
}
