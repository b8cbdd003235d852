use axum::{
    extract::{Path, State},
    Json,
};

use crate::{
    authentication::{AuthUser, MaybeUser},
    data_formats::{ActionResponse, CommentRequest, CommentResponse},
    db_helpers::{
        add_comment_to_article_in_db, delete_comment_in_db, get_comment_in_db, get_user_by_id,
        list_article_comments_in_db, record_activity_in_db, NewActivity,
    },
    errors::RequestError,
    models::{ActivityType, TargetType},
    AppState,
};

use super::{article_path, visible_article, JsonResult};

pub const MAX_COMMENT_CHARS: usize = 2000;

/// Trimmed comment body, or the reason it cannot be posted. The length limit
/// applies to the text as submitted.
pub fn validate_comment(content: &str) -> Result<&str, RequestError> {
    let trimmed = content.trim();
    if trimmed.is_empty() {
        return Err(RequestError::validation("Comment content is required"));
    }
    if content.chars().count() > MAX_COMMENT_CHARS {
        return Err(RequestError::validation(format!(
            "Comments must be {MAX_COMMENT_CHARS} characters or fewer"
        )));
    }
    Ok(trimmed)
}

// ----------------- Comment Handlers -----------------
pub async fn list_comments(
    State(state): State<AppState>,
    MaybeUser(session): MaybeUser,
    Path(article_id): Path<i64>,
) -> JsonResult<Vec<CommentResponse>> {
    visible_article(&state, article_id, session.map(|s| s.user_id)).await?;
    let comments = list_article_comments_in_db(&state.pool, article_id)
        .await?
        .into_iter()
        .map(CommentResponse::new)
        .collect();
    Ok(Json(comments))
}

pub async fn add_comment(
    State(state): State<AppState>,
    AuthUser(session): AuthUser,
    Path(article_id): Path<i64>,
    Json(request): Json<CommentRequest>,
) -> JsonResult<ActionResponse> {
    let content = validate_comment(&request.content)?;
    visible_article(&state, article_id, Some(session.user_id)).await?;
    let comment = add_comment_to_article_in_db(&state.pool, session.user_id, article_id, content).await?;
    tracing::info!(comment_id = comment.id, article_id, author_id = session.user_id, "Comment posted");
    Ok(Json(ActionResponse::ok([article_path(article_id)])))
}

/// Authors may delete their own comments; admins may delete any.
pub async fn delete_comment(
    State(state): State<AppState>,
    AuthUser(session): AuthUser,
    Path(comment_id): Path<i64>,
) -> JsonResult<ActionResponse> {
    let comment = get_comment_in_db(&state.pool, comment_id)
        .await?
        .ok_or(RequestError::NotFound("Comment not found"))?;

    let moderator = if comment.author_id == session.user_id {
        None
    } else {
        match get_user_by_id(&state.pool, session.user_id).await? {
            Some(user) if user.is_admin() => Some(user),
            _ => return Err(RequestError::permission_denied()),
        }
    };

    delete_comment_in_db(&state.pool, comment_id).await?;

    if let Some(admin) = moderator {
        let target_name: String = comment.content.chars().take(50).collect();
        record_activity_in_db(
            &state.pool,
            NewActivity {
                admin_id: admin.id,
                action_type: ActivityType::DeleteComment,
                target_type: TargetType::Comment,
                target_id: comment.id,
                target_name: &target_name,
                description: format!("Deleted a comment on article #{}", comment.article_id),
            },
        )
        .await?;
    }

    tracing::info!(comment_id, user_id = session.user_id, "Comment deleted");
    Ok(Json(ActionResponse::ok([article_path(comment.article_id)])))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn comment_length_boundary() {
        assert!(validate_comment(&"a".repeat(MAX_COMMENT_CHARS)).is_ok());
        assert!(validate_comment(&"a".repeat(MAX_COMMENT_CHARS + 1)).is_err());
        // Characters, not bytes.
        assert!(validate_comment(&"字".repeat(MAX_COMMENT_CHARS)).is_ok());
    }

    #[test]
    fn blank_comments_are_rejected_and_content_is_trimmed() {
        assert!(validate_comment("   \n").is_err());
        assert_eq!(validate_comment("  nice post \n").unwrap(), "nice post");
    }
}
