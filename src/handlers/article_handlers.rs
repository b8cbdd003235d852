use axum::{
    extract::{Multipart, Path, Query, State},
    Json,
};

use crate::{
    authentication::AuthUser,
    data_formats::{
        derive_excerpt, ActionResponse, ArticleCardResponse, ArticleListResponse,
        ArticleQueryParams, BookmarkResponse, UploadResponse,
    },
    db_helpers::{
        create_article_in_db, delete_article_in_db, get_article_in_db, get_user_by_id,
        list_published_articles_in_db, parse_tag_list, record_activity_in_db,
        toggle_bookmark_in_db, update_article_in_db, ArticleChanges, NewActivity, NewArticle,
    },
    errors::RequestError,
    models::{ActivityType, Article, PublishStatus, TargetType},
    uploads::{discard_image, store_image, MultipartForm, UploadError, UploadKind},
    AppState,
};

use super::{article_path, profile_path, visible_article, JsonResult};

/// Title, content, status and tags shared by the create and update forms.
struct ArticleFields {
    title: String,
    content: String,
    status: PublishStatus,
    tags: Vec<String>,
}

impl ArticleFields {
    fn from_form(form: &MultipartForm, default_status: PublishStatus) -> Result<Self, RequestError> {
        // Content is stored as written; only the title is trimmed.
        let content = form.text("content").filter(|content| !content.trim().is_empty());
        let (Some(title), Some(content)) = (form.non_empty("title"), content) else {
            return Err(RequestError::validation("Title and content are required"));
        };
        let status = match form.non_empty("status") {
            Some(raw) => raw.parse().map_err(RequestError::validation)?,
            None => default_status,
        };
        Ok(ArticleFields {
            title: title.to_owned(),
            content: content.to_owned(),
            status,
            tags: parse_tag_list(form.text("tags").unwrap_or_default()),
        })
    }
}

async fn owned_article(state: &AppState, article_id: i64, user_id: i64) -> Result<Article, RequestError> {
    let article = get_article_in_db(&state.pool, article_id)
        .await?
        .ok_or(RequestError::NotFound("Article not found"))?;
    if article.author_id != user_id {
        return Err(RequestError::permission_denied());
    }
    Ok(article)
}

// ----------------- Article Handlers -----------------
pub async fn list_articles(
    State(state): State<AppState>,
    Query(params): Query<ArticleQueryParams>,
) -> JsonResult<ArticleListResponse> {
    let filter = params.into_filter();
    let (articles, total) = list_published_articles_in_db(&state.pool, &filter).await?;
    let articles = articles.into_iter().map(ArticleCardResponse::new).collect();
    Ok(Json(ArticleListResponse::new(articles, total, filter.skip, filter.take)))
}

pub async fn create_article(
    State(state): State<AppState>,
    AuthUser(session): AuthUser,
    multipart: Multipart,
) -> JsonResult<ActionResponse> {
    let form = MultipartForm::read(multipart).await?;
    let fields = ArticleFields::from_form(&form, PublishStatus::Published)?;
    let upload_root = &state.config.upload_root;

    let cover_image_url = match form.file("coverImage") {
        Some(upload) => Some(store_image(upload_root, UploadKind::Article, session.user_id, upload).await?),
        None => None,
    };

    let result = create_article_in_db(
        &state.pool,
        session.user_id,
        NewArticle {
            excerpt: derive_excerpt(&fields.content),
            title: fields.title,
            content: fields.content,
            cover_image_url: cover_image_url.clone(),
            status: fields.status,
            tags: fields.tags,
        },
    )
    .await;

    let article = match result {
        Ok(article) => article,
        Err(e) => {
            if let Some(url) = &cover_image_url {
                discard_image(upload_root, UploadKind::Article, url).await;
            }
            return Err(e);
        }
    };

    tracing::info!(article_id = article.id, author_id = session.user_id, "Article created");
    Ok(Json(
        ActionResponse::ok(["/".to_string(), "/mypage".to_string(), profile_path(session.user_id)])
            .with_article(article.id),
    ))
}

pub async fn update_article(
    State(state): State<AppState>,
    AuthUser(session): AuthUser,
    Path(article_id): Path<i64>,
    multipart: Multipart,
) -> JsonResult<ActionResponse> {
    let existing = owned_article(&state, article_id, session.user_id).await?;
    let form = MultipartForm::read(multipart).await?;
    let fields = ArticleFields::from_form(&form, existing.status)?;
    let upload_root = &state.config.upload_root;

    let new_cover = match form.file("coverImage") {
        Some(upload) => Some(store_image(upload_root, UploadKind::Article, session.user_id, upload).await?),
        None => None,
    };

    let result = update_article_in_db(
        &state.pool,
        article_id,
        ArticleChanges {
            excerpt: derive_excerpt(&fields.content),
            title: fields.title,
            content: fields.content,
            cover_image_url: new_cover.clone(),
            status: fields.status,
            tags: fields.tags,
        },
    )
    .await;

    if let Err(e) = result {
        if let Some(url) = &new_cover {
            discard_image(upload_root, UploadKind::Article, url).await;
        }
        return Err(e);
    }
    if let (Some(_), Some(old)) = (&new_cover, &existing.cover_image_url) {
        discard_image(upload_root, UploadKind::Article, old).await;
    }

    tracing::info!(article_id, author_id = session.user_id, "Article updated");
    Ok(Json(
        ActionResponse::ok([
            "/".to_string(),
            article_path(article_id),
            "/mypage".to_string(),
            profile_path(session.user_id),
        ])
        .with_article(article_id),
    ))
}

/// Authors may delete their own articles; admins may delete any.
pub async fn delete_article(
    State(state): State<AppState>,
    AuthUser(session): AuthUser,
    Path(article_id): Path<i64>,
) -> JsonResult<ActionResponse> {
    let existing = get_article_in_db(&state.pool, article_id)
        .await?
        .ok_or(RequestError::NotFound("Article not found"))?;

    let moderator = if existing.author_id == session.user_id {
        None
    } else {
        match get_user_by_id(&state.pool, session.user_id).await? {
            Some(user) if user.is_admin() => Some(user),
            _ => return Err(RequestError::permission_denied()),
        }
    };

    if let Some(url) = &existing.cover_image_url {
        discard_image(&state.config.upload_root, UploadKind::Article, url).await;
    }
    delete_article_in_db(&state.pool, article_id).await?;

    if let Some(admin) = moderator {
        record_activity_in_db(
            &state.pool,
            NewActivity {
                admin_id: admin.id,
                action_type: ActivityType::DeleteArticle,
                target_type: TargetType::Article,
                target_id: article_id,
                target_name: &existing.title,
                description: format!("Deleted article \"{}\"", existing.title),
            },
        )
        .await?;
    }

    tracing::info!(article_id, user_id = session.user_id, "Article deleted");
    Ok(Json(ActionResponse::ok([
        "/".to_string(),
        "/mypage".to_string(),
        profile_path(existing.author_id),
    ])))
}

// ----------------- Bookmark Handlers -----------------
pub async fn toggle_bookmark(
    State(state): State<AppState>,
    AuthUser(session): AuthUser,
    Path(article_id): Path<i64>,
) -> JsonResult<BookmarkResponse> {
    visible_article(&state, article_id, Some(session.user_id)).await?;
    let bookmarked = toggle_bookmark_in_db(&state.pool, session.user_id, article_id).await?;
    tracing::debug!(article_id, user_id = session.user_id, bookmarked, "Bookmark toggled");
    Ok(Json(BookmarkResponse { bookmarked }))
}

// ----------------- Upload Handlers -----------------
pub async fn upload_image(
    State(state): State<AppState>,
    AuthUser(session): AuthUser,
    multipart: Multipart,
) -> JsonResult<UploadResponse> {
    let form = MultipartForm::read(multipart).await?;
    let upload = form
        .file("image")
        .ok_or(RequestError::Upload(UploadError::Empty))?;
    let url = store_image(&state.config.upload_root, UploadKind::Article, session.user_id, upload).await?;
    Ok(Json(UploadResponse { url }))
}
