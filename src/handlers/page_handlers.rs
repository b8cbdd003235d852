use axum::{
    extract::{Path, State},
    Json,
};

use crate::{
    authentication::{AuthUser, MaybeUser},
    data_formats::{
        ArticleCardResponse, ArticleDetailResponse, ArticleListResponse, ArticleQueryParams,
        CommentResponse, CurrentUserResponse, EditArticleResponse, HeroImageResponse,
        HomePageResponse, MyPageResponse, ProfilePageResponse, ProfileResponse, TagListResponse,
        TagResponse,
    },
    db_helpers::{
        get_article_card_in_db, get_article_in_db, get_article_tag_names_in_db, get_user_by_id,
        is_bookmarked_in_db, list_article_comments_in_db, list_articles_by_author_in_db,
        list_bookmarked_articles_in_db, list_hero_images_in_db, list_published_articles_in_db,
        list_published_tags_in_db,
    },
    errors::RequestError,
    markdown::render_markdown,
    models::ArticleCard,
    AppState,
};

use super::JsonResult;

fn cards(articles: Vec<ArticleCard>) -> Vec<ArticleCardResponse> {
    articles.into_iter().map(ArticleCardResponse::new).collect()
}

// ----------------- Public Pages -----------------
pub async fn home_page(State(state): State<AppState>) -> JsonResult<HomePageResponse> {
    let hero_images = list_hero_images_in_db(&state.pool, true)
        .await?
        .into_iter()
        .map(HeroImageResponse::from)
        .collect();
    let filter = ArticleQueryParams::default().into_filter();
    let (articles, total) = list_published_articles_in_db(&state.pool, &filter).await?;
    Ok(Json(HomePageResponse {
        hero_images,
        list: ArticleListResponse::new(cards(articles), total, filter.skip, filter.take),
    }))
}

/// Drafts are only visible to their author.
pub async fn article_page(
    State(state): State<AppState>,
    MaybeUser(session): MaybeUser,
    Path(article_id): Path<i64>,
) -> JsonResult<ArticleDetailResponse> {
    let card = get_article_card_in_db(&state.pool, article_id)
        .await?
        .ok_or(RequestError::NotFound("Article not found"))?;
    let viewer_id = session.as_ref().map(|s| s.user_id);
    if !card.is_visible_to(viewer_id) {
        return Err(RequestError::NotFound("Article not found"));
    }
    let is_author = viewer_id == Some(card.author_id);

    let (is_admin, is_bookmarked) = match viewer_id {
        Some(user_id) => {
            let viewer = get_user_by_id(&state.pool, user_id).await?;
            (
                viewer.is_some_and(|user| user.is_admin()),
                is_bookmarked_in_db(&state.pool, user_id, article_id).await?,
            )
        }
        None => (false, false),
    };
    let comments = list_article_comments_in_db(&state.pool, article_id)
        .await?
        .into_iter()
        .map(CommentResponse::new)
        .collect();

    let content = card.content.clone();
    Ok(Json(ArticleDetailResponse {
        content_html: render_markdown(&content),
        content,
        card: ArticleCardResponse::new(card),
        comments,
        is_author,
        is_admin,
        is_bookmarked,
    }))
}

pub async fn profile_page(
    State(state): State<AppState>,
    Path(user_id): Path<i64>,
) -> JsonResult<ProfilePageResponse> {
    let user = get_user_by_id(&state.pool, user_id)
        .await?
        .ok_or(RequestError::NotFound("User not found"))?;
    let articles = list_articles_by_author_in_db(&state.pool, user_id, true).await?;
    Ok(Json(ProfilePageResponse {
        user: ProfileResponse::new(user),
        articles: cards(articles),
    }))
}

// ----------------- Signed-in Pages -----------------
pub async fn my_page(
    State(state): State<AppState>,
    AuthUser(session): AuthUser,
) -> JsonResult<MyPageResponse> {
    let user = get_user_by_id(&state.pool, session.user_id)
        .await?
        .ok_or(RequestError::NotAuthorized)?;
    let articles = list_articles_by_author_in_db(&state.pool, user.id, false).await?;
    let bookmarks = list_bookmarked_articles_in_db(&state.pool, user.id).await?;
    Ok(Json(MyPageResponse {
        user: CurrentUserResponse::new(user),
        articles: cards(articles),
        bookmarks: cards(bookmarks),
    }))
}

/// Data for the new-article editor: the tags authors can pick from.
pub async fn new_post_page(
    State(state): State<AppState>,
    AuthUser(_session): AuthUser,
) -> JsonResult<TagListResponse> {
    let tags = list_published_tags_in_db(&state.pool)
        .await?
        .into_iter()
        .map(TagResponse::from)
        .collect();
    Ok(Json(TagListResponse { tags }))
}

pub async fn edit_post_page(
    State(state): State<AppState>,
    AuthUser(session): AuthUser,
    Path(article_id): Path<i64>,
) -> JsonResult<EditArticleResponse> {
    let article = get_article_in_db(&state.pool, article_id)
        .await?
        .ok_or(RequestError::NotFound("Article not found"))?;
    if article.author_id != session.user_id {
        return Err(RequestError::permission_denied());
    }
    let tags = get_article_tag_names_in_db(&state.pool, article_id).await?;
    Ok(Json(EditArticleResponse {
        id: article.id,
        title: article.title,
        content: article.content,
        cover_image_url: article.cover_image_url,
        status: article.status,
        tags,
    }))
}
