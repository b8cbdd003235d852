use chrono::Utc;
use sqlx::{Sqlite, SqliteConnection, SqlitePool};

use crate::{
    errors::RequestError,
    models::{Article, ArticleCard, PublishStatus},
};

use super::find_or_create_tag;

pub const ARTICLE_PAGE_SIZE: i64 = 20;

const ARTICLE_COLUMNS: &str = "id, title, content, excerpt, cover_image_url, status, published_at, \
     views, likes, author_id, created_at, updated_at";

const ARTICLE_CARD_QUERY: &str = r#"
            SELECT articles.id                                          AS "id",
                   articles.title                                       AS "title",
                   articles.content                                     AS "content",
                   articles.excerpt                                     AS "excerpt",
                   articles.cover_image_url                             AS "cover_image_url",
                   articles.status                                      AS "status",
                   articles.published_at                                AS "published_at",
                   articles.views                                       AS "views",
                   articles.likes                                       AS "likes",
                   articles.author_id                                   AS "author_id",
                   articles.created_at                                  AS "created_at",
                   articles.updated_at                                  AS "updated_at",
                   (SELECT Group_concat(tags.name, ',')
                    FROM   tags
                           JOIN article_tags
                             ON article_tags.tag_id = tags.id
                    WHERE  article_tags.article_id = articles.id)       AS "tag_list",
                   (SELECT Count(*)
                    FROM   bookmarks
                    WHERE  bookmarks.article_id = articles.id)          AS "bookmark_count",
                   users.nickname                                       AS "author_nickname",
                   users.first_name                                     AS "author_first_name",
                   users.last_name                                      AS "author_last_name",
                   users.avatar_url                                     AS "author_avatar_url"
            FROM   articles
                   JOIN users
                     ON articles.author_id = users.id
"#;

const LIST_FILTER: &str = r#"
            WHERE  articles.status = $1
                   AND ( $2 IS NULL
                          OR EXISTS (SELECT 1
                                     FROM   article_tags
                                            JOIN tags
                                              ON tags.id = article_tags.tag_id
                                     WHERE  article_tags.article_id = articles.id
                                            AND tags.name = $2) )
                   AND ( $3 IS NULL
                          OR Instr(articles.search_title, $3) > 0
                          OR Instr(articles.search_excerpt, $3) > 0 )
"#;

/// Order of the public article listing.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, serde::Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ArticleSort {
    #[default]
    Latest,
    Ranking,
}

impl ArticleSort {
    fn order_by(&self) -> &'static str {
        match self {
            ArticleSort::Latest => "ORDER BY articles.created_at DESC, articles.id DESC",
            ArticleSort::Ranking => "ORDER BY articles.views DESC, articles.created_at DESC, articles.id DESC",
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct ArticleFilter {
    pub tag: Option<String>,
    pub search: Option<String>,
    pub sort: ArticleSort,
    pub skip: i64,
    pub take: i64,
}

pub struct NewArticle {
    pub title: String,
    pub content: String,
    pub excerpt: String,
    pub cover_image_url: Option<String>,
    pub status: PublishStatus,
    pub tags: Vec<String>,
}

/// New values for an existing article. A `None` cover keeps the current one.
pub struct ArticleChanges {
    pub title: String,
    pub content: String,
    pub excerpt: String,
    pub cover_image_url: Option<String>,
    pub status: PublishStatus,
    pub tags: Vec<String>,
}

/// Case-folded copy of a searchable field. SQLite's `lower()` only folds
/// ASCII, so the folding happens here and the search compares folded text.
fn fold_for_search(text: &str) -> String {
    text.to_lowercase()
}

async fn link_tags(
    conn: &mut SqliteConnection,
    article_id: i64,
    tags: &[String],
) -> Result<(), RequestError> {
    for name in tags {
        let tag_id = find_or_create_tag(&mut *conn, name).await?;
        sqlx::query("INSERT OR IGNORE INTO article_tags (article_id, tag_id) VALUES ($1, $2)")
            .bind(article_id)
            .bind(tag_id)
            .execute(&mut *conn)
            .await?;
    }
    Ok(())
}

pub async fn create_article_in_db(
    pool: &SqlitePool,
    author_id: i64,
    article: NewArticle,
) -> Result<Article, RequestError> {
    let mut tx = pool.begin().await?;
    let now = Utc::now();
    let published_at = (article.status == PublishStatus::Published).then_some(now);

    let query = format!(
        "INSERT INTO articles (title, content, excerpt, cover_image_url, status, published_at, author_id,
                               created_at, updated_at, search_title, search_excerpt)
         VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $8, $9, $10)
         RETURNING {ARTICLE_COLUMNS}"
    );
    let created = sqlx::query_as::<Sqlite, Article>(&query)
        .bind(&article.title)
        .bind(&article.content)
        .bind(&article.excerpt)
        .bind(&article.cover_image_url)
        .bind(article.status)
        .bind(published_at)
        .bind(author_id)
        .bind(now)
        .bind(fold_for_search(&article.title))
        .bind(fold_for_search(&article.excerpt))
        .fetch_one(&mut *tx)
        .await?;

    link_tags(&mut tx, created.id, &article.tags).await?;
    tx.commit().await?;
    Ok(created)
}

/// Update the row and fully replace its tag links in one transaction.
/// `published_at` is only filled the first time the article becomes published.
pub async fn update_article_in_db(
    pool: &SqlitePool,
    article_id: i64,
    changes: ArticleChanges,
) -> Result<Article, RequestError> {
    let mut tx = pool.begin().await?;

    let query = format!(
        "UPDATE articles
         SET title = $1, content = $2, excerpt = $3,
             cover_image_url = COALESCE($4, cover_image_url),
             status = $5,
             published_at = CASE
                 WHEN published_at IS NULL AND $5 = 'published' THEN $6
                 ELSE published_at
             END,
             updated_at = $6,
             search_title = $8,
             search_excerpt = $9
         WHERE id = $7
         RETURNING {ARTICLE_COLUMNS}"
    );
    let updated = sqlx::query_as::<Sqlite, Article>(&query)
        .bind(&changes.title)
        .bind(&changes.content)
        .bind(&changes.excerpt)
        .bind(&changes.cover_image_url)
        .bind(changes.status)
        .bind(Utc::now())
        .bind(article_id)
        .bind(fold_for_search(&changes.title))
        .bind(fold_for_search(&changes.excerpt))
        .fetch_optional(&mut *tx)
        .await?
        .ok_or(RequestError::NotFound("Article not found"))?;

    sqlx::query("DELETE FROM article_tags WHERE article_id = $1")
        .bind(article_id)
        .execute(&mut *tx)
        .await?;
    link_tags(&mut tx, article_id, &changes.tags).await?;

    tx.commit().await?;
    Ok(updated)
}

pub async fn delete_article_in_db(pool: &SqlitePool, article_id: i64) -> Result<(), RequestError> {
    let result = sqlx::query("DELETE FROM articles WHERE id = $1")
        .bind(article_id)
        .execute(pool)
        .await?;
    if result.rows_affected() == 0 {
        return Err(RequestError::NotFound("Article not found"));
    }
    Ok(())
}

pub async fn get_article_in_db(pool: &SqlitePool, article_id: i64) -> Result<Option<Article>, RequestError> {
    let query = format!("SELECT {ARTICLE_COLUMNS} FROM articles WHERE id = $1");
    let result = sqlx::query_as::<Sqlite, Article>(&query)
        .bind(article_id)
        .fetch_optional(pool)
        .await?;
    Ok(result)
}

pub async fn get_article_card_in_db(
    pool: &SqlitePool,
    article_id: i64,
) -> Result<Option<ArticleCard>, RequestError> {
    let query = format!("{ARTICLE_CARD_QUERY} WHERE articles.id = $1");
    let result = sqlx::query_as::<Sqlite, ArticleCard>(&query)
        .bind(article_id)
        .fetch_optional(pool)
        .await?;
    Ok(result)
}

/// One page of published articles and the total number matching the filter.
pub async fn list_published_articles_in_db(
    pool: &SqlitePool,
    filter: &ArticleFilter,
) -> Result<(Vec<ArticleCard>, i64), RequestError> {
    let pattern = filter.search.as_deref().map(fold_for_search);

    let query = format!(
        "{ARTICLE_CARD_QUERY} {LIST_FILTER} {} LIMIT $4 OFFSET $5",
        filter.sort.order_by()
    );
    let articles = sqlx::query_as::<Sqlite, ArticleCard>(&query)
        .bind(PublishStatus::Published)
        .bind(&filter.tag)
        .bind(&pattern)
        .bind(filter.take)
        .bind(filter.skip)
        .fetch_all(pool)
        .await?;

    let count_query = format!("SELECT Count(*) FROM articles {LIST_FILTER}");
    let (total,): (i64,) = sqlx::query_as(&count_query)
        .bind(PublishStatus::Published)
        .bind(&filter.tag)
        .bind(&pattern)
        .fetch_one(pool)
        .await?;

    Ok((articles, total))
}

/// An author's articles, newest first. Drafts are included unless
/// `published_only` is set.
pub async fn list_articles_by_author_in_db(
    pool: &SqlitePool,
    author_id: i64,
    published_only: bool,
) -> Result<Vec<ArticleCard>, RequestError> {
    let query = format!(
        "{ARTICLE_CARD_QUERY}
         WHERE articles.author_id = $1 AND ($2 = 0 OR articles.status = 'published')
         ORDER BY articles.created_at DESC, articles.id DESC"
    );
    let result = sqlx::query_as::<Sqlite, ArticleCard>(&query)
        .bind(author_id)
        .bind(published_only)
        .fetch_all(pool)
        .await?;
    Ok(result)
}

/// A user's bookmarks, newest first. Other authors' drafts are left out.
pub async fn list_bookmarked_articles_in_db(
    pool: &SqlitePool,
    user_id: i64,
) -> Result<Vec<ArticleCard>, RequestError> {
    let query = format!(
        "{ARTICLE_CARD_QUERY}
             JOIN bookmarks
               ON bookmarks.article_id = articles.id
         WHERE bookmarks.user_id = $1
               AND (articles.status = 'published' OR articles.author_id = $1)
         ORDER BY bookmarks.created_at DESC, articles.id DESC"
    );
    let result = sqlx::query_as::<Sqlite, ArticleCard>(&query)
        .bind(user_id)
        .fetch_all(pool)
        .await?;
    Ok(result)
}

pub async fn get_article_tag_names_in_db(
    pool: &SqlitePool,
    article_id: i64,
) -> Result<Vec<String>, RequestError> {
    let result: Vec<(String,)> = sqlx::query_as(
        "SELECT tags.name FROM tags
         JOIN article_tags ON article_tags.tag_id = tags.id
         WHERE article_tags.article_id = $1
         ORDER BY tags.name",
    )
    .bind(article_id)
    .fetch_all(pool)
    .await?;
    Ok(result.into_iter().map(|(name,)| name).collect())
}
