mod common;

use common::{create_user, test_pool};
use quill::{
    db_helpers::{
        add_comment_to_article_in_db, create_article_in_db, create_hero_image_in_db,
        create_tag_in_db, delete_user_in_db, find_or_create_tag, get_article_in_db,
        get_article_tag_names_in_db, is_bookmarked_in_db, list_hero_images_in_db,
        list_published_articles_in_db, move_hero_image_in_db, reorder_hero_images_in_db,
        toggle_bookmark_in_db, update_account_in_db, update_article_in_db, update_tag_in_db,
        ArticleChanges, ArticleFilter, ArticleSort, MoveDirection, NewArticle,
    },
    errors::RequestError,
    models::{Article, PublishStatus},
};
use sqlx::SqlitePool;

fn new_article(title: &str, status: PublishStatus, tags: &[&str]) -> NewArticle {
    NewArticle {
        title: title.to_string(),
        content: format!("# {title}\n\nbody"),
        excerpt: format!("{title}..."),
        cover_image_url: None,
        status,
        tags: tags.iter().map(|t| t.to_string()).collect(),
    }
}

fn changes_from(article: &Article, status: PublishStatus, tags: &[&str]) -> ArticleChanges {
    ArticleChanges {
        title: article.title.clone(),
        content: article.content.clone(),
        excerpt: article.excerpt.clone().unwrap_or_default(),
        cover_image_url: None,
        status,
        tags: tags.iter().map(|t| t.to_string()).collect(),
    }
}

async fn count(pool: &SqlitePool, sql: &str) -> i64 {
    let (n,): (i64,) = sqlx::query_as(sql).fetch_one(pool).await.unwrap();
    n
}

#[tokio::test]
async fn toggling_a_bookmark_twice_restores_the_original_state() {
    let pool = test_pool().await;
    let user = create_user(&pool, "reader@example.com").await;
    let article = create_article_in_db(&pool, user.id, new_article("Hello", PublishStatus::Published, &[]))
        .await
        .unwrap();

    assert!(!is_bookmarked_in_db(&pool, user.id, article.id).await.unwrap());
    assert!(toggle_bookmark_in_db(&pool, user.id, article.id).await.unwrap());
    assert!(is_bookmarked_in_db(&pool, user.id, article.id).await.unwrap());
    assert!(!toggle_bookmark_in_db(&pool, user.id, article.id).await.unwrap());
    assert!(!is_bookmarked_in_db(&pool, user.id, article.id).await.unwrap());
    assert_eq!(count(&pool, "SELECT COUNT(*) FROM bookmarks").await, 0);
}

#[tokio::test]
async fn new_tags_are_created_once_and_reused() {
    let pool = test_pool().await;
    let user = create_user(&pool, "writer@example.com").await;

    let first = create_article_in_db(&pool, user.id, new_article("One", PublishStatus::Published, &["A", "B"]))
        .await
        .unwrap();
    assert_eq!(count(&pool, "SELECT COUNT(*) FROM tags").await, 2);
    assert_eq!(count(&pool, "SELECT COUNT(*) FROM article_tags").await, 2);

    let second = create_article_in_db(&pool, user.id, new_article("Two", PublishStatus::Published, &["A"]))
        .await
        .unwrap();
    assert_eq!(count(&pool, "SELECT COUNT(*) FROM tags").await, 2);
    assert_eq!(
        get_article_tag_names_in_db(&pool, first.id).await.unwrap(),
        vec!["A", "B"]
    );
    assert_eq!(get_article_tag_names_in_db(&pool, second.id).await.unwrap(), vec!["A"]);
}

#[tokio::test]
async fn find_or_create_keeps_an_existing_tag_untouched() {
    let pool = test_pool().await;
    let existing = create_tag_in_db(&pool, "Go", "#00ADD8", PublishStatus::Draft).await.unwrap();

    let mut conn = pool.acquire().await.unwrap();
    let first = find_or_create_tag(&mut *conn, "Go").await.unwrap();
    let second = find_or_create_tag(&mut *conn, "Go").await.unwrap();
    drop(conn);

    assert_eq!(first, existing.id);
    assert_eq!(second, existing.id);
    assert_eq!(count(&pool, "SELECT COUNT(*) FROM tags").await, 1);
    let (color, status): (String, String) = sqlx::query_as("SELECT color, status FROM tags WHERE id = $1")
        .bind(existing.id)
        .fetch_one(&pool)
        .await
        .unwrap();
    assert_eq!(color, "#00ADD8");
    assert_eq!(status, "draft");
}

#[tokio::test]
async fn tag_lookup_is_case_sensitive() {
    let pool = test_pool().await;
    let user = create_user(&pool, "writer@example.com").await;
    create_article_in_db(&pool, user.id, new_article("One", PublishStatus::Published, &["rust", "Rust"]))
        .await
        .unwrap();
    assert_eq!(count(&pool, "SELECT COUNT(*) FROM tags").await, 2);
}

#[tokio::test]
async fn updating_tags_replaces_the_whole_set() {
    let pool = test_pool().await;
    let user = create_user(&pool, "writer@example.com").await;
    let article = create_article_in_db(&pool, user.id, new_article("One", PublishStatus::Published, &["A", "B"]))
        .await
        .unwrap();

    update_article_in_db(&pool, article.id, changes_from(&article, PublishStatus::Published, &["B", "C"]))
        .await
        .unwrap();

    assert_eq!(
        get_article_tag_names_in_db(&pool, article.id).await.unwrap(),
        vec!["B", "C"]
    );
    // The unused tag row stays; only the link goes.
    assert_eq!(count(&pool, "SELECT COUNT(*) FROM tags").await, 3);
    assert_eq!(count(&pool, "SELECT COUNT(*) FROM article_tags").await, 2);
}

#[tokio::test]
async fn published_at_is_set_on_the_first_publish_only() {
    let pool = test_pool().await;
    let user = create_user(&pool, "writer@example.com").await;
    let draft = create_article_in_db(&pool, user.id, new_article("Draft", PublishStatus::Draft, &[]))
        .await
        .unwrap();
    assert!(draft.published_at.is_none());

    let published = update_article_in_db(&pool, draft.id, changes_from(&draft, PublishStatus::Published, &[]))
        .await
        .unwrap();
    let first_published_at = published.published_at.expect("published_at should be set");

    let unpublished = update_article_in_db(&pool, draft.id, changes_from(&draft, PublishStatus::Draft, &[]))
        .await
        .unwrap();
    assert_eq!(unpublished.published_at, Some(first_published_at));

    let republished = update_article_in_db(&pool, draft.id, changes_from(&draft, PublishStatus::Published, &[]))
        .await
        .unwrap();
    assert_eq!(republished.published_at, Some(first_published_at));
}

#[tokio::test]
async fn creating_as_published_sets_published_at() {
    let pool = test_pool().await;
    let user = create_user(&pool, "writer@example.com").await;
    let article = create_article_in_db(&pool, user.id, new_article("Live", PublishStatus::Published, &[]))
        .await
        .unwrap();
    assert!(article.published_at.is_some());
}

#[tokio::test]
async fn deleting_a_user_removes_their_content() {
    let pool = test_pool().await;
    let author = create_user(&pool, "author@example.com").await;
    let other = create_user(&pool, "other@example.com").await;

    let mut with_cover = new_article("Covered", PublishStatus::Published, &["A"]);
    with_cover.cover_image_url = Some("/uploads/articles/1-cover.png".to_string());
    let article = create_article_in_db(&pool, author.id, with_cover).await.unwrap();
    let others_article = create_article_in_db(&pool, other.id, new_article("Theirs", PublishStatus::Published, &[]))
        .await
        .unwrap();

    add_comment_to_article_in_db(&pool, other.id, article.id, "on the author's article").await.unwrap();
    add_comment_to_article_in_db(&pool, author.id, others_article.id, "by the author").await.unwrap();
    toggle_bookmark_in_db(&pool, author.id, others_article.id).await.unwrap();
    toggle_bookmark_in_db(&pool, other.id, article.id).await.unwrap();

    let covers = delete_user_in_db(&pool, author.id).await.unwrap();
    assert_eq!(covers, vec!["/uploads/articles/1-cover.png".to_string()]);

    assert!(get_article_in_db(&pool, article.id).await.unwrap().is_none());
    assert!(get_article_in_db(&pool, others_article.id).await.unwrap().is_some());
    assert_eq!(count(&pool, "SELECT COUNT(*) FROM comments").await, 0);
    assert_eq!(count(&pool, "SELECT COUNT(*) FROM bookmarks").await, 0);
    assert_eq!(count(&pool, "SELECT COUNT(*) FROM article_tags").await, 0);
    assert_eq!(count(&pool, "SELECT COUNT(*) FROM users").await, 1);
}

#[tokio::test]
async fn deleting_a_missing_user_is_not_found() {
    let pool = test_pool().await;
    let result = delete_user_in_db(&pool, 999).await;
    assert!(matches!(result, Err(RequestError::NotFound(_))));
}

#[tokio::test]
async fn tag_names_are_unique() {
    let pool = test_pool().await;
    create_tag_in_db(&pool, "Rust", "#000000", PublishStatus::Published).await.unwrap();
    let other = create_tag_in_db(&pool, "Go", "#ffffff", PublishStatus::Published).await.unwrap();

    let duplicate = create_tag_in_db(&pool, "Rust", "#111111", PublishStatus::Published).await;
    assert!(matches!(duplicate, Err(RequestError::Conflict(_))));

    let renamed = update_tag_in_db(&pool, other.id, "Rust", "#ffffff", PublishStatus::Published).await;
    assert!(matches!(renamed, Err(RequestError::Conflict(_))));

    // Keeping its own name is fine.
    let recolored = update_tag_in_db(&pool, other.id, "Go", "#00ADD8", PublishStatus::Published)
        .await
        .unwrap();
    assert_eq!(recolored.color, "#00ADD8");
}

#[tokio::test]
async fn account_update_keeps_the_password_unless_replaced() {
    let pool = test_pool().await;
    let user = create_user(&pool, "first@example.com").await;
    create_user(&pool, "taken@example.com").await;

    let moved = update_account_in_db(&pool, user.id, "second@example.com".to_string(), None)
        .await
        .unwrap();
    assert_eq!(moved.email, "second@example.com");
    assert_eq!(moved.password, user.password);

    let rehashed = update_account_in_db(
        &pool,
        user.id,
        "second@example.com".to_string(),
        Some("new-hash".to_string()),
    )
    .await
    .unwrap();
    assert_eq!(rehashed.password, "new-hash");

    let taken = update_account_in_db(&pool, user.id, "taken@example.com".to_string(), None).await;
    assert!(matches!(taken, Err(RequestError::Conflict(_))));

    let missing = update_account_in_db(&pool, 9999, "nobody@example.com".to_string(), None).await;
    assert!(matches!(missing, Err(RequestError::NotFound(_))));
}

#[tokio::test]
async fn listing_filters_by_tag_and_search_and_paginates() {
    let pool = test_pool().await;
    let user = create_user(&pool, "writer@example.com").await;
    for i in 0..25 {
        let tags: &[&str] = if i % 5 == 0 { &["Rust"] } else { &[] };
        create_article_in_db(&pool, user.id, new_article(&format!("Post {i}"), PublishStatus::Published, tags))
            .await
            .unwrap();
    }
    create_article_in_db(&pool, user.id, new_article("Secret draft", PublishStatus::Draft, &["Rust"]))
        .await
        .unwrap();

    let first_page = ArticleFilter {
        take: 20,
        ..Default::default()
    };
    let (articles, total) = list_published_articles_in_db(&pool, &first_page).await.unwrap();
    assert_eq!(total, 25);
    assert_eq!(articles.len(), 20);
    assert_eq!(articles[0].title, "Post 24");

    let tagged = ArticleFilter {
        tag: Some("Rust".to_string()),
        take: 20,
        ..Default::default()
    };
    let (articles, total) = list_published_articles_in_db(&pool, &tagged).await.unwrap();
    assert_eq!(total, 5);
    assert!(articles.iter().all(|a| a.tags() == vec!["Rust".to_string()]));

    let searched = ArticleFilter {
        search: Some("POST 1".to_string()),
        sort: ArticleSort::Ranking,
        take: 20,
        ..Default::default()
    };
    let (_, total) = list_published_articles_in_db(&pool, &searched).await.unwrap();
    // "Post 1" and "Post 10" through "Post 19".
    assert_eq!(total, 11);
}

#[tokio::test]
async fn search_folds_non_ascii_case_and_treats_wildcards_literally() {
    let pool = test_pool().await;
    let user = create_user(&pool, "writer@example.com").await;
    for title in ["École notes", "plain title", "100% coverage", "snake_case tips"] {
        create_article_in_db(&pool, user.id, new_article(title, PublishStatus::Published, &[]))
            .await
            .unwrap();
    }
    let search = |text: &str| ArticleFilter {
        search: Some(text.to_string()),
        take: 20,
        ..Default::default()
    };

    for text in ["École", "école", "ÉCOLE"] {
        let (articles, total) = list_published_articles_in_db(&pool, &search(text)).await.unwrap();
        assert_eq!(total, 1, "{text}");
        assert_eq!(articles[0].title, "École notes");
    }

    let (articles, total) = list_published_articles_in_db(&pool, &search("%")).await.unwrap();
    assert_eq!(total, 1);
    assert_eq!(articles[0].title, "100% coverage");

    let (articles, total) = list_published_articles_in_db(&pool, &search("_")).await.unwrap();
    assert_eq!(total, 1);
    assert_eq!(articles[0].title, "snake_case tips");
}

#[tokio::test]
async fn search_follows_title_changes() {
    let pool = test_pool().await;
    let user = create_user(&pool, "writer@example.com").await;
    let article = create_article_in_db(&pool, user.id, new_article("Draft title", PublishStatus::Published, &[]))
        .await
        .unwrap();
    let mut changes = changes_from(&article, PublishStatus::Published, &[]);
    changes.title = "Über Rust".to_string();
    update_article_in_db(&pool, article.id, changes).await.unwrap();

    let filter = |text: &str| ArticleFilter {
        search: Some(text.to_string()),
        take: 20,
        ..Default::default()
    };
    let (_, total) = list_published_articles_in_db(&pool, &filter("über")).await.unwrap();
    assert_eq!(total, 1);
    let (_, total) = list_published_articles_in_db(&pool, &filter("draft title")).await.unwrap();
    // The stored excerpt still reads "Draft title...".
    assert_eq!(total, 1);
    let (_, total) = list_published_articles_in_db(&pool, &filter("nothing like it")).await.unwrap();
    assert_eq!(total, 0);
}

#[tokio::test]
async fn hero_images_are_appended_in_order() {
    let pool = test_pool().await;
    let first = create_hero_image_in_db(&pool, "/uploads/hero/hero-a.png").await.unwrap();
    let second = create_hero_image_in_db(&pool, "/uploads/hero/hero-b.png").await.unwrap();
    assert_eq!(first.sort_order, 0);
    assert_eq!(second.sort_order, 1);
    assert!(first.is_active && second.is_active);
}

#[tokio::test]
async fn hero_reorder_is_all_or_nothing() {
    let pool = test_pool().await;
    let a = create_hero_image_in_db(&pool, "/uploads/hero/hero-a.png").await.unwrap();
    let b = create_hero_image_in_db(&pool, "/uploads/hero/hero-b.png").await.unwrap();

    let result = reorder_hero_images_in_db(&pool, &[(a.id, 5), (9999, 0)]).await;
    assert!(result.is_err());
    let ids: Vec<i64> = list_hero_images_in_db(&pool, false).await.unwrap().iter().map(|i| i.id).collect();
    assert_eq!(ids, vec![a.id, b.id]);
    let images = list_hero_images_in_db(&pool, false).await.unwrap();
    assert_eq!(images[0].sort_order, 0);

    reorder_hero_images_in_db(&pool, &[(a.id, 1), (b.id, 0)]).await.unwrap();
    let ids: Vec<i64> = list_hero_images_in_db(&pool, false).await.unwrap().iter().map(|i| i.id).collect();
    assert_eq!(ids, vec![b.id, a.id]);
}

#[tokio::test]
async fn moving_hero_images_swaps_neighbours() {
    let pool = test_pool().await;
    let a = create_hero_image_in_db(&pool, "/uploads/hero/hero-a.png").await.unwrap();
    let b = create_hero_image_in_db(&pool, "/uploads/hero/hero-b.png").await.unwrap();
    let c = create_hero_image_in_db(&pool, "/uploads/hero/hero-c.png").await.unwrap();
    let order = |pool: SqlitePool| async move {
        list_hero_images_in_db(&pool, false)
            .await
            .unwrap()
            .iter()
            .map(|i| i.id)
            .collect::<Vec<_>>()
    };

    move_hero_image_in_db(&pool, c.id, MoveDirection::Up).await.unwrap();
    assert_eq!(order(pool.clone()).await, vec![a.id, c.id, b.id]);

    // Already first: nothing changes.
    move_hero_image_in_db(&pool, a.id, MoveDirection::Up).await.unwrap();
    assert_eq!(order(pool.clone()).await, vec![a.id, c.id, b.id]);

    move_hero_image_in_db(&pool, a.id, MoveDirection::Down).await.unwrap();
    assert_eq!(order(pool.clone()).await, vec![c.id, a.id, b.id]);

    // Already last.
    move_hero_image_in_db(&pool, b.id, MoveDirection::Down).await.unwrap();
    assert_eq!(order(pool.clone()).await, vec![c.id, a.id, b.id]);
}

#[tokio::test]
async fn active_only_listing_skips_inactive_images() {
    let pool = test_pool().await;
    let a = create_hero_image_in_db(&pool, "/uploads/hero/hero-a.png").await.unwrap();
    create_hero_image_in_db(&pool, "/uploads/hero/hero-b.png").await.unwrap();
    quill::db_helpers::toggle_hero_image_active_in_db(&pool, a.id).await.unwrap();

    let active = list_hero_images_in_db(&pool, true).await.unwrap();
    assert_eq!(active.len(), 1);
    assert_ne!(active[0].id, a.id);
}
