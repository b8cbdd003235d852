use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::models::{
    display_name, Activity, ActivityType, ArticleCard, CommentWithAuthor, HeroImage,
    PublishStatus, Role, Tag, TagWithCount, TargetType, User, UserWithCounts,
};

/// Body of every successful mutation. `revalidate` lists the views whose
/// cached rendering is now stale.
#[derive(Deserialize, Serialize, Debug, Default)]
#[serde(rename_all = "camelCase")]
pub struct ActionResponse {
    pub success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub article_id: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,
    pub revalidate: Vec<String>,
}

impl ActionResponse {
    pub fn ok<I, S>(revalidate: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        ActionResponse {
            success: true,
            revalidate: revalidate.into_iter().map(Into::into).collect(),
            ..Default::default()
        }
    }

    pub fn with_article(mut self, article_id: i64) -> Self {
        self.article_id = Some(article_id);
        self
    }

    pub fn with_url(mut self, url: String) -> Self {
        self.url = Some(url);
        self
    }
}

#[derive(Deserialize, Serialize, Debug)]
pub struct BookmarkResponse {
    pub bookmarked: bool,
}

#[derive(Deserialize, Serialize, Debug)]
pub struct UploadResponse {
    pub url: String,
}

#[derive(Deserialize, Serialize, Debug, Clone)]
#[serde(rename_all = "camelCase")]
pub struct AuthorResponse {
    pub id: i64,
    pub name: String,
    pub avatar_url: Option<String>,
}

#[derive(Deserialize, Serialize, Debug)]
#[serde(rename_all = "camelCase")]
pub struct ArticleCardResponse {
    pub id: i64,
    pub title: String,
    pub excerpt: Option<String>,
    pub cover_image_url: Option<String>,
    pub status: PublishStatus,
    pub tags: Vec<String>,
    pub author: AuthorResponse,
    pub likes: i64,
    pub views: i64,
    pub bookmark_count: i64,
    pub published_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Deserialize, Serialize, Debug)]
#[serde(rename_all = "camelCase")]
pub struct ArticleDetailResponse {
    #[serde(flatten)]
    pub card: ArticleCardResponse,
    pub content: String,
    pub content_html: String,
    pub comments: Vec<CommentResponse>,
    pub is_author: bool,
    pub is_admin: bool,
    pub is_bookmarked: bool,
}

#[derive(Deserialize, Serialize, Debug)]
#[serde(rename_all = "camelCase")]
pub struct EditArticleResponse {
    pub id: i64,
    pub title: String,
    pub content: String,
    pub cover_image_url: Option<String>,
    pub status: PublishStatus,
    pub tags: Vec<String>,
}

#[derive(Deserialize, Serialize, Debug)]
#[serde(rename_all = "camelCase")]
pub struct CommentResponse {
    pub id: i64,
    pub content: String,
    pub created_at: DateTime<Utc>,
    pub author: AuthorResponse,
}

/// What other users may see of an account.
#[derive(Deserialize, Serialize, Debug)]
#[serde(rename_all = "camelCase")]
pub struct ProfileResponse {
    pub id: i64,
    pub name: String,
    pub nickname: Option<String>,
    pub bio: Option<String>,
    pub github_url: Option<String>,
    pub avatar_url: Option<String>,
    pub created_at: DateTime<Utc>,
}

/// The signed-in user's own account.
#[derive(Deserialize, Serialize, Debug)]
#[serde(rename_all = "camelCase")]
pub struct CurrentUserResponse {
    pub id: i64,
    pub email: String,
    pub first_name: String,
    pub last_name: String,
    pub nickname: Option<String>,
    pub bio: Option<String>,
    pub github_url: Option<String>,
    pub avatar_url: Option<String>,
    pub role: Role,
}

#[derive(Deserialize, Serialize, Debug)]
#[serde(rename_all = "camelCase")]
pub struct TagResponse {
    pub id: i64,
    pub name: String,
    pub color: String,
    pub status: PublishStatus,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub article_count: Option<i64>,
}

#[derive(Deserialize, Serialize, Debug)]
#[serde(rename_all = "camelCase")]
pub struct HeroImageResponse {
    pub id: i64,
    pub url: String,
    pub order: i64,
    pub is_active: bool,
}

#[derive(Deserialize, Serialize, Debug)]
#[serde(rename_all = "camelCase")]
pub struct AdminUserResponse {
    pub id: i64,
    pub email: String,
    pub name: String,
    pub avatar_url: Option<String>,
    pub role: Role,
    pub article_count: i64,
    pub comment_count: i64,
    pub created_at: DateTime<Utc>,
}

#[derive(Deserialize, Serialize, Debug)]
#[serde(rename_all = "camelCase")]
pub struct ActivityResponse {
    pub id: i64,
    pub admin_id: i64,
    pub action_type: ActivityType,
    pub target_type: TargetType,
    pub target_id: i64,
    pub target_name: String,
    pub description: String,
    pub created_at: DateTime<Utc>,
}

impl ArticleCardResponse {
    pub fn new(card: ArticleCard) -> Self {
        let tags = card.tags();
        let author = AuthorResponse {
            id: card.author_id,
            name: card.author_name(),
            avatar_url: card.author_avatar_url.clone(),
        };
        let ArticleCard {
            id,
            title,
            excerpt,
            cover_image_url,
            status,
            likes,
            views,
            bookmark_count,
            published_at,
            created_at,
            updated_at,
            ..
        } = card;
        ArticleCardResponse {
            id,
            title,
            excerpt,
            cover_image_url,
            status,
            tags,
            author,
            likes,
            views,
            bookmark_count,
            published_at,
            created_at,
            updated_at,
        }
    }
}

impl CommentResponse {
    pub fn new(
        CommentWithAuthor {
            id,
            content,
            created_at,
            author_id,
            author_nickname,
            author_first_name,
            author_last_name,
            author_avatar_url,
        }: CommentWithAuthor,
    ) -> Self {
        CommentResponse {
            id,
            content,
            created_at,
            author: AuthorResponse {
                id: author_id,
                name: display_name(
                    author_nickname.as_deref(),
                    &author_first_name,
                    &author_last_name,
                ),
                avatar_url: author_avatar_url,
            },
        }
    }
}

impl ProfileResponse {
    pub fn new(user: User) -> Self {
        let name = user.display_name();
        let User {
            id,
            nickname,
            bio,
            github_url,
            avatar_url,
            created_at,
            ..
        } = user;
        ProfileResponse {
            id,
            name,
            nickname,
            bio,
            github_url,
            avatar_url,
            created_at,
        }
    }
}

impl CurrentUserResponse {
    pub fn new(
        User {
            id,
            email,
            first_name,
            last_name,
            nickname,
            bio,
            github_url,
            avatar_url,
            role,
            ..
        }: User,
    ) -> Self {
        CurrentUserResponse {
            id,
            email,
            first_name,
            last_name,
            nickname,
            bio,
            github_url,
            avatar_url,
            role,
        }
    }
}

impl From<Tag> for TagResponse {
    fn from(Tag { id, name, color, status, .. }: Tag) -> Self {
        TagResponse {
            id,
            name,
            color,
            status,
            article_count: None,
        }
    }
}

impl From<TagWithCount> for TagResponse {
    fn from(
        TagWithCount {
            id,
            name,
            color,
            status,
            article_count,
            ..
        }: TagWithCount,
    ) -> Self {
        TagResponse {
            id,
            name,
            color,
            status,
            article_count: Some(article_count),
        }
    }
}

impl From<HeroImage> for HeroImageResponse {
    fn from(
        HeroImage {
            id,
            url,
            sort_order,
            is_active,
        }: HeroImage,
    ) -> Self {
        HeroImageResponse {
            id,
            url,
            order: sort_order,
            is_active,
        }
    }
}

impl From<UserWithCounts> for AdminUserResponse {
    fn from(user: UserWithCounts) -> Self {
        AdminUserResponse {
            name: display_name(user.nickname.as_deref(), &user.first_name, &user.last_name),
            id: user.id,
            email: user.email,
            avatar_url: user.avatar_url,
            role: user.role,
            article_count: user.article_count,
            comment_count: user.comment_count,
            created_at: user.created_at,
        }
    }
}

impl From<Activity> for ActivityResponse {
    fn from(
        Activity {
            id,
            admin_id,
            action_type,
            target_type,
            target_id,
            target_name,
            description,
            created_at,
        }: Activity,
    ) -> Self {
        ActivityResponse {
            id,
            admin_id,
            action_type,
            target_type,
            target_id,
            target_name,
            description,
            created_at,
        }
    }
}
