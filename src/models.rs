use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type)]
#[serde(rename_all = "lowercase")]
#[sqlx(rename_all = "lowercase")]
pub enum Role {
    Admin,
    General,
}

/// Visibility of articles, tags and comments.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type)]
#[serde(rename_all = "lowercase")]
#[sqlx(rename_all = "lowercase")]
pub enum PublishStatus {
    Draft,
    Published,
}

impl FromStr for PublishStatus {
    type Err = String;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value {
            "draft" => Ok(PublishStatus::Draft),
            "published" => Ok(PublishStatus::Published),
            other => Err(format!("Unknown status: {other}")),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type)]
#[serde(rename_all = "snake_case")]
#[sqlx(rename_all = "snake_case")]
pub enum ActivityType {
    PromoteUser,
    DemoteUser,
    DeleteUser,
    DeleteArticle,
    DeleteComment,
    DeleteTag,
    UpdateTag,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type)]
#[serde(rename_all = "lowercase")]
#[sqlx(rename_all = "lowercase")]
pub enum TargetType {
    User,
    Article,
    Comment,
    Tag,
}

#[derive(Debug, Clone, sqlx::FromRow)]
pub struct User {
    pub id: i64,
    pub email: String,
    pub password: String,
    pub first_name: String,
    pub last_name: String,
    pub nickname: Option<String>,
    pub bio: Option<String>,
    pub github_url: Option<String>,
    pub avatar_url: Option<String>,
    pub role: Role,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl User {
    pub fn is_admin(&self) -> bool {
        self.role == Role::Admin
    }

    pub fn display_name(&self) -> String {
        display_name(self.nickname.as_deref(), &self.first_name, &self.last_name)
    }
}

/// Nickname when set, otherwise "first last".
pub fn display_name(nickname: Option<&str>, first_name: &str, last_name: &str) -> String {
    match nickname {
        Some(nickname) if !nickname.is_empty() => nickname.to_owned(),
        _ => format!("{first_name} {last_name}").trim().to_owned(),
    }
}

#[derive(Debug, Clone, sqlx::FromRow)]
pub struct Article {
    pub id: i64,
    pub title: String,
    pub content: String,
    pub excerpt: Option<String>,
    pub cover_image_url: Option<String>,
    pub status: PublishStatus,
    pub published_at: Option<DateTime<Utc>>,
    pub views: i64,
    pub likes: i64,
    pub author_id: i64,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Article {
    pub fn is_visible_to(&self, viewer_id: Option<i64>) -> bool {
        is_visible_to(self.status, self.author_id, viewer_id)
    }
}

/// Published articles are public; drafts are seen by their author only.
pub fn is_visible_to(status: PublishStatus, author_id: i64, viewer_id: Option<i64>) -> bool {
    status == PublishStatus::Published || viewer_id == Some(author_id)
}

/// An article joined with what a listing card needs.
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct ArticleCard {
    pub id: i64,
    pub title: String,
    pub content: String,
    pub excerpt: Option<String>,
    pub cover_image_url: Option<String>,
    pub status: PublishStatus,
    pub published_at: Option<DateTime<Utc>>,
    pub views: i64,
    pub likes: i64,
    pub author_id: i64,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub tag_list: Option<String>,
    pub bookmark_count: i64,
    pub author_nickname: Option<String>,
    pub author_first_name: String,
    pub author_last_name: String,
    pub author_avatar_url: Option<String>,
}

impl ArticleCard {
    pub fn tags(&self) -> Vec<String> {
        match &self.tag_list {
            Some(list) if !list.is_empty() => list.split(',').map(str::to_owned).collect(),
            _ => vec![],
        }
    }

    pub fn is_visible_to(&self, viewer_id: Option<i64>) -> bool {
        is_visible_to(self.status, self.author_id, viewer_id)
    }

    pub fn author_name(&self) -> String {
        display_name(
            self.author_nickname.as_deref(),
            &self.author_first_name,
            &self.author_last_name,
        )
    }
}

#[derive(Debug, Clone, sqlx::FromRow)]
pub struct Tag {
    pub id: i64,
    pub name: String,
    pub color: String,
    pub status: PublishStatus,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, sqlx::FromRow)]
pub struct TagWithCount {
    pub id: i64,
    pub name: String,
    pub color: String,
    pub status: PublishStatus,
    pub created_at: DateTime<Utc>,
    pub article_count: i64,
}

#[derive(Debug, Clone, sqlx::FromRow)]
pub struct Comment {
    pub id: i64,
    pub content: String,
    pub status: PublishStatus,
    pub article_id: i64,
    pub author_id: i64,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, sqlx::FromRow)]
pub struct CommentWithAuthor {
    pub id: i64,
    pub content: String,
    pub created_at: DateTime<Utc>,
    pub author_id: i64,
    pub author_nickname: Option<String>,
    pub author_first_name: String,
    pub author_last_name: String,
    pub author_avatar_url: Option<String>,
}

#[derive(Debug, Clone, sqlx::FromRow)]
pub struct HeroImage {
    pub id: i64,
    pub url: String,
    pub sort_order: i64,
    pub is_active: bool,
}

#[derive(Debug, Clone, sqlx::FromRow)]
pub struct Activity {
    pub id: i64,
    pub admin_id: i64,
    pub action_type: ActivityType,
    pub target_type: TargetType,
    pub target_id: i64,
    pub target_name: String,
    pub description: String,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, sqlx::FromRow)]
pub struct UserWithCounts {
    pub id: i64,
    pub email: String,
    pub first_name: String,
    pub last_name: String,
    pub nickname: Option<String>,
    pub avatar_url: Option<String>,
    pub role: Role,
    pub created_at: DateTime<Utc>,
    pub article_count: i64,
    pub comment_count: i64,
}
