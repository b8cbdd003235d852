use serde::{Deserialize, Serialize};

use crate::db_helpers::DashboardCounts;

use super::response::{
    ActivityResponse, AdminUserResponse, ArticleCardResponse, CurrentUserResponse,
    HeroImageResponse, ProfileResponse, TagResponse,
};

#[derive(Deserialize, Serialize, Debug)]
#[serde(rename_all = "camelCase")]
pub struct ArticleListResponse {
    pub articles: Vec<ArticleCardResponse>,
    pub total_count: i64,
    pub has_more: bool,
}

impl ArticleListResponse {
    pub fn new(articles: Vec<ArticleCardResponse>, total_count: i64, skip: i64, take: i64) -> Self {
        ArticleListResponse {
            articles,
            total_count,
            has_more: skip.saturating_add(take) < total_count,
        }
    }
}

#[derive(Deserialize, Serialize, Debug)]
#[serde(rename_all = "camelCase")]
pub struct HomePageResponse {
    pub hero_images: Vec<HeroImageResponse>,
    #[serde(flatten)]
    pub list: ArticleListResponse,
}

#[derive(Deserialize, Serialize, Debug)]
#[serde(rename_all = "camelCase")]
pub struct ProfilePageResponse {
    pub user: ProfileResponse,
    pub articles: Vec<ArticleCardResponse>,
}

#[derive(Deserialize, Serialize, Debug)]
#[serde(rename_all = "camelCase")]
pub struct MyPageResponse {
    pub user: CurrentUserResponse,
    pub articles: Vec<ArticleCardResponse>,
    pub bookmarks: Vec<ArticleCardResponse>,
}

#[derive(Deserialize, Serialize, Debug)]
pub struct TagListResponse {
    pub tags: Vec<TagResponse>,
}

#[derive(Deserialize, Serialize, Debug)]
pub struct UserListResponse {
    pub users: Vec<AdminUserResponse>,
}

#[derive(Deserialize, Serialize, Debug)]
#[serde(rename_all = "camelCase")]
pub struct HeroImageListResponse {
    pub hero_images: Vec<HeroImageResponse>,
}

#[derive(Deserialize, Serialize, Debug)]
pub struct ActivityListResponse {
    pub activities: Vec<ActivityResponse>,
}

#[derive(Deserialize, Serialize, Debug, Default)]
#[serde(rename_all = "camelCase")]
pub struct DashboardStats {
    pub total_users: i64,
    pub total_admins: i64,
    pub total_articles: i64,
    pub published_articles: i64,
    pub total_tags: i64,
    pub total_comments: i64,
}

impl From<DashboardCounts> for DashboardStats {
    fn from(counts: DashboardCounts) -> Self {
        DashboardStats {
            total_users: counts.users,
            total_admins: counts.admins,
            total_articles: counts.articles,
            published_articles: counts.published_articles,
            total_tags: counts.tags,
            total_comments: counts.comments,
        }
    }
}

#[derive(Deserialize, Serialize, Debug)]
#[serde(rename_all = "camelCase")]
pub struct DashboardResponse {
    pub stats: DashboardStats,
    pub recent_users: Vec<ProfileResponse>,
    pub recent_activities: Vec<ActivityResponse>,
}
