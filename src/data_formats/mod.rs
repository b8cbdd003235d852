mod request;
mod response;
mod wrapper;

pub use request::*;
pub use response::*;
pub use wrapper::*;

use serde::Deserialize;

use crate::db_helpers::{ArticleFilter, ArticleSort, ARTICLE_PAGE_SIZE};

pub const EXCERPT_CHARS: usize = 100;

#[derive(Deserialize, Debug, Default)]
pub struct ArticleQueryParams {
    #[serde(default)]
    pub skip: Option<i64>,
    #[serde(default)]
    pub take: Option<i64>,
    #[serde(default)]
    pub tag: Option<String>,
    #[serde(default)]
    pub search: Option<String>,
    #[serde(default)]
    pub sort: Option<ArticleSort>,
}

impl ArticleQueryParams {
    pub fn into_filter(self) -> ArticleFilter {
        let non_empty = |value: Option<String>| {
            value
                .map(|v| v.trim().to_owned())
                .filter(|v| !v.is_empty())
        };
        ArticleFilter {
            tag: non_empty(self.tag),
            search: non_empty(self.search),
            sort: self.sort.unwrap_or_default(),
            skip: self.skip.unwrap_or(0).max(0),
            take: self
                .take
                .filter(|take| *take > 0)
                .unwrap_or(ARTICLE_PAGE_SIZE)
                .min(ARTICLE_PAGE_SIZE),
        }
    }
}

/// First hundred characters of the content followed by `...`.
pub fn derive_excerpt(content: &str) -> String {
    let mut excerpt: String = content.chars().take(EXCERPT_CHARS).collect();
    excerpt.push_str("...");
    excerpt
}
