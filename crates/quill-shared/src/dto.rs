//! Data Transfer Objects - request/response types for the blog pages.

use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Field name → validation messages, as shown next to a form.
pub type FieldErrors = BTreeMap<String, Vec<String>>;

/// `?page=` on post lists. Kept raw so any junk falls back to page 1.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct PageQuery {
    pub page: Option<String>,
}

/// `?query=` on the search page. Absent means the form was not submitted.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SearchParams {
    pub query: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TagView {
    pub name: String,
    pub slug: String,
    /// Filtered list URL, e.g. `/blog/tag/rust/`.
    pub url: String,
}

/// A post as shown in lists, search hits and the detail page.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PostView {
    pub id: Uuid,
    pub title: String,
    pub slug: String,
    pub author: String,
    pub body: String,
    pub publish: DateTime<Utc>,
    pub url: String,
    pub tags: Vec<TagView>,
}

/// Title and link only, for similar posts and share pages.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PostLink {
    pub id: Uuid,
    pub title: String,
    pub url: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PageInfo {
    pub number: u64,
    pub num_pages: u64,
    pub count: u64,
    pub has_next: bool,
    pub has_previous: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PostListResponse {
    pub posts: Vec<PostView>,
    pub page: PageInfo,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tag: Option<TagView>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CommentView {
    pub id: Uuid,
    pub name: String,
    pub body: String,
    pub created: DateTime<Utc>,
}

/// Detail page. After a POST, `new_comment` or `errors` report the outcome.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PostDetailResponse {
    pub post: PostView,
    pub comments: Vec<CommentView>,
    pub similar_posts: Vec<PostLink>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub new_comment: Option<CommentView>,
    #[serde(default)]
    pub errors: FieldErrors,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ShareResponse {
    pub post: PostLink,
    pub sent: bool,
    #[serde(default)]
    pub errors: FieldErrors,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SearchHit {
    pub id: Uuid,
    pub title: String,
    pub url: String,
    pub body: String,
    pub publish: DateTime<Utc>,
    pub rank: f32,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SearchResponse {
    pub query: Option<String>,
    pub results: Vec<SearchHit>,
    #[serde(default)]
    pub errors: FieldErrors,
}
