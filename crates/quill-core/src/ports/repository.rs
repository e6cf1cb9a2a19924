use std::collections::HashMap;

use async_trait::async_trait;
use chrono::{DateTime, NaiveDate, Utc};
use uuid::Uuid;

use crate::domain::{Comment, Post, Tag};
use crate::error::RepoError;

/// Generic repository trait defining standard CRUD operations.
#[async_trait]
pub trait BaseRepository<T, ID>: Send + Sync {
    /// Find an entity by its unique ID.
    async fn find_by_id(&self, id: ID) -> Result<Option<T>, RepoError>;

    /// Save an entity (create or update).
    async fn save(&self, entity: T) -> Result<T, RepoError>;

    /// Delete an entity by its ID.
    async fn delete(&self, id: ID) -> Result<(), RepoError>;
}

/// A post paired with its full-text relevance score.
#[derive(Debug, Clone, PartialEq)]
pub struct RankedPost {
    pub post: Post,
    pub rank: f32,
}

/// Post repository.
///
/// Every `*_published` query only sees posts that are published with a
/// publish timestamp at or before `now`.
#[async_trait]
pub trait PostRepository: BaseRepository<Post, Uuid> {
    /// Count visible posts, optionally restricted to one tag.
    async fn count_published(
        &self,
        tag_id: Option<Uuid>,
        now: DateTime<Utc>,
    ) -> Result<u64, RepoError>;

    /// A window of visible posts, newest publish first.
    async fn list_published(
        &self,
        tag_id: Option<Uuid>,
        now: DateTime<Utc>,
        offset: u64,
        limit: u64,
    ) -> Result<Vec<Post>, RepoError>;

    /// Look up a visible post by its slug and UTC publish date.
    async fn find_published_by_date_slug(
        &self,
        date: NaiveDate,
        slug: &str,
        now: DateTime<Utc>,
    ) -> Result<Option<Post>, RepoError>;

    /// Look up a visible post by id.
    async fn find_published_by_id(
        &self,
        id: Uuid,
        now: DateTime<Utc>,
    ) -> Result<Option<Post>, RepoError>;

    /// Visible posts sharing at least one tag with `post`, excluding it,
    /// ordered by shared-tag count then publish date (both descending).
    async fn find_similar(
        &self,
        post: &Post,
        now: DateTime<Utc>,
        limit: u64,
    ) -> Result<Vec<Post>, RepoError>;

    /// Visible posts whose relevance to `query` is at least `min_rank`,
    /// best match first.
    async fn search_published(
        &self,
        query: &str,
        min_rank: f32,
        now: DateTime<Utc>,
    ) -> Result<Vec<RankedPost>, RepoError>;
}

/// Tag repository.
#[async_trait]
pub trait TagRepository: BaseRepository<Tag, Uuid> {
    async fn find_by_slug(&self, slug: &str) -> Result<Option<Tag>, RepoError>;

    /// Tags of each requested post; posts without tags map to an empty list.
    async fn tags_for_posts(&self, post_ids: &[Uuid]) -> Result<HashMap<Uuid, Vec<Tag>>, RepoError>;

    /// Replace the tag set of a post.
    async fn set_post_tags(&self, post_id: Uuid, tag_ids: &[Uuid]) -> Result<(), RepoError>;
}

/// Comment repository.
#[async_trait]
pub trait CommentRepository: BaseRepository<Comment, Uuid> {
    /// Active comments of a post, oldest first.
    async fn list_active_for_post(&self, post_id: Uuid) -> Result<Vec<Comment>, RepoError>;
}
