//! In-memory blog store - used when no database is configured, and in tests.
//!
//! Note: Data is lost on process restart.

use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use chrono::{DateTime, NaiveDate, Utc};
use tokio::sync::RwLock;
use uuid::Uuid;

use quill_core::domain::{Comment, Post, Tag};
use quill_core::error::RepoError;
use quill_core::ports::{
    BaseRepository, CommentRepository, PostRepository, RankedPost, TagRepository,
};
use quill_core::search::{self, SearchQuery};
use quill_core::similar;

#[derive(Default)]
struct Tables {
    posts: HashMap<Uuid, Post>,
    tags: HashMap<Uuid, Tag>,
    /// post id → tag ids
    post_tags: HashMap<Uuid, Vec<Uuid>>,
    comments: HashMap<Uuid, Comment>,
}

impl Tables {
    fn tags_of(&self, post_id: Uuid) -> Vec<Uuid> {
        self.post_tags.get(&post_id).cloned().unwrap_or_default()
    }

    /// Visible posts, newest publish first.
    fn visible(&self, now: DateTime<Utc>) -> Vec<&Post> {
        let mut posts: Vec<&Post> = self.posts.values().filter(|p| p.is_visible(now)).collect();
        posts.sort_by(|a, b| {
            b.publish
                .cmp(&a.publish)
                .then_with(|| a.title.cmp(&b.title))
                .then_with(|| a.id.cmp(&b.id))
        });
        posts
    }

    fn visible_with_tag(&self, tag_id: Option<Uuid>, now: DateTime<Utc>) -> Vec<&Post> {
        let mut posts = self.visible(now);
        if let Some(tag_id) = tag_id {
            posts.retain(|p| {
                self.post_tags
                    .get(&p.id)
                    .is_some_and(|tags| tags.contains(&tag_id))
            });
        }
        posts
    }
}

/// Shared tables behind the in-memory repositories.
///
/// Every repository handed out by one store sees the same data.
#[derive(Clone, Default)]
pub struct InMemoryStore {
    tables: Arc<RwLock<Tables>>,
}

impl InMemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn posts(&self) -> InMemoryPostRepository {
        InMemoryPostRepository {
            tables: self.tables.clone(),
        }
    }

    pub fn tags(&self) -> InMemoryTagRepository {
        InMemoryTagRepository {
            tables: self.tables.clone(),
        }
    }

    pub fn comments(&self) -> InMemoryCommentRepository {
        InMemoryCommentRepository {
            tables: self.tables.clone(),
        }
    }
}

pub struct InMemoryPostRepository {
    tables: Arc<RwLock<Tables>>,
}

pub struct InMemoryTagRepository {
    tables: Arc<RwLock<Tables>>,
}

pub struct InMemoryCommentRepository {
    tables: Arc<RwLock<Tables>>,
}

#[async_trait]
impl BaseRepository<Post, Uuid> for InMemoryPostRepository {
    async fn find_by_id(&self, id: Uuid) -> Result<Option<Post>, RepoError> {
        Ok(self.tables.read().await.posts.get(&id).cloned())
    }

    async fn save(&self, post: Post) -> Result<Post, RepoError> {
        let mut tables = self.tables.write().await;

        let date = post.publish_date();
        let clash = tables
            .posts
            .values()
            .any(|p| p.id != post.id && p.slug == post.slug && p.publish_date() == date);
        if clash {
            return Err(RepoError::Constraint(format!(
                "slug '{}' already used on {}",
                post.slug, date
            )));
        }

        tables.posts.insert(post.id, post.clone());
        Ok(post)
    }

    async fn delete(&self, id: Uuid) -> Result<(), RepoError> {
        let mut tables = self.tables.write().await;
        tables.posts.remove(&id).ok_or(RepoError::NotFound)?;
        tables.post_tags.remove(&id);
        tables.comments.retain(|_, c| c.post_id != id);
        Ok(())
    }
}

#[async_trait]
impl PostRepository for InMemoryPostRepository {
    async fn count_published(
        &self,
        tag_id: Option<Uuid>,
        now: DateTime<Utc>,
    ) -> Result<u64, RepoError> {
        let tables = self.tables.read().await;
        Ok(tables.visible_with_tag(tag_id, now).len() as u64)
    }

    async fn list_published(
        &self,
        tag_id: Option<Uuid>,
        now: DateTime<Utc>,
        offset: u64,
        limit: u64,
    ) -> Result<Vec<Post>, RepoError> {
        let tables = self.tables.read().await;
        Ok(tables
            .visible_with_tag(tag_id, now)
            .into_iter()
            .skip(offset as usize)
            .take(limit as usize)
            .cloned()
            .collect())
    }

    async fn find_published_by_date_slug(
        &self,
        date: NaiveDate,
        slug: &str,
        now: DateTime<Utc>,
    ) -> Result<Option<Post>, RepoError> {
        let tables = self.tables.read().await;
        Ok(tables
            .visible(now)
            .into_iter()
            .find(|p| p.slug == slug && p.publish_date() == date)
            .cloned())
    }

    async fn find_published_by_id(
        &self,
        id: Uuid,
        now: DateTime<Utc>,
    ) -> Result<Option<Post>, RepoError> {
        let tables = self.tables.read().await;
        Ok(tables.posts.get(&id).filter(|p| p.is_visible(now)).cloned())
    }

    async fn find_similar(
        &self,
        post: &Post,
        now: DateTime<Utc>,
        limit: u64,
    ) -> Result<Vec<Post>, RepoError> {
        let tables = self.tables.read().await;
        let target_tags = tables.tags_of(post.id);
        let candidates = tables
            .visible(now)
            .into_iter()
            .map(|p| (p.clone(), tables.tags_of(p.id)));

        Ok(similar::rank_similar(post, &target_tags, candidates, limit))
    }

    async fn search_published(
        &self,
        query: &str,
        min_rank: f32,
        now: DateTime<Utc>,
    ) -> Result<Vec<RankedPost>, RepoError> {
        let Some(query) = SearchQuery::parse(query) else {
            return Ok(Vec::new());
        };

        let tables = self.tables.read().await;
        let mut hits: Vec<RankedPost> = tables
            .visible(now)
            .into_iter()
            .map(|p| RankedPost {
                rank: search::rank(&p.title, &p.body, &query),
                post: p.clone(),
            })
            .filter(|hit| hit.rank > 0.0 && hit.rank >= min_rank)
            .collect();

        hits.sort_by(|a, b| {
            b.rank
                .total_cmp(&a.rank)
                .then_with(|| b.post.publish.cmp(&a.post.publish))
        });
        Ok(hits)
    }
}

#[async_trait]
impl BaseRepository<Tag, Uuid> for InMemoryTagRepository {
    async fn find_by_id(&self, id: Uuid) -> Result<Option<Tag>, RepoError> {
        Ok(self.tables.read().await.tags.get(&id).cloned())
    }

    async fn save(&self, tag: Tag) -> Result<Tag, RepoError> {
        let mut tables = self.tables.write().await;
        if tables.tags.values().any(|t| t.id != tag.id && t.slug == tag.slug) {
            return Err(RepoError::Constraint(format!("tag slug '{}' exists", tag.slug)));
        }
        tables.tags.insert(tag.id, tag.clone());
        Ok(tag)
    }

    async fn delete(&self, id: Uuid) -> Result<(), RepoError> {
        let mut tables = self.tables.write().await;
        tables.tags.remove(&id).ok_or(RepoError::NotFound)?;
        for tags in tables.post_tags.values_mut() {
            tags.retain(|t| *t != id);
        }
        Ok(())
    }
}

#[async_trait]
impl TagRepository for InMemoryTagRepository {
    async fn find_by_slug(&self, slug: &str) -> Result<Option<Tag>, RepoError> {
        let tables = self.tables.read().await;
        Ok(tables.tags.values().find(|t| t.slug == slug).cloned())
    }

    async fn tags_for_posts(&self, post_ids: &[Uuid]) -> Result<HashMap<Uuid, Vec<Tag>>, RepoError> {
        let tables = self.tables.read().await;
        Ok(post_ids
            .iter()
            .map(|post_id| {
                let mut tags: Vec<Tag> = tables
                    .tags_of(*post_id)
                    .iter()
                    .filter_map(|tag_id| tables.tags.get(tag_id).cloned())
                    .collect();
                tags.sort_by(|a, b| a.name.cmp(&b.name));
                (*post_id, tags)
            })
            .collect())
    }

    async fn set_post_tags(&self, post_id: Uuid, tag_ids: &[Uuid]) -> Result<(), RepoError> {
        let mut tables = self.tables.write().await;
        if !tables.posts.contains_key(&post_id) {
            return Err(RepoError::Constraint(format!("unknown post {post_id}")));
        }
        if let Some(missing) = tag_ids.iter().find(|id| !tables.tags.contains_key(id)) {
            return Err(RepoError::Constraint(format!("unknown tag {missing}")));
        }

        let mut unique = tag_ids.to_vec();
        unique.sort();
        unique.dedup();
        tables.post_tags.insert(post_id, unique);
        Ok(())
    }
}

#[async_trait]
impl BaseRepository<Comment, Uuid> for InMemoryCommentRepository {
    async fn find_by_id(&self, id: Uuid) -> Result<Option<Comment>, RepoError> {
        Ok(self.tables.read().await.comments.get(&id).cloned())
    }

    async fn save(&self, comment: Comment) -> Result<Comment, RepoError> {
        let mut tables = self.tables.write().await;
        if !tables.posts.contains_key(&comment.post_id) {
            return Err(RepoError::Constraint(format!(
                "unknown post {}",
                comment.post_id
            )));
        }
        tables.comments.insert(comment.id, comment.clone());
        Ok(comment)
    }

    async fn delete(&self, id: Uuid) -> Result<(), RepoError> {
        let mut tables = self.tables.write().await;
        tables.comments.remove(&id).ok_or(RepoError::NotFound)?;
        Ok(())
    }
}

#[async_trait]
impl CommentRepository for InMemoryCommentRepository {
    async fn list_active_for_post(&self, post_id: Uuid) -> Result<Vec<Comment>, RepoError> {
        let tables = self.tables.read().await;
        let mut comments: Vec<Comment> = tables
            .comments
            .values()
            .filter(|c| c.post_id == post_id && c.active)
            .cloned()
            .collect();
        comments.sort_by(|a, b| a.created.cmp(&b.created));
        Ok(comments)
    }
}
