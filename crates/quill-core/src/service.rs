//! Blog use cases over the repository and mailer ports.
//!
//! Every read takes `now` explicitly: it bounds which posts count as
//! published and keeps the service free of a clock.

use std::sync::Arc;

use chrono::{DateTime, NaiveDate, Utc};
use uuid::Uuid;

use crate::domain::{Comment, Post, Tag};
use crate::error::DomainError;
use crate::forms::{self, CommentInput, FormErrors, FormOutcome, SharePostInput};
use crate::pagination::{POSTS_PER_PAGE, Page, PageWindow};
use crate::ports::{
    CommentRepository, Mailer, OutgoingEmail, PostRepository, RankedPost, TagRepository,
};
use crate::search::RANK_THRESHOLD;
use crate::similar::SIMILAR_POSTS_LIMIT;

/// Posts included in the syndication feed.
pub const FEED_ITEMS: u64 = 5;

/// A post together with its tags.
#[derive(Debug, Clone, PartialEq)]
pub struct TaggedPost {
    pub post: Post,
    pub tags: Vec<Tag>,
}

/// One page of the public post list.
#[derive(Debug, Clone)]
pub struct PostListing {
    pub page: Page<TaggedPost>,
    /// The tag the list is filtered by, if any.
    pub tag: Option<Tag>,
}

/// Everything the detail page shows besides the comment form.
#[derive(Debug, Clone)]
pub struct PostDetail {
    pub post: TaggedPost,
    pub comments: Vec<Comment>,
    pub similar_posts: Vec<Post>,
}

/// Search form state after a request.
#[derive(Debug, Clone, Default)]
pub struct SearchOutcome {
    /// The cleaned query, set only when the form validated.
    pub query: Option<String>,
    pub results: Vec<RankedPost>,
    pub errors: FormErrors,
}

/// Stateless query formulator behind every public page.
#[derive(Clone)]
pub struct BlogService {
    posts: Arc<dyn PostRepository>,
    tags: Arc<dyn TagRepository>,
    comments: Arc<dyn CommentRepository>,
    mailer: Arc<dyn Mailer>,
    sender: String,
}

impl BlogService {
    pub fn new(
        posts: Arc<dyn PostRepository>,
        tags: Arc<dyn TagRepository>,
        comments: Arc<dyn CommentRepository>,
        mailer: Arc<dyn Mailer>,
        sender: impl Into<String>,
    ) -> Self {
        Self {
            posts,
            tags,
            comments,
            mailer,
            sender: sender.into(),
        }
    }

    /// Published posts, newest first, three per page, optionally by tag.
    pub async fn list_posts(
        &self,
        tag_slug: Option<&str>,
        page: Option<&str>,
        now: DateTime<Utc>,
    ) -> Result<PostListing, DomainError> {
        let tag = match tag_slug {
            Some(slug) => Some(
                self.tags
                    .find_by_slug(slug)
                    .await?
                    .ok_or_else(|| DomainError::not_found("tag", slug))?,
            ),
            None => None,
        };
        let tag_id = tag.as_ref().map(|t| t.id);

        let count = self.posts.count_published(tag_id, now).await?;
        let window = PageWindow::resolve(page, count, POSTS_PER_PAGE);
        let posts = self
            .posts
            .list_published(tag_id, now, window.offset, window.limit)
            .await?;

        Ok(PostListing {
            page: window.into_page(self.with_tags(posts).await?, count),
            tag,
        })
    }

    /// Resolve the public `year/month/day/slug` key of a published post.
    pub async fn find_post(
        &self,
        year: i32,
        month: u32,
        day: u32,
        slug: &str,
        now: DateTime<Utc>,
    ) -> Result<Post, DomainError> {
        let not_found = || DomainError::not_found("post", format!("{year}/{month}/{day}/{slug}"));
        let date = NaiveDate::from_ymd_opt(year, month, day).ok_or_else(not_found)?;

        self.posts
            .find_published_by_date_slug(date, slug, now)
            .await?
            .ok_or_else(not_found)
    }

    /// Detail context: tags, active comments and similar posts.
    pub async fn post_detail(&self, post: Post, now: DateTime<Utc>) -> Result<PostDetail, DomainError> {
        let comments = self.comments.list_active_for_post(post.id).await?;
        let similar_posts = self
            .posts
            .find_similar(&post, now, SIMILAR_POSTS_LIMIT)
            .await?;
        let tags = self
            .tags
            .tags_for_posts(&[post.id])
            .await?
            .remove(&post.id)
            .unwrap_or_default();

        Ok(PostDetail {
            post: TaggedPost { post, tags },
            comments,
            similar_posts,
        })
    }

    /// Validate and store a comment. Invalid input stores nothing.
    pub async fn submit_comment(
        &self,
        post: &Post,
        input: CommentInput,
    ) -> Result<FormOutcome<Comment>, DomainError> {
        let input = match input.clean() {
            Ok(input) => input,
            Err(errors) => return Ok(FormOutcome::Rejected(errors)),
        };

        let comment = Comment::new(post.id, input.name, input.email, input.body);
        let saved = self.comments.save(comment).await?;
        Ok(FormOutcome::Accepted(saved))
    }

    /// A published post by id, for the share page.
    pub async fn find_shareable(&self, post_id: Uuid, now: DateTime<Utc>) -> Result<Post, DomainError> {
        self.posts
            .find_published_by_id(post_id, now)
            .await?
            .ok_or_else(|| DomainError::not_found("post", post_id))
    }

    /// Email a link to `post`. `site_root` is the scheme and host the
    /// absolute URL is built from, e.g. `https://example.com`.
    pub async fn share_post(
        &self,
        post: &Post,
        input: SharePostInput,
        site_root: &str,
    ) -> Result<FormOutcome<OutgoingEmail>, DomainError> {
        let input = match input.clean() {
            Ok(input) => input,
            Err(errors) => return Ok(FormOutcome::Rejected(errors)),
        };

        let post_url = format!("{}{}", site_root.trim_end_matches('/'), post.absolute_path());
        let email = OutgoingEmail {
            from: self.sender.clone(),
            to: vec![input.to],
            subject: format!("{} recommends you read {}", input.name, post.title),
            body: format!(
                "Read {} at {}\n\n{}'s comments: {}",
                post.title, post_url, input.name, input.comments
            ),
        };

        self.mailer.send(email.clone()).await?;
        Ok(FormOutcome::Accepted(email))
    }

    /// Ranked full-text search. `None` means the form was not submitted.
    pub async fn search(&self, raw: Option<&str>, now: DateTime<Utc>) -> Result<SearchOutcome, DomainError> {
        let Some(raw) = raw else {
            return Ok(SearchOutcome::default());
        };

        let query = match forms::clean_search_query(raw) {
            Ok(query) => query,
            Err(errors) => {
                return Ok(SearchOutcome {
                    errors,
                    ..SearchOutcome::default()
                });
            }
        };

        let results = self
            .posts
            .search_published(&query, RANK_THRESHOLD, now)
            .await?;

        Ok(SearchOutcome {
            query: Some(query),
            results,
            errors: FormErrors::default(),
        })
    }

    /// The newest published posts for the feed.
    pub async fn latest_posts(&self, now: DateTime<Utc>) -> Result<Vec<Post>, DomainError> {
        Ok(self.posts.list_published(None, now, 0, FEED_ITEMS).await?)
    }

    /// Every published post, for the sitemap.
    pub async fn all_published(&self, now: DateTime<Utc>) -> Result<Vec<Post>, DomainError> {
        let count = self.posts.count_published(None, now).await?;
        Ok(self.posts.list_published(None, now, 0, count).await?)
    }

    async fn with_tags(&self, posts: Vec<Post>) -> Result<Vec<TaggedPost>, DomainError> {
        let ids: Vec<Uuid> = posts.iter().map(|p| p.id).collect();
        let mut tags = self.tags.tags_for_posts(&ids).await?;

        Ok(posts
            .into_iter()
            .map(|post| TaggedPost {
                tags: tags.remove(&post.id).unwrap_or_default(),
                post,
            })
            .collect())
    }
}
