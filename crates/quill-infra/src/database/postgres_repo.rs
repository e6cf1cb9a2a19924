//! PostgreSQL repository implementations.

use std::collections::HashMap;

use async_trait::async_trait;
use chrono::{DateTime, NaiveDate, Utc};
use sea_orm::{
    ColumnTrait, DbBackend, EntityTrait, FromQueryResult, JoinType, PaginatorTrait, QueryFilter,
    QueryOrder, QuerySelect, RelationTrait, Select, Statement, TransactionTrait,
};
use uuid::Uuid;

use quill_core::domain::{Comment, Post, PostStatus, Tag};
use quill_core::error::RepoError;
use quill_core::ports::{CommentRepository, PostRepository, RankedPost, TagRepository};

use super::entity::comment::{self, Entity as CommentEntity};
use super::entity::post::{self, Entity as PostEntity};
use super::entity::post_tag::{self, Entity as PostTagEntity};
use super::entity::tag::{self, Entity as TagEntity};
use super::postgres_base::{PostgresBaseRepository, query_error};

/// PostgreSQL post repository.
pub type PostgresPostRepository = PostgresBaseRepository<PostEntity>;

/// PostgreSQL tag repository.
pub type PostgresTagRepository = PostgresBaseRepository<TagEntity>;

/// PostgreSQL comment repository.
pub type PostgresCommentRepository = PostgresBaseRepository<CommentEntity>;

/// Weighted document vector shared by the search query.
const SEARCH_VECTOR: &str = "setweight(to_tsvector(coalesce(p.title, '')), 'A') \
     || setweight(to_tsvector(coalesce(p.body, '')), 'B')";

/// Published posts visible at `now`.
fn published(now: DateTime<Utc>) -> Select<PostEntity> {
    PostEntity::find()
        .filter(post::Column::Status.eq(PostStatus::Published.as_str()))
        .filter(post::Column::Publish.lte(now))
}

fn published_with_tag(tag_id: Option<Uuid>, now: DateTime<Utc>) -> Select<PostEntity> {
    let select = published(now);
    match tag_id {
        Some(tag_id) => select
            .join(JoinType::InnerJoin, post::Relation::PostTag.def())
            .filter(post_tag::Column::TagId.eq(tag_id)),
        None => select,
    }
}

/// Row shape of the ranked search query.
#[derive(Debug, FromQueryResult)]
struct RankedRow {
    id: Uuid,
    title: String,
    slug: String,
    author: String,
    body: String,
    publish: DateTime<Utc>,
    created: DateTime<Utc>,
    updated: DateTime<Utc>,
    status: String,
    rank: f32,
}

impl From<RankedRow> for RankedPost {
    fn from(row: RankedRow) -> Self {
        Self {
            post: Post {
                id: row.id,
                title: row.title,
                slug: row.slug,
                author: row.author,
                body: row.body,
                publish: row.publish,
                created: row.created,
                updated: row.updated,
                status: row.status.parse().unwrap_or(PostStatus::Draft),
            },
            rank: row.rank,
        }
    }
}

#[async_trait]
impl PostRepository for PostgresPostRepository {
    async fn count_published(
        &self,
        tag_id: Option<Uuid>,
        now: DateTime<Utc>,
    ) -> Result<u64, RepoError> {
        published_with_tag(tag_id, now)
            .count(&self.db)
            .await
            .map_err(query_error)
    }

    async fn list_published(
        &self,
        tag_id: Option<Uuid>,
        now: DateTime<Utc>,
        offset: u64,
        limit: u64,
    ) -> Result<Vec<Post>, RepoError> {
        let result = published_with_tag(tag_id, now)
            .order_by_desc(post::Column::Publish)
            .order_by_asc(post::Column::Title)
            .order_by_asc(post::Column::Id)
            .offset(offset)
            .limit(limit)
            .all(&self.db)
            .await
            .map_err(query_error)?;

        Ok(result.into_iter().map(Into::into).collect())
    }

    async fn find_published_by_date_slug(
        &self,
        date: NaiveDate,
        slug: &str,
        now: DateTime<Utc>,
    ) -> Result<Option<Post>, RepoError> {
        let Some(day_start) = date.and_hms_opt(0, 0, 0).map(|t| t.and_utc()) else {
            return Ok(None);
        };
        let day_end = day_start + chrono::Duration::days(1);

        tracing::debug!(%date, slug, "Finding post by publish date and slug");

        let result = published(now)
            .filter(post::Column::Slug.eq(slug))
            .filter(post::Column::Publish.gte(day_start))
            .filter(post::Column::Publish.lt(day_end))
            .one(&self.db)
            .await
            .map_err(query_error)?;

        Ok(result.map(Into::into))
    }

    async fn find_published_by_id(
        &self,
        id: Uuid,
        now: DateTime<Utc>,
    ) -> Result<Option<Post>, RepoError> {
        let result = published(now)
            .filter(post::Column::Id.eq(id))
            .one(&self.db)
            .await
            .map_err(query_error)?;

        Ok(result.map(Into::into))
    }

    async fn find_similar(
        &self,
        post: &Post,
        now: DateTime<Utc>,
        limit: u64,
    ) -> Result<Vec<Post>, RepoError> {
        let statement = Statement::from_sql_and_values(
            DbBackend::Postgres,
            r#"
                SELECT p.* FROM posts p
                JOIN post_tags pt ON pt.post_id = p.id
                WHERE pt.tag_id IN (SELECT tag_id FROM post_tags WHERE post_id = $1)
                  AND p.id <> $1
                  AND p.status = $2
                  AND p.publish <= $3
                GROUP BY p.id
                ORDER BY COUNT(pt.tag_id) DESC, p.publish DESC
                LIMIT $4
            "#,
            [
                post.id.into(),
                PostStatus::Published.as_str().into(),
                now.into(),
                (limit as i64).into(),
            ],
        );

        let result = PostEntity::find()
            .from_raw_sql(statement)
            .all(&self.db)
            .await
            .map_err(query_error)?;

        Ok(result.into_iter().map(Into::into).collect())
    }

    async fn search_published(
        &self,
        query: &str,
        min_rank: f32,
        now: DateTime<Utc>,
    ) -> Result<Vec<RankedPost>, RepoError> {
        let sql = format!(
            r#"
                SELECT * FROM (
                    SELECT p.*, ts_rank({SEARCH_VECTOR}, plainto_tsquery($1)) AS rank
                    FROM posts p
                    WHERE p.status = $2 AND p.publish <= $3
                ) ranked
                WHERE ranked.rank >= $4
                ORDER BY ranked.rank DESC, ranked.publish DESC
            "#
        );
        let statement = Statement::from_sql_and_values(
            DbBackend::Postgres,
            sql,
            [
                query.into(),
                PostStatus::Published.as_str().into(),
                now.into(),
                min_rank.into(),
            ],
        );

        let rows = RankedRow::find_by_statement(statement)
            .all(&self.db)
            .await
            .map_err(query_error)?;

        tracing::debug!(query, hits = rows.len(), "Full-text search");

        Ok(rows.into_iter().map(Into::into).collect())
    }
}

#[async_trait]
impl TagRepository for PostgresTagRepository {
    async fn find_by_slug(&self, slug: &str) -> Result<Option<Tag>, RepoError> {
        let result = TagEntity::find()
            .filter(tag::Column::Slug.eq(slug))
            .one(&self.db)
            .await
            .map_err(query_error)?;

        Ok(result.map(Into::into))
    }

    async fn tags_for_posts(&self, post_ids: &[Uuid]) -> Result<HashMap<Uuid, Vec<Tag>>, RepoError> {
        let mut tags: HashMap<Uuid, Vec<Tag>> =
            post_ids.iter().map(|id| (*id, Vec::new())).collect();
        if post_ids.is_empty() {
            return Ok(tags);
        }

        let links = PostTagEntity::find()
            .filter(post_tag::Column::PostId.is_in(post_ids.iter().copied()))
            .find_also_related(TagEntity)
            .order_by_asc(tag::Column::Name)
            .all(&self.db)
            .await
            .map_err(query_error)?;

        for (link, tag) in links {
            if let Some(tag) = tag {
                tags.entry(link.post_id).or_default().push(tag.into());
            }
        }

        Ok(tags)
    }

    async fn set_post_tags(&self, post_id: Uuid, tag_ids: &[Uuid]) -> Result<(), RepoError> {
        let txn = self.db.begin().await.map_err(query_error)?;

        PostTagEntity::delete_many()
            .filter(post_tag::Column::PostId.eq(post_id))
            .exec(&txn)
            .await
            .map_err(query_error)?;

        if !tag_ids.is_empty() {
            let links = tag_ids.iter().map(|tag_id| post_tag::ActiveModel {
                post_id: sea_orm::Set(post_id),
                tag_id: sea_orm::Set(*tag_id),
            });
            PostTagEntity::insert_many(links)
                .exec_without_returning(&txn)
                .await
                .map_err(query_error)?;
        }

        txn.commit().await.map_err(query_error)
    }
}

#[async_trait]
impl CommentRepository for PostgresCommentRepository {
    async fn list_active_for_post(&self, post_id: Uuid) -> Result<Vec<Comment>, RepoError> {
        let result = CommentEntity::find()
            .filter(comment::Column::PostId.eq(post_id))
            .filter(comment::Column::Active.eq(true))
            .order_by_asc(comment::Column::Created)
            .all(&self.db)
            .await
            .map_err(query_error)?;

        Ok(result.into_iter().map(Into::into).collect())
    }
}
