use chrono::{TimeZone, Utc};
use sea_orm::{DatabaseBackend, MockDatabase, MockExecResult};
use uuid::Uuid;

use crate::database::entity::{comment, post, tag};
use crate::database::postgres_repo::{
    PostgresCommentRepository, PostgresPostRepository, PostgresTagRepository,
};
use quill_core::domain::{Comment, Post, PostStatus, Tag};
use quill_core::error::RepoError;
use quill_core::ports::{BaseRepository, CommentRepository, PostRepository, TagRepository};

fn post_model(id: Uuid, status: &str) -> post::Model {
    let publish = Utc.with_ymd_and_hms(2024, 3, 7, 9, 30, 0).unwrap();
    post::Model {
        id,
        title: "Test Post".to_owned(),
        slug: "test-post".to_owned(),
        author: "ada".to_owned(),
        body: "Content".to_owned(),
        publish: publish.into(),
        created: publish.into(),
        updated: publish.into(),
        status: status.to_owned(),
    }
}

#[tokio::test]
async fn test_find_post_by_id() {
    let post_id = Uuid::new_v4();

    let db = MockDatabase::new(DatabaseBackend::Postgres)
        .append_query_results([vec![post_model(post_id, "published")]])
        .into_connection();

    let repo = PostgresPostRepository::new(db);

    let result: Option<Post> = repo.find_by_id(post_id).await.unwrap();

    let post = result.unwrap();
    assert_eq!(post.title, "Test Post");
    assert_eq!(post.id, post_id);
    assert_eq!(post.status, PostStatus::Published);
}

#[tokio::test]
async fn test_unknown_status_reads_as_draft() {
    let post_id = Uuid::new_v4();

    let db = MockDatabase::new(DatabaseBackend::Postgres)
        .append_query_results([vec![post_model(post_id, "archived")]])
        .into_connection();

    let repo = PostgresPostRepository::new(db);
    let post: Post = repo.find_by_id(post_id).await.unwrap().unwrap();

    assert_eq!(post.status, PostStatus::Draft);
}

#[tokio::test]
async fn test_find_published_by_date_slug() {
    let post_id = Uuid::new_v4();
    let now = Utc.with_ymd_and_hms(2024, 6, 1, 0, 0, 0).unwrap();

    let db = MockDatabase::new(DatabaseBackend::Postgres)
        .append_query_results([vec![post_model(post_id, "published")]])
        .into_connection();

    let repo = PostgresPostRepository::new(db);
    let date = chrono::NaiveDate::from_ymd_opt(2024, 3, 7).unwrap();

    let post = repo
        .find_published_by_date_slug(date, "test-post", now)
        .await
        .unwrap()
        .unwrap();

    assert_eq!(post.slug, "test-post");
    assert_eq!(post.absolute_path(), "/blog/2024/3/7/test-post/");
}

#[tokio::test]
async fn test_find_published_by_id_miss() {
    let db = MockDatabase::new(DatabaseBackend::Postgres)
        .append_query_results([Vec::<post::Model>::new()])
        .into_connection();

    let repo = PostgresPostRepository::new(db);

    let result = repo
        .find_published_by_id(Uuid::new_v4(), Utc::now())
        .await
        .unwrap();

    assert!(result.is_none());
}

#[tokio::test]
async fn test_save_inserts_new_post() {
    let post_id = Uuid::new_v4();
    let model = post_model(post_id, "draft");

    // Existence check comes back empty, then the INSERT ... RETURNING row.
    let db = MockDatabase::new(DatabaseBackend::Postgres)
        .append_query_results([Vec::<post::Model>::new(), vec![model.clone()]])
        .into_connection();

    let repo = PostgresPostRepository::new(db);
    let saved: Post = repo.save(Post::from(model)).await.unwrap();

    assert_eq!(saved.id, post_id);
    assert_eq!(saved.status, PostStatus::Draft);
}

#[tokio::test]
async fn test_delete_missing_post_is_not_found() {
    let db = MockDatabase::new(DatabaseBackend::Postgres)
        .append_exec_results([MockExecResult {
            last_insert_id: 0,
            rows_affected: 0,
        }])
        .into_connection();

    let repo = PostgresPostRepository::new(db);
    let result = BaseRepository::<Post, Uuid>::delete(&repo, Uuid::new_v4()).await;

    assert!(matches!(result, Err(RepoError::NotFound)));
}

#[tokio::test]
async fn test_find_tag_by_slug() {
    let tag_id = Uuid::new_v4();

    let db = MockDatabase::new(DatabaseBackend::Postgres)
        .append_query_results([vec![tag::Model {
            id: tag_id,
            name: "Rust Lang".to_owned(),
            slug: "rust-lang".to_owned(),
        }]])
        .into_connection();

    let repo = PostgresTagRepository::new(db);
    let tag: Tag = repo.find_by_slug("rust-lang").await.unwrap().unwrap();

    assert_eq!(tag.id, tag_id);
    assert_eq!(tag.name, "Rust Lang");
}

#[tokio::test]
async fn test_tags_for_no_posts_skips_query() {
    let db = MockDatabase::new(DatabaseBackend::Postgres).into_connection();
    let repo = PostgresTagRepository::new(db);

    let tags = repo.tags_for_posts(&[]).await.unwrap();

    assert!(tags.is_empty());
}

#[tokio::test]
async fn test_list_active_comments() {
    let post_id = Uuid::new_v4();
    let created = Utc.with_ymd_and_hms(2024, 3, 8, 10, 0, 0).unwrap();

    let db = MockDatabase::new(DatabaseBackend::Postgres)
        .append_query_results([vec![comment::Model {
            id: Uuid::new_v4(),
            post_id,
            name: "bob".to_owned(),
            email: "bob@example.com".to_owned(),
            body: "Nice read".to_owned(),
            created: created.into(),
            updated: created.into(),
            active: true,
        }]])
        .into_connection();

    let repo = PostgresCommentRepository::new(db);
    let comments: Vec<Comment> = repo.list_active_for_post(post_id).await.unwrap();

    assert_eq!(comments.len(), 1);
    assert_eq!(comments[0].name, "bob");
    assert!(comments[0].active);
}
