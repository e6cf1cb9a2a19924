//! Blog use cases driven over the in-memory adapters.

use std::sync::Arc;

use chrono::{DateTime, Duration, TimeZone, Utc};

use quill_core::BlogService;
use quill_core::DomainError;
use quill_core::domain::{Post, Tag};
use quill_core::forms::{CommentInput, REQUIRED, SharePostInput};
use quill_core::ports::{BaseRepository, CommentRepository, TagRepository};

use crate::{InMemoryMailer, InMemoryStore};

fn now() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2024, 6, 1, 12, 0, 0).unwrap()
}

struct Blog {
    store: InMemoryStore,
    mailer: Arc<InMemoryMailer>,
    service: BlogService,
}

impl Blog {
    fn new() -> Self {
        Self::with_mailer(InMemoryMailer::new())
    }

    fn with_mailer(mailer: InMemoryMailer) -> Self {
        let store = InMemoryStore::new();
        let mailer = Arc::new(mailer);
        let service = BlogService::new(
            Arc::new(store.posts()),
            Arc::new(store.tags()),
            Arc::new(store.comments()),
            mailer.clone(),
            "admin@myblog.com",
        );
        Self {
            store,
            mailer,
            service,
        }
    }

    async fn tag(&self, name: &str) -> Tag {
        self.store.tags().save(Tag::new(name)).await.unwrap()
    }

    async fn post(&self, post: Post, tags: &[&Tag]) -> Post {
        let post = self.store.posts().save(post).await.unwrap();
        let ids: Vec<_> = tags.iter().map(|t| t.id).collect();
        self.store.tags().set_post_tags(post.id, &ids).await.unwrap();
        post
    }

    async fn published(&self, title: &str, body: &str, days_ago: i64, tags: &[&Tag]) -> Post {
        let post = Post::new(title, "ada", body).published_at(now() - Duration::days(days_ago));
        self.post(post, tags).await
    }
}

fn titles(posts: &[Post]) -> Vec<&str> {
    posts.iter().map(|p| p.title.as_str()).collect()
}

#[tokio::test]
async fn test_draft_is_hidden_from_listing_and_search() {
    let blog = Blog::new();
    let django = blog.tag("django").await;
    blog.published("Django Tips", "Use the ORM", 1, &[&django])
        .await;
    blog.post(Post::new("Draft Notes", "ada", "django ideas"), &[&django])
        .await;

    let listing = blog.service.list_posts(None, None, now()).await.unwrap();
    let listed: Vec<&str> = listing
        .page
        .items
        .iter()
        .map(|p| p.post.title.as_str())
        .collect();
    assert_eq!(listed, vec!["Django Tips"]);

    let search = blog.service.search(Some("django"), now()).await.unwrap();
    assert_eq!(search.query.as_deref(), Some("django"));
    let found: Vec<&str> = search.results.iter().map(|r| r.post.title.as_str()).collect();
    assert_eq!(found, vec!["Django Tips"]);
}

#[tokio::test]
async fn test_listing_pages_newest_first() {
    let blog = Blog::new();
    for day in 1..=5 {
        blog.published(&format!("Post {day}"), "", day, &[]).await;
    }

    let first = blog.service.list_posts(None, None, now()).await.unwrap();
    assert_eq!(first.page.number, 1);
    assert_eq!(first.page.num_pages, 2);
    assert_eq!(first.page.count, 5);
    let first_titles: Vec<&str> = first.page.items.iter().map(|p| p.post.title.as_str()).collect();
    assert_eq!(first_titles, vec!["Post 1", "Post 2", "Post 3"]);

    let invalid = blog.service.list_posts(None, Some("abc"), now()).await.unwrap();
    assert_eq!(invalid.page.number, 1);
    assert_eq!(invalid.page.items, first.page.items);

    let beyond = blog.service.list_posts(None, Some("9"), now()).await.unwrap();
    assert_eq!(beyond.page.number, 2);
    assert_eq!(beyond.page.items.len(), 2);
    assert!(!beyond.page.has_next());
}

#[tokio::test]
async fn test_listing_filters_by_tag() {
    let blog = Blog::new();
    let rust = blog.tag("rust").await;
    let go = blog.tag("go").await;
    blog.published("Borrowing", "", 1, &[&rust]).await;
    blog.published("Goroutines", "", 2, &[&go]).await;

    let listing = blog
        .service
        .list_posts(Some("rust"), None, now())
        .await
        .unwrap();

    assert_eq!(listing.tag.as_ref().map(|t| t.slug.as_str()), Some("rust"));
    assert_eq!(listing.page.items.len(), 1);
    assert_eq!(listing.page.items[0].post.title, "Borrowing");
    assert_eq!(listing.page.items[0].tags, vec![rust]);
}

#[tokio::test]
async fn test_unknown_tag_is_not_found() {
    let blog = Blog::new();
    blog.published("Anything", "", 1, &[]).await;

    let result = blog.service.list_posts(Some("missing"), None, now()).await;

    assert!(matches!(result, Err(DomainError::NotFound { .. })));
}

#[tokio::test]
async fn test_detail_lookup_by_date_and_slug() {
    let blog = Blog::new();
    let publish = Utc.with_ymd_and_hms(2024, 3, 7, 9, 30, 0).unwrap();
    blog.post(Post::new("My Post", "ada", "").published_at(publish), &[])
        .await;

    let post = blog
        .service
        .find_post(2024, 3, 7, "my-post", now())
        .await
        .unwrap();
    assert_eq!(post.title, "My Post");

    let wrong_day = blog.service.find_post(2024, 3, 8, "my-post", now()).await;
    assert!(matches!(wrong_day, Err(DomainError::NotFound { .. })));

    let bad_date = blog.service.find_post(2024, 2, 30, "my-post", now()).await;
    assert!(matches!(bad_date, Err(DomainError::NotFound { .. })));
}

#[tokio::test]
async fn test_detail_shows_active_comments_and_similar_posts() {
    let blog = Blog::new();
    let a = blog.tag("a").await;
    let b = blog.tag("b").await;
    let c = blog.tag("c").await;

    let target = blog.published("Target", "", 1, &[&a, &b]).await;
    blog.published("One shared", "", 2, &[&a]).await;
    blog.published("Two shared", "", 10, &[&a, &b]).await;
    blog.published("Unrelated", "", 3, &[&c]).await;
    blog.post(Post::new("Hidden draft", "ada", ""), &[&a, &b]).await;

    let comments = blog.store.comments();
    comments
        .save(quill_core::domain::Comment::new(
            target.id,
            "bob".into(),
            "bob@example.com".into(),
            "Great".into(),
        ))
        .await
        .unwrap();
    comments
        .save(
            quill_core::domain::Comment::new(
                target.id,
                "spam".into(),
                "spam@example.com".into(),
                "Buy now".into(),
            )
            .deactivated(),
        )
        .await
        .unwrap();

    let detail = blog.service.post_detail(target, now()).await.unwrap();

    assert_eq!(detail.post.tags, vec![a, b]);
    assert_eq!(detail.comments.len(), 1);
    assert_eq!(detail.comments[0].name, "bob");
    assert_eq!(
        titles(&detail.similar_posts),
        vec!["Two shared", "One shared"]
    );
}

#[tokio::test]
async fn test_blank_comment_is_rejected_and_not_stored() {
    let blog = Blog::new();
    let post = blog.published("Post", "", 1, &[]).await;

    let input = CommentInput {
        name: "  ".into(),
        email: "bob@example.com".into(),
        body: String::new(),
    };
    let outcome = blog.service.submit_comment(&post, input).await.unwrap();

    let errors = outcome.errors().unwrap();
    assert_eq!(errors.get("name"), Some(&[REQUIRED.to_string()][..]));
    assert_eq!(errors.get("body"), Some(&[REQUIRED.to_string()][..]));
    assert!(errors.get("email").is_none());

    let stored = blog.store.comments().list_active_for_post(post.id).await.unwrap();
    assert!(stored.is_empty());
}

#[tokio::test]
async fn test_valid_comment_is_stored() {
    let blog = Blog::new();
    let post = blog.published("Post", "", 1, &[]).await;

    let input = CommentInput {
        name: "Bob".into(),
        email: "bob@example.com".into(),
        body: "Nice".into(),
    };
    let outcome = blog.service.submit_comment(&post, input).await.unwrap();

    let comment = outcome.accepted().unwrap();
    assert!(comment.active);
    let stored = blog.store.comments().list_active_for_post(post.id).await.unwrap();
    assert_eq!(stored, vec![comment.clone()]);
}

#[tokio::test]
async fn test_share_sends_one_email() {
    let blog = Blog::new();
    let publish = Utc.with_ymd_and_hms(2024, 3, 7, 9, 30, 0).unwrap();
    let post = blog
        .post(Post::new("My Post", "ada", "").published_at(publish), &[])
        .await;

    let input = SharePostInput {
        name: "Ada".into(),
        email: "ada@example.com".into(),
        to: "friend@example.com".into(),
        comments: "Worth it".into(),
    };
    let outcome = blog
        .service
        .share_post(&post, input, "http://localhost:8080/")
        .await
        .unwrap();
    assert!(outcome.accepted().is_some());

    let sent = blog.mailer.sent().await;
    assert_eq!(sent.len(), 1);
    assert_eq!(sent[0].from, "admin@myblog.com");
    assert_eq!(sent[0].to, vec!["friend@example.com".to_string()]);
    assert_eq!(sent[0].subject, "Ada recommends you read My Post");
    assert_eq!(
        sent[0].body,
        "Read My Post at http://localhost:8080/blog/2024/3/7/my-post/\n\nAda's comments: Worth it"
    );
}

#[tokio::test]
async fn test_invalid_share_sends_nothing() {
    let blog = Blog::new();
    let post = blog.published("Post", "", 1, &[]).await;

    let input = SharePostInput {
        name: "Ada".into(),
        email: "ada@example.com".into(),
        to: "not-an-address".into(),
        comments: String::new(),
    };
    let outcome = blog
        .service
        .share_post(&post, input, "http://localhost")
        .await
        .unwrap();

    assert!(outcome.errors().unwrap().get("to").is_some());
    assert!(blog.mailer.sent().await.is_empty());
}

#[tokio::test]
async fn test_share_surfaces_mail_failure() {
    let blog = Blog::with_mailer(InMemoryMailer::failing("relay down"));
    let post = blog.published("Post", "", 1, &[]).await;

    let input = SharePostInput {
        name: "Ada".into(),
        email: "ada@example.com".into(),
        to: "friend@example.com".into(),
        comments: String::new(),
    };
    let result = blog.service.share_post(&post, input, "http://localhost").await;

    assert!(matches!(result, Err(DomainError::Mail(_))));
}

#[tokio::test]
async fn test_draft_cannot_be_shared() {
    let blog = Blog::new();
    let draft = blog.post(Post::new("Draft", "ada", ""), &[]).await;

    let result = blog.service.find_shareable(draft.id, now()).await;

    assert!(matches!(result, Err(DomainError::NotFound { .. })));
}

#[tokio::test]
async fn test_search_ranks_title_hits_above_body_hits() {
    let blog = Blog::new();
    blog.published("Async Rust", "futures and executors", 5, &[])
        .await;
    blog.published("Notes", "rust rust everywhere", 1, &[]).await;
    blog.published("Single mention", "some rust here", 2, &[])
        .await;

    let search = blog.service.search(Some("Rust"), now()).await.unwrap();
    let found: Vec<&str> = search.results.iter().map(|r| r.post.title.as_str()).collect();

    // A lone body hit ranks about 0.24, below the cut-off.
    assert_eq!(found, vec!["Async Rust", "Notes"]);
    assert!(search.results[0].rank > search.results[1].rank);
}

#[tokio::test]
async fn test_blank_search_reports_required() {
    let blog = Blog::new();

    let search = blog.service.search(Some("   "), now()).await.unwrap();
    assert_eq!(search.errors.get("query"), Some(&[REQUIRED.to_string()][..]));
    assert!(search.results.is_empty());

    let unbound = blog.service.search(None, now()).await.unwrap();
    assert!(unbound.errors.is_empty());
    assert!(unbound.query.is_none());
}

#[tokio::test]
async fn test_feed_and_sitemap_skip_hidden_posts() {
    let blog = Blog::new();
    for day in 1..=6 {
        blog.published(&format!("Post {day}"), "", day, &[]).await;
    }
    blog.post(Post::new("Draft", "ada", ""), &[]).await;
    blog.post(
        Post::new("Scheduled", "ada", "").published_at(now() + Duration::days(1)),
        &[],
    )
    .await;

    let feed = blog.service.latest_posts(now()).await.unwrap();
    assert_eq!(
        titles(&feed),
        vec!["Post 1", "Post 2", "Post 3", "Post 4", "Post 5"]
    );

    let sitemap = blog.service.all_published(now()).await.unwrap();
    assert_eq!(sitemap.len(), 6);
}

#[tokio::test]
async fn test_scheduled_post_is_hidden_from_detail_similar_and_search() {
    let blog = Blog::new();
    let rust = blog.tag("rust").await;
    let target = blog
        .published("Rust Ownership", "borrowing", 3, &[&rust])
        .await;
    blog.published("Rust Lifetimes", "", 2, &[&rust]).await;
    let scheduled = blog
        .post(
            Post::new("Rust Upcoming Release", "ada", "").published_at(now() + Duration::days(1)),
            &[&rust],
        )
        .await;

    let lookup = blog
        .service
        .find_post(2024, 6, 2, &scheduled.slug, now())
        .await;
    assert!(matches!(lookup, Err(DomainError::NotFound { .. })));

    let detail = blog.service.post_detail(target, now()).await.unwrap();
    assert_eq!(titles(&detail.similar_posts), vec!["Rust Lifetimes"]);

    let search = blog.service.search(Some("rust"), now()).await.unwrap();
    let found: Vec<&str> = search.results.iter().map(|r| r.post.title.as_str()).collect();
    assert_eq!(found, vec!["Rust Lifetimes", "Rust Ownership"]);
}
