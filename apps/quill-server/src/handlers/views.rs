//! Domain → wire conversions shared by the page handlers.

use actix_web::HttpRequest;

use quill_core::domain::{Comment, Post, Tag};
use quill_core::pagination::Page;
use quill_core::ports::RankedPost;
use quill_core::service::TaggedPost;
use quill_shared::dto::{CommentView, PageInfo, PostLink, PostView, SearchHit, TagView};

/// Scheme and host the request arrived on, e.g. `https://example.com`.
pub fn site_root(req: &HttpRequest) -> String {
    let info = req.connection_info();
    format!("{}://{}", info.scheme(), info.host())
}

pub fn tag_view(tag: Tag) -> TagView {
    TagView {
        url: format!("/blog/tag/{}/", tag.slug),
        name: tag.name,
        slug: tag.slug,
    }
}

pub fn post_view(tagged: TaggedPost) -> PostView {
    let TaggedPost { post, tags } = tagged;
    PostView {
        url: post.absolute_path(),
        id: post.id,
        title: post.title,
        slug: post.slug,
        author: post.author,
        body: post.body,
        publish: post.publish,
        tags: tags.into_iter().map(tag_view).collect(),
    }
}

pub fn post_link(post: &Post) -> PostLink {
    PostLink {
        id: post.id,
        title: post.title.clone(),
        url: post.absolute_path(),
    }
}

pub fn comment_view(comment: Comment) -> CommentView {
    CommentView {
        id: comment.id,
        name: comment.name,
        body: comment.body,
        created: comment.created,
    }
}

pub fn search_hit(hit: RankedPost) -> SearchHit {
    let RankedPost { post, rank } = hit;
    SearchHit {
        url: post.absolute_path(),
        id: post.id,
        title: post.title,
        body: post.body,
        publish: post.publish,
        rank,
    }
}

pub fn page_info<T>(page: &Page<T>) -> PageInfo {
    PageInfo {
        number: page.number,
        num_pages: page.num_pages,
        count: page.count,
        has_next: page.has_next(),
        has_previous: page.has_previous(),
    }
}
