//! Post list, detail, comment, share and search handlers.

use actix_web::{HttpRequest, HttpResponse, web};
use chrono::Utc;
use uuid::Uuid;

use quill_core::domain::Post;
use quill_core::forms::{CommentInput, FormOutcome, SharePostInput};
use quill_core::service::PostListing;
use quill_shared::dto::{
    PageQuery, PostDetailResponse, PostListResponse, SearchParams, SearchResponse, ShareResponse,
};

use super::views;
use crate::middleware::error::AppResult;
use crate::observability::RequestId;
use crate::state::AppState;

/// Path of a post detail page.
type DatePath = web::Path<(i32, u32, u32, String)>;

fn listing_response(listing: PostListing) -> PostListResponse {
    let PostListing { page, tag } = listing;
    PostListResponse {
        page: views::page_info(&page),
        posts: page.items.into_iter().map(views::post_view).collect(),
        tag: tag.map(views::tag_view),
    }
}

/// GET /blog/
pub async fn post_list(
    state: web::Data<AppState>,
    query: web::Query<PageQuery>,
) -> AppResult<HttpResponse> {
    let listing = state
        .blog
        .list_posts(None, query.page.as_deref(), Utc::now())
        .await?;

    Ok(HttpResponse::Ok().json(listing_response(listing)))
}

/// GET /blog/tag/{tag_slug}/
pub async fn post_list_by_tag(
    state: web::Data<AppState>,
    path: web::Path<String>,
    query: web::Query<PageQuery>,
) -> AppResult<HttpResponse> {
    let tag_slug = path.into_inner();
    let listing = state
        .blog
        .list_posts(Some(&tag_slug), query.page.as_deref(), Utc::now())
        .await?;

    Ok(HttpResponse::Ok().json(listing_response(listing)))
}

async fn find_post(state: &AppState, path: DatePath) -> AppResult<Post> {
    let (year, month, day, slug) = path.into_inner();
    Ok(state
        .blog
        .find_post(year, month, day, &slug, Utc::now())
        .await?)
}

async fn detail_response(state: &AppState, post: Post) -> AppResult<PostDetailResponse> {
    let detail = state.blog.post_detail(post, Utc::now()).await?;

    Ok(PostDetailResponse {
        similar_posts: detail.similar_posts.iter().map(views::post_link).collect(),
        post: views::post_view(detail.post),
        comments: detail.comments.into_iter().map(views::comment_view).collect(),
        new_comment: None,
        errors: Default::default(),
    })
}

/// GET /blog/{year}/{month}/{day}/{slug}/
pub async fn post_detail(state: web::Data<AppState>, path: DatePath) -> AppResult<HttpResponse> {
    let post = find_post(&state, path).await?;
    let response = detail_response(&state, post).await?;

    Ok(HttpResponse::Ok().json(response))
}

/// POST /blog/{year}/{month}/{day}/{slug}/
///
/// Invalid input re-renders the page with `errors` and stores nothing.
pub async fn post_comment(
    state: web::Data<AppState>,
    path: DatePath,
    form: web::Form<CommentInput>,
    request_id: RequestId,
) -> AppResult<HttpResponse> {
    let post = find_post(&state, path).await?;
    let outcome = state.blog.submit_comment(&post, form.into_inner()).await?;
    let mut response = detail_response(&state, post).await?;

    match outcome {
        FormOutcome::Accepted(comment) => {
            tracing::info!(request_id = request_id.as_str(), comment_id = %comment.id, "Comment added");
            response.new_comment = Some(views::comment_view(comment));
        }
        FormOutcome::Rejected(errors) => {
            tracing::debug!(request_id = request_id.as_str(), ?errors, "Comment rejected");
            response.errors = errors.into_inner();
        }
    }

    Ok(HttpResponse::Ok().json(response))
}

/// GET /blog/{post_id}/share/
pub async fn share_form(
    state: web::Data<AppState>,
    path: web::Path<Uuid>,
) -> AppResult<HttpResponse> {
    let post = state.blog.find_shareable(path.into_inner(), Utc::now()).await?;

    Ok(HttpResponse::Ok().json(ShareResponse {
        post: views::post_link(&post),
        sent: false,
        errors: Default::default(),
    }))
}

/// POST /blog/{post_id}/share/
pub async fn share_post(
    req: HttpRequest,
    state: web::Data<AppState>,
    path: web::Path<Uuid>,
    form: web::Form<SharePostInput>,
    request_id: RequestId,
) -> AppResult<HttpResponse> {
    let post = state.blog.find_shareable(path.into_inner(), Utc::now()).await?;
    let outcome = state
        .blog
        .share_post(&post, form.into_inner(), &views::site_root(&req))
        .await?;

    let (sent, errors) = match outcome {
        FormOutcome::Accepted(email) => {
            tracing::info!(request_id = request_id.as_str(), post_id = %post.id, to = ?email.to, "Post shared");
            (true, Default::default())
        }
        FormOutcome::Rejected(errors) => (false, errors.into_inner()),
    };

    Ok(HttpResponse::Ok().json(ShareResponse {
        post: views::post_link(&post),
        sent,
        errors,
    }))
}

/// GET /blog/search/?query=
pub async fn post_search(
    state: web::Data<AppState>,
    params: web::Query<SearchParams>,
) -> AppResult<HttpResponse> {
    let outcome = state
        .blog
        .search(params.query.as_deref(), Utc::now())
        .await?;

    Ok(HttpResponse::Ok().json(SearchResponse {
        query: outcome.query,
        results: outcome.results.into_iter().map(views::search_hit).collect(),
        errors: outcome.errors.into_inner(),
    }))
}
