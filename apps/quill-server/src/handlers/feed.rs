//! RSS 2.0 feed of the latest posts.

use std::fmt::Write;

use actix_web::{HttpRequest, HttpResponse, web};
use chrono::Utc;

use quill_core::domain::Post;

use super::views;
use crate::middleware::error::AppResult;
use crate::state::AppState;

/// Words of body text kept per feed item.
const SUMMARY_WORDS: usize = 30;

/// Escape text for XML element content and attributes.
pub(crate) fn escape_xml(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&apos;"),
            c => out.push(c),
        }
    }
    out
}

/// First `limit` whitespace-separated words, with ` …` appended when cut.
fn truncate_words(text: &str, limit: usize) -> String {
    let words: Vec<&str> = text.split_whitespace().collect();
    if words.len() <= limit {
        return words.join(" ");
    }
    format!("{} …", words[..limit].join(" "))
}

fn render(title: &str, description: &str, root: &str, posts: &[Post]) -> String {
    let mut xml = String::from(r#"<?xml version="1.0" encoding="utf-8"?>"#);
    xml.push_str("\n<rss version=\"2.0\"><channel>");
    write!(
        xml,
        "<title>{}</title><link>{}/blog/</link><description>{}</description>",
        escape_xml(title),
        escape_xml(root),
        escape_xml(description),
    )
    .ok();
    if let Some(latest) = posts.first() {
        write!(xml, "<lastBuildDate>{}</lastBuildDate>", latest.publish.to_rfc2822()).ok();
    }

    for post in posts {
        let link = escape_xml(&format!("{}{}", root, post.absolute_path()));
        write!(
            xml,
            "<item><title>{}</title><link>{link}</link><description>{}</description>\
             <pubDate>{}</pubDate><guid>{link}</guid></item>",
            escape_xml(&post.title),
            escape_xml(&truncate_words(&post.body, SUMMARY_WORDS)),
            post.publish.to_rfc2822(),
        )
        .ok();
    }

    xml.push_str("</channel></rss>\n");
    xml
}

/// GET /blog/feed/
pub async fn latest_posts_feed(
    req: HttpRequest,
    state: web::Data<AppState>,
) -> AppResult<HttpResponse> {
    let posts = state.blog.latest_posts(Utc::now()).await?;
    let body = render(
        &state.site.feed_title,
        &state.site.feed_description,
        &views::site_root(&req),
        &posts,
    );

    Ok(HttpResponse::Ok()
        .content_type("application/rss+xml; charset=utf-8")
        .body(body))
}
