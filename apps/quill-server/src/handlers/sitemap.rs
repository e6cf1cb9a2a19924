//! XML sitemap of every published post.

use std::fmt::Write;

use actix_web::{HttpRequest, HttpResponse, web};
use chrono::Utc;

use quill_core::domain::Post;

use super::feed::escape_xml;
use super::views;
use crate::middleware::error::AppResult;
use crate::state::AppState;

const CHANGEFREQ: &str = "weekly";
const PRIORITY: &str = "0.9";

fn render(root: &str, posts: &[Post]) -> String {
    let mut xml = String::from(r#"<?xml version="1.0" encoding="UTF-8"?>"#);
    xml.push_str("\n<urlset xmlns=\"http://www.sitemaps.org/schemas/sitemap/0.9\">");
    for post in posts {
        write!(
            xml,
            "<url><loc>{}</loc><lastmod>{}</lastmod>\
             <changefreq>{CHANGEFREQ}</changefreq><priority>{PRIORITY}</priority></url>",
            escape_xml(&format!("{}{}", root, post.absolute_path())),
            post.updated.format("%Y-%m-%d"),
        )
        .ok();
    }
    xml.push_str("</urlset>\n");
    xml
}

/// GET /sitemap.xml
pub async fn sitemap(req: HttpRequest, state: web::Data<AppState>) -> AppResult<HttpResponse> {
    let posts = state.blog.all_published(Utc::now()).await?;

    Ok(HttpResponse::Ok()
        .content_type("application/xml; charset=utf-8")
        .body(render(&views::site_root(&req), &posts)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn test_entries_use_updated_date() {
        let publish = Utc.with_ymd_and_hms(2024, 3, 7, 9, 30, 0).unwrap();
        let mut post = Post::new("Hello", "ada", "").published_at(publish);
        post.updated = Utc.with_ymd_and_hms(2024, 4, 2, 8, 0, 0).unwrap();

        let xml = render("https://example.com", &[post]);

        assert!(xml.contains("<loc>https://example.com/blog/2024/3/7/hello/</loc>"));
        assert!(xml.contains("<lastmod>2024-04-02</lastmod>"));
        assert!(xml.contains("<changefreq>weekly</changefreq><priority>0.9</priority>"));
    }
}
