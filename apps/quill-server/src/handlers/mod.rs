//! HTTP handlers and route configuration.

mod feed;
mod health;
mod posts;
mod sitemap;
mod views;

use actix_web::web;

/// Configure all application routes.
///
/// Fixed `/blog/` paths and tag lists are registered before the
/// parameterised post routes so they are matched first.
pub fn configure_routes(cfg: &mut web::ServiceConfig) {
    cfg.route("/health", web::get().to(health::health_check))
        .route("/sitemap.xml", web::get().to(sitemap::sitemap))
        .service(
            web::scope("/blog")
                .route("/", web::get().to(posts::post_list))
                .route("/search/", web::get().to(posts::post_search))
                .route("/feed/", web::get().to(feed::latest_posts_feed))
                .route("/tag/{tag_slug}/", web::get().to(posts::post_list_by_tag))
                .service(
                    web::resource("/{post_id}/share/")
                        .route(web::get().to(posts::share_form))
                        .route(web::post().to(posts::share_post)),
                )
                .service(
                    web::resource("/{year}/{month}/{day}/{slug}/")
                        .route(web::get().to(posts::post_detail))
                        .route(web::post().to(posts::post_comment)),
                ),
        );
}
