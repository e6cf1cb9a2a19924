//! Application state - shared across all handlers.

use std::sync::Arc;

use quill_core::BlogService;
use quill_core::ports::{CommentRepository, Mailer, PostRepository, TagRepository};
use quill_infra::{InMemoryStore, LogMailer};

use crate::config::{AppConfig, MailConfig, SiteConfig};

#[cfg(feature = "postgres")]
use quill_infra::{
    PostgresCommentRepository, PostgresPostRepository, PostgresTagRepository, connect,
};

#[cfg(feature = "http-mail")]
use quill_infra::WebhookMailer;

type Repositories = (
    Arc<dyn PostRepository>,
    Arc<dyn TagRepository>,
    Arc<dyn CommentRepository>,
);

/// Shared application state.
#[derive(Clone)]
pub struct AppState {
    pub blog: BlogService,
    pub site: SiteConfig,
}

impl AppState {
    /// Build the application state with appropriate implementations.
    pub async fn new(config: &AppConfig) -> Self {
        let (posts, tags, comments) = repositories(config).await;
        let mailer = mailer(&config.mail);

        tracing::info!("Application state initialized");

        Self {
            blog: BlogService::new(posts, tags, comments, mailer, config.mail.sender.clone()),
            site: config.site.clone(),
        }
    }

    /// State over an in-memory store.
    #[cfg(test)]
    pub fn in_memory(
        store: &InMemoryStore,
        mailer: Arc<dyn Mailer>,
        sender: &str,
        site: SiteConfig,
    ) -> Self {
        Self {
            blog: BlogService::new(
                Arc::new(store.posts()),
                Arc::new(store.tags()),
                Arc::new(store.comments()),
                mailer,
                sender,
            ),
            site,
        }
    }
}

fn in_memory_repositories() -> Repositories {
    let store = InMemoryStore::new();
    (
        Arc::new(store.posts()),
        Arc::new(store.tags()),
        Arc::new(store.comments()),
    )
}

#[cfg(feature = "postgres")]
async fn repositories(config: &AppConfig) -> Repositories {
    let Some(db_config) = &config.database else {
        tracing::warn!("DATABASE_URL not set. Running without database (in-memory mode).");
        return in_memory_repositories();
    };

    match connect(db_config).await {
        Ok(conn) => (
            Arc::new(PostgresPostRepository::new(conn.clone())),
            Arc::new(PostgresTagRepository::new(conn.clone())),
            Arc::new(PostgresCommentRepository::new(conn)),
        ),
        Err(e) => {
            tracing::error!(
                "Failed to connect to database: {}. Using in-memory fallback.",
                e
            );
            in_memory_repositories()
        }
    }
}

#[cfg(not(feature = "postgres"))]
async fn repositories(config: &AppConfig) -> Repositories {
    if config.database.is_some() {
        tracing::warn!("DATABASE_URL ignored: built without the postgres feature");
    }
    tracing::info!("Running without postgres feature - using in-memory repository");
    in_memory_repositories()
}

fn mailer(config: &MailConfig) -> Arc<dyn Mailer> {
    match &config.webhook_url {
        #[cfg(feature = "http-mail")]
        Some(url) => {
            tracing::info!("Mail relay configured");
            Arc::new(WebhookMailer::new(url.clone()))
        }
        #[cfg(not(feature = "http-mail"))]
        Some(_) => {
            tracing::warn!("MAIL_WEBHOOK_URL ignored: built without the http-mail feature");
            Arc::new(LogMailer)
        }
        None => {
            tracing::info!("No mail relay configured - emails are logged only");
            Arc::new(LogMailer)
        }
    }
}
