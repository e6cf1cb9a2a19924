//! Application configuration loaded from environment variables.

use std::env;

use quill_infra::database::DatabaseConfig;

/// Application configuration.
#[derive(Debug, Clone)]
pub struct AppConfig {
    pub host: String,
    pub port: u16,
    /// No `DATABASE_URL` means the in-memory store.
    pub database: Option<DatabaseConfig>,
    pub mail: MailConfig,
    pub site: SiteConfig,
}

/// Outgoing mail settings.
#[derive(Debug, Clone)]
pub struct MailConfig {
    /// `From:` address of shared-post emails.
    pub sender: String,
    /// HTTP relay endpoint. Without it mail is only logged.
    pub webhook_url: Option<String>,
}

/// Site identity used by the feed and absolute links.
#[derive(Debug, Clone)]
pub struct SiteConfig {
    pub feed_title: String,
    pub feed_description: String,
}

impl Default for SiteConfig {
    fn default() -> Self {
        Self {
            feed_title: "My blog".to_string(),
            feed_description: "New posts of my blog.".to_string(),
        }
    }
}

impl AppConfig {
    /// Load configuration from environment variables.
    pub fn from_env() -> Self {
        let database = env::var("DATABASE_URL").ok().map(|url| {
            let mut config = DatabaseConfig::new(url);
            config.max_connections = env::var("DB_MAX_CONNECTIONS")
                .ok()
                .and_then(|s| s.parse().ok())
                .unwrap_or(config.max_connections);
            config.min_connections = env::var("DB_MIN_CONNECTIONS")
                .ok()
                .and_then(|s| s.parse().ok())
                .unwrap_or(config.min_connections);
            config
        });

        let defaults = SiteConfig::default();

        Self {
            host: env::var("HOST").unwrap_or_else(|_| "127.0.0.1".to_string()),
            port: env::var("PORT")
                .ok()
                .and_then(|p| p.parse().ok())
                .unwrap_or(8080),
            database,
            mail: MailConfig {
                sender: env::var("MAIL_SENDER").unwrap_or_else(|_| "admin@myblog.com".to_string()),
                webhook_url: env::var("MAIL_WEBHOOK_URL").ok().filter(|u| !u.is_empty()),
            },
            site: SiteConfig {
                feed_title: env::var("FEED_TITLE").unwrap_or(defaults.feed_title),
                feed_description: env::var("FEED_DESCRIPTION").unwrap_or(defaults.feed_description),
            },
        }
    }
}
