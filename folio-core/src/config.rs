use serde::{Deserialize, Serialize};

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("missing required setting `{0}`; set it in folio.toml or the environment")]
    MissingSetting(&'static str),
}

/// Site-wide values shared by every page (head tags, header and footer).
#[derive(Deserialize, Serialize, Debug, Clone)]
#[serde(default)]
pub struct SiteConfig {
    pub title: String,
    pub tagline: String,
    pub copyright: String,
    pub description: String,
}

impl Default for SiteConfig {
    fn default() -> Self {
        Self {
            title: "Portfolio".into(),
            tagline: "Capturing moments, preserving memories".into(),
            copyright: "Photography Portfolio".into(),
            description: "Welcome to my photography portfolio".into(),
        }
    }
}

/// Connection settings for the Contentful delivery API.
///
/// `space_id` and `access_token` are required. Everything else has a default.
/// Call [`ConnectionConfig::validate`] once at startup; a client is never built
/// from an unvalidated config.
#[derive(Deserialize, Serialize, Debug, Clone)]
#[serde(default)]
pub struct ConnectionConfig {
    pub space_id: String,
    pub access_token: String,
    pub environment: String,
    pub host: String,
}

impl Default for ConnectionConfig {
    fn default() -> Self {
        Self {
            space_id: String::new(),
            access_token: String::new(),
            environment: "master".into(),
            host: "cdn.contentful.com".into(),
        }
    }
}

impl ConnectionConfig {
    pub fn new(space_id: impl Into<String>, access_token: impl Into<String>) -> Self {
        Self {
            space_id: space_id.into(),
            access_token: access_token.into(),
            ..Self::default()
        }
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.space_id.trim().is_empty() {
            return Err(ConfigError::MissingSetting("CONTENTFUL_SPACE_ID"));
        }
        if self.access_token.trim().is_empty() {
            return Err(ConfigError::MissingSetting("CONTENTFUL_ACCESS_TOKEN"));
        }
        Ok(())
    }

    /// `host` is a bare hostname served over https, or a full `scheme://host[:port]` base.
    pub fn entries_url(&self) -> String {
        let host = self.host.trim_end_matches('/');
        let base = if host.contains("://") {
            host.to_string()
        } else {
            format!("https://{host}")
        };
        format!(
            "{base}/spaces/{}/environments/{}/entries",
            self.space_id, self.environment
        )
    }
}
