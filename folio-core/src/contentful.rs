//! Contentful delivery API: wire types, entry queries and the HTTP client.
//!
//! The rest of the crate talks to the [`Repository`] trait and never sees
//! reqwest or the JSON layout of a response.

use std::future::Future;

use serde::Deserialize;
use serde_json::{Map, Value};
use tracing::debug;

use crate::config::{ConfigError, ConnectionConfig};

#[derive(Debug, thiserror::Error)]
pub enum FetchError {
    #[error("no repository client in this context")]
    Detached,
    #[error("request failed: {0}")]
    Transport(#[from] reqwest::Error),
    #[error("repository returned {status}: {message}")]
    Status { status: u16, message: String },
    #[error("malformed response: {0}")]
    Decode(#[from] serde_json::Error),
}

/// Content categories defined in the space's content model.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ContentType {
    HomepageSlideshow,
    AboutPage,
    GalleryFolder,
    SocialLink,
}

impl ContentType {
    pub fn id(&self) -> &'static str {
        match self {
            ContentType::HomepageSlideshow => "homepageSlideshow",
            ContentType::AboutPage => "aboutPage",
            ContentType::GalleryFolder => "galleryFolder",
            ContentType::SocialLink => "socialLink",
        }
    }
}

impl std::fmt::Display for ContentType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.id())
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct EntryQuery {
    pub content_type: ContentType,
    pub limit: Option<u32>,
    /// Exact-match filters on entry fields, e.g. `("slug", "nature")`.
    pub fields: Vec<(String, String)>,
}

impl EntryQuery {
    pub fn new(content_type: ContentType) -> Self {
        Self {
            content_type,
            limit: None,
            fields: Vec::new(),
        }
    }

    pub fn limit(mut self, limit: u32) -> Self {
        self.limit = Some(limit);
        self
    }

    pub fn field_equals(mut self, field: &str, value: &str) -> Self {
        self.fields.push((field.to_string(), value.to_string()));
        self
    }

    /// Query string parameters in the delivery API's syntax.
    pub fn params(&self) -> Vec<(String, String)> {
        let mut params = vec![("content_type".to_string(), self.content_type.id().to_string())];
        for (field, value) in &self.fields {
            params.push((format!("fields.{field}"), value.clone()));
        }
        if let Some(limit) = self.limit {
            params.push(("limit".to_string(), limit.to_string()));
        }
        params
    }
}

#[derive(Debug, Clone, Default, Deserialize, PartialEq)]
pub struct Sys {
    pub id: String,
    #[serde(rename = "type", default)]
    pub kind: Option<String>,
    #[serde(rename = "linkType", default)]
    pub link_type: Option<String>,
}

#[derive(Debug, Clone, Deserialize, PartialEq)]
pub struct Entry {
    pub sys: Sys,
    #[serde(default)]
    pub fields: Map<String, Value>,
}

impl Entry {
    pub fn id(&self) -> &str {
        &self.sys.id
    }

    pub fn text(&self, field: &str) -> Option<&str> {
        self.fields
            .get(field)
            .and_then(Value::as_str)
            .filter(|s| !s.is_empty())
    }

    pub fn field(&self, field: &str) -> Option<&Value> {
        self.fields.get(field)
    }
}

#[derive(Debug, Clone, Default, Deserialize, PartialEq)]
pub struct AssetFile {
    #[serde(default)]
    pub url: String,
    #[serde(rename = "contentType", default)]
    pub content_type: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize, PartialEq)]
pub struct AssetFields {
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub file: Option<AssetFile>,
}

#[derive(Debug, Clone, Deserialize, PartialEq)]
pub struct Asset {
    pub sys: Sys,
    #[serde(default)]
    pub fields: AssetFields,
}

#[derive(Debug, Clone, Default, Deserialize, PartialEq)]
pub struct Includes {
    #[serde(rename = "Asset", default)]
    pub assets: Vec<Asset>,
}

/// One page of query results plus the linked assets the API included with it.
#[derive(Debug, Clone, Default, Deserialize, PartialEq)]
pub struct EntryCollection {
    #[serde(default)]
    pub items: Vec<Entry>,
    #[serde(default)]
    pub includes: Includes,
}

impl EntryCollection {
    pub fn asset(&self, id: &str) -> Option<&Asset> {
        self.includes.assets.iter().find(|a| a.sys.id == id)
    }

    /// Resolve a single asset link such as `{"sys": {"type": "Link", "linkType": "Asset", "id": ".."}}`.
    pub fn resolve_asset(&self, link: &Value) -> Option<&Asset> {
        let sys: Sys = serde_json::from_value(link.get("sys")?.clone()).ok()?;
        if sys.link_type.as_deref() != Some("Asset") {
            return None;
        }
        let asset = self.asset(&sys.id);
        if asset.is_none() {
            debug!(asset = %sys.id, "dropping unresolved asset link");
        }
        asset
    }

    /// Resolve an array of asset links, keeping their order and skipping
    /// links the response did not include (unpublished or deleted assets).
    pub fn resolve_assets(&self, links: Option<&Value>) -> Vec<&Asset> {
        links
            .and_then(Value::as_array)
            .map(|links| links.iter().filter_map(|l| self.resolve_asset(l)).collect())
            .unwrap_or_default()
    }
}

#[derive(Debug, Deserialize)]
struct ApiError {
    #[serde(default)]
    message: String,
}

/// Read access to a content repository.
///
/// Implementations must be cheap to share between tasks; the access layer
/// holds one for the life of the process.
pub trait Repository: Send + Sync {
    fn entries(
        &self,
        query: &EntryQuery,
    ) -> impl Future<Output = Result<EntryCollection, FetchError>> + Send;
}

/// HTTP client for the Contentful content delivery API.
#[derive(Debug, Clone)]
pub struct ContentfulClient {
    http: reqwest::Client,
    entries_url: String,
    access_token: String,
}

impl ContentfulClient {
    /// Build a client from validated connection settings. Missing settings are
    /// reported here, once, rather than on every fetch.
    pub fn new(config: &ConnectionConfig) -> Result<Self, ConfigError> {
        config.validate()?;

        Ok(Self {
            http: reqwest::Client::new(),
            entries_url: config.entries_url(),
            access_token: config.access_token.clone(),
        })
    }
}

impl Repository for ContentfulClient {
    async fn entries(&self, query: &EntryQuery) -> Result<EntryCollection, FetchError> {
        debug!(category = %query.content_type, params = ?query.params(), "querying entries");

        let response = self
            .http
            .get(&self.entries_url)
            .bearer_auth(&self.access_token)
            .query(&query.params())
            .send()
            .await?;

        let status = response.status();
        let body = response.text().await?;
        if !status.is_success() {
            let message = serde_json::from_str::<ApiError>(&body)
                .map(|e| e.message)
                .unwrap_or_default();
            return Err(FetchError::Status {
                status: status.as_u16(),
                message,
            });
        }

        Ok(serde_json::from_str(&body)?)
    }
}
