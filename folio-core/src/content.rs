//! Normalized content types consumed by the pages.
//!
//! Each type is built from a raw [`Entry`] plus the [`EntryCollection`] it came
//! in, so that linked assets can be resolved.

use serde::Serialize;
use tracing::warn;

use crate::contentful::{Asset, Entry, EntryCollection};
use crate::route::is_slug;

/// Complete a protocol-relative URL (`//images.ctfassets.net/...`) with `https:`.
/// URLs that already carry a scheme are returned unchanged.
pub fn with_scheme(url: &str) -> String {
    if url.starts_with("//") {
        format!("https:{url}")
    } else {
        url.to_string()
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Photo {
    pub id: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    /// Scheme-completed image URL, ready for an `src` attribute.
    pub url: String,
}

impl Photo {
    pub fn from_asset(asset: &Asset) -> Option<Self> {
        let file = asset.fields.file.as_ref().filter(|f| !f.url.is_empty());
        let Some(file) = file else {
            warn!(asset = %asset.sys.id, "asset has no file, skipping");
            return None;
        };

        Some(Self {
            id: asset.sys.id.clone(),
            title: asset.fields.title.clone().filter(|t| !t.is_empty()),
            url: with_scheme(&file.url),
        })
    }

    fn list(entry: &Entry, field: &str, collection: &EntryCollection) -> Vec<Photo> {
        collection
            .resolve_assets(entry.field(field))
            .into_iter()
            .filter_map(Photo::from_asset)
            .collect()
    }

    fn single(entry: &Entry, field: &str, collection: &EntryCollection) -> Option<Photo> {
        entry
            .field(field)
            .and_then(|link| collection.resolve_asset(link))
            .and_then(Photo::from_asset)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct GalleryFolder {
    pub id: String,
    pub title: String,
    pub slug: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    pub photos: Vec<Photo>,
}

impl GalleryFolder {
    /// Entries without a URL-safe slug cannot be routed to and are skipped.
    pub fn from_entry(entry: &Entry, collection: &EntryCollection) -> Option<Self> {
        let Some(slug) = entry.text("slug") else {
            warn!(entry = %entry.id(), "gallery folder has no slug, skipping");
            return None;
        };
        if !is_slug(slug) {
            warn!(entry = %entry.id(), %slug, "gallery folder slug is not URL-safe, skipping");
            return None;
        }

        Some(Self {
            id: entry.id().to_string(),
            title: entry.text("title").unwrap_or(slug).to_string(),
            slug: slug.to_string(),
            description: entry.text("description").map(str::to_string),
            photos: Photo::list(entry, "photos", collection),
        })
    }

    pub fn href(&self) -> String {
        format!("/gallery/{}", self.slug)
    }

    pub fn meta_description(&self) -> String {
        self.description
            .clone()
            .unwrap_or_else(|| format!("Photos from {}", self.title))
    }
}

#[derive(Debug, Clone, PartialEq, Default, Serialize)]
pub struct SlideshowConfig {
    pub title: Option<String>,
    pub images: Vec<Photo>,
}

impl SlideshowConfig {
    pub fn from_entry(entry: &Entry, collection: &EntryCollection) -> Self {
        Self {
            title: entry.text("title").map(str::to_string),
            images: Photo::list(entry, "images", collection),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Default, Serialize)]
pub struct AboutPageContent {
    pub heading: Option<String>,
    pub description: Option<String>,
    pub image: Option<Photo>,
}

impl AboutPageContent {
    pub fn from_entry(entry: &Entry, collection: &EntryCollection) -> Self {
        Self {
            heading: entry.text("heading").map(str::to_string),
            description: entry.text("description").map(str::to_string),
            image: Photo::single(entry, "image", collection),
        }
    }

    /// The description as HTML: text escaped, newlines turned into `<br />`.
    pub fn description_html(&self) -> Option<String> {
        self.description.as_deref().map(|text| {
            html_escape::encode_text(text)
                .replace("\r\n", "\n")
                .replace('\n', "<br />")
        })
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SocialLink {
    pub id: String,
    pub platform_name: String,
    pub url: String,
}

impl SocialLink {
    pub fn from_entry(entry: &Entry) -> Option<Self> {
        let url = entry.text("url")?;

        Some(Self {
            id: entry.id().to_string(),
            platform_name: entry.text("platformName").unwrap_or(url).to_string(),
            url: url.to_string(),
        })
    }
}
