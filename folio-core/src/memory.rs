//! In-memory [`Repository`] for tests.

use std::collections::HashSet;
use std::sync::Mutex;
use std::sync::atomic::{AtomicUsize, Ordering};

use serde_json::{Value, json};

use crate::contentful::{
    Asset, ContentType, Entry, EntryCollection, EntryQuery, FetchError, Repository,
};

/// Answers entry queries from a fixed set of entries, the way the delivery API
/// would: filtered by category and exact field value, limited, with every
/// known asset included.
#[derive(Default)]
pub struct MemoryRepository {
    entries: Vec<(ContentType, Entry)>,
    assets: Vec<Asset>,
    failing: Mutex<HashSet<ContentType>>,
    calls: AtomicUsize,
}

fn link(id: &str) -> Value {
    json!({ "sys": { "type": "Link", "linkType": "Asset", "id": id } })
}

impl MemoryRepository {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_entry(mut self, content_type: ContentType, id: &str, fields: Value) -> Self {
        let entry = serde_json::from_value(json!({ "sys": { "id": id, "type": "Entry" }, "fields": fields }))
            .unwrap_or_else(|e| panic!("bad fixture entry {id}: {e}"));
        self.entries.push((content_type, entry));
        self
    }

    pub fn with_asset(mut self, id: &str, title: Option<&str>, url: &str) -> Self {
        let asset = serde_json::from_value(json!({
            "sys": { "id": id, "type": "Asset" },
            "fields": { "title": title, "file": { "url": url } }
        }))
        .unwrap_or_else(|e| panic!("bad fixture asset {id}: {e}"));
        self.assets.push(asset);
        self
    }

    /// Add a gallery folder whose photos are assets `{slug}-1`, `{slug}-2`, ...
    pub fn with_gallery(self, title: &str, slug: &str, photo_count: usize) -> Self {
        let ids: Vec<String> = (1..=photo_count).map(|n| format!("{slug}-{n}")).collect();
        let mut repo = self.with_entry(
            ContentType::GalleryFolder,
            &format!("folder-{slug}"),
            json!({
                "title": title,
                "slug": slug,
                "photos": ids.iter().map(|id| link(id)).collect::<Vec<_>>(),
            }),
        );
        for id in &ids {
            repo = repo.with_asset(id, Some(id), &format!("//images.ctfassets.net/{id}.jpg"));
        }
        repo
    }

    pub fn with_slideshow(self, title: &str, image_ids: &[&str]) -> Self {
        let mut repo = self.with_entry(
            ContentType::HomepageSlideshow,
            "slideshow",
            json!({
                "title": title,
                "images": image_ids.iter().map(|id| link(id)).collect::<Vec<_>>(),
            }),
        );
        for id in image_ids {
            repo = repo.with_asset(id, None, &format!("//images.ctfassets.net/{id}.jpg"));
        }
        repo
    }

    pub fn with_social_link(self, platform: &str, url: &str) -> Self {
        let id = format!("social-{}", platform.to_lowercase());
        self.with_entry(
            ContentType::SocialLink,
            &id,
            json!({ "platformName": platform, "url": url }),
        )
    }

    /// Make every query for `content_type` fail until [`MemoryRepository::recover`].
    pub fn fail(&self, content_type: ContentType) {
        self.failing_set().insert(content_type);
    }

    pub fn recover(&self, content_type: ContentType) {
        self.failing_set().remove(&content_type);
    }

    pub fn failing(self, content_type: ContentType) -> Self {
        self.fail(content_type);
        self
    }

    /// Number of queries answered or failed so far.
    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    fn failing_set(&self) -> std::sync::MutexGuard<'_, HashSet<ContentType>> {
        self.failing.lock().unwrap_or_else(|e| e.into_inner())
    }

    fn answer(&self, query: &EntryQuery) -> Result<EntryCollection, FetchError> {
        self.calls.fetch_add(1, Ordering::SeqCst);

        if self.failing_set().contains(&query.content_type) {
            return Err(FetchError::Status {
                status: 503,
                message: format!("{} is unavailable", query.content_type),
            });
        }

        let limit = query.limit.map(|l| l as usize).unwrap_or(usize::MAX);
        let items = self
            .entries
            .iter()
            .filter(|(content_type, _)| *content_type == query.content_type)
            .map(|(_, entry)| entry)
            .filter(|entry| {
                query
                    .fields
                    .iter()
                    .all(|(field, value)| entry.text(field) == Some(value.as_str()))
            })
            .take(limit)
            .cloned()
            .collect();

        Ok(EntryCollection {
            items,
            includes: crate::contentful::Includes {
                assets: self.assets.clone(),
            },
        })
    }
}

impl Repository for MemoryRepository {
    async fn entries(&self, query: &EntryQuery) -> Result<EntryCollection, FetchError> {
        self.answer(query)
    }
}

/// The three-gallery site used across the test suites.
pub fn sample_site() -> MemoryRepository {
    MemoryRepository::new()
        .with_slideshow("Light & Land", &["slide-1", "slide-2", "slide-3"])
        .with_gallery("Nature", "nature", 3)
        .with_gallery("Portrait", "portrait", 2)
        .with_gallery("Travel", "travel", 4)
        .with_entry(
            ContentType::AboutPage,
            "about",
            json!({
                "heading": "Hello",
                "description": "I take pictures.\nMostly outdoors.",
                "image": link("slide-1"),
            }),
        )
        .with_social_link("Instagram", "https://instagram.com/folio")
        .with_social_link("Flickr", "https://flickr.com/folio")
}
