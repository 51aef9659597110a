//! The content access layer: every read of CMS content goes through here.
//!
//! Each category has two forms. `fetch_*` reports failures so the page loaders
//! can shorten their revalidation interval. The bare form (`slideshow`,
//! `gallery_folders`, ...) logs the failure and returns the category's empty
//! value, which is what the navigation shell wants.

use tracing::{error, warn};

use crate::content::{AboutPageContent, GalleryFolder, SlideshowConfig, SocialLink};
use crate::contentful::{ContentType, EntryCollection, EntryQuery, FetchError, Repository};

pub struct ContentAccess<R> {
    repository: Option<R>,
}

impl<R: Repository> ContentAccess<R> {
    pub fn new(repository: R) -> Self {
        Self {
            repository: Some(repository),
        }
    }

    /// An access layer with no repository behind it. Every fetch reports
    /// [`FetchError::Detached`] and logs a warning.
    pub fn detached() -> Self {
        Self { repository: None }
    }

    pub fn is_detached(&self) -> bool {
        self.repository.is_none()
    }

    pub fn repository(&self) -> Option<&R> {
        self.repository.as_ref()
    }

    async fn query(&self, query: EntryQuery) -> Result<EntryCollection, FetchError> {
        let Some(repository) = &self.repository else {
            warn!(category = %query.content_type, "content requested without a repository client");
            return Err(FetchError::Detached);
        };
        repository.entries(&query).await
    }

    pub async fn fetch_slideshow(&self) -> Result<Option<SlideshowConfig>, FetchError> {
        let collection = self
            .query(EntryQuery::new(ContentType::HomepageSlideshow).limit(1))
            .await?;
        Ok(collection
            .items
            .first()
            .map(|entry| SlideshowConfig::from_entry(entry, &collection)))
    }

    pub async fn fetch_about_page(&self) -> Result<Option<AboutPageContent>, FetchError> {
        let collection = self
            .query(EntryQuery::new(ContentType::AboutPage).limit(1))
            .await?;
        Ok(collection
            .items
            .first()
            .map(|entry| AboutPageContent::from_entry(entry, &collection)))
    }

    pub async fn fetch_gallery_folders(&self) -> Result<Vec<GalleryFolder>, FetchError> {
        let collection = self
            .query(EntryQuery::new(ContentType::GalleryFolder))
            .await?;
        Ok(collection
            .items
            .iter()
            .filter_map(|entry| GalleryFolder::from_entry(entry, &collection))
            .collect())
    }

    pub async fn fetch_gallery_folder(&self, slug: &str) -> Result<Option<GalleryFolder>, FetchError> {
        let collection = self
            .query(
                EntryQuery::new(ContentType::GalleryFolder)
                    .field_equals("slug", slug)
                    .limit(1),
            )
            .await?;
        Ok(collection
            .items
            .iter()
            .filter_map(|entry| GalleryFolder::from_entry(entry, &collection))
            .find(|folder| folder.slug == slug))
    }

    pub async fn fetch_social_links(&self) -> Result<Vec<SocialLink>, FetchError> {
        let collection = self.query(EntryQuery::new(ContentType::SocialLink)).await?;
        Ok(collection
            .items
            .iter()
            .filter_map(SocialLink::from_entry)
            .collect())
    }

    pub async fn slideshow(&self) -> Option<SlideshowConfig> {
        degrade(ContentType::HomepageSlideshow, self.fetch_slideshow().await)
    }

    pub async fn about_page(&self) -> Option<AboutPageContent> {
        degrade(ContentType::AboutPage, self.fetch_about_page().await)
    }

    pub async fn gallery_folders(&self) -> Vec<GalleryFolder> {
        degrade(ContentType::GalleryFolder, self.fetch_gallery_folders().await)
    }

    pub async fn gallery_folder(&self, slug: &str) -> Option<GalleryFolder> {
        degrade(ContentType::GalleryFolder, self.fetch_gallery_folder(slug).await)
    }

    pub async fn social_links(&self) -> Vec<SocialLink> {
        degrade(ContentType::SocialLink, self.fetch_social_links().await)
    }
}

fn degrade<T: Default>(category: ContentType, result: Result<T, FetchError>) -> T {
    match result {
        Ok(value) => value,
        // Already reported as a warning where it was detected.
        Err(FetchError::Detached) => T::default(),
        Err(e) => {
            error!(%category, error = %e, "fetch failed, using empty content");
            T::default()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::memory::{MemoryRepository, sample_site};

    #[tokio::test]
    async fn test_detached_returns_empty_defaults() {
        let access: ContentAccess<MemoryRepository> = ContentAccess::detached();

        assert!(access.is_detached());
        assert!(access.slideshow().await.is_none());
        assert!(access.about_page().await.is_none());
        assert!(access.gallery_folders().await.is_empty());
        assert!(access.gallery_folder("nature").await.is_none());
        assert!(access.social_links().await.is_empty());
        assert!(matches!(
            access.fetch_gallery_folders().await,
            Err(FetchError::Detached)
        ));
    }

    #[tokio::test]
    async fn test_failed_fetches_degrade() {
        let repo = sample_site()
            .failing(ContentType::HomepageSlideshow)
            .failing(ContentType::AboutPage)
            .failing(ContentType::GalleryFolder)
            .failing(ContentType::SocialLink);
        let access = ContentAccess::new(repo);

        assert!(access.slideshow().await.is_none());
        assert!(access.about_page().await.is_none());
        assert!(access.gallery_folders().await.is_empty());
        assert!(access.gallery_folder("nature").await.is_none());
        assert!(access.social_links().await.is_empty());
        assert!(matches!(
            access.fetch_slideshow().await,
            Err(FetchError::Status { status: 503, .. })
        ));
    }

    #[tokio::test]
    async fn test_folders_keep_repository_order() {
        let access = ContentAccess::new(sample_site());
        let slugs: Vec<String> = access
            .gallery_folders()
            .await
            .into_iter()
            .map(|f| f.slug)
            .collect();

        assert_eq!(slugs, vec!["nature", "portrait", "travel"]);
    }

    #[tokio::test]
    async fn test_folder_by_slug_matches_exactly() {
        let repo = sample_site().with_gallery("Nature II", "nature-2", 1);
        let access = ContentAccess::new(repo);

        let folder = access.gallery_folder("nature").await.unwrap();
        assert_eq!(folder.slug, "nature");
        assert!(access.gallery_folder("natur").await.is_none());
        assert!(access.gallery_folder("Nature").await.is_none());
        assert!(access.gallery_folder("unknown").await.is_none());
    }

    #[tokio::test]
    async fn test_slug_and_enumeration_agree_on_photo_order() {
        let access = ContentAccess::new(sample_site());

        let by_slug = access.gallery_folder("travel").await.unwrap();
        let listed = access
            .gallery_folders()
            .await
            .into_iter()
            .find(|f| f.slug == "travel")
            .unwrap();

        assert_eq!(by_slug.photos, listed.photos);
        let ids: Vec<&str> = by_slug.photos.iter().map(|p| p.id.as_str()).collect();
        assert_eq!(ids, vec!["travel-1", "travel-2", "travel-3", "travel-4"]);
    }

    #[tokio::test]
    async fn test_repeated_fetches_are_equal() {
        let access = ContentAccess::new(sample_site());

        assert_eq!(access.slideshow().await, access.slideshow().await);
        assert_eq!(access.about_page().await, access.about_page().await);
        assert_eq!(access.gallery_folders().await, access.gallery_folders().await);
        assert_eq!(access.social_links().await, access.social_links().await);
    }

    #[tokio::test]
    async fn test_missing_singletons_are_absent() {
        let access = ContentAccess::new(MemoryRepository::new());

        assert_eq!(access.fetch_slideshow().await.unwrap(), None);
        assert_eq!(access.fetch_about_page().await.unwrap(), None);
    }

    #[tokio::test]
    async fn test_about_page_resolves_image() {
        let access = ContentAccess::new(sample_site());
        let about = access.about_page().await.unwrap();

        assert_eq!(about.heading.as_deref(), Some("Hello"));
        assert_eq!(
            about.image.unwrap().url,
            "https://images.ctfassets.net/slide-1.jpg"
        );
    }
}
