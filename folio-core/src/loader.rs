//! Page data loaders, one per content route.
//!
//! A loader runs whenever a page is generated: at static export time, and
//! again whenever the server revalidates a stale page. It decides how long the
//! result may be served before the next attempt.

use std::time::Duration;

use serde::Serialize;
use tracing::{error, info, warn};

use crate::access::ContentAccess;
use crate::content::{AboutPageContent, GalleryFolder, SlideshowConfig, SocialLink};
use crate::contentful::Repository;
use crate::route::is_slug;

/// How long a successfully generated page is served before it is regenerated.
pub const REVALIDATE: Duration = Duration::from_secs(3600);

/// Revalidation interval after a failed fetch, so content comes back quickly.
pub const RETRY_REVALIDATE: Duration = Duration::from_secs(60);

#[derive(Debug, Clone, PartialEq)]
pub enum PageResult<T> {
    Props { props: T, revalidate: Duration },
    /// Terminal: render the not-found page.
    NotFound,
}

impl<T> PageResult<T> {
    fn fresh(props: T) -> Self {
        PageResult::Props {
            props,
            revalidate: REVALIDATE,
        }
    }

    fn retry(props: T) -> Self {
        PageResult::Props {
            props,
            revalidate: RETRY_REVALIDATE,
        }
    }

    pub fn revalidate(&self) -> Option<Duration> {
        match self {
            PageResult::Props { revalidate, .. } => Some(*revalidate),
            PageResult::NotFound => None,
        }
    }

    pub fn props(&self) -> Option<&T> {
        match self {
            PageResult::Props { props, .. } => Some(props),
            PageResult::NotFound => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Default, Serialize)]
pub struct HomeProps {
    pub slideshow: Option<SlideshowConfig>,
    pub gallery_folders: Vec<GalleryFolder>,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize)]
pub struct AboutProps {
    pub about_page: Option<AboutPageContent>,
    pub social_links: Vec<SocialLink>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct GalleryProps {
    pub gallery: GalleryFolder,
}

/// How slugs missing from the pre-rendered list are handled.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Fallback {
    /// Render unknown slugs on first request, then cache them like the rest.
    Blocking,
}

#[derive(Debug, Clone, PartialEq)]
pub struct StaticPaths {
    pub slugs: Vec<String>,
    pub fallback: Fallback,
}

pub async fn load_home<R: Repository>(access: &ContentAccess<R>) -> PageResult<HomeProps> {
    let (slideshow, folders) = tokio::join!(access.fetch_slideshow(), access.fetch_gallery_folders());

    match (slideshow, folders) {
        (Ok(slideshow), Ok(gallery_folders)) => PageResult::fresh(HomeProps {
            slideshow,
            gallery_folders,
        }),
        (Err(e), _) | (_, Err(e)) => {
            error!(error = %e, "failed to load home page data");
            PageResult::retry(HomeProps::default())
        }
    }
}

pub async fn load_about<R: Repository>(access: &ContentAccess<R>) -> PageResult<AboutProps> {
    let (about_page, social_links) =
        tokio::join!(access.fetch_about_page(), access.fetch_social_links());

    match (about_page, social_links) {
        (Ok(about_page), Ok(social_links)) => PageResult::fresh(AboutProps {
            about_page,
            social_links,
        }),
        (Err(e), _) | (_, Err(e)) => {
            error!(error = %e, "failed to load about page data");
            PageResult::retry(AboutProps::default())
        }
    }
}

/// A gallery has no meaningful empty state, so a failed fetch is reported as
/// not found. Not-found results are never cached, so the next request retries.
pub async fn load_gallery<R: Repository>(
    access: &ContentAccess<R>,
    slug: &str,
) -> PageResult<GalleryProps> {
    match access.fetch_gallery_folder(slug).await {
        Ok(Some(gallery)) => PageResult::fresh(GalleryProps { gallery }),
        Ok(None) => {
            info!(%slug, "no gallery with this slug");
            PageResult::NotFound
        }
        Err(e) => {
            error!(%slug, error = %e, "failed to load gallery");
            PageResult::NotFound
        }
    }
}

pub async fn gallery_paths<R: Repository>(access: &ContentAccess<R>) -> StaticPaths {
    let mut slugs: Vec<String> = match access.fetch_gallery_folders().await {
        Ok(folders) => folders.into_iter().map(|f| f.slug).collect(),
        Err(e) => {
            error!(error = %e, "failed to enumerate gallery slugs");
            Vec::new()
        }
    };

    // Slugs become output paths, so nothing outside the slug alphabet gets through.
    slugs.retain(|slug| {
        let safe = is_slug(slug);
        if !safe {
            warn!(%slug, "dropping gallery slug that is not URL-safe");
        }
        safe
    });

    StaticPaths {
        slugs,
        fallback: Fallback::Blocking,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::contentful::ContentType;
    use crate::memory::{MemoryRepository, sample_site};

    #[tokio::test]
    async fn test_home_success() {
        let access = ContentAccess::new(sample_site());
        let result = load_home(&access).await;

        assert_eq!(result.revalidate(), Some(REVALIDATE));
        let props = result.props().unwrap();
        assert_eq!(props.slideshow.as_ref().unwrap().images.len(), 3);
        let slugs: Vec<&str> = props.gallery_folders.iter().map(|f| f.slug.as_str()).collect();
        assert_eq!(slugs, vec!["nature", "portrait", "travel"]);
    }

    #[tokio::test]
    async fn test_home_slideshow_failure_empties_page() {
        let access = ContentAccess::new(sample_site().failing(ContentType::HomepageSlideshow));
        let result = load_home(&access).await;

        assert_eq!(result.revalidate(), Some(RETRY_REVALIDATE));
        assert_eq!(result.props(), Some(&HomeProps::default()));
    }

    #[tokio::test]
    async fn test_home_without_slideshow_entry_is_fresh() {
        let access = ContentAccess::new(MemoryRepository::new().with_gallery("Nature", "nature", 1));
        let result = load_home(&access).await;

        assert_eq!(result.revalidate(), Some(REVALIDATE));
        assert!(result.props().unwrap().slideshow.is_none());
    }

    #[tokio::test]
    async fn test_detached_access_retries_soon() {
        let access: ContentAccess<MemoryRepository> = ContentAccess::detached();

        assert_eq!(load_home(&access).await.revalidate(), Some(RETRY_REVALIDATE));
        assert_eq!(load_about(&access).await.revalidate(), Some(RETRY_REVALIDATE));
    }

    #[tokio::test]
    async fn test_about_social_failure() {
        let access = ContentAccess::new(sample_site().failing(ContentType::SocialLink));
        let result = load_about(&access).await;

        assert_eq!(result.revalidate(), Some(RETRY_REVALIDATE));
        assert_eq!(result.props(), Some(&AboutProps::default()));
    }

    #[tokio::test]
    async fn test_gallery_found_and_not_found() {
        let access = ContentAccess::new(sample_site());

        let found = load_gallery(&access, "portrait").await;
        assert_eq!(found.revalidate(), Some(REVALIDATE));
        assert_eq!(found.props().unwrap().gallery.photos.len(), 2);

        assert_eq!(load_gallery(&access, "unknown").await, PageResult::NotFound);
    }

    #[tokio::test]
    async fn test_gallery_failure_is_not_found() {
        let access = ContentAccess::new(sample_site().failing(ContentType::GalleryFolder));
        assert_eq!(load_gallery(&access, "nature").await, PageResult::NotFound);
    }

    #[tokio::test]
    async fn test_gallery_paths() {
        let access = ContentAccess::new(sample_site());
        let paths = gallery_paths(&access).await;
        assert_eq!(paths.slugs, vec!["nature", "portrait", "travel"]);
        assert_eq!(paths.fallback, Fallback::Blocking);
    }

    #[tokio::test]
    async fn test_gallery_paths_only_list_safe_slugs() {
        let repo = sample_site()
            .with_gallery("Evil", "../../escape", 1)
            .with_gallery("Dotted", "a.b", 1);
        let paths = gallery_paths(&ContentAccess::new(repo)).await;
        assert_eq!(paths.slugs, vec!["nature", "portrait", "travel"]);
    }

    #[tokio::test]
    async fn test_gallery_paths_tolerate_failure() {
        let access = ContentAccess::new(sample_site().failing(ContentType::GalleryFolder));
        let paths = gallery_paths(&access).await;
        assert!(paths.slugs.is_empty());
        assert_eq!(paths.fallback, Fallback::Blocking);
    }
}
