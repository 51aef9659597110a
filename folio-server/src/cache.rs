//! Rendered pages kept between requests, each valid for its revalidation interval.

use std::time::Duration;

use dashmap::{DashMap, DashSet};
use folio_core::{RenderedPage, Route};
use tokio::time::Instant;
use tracing::debug;

#[derive(Debug, Clone)]
struct CachedPage {
    html: String,
    generated_at: Instant,
    revalidate: Duration,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Lookup {
    Fresh(String),
    /// Past its interval: serve it, but regenerate in the background.
    Stale(String),
    Miss,
}

/// Rendered pages by route (thread-safe).
#[derive(Default)]
pub struct PageCache {
    pages: DashMap<Route, CachedPage>,
    regenerating: DashSet<Route>,
}

impl PageCache {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn lookup(&self, route: &Route) -> Lookup {
        match self.pages.get(route) {
            Some(page) if page.generated_at.elapsed() < page.revalidate => Lookup::Fresh(page.html.clone()),
            Some(page) => Lookup::Stale(page.html.clone()),
            None => Lookup::Miss,
        }
    }

    /// Keep a rendered page. Pages without an interval (not found) are dropped
    /// from the cache instead, so the next request loads them again.
    pub fn store(&self, page: &RenderedPage) {
        match page.revalidate {
            Some(revalidate) => {
                debug!(path = %page.route.path(), revalidate = revalidate.as_secs(), "caching page");
                self.pages.insert(
                    page.route.clone(),
                    CachedPage {
                        html: page.html.clone(),
                        generated_at: Instant::now(),
                        revalidate,
                    },
                );
            }
            None => {
                self.pages.remove(&page.route);
            }
        }
    }

    /// Claim the regeneration of `route`. Returns `false` when another task
    /// already holds it.
    pub fn begin_regeneration(&self, route: &Route) -> bool {
        self.regenerating.insert(route.clone())
    }

    pub fn finish_regeneration(&self, route: &Route) {
        self.regenerating.remove(route);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use folio_core::PageStatus;
    use std::sync::Arc;

    fn page(route: Route, html: &str, revalidate: Option<u64>) -> RenderedPage {
        RenderedPage {
            route,
            status: PageStatus::Ok,
            html: html.to_string(),
            revalidate: revalidate.map(Duration::from_secs),
        }
    }

    #[tokio::test(start_paused = true)]
    async fn test_page_goes_stale_after_interval() {
        let cache = PageCache::new();
        assert_eq!(cache.lookup(&Route::Home), Lookup::Miss);

        cache.store(&page(Route::Home, "home", Some(60)));
        assert_eq!(cache.lookup(&Route::Home), Lookup::Fresh("home".into()));

        tokio::time::advance(Duration::from_secs(61)).await;
        assert_eq!(cache.lookup(&Route::Home), Lookup::Stale("home".into()));
    }

    #[test]
    fn test_not_found_evicts() {
        let cache = PageCache::new();
        let route = Route::Gallery("gone".into());
        cache.store(&page(route.clone(), "gallery", Some(3600)));
        cache.store(&page(route.clone(), "404", None));

        assert_eq!(cache.lookup(&route), Lookup::Miss);
    }

    #[test]
    fn test_single_regeneration_per_route() {
        let cache = PageCache::new();
        assert!(cache.begin_regeneration(&Route::About));
        assert!(!cache.begin_regeneration(&Route::About));
        assert!(cache.begin_regeneration(&Route::Home));

        cache.finish_regeneration(&Route::About);
        assert!(cache.begin_regeneration(&Route::About));
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn test_concurrent_claims_have_one_winner() {
        let cache = Arc::new(PageCache::new());
        let route = Route::Gallery("nature".into());

        let claims: Vec<_> = (0..16)
            .map(|_| {
                let cache = cache.clone();
                let route = route.clone();
                tokio::spawn(async move { cache.begin_regeneration(&route) })
            })
            .collect();

        let mut winners = 0;
        for claim in claims {
            if claim.await.unwrap() {
                winners += 1;
            }
        }
        assert_eq!(winners, 1);
    }
}
