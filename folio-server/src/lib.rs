pub mod cache;

use std::{net::SocketAddr, sync::Arc};

use anyhow::Result;
use axum::{
    Router,
    extract::State,
    http::{StatusCode, Uri},
    response::{Html, IntoResponse, Response},
    routing::{MethodRouter, get},
};
use folio_core::{BuildError, PageStatus, RenderedPage, Repository, Route, Site};
use tower_http::{services::ServeDir, trace::TraceLayer};
use tracing::{debug, error, info, warn};

use crate::cache::{Lookup, PageCache};

/// Configuration for the portfolio server
#[derive(Debug, Clone)]
pub struct ServerConfig {
    /// Host to bind to
    pub host: String,
    /// Port to serve on
    pub port: u16,
    /// Auto-open browser
    pub open: bool,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "127.0.0.1".to_string(),
            port: 3000,
            open: false,
        }
    }
}

/// Serves the site's pages, rendering each on first request and regenerating
/// it in the background once its revalidation interval has passed.
pub struct PortfolioServer<R> {
    config: ServerConfig,
    site: Site<R>,
}

impl<R: Repository + 'static> PortfolioServer<R> {
    pub fn new(config: ServerConfig, site: Site<R>) -> Self {
        Self { config, site }
    }

    pub async fn run(self) -> Result<()> {
        let app = router(AppState::new(self.site)).layer(TraceLayer::new_for_http());

        let addr: SocketAddr = format!("{}:{}", self.config.host, self.config.port).parse()?;
        info!("Serving at http://{}", addr);

        // Open browser if requested
        if self.config.open {
            if let Err(e) = open::that(format!("http://{}", addr)) {
                warn!("Failed to open browser: {}", e);
            }
        }

        let listener = tokio::net::TcpListener::bind(addr).await?;
        axum::serve(listener, app).await?;

        Ok(())
    }
}

pub struct AppState<R> {
    site: Site<R>,
    cache: PageCache,
}

impl<R: Repository + 'static> AppState<R> {
    pub fn new(site: Site<R>) -> Arc<Self> {
        Arc::new(Self {
            site,
            cache: PageCache::new(),
        })
    }

    pub fn site(&self) -> &Site<R> {
        &self.site
    }

    async fn generate(&self, route: &Route) -> Result<RenderedPage, BuildError> {
        let page = self.site.render(route).await?;
        self.cache.store(&page);
        Ok(page)
    }

    async fn regenerate(self: Arc<Self>, route: Route) {
        debug!(path = %route.path(), "regenerating stale page");
        if let Err(e) = self.generate(&route).await {
            // The stale copy stays in place and the next request tries again.
            error!(path = %route.path(), error = %e, "regeneration failed");
        }
        self.cache.finish_regeneration(&route);
    }
}

pub fn router<R: Repository + 'static>(state: Arc<AppState<R>>) -> Router {
    let public_dir = state.site.public_dir().map(|p| p.to_path_buf());

    let app = Router::new()
        .route("/", get(page_handler::<R>))
        .route("/about", get(page_handler::<R>))
        .route("/about/", get(page_handler::<R>))
        .route("/gallery/{slug}", get(page_handler::<R>))
        .route("/gallery/{slug}/", get(page_handler::<R>));

    match public_dir {
        Some(dir) => {
            let not_found: MethodRouter = get(not_found_handler::<R>).with_state(state.clone());
            app.fallback_service(ServeDir::new(dir).fallback(not_found))
                .with_state(state)
        }
        None => app.fallback(not_found_handler::<R>).with_state(state),
    }
}

async fn page_handler<R: Repository + 'static>(
    State(state): State<Arc<AppState<R>>>,
    uri: Uri,
) -> Response {
    let route = Route::parse(uri.path());

    match state.cache.lookup(&route) {
        Lookup::Fresh(html) => Html(html).into_response(),
        Lookup::Stale(html) => {
            if state.cache.begin_regeneration(&route) {
                tokio::spawn(state.clone().regenerate(route));
            }
            Html(html).into_response()
        }
        Lookup::Miss => match state.generate(&route).await {
            Ok(page) => page_response(page),
            Err(e) => {
                error!(path = %uri.path(), error = %e, "failed to render page");
                (StatusCode::INTERNAL_SERVER_ERROR, "Internal Server Error").into_response()
            }
        },
    }
}

async fn not_found_handler<R: Repository + 'static>(State(state): State<Arc<AppState<R>>>) -> Response {
    match state.site.render(&Route::NotFound).await {
        Ok(page) => page_response(page),
        Err(e) => {
            error!(error = %e, "failed to render not-found page");
            StatusCode::NOT_FOUND.into_response()
        }
    }
}

fn page_response(page: RenderedPage) -> Response {
    let status = match page.status {
        PageStatus::Ok => StatusCode::OK,
        PageStatus::NotFound => StatusCode::NOT_FOUND,
    };
    (status, Html(page.html)).into_response()
}
