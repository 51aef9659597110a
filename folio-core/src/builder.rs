use std::path::{Path, PathBuf};
use std::time::Duration;

use chrono::Datelike;
use tera::Context;
use tracing::{info, warn};
use walkdir::WalkDir;

use crate::access::ContentAccess;
use crate::config::SiteConfig;
use crate::contentful::Repository;
use crate::loader::{self, PageResult};
use crate::route::Route;
use crate::shell::{ChromeVariant, ShellData, ShellState, ShellView};
use crate::template::{TemplateError, TemplateRenderer};
use crate::view::{Lightbox, SLIDE_INTERVAL, SlideCursor};

#[derive(Debug, thiserror::Error)]
pub enum BuildError {
    #[error(transparent)]
    Template(#[from] TemplateError),
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("could not copy {path}: {err}", path = .0.display(), err = .1)]
    Copy(PathBuf, walkdir::Error),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PageStatus {
    Ok,
    NotFound,
}

#[derive(Debug, Clone)]
pub struct RenderedPage {
    pub route: Route,
    pub status: PageStatus,
    pub html: String,
    /// `None` for not-found pages, which are never cached.
    pub revalidate: Option<Duration>,
}

pub struct SiteBuilder {
    output_dir: PathBuf,
    theme_dir: Option<PathBuf>,
    public_dir: Option<PathBuf>,
    site: SiteConfig,
}

impl Default for SiteBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl SiteBuilder {
    pub fn new() -> Self {
        Self {
            output_dir: PathBuf::from("./out"),
            theme_dir: None,
            public_dir: None,
            site: SiteConfig::default(),
        }
    }

    pub fn output_dir<P: AsRef<Path>>(mut self, path: P) -> Self {
        self.output_dir = path.as_ref().to_path_buf();
        self
    }

    /// Directory of templates overriding the built-in theme.
    pub fn theme_dir<P: AsRef<Path>>(mut self, path: P) -> Self {
        self.theme_dir = Some(path.as_ref().to_path_buf());
        self
    }

    /// Static files copied verbatim into the export.
    pub fn public_dir<P: AsRef<Path>>(mut self, path: P) -> Self {
        self.public_dir = Some(path.as_ref().to_path_buf());
        self
    }

    pub fn site_config(mut self, config: SiteConfig) -> Self {
        self.site = config;
        self
    }

    pub fn build<R: Repository>(self, access: ContentAccess<R>) -> Result<Site<R>, BuildError> {
        let mut renderer = TemplateRenderer::new(self.theme_dir.as_deref())?;
        renderer.add_to_context("site", &self.site);

        Ok(Site {
            access,
            renderer,
            output_dir: self.output_dir,
            public_dir: self.public_dir,
        })
    }
}

pub struct Site<R> {
    access: ContentAccess<R>,
    renderer: TemplateRenderer,
    output_dir: PathBuf,
    public_dir: Option<PathBuf>,
}

impl<R: Repository> Site<R> {
    pub fn access(&self) -> &ContentAccess<R> {
        &self.access
    }

    pub fn public_dir(&self) -> Option<&Path> {
        self.public_dir.as_deref()
    }

    /// Load a route's content and render it. Content failures never surface
    /// here; only template and IO problems do.
    pub async fn render(&self, route: &Route) -> Result<RenderedPage, BuildError> {
        match route {
            Route::Home => self.render_home().await,
            Route::About => self.render_about().await,
            Route::Gallery(slug) => self.render_gallery(slug).await,
            Route::NotFound => self.render_not_found(),
        }
    }

    fn shell(&self, route: &Route, variant: ChromeVariant, data: &ShellData) -> ShellView {
        let year = chrono::Local::now().year();
        ShellView::new(ShellState::new(&route.path(), variant), data, year)
    }

    fn page(&self, route: Route, template: &str, context: &Context, revalidate: Duration) -> Result<RenderedPage, BuildError> {
        Ok(RenderedPage {
            html: self.renderer.render(template, context)?,
            route,
            status: PageStatus::Ok,
            revalidate: Some(revalidate),
        })
    }

    async fn render_home(&self) -> Result<RenderedPage, BuildError> {
        let (result, chrome) = tokio::join!(loader::load_home(&self.access), ShellData::fetch(&self.access));
        let PageResult::Props { props, revalidate } = result else {
            return self.render_not_found();
        };

        let slideshow = props.slideshow.unwrap_or_default();
        let cursor = SlideCursor::new(slideshow.images.len());

        let mut context = Context::new();
        context.insert("shell", &self.shell(&Route::Home, ChromeVariant::Minimal, &chrome));
        context.insert("slides", &slideshow.images);
        context.insert("slideshow_title", slideshow.title.as_deref().unwrap_or("Portfolio"));
        context.insert("cursor", &cursor);
        context.insert("rotates", &cursor.rotates());
        context.insert("interval_ms", &(SLIDE_INTERVAL.as_millis() as u64));
        context.insert("gallery_folders", &props.gallery_folders);

        self.page(Route::Home, "index.html", &context, revalidate)
    }

    async fn render_about(&self) -> Result<RenderedPage, BuildError> {
        let (result, chrome) = tokio::join!(loader::load_about(&self.access), ShellData::fetch(&self.access));
        let PageResult::Props { props, revalidate } = result else {
            return self.render_not_found();
        };

        let about = props.about_page.unwrap_or_default();

        let mut context = Context::new();
        context.insert("shell", &self.shell(&Route::About, ChromeVariant::Standard, &chrome));
        context.insert("heading", about.heading.as_deref().unwrap_or("About Me"));
        if let Some(image) = &about.image {
            context.insert("image_url", &image.url);
        }
        if let Some(html) = about.description_html() {
            context.insert("description_html", &html);
        }
        context.insert("social_links", &props.social_links);

        self.page(Route::About, "about.html", &context, revalidate)
    }

    async fn render_gallery(&self, slug: &str) -> Result<RenderedPage, BuildError> {
        let (result, chrome) = tokio::join!(
            loader::load_gallery(&self.access, slug),
            ShellData::fetch(&self.access)
        );
        let PageResult::Props { props, revalidate } = result else {
            return self.render_not_found();
        };

        let route = Route::Gallery(slug.to_string());
        let mut context = Context::new();
        context.insert("shell", &self.shell(&route, ChromeVariant::Standard, &chrome));
        context.insert("meta_description", &props.gallery.meta_description());
        context.insert("gallery", &props.gallery);
        context.insert("lightbox", &Lightbox::default());

        self.page(route, "gallery.html", &context, revalidate)
    }

    fn render_not_found(&self) -> Result<RenderedPage, BuildError> {
        Ok(RenderedPage {
            route: Route::NotFound,
            status: PageStatus::NotFound,
            html: self.renderer.render("404.html", &Context::new())?,
            revalidate: None,
        })
    }

    /// Export every known route to the output directory. Returns the files written.
    pub async fn render_all(&self) -> Result<Vec<PathBuf>, BuildError> {
        std::fs::create_dir_all(&self.output_dir)?;

        let paths = loader::gallery_paths(&self.access).await;
        let mut routes = vec![Route::Home, Route::About];
        routes.extend(paths.slugs.into_iter().map(Route::Gallery));
        routes.push(Route::NotFound);

        let mut written = Vec::new();
        for route in routes {
            let page = self.render(&route).await?;
            if page.status == PageStatus::NotFound && route != Route::NotFound {
                warn!(path = %route.path(), "listed page could not be loaded, skipping");
                continue;
            }

            let output_path = self.output_dir.join(route.out_path());
            if let Some(parent) = output_path.parent() {
                std::fs::create_dir_all(parent)?;
            }
            std::fs::write(&output_path, page.html)?;
            info!(path = %route.path(), file = %output_path.display(), "wrote page");
            written.push(output_path);
        }

        if let Some(public_dir) = &self.public_dir {
            if public_dir.exists() {
                written.extend(copy_dir(public_dir, &self.output_dir)?);
            }
        }

        Ok(written)
    }
}

fn copy_dir(from: &Path, to: &Path) -> Result<Vec<PathBuf>, BuildError> {
    let mut copied = Vec::new();
    for entry in WalkDir::new(from) {
        let entry = entry.map_err(|e| BuildError::Copy(from.to_path_buf(), e))?;
        let Ok(relative) = entry.path().strip_prefix(from) else {
            continue;
        };
        let target = to.join(relative);
        if entry.file_type().is_dir() {
            std::fs::create_dir_all(&target)?;
        } else {
            std::fs::copy(entry.path(), &target)?;
            copied.push(target);
        }
    }
    Ok(copied)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::contentful::ContentType;
    use crate::loader::{REVALIDATE, RETRY_REVALIDATE};
    use crate::memory::{MemoryRepository, sample_site};

    fn site(repo: MemoryRepository) -> Site<MemoryRepository> {
        SiteBuilder::new().build(ContentAccess::new(repo)).unwrap()
    }

    #[tokio::test]
    async fn test_home_lists_galleries_in_order() {
        let page = site(sample_site()).render(&Route::Home).await.unwrap();

        assert_eq!(page.status, PageStatus::Ok);
        assert_eq!(page.revalidate, Some(REVALIDATE));
        let nature = page.html.find(r#"<a href="/gallery/nature">Nature</a>"#).unwrap();
        let portrait = page.html.find(r#"<a href="/gallery/portrait">Portrait</a>"#).unwrap();
        let travel = page.html.find(r#"<a href="/gallery/travel">Travel</a>"#).unwrap();
        assert!(nature < portrait && portrait < travel);
        assert!(page.html.contains("https://images.ctfassets.net/slide-1.jpg"));
        assert!(page.html.contains("Light &amp; Land"));
        assert!(!page.html.contains("<footer"));
    }

    #[tokio::test]
    async fn test_home_slideshow_failure_shows_placeholder() {
        let repo = sample_site().failing(ContentType::HomepageSlideshow);
        let page = site(repo).render(&Route::Home).await.unwrap();

        assert_eq!(page.status, PageStatus::Ok);
        assert_eq!(page.revalidate, Some(RETRY_REVALIDATE));
        assert!(page.html.contains("No images found"));
        assert!(!page.html.contains("data-slide-prev"));
    }

    #[tokio::test]
    async fn test_gallery_page_renders_photos() {
        let page = site(sample_site())
            .render(&Route::Gallery("portrait".into()))
            .await
            .unwrap();

        assert_eq!(page.status, PageStatus::Ok);
        assert!(page.html.contains("<title>Portrait | Photography Portfolio</title>"));
        assert!(page.html.contains("https://images.ctfassets.net/portrait-1.jpg"));
        assert!(page.html.contains("https://images.ctfassets.net/portrait-2.jpg"));
        assert!(!page.html.contains("nature-1.jpg"));
    }

    #[tokio::test]
    async fn test_unknown_gallery_is_not_found() {
        let page = site(sample_site())
            .render(&Route::Gallery("unknown".into()))
            .await
            .unwrap();

        assert_eq!(page.status, PageStatus::NotFound);
        assert_eq!(page.revalidate, None);
        assert!(page.html.contains("Page Not Found"));
    }

    #[tokio::test]
    async fn test_empty_gallery_placeholder() {
        let repo = MemoryRepository::new().with_gallery("Empty", "empty", 0);
        let page = site(repo).render(&Route::Gallery("empty".into())).await.unwrap();
        assert!(page.html.contains("No photos found in this gallery."));
    }

    #[tokio::test]
    async fn test_about_page() {
        let page = site(sample_site()).render(&Route::About).await.unwrap();

        assert!(page.html.contains("<h1>Hello</h1>"));
        assert!(page.html.contains("I take pictures.<br />Mostly outdoors."));
        assert!(page.html.contains("Connect With Me"));
        assert!(page.html.contains("<h3>Connect</h3>"));
    }

    #[tokio::test]
    async fn test_footer_omits_connect_without_links() {
        let repo = MemoryRepository::new().with_gallery("Nature", "nature", 1);
        let page = site(repo).render(&Route::About).await.unwrap();

        assert!(page.html.contains("<footer"));
        assert!(!page.html.contains("<h3>Connect</h3>"));
        assert!(page.html.contains("<h1>About Me</h1>"));
        assert!(page.html.contains("No description available."));
        assert!(page.html.contains("Image not available"));
    }

    #[tokio::test]
    async fn test_render_all_writes_every_route() {
        let out = tempfile::tempdir().unwrap();
        let public = tempfile::tempdir().unwrap();
        std::fs::create_dir_all(public.path().join("img")).unwrap();
        std::fs::write(public.path().join("img/favicon.ico"), b"ico").unwrap();

        let site = SiteBuilder::new()
            .output_dir(out.path())
            .public_dir(public.path())
            .build(ContentAccess::new(sample_site()))
            .unwrap();
        let written = site.render_all().await.unwrap();

        for file in [
            "index.html",
            "about/index.html",
            "gallery/nature/index.html",
            "gallery/portrait/index.html",
            "gallery/travel/index.html",
            "404.html",
            "img/favicon.ico",
        ] {
            assert!(out.path().join(file).is_file(), "missing {file}");
        }
        assert_eq!(written.len(), 7);
    }

    #[tokio::test]
    async fn test_render_all_stays_inside_output_dir() {
        let root = tempfile::tempdir().unwrap();
        let out = root.path().join("out");
        let repo = MemoryRepository::new()
            .with_gallery("Evil", "../../escape", 1)
            .with_gallery("Nature", "nature", 1);
        let site = SiteBuilder::new()
            .output_dir(&out)
            .build(ContentAccess::new(repo))
            .unwrap();

        let written = site.render_all().await.unwrap();

        assert!(written.iter().all(|path| path.starts_with(&out)));
        assert!(!written.iter().any(|path| path.to_string_lossy().contains("..")));
        assert!(!root.path().join("escape").exists());
        assert!(out.join("gallery/nature/index.html").is_file());

        let home = std::fs::read_to_string(out.join("index.html")).unwrap();
        assert!(!home.contains("escape"));
    }

    #[test]
    fn test_copy_error_names_the_directory() {
        let err = WalkDir::new("/definitely/not/here")
            .into_iter()
            .next()
            .unwrap()
            .unwrap_err();
        let message = BuildError::Copy(PathBuf::from("public"), err).to_string();
        assert!(message.starts_with("could not copy public: "), "{message}");
    }

    #[tokio::test]
    async fn test_render_all_survives_gallery_failure() {
        let out = tempfile::tempdir().unwrap();
        let site = SiteBuilder::new()
            .output_dir(out.path())
            .build(ContentAccess::new(sample_site().failing(ContentType::GalleryFolder)))
            .unwrap();
        site.render_all().await.unwrap();

        assert!(out.path().join("index.html").is_file());
        assert!(!out.path().join("gallery").exists());
    }
}
