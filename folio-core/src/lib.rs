pub mod access;
pub mod builder;
pub mod config;
pub mod content;
pub mod contentful;
pub mod loader;
#[cfg(any(test, feature = "testing"))]
pub mod memory;
pub mod route;
pub mod shell;
pub mod template;
pub mod view;

// Re-export main types
pub use access::ContentAccess;
pub use builder::{BuildError, PageStatus, RenderedPage, Site, SiteBuilder};
pub use config::{ConfigError, ConnectionConfig, SiteConfig};
pub use content::{AboutPageContent, GalleryFolder, Photo, SlideshowConfig, SocialLink};
pub use contentful::{ContentType, ContentfulClient, FetchError, Repository};
pub use loader::{REVALIDATE, RETRY_REVALIDATE};
pub use route::Route;
pub use template::{TemplateError, TemplateRenderer};
