//! The persistent chrome around every page: header navigation, mobile menu and
//! footer.
//!
//! View state is kept as plain values driven by explicit events, and every
//! derived value (active links, header style) is a function of the current
//! path and scroll offset. The renderer uses these to produce the initial
//! markup; the page script applies the same transitions in the browser.

use serde::Serialize;
use tracing::debug;

use crate::access::ContentAccess;
use crate::content::{GalleryFolder, SocialLink};
use crate::contentful::Repository;

/// Vertical offset, in pixels, past which the header switches to its solid style.
pub const SCROLL_THRESHOLD: f64 = 10.0;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ChromeVariant {
    /// Transparent overlay header and no footer. Home page only.
    Minimal,
    #[default]
    Standard,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum MenuState {
    #[default]
    Closed,
    Open,
}

/// Whether the page body may scroll.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ScrollLock {
    #[default]
    Unlocked,
    Locked,
}

#[derive(Debug, Clone, PartialEq)]
pub enum ShellEvent {
    ToggleMenu,
    CloseMenu,
    RouteChanged(String),
    Scrolled(f64),
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ShellState {
    pub variant: ChromeVariant,
    pub path: String,
    pub menu: MenuState,
    pub scroll_lock: ScrollLock,
    pub scrolled: bool,
}

impl ShellState {
    pub fn new(path: &str, variant: ChromeVariant) -> Self {
        Self {
            variant,
            path: path.to_string(),
            menu: MenuState::Closed,
            scroll_lock: ScrollLock::Unlocked,
            scrolled: false,
        }
    }

    pub fn apply(&mut self, event: ShellEvent) {
        match event {
            ShellEvent::ToggleMenu => match self.menu {
                MenuState::Closed => self.open_menu(),
                MenuState::Open => self.close_menu(),
            },
            ShellEvent::CloseMenu => self.close_menu(),
            ShellEvent::RouteChanged(path) => {
                self.path = path;
                self.close_menu();
            }
            ShellEvent::Scrolled(offset) => self.scrolled = is_scrolled(offset, self.variant),
        }
    }

    fn open_menu(&mut self) {
        self.menu = MenuState::Open;
        self.scroll_lock = ScrollLock::Locked;
    }

    // Unlocks even when the menu was already closed.
    fn close_menu(&mut self) {
        self.menu = MenuState::Closed;
        self.scroll_lock = ScrollLock::Unlocked;
    }

    pub fn header_style(&self) -> HeaderStyle {
        match self.variant {
            ChromeVariant::Minimal => HeaderStyle::Overlay,
            ChromeVariant::Standard if self.scrolled => HeaderStyle::Solid,
            ChromeVariant::Standard => HeaderStyle::Transparent,
        }
    }
}

/// Scroll offsets only matter for the standard chrome.
pub fn is_scrolled(offset: f64, variant: ChromeVariant) -> bool {
    variant == ChromeVariant::Standard && offset > SCROLL_THRESHOLD
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum HeaderStyle {
    Overlay,
    Transparent,
    Solid,
}

/// Exact match for leaf pages, prefix match for sections such as `/gallery`.
pub fn is_active(current: &str, target: &str, section: bool) -> bool {
    let current = normalize(current);
    let target = normalize(target);
    if section {
        current == target || current.starts_with(&format!("{target}/"))
    } else {
        current == target
    }
}

fn normalize(path: &str) -> &str {
    let trimmed = path.trim_end_matches('/');
    if trimmed.is_empty() { "/" } else { trimmed }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct NavLink {
    pub label: String,
    pub href: String,
    pub active: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Navigation {
    pub home: NavLink,
    pub galleries: Vec<NavLink>,
    pub galleries_active: bool,
    pub about: NavLink,
}

impl Navigation {
    pub fn build(current: &str, galleries: &[GalleryFolder]) -> Self {
        Self {
            home: NavLink {
                label: "Home".into(),
                href: "/".into(),
                active: is_active(current, "/", false),
            },
            galleries: galleries
                .iter()
                .map(|g| {
                    let href = g.href();
                    NavLink {
                        label: g.title.clone(),
                        active: is_active(current, &href, false),
                        href,
                    }
                })
                .collect(),
            galleries_active: is_active(current, "/gallery", true),
            about: NavLink {
                label: "About".into(),
                href: "/about".into(),
                active: is_active(current, "/about", false),
            },
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Footer {
    pub social_links: Vec<SocialLink>,
    /// The "Connect" section is omitted entirely when there are no links.
    pub show_connect: bool,
    pub year: i32,
}

impl Footer {
    pub fn new(social_links: Vec<SocialLink>, year: i32) -> Self {
        Self {
            show_connect: !social_links.is_empty(),
            social_links,
            year,
        }
    }
}

/// Content the chrome fetches for itself, independent of the page it wraps.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct ShellData {
    pub galleries: Vec<GalleryFolder>,
    pub social_links: Vec<SocialLink>,
}

impl ShellData {
    /// Run both fetches concurrently. A failure leaves that list empty; it is
    /// logged by the access layer and never blocks the chrome.
    pub async fn fetch<R: Repository>(access: &ContentAccess<R>) -> Self {
        let (galleries, social_links) = tokio::join!(access.gallery_folders(), access.social_links());
        debug!(
            galleries = galleries.len(),
            social_links = social_links.len(),
            "fetched chrome content"
        );
        Self {
            galleries,
            social_links,
        }
    }
}

/// Everything the layout template needs to draw the chrome for one page view.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ShellView {
    pub state: ShellState,
    pub header: HeaderStyle,
    pub nav: Navigation,
    /// `None` for the minimal chrome.
    pub footer: Option<Footer>,
}

impl ShellView {
    pub fn new(state: ShellState, data: &ShellData, year: i32) -> Self {
        let footer = match state.variant {
            ChromeVariant::Minimal => None,
            ChromeVariant::Standard => Some(Footer::new(data.social_links.clone(), year)),
        };

        Self {
            header: state.header_style(),
            nav: Navigation::build(&state.path, &data.galleries),
            footer,
            state,
        }
    }
}
