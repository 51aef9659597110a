//! Page-level view state: the home slideshow and the gallery lightbox.

use std::time::Duration;

use serde::Serialize;

use crate::content::Photo;
use crate::shell::ScrollLock;

/// Time each slide stays on screen before the slideshow advances.
pub const SLIDE_INTERVAL: Duration = Duration::from_secs(6);

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct SlideCursor {
    pub index: usize,
    pub len: usize,
}

impl SlideCursor {
    pub fn new(len: usize) -> Self {
        Self { index: 0, len }
    }

    pub fn next(&mut self) {
        if self.len > 0 {
            self.index = (self.index + 1) % self.len;
        }
    }

    pub fn prev(&mut self) {
        if self.len > 0 {
            self.index = if self.index == 0 { self.len - 1 } else { self.index - 1 };
        }
    }

    pub fn go_to(&mut self, index: usize) {
        if index < self.len {
            self.index = index;
        }
    }

    /// Arrows, indicators and auto-advance only exist with more than one slide.
    pub fn rotates(&self) -> bool {
        self.len > 1
    }
}

/// The full-size photo overlay on gallery pages.
#[derive(Debug, Clone, PartialEq, Default, Serialize)]
pub struct Lightbox {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub selected: Option<Photo>,
    pub scroll_lock: ScrollLock,
}

impl Lightbox {
    pub fn open(&mut self, photo: Photo) {
        self.selected = Some(photo);
        self.scroll_lock = ScrollLock::Locked;
    }

    pub fn close(&mut self) {
        self.selected = None;
        self.scroll_lock = ScrollLock::Unlocked;
    }
}
