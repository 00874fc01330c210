//! The document-level side effects a modal needs, behind a trait so the
//! lifecycle can be driven without a browser.

use std::collections::BTreeSet;

/// Overflow value the body takes while any modal holds the scroll lock.
pub const SCROLL_LOCKED: &str = "hidden";

/// Handle for a registered key listener.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct ListenerId(pub u64);

/// A synthetic `<a href download>` click.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DownloadLink {
    pub href: String,
    pub filename: String,
}

/// Global state shared by everything rendered into one document.
pub trait ModalHost {
    fn add_key_listener(&mut self) -> ListenerId;
    fn remove_key_listener(&mut self, id: ListenerId);
    /// Current inline `overflow` style of the document body.
    fn body_overflow(&self) -> String;
    /// Take one hold on the body scroll lock. The first hold saves the
    /// current overflow and hides it.
    fn lock_scroll(&mut self);
    /// Release one hold. The last release restores the saved overflow,
    /// whatever order the holds are released in.
    fn unlock_scroll(&mut self);
    /// Attach a temporary anchor for `link`, click it, detach it.
    fn trigger_download(&mut self, link: &DownloadLink);
}

/// In-memory document used by tests and server-side rendering.
#[derive(Debug, Default)]
pub struct HeadlessDocument {
    next_listener: u64,
    listeners: BTreeSet<ListenerId>,
    body_overflow: String,
    scroll_locks: usize,
    saved_overflow: Option<String>,
    downloads: Vec<DownloadLink>,
}

impl HeadlessDocument {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_body_overflow(value: &str) -> Self {
        Self {
            body_overflow: value.to_string(),
            ..Self::default()
        }
    }

    pub fn key_listener_count(&self) -> usize {
        self.listeners.len()
    }

    pub fn scroll_lock_count(&self) -> usize {
        self.scroll_locks
    }

    pub fn downloads(&self) -> &[DownloadLink] {
        &self.downloads
    }
}

impl ModalHost for HeadlessDocument {
    fn add_key_listener(&mut self) -> ListenerId {
        self.next_listener += 1;
        let id = ListenerId(self.next_listener);
        self.listeners.insert(id);
        id
    }

    fn remove_key_listener(&mut self, id: ListenerId) {
        if !self.listeners.remove(&id) {
            tracing::warn!(listener = id.0, "Removing a key listener that was not registered");
        }
    }

    fn body_overflow(&self) -> String {
        self.body_overflow.clone()
    }

    fn lock_scroll(&mut self) {
        if self.scroll_locks == 0 {
            self.saved_overflow = Some(std::mem::replace(
                &mut self.body_overflow,
                SCROLL_LOCKED.to_string(),
            ));
        }
        self.scroll_locks += 1;
    }

    fn unlock_scroll(&mut self) {
        match self.scroll_locks {
            0 => tracing::warn!("Unlocking scroll that was not locked"),
            1 => {
                self.scroll_locks = 0;
                self.body_overflow = self.saved_overflow.take().unwrap_or_default();
            }
            _ => self.scroll_locks -= 1,
        }
    }

    fn trigger_download(&mut self, link: &DownloadLink) {
        self.downloads.push(link.clone());
    }
}
