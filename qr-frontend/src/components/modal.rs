//! QR display modal.
//!
//! Two states: `Closed` renders nothing and touches nothing; `Open` holds an
//! [`OpenGuard`] that owns the key listener and the body scroll lock. Every
//! way out of `Open`, including dropping the modal, goes through the guard's
//! `Drop`.

use std::cell::RefCell;
use std::rc::Rc;

use super::host::{DownloadLink, ListenerId, ModalHost};
use super::view::ModalView;

/// Key that closes an open modal.
pub const CANCEL_KEY: &str = "Escape";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QrModalProps {
    /// Raw base64 PNG, without a `data:` prefix.
    pub qr_image_base64: String,
    pub roll_number: String,
}

/// Why the modal left the `Open` state.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CloseTrigger {
    CancelKey,
    OverlayClick,
    CloseButton,
    External,
}

/// Element a click landed on. Clicks bubbling up from inside the card never
/// reach the overlay as their own target.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ClickTarget {
    Overlay,
    Card,
    CloseButton,
    DownloadButton,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ModalPhase {
    Closed,
    Open,
}

struct OpenGuard<H: ModalHost> {
    host: Rc<RefCell<H>>,
    listener: ListenerId,
}

impl<H: ModalHost> OpenGuard<H> {
    fn acquire(host: &Rc<RefCell<H>>) -> Self {
        let listener = {
            let mut doc = host.borrow_mut();
            doc.lock_scroll();
            doc.add_key_listener()
        };

        Self {
            host: Rc::clone(host),
            listener,
        }
    }
}

impl<H: ModalHost> Drop for OpenGuard<H> {
    fn drop(&mut self) {
        let mut doc = self.host.borrow_mut();
        doc.remove_key_listener(self.listener);
        doc.unlock_scroll();
    }
}

enum ModalState<H: ModalHost> {
    Closed,
    Open(OpenGuard<H>),
}

pub struct QrModal<H: ModalHost> {
    host: Rc<RefCell<H>>,
    props: QrModalProps,
    state: ModalState<H>,
}

impl<H: ModalHost> QrModal<H> {
    /// A closed modal. Nothing touches `host` until [`set_open`](Self::set_open).
    pub fn new(host: Rc<RefCell<H>>, props: QrModalProps) -> Self {
        Self {
            host,
            props,
            state: ModalState::Closed,
        }
    }

    pub fn phase(&self) -> ModalPhase {
        match self.state {
            ModalState::Closed => ModalPhase::Closed,
            ModalState::Open(_) => ModalPhase::Open,
        }
    }

    pub fn is_open(&self) -> bool {
        self.phase() == ModalPhase::Open
    }

    pub fn props(&self) -> &QrModalProps {
        &self.props
    }

    /// Replace what is shown. An open modal stays open and keeps its guard.
    pub fn set_props(&mut self, props: QrModalProps) {
        self.props = props;
    }

    /// Follow the owner's `is_open` flag. Setting the current value again is
    /// a no-op. Returns `Some(External)` when this call closed the modal.
    pub fn set_open(&mut self, open: bool) -> Option<CloseTrigger> {
        match (open, &self.state) {
            (true, ModalState::Closed) => {
                self.state = ModalState::Open(OpenGuard::acquire(&self.host));
                tracing::debug!(roll_number = %self.props.roll_number.trim(), "QR modal opened");
                None
            }
            (false, ModalState::Open(_)) => self.close(CloseTrigger::External),
            _ => None,
        }
    }

    /// Keyboard input routed from the registered listener. Only the cancel
    /// key does anything, and only while open.
    pub fn handle_key(&mut self, key: &str) -> Option<CloseTrigger> {
        if key == CANCEL_KEY && self.is_open() {
            return self.close(CloseTrigger::CancelKey);
        }
        None
    }

    pub fn handle_click(&mut self, target: ClickTarget) -> Option<CloseTrigger> {
        if !self.is_open() {
            return None;
        }

        match target {
            ClickTarget::Overlay => self.close(CloseTrigger::OverlayClick),
            ClickTarget::CloseButton => self.close(CloseTrigger::CloseButton),
            ClickTarget::Card => None,
            ClickTarget::DownloadButton => {
                self.download();
                None
            }
        }
    }

    /// Save the PNG through the host. Does nothing while closed, since the
    /// download button is not rendered then.
    pub fn download(&self) -> Option<DownloadLink> {
        if !self.is_open() {
            return None;
        }

        let view = ModalView::from_props(&self.props);
        let link = DownloadLink {
            href: view.image_src,
            filename: view.download_filename,
        };
        self.host.borrow_mut().trigger_download(&link);

        tracing::info!(filename = %link.filename, "QR code download triggered");
        Some(link)
    }

    /// `None` while closed.
    pub fn render(&self) -> Option<ModalView> {
        match self.state {
            ModalState::Closed => None,
            ModalState::Open(_) => Some(ModalView::from_props(&self.props)),
        }
    }

    fn close(&mut self, trigger: CloseTrigger) -> Option<CloseTrigger> {
        match std::mem::replace(&mut self.state, ModalState::Closed) {
            ModalState::Open(guard) => {
                drop(guard);
                tracing::debug!(?trigger, "QR modal closed");
                Some(trigger)
            }
            ModalState::Closed => None,
        }
    }
}
