//! Display components rendered by the frontend.

pub mod host;
pub mod modal;
pub mod view;

pub use host::{DownloadLink, HeadlessDocument, ListenerId, ModalHost};
pub use modal::{ClickTarget, CloseTrigger, ModalPhase, QrModal, QrModalProps, CANCEL_KEY};
pub use view::ModalView;
