use askama::Template;
use service_core::api::DOWNLOAD_SUFFIX;

use super::modal::QrModalProps;

/// Everything the open modal shows. Rendered as the `qr_modal.html` partial.
#[derive(Template, Debug, Clone, PartialEq, Eq)]
#[template(path = "qr_modal.html")]
pub struct ModalView {
    pub image_src: String,
    pub alt: String,
    pub caption: String,
    pub download_filename: String,
}

impl ModalView {
    pub fn from_props(props: &QrModalProps) -> Self {
        let roll_number = props.roll_number.trim();
        let caption = roll_number.to_uppercase();

        Self {
            image_src: data_uri(&props.qr_image_base64),
            alt: format!("QR code for {}", roll_number),
            download_filename: format!("{}{}", caption, DOWNLOAD_SUFFIX),
            caption,
        }
    }
}

pub fn data_uri(base64_png: &str) -> String {
    format!("data:image/png;base64,{}", base64_png)
}
