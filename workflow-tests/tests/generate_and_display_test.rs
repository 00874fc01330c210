//! Roll number in, QR modal out: client, endpoint and modal together.

mod common;

use base64::{engine::general_purpose::STANDARD, Engine as _};
use qr_frontend::components::{
    ClickTarget, CloseTrigger, HeadlessDocument, ModalHost, QrModal, QrModalProps,
};
use std::cell::RefCell;
use std::rc::Rc;

#[tokio::test]
async fn generated_code_renders_in_modal_and_downloads() {
    let ctx = common::setup().await;

    let envelope = ctx.qr_client.generate_qr("21CS101").await.unwrap();
    assert!(envelope.success);
    let image = envelope.image.unwrap();
    assert!(STANDARD.decode(&image).is_ok());

    let doc = Rc::new(RefCell::new(HeadlessDocument::with_body_overflow("scroll")));
    let mut modal = QrModal::new(
        Rc::clone(&doc),
        QrModalProps {
            qr_image_base64: image.clone(),
            roll_number: "21cs101".to_string(),
        },
    );
    modal.set_open(true);

    let view = modal.render().unwrap();
    assert_eq!(view.caption, "21CS101");
    assert_eq!(view.download_filename, "21CS101_qr.png");
    assert_eq!(view.image_src, format!("data:image/png;base64,{}", image));

    modal.handle_click(ClickTarget::DownloadButton);
    assert_eq!(doc.borrow().downloads()[0].filename, "21CS101_qr.png");

    assert_eq!(
        modal.handle_click(ClickTarget::Overlay),
        Some(CloseTrigger::OverlayClick)
    );
    assert_eq!(doc.borrow().key_listener_count(), 0);
    assert_eq!(doc.borrow().body_overflow(), "scroll");
}

#[tokio::test]
async fn empty_roll_number_yields_failure_message() {
    let ctx = common::setup().await;

    let envelope = ctx.qr_client.generate_qr("").await.unwrap();

    assert!(!envelope.success);
    assert!(envelope.image.is_none());
    assert!(!envelope.message.unwrap_or_default().is_empty());
}

#[tokio::test]
async fn distinct_roll_numbers_render_distinct_images() {
    let ctx = common::setup().await;

    let a = ctx.qr_client.generate_qr("21CS101").await.unwrap();
    let b = ctx.qr_client.generate_qr("21CS102").await.unwrap();

    assert!(a.success && b.success);
    assert_ne!(a.image, b.image);
}

#[tokio::test]
async fn frontend_form_round_trip_opens_modal() {
    let ctx = common::setup().await;

    let page = ctx
        .http
        .post(format!("{}/qr", ctx.endpoints.frontend))
        .form(&[("rollNumber", "21cs101")])
        .send()
        .await
        .unwrap();

    assert_eq!(page.status(), reqwest::StatusCode::OK);
    let html = page.text().await.unwrap();
    assert!(html.contains("qr-modal-overlay"));
    assert!(html.contains("21CS101_qr.png"));
}
