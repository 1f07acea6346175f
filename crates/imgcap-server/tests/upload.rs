//! End-to-end tests for `POST /upload` with moderation disabled.

mod common;

use std::sync::Arc;

use async_trait::async_trait;
use axum::{body::Body, http::Request, http::StatusCode};
use base64::{engine::general_purpose::STANDARD, Engine as _};
use common::*;
use image::ImageFormat;
use imgcap_server::{router, AppState, Config, ModerationVerdict, Moderator};

fn app(config: Config) -> axum::Router {
    router(AppState::new(config).unwrap())
}

fn decode_payload(json: &serde_json::Value) -> Vec<u8> {
    STANDARD
        .decode(json["image_data"].as_str().unwrap())
        .unwrap()
}

#[tokio::test]
async fn test_small_png_is_returned_as_png() {
    let png = encode_as(&gradient(32, 32), ImageFormat::Png);
    let request = upload_request(&[Part::file("image", "photo.png", &png)]);

    let (status, json) = send_json(app(Config::default()), request).await;

    assert_eq!(status, StatusCode::OK);
    let payload = decode_payload(&json);
    assert_eq!(&payload[..8], b"\x89PNG\r\n\x1a\n");
    assert_eq!(json["size"].as_u64().unwrap() as usize, payload.len());
}

#[tokio::test]
async fn test_small_jpeg_is_returned_as_jpeg() {
    let jpeg = encode_as(&gradient(32, 32), ImageFormat::Jpeg);
    let request = upload_request(&[Part::file("image", "photo.jpg", &jpeg)]);

    let (status, json) = send_json(app(Config::default()), request).await;

    assert_eq!(status, StatusCode::OK);
    let payload = decode_payload(&json);
    assert_eq!(&payload[..2], &[0xFF, 0xD8]);
    assert_eq!(json["size"].as_u64().unwrap() as usize, payload.len());
}

#[tokio::test]
async fn test_bmp_is_returned_as_jpeg() {
    let bmp = encode_as(&gradient(16, 16), ImageFormat::Bmp);
    let request = upload_request(&[Part::file("image", "photo.bmp", &bmp)]);

    let (status, json) = send_json(app(Config::default()), request).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(&decode_payload(&json)[..2], &[0xFF, 0xD8]);
}

#[tokio::test]
async fn test_oversized_png_is_compressed_under_budget() {
    let png = encode_as(&noise(300, 300), ImageFormat::Png);
    assert!(png.len() > 100 * 1024);

    let mut config = Config::default();
    config.max_size_kb = 100;
    let request = upload_request(&[Part::file("image", "noise.png", &png)]);

    let (status, json) = send_json(app(config), request).await;

    assert_eq!(status, StatusCode::OK);
    let payload = decode_payload(&json);
    assert_eq!(&payload[..2], &[0xFF, 0xD8]);
    assert!(payload.len() <= 100 * 1024);
}

#[tokio::test]
async fn test_unreachable_budget_is_500() {
    let png = encode_as(&noise(256, 256), ImageFormat::Png);
    let mut config = Config::default();
    config.max_size_kb = 1;
    let request = upload_request(&[Part::file("image", "noise.png", &png)]);

    let (status, json) = send_json(app(config), request).await;

    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(
        json["error"],
        "could not compress the image to the requested size without losing too much quality"
    );
    assert!(json.get("image_data").is_none());
}

#[tokio::test]
async fn test_missing_image_field() {
    let request = upload_request(&[Part::text("caption", "hello")]);

    let (status, json) = send_json(app(Config::default()), request).await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(json["error"], "no image was provided");
}

#[tokio::test]
async fn test_image_field_without_filename_is_not_a_file() {
    let request = upload_request(&[Part::text("image", "not a file")]);

    let (status, json) = send_json(app(Config::default()), request).await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(json["error"], "no image was provided");
}

#[tokio::test]
async fn test_empty_filename() {
    let request = upload_request(&[Part::file("image", "", b"")]);

    let (status, json) = send_json(app(Config::default()), request).await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(json["error"], "no file was selected");
}

#[tokio::test]
async fn test_image_found_after_other_fields() {
    let png = encode_as(&gradient(8, 8), ImageFormat::Png);
    let request = upload_request(&[
        Part::text("caption", "hello"),
        Part::file("image", "photo.png", &png),
    ]);

    let (status, _) = send_json(app(Config::default()), request).await;

    assert_eq!(status, StatusCode::OK);
}

#[tokio::test]
async fn test_undecodable_bytes_are_500() {
    let request = upload_request(&[Part::file("image", "notes.txt", b"definitely not pixels")]);

    let (status, json) = send_json(app(Config::default()), request).await;

    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(json["error"], "Invalid or unsupported image format");
}

#[tokio::test]
async fn test_non_multipart_body_reports_missing_image() {
    let request = Request::builder()
        .method("POST")
        .uri("/upload")
        .header("content-type", "application/json")
        .body(Body::from("{}"))
        .unwrap();

    let (status, json) = send_json(app(Config::default()), request).await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(json["error"], "no image was provided");
}

#[tokio::test]
async fn test_missing_content_type_reports_missing_image() {
    let request = Request::builder()
        .method("POST")
        .uri("/upload")
        .body(Body::empty())
        .unwrap();

    let (status, json) = send_json(app(Config::default()), request).await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(json["error"], "no image was provided");
}

struct DenyAll;

#[async_trait]
impl Moderator for DenyAll {
    async fn check(&self, _image: &[u8]) -> ModerationVerdict {
        ModerationVerdict::deny("image contains weapons")
    }
}

#[tokio::test]
async fn test_rejection_happens_before_decoding() {
    let state = AppState::with_moderator(Config::default(), Arc::new(DenyAll));
    let request = upload_request(&[Part::file("image", "junk.bin", b"not an image")]);

    let (status, json) = send_json(router(state), request).await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(json["error"], "image contains weapons");
}

#[tokio::test]
async fn test_health() {
    let request = Request::builder().uri("/health").body(Body::empty()).unwrap();

    let (status, json) = send_json(app(Config::default()), request).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["status"], "ok");
    assert_eq!(json["version"], env!("CARGO_PKG_VERSION"));
}

#[tokio::test]
async fn test_landing_page() {
    let request = Request::builder().uri("/").body(Body::empty()).unwrap();

    let response = tower::ServiceExt::oneshot(app(Config::default()), request)
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let body = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    let html = String::from_utf8(body.to_vec()).unwrap();
    assert!(html.contains("name=\"image\""));
    assert!(html.contains("/upload"));
}
