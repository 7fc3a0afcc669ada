// Test harness for integration tests
// Provides an in-process router, request builders and image fixtures

use axum::body::Body;
use axum::http::header::CONTENT_TYPE;
use axum::http::{Request, Response};
use axum::Router;
use http_body_util::BodyExt;
use image::{DynamicImage, ImageFormat, Rgb, RgbImage, Rgba, RgbaImage};
use std::io::Cursor;
use std::path::Path;
use tower::ServiceExt;

use qr_builder::config::Config;
use qr_builder::server::{router, AppState};

const BOUNDARY: &str = "qr-builder-test-boundary";

/// Router over a fresh state built from `config`.
pub fn test_router(config: &Config) -> Router {
    let state = AppState::new(config).expect("Failed to create app state");
    router(state)
}

/// Send one request through `app` and return the response.
pub async fn send(app: Router, request: Request<Body>) -> Response<Body> {
    app.oneshot(request).await.expect("Router call failed")
}

pub async fn body_bytes(response: Response<Body>) -> Vec<u8> {
    response
        .into_body()
        .collect()
        .await
        .expect("Failed to read body")
        .to_bytes()
        .to_vec()
}

pub async fn body_json(response: Response<Body>) -> serde_json::Value {
    serde_json::from_slice(&body_bytes(response).await).expect("Body is not JSON")
}

pub fn get(uri: &str) -> Request<Body> {
    Request::builder()
        .uri(uri)
        .body(Body::empty())
        .expect("Failed to build request")
}

/// POST an `application/x-www-form-urlencoded` body.
pub fn post_urlencoded(uri: &str, body: &str) -> Request<Body> {
    Request::builder()
        .method("POST")
        .uri(uri)
        .header(CONTENT_TYPE, "application/x-www-form-urlencoded")
        .body(Body::from(body.to_string()))
        .expect("Failed to build request")
}

/// One multipart part; `file_name` marks it as an upload.
pub struct Part<'a> {
    pub name: &'a str,
    pub file_name: Option<&'a str>,
    pub bytes: Vec<u8>,
}

impl<'a> Part<'a> {
    pub fn text(name: &'a str, value: &str) -> Self {
        Self {
            name,
            file_name: None,
            bytes: value.as_bytes().to_vec(),
        }
    }

    pub fn file(name: &'a str, file_name: &'a str, bytes: Vec<u8>) -> Self {
        Self {
            name,
            file_name: Some(file_name),
            bytes,
        }
    }
}

/// POST a `multipart/form-data` body.
pub fn post_multipart(uri: &str, parts: Vec<Part<'_>>) -> Request<Body> {
    let mut body = Vec::new();
    for part in parts {
        body.extend_from_slice(format!("--{}\r\n", BOUNDARY).as_bytes());
        match part.file_name {
            Some(file_name) => body.extend_from_slice(
                format!(
                    "Content-Disposition: form-data; name=\"{}\"; filename=\"{}\"\r\nContent-Type: application/octet-stream\r\n\r\n",
                    part.name, file_name
                )
                .as_bytes(),
            ),
            None => body.extend_from_slice(
                format!("Content-Disposition: form-data; name=\"{}\"\r\n\r\n", part.name).as_bytes(),
            ),
        }
        body.extend_from_slice(&part.bytes);
        body.extend_from_slice(b"\r\n");
    }
    body.extend_from_slice(format!("--{}--\r\n", BOUNDARY).as_bytes());

    Request::builder()
        .method("POST")
        .uri(uri)
        .header(
            CONTENT_TYPE,
            format!("multipart/form-data; boundary={}", BOUNDARY),
        )
        .body(Body::from(body))
        .expect("Failed to build request")
}

/// Solid green RGB background encoded as PNG.
pub fn background_png(width: u32, height: u32) -> Vec<u8> {
    encode(
        DynamicImage::ImageRgb8(RgbImage::from_pixel(width, height, Rgb([0, 200, 0]))),
        ImageFormat::Png,
    )
}

/// Gradient picture with alpha, for logos and artistic sources.
pub fn picture_png(width: u32, height: u32) -> Vec<u8> {
    let img = RgbaImage::from_fn(width, height, |x, y| {
        Rgba([(x * 255 / width) as u8, (y * 255 / height) as u8, 128, 255])
    });
    encode(DynamicImage::ImageRgba8(img), ImageFormat::Png)
}

pub fn background_jpeg(width: u32, height: u32) -> Vec<u8> {
    encode(
        DynamicImage::ImageRgb8(RgbImage::from_pixel(width, height, Rgb([30, 60, 200]))),
        ImageFormat::Jpeg,
    )
}

pub fn write_background(path: &Path, width: u32, height: u32) {
    std::fs::write(path, background_png(width, height)).expect("Failed to write fixture");
}

pub fn decode(bytes: &[u8]) -> DynamicImage {
    image::load_from_memory(bytes).expect("Output is not a decodable image")
}

fn encode(image: DynamicImage, format: ImageFormat) -> Vec<u8> {
    let mut out = Cursor::new(Vec::new());
    image.write_to(&mut out, format).expect("Failed to encode fixture");
    out.into_inner()
}
