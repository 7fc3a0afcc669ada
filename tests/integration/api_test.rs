//! HTTP API integration tests
//!
//! Drives the full router in-process:
//!   Request → form extraction → pipeline (blocking pool) → PNG/ZIP response

use super::test_harness::*;
use axum::http::header::{CONTENT_DISPOSITION, CONTENT_TYPE};
use axum::http::{Method, Request, StatusCode};
use axum::body::Body;
use image::GenericImageView;
use qr_builder::config::Config;
use std::io::{Cursor, Read};

fn app() -> axum::Router {
    test_router(&Config::default())
}

fn zip_entries(bytes: Vec<u8>) -> Vec<(String, Vec<u8>)> {
    let mut archive = zip::ZipArchive::new(Cursor::new(bytes)).expect("Response is not a ZIP");
    (0..archive.len())
        .map(|i| {
            let mut file = archive.by_index(i).unwrap();
            let mut contents = Vec::new();
            file.read_to_end(&mut contents).unwrap();
            (file.name().to_string(), contents)
        })
        .collect()
}

// ============================================================================
// Informational routes
// ============================================================================

#[tokio::test]
async fn test_health() {
    let response = send(app(), get("/health")).await;
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(body_json(response).await, serde_json::json!({ "status": "ok" }));
}

#[tokio::test]
async fn test_styles_lists_presets() {
    let response = send(app(), get("/styles")).await;
    assert_eq!(response.status(), StatusCode::OK);

    let body = body_json(response).await;
    let presets: Vec<&str> = body["artistic_presets"]
        .as_array()
        .unwrap()
        .iter()
        .map(|p| p["name"].as_str().unwrap())
        .collect();
    assert_eq!(presets, vec!["small", "medium", "large", "hd"]);
    assert!(body["styles"]
        .as_array()
        .unwrap()
        .iter()
        .any(|s| s["name"] == "embed"));
}

#[tokio::test]
async fn test_metrics_count_requests() {
    let app = app();
    send(app.clone(), get("/health")).await;
    send(app.clone(), post_urlencoded("/qr", "data=")).await;

    let response = send(app, get("/metrics")).await;
    assert_eq!(response.status(), StatusCode::OK);
    let text = String::from_utf8(body_bytes(response).await).unwrap();
    assert!(text.contains("qr_builder_requests_total{endpoint=\"/health\",status=\"200\"} 1"));
    assert!(text.contains("qr_builder_requests_total{endpoint=\"/qr\",status=\"400\"} 1"));
}

// ============================================================================
// /qr
// ============================================================================

#[tokio::test]
async fn test_qr_urlencoded() {
    let response = send(app(), post_urlencoded("/qr", "data=https%3A%2F%2Fexample.com&size=300")).await;
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(response.headers()[CONTENT_TYPE], "image/png");

    let image = decode(&body_bytes(response).await);
    assert_eq!(image.dimensions(), (300, 300));
}

#[tokio::test]
async fn test_qr_multipart_uses_default_size() {
    let request = post_multipart(
        "/qr",
        vec![Part::text("data", "hello"), Part::text("fill_color", "navy")],
    );
    let response = send(app(), request).await;
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(decode(&body_bytes(response).await).dimensions(), (500, 500));
}

#[tokio::test]
async fn test_qr_default_size_comes_from_config() {
    let mut config = Config::default();
    config.render.default_size = 256;
    let response = send(test_router(&config), post_urlencoded("/qr", "data=hello")).await;
    assert_eq!(decode(&body_bytes(response).await).dimensions(), (256, 256));
}

#[tokio::test]
async fn test_qr_rejects_empty_data() {
    let response = send(app(), post_urlencoded("/qr", "data=%20%20")).await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert_eq!(body_json(response).await["detail"], "Data cannot be empty.");
}

#[tokio::test]
async fn test_qr_rejects_out_of_range_size() {
    for size in ["20", "4001"] {
        let response = send(app(), post_urlencoded("/qr", &format!("data=x&size={}", size))).await;
        assert_eq!(response.status(), StatusCode::BAD_REQUEST, "size {}", size);
    }
}

#[tokio::test]
async fn test_qr_rejects_bad_color_and_missing_data() {
    let response = send(app(), post_urlencoded("/qr", "data=x&fill_color=notacolor")).await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert!(body_json(response).await["detail"]
        .as_str()
        .unwrap()
        .contains("notacolor"));

    let response = send(app(), post_urlencoded("/qr", "size=300")).await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert_eq!(body_json(response).await["detail"], "Missing required field 'data'.");
}

// ============================================================================
// /embed
// ============================================================================

#[tokio::test]
async fn test_embed_bottom_right() {
    let request = post_multipart(
        "/embed",
        vec![
            Part::file("background", "bg.png", background_png(400, 300)),
            Part::text("data", "https://example.com"),
            Part::text("scale", "0.25"),
            Part::text("position", "bottom-right"),
            Part::text("margin", "10"),
        ],
    );
    let response = send(app(), request).await;
    assert_eq!(response.status(), StatusCode::OK);

    let image = decode(&body_bytes(response).await).to_rgb8();
    assert_eq!(image.dimensions(), (400, 300));
    // Background untouched outside the QR square at (290, 190)
    assert_eq!(image.get_pixel(10, 10).0, [0, 200, 0]);
    assert_eq!(image.get_pixel(289, 250).0, [0, 200, 0]);
    // Quiet zone just inside the QR's top-left corner
    let quiet = image.get_pixel(292, 192).0;
    assert!(quiet.iter().all(|c| *c > 200), "expected white, got {:?}", quiet);
}

#[tokio::test]
async fn test_embed_is_deterministic() {
    let build = || {
        post_multipart(
            "/embed",
            vec![
                Part::file("background", "bg.jpg", background_jpeg(320, 240)),
                Part::text("data", "same input"),
            ],
        )
    };
    let first = body_bytes(send(app(), build()).await).await;
    let second = body_bytes(send(app(), build()).await).await;
    assert_eq!(first, second);
}

#[tokio::test]
async fn test_embed_errors() {
    let cases = vec![
        (
            vec![Part::text("data", "x")],
            "Missing required field 'background'.",
        ),
        (
            vec![
                Part::file("background", "bg.png", background_png(100, 100)),
                Part::text("data", "x"),
                Part::text("position", "middle"),
            ],
            "Invalid position 'middle'",
        ),
        (
            vec![
                Part::file("background", "bg.png", b"not an image".to_vec()),
                Part::text("data", "x"),
            ],
            "",
        ),
        (
            vec![
                Part::file("background", "bg.png", background_png(100, 100)),
                Part::text("data", "x"),
                Part::text("scale", "1.5"),
            ],
            "",
        ),
    ];

    for (parts, detail) in cases {
        let response = send(app(), post_multipart("/embed", parts)).await;
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        let body = body_json(response).await;
        assert!(
            body["detail"].as_str().unwrap().contains(detail),
            "unexpected detail {}",
            body["detail"]
        );
    }
}

// ============================================================================
// Center overlays
// ============================================================================

#[tokio::test]
async fn test_logo_scale_bounds() {
    for (scale, expected) in [
        ("0.05", StatusCode::BAD_REQUEST),
        ("0.4", StatusCode::OK),
        ("0.41", StatusCode::BAD_REQUEST),
    ] {
        let request = post_multipart(
            "/qr/logo",
            vec![
                Part::file("logo", "logo.png", picture_png(64, 64)),
                Part::text("data", "https://example.com"),
                Part::text("size", "300"),
                Part::text("logo_scale", scale),
            ],
        );
        let response = send(app(), request).await;
        assert_eq!(response.status(), expected, "logo_scale {}", scale);
        if expected == StatusCode::OK {
            assert_eq!(decode(&body_bytes(response).await).dimensions(), (300, 300));
        }
    }
}

#[tokio::test]
async fn test_text_overlay() {
    let response = send(
        app(),
        post_urlencoded("/qr/text", "text=HELLO&data=https%3A%2F%2Fexample.com&size=400&font_color=red"),
    )
    .await;
    assert_eq!(response.status(), StatusCode::OK);
    let image = decode(&body_bytes(response).await).to_rgba8();
    assert_eq!(image.dimensions(), (400, 400));
    // Some red text pixels near the center
    assert!(image
        .enumerate_pixels()
        .filter(|(x, y, _)| (150..250).contains(x) && (150..250).contains(y))
        .any(|(_, _, p)| p[0] > 200 && p[1] < 60 && p[2] < 60));
}

#[tokio::test]
async fn test_text_overlay_requires_text() {
    let response = send(app(), post_urlencoded("/qr/text", "data=x")).await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_text_overlay_rejects_font_larger_than_area() {
    let response = send(
        app(),
        post_urlencoded("/qr/text", "text=W&data=x&size=200&font_size=200000"),
    )
    .await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let body = body_json(response).await;
    assert_eq!(body["detail"], "font_size must not exceed the text area (60px).");
}

// ============================================================================
// Artistic and halftone
// ============================================================================

#[tokio::test]
async fn test_artistic_with_preset() {
    let request = post_multipart(
        "/qr/artistic",
        vec![
            Part::file("image", "photo.png", picture_png(120, 90)),
            Part::text("data", "https://example.com"),
            Part::text("preset", "small"),
        ],
    );
    let response = send(app(), request).await;
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(response.headers()[CONTENT_TYPE], "image/png");
    let image = decode(&body_bytes(response).await);
    assert_eq!(image.width(), image.height());
}

#[tokio::test]
async fn test_artistic_rejects_bad_version() {
    let request = post_multipart(
        "/qr/artistic",
        vec![
            Part::file("image", "photo.png", picture_png(32, 32)),
            Part::text("data", "x"),
            Part::text("version", "41"),
        ],
    );
    assert_eq!(send(app(), request).await.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_qart() {
    let request = post_multipart(
        "/qr/qart",
        vec![
            Part::file("image", "photo.png", picture_png(100, 100)),
            Part::text("data", "https://example.com"),
            Part::text("version", "3"),
            Part::text("point_size", "4"),
            Part::text("dither", "false"),
            Part::text("color_r", "200"),
        ],
    );
    let response = send(app(), request).await;
    assert_eq!(response.status(), StatusCode::OK);
    let image = decode(&body_bytes(response).await);
    assert_eq!(image.width(), image.height());

    let request = post_multipart(
        "/qr/qart",
        vec![
            Part::file("image", "photo.png", picture_png(100, 100)),
            Part::text("data", "x"),
            Part::text("color_g", "256"),
        ],
    );
    assert_eq!(send(app(), request).await.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_qart_rejects_oversized_canvas() {
    let request = post_multipart(
        "/qr/qart",
        vec![
            Part::file("image", "photo.png", picture_png(64, 64)),
            Part::text("data", "x"),
            Part::text("version", "40"),
            Part::text("point_size", "64"),
        ],
    );
    let response = send(app(), request).await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let body = body_json(response).await;
    assert!(body["detail"].as_str().unwrap().contains("point_size"));
}

// ============================================================================
// Batches
// ============================================================================

#[tokio::test]
async fn test_batch_embed_archive() {
    let request = post_multipart(
        "/batch/embed",
        vec![
            Part::file("backgrounds", "photo.jpg", background_jpeg(200, 150)),
            Part::file("backgrounds", "banner", background_png(300, 100)),
            Part::text("data", "https://example.com"),
            Part::text("position", "top-left"),
        ],
    );
    let response = send(app(), request).await;
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(response.headers()[CONTENT_TYPE], "application/zip");
    assert_eq!(
        response.headers()[CONTENT_DISPOSITION],
        "attachment; filename=batch_qr.zip"
    );

    let entries = zip_entries(body_bytes(response).await);
    let names: Vec<&str> = entries.iter().map(|(name, _)| name.as_str()).collect();
    assert_eq!(names, vec!["photo_qr.png", "banner_qr.png"]);
    assert_eq!(decode(&entries[0].1).dimensions(), (200, 150));
    assert_eq!(decode(&entries[1].1).dimensions(), (300, 100));
}

#[tokio::test]
async fn test_batch_embed_fails_whole_batch() {
    let request = post_multipart(
        "/batch/embed",
        vec![
            Part::file("backgrounds", "good.png", background_png(200, 150)),
            Part::file("backgrounds", "bad.png", b"garbage".to_vec()),
            Part::text("data", "x"),
        ],
    );
    let response = send(app(), request).await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert!(response.headers().get(CONTENT_DISPOSITION).is_none());
}

#[tokio::test]
async fn test_batch_artistic_archive() {
    let request = post_multipart(
        "/batch/artistic",
        vec![
            Part::file("images", "cat.png", picture_png(64, 64)),
            Part::file("images", "dog.webp.png", picture_png(48, 80)),
            Part::text("data", "https://example.com"),
            Part::text("preset", "small"),
        ],
    );
    let response = send(app(), request).await;
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(
        response.headers()[CONTENT_DISPOSITION],
        "attachment; filename=batch_artistic_qr.zip"
    );

    let names: Vec<String> = zip_entries(body_bytes(response).await)
        .into_iter()
        .map(|(name, _)| name)
        .collect();
    assert_eq!(names, vec!["cat_artistic.png", "dog.webp_artistic.png"]);
}

#[tokio::test]
async fn test_batch_artistic_rejects_unknown_preset() {
    let request = post_multipart(
        "/batch/artistic",
        vec![
            Part::file("images", "cat.png", picture_png(64, 64)),
            Part::text("data", "x"),
            Part::text("preset", "ultra"),
        ],
    );
    assert_eq!(send(app(), request).await.status(), StatusCode::BAD_REQUEST);
}

// ============================================================================
// Transport
// ============================================================================

#[tokio::test]
async fn test_upload_limit() {
    let mut config = Config::default();
    config.server.max_upload_bytes = 1024;
    let request = post_multipart(
        "/embed",
        vec![
            Part::file("background", "big.png", vec![0u8; 8 * 1024]),
            Part::text("data", "x"),
        ],
    );
    let response = send(test_router(&config), request).await;
    assert_eq!(response.status(), StatusCode::PAYLOAD_TOO_LARGE);
}

#[tokio::test]
async fn test_cors_allows_any_origin() {
    let request = Request::builder()
        .method(Method::OPTIONS)
        .uri("/qr")
        .header("origin", "https://somewhere.example")
        .header("access-control-request-method", "POST")
        .body(Body::empty())
        .unwrap();
    let response = send(app(), request).await;
    assert_eq!(response.headers()["access-control-allow-origin"], "*");
}
