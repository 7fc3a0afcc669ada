//! Command-line integration tests
//!
//! Parses real argument vectors and executes them against scratch
//! directories.

use super::test_harness::*;
use clap::Parser;
use image::{GenericImageView, ImageFormat};
use qr_builder::cli::{execute, Cli};
use qr_builder::error::Result;
use qr_builder::pipeline::QrBuilder;
use std::fs;
use std::path::Path;

fn run(args: &[&str]) -> Result<()> {
    let mut argv = vec!["qr-builder"];
    argv.extend_from_slice(args);
    let cli = Cli::try_parse_from(argv).expect("Arguments should parse");
    execute(&cli.command, &QrBuilder::default(), 500)
}

fn path_str(path: &Path) -> &str {
    path.to_str().unwrap()
}

#[test]
fn test_qr_command_writes_png() {
    let dir = tempfile::tempdir().unwrap();
    let output = dir.path().join("qr.png");

    run(&["qr", "https://example.com", path_str(&output), "--size", "600"]).unwrap();

    let image = image::open(&output).unwrap();
    assert_eq!(image.dimensions(), (600, 600));
}

#[test]
fn test_qr_command_default_size_and_jpeg_output() {
    let dir = tempfile::tempdir().unwrap();
    let output = dir.path().join("qr.jpg");

    run(&["qr", "hello", path_str(&output)]).unwrap();

    let bytes = fs::read(&output).unwrap();
    assert_eq!(image::guess_format(&bytes).unwrap(), ImageFormat::Jpeg);
    assert_eq!(decode(&bytes).dimensions(), (500, 500));
}

#[test]
fn test_qr_command_rejects_bad_size() {
    let dir = tempfile::tempdir().unwrap();
    let output = dir.path().join("qr.png");

    let err = run(&["qr", "hello", path_str(&output), "--size", "5000"]).unwrap_err();
    assert_eq!(err.to_http_status(), 400);
    assert!(!output.exists());
}

#[test]
fn test_embed_command() {
    let dir = tempfile::tempdir().unwrap();
    let background = dir.path().join("bg.png");
    let output = dir.path().join("out.png");
    write_background(&background, 400, 300);

    run(&[
        "embed",
        path_str(&background),
        "https://example.com",
        path_str(&output),
        "--scale",
        "0.25",
        "--position",
        "bottom-right",
        "--margin",
        "10",
    ])
    .unwrap();

    let image = image::open(&output).unwrap().to_rgb8();
    assert_eq!(image.dimensions(), (400, 300));
    assert_eq!(image.get_pixel(5, 5).0, [0, 200, 0]);
    assert!(image.get_pixel(292, 192).0.iter().all(|c| *c > 200));
}

#[test]
fn test_embed_command_missing_background() {
    let dir = tempfile::tempdir().unwrap();
    let err = run(&[
        "embed",
        "/definitely/not/here.png",
        "data",
        path_str(&dir.path().join("out.png")),
    ])
    .unwrap_err();
    assert_eq!(err.to_http_status(), 404);
    assert!(err.to_string().contains("/definitely/not/here.png"));
}

#[test]
fn test_logo_and_text_commands() {
    let dir = tempfile::tempdir().unwrap();
    let logo = dir.path().join("logo.png");
    fs::write(&logo, picture_png(80, 40)).unwrap();

    let logo_out = dir.path().join("logo_qr.png");
    run(&[
        "logo",
        path_str(&logo),
        "https://example.com",
        path_str(&logo_out),
        "--size",
        "300",
        "--logo-scale",
        "0.3",
    ])
    .unwrap();
    assert_eq!(image::open(&logo_out).unwrap().dimensions(), (300, 300));

    let text_out = dir.path().join("text_qr.png");
    run(&[
        "text",
        "SCAN ME",
        "https://example.com",
        path_str(&text_out),
        "--size",
        "300",
        "--font-size",
        "14",
    ])
    .unwrap();
    assert_eq!(image::open(&text_out).unwrap().dimensions(), (300, 300));

    let err = run(&[
        "text",
        "W",
        "x",
        path_str(&text_out),
        "--size",
        "200",
        "--font-size",
        "200000",
    ])
    .unwrap_err();
    assert_eq!(err.to_http_status(), 400);

    let err = run(&[
        "logo",
        path_str(&logo),
        "x",
        path_str(&logo_out),
        "--logo-scale",
        "0.05",
    ])
    .unwrap_err();
    assert_eq!(
        err.to_string(),
        "logo_scale should be between 0.1 and 0.4 for reliable scanning."
    );
}

#[test]
fn test_artistic_and_qart_commands() {
    let dir = tempfile::tempdir().unwrap();
    let picture = dir.path().join("photo.png");
    fs::write(&picture, picture_png(90, 60)).unwrap();

    let artistic_out = dir.path().join("artistic.png");
    run(&[
        "artistic",
        path_str(&picture),
        "https://example.com",
        path_str(&artistic_out),
        "--bw",
        "--version",
        "4",
    ])
    .unwrap();
    let image = image::open(&artistic_out).unwrap();
    assert_eq!(image.width(), image.height());

    let qart_out = dir.path().join("qart.png");
    run(&[
        "qart",
        path_str(&picture),
        "https://example.com",
        path_str(&qart_out),
        "--point-size",
        "3",
        "--no-dither",
        "--fast",
        "--color",
        "20,40,160",
    ])
    .unwrap();
    assert!(image::open(&qart_out).is_ok());

    let err = run(&[
        "artistic",
        path_str(&dir.path().join("missing.png")),
        "x",
        path_str(&artistic_out),
    ])
    .unwrap_err();
    assert_eq!(err.to_http_status(), 404);
}

#[test]
fn test_batch_embed_command() {
    let input = tempfile::tempdir().unwrap();
    let output = tempfile::tempdir().unwrap();
    let output_dir = output.path().join("nested").join("out");

    write_background(&input.path().join("b.png"), 200, 100);
    write_background(&input.path().join("a.png"), 300, 200);
    fs::write(input.path().join("c.jpg"), background_jpeg(50, 50)).unwrap();

    run(&[
        "batch-embed",
        path_str(input.path()),
        "https://example.com",
        path_str(&output_dir),
        "--position",
        "top-left",
    ])
    .unwrap();

    let mut produced: Vec<String> = fs::read_dir(&output_dir)
        .unwrap()
        .map(|e| e.unwrap().file_name().to_string_lossy().into_owned())
        .collect();
    produced.sort();
    assert_eq!(produced, vec!["a_qr.png", "b_qr.png"]);
    assert_eq!(
        image::open(output_dir.join("a_qr.png")).unwrap().dimensions(),
        (300, 200)
    );
}

#[test]
fn test_batch_embed_keeps_extension() {
    let input = tempfile::tempdir().unwrap();
    let output = tempfile::tempdir().unwrap();
    fs::write(input.path().join("photo.jpg"), background_jpeg(120, 80)).unwrap();

    run(&[
        "batch-embed",
        path_str(input.path()),
        "data",
        path_str(output.path()),
        "--glob",
        "*.jpg",
    ])
    .unwrap();

    let bytes = fs::read(output.path().join("photo_qr.jpg")).unwrap();
    assert_eq!(image::guess_format(&bytes).unwrap(), ImageFormat::Jpeg);
}

#[test]
fn test_batch_embed_missing_input_dir() {
    let output = tempfile::tempdir().unwrap();
    let err = run(&[
        "batch-embed",
        "/no/such/dir",
        "data",
        path_str(output.path()),
    ])
    .unwrap_err();
    assert_eq!(err.to_http_status(), 404);
}
