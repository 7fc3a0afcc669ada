// Codec seam tests
// Custom codecs plugged into the pipeline see staged files that disappear
// once the request finishes.

use image::{DynamicImage, ImageFormat, Rgba, RgbaImage};
use qr_builder::artistic::{ArtisticCodec, ArtisticRequest, HalftoneCodec, QartRequest};
use qr_builder::batch::BatchSource;
use qr_builder::error::{QrBuilderError, Result};
use qr_builder::pipeline::QrBuilder;
use std::io::Cursor;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};

fn picture() -> Vec<u8> {
    let img = RgbaImage::from_pixel(16, 16, Rgba([10, 20, 30, 255]));
    let mut out = Cursor::new(Vec::new());
    DynamicImage::ImageRgba8(img)
        .write_to(&mut out, ImageFormat::Png)
        .unwrap();
    out.into_inner()
}

/// Copies the picture to the output and remembers the paths it was given.
#[derive(Default)]
struct RecordingCodec {
    seen: Mutex<Vec<(PathBuf, PathBuf)>>,
    fail: bool,
}

impl RecordingCodec {
    fn record(&self, picture: &Path, output: &Path) -> Result<()> {
        assert!(picture.is_file(), "picture should be staged before render");
        self.seen
            .lock()
            .unwrap()
            .push((picture.to_path_buf(), output.to_path_buf()));
        if self.fail {
            return Err(QrBuilderError::internal("codec exploded"));
        }
        std::fs::copy(picture, output)?;
        Ok(())
    }
}

impl ArtisticCodec for RecordingCodec {
    fn name(&self) -> &'static str {
        "recording"
    }

    fn render(&self, _request: &ArtisticRequest, picture: &Path, output: &Path) -> Result<()> {
        self.record(picture, output)
    }
}

impl HalftoneCodec for RecordingCodec {
    fn name(&self) -> &'static str {
        "recording"
    }

    fn render(&self, _request: &QartRequest, picture: &Path, output: &Path) -> Result<()> {
        self.record(picture, output)
    }
}

#[test]
fn test_artistic_codec_output_is_returned_and_staging_removed() {
    let codec = Arc::new(RecordingCodec::default());
    let builder = QrBuilder::default().with_artistic_codec(codec.clone());
    assert_eq!(builder.artistic_codec_name(), "recording");

    let input = picture();
    let output = builder
        .artistic_png(&ArtisticRequest::new("https://example.com"), &input)
        .unwrap();
    assert_eq!(output, input);

    let seen = codec.seen.lock().unwrap();
    assert_eq!(seen.len(), 1);
    let (picture_path, output_path) = &seen[0];
    assert_eq!(picture_path.extension().unwrap(), "png");
    assert!(!picture_path.exists());
    assert!(!output_path.exists());
    assert!(!picture_path.parent().unwrap().exists());
}

#[test]
fn test_failing_codec_cleans_up_and_maps_to_server_error() {
    let codec = Arc::new(RecordingCodec {
        fail: true,
        ..RecordingCodec::default()
    });
    let builder = QrBuilder::default().with_halftone_codec(codec.clone());

    let err = builder
        .qart_png(&QartRequest::new("https://example.com"), &picture())
        .unwrap_err();
    assert_eq!(err.to_http_status(), 500);

    let seen = codec.seen.lock().unwrap();
    assert!(!seen[0].0.parent().unwrap().exists());
}

#[test]
fn test_validation_runs_before_codec() {
    let codec = Arc::new(RecordingCodec::default());
    let builder = QrBuilder::default().with_artistic_codec(codec.clone());

    let mut request = ArtisticRequest::new("x");
    request.version = 41;
    assert!(builder.artistic_png(&request, &picture()).is_err());
    assert!(builder
        .artistic_png(&ArtisticRequest::new("x"), b"not an image")
        .is_err());
    assert!(codec.seen.lock().unwrap().is_empty());
}

#[test]
fn test_batch_artistic_uses_codec_per_source() {
    let codec = Arc::new(RecordingCodec::default());
    let builder = QrBuilder::default().with_artistic_codec(codec.clone());
    let sources = vec![
        BatchSource::new(Some("one.png".into()), picture()),
        BatchSource::new(Some("two.jpeg".into()), picture()),
    ];

    let archive = builder
        .batch_artistic(&sources, &ArtisticRequest::new("https://example.com"))
        .unwrap();
    let archive = zip::ZipArchive::new(Cursor::new(archive)).unwrap();
    let names: Vec<&str> = archive.file_names().collect();
    assert!(names.contains(&"one_artistic.png"));
    assert!(names.contains(&"two_artistic.png"));
    assert_eq!(codec.seen.lock().unwrap().len(), 2);
}
