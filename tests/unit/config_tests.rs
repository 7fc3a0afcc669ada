// Configuration loading tests

use qr_builder::config::{Config, LogFormat};
use std::io::Write;

#[test]
fn test_load_without_file_uses_defaults() {
    let config = Config::load(None).unwrap();
    assert_eq!(config.render.default_size, 500);
    assert_eq!(config.logging.format, LogFormat::Json);
    assert!(config.artistic.command.is_none());
    assert!(config.validate().is_ok());
}

#[test]
fn test_load_from_file_with_substitution() {
    std::env::set_var("QR_BUILDER_TEST_AMZQR", "/opt/amzqr/bin/amzqr");
    let mut file = tempfile::NamedTempFile::new().unwrap();
    write!(
        file,
        "render:\n  default_size: 640\n  optimize_png: true\nartistic:\n  command: ${{QR_BUILDER_TEST_AMZQR}}\n"
    )
    .unwrap();

    let config = Config::load(Some(file.path())).unwrap();
    assert_eq!(config.render.default_size, 640);
    assert!(config.render.optimize_png);
    assert_eq!(
        config.artistic.command.as_deref(),
        Some(std::path::Path::new("/opt/amzqr/bin/amzqr"))
    );
}

#[test]
fn test_load_rejects_malformed_yaml() {
    let mut file = tempfile::NamedTempFile::new().unwrap();
    write!(file, "server: [not, a, map]").unwrap();
    let err = Config::load(Some(file.path())).unwrap_err();
    assert_eq!(err.to_http_status(), 500);
    assert!(err.to_string().starts_with("Configuration error"));
}
