// Command execution for the qr-builder binary

use image::{DynamicImage, ImageFormat};
use std::fs;
use std::path::{Path, PathBuf};

use super::{
    ArtisticArgs, BatchEmbedArgs, Command, EmbedArgs, LogoArgs, QartArgs, QrArgs, TextArgs,
};
use crate::artistic::{ArtisticRequest, QartRequest};
use crate::batch::sibling_output_name;
use crate::color::Color;
use crate::constants::EMBED_SUFFIX;
use crate::error::{QrBuilderError, Result};
use crate::pipeline::{QrBuilder, TextOverlay};
use crate::render::{decode_image, open_image, PngEncoder, QrRequest};

/// Run one subcommand. `default_size` applies when `--size` is omitted.
pub fn execute(command: &Command, builder: &QrBuilder, default_size: i64) -> Result<()> {
    match command {
        Command::Qr(args) => qr(builder, args, default_size),
        Command::Embed(args) => embed(builder, args),
        Command::Logo(args) => logo(builder, args, default_size),
        Command::Text(args) => text(builder, args, default_size),
        Command::Artistic(args) => artistic(builder, args),
        Command::Qart(args) => qart(builder, args),
        Command::BatchEmbed(args) => batch_embed(builder, args),
    }
}

fn qr(builder: &QrBuilder, args: &QrArgs, default_size: i64) -> Result<()> {
    let request = QrRequest::new(args.data.as_str())
        .with_size(args.size.unwrap_or(default_size))
        .with_colors(args.colors.fill_color, args.colors.back_color);
    let qr = builder.render_qr(&request)?;
    write_image(builder.encoder(), &DynamicImage::ImageRgba8(qr), &args.output)?;
    tracing::info!(output = %args.output.display(), size = request.size, "Saved QR");
    Ok(())
}

fn embed(builder: &QrBuilder, args: &EmbedArgs) -> Result<()> {
    let request = args.placement.request(&args.data);
    request.validate()?;
    let background = open_image(&args.background)?;
    let merged = builder.embed(&background, &request)?;
    write_image(builder.encoder(), &merged, &args.output)?;
    tracing::info!(
        background = %args.background.display(),
        output = %args.output.display(),
        position = %request.placement.anchor,
        "Embedded QR"
    );
    Ok(())
}

fn logo(builder: &QrBuilder, args: &LogoArgs, default_size: i64) -> Result<()> {
    let request = QrRequest::new(args.data.as_str())
        .with_size(args.size.unwrap_or(default_size))
        .with_colors(args.colors.fill_color, args.colors.back_color);
    request.validate()?;
    let logo = open_image(&args.logo)?;
    let qr = builder.logo(&request, &logo, args.logo_scale)?;
    write_image(builder.encoder(), &DynamicImage::ImageRgba8(qr), &args.output)?;
    tracing::info!(output = %args.output.display(), "Saved QR with logo");
    Ok(())
}

fn text(builder: &QrBuilder, args: &TextArgs, default_size: i64) -> Result<()> {
    let request = QrRequest::new(args.data.as_str())
        .with_size(args.size.unwrap_or(default_size))
        .with_colors(args.colors.fill_color, args.colors.back_color);
    let overlay = TextOverlay {
        text_scale: args.text_scale,
        font_color: args.font_color,
        font_size: args.font_size,
        ..TextOverlay::new(args.text.as_str())
    };
    let qr = builder.text(&request, &overlay)?;
    write_image(builder.encoder(), &DynamicImage::ImageRgba8(qr), &args.output)?;
    tracing::info!(output = %args.output.display(), "Saved QR with text");
    Ok(())
}

fn artistic(builder: &QrBuilder, args: &ArtisticArgs) -> Result<()> {
    let request = ArtisticRequest::from_parts(
        args.data.as_str(),
        args.preset,
        args.symbol_version,
        args.contrast,
        args.brightness,
        !args.bw,
    )?;
    let picture = read_input(&args.image)?;
    let png = builder.artistic_png(&request, &picture)?;
    write_png_bytes(builder.encoder(), &png, &args.output)?;
    tracing::info!(
        output = %args.output.display(),
        version = request.version,
        codec = builder.artistic_codec_name(),
        "Saved artistic QR"
    );
    Ok(())
}

fn qart(builder: &QrBuilder, args: &QartArgs) -> Result<()> {
    let request = QartRequest::from_parts(
        args.data.as_str(),
        args.symbol_version,
        args.point_size,
        !args.no_dither,
        args.fast,
        args.color.unwrap_or_else(Color::black),
    )?;
    let picture = read_input(&args.image)?;
    let png = builder.qart_png(&request, &picture)?;
    write_png_bytes(builder.encoder(), &png, &args.output)?;
    tracing::info!(output = %args.output.display(), version = request.version, "Saved halftone QR");
    Ok(())
}

fn batch_embed(builder: &QrBuilder, args: &BatchEmbedArgs) -> Result<()> {
    let request = args.placement.request(&args.data);
    request.validate()?;
    if !args.input_dir.is_dir() {
        return Err(QrBuilderError::not_found(&args.input_dir));
    }

    let inputs = matching_files(&args.input_dir, &args.glob)?;
    fs::create_dir_all(&args.output_dir)?;
    if inputs.is_empty() {
        tracing::warn!(
            input_dir = %args.input_dir.display(),
            glob = %args.glob,
            "No input images matched"
        );
        return Ok(());
    }

    for input in &inputs {
        let background = open_image(input)?;
        let merged = builder.embed(&background, &request)?;
        let output = sibling_output_name(input, &args.output_dir, EMBED_SUFFIX);
        write_image(builder.encoder(), &merged, &output)?;
        tracing::info!(input = %input.display(), output = %output.display(), "Embedded QR");
    }

    tracing::info!(count = inputs.len(), output_dir = %args.output_dir.display(), "Batch complete");
    Ok(())
}

fn read_input(path: &Path) -> Result<Vec<u8>> {
    if !path.is_file() {
        return Err(QrBuilderError::not_found(path));
    }
    Ok(fs::read(path)?)
}

/// Save `image` in the format implied by the extension; PNG when there is none.
pub fn write_image(encoder: PngEncoder, image: &DynamicImage, path: &Path) -> Result<()> {
    match ImageFormat::from_path(path) {
        Ok(ImageFormat::Png) | Err(_) => encoder.save(image, path),
        // No alpha channel in JPEG
        Ok(ImageFormat::Jpeg) => DynamicImage::ImageRgb8(image.to_rgb8())
            .save_with_format(path, ImageFormat::Jpeg)
            .map_err(QrBuilderError::image),
        Ok(format) => image
            .save_with_format(path, format)
            .map_err(QrBuilderError::image),
    }
}

/// Write already-encoded PNG bytes, re-encoding only for other extensions.
fn write_png_bytes(encoder: PngEncoder, png: &[u8], path: &Path) -> Result<()> {
    match ImageFormat::from_path(path) {
        Ok(ImageFormat::Png) | Err(_) => Ok(fs::write(path, png)?),
        Ok(_) => write_image(encoder, &decode_image(png)?, path),
    }
}

/// Files directly inside `dir` whose name matches `pattern`, in sorted order.
///
/// Hidden files only match patterns that themselves start with a dot.
pub fn matching_files(dir: &Path, pattern: &str) -> Result<Vec<PathBuf>> {
    let mut matches = Vec::new();
    for entry in fs::read_dir(dir)? {
        let entry = entry?;
        if !entry.file_type()?.is_file() {
            continue;
        }
        let name = entry.file_name();
        let Some(name) = name.to_str() else {
            continue;
        };
        if name.starts_with('.') && !pattern.starts_with('.') {
            continue;
        }
        if wildcard_match(pattern, name) {
            matches.push(entry.path());
        }
    }
    matches.sort();
    Ok(matches)
}

/// Match `text` against a pattern with `*` (any run) and `?` (one character).
pub fn wildcard_match(pattern: &str, text: &str) -> bool {
    if pattern == "*" {
        return true;
    }

    let pattern: Vec<char> = pattern.chars().collect();
    let text: Vec<char> = text.chars().collect();
    let (mut p, mut t) = (0, 0);
    // Position of the last `*` and the text index it was tried at
    let mut backtrack: Option<(usize, usize)> = None;

    while t < text.len() {
        if p < pattern.len() && (pattern[p] == '?' || pattern[p] == text[t]) {
            p += 1;
            t += 1;
        } else if p < pattern.len() && pattern[p] == '*' {
            backtrack = Some((p, t));
            p += 1;
        } else if let Some((star, matched)) = backtrack {
            p = star + 1;
            t = matched + 1;
            backtrack = Some((star, t));
        } else {
            return false;
        }
    }

    pattern[p..].iter().all(|c| *c == '*')
}
