// Route handlers
//
// Each generation handler reads its form, builds a validated request, runs
// the pipeline on the blocking pool and streams back PNG or ZIP bytes.

use axum::extract::State;
use axum::http::header::{CONTENT_DISPOSITION, CONTENT_TYPE};
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde_json::{json, Value};

use super::error::ApiError;
use super::form::FormData;
use super::AppState;
use crate::artistic::{ArtisticRequest, Preset, QartRequest, StyleCatalog};
use crate::color::Color;
use crate::compose::{Anchor, Placement};
use crate::constants::{
    DEFAULT_ARTISTIC_VERSION, DEFAULT_EMBED_SCALE, DEFAULT_LOGO_SCALE, DEFAULT_MARGIN,
    DEFAULT_POINT_SIZE, DEFAULT_TEXT_SCALE,
};
use crate::error::{QrBuilderError, Result};
use crate::pipeline::{EmbedRequest, TextOverlay};
use crate::render::QrRequest;

type HandlerResult = std::result::Result<Response, ApiError>;

const BATCH_EMBED_ARCHIVE: &str = "attachment; filename=batch_qr.zip";
const BATCH_ARTISTIC_ARCHIVE: &str = "attachment; filename=batch_artistic_qr.zip";

fn png_response(png: Vec<u8>) -> Response {
    ([(CONTENT_TYPE, "image/png")], png).into_response()
}

fn zip_response(archive: Vec<u8>, disposition: &'static str) -> Response {
    (
        [
            (CONTENT_TYPE, "application/zip"),
            (CONTENT_DISPOSITION, disposition),
        ],
        archive,
    )
        .into_response()
}

// ============================================================================
// Form -> request mapping
// ============================================================================

fn qr_request(form: &FormData, default_size: i64) -> Result<QrRequest> {
    let request = QrRequest::new(form.required_text("data")?)
        .with_size(form.parse_or("size", default_size)?)
        .with_colors(
            form.color_or("fill_color", Color::black())?,
            form.color_or("back_color", Color::white())?,
        );
    request.validate()?;
    Ok(request)
}

fn embed_request(form: &FormData) -> Result<EmbedRequest> {
    let anchor = form
        .text("position")?
        .map(|value| value.trim().parse::<Anchor>())
        .transpose()?
        .unwrap_or_default();
    let request = EmbedRequest {
        scale: form.parse_or("scale", DEFAULT_EMBED_SCALE)?,
        placement: Placement::new(anchor, form.parse_or("margin", DEFAULT_MARGIN)?),
        fill_color: form.color_or("fill_color", Color::black())?,
        back_color: form.color_or("back_color", Color::white())?,
        ..EmbedRequest::new(form.required_text("data")?)
    };
    request.validate()?;
    Ok(request)
}

fn parse_preset(form: &FormData) -> Result<Option<Preset>> {
    form.text("preset")?
        .map(|value| value.trim().parse::<Preset>())
        .transpose()
}

// ============================================================================
// Informational routes
// ============================================================================

pub async fn health() -> Json<Value> {
    Json(json!({ "status": "ok" }))
}

pub async fn styles() -> Json<StyleCatalog> {
    Json(StyleCatalog::builtin())
}

pub async fn metrics(State(state): State<AppState>) -> HandlerResult {
    let body = state
        .metrics
        .export()
        .map_err(|e| QrBuilderError::internal(format!("Failed to export metrics: {}", e)))?;
    Ok(([(CONTENT_TYPE, "text/plain; version=0.0.4")], body).into_response())
}

// ============================================================================
// Generation routes
// ============================================================================

/// POST /qr
pub async fn create_qr(State(state): State<AppState>, form: FormData) -> HandlerResult {
    let request = qr_request(&form, state.default_size)?;
    let png = state
        .run("qr", move |builder| builder.qr_png(&request))
        .await?;
    Ok(png_response(png))
}

/// POST /qr/logo
pub async fn create_qr_with_logo(State(state): State<AppState>, form: FormData) -> HandlerResult {
    let logo = form.file("logo")?.bytes.clone();
    let request = qr_request(&form, state.default_size)?;
    let logo_scale = form.parse_or("logo_scale", DEFAULT_LOGO_SCALE)?;

    let png = state
        .run("logo", move |builder| builder.logo_png(&request, &logo, logo_scale))
        .await?;
    Ok(png_response(png))
}

/// POST /qr/text
pub async fn create_qr_with_text(State(state): State<AppState>, form: FormData) -> HandlerResult {
    let request = qr_request(&form, state.default_size)?;
    let overlay = TextOverlay {
        text_scale: form.parse_or("text_scale", DEFAULT_TEXT_SCALE)?,
        font_color: form.color_or("font_color", Color::black())?,
        font_size: form.parse_opt("font_size")?,
        ..TextOverlay::new(form.required_text("text")?)
    };

    let png = state
        .run("text", move |builder| builder.text_png(&request, &overlay))
        .await?;
    Ok(png_response(png))
}

/// POST /qr/artistic
pub async fn create_artistic_qr(State(state): State<AppState>, form: FormData) -> HandlerResult {
    let picture = form.file("image")?.bytes.clone();
    let request = ArtisticRequest::from_parts(
        form.required_text("data")?,
        parse_preset(&form)?,
        form.parse_or("version", DEFAULT_ARTISTIC_VERSION as i64)?,
        form.parse_or("contrast", 1.0)?,
        form.parse_or("brightness", 1.0)?,
        form.bool_or("colorized", true)?,
    )?;

    let png = state
        .run("artistic", move |builder| builder.artistic_png(&request, &picture))
        .await?;
    Ok(png_response(png))
}

/// POST /qr/qart
pub async fn create_qart(State(state): State<AppState>, form: FormData) -> HandlerResult {
    let picture = form.file("image")?.bytes.clone();
    let color = Color::from_components(
        form.parse_or("color_r", 0)?,
        form.parse_or("color_g", 0)?,
        form.parse_or("color_b", 0)?,
    )?;
    let request = QartRequest::from_parts(
        form.required_text("data")?,
        form.parse_or("version", DEFAULT_ARTISTIC_VERSION as i64)?,
        form.parse_or("point_size", DEFAULT_POINT_SIZE as i64)?,
        form.bool_or("dither", true)?,
        form.bool_or("fast", false)?,
        color,
    )?;

    let png = state
        .run("qart", move |builder| builder.qart_png(&request, &picture))
        .await?;
    Ok(png_response(png))
}

/// POST /embed
pub async fn embed_qr(State(state): State<AppState>, form: FormData) -> HandlerResult {
    let background = form.file("background")?.bytes.clone();
    let request = embed_request(&form)?;

    let png = state
        .run("embed", move |builder| builder.embed_png(&background, &request))
        .await?;
    Ok(png_response(png))
}

/// POST /batch/embed
pub async fn batch_embed(State(state): State<AppState>, form: FormData) -> HandlerResult {
    let sources = form.files("backgrounds")?;
    let request = embed_request(&form)?;
    tracing::info!(count = sources.len(), "Batch embed");

    let archive = state
        .run("batch_embed", move |builder| builder.batch_embed(&sources, &request))
        .await?;
    Ok(zip_response(archive, BATCH_EMBED_ARCHIVE))
}

/// POST /batch/artistic
pub async fn batch_artistic(State(state): State<AppState>, form: FormData) -> HandlerResult {
    let sources = form.files("images")?;
    let preset = parse_preset(&form)?.unwrap_or(Preset::Large);
    let request = ArtisticRequest::new(form.required_text("data")?).with_preset(preset);
    request.validate()?;
    tracing::info!(count = sources.len(), preset = %preset, "Batch artistic");

    let archive = state
        .run("batch_artistic", move |builder| builder.batch_artistic(&sources, &request))
        .await?;
    Ok(zip_response(archive, BATCH_ARTISTIC_ARCHIVE))
}
