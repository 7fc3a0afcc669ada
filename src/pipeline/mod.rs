// Generation pipeline - the one service both surfaces call into
//
// Flow per request: validate -> render QR -> place -> composite -> encode.
// Every method is synchronous and CPU-bound; async callers run them on the
// blocking pool.

use image::{DynamicImage, RgbaImage};
use std::collections::HashMap;
use std::sync::Arc;

use crate::artistic::{
    AmzqrCommand, ArtisticCodec, ArtisticRequest, BuiltinArtistic, BuiltinHalftone,
    HalftoneCodec, QartRequest, StagedJob,
};
use crate::batch::{self, BatchSource};
use crate::color::Color;
use crate::compose::{self, text::render_text_square, Placement};
use crate::config::{ArtisticConfig, RenderConfig};
use crate::constants::{ARTISTIC_SUFFIX, DEFAULT_EMBED_SCALE, DEFAULT_TEXT_SCALE, EMBED_SUFFIX};
use crate::error::Result;
use crate::render::{decode_image, resize_square, PngEncoder, QrRenderer, QrRequest};
use crate::validate::{checked_size, validate_data, validate_embed_scale, validate_overlay_scale};

/// Parameters for placing a QR on a background image.
#[derive(Debug, Clone, PartialEq)]
pub struct EmbedRequest {
    pub data: String,
    /// Fraction of the background width used as QR edge, in (0, 1]
    pub scale: f64,
    pub placement: Placement,
    pub fill_color: Color,
    pub back_color: Color,
}

impl EmbedRequest {
    pub fn new(data: impl Into<String>) -> Self {
        Self {
            data: data.into(),
            scale: DEFAULT_EMBED_SCALE,
            placement: Placement::default(),
            fill_color: Color::black(),
            back_color: Color::white(),
        }
    }

    pub fn validate(&self) -> Result<()> {
        validate_data(&self.data)?;
        validate_embed_scale(self.scale)
    }

    /// QR edge for a background `bg_width` pixels wide: `floor(bg_width * scale)`.
    pub fn qr_size_for(&self, bg_width: u32) -> Result<u32> {
        checked_size((bg_width as f64 * self.scale).floor() as i64)
    }

    fn qr_request(&self, size: u32) -> QrRequest {
        QrRequest::new(self.data.clone())
            .with_size(size as i64)
            .with_colors(self.fill_color, self.back_color)
    }
}

/// Caption drawn in the middle of a QR.
#[derive(Debug, Clone, PartialEq)]
pub struct TextOverlay {
    pub text: String,
    /// Text area edge as a fraction of the QR edge, in [0.1, 0.4]
    pub text_scale: f32,
    pub font_color: Color,
    /// Fixed font size in pixels; fitted to the area when absent
    pub font_size: Option<f32>,
}

impl TextOverlay {
    pub fn new(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            text_scale: DEFAULT_TEXT_SCALE,
            font_color: Color::black(),
            font_size: None,
        }
    }
}

/// QR generation and compositing service.
///
/// Cheap to clone; codecs are shared behind `Arc`.
#[derive(Clone)]
pub struct QrBuilder {
    renderer: QrRenderer,
    encoder: PngEncoder,
    overlay_padding: u32,
    artistic: Arc<dyn ArtisticCodec>,
    halftone: Arc<dyn HalftoneCodec>,
}

impl std::fmt::Debug for QrBuilder {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("QrBuilder")
            .field("renderer", &self.renderer)
            .field("encoder", &self.encoder)
            .field("overlay_padding", &self.overlay_padding)
            .field("artistic", &self.artistic.name())
            .field("halftone", &self.halftone.name())
            .finish()
    }
}

impl Default for QrBuilder {
    fn default() -> Self {
        Self::new(&RenderConfig::default(), &ArtisticConfig::default())
    }
}

impl QrBuilder {
    pub fn new(render: &RenderConfig, artistic: &ArtisticConfig) -> Self {
        let encoder = PngEncoder::new(render.optimize_png);
        let artistic_codec: Arc<dyn ArtisticCodec> = match &artistic.command {
            Some(program) => Arc::new(AmzqrCommand::new(program.clone())),
            None => Arc::new(BuiltinArtistic { encoder }),
        };

        Self {
            renderer: QrRenderer::new(render.border, render.box_size),
            encoder,
            overlay_padding: render.overlay_padding,
            artistic: artistic_codec,
            halftone: Arc::new(BuiltinHalftone { encoder }),
        }
    }

    /// Swap the artistic codec.
    pub fn with_artistic_codec(mut self, codec: Arc<dyn ArtisticCodec>) -> Self {
        self.artistic = codec;
        self
    }

    /// Swap the halftone codec.
    pub fn with_halftone_codec(mut self, codec: Arc<dyn HalftoneCodec>) -> Self {
        self.halftone = codec;
        self
    }

    /// Name of the configured artistic codec, for diagnostics.
    pub fn artistic_codec_name(&self) -> &'static str {
        self.artistic.name()
    }

    pub fn encode_png(&self, image: &DynamicImage) -> Result<Vec<u8>> {
        self.encoder.encode(image)
    }

    pub fn encoder(&self) -> PngEncoder {
        self.encoder
    }

    // =========================================================================
    // Basic QR
    // =========================================================================

    pub fn render_qr(&self, request: &QrRequest) -> Result<RgbaImage> {
        self.renderer.render(request)
    }

    pub fn qr_png(&self, request: &QrRequest) -> Result<Vec<u8>> {
        let qr = self.render_qr(request)?;
        self.encode_png(&DynamicImage::ImageRgba8(qr))
    }

    // =========================================================================
    // Background embed
    // =========================================================================

    /// Composite a QR onto `background`; output has the background's dimensions.
    pub fn embed(&self, background: &DynamicImage, request: &EmbedRequest) -> Result<DynamicImage> {
        request.validate()?;
        let size = request.qr_size_for(background.width())?;
        let qr = self.render_qr(&request.qr_request(size))?;
        Ok(compose::embed(background, &qr, request.placement))
    }

    pub fn embed_png(&self, background: &[u8], request: &EmbedRequest) -> Result<Vec<u8>> {
        request.validate()?;
        let background = decode_image(background)?;
        let merged = self.embed(&background, request)?;
        self.encode_png(&merged)
    }

    // =========================================================================
    // Center overlays
    // =========================================================================

    /// Render a QR with `logo` resized to `floor(size * logo_scale)` in the center.
    pub fn logo(&self, request: &QrRequest, logo: &DynamicImage, logo_scale: f32) -> Result<RgbaImage> {
        validate_overlay_scale("logo_scale", logo_scale)?;
        let mut qr = self.render_qr(request)?;

        let logo_side = overlay_side(qr.width(), logo_scale);
        let logo = resize_square(&logo.to_rgba8(), logo_side)?;
        compose::overlay_center(&mut qr, &logo, self.overlay_padding, request.back_color);
        Ok(qr)
    }

    pub fn logo_png(&self, request: &QrRequest, logo: &[u8], logo_scale: f32) -> Result<Vec<u8>> {
        validate_overlay_scale("logo_scale", logo_scale)?;
        request.validate()?;
        let logo = decode_image(logo)?;
        let qr = self.logo(request, &logo, logo_scale)?;
        self.encode_png(&DynamicImage::ImageRgba8(qr))
    }

    /// Render a QR with a text caption in the center.
    pub fn text(&self, request: &QrRequest, overlay: &TextOverlay) -> Result<RgbaImage> {
        validate_overlay_scale("text_scale", overlay.text_scale)?;
        let side = overlay_side(request.validate()?, overlay.text_scale);
        let caption = render_text_square(&overlay.text, side, overlay.font_size, overlay.font_color)?;

        let mut qr = self.render_qr(request)?;
        compose::overlay_center(&mut qr, &caption, self.overlay_padding, request.back_color);
        Ok(qr)
    }

    pub fn text_png(&self, request: &QrRequest, overlay: &TextOverlay) -> Result<Vec<u8>> {
        let qr = self.text(request, overlay)?;
        self.encode_png(&DynamicImage::ImageRgba8(qr))
    }

    // =========================================================================
    // Artistic and halftone
    // =========================================================================

    pub fn artistic_png(&self, request: &ArtisticRequest, picture: &[u8]) -> Result<Vec<u8>> {
        request.validate()?;
        // Reject undecodable or oversized uploads before staging
        decode_image(picture)?;

        let job = StagedJob::new(picture)?;
        self.artistic.render(request, job.input(), job.output())?;
        job.read_output()
    }

    pub fn qart_png(&self, request: &QartRequest, picture: &[u8]) -> Result<Vec<u8>> {
        request.validate()?;
        decode_image(picture)?;

        let job = StagedJob::new(picture)?;
        self.halftone.render(request, job.input(), job.output())?;
        job.read_output()
    }

    // =========================================================================
    // Batches
    // =========================================================================

    /// Embed the same QR into every source and return a ZIP of `<stem>_qr.png` entries.
    ///
    /// Sources of equal width share one rendered QR.
    pub fn batch_embed(&self, sources: &[BatchSource], request: &EmbedRequest) -> Result<Vec<u8>> {
        request.validate()?;
        let mut rendered: HashMap<u32, RgbaImage> = HashMap::new();

        batch::package(sources, EMBED_SUFFIX, |_, source| {
            let background = decode_image(&source.bytes)?;
            let size = request.qr_size_for(background.width())?;
            let qr = match rendered.get(&size) {
                Some(qr) => qr.clone(),
                None => {
                    let qr = self.render_qr(&request.qr_request(size))?;
                    rendered.insert(size, qr.clone());
                    qr
                }
            };
            let merged = compose::embed(&background, &qr, request.placement);
            self.encode_png(&merged)
        })
    }

    /// Artistic QR per source, zipped as `<stem>_artistic.png` entries.
    pub fn batch_artistic(&self, sources: &[BatchSource], request: &ArtisticRequest) -> Result<Vec<u8>> {
        request.validate()?;
        batch::package(sources, ARTISTIC_SUFFIX, |_, source| {
            self.artistic_png(request, &source.bytes)
        })
    }
}

fn overlay_side(qr_size: u32, scale: f32) -> u32 {
    ((qr_size as f64 * scale as f64).floor() as u32).max(1)
}
