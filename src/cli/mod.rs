// Command-line interface definitions

use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;

use crate::artistic::Preset;
use crate::color::Color;
use crate::compose::{Anchor, Placement};
use crate::constants::{
    DEFAULT_ARTISTIC_VERSION, DEFAULT_EMBED_SCALE, DEFAULT_LOGO_SCALE, DEFAULT_MARGIN,
    DEFAULT_POINT_SIZE, DEFAULT_TEXT_SCALE,
};
use crate::pipeline::EmbedRequest;

pub mod commands;

pub use commands::execute;

/// Generate QR codes or embed them into images
#[derive(Parser, Debug)]
#[command(name = "qr-builder")]
#[command(version, about, long_about = None)]
pub struct Cli {
    /// Log level
    #[arg(
        long,
        global = true,
        default_value = "info",
        value_parser = ["debug", "info", "warning", "error"],
        ignore_case = true
    )]
    pub log_level: String,

    /// Optional YAML configuration (render and artistic sections apply)
    #[arg(short, long, global = true, env = "QR_BUILDER_CONFIG")]
    pub config: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Generate a standalone QR code
    Qr(QrArgs),
    /// Embed a QR code into a background image
    Embed(EmbedArgs),
    /// Generate a QR code with a logo in the center
    Logo(LogoArgs),
    /// Generate a QR code with text in the center
    Text(TextArgs),
    /// Generate an artistic QR code where the picture forms the pattern
    Artistic(ArtisticArgs),
    /// Generate a halftone QR code from a picture
    Qart(QartArgs),
    /// Embed the same QR code into every matching image of a directory
    BatchEmbed(BatchEmbedArgs),
}

#[derive(Args, Debug, Clone)]
pub struct ColorArgs {
    /// QR foreground color
    #[arg(long, default_value = "black")]
    pub fill_color: Color,

    /// QR background color
    #[arg(long, default_value = "white")]
    pub back_color: Color,
}

#[derive(Args, Debug, Clone)]
pub struct PlacementArgs {
    /// QR width as a fraction of the background width
    #[arg(long, default_value_t = DEFAULT_EMBED_SCALE)]
    pub scale: f64,

    /// center, top-left, top-right, bottom-left or bottom-right
    #[arg(long, default_value = "center")]
    pub position: Anchor,

    /// Distance from the edges in pixels (ignored for center)
    #[arg(long, default_value_t = DEFAULT_MARGIN)]
    pub margin: u32,

    #[command(flatten)]
    pub colors: ColorArgs,
}

impl PlacementArgs {
    pub fn request(&self, data: &str) -> EmbedRequest {
        EmbedRequest {
            scale: self.scale,
            placement: Placement::new(self.position, self.margin),
            fill_color: self.colors.fill_color,
            back_color: self.colors.back_color,
            ..EmbedRequest::new(data)
        }
    }
}

#[derive(Args, Debug, Clone)]
pub struct QrArgs {
    /// Text or URL to encode
    pub data: String,
    /// Output file (PNG recommended)
    pub output: PathBuf,

    /// Edge length in pixels [default: 500]
    #[arg(long)]
    pub size: Option<i64>,

    #[command(flatten)]
    pub colors: ColorArgs,
}

#[derive(Args, Debug, Clone)]
pub struct EmbedArgs {
    /// Background image
    pub background: PathBuf,
    /// Text or URL to encode
    pub data: String,
    /// Output file (PNG recommended)
    pub output: PathBuf,

    #[command(flatten)]
    pub placement: PlacementArgs,
}

#[derive(Args, Debug, Clone)]
pub struct LogoArgs {
    /// Logo image
    pub logo: PathBuf,
    /// Text or URL to encode
    pub data: String,
    /// Output file (PNG recommended)
    pub output: PathBuf,

    /// Edge length in pixels [default: 500]
    #[arg(long)]
    pub size: Option<i64>,

    /// Logo edge as a fraction of the QR (0.1-0.4)
    #[arg(long, default_value_t = DEFAULT_LOGO_SCALE)]
    pub logo_scale: f32,

    #[command(flatten)]
    pub colors: ColorArgs,
}

#[derive(Args, Debug, Clone)]
pub struct TextArgs {
    /// Words to display in the center
    pub text: String,
    /// Text or URL to encode
    pub data: String,
    /// Output file (PNG recommended)
    pub output: PathBuf,

    /// Edge length in pixels [default: 500]
    #[arg(long)]
    pub size: Option<i64>,

    /// Text area edge as a fraction of the QR (0.1-0.4)
    #[arg(long, default_value_t = DEFAULT_TEXT_SCALE)]
    pub text_scale: f32,

    /// Text color
    #[arg(long, default_value = "black")]
    pub font_color: Color,

    /// Font size in pixels (fitted to the area when omitted)
    #[arg(long)]
    pub font_size: Option<f32>,

    #[command(flatten)]
    pub colors: ColorArgs,
}

#[derive(Args, Debug, Clone)]
pub struct ArtisticArgs {
    /// Picture that becomes the QR code
    pub image: PathBuf,
    /// Text or URL to encode
    pub data: String,
    /// Output file (PNG recommended)
    pub output: PathBuf,

    /// Black and white instead of colorized
    #[arg(long)]
    pub bw: bool,

    #[arg(long, default_value_t = 1.0)]
    pub contrast: f32,

    #[arg(long, default_value_t = 1.0)]
    pub brightness: f32,

    /// QR version 1-40
    #[arg(long = "version", default_value_t = DEFAULT_ARTISTIC_VERSION as i64)]
    pub symbol_version: i64,

    /// small, medium, large or hd; overrides version, contrast and brightness
    #[arg(long)]
    pub preset: Option<Preset>,
}

#[derive(Args, Debug, Clone)]
pub struct QartArgs {
    /// Picture rendered as halftone
    pub image: PathBuf,
    /// Text or URL to encode
    pub data: String,
    /// Output file (PNG recommended)
    pub output: PathBuf,

    /// QR version 1-40
    #[arg(long = "version", default_value_t = DEFAULT_ARTISTIC_VERSION as i64)]
    pub symbol_version: i64,

    /// Pixels per halftone dot (1-64)
    #[arg(long, default_value_t = DEFAULT_POINT_SIZE as i64)]
    pub point_size: i64,

    /// Threshold instead of dithering
    #[arg(long)]
    pub no_dither: bool,

    /// Keep the picture out of the quiet zone
    #[arg(long)]
    pub fast: bool,

    /// Ink color as R,G,B
    #[arg(long, value_parser = parse_rgb)]
    pub color: Option<Color>,
}

#[derive(Args, Debug, Clone)]
pub struct BatchEmbedArgs {
    /// Directory holding background images
    pub input_dir: PathBuf,
    /// Text or URL to encode
    pub data: String,
    /// Directory for the results (created when missing)
    pub output_dir: PathBuf,

    /// File name pattern for inputs (`*` and `?` wildcards)
    #[arg(long, default_value = "*.png")]
    pub glob: String,

    #[command(flatten)]
    pub placement: PlacementArgs,
}

/// Parse `R,G,B` with each channel in 0-255.
pub fn parse_rgb(value: &str) -> Result<Color, String> {
    let channels: Vec<&str> = value.split(',').map(str::trim).collect();
    let [r, g, b] = channels.as_slice() else {
        return Err(format!("expected R,G,B, got '{}'", value));
    };
    let channel = |c: &str| {
        c.parse::<i64>()
            .map_err(|_| format!("invalid color channel '{}'", c))
    };
    Color::from_components(channel(*r)?, channel(*g)?, channel(*b)?).map_err(|e| e.to_string())
}
