//! QR rendering, resampling and image codecs.

pub mod encoder;
pub mod qr;
pub mod resize;

pub use encoder::{decode_image, open_image, PngEncoder};
pub use qr::{ModuleMatrix, QrRenderer, QrRequest};
pub use resize::{resize_rgba, resize_square};
