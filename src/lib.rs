// QR Builder Library
// QR generation, compositing onto images, and the HTTP and command-line
// surfaces built on top of them.

pub mod artistic;
pub mod batch;
pub mod cli;
pub mod color;
pub mod compose;
pub mod config;
pub mod constants;
pub mod error;
pub mod logging;
pub mod metrics;
pub mod pipeline;
pub mod render;
pub mod server;
pub mod validate;

pub use error::{QrBuilderError, Result};
pub use pipeline::QrBuilder;
