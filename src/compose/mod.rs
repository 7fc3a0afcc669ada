//! Image compositing: placement math, alpha pasting and text overlays.

pub mod compositor;
pub mod position;
pub mod text;

pub use compositor::{embed, overlay_center, paste};
pub use position::{calculate_position, Anchor, Placement, PlacementPosition};
pub use text::render_text_square;
