//! Position calculation for QR placement.
//!
//! This module computes where a square QR should be pasted on a background
//! image for a given anchor and margin.
//!
//! # Anchors
//!
//! - **center**: centered on both axes (margin ignored)
//! - **top-left**, **top-right**, **bottom-left**, **bottom-right**: corner
//!   placement inset by the margin
//!
//! Coordinates are never clamped. A QR larger than the background yields
//! negative coordinates; the compositor drops whatever falls off the canvas.
//!
//! # Example
//!
//! ```
//! use qr_builder::compose::position::{calculate_position, Anchor};
//!
//! let pos = calculate_position(400, 300, 100, Anchor::BottomRight, 10);
//! assert_eq!((pos.x, pos.y), (290, 190));
//! ```

use crate::constants::DEFAULT_MARGIN;
use crate::error::QrBuilderError;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Where the QR sits on the background.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Anchor {
    #[default]
    Center,
    TopLeft,
    TopRight,
    BottomLeft,
    BottomRight,
}

impl Anchor {
    pub const ALL: [Anchor; 5] = [
        Anchor::Center,
        Anchor::TopLeft,
        Anchor::TopRight,
        Anchor::BottomLeft,
        Anchor::BottomRight,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Anchor::Center => "center",
            Anchor::TopLeft => "top-left",
            Anchor::TopRight => "top-right",
            Anchor::BottomLeft => "bottom-left",
            Anchor::BottomRight => "bottom-right",
        }
    }
}

impl fmt::Display for Anchor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Anchor {
    type Err = QrBuilderError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let lowered = s.to_ascii_lowercase();
        Anchor::ALL
            .into_iter()
            .find(|anchor| anchor.as_str() == lowered)
            .ok_or_else(|| {
                QrBuilderError::invalid_input(format!(
                    "Invalid position '{}'. Valid positions: {}.",
                    s,
                    Anchor::ALL.map(|a| a.as_str()).join(", ")
                ))
            })
    }
}

/// Anchor plus edge inset, shared by single and batch embedding.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Placement {
    pub anchor: Anchor,
    pub margin: u32,
}

impl Default for Placement {
    fn default() -> Self {
        Self {
            anchor: Anchor::Center,
            margin: DEFAULT_MARGIN,
        }
    }
}

impl Placement {
    pub fn new(anchor: Anchor, margin: u32) -> Self {
        Self { anchor, margin }
    }

    /// Top-left coordinate of a `qr_size` square on a `width x height` background.
    pub fn resolve(&self, width: u32, height: u32, qr_size: u32) -> PlacementPosition {
        calculate_position(width, height, qr_size, self.anchor, self.margin)
    }
}

/// Top-left corner of a pasted layer. May lie outside the canvas.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PlacementPosition {
    pub x: i32,
    pub y: i32,
}

impl PlacementPosition {
    pub fn new(x: i32, y: i32) -> Self {
        Self { x, y }
    }
}

/// Calculate the top-left coordinate for a QR placement.
///
/// Center placement uses floor division so odd remainders round toward
/// negative infinity, also when the QR is larger than the background.
pub fn calculate_position(
    bg_width: u32,
    bg_height: u32,
    qr_size: u32,
    anchor: Anchor,
    margin: u32,
) -> PlacementPosition {
    let bg_w = bg_width as i64;
    let bg_h = bg_height as i64;
    let qr = qr_size as i64;
    let m = margin as i64;

    let (x, y) = match anchor {
        Anchor::Center => ((bg_w - qr).div_euclid(2), (bg_h - qr).div_euclid(2)),
        Anchor::TopLeft => (m, m),
        Anchor::TopRight => (bg_w - qr - m, m),
        Anchor::BottomLeft => (m, bg_h - qr - m),
        Anchor::BottomRight => (bg_w - qr - m, bg_h - qr - m),
    };

    PlacementPosition::new(saturate(x), saturate(y))
}

fn saturate(value: i64) -> i32 {
    value.clamp(i32::MIN as i64, i32::MAX as i64) as i32
}
