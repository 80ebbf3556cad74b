use serde::{Deserialize, Serialize};
use std::fmt;

/// Axis-aligned box in PDF points, origin at the top-left of the page.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BBox {
    pub x_min: f32,
    pub y_min: f32,
    pub x_max: f32,
    pub y_max: f32,
}

impl BBox {
    pub fn new(x_min: f32, y_min: f32, x_max: f32, y_max: f32) -> Self {
        BBox {
            x_min,
            y_min,
            x_max,
            y_max,
        }
    }

    pub fn width(&self) -> f32 {
        self.x_max - self.x_min
    }

    /// Grow the box by `amount` on every side.
    pub fn padded(&self, amount: f32) -> BBox {
        BBox {
            x_min: self.x_min - amount,
            y_min: self.y_min - amount,
            x_max: self.x_max + amount,
            y_max: self.y_max + amount,
        }
    }
}

/// Which of the two compared drawings something came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Drawing {
    Source,
    Target,
}

impl fmt::Display for Drawing {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Drawing::Source => write!(f, "Drawing 1"),
            Drawing::Target => write!(f, "Drawing 2"),
        }
    }
}

/// A tag found on a drawing page.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TagOccurrence {
    /// Upper-cased tag text, e.g. "5-AD001".
    pub text: String,
    /// 1-based page number.
    pub page: usize,
    pub bbox: BBox,
}

impl TagOccurrence {
    /// Anchor point used for coordinate comparison (top-left corner).
    pub fn anchor(&self) -> (f32, f32) {
        (self.bbox.x_min, self.bbox.y_min)
    }

    pub fn distance_to(&self, other: &TagOccurrence) -> f32 {
        let (ax, ay) = self.anchor();
        let (bx, by) = other.anchor();
        ((ax - bx).powi(2) + (ay - by).powi(2)).sqrt()
    }
}
