//! Common value types shared by the engine and its collaborators.

use crate::error::EnvError;
use nalgebra::Point2;
use serde::{Deserialize, Serialize};

/// Axis-aligned rectangle: top-left corner plus width and height.
///
/// Used both for normalized detector output ([0, 1] image space) and for
/// screen-space pixels.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Rect {
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
}

impl Rect {
    #[inline]
    pub fn new(x: f64, y: f64, width: f64, height: f64) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }

    /// Build a rect from two opposite corners, in any order.
    pub fn from_corners(a: Point2<f64>, b: Point2<f64>) -> Self {
        let min = a.inf(&b);
        let max = a.sup(&b);
        Self::new(min.x, min.y, max.x - min.x, max.y - min.y)
    }

    #[inline]
    pub fn x_max(&self) -> f64 {
        self.x + self.width
    }

    #[inline]
    pub fn y_max(&self) -> f64 {
        self.y + self.height
    }

    #[inline]
    pub fn center(&self) -> Point2<f64> {
        Point2::new(self.x + self.width / 2.0, self.y + self.height / 2.0)
    }

    #[inline]
    pub fn area(&self) -> f64 {
        self.width * self.height
    }

    /// Half-open containment: min edges inclusive, max edges exclusive.
    pub fn contains(&self, point: &Point2<f64>) -> bool {
        point.x >= self.x && point.x < self.x_max() && point.y >= self.y && point.y < self.y_max()
    }

    /// Scale the rect by `factor` symmetrically about its center.
    pub fn scaled_about_center(&self, factor: f64) -> Self {
        Self::new(
            self.x - self.width * (factor - 1.0) / 2.0,
            self.y - self.height * (factor - 1.0) / 2.0,
            self.width * factor,
            self.height * factor,
        )
    }
}

/// RGBA color, components in [0, 1].
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Color {
    pub r: f32,
    pub g: f32,
    pub b: f32,
    pub a: f32,
}

impl Color {
    pub const RED: Color = Color::rgb(1.0, 0.0, 0.0);
    pub const BLUE: Color = Color::rgb(0.0, 0.0, 1.0);
    pub const GREEN: Color = Color::rgb(0.0, 1.0, 0.0);
    pub const YELLOW: Color = Color::rgb(1.0, 0.92, 0.016);
    pub const MAGENTA: Color = Color::rgb(1.0, 0.0, 1.0);
    pub const CYAN: Color = Color::rgb(0.0, 1.0, 1.0);
    pub const WHITE: Color = Color::rgb(1.0, 1.0, 1.0);
    pub const BLACK: Color = Color::rgb(0.0, 0.0, 0.0);

    /// Default highlight palette; the engine draws with the first entry.
    pub const PALETTE: [Color; 8] = [
        Color::RED,
        Color::BLUE,
        Color::GREEN,
        Color::YELLOW,
        Color::MAGENTA,
        Color::CYAN,
        Color::WHITE,
        Color::BLACK,
    ];

    pub const fn rgb(r: f32, g: f32, b: f32) -> Self {
        Self { r, g, b, a: 1.0 }
    }
}

/// One (label, confidence) classification attached to a detection.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Categorization {
    pub label: String,
    pub confidence: f64,
}

/// A single-frame 2D detection from the semantic detector.
///
/// The detector may report several candidate categories for one region;
/// the fusion engine uses the most confident one that clears its
/// probability threshold.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Detection {
    /// Candidate categories, in detector order
    pub categorizations: Vec<Categorization>,

    /// Region in normalized image coordinates ([0, 1], y down)
    pub rect: Rect,
}

impl Detection {
    /// Detection carrying exactly one category.
    pub fn single(label: impl Into<String>, confidence: f64, rect: Rect) -> Self {
        Self {
            categorizations: vec![Categorization {
                label: label.into(),
                confidence,
            }],
            rect,
        }
    }

    /// The highest-confidence categorization at or above `threshold`.
    ///
    /// Ties keep the earlier categorization. NaN confidences never qualify.
    pub fn best_categorization(&self, threshold: f64) -> Option<&Categorization> {
        self.categorizations
            .iter()
            .filter(|c| c.confidence >= threshold)
            .fold(None, |best: Option<&Categorization>, c| match best {
                Some(b) if b.confidence >= c.confidence => Some(b),
                _ => Some(c),
            })
    }
}

/// Device orientation relative to the upright (portrait) image frame.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum Orientation {
    #[default]
    Portrait,
    PortraitUpsideDown,
    /// Device rotated 90° counter-clockwise
    LandscapeLeft,
    /// Device rotated 90° clockwise
    LandscapeRight,
}

/// Current screen size and orientation.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ScreenGeometry {
    /// Width in pixels
    pub width: f64,
    /// Height in pixels
    pub height: f64,
    pub orientation: Orientation,
}

impl ScreenGeometry {
    /// Validated constructor; sizes must be finite and positive.
    pub fn new(width: f64, height: f64, orientation: Orientation) -> Result<Self, EnvError> {
        if !(width.is_finite() && height.is_finite() && width > 0.0 && height > 0.0) {
            return Err(EnvError::InvalidGeometry(format!("{}x{}", width, height)));
        }
        Ok(Self {
            width,
            height,
            orientation,
        })
    }

    /// Map a normalized detector rect into screen pixels.
    ///
    /// The detector reports regions in the upright image frame; landscape
    /// orientations rotate that frame by a quarter turn onto the screen.
    pub fn to_screen_rect(&self, normalized: &Rect) -> Rect {
        let (w, h) = (self.width, self.height);
        let n = normalized;
        match self.orientation {
            Orientation::Portrait => Rect::new(n.x * w, n.y * h, n.width * w, n.height * h),
            Orientation::PortraitUpsideDown => Rect::new(
                (1.0 - n.x_max()) * w,
                (1.0 - n.y_max()) * h,
                n.width * w,
                n.height * h,
            ),
            Orientation::LandscapeLeft => Rect::new(
                n.y * w,
                (1.0 - n.x_max()) * h,
                n.height * w,
                n.width * h,
            ),
            Orientation::LandscapeRight => Rect::new(
                (1.0 - n.y_max()) * w,
                n.x * h,
                n.height * w,
                n.width * h,
            ),
        }
    }
}
