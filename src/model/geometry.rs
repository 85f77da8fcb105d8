//! Bounding boxes and provenance entries.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Coordinate origin of a bounding box.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum CoordOrigin {
    /// Origin at bottom-left, y grows upward (PDF user space)
    #[default]
    #[serde(rename = "BOTTOMLEFT")]
    BottomLeft,
    /// Origin at top-left, y grows downward (image space)
    #[serde(rename = "TOPLEFT")]
    TopLeft,
}

impl fmt::Display for CoordOrigin {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CoordOrigin::BottomLeft => f.write_str("BOTTOMLEFT"),
            CoordOrigin::TopLeft => f.write_str("TOPLEFT"),
        }
    }
}

/// Axis-aligned bounding box on a page.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct BoundingBox {
    /// Left edge
    pub l: f64,
    /// Top edge
    pub t: f64,
    /// Right edge
    pub r: f64,
    /// Bottom edge
    pub b: f64,
    /// Coordinate origin the edges are expressed in
    #[serde(default)]
    pub coord_origin: CoordOrigin,
}

impl BoundingBox {
    /// Create a bounding box.
    pub fn new(l: f64, t: f64, r: f64, b: f64, coord_origin: CoordOrigin) -> Self {
        Self {
            l,
            t,
            r,
            b,
            coord_origin,
        }
    }

    /// Create a bounding box in bottom-left (PDF) coordinates.
    pub fn bottom_left(l: f64, t: f64, r: f64, b: f64) -> Self {
        Self::new(l, t, r, b, CoordOrigin::BottomLeft)
    }

    /// Width (right - left).
    pub fn width(&self) -> f64 {
        self.r - self.l
    }

    /// Height, independent of origin.
    pub fn height(&self) -> f64 {
        self.upward_top() - self.upward_bottom()
    }

    /// Horizontal center.
    pub fn center_x(&self) -> f64 {
        (self.l + self.r) / 2.0
    }

    /// Top edge on an upward-growing axis.
    ///
    /// Equal to `t` for bottom-left boxes and `-t` for top-left boxes, so a
    /// larger value is always higher on the page.
    pub fn upward_top(&self) -> f64 {
        match self.coord_origin {
            CoordOrigin::BottomLeft => self.t,
            CoordOrigin::TopLeft => -self.t,
        }
    }

    /// Bottom edge on an upward-growing axis.
    pub fn upward_bottom(&self) -> f64 {
        match self.coord_origin {
            CoordOrigin::BottomLeft => self.b,
            CoordOrigin::TopLeft => -self.b,
        }
    }
}

/// Placement of an element on a page.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProvenanceItem {
    /// Page number (1-indexed)
    pub page_no: u32,

    /// Bounding box on that page
    pub bbox: BoundingBox,

    /// Character span `[start, end]` into the element's text
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub charspan: Option<(usize, usize)>,
}

impl ProvenanceItem {
    /// Create a provenance entry without a character span.
    pub fn new(page_no: u32, bbox: BoundingBox) -> Self {
        Self {
            page_no,
            bbox,
            charspan: None,
        }
    }

    /// Set the character span.
    pub fn with_charspan(mut self, start: usize, end: usize) -> Self {
        self.charspan = Some((start, end));
        self
    }
}
