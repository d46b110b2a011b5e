//! Pure geometry primitives used by the resize engine and the constraint
//! checker: scale-factor computation, axis-aligned bounding boxes, and
//! rectangle containment.

use serde::{Deserialize, Serialize};

use crate::design::DesignElement;
use crate::error::CoreError;

// ---------------------------------------------------------------------------
// Rect
// ---------------------------------------------------------------------------

/// Axis-aligned rectangle in canvas coordinates.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Rect {
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
}

impl Rect {
    pub const ZERO: Rect = Rect {
        x: 0.0,
        y: 0.0,
        width: 0.0,
        height: 0.0,
    };

    pub fn new(x: f64, y: f64, width: f64, height: f64) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }

    pub fn max_x(&self) -> f64 {
        self.x + self.width
    }

    pub fn max_y(&self) -> f64 {
        self.y + self.height
    }

    /// Whether `inner` lies fully inside `self` (edges touching counts as
    /// inside). Used for safe-zone checks.
    pub fn contains(&self, inner: &Rect) -> bool {
        inner.x >= self.x
            && inner.y >= self.y
            && inner.max_x() <= self.max_x()
            && inner.max_y() <= self.max_y()
    }
}

impl DesignElement {
    /// Bounding rectangle of this element.
    pub fn rect(&self) -> Rect {
        Rect::new(self.x, self.y, self.width, self.height)
    }
}

// ---------------------------------------------------------------------------
// Scale factors
// ---------------------------------------------------------------------------

/// Per-axis ratios from a source canvas to a target canvas.
///
/// Source dimensions must be strictly positive; a zero or negative source
/// dimension is a precondition violation, never silently coerced.
pub fn scale_factors(
    source_width: f64,
    source_height: f64,
    target_width: f64,
    target_height: f64,
) -> Result<(f64, f64), CoreError> {
    if source_width <= 0.0 || source_height <= 0.0 {
        return Err(CoreError::Validation(format!(
            "Source dimensions must be greater than 0 (got {source_width}x{source_height})"
        )));
    }
    Ok((target_width / source_width, target_height / source_height))
}

// ---------------------------------------------------------------------------
// Group bounds
// ---------------------------------------------------------------------------

/// Minimal axis-aligned rectangle containing all elements' boxes.
///
/// Returns [`Rect::ZERO`] for an empty slice.
pub fn group_bounds(elements: &[&DesignElement]) -> Rect {
    let Some(first) = elements.first() else {
        return Rect::ZERO;
    };

    let mut min_x = first.x;
    let mut min_y = first.y;
    let mut max_x = first.x + first.width;
    let mut max_y = first.y + first.height;

    for e in &elements[1..] {
        min_x = min_x.min(e.x);
        min_y = min_y.min(e.y);
        max_x = max_x.max(e.x + e.width);
        max_y = max_y.max(e.y + e.height);
    }

    Rect::new(min_x, min_y, max_x - min_x, max_y - min_y)
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
