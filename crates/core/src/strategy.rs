//! Per-element resize policy.
//!
//! Given the global width/height scale factors of a retarget, each element
//! decides its own geometry based on its type, importance, and constraints.
//! Importance picks the scale factor; element type picks the sizing rule
//! (text reflow, logo minimum size, proportional default); min/max
//! constraints clamp the result; margin constraints override position last.

use crate::design::{DesignElement, ElementImportance, ElementType};
use crate::error::CoreError;

// ---------------------------------------------------------------------------
// Policy constants
// ---------------------------------------------------------------------------

/// Smallest visible logo dimension in canvas units.
pub const LOGO_MIN_SIZE: f64 = 32.0;

/// Hard floor for text legibility.
pub const TEXT_MIN_FONT_SIZE: f64 = 9.0;

/// Reflowed text may occupy at most this fraction of the target width.
pub const TEXT_MAX_WIDTH_FRACTION: f64 = 0.9;

/// Average glyph width as a fraction of font size, used by the line-count
/// heuristic.
pub const TEXT_CHAR_WIDTH_FACTOR: f64 = 0.6;

/// Line height as a multiple of font size.
pub const TEXT_LINE_HEIGHT_FACTOR: f64 = 1.5;

// ---------------------------------------------------------------------------
// Scale context
// ---------------------------------------------------------------------------

/// Global retarget parameters shared by every element of one resize call.
#[derive(Debug, Clone, Copy)]
pub struct ScaleContext {
    pub width_scale: f64,
    pub height_scale: f64,
    pub target_width: f64,
    pub target_height: f64,
}

// ---------------------------------------------------------------------------
// Importance-based scale selection
// ---------------------------------------------------------------------------

/// Pick the scale factor an element uses for its size (and, as a starting
/// point, its position) based on importance.
///
/// - critical / high: `min(width_scale, height_scale)` — never shrink more
///   aggressively than the tighter axis.
/// - medium: arithmetic mean of the two axis scales.
/// - low: `max(width_scale, height_scale)` — lowest priority for fidelity.
///
/// The medium/low formulas are deliberate product tuning; do not unify them
/// with the critical rule.
pub fn importance_scale(importance: ElementImportance, width_scale: f64, height_scale: f64) -> f64 {
    match importance {
        ElementImportance::Critical | ElementImportance::High => width_scale.min(height_scale),
        ElementImportance::Medium => (width_scale + height_scale) / 2.0,
        ElementImportance::Low => width_scale.max(height_scale),
    }
}

// ---------------------------------------------------------------------------
// Element resize
// ---------------------------------------------------------------------------

/// Compute the retargeted geometry for a standalone (ungrouped) element.
///
/// Returns a new element value with fresh identity; the input is never
/// mutated. Fails with a validation error when the element has non-positive
/// dimensions (undefined aspect ratio).
pub fn resize_element(element: &DesignElement, ctx: &ScaleContext) -> Result<DesignElement, CoreError> {
    if element.width <= 0.0 || element.height <= 0.0 {
        return Err(CoreError::Validation(format!(
            "Element {} has non-positive dimensions ({}x{})",
            element.id, element.width, element.height
        )));
    }

    let scale = importance_scale(element.importance, ctx.width_scale, ctx.height_scale);

    // Size must be resolved before position: right/bottom margins depend on
    // the already-computed scaled size.
    let (new_width, new_height, new_font_size) = sized_for_type(element, scale, ctx);
    let (new_width, new_height) = clamp_size(element, new_width, new_height);
    let (new_x, new_y) = positioned(element, ctx, new_width, new_height);

    let mut resized = element.clone();
    resized.id = crate::types::Id::new_v4();
    resized.x = new_x;
    resized.y = new_y;
    resized.width = new_width;
    resized.height = new_height;
    resized.font_size = new_font_size;
    Ok(resized)
}

/// Type-specific sizing. Returns `(width, height, font_size)`.
fn sized_for_type(element: &DesignElement, scale: f64, ctx: &ScaleContext) -> (f64, f64, Option<f64>) {
    match element.element_type {
        ElementType::Text => sized_text(element, scale, ctx),
        ElementType::Logo => sized_logo(element, scale),
        _ => sized_default(element, scale),
    }
}

/// Text either scales uniformly (aspect locked) or reflows: width capped at
/// a fraction of the target, font floored for legibility, and height
/// re-estimated from content length.
fn sized_text(element: &DesignElement, scale: f64, ctx: &ScaleContext) -> (f64, f64, Option<f64>) {
    if element.constraints.aspect_locked() {
        return (
            element.width * scale,
            element.height * scale,
            element.font_size.map(|f| f * scale),
        );
    }

    let new_width = (element.width * scale).min(TEXT_MAX_WIDTH_FRACTION * ctx.target_width);

    match element.font_size {
        Some(font_size) => {
            let new_font = (font_size * scale).max(TEXT_MIN_FONT_SIZE);
            let char_count = element
                .content
                .as_ref()
                .map(|c| c.chars().count())
                .unwrap_or(0);
            let new_height = if char_count == 0 {
                // Nothing to reflow; fall back to proportional height.
                element.height * scale
            } else {
                let chars_per_line = new_width / (new_font * TEXT_CHAR_WIDTH_FACTOR);
                let lines = (char_count as f64 / chars_per_line).ceil();
                lines * new_font * TEXT_LINE_HEIGHT_FACTOR
            };
            (new_width, new_height, Some(new_font))
        }
        None => (new_width, element.height * scale, None),
    }
}

/// Logos always keep a minimum visible size of [`LOGO_MIN_SIZE`].
fn sized_logo(element: &DesignElement, scale: f64) -> (f64, f64, Option<f64>) {
    if element.constraints.aspect_locked() {
        let aspect = element.width / element.height;
        let new_width = (element.width * scale).max(LOGO_MIN_SIZE);
        (new_width, new_width / aspect, element.font_size)
    } else {
        (
            (element.width * scale).max(LOGO_MIN_SIZE),
            (element.height * scale).max(LOGO_MIN_SIZE),
            element.font_size,
        )
    }
}

/// Images, shapes, and anything else scale proportionally.
fn sized_default(element: &DesignElement, scale: f64) -> (f64, f64, Option<f64>) {
    if element.constraints.aspect_locked() {
        let aspect = element.width / element.height;
        let new_width = element.width * scale;
        (new_width, new_width / aspect, element.font_size)
    } else {
        (
            element.width * scale,
            element.height * scale,
            element.font_size,
        )
    }
}

/// Apply min/max size constraints as hard clamps, min before max.
fn clamp_size(element: &DesignElement, mut width: f64, mut height: f64) -> (f64, f64) {
    let c = &element.constraints;
    if let Some(min_w) = c.min_width {
        width = width.max(min_w);
    }
    if let Some(max_w) = c.max_width {
        width = width.min(max_w);
    }
    if let Some(min_h) = c.min_height {
        height = height.max(min_h);
    }
    if let Some(max_h) = c.max_height {
        height = height.min(max_h);
    }
    (width, height)
}

/// Resolve position: axis-proportional scaling by default, overridden
/// outright by margin constraints in fixed order left, top, right, bottom.
fn positioned(
    element: &DesignElement,
    ctx: &ScaleContext,
    new_width: f64,
    new_height: f64,
) -> (f64, f64) {
    let mut x = element.x * ctx.width_scale;
    let mut y = element.y * ctx.height_scale;

    let c = &element.constraints;
    if c.keep_relative_position.unwrap_or(false) || !c.has_margins() {
        return (x, y);
    }

    if let Some(left) = c.margin_left {
        x = left;
    }
    if let Some(top) = c.margin_top {
        y = top;
    }
    if let Some(right) = c.margin_right {
        x = ctx.target_width - new_width - right;
    }
    if let Some(bottom) = c.margin_bottom {
        y = ctx.target_height - new_height - bottom;
    }

    (x, y)
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use crate::design::ElementConstraints;

    fn ctx(ws: f64, hs: f64, tw: f64, th: f64) -> ScaleContext {
        ScaleContext {
            width_scale: ws,
            height_scale: hs,
            target_width: tw,
            target_height: th,
        }
    }

    // -- importance_scale --

    #[test]
    fn critical_and_high_take_the_tighter_axis() {
        assert_eq!(importance_scale(ElementImportance::Critical, 0.5, 2.0), 0.5);
        assert_eq!(importance_scale(ElementImportance::High, 2.0, 0.5), 0.5);
    }

    #[test]
    fn medium_takes_the_mean() {
        assert_eq!(importance_scale(ElementImportance::Medium, 0.5, 1.5), 1.0);
    }

    #[test]
    fn low_takes_the_looser_axis() {
        assert_eq!(importance_scale(ElementImportance::Low, 0.5, 2.0), 2.0);
    }

    // -- resize_element: preconditions --

    #[test]
    fn zero_width_element_rejected() {
        let e = DesignElement::new(ElementType::Shape, 0.0, 0.0, 0.0, 10.0);
        let result = resize_element(&e, &ctx(1.0, 1.0, 100.0, 100.0));
        assert!(result.is_err());
    }

    #[test]
    fn negative_height_element_rejected() {
        let e = DesignElement::new(ElementType::Shape, 0.0, 0.0, 10.0, -5.0);
        assert!(resize_element(&e, &ctx(1.0, 1.0, 100.0, 100.0)).is_err());
    }

    // -- resize_element: identity and importance --

    #[test]
    fn resized_element_gets_fresh_id() {
        let e = DesignElement::new(ElementType::Shape, 10.0, 10.0, 50.0, 50.0);
        let r = resize_element(&e, &ctx(1.0, 1.0, 100.0, 100.0)).unwrap();
        assert_ne!(r.id, e.id);
    }

    #[test]
    fn critical_element_uses_min_scale_for_size() {
        let e = DesignElement::new(ElementType::Shape, 0.0, 0.0, 100.0, 100.0)
            .with_importance(ElementImportance::Critical);
        // width halves, height stays: critical picks 0.5.
        let r = resize_element(&e, &ctx(0.5, 1.0, 500.0, 1000.0)).unwrap();
        assert_eq!(r.width, 50.0);
        assert_eq!(r.height, 50.0);
    }

    #[test]
    fn low_element_uses_max_scale_for_size() {
        let e = DesignElement::new(ElementType::Shape, 0.0, 0.0, 100.0, 100.0)
            .with_importance(ElementImportance::Low);
        let r = resize_element(&e, &ctx(0.5, 1.0, 500.0, 1000.0)).unwrap();
        assert_eq!(r.width, 100.0);
        assert_eq!(r.height, 100.0);
    }

    // -- position scaling and margins --

    #[test]
    fn position_scales_per_axis() {
        let e = DesignElement::new(ElementType::Shape, 100.0, 200.0, 50.0, 50.0);
        let r = resize_element(&e, &ctx(0.5, 2.0, 500.0, 1000.0)).unwrap();
        assert_eq!(r.x, 50.0);
        assert_eq!(r.y, 400.0);
    }

    #[test]
    fn right_margin_overrides_scaled_position() {
        let e = DesignElement::new(ElementType::Shape, 100.0, 0.0, 100.0, 100.0)
            .with_importance(ElementImportance::Critical)
            .with_constraints(ElementConstraints {
                margin_right: Some(20.0),
                ..Default::default()
            });
        // Target 500x500, critical scale = min(0.5, 0.5) = 0.5, width 50.
        let r = resize_element(&e, &ctx(0.5, 0.5, 500.0, 500.0)).unwrap();
        assert_eq!(r.x, 500.0 - 50.0 - 20.0);
    }

    #[test]
    fn bottom_margin_uses_resolved_height() {
        let e = DesignElement::new(ElementType::Logo, 0.0, 0.0, 10.0, 10.0)
            .with_constraints(ElementConstraints {
                margin_bottom: Some(5.0),
                ..Default::default()
            });
        // Logo floors to 32 even at scale 0.1; bottom margin must see 32.
        let r = resize_element(&e, &ctx(0.1, 0.1, 100.0, 100.0)).unwrap();
        assert_eq!(r.height, LOGO_MIN_SIZE);
        assert_eq!(r.y, 100.0 - LOGO_MIN_SIZE - 5.0);
    }

    #[test]
    fn keep_relative_position_wins_over_margins() {
        let e = DesignElement::new(ElementType::Shape, 100.0, 100.0, 50.0, 50.0)
            .with_constraints(ElementConstraints {
                margin_left: Some(5.0),
                keep_relative_position: Some(true),
                ..Default::default()
            });
        let r = resize_element(&e, &ctx(0.5, 0.5, 500.0, 500.0)).unwrap();
        assert_eq!(r.x, 50.0);
    }

    #[test]
    fn left_and_top_margins_pin_origin() {
        let e = DesignElement::new(ElementType::Shape, 300.0, 300.0, 50.0, 50.0)
            .with_constraints(ElementConstraints {
                margin_left: Some(12.0),
                margin_top: Some(8.0),
                ..Default::default()
            });
        let r = resize_element(&e, &ctx(0.5, 0.5, 500.0, 500.0)).unwrap();
        assert_eq!(r.x, 12.0);
        assert_eq!(r.y, 8.0);
    }

    // -- text sizing --

    #[test]
    fn aspect_locked_text_scales_uniformly() {
        let e = DesignElement::new(ElementType::Text, 0.0, 0.0, 200.0, 40.0)
            .with_font_size(20.0)
            .with_constraints(ElementConstraints {
                lock_aspect_ratio: Some(true),
                ..Default::default()
            });
        let r = resize_element(&e, &ctx(0.5, 0.5, 600.0, 400.0)).unwrap();
        assert_eq!(r.width, 100.0);
        assert_eq!(r.height, 20.0);
        assert_eq!(r.font_size, Some(10.0));
    }

    #[test]
    fn reflowed_text_width_capped_at_target_fraction() {
        let e = DesignElement::new(ElementType::Text, 0.0, 0.0, 900.0, 40.0)
            .with_font_size(20.0)
            .with_content("hello")
            .with_importance(ElementImportance::Low);
        // Low importance picks max(2.0, 1.0) = 2.0; 900 * 2 = 1800 but the
        // cap is 0.9 * 1000 = 900.
        let r = resize_element(&e, &ctx(2.0, 1.0, 1000.0, 500.0)).unwrap();
        assert_eq!(r.width, 900.0);
    }

    #[test]
    fn text_font_size_floored() {
        let e = DesignElement::new(ElementType::Text, 0.0, 0.0, 200.0, 40.0)
            .with_font_size(20.0)
            .with_content("some headline copy");
        let r = resize_element(&e, &ctx(0.1, 0.1, 100.0, 100.0)).unwrap();
        assert_eq!(r.font_size, Some(TEXT_MIN_FONT_SIZE));
    }

    #[test]
    fn text_height_estimated_from_content() {
        let e = DesignElement::new(ElementType::Text, 0.0, 0.0, 120.0, 30.0)
            .with_font_size(10.0)
            .with_content("a".repeat(40));
        // Scale 1: width 120, font 10, chars/line = 120 / 6 = 20, so
        // 40 chars need 2 lines; height = 2 * 10 * 1.5 = 30.
        let r = resize_element(&e, &ctx(1.0, 1.0, 1200.0, 800.0)).unwrap();
        assert_eq!(r.height, 30.0);
    }

    #[test]
    fn text_without_font_size_scales_height_proportionally() {
        let e = DesignElement::new(ElementType::Text, 0.0, 0.0, 200.0, 40.0);
        let r = resize_element(&e, &ctx(0.5, 0.5, 600.0, 400.0)).unwrap();
        assert_eq!(r.height, 20.0);
        assert!(r.font_size.is_none());
    }

    // -- logo sizing --

    #[test]
    fn tiny_logo_floors_both_dimensions() {
        let e = DesignElement::new(ElementType::Logo, 0.0, 0.0, 10.0, 10.0);
        let r = resize_element(&e, &ctx(0.1, 0.1, 100.0, 100.0)).unwrap();
        assert!(r.width >= LOGO_MIN_SIZE);
        assert!(r.height >= LOGO_MIN_SIZE);
    }

    #[test]
    fn aspect_locked_logo_derives_height_from_width() {
        let e = DesignElement::new(ElementType::Logo, 0.0, 0.0, 64.0, 32.0)
            .with_constraints(ElementConstraints {
                lock_aspect_ratio: Some(true),
                ..Default::default()
            });
        // Scale 0.1 would give width 6.4, floored to 32; aspect 2:1 gives
        // height 16.
        let r = resize_element(&e, &ctx(0.1, 0.1, 100.0, 100.0)).unwrap();
        assert_eq!(r.width, 32.0);
        assert_eq!(r.height, 16.0);
    }

    // -- min/max clamps --

    #[test]
    fn min_width_clamp_applies() {
        let e = DesignElement::new(ElementType::Shape, 0.0, 0.0, 100.0, 100.0)
            .with_constraints(ElementConstraints {
                min_width: Some(80.0),
                ..Default::default()
            });
        let r = resize_element(&e, &ctx(0.5, 0.5, 500.0, 500.0)).unwrap();
        assert_eq!(r.width, 80.0);
    }

    #[test]
    fn max_height_clamp_applies() {
        let e = DesignElement::new(ElementType::Shape, 0.0, 0.0, 100.0, 100.0)
            .with_constraints(ElementConstraints {
                max_height: Some(150.0),
                ..Default::default()
            });
        let r = resize_element(&e, &ctx(2.0, 2.0, 2000.0, 2000.0)).unwrap();
        assert_eq!(r.height, 150.0);
    }

    #[test]
    fn min_applied_before_max() {
        let e = DesignElement::new(ElementType::Shape, 0.0, 0.0, 10.0, 10.0)
            .with_constraints(ElementConstraints {
                min_width: Some(100.0),
                max_width: Some(60.0),
                ..Default::default()
            });
        let r = resize_element(&e, &ctx(1.0, 1.0, 500.0, 500.0)).unwrap();
        // Min raises 10 to 100, max then caps at 60.
        assert_eq!(r.width, 60.0);
    }
}
