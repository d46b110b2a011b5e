//! Smart resize engine.
//!
//! Retargets a whole design to new canvas dimensions: ungrouped elements go
//! through the per-element policy in [`crate::strategy`]; grouped elements
//! are transformed rigidly so clustered content (an icon plus its caption,
//! a badge row) keeps its composed relationship.

use std::collections::BTreeMap;

use crate::design::{Design, DesignElement, ElementType};
use crate::error::CoreError;
use crate::geometry::{group_bounds, scale_factors, Rect};
use crate::strategy::{resize_element, ScaleContext};
use crate::types::Id;

/// Retarget `design` to `target_width` x `target_height`.
///
/// Produces a new [`Design`] with a fresh id; the source is never mutated.
/// Target dimensions must be strictly positive, as must the source canvas
/// and every element box. Element order in the output is not guaranteed to
/// match the input.
pub fn resize(design: &Design, target_width: f64, target_height: f64) -> Result<Design, CoreError> {
    if target_width <= 0.0 || target_height <= 0.0 {
        return Err(CoreError::Validation(format!(
            "Target dimensions must be greater than 0 (got {target_width}x{target_height})"
        )));
    }

    let (width_scale, height_scale) =
        scale_factors(design.width, design.height, target_width, target_height)?;
    let ctx = ScaleContext {
        width_scale,
        height_scale,
        target_width,
        target_height,
    };

    // Groups are a derived partition: collect members by shared group_id,
    // computed once per resize call.
    let mut ungrouped: Vec<&DesignElement> = Vec::new();
    let mut groups: BTreeMap<&str, Vec<&DesignElement>> = BTreeMap::new();
    for element in &design.elements {
        match element.group_id.as_deref() {
            Some(gid) => groups.entry(gid).or_default().push(element),
            None => ungrouped.push(element),
        }
    }

    let mut elements = Vec::with_capacity(design.elements.len());
    for element in ungrouped {
        elements.push(resize_element(element, &ctx)?);
    }
    for members in groups.values() {
        resize_group(members, &ctx, &mut elements)?;
    }

    let now = chrono::Utc::now();
    Ok(Design {
        id: Id::new_v4(),
        name: format!("{} ({target_width}x{target_height})", design.name),
        width: target_width,
        height: target_height,
        elements,
        background_color: design.background_color.clone(),
        metadata: design.metadata.clone(),
        created_at: now,
        updated_at: now,
    })
}

/// Transform one group rigidly.
///
/// A single uniform scale (the tighter of the two axis ratios) applies to
/// every member; each member is re-laid-out by its fractional position
/// within the original group bounds so relative layout survives regardless
/// of member types or importance. Text members scale font size by the group
/// scale.
fn resize_group(
    members: &[&DesignElement],
    ctx: &ScaleContext,
    out: &mut Vec<DesignElement>,
) -> Result<(), CoreError> {
    for member in members {
        if member.width <= 0.0 || member.height <= 0.0 {
            return Err(CoreError::Validation(format!(
                "Element {} has non-positive dimensions ({}x{})",
                member.id, member.width, member.height
            )));
        }
    }

    let bounds = group_bounds(members);
    let group_scale = ctx.width_scale.min(ctx.height_scale);
    let new_bounds = Rect::new(
        bounds.x * ctx.width_scale,
        bounds.y * ctx.height_scale,
        bounds.width * group_scale,
        bounds.height * group_scale,
    );

    for member in members {
        let frac_x = (member.x - bounds.x) / bounds.width;
        let frac_y = (member.y - bounds.y) / bounds.height;

        let mut resized = (*member).clone();
        resized.id = Id::new_v4();
        resized.x = new_bounds.x + frac_x * new_bounds.width;
        resized.y = new_bounds.y + frac_y * new_bounds.height;
        resized.width = member.width * group_scale;
        resized.height = member.height * group_scale;
        if member.element_type == ElementType::Text {
            resized.font_size = member.font_size.map(|f| f * group_scale);
        }
        out.push(resized);
    }

    Ok(())
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use crate::design::ElementImportance;

    fn design_with(elements: Vec<DesignElement>) -> Design {
        Design::new("campaign", 1200.0, 800.0).with_elements(elements)
    }

    // -- preconditions and identity --

    #[test]
    fn zero_target_width_rejected() {
        let d = design_with(vec![]);
        assert!(resize(&d, 0.0, 100.0).is_err());
    }

    #[test]
    fn negative_target_height_rejected() {
        let d = design_with(vec![]);
        assert!(resize(&d, 100.0, -1.0).is_err());
    }

    #[test]
    fn zero_source_canvas_rejected() {
        let d = Design::new("broken", 0.0, 800.0);
        assert!(resize(&d, 100.0, 100.0).is_err());
    }

    #[test]
    fn output_has_target_dimensions_and_fresh_id() {
        let d = design_with(vec![DesignElement::new(
            ElementType::Shape,
            0.0,
            0.0,
            100.0,
            100.0,
        )]);
        let out = resize(&d, 600.0, 400.0).unwrap();
        assert_eq!(out.width, 600.0);
        assert_eq!(out.height, 400.0);
        assert_ne!(out.id, d.id);
        assert_eq!(out.elements.len(), 1);
    }

    #[test]
    fn source_design_is_untouched() {
        let d = design_with(vec![DesignElement::new(
            ElementType::Shape,
            10.0,
            10.0,
            100.0,
            100.0,
        )]);
        let before = d.clone();
        let _ = resize(&d, 600.0, 400.0).unwrap();
        assert_eq!(d, before);
    }

    #[test]
    fn broken_element_fails_the_whole_resize() {
        let d = design_with(vec![
            DesignElement::new(ElementType::Shape, 0.0, 0.0, 100.0, 100.0),
            DesignElement::new(ElementType::Shape, 0.0, 0.0, 0.0, 100.0),
        ]);
        assert!(resize(&d, 600.0, 400.0).is_err());
    }

    // -- no-op resize --

    #[test]
    fn resize_to_same_dimensions_keeps_geometry() {
        let d = design_with(vec![DesignElement::new(
            ElementType::Shape,
            30.0,
            40.0,
            100.0,
            60.0,
        )]);
        let out = resize(&d, 1200.0, 800.0).unwrap();
        let e = &out.elements[0];
        assert_eq!(e.x, 30.0);
        assert_eq!(e.y, 40.0);
        assert_eq!(e.width, 100.0);
        assert_eq!(e.height, 60.0);
    }

    // -- importance policy flows through --

    #[test]
    fn critical_element_scales_by_tighter_axis() {
        let d = design_with(vec![DesignElement::new(
            ElementType::Image,
            0.0,
            0.0,
            200.0,
            200.0,
        )
        .with_importance(ElementImportance::Critical)]);
        // 1200x800 -> 600x800: width_scale 0.5, height_scale 1.0.
        let out = resize(&d, 600.0, 800.0).unwrap();
        assert_eq!(out.elements[0].width, 100.0);
        assert_eq!(out.elements[0].height, 100.0);
    }

    // -- group rigidity --

    #[test]
    fn group_members_keep_relative_offsets() {
        let icon = DesignElement::new(ElementType::Image, 100.0, 100.0, 50.0, 50.0)
            .with_group("cluster");
        let caption = DesignElement::new(ElementType::Text, 100.0, 160.0, 120.0, 20.0)
            .with_font_size(12.0)
            .with_group("cluster");
        let d = design_with(vec![icon.clone(), caption.clone()]);

        let out = resize(&d, 600.0, 800.0).unwrap();
        let new_icon = out
            .elements
            .iter()
            .find(|e| e.element_type == ElementType::Image)
            .unwrap();
        let new_caption = out
            .elements
            .iter()
            .find(|e| e.element_type == ElementType::Text)
            .unwrap();

        // 1200x800 -> 600x800 gives a rigid group scale of 0.5; member
        // offsets inside the group must scale by exactly that factor.
        assert!((new_caption.x - new_icon.x).abs() < 1e-9);
        assert!(((new_caption.y - new_icon.y) - 0.5 * (caption.y - icon.y)).abs() < 1e-9);

        // Both members use the same uniform scale (0.5 here).
        assert!((new_icon.width - 25.0).abs() < 1e-9);
        assert!((new_caption.width - 60.0).abs() < 1e-9);
    }

    #[test]
    fn grouped_text_scales_font_by_group_scale() {
        let a = DesignElement::new(ElementType::Text, 0.0, 0.0, 100.0, 20.0)
            .with_font_size(16.0)
            .with_group("g1");
        let b = DesignElement::new(ElementType::Shape, 0.0, 30.0, 100.0, 40.0).with_group("g1");
        let d = design_with(vec![a, b]);

        // 1200x800 -> 600x800: group scale = min(0.5, 1.0) = 0.5.
        let out = resize(&d, 600.0, 800.0).unwrap();
        let text = out
            .elements
            .iter()
            .find(|e| e.element_type == ElementType::Text)
            .unwrap();
        assert_eq!(text.font_size, Some(8.0));
    }

    #[test]
    fn group_importance_is_ignored_inside_groups() {
        // A low-importance member of a group must NOT take the looser axis;
        // groups resize rigidly.
        let a = DesignElement::new(ElementType::Shape, 0.0, 0.0, 100.0, 100.0)
            .with_importance(ElementImportance::Low)
            .with_group("g");
        let b = DesignElement::new(ElementType::Shape, 150.0, 0.0, 100.0, 100.0)
            .with_importance(ElementImportance::Critical)
            .with_group("g");
        let d = design_with(vec![a, b]);

        let out = resize(&d, 600.0, 800.0).unwrap();
        for e in &out.elements {
            assert!((e.width - 50.0).abs() < 1e-9);
        }
    }

    #[test]
    fn mixed_grouped_and_ungrouped_elements_all_present() {
        let d = design_with(vec![
            DesignElement::new(ElementType::Shape, 0.0, 0.0, 50.0, 50.0),
            DesignElement::new(ElementType::Shape, 100.0, 0.0, 50.0, 50.0).with_group("g"),
            DesignElement::new(ElementType::Shape, 200.0, 0.0, 50.0, 50.0).with_group("g"),
        ]);
        let out = resize(&d, 600.0, 400.0).unwrap();
        assert_eq!(out.elements.len(), 3);
    }
}
