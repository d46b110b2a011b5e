//! Design and element data model.
//!
//! A [`Design`] is a fixed-size canvas of positioned [`DesignElement`]s.
//! Designs are value types: the resize engine never mutates a source design,
//! it always emits a new one with a fresh id.

use serde::{Deserialize, Serialize};

use crate::types::{Id, Timestamp};

// ---------------------------------------------------------------------------
// Element type and importance
// ---------------------------------------------------------------------------

/// Kind of content an element carries.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ElementType {
    Text,
    Image,
    Shape,
    Logo,
    Group,
}

/// Ordinal priority governing how aggressively an element may be rescaled.
///
/// Ordering matters: `Low < Medium < High < Critical`. High and critical
/// elements are scaled by the tighter axis so they never shrink more
/// aggressively than necessary; low elements take the looser axis.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ElementImportance {
    Low,
    Medium,
    High,
    Critical,
}

// ---------------------------------------------------------------------------
// Per-element constraints
// ---------------------------------------------------------------------------

/// Per-element layout policy. Every field is optional; absence means
/// "no constraint of this kind".
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ElementConstraints {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub lock_aspect_ratio: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub min_width: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max_width: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub min_height: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max_height: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub margin_left: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub margin_top: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub margin_right: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub margin_bottom: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub keep_relative_position: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub align_to_parent: Option<bool>,
}

impl ElementConstraints {
    /// Whether the element's aspect ratio must be preserved when resizing.
    pub fn aspect_locked(&self) -> bool {
        self.lock_aspect_ratio.unwrap_or(false)
    }

    /// Whether any edge margin is set.
    pub fn has_margins(&self) -> bool {
        self.margin_left.is_some()
            || self.margin_top.is_some()
            || self.margin_right.is_some()
            || self.margin_bottom.is_some()
    }
}

// ---------------------------------------------------------------------------
// DesignElement
// ---------------------------------------------------------------------------

/// A single positioned element on a design canvas.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DesignElement {
    pub id: Id,
    pub element_type: ElementType,
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
    pub importance: ElementImportance,
    #[serde(default)]
    pub constraints: ElementConstraints,

    /// Logical group membership. Grouping is derived by matching values;
    /// there is no owning Group entity.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub group_id: Option<String>,

    pub z_index: i32,
    pub opacity: f64,
    pub rotation: f64,

    /// Point size, text elements only.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub font_size: Option<f64>,
    /// Text content, used to re-estimate height on reflow.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub content: Option<String>,
    /// Fill color (hex string), shapes and text.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub color: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub border_width: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub corner_radius: Option<f64>,
    /// Reference to a backing asset for image/logo elements.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub asset_ref: Option<String>,
}

impl DesignElement {
    /// Create an element with the given type and geometry.
    ///
    /// Defaults: medium importance, no constraints, ungrouped, z-index 0,
    /// fully opaque, no rotation, no type-specific fields.
    pub fn new(element_type: ElementType, x: f64, y: f64, width: f64, height: f64) -> Self {
        Self {
            id: Id::new_v4(),
            element_type,
            x,
            y,
            width,
            height,
            importance: ElementImportance::Medium,
            constraints: ElementConstraints::default(),
            group_id: None,
            z_index: 0,
            opacity: 1.0,
            rotation: 0.0,
            font_size: None,
            content: None,
            color: None,
            border_width: None,
            corner_radius: None,
            asset_ref: None,
        }
    }

    pub fn with_importance(mut self, importance: ElementImportance) -> Self {
        self.importance = importance;
        self
    }

    pub fn with_constraints(mut self, constraints: ElementConstraints) -> Self {
        self.constraints = constraints;
        self
    }

    pub fn with_group(mut self, group_id: impl Into<String>) -> Self {
        self.group_id = Some(group_id.into());
        self
    }

    pub fn with_font_size(mut self, font_size: f64) -> Self {
        self.font_size = Some(font_size);
        self
    }

    pub fn with_content(mut self, content: impl Into<String>) -> Self {
        self.content = Some(content.into());
        self
    }
}

// ---------------------------------------------------------------------------
// Design
// ---------------------------------------------------------------------------

/// A canvas of positioned elements at a fixed pixel size.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Design {
    pub id: Id,
    pub name: String,
    pub width: f64,
    pub height: f64,
    pub elements: Vec<DesignElement>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub background_color: Option<String>,
    /// Free-form caller metadata, carried through resize unchanged.
    pub metadata: serde_json::Value,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

impl Design {
    /// Create an empty design with the given name and canvas size.
    pub fn new(name: impl Into<String>, width: f64, height: f64) -> Self {
        let now = chrono::Utc::now();
        Self {
            id: Id::new_v4(),
            name: name.into(),
            width,
            height,
            elements: Vec::new(),
            background_color: None,
            metadata: serde_json::Value::Object(Default::default()),
            created_at: now,
            updated_at: now,
        }
    }

    pub fn with_elements(mut self, elements: Vec<DesignElement>) -> Self {
        self.elements = elements;
        self
    }

    pub fn with_background(mut self, color: impl Into<String>) -> Self {
        self.background_color = Some(color.into());
        self
    }

    /// Whether the design contains at least one logo element.
    pub fn has_logo(&self) -> bool {
        self.elements
            .iter()
            .any(|e| e.element_type == ElementType::Logo)
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
