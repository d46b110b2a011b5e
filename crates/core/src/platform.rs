//! Platform catalog types.
//!
//! A [`Platform`] describes a publishing surface (an ad network, a social
//! feed) as a list of [`PlatformDimension`]s plus platform-wide fallbacks.
//! The catalog is static input data: the core consumes it, never mutates or
//! persists it.

use serde::{Deserialize, Serialize};

use crate::export::ExportFormat;

/// How strongly a platform asks for a given dimension.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RequirementLevel {
    Required,
    Recommended,
    Optional,
}

/// Insets from the canvas edges within which important content must stay
/// visible despite platform cropping or overlays. All values are >= 0.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SafeZoneInsets {
    pub top: f64,
    pub right: f64,
    pub bottom: f64,
    pub left: f64,
}

impl SafeZoneInsets {
    pub fn uniform(inset: f64) -> Self {
        Self {
            top: inset,
            right: inset,
            bottom: inset,
            left: inset,
        }
    }
}

/// A named target size and its constraint bundle for one slot on a platform.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlatformDimension {
    pub name: String,
    pub width: u32,
    pub height: u32,
    pub max_file_size_kb: f64,
    pub formats: Vec<ExportFormat>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub safe_zone: Option<SafeZoneInsets>,
    pub requirement: RequirementLevel,
}

impl PlatformDimension {
    pub fn new(name: impl Into<String>, width: u32, height: u32, max_file_size_kb: f64) -> Self {
        Self {
            name: name.into(),
            width,
            height,
            max_file_size_kb,
            formats: vec![ExportFormat::Jpeg, ExportFormat::Png],
            safe_zone: None,
            requirement: RequirementLevel::Required,
        }
    }

    pub fn with_formats(mut self, formats: Vec<ExportFormat>) -> Self {
        self.formats = formats;
        self
    }

    pub fn with_safe_zone(mut self, insets: SafeZoneInsets) -> Self {
        self.safe_zone = Some(insets);
        self
    }
}

/// A publishing platform and its dimension catalog.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Platform {
    pub name: String,
    pub dimensions: Vec<PlatformDimension>,
    /// Fallback safe zone for dimensions that omit their own.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub default_safe_zone: Option<SafeZoneInsets>,
    /// Fallback size cap for dimensions with a non-positive limit of their own.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub default_max_file_size_kb: Option<f64>,
    /// Whether exports for this platform must contain a logo element.
    pub requires_logo: bool,
}

impl Platform {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            dimensions: Vec::new(),
            default_safe_zone: None,
            default_max_file_size_kb: None,
            requires_logo: false,
        }
    }

    pub fn with_dimensions(mut self, dimensions: Vec<PlatformDimension>) -> Self {
        self.dimensions = dimensions;
        self
    }

    pub fn with_logo_required(mut self) -> Self {
        self.requires_logo = true;
        self
    }

    /// Effective safe zone for a dimension: its own, or the platform fallback.
    pub fn effective_safe_zone(&self, dimension: &PlatformDimension) -> Option<SafeZoneInsets> {
        dimension.safe_zone.or(self.default_safe_zone)
    }

    /// Effective size cap for a dimension: its own when positive, otherwise
    /// the platform fallback.
    pub fn effective_max_file_size_kb(&self, dimension: &PlatformDimension) -> Option<f64> {
        if dimension.max_file_size_kb > 0.0 {
            Some(dimension.max_file_size_kb)
        } else {
            self.default_max_file_size_kb
        }
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
