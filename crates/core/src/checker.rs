//! Platform constraint checker.
//!
//! Validates a resized design (pre-export) or an exported artifact
//! (post-export) against a platform dimension's rules. Checks are
//! independent: all of them run and their results are concatenated, no
//! short-circuiting. Violations are values, not errors — only the caller
//! decides what blocks a job.

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::design::{Design, ElementImportance};
use crate::error::CoreError;
use crate::export::{estimate_file_size_kb, ExportFormat, ExportSettings, PngColorMode};
use crate::geometry::Rect;
use crate::platform::{Platform, PlatformDimension};

/// Fraction of the size limit at which an early warning is raised.
pub const FILE_SIZE_WARN_FRACTION: f64 = 0.9;

// ---------------------------------------------------------------------------
// Violation types
// ---------------------------------------------------------------------------

/// Error blocks automatic completion; warning is a soft design-quality
/// signal; info is advisory only.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ViolationSeverity {
    Error,
    Warning,
    Info,
}

/// A single constraint violation. Pure value, never persisted by the core.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ConstraintViolation {
    pub message: String,
    pub severity: ViolationSeverity,
    /// Offending property, e.g. `"dimensions"`, `"safe_zone"`, `"png_color_type"`.
    pub property: String,
    pub observed: String,
    pub required: String,
}

impl ConstraintViolation {
    pub fn error(
        property: impl Into<String>,
        message: impl Into<String>,
        observed: impl Into<String>,
        required: impl Into<String>,
    ) -> Self {
        Self {
            message: message.into(),
            severity: ViolationSeverity::Error,
            property: property.into(),
            observed: observed.into(),
            required: required.into(),
        }
    }

    pub fn warning(
        property: impl Into<String>,
        message: impl Into<String>,
        observed: impl Into<String>,
        required: impl Into<String>,
    ) -> Self {
        Self {
            message: message.into(),
            severity: ViolationSeverity::Warning,
            property: property.into(),
            observed: observed.into(),
            required: required.into(),
        }
    }
}

/// Whether any violation in the list has error severity.
pub fn has_errors(violations: &[ConstraintViolation]) -> bool {
    violations
        .iter()
        .any(|v| v.severity == ViolationSeverity::Error)
}

// ---------------------------------------------------------------------------
// Design-level validation (pre-export)
// ---------------------------------------------------------------------------

/// Validate a design against one platform dimension before export.
pub fn validate(
    design: &Design,
    platform: &Platform,
    dimension: &PlatformDimension,
    settings: &ExportSettings,
) -> Vec<ConstraintViolation> {
    let mut violations = Vec::new();
    check_dimensions(design, dimension, &mut violations);
    check_format(dimension, settings, &mut violations);
    check_estimated_file_size(design, platform, dimension, settings, &mut violations);
    check_safe_zone(design, platform, dimension, &mut violations);
    check_logo_presence(design, platform, &mut violations);
    violations
}

/// Exact width/height equality against the dimension.
fn check_dimensions(
    design: &Design,
    dimension: &PlatformDimension,
    out: &mut Vec<ConstraintViolation>,
) {
    if design.width != f64::from(dimension.width) || design.height != f64::from(dimension.height) {
        out.push(ConstraintViolation::error(
            "dimensions",
            format!(
                "Design is {}x{} but '{}' requires {}x{}",
                design.width, design.height, dimension.name, dimension.width, dimension.height
            ),
            format!("{}x{}", design.width, design.height),
            format!("{}x{}", dimension.width, dimension.height),
        ));
    }
}

/// Export format must be supported by the dimension. An indexed-PNG slot
/// accepts PNG output only in indexed color mode.
fn check_format(
    dimension: &PlatformDimension,
    settings: &ExportSettings,
    out: &mut Vec<ConstraintViolation>,
) {
    let supported = dimension.formats.contains(&settings.format)
        || (settings.format == ExportFormat::Png && dimension.formats.contains(&ExportFormat::Png8));

    if !supported {
        out.push(ConstraintViolation::error(
            "format",
            format!("Format {:?} is not supported by '{}'", settings.format, dimension.name),
            format!("{:?}", settings.format),
            format!("{:?}", dimension.formats),
        ));
        return;
    }

    if settings.format == ExportFormat::Png
        && dimension.formats.contains(&ExportFormat::Png8)
        && settings.png_color_mode != PngColorMode::Indexed
    {
        out.push(ConstraintViolation::error(
            "png_color_type",
            format!(
                "'{}' requires 8-bit indexed PNG but export is {:?}",
                dimension.name, settings.png_color_mode
            ),
            format!("{:?}", settings.png_color_mode),
            "Indexed".to_string(),
        ));
    }
}

/// Compare a known or estimated size in KB against the effective limit.
fn check_size_kb(size_kb: f64, limit_kb: f64, out: &mut Vec<ConstraintViolation>) {
    if size_kb > limit_kb {
        out.push(ConstraintViolation::error(
            "file_size",
            format!("File size {size_kb:.1} KB exceeds the {limit_kb:.1} KB limit"),
            format!("{size_kb:.1} KB"),
            format!("<= {limit_kb:.1} KB"),
        ));
    } else if size_kb >= FILE_SIZE_WARN_FRACTION * limit_kb {
        out.push(ConstraintViolation::warning(
            "file_size",
            format!("File size {size_kb:.1} KB is within 10% of the {limit_kb:.1} KB limit"),
            format!("{size_kb:.1} KB"),
            format!("<= {limit_kb:.1} KB"),
        ));
    }
}

fn check_estimated_file_size(
    design: &Design,
    platform: &Platform,
    dimension: &PlatformDimension,
    settings: &ExportSettings,
    out: &mut Vec<ConstraintViolation>,
) {
    let Some(limit_kb) = platform.effective_max_file_size_kb(dimension) else {
        return;
    };
    // Size-indeterminate formats (SVG/HTML) produce no estimate and no
    // violation on this axis.
    if let Some(estimate) = estimate_file_size_kb(design, settings) {
        check_size_kb(estimate, limit_kb, out);
    }
}

/// High/critical elements must lie fully inside the inset safe rectangle.
/// Violations are warnings: a soft design-quality signal, not a platform
/// rejection.
fn check_safe_zone(
    design: &Design,
    platform: &Platform,
    dimension: &PlatformDimension,
    out: &mut Vec<ConstraintViolation>,
) {
    let Some(insets) = platform.effective_safe_zone(dimension) else {
        return;
    };

    let safe = Rect::new(
        insets.left,
        insets.top,
        design.width - insets.left - insets.right,
        design.height - insets.top - insets.bottom,
    );

    for element in &design.elements {
        if element.importance < ElementImportance::High {
            continue;
        }
        if !safe.contains(&element.rect()) {
            out.push(ConstraintViolation::warning(
                "safe_zone",
                format!(
                    "{:?} element at ({}, {}) extends outside the safe zone",
                    element.element_type, element.x, element.y
                ),
                format!("{:?}", element.rect()),
                format!("inside {safe:?}"),
            ));
        }
    }
}

fn check_logo_presence(design: &Design, platform: &Platform, out: &mut Vec<ConstraintViolation>) {
    if platform.requires_logo && !design.has_logo() {
        out.push(ConstraintViolation::error(
            "logo",
            format!("Platform '{}' requires a logo element", platform.name),
            "no logo element".to_string(),
            "at least one logo element".to_string(),
        ));
    }
}

// ---------------------------------------------------------------------------
// File-level validation (post-export)
// ---------------------------------------------------------------------------

/// Validate an exported artifact on disk against a platform dimension.
///
/// Checks actual file size, pixel dimensions (raster formats, header-only
/// decode), and format-by-extension. Producing the artifact is outside the
/// core's scope; validating it is not.
pub fn validate_file(
    path: &Path,
    platform: &Platform,
    dimension: &PlatformDimension,
) -> Result<Vec<ConstraintViolation>, CoreError> {
    let mut violations = Vec::new();

    let metadata = std::fs::metadata(path)
        .map_err(|e| CoreError::Validation(format!("Cannot read exported file {path:?}: {e}")))?;
    if let Some(limit_kb) = platform.effective_max_file_size_kb(dimension) {
        let size_kb = metadata.len() as f64 / 1024.0;
        check_size_kb(size_kb, limit_kb, &mut violations);
    }

    let extension = path
        .extension()
        .and_then(|e| e.to_str())
        .map(|e| e.to_ascii_lowercase());
    let format = extension.as_deref().and_then(ExportFormat::from_extension);

    match format {
        Some(format) => {
            let supported = dimension.formats.contains(&format)
                || (format == ExportFormat::Png && dimension.formats.contains(&ExportFormat::Png8));
            if !supported {
                violations.push(ConstraintViolation::error(
                    "format",
                    format!("Format {format:?} is not supported by '{}'", dimension.name),
                    format!("{format:?}"),
                    format!("{:?}", dimension.formats),
                ));
            }

            if format.is_size_estimable() {
                let (width, height) = image::image_dimensions(path).map_err(|e| {
                    CoreError::Validation(format!("Cannot read image header of {path:?}: {e}"))
                })?;
                if width != dimension.width || height != dimension.height {
                    violations.push(ConstraintViolation::error(
                        "dimensions",
                        format!(
                            "Exported file is {width}x{height} but '{}' requires {}x{}",
                            dimension.name, dimension.width, dimension.height
                        ),
                        format!("{width}x{height}"),
                        format!("{}x{}", dimension.width, dimension.height),
                    ));
                }
            }
        }
        None => {
            violations.push(ConstraintViolation::error(
                "format",
                format!("Unrecognized file extension on {path:?}"),
                extension.unwrap_or_default(),
                format!("{:?}", dimension.formats),
            ));
        }
    }

    Ok(violations)
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
