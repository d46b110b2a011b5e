//! Export settings and analytic file-size estimation.
//!
//! The estimate stands in for a real encoder when no exported artifact
//! exists yet: a fixed bytes-per-pixel lookup by format and color mode,
//! scaled by pixel count and a complexity factor derived from element count.

use serde::{Deserialize, Serialize};

use crate::design::Design;

// ---------------------------------------------------------------------------
// Formats
// ---------------------------------------------------------------------------

/// Supported export file formats. `Png8` is 8-bit indexed PNG, a distinct
/// deliverable on ad platforms with tight size caps.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ExportFormat {
    Jpeg,
    Png,
    Png8,
    Gif,
    Svg,
    Html,
}

impl ExportFormat {
    /// Map a file extension (lowercase, no dot) to a format.
    pub fn from_extension(ext: &str) -> Option<Self> {
        match ext {
            "jpg" | "jpeg" => Some(Self::Jpeg),
            "png" => Some(Self::Png),
            "gif" => Some(Self::Gif),
            "svg" => Some(Self::Svg),
            "html" | "htm" => Some(Self::Html),
            _ => None,
        }
    }

    /// Whether file size can be estimated from geometry alone. Vector and
    /// markup formats are size-indeterminate.
    pub fn is_size_estimable(self) -> bool {
        !matches!(self, Self::Svg | Self::Html)
    }
}

/// PNG color mode knob.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PngColorMode {
    Indexed,
    Rgb,
    Rgba,
}

// ---------------------------------------------------------------------------
// ExportSettings
// ---------------------------------------------------------------------------

/// Default JPEG quality for the generic web preset.
pub const DEFAULT_JPEG_QUALITY: u8 = 80;

/// Format-specific export knobs for one job.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExportSettings {
    pub format: ExportFormat,
    /// JPEG quality, 0-100. Ignored for other formats.
    pub jpeg_quality: u8,
    /// Color mode for PNG output. Ignored for other formats.
    pub png_color_mode: PngColorMode,
    pub include_metadata: bool,
}

impl ExportSettings {
    /// Generic web-export default, used when a job has no platform binding.
    pub fn web_default() -> Self {
        Self {
            format: ExportFormat::Png,
            jpeg_quality: DEFAULT_JPEG_QUALITY,
            png_color_mode: PngColorMode::Rgba,
            include_metadata: false,
        }
    }

    /// Minimum-file-size preset: pick the supported format with the lowest
    /// estimated footprint. Falls back to the web default when the list is
    /// empty or only size-indeterminate formats are offered.
    pub fn smallest_for(formats: &[ExportFormat]) -> Self {
        // Ranked by bytes-per-pixel at default settings: JPEG at quality 80
        // (0.05) < indexed PNG / GIF (0.125) < true-color PNG.
        const PREFERENCE: &[ExportFormat] = &[
            ExportFormat::Jpeg,
            ExportFormat::Png8,
            ExportFormat::Gif,
            ExportFormat::Png,
        ];

        for preferred in PREFERENCE {
            if formats.contains(preferred) {
                return Self {
                    format: *preferred,
                    jpeg_quality: DEFAULT_JPEG_QUALITY,
                    png_color_mode: if *preferred == ExportFormat::Png8 {
                        PngColorMode::Indexed
                    } else {
                        PngColorMode::Rgb
                    },
                    include_metadata: false,
                };
            }
        }
        Self::web_default()
    }
}

// ---------------------------------------------------------------------------
// File size estimation
// ---------------------------------------------------------------------------

/// Analytic bytes-per-pixel for a format/mode combination, or `None` when
/// the format is size-indeterminate from geometry alone.
pub fn bytes_per_pixel(settings: &ExportSettings) -> Option<f64> {
    match settings.format {
        ExportFormat::Jpeg => Some(0.25 * (1.0 - f64::from(settings.jpeg_quality) / 100.0)),
        ExportFormat::Png8 | ExportFormat::Gif => Some(0.125),
        ExportFormat::Png => Some(match settings.png_color_mode {
            PngColorMode::Indexed => 0.125,
            PngColorMode::Rgb => 0.375,
            PngColorMode::Rgba => 0.5,
        }),
        ExportFormat::Svg | ExportFormat::Html => None,
    }
}

/// Estimate the exported file size in KB, or `None` for size-indeterminate
/// formats.
///
/// `pixels * bytes_per_pixel * (1 + log10(max(1, elements) / 10))` — the
/// complexity factor penalizes visually busy designs, which compress worse.
pub fn estimate_file_size_kb(design: &Design, settings: &ExportSettings) -> Option<f64> {
    let bpp = bytes_per_pixel(settings)?;
    let pixels = design.width * design.height;
    let element_count = design.elements.len().max(1) as f64;
    let complexity = 1.0 + (element_count / 10.0).log10();
    Some(pixels * bpp * complexity / 1024.0)
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
