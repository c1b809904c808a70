// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Core domain types for the Bildwerk stylization service.

use serde::{Deserialize, Serialize};

/// Which stylization was applied to an image.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Transformation {
    /// Monochrome input mapped onto the duotone gradient.
    Colorized,
    /// Color input flattened and outlined.
    Cartoonized,
}

impl Transformation {
    /// Label used in notifications and reports.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Colorized => "colorized",
            Self::Cartoonized => "cartoonized",
        }
    }
}

impl std::fmt::Display for Transformation {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Pixel layout of a decoded source image, before any conversion.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum PixelFormat {
    /// One bit per pixel, black or white.
    Bilevel,
    Grayscale,
    GrayscaleAlpha,
    /// Palette-indexed color.
    Indexed,
    Rgb,
    Rgba,
}

impl PixelFormat {
    /// Whether the format has no color channel at all.
    pub fn is_colorless(&self) -> bool {
        matches!(self, Self::Bilevel | Self::Grayscale | Self::GrayscaleAlpha)
    }

    /// Whether normalization must split off a transparency mask.
    pub fn carries_alpha(&self) -> bool {
        matches!(self, Self::GrayscaleAlpha | Self::Rgba | Self::Indexed)
    }
}

/// Location of a stored object.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ObjectRef {
    pub bucket: String,
    pub key: String,
}

impl ObjectRef {
    pub fn new(bucket: impl Into<String>, key: impl Into<String>) -> Self {
        Self {
            bucket: bucket.into(),
            key: key.into(),
        }
    }
}

impl std::fmt::Display for ObjectRef {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}/{}", self.bucket, self.key)
    }
}

/// Batch stage in which an item failed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Stage {
    Setup,
    Parse,
    Fetch,
    Stylize,
    Store,
    Notify,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn transformation_labels() {
        assert_eq!(Transformation::Colorized.to_string(), "colorized");
        assert_eq!(Transformation::Cartoonized.as_str(), "cartoonized");
        assert_eq!(
            serde_json::to_string(&Transformation::Cartoonized).unwrap(),
            "\"cartoonized\""
        );
    }

    #[test]
    fn colorless_formats() {
        assert!(PixelFormat::Bilevel.is_colorless());
        assert!(PixelFormat::Grayscale.is_colorless());
        assert!(PixelFormat::GrayscaleAlpha.is_colorless());
        assert!(!PixelFormat::Indexed.is_colorless());
        assert!(!PixelFormat::Rgb.is_colorless());
        assert!(!PixelFormat::Rgba.is_colorless());
    }

    #[test]
    fn alpha_carrying_formats() {
        assert!(PixelFormat::GrayscaleAlpha.carries_alpha());
        assert!(PixelFormat::Rgba.carries_alpha());
        assert!(PixelFormat::Indexed.carries_alpha());
        assert!(!PixelFormat::Grayscale.carries_alpha());
        assert!(!PixelFormat::Rgb.carries_alpha());
    }

    #[test]
    fn object_ref_display() {
        assert_eq!(ObjectRef::new("uploads", "a/b.jpg").to_string(), "uploads/a/b.jpg");
    }
}
