// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Format adapter — maps MIME content types to and from `image::ImageFormat`.

use image::ImageFormat;

/// Content type reported when neither the format nor the caller knows better.
pub const FALLBACK_CONTENT_TYPE: &str = "application/octet-stream";

/// Infer a codec from a declared MIME content type.
///
/// Parameters (`; charset=...`) and case are ignored, and a few legacy
/// aliases are accepted on top of the registered types. Returns `None` for
/// missing, empty, or non-image content types.
pub fn format_from_content_type(content_type: Option<&str>) -> Option<ImageFormat> {
    let essence = content_type?
        .split(';')
        .next()
        .unwrap_or_default()
        .trim()
        .to_ascii_lowercase();

    let canonical = match essence.as_str() {
        "image/jpg" | "image/pjpeg" => "image/jpeg",
        "image/x-png" => "image/png",
        "image/x-bmp" | "image/x-ms-bmp" => "image/bmp",
        "image/qoi" => "image/x-qoi",
        other => other,
    };
    ImageFormat::from_mime_type(canonical)
}

/// Canonical MIME content type for a codec, if it has one.
pub fn content_type_for(format: ImageFormat) -> Option<&'static str> {
    match format.to_mime_type() {
        FALLBACK_CONTENT_TYPE => None,
        mime => Some(mime),
    }
}

/// Pick the output codec: the detected source format, then the declared
/// content type, then JPEG.
pub fn resolve_format(detected: Option<ImageFormat>, declared: Option<&str>) -> ImageFormat {
    detected
        .or_else(|| format_from_content_type(declared))
        .unwrap_or(ImageFormat::Jpeg)
}

/// Content type reported for an encoded output.
pub fn output_content_type(format: ImageFormat, declared: Option<&str>) -> String {
    content_type_for(format)
        .map(str::to_owned)
        .or_else(|| {
            declared
                .map(str::trim)
                .filter(|ct| !ct.is_empty())
                .map(str::to_owned)
        })
        .unwrap_or_else(|| FALLBACK_CONTENT_TYPE.to_owned())
}

/// Serialization family, which decides channel layout and encoder settings.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FormatFamily {
    /// Lossy, no alpha.
    Jpeg,
    /// Lossless, always RGBA.
    Png,
    /// Everything else: RGB with default encoder settings.
    Other(ImageFormat),
}

impl From<ImageFormat> for FormatFamily {
    fn from(format: ImageFormat) -> Self {
        match format {
            ImageFormat::Jpeg => Self::Jpeg,
            ImageFormat::Png => Self::Png,
            other => Self::Other(other),
        }
    }
}
