// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Pipeline entry point — bytes in, stylized bytes out.

use bildwerk_core::error::Result;
use bildwerk_core::{StylizeConfig, Transformation};
use image::RgbImage;
use tracing::{info, instrument};

use crate::cartoon::cartoonize;
use crate::classify::classify;
use crate::constrain::constrain_size;
use crate::decode::RawImage;
use crate::duotone::duotone;
use crate::encode::encode;
use crate::format::{output_content_type, resolve_format};
use crate::normalize::NormalizedImage;
use crate::recompose::recompose;

/// Stylized pixels before transparency is reattached.
#[derive(Debug, Clone)]
pub struct StylizedImage {
    pub rgb: RgbImage,
    pub transformation: Transformation,
}

impl StylizedImage {
    /// Classify `image` and run the matching stylizer.
    pub fn from_normalized(image: &NormalizedImage) -> Self {
        let transformation = classify(image);
        let rgb = match transformation {
            Transformation::Colorized => duotone(&image.rgb),
            Transformation::Cartoonized => cartoonize(&image.rgb),
        };
        Self {
            rgb,
            transformation,
        }
    }
}

/// Result of a pipeline run.
#[derive(Debug, Clone)]
pub struct Stylized {
    /// Encoded output image.
    pub bytes: Vec<u8>,
    pub content_type: String,
    pub transformation: Transformation,
    pub width: u32,
    pub height: u32,
}

/// Decode, stylize, and re-encode one image.
///
/// The output is encoded in the source's own format when it can be
/// detected, else the format named by `source_content_type`, else JPEG.
/// Nothing is encoded until every transform has succeeded.
#[instrument(skip(data, options), fields(data_len = data.len()))]
pub fn stylize(
    data: &[u8],
    source_content_type: Option<&str>,
    options: &StylizeConfig,
) -> Result<Stylized> {
    let raw = RawImage::decode(data, source_content_type)?;
    let format = resolve_format(raw.format(), source_content_type);

    let normalized = NormalizedImage::from_raw(raw);
    let constrained = constrain_size(normalized, options.max_width, options.max_height);
    let stylized = StylizedImage::from_normalized(&constrained);
    let (width, height) = stylized.rgb.dimensions();

    let output = recompose(stylized.rgb, constrained.alpha);
    let bytes = encode(&output, format, options.quality)?;
    let content_type = output_content_type(format, source_content_type);

    info!(
        transformation = %stylized.transformation,
        width,
        height,
        %content_type,
        output_len = bytes.len(),
        "Image stylized"
    );

    Ok(Stylized {
        bytes,
        content_type,
        transformation: stylized.transformation,
        width,
        height,
    })
}
