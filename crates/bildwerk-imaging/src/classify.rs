// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Color classifier — decides which stylization an image receives.

use bildwerk_core::Transformation;
use tracing::{debug, instrument};

use crate::normalize::NormalizedImage;

/// True when the image carries no chroma.
///
/// Grayscale and bilevel sources are monochrome by layout. Any other source
/// is monochrome only when every pixel has identical R, G and B; a single
/// off-gray pixel makes it color. An image with no pixels is monochrome.
pub fn is_monochrome(image: &NormalizedImage) -> bool {
    if image.source_format.is_colorless() {
        return true;
    }
    image.rgb.pixels().all(|p| {
        let [r, g, b] = p.0;
        r == g && g == b
    })
}

/// Pick the stylization: duotone for monochrome, cartoon for color.
#[instrument(skip_all, fields(source_format = ?image.source_format))]
pub fn classify(image: &NormalizedImage) -> Transformation {
    let transformation = if is_monochrome(image) {
        Transformation::Colorized
    } else {
        Transformation::Cartoonized
    };
    debug!(%transformation, "Image classified");
    transformation
}
