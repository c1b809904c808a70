// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Alpha recomposer — reattaches the transparency mask to the stylized pixels.

use image::{DynamicImage, GrayImage, RgbImage, Rgba, RgbaImage};
use tracing::debug;

/// Combine stylized RGB with an optional mask.
///
/// Without a mask the RGB image passes through untouched. With one, the
/// result is RGBA with the mask as the fourth channel; the color channels
/// are not modified. The mask must have the same dimensions as `rgb`.
pub fn recompose(rgb: RgbImage, alpha: Option<GrayImage>) -> DynamicImage {
    let Some(alpha) = alpha else {
        return DynamicImage::ImageRgb8(rgb);
    };
    debug_assert_eq!(rgb.dimensions(), alpha.dimensions());
    debug!("Reattaching alpha mask");

    let (width, height) = rgb.dimensions();
    let mut rgba = RgbaImage::new(width, height);
    for ((dst, color), mask) in rgba.pixels_mut().zip(rgb.pixels()).zip(alpha.pixels()) {
        let [r, g, b] = color.0;
        *dst = Rgba([r, g, b, mask.0[0]]);
    }
    DynamicImage::ImageRgba8(rgba)
}
