// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Duotone colorizer — maps gray levels onto a cool-shadow / warm-highlight
// gradient and lifts saturation slightly.

use image::{GrayImage, Rgb, RgbImage};
use tracing::instrument;

use crate::filters::{autocontrast, luma, to_luma};

/// Shadow color, `#1f2a44`.
pub const SHADOW: [u8; 3] = [0x1f, 0x2a, 0x44];
/// Midtone color, `#6b9ac4`.
pub const MIDTONE: [u8; 3] = [0x6b, 0x9a, 0xc4];
/// Highlight color, `#f5d7af`.
pub const HIGHLIGHT: [u8; 3] = [0xf5, 0xd7, 0xaf];

/// Gray level that maps exactly to [`MIDTONE`].
const MIDPOINT: usize = 127;
/// Percent clipped from each end of the histogram before colorizing.
pub const CUTOFF_PERCENT: u64 = 5;
/// Saturation factor applied after colorizing.
pub const SATURATION: f32 = 1.15;

/// Three-point gradient lookup table indexed by gray level.
pub fn gradient_lut() -> [[u8; 3]; 256] {
    let mut lut = [HIGHLIGHT; 256];
    let low_span = MIDPOINT as i32;
    let high_span = (255 - MIDPOINT) as i32;

    for (i, entry) in lut.iter_mut().take(MIDPOINT).enumerate() {
        *entry = interpolate(SHADOW, MIDTONE, i as i32, low_span);
    }
    for (i, entry) in lut[MIDPOINT..255].iter_mut().enumerate() {
        *entry = interpolate(MIDTONE, HIGHLIGHT, i as i32, high_span);
    }
    lut
}

/// `from + step * (to - from) / span` per channel, rounding toward
/// negative infinity.
fn interpolate(from: [u8; 3], to: [u8; 3], step: i32, span: i32) -> [u8; 3] {
    let mut out = [0u8; 3];
    for channel in 0..3 {
        let start = i32::from(from[channel]);
        let delta = i32::from(to[channel]) - start;
        out[channel] = (start + (step * delta).div_euclid(span)) as u8;
    }
    out
}

pub fn colorize(gray: &GrayImage) -> RgbImage {
    let lut = gradient_lut();
    let (width, height) = gray.dimensions();
    let mut out = RgbImage::new(width, height);
    for (src, dst) in gray.pixels().zip(out.pixels_mut()) {
        *dst = Rgb(lut[usize::from(src.0[0])]);
    }
    out
}

/// Scale each pixel's distance from its own luma by `factor`.
///
/// 1.0 leaves the image unchanged; 0.0 yields its grayscale rendition.
pub fn enhance_color(image: &RgbImage, factor: f32) -> RgbImage {
    let mut out = image.clone();
    for pixel in out.pixels_mut() {
        let [r, g, b] = pixel.0;
        let gray = f32::from(luma(r, g, b));
        for channel in pixel.0.iter_mut() {
            let value = gray + factor * (f32::from(*channel) - gray);
            *channel = value.clamp(0.0, 255.0) as u8;
        }
    }
    out
}

/// Apply the full duotone effect. Any color in the input is discarded.
#[instrument(skip(image), fields(width = image.width(), height = image.height()))]
pub fn duotone(image: &RgbImage) -> RgbImage {
    let gray = autocontrast(&to_luma(image), CUTOFF_PERCENT);
    enhance_color(&colorize(&gray), SATURATION)
}
