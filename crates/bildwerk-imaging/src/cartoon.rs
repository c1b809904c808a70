// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Cartoon stylizer — posterized colors kept along the edge lines of the image.
//
// Colors come from a smoothed, palette-reduced copy of the image; outlines
// come from an edge map of the original, normalized, binarized, and inverted
// into the multiply mask.

use image::imageops::invert;
use image::{GrayImage, RgbImage};
use imageproc::contrast::{ThresholdType, threshold};
use tracing::{debug, instrument};

use crate::filters::{autocontrast, find_edges, median3, multiply, smooth_more, to_luma};
use crate::quantize::quantize;

/// Colors kept by the posterization step.
pub const PALETTE_SIZE: usize = 48;
/// Smoothing passes before quantization.
pub const SMOOTH_PASSES: usize = 2;
/// Percent of pixels clipped from each end when normalizing the edge map.
pub const EDGE_CUTOFF_PERCENT: u64 = 10;
/// Binarization level of the normalized, inverted edge map.
pub const EDGE_THRESHOLD: u8 = 110;
/// Percent clipped from each end in the final contrast stretch.
pub const FINAL_CUTOFF_PERCENT: u64 = 2;

/// Smooth then posterize: the flat color layer.
pub fn color_layer(image: &RgbImage) -> RgbImage {
    let mut smoothed = image.clone();
    for _ in 0..SMOOTH_PASSES {
        smoothed = smooth_more(&smoothed);
    }
    quantize(&smoothed, PALETTE_SIZE)
}

/// Binary multiply mask: 255 on detected edges, 0 on flat regions.
///
/// The edge map is inverted, stretched, binarized at [`EDGE_THRESHOLD`] and
/// inverted again, so colors survive only along edge lines.
pub fn edge_mask(image: &RgbImage) -> GrayImage {
    let gray = median3(&to_luma(image));
    let mut edges = find_edges(&gray);
    invert(&mut edges);

    let normalized = autocontrast(&edges, EDGE_CUTOFF_PERCENT);
    let mut mask = threshold(&normalized, EDGE_THRESHOLD, ThresholdType::Binary);
    invert(&mut mask);
    mask
}

/// Apply the full cartoon effect. Output dimensions equal the input's.
#[instrument(skip(image), fields(width = image.width(), height = image.height()))]
pub fn cartoonize(image: &RgbImage) -> RgbImage {
    let colors = color_layer(image);
    let mask = edge_mask(image);

    let kept = mask.pixels().filter(|p| p.0[0] == 255).count();
    debug!(kept, "Edge mask built");

    autocontrast(&multiply(&colors, &mask), FINAL_CUTOFF_PERCENT)
}
