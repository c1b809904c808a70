// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Size constrainer — bounds the longest edge, never upscales.

use image::imageops::{self, FilterType};
use tracing::{debug, info, instrument};

use crate::normalize::NormalizedImage;

/// Resampling filter for both the color image and its mask.
const RESAMPLE_FILTER: FilterType = FilterType::Lanczos3;

/// Compute the dimensions an image of `size` takes when fitted inside
/// `max`, preserving aspect ratio.
///
/// Images already within bounds keep their size. Otherwise the limiting
/// edge equals its maximum and the other edge is whichever of floor/ceil
/// best preserves the aspect ratio (floor on ties), never below 1.
pub fn target_dimensions(size: (u32, u32), max: (u32, u32)) -> (u32, u32) {
    let (width, height) = size;
    let (max_width, max_height) = max;

    if width <= max_width && height <= max_height {
        return size;
    }
    if width == 0 || height == 0 || max_width == 0 || max_height == 0 {
        return size;
    }

    let aspect = f64::from(width) / f64::from(height);
    let (bound_w, bound_h) = (f64::from(max_width), f64::from(max_height));

    if bound_w / bound_h >= aspect {
        let new_width = round_aspect(bound_h * aspect, |n| (aspect - n / bound_h).abs());
        (new_width, max_height)
    } else {
        let new_height = round_aspect(bound_w / aspect, |n| {
            if n == 0.0 { 0.0 } else { (aspect - bound_w / n).abs() }
        });
        (max_width, new_height)
    }
}

fn round_aspect(value: f64, error: impl Fn(f64) -> f64) -> u32 {
    let (floor, ceil) = (value.floor(), value.ceil());
    let best = if error(ceil) < error(floor) { ceil } else { floor };
    (best as u32).max(1)
}

/// Downscale `image` (and its mask) to fit within `max_width` x `max_height`.
#[instrument(skip(image), fields(width = image.width(), height = image.height()))]
pub fn constrain_size(image: NormalizedImage, max_width: u32, max_height: u32) -> NormalizedImage {
    let (width, height) = image.dimensions();
    let (new_width, new_height) = target_dimensions((width, height), (max_width, max_height));

    let NormalizedImage {
        mut rgb,
        mut alpha,
        source_format,
    } = image;

    if (new_width, new_height) != (width, height) {
        info!(
            from_w = width,
            from_h = height,
            new_width,
            new_height,
            "Resizing image"
        );
        rgb = imageops::resize(&rgb, new_width, new_height, RESAMPLE_FILTER);
    }

    if let Some(mask) = alpha.take() {
        alpha = Some(if mask.dimensions() == rgb.dimensions() {
            mask
        } else {
            debug!("Resizing alpha mask to match");
            imageops::resize(&mask, rgb.width(), rgb.height(), RESAMPLE_FILTER)
        });
    }

    NormalizedImage {
        rgb,
        alpha,
        source_format,
    }
}
