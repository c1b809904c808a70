// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Filter primitives — luma conversion, fixed-kernel convolution, median,
// histogram autocontrast, and the small per-pixel operators the stylizers
// are built from.
//
// All operators work on 8-bit buffers and are deterministic.

use image::{GrayImage, ImageBuffer, Pixel, RgbImage};

// ---------------------------------------------------------------------------
// Luma
// ---------------------------------------------------------------------------

/// ITU-R 601-2 luma in 16.16 fixed point, rounded to nearest.
#[inline]
pub fn luma(r: u8, g: u8, b: u8) -> u8 {
    let weighted = 19_595 * u32::from(r) + 38_470 * u32::from(g) + 7_471 * u32::from(b);
    ((weighted + 0x8000) >> 16) as u8
}

/// Convert an RGB image to single-channel luma.
pub fn to_luma(image: &RgbImage) -> GrayImage {
    let (width, height) = image.dimensions();
    let mut out = GrayImage::new(width, height);
    for (src, dst) in image.pixels().zip(out.pixels_mut()) {
        let [r, g, b] = src.0;
        dst.0 = [luma(r, g, b)];
    }
    out
}

// ---------------------------------------------------------------------------
// Convolution
// ---------------------------------------------------------------------------

/// A square integer kernel with a divisor.
#[derive(Debug, Clone, Copy)]
pub struct Kernel {
    size: u32,
    weights: &'static [i32],
    scale: i32,
}

impl Kernel {
    pub const fn size(&self) -> u32 {
        self.size
    }
}

/// 5×5 heavy smoothing kernel.
#[rustfmt::skip]
pub const SMOOTH_MORE: Kernel = Kernel {
    size: 5,
    weights: &[
        1, 1,  1, 1, 1,
        1, 5,  5, 5, 1,
        1, 5, 44, 5, 1,
        1, 5,  5, 5, 1,
        1, 1,  1, 1, 1,
    ],
    scale: 100,
};

/// 3×3 Laplacian-style edge detector.
#[rustfmt::skip]
pub const FIND_EDGES: Kernel = Kernel {
    size: 3,
    weights: &[
        -1, -1, -1,
        -1,  8, -1,
        -1, -1, -1,
    ],
    scale: 1,
};

/// Convolve every channel of `image` with `kernel`.
///
/// Pixels closer than half a kernel to the border are copied from the input
/// unchanged. An image smaller than the kernel is returned as a copy.
pub fn convolve<P>(image: &ImageBuffer<P, Vec<u8>>, kernel: &Kernel) -> ImageBuffer<P, Vec<u8>>
where
    P: Pixel<Subpixel = u8>,
{
    let (width, height) = image.dimensions();
    let mut out = image.clone();
    if width < kernel.size || height < kernel.size {
        return out;
    }

    let channels = usize::from(P::CHANNEL_COUNT);
    let half = kernel.size / 2;
    let stride = width as usize * channels;
    let src = image.as_raw();
    let k = kernel.size as usize;
    let dst: &mut [u8] = &mut out;

    for y in half..height - half {
        for x in half..width - half {
            let base_x = (x - half) as usize;
            let base_y = (y - half) as usize;
            for c in 0..channels {
                let mut sum = 0i32;
                for ky in 0..k {
                    let row = (base_y + ky) * stride;
                    for kx in 0..k {
                        let sample = src[row + (base_x + kx) * channels + c];
                        sum += kernel.weights[ky * k + kx] * i32::from(sample);
                    }
                }
                dst[y as usize * stride + x as usize * channels + c] =
                    round_div_clamped(sum, kernel.scale);
            }
        }
    }
    out
}

/// `sum / scale` rounded half-up and clamped to `0..=255`.
#[inline]
fn round_div_clamped(sum: i32, scale: i32) -> u8 {
    if sum <= 0 {
        return 0;
    }
    let value = (2 * sum + scale) / (2 * scale);
    value.min(255) as u8
}

pub fn smooth_more(image: &RgbImage) -> RgbImage {
    convolve(image, &SMOOTH_MORE)
}

pub fn find_edges(image: &GrayImage) -> GrayImage {
    convolve(image, &FIND_EDGES)
}

// ---------------------------------------------------------------------------
// Rank filter
// ---------------------------------------------------------------------------

/// 3×3 median filter.
pub fn median3(image: &GrayImage) -> GrayImage {
    imageproc::filter::median_filter(image, 1, 1)
}

// ---------------------------------------------------------------------------
// Autocontrast
// ---------------------------------------------------------------------------

/// Stretch each channel's histogram to the full range after discarding
/// `cutoff_percent` of the pixels from each end.
///
/// Channels whose remaining histogram spans a single value are left as-is.
pub fn autocontrast<P>(image: &ImageBuffer<P, Vec<u8>>, cutoff_percent: u64) -> ImageBuffer<P, Vec<u8>>
where
    P: Pixel<Subpixel = u8>,
{
    let channels = usize::from(P::CHANNEL_COUNT);
    let mut histograms = vec![[0u64; 256]; channels];
    for pixel in image.as_raw().chunks_exact(channels) {
        for (histogram, &value) in histograms.iter_mut().zip(pixel) {
            histogram[usize::from(value)] += 1;
        }
    }

    let luts: Vec<[u8; 256]> = histograms
        .iter()
        .map(|histogram| autocontrast_lut(histogram, cutoff_percent))
        .collect();

    let mut out = image.clone();
    for pixel in out.chunks_exact_mut(channels) {
        for (value, lut) in pixel.iter_mut().zip(&luts) {
            *value = lut[usize::from(*value)];
        }
    }
    out
}

/// Build the remapping table for one channel histogram.
pub fn autocontrast_lut(histogram: &[u64; 256], cutoff_percent: u64) -> [u8; 256] {
    let mut hist = *histogram;
    let total: u64 = hist.iter().sum();
    let cut = total * cutoff_percent / 100;

    trim(hist.iter_mut(), cut);
    trim(hist.iter_mut().rev(), cut);

    let lo = hist.iter().position(|&count| count > 0).unwrap_or(255);
    let hi = hist.iter().rposition(|&count| count > 0).unwrap_or(0);

    let mut lut = [0u8; 256];
    if hi <= lo {
        for (ix, entry) in lut.iter_mut().enumerate() {
            *entry = ix as u8;
        }
        return lut;
    }

    let scale = 255.0 / (hi - lo) as f64;
    let offset = -(lo as f64) * scale;
    for (ix, entry) in lut.iter_mut().enumerate() {
        let mapped = (ix as f64 * scale + offset).trunc();
        *entry = mapped.clamp(0.0, 255.0) as u8;
    }
    lut
}

/// Remove `cut` samples from the bins in iteration order.
fn trim<'a>(bins: impl Iterator<Item = &'a mut u64>, mut cut: u64) {
    for count in bins {
        if cut == 0 {
            break;
        }
        let removed = cut.min(*count);
        *count -= removed;
        cut -= removed;
    }
}

// ---------------------------------------------------------------------------
// Point operators
// ---------------------------------------------------------------------------

/// Multiply each RGB channel by a single-channel mask: `c * m / 255`.
///
/// Both images must have the same dimensions.
pub fn multiply(image: &RgbImage, mask: &GrayImage) -> RgbImage {
    debug_assert_eq!(image.dimensions(), mask.dimensions());
    let mut out = image.clone();
    for (pixel, m) in out.pixels_mut().zip(mask.pixels()) {
        let m = u32::from(m.0[0]);
        for channel in pixel.0.iter_mut() {
            *channel = (u32::from(*channel) * m / 255) as u8;
        }
    }
    out
}
