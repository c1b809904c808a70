// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Orientation & channel normalization — every source layout becomes an RGB
// bitmap plus an optional alpha mask.

use bildwerk_core::PixelFormat;
use image::{GrayImage, RgbImage};
use tracing::{debug, instrument};

use crate::decode::RawImage;

/// A 3-channel working image and its transparency mask, if any.
///
/// When `alpha` is present its dimensions equal those of `rgb`.
#[derive(Debug, Clone)]
pub struct NormalizedImage {
    pub rgb: RgbImage,
    pub alpha: Option<GrayImage>,
    /// Layout of the decoded source, before conversion to RGB.
    pub source_format: PixelFormat,
}

impl NormalizedImage {
    /// Apply orientation, then split the raw image into RGB + alpha.
    ///
    /// Grayscale+alpha, RGBA, and palette sources are expanded to RGBA and
    /// their fourth channel becomes the mask. Palette images without
    /// transparency get a fully opaque mask.
    #[instrument(skip_all, fields(width = raw.width(), height = raw.height()))]
    pub fn from_raw(raw: RawImage) -> Self {
        let (image, source_format) = raw.apply_orientation().into_parts();

        if !source_format.carries_alpha() {
            debug!(?source_format, "Normalized without alpha");
            return Self {
                rgb: image.to_rgb8(),
                alpha: None,
                source_format,
            };
        }

        let rgba = image.to_rgba8();
        let (width, height) = rgba.dimensions();
        let mut rgb = RgbImage::new(width, height);
        let mut alpha = GrayImage::new(width, height);

        for ((src, color), mask) in rgba
            .pixels()
            .zip(rgb.pixels_mut())
            .zip(alpha.pixels_mut())
        {
            let [r, g, b, a] = src.0;
            color.0 = [r, g, b];
            mask.0 = [a];
        }

        debug!(?source_format, "Normalized with alpha mask");
        Self {
            rgb,
            alpha: Some(alpha),
            source_format,
        }
    }

    pub fn width(&self) -> u32 {
        self.rgb.width()
    }

    pub fn height(&self) -> u32 {
        self.rgb.height()
    }

    pub fn dimensions(&self) -> (u32, u32) {
        self.rgb.dimensions()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::metadata::Orientation;
    use image::{DynamicImage, GrayAlphaImage, Luma, LumaA, Rgb, Rgba, RgbaImage};

    #[test]
    fn rgb_source_has_no_mask() {
        let raw = RawImage::from_dynamic(DynamicImage::ImageRgb8(RgbImage::from_pixel(
            3,
            2,
            Rgb([1, 2, 3]),
        )));
        let normalized = NormalizedImage::from_raw(raw);

        assert!(normalized.alpha.is_none());
        assert_eq!(normalized.dimensions(), (3, 2));
        assert_eq!(normalized.rgb.get_pixel(0, 0).0, [1, 2, 3]);
        assert_eq!(normalized.source_format, PixelFormat::Rgb);
    }

    #[test]
    fn rgba_source_splits_mask() {
        let mut rgba = RgbaImage::from_pixel(2, 2, Rgba([200, 100, 50, 255]));
        rgba.put_pixel(1, 1, Rgba([9, 8, 7, 0]));
        let normalized =
            NormalizedImage::from_raw(RawImage::from_dynamic(DynamicImage::ImageRgba8(rgba)));

        let alpha = normalized.alpha.as_ref().expect("mask");
        assert_eq!(alpha.dimensions(), normalized.dimensions());
        assert_eq!(alpha.get_pixel(0, 0).0, [255]);
        assert_eq!(alpha.get_pixel(1, 1).0, [0]);
        // Color under a transparent pixel is kept as-is, not premultiplied.
        assert_eq!(normalized.rgb.get_pixel(1, 1).0, [9, 8, 7]);
    }

    #[test]
    fn grayscale_alpha_expands_to_rgb() {
        let la = GrayAlphaImage::from_pixel(1, 1, LumaA([60, 128]));
        let normalized =
            NormalizedImage::from_raw(RawImage::from_dynamic(DynamicImage::ImageLumaA8(la)));

        assert_eq!(normalized.rgb.get_pixel(0, 0).0, [60, 60, 60]);
        assert_eq!(normalized.alpha.unwrap().get_pixel(0, 0).0, [128]);
        assert_eq!(normalized.source_format, PixelFormat::GrayscaleAlpha);
    }

    #[test]
    fn grayscale_replicates_channels() {
        let gray = GrayImage::from_pixel(2, 1, Luma([42]));
        let normalized =
            NormalizedImage::from_raw(RawImage::from_dynamic(DynamicImage::ImageLuma8(gray)));
        assert!(normalized.alpha.is_none());
        assert_eq!(normalized.rgb.get_pixel(1, 0).0, [42, 42, 42]);
    }

    #[test]
    fn orientation_is_applied_before_split() {
        let mut rgba = RgbaImage::from_pixel(4, 2, Rgba([0, 0, 0, 255]));
        rgba.put_pixel(0, 0, Rgba([255, 0, 0, 10]));
        let raw = RawImage::from_dynamic(DynamicImage::ImageRgba8(rgba))
            .with_orientation(Orientation::Rotate90);

        let normalized = NormalizedImage::from_raw(raw);
        assert_eq!(normalized.dimensions(), (2, 4));
        let alpha = normalized.alpha.unwrap();
        assert_eq!(alpha.dimensions(), (2, 4));
        // Rotating 90° clockwise moves the top-left pixel to the top-right.
        assert_eq!(normalized.rgb.get_pixel(1, 0).0, [255, 0, 0]);
        assert_eq!(alpha.get_pixel(1, 0).0, [10]);
    }
}
