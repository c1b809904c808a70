// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Encoder — serializes the output image, picking channel layout and codec
// settings from the format family.

use std::io::Cursor;

use bildwerk_core::error::{BildwerkError, Result};
use image::codecs::png::{CompressionType, FilterType, PngEncoder};
use image::{DynamicImage, ImageFormat, RgbImage};
use tracing::{debug, instrument};

use crate::format::FormatFamily;

/// Encode `image` as `format`.
///
/// JPEG drops any alpha channel, honours `quality` (clamped to 1..=100) and
/// is written progressive with optimized Huffman tables. PNG always carries
/// alpha, synthesizing an opaque one when needed. Every other format is
/// written as RGB with the codec's default settings.
#[instrument(skip(image), fields(width = image.width(), height = image.height()))]
pub fn encode(image: &DynamicImage, format: ImageFormat, quality: u8) -> Result<Vec<u8>> {
    let mut buffer = Vec::new();

    match FormatFamily::from(format) {
        FormatFamily::Jpeg => encode_jpeg(&image.to_rgb8(), quality, &mut buffer)?,
        FormatFamily::Png => {
            let rgba = image.to_rgba8();
            let encoder = PngEncoder::new_with_quality(
                &mut buffer,
                CompressionType::Best,
                FilterType::Adaptive,
            );
            rgba.write_with_encoder(encoder)
                .map_err(|err| BildwerkError::ImageEncode(format!("PNG encoding failed: {err}")))?;
        }
        FormatFamily::Other(other) => {
            let rgb = DynamicImage::ImageRgb8(image.to_rgb8());
            rgb.write_to(&mut Cursor::new(&mut buffer), other)
                .map_err(|err| {
                    BildwerkError::ImageEncode(format!("{other:?} encoding failed: {err}"))
                })?;
        }
    }

    debug!(?format, encoded_len = buffer.len(), "Image encoded");
    Ok(buffer)
}

fn encode_jpeg(rgb: &RgbImage, quality: u8, buffer: &mut Vec<u8>) -> Result<()> {
    let (width, height) = rgb.dimensions();
    let (Ok(width), Ok(height)) = (u16::try_from(width), u16::try_from(height)) else {
        return Err(BildwerkError::ImageEncode(format!(
            "{width}x{height} exceeds the JPEG dimension limit of {}",
            u16::MAX
        )));
    };

    let mut encoder = jpeg_encoder::Encoder::new(buffer, quality.clamp(1, 100));
    encoder.set_progressive(true);
    encoder.set_optimized_huffman_tables(true);
    encoder
        .encode(rgb.as_raw(), width, height, jpeg_encoder::ColorType::Rgb)
        .map_err(|err| BildwerkError::ImageEncode(format!("JPEG encoding failed: {err}")))
}
