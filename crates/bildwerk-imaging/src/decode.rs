// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Decoding — turns encoded bytes into a `RawImage` tagged with its source
// pixel format, detected codec, and embedded orientation.

use std::io::Cursor;

use bildwerk_core::PixelFormat;
use bildwerk_core::error::{BildwerkError, Result};
use image::metadata::Orientation;
use image::{ColorType, DynamicImage, ExtendedColorType, ImageDecoder, ImageFormat, ImageReader};
use tracing::{debug, instrument};

use crate::format::format_from_content_type;

/// A freshly decoded image, before any normalization.
///
/// The bitmap is only changed through methods that consume `self`.
#[derive(Debug, Clone)]
pub struct RawImage {
    image: DynamicImage,
    pixel_format: PixelFormat,
    format: Option<ImageFormat>,
    content_type: Option<String>,
    orientation: Orientation,
}

impl RawImage {
    // -- Construction ---------------------------------------------------------

    /// Decode an encoded image.
    ///
    /// The codec is sniffed from the leading bytes. When sniffing fails the
    /// declared content type is used as a hint instead.
    #[instrument(skip(data), fields(data_len = data.len()))]
    pub fn decode(data: &[u8], content_type: Option<&str>) -> Result<Self> {
        let mut reader = ImageReader::new(Cursor::new(data))
            .with_guessed_format()
            .map_err(|err| BildwerkError::ImageDecode(format!("failed to read image: {err}")))?;

        if reader.format().is_none() {
            if let Some(hint) = format_from_content_type(content_type) {
                debug!(?hint, "format not sniffed; using declared content type");
                reader.set_format(hint);
            }
        }
        let format = reader.format();

        let mut decoder = reader
            .into_decoder()
            .map_err(|err| BildwerkError::ImageDecode(format!("unsupported image: {err}")))?;
        let orientation = decoder.orientation().unwrap_or(Orientation::NoTransforms);
        let pixel_format = classify_pixel_format(decoder.original_color_type(), decoder.color_type());

        let image = DynamicImage::from_decoder(decoder)
            .map_err(|err| BildwerkError::ImageDecode(format!("failed to decode image: {err}")))?;

        debug!(
            width = image.width(),
            height = image.height(),
            ?format,
            ?pixel_format,
            ?orientation,
            "Image decoded from bytes"
        );

        Ok(Self {
            image,
            pixel_format,
            format,
            content_type: content_type.map(str::to_owned),
            orientation,
        })
    }

    /// Wrap an already-decoded `DynamicImage` with no orientation metadata.
    pub fn from_dynamic(image: DynamicImage) -> Self {
        let color = image.color();
        Self {
            image,
            pixel_format: pixel_format_of_color(color),
            format: None,
            content_type: None,
            orientation: Orientation::NoTransforms,
        }
    }

    /// Attach an orientation tag, as a decoder would for EXIF data.
    pub fn with_orientation(mut self, orientation: Orientation) -> Self {
        self.orientation = orientation;
        self
    }

    // -- Accessors ------------------------------------------------------------

    pub fn width(&self) -> u32 {
        self.image.width()
    }

    pub fn height(&self) -> u32 {
        self.image.height()
    }

    pub fn pixel_format(&self) -> PixelFormat {
        self.pixel_format
    }

    /// Codec the bytes were decoded as.
    pub fn format(&self) -> Option<ImageFormat> {
        self.format
    }

    /// Content type declared by whoever handed us the bytes.
    pub fn content_type(&self) -> Option<&str> {
        self.content_type.as_deref()
    }

    pub fn orientation(&self) -> Orientation {
        self.orientation
    }

    pub fn as_dynamic(&self) -> &DynamicImage {
        &self.image
    }

    // -- Transformations ------------------------------------------------------

    /// Rotate/flip the pixels as the orientation tag requests and drop the
    /// tag. Applying it twice is a no-op.
    pub fn apply_orientation(mut self) -> Self {
        if self.orientation != Orientation::NoTransforms {
            debug!(orientation = ?self.orientation, "Applying embedded orientation");
            self.image.apply_orientation(self.orientation);
            self.orientation = Orientation::NoTransforms;
        }
        self
    }

    /// Consume the raw image, returning the bitmap and its pixel format.
    pub fn into_parts(self) -> (DynamicImage, PixelFormat) {
        (self.image, self.pixel_format)
    }
}

/// Map the decoder's view of the source layout onto a `PixelFormat`.
///
/// Decoders expand bilevel and palette images to 8-bit buffers, so the
/// original color type is consulted first.
fn classify_pixel_format(original: ExtendedColorType, decoded: ColorType) -> PixelFormat {
    match original {
        ExtendedColorType::L1 => PixelFormat::Bilevel,
        // Palette images are the only ones reported without a known layout.
        ExtendedColorType::Unknown(_) => PixelFormat::Indexed,
        _ => pixel_format_of_color(decoded),
    }
}

fn pixel_format_of_color(color: ColorType) -> PixelFormat {
    match (color.has_color(), color.has_alpha()) {
        (false, false) => PixelFormat::Grayscale,
        (false, true) => PixelFormat::GrayscaleAlpha,
        (true, false) => PixelFormat::Rgb,
        (true, true) => PixelFormat::Rgba,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::{GrayImage, Luma, Rgb, RgbImage, RgbaImage};

    fn png_bytes(image: DynamicImage) -> Vec<u8> {
        let mut buffer = Vec::new();
        image
            .write_to(&mut Cursor::new(&mut buffer), ImageFormat::Png)
            .unwrap();
        buffer
    }

    #[test]
    fn decode_png_reports_format_and_layout() {
        let bytes = png_bytes(DynamicImage::ImageRgb8(RgbImage::from_pixel(
            4,
            3,
            Rgb([10, 20, 30]),
        )));
        let raw = RawImage::decode(&bytes, Some("image/png")).unwrap();

        assert_eq!(raw.format(), Some(ImageFormat::Png));
        assert_eq!(raw.pixel_format(), PixelFormat::Rgb);
        assert_eq!((raw.width(), raw.height()), (4, 3));
        assert_eq!(raw.content_type(), Some("image/png"));
        assert_eq!(raw.orientation(), Orientation::NoTransforms);
    }

    #[test]
    fn decode_grayscale_png_is_grayscale() {
        let bytes = png_bytes(DynamicImage::ImageLuma8(GrayImage::from_pixel(2, 2, Luma([7]))));
        let raw = RawImage::decode(&bytes, None).unwrap();
        assert_eq!(raw.pixel_format(), PixelFormat::Grayscale);
    }

    #[test]
    fn decode_garbage_is_decode_error() {
        let result = RawImage::decode(b"definitely not an image", Some("image/jpeg"));
        assert!(matches!(result, Err(BildwerkError::ImageDecode(_))));
    }

    #[test]
    fn decode_empty_input_is_decode_error() {
        assert!(matches!(
            RawImage::decode(&[], None),
            Err(BildwerkError::ImageDecode(_))
        ));
    }

    #[test]
    fn from_dynamic_tags_pixel_format() {
        let raw = RawImage::from_dynamic(DynamicImage::ImageRgba8(RgbaImage::new(1, 1)));
        assert_eq!(raw.pixel_format(), PixelFormat::Rgba);
        assert_eq!(raw.format(), None);
    }

    #[test]
    fn apply_orientation_rotates_once() {
        let raw = RawImage::from_dynamic(DynamicImage::ImageRgb8(RgbImage::new(4, 2)))
            .with_orientation(Orientation::Rotate90);

        let once = raw.apply_orientation();
        assert_eq!((once.width(), once.height()), (2, 4));
        assert_eq!(once.orientation(), Orientation::NoTransforms);

        let twice = once.apply_orientation();
        assert_eq!((twice.width(), twice.height()), (2, 4));
    }
}
