// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Median-cut color quantization.
//
// The color histogram is built by sorting, and every tie is broken by
// position, so the palette for a given image is always the same.

use std::collections::HashMap;

use image::{Rgb, RgbImage};
use tracing::{debug, instrument};

/// One distinct color and how many pixels carry it.
type Entry = ([u8; 3], u64);

#[derive(Debug)]
struct ColorBox {
    entries: Vec<Entry>,
    population: u64,
}

impl ColorBox {
    fn new(entries: Vec<Entry>) -> Self {
        let population = entries.iter().map(|(_, count)| count).sum();
        Self {
            entries,
            population,
        }
    }

    fn is_splittable(&self) -> bool {
        self.entries.len() > 1
    }

    /// Channel with the widest value range; lowest index wins ties.
    fn widest_channel(&self) -> usize {
        let mut best = (0, 0u8);
        for channel in 0..3 {
            let (mut lo, mut hi) = (u8::MAX, u8::MIN);
            for (color, _) in &self.entries {
                lo = lo.min(color[channel]);
                hi = hi.max(color[channel]);
            }
            let range = hi - lo;
            if range > best.1 {
                best = (channel, range);
            }
        }
        best.0
    }

    /// Split at the population median along the widest channel.
    fn split(mut self) -> (ColorBox, ColorBox) {
        let channel = self.widest_channel();
        self.entries
            .sort_unstable_by_key(|(color, _)| (color[channel], *color));

        let half = self.population.div_ceil(2);
        let mut running = 0;
        let mut cut = self.entries.len() - 1;
        for (index, (_, count)) in self.entries.iter().enumerate() {
            running += count;
            if running >= half {
                cut = index + 1;
                break;
            }
        }
        // Both halves must keep at least one color.
        let cut = cut.clamp(1, self.entries.len() - 1);

        let upper = self.entries.split_off(cut);
        (ColorBox::new(self.entries), ColorBox::new(upper))
    }

    /// Population-weighted mean color, rounded to nearest.
    fn mean(&self) -> [u8; 3] {
        let mut sums = [0u64; 3];
        for (color, count) in &self.entries {
            for (sum, &value) in sums.iter_mut().zip(color) {
                *sum += u64::from(value) * count;
            }
        }
        let population = self.population.max(1);
        sums.map(|sum| ((sum + population / 2) / population) as u8)
    }
}

/// Distinct colors of `image` with their pixel counts, sorted by color.
fn histogram(image: &RgbImage) -> Vec<Entry> {
    let mut colors: Vec<[u8; 3]> = image.pixels().map(|p| p.0).collect();
    colors.sort_unstable();

    let mut entries: Vec<Entry> = Vec::new();
    for color in colors {
        match entries.last_mut() {
            Some((last, count)) if *last == color => *count += 1,
            _ => entries.push((color, 1)),
        }
    }
    entries
}

/// Compute a palette of at most `max_colors` entries by median cut.
pub fn median_cut_palette(image: &RgbImage, max_colors: usize) -> Vec<[u8; 3]> {
    let entries = histogram(image);
    if entries.is_empty() || max_colors == 0 {
        return Vec::new();
    }

    let mut boxes = vec![ColorBox::new(entries)];
    while boxes.len() < max_colors {
        let candidate = boxes
            .iter()
            .enumerate()
            .filter(|(_, b)| b.is_splittable())
            .fold(None::<(usize, u64)>, |best, (index, b)| match best {
                Some((_, population)) if population >= b.population => best,
                _ => Some((index, b.population)),
            });

        let Some((index, _)) = candidate else { break };
        let (lower, upper) = boxes.remove(index).split();
        boxes.insert(index, upper);
        boxes.insert(index, lower);
    }

    boxes.iter().map(ColorBox::mean).collect()
}

/// Index of the palette entry closest to `color`; lowest index wins ties.
fn nearest(palette: &[[u8; 3]], color: [u8; 3]) -> usize {
    let mut best = (0, u32::MAX);
    for (index, entry) in palette.iter().enumerate() {
        let distance: u32 = entry
            .iter()
            .zip(&color)
            .map(|(&a, &b)| {
                let d = i32::from(a) - i32::from(b);
                (d * d) as u32
            })
            .sum();
        if distance < best.1 {
            best = (index, distance);
        }
    }
    best.0
}

/// Reduce `image` to at most `max_colors` colors, mapping each pixel to its
/// nearest palette entry without dithering.
#[instrument(skip(image), fields(width = image.width(), height = image.height()))]
pub fn quantize(image: &RgbImage, max_colors: usize) -> RgbImage {
    let palette = median_cut_palette(image, max_colors);
    if palette.is_empty() {
        return image.clone();
    }
    debug!(palette_len = palette.len(), "Palette computed");

    let mut cache: HashMap<[u8; 3], [u8; 3]> = HashMap::new();
    let mut out = image.clone();
    for pixel in out.pixels_mut() {
        let color = pixel.0;
        let mapped = *cache
            .entry(color)
            .or_insert_with(|| palette[nearest(&palette, color)]);
        *pixel = Rgb(mapped);
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    fn distinct_colors(image: &RgbImage) -> usize {
        image.pixels().map(|p| p.0).collect::<HashSet<_>>().len()
    }

    fn gradient(width: u32, height: u32) -> RgbImage {
        RgbImage::from_fn(width, height, |x, y| {
            Rgb([(x * 7 % 256) as u8, (y * 13 % 256) as u8, ((x + y) * 3 % 256) as u8])
        })
    }

    #[test]
    fn few_colors_survive_exactly() {
        let mut image = RgbImage::from_pixel(4, 4, Rgb([10, 20, 30]));
        image.put_pixel(0, 0, Rgb([200, 0, 0]));
        image.put_pixel(3, 3, Rgb([0, 0, 250]));
        assert_eq!(quantize(&image, 48), image);
    }

    #[test]
    fn palette_is_bounded() {
        let image = gradient(64, 64);
        assert!(distinct_colors(&image) > 48);

        let palette = median_cut_palette(&image, 48);
        assert_eq!(palette.len(), 48);

        let quantized = quantize(&image, 48);
        assert!(distinct_colors(&quantized) <= 48);
        assert_eq!(quantized.dimensions(), image.dimensions());
    }

    #[test]
    fn quantization_is_deterministic() {
        let image = gradient(40, 30);
        assert_eq!(quantize(&image, 48), quantize(&image, 48));
    }

    #[test]
    fn every_pixel_maps_into_palette() {
        let image = gradient(32, 32);
        let palette: HashSet<[u8; 3]> = median_cut_palette(&image, 16).into_iter().collect();
        let quantized = quantize(&image, 16);
        assert!(quantized.pixels().all(|p| palette.contains(&p.0)));
    }

    #[test]
    fn split_keeps_both_halves_populated() {
        // One dominant color must not swallow the whole box.
        let boxed = ColorBox::new(vec![([0, 0, 0], 1_000), ([255, 0, 0], 1)]);
        let (lower, upper) = boxed.split();
        assert_eq!(lower.entries.len(), 1);
        assert_eq!(upper.entries.len(), 1);
    }

    #[test]
    fn mean_is_population_weighted() {
        let boxed = ColorBox::new(vec![([0, 0, 0], 3), ([100, 40, 8], 1)]);
        assert_eq!(boxed.mean(), [25, 10, 2]);
    }

    #[test]
    fn nearest_prefers_lowest_index_on_tie() {
        let palette = [[0, 0, 0], [10, 0, 0], [20, 0, 0]];
        assert_eq!(nearest(&palette, [5, 0, 0]), 0);
        assert_eq!(nearest(&palette, [16, 0, 0]), 2);
    }

    #[test]
    fn empty_and_single_pixel_images() {
        let empty = RgbImage::new(0, 0);
        assert!(median_cut_palette(&empty, 48).is_empty());
        assert_eq!(quantize(&empty, 48), empty);

        let single = RgbImage::from_pixel(1, 1, Rgb([1, 2, 3]));
        assert_eq!(quantize(&single, 48), single);
    }
}
