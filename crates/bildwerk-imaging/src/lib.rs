// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// bildwerk-imaging — The image stylization pipeline.
//
// Decodes an image, normalizes orientation and channels, bounds its size,
// classifies it as color or monochrome, applies either the cartoon or the
// duotone stylization, reattaches transparency, and re-encodes it in the
// source format.

pub mod cartoon;
pub mod classify;
pub mod constrain;
pub mod decode;
pub mod duotone;
pub mod encode;
pub mod filters;
pub mod format;
pub mod normalize;
pub mod pipeline;
pub mod quantize;
pub mod recompose;

// Re-export the entry point so callers can use `bildwerk_imaging::stylize`.
pub use decode::RawImage;
pub use normalize::NormalizedImage;
pub use pipeline::{Stylized, StylizedImage, stylize};
