//! Convenience helpers backed by the `image` crate.
//!
//! Available when the `image-io` feature is enabled.

use crate::util::{DecodeError, DecodeResult};
use std::path::Path;

/// Reads the pixel size of an image from its header without decoding it.
pub fn source_dimensions<P: AsRef<Path>>(path: P) -> DecodeResult<(u32, u32)> {
    image::image_dimensions(path).map_err(|err| DecodeError::ImageIo {
        reason: err.to_string(),
    })
}
