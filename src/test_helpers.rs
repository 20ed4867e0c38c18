//! Shared test utilities for the resizer test suite.
//!
//! Provides synthetic image writers and small assertions so tests can run
//! real files through the backend without shipping binary fixtures.
//!
//! # Usage
//!
//! ```rust
//! use crate::test_helpers::*;
//!
//! let tmp = setup_images(&[("photo.jpg", 800, 600), ("icon.png", 64, 64)]);
//! assert_image_size(&tmp.path().join("photo.jpg"), 800, 600);
//! ```

use image::{ImageEncoder, RgbImage};
use std::path::Path;
use tempfile::TempDir;

// =========================================================================
// Synthetic images
// =========================================================================

fn gradient(width: u32, height: u32) -> RgbImage {
    RgbImage::from_fn(width, height, |x, y| {
        image::Rgb([(x % 256) as u8, (y % 256) as u8, 128])
    })
}

/// Write a small valid JPEG file with the given dimensions.
pub fn create_test_jpeg(path: &Path, width: u32, height: u32) {
    let img = gradient(width, height);
    let file = std::fs::File::create(path).unwrap();
    let writer = std::io::BufWriter::new(file);
    image::codecs::jpeg::JpegEncoder::new(writer)
        .write_image(img.as_raw(), width, height, image::ExtendedColorType::Rgb8)
        .unwrap();
}

/// Write a small valid PNG file with the given dimensions.
pub fn create_test_png(path: &Path, width: u32, height: u32) {
    gradient(width, height).save(path).unwrap();
}

/// Write each `(name, width, height)` into a fresh temp directory.
///
/// `.png` names get a PNG, everything else a JPEG.
pub fn setup_images(images: &[(&str, u32, u32)]) -> TempDir {
    let tmp = TempDir::new().unwrap();
    for (name, width, height) in images {
        let path = tmp.path().join(name);
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent).unwrap();
        }
        if name.ends_with(".png") {
            create_test_png(&path, *width, *height);
        } else {
            create_test_jpeg(&path, *width, *height);
        }
    }
    tmp
}

// =========================================================================
// Assertions
// =========================================================================

/// Assert that the file at `path` decodes to the given size.
pub fn assert_image_size(path: &Path, width: u32, height: u32) {
    let actual = image::image_dimensions(path)
        .unwrap_or_else(|e| panic!("cannot read {}: {e}", path.display()));
    assert_eq!(
        actual,
        (width, height),
        "unexpected size for {}",
        path.display()
    );
}
