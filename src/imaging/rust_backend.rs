//! Pure Rust image processing backend.
//!
//! Everything is statically linked into the binary.
//!
//! ## Crate mapping
//!
//! | Step | Crate / function |
//! |---|---|
//! | Decode (JPEG, PNG, TIFF, WebP) | `image::ImageReader` (format sniffed from content) |
//! | Source sub-crop, cover-crop | `DynamicImage::crop_imm` |
//! | Scale | `DynamicImage::resize_exact` with `Lanczos3` |
//! | Sharpen | `DynamicImage::unsharpen` |
//! | Background composite | `RgbaImage::from_pixel` + `imageops::overlay` |
//! | Encode → JPEG / AVIF | `JpegEncoder` / `AvifEncoder` (rav1e, speed 6) at plan quality |
//! | Encode → PNG / WebP / TIFF | lossless encoders, quality ignored |
//!
//! Decoding keeps the input's ICC profile and re-attaches it on save unless
//! the plan strips metadata. Formats whose encoder cannot embed a profile
//! drop it.

use super::backend::{BackendError, ImageBackend, RenderParams};
use super::params::{Dimensions, OutputFormat, Quality};
use image::codecs::avif::AvifEncoder;
use image::codecs::jpeg::JpegEncoder;
use image::codecs::png::PngEncoder;
use image::codecs::tiff::TiffEncoder;
use image::codecs::webp::WebPEncoder;
use image::imageops::FilterType;
use image::{DynamicImage, ImageDecoder, ImageEncoder, ImageError, ImageReader, Rgba, RgbaImage};
use std::fs::File;
use std::io::BufWriter;
use std::path::Path;

/// Unsharp mask applied when the plan asks for sharpening.
const SHARPEN_SIGMA: f32 = 0.5;
const SHARPEN_THRESHOLD: i32 = 0;

/// Pure Rust backend using the `image` crate ecosystem.
///
/// See the [module docs](self) for the crate-to-operation mapping.
pub struct RustBackend;

impl RustBackend {
    pub fn new() -> Self {
        Self
    }
}

impl Default for RustBackend {
    fn default() -> Self {
        Self::new()
    }
}

fn decode_error(path: &Path, err: ImageError) -> BackendError {
    match err {
        ImageError::IoError(e) => BackendError::Io(e),
        other => BackendError::Decode {
            path: path.to_path_buf(),
            message: other.to_string(),
        },
    }
}

/// Load and decode an image from disk, along with its ICC profile.
fn load_image(path: &Path) -> Result<(DynamicImage, Option<Vec<u8>>), BackendError> {
    let mut decoder = ImageReader::open(path)?
        .with_guessed_format()?
        .into_decoder()
        .map_err(|e| decode_error(path, e))?;
    let icc = decoder.icc_profile().map_err(|e| decode_error(path, e))?;
    let img = DynamicImage::from_decoder(decoder).map_err(|e| decode_error(path, e))?;
    Ok((img, icc))
}

/// Paint the background canvas and paste `img` onto it.
fn composite(img: &DynamicImage, canvas: Dimensions, fill: Rgba<u8>, at: (i64, i64)) -> DynamicImage {
    let mut base = RgbaImage::from_pixel(canvas.width, canvas.height, fill);
    image::imageops::overlay(&mut base, &img.to_rgba8(), at.0, at.1);
    DynamicImage::ImageRgba8(base)
}

/// Percent opacity to an 8-bit alpha value.
fn alpha(opacity: u8) -> u8 {
    ((opacity.min(100) as u32 * 255 + 50) / 100) as u8
}

fn attach_icc(encoder: &mut impl ImageEncoder, icc: Option<Vec<u8>>) {
    if let Some(profile) = icc {
        // unsupported by this encoder: the profile is dropped
        encoder.set_icc_profile(profile).ok();
    }
}

/// 8-bit RGB or RGBA, whichever keeps the alpha channel if there is one.
fn to_8bit(img: &DynamicImage) -> DynamicImage {
    if img.color().has_alpha() {
        DynamicImage::ImageRgba8(img.to_rgba8())
    } else {
        DynamicImage::ImageRgb8(img.to_rgb8())
    }
}

/// Encode and save, picking the encoder from the output extension.
fn save_image(
    img: &DynamicImage,
    path: &Path,
    quality: Quality,
    icc: Option<Vec<u8>>,
) -> Result<(), BackendError> {
    let encode_error = |message: String| BackendError::Encode {
        path: path.to_path_buf(),
        message,
    };
    let format = OutputFormat::from_path(path)
        .ok_or_else(|| encode_error("unsupported output format".to_string()))?;

    let file = File::create(path)?;
    let writer = BufWriter::new(file);
    let result = match format {
        OutputFormat::Jpeg => {
            // JPEG has no alpha channel; the encoder needs 8-bit RGB
            let mut encoder = JpegEncoder::new_with_quality(writer, quality.value().max(1) as u8);
            attach_icc(&mut encoder, icc);
            DynamicImage::ImageRgb8(img.to_rgb8()).write_with_encoder(encoder)
        }
        OutputFormat::Png => {
            let mut encoder = PngEncoder::new(writer);
            attach_icc(&mut encoder, icc);
            img.write_with_encoder(encoder)
        }
        OutputFormat::WebP => {
            let mut encoder = WebPEncoder::new_lossless(writer);
            attach_icc(&mut encoder, icc);
            to_8bit(img).write_with_encoder(encoder)
        }
        OutputFormat::Tiff => {
            let mut encoder = TiffEncoder::new(writer);
            attach_icc(&mut encoder, icc);
            img.write_with_encoder(encoder)
        }
        OutputFormat::Avif => {
            let mut encoder =
                AvifEncoder::new_with_speed_quality(writer, 6, quality.value() as u8);
            attach_icc(&mut encoder, icc);
            to_8bit(img).write_with_encoder(encoder)
        }
    };
    result.map_err(|e| encode_error(e.to_string()))
}

impl ImageBackend for RustBackend {
    fn identify(&self, path: &Path) -> Result<Dimensions, BackendError> {
        let (width, height) = image::image_dimensions(path).map_err(|e| decode_error(path, e))?;
        Ok(Dimensions::new(width, height))
    }

    fn render(&self, params: &RenderParams) -> Result<(), BackendError> {
        let plan = &params.plan;
        let (mut img, icc) = load_image(&params.source)?;

        if let Some(window) = plan.source_sub_crop {
            img = img.crop_imm(window.x, window.y, window.width, window.height);
        }

        if plan.did_scale {
            img = img.resize_exact(plan.scale_to.width, plan.scale_to.height, FilterType::Lanczos3);
        }

        // Decoded pixels carry no EXIF or XMP, so only the profile is left to drop
        let icc = if plan.strip_metadata {
            img = to_8bit(&img);
            None
        } else {
            icc
        };

        if plan.sharpen {
            img = img.unsharpen(SHARPEN_SIGMA, SHARPEN_THRESHOLD);
        }

        if let Some(bg) = plan.background {
            let fill = Rgba([bg.color.r, bg.color.g, bg.color.b, alpha(bg.opacity)]);
            img = composite(&img, bg.canvas, fill, (bg.paste_at.x, bg.paste_at.y));
        }

        if let Some(crop) = plan.cover_crop {
            img = img.crop_imm(crop.x, crop.y, crop.width, crop.height);
        }

        save_image(&img, &params.output, plan.quality, icc)
    }
}
