/// Decode → fit → flatten → JPEG.
///
/// Pure image work with no knowledge of the cache layout, so it can be
/// tested against in-memory buffers.
use super::error::{Result, ThumbnailError};
use image::codecs::jpeg::JpegEncoder;
use image::imageops::FilterType;
use image::{DynamicImage, GenericImageView, ImageReader, Limits, RgbImage};
use std::io::Write;
use std::path::Path;

/// Dimensions of `(width, height)` scaled down to fit `bounds`, preserving
/// aspect ratio. Images already inside the box are returned unchanged; they
/// are never enlarged. Neither side rounds below 1 pixel.
pub fn fit_within(width: u32, height: u32, bounds: (u32, u32)) -> (u32, u32) {
    let (max_w, max_h) = bounds;
    if width <= max_w && height <= max_h {
        return (width, height);
    }

    let ratio = f64::min(
        f64::from(max_w) / f64::from(width),
        f64::from(max_h) / f64::from(height),
    );
    let w = (f64::from(width) * ratio).round().clamp(1.0, f64::from(max_w)) as u32;
    let h = (f64::from(height) * ratio).round().clamp(1.0, f64::from(max_h)) as u32;
    (w, h)
}

/// Decode `source`, sniffing the format from its contents rather than
/// trusting the extension.
pub fn decode(source: &Path, max_dimension: u32) -> Result<DynamicImage> {
    let mut reader = ImageReader::open(source)
        .map_err(|e| ThumbnailError::Read {
            path: source.to_path_buf(),
            source: e,
        })?
        .with_guessed_format()
        .map_err(|e| ThumbnailError::Read {
            path: source.to_path_buf(),
            source: e,
        })?;

    let mut limits = Limits::default();
    limits.max_image_width = Some(max_dimension);
    limits.max_image_height = Some(max_dimension);
    reader.limits(limits);

    reader.decode().map_err(|e| ThumbnailError::Decode {
        path: source.to_path_buf(),
        source: e,
    })
}

/// Shrink `img` to fit `bounds` and drop any alpha or palette, producing
/// three-channel RGB.
pub fn shrink_to_rgb(img: &DynamicImage, bounds: (u32, u32)) -> RgbImage {
    let (w, h) = img.dimensions();
    let (tw, th) = fit_within(w, h, bounds);
    if (tw, th) == (w, h) {
        img.to_rgb8()
    } else {
        img.resize_exact(tw, th, FilterType::Triangle).to_rgb8()
    }
}

/// Encode `rgb` as baseline JPEG at `quality` into `out`.
pub fn encode_jpeg<W: Write>(rgb: &RgbImage, quality: u8, out: W, dest: &Path) -> Result<()> {
    let mut encoder = JpegEncoder::new_with_quality(out, quality);
    encoder
        .encode_image(rgb)
        .map_err(|e| ThumbnailError::Encode {
            path: dest.to_path_buf(),
            source: e,
        })
}
