/// One-shot image format conversion.
///
/// Reuses the thumbnail decoder so the same content sniffing and dimension
/// limits apply, then re-encodes at full size as lossless WebP.
use crate::config::ThumbnailSettings;
use crate::thumbnail::render;
use crate::thumbnail::ThumbnailError;
use image::codecs::webp::WebPEncoder;
use image::{DynamicImage, ImageError};
use std::io::{self, BufWriter, Write};
use std::path::{Path, PathBuf};
use tracing::info;

#[derive(thiserror::Error, Debug)]
pub enum ConvertError {
    #[error("cannot convert {path}: {source}")]
    Source {
        path: PathBuf,
        #[source]
        source: ThumbnailError,
    },

    #[error("failed to encode {path} as WebP: {source}")]
    Encode {
        path: PathBuf,
        #[source]
        source: ImageError,
    },

    #[error("failed to write {path}: {source}")]
    Write {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
}

/// Decode `source` and write it to `dest` as lossless WebP.
///
/// `dest` only appears once fully written. Alpha is kept; every other pixel
/// layout is widened to 8-bit RGB or RGBA, the two the encoder accepts.
pub fn convert_to_webp(source: &Path, dest: &Path) -> Result<PathBuf, ConvertError> {
    let max_dimension = ThumbnailSettings::default().max_source_dimension;
    let img = render::decode(source, max_dimension).map_err(|e| ConvertError::Source {
        path: source.to_path_buf(),
        source: e,
    })?;
    let img = if img.color().has_alpha() {
        DynamicImage::ImageRgba8(img.to_rgba8())
    } else {
        DynamicImage::ImageRgb8(img.to_rgb8())
    };

    let write_err = |e: io::Error| ConvertError::Write {
        path: dest.to_path_buf(),
        source: e,
    };
    let dir = match dest.parent() {
        Some(p) if !p.as_os_str().is_empty() => p,
        _ => Path::new("."),
    };
    let tmp = tempfile::Builder::new()
        .prefix(".partial-")
        .tempfile_in(dir)
        .map_err(write_err)?;
    {
        let mut writer = BufWriter::new(tmp.as_file());
        img.write_with_encoder(WebPEncoder::new_lossless(&mut writer))
            .map_err(|e| ConvertError::Encode {
                path: dest.to_path_buf(),
                source: e,
            })?;
        writer.flush().map_err(write_err)?;
    }
    tmp.persist(dest).map_err(|e| write_err(e.error))?;

    info!("Converted {} to {}", source.display(), dest.display());
    Ok(dest.to_path_buf())
}
