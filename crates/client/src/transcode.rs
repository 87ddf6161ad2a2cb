//! Screenshot transcoding: cover-fit resize, encode, size ceiling.

use std::io::Cursor;

use image::imageops::FilterType;
use image::{DynamicImage, ImageFormat as RasterFormat};
use seokit_core::format::ImageFormat;
use thiserror::Error;

/// Default output size ceiling (8 MiB).
pub const DEFAULT_MAX_BYTES: usize = 8 * 1024 * 1024;

/// Quality used for the single JPEG re-encode when the ceiling is exceeded.
pub const RECOMPRESS_QUALITY: u8 = 70;

#[derive(Debug, Error)]
pub enum TranscodeError {
    #[error("screenshot decode failed: {0}")]
    Decode(String),

    #[error("{format} encode failed: {reason}")]
    Encode { format: ImageFormat, reason: String },

    #[error("invalid output dimensions {width}x{height}")]
    InvalidDimensions { width: u32, height: u32 },
}

impl From<TranscodeError> for seokit_core::Error {
    fn from(err: TranscodeError) -> Self {
        seokit_core::Error::TranscodeFailed(err.to_string())
    }
}

/// Encoded image ready to cache and serve.
#[derive(Debug, Clone)]
pub struct TranscodeOutput {
    pub bytes: Vec<u8>,
    pub format: ImageFormat,
    pub width: u32,
    pub height: u32,
    /// Whether the size ceiling forced a lower-quality re-encode.
    pub recompressed: bool,
}

#[derive(Debug, Clone, Copy)]
pub struct Transcoder {
    max_bytes: usize,
}

impl Default for Transcoder {
    fn default() -> Self {
        Self::new(DEFAULT_MAX_BYTES)
    }
}

impl Transcoder {
    pub fn new(max_bytes: usize) -> Self {
        Self { max_bytes }
    }

    /// Decode `raw`, cover-fit it to `output` and encode as `format`.
    ///
    /// `quality` (clamped to 1-100) applies to the lossy formats only. JPEG is
    /// always progressive. A JPEG over the size ceiling is re-encoded once at [`RECOMPRESS_QUALITY`]; the
    /// result is returned even if it is still over.
    pub fn transcode(
        &self, raw: &[u8], format: ImageFormat, output: (u32, u32), quality: u8,
    ) -> Result<TranscodeOutput, TranscodeError> {
        let (width, height) = output;
        if width == 0 || height == 0 {
            return Err(TranscodeError::InvalidDimensions { width, height });
        }

        let decoded = image::load_from_memory(raw).map_err(|e| TranscodeError::Decode(e.to_string()))?;
        let fitted = decoded.resize_to_fill(width, height, FilterType::Lanczos3);
        let quality = quality.clamp(1, 100);

        let mut bytes = encode(&fitted, format, quality)?;
        let mut recompressed = false;

        if bytes.len() > self.max_bytes && format == ImageFormat::Jpeg {
            tracing::warn!(bytes = bytes.len(), max_bytes = self.max_bytes, "output over size ceiling, re-encoding");
            bytes = encode(&fitted, format, RECOMPRESS_QUALITY)?;
            recompressed = true;
        }

        if bytes.is_empty() {
            return Err(TranscodeError::Encode { format, reason: "encoder produced no data".into() });
        }

        tracing::debug!(format = %format, bytes = bytes.len(), recompressed, "screenshot transcoded");
        Ok(TranscodeOutput { bytes, format, width, height, recompressed })
    }

    /// [`Transcoder::transcode`] on the blocking thread pool.
    pub async fn transcode_blocking(
        &self, raw: Vec<u8>, format: ImageFormat, output: (u32, u32), quality: u8,
    ) -> Result<TranscodeOutput, TranscodeError> {
        let transcoder = *self;
        tokio::task::spawn_blocking(move || transcoder.transcode(&raw, format, output, quality))
            .await
            .map_err(|e| TranscodeError::Encode { format, reason: format!("transcode task failed: {e}") })?
    }
}

fn encode(image: &DynamicImage, format: ImageFormat, quality: u8) -> Result<Vec<u8>, TranscodeError> {
    let encode_err = |reason: String| TranscodeError::Encode { format, reason };
    let mut bytes = Vec::new();

    match format {
        ImageFormat::Webp => {
            let rgba = image.to_rgba8();
            let encoded = webp::Encoder::from_rgba(rgba.as_raw(), rgba.width(), rgba.height())
                .encode_simple(false, f32::from(quality))
                .map_err(|e| encode_err(format!("{e:?}")))?;
            bytes.extend_from_slice(&encoded);
        }
        ImageFormat::Jpeg => {
            let rgb = image.to_rgb8();
            let (width, height) = match (u16::try_from(rgb.width()), u16::try_from(rgb.height())) {
                (Ok(width), Ok(height)) => (width, height),
                _ => return Err(encode_err(format!("{}x{} exceeds JPEG limits", rgb.width(), rgb.height()))),
            };
            let mut encoder = jpeg_encoder::Encoder::new(&mut bytes, quality);
            encoder.set_progressive(true);
            encoder
                .encode(rgb.as_raw(), width, height, jpeg_encoder::ColorType::Rgb)
                .map_err(|e| encode_err(e.to_string()))?;
        }
        ImageFormat::Png => {
            image.write_to(&mut Cursor::new(&mut bytes), RasterFormat::Png).map_err(|e| encode_err(e.to_string()))?;
        }
    }

    Ok(bytes)
}
