use std::io::Cursor;

use async_trait::async_trait;
use cm_core::ports::{ImagePrepareError, ImagePreparePort};
use cm_core::SourceImage;
use image::codecs::jpeg::JpegEncoder;
use image::imageops::FilterType;
use image::{DynamicImage, GenericImageView, ImageReader};
use tracing::debug;

pub const DEFAULT_MAX_BYTES: usize = 1024 * 1024;
pub const DEFAULT_MAX_EDGE: u32 = 1024;

/// JPEG qualities tried in order until the output fits `max_bytes`.
const QUALITY_STEPS: [u8; 4] = [85, 70, 55, 40];

/// Shrinks uploads before recognition.
///
/// Images already within both bounds are passed through untouched. Larger
/// ones are scaled to fit `max_edge` and re-encoded as JPEG.
#[derive(Debug, Clone)]
pub struct ImageCompressor {
    max_bytes: usize,
    max_edge: u32,
}

impl Default for ImageCompressor {
    fn default() -> Self {
        Self::new(DEFAULT_MAX_BYTES, DEFAULT_MAX_EDGE)
    }
}

impl ImageCompressor {
    pub fn new(max_bytes: usize, max_edge: u32) -> Self {
        Self {
            max_bytes,
            max_edge,
        }
    }

    fn compress(&self, image: &SourceImage) -> Result<SourceImage, ImagePrepareError> {
        let reader = ImageReader::new(Cursor::new(&image.bytes[..]))
            .with_guessed_format()
            .map_err(|e| ImagePrepareError::Decode(e.to_string()))?;
        let (width, height) = reader
            .into_dimensions()
            .map_err(|e| ImagePrepareError::Decode(e.to_string()))?;

        if image.len() <= self.max_bytes && width <= self.max_edge && height <= self.max_edge {
            return Ok(image.clone());
        }

        let decoded = image::load_from_memory(&image.bytes)
            .map_err(|e| ImagePrepareError::Decode(e.to_string()))?;
        let resized = resize_to_fit(decoded, self.max_edge);
        let rgb = resized.to_rgb8();

        let mut encoded = Vec::new();
        for quality in QUALITY_STEPS {
            encoded.clear();
            JpegEncoder::new_with_quality(&mut encoded, quality)
                .encode_image(&rgb)
                .map_err(|e| ImagePrepareError::Encode(e.to_string()))?;
            if encoded.len() <= self.max_bytes {
                break;
            }
        }

        debug!(
            from_bytes = image.len(),
            to_bytes = encoded.len(),
            width = rgb.width(),
            height = rgb.height(),
            "image compressed"
        );
        Ok(SourceImage::new(
            jpeg_file_name(&image.file_name),
            "image/jpeg",
            encoded,
        ))
    }
}

#[async_trait]
impl ImagePreparePort for ImageCompressor {
    async fn prepare(&self, image: &SourceImage) -> Result<SourceImage, ImagePrepareError> {
        let compressor = self.clone();
        let image = image.clone();
        tokio::task::spawn_blocking(move || compressor.compress(&image))
            .await
            .map_err(|e| ImagePrepareError::Encode(format!("compression task failed: {e}")))?
    }
}

fn resize_to_fit(image: DynamicImage, max_edge: u32) -> DynamicImage {
    let (width, height) = image.dimensions();
    let (target_width, target_height) = calculate_target_size(width, height, max_edge);
    if (target_width, target_height) == (width, height) {
        image
    } else {
        image.resize_exact(target_width, target_height, FilterType::Triangle)
    }
}

fn calculate_target_size(width: u32, height: u32, max_edge: u32) -> (u32, u32) {
    if width <= max_edge && height <= max_edge {
        return (width, height);
    }

    if width >= height {
        let scaled_height = ((height as f64) * (max_edge as f64) / (width as f64)).round() as u32;
        (max_edge, scaled_height.max(1))
    } else {
        let scaled_width = ((width as f64) * (max_edge as f64) / (height as f64)).round() as u32;
        (scaled_width.max(1), max_edge)
    }
}

fn jpeg_file_name(file_name: &str) -> String {
    let stem = file_name
        .rsplit_once('.')
        .map(|(stem, _)| stem)
        .unwrap_or(file_name);
    format!("{stem}.jpg")
}
