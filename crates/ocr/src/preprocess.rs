use image::{DynamicImage, GrayImage, ImageBuffer, ImageReader, Limits, Luma};
use std::io::Cursor;
use thiserror::Error;

/// Tesseract works best around 300 DPI; larger scans are scaled down to this.
const MAX_OCR_DIMENSION: u32 = 2800;

/// Images beyond this on either side are refused instead of decoded.
const MAX_DECODE_DIMENSION: u32 = 20_000;

#[derive(Debug, Error)]
pub enum PreprocessError {
    #[error("Failed to read image: {0}")]
    Read(#[from] std::io::Error),
    #[error("Failed to decode image: {0}")]
    Decode(#[from] image::ImageError),
    #[error("Failed to encode processed image: {0}")]
    Encode(String),
}

/// Load an image file, apply normalization, and return PNG bytes ready for OCR.
pub fn prepare_for_ocr(path: &std::path::Path) -> Result<Vec<u8>, PreprocessError> {
    let data = std::fs::read(path)?;
    prepare_for_ocr_from_bytes(&data)
}

/// Decode raw image bytes (PNG / JPEG / TIFF / WEBP / BMP) and return
/// normalized PNG bytes. The format is sniffed from content, not the name.
pub fn prepare_for_ocr_from_bytes(data: &[u8]) -> Result<Vec<u8>, PreprocessError> {
    let mut limits = Limits::default();
    limits.max_image_width = Some(MAX_DECODE_DIMENSION);
    limits.max_image_height = Some(MAX_DECODE_DIMENSION);

    let mut reader = ImageReader::new(Cursor::new(data)).with_guessed_format()?;
    reader.limits(limits);
    let img = reader.decode()?;
    encode_as_png(normalize(img))
}

/// Downscale + grayscale + contrast stretch.
fn normalize(img: DynamicImage) -> DynamicImage {
    let img = if img.width() > MAX_OCR_DIMENSION || img.height() > MAX_OCR_DIMENSION {
        img.resize(MAX_OCR_DIMENSION, MAX_OCR_DIMENSION, image::imageops::FilterType::Lanczos3)
    } else {
        img
    };

    let gray: GrayImage = img.to_luma8();

    let (min_px, max_px) = gray
        .pixels()
        .fold((255u8, 0u8), |(mn, mx), p| (mn.min(p[0]), mx.max(p[0])));

    if max_px <= min_px {
        return DynamicImage::ImageLuma8(gray);
    }

    let range = (max_px - min_px) as u32;
    let stretched: GrayImage = ImageBuffer::from_fn(gray.width(), gray.height(), |x, y| {
        let p = gray.get_pixel(x, y)[0];
        Luma([((p - min_px) as u32 * 255 / range) as u8])
    });

    DynamicImage::ImageLuma8(stretched)
}

fn encode_as_png(img: DynamicImage) -> Result<Vec<u8>, PreprocessError> {
    let mut buf = Vec::new();
    img.write_to(&mut Cursor::new(&mut buf), image::ImageFormat::Png)
        .map_err(|e| PreprocessError::Encode(e.to_string()))?;
    Ok(buf)
}
