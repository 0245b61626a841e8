//! Image enhancement before OCR.
//!
//! Handwriting on photographed cards is often faint and unevenly lit. The
//! enhancer converts to grayscale, removes sensor noise with a light Gaussian
//! blur and applies CLAHE (contrast limited adaptive histogram equalization)
//! so strokes stand out locally without blowing out the paper.

use std::io::Cursor;
use std::path::Path;

use image::codecs::jpeg::JpegEncoder;
use image::{DynamicImage, GenericImageView, GrayImage, Luma};
use ndarray::Array3;
use tracing::debug;

use crate::error::PreprocessError;
use crate::models::config::PreprocessConfig;

/// Image enhancer for the OCR pipeline.
#[derive(Debug, Clone)]
pub struct CardPreprocessor {
    /// Maximum image dimension (longer side).
    max_size: u32,
    /// Gaussian blur sigma (0 disables denoising).
    denoise_sigma: f32,
    /// CLAHE clip limit relative to a flat histogram.
    clip_limit: f32,
    /// CLAHE tiles per side.
    tile_grid: u32,
    /// Quality of the re-encoded JPEG.
    jpeg_quality: u8,
}

impl CardPreprocessor {
    /// Create a new preprocessor with default settings.
    pub fn new() -> Self {
        Self::from_config(&PreprocessConfig::default())
    }

    /// Create a preprocessor from configuration.
    pub fn from_config(config: &PreprocessConfig) -> Self {
        Self {
            max_size: 4096,
            denoise_sigma: config.denoise_sigma,
            clip_limit: config.clahe_clip_limit,
            tile_grid: config.clahe_tile_grid,
            jpeg_quality: config.jpeg_quality,
        }
    }

    /// Set maximum image dimension.
    pub fn with_max_size(mut self, size: u32) -> Self {
        self.max_size = size;
        self
    }

    /// Set the denoising strength.
    pub fn with_denoise_sigma(mut self, sigma: f32) -> Self {
        self.denoise_sigma = sigma;
        self
    }

    /// Set the CLAHE clip limit.
    pub fn with_clip_limit(mut self, clip_limit: f32) -> Self {
        self.clip_limit = clip_limit;
        self
    }

    fn validate(&self) -> Result<(), PreprocessError> {
        if self.clip_limit.is_nan() || self.clip_limit <= 0.0 {
            return Err(PreprocessError::InvalidParameter {
                name: "clahe_clip_limit".to_string(),
                reason: format!("must be positive, got {}", self.clip_limit),
            });
        }
        if self.tile_grid == 0 {
            return Err(PreprocessError::InvalidParameter {
                name: "clahe_tile_grid".to_string(),
                reason: "must be at least 1".to_string(),
            });
        }
        if self.denoise_sigma < 0.0 {
            return Err(PreprocessError::InvalidParameter {
                name: "denoise_sigma".to_string(),
                reason: format!("must not be negative, got {}", self.denoise_sigma),
            });
        }
        if !(1..=100).contains(&self.jpeg_quality) {
            return Err(PreprocessError::InvalidParameter {
                name: "jpeg_quality".to_string(),
                reason: format!("must be within 1..=100, got {}", self.jpeg_quality),
            });
        }
        Ok(())
    }

    /// Decode, enhance and re-encode an image as JPEG.
    ///
    /// Returns the encoded bytes (OCR input) and the enhanced image.
    pub fn process(&self, bytes: &[u8]) -> Result<(Vec<u8>, GrayImage), PreprocessError> {
        let image =
            image::load_from_memory(bytes).map_err(|e| PreprocessError::Decode(e.to_string()))?;
        let enhanced = self.enhance(&image)?;

        let mut encoded = Vec::new();
        JpegEncoder::new_with_quality(Cursor::new(&mut encoded), self.jpeg_quality)
            .encode_image(&enhanced)
            .map_err(|e| PreprocessError::Encode(e.to_string()))?;

        debug!("Enhanced image re-encoded to {} bytes", encoded.len());
        Ok((encoded, enhanced))
    }

    /// Read an image file and [`process`](Self::process) it.
    pub fn process_file(&self, path: &Path) -> crate::Result<(Vec<u8>, GrayImage)> {
        let bytes = std::fs::read(path)?;
        Ok(self.process(&bytes)?)
    }

    /// Grayscale, denoise and equalize an image.
    pub fn enhance(&self, image: &DynamicImage) -> Result<GrayImage, PreprocessError> {
        self.validate()?;

        let (width, height) = image.dimensions();
        let (new_width, new_height) = self.calculate_resize_dimensions(width, height);
        debug!(
            "Enhancing {}x{} image (working size {}x{})",
            width, height, new_width, new_height
        );

        let gray = if (new_width, new_height) == (width, height) {
            image.to_luma8()
        } else {
            image
                .resize_exact(new_width, new_height, image::imageops::FilterType::Lanczos3)
                .to_luma8()
        };

        let denoised = if self.denoise_sigma > 0.0 {
            image::imageops::blur(&gray, self.denoise_sigma)
        } else {
            gray
        };

        Ok(self.clahe(&denoised))
    }

    fn calculate_resize_dimensions(&self, width: u32, height: u32) -> (u32, u32) {
        let max_dim = width.max(height);

        if max_dim <= self.max_size {
            return (width, height);
        }

        let scale = self.max_size as f32 / max_dim as f32;
        let new_width = (width as f32 * scale) as u32;
        let new_height = (height as f32 * scale) as u32;

        (new_width.max(1), new_height.max(1))
    }

    /// Contrast limited adaptive histogram equalization.
    fn clahe(&self, image: &GrayImage) -> GrayImage {
        let (width, height) = image.dimensions();
        if width == 0 || height == 0 {
            return image.clone();
        }

        let tiles_x = self.tile_grid.min(width).max(1);
        let tiles_y = self.tile_grid.min(height).max(1);
        let bounds = |i: u32, tiles: u32, size: u32| (i * size / tiles, (i + 1) * size / tiles);

        // One lookup table per tile.
        let mut luts = Array3::<u8>::zeros((tiles_y as usize, tiles_x as usize, 256));
        for ty in 0..tiles_y {
            let (y0, y1) = bounds(ty, tiles_y, height);
            for tx in 0..tiles_x {
                let (x0, x1) = bounds(tx, tiles_x, width);

                let mut hist = [0u32; 256];
                for y in y0..y1 {
                    for x in x0..x1 {
                        hist[image.get_pixel(x, y)[0] as usize] += 1;
                    }
                }
                let lut = clipped_equalization(&hist, self.clip_limit);
                for (v, mapped) in lut.iter().enumerate() {
                    luts[[ty as usize, tx as usize, v]] = *mapped;
                }
            }
        }

        // Bilinear blend of the four nearest tile mappings.
        let tile_w = width as f32 / tiles_x as f32;
        let tile_h = height as f32 / tiles_y as f32;
        let neighbours = |pos: u32, tile: f32, tiles: u32| {
            let f = (pos as f32 + 0.5) / tile - 0.5;
            let lo = f.floor().clamp(0.0, (tiles - 1) as f32) as usize;
            let hi = (lo + 1).min(tiles as usize - 1);
            let weight = if hi == lo { 0.0 } else { (f - lo as f32).clamp(0.0, 1.0) };
            (lo, hi, weight)
        };

        let mut result = GrayImage::new(width, height);
        for y in 0..height {
            let (ty0, ty1, wy) = neighbours(y, tile_h, tiles_y);
            for x in 0..width {
                let (tx0, tx1, wx) = neighbours(x, tile_w, tiles_x);
                let v = image.get_pixel(x, y)[0] as usize;

                let top = luts[[ty0, tx0, v]] as f32 * (1.0 - wx) + luts[[ty0, tx1, v]] as f32 * wx;
                let bottom =
                    luts[[ty1, tx0, v]] as f32 * (1.0 - wx) + luts[[ty1, tx1, v]] as f32 * wx;
                let value = top * (1.0 - wy) + bottom * wy;

                result.put_pixel(x, y, Luma([value.round().clamp(0.0, 255.0) as u8]));
            }
        }

        result
    }
}

impl Default for CardPreprocessor {
    fn default() -> Self {
        Self::new()
    }
}

/// Save an enhanced image; the format follows the file extension.
pub fn save_enhanced(image: &GrayImage, path: &Path) -> crate::Result<()> {
    image.save(path)?;
    debug!("Saved enhanced image to {}", path.display());
    Ok(())
}

/// Histogram equalization mapping with the histogram clipped at
/// `clip_limit` times the flat bin height; the clipped excess is spread
/// evenly over all bins.
fn clipped_equalization(hist: &[u32; 256], clip_limit: f32) -> [u8; 256] {
    let total: u32 = hist.iter().sum();
    let mut lut = [0u8; 256];
    if total == 0 {
        for (v, out) in lut.iter_mut().enumerate() {
            *out = v as u8;
        }
        return lut;
    }

    let clip = ((clip_limit * total as f32 / 256.0) as u32).max(1);
    let mut clipped = *hist;
    let mut excess = 0u32;
    for bin in clipped.iter_mut() {
        if *bin > clip {
            excess += *bin - clip;
            *bin = clip;
        }
    }

    let share = excess / 256;
    let remainder = (excess % 256) as usize;
    for (i, bin) in clipped.iter_mut().enumerate() {
        *bin += share + u32::from(i < remainder);
    }

    let mut cdf = 0u32;
    for (v, out) in lut.iter_mut().enumerate() {
        cdf += clipped[v];
        *out = ((cdf as f32 * 255.0 / total as f32).round()).min(255.0) as u8;
    }
    lut
}
