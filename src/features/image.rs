//! PNG export of rendered figures to a bucket.

use crate::core::models::Location;
use crate::errors::StorageError;
use crate::storage::Storage;
use crate::utils::mime::IMAGE_PNG;

/// Anything that can render itself as a PNG image, typically a plot.
pub trait Figure: Send + Sync {
    /// # Errors
    ///
    /// Returns an error if rendering fails.
    fn render_png(&self) -> anyhow::Result<Vec<u8>>;
}

/// RGBA8 pixel canvas, white by default.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RasterFigure {
    width: u32,
    height: u32,
    pixels: Vec<u8>,
}

/// Bytes needed for a `width` x `height` RGBA8 buffer, if addressable.
fn rgba_len(width: u32, height: u32) -> Result<usize, StorageError> {
    (width as usize)
        .checked_mul(height as usize)
        .and_then(|n| n.checked_mul(4))
        .ok_or_else(|| {
            StorageError::Precondition(format!("{width}x{height} RGBA image is too large"))
        })
}

impl RasterFigure {
    /// # Errors
    ///
    /// Returns `Precondition` if the canvas size overflows `usize`.
    pub fn new(width: u32, height: u32) -> Result<Self, StorageError> {
        let len = rgba_len(width, height)?;
        Ok(Self {
            width,
            height,
            pixels: vec![0xff; len],
        })
    }

    /// # Errors
    ///
    /// Returns `Precondition` unless `pixels` holds exactly `width * height`
    /// RGBA values.
    pub fn from_rgba(width: u32, height: u32, pixels: Vec<u8>) -> Result<Self, StorageError> {
        let expected = rgba_len(width, height)?;
        if pixels.len() != expected {
            return Err(StorageError::Precondition(format!(
                "expected {expected} bytes for a {width}x{height} RGBA image, got {}",
                pixels.len()
            )));
        }
        Ok(Self {
            width,
            height,
            pixels,
        })
    }

    #[must_use]
    pub fn width(&self) -> u32 {
        self.width
    }

    #[must_use]
    pub fn height(&self) -> u32 {
        self.height
    }

    /// Sets one pixel; out-of-bounds coordinates are ignored.
    pub fn put_pixel(&mut self, x: u32, y: u32, rgba: [u8; 4]) {
        if x >= self.width || y >= self.height {
            return;
        }
        let offset = (y as usize * self.width as usize + x as usize) * 4;
        self.pixels[offset..offset + 4].copy_from_slice(&rgba);
    }
}

impl Figure for RasterFigure {
    fn render_png(&self) -> anyhow::Result<Vec<u8>> {
        let mut buf = Vec::new();
        let mut encoder = png::Encoder::new(&mut buf, self.width, self.height);
        encoder.set_color(png::ColorType::Rgba);
        encoder.set_depth(png::BitDepth::Eight);
        let mut writer = encoder.write_header()?;
        writer.write_image_data(&self.pixels)?;
        writer.finish()?;
        Ok(buf)
    }
}

impl Storage {
    /// Renders `figure` to PNG in memory and uploads it to `bucket`/`key`
    /// with content type `image/png`.
    ///
    /// # Errors
    ///
    /// Returns `Serialization` if rendering fails, or the backend's error.
    pub async fn save_png(
        &self,
        figure: &dyn Figure,
        bucket: &str,
        key: &str,
    ) -> Result<(), StorageError> {
        let body = figure
            .render_png()
            .map_err(|e| StorageError::Serialization(format!("png: {e}")))?;
        self.write_bytes(&Location::remote(bucket, key), body, Some(IMAGE_PNG))
            .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rejects_wrong_pixel_count() {
        let err = RasterFigure::from_rgba(2, 2, vec![0; 15]).unwrap_err();
        assert!(matches!(err, StorageError::Precondition(_)));
    }

    #[test]
    fn oversized_dimensions_are_rejected() {
        let err = RasterFigure::from_rgba(u32::MAX, u32::MAX, Vec::new()).unwrap_err();
        assert!(matches!(err, StorageError::Precondition(_)));
        assert!(rgba_len(u32::MAX, u32::MAX).is_err());
        assert_eq!(rgba_len(3, 2).unwrap(), 24);
    }

    #[test]
    fn renders_decodable_png() {
        let mut figure = RasterFigure::new(3, 2).unwrap();
        figure.put_pixel(1, 1, [255, 0, 0, 255]);
        figure.put_pixel(9, 9, [0, 0, 0, 255]);
        let bytes = figure.render_png().unwrap();

        let decoder = png::Decoder::new(bytes.as_slice());
        let mut reader = decoder.read_info().unwrap();
        let mut out = vec![0; reader.output_buffer_size()];
        let info = reader.next_frame(&mut out).unwrap();
        assert_eq!((info.width, info.height), (3, 2));
        let offset = (3 + 1) * 4;
        assert_eq!(&out[offset..offset + 4], &[255, 0, 0, 255]);
    }
}
