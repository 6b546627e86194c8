use chrono::{DateTime, Utc};
use image::{DynamicImage, GrayImage, ImageFormat, RgbImage};
use strum_macros::Display;

/// Pixel layout of an incoming camera frame.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Display)]
pub enum ImageEncoding {
    Rgb8,
    Bgr8,
    Mono8,
    Png,
    Jpeg,
}

impl TryFrom<&str> for ImageEncoding {
    type Error = ImageDecodeError;

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        match value.to_lowercase().as_str() {
            "rgb8" => Ok(ImageEncoding::Rgb8),
            "bgr8" => Ok(ImageEncoding::Bgr8),
            "mono8" => Ok(ImageEncoding::Mono8),
            "png" => Ok(ImageEncoding::Png),
            "jpeg" | "jpg" => Ok(ImageEncoding::Jpeg),
            other => Err(ImageDecodeError::Unsupported(other.to_string())),
        }
    }
}

#[derive(Debug, Display)]
pub enum ImageDecodeError {
    /// Raw buffer length does not match `width * height * channels`.
    SizeMismatch,
    Unsupported(String),
    Codec(image::ImageError),
}

impl std::error::Error for ImageDecodeError {}

impl From<image::ImageError> for ImageDecodeError {
    fn from(value: image::ImageError) -> Self { ImageDecodeError::Codec(value) }
}

/// A camera frame as delivered by the transport, not yet decoded.
#[derive(Debug, Clone)]
pub struct RawImage {
    pub stamp: DateTime<Utc>,
    pub width: u32,
    pub height: u32,
    pub encoding: ImageEncoding,
    pub data: Vec<u8>,
}

impl RawImage {
    /// Decodes the frame into a dense RGB pixel buffer.
    ///
    /// # Errors
    /// `SizeMismatch` for raw layouts with a wrong buffer length, `Codec` if a
    /// compressed frame fails to decode.
    pub fn decode(&self) -> Result<RgbImage, ImageDecodeError> {
        match self.encoding {
            ImageEncoding::Rgb8 => RgbImage::from_raw(self.width, self.height, self.data.clone())
                .ok_or(ImageDecodeError::SizeMismatch),
            ImageEncoding::Bgr8 => {
                let mut img = RgbImage::from_raw(self.width, self.height, self.data.clone())
                    .ok_or(ImageDecodeError::SizeMismatch)?;
                img.pixels_mut().for_each(|px| px.0.swap(0, 2));
                Ok(img)
            }
            ImageEncoding::Mono8 => GrayImage::from_raw(self.width, self.height, self.data.clone())
                .map(|g| DynamicImage::ImageLuma8(g).to_rgb8())
                .ok_or(ImageDecodeError::SizeMismatch),
            ImageEncoding::Png => {
                Ok(image::load_from_memory_with_format(&self.data, ImageFormat::Png)?.to_rgb8())
            }
            ImageEncoding::Jpeg => {
                Ok(image::load_from_memory_with_format(&self.data, ImageFormat::Jpeg)?.to_rgb8())
            }
        }
    }
}
