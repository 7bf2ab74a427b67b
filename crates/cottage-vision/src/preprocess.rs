//! Image normalisation for the classifier input.

use cottage_protocol::{CottageResult, InspectionError};
use image::DynamicImage;
use image::imageops::{self, FilterType};
use ndarray::Array4;

/// Square side the classifier was trained on.
pub const DEFAULT_TARGET_SIZE: u32 = 224;

#[derive(Debug, Clone, Copy)]
pub struct PreprocessConfig {
    pub target_size: u32,
    pub filter: FilterType,
}

impl Default for PreprocessConfig {
    fn default() -> Self {
        Self {
            target_size: DEFAULT_TARGET_SIZE,
            filter: FilterType::CatmullRom,
        }
    }
}

impl PreprocessConfig {
    /// NHWC shape of the tensor produced by [`preprocess`].
    pub fn input_shape(&self) -> [usize; 4] {
        let side = self.target_size as usize;
        [1, side, side, 3]
    }
}

/// Decode any format the `image` crate understands, guessing from content.
pub fn decode_image(bytes: &[u8]) -> CottageResult<DynamicImage> {
    image::load_from_memory(bytes).map_err(|error| InspectionError::Decode(error.to_string()))
}

/// RGB → exact square resize → `[0,1]` → `[1, side, side, 3]`.
pub fn preprocess(image: &DynamicImage, config: &PreprocessConfig) -> Array4<f32> {
    let side = config.target_size;
    let rgb = image.to_rgb8();
    let resized = imageops::resize(&rgb, side, side, config.filter);

    let mut tensor = Array4::<f32>::zeros(config.input_shape());
    for (x, y, pixel) in resized.enumerate_pixels() {
        for (channel, value) in pixel.0.iter().enumerate() {
            tensor[[0, y as usize, x as usize, channel]] = f32::from(*value) / 255.0;
        }
    }
    tensor
}
