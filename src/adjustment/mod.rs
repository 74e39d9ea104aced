pub mod channels;
pub mod region;

use image::RgbImage;
use serde::Serialize;

use crate::error::{Result, ToneError};

/// Brightness multiplier, red/blue temperature offset and bronze tint
/// percentage, always applied in that order.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Adjustment {
    pub brightness: f64,
    pub temperature: f64,
    pub bronze: f64,
}

impl Adjustment {
    pub fn new(brightness: f64, temperature: f64, bronze: f64) -> Result<Self> {
        if !brightness.is_finite() || brightness < 0.0 {
            return Err(ToneError::InvalidParameter(format!(
                "brightness multiplier must be finite and non-negative, got {}",
                brightness
            )));
        }
        if !temperature.is_finite() {
            return Err(ToneError::InvalidParameter(format!(
                "temperature offset must be finite, got {}",
                temperature
            )));
        }
        if !bronze.is_finite() || !(0.0..=100.0).contains(&bronze) {
            return Err(ToneError::InvalidParameter(format!(
                "bronze percentage must be within [0, 100], got {}",
                bronze
            )));
        }

        Ok(Self {
            brightness,
            temperature,
            bronze,
        })
    }

    pub fn identity() -> Self {
        Self {
            brightness: 1.0,
            temperature: 0.0,
            bronze: 0.0,
        }
    }

    /// Runs brightness, temperature and bronze over every pixel of `buffer`.
    /// Whole images and cropped regions both go through here.
    pub fn apply_in_place(&self, buffer: &mut RgbImage) {
        channels::brightness_in_place(buffer, self.brightness);
        channels::temperature_in_place(buffer, self.temperature);
        channels::bronze_in_place(buffer, self.bronze);
    }

    pub fn apply(&self, image: &RgbImage) -> RgbImage {
        let mut adjusted = image.clone();
        self.apply_in_place(&mut adjusted);
        adjusted
    }
}

impl Default for Adjustment {
    fn default() -> Self {
        Self::identity()
    }
}
