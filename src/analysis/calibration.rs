use std::path::Path;

use image::RgbImage;
use log::info;
use serde::Serialize;

use crate::{
    error::{Result, ToneError},
    image_utils::{channel_means, mean_luminance},
};

/// Maps a red/blue ratio delta onto the pixel offset range. Tunable; not
/// derived from any colour model.
pub const TEMPERATURE_SCALE: f64 = 128.0;

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct CalibrationResult {
    pub brightness_ratio: f64,
    pub temperature_offset: f64,
}

impl CalibrationResult {
    /// Calibration that leaves every image unchanged.
    pub fn neutral() -> Self {
        Self {
            brightness_ratio: 1.0,
            temperature_offset: 0.0,
        }
    }
}

/// Ratio of the mean luminance of `corrected` to that of `original`.
pub fn derive_brightness(corrected: &RgbImage, original: &RgbImage) -> Result<f64> {
    let corrected_mean = mean_luminance(corrected);
    let original_mean = mean_luminance(original);

    if original_mean == 0.0 {
        return Err(ToneError::DivisionByZero {
            statistic: "luminance",
        });
    }

    Ok(corrected_mean / original_mean)
}

/// `(corrected red/blue - original red/blue) * TEMPERATURE_SCALE`.
pub fn derive_temperature(corrected: &RgbImage, original: &RgbImage) -> Result<f64> {
    let corrected_ratio = red_blue_ratio(corrected)?;
    let original_ratio = red_blue_ratio(original)?;

    Ok((corrected_ratio - original_ratio) * TEMPERATURE_SCALE)
}

fn red_blue_ratio(image: &RgbImage) -> Result<f64> {
    let [red, _, blue] = channel_means(image);
    if blue == 0.0 {
        return Err(ToneError::DivisionByZero {
            statistic: "blue channel",
        });
    }
    Ok(red / blue)
}

/// Holds the reference pair a batch is calibrated against.
pub struct Calibrator {
    corrected: RgbImage,
    original: RgbImage,
}

impl Calibrator {
    pub fn new(corrected: RgbImage, original: RgbImage) -> Self {
        Self {
            corrected,
            original,
        }
    }

    pub fn from_paths<P: AsRef<Path>, Q: AsRef<Path>>(corrected: P, original: Q) -> Result<Self> {
        let corrected = image::open(corrected.as_ref())
            .map_err(|e| ToneError::file_access(corrected.as_ref(), e.into()))?
            .to_rgb8();
        let original = image::open(original.as_ref())
            .map_err(|e| ToneError::file_access(original.as_ref(), e.into()))?
            .to_rgb8();

        Ok(Self::new(corrected, original))
    }

    pub fn calibrate(&self) -> Result<CalibrationResult> {
        let brightness_ratio = derive_brightness(&self.corrected, &self.original)?;
        if brightness_ratio <= 0.0 {
            return Err(ToneError::DegenerateReference(
                "corrected reference has zero mean luminance".into(),
            ));
        }
        let temperature_offset = derive_temperature(&self.corrected, &self.original)?;

        info!(
            "Calibrated: brightness ratio {:.4}, temperature offset {:.2}",
            brightness_ratio, temperature_offset
        );

        Ok(CalibrationResult {
            brightness_ratio,
            temperature_offset,
        })
    }
}

#[cfg(test)]
mod tests {
    use image::Rgb;

    use super::*;

    fn solid(r: u8, g: u8, b: u8) -> RgbImage {
        RgbImage::from_pixel(8, 6, Rgb([r, g, b]))
    }

    #[test]
    fn test_self_comparison_is_neutral() {
        let mut image = solid(90, 120, 60);
        image.put_pixel(3, 2, Rgb([250, 10, 33]));

        assert_eq!(derive_brightness(&image, &image).unwrap(), 1.0);
        assert_eq!(derive_temperature(&image, &image).unwrap(), 0.0);
    }

    #[test]
    fn test_brightness_ratio_from_mean_luminance() {
        let original = solid(100, 100, 100);
        let corrected = solid(120, 120, 120);

        let ratio = derive_brightness(&corrected, &original).unwrap();
        assert!((ratio - 1.2).abs() < 1e-12);
    }

    #[test]
    fn test_temperature_offset_from_red_blue_ratio() {
        let original = solid(100, 80, 50);
        let corrected = solid(120, 80, 40);

        let offset = derive_temperature(&corrected, &original).unwrap();
        assert!((offset - 128.0).abs() < 1e-9);
    }

    #[test]
    fn test_black_original_is_division_by_zero() {
        let err = derive_brightness(&solid(10, 10, 10), &solid(0, 0, 0)).unwrap_err();
        assert!(matches!(err, ToneError::DivisionByZero { statistic: "luminance" }));
        assert!(err.is_calibration());
    }

    #[test]
    fn test_zero_blue_is_division_by_zero() {
        let with_blue = solid(10, 10, 10);
        let without_blue = solid(10, 10, 0);

        assert!(matches!(
            derive_temperature(&with_blue, &without_blue),
            Err(ToneError::DivisionByZero { .. })
        ));
        assert!(matches!(
            derive_temperature(&without_blue, &with_blue),
            Err(ToneError::DivisionByZero { .. })
        ));
    }

    #[test]
    fn test_calibrator_rejects_black_corrected_reference() {
        let calibrator = Calibrator::new(solid(0, 0, 0), solid(50, 50, 50));
        let err = calibrator.calibrate().unwrap_err();
        assert!(matches!(err, ToneError::DegenerateReference(_)));
    }

    #[test]
    fn test_calibrator_combines_both_derivations() {
        let calibrator = Calibrator::new(solid(120, 120, 120), solid(100, 100, 100));
        let result = calibrator.calibrate().unwrap();
        assert!((result.brightness_ratio - 1.2).abs() < 1e-12);
        assert_eq!(result.temperature_offset, 0.0);
    }
}
