#[cfg(feature = "rustface")]
pub mod seeta;

use image::{GrayImage, RgbImage};
use log::{debug, info, warn};
use serde::{Deserialize, Serialize};

use crate::{adjustment::region::Region, error::Result, image_utils::rgb_to_gray};

/// Tuning handed to a face detection backend when it is built.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DetectorParams {
    /// Growth factor between successive search window sizes.
    pub scale_factor: f32,
    /// Smallest face edge, in pixels, worth reporting.
    pub min_size: u32,
    /// Minimum backend score for a candidate to be reported.
    pub score_threshold: f64,
}

impl Default for DetectorParams {
    fn default() -> Self {
        Self {
            scale_factor: 1.1,
            min_size: 30,
            score_threshold: 2.0,
        }
    }
}

/// Axis-aligned rectangle reported by a detector. Coordinates are signed
/// because backends may report boxes that poke past the frame.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FaceCandidate {
    pub x: i64,
    pub y: i64,
    pub width: u32,
    pub height: u32,
    pub score: f64,
}

impl FaceCandidate {
    pub fn to_region(&self, image_width: u32, image_height: u32) -> Result<Region> {
        Region::try_new(
            self.x,
            self.y,
            self.x + self.width as i64,
            self.y + self.height as i64,
            image_width,
            image_height,
        )
    }
}

pub trait FaceDetector: Send + Sync {
    /// Candidates in the order the backend produced them; may be empty.
    fn detect(&self, gray: &GrayImage) -> Result<Vec<FaceCandidate>>;

    fn name(&self) -> &str;
}

/// Reduces a detector's output to at most one face region per image.
pub struct FaceLocator {
    detector: Box<dyn FaceDetector>,
}

impl FaceLocator {
    pub fn new(detector: Box<dyn FaceDetector>) -> Self {
        Self { detector }
    }

    pub fn detector_name(&self) -> &str {
        self.detector.name()
    }

    /// First reported candidate wins; no ranking by size or score. Detector
    /// failures and out-of-frame boxes both read as "no face".
    pub fn locate(&self, image: &RgbImage) -> Option<Region> {
        let gray = rgb_to_gray(image);

        let candidates = match self.detector.detect(&gray) {
            Ok(candidates) => candidates,
            Err(e) => {
                warn!("{} failed, treating image as faceless: {}", self.detector.name(), e);
                return None;
            }
        };

        debug!("{} reported {} candidate(s)", self.detector.name(), candidates.len());

        let first = candidates.first()?;
        match first.to_region(image.width(), image.height()) {
            Ok(region) => Some(region),
            Err(e) => {
                info!("Discarding face candidate: {}", e);
                None
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use image::Rgb;

    use super::*;
    use crate::error::ToneError;

    struct Scripted(Vec<FaceCandidate>);

    impl FaceDetector for Scripted {
        fn detect(&self, _gray: &GrayImage) -> Result<Vec<FaceCandidate>> {
            Ok(self.0.clone())
        }

        fn name(&self) -> &str {
            "scripted"
        }
    }

    struct Failing;

    impl FaceDetector for Failing {
        fn detect(&self, _gray: &GrayImage) -> Result<Vec<FaceCandidate>> {
            Err(ToneError::FaceDetection("model not loaded".into()))
        }

        fn name(&self) -> &str {
            "failing"
        }
    }

    fn candidate(x: i64, y: i64, width: u32, height: u32, score: f64) -> FaceCandidate {
        FaceCandidate {
            x,
            y,
            width,
            height,
            score,
        }
    }

    fn canvas() -> RgbImage {
        RgbImage::from_pixel(100, 80, Rgb([255, 255, 255]))
    }

    #[test]
    fn test_no_candidates_is_no_region() {
        let locator = FaceLocator::new(Box::new(Scripted(vec![])));
        assert_eq!(locator.locate(&canvas()), None);
    }

    #[test]
    fn test_first_candidate_wins_over_larger_later_one() {
        let locator = FaceLocator::new(Box::new(Scripted(vec![
            candidate(10, 10, 30, 30, 2.5),
            candidate(5, 5, 60, 60, 9.0),
        ])));

        let region = locator.locate(&canvas()).unwrap();
        assert_eq!(
            region,
            Region {
                left: 10,
                top: 10,
                right: 40,
                bottom: 40
            }
        );
    }

    #[test]
    fn test_out_of_frame_candidate_is_no_region() {
        let locator = FaceLocator::new(Box::new(Scripted(vec![candidate(-4, 10, 30, 30, 3.0)])));
        assert_eq!(locator.locate(&canvas()), None);

        let locator = FaceLocator::new(Box::new(Scripted(vec![candidate(80, 60, 30, 30, 3.0)])));
        assert_eq!(locator.locate(&canvas()), None);
    }

    #[test]
    fn test_detector_error_is_no_region() {
        let locator = FaceLocator::new(Box::new(Failing));
        assert_eq!(locator.locate(&canvas()), None);
        assert_eq!(locator.detector_name(), "failing");
    }

    #[test]
    fn test_default_params() {
        let params = DetectorParams::default();
        assert_eq!(params.scale_factor, 1.1);
        assert_eq!(params.min_size, 30);
    }
}
