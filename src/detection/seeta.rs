//! SeetaFace cascade backend provided by the `rustface` crate.

use std::path::Path;

use image::GrayImage;
use rustface::ImageData;

use crate::{
    detection::{DetectorParams, FaceCandidate, FaceDetector},
    error::{Result, ToneError},
};

pub struct RustfaceDetector {
    model_bytes: Vec<u8>,
    params: DetectorParams,
}

impl RustfaceDetector {
    pub fn new<P: AsRef<Path>>(model_path: P, params: DetectorParams) -> Result<Self> {
        if params.scale_factor <= 1.0 {
            return Err(ToneError::InvalidParameter(format!(
                "detector scale factor must be greater than 1, got {}",
                params.scale_factor
            )));
        }

        let model_bytes = std::fs::read(model_path.as_ref())?;
        // Parse once up front so a bad model fails at startup, not per image.
        rustface::read_model(&model_bytes[..]).map_err(|e| ToneError::FaceDetection(e.to_string()))?;

        Ok(Self {
            model_bytes,
            params,
        })
    }
}

impl FaceDetector for RustfaceDetector {
    fn detect(&self, gray: &GrayImage) -> Result<Vec<FaceCandidate>> {
        // rustface detectors need `&mut self`; a fresh one per image keeps
        // this type shareable across worker threads.
        let model = rustface::read_model(&self.model_bytes[..])
            .map_err(|e| ToneError::FaceDetection(e.to_string()))?;
        let mut detector = rustface::create_detector_with_model(model);

        detector.set_min_face_size(self.params.min_size);
        detector.set_score_thresh(self.params.score_threshold);
        detector.set_pyramid_scale_factor(1.0 / self.params.scale_factor);
        detector.set_slide_window_step(4, 4);

        let (width, height) = gray.dimensions();
        let image = ImageData::new(gray.as_raw(), width, height);

        let candidates = detector
            .detect(&image)
            .iter()
            .map(|face| {
                let bbox = face.bbox();
                FaceCandidate {
                    x: bbox.x() as i64,
                    y: bbox.y() as i64,
                    width: bbox.width(),
                    height: bbox.height(),
                    score: face.score(),
                }
            })
            .collect();

        Ok(candidates)
    }

    fn name(&self) -> &str {
        "rustface"
    }
}
