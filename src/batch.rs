use std::{
    ffi::OsString,
    fs,
    path::{Path, PathBuf},
};

use image::RgbImage;
use log::{error, info, warn};
use rayon::iter::{IntoParallelRefIterator, ParallelIterator};

use crate::{
    BatchReport, FaceOutcome, FileOutcome, ProcessedFile,
    adjustment::region::{Region, apply_region},
    analysis::calibration::{CalibrationResult, Calibrator},
    config::{BatchConfig, EffectiveAdjustments},
    detection::FaceLocator,
    error::{Result, ToneError},
    image_utils::has_supported_extension,
    report::visualization::ComparisonRenderer,
};

/// Supported image files directly inside `dir`, sorted by name. Anything in
/// `exclude` (the output folders) is skipped along with sub-directories.
pub fn collect_inputs(dir: &Path, exclude: &[PathBuf]) -> Result<Vec<PathBuf>> {
    let mut inputs = Vec::new();

    for entry in fs::read_dir(dir)? {
        let path = entry?.path();
        if !path.is_file() || exclude.iter().any(|e| e == &path) {
            continue;
        }
        if has_supported_extension(&path) {
            inputs.push(path);
        }
    }

    inputs.sort();
    Ok(inputs)
}

/// Body adjustment over the whole frame, then the face adjustment layered on
/// the already body-adjusted pixels inside `face`.
pub fn correct_image(
    image: &RgbImage,
    face: Option<&Region>,
    adjustments: &EffectiveAdjustments,
) -> Result<RgbImage> {
    let body = adjustments.body.apply(image);
    match face {
        Some(region) => apply_region(&body, region, &adjustments.face),
        None => Ok(body),
    }
}

pub struct BatchProcessor {
    config: BatchConfig,
    calibration: CalibrationResult,
    adjustments: EffectiveAdjustments,
    locator: Option<FaceLocator>,
    renderer: ComparisonRenderer,
}

impl BatchProcessor {
    pub fn new(config: BatchConfig, calibration: CalibrationResult) -> Result<Self> {
        let adjustments = EffectiveAdjustments::resolve(&calibration, &config.body, &config.face)?;
        let renderer = ComparisonRenderer::new(config.render.clone());

        Ok(Self {
            config,
            calibration,
            adjustments,
            locator: None,
            renderer,
        })
    }

    /// Calibrates against the configured reference pair. Any failure here is
    /// fatal for the batch.
    pub fn calibrate(config: BatchConfig) -> Result<Self> {
        let calibrator = Calibrator::from_paths(&config.reference_corrected, &config.reference_original)?;
        let calibration = calibrator.calibrate()?;
        Self::new(config, calibration)
    }

    pub fn with_face_locator(mut self, locator: FaceLocator) -> Self {
        self.locator = Some(locator);
        self
    }

    pub fn with_renderer(mut self, renderer: ComparisonRenderer) -> Self {
        self.renderer = renderer;
        self
    }

    pub fn calibration(&self) -> &CalibrationResult {
        &self.calibration
    }

    pub fn adjustments(&self) -> &EffectiveAdjustments {
        &self.adjustments
    }

    pub fn locate_face(&self, image: &RgbImage) -> FaceOutcome {
        match self.locator {
            Some(ref locator) => match locator.locate(image) {
                Some(region) => FaceOutcome::Located(region),
                None => FaceOutcome::NotFound,
            },
            None => FaceOutcome::Disabled,
        }
    }

    /// Steps 2-4 for one decoded image: locate, then body and face passes.
    pub fn correct(&self, image: &RgbImage) -> (RgbImage, FaceOutcome) {
        let outcome = self.locate_face(image);

        if let FaceOutcome::Located(ref region) = outcome {
            match correct_image(image, Some(region), &self.adjustments) {
                Ok(corrected) => return (corrected, outcome),
                Err(e) => warn!("Ignoring face region: {}", e),
            }
        }

        let corrected = self.adjustments.body.apply(image);
        let outcome = match outcome {
            FaceOutcome::Located(_) => FaceOutcome::NotFound,
            other => other,
        };
        (corrected, outcome)
    }

    pub fn process_file(&self, path: &Path) -> Result<ProcessedFile> {
        let file_name = path
            .file_name()
            .ok_or_else(|| ToneError::InvalidParameter(format!("{} has no file name", path.display())))?;

        info!("Processing {}...", path.display());
        let image = image::open(path)
            .map_err(|e| ToneError::file_access(path, e.into()))?
            .to_rgb8();

        let (processed, face) = self.correct(&image);
        match face {
            FaceOutcome::Located(ref region) => info!(
                "Face at ({}, {})-({}, {}) in {}",
                region.left,
                region.top,
                region.right,
                region.bottom,
                path.display()
            ),
            FaceOutcome::NotFound => info!(
                "No face detected in {}, applying body adjustments to the entire image",
                path.display()
            ),
            FaceOutcome::Disabled => {}
        }

        let processed_path = self.config.processed_dir().join(file_name);
        processed
            .save(&processed_path)
            .map_err(|e| ToneError::file_access(&processed_path, e.into()))?;
        info!("Saved processed image as {}", processed_path.display());

        let mut comparison_name = OsString::from(&self.config.comparison_prefix);
        comparison_name.push(file_name);
        let comparison_path = self.config.compared_dir().join(comparison_name);

        let artifact = self.renderer.render_artifact(
            &image,
            &processed,
            &self.adjustments.body,
            &self.adjustments.face,
            comparison_path,
        );
        artifact
            .save()
            .map_err(|e| ToneError::file_access(&artifact.path, e))?;
        info!("Saved comparison image as {}", artifact.path.display());

        Ok(ProcessedFile {
            source: path.to_path_buf(),
            processed_path,
            comparison_path: artifact.path,
            face,
        })
    }

    fn process_one(&self, path: &Path) -> FileOutcome {
        match self.process_file(path) {
            Ok(done) => FileOutcome::Done(done),
            Err(e) => {
                error!("Skipping {}: {}", path.display(), e);
                FileOutcome::Failed {
                    source: path.to_path_buf(),
                    error: e.to_string(),
                }
            }
        }
    }

    /// Processes every eligible file in the input folder. Only output folder
    /// creation and input enumeration can fail the whole run; per-file
    /// failures are recorded in the report.
    pub fn run(&self) -> Result<BatchReport> {
        let processed_dir = self.config.processed_dir();
        let compared_dir = self.config.compared_dir();
        fs::create_dir_all(&processed_dir)?;
        fs::create_dir_all(&compared_dir)?;

        let inputs = collect_inputs(&self.config.input_dir, &[processed_dir, compared_dir])?;
        if self.locator.is_none() {
            info!("Face detection disabled, body adjustments only");
        }
        info!("Found {} image(s) in {}", inputs.len(), self.config.input_dir.display());

        let outcomes = if self.config.parallel {
            inputs.par_iter().map(|path| self.process_one(path)).collect()
        } else {
            inputs.iter().map(|path| self.process_one(path)).collect()
        };

        Ok(BatchReport {
            calibration: self.calibration,
            adjustments: self.adjustments,
            outcomes,
        })
    }
}

#[cfg(test)]
mod tests {
    use image::Rgb;

    use super::*;
    use crate::adjustment::Adjustment;

    fn adjustments(body: Adjustment, face: Adjustment) -> EffectiveAdjustments {
        EffectiveAdjustments { body, face }
    }

    #[test]
    fn test_face_pass_compounds_on_body_pass() {
        let image = RgbImage::from_pixel(10, 10, Rgb([100, 100, 100]));
        let region = Region::try_new(2, 2, 6, 6, 10, 10).unwrap();
        let both = adjustments(
            Adjustment::new(1.5, 0.0, 0.0).unwrap(),
            Adjustment::new(1.5, 0.0, 0.0).unwrap(),
        );

        let corrected = correct_image(&image, Some(&region), &both).unwrap();

        // 100 * 1.5 * 1.5 inside the face, 100 * 1.5 elsewhere.
        assert_eq!(corrected.get_pixel(3, 3), &Rgb([225, 225, 225]));
        assert_eq!(corrected.get_pixel(0, 0), &Rgb([150, 150, 150]));
        assert_eq!(corrected.get_pixel(6, 6), &Rgb([150, 150, 150]));
    }

    #[test]
    fn test_without_face_only_body_applies() {
        let image = RgbImage::from_pixel(4, 4, Rgb([100, 90, 100]));
        let both = adjustments(
            Adjustment::new(1.0, 20.0, 0.0).unwrap(),
            Adjustment::new(3.0, 0.0, 0.0).unwrap(),
        );

        let corrected = correct_image(&image, None, &both).unwrap();
        assert!(corrected.pixels().all(|p| *p == Rgb([120, 90, 80])));
    }

    #[test]
    fn test_collect_inputs_filters_and_sorts() {
        let dir = tempfile::tempdir().unwrap();
        for name in ["b.JPG", "a.png", "c.txt", "d.gif"] {
            fs::write(dir.path().join(name), b"x").unwrap();
        }
        fs::create_dir(dir.path().join("nested.png")).unwrap();
        let excluded = dir.path().join("d.gif");

        let inputs = collect_inputs(dir.path(), &[excluded]).unwrap();
        let names: Vec<_> = inputs
            .iter()
            .map(|p| p.file_name().unwrap().to_string_lossy().into_owned())
            .collect();
        assert_eq!(names, ["a.png", "b.JPG"]);
    }

    #[test]
    fn test_processor_without_locator_reports_disabled() {
        let processor = BatchProcessor::new(BatchConfig::default(), CalibrationResult::neutral()).unwrap();
        let image = RgbImage::from_pixel(4, 4, Rgb([9, 9, 9]));

        let (corrected, face) = processor.correct(&image);
        assert_eq!(corrected, image);
        assert_eq!(face, FaceOutcome::Disabled);
    }
}
