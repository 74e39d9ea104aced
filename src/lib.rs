use std::path::PathBuf;

use serde::Serialize;

use crate::{
    adjustment::region::Region,
    analysis::calibration::CalibrationResult,
    config::EffectiveAdjustments,
};

pub mod error;
pub mod image_utils;
pub mod adjustment;
pub mod analysis;
pub mod batch;
pub mod config;
pub mod detection;
pub mod report;

pub use adjustment::Adjustment;
pub use batch::BatchProcessor;
pub use config::{AdjustmentOverrides, AdjustmentSetting, BatchConfig};

/// What face location produced for one file.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(rename_all = "snake_case", tag = "status", content = "region")]
pub enum FaceOutcome {
    Located(Region),
    /// No usable face; only the body adjustment was applied.
    NotFound,
    /// No detector configured.
    Disabled,
}

#[derive(Debug, Clone)]
pub struct ProcessedFile {
    pub source: PathBuf,
    pub processed_path: PathBuf,
    pub comparison_path: PathBuf,
    pub face: FaceOutcome,
}

#[derive(Debug, Clone)]
pub enum FileOutcome {
    Done(ProcessedFile),
    Failed { source: PathBuf, error: String },
}

impl FileOutcome {
    pub fn source(&self) -> &PathBuf {
        match self {
            FileOutcome::Done(done) => &done.source,
            FileOutcome::Failed { source, .. } => source,
        }
    }

    pub fn is_failure(&self) -> bool {
        matches!(self, FileOutcome::Failed { .. })
    }
}

#[derive(Debug, Clone)]
pub struct BatchReport {
    pub calibration: CalibrationResult,
    pub adjustments: EffectiveAdjustments,
    pub outcomes: Vec<FileOutcome>,
}

impl BatchReport {
    pub fn processed_count(&self) -> usize {
        self.outcomes.iter().filter(|o| !o.is_failure()).count()
    }

    pub fn failure_count(&self) -> usize {
        self.outcomes.iter().filter(|o| o.is_failure()).count()
    }

    pub fn has_failures(&self) -> bool {
        self.outcomes.iter().any(FileOutcome::is_failure)
    }
}
