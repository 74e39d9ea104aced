pub mod font;
pub mod visualization;

use std::{fs, path::Path};

use serde::Serialize;

use crate::{
    BatchReport, FaceOutcome, FileOutcome,
    adjustment::Adjustment,
    analysis::calibration::CalibrationResult,
    error::Result,
};

#[derive(Serialize)]
pub struct JsonReport {
    pub calibration: CalibrationResult,
    pub body: Adjustment,
    pub face: Adjustment,
    pub processed: usize,
    pub failed: usize,
    pub files: Vec<FileReportSection>,
}

#[derive(Serialize)]
pub struct FileReportSection {
    pub source: String,
    pub processed_path: Option<String>,
    pub comparison_path: Option<String>,
    pub face: Option<FaceOutcome>,
    pub error: Option<String>,
}

impl From<&FileOutcome> for FileReportSection {
    fn from(outcome: &FileOutcome) -> Self {
        match outcome {
            FileOutcome::Done(done) => Self {
                source: done.source.display().to_string(),
                processed_path: Some(done.processed_path.display().to_string()),
                comparison_path: Some(done.comparison_path.display().to_string()),
                face: Some(done.face),
                error: None,
            },
            FileOutcome::Failed { source, error } => Self {
                source: source.display().to_string(),
                processed_path: None,
                comparison_path: None,
                face: None,
                error: Some(error.clone()),
            },
        }
    }
}

impl From<&BatchReport> for JsonReport {
    fn from(report: &BatchReport) -> Self {
        Self {
            calibration: report.calibration,
            body: report.adjustments.body,
            face: report.adjustments.face,
            processed: report.processed_count(),
            failed: report.failure_count(),
            files: report.outcomes.iter().map(FileReportSection::from).collect(),
        }
    }
}

impl JsonReport {
    pub fn to_json(&self) -> std::result::Result<String, serde_json::Error> {
        serde_json::to_string_pretty(self)
    }

    pub fn save<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        fs::write(path, self.to_json()?)?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use std::path::PathBuf;

    use super::*;
    use crate::{ProcessedFile, adjustment::region::Region, config::EffectiveAdjustments};

    #[test]
    fn test_json_report_lists_each_file() {
        let report = BatchReport {
            calibration: CalibrationResult {
                brightness_ratio: 1.1,
                temperature_offset: -4.0,
            },
            adjustments: EffectiveAdjustments {
                body: Adjustment::identity(),
                face: Adjustment::identity(),
            },
            outcomes: vec![
                FileOutcome::Done(ProcessedFile {
                    source: PathBuf::from("in/a.png"),
                    processed_path: PathBuf::from("in/processed/a.png"),
                    comparison_path: PathBuf::from("in/compared/compared_a.png"),
                    face: FaceOutcome::Located(Region {
                        left: 1,
                        top: 2,
                        right: 3,
                        bottom: 4,
                    }),
                }),
                FileOutcome::Failed {
                    source: PathBuf::from("in/b.jpg"),
                    error: "corrupt".into(),
                },
            ],
        };

        let json = JsonReport::from(&report).to_json().unwrap();
        let value: serde_json::Value = serde_json::from_str(&json).unwrap();

        assert_eq!(value["processed"], 1);
        assert_eq!(value["failed"], 1);
        assert_eq!(value["calibration"]["brightness_ratio"], 1.1);
        assert_eq!(value["files"][0]["face"]["status"], "located");
        assert_eq!(value["files"][0]["face"]["region"]["right"], 3);
        assert_eq!(value["files"][1]["error"], "corrupt");
        assert!(value["files"][1]["processed_path"].is_null());
    }
}
