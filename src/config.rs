use std::{
    fs,
    path::{Path, PathBuf},
};

use log::info;
use serde::{Deserialize, Serialize};

use crate::{
    adjustment::Adjustment,
    analysis::calibration::CalibrationResult,
    detection::DetectorParams,
    error::Result,
    report::visualization::RenderConfig,
};

/// Where one adjustable quantity takes its value from.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case", tag = "mode", content = "value")]
pub enum AdjustmentSetting {
    /// Use the calibrated default unchanged.
    #[default]
    Calibrated,
    /// Replace the calibrated default.
    Override(f64),
    /// `base + base * pct / 100` on top of the calibrated default.
    Percent(f64),
}

impl AdjustmentSetting {
    pub fn resolve(&self, base: f64) -> f64 {
        match *self {
            AdjustmentSetting::Calibrated => base,
            AdjustmentSetting::Override(value) => value,
            AdjustmentSetting::Percent(pct) => base + base * (pct / 100.0),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct AdjustmentOverrides {
    pub brightness: AdjustmentSetting,
    pub temperature: AdjustmentSetting,
    pub bronze: AdjustmentSetting,
}

impl AdjustmentOverrides {
    pub fn resolve(&self, calibration: &CalibrationResult) -> Result<Adjustment> {
        Adjustment::new(
            self.brightness.resolve(calibration.brightness_ratio),
            self.temperature.resolve(calibration.temperature_offset),
            self.bronze.resolve(0.0),
        )
    }
}

/// Body and face triples, resolved once per batch and shared read-only.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct EffectiveAdjustments {
    pub body: Adjustment,
    pub face: Adjustment,
}

impl EffectiveAdjustments {
    pub fn resolve(
        calibration: &CalibrationResult,
        body: &AdjustmentOverrides,
        face: &AdjustmentOverrides,
    ) -> Result<Self> {
        Ok(Self {
            body: body.resolve(calibration)?,
            face: face.resolve(calibration)?,
        })
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct BatchConfig {
    pub input_dir: PathBuf,
    pub reference_corrected: PathBuf,
    pub reference_original: PathBuf,
    /// Defaults to `<input_dir>/processed`.
    pub processed_dir: Option<PathBuf>,
    /// Defaults to `<input_dir>/compared`.
    pub compared_dir: Option<PathBuf>,
    pub comparison_prefix: String,
    pub parallel: bool,
    pub body: AdjustmentOverrides,
    pub face: AdjustmentOverrides,
    pub detector: DetectorParams,
    pub render: RenderConfig,
}

impl Default for BatchConfig {
    fn default() -> Self {
        Self {
            input_dir: PathBuf::from("resources"),
            reference_corrected: PathBuf::from("131 OK CORREGIDA.jpg"),
            reference_original: PathBuf::from("Teatro-131.jpg"),
            processed_dir: None,
            compared_dir: None,
            comparison_prefix: "compared_".to_string(),
            parallel: false,
            body: AdjustmentOverrides::default(),
            face: AdjustmentOverrides::default(),
            detector: DetectorParams::default(),
            render: RenderConfig::default(),
        }
    }
}

impl BatchConfig {
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = fs::read_to_string(path.as_ref())?;
        let config = serde_json::from_str::<BatchConfig>(&content)?;
        info!("Loaded configuration from {}", path.as_ref().display());
        Ok(config)
    }

    pub fn save<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        fs::write(path, serde_json::to_string_pretty(self)?)?;
        Ok(())
    }

    pub fn processed_dir(&self) -> PathBuf {
        self.processed_dir
            .clone()
            .unwrap_or_else(|| self.input_dir.join("processed"))
    }

    pub fn compared_dir(&self) -> PathBuf {
        self.compared_dir
            .clone()
            .unwrap_or_else(|| self.input_dir.join("compared"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ToneError;

    fn calibration() -> CalibrationResult {
        CalibrationResult {
            brightness_ratio: 1.2,
            temperature_offset: 40.0,
        }
    }

    #[test]
    fn test_calibrated_defaults_apply_when_nothing_overridden() {
        let adjustment = AdjustmentOverrides::default().resolve(&calibration()).unwrap();
        assert_eq!(adjustment, Adjustment::new(1.2, 40.0, 0.0).unwrap());
    }

    #[test]
    fn test_override_replaces_only_its_own_channel() {
        let overrides = AdjustmentOverrides {
            temperature: AdjustmentSetting::Override(-15.0),
            bronze: AdjustmentSetting::Override(30.0),
            ..Default::default()
        };
        let adjustment = overrides.resolve(&calibration()).unwrap();
        assert_eq!(adjustment.brightness, 1.2);
        assert_eq!(adjustment.temperature, -15.0);
        assert_eq!(adjustment.bronze, 30.0);
    }

    #[test]
    fn test_percent_delta_scales_calibrated_base() {
        assert_eq!(AdjustmentSetting::Percent(50.0).resolve(40.0), 60.0);
        assert_eq!(AdjustmentSetting::Percent(-25.0).resolve(40.0), 30.0);
        // Bronze has a zero base, so a delta leaves it at zero.
        assert_eq!(AdjustmentSetting::Percent(80.0).resolve(0.0), 0.0);
    }

    #[test]
    fn test_body_and_face_resolve_independently() {
        let face = AdjustmentOverrides {
            brightness: AdjustmentSetting::Override(1.5),
            ..Default::default()
        };
        let effective =
            EffectiveAdjustments::resolve(&calibration(), &AdjustmentOverrides::default(), &face).unwrap();
        assert_eq!(effective.body.brightness, 1.2);
        assert_eq!(effective.face.brightness, 1.5);
        assert_eq!(effective.face.temperature, 40.0);
    }

    #[test]
    fn test_invalid_override_is_rejected() {
        let body = AdjustmentOverrides {
            bronze: AdjustmentSetting::Override(150.0),
            ..Default::default()
        };
        let err = EffectiveAdjustments::resolve(&calibration(), &body, &AdjustmentOverrides::default())
            .unwrap_err();
        assert!(matches!(err, ToneError::InvalidParameter(_)));
    }

    #[test]
    fn test_config_reads_partial_json() {
        let config: BatchConfig = serde_json::from_str(
            r#"{
                "input_dir": "shots",
                "parallel": true,
                "face": { "bronze": { "mode": "override", "value": 20.0 } }
            }"#,
        )
        .unwrap();

        assert_eq!(config.input_dir, PathBuf::from("shots"));
        assert!(config.parallel);
        assert_eq!(config.face.bronze, AdjustmentSetting::Override(20.0));
        assert_eq!(config.body.brightness, AdjustmentSetting::Calibrated);
        assert_eq!(config.processed_dir(), PathBuf::from("shots").join("processed"));
        assert_eq!(config.compared_dir(), PathBuf::from("shots").join("compared"));
        assert_eq!(config.comparison_prefix, "compared_");
    }

    #[test]
    fn test_config_round_trips_through_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.json");

        let mut config = BatchConfig::default();
        config.body.temperature = AdjustmentSetting::Percent(10.0);
        config.save(&path).unwrap();

        let loaded = BatchConfig::load(&path).unwrap();
        assert_eq!(loaded.body.temperature, AdjustmentSetting::Percent(10.0));
        assert_eq!(loaded.reference_original, PathBuf::from("Teatro-131.jpg"));
    }
}
