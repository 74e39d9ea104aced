use std::path::PathBuf;

use thiserror::Error;

#[derive(Error, Debug)]
pub enum ToneError {
    #[error("Image loading error: {0}")]
    ImageLoad(#[from] image::ImageError),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Configuration error: {0}")]
    Config(#[from] serde_json::Error),

    #[error("Calibration failed: mean {statistic} of the reference image is zero")]
    DivisionByZero { statistic: &'static str },

    #[error("Calibration failed: {0}")]
    DegenerateReference(String),

    #[error("Region ({left}, {top}, {right}, {bottom}) does not fit inside a {width}x{height} image")]
    InvalidRegion {
        left: i64,
        top: i64,
        right: i64,
        bottom: i64,
        width: u32,
        height: u32,
    },

    #[error("Invalid parameter: {0}")]
    InvalidParameter(String),

    #[error("Face detection error: {0}")]
    FaceDetection(String),

    #[error("{}: {source}", .path.display())]
    FileAccess {
        path: PathBuf,
        #[source]
        source: Box<ToneError>,
    },
}

impl ToneError {
    /// Calibration failures are fatal for a whole batch.
    pub fn is_calibration(&self) -> bool {
        matches!(
            self,
            ToneError::DivisionByZero { .. } | ToneError::DegenerateReference(_)
        )
    }

    pub fn file_access(path: impl Into<PathBuf>, source: ToneError) -> Self {
        ToneError::FileAccess {
            path: path.into(),
            source: Box::new(source),
        }
    }
}

pub type Result<T> = std::result::Result<T, ToneError>;
