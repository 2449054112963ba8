use thiserror::Error;
use crate::pose::landmark::PoseLandmark;

/// Failures of the measurement estimator.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum MeasurementError {
    #[error("landmark `{0}` was not detected")]
    MissingLandmark(PoseLandmark),

    #[error("degenerate geometry: {0}")]
    DegenerateGeometry(String),
}

/// Everything that can stop a single analysis request.
///
/// The `Display` output is what the HTTP layer sends back in the `error` field.
#[derive(Error, Debug)]
pub enum AnalysisError {
    #[error("No image provided")]
    MissingImage,

    #[error("Invalid image data")]
    InvalidImage,

    #[error("Image processing error: {0}")]
    ImageProcessing(String),

    #[error("No person detected in the image")]
    NoFigureDetected,

    #[error("Measurement estimation error: {0}")]
    Measurement(#[from] MeasurementError),

    #[error("Body shape determination error: {0}")]
    Classification(String),

    #[error("Pose detection error: {0}")]
    Detector(String),
}

pub type Result<T> = std::result::Result<T, AnalysisError>;


#[cfg(test)]
mod tests {
    use crate::error::{AnalysisError, MeasurementError};
    use crate::pose::landmark::PoseLandmark;

    #[test]
    fn test_wire_messages() {
        assert_eq!(AnalysisError::MissingImage.to_string(), "No image provided");
        assert_eq!(AnalysisError::NoFigureDetected.to_string(), "No person detected in the image");

        let err = AnalysisError::from(MeasurementError::MissingLandmark(PoseLandmark::LeftAnkle));
        assert_eq!(err.to_string(), "Measurement estimation error: landmark `left_ankle` was not detected");
    }
}
