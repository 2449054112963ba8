use std::sync::Arc;
use std::time::Instant;
use opencv::core::{Mat, MatTraitConst};
use serde::{Deserialize, Serialize};
use tracing::{debug, info};
use crate::error::{AnalysisError, Result};
use crate::helper::body_helper::{BodyHelper, BodyMeasurements};
use crate::helper::draw_helper::DrawHelper;
use crate::helper::recommendation::recommendations_for;
use crate::helper::shape_classifier::{BodyShape, determine_body_shape};
use crate::pose::detector::PoseDetector;
use crate::pose::landmark::LandmarkSet;
use crate::utils::image::{decode_base64_payload, decode_image, encode_jpeg_data_uri};
use crate::utils::utils::round_to;

/// Result of one analysis, serialized as the `/analyze` response body.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct BodyShapeReport {
    pub measurements: BodyMeasurements,
    pub body_shape: BodyShape,
    pub recommendations: Vec<String>,
    pub annotated_image: String,
    /// Seconds, rounded to two decimals.
    pub processing_time: f64,
}

/// Landmarks of a decoded image, together with its size.
#[derive(Debug, Clone)]
pub struct DetectedPose {
    pub landmarks: LandmarkSet,
    pub image_width: i32,
    pub image_height: i32,
}

#[derive(Clone)]
pub struct BodyShapePipeline {
    detector: Arc<dyn PoseDetector>,
    body_helper: BodyHelper,
    draw_helper: DrawHelper,
}

impl BodyShapePipeline {

    /// new initializes new instance of the pipeline
    pub fn new(detector: Arc<dyn PoseDetector>, body_helper: BodyHelper, draw_helper: DrawHelper) -> Self {
        BodyShapePipeline {
            detector,
            body_helper,
            draw_helper,
        }
    }

    pub async fn is_ready(&self) -> bool {
        match self.detector.is_ready().await {
            Ok(ready) => ready,
            Err(e) => {
                debug!("pose detector readiness check failed: {:#}", e);
                false
            }
        }
    }

    /// decode turns a base64 data URI into a BGR matrix.
    ///
    /// # Arguments
    /// * `image_data` - `data:image/...;base64,...` string
    ///
    /// # Returns
    /// * `Result<Mat>`
    pub fn decode(&self, image_data: &str) -> Result<Mat> {
        if image_data.trim().is_empty() {
            return Err(AnalysisError::ImageProcessing("image data is empty".to_string()))
        }
        let bytes = decode_base64_payload(image_data)
            .map_err(|e| AnalysisError::ImageProcessing(e.to_string()))?;
        match decode_image(&bytes) {
            Ok(Some(img)) => Ok(img),
            Ok(None) => Err(AnalysisError::InvalidImage),
            Err(e) => Err(AnalysisError::ImageProcessing(e.to_string())),
        }
    }

    /// detect_pose runs the pose detector on a decoded image.
    ///
    /// # Arguments
    /// * `img` - BGR OpenCV matrix, consumed by the detector
    ///
    /// # Returns
    /// * `Result<DetectedPose>`
    pub async fn detect_pose(&self, img: Mat) -> Result<DetectedPose> {
        let (image_width, image_height) = (img.cols(), img.rows());

        let landmarks = self.detector
            .detect(img)
            .await
            .map_err(|e| AnalysisError::Detector(format!("{:#}", e)))?
            .ok_or(AnalysisError::NoFigureDetected)?;

        debug!(count = landmarks.len(), "landmarks detected");
        Ok(DetectedPose { landmarks, image_width, image_height })
    }

    /// measure estimates the body measurements and the body shape of a detected pose.
    ///
    /// # Arguments
    /// * `pose` - landmarks and image size
    ///
    /// # Returns
    /// * `Result<(BodyMeasurements, BodyShape)>`
    pub fn measure(&self, pose: &DetectedPose) -> Result<(BodyMeasurements, BodyShape)> {
        let measurements = self.body_helper.estimate_measurements(
            &pose.landmarks,
            pose.image_width,
            pose.image_height,
        )?;
        let body_shape = determine_body_shape(&measurements)?;
        Ok((measurements, body_shape))
    }

    /// analyze runs the whole pipeline on a base64 encoded photograph.
    ///
    /// # Arguments
    /// * `image_data` - `data:image/...;base64,...` string
    ///
    /// # Returns
    /// * `Result<BodyShapeReport>`
    pub async fn analyze(&self, image_data: &str) -> Result<BodyShapeReport> {
        let start_time = Instant::now();

        let img = self.decode(image_data)?;
        let input = img.try_clone().map_err(|e| AnalysisError::ImageProcessing(e.to_string()))?;
        let pose = self.detect_pose(input).await?;
        let (measurements, body_shape) = self.measure(&pose)?;

        let annotated = self.draw_helper
            .draw_landmarks(&img, &pose.landmarks)
            .and_then(|annotated| encode_jpeg_data_uri(&annotated))
            .map_err(|e| AnalysisError::ImageProcessing(e.to_string()))?;

        let processing_time = round_to(start_time.elapsed().as_secs_f64(), 2);
        info!(%body_shape, ?measurements, processing_time, "body shape analyzed");

        Ok(BodyShapeReport {
            measurements,
            body_shape,
            recommendations: recommendations_for(body_shape).iter().map(|s| s.to_string()).collect(),
            annotated_image: annotated,
            processing_time,
        })
    }
}
