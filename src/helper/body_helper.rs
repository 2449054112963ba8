use serde::{Deserialize, Serialize};
use crate::config::config::MeasurementConfig;
use crate::error::MeasurementError;
use crate::pose::landmark::{LandmarkSet, PoseLandmark};
use crate::utils::utils::round_to;

/// Estimated body measurements in centimeters, rounded to one decimal.
#[derive(Debug, Copy, Clone, PartialEq, Serialize, Deserialize)]
pub struct BodyMeasurements {
    pub shoulder: f64,
    pub waist: f64,
    pub hips: f64,
    pub height: f64,
}

/// Raw distances in image pixels, before scaling.
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct PixelMeasurements {
    pub shoulder: f64,
    pub waist: f64,
    pub hips: f64,
    pub height: f64,
}

#[derive(Debug, Clone)]
pub struct BodyHelper {
    reference_height_cm: f64,
    waist_shoulder_weight: f64,
    waist_hip_weight: f64,
}

impl BodyHelper {

    /// new initializes new instance of body helper module.
    pub fn new(config: MeasurementConfig) -> Self {
        BodyHelper {
            reference_height_cm: config.reference_height_cm,
            waist_shoulder_weight: config.waist_shoulder_weight,
            waist_hip_weight: config.waist_hip_weight,
        }
    }

    /// pixel_measurements measures shoulder, hip and nose-to-ankle distances in pixels.
    ///
    /// The waist is not a landmark, it is approximated from a weighted average of
    /// the shoulder and hip widths.
    ///
    /// # Arguments
    /// * `landmarks` - detected landmarks, normalized coordinates
    /// * `image_width` - image width in pixels
    /// * `image_height` - image height in pixels
    ///
    /// # Returns
    /// * `Result<PixelMeasurements, MeasurementError>`
    pub fn pixel_measurements(&self, landmarks: &LandmarkSet, image_width: i32, image_height: i32) -> Result<PixelMeasurements, MeasurementError> {
        let px = |kind: PoseLandmark| -> Result<_, MeasurementError> {
            Ok(landmarks.require(kind)?.to_pixel(image_width, image_height))
        };

        let left_shoulder = px(PoseLandmark::LeftShoulder)?;
        let right_shoulder = px(PoseLandmark::RightShoulder)?;
        let left_hip = px(PoseLandmark::LeftHip)?;
        let right_hip = px(PoseLandmark::RightHip)?;
        let nose = px(PoseLandmark::Nose)?;
        let left_ankle = px(PoseLandmark::LeftAnkle)?;
        let right_ankle = px(PoseLandmark::RightAnkle)?;

        let shoulder_px = left_shoulder.distance(&right_shoulder);
        let hip_px = left_hip.distance(&right_hip);
        let ankle_center = left_ankle.midpoint(&right_ankle);
        let height_px = nose.distance(&ankle_center);
        let waist_px = (shoulder_px * self.waist_shoulder_weight + hip_px * self.waist_hip_weight) / 2.0;

        Ok(PixelMeasurements {
            shoulder: shoulder_px,
            waist: waist_px,
            hips: hip_px,
            height: height_px,
        })
    }

    /// estimate_measurements converts landmark distances into centimeters.
    ///
    /// Every distance is scaled by `reference_height_cm / height_px`, so the
    /// returned height always equals the reference height.
    ///
    /// # Arguments
    /// * `landmarks` - detected landmarks, normalized coordinates
    /// * `image_width` - image width in pixels
    /// * `image_height` - image height in pixels
    ///
    /// # Returns
    /// * `Result<BodyMeasurements, MeasurementError>`
    pub fn estimate_measurements(&self, landmarks: &LandmarkSet, image_width: i32, image_height: i32) -> Result<BodyMeasurements, MeasurementError> {
        if image_width <= 0 || image_height <= 0 {
            return Err(MeasurementError::DegenerateGeometry(
                format!("image size {}x{} is empty", image_width, image_height)
            ))
        }

        let pixels = self.pixel_measurements(landmarks, image_width, image_height)?;
        if !pixels.height.is_finite() || pixels.height <= f64::EPSILON {
            return Err(MeasurementError::DegenerateGeometry(
                "nose and ankles coincide, body height is zero".to_string()
            ))
        }

        let scale_factor = self.reference_height_cm / pixels.height;

        Ok(BodyMeasurements {
            shoulder: round_to(pixels.shoulder * scale_factor, 1),
            waist: round_to(pixels.waist * scale_factor, 1),
            hips: round_to(pixels.hips * scale_factor, 1),
            height: round_to(pixels.height * scale_factor, 1),
        })
    }
}


#[cfg(test)]
mod tests {
    use crate::config::config::MeasurementConfig;
    use crate::error::MeasurementError;
    use crate::helper::body_helper::BodyHelper;
    use crate::pose::landmark::{Landmark, LandmarkSet, PoseLandmark};

    fn standing_figure() -> LandmarkSet {
        vec![
            (PoseLandmark::Nose, Landmark::new(0.5, 0.125)),
            (PoseLandmark::LeftShoulder, Landmark::new(0.625, 0.25)),
            (PoseLandmark::RightShoulder, Landmark::new(0.375, 0.25)),
            (PoseLandmark::LeftHip, Landmark::new(0.5625, 0.5)),
            (PoseLandmark::RightHip, Landmark::new(0.4375, 0.5)),
            (PoseLandmark::LeftAnkle, Landmark::new(0.5625, 0.875)),
            (PoseLandmark::RightAnkle, Landmark::new(0.4375, 0.875)),
        ].into_iter().collect()
    }

    #[test]
    fn test_pixel_measurements() {
        let helper = BodyHelper::new(MeasurementConfig::new());
        let px = helper.pixel_measurements(&standing_figure(), 1024, 1024).unwrap();

        assert_eq!(px.shoulder, 256.0);
        assert_eq!(px.hips, 128.0);
        assert_eq!(px.height, 768.0);
        assert!((px.waist - 160.0).abs() < 1e-9);
    }

    #[test]
    fn test_estimate_measurements() {
        let helper = BodyHelper::new(MeasurementConfig::new());
        let m = helper.estimate_measurements(&standing_figure(), 1024, 1024).unwrap();

        // scale = 175 / 768
        assert_eq!(m.height, 175.0);
        assert_eq!(m.shoulder, 58.3);
        assert_eq!(m.hips, 29.2);
        assert_eq!(m.waist, 36.5);
        for value in [m.shoulder, m.waist, m.hips, m.height] {
            assert!(value > 0.0);
        }
    }

    #[test]
    fn test_measurements_are_resolution_independent() {
        let helper = BodyHelper::new(MeasurementConfig::new());
        let landmarks = standing_figure();

        let small = helper.estimate_measurements(&landmarks, 640, 480).unwrap();
        let large = helper.estimate_measurements(&landmarks, 1280, 960).unwrap();
        let huge = helper.estimate_measurements(&landmarks, 2560, 1920).unwrap();
        assert_eq!(small, large);
        assert_eq!(small, huge);
    }

    #[test]
    fn test_reference_height_is_configurable() {
        let mut config = MeasurementConfig::new();
        config.reference_height_cm = 160.0;
        let m = BodyHelper::new(config).estimate_measurements(&standing_figure(), 1024, 1024).unwrap();
        assert_eq!(m.height, 160.0);
        assert_eq!(m.shoulder, 53.3);
    }

    #[test]
    fn test_missing_ankle() {
        let mut landmarks = standing_figure();
        landmarks.remove(PoseLandmark::RightAnkle);

        let helper = BodyHelper::new(MeasurementConfig::new());
        let err = helper.estimate_measurements(&landmarks, 1000, 1000).unwrap_err();
        assert_eq!(err, MeasurementError::MissingLandmark(PoseLandmark::RightAnkle));
    }

    #[test]
    fn test_zero_height_is_degenerate() {
        let mut landmarks = standing_figure();
        landmarks.insert(PoseLandmark::Nose, Landmark::new(0.5, 0.875));

        let helper = BodyHelper::new(MeasurementConfig::new());
        match helper.estimate_measurements(&landmarks, 1000, 1000) {
            Err(MeasurementError::DegenerateGeometry(_)) => {}
            other => panic!("expected degenerate geometry, got {:?}", other),
        }
    }

    #[test]
    fn test_empty_image_is_degenerate() {
        let helper = BodyHelper::new(MeasurementConfig::new());
        assert!(matches!(
            helper.estimate_measurements(&standing_figure(), 0, 480),
            Err(MeasurementError::DegenerateGeometry(_))
        ));
    }
}
