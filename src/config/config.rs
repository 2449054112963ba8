use std::fs;
use std::path::Path;
use anyhow::{Context, Error};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct PoseDetectionConfig {
    pub triton_url: String,
    pub model_name: String,
    pub timeout: i32,
    pub mean: f32,
    pub scale: f32,
    pub imsize: (i32, i32),
    pub input_name: String,
    pub landmarks_output: String,
    pub score_output: String,
    pub min_detection_confidence: f32,
    pub min_landmark_visibility: f32,
}

impl PoseDetectionConfig {
    pub fn new() -> Self {
        PoseDetectionConfig {
            triton_url: "http://127.0.0.1:8001".to_string(),
            model_name: "pose_landmark".to_string(),
            timeout: 20,
            mean: 0.0,
            scale: 1.0 / 255.0,
            imsize: (256, 256),
            input_name: "input_1".to_string(),
            landmarks_output: "Identity".to_string(),
            score_output: "Identity_1".to_string(),
            min_detection_confidence: 0.7,
            min_landmark_visibility: 0.0,
        }
    }
}

impl Default for PoseDetectionConfig {
    fn default() -> Self {
        Self::new()
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct MeasurementConfig {
    /// Assumed height of the subject, used to turn pixels into centimeters.
    pub reference_height_cm: f64,
    pub waist_shoulder_weight: f64,
    pub waist_hip_weight: f64,
}

impl MeasurementConfig {
    pub fn new() -> Self {
        MeasurementConfig {
            reference_height_cm: 175.0,
            waist_shoulder_weight: 0.8,
            waist_hip_weight: 0.9,
        }
    }
}

impl Default for MeasurementConfig {
    fn default() -> Self {
        Self::new()
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    pub body_limit_bytes: usize,
}

impl ServerConfig {
    pub fn new() -> Self {
        ServerConfig {
            host: "0.0.0.0".to_string(),
            port: 5000,
            body_limit_bytes: 16 * 1024 * 1024,
        }
    }
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self::new()
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct AppConfig {
    pub server: ServerConfig,
    pub pose_detection: PoseDetectionConfig,
    pub measurement: MeasurementConfig,
}

impl AppConfig {
    pub fn new() -> Self {
        AppConfig::default()
    }

    /// from_file reads a JSON configuration file, missing keys keep their defaults.
    ///
    /// # Arguments
    /// * `path` - path of the JSON file
    ///
    /// # Returns
    /// * `Result<AppConfig, Error>`
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self, Error> {
        let path = path.as_ref();
        let raw = fs::read_to_string(path)
            .with_context(|| format!("config - cannot read {}", path.display()))?;
        let config: AppConfig = serde_json::from_str(&raw)
            .with_context(|| format!("config - cannot parse {}", path.display()))?;
        Ok(config)
    }
}


#[cfg(test)]
mod tests {
    use crate::config::config::{AppConfig, MeasurementConfig, PoseDetectionConfig, ServerConfig};

    #[test]
    fn test_partial_config_keeps_defaults() {
        let raw = r#"{"server":{"port":8080},"pose_detection":{"model_name":"blazepose_full"}}"#;
        let config: AppConfig = serde_json::from_str(raw).unwrap();

        assert_eq!(config.server.port, 8080);
        assert_eq!(config.server.host, ServerConfig::new().host);
        assert_eq!(config.pose_detection.model_name, "blazepose_full");
        assert_eq!(config.pose_detection.min_detection_confidence, 0.7);
        assert_eq!(config.measurement, MeasurementConfig::new());
    }

    #[test]
    fn test_from_file() {
        let path = std::env::temp_dir().join("rs_body_shape_pipeline_config_test.json");
        std::fs::write(&path, r#"{"measurement":{"reference_height_cm":160.0}}"#).unwrap();

        let config = AppConfig::from_file(&path).unwrap();
        assert_eq!(config.measurement.reference_height_cm, 160.0);
        assert_eq!(config.measurement.waist_hip_weight, 0.9);
        assert_eq!(config.pose_detection, PoseDetectionConfig::new());

        std::fs::remove_file(&path).unwrap();
    }

    #[test]
    fn test_from_missing_file() {
        assert!(AppConfig::from_file("/nonexistent/body_shape.json").is_err());
    }
}
