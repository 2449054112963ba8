use anyhow::Error;
use async_trait::async_trait;
use opencv::core::Mat;
use crate::pose::landmark::LandmarkSet;

/// Capability interface over a pose estimation backend.
///
/// Implementations are built once at startup and shared read-only between
/// requests, so `detect` takes `&self`. The image is handed over by value so
/// the returned future stays `Send`.
#[async_trait]
pub trait PoseDetector: Send + Sync {
    /// Detects the landmarks of a single figure in a BGR image.
    ///
    /// Returns `Ok(None)` when no figure is found.
    async fn detect(&self, img: Mat) -> Result<Option<LandmarkSet>, Error>;

    /// Whether the backend is able to serve requests.
    async fn is_ready(&self) -> Result<bool, Error> {
        Ok(true)
    }
}

/// Detector returning a fixed answer, whatever the image.
#[derive(Debug, Clone, Default)]
pub struct StaticPoseDetector {
    landmarks: Option<LandmarkSet>,
}

impl StaticPoseDetector {
    pub fn new(landmarks: Option<LandmarkSet>) -> Self {
        StaticPoseDetector { landmarks }
    }
}

#[async_trait]
impl PoseDetector for StaticPoseDetector {
    async fn detect(&self, _img: Mat) -> Result<Option<LandmarkSet>, Error> {
        Ok(self.landmarks.clone())
    }
}


#[cfg(test)]
mod tests {
    use opencv::core::Mat;
    use crate::pose::detector::{PoseDetector, StaticPoseDetector};
    use crate::pose::landmark::{Landmark, LandmarkSet, PoseLandmark};

    #[tokio::test]
    async fn test_static_detector() {
        let mut set = LandmarkSet::new();
        set.insert(PoseLandmark::Nose, Landmark::new(0.5, 0.1));

        let detector = StaticPoseDetector::new(Some(set.clone()));
        assert_eq!(detector.detect(Mat::default()).await.unwrap(), Some(set));
        assert!(detector.is_ready().await.unwrap());

        let empty = StaticPoseDetector::default();
        assert_eq!(empty.detect(Mat::default()).await.unwrap(), None);
    }
}
