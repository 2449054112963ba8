use anyhow::Error;
use opencv::core::{Mat, MatTraitConst, Point, Scalar};
use opencv::imgproc::{circle, line, LINE_8};
use crate::pose::landmark::{LandmarkSet, POSE_CONNECTIONS};

#[derive(Debug, Clone)]
pub struct DrawHelper {
    landmark_color: Scalar,
    connection_color: Scalar,
    landmark_radius: i32,
    thickness: i32,
}

impl DrawHelper {
    pub fn new() -> Self {
        // BGR
        DrawHelper {
            landmark_color: Scalar::new(0.0, 0.0, 255.0, 0.0),
            connection_color: Scalar::new(255.0, 255.0, 255.0, 0.0),
            landmark_radius: 2,
            thickness: 2,
        }
    }

    /// draw_landmarks returns a copy of `img` with the skeleton drawn on it.
    ///
    /// Connections touching a missing landmark are skipped.
    ///
    /// # Arguments
    /// * `img` - BGR OpenCV matrix
    /// * `landmarks` - landmarks normalized to `img` dimensions
    ///
    /// # Returns
    /// * `Result<Mat, Error>`
    pub fn draw_landmarks(&self, img: &Mat, landmarks: &LandmarkSet) -> Result<Mat, Error> {
        let mut annotated = img.try_clone()?;
        let (w, h) = (img.cols(), img.rows());

        let to_point = |kind| {
            landmarks.get(kind).map(|lmk| {
                let px = lmk.to_pixel(w, h);
                Point::new(px.x.round() as i32, px.y.round() as i32)
            })
        };

        for (start, end) in POSE_CONNECTIONS.iter() {
            if let (Some(pt1), Some(pt2)) = (to_point(*start), to_point(*end)) {
                line(&mut annotated, pt1, pt2, self.connection_color, self.thickness, LINE_8, 0)?;
            }
        }

        for (kind, _) in landmarks.iter() {
            if let Some(center) = to_point(kind) {
                circle(&mut annotated, center, self.landmark_radius, self.landmark_color, self.thickness, LINE_8, 0)?;
            }
        }

        Ok(annotated)
    }
}

impl Default for DrawHelper {
    fn default() -> Self {
        Self::new()
    }
}
