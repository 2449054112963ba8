use std::fmt;
use serde::{Deserialize, Serialize};
use crate::error::MeasurementError;
use crate::utils::coordinate::Coordinate2D;

pub const NUM_POSE_LANDMARKS: usize = 33;

/// Landmarks of the 33 point BlazePose topology, in model output order.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PoseLandmark {
    Nose = 0,
    LeftEyeInner = 1,
    LeftEye = 2,
    LeftEyeOuter = 3,
    RightEyeInner = 4,
    RightEye = 5,
    RightEyeOuter = 6,
    LeftEar = 7,
    RightEar = 8,
    MouthLeft = 9,
    MouthRight = 10,
    LeftShoulder = 11,
    RightShoulder = 12,
    LeftElbow = 13,
    RightElbow = 14,
    LeftWrist = 15,
    RightWrist = 16,
    LeftPinky = 17,
    RightPinky = 18,
    LeftIndex = 19,
    RightIndex = 20,
    LeftThumb = 21,
    RightThumb = 22,
    LeftHip = 23,
    RightHip = 24,
    LeftKnee = 25,
    RightKnee = 26,
    LeftAnkle = 27,
    RightAnkle = 28,
    LeftHeel = 29,
    RightHeel = 30,
    LeftFootIndex = 31,
    RightFootIndex = 32,
}

impl PoseLandmark {
    pub const ALL: [PoseLandmark; NUM_POSE_LANDMARKS] = [
        PoseLandmark::Nose,
        PoseLandmark::LeftEyeInner,
        PoseLandmark::LeftEye,
        PoseLandmark::LeftEyeOuter,
        PoseLandmark::RightEyeInner,
        PoseLandmark::RightEye,
        PoseLandmark::RightEyeOuter,
        PoseLandmark::LeftEar,
        PoseLandmark::RightEar,
        PoseLandmark::MouthLeft,
        PoseLandmark::MouthRight,
        PoseLandmark::LeftShoulder,
        PoseLandmark::RightShoulder,
        PoseLandmark::LeftElbow,
        PoseLandmark::RightElbow,
        PoseLandmark::LeftWrist,
        PoseLandmark::RightWrist,
        PoseLandmark::LeftPinky,
        PoseLandmark::RightPinky,
        PoseLandmark::LeftIndex,
        PoseLandmark::RightIndex,
        PoseLandmark::LeftThumb,
        PoseLandmark::RightThumb,
        PoseLandmark::LeftHip,
        PoseLandmark::RightHip,
        PoseLandmark::LeftKnee,
        PoseLandmark::RightKnee,
        PoseLandmark::LeftAnkle,
        PoseLandmark::RightAnkle,
        PoseLandmark::LeftHeel,
        PoseLandmark::RightHeel,
        PoseLandmark::LeftFootIndex,
        PoseLandmark::RightFootIndex,
    ];

    pub fn index(self) -> usize {
        self as usize
    }

    pub fn from_index(idx: usize) -> Option<PoseLandmark> {
        PoseLandmark::ALL.get(idx).copied()
    }

    pub fn name(self) -> &'static str {
        match self {
            PoseLandmark::Nose => "nose",
            PoseLandmark::LeftEyeInner => "left_eye_inner",
            PoseLandmark::LeftEye => "left_eye",
            PoseLandmark::LeftEyeOuter => "left_eye_outer",
            PoseLandmark::RightEyeInner => "right_eye_inner",
            PoseLandmark::RightEye => "right_eye",
            PoseLandmark::RightEyeOuter => "right_eye_outer",
            PoseLandmark::LeftEar => "left_ear",
            PoseLandmark::RightEar => "right_ear",
            PoseLandmark::MouthLeft => "mouth_left",
            PoseLandmark::MouthRight => "mouth_right",
            PoseLandmark::LeftShoulder => "left_shoulder",
            PoseLandmark::RightShoulder => "right_shoulder",
            PoseLandmark::LeftElbow => "left_elbow",
            PoseLandmark::RightElbow => "right_elbow",
            PoseLandmark::LeftWrist => "left_wrist",
            PoseLandmark::RightWrist => "right_wrist",
            PoseLandmark::LeftPinky => "left_pinky",
            PoseLandmark::RightPinky => "right_pinky",
            PoseLandmark::LeftIndex => "left_index",
            PoseLandmark::RightIndex => "right_index",
            PoseLandmark::LeftThumb => "left_thumb",
            PoseLandmark::RightThumb => "right_thumb",
            PoseLandmark::LeftHip => "left_hip",
            PoseLandmark::RightHip => "right_hip",
            PoseLandmark::LeftKnee => "left_knee",
            PoseLandmark::RightKnee => "right_knee",
            PoseLandmark::LeftAnkle => "left_ankle",
            PoseLandmark::RightAnkle => "right_ankle",
            PoseLandmark::LeftHeel => "left_heel",
            PoseLandmark::RightHeel => "right_heel",
            PoseLandmark::LeftFootIndex => "left_foot_index",
            PoseLandmark::RightFootIndex => "right_foot_index",
        }
    }
}

impl fmt::Display for PoseLandmark {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Skeleton edges drawn on the annotated image.
pub const POSE_CONNECTIONS: [(PoseLandmark, PoseLandmark); 35] = [
    (PoseLandmark::Nose, PoseLandmark::LeftEyeInner),
    (PoseLandmark::LeftEyeInner, PoseLandmark::LeftEye),
    (PoseLandmark::LeftEye, PoseLandmark::LeftEyeOuter),
    (PoseLandmark::LeftEyeOuter, PoseLandmark::LeftEar),
    (PoseLandmark::Nose, PoseLandmark::RightEyeInner),
    (PoseLandmark::RightEyeInner, PoseLandmark::RightEye),
    (PoseLandmark::RightEye, PoseLandmark::RightEyeOuter),
    (PoseLandmark::RightEyeOuter, PoseLandmark::RightEar),
    (PoseLandmark::MouthLeft, PoseLandmark::MouthRight),
    (PoseLandmark::LeftShoulder, PoseLandmark::RightShoulder),
    (PoseLandmark::LeftShoulder, PoseLandmark::LeftElbow),
    (PoseLandmark::LeftElbow, PoseLandmark::LeftWrist),
    (PoseLandmark::LeftWrist, PoseLandmark::LeftPinky),
    (PoseLandmark::LeftWrist, PoseLandmark::LeftIndex),
    (PoseLandmark::LeftWrist, PoseLandmark::LeftThumb),
    (PoseLandmark::LeftPinky, PoseLandmark::LeftIndex),
    (PoseLandmark::RightShoulder, PoseLandmark::RightElbow),
    (PoseLandmark::RightElbow, PoseLandmark::RightWrist),
    (PoseLandmark::RightWrist, PoseLandmark::RightPinky),
    (PoseLandmark::RightWrist, PoseLandmark::RightIndex),
    (PoseLandmark::RightWrist, PoseLandmark::RightThumb),
    (PoseLandmark::RightPinky, PoseLandmark::RightIndex),
    (PoseLandmark::LeftShoulder, PoseLandmark::LeftHip),
    (PoseLandmark::RightShoulder, PoseLandmark::RightHip),
    (PoseLandmark::LeftHip, PoseLandmark::RightHip),
    (PoseLandmark::LeftHip, PoseLandmark::LeftKnee),
    (PoseLandmark::RightHip, PoseLandmark::RightKnee),
    (PoseLandmark::LeftKnee, PoseLandmark::LeftAnkle),
    (PoseLandmark::RightKnee, PoseLandmark::RightAnkle),
    (PoseLandmark::LeftAnkle, PoseLandmark::LeftHeel),
    (PoseLandmark::RightAnkle, PoseLandmark::RightHeel),
    (PoseLandmark::LeftHeel, PoseLandmark::LeftFootIndex),
    (PoseLandmark::RightHeel, PoseLandmark::RightFootIndex),
    (PoseLandmark::LeftAnkle, PoseLandmark::LeftFootIndex),
    (PoseLandmark::RightAnkle, PoseLandmark::RightFootIndex),
];

/// A single landmark, `x` and `y` normalized to the image width and height.
#[derive(Debug, Copy, Clone, PartialEq, Serialize, Deserialize)]
pub struct Landmark {
    pub x: f32,
    pub y: f32,
    pub z: f32,
    pub visibility: f32,
}

impl Landmark {
    pub fn new(x: f32, y: f32) -> Self {
        Landmark { x, y, z: 0.0, visibility: 1.0 }
    }

    /// to_pixel scales the normalized position into image pixels.
    pub fn to_pixel(&self, image_width: i32, image_height: i32) -> Coordinate2D {
        Coordinate2D::new(
            self.x as f64 * image_width as f64,
            self.y as f64 * image_height as f64,
        )
    }
}

/// Landmarks detected on one figure, keyed by [`PoseLandmark`].
#[derive(Debug, Clone, PartialEq)]
pub struct LandmarkSet {
    landmarks: [Option<Landmark>; NUM_POSE_LANDMARKS],
}

impl LandmarkSet {
    pub fn new() -> Self {
        LandmarkSet { landmarks: [None; NUM_POSE_LANDMARKS] }
    }

    pub fn insert(&mut self, kind: PoseLandmark, landmark: Landmark) {
        self.landmarks[kind.index()] = Some(landmark);
    }

    pub fn remove(&mut self, kind: PoseLandmark) -> Option<Landmark> {
        self.landmarks[kind.index()].take()
    }

    pub fn get(&self, kind: PoseLandmark) -> Option<&Landmark> {
        self.landmarks[kind.index()].as_ref()
    }

    /// require returns the landmark or a `MissingLandmark` error naming it.
    pub fn require(&self, kind: PoseLandmark) -> Result<&Landmark, MeasurementError> {
        self.get(kind).ok_or(MeasurementError::MissingLandmark(kind))
    }

    pub fn len(&self) -> usize {
        self.landmarks.iter().filter(|lmk| lmk.is_some()).count()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn iter(&self) -> impl Iterator<Item = (PoseLandmark, &Landmark)> {
        PoseLandmark::ALL
            .iter()
            .zip(self.landmarks.iter())
            .filter_map(|(kind, lmk)| lmk.as_ref().map(|lmk| (*kind, lmk)))
    }
}

impl Default for LandmarkSet {
    fn default() -> Self {
        Self::new()
    }
}

impl FromIterator<(PoseLandmark, Landmark)> for LandmarkSet {
    fn from_iter<I: IntoIterator<Item = (PoseLandmark, Landmark)>>(iter: I) -> Self {
        let mut set = LandmarkSet::new();
        for (kind, landmark) in iter {
            set.insert(kind, landmark);
        }
        set
    }
}


#[cfg(test)]
mod tests {
    use crate::error::MeasurementError;
    use crate::pose::landmark::{Landmark, LandmarkSet, PoseLandmark, NUM_POSE_LANDMARKS, POSE_CONNECTIONS};

    #[test]
    fn test_landmark_order_matches_index() {
        for (idx, kind) in PoseLandmark::ALL.iter().enumerate() {
            assert_eq!(kind.index(), idx);
            assert_eq!(PoseLandmark::from_index(idx), Some(*kind));
        }
        assert_eq!(PoseLandmark::from_index(NUM_POSE_LANDMARKS), None);
    }

    #[test]
    fn test_landmark_set_lookup() {
        let set: LandmarkSet = vec![
            (PoseLandmark::Nose, Landmark::new(0.5, 0.1)),
            (PoseLandmark::LeftAnkle, Landmark::new(0.45, 0.9)),
        ].into_iter().collect();

        assert_eq!(set.len(), 2);
        assert_eq!(set.get(PoseLandmark::Nose), Some(&Landmark::new(0.5, 0.1)));
        assert_eq!(set.require(PoseLandmark::RightAnkle), Err(MeasurementError::MissingLandmark(PoseLandmark::RightAnkle)));

        let kinds: Vec<PoseLandmark> = set.iter().map(|(kind, _)| kind).collect();
        assert_eq!(kinds, vec![PoseLandmark::Nose, PoseLandmark::LeftAnkle]);
    }

    #[test]
    fn test_to_pixel() {
        let px = Landmark::new(0.25, 0.5).to_pixel(640, 480);
        assert_eq!(px.x, 160.0);
        assert_eq!(px.y, 240.0);
    }

    #[test]
    fn test_connections_are_distinct() {
        for (idx, edge) in POSE_CONNECTIONS.iter().enumerate() {
            assert_ne!(edge.0, edge.1);
            assert!(!POSE_CONNECTIONS[idx + 1..].contains(edge));
        }
    }
}
