use std::fmt;
use std::str::FromStr;
use serde::{Deserialize, Serialize};
use crate::error::AnalysisError;
use crate::helper::body_helper::BodyMeasurements;

const NARROW_WAIST_RATIO: f64 = 0.75;
const WIDE_WAIST_RATIO: f64 = 0.85;
const BALANCED_LOWER: f64 = 0.95;
const BALANCED_UPPER: f64 = 1.05;

#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum BodyShape {
    Hourglass,
    Apple,
    Pear,
    Rectangle,
    #[serde(rename = "Inverted Triangle")]
    InvertedTriangle,
}

impl BodyShape {
    pub const ALL: [BodyShape; 5] = [
        BodyShape::Hourglass,
        BodyShape::Apple,
        BodyShape::Pear,
        BodyShape::Rectangle,
        BodyShape::InvertedTriangle,
    ];

    pub fn label(self) -> &'static str {
        match self {
            BodyShape::Hourglass => "Hourglass",
            BodyShape::Apple => "Apple",
            BodyShape::Pear => "Pear",
            BodyShape::Rectangle => "Rectangle",
            BodyShape::InvertedTriangle => "Inverted Triangle",
        }
    }
}

impl fmt::Display for BodyShape {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

impl FromStr for BodyShape {
    type Err = AnalysisError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        BodyShape::ALL
            .iter()
            .find(|shape| shape.label() == s)
            .copied()
            .ok_or_else(|| AnalysisError::Classification(format!("unknown body shape `{}`", s)))
    }
}

/// The three proportions the classification is based on.
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct ShapeRatios {
    pub shoulder_hip: f64,
    pub waist_shoulder: f64,
    pub waist_hip: f64,
}

impl ShapeRatios {

    /// from_measurements computes the ratios, rejecting zero or invalid widths.
    ///
    /// # Arguments
    /// * `measurements` - estimated body measurements
    ///
    /// # Returns
    /// * `Result<ShapeRatios, AnalysisError>`
    pub fn from_measurements(measurements: &BodyMeasurements) -> Result<Self, AnalysisError> {
        let BodyMeasurements { shoulder, waist, hips, .. } = *measurements;

        for (name, value) in [("shoulder", shoulder), ("hips", hips)] {
            if !value.is_finite() || value <= 0.0 {
                return Err(AnalysisError::Classification(
                    format!("{} width must be positive, got {}", name, value)
                ))
            }
        }
        if !waist.is_finite() || waist < 0.0 {
            return Err(AnalysisError::Classification(format!("invalid waist width {}", waist)))
        }

        Ok(ShapeRatios {
            shoulder_hip: shoulder / hips,
            waist_shoulder: waist / shoulder,
            waist_hip: waist / hips,
        })
    }

    /// classify applies the decision table, first matching rule wins.
    pub fn classify(&self) -> BodyShape {
        if self.waist_shoulder < NARROW_WAIST_RATIO && self.waist_hip < NARROW_WAIST_RATIO {
            if self.shoulder_hip > BALANCED_LOWER && self.shoulder_hip < BALANCED_UPPER {
                BodyShape::Hourglass
            } else if self.shoulder_hip > BALANCED_UPPER {
                BodyShape::InvertedTriangle
            } else {
                BodyShape::Pear
            }
        } else if self.waist_shoulder > WIDE_WAIST_RATIO && self.waist_hip > WIDE_WAIST_RATIO {
            if self.shoulder_hip > BALANCED_UPPER {
                BodyShape::Apple
            } else {
                BodyShape::Rectangle
            }
        } else {
            BodyShape::Rectangle
        }
    }
}

/// determine_body_shape classifies a measurement set into a body shape.
///
/// # Arguments
/// * `measurements` - estimated body measurements
///
/// # Returns
/// * `Result<BodyShape, AnalysisError>`
pub fn determine_body_shape(measurements: &BodyMeasurements) -> Result<BodyShape, AnalysisError> {
    Ok(ShapeRatios::from_measurements(measurements)?.classify())
}
