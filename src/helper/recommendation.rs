use std::str::FromStr;
use crate::helper::shape_classifier::BodyShape;

pub const FALLBACK_RECOMMENDATIONS: [&str; 1] = ["General fashion recommendations"];

const HOURGLASS: [&str; 4] = [
    "Fitted dresses that cinch at the waist",
    "High-waisted pants and skirts",
    "Belted jackets and coats",
    "Wrap dresses and tops",
];

const APPLE: [&str; 4] = [
    "V-neck tops to elongate the torso",
    "Empire waist dresses",
    "Dark colored tops with light bottoms",
    "Structured jackets that define shoulders",
];

const PEAR: [&str; 4] = [
    "A-line skirts to balance proportions",
    "Bootcut or flared jeans",
    "Tops with details on shoulders",
    "Dark bottoms with light tops",
];

const RECTANGLE: [&str; 4] = [
    "Layered outfits to create dimension",
    "Peplum tops to create waist definition",
    "Off-shoulder tops to widen appearance",
    "Belts to create waist emphasis",
];

const INVERTED_TRIANGLE: [&str; 4] = [
    "V-neck tops to elongate the torso",
    "Wide-leg pants to balance shoulders",
    "A-line skirts to add volume to lower body",
    "Dark tops with light bottoms",
];

/// recommendations_for returns the styling suggestions of a body shape.
pub fn recommendations_for(shape: BodyShape) -> &'static [&'static str] {
    match shape {
        BodyShape::Hourglass => &HOURGLASS,
        BodyShape::Apple => &APPLE,
        BodyShape::Pear => &PEAR,
        BodyShape::Rectangle => &RECTANGLE,
        BodyShape::InvertedTriangle => &INVERTED_TRIANGLE,
    }
}

/// recommendations_for_label looks suggestions up by shape label, unknown labels
/// get a single generic suggestion.
pub fn recommendations_for_label(label: &str) -> &'static [&'static str] {
    match BodyShape::from_str(label) {
        Ok(shape) => recommendations_for(shape),
        Err(_) => &FALLBACK_RECOMMENDATIONS,
    }
}


#[cfg(test)]
mod tests {
    use crate::helper::recommendation::{FALLBACK_RECOMMENDATIONS, recommendations_for, recommendations_for_label};
    use crate::helper::shape_classifier::BodyShape;

    #[test]
    fn test_every_shape_has_four_suggestions() {
        for shape in BodyShape::ALL {
            assert_eq!(recommendations_for(shape).len(), 4);
        }
    }

    #[test]
    fn test_order_is_fixed() {
        let pear = recommendations_for(BodyShape::Pear);
        assert_eq!(pear[0], "A-line skirts to balance proportions");
        assert_eq!(pear[3], "Dark bottoms with light tops");
    }

    #[test]
    fn test_lookup_by_label() {
        assert_eq!(recommendations_for_label("Inverted Triangle"), recommendations_for(BodyShape::InvertedTriangle));
        assert_eq!(recommendations_for_label("Diamond"), &FALLBACK_RECOMMENDATIONS);
    }
}
