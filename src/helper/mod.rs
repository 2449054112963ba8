pub mod body_helper;
pub mod draw_helper;
pub mod recommendation;
pub mod shape_classifier;
