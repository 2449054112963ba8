pub mod detector;
pub mod landmark;
