pub mod circle;
pub mod horizontal_projection;
