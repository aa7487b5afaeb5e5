pub mod diagnostic_overlay;
pub mod gallery;
