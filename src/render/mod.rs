/// Frame placement and source-over blending.
pub mod composite;
/// Overlay drawing.
pub mod overlay;
