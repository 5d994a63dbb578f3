/// Front-end numeric constants.
/// Values are CSS pixels unless noted otherwise.
/// Horizontal room the preview leaves inside its container.
pub const CONTAINER_GUTTER_PX: f64 = 40.0;
/// Bounds of the exported PNG (device pixels).
pub const EXPORT_MAX_W: f64 = 1400.0;
pub const EXPORT_MAX_H: f64 = 1000.0;
pub const EXPORT_PAD_PX: f64 = 12.0;
/// Tile outline width in the live preview.
pub const TILE_LINE_PX: f64 = 1.0;
