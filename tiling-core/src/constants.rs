/// Layout-wide numeric constants.
/// Lengths are centimeters unless noted otherwise.
pub const CM2_PER_M2: f64 = 10_000.0;
/// Centimeters per meter, for callers taking user input in meters.
pub const CM_PER_M: f64 = 100.0;
/// Upper bound on the tiles a single layout may materialize.
pub const MAX_TILES: u64 = 250_000;
/// Relative tolerance (of the tile edge) below which a trailing strip is
/// treated as float noise rather than a partial tile.
pub const SNAP_EPSILON: f64 = 1e-9;
