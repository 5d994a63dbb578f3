//! Tile layout calculation: how many tiles of a catalog size cover a
//! rectangular area, in which orientation, and where each tile lands.

pub mod catalog;
pub mod constants;
pub mod engine;
pub mod error;
pub mod service;

pub use catalog::{Catalog, SizeEntry, TileSize};
pub use engine::{
    AreaSpec, LayoutEngine, LayoutResult, Tile, choose_orientation, compute_orientation,
};
pub use error::{Result, TilingError};
pub use service::{CalculateRequest, TileService, calculate_json};

pub fn tile_color(color_index: u8) -> String {
    // Three neighbouring hues are enough: adjacent tiles in a row or column
    // never share (x + y) % 3.
    const PALETTE: [&str; 3] = [
        "#d9c3a5", // 0 sand
        "#b8a48c", // 1 clay
        "#e9ddca", // 2 ivory
    ];
    PALETTE[color_index as usize % PALETTE.len()].to_string()
}
