use serde::{Deserialize, Serialize};

use crate::catalog::{Catalog, TileSize};
use crate::constants::{CM2_PER_M2, MAX_TILES, SNAP_EPSILON};
use crate::error::{Result, TilingError};

/// Rectangular area to cover, in catalog length units.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct AreaSpec {
    pub width: f64,
    pub height: f64,
}

impl AreaSpec {
    pub fn new(width: f64, height: f64) -> Self {
        AreaSpec { width, height }
    }

    pub fn validate(&self) -> Result<()> {
        let valid = |v: f64| v.is_finite() && v > 0.0;
        if valid(self.width) && valid(self.height) {
            Ok(())
        } else {
            Err(TilingError::InvalidInput {
                width: self.width,
                height: self.height,
            })
        }
    }
}

/// One placed tile. `(x, y)` is the top-left corner inside the area.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Tile {
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
    /// Presentation hint only, `(col + row) % 3`.
    pub color_index: u8,
}

/// Winning layout for one request.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LayoutResult {
    #[serde(rename = "totalTiles")]
    pub total_tiles: usize,
    /// `true` when the tile is laid as stored, `false` when turned 90 degrees.
    #[serde(rename = "orientation")]
    pub orientation_is_original: bool,
    pub tile_width: f64,
    pub tile_height: f64,
    pub area_width: f64,
    pub area_height: f64,
    /// Square meters of tile bought, partial tiles counted whole.
    #[serde(rename = "totalArea")]
    pub total_area: f64,
    pub tiles: Vec<Tile>,
}

impl LayoutResult {
    /// Tiles that had to be cut at the right or bottom edge.
    pub fn partial_tiles(&self) -> usize {
        self.tiles
            .iter()
            .filter(|t| t.width < self.tile_width || t.height < self.tile_height)
            .count()
    }

    pub fn whole_tiles(&self) -> usize {
        self.total_tiles - self.partial_tiles()
    }

    pub fn orientation_label(&self) -> &'static str {
        if self.orientation_is_original {
            "as stored"
        } else {
            "rotated 90°"
        }
    }
}

/// Resolves size keys against a catalog and lays out the area.
#[derive(Clone, Copy, Debug)]
pub struct LayoutEngine<'a> {
    catalog: &'a Catalog,
}

impl<'a> LayoutEngine<'a> {
    pub fn new(catalog: &'a Catalog) -> Self {
        LayoutEngine { catalog }
    }

    pub fn catalog(&self) -> &'a Catalog {
        self.catalog
    }

    pub fn calculate(&self, area: AreaSpec, size_key: &str) -> Result<LayoutResult> {
        let size = self.catalog.lookup(size_key)?;
        choose_orientation(area, size)
    }
}

/// How one axis splits into whole tiles plus a trailing strip.
#[derive(Clone, Copy, Debug, PartialEq)]
struct AxisSplit {
    whole: u64,
    rem: f64,
}

impl AxisSplit {
    fn new(extent: f64, tile: f64) -> Self {
        let mut whole = (extent / tile).floor();
        let mut rem = extent - whole * tile;
        let eps = tile * SNAP_EPSILON;
        if rem >= tile - eps {
            whole += 1.0;
            rem = 0.0;
        } else if rem <= eps {
            rem = 0.0;
        }
        AxisSplit {
            whole: whole as u64,
            rem,
        }
    }

    /// Grid cells along the axis, partial strip included (the ceiling).
    fn across(&self) -> u64 {
        self.whole.saturating_add(u64::from(self.rem > 0.0))
    }
}

/// Grid partition of an area for one tile orientation, before any tile is
/// materialized.
#[derive(Clone, Copy, Debug, PartialEq)]
struct Partition {
    tile: TileSize,
    cols: AxisSplit,
    rows: AxisSplit,
}

impl Partition {
    fn new(area: AreaSpec, tile: TileSize) -> Self {
        Partition {
            tile,
            cols: AxisSplit::new(area.width, tile.width),
            rows: AxisSplit::new(area.height, tile.height),
        }
    }

    /// Whole cells, edge strips and the corner add up to the ceil-grid.
    fn cell_count(&self) -> u64 {
        self.cols.across().saturating_mul(self.rows.across())
    }

    fn tiles(&self) -> Result<Vec<Tile>> {
        let needed = self.cell_count();
        if needed > MAX_TILES {
            return Err(TilingError::DegenerateGeometry {
                needed,
                limit: MAX_TILES,
            });
        }
        let (tw, th) = (self.tile.width, self.tile.height);
        let (whole_x, whole_y) = (self.cols.whole, self.rows.whole);
        let (rem_w, rem_h) = (self.cols.rem, self.rows.rem);
        let edge_x = whole_x as f64 * tw;
        let edge_y = whole_y as f64 * th;

        let mut tiles = Vec::with_capacity(needed as usize);
        for y in 0..whole_y {
            for x in 0..whole_x {
                tiles.push(place(x, y, x as f64 * tw, y as f64 * th, tw, th));
            }
        }
        // right edge column
        if rem_w > 0.0 {
            for y in 0..whole_y {
                tiles.push(place(whole_x, y, edge_x, y as f64 * th, rem_w, th));
            }
        }
        // bottom edge row
        if rem_h > 0.0 {
            for x in 0..whole_x {
                tiles.push(place(x, whole_y, x as f64 * tw, edge_y, tw, rem_h));
            }
        }
        if rem_w > 0.0 && rem_h > 0.0 {
            tiles.push(place(whole_x, whole_y, edge_x, edge_y, rem_w, rem_h));
        }
        debug_assert_eq!(tiles.len() as u64, needed);
        Ok(tiles)
    }

    fn into_result(self, area: AreaSpec, is_original: bool) -> Result<LayoutResult> {
        let tiles = self.tiles()?;
        let total_tiles = tiles.len();
        Ok(LayoutResult {
            total_tiles,
            orientation_is_original: is_original,
            tile_width: self.tile.width,
            tile_height: self.tile.height,
            area_width: area.width,
            area_height: area.height,
            total_area: total_tiles as f64 * self.tile.width * self.tile.height / CM2_PER_M2,
            tiles,
        })
    }
}

fn place(col: u64, row: u64, x: f64, y: f64, width: f64, height: f64) -> Tile {
    Tile {
        x,
        y,
        width,
        height,
        color_index: ((col + row) % 3) as u8,
    }
}

/// Lay out the area with the tile exactly as given.
pub fn compute_orientation(
    area_width: f64,
    area_height: f64,
    tile_width: f64,
    tile_height: f64,
    is_original: bool,
) -> Result<LayoutResult> {
    let area = AreaSpec::new(area_width, area_height);
    area.validate()?;
    let tile = TileSize::new(tile_width, tile_height);
    if !(tile.width.is_finite() && tile.width > 0.0 && tile.height.is_finite() && tile.height > 0.0)
    {
        return Err(TilingError::InvalidTileSize {
            key: format!("{tile_width}x{tile_height}"),
            width: tile_width,
            height: tile_height,
        });
    }
    Partition::new(area, tile).into_result(area, is_original)
}

/// Compare the tile as stored against the tile turned by 90 degrees and keep
/// the one needing fewer pieces. Ties keep the stored orientation.
///
/// The comparison runs on the partitions, so the losing orientation is never
/// materialized and an oversized loser does not trip the tile limit.
pub fn choose_orientation(area: AreaSpec, size: TileSize) -> Result<LayoutResult> {
    area.validate()?;
    let normal = Partition::new(area, size);
    if size.is_square() {
        return normal.into_result(area, true);
    }
    let rotated = Partition::new(area, size.rotated());
    if normal.cell_count() <= rotated.cell_count() {
        normal.into_result(area, true)
    } else {
        rotated.into_result(area, false)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use proptest::prelude::*;

    fn calc(w: f64, h: f64, key: &str) -> Result<LayoutResult> {
        let catalog = Catalog::default();
        LayoutEngine::new(&catalog).calculate(AreaSpec::new(w, h), key)
    }

    fn overlaps(a: &Tile, b: &Tile) -> bool {
        a.x < b.x + b.width && b.x < a.x + a.width && a.y < b.y + b.height && b.y < a.y + a.height
    }

    #[test]
    fn square_area_exact_fit() {
        let r = calc(100.0, 100.0, "10x10").unwrap();
        assert_eq!(r.total_tiles, 100);
        assert_eq!(r.tiles.len(), 100);
        assert_eq!(r.partial_tiles(), 0);
        assert!(r.orientation_is_original);
        assert_eq!((r.tile_width, r.tile_height), (10.0, 10.0));
        assert!((r.total_area - 1.0).abs() < 1e-12);
    }

    #[test]
    fn right_edge_column_of_partials() {
        let r = calc(95.0, 100.0, "10x10").unwrap();
        assert_eq!(r.total_tiles, 100);
        let partials: Vec<&Tile> = r.tiles.iter().filter(|t| t.width < 10.0).collect();
        assert_eq!(partials.len(), 10);
        for t in partials {
            assert_eq!(t.x, 90.0);
            assert_eq!(t.width, 5.0);
            assert_eq!(t.height, 10.0);
        }
    }

    #[test]
    fn stored_orientation_wins_exact_fit() {
        let r = calc(100.0, 300.0, "10x30").unwrap();
        assert_eq!(r.total_tiles, 100);
        assert!(r.orientation_is_original);
        assert_eq!((r.tile_width, r.tile_height), (10.0, 30.0));

        let rotated = compute_orientation(100.0, 300.0, 30.0, 10.0, false).unwrap();
        assert_eq!(rotated.total_tiles, 120);
    }

    #[test]
    fn rotated_orientation_wins_when_cheaper() {
        let r = calc(300.0, 100.0, "10x30").unwrap();
        assert!(!r.orientation_is_original);
        assert_eq!((r.tile_width, r.tile_height), (30.0, 10.0));
        assert_eq!(r.total_tiles, 100);
        assert_eq!(r.orientation_label(), "rotated 90°");
    }

    #[test]
    fn mixed_remainders_add_up() {
        let r = calc(33.0, 47.0, "15x15").unwrap();
        assert_eq!(r.total_tiles, 12);
        assert_eq!(r.whole_tiles(), 6);
        let right: Vec<&Tile> = r.tiles.iter().filter(|t| t.width == 3.0 && t.height == 15.0).collect();
        let bottom: Vec<&Tile> = r.tiles.iter().filter(|t| t.width == 15.0 && t.height == 2.0).collect();
        let corner: Vec<&Tile> = r.tiles.iter().filter(|t| t.width == 3.0 && t.height == 2.0).collect();
        assert_eq!((right.len(), bottom.len(), corner.len()), (3, 2, 1));
        assert_eq!((corner[0].x, corner[0].y), (30.0, 45.0));
        assert_eq!(corner[0].color_index, ((2 + 3) % 3) as u8);
    }

    #[test]
    fn area_smaller_than_tile_is_one_corner_piece() {
        let r = calc(5.0, 7.0, "10x10").unwrap();
        assert_eq!(r.total_tiles, 1);
        assert_eq!(
            r.tiles[0],
            Tile {
                x: 0.0,
                y: 0.0,
                width: 5.0,
                height: 7.0,
                color_index: 0,
            }
        );
    }

    #[test]
    fn unknown_key_yields_no_result() {
        assert_eq!(
            calc(100.0, 100.0, "99x99"),
            Err(TilingError::InvalidSizeKey("99x99".to_string()))
        );
    }

    #[test]
    fn non_positive_area_fails_fast() {
        assert!(matches!(calc(0.0, 10.0, "10x10"), Err(TilingError::InvalidInput { .. })));
        assert!(matches!(calc(10.0, -1.0, "10x10"), Err(TilingError::InvalidInput { .. })));
        assert!(matches!(
            calc(f64::INFINITY, 10.0, "10x10"),
            Err(TilingError::InvalidInput { .. })
        ));
    }

    #[test]
    fn degenerate_ratio_is_capped() {
        let err = calc(1.0e7, 1.0e7, "10x10").unwrap_err();
        assert_eq!(
            err,
            TilingError::DegenerateGeometry {
                needed: 1_000_000_000_000,
                limit: MAX_TILES,
            }
        );
    }

    #[test]
    fn float_noise_does_not_create_sliver_tiles() {
        // 0.3 m and 2.9 m converted to centimeters carry representation error
        let r = calc(0.3 * 100.0, 2.9 * 100.0, "10x10").unwrap();
        assert_eq!(r.total_tiles, 3 * 29);
        assert_eq!(r.partial_tiles(), 0);
    }

    #[test]
    fn neighbours_never_share_a_color() {
        let r = calc(95.0, 95.0, "10x10").unwrap();
        for a in &r.tiles {
            for b in &r.tiles {
                let right = (a.x + a.width - b.x).abs() < 1e-9 && a.y == b.y;
                let below = (a.y + a.height - b.y).abs() < 1e-9 && a.x == b.x;
                if right || below {
                    assert_ne!(a.color_index, b.color_index);
                }
            }
        }
    }

    #[test]
    fn serializes_with_wire_field_names() {
        let r = calc(20.0, 10.0, "10x10").unwrap();
        let v = serde_json::to_value(&r).unwrap();
        assert_eq!(v["totalTiles"], 2);
        assert_eq!(v["orientation"], true);
        assert_eq!(v["tileWidth"], 10.0);
        assert_eq!(v["areaHeight"], 10.0);
        assert_eq!(v["tiles"][1]["x"], 10.0);
        assert_eq!(v["tiles"][1]["colorIndex"], 1);
        assert!(v.get("totalArea").is_some());
    }

    proptest! {
        #[test]
        fn tiles_cover_area_exactly(
            aw in 1u32..300,
            ah in 1u32..300,
            tw in 1u32..90,
            th in 1u32..90,
        ) {
            let (aw, ah, tw, th) = (aw as f64, ah as f64, tw as f64, th as f64);
            let r = compute_orientation(aw, ah, tw, th, true).unwrap();
            let mut covered = 0.0;
            for t in &r.tiles {
                prop_assert!(t.x >= 0.0 && t.y >= 0.0);
                prop_assert!(t.width > 0.0 && t.width <= tw);
                prop_assert!(t.height > 0.0 && t.height <= th);
                prop_assert!(t.x + t.width <= aw + 1e-9);
                prop_assert!(t.y + t.height <= ah + 1e-9);
                prop_assert!(t.color_index < 3);
                covered += t.width * t.height;
            }
            prop_assert!((covered - aw * ah).abs() < 1e-6 * aw * ah);
        }

        #[test]
        fn small_layouts_never_overlap(
            aw in 1u32..40,
            ah in 1u32..40,
            tw in 2u32..15,
            th in 2u32..15,
        ) {
            let r = compute_orientation(aw as f64, ah as f64, tw as f64, th as f64, true).unwrap();
            for (i, a) in r.tiles.iter().enumerate() {
                for b in &r.tiles[i + 1..] {
                    prop_assert!(!overlaps(a, b));
                }
            }
        }

        #[test]
        fn count_matches_ceil_grid(
            aw in 1u32..2000,
            ah in 1u32..2000,
            tw in 10u32..100,
            th in 10u32..100,
        ) {
            let (aw, ah, tw, th) = (aw as f64, ah as f64, tw as f64, th as f64);
            for (w, h) in [(tw, th), (th, tw)] {
                let r = compute_orientation(aw, ah, w, h, true).unwrap();
                let expected = (aw / w).ceil() * (ah / h).ceil();
                prop_assert_eq!(r.total_tiles as f64, expected);
                prop_assert_eq!(r.total_tiles, r.tiles.len());
            }
        }

        #[test]
        fn winner_is_never_worse_and_ties_keep_stored(
            aw in 1u32..1500,
            ah in 1u32..1500,
            tw in 5u32..100,
            th in 5u32..100,
        ) {
            let (aw, ah, tw, th) = (aw as f64, ah as f64, tw as f64, th as f64);
            let area = AreaSpec::new(aw, ah);
            let chosen = choose_orientation(area, TileSize::new(tw, th)).unwrap();
            let normal = compute_orientation(aw, ah, tw, th, true).unwrap();
            let rotated = compute_orientation(aw, ah, th, tw, false).unwrap();
            prop_assert!(chosen.total_tiles <= normal.total_tiles);
            prop_assert!(chosen.total_tiles <= rotated.total_tiles);
            if normal.total_tiles <= rotated.total_tiles {
                prop_assert!(chosen.orientation_is_original);
                prop_assert_eq!((chosen.tile_width, chosen.tile_height), (tw, th));
            } else {
                prop_assert_eq!((chosen.tile_width, chosen.tile_height), (th, tw));
            }
        }

        #[test]
        fn square_tiles_skip_rotation(aw in 1u32..1000, ah in 1u32..1000, s in 3u32..100) {
            let s = s as f64;
            let r = choose_orientation(AreaSpec::new(aw as f64, ah as f64), TileSize::new(s, s)).unwrap();
            prop_assert!(r.orientation_is_original);
            prop_assert_eq!(r, compute_orientation(aw as f64, ah as f64, s, s, true).unwrap());
        }

        #[test]
        fn exact_multiples_have_no_partials(wx in 1u32..40, wy in 1u32..40, tw in 1u32..60, th in 1u32..60) {
            let (tw, th) = (tw as f64, th as f64);
            let r = compute_orientation(wx as f64 * tw, wy as f64 * th, tw, th, true).unwrap();
            prop_assert_eq!(r.partial_tiles(), 0);
            prop_assert_eq!(r.total_tiles, (wx * wy) as usize);
        }
    }
}
