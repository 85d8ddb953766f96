//! Terrain grid
//!
//! Tiles are keyed by quantized coordinates; a tile covers a 32x32 world
//! unit square. Anything outside the generated grid is impassable.

use std::collections::HashMap;

use crate::geometry::Vec2;

/// Edge length of one tile in world units.
pub const TILE_SIZE: f64 = 32.0;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TerrainKind {
    Grass,
    Sand,
    Water,
}

#[derive(Debug, Clone, Copy)]
pub struct TerrainTile {
    pub kind: TerrainKind,
}

impl TerrainTile {
    pub fn is_passable(&self) -> bool {
        self.kind != TerrainKind::Water
    }
}

/// The world's tile grid.
pub struct TerrainGrid {
    width_tiles: u32,
    height_tiles: u32,
    tiles: HashMap<(i32, i32), TerrainTile>,
}

impl TerrainGrid {
    /// Builds a flat grid, optionally ringed by water. Tile (0,0) covers
    /// world coordinates [0, 32) on both axes.
    pub fn generate(width_tiles: u32, height_tiles: u32, water_border: bool) -> Self {
        let mut tiles = HashMap::new();
        for ty in 0..height_tiles as i32 {
            for tx in 0..width_tiles as i32 {
                let on_border = tx == 0
                    || ty == 0
                    || tx == width_tiles as i32 - 1
                    || ty == height_tiles as i32 - 1;
                let kind = if water_border && on_border {
                    TerrainKind::Water
                } else {
                    TerrainKind::Grass
                };
                tiles.insert((tx, ty), TerrainTile { kind });
            }
        }
        Self {
            width_tiles,
            height_tiles,
            tiles,
        }
    }

    pub fn width_tiles(&self) -> u32 {
        self.width_tiles
    }

    pub fn height_tiles(&self) -> u32 {
        self.height_tiles
    }

    /// World-space center of the grid.
    pub fn center(&self) -> Vec2 {
        Vec2::new(
            f64::from(self.width_tiles) * TILE_SIZE / 2.0,
            f64::from(self.height_tiles) * TILE_SIZE / 2.0,
        )
    }

    /// The tile containing `point`, if the point lies on the grid.
    pub fn tile_at(&self, point: Vec2) -> Option<&TerrainTile> {
        let tx = (point.x / TILE_SIZE).floor() as i32;
        let ty = (point.y / TILE_SIZE).floor() as i32;
        self.tiles.get(&(tx, ty))
    }

    pub fn set_tile(&mut self, tx: i32, ty: i32, kind: TerrainKind) {
        self.tiles.insert((tx, ty), TerrainTile { kind });
    }

    pub fn is_passable(&self, point: Vec2) -> bool {
        self.tile_at(point).map_or(false, TerrainTile::is_passable)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_points_outside_grid_are_impassable() {
        let grid = TerrainGrid::generate(4, 4, false);
        assert!(grid.is_passable(Vec2::new(64.0, 64.0)));
        assert!(!grid.is_passable(Vec2::new(-1.0, 10.0)));
        assert!(!grid.is_passable(Vec2::new(10.0, 4.0 * TILE_SIZE)));
    }

    #[test]
    fn test_water_border_blocks_movement() {
        let grid = TerrainGrid::generate(4, 4, true);
        assert!(!grid.is_passable(Vec2::new(10.0, 10.0)));
        assert!(grid.is_passable(Vec2::new(40.0, 40.0)));
    }

    #[test]
    fn test_tile_quantization() {
        let grid = TerrainGrid::generate(4, 4, false);
        // 31.9 and 32.0 land on different tiles.
        let a = grid.tile_at(Vec2::new(31.9, 0.0));
        let b = grid.tile_at(Vec2::new(32.0, 0.0));
        assert!(a.is_some() && b.is_some());
        assert_eq!(grid.center(), Vec2::new(64.0, 64.0));
    }

    #[test]
    fn test_set_tile_overrides_kind() {
        let mut grid = TerrainGrid::generate(4, 4, false);
        grid.set_tile(1, 1, TerrainKind::Water);
        assert!(!grid.is_passable(Vec2::new(40.0, 40.0)));
    }
}
