use gruid_core::Point;

use crate::map::{BoundedTile, TiledGrid};

/// A single-slot cache of the tile last read from a [`TiledGrid`].
///
/// Neighbouring lookups mostly land in the same tile, so keeping one tile
/// reference skips the hash lookup. Any query outside the cached tile's
/// bounds refetches before reading; a cached tile is never used for a point
/// it does not cover.
#[derive(Debug)]
pub struct TileCache<'a, T> {
    grid: &'a TiledGrid<T>,
    current: Option<&'a BoundedTile<T>>,
    fetches: u32,
}

impl<'a, T: Copy> TileCache<'a, T> {
    pub fn new(grid: &'a TiledGrid<T>) -> Self {
        Self {
            grid,
            current: None,
            fetches: 0,
        }
    }

    /// The value at `p`.
    #[inline]
    pub fn get(&mut self, p: Point) -> T {
        if let Some(tile) = self.current {
            if let Some(v) = tile.at(p) {
                return v;
            }
        }
        self.fetches += 1;
        self.current = self.grid.tile(p);
        match self.current {
            Some(tile) => tile.at(p).unwrap_or(self.grid.default_value()),
            None => self.grid.default_value(),
        }
    }

    /// Number of times the cache missed and went back to the grid.
    pub fn fetches(&self) -> u32 {
        self.fetches
    }

    /// Drop the cached tile.
    pub fn invalidate(&mut self) {
        self.current = None;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn grid() -> TiledGrid<i32> {
        let mut g = TiledGrid::new(4, -1);
        for x in 0..8 {
            for y in 0..4 {
                g.set(Point::new(x, y), x * 10 + y);
            }
        }
        g
    }

    #[test]
    fn hits_within_tile_do_not_refetch() {
        let g = grid();
        let mut c = TileCache::new(&g);
        assert_eq!(c.get(Point::new(0, 0)), 0);
        assert_eq!(c.get(Point::new(3, 3)), 33);
        assert_eq!(c.get(Point::new(2, 1)), 21);
        assert_eq!(c.fetches(), 1);
    }

    #[test]
    fn out_of_bounds_query_refetches() {
        let g = grid();
        let mut c = TileCache::new(&g);
        assert_eq!(c.get(Point::new(3, 0)), 30);
        // the neighbouring tile holds different data: must not read stale
        assert_eq!(c.get(Point::new(4, 0)), 40);
        assert_eq!(c.fetches(), 2);
        assert_eq!(c.get(Point::new(3, 0)), 30);
        assert_eq!(c.fetches(), 3);
    }

    #[test]
    fn missing_tiles_read_default_and_are_not_cached() {
        let g = grid();
        let mut c = TileCache::new(&g);
        assert_eq!(c.get(Point::new(-1, 0)), -1);
        assert_eq!(c.get(Point::new(-2, 0)), -1);
        assert_eq!(c.fetches(), 2);
        assert_eq!(c.get(Point::new(1, 1)), 11);
        c.invalidate();
        assert_eq!(c.get(Point::new(1, 1)), 11);
        assert_eq!(c.fetches(), 4);
    }
}
