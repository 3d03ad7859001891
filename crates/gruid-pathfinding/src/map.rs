//! Movement map data: per-mode traversal cost and directionality grids.
//!
//! The map streaming side owns and writes these grids; searches only read
//! them. Grids are split into square [`BoundedTile`]s so that sparse or
//! streamed worlds only pay for the chunks that exist.

use std::collections::HashMap;
use std::sync::Arc;

use gruid_core::{Direction, DirectionSet, Point, Range};

use crate::movement::MovementMode;

// ---------------------------------------------------------------------------
// BoundedTile / TiledGrid
// ---------------------------------------------------------------------------

/// A dense square chunk of a [`TiledGrid`].
#[derive(Debug, Clone)]
pub struct BoundedTile<T> {
    bounds: Range,
    cells: Vec<T>,
}

impl<T: Copy> BoundedTile<T> {
    fn new(bounds: Range, fill: T) -> Self {
        Self {
            bounds,
            cells: vec![fill; bounds.len()],
        }
    }

    pub fn bounds(&self) -> Range {
        self.bounds
    }

    #[inline]
    pub fn contains(&self, p: Point) -> bool {
        self.bounds.contains(p)
    }

    /// The value at `p`, or `None` outside the tile.
    #[inline]
    pub fn at(&self, p: Point) -> Option<T> {
        self.bounds.index_of(p).map(|i| self.cells[i])
    }

    fn set(&mut self, p: Point, v: T) {
        if let Some(i) = self.bounds.index_of(p) {
            self.cells[i] = v;
        }
    }
}

/// An unbounded grid stored as lazily created square tiles.
///
/// Cells in tiles that were never written read as the grid's default value.
#[derive(Debug, Clone)]
pub struct TiledGrid<T> {
    tile_size: i32,
    default: T,
    tiles: HashMap<Point, BoundedTile<T>>,
}

impl<T: Copy> TiledGrid<T> {
    /// `tile_size` is clamped to at least 1.
    pub fn new(tile_size: i32, default: T) -> Self {
        Self {
            tile_size: tile_size.max(1),
            default,
            tiles: HashMap::new(),
        }
    }

    pub fn tile_size(&self) -> i32 {
        self.tile_size
    }

    pub fn default_value(&self) -> T {
        self.default
    }

    /// Number of materialised tiles.
    pub fn tile_count(&self) -> usize {
        self.tiles.len()
    }

    #[inline]
    fn tile_key(&self, p: Point) -> Point {
        Point::new(p.x.div_euclid(self.tile_size), p.y.div_euclid(self.tile_size))
    }

    /// The tile covering `p`, if it exists.
    #[inline]
    pub fn tile(&self, p: Point) -> Option<&BoundedTile<T>> {
        self.tiles.get(&self.tile_key(p))
    }

    /// The value at `p`.
    pub fn get(&self, p: Point) -> T {
        self.tile(p).and_then(|t| t.at(p)).unwrap_or(self.default)
    }

    /// Write `v` at `p`, creating the covering tile if needed.
    pub fn set(&mut self, p: Point, v: T) {
        let key = self.tile_key(p);
        let size = self.tile_size;
        let fill = self.default;
        self.tiles
            .entry(key)
            .or_insert_with(|| {
                let min = key * size;
                BoundedTile::new(Range::new(min.x, min.y, min.x + size, min.y + size), fill)
            })
            .set(p, v);
    }

    /// Drop the tile covering `p`, as when a chunk is unloaded.
    pub fn remove_tile(&mut self, p: Point) -> bool {
        let key = self.tile_key(p);
        self.tiles.remove(&key).is_some()
    }
}

// ---------------------------------------------------------------------------
// MovementCostData
// ---------------------------------------------------------------------------

/// Traversal data of one movement mode on one Z-level.
///
/// `costs` holds the per-cell cost multiplier; values `<= 0` mean the cell
/// cannot be entered with this mode. `outbound[p]` contains `d` when leaving
/// `p` towards `p + d` is allowed, `inbound[q]` contains `d` when arriving at
/// `q` while travelling `d` is allowed.
#[derive(Debug, Clone)]
pub struct MovementCostData2D {
    costs: TiledGrid<f32>,
    outbound: TiledGrid<DirectionSet>,
    inbound: TiledGrid<DirectionSet>,
}

impl MovementCostData2D {
    pub fn new(tile_size: i32) -> Self {
        Self {
            costs: TiledGrid::new(tile_size, 0.0),
            outbound: TiledGrid::new(tile_size, DirectionSet::NONE),
            inbound: TiledGrid::new(tile_size, DirectionSet::NONE),
        }
    }

    /// Data with every cell of `range` set to `cost`.
    pub fn filled(tile_size: i32, range: Range, cost: f32) -> Self {
        let mut data = Self::new(tile_size);
        for p in range {
            data.costs.set(p, cost);
        }
        data.recompute_directions(Range::new(
            range.min.x - 1,
            range.min.y - 1,
            range.max.x + 1,
            range.max.y + 1,
        ));
        data
    }

    pub fn costs(&self) -> &TiledGrid<f32> {
        &self.costs
    }

    pub fn outbound(&self) -> &TiledGrid<DirectionSet> {
        &self.outbound
    }

    pub fn inbound(&self) -> &TiledGrid<DirectionSet> {
        &self.inbound
    }

    #[inline]
    pub fn cost(&self, p: Point) -> f32 {
        self.costs.get(p)
    }

    /// Set the cost at `p` and recompute the directionality of `p` and its
    /// eight neighbours. Explicit direction overrides in that area are lost.
    pub fn set_cost(&mut self, p: Point, cost: f32) {
        self.costs.set(p, cost);
        self.recompute_directions(Range::around(p, 1));
    }

    /// Override the directions one may leave `p` by.
    pub fn set_outbound(&mut self, p: Point, dirs: DirectionSet) {
        self.outbound.set(p, dirs);
    }

    /// Override the directions one may arrive at `p` with.
    pub fn set_inbound(&mut self, p: Point, dirs: DirectionSet) {
        self.inbound.set(p, dirs);
    }

    /// Derive directionality from costs over `range`: a move is open when
    /// both its endpoints have a positive cost.
    pub fn recompute_directions(&mut self, range: Range) {
        for p in range {
            let here = self.costs.get(p) > 0.0;
            let mut out = DirectionSet::NONE;
            let mut inb = DirectionSet::NONE;
            if here {
                for d in Direction::ALL {
                    if self.costs.get(p + d.delta()) > 0.0 {
                        out = out.with(d);
                    }
                    if self.costs.get(p - d.delta()) > 0.0 {
                        inb = inb.with(d);
                    }
                }
            }
            // don't materialise empty tiles just to store "nothing"
            if here || self.outbound.tile(p).is_some() {
                self.outbound.set(p, out);
            }
            if here || self.inbound.tile(p).is_some() {
                self.inbound.set(p, inb);
            }
        }
    }
}

/// Traversal data of one movement mode across all Z-levels.
#[derive(Debug, Clone)]
pub struct MovementCostData3D {
    tile_size: i32,
    levels: HashMap<i32, MovementCostData2D>,
}

impl MovementCostData3D {
    pub fn new(tile_size: i32) -> Self {
        Self {
            tile_size: tile_size.max(1),
            levels: HashMap::new(),
        }
    }

    /// The data for level `z`, if that level has been loaded.
    pub fn level(&self, z: i32) -> Option<&MovementCostData2D> {
        self.levels.get(&z)
    }

    /// The data for level `z`, created empty if missing.
    pub fn level_mut(&mut self, z: i32) -> &mut MovementCostData2D {
        let size = self.tile_size;
        self.levels
            .entry(z)
            .or_insert_with(|| MovementCostData2D::new(size))
    }

    pub fn insert_level(&mut self, z: i32, data: MovementCostData2D) -> Option<MovementCostData2D> {
        self.levels.insert(z, data)
    }

    pub fn remove_level(&mut self, z: i32) -> Option<MovementCostData2D> {
        self.levels.remove(&z)
    }
}

// ---------------------------------------------------------------------------
// MovementDataRegistry
// ---------------------------------------------------------------------------

/// Movement data of every mode the map provides.
///
/// Data is shared read-only with searches through `Arc`; the streaming side
/// publishes updates by replacing entries.
#[derive(Debug, Clone, Default)]
pub struct MovementDataRegistry {
    modes: HashMap<MovementMode, Arc<MovementCostData3D>>,
}

impl MovementDataRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn register(&mut self, mode: MovementMode, data: impl Into<Arc<MovementCostData3D>>) {
        self.modes.insert(mode, data.into());
    }

    pub fn unregister(&mut self, mode: MovementMode) -> bool {
        self.modes.remove(&mode).is_some()
    }

    pub fn get(&self, mode: MovementMode) -> Option<&Arc<MovementCostData3D>> {
        self.modes.get(&mode)
    }

    pub fn len(&self) -> usize {
        self.modes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.modes.is_empty()
    }
}
