//! Resistance maps: how much each cell dampens a propagating sense signal.
//!
//! Resistance is a value in `[0, 1]`. `0` lets the signal pass untouched,
//! `1` (or more) is opaque and stops propagation.

use std::collections::HashMap;

use gruid_core::{Point, Range};

/// Resistance at or above this value blocks propagation.
pub const OPAQUE: f32 = 1.0;

/// Read access to a per-cell sense resistance.
pub trait ResistanceMap {
    /// Resistance of the cell at `p`. Cells the map knows nothing about
    /// should report [`OPAQUE`].
    fn resistance(&self, p: Point) -> f32;

    /// Whether the signal may pass through `p`.
    #[inline]
    fn is_transparent(&self, p: Point) -> bool {
        self.resistance(p) < OPAQUE
    }
}

impl<F: Fn(Point) -> f32> ResistanceMap for F {
    fn resistance(&self, p: Point) -> f32 {
        self(p)
    }
}

/// Dense resistance values over a rectangle.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ResistanceGrid {
    bounds: Range,
    cells: Vec<f32>,
}

impl ResistanceGrid {
    /// A fully transparent grid covering `bounds`.
    pub fn new(bounds: Range) -> Self {
        Self {
            bounds,
            cells: vec![0.0; bounds.len()],
        }
    }

    pub fn bounds(&self) -> Range {
        self.bounds
    }

    /// Set the resistance at `p`, clamped to `[0, 1]`. Out-of-bounds writes
    /// are ignored.
    pub fn set(&mut self, p: Point, resistance: f32) {
        if let Some(i) = self.bounds.index_of(p) {
            self.cells[i] = resistance.clamp(0.0, OPAQUE);
        }
    }

    /// Mark `p` as opaque.
    pub fn set_opaque(&mut self, p: Point) {
        self.set(p, OPAQUE);
    }
}

impl ResistanceMap for ResistanceGrid {
    fn resistance(&self, p: Point) -> f32 {
        match self.bounds.index_of(p) {
            Some(i) => self.cells[i],
            None => OPAQUE,
        }
    }
}

/// Resistance grids for each Z-level of a layered world.
#[derive(Debug, Clone, Default)]
pub struct ResistanceLayers {
    layers: HashMap<i32, ResistanceGrid>,
}

impl ResistanceLayers {
    pub fn new() -> Self {
        Self::default()
    }

    /// Install (or replace) the grid for level `z`.
    pub fn insert(&mut self, z: i32, grid: ResistanceGrid) -> Option<ResistanceGrid> {
        self.layers.insert(z, grid)
    }

    /// The grid for level `z`, if that level has sense data.
    pub fn layer(&self, z: i32) -> Option<&ResistanceGrid> {
        self.layers.get(&z)
    }

    pub fn layer_mut(&mut self, z: i32) -> Option<&mut ResistanceGrid> {
        self.layers.get_mut(&z)
    }
}
