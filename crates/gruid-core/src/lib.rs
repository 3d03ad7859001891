//! **gruid-core**: grid geometry shared by the simulation crates.
//!
//! Provides [`Point`] and [`Range`] for one flat level, [`Position`] for a
//! cell in the layered world, and the eight-way [`Direction`] with its
//! [`DirectionSet`] bitmask used by directionality maps.

pub mod direction;
pub mod geom;

pub use direction::{Direction, DirectionSet};
pub use geom::{Point, Position, Range, RangeIter};
