//! Sense propagation for grid simulations.
//!
//! A [`ResistanceMap`] tells how much each cell dampens a signal (light,
//! sight, noise). [`ShadowCaster`] spreads a signal from a source with
//! symmetric shadow casting and records the result in a [`SenseField`].
//!
//! ```
//! use gruid_core::{Point, Range};
//! use gruid_sense::{ResistanceGrid, ShadowCaster};
//!
//! let mut map = ResistanceGrid::new(Range::new(0, 0, 10, 10));
//! map.set_opaque(Point::new(5, 4));
//! let mut caster = ShadowCaster::new();
//! let field = caster.propagate(&map, Point::new(4, 4), 3);
//! assert!(field.is_lit(Point::new(3, 4)));
//! assert!(!field.is_lit(Point::new(6, 4)));
//! ```

mod field;
mod resistance;
mod shadow;

pub use field::SenseField;
pub use resistance::{OPAQUE, ResistanceGrid, ResistanceLayers, ResistanceMap};
pub use shadow::{MAX_RADIUS, ShadowCaster};
