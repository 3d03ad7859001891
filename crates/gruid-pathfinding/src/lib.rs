//! Multi-modal grid pathfinding for roguelike simulations.
//!
//! An entity moves with one or more [`MovementMode`]s (walking, flying,
//! swimming, …), each with its own base [`MovementCost`] and its own
//! per-cell cost and directionality data on the map. A search finds the
//! cheapest route from a source cell to any cell accepted by a
//! [`TargetEvaluator`], choosing the cheapest mode for every step.
//!
//! | Part | Items |
//! |---|---|
//! | Cost model | [`MovementMode`], [`MovementCost`], [`MovementCostProfile`], [`AggregateMovementCostFactors`] |
//! | Map data | [`MovementCostData2D`], [`MovementCostData3D`], [`MovementDataRegistry`], [`TiledGrid`] |
//! | Goals | [`DefaultTargetEvaluator`], [`LineOfSightTargetEvaluator`] |
//! | Search | [`AStarWorker`], [`Pathfinder`], [`Path`] |
//! | Orchestration | [`PathfinderSource`], [`PathfinderBuilder`], [`Pool`], [`Lease`] |
//!
//! Searches run synchronously on the caller's thread. The node-expansion
//! budget passed to [`Pathfinder::try_find_path`] is the only bound on their
//! cost; a search that runs out of budget reports no path.

mod astar;
mod builder;
mod config;
mod distance;
mod error;
mod los;
mod map;
mod movement;
mod nodes;
mod path;
mod pathfinder;
mod pool;
mod target;
mod tile_cache;

pub use astar::{AStarWorker, ModeLayer};
pub use builder::{PathfinderBuilder, PathfinderSource};
pub use config::PathfinderConfig;
pub use distance::{DistanceMetric, chebyshev, euclidean, manhattan};
pub use error::ConfigError;
pub use los::LineOfSightTargetEvaluator;
pub use map::{BoundedTile, MovementCostData2D, MovementCostData3D, MovementDataRegistry, TiledGrid};
pub use movement::{
    AggregateMovementCostFactors, MovementCost, MovementCostProfile, MovementCostTrait, MovementMode,
    PathfindingMovementCostFactors,
};
pub use path::{Path, PathEnumerator, PathStep};
pub use pathfinder::{FoundPath, Pathfinder, PathfinderDiagnostics};
pub use pool::{Lease, Pool, PoolStats, Poolable};
pub use target::{DefaultTargetEvaluator, TargetEvaluator};
pub use tile_cache::TileCache;
