//! Pooled orchestration of searches.
//!
//! ```
//! use std::sync::Arc;
//! use gruid_core::{Position, Range};
//! use gruid_pathfinding::{
//!     AggregateMovementCostFactors, DistanceMetric, MovementCost, MovementCostData2D,
//!     MovementCostData3D, MovementDataRegistry, MovementMode, PathfinderConfig, PathfinderSource,
//! };
//!
//! let mut walking = MovementCostData3D::new(16);
//! walking.insert_level(0, MovementCostData2D::filled(16, Range::new(0, 0, 8, 8), 1.0));
//! let mut registry = MovementDataRegistry::new();
//! registry.register(MovementMode::WALKING, walking);
//!
//! let source = PathfinderSource::new(Arc::new(registry), PathfinderConfig::default()).unwrap();
//! let factors = AggregateMovementCostFactors::new([MovementCost::new(
//!     MovementMode::WALKING,
//!     DistanceMetric::Chebyshev,
//!     1.0,
//!     0,
//! )]);
//!
//! let mut pathfinder = source
//!     .get_pathfinder()
//!     .with_target_position(Position::new(5, 5, 0))
//!     .build(&factors)
//!     .unwrap();
//! let found = pathfinder.try_find_path(Position::new(0, 0, 0), 1000).unwrap();
//! assert_eq!(found.path.len(), 5);
//! assert_eq!(found.cost, 5.0);
//! ```

use std::sync::Arc;

use gruid_core::Position;
use gruid_sense::ResistanceLayers;

use crate::config::PathfinderConfig;
use crate::error::ConfigError;
use crate::los::LineOfSightTargetEvaluator;
use crate::map::MovementDataRegistry;
use crate::movement::AggregateMovementCostFactors;
use crate::path::Path;
use crate::pathfinder::Pathfinder;
use crate::pool::{Lease, Pool, PoolStats, Poolable};
use crate::target::{DefaultTargetEvaluator, TargetEvaluator};

/// Per-lease configuration of one search.
pub struct PathfinderBuilder {
    registry: Arc<MovementDataRegistry>,
    pathfinders: Pool<Pathfinder>,
    evaluator: Option<Box<dyn TargetEvaluator>>,
}

impl PathfinderBuilder {
    /// Use `evaluator` as the goal, replacing any earlier target.
    pub fn with_target(&mut self, evaluator: impl TargetEvaluator + 'static) -> &mut Self {
        self.evaluator = Some(Box::new(evaluator));
        self
    }

    /// Search for exactly `target`.
    pub fn with_target_position(&mut self, target: Position) -> &mut Self {
        self.with_target(DefaultTargetEvaluator::new(target))
    }

    pub fn has_target(&self) -> bool {
        self.evaluator.is_some()
    }

    /// Lease a pathfinder bound to the target and to every mode of `factors`
    /// the registry has data for.
    ///
    /// The target is handed over to the pathfinder; set a new one before
    /// building again.
    pub fn build(&mut self, factors: &AggregateMovementCostFactors) -> Result<Lease<Pathfinder>, ConfigError> {
        let evaluator = self.evaluator.take().ok_or(ConfigError::MissingTarget)?;
        let mut pathfinder = self.pathfinders.lease();
        pathfinder.configure(evaluator);
        for cost in factors {
            match self.registry.get(cost.mode) {
                Some(data) => pathfinder.add_movement_mode(*cost, Arc::clone(data)),
                None => log::trace!("no movement data for mode {}", cost.mode),
            }
        }
        Ok(pathfinder)
    }
}

impl Poolable for PathfinderBuilder {
    fn reset(&mut self) {
        self.evaluator = None;
    }
}

/// Entry point: owns the pools and the movement data registry.
///
/// Pools are single-threaded; use one source per thread.
pub struct PathfinderSource {
    config: PathfinderConfig,
    registry: Arc<MovementDataRegistry>,
    builders: Pool<PathfinderBuilder>,
    pathfinders: Pool<Pathfinder>,
    paths: Pool<Path>,
    line_of_sight: Pool<LineOfSightTargetEvaluator>,
}

impl PathfinderSource {
    pub fn new(registry: Arc<MovementDataRegistry>, config: PathfinderConfig) -> Result<Self, ConfigError> {
        config.validate()?;
        let paths = Pool::new("path", config.path_pool_capacity, Path::new);
        let pathfinders = {
            let paths = paths.clone();
            let config = config.clone();
            Pool::new("pathfinder", config.pathfinder_pool_capacity, move || {
                Pathfinder::new(paths.clone(), &config)
            })
        };
        let builders = {
            let registry = Arc::clone(&registry);
            let pathfinders = pathfinders.clone();
            Pool::new("builder", config.builder_pool_capacity, move || PathfinderBuilder {
                registry: Arc::clone(&registry),
                pathfinders: pathfinders.clone(),
                evaluator: None,
            })
        };
        let line_of_sight = Pool::new(
            "line-of-sight evaluator",
            config.evaluator_pool_capacity,
            LineOfSightTargetEvaluator::new,
        );
        Ok(Self {
            config,
            registry,
            builders,
            pathfinders,
            paths,
            line_of_sight,
        })
    }

    /// Lease a builder for one search.
    pub fn get_pathfinder(&self) -> Lease<PathfinderBuilder> {
        self.builders.lease()
    }

    /// Lease a line-of-sight goal around `target`.
    pub fn line_of_sight(
        &self,
        target: Position,
        radius: i32,
        layers: Arc<ResistanceLayers>,
    ) -> Lease<LineOfSightTargetEvaluator> {
        let mut evaluator = self.line_of_sight.lease();
        evaluator.configure(target, radius, layers);
        evaluator
    }

    pub fn config(&self) -> &PathfinderConfig {
        &self.config
    }

    pub fn registry(&self) -> &Arc<MovementDataRegistry> {
        &self.registry
    }

    pub fn builder_stats(&self) -> PoolStats {
        self.builders.stats()
    }

    pub fn pathfinder_stats(&self) -> PoolStats {
        self.pathfinders.stats()
    }

    pub fn path_stats(&self) -> PoolStats {
        self.paths.stats()
    }

    pub fn evaluator_stats(&self) -> PoolStats {
        self.line_of_sight.stats()
    }
}
