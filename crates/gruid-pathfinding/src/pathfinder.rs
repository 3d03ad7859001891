use std::sync::Arc;
use std::time::{Duration, Instant};

use gruid_core::Position;

use crate::astar::{AStarWorker, ModeLayer};
use crate::config::PathfinderConfig;
use crate::distance::DistanceMetric;
use crate::map::MovementCostData3D;
use crate::movement::MovementCost;
use crate::path::Path;
use crate::pool::{Lease, Pool, Poolable};
use crate::target::TargetEvaluator;

/// A successful search: the route and its total cost.
#[derive(Debug)]
pub struct FoundPath {
    pub path: Lease<Path>,
    pub cost: f32,
}

/// Statistics of the last search of a [`Pathfinder`].
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct PathfinderDiagnostics {
    /// Level searched.
    pub level: i32,
    /// Heuristic metric chosen for the search.
    pub metric: DistanceMetric,
    /// Nodes expanded before the search ended.
    pub nodes_expanded: usize,
    /// Expansion budget the search ran with.
    pub search_limit: usize,
    /// Wall-clock time spent.
    pub elapsed: Duration,
    pub found: bool,
}

/// One search request bound to an A* worker.
///
/// A pathfinder is configured with a target evaluator and the movement modes
/// of one entity, then answers [`try_find_path`](Self::try_find_path) calls.
/// It is normally leased from a [`PathfinderBuilder`](crate::PathfinderBuilder);
/// returning it to its pool drops the evaluator and the modes but keeps the
/// worker's buffers.
pub struct Pathfinder {
    evaluator: Option<Box<dyn TargetEvaluator>>,
    modes: Vec<(MovementCost, Arc<MovementCostData3D>)>,
    worker: AStarWorker,
    paths: Pool<Path>,
    default_search_limit: usize,
    diagnostics: PathfinderDiagnostics,
}

impl Pathfinder {
    /// A pathfinder recording its results into paths leased from `paths`.
    pub fn new(paths: Pool<Path>, config: &PathfinderConfig) -> Self {
        Self {
            evaluator: None,
            modes: Vec::new(),
            worker: AStarWorker::new(config.node_tile_size, config.retained_node_tiles),
            paths,
            default_search_limit: config.default_search_limit,
            diagnostics: PathfinderDiagnostics::default(),
        }
    }

    /// Bind `evaluator` as the goal of the following searches.
    pub fn configure(&mut self, mut evaluator: Box<dyn TargetEvaluator>) {
        evaluator.activate();
        self.evaluator = Some(evaluator);
    }

    /// Allow the searches to move with `cost`, reading traversal data from
    /// `data`. Costs that are not positive and finite are ignored.
    pub fn add_movement_mode(&mut self, cost: MovementCost, data: Arc<MovementCostData3D>) {
        if !cost.is_valid() {
            log::trace!("ignoring {} with invalid base cost {}", cost.mode, cost.cost);
            return;
        }
        self.modes.push((cost, data));
    }

    pub fn movement_modes(&self) -> impl Iterator<Item = &MovementCost> {
        self.modes.iter().map(|(cost, _)| cost)
    }

    pub fn evaluator(&self) -> Option<&dyn TargetEvaluator> {
        self.evaluator.as_deref()
    }

    /// The most accurate metric among the modes with data on level `z`.
    pub fn heuristic_metric(&self, z: i32) -> DistanceMetric {
        let usable = self
            .modes
            .iter()
            .filter(|(_, data)| data.level(z).is_some())
            .map(|(cost, _)| cost.metric);
        DistanceMetric::most_accurate(usable).unwrap_or_default()
    }

    pub fn diagnostics(&self) -> &PathfinderDiagnostics {
        &self.diagnostics
    }

    /// [`try_find_path`](Self::try_find_path) with the configured default
    /// budget.
    pub fn find_path(&mut self, from: Position) -> Option<FoundPath> {
        self.try_find_path(from, self.default_search_limit)
    }

    /// Search from `from` on its level, expanding at most `search_limit`
    /// nodes.
    ///
    /// Returns `None` when the goal is unreachable, the budget runs out, or
    /// the evaluator cannot be initialized on the level.
    pub fn try_find_path(&mut self, from: Position, search_limit: usize) -> Option<FoundPath> {
        let started = Instant::now();
        let metric = self.heuristic_metric(from.z);
        self.diagnostics = PathfinderDiagnostics {
            level: from.z,
            metric,
            search_limit,
            ..PathfinderDiagnostics::default()
        };

        let Some(evaluator) = self.evaluator.as_mut() else {
            log::warn!("pathfinder used without a target evaluator");
            return None;
        };
        if !evaluator.initialize(from, metric) {
            log::warn!("target evaluator failed to initialize for origin {from}");
            return None;
        }

        let mut layers: Vec<ModeLayer<'_>> = self
            .modes
            .iter()
            .filter_map(|(cost, data)| data.level(from.z).map(|level| ModeLayer::new(*cost, level)))
            .collect();
        let mut path = self.paths.lease();
        let cost = self.worker.search(
            from.z,
            from.point(),
            &mut layers,
            &**evaluator,
            search_limit,
            &mut path,
        );

        let d = &mut self.diagnostics;
        d.nodes_expanded = self.worker.nodes_expanded();
        d.elapsed = started.elapsed();
        d.found = cost.is_some();
        match cost {
            Some(cost) => log::debug!(
                "path from {from}: {} steps, cost {cost}, {} nodes in {:?}",
                path.len(),
                d.nodes_expanded,
                d.elapsed
            ),
            None => log::debug!(
                "no path from {from}: {} nodes of {} in {:?}",
                d.nodes_expanded,
                search_limit,
                d.elapsed
            ),
        }
        cost.map(|cost| FoundPath { path, cost })
    }
}

impl Poolable for Pathfinder {
    fn reset(&mut self) {
        self.evaluator = None;
        self.modes.clear();
        self.diagnostics = PathfinderDiagnostics::default();
    }
}

impl std::fmt::Debug for Pathfinder {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Pathfinder")
            .field("has_evaluator", &self.evaluator.is_some())
            .field("modes", &self.modes.iter().map(|(c, _)| c.mode).collect::<Vec<_>>())
            .field("worker", &self.worker)
            .field("diagnostics", &self.diagnostics)
            .finish()
    }
}
