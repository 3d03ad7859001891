//! Pluggable search goals.

use gruid_core::{Point, Position};

use crate::distance::DistanceMetric;
use crate::pool::{Lease, Poolable};

/// Decides where a search ends and estimates the remaining cost.
///
/// One evaluator serves one search at a time. [`activate`](Self::activate)
/// is called when it is bound to a pathfinder, [`initialize`](Self::initialize)
/// at the start of every search.
pub trait TargetEvaluator {
    /// Forget state of any previous search.
    fn activate(&mut self) {}

    /// Prepare a search starting at `origin` whose heuristic uses `metric`.
    /// Returns `false` when the goal cannot be evaluated on `origin`'s level,
    /// which makes the search report no path.
    fn initialize(&mut self, origin: Position, metric: DistanceMetric) -> bool;

    /// Whether `p` on level `z` satisfies the goal.
    fn is_target_node(&self, z: i32, p: Point) -> bool;

    /// Estimated remaining cost from `p` on level `z`.
    fn target_heuristic(&self, z: i32, p: Point) -> f32;

    /// Append the concrete goal cells to `out`.
    fn collect_targets(&self, out: &mut Vec<Position>);
}

impl<T: TargetEvaluator + ?Sized> TargetEvaluator for Box<T> {
    fn activate(&mut self) {
        (**self).activate()
    }

    fn initialize(&mut self, origin: Position, metric: DistanceMetric) -> bool {
        (**self).initialize(origin, metric)
    }

    fn is_target_node(&self, z: i32, p: Point) -> bool {
        (**self).is_target_node(z, p)
    }

    fn target_heuristic(&self, z: i32, p: Point) -> f32 {
        (**self).target_heuristic(z, p)
    }

    fn collect_targets(&self, out: &mut Vec<Position>) {
        (**self).collect_targets(out)
    }
}

/// A leased evaluator goes back to its pool once the pathfinder drops it.
impl<T: TargetEvaluator + Poolable> TargetEvaluator for Lease<T> {
    fn activate(&mut self) {
        (**self).activate()
    }

    fn initialize(&mut self, origin: Position, metric: DistanceMetric) -> bool {
        (**self).initialize(origin, metric)
    }

    fn is_target_node(&self, z: i32, p: Point) -> bool {
        (**self).is_target_node(z, p)
    }

    fn target_heuristic(&self, z: i32, p: Point) -> f32 {
        (**self).target_heuristic(z, p)
    }

    fn collect_targets(&self, out: &mut Vec<Position>) {
        (**self).collect_targets(out)
    }
}

/// Goal is one fixed cell; the heuristic is the metric distance to it.
#[derive(Debug, Clone, Default)]
pub struct DefaultTargetEvaluator {
    target: Option<Position>,
    metric: DistanceMetric,
}

impl DefaultTargetEvaluator {
    pub fn new(target: Position) -> Self {
        Self {
            target: Some(target),
            metric: DistanceMetric::default(),
        }
    }

    pub fn set_target(&mut self, target: Position) {
        self.target = Some(target);
    }

    pub fn clear_target(&mut self) {
        self.target = None;
    }

    pub fn target(&self) -> Option<Position> {
        self.target
    }

    pub fn metric(&self) -> DistanceMetric {
        self.metric
    }
}

impl TargetEvaluator for DefaultTargetEvaluator {
    fn activate(&mut self) {
        self.metric = DistanceMetric::default();
    }

    fn initialize(&mut self, origin: Position, metric: DistanceMetric) -> bool {
        self.metric = metric;
        self.target.is_some_and(|t| t.z == origin.z)
    }

    fn is_target_node(&self, z: i32, p: Point) -> bool {
        self.target.is_some_and(|t| t.z == z && t.point() == p)
    }

    fn target_heuristic(&self, _z: i32, p: Point) -> f32 {
        match self.target {
            Some(t) => self.metric.distance(p, t.point()),
            None => 0.0,
        }
    }

    fn collect_targets(&self, out: &mut Vec<Position>) {
        out.extend(self.target);
    }
}

impl Poolable for DefaultTargetEvaluator {
    fn reset(&mut self) {
        self.target = None;
        self.metric = DistanceMetric::default();
    }
}
