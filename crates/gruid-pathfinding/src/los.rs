use std::sync::Arc;

use gruid_core::{Point, Position};
use gruid_sense::{ResistanceLayers, SenseField, ShadowCaster};

use crate::distance::DistanceMetric;
use crate::pool::Poolable;
use crate::target::TargetEvaluator;

/// Goal is any cell that can see the target within `radius`.
///
/// On `initialize` a sense signal is shadow-cast outward from the target
/// over the resistance layer of the search's level; every cell with a
/// nonzero signal, and the target itself, is accepted.
///
/// The heuristic is the metric distance to the target centre. It can
/// overestimate the cost to the nearest accepting cell, so the result is not
/// guaranteed to be optimal. The propagation buffers are expensive, so these
/// evaluators are meant to be leased from a pool.
#[derive(Debug)]
pub struct LineOfSightTargetEvaluator {
    target: Option<Position>,
    radius: i32,
    layers: Option<Arc<ResistanceLayers>>,
    caster: ShadowCaster,
    metric: DistanceMetric,
    ready: bool,
}

impl Default for LineOfSightTargetEvaluator {
    fn default() -> Self {
        Self {
            target: None,
            radius: 0,
            layers: None,
            caster: ShadowCaster::new(),
            metric: DistanceMetric::default(),
            ready: false,
        }
    }
}

impl LineOfSightTargetEvaluator {
    pub fn new() -> Self {
        Self::default()
    }

    /// Aim at `target`, accepting cells within `radius` that the signal
    /// reaches through `layers`.
    pub fn configure(&mut self, target: Position, radius: i32, layers: Arc<ResistanceLayers>) {
        self.target = Some(target);
        self.radius = radius;
        self.layers = Some(layers);
        self.ready = false;
    }

    pub fn target(&self) -> Option<Position> {
        self.target
    }

    pub fn radius(&self) -> i32 {
        self.radius
    }

    /// The field computed by the last successful `initialize`.
    pub fn field(&self) -> Option<&SenseField> {
        self.ready.then(|| self.caster.field())
    }
}

impl TargetEvaluator for LineOfSightTargetEvaluator {
    fn activate(&mut self) {
        self.ready = false;
        self.caster.clear();
    }

    fn initialize(&mut self, origin: Position, metric: DistanceMetric) -> bool {
        self.metric = metric;
        self.ready = false;
        let (Some(target), Some(layers)) = (self.target, self.layers.as_ref()) else {
            return false;
        };
        if target.z != origin.z {
            return false;
        }
        let Some(layer) = layers.layer(target.z) else {
            log::warn!("no sense resistance data on level {}", target.z);
            return false;
        };
        self.caster.propagate(layer, target.point(), self.radius);
        self.ready = true;
        true
    }

    fn is_target_node(&self, z: i32, p: Point) -> bool {
        match self.target {
            Some(t) if self.ready && t.z == z => t.point() == p || self.caster.field().is_lit(p),
            _ => false,
        }
    }

    fn target_heuristic(&self, _z: i32, p: Point) -> f32 {
        match self.target {
            Some(t) => self.metric.distance(p, t.point()),
            None => 0.0,
        }
    }

    fn collect_targets(&self, out: &mut Vec<Position>) {
        let Some(t) = self.target else {
            return;
        };
        if !self.ready {
            return;
        }
        out.push(t);
        let centre = t.point();
        out.extend(
            self.caster
                .field()
                .iter_lit()
                .filter(|&(p, _)| p != centre)
                .map(|(p, _)| t.with_point(p)),
        );
    }
}

impl Poolable for LineOfSightTargetEvaluator {
    fn reset(&mut self) {
        self.target = None;
        self.radius = 0;
        self.layers = None;
        self.metric = DistanceMetric::default();
        self.ready = false;
        self.caster.clear();
    }
}
