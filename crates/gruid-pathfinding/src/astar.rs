//! Multi-modal A* over tiled movement data.
//!
//! Every mode contributes its own costs and directionality. A move from `p`
//! to `q` in direction `d` is allowed for a mode when `d` is in the mode's
//! outbound set at `p`, in its inbound set at `q`, and the mode's cost at
//! `q` is positive. The move costs `mode.cost * cost(q)`; among the modes
//! allowing it, the cheapest wins.

use std::cmp::Ordering;
use std::collections::BinaryHeap;

use gruid_core::{Direction, DirectionSet, Point, Position};

use crate::map::MovementCostData2D;
use crate::movement::{MovementCost, MovementMode};
use crate::nodes::{NodeGrid, NodeState};
use crate::path::Path;
use crate::target::TargetEvaluator;
use crate::tile_cache::TileCache;

/// The data of one movement mode on the searched level, read through tile
/// caches.
pub struct ModeLayer<'a> {
    cost: MovementCost,
    costs: TileCache<'a, f32>,
    outbound: TileCache<'a, DirectionSet>,
    inbound: TileCache<'a, DirectionSet>,
}

impl<'a> ModeLayer<'a> {
    pub fn new(cost: MovementCost, data: &'a MovementCostData2D) -> Self {
        Self {
            cost,
            costs: TileCache::new(data.costs()),
            outbound: TileCache::new(data.outbound()),
            inbound: TileCache::new(data.inbound()),
        }
    }

    pub fn cost(&self) -> &MovementCost {
        &self.cost
    }

    /// Price of stepping from `from` in direction `d`, if this mode allows it.
    #[inline]
    fn step_cost(&mut self, from: Point, d: Direction) -> Option<f32> {
        if !self.cost.is_valid() || !self.outbound.get(from).contains(d) {
            return None;
        }
        let to = from + d.delta();
        if !self.inbound.get(to).contains(d) {
            return None;
        }
        let c = self.costs.get(to);
        (c > 0.0 && c.is_finite()).then(|| self.cost.cost * c)
    }
}

/// Entry of the open set, popped lowest `f` first, then lowest `h`, then
/// lowest position.
#[derive(Clone, Copy, Debug)]
struct OpenEntry {
    f: f32,
    h: f32,
    g: f32,
    pos: Point,
}

impl Ord for OpenEntry {
    fn cmp(&self, other: &Self) -> Ordering {
        // Reverse so BinaryHeap (max-heap) pops smallest f first.
        other
            .f
            .total_cmp(&self.f)
            .then(other.h.total_cmp(&self.h))
            .then(other.pos.cmp(&self.pos))
    }
}

impl PartialOrd for OpenEntry {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl PartialEq for OpenEntry {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == Ordering::Equal
    }
}

impl Eq for OpenEntry {}

/// Reusable A* state. Buffers survive between searches; nothing is cleared
/// eagerly.
#[derive(Debug)]
pub struct AStarWorker {
    nodes: NodeGrid,
    open: BinaryHeap<OpenEntry>,
    steps: Vec<(Direction, MovementMode)>,
    retained_tiles: usize,
    expanded: usize,
}

impl AStarWorker {
    /// A worker with `tile_size`² node tiles, keeping up to `retained_tiles`
    /// of them between searches.
    pub fn new(tile_size: i32, retained_tiles: usize) -> Self {
        Self {
            nodes: NodeGrid::new(tile_size),
            open: BinaryHeap::new(),
            steps: Vec::new(),
            retained_tiles,
            expanded: 0,
        }
    }

    /// Nodes expanded by the last search.
    pub fn nodes_expanded(&self) -> usize {
        self.expanded
    }

    /// Node tiles currently held.
    pub fn node_tiles(&self) -> usize {
        self.nodes.tile_count()
    }

    /// Search level `z` from `from` until `evaluator` accepts a cell.
    ///
    /// At most `search_limit` nodes are expanded. On success the route is
    /// recorded into `path` and its total cost is returned.
    pub fn search<E: TargetEvaluator + ?Sized>(
        &mut self,
        z: i32,
        from: Point,
        layers: &mut [ModeLayer<'_>],
        evaluator: &E,
        search_limit: usize,
        path: &mut Path,
    ) -> Option<f32> {
        self.nodes.begin(self.retained_tiles);
        self.open.clear();
        self.expanded = 0;

        {
            let start = self.nodes.get_mut(from);
            start.g = 0.0;
            start.state = NodeState::Open;
        }
        let h = evaluator.target_heuristic(z, from);
        self.open.push(OpenEntry {
            f: h,
            h,
            g: 0.0,
            pos: from,
        });

        let goal = loop {
            let current = self.open.pop()?;
            let p = current.pos;
            let g = {
                let node = self.nodes.get_mut(p);
                // Skip stale entries.
                if node.state != NodeState::Open || current.g > node.g {
                    continue;
                }
                node.g
            };

            if evaluator.is_target_node(z, p) {
                break p;
            }
            if self.expanded >= search_limit {
                return None;
            }
            self.expanded += 1;
            self.nodes.get_mut(p).state = NodeState::Closed;

            let dirs = layers
                .iter_mut()
                .fold(DirectionSet::NONE, |acc, l| acc | l.outbound.get(p));
            for d in dirs.iter() {
                let mut best: Option<(f32, i32, usize)> = None;
                for (i, layer) in layers.iter_mut().enumerate() {
                    let Some(step) = layer.step_cost(p, d) else {
                        continue;
                    };
                    let candidate = g + step;
                    let preference = layer.cost.preference;
                    let better = match best {
                        None => true,
                        Some((c, pref, _)) => candidate < c || (candidate == c && preference < pref),
                    };
                    if better {
                        best = Some((candidate, preference, i));
                    }
                }
                let Some((candidate, _, mode)) = best else {
                    continue;
                };

                let q = p + d.delta();
                let node = self.nodes.get_mut(q);
                if candidate >= node.g {
                    continue;
                }
                node.g = candidate;
                node.state = NodeState::Open;
                node.arrived_by = Some(d);
                node.mode = mode;
                let h = evaluator.target_heuristic(z, q);
                self.open.push(OpenEntry {
                    f: candidate + h,
                    h,
                    g: candidate,
                    pos: q,
                });
            }
        };

        // Every step leaves an expanded node, so a longer chain is a cycle.
        self.steps.clear();
        let mut p = goal;
        while let Some(node) = self.nodes.get(p) {
            let Some(d) = node.arrived_by else {
                break;
            };
            if self.steps.len() >= self.expanded {
                log::warn!("parent chain from {goal} does not reach the start, dropping path");
                return None;
            }
            self.steps.push((d, layers[node.mode].cost.mode));
            p = p - d.delta();
        }
        path.begin_record(Position::new(from.x, from.y, z));
        for &(d, mode) in self.steps.iter().rev() {
            path.push_step(d, mode);
        }
        self.nodes.get(goal).map(|n| n.g)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::distance::DistanceMetric;
    use crate::target::DefaultTargetEvaluator;
    use gruid_core::Range;

    fn walk(cost: f32) -> MovementCost {
        MovementCost::new(MovementMode::WALKING, DistanceMetric::Chebyshev, cost, 0)
    }

    fn target(x: i32, y: i32) -> DefaultTargetEvaluator {
        let mut e = DefaultTargetEvaluator::new(Position::new(x, y, 0));
        e.initialize(Position::new(0, 0, 0), DistanceMetric::Chebyshev);
        e
    }

    #[test]
    fn straight_corridor() {
        let data = MovementCostData2D::filled(4, Range::new(0, 0, 10, 1), 1.0);
        let mut layers = [ModeLayer::new(walk(1.0), &data)];
        let mut worker = AStarWorker::new(4, 16);
        let mut path = Path::new();
        let cost = worker.search(0, Point::new(0, 0), &mut layers, &target(9, 0), 1000, &mut path);
        assert_eq!(cost, Some(9.0));
        assert_eq!(path.len(), 9);
        assert!(path.steps().iter().all(|s| s.direction == Direction::East));
        assert_eq!(path.last_position(), Position::new(9, 0, 0));
    }

    #[test]
    fn detours_around_walls() {
        let mut data = MovementCostData2D::filled(4, Range::new(0, 0, 5, 5), 1.0);
        for y in 0..4 {
            data.set_cost(Point::new(2, y), 0.0);
        }
        let mut layers = [ModeLayer::new(walk(1.0), &data)];
        let mut worker = AStarWorker::new(4, 16);
        let mut path = Path::new();
        let cost = worker.search(0, Point::new(0, 0), &mut layers, &target(4, 0), 1000, &mut path);
        // down to row 4, across and back up
        assert_eq!(cost, Some(8.0));
        assert_eq!(path.len(), 8);
        assert!(path.iter().all(|(pos, _)| pos.x != 2 || pos.y == 4));
    }

    #[test]
    fn start_on_target_is_an_empty_path() {
        let data = MovementCostData2D::filled(4, Range::new(0, 0, 3, 3), 1.0);
        let mut layers = [ModeLayer::new(walk(1.0), &data)];
        let mut worker = AStarWorker::new(4, 16);
        let mut path = Path::new();
        let cost = worker.search(0, Point::new(1, 1), &mut layers, &target(1, 1), 0, &mut path);
        assert_eq!(cost, Some(0.0));
        assert!(path.is_empty());
        assert_eq!(worker.nodes_expanded(), 0);
    }

    #[test]
    fn budget_exhaustion_finds_nothing() {
        let data = MovementCostData2D::filled(4, Range::new(0, 0, 20, 1), 1.0);
        let mut layers = [ModeLayer::new(walk(1.0), &data)];
        let mut worker = AStarWorker::new(4, 16);
        let mut path = Path::new();
        let e = target(19, 0);
        assert_eq!(worker.search(0, Point::new(0, 0), &mut layers, &e, 5, &mut path), None);
        assert_eq!(worker.nodes_expanded(), 5);
        assert!(worker.search(0, Point::new(0, 0), &mut layers, &e, 19, &mut path).is_some());
    }

    #[test]
    fn invalid_base_costs_never_move() {
        let data = MovementCostData2D::filled(4, Range::new(0, 0, 6, 1), 1.0);
        for base in [0.0, -1.0, f32::INFINITY] {
            let mut layers = [ModeLayer::new(walk(base), &data)];
            let mut worker = AStarWorker::new(4, 16);
            let mut path = Path::new();
            let cost = worker.search(0, Point::new(0, 0), &mut layers, &target(5, 0), 50, &mut path);
            assert_eq!(cost, None, "base cost {base}");
            assert_eq!(worker.nodes_expanded(), 1);
        }
    }

    #[test]
    fn cheapest_mode_is_recorded_per_step() {
        let land = MovementCostData2D::filled(4, Range::new(0, 0, 3, 1), 1.0);
        // land stops at x = 2; water continues
        let water = MovementCostData2D::filled(4, Range::new(0, 0, 6, 1), 1.0);
        let swim = MovementCost::new(MovementMode::SWIMMING, DistanceMetric::Chebyshev, 3.0, 0);
        let mut layers = [ModeLayer::new(walk(1.0), &land), ModeLayer::new(swim, &water)];
        let mut worker = AStarWorker::new(4, 16);
        let mut path = Path::new();
        let cost = worker.search(0, Point::new(0, 0), &mut layers, &target(5, 0), 100, &mut path);
        assert_eq!(cost, Some(2.0 + 3.0 * 3.0));
        let modes: Vec<_> = path.steps().iter().map(|s| s.mode).collect();
        assert_eq!(
            modes,
            [
                MovementMode::WALKING,
                MovementMode::WALKING,
                MovementMode::SWIMMING,
                MovementMode::SWIMMING,
                MovementMode::SWIMMING
            ]
        );
    }

    #[test]
    fn equal_costs_prefer_lower_preference() {
        let data = MovementCostData2D::filled(4, Range::new(0, 0, 4, 1), 1.0);
        let fly = MovementCost::new(MovementMode::FLYING, DistanceMetric::Chebyshev, 1.0, 1);
        let walking = MovementCost::new(MovementMode::WALKING, DistanceMetric::Chebyshev, 1.0, 5);
        let mut path = Path::new();
        let mut worker = AStarWorker::new(4, 16);

        let mut layers = [ModeLayer::new(walking, &data), ModeLayer::new(fly, &data)];
        worker.search(0, Point::new(0, 0), &mut layers, &target(3, 0), 100, &mut path);
        assert!(path.steps().iter().all(|s| s.mode == MovementMode::FLYING));

        // same preference: registration order decides
        let fly = MovementCost::new(MovementMode::FLYING, DistanceMetric::Chebyshev, 1.0, 5);
        let mut layers = [ModeLayer::new(walking, &data), ModeLayer::new(fly, &data)];
        worker.search(0, Point::new(0, 0), &mut layers, &target(3, 0), 100, &mut path);
        assert!(path.steps().iter().all(|s| s.mode == MovementMode::WALKING));
    }

    #[test]
    fn one_way_cells_are_respected() {
        let mut data = MovementCostData2D::filled(4, Range::new(0, 0, 3, 1), 1.0);
        // the middle cell may only be entered travelling west
        data.set_inbound(Point::new(1, 0), Direction::West.bit());
        let mut layers = [ModeLayer::new(walk(1.0), &data)];
        let mut worker = AStarWorker::new(4, 16);
        let mut path = Path::new();
        assert!(worker.search(0, Point::new(0, 0), &mut layers, &target(2, 0), 100, &mut path).is_none());
        assert_eq!(worker.search(0, Point::new(2, 0), &mut layers, &target(0, 0), 100, &mut path), Some(2.0));
    }
}
