use std::sync::Arc;

use gruid_core::{Point, Position, Range};
use gruid_pathfinding::{
    AggregateMovementCostFactors, DistanceMetric, MovementCost, MovementCostData2D, MovementCostData3D,
    MovementDataRegistry, MovementMode, PathfinderConfig, PathfinderSource, TargetEvaluator,
};
use gruid_sense::{ResistanceGrid, ResistanceLayers};

/// A 15×15 room split by a wall at x = 9 spanning y = 3..=11.
fn walled_room() -> (PathfinderSource, Arc<ResistanceLayers>) {
    let room = Range::new(0, 0, 15, 15);
    let wall: Vec<Point> = (3..=11).map(|y| Point::new(9, y)).collect();

    let mut walk = MovementCostData2D::filled(8, room, 1.0);
    let mut sight = ResistanceGrid::new(room);
    for &p in &wall {
        walk.set_cost(p, 0.0);
        sight.set_opaque(p);
    }
    let mut data = MovementCostData3D::new(8);
    data.insert_level(0, walk);
    let mut registry = MovementDataRegistry::new();
    registry.register(MovementMode::WALKING, data);
    let mut layers = ResistanceLayers::new();
    layers.insert(0, sight);

    let source = PathfinderSource::new(Arc::new(registry), PathfinderConfig::default()).unwrap();
    (source, Arc::new(layers))
}

fn walker() -> AggregateMovementCostFactors {
    AggregateMovementCostFactors::new([MovementCost::new(
        MovementMode::WALKING,
        DistanceMetric::Euclidean,
        1.0,
        0,
    )])
}

#[test]
fn cells_behind_the_wall_are_not_targets() {
    let (src, layers) = walled_room();
    let mut los = src.line_of_sight(Position::new(12, 7, 0), 5, layers);
    assert!(los.initialize(Position::new(2, 7, 0), DistanceMetric::Euclidean));
    assert!(los.is_target_node(0, Point::new(12, 7)));
    assert!(los.is_target_node(0, Point::new(10, 7)));
    assert!(!los.is_target_node(0, Point::new(9, 7)));
    assert!(!los.is_target_node(0, Point::new(8, 7)));
    assert!(!los.is_target_node(0, Point::new(12, 13)));
}

#[test]
fn search_stops_at_the_first_cell_with_sight() {
    let (src, layers) = walled_room();
    let target = Position::new(12, 7, 0);
    let from = Position::new(2, 7, 0);

    let los = src.line_of_sight(target, 5, layers);
    let mut pf = src.get_pathfinder().with_target(los).build(&walker()).unwrap();
    let found = pf.try_find_path(from, 10_000).unwrap();

    let end = found.path.last_position();
    assert_ne!(end, target);
    let evaluator = pf.evaluator().unwrap();
    assert!(evaluator.is_target_node(0, end.point()));
    // no cell before the end already had sight of the target
    for (pos, _) in found.path.iter().take(found.path.len() - 1) {
        assert!(!evaluator.is_target_node(0, pos.point()), "{pos} sees the target");
    }
    assert!(found.path.iter().all(|(pos, _)| pos.x != 9 || !(3..=11).contains(&pos.y)));

    let mut targets = Vec::new();
    evaluator.collect_targets(&mut targets);
    assert_eq!(targets[0], target);
    assert!(targets.contains(&end));
}

#[test]
fn evaluators_go_back_to_their_pool() {
    let (src, layers) = walled_room();
    for _ in 0..3 {
        let los = src.line_of_sight(Position::new(12, 7, 0), 4, Arc::clone(&layers));
        let mut pf = src.get_pathfinder().with_target(los).build(&walker()).unwrap();
        assert!(pf.try_find_path(Position::new(1, 1, 0), 10_000).is_some());
    }
    let stats = src.evaluator_stats();
    assert_eq!(stats.created, 1);
    assert_eq!(stats.leased, 3);
    assert_eq!(stats.outstanding(), 0);

    // a recycled evaluator takes the new configuration only
    let los = src.line_of_sight(Position::new(1, 1, 0), 2, layers);
    assert_eq!(los.target(), Some(Position::new(1, 1, 0)));
    assert_eq!(los.radius(), 2);
    assert!(los.field().is_none());
    assert_eq!(src.evaluator_stats().created, 1);
}

#[test]
fn missing_sight_layer_finds_nothing() {
    let (src, _) = walled_room();
    let los = src.line_of_sight(Position::new(12, 7, 0), 5, Arc::new(ResistanceLayers::new()));
    let mut pf = src.get_pathfinder().with_target(los).build(&walker()).unwrap();
    assert!(pf.try_find_path(Position::new(2, 7, 0), 10_000).is_none());
    assert!(!pf.diagnostics().found);
}
