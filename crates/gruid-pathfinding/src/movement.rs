//! Movement cost model: modes, per-mode costs and per-entity aggregates.

use std::cmp::Ordering;
use std::fmt;
use std::hash::{Hash, Hasher};

use crate::distance::DistanceMetric;

// ---------------------------------------------------------------------------
// MovementMode
// ---------------------------------------------------------------------------

/// A way of traversing terrain (walking, flying, swimming, …).
///
/// Identity is the numeric id; the name is only used for display and as a
/// deterministic tie-break when ordering costs.
#[derive(Copy, Clone, Debug)]
pub struct MovementMode {
    id: u16,
    name: &'static str,
}

impl MovementMode {
    pub const WALKING: Self = Self::new(0, "walking");
    pub const FLYING: Self = Self::new(1, "flying");
    pub const SWIMMING: Self = Self::new(2, "swimming");
    pub const ETHEREAL: Self = Self::new(3, "ethereal");

    /// The modes known to every game.
    pub const BUILTIN: [MovementMode; 4] = [Self::WALKING, Self::FLYING, Self::SWIMMING, Self::ETHEREAL];

    /// Define a game-specific mode. Ids must be unique per game.
    pub const fn new(id: u16, name: &'static str) -> Self {
        Self { id, name }
    }

    /// The built-in mode with `id`, or an unnamed game-specific one.
    pub fn from_id(id: u16) -> Self {
        Self::BUILTIN
            .into_iter()
            .find(|m| m.id == id)
            .unwrap_or(Self::new(id, "custom"))
    }

    #[inline]
    pub const fn id(self) -> u16 {
        self.id
    }

    #[inline]
    pub const fn name(self) -> &'static str {
        self.name
    }
}

impl PartialEq for MovementMode {
    fn eq(&self, other: &Self) -> bool {
        self.id == other.id
    }
}

impl Eq for MovementMode {}

impl Hash for MovementMode {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.id.hash(state);
    }
}

impl fmt::Display for MovementMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name)
    }
}

// Modes travel as their id; names are restored for the built-in ones.
#[cfg(feature = "serde")]
impl serde::Serialize for MovementMode {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_u16(self.id)
    }
}

#[cfg(feature = "serde")]
impl<'de> serde::Deserialize<'de> for MovementMode {
    fn deserialize<D: serde::Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        <u16 as serde::Deserialize>::deserialize(deserializer).map(MovementMode::from_id)
    }
}

// ---------------------------------------------------------------------------
// MovementCost
// ---------------------------------------------------------------------------

/// Base traversal cost of one movement mode for one entity.
///
/// Ordered by ascending `cost`, then ascending `preference`, then by mode
/// name. A cost `<= 0` means "no traversal data", never "free".
#[derive(Copy, Clone, Debug)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct MovementCost {
    pub mode: MovementMode,
    pub metric: DistanceMetric,
    pub cost: f32,
    pub preference: i32,
}

impl MovementCost {
    pub const fn new(mode: MovementMode, metric: DistanceMetric, cost: f32, preference: i32) -> Self {
        Self {
            mode,
            metric,
            cost,
            preference,
        }
    }

    /// Whether the cost is usable for traversal.
    #[inline]
    pub fn is_valid(&self) -> bool {
        self.cost > 0.0 && self.cost.is_finite()
    }
}

impl PartialEq for MovementCost {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == Ordering::Equal
    }
}

impl Eq for MovementCost {}

impl PartialOrd for MovementCost {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for MovementCost {
    fn cmp(&self, other: &Self) -> Ordering {
        self.cost
            .total_cmp(&other.cost)
            .then(self.preference.cmp(&other.preference))
            .then_with(|| self.mode.name.cmp(other.mode.name))
            .then(self.mode.id.cmp(&other.mode.id))
            .then(self.metric.cmp(&other.metric))
    }
}

// ---------------------------------------------------------------------------
// Movement cost traits
// ---------------------------------------------------------------------------

/// An entity attribute that grants one movement mode.
#[derive(Copy, Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum MovementCostTrait {
    /// A fixed cost per step.
    PointCost {
        mode: MovementMode,
        metric: DistanceMetric,
        cost: f32,
        preference: i32,
    },
    /// A speed; the step cost is `1 / velocity`.
    Velocity {
        mode: MovementMode,
        metric: DistanceMetric,
        velocity: f32,
        preference: i32,
    },
}

impl MovementCostTrait {
    pub const fn point_cost(mode: MovementMode, metric: DistanceMetric, cost: f32, preference: i32) -> Self {
        MovementCostTrait::PointCost {
            mode,
            metric,
            cost,
            preference,
        }
    }

    pub const fn velocity(mode: MovementMode, metric: DistanceMetric, velocity: f32, preference: i32) -> Self {
        MovementCostTrait::Velocity {
            mode,
            metric,
            velocity,
            preference,
        }
    }

    pub fn mode(&self) -> MovementMode {
        match *self {
            MovementCostTrait::PointCost { mode, .. } | MovementCostTrait::Velocity { mode, .. } => mode,
        }
    }

    /// Whether the raw attribute is usable. Invalid traits count as absent.
    pub fn validate(&self) -> bool {
        let v = match *self {
            MovementCostTrait::PointCost { cost, .. } => cost,
            MovementCostTrait::Velocity { velocity, .. } => velocity,
        };
        v > 0.0 && v.is_finite()
    }

    /// The cost this trait contributes, if valid.
    pub fn movement_cost(&self) -> Option<MovementCost> {
        if !self.validate() {
            return None;
        }
        let mc = match *self {
            MovementCostTrait::PointCost {
                mode,
                metric,
                cost,
                preference,
            } => MovementCost::new(mode, metric, cost, preference),
            MovementCostTrait::Velocity {
                mode,
                metric,
                velocity,
                preference,
            } => MovementCost::new(mode, metric, 1.0 / velocity, preference),
        };
        mc.is_valid().then_some(mc)
    }
}

// ---------------------------------------------------------------------------
// AggregateMovementCostFactors
// ---------------------------------------------------------------------------

/// All movement modes an entity can use, sorted and unique per mode.
///
/// When several costs name the same mode only the one ordered first (the
/// cheapest) is kept. Invalid costs are dropped.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct AggregateMovementCostFactors {
    costs: Vec<MovementCost>,
}

/// The factors a pathfinder is built from.
pub type PathfindingMovementCostFactors = AggregateMovementCostFactors;

impl AggregateMovementCostFactors {
    pub fn new(costs: impl IntoIterator<Item = MovementCost>) -> Self {
        let mut sorted: Vec<MovementCost> = costs.into_iter().filter(MovementCost::is_valid).collect();
        sorted.sort();
        let mut unique: Vec<MovementCost> = Vec::with_capacity(sorted.len());
        for c in sorted {
            if !unique.iter().any(|u| u.mode == c.mode) {
                unique.push(c);
            }
        }
        Self { costs: unique }
    }

    /// Aggregate the valid costs of `traits`.
    pub fn from_traits<'a>(traits: impl IntoIterator<Item = &'a MovementCostTrait>) -> Self {
        Self::new(traits.into_iter().filter_map(MovementCostTrait::movement_cost))
    }

    /// Cost entry for `mode`. Linear scan; entities rarely have more than a
    /// handful of modes.
    pub fn try_get_movement_cost(&self, mode: MovementMode) -> Option<&MovementCost> {
        self.costs.iter().find(|c| c.mode == mode)
    }

    pub fn iter(&self) -> std::slice::Iter<'_, MovementCost> {
        self.costs.iter()
    }

    pub fn as_slice(&self) -> &[MovementCost] {
        &self.costs
    }

    pub fn len(&self) -> usize {
        self.costs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.costs.is_empty()
    }
}

impl FromIterator<MovementCost> for AggregateMovementCostFactors {
    fn from_iter<I: IntoIterator<Item = MovementCost>>(iter: I) -> Self {
        Self::new(iter)
    }
}

impl<'a> IntoIterator for &'a AggregateMovementCostFactors {
    type Item = &'a MovementCost;
    type IntoIter = std::slice::Iter<'a, MovementCost>;
    fn into_iter(self) -> Self::IntoIter {
        self.costs.iter()
    }
}

// ---------------------------------------------------------------------------
// MovementCostProfile
// ---------------------------------------------------------------------------

/// The movement traits of one entity with a cached aggregate.
///
/// The aggregate is rebuilt lazily after any change to the trait set.
#[derive(Clone, Debug, Default)]
pub struct MovementCostProfile {
    traits: Vec<MovementCostTrait>,
    cached: Option<AggregateMovementCostFactors>,
}

impl MovementCostProfile {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add `t`, replacing any trait for the same mode.
    pub fn apply(&mut self, t: MovementCostTrait) {
        let mode = t.mode();
        self.traits.retain(|x| x.mode() != mode);
        self.traits.push(t);
        self.cached = None;
    }

    /// Drop the trait for `mode`. Returns whether one was present.
    pub fn remove_mode(&mut self, mode: MovementMode) -> bool {
        let before = self.traits.len();
        self.traits.retain(|x| x.mode() != mode);
        let removed = self.traits.len() != before;
        if removed {
            self.cached = None;
        }
        removed
    }

    /// Remove all traits.
    pub fn reset(&mut self) {
        self.traits.clear();
        self.cached = None;
    }

    pub fn traits(&self) -> &[MovementCostTrait] {
        &self.traits
    }

    /// Whether the aggregate is currently cached.
    pub fn is_cached(&self) -> bool {
        self.cached.is_some()
    }

    /// The aggregate of all valid traits.
    pub fn factors(&mut self) -> &AggregateMovementCostFactors {
        let traits = &self.traits;
        self.cached.get_or_insert_with(|| {
            log::trace!("rebuilding movement cost aggregate from {} traits", traits.len());
            AggregateMovementCostFactors::from_traits(traits)
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const WALK: MovementMode = MovementMode::WALKING;
    const SWIM: MovementMode = MovementMode::SWIMMING;
    const FLY: MovementMode = MovementMode::FLYING;

    fn mc(mode: MovementMode, cost: f32, preference: i32) -> MovementCost {
        MovementCost::new(mode, DistanceMetric::Euclidean, cost, preference)
    }

    #[test]
    fn modes_compare_by_id() {
        let a = MovementMode::new(7, "climbing");
        let b = MovementMode::new(7, "scaling");
        assert_eq!(a, b);
        assert_ne!(a, MovementMode::new(8, "climbing"));
        assert_eq!(WALK.to_string(), "walking");
    }

    #[test]
    fn cost_order_is_cost_then_preference_then_name() {
        let mut v = vec![mc(SWIM, 2.0, 0), mc(WALK, 1.0, 5), mc(FLY, 1.0, 5), mc(FLY, 1.0, 1)];
        v.sort();
        assert_eq!(v[0], mc(FLY, 1.0, 1));
        // same cost and preference: "flying" < "walking"
        assert_eq!(v[1], mc(FLY, 1.0, 5));
        assert_eq!(v[2].mode, WALK);
        assert_eq!(v[3].mode, SWIM);
    }

    #[test]
    fn non_positive_costs_are_invalid() {
        assert!(mc(WALK, 0.5, 0).is_valid());
        assert!(!mc(WALK, 0.0, 0).is_valid());
        assert!(!mc(WALK, -1.0, 0).is_valid());
        assert!(!mc(WALK, f32::NAN, 0).is_valid());
        assert!(!mc(WALK, f32::INFINITY, 0).is_valid());
    }

    #[test]
    fn velocity_trait_inverts() {
        let t = MovementCostTrait::velocity(FLY, DistanceMetric::Chebyshev, 4.0, 2);
        let c = t.movement_cost().unwrap();
        assert_eq!(c.cost, 0.25);
        assert_eq!(c.metric, DistanceMetric::Chebyshev);
        assert_eq!(c.preference, 2);
        assert!(MovementCostTrait::velocity(FLY, DistanceMetric::Chebyshev, 0.0, 0).movement_cost().is_none());
        assert!(!MovementCostTrait::point_cost(WALK, DistanceMetric::Manhattan, -3.0, 0).validate());
    }

    #[test]
    fn aggregate_is_sorted_and_unique() {
        let f = AggregateMovementCostFactors::new([mc(SWIM, 2.0, 0), mc(WALK, 3.0, 0), mc(WALK, 1.0, 0), mc(FLY, 0.0, 0)]);
        assert_eq!(f.len(), 2);
        assert_eq!(f.as_slice()[0], mc(WALK, 1.0, 0));
        assert_eq!(f.as_slice()[1], mc(SWIM, 2.0, 0));
        assert_eq!(f.try_get_movement_cost(SWIM).map(|c| c.cost), Some(2.0));
        assert!(f.try_get_movement_cost(FLY).is_none());
    }

    #[test]
    fn aggregate_equality_ignores_input_order() {
        let list = vec![mc(SWIM, 2.0, 0), mc(FLY, 1.0, 3), mc(WALK, 1.0, 0), mc(SWIM, 2.0, -1)];
        let mut sorted = list.clone();
        sorted.sort();
        let mut reversed = list.clone();
        reversed.reverse();
        let a = AggregateMovementCostFactors::new(list);
        assert_eq!(a, AggregateMovementCostFactors::new(sorted));
        assert_eq!(a, reversed.into_iter().collect::<AggregateMovementCostFactors>());
    }

    #[test]
    fn profile_caches_until_changed() {
        let mut p = MovementCostProfile::new();
        p.apply(MovementCostTrait::point_cost(WALK, DistanceMetric::Euclidean, 1.0, 0));
        assert!(!p.is_cached());
        assert_eq!(p.factors().len(), 1);
        assert!(p.is_cached());

        p.apply(MovementCostTrait::velocity(SWIM, DistanceMetric::Manhattan, 0.5, 0));
        assert!(!p.is_cached());
        let f = p.factors();
        assert_eq!(f.len(), 2);
        assert_eq!(f.try_get_movement_cost(SWIM).map(|c| c.cost), Some(2.0));

        // replacing a mode keeps one entry per mode
        p.apply(MovementCostTrait::point_cost(WALK, DistanceMetric::Euclidean, 3.0, 0));
        assert_eq!(p.factors().try_get_movement_cost(WALK).map(|c| c.cost), Some(3.0));
        assert_eq!(p.traits().len(), 2);

        assert!(p.remove_mode(SWIM));
        assert!(!p.remove_mode(SWIM));
        assert_eq!(p.factors().len(), 1);

        p.reset();
        assert!(p.factors().is_empty());
    }
}
