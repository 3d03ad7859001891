//! Compact search results: an origin plus relative steps.

use gruid_core::{Direction, Position};

use crate::movement::MovementMode;
use crate::pool::Poolable;

/// One move of a [`Path`]: the direction taken and the mode used for it.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct PathStep {
    pub direction: Direction,
    pub mode: MovementMode,
}

/// A route stored as an origin and a list of steps.
///
/// Absolute positions are not stored; the position after step `i` is
/// rebuilt by replaying steps `0..=i` from the origin. The origin itself is
/// not part of the sequence, so a path of length `n` yields `n` positions,
/// the last one being the goal.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Path {
    origin: Position,
    steps: Vec<PathStep>,
}

impl Path {
    pub fn new() -> Self {
        Self::default()
    }

    /// Clear the path and start recording from `origin`.
    pub fn begin_record(&mut self, origin: Position) {
        self.origin = origin;
        self.steps.clear();
    }

    /// Append one step (source to target order).
    pub fn push_step(&mut self, direction: Direction, mode: MovementMode) {
        self.steps.push(PathStep { direction, mode });
    }

    pub fn origin(&self) -> Position {
        self.origin
    }

    pub fn steps(&self) -> &[PathStep] {
        &self.steps
    }

    pub fn len(&self) -> usize {
        self.steps.len()
    }

    pub fn is_empty(&self) -> bool {
        self.steps.is_empty()
    }

    /// Position and mode after step `i`.
    pub fn get(&self, i: usize) -> Option<(Position, MovementMode)> {
        let step = self.steps.get(i)?;
        let pos = self.steps[..=i]
            .iter()
            .fold(self.origin, |p, s| p.with_point(p.point() + s.direction.delta()));
        Some((pos, step.mode))
    }

    /// The final position, which is the origin for an empty path.
    pub fn last_position(&self) -> Position {
        self.steps
            .iter()
            .fold(self.origin, |p, s| p.with_point(p.point() + s.direction.delta()))
    }

    pub fn iter(&self) -> PathEnumerator<'_> {
        PathEnumerator {
            path: self,
            index: 0,
            pos: self.origin,
        }
    }
}

impl Poolable for Path {
    fn reset(&mut self) {
        self.origin = Position::default();
        self.steps.clear();
    }
}

impl<'a> IntoIterator for &'a Path {
    type Item = (Position, MovementMode);
    type IntoIter = PathEnumerator<'a>;
    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

/// Walks a [`Path`] front to back keeping a running position.
#[derive(Clone, Debug)]
pub struct PathEnumerator<'a> {
    path: &'a Path,
    index: usize,
    pos: Position,
}

impl PathEnumerator<'_> {
    /// Rewind to the origin.
    pub fn reset(&mut self) {
        self.index = 0;
        self.pos = self.path.origin;
    }

    /// The position reached so far.
    pub fn position(&self) -> Position {
        self.pos
    }
}

impl Iterator for PathEnumerator<'_> {
    type Item = (Position, MovementMode);

    fn next(&mut self) -> Option<Self::Item> {
        let step = self.path.steps.get(self.index)?;
        self.index += 1;
        self.pos = self.pos.with_point(self.pos.point() + step.direction.delta());
        Some((self.pos, step.mode))
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        let n = self.path.steps.len() - self.index;
        (n, Some(n))
    }
}

impl ExactSizeIterator for PathEnumerator<'_> {}

#[cfg(test)]
mod tests {
    use super::*;

    const WALK: MovementMode = MovementMode::WALKING;
    const SWIM: MovementMode = MovementMode::SWIMMING;

    fn sample() -> Path {
        let mut p = Path::new();
        p.begin_record(Position::new(1, 1, 3));
        p.push_step(Direction::East, WALK);
        p.push_step(Direction::SouthEast, SWIM);
        p.push_step(Direction::South, WALK);
        p
    }

    #[test]
    fn random_access_replays_steps() {
        let p = sample();
        assert_eq!(p.len(), 3);
        assert_eq!(p.get(0), Some((Position::new(2, 1, 3), WALK)));
        assert_eq!(p.get(1), Some((Position::new(3, 2, 3), SWIM)));
        assert_eq!(p.get(2), Some((Position::new(3, 3, 3), WALK)));
        assert_eq!(p.get(3), None);
        assert_eq!(p.last_position(), Position::new(3, 3, 3));
    }

    #[test]
    fn enumerator_matches_random_access() {
        let p = sample();
        let mut e = p.iter();
        assert_eq!(e.len(), 3);
        let mut last = None;
        for (i, item) in e.by_ref().enumerate() {
            assert_eq!(Some(item), p.get(i));
            last = Some(item.0);
        }
        assert_eq!(last, p.get(p.len() - 1).map(|(pos, _)| pos));
        assert_eq!(e.position(), p.last_position());
        e.reset();
        assert_eq!(e.position(), p.origin());
        assert_eq!(e.next(), p.get(0));
    }

    #[test]
    fn empty_path_ends_at_origin() {
        let mut p = Path::new();
        p.begin_record(Position::new(5, 5, 0));
        assert!(p.is_empty());
        assert_eq!(p.last_position(), Position::new(5, 5, 0));
        assert_eq!(p.iter().next(), None);
    }

    #[test]
    fn reset_clears_everything() {
        let mut p = sample();
        p.reset();
        assert!(p.is_empty());
        assert_eq!(p.origin(), Position::default());
    }
}
