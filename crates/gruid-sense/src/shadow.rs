//! Symmetric shadow casting over a [`ResistanceMap`].
//!
//! Iterative variant of Albert Ford's symmetric shadow casting, run per
//! quadrant with integer slopes. Every revealed cell inside the Euclidean
//! radius receives a signal strength that decays linearly with distance and
//! is dampened by the cell's own resistance. Opaque cells are revealed (they
//! cast the shadow) but carry no signal.

use std::ops::RangeInclusive;

use gruid_core::{Point, Range};

use crate::field::SenseField;
use crate::resistance::{OPAQUE, ResistanceMap};

/// Largest radius a propagation runs with; larger requests are clamped.
pub const MAX_RADIUS: i32 = 512;

/// Reusable shadow casting state.
///
/// Buffers are kept between calls, so repeated propagation over same-sized
/// areas does not allocate.
#[derive(Debug, Default)]
pub struct ShadowCaster {
    field: SenseField,
    rows: Vec<Row>,
    diagonal_reveal: bool,
}

impl ShadowCaster {
    /// A caster that reveals boundary cells through diagonal gaps.
    pub fn new() -> Self {
        Self {
            diagonal_reveal: true,
            ..Self::default()
        }
    }

    /// Only reveal wall cells that are orthogonally adjacent to a visible
    /// floor cell ("non-expansive" diagonals).
    pub fn without_diagonal_reveal() -> Self {
        Self {
            diagonal_reveal: false,
            ..Self::default()
        }
    }

    /// The field produced by the last [`propagate`](Self::propagate) call.
    pub fn field(&self) -> &SenseField {
        &self.field
    }

    /// Forget the last field, keeping the buffers.
    pub fn clear(&mut self) {
        self.field.reset(Range::default(), Point::ZERO, 0);
    }

    /// Propagate a signal from `src` out to Euclidean `radius`, clamped to
    /// [`MAX_RADIUS`].
    pub fn propagate<M: ResistanceMap + ?Sized>(
        &mut self,
        map: &M,
        src: Point,
        radius: i32,
    ) -> &SenseField {
        if radius > MAX_RADIUS {
            log::debug!("clamping sense radius {radius} to {MAX_RADIUS}");
        }
        let radius = radius.min(MAX_RADIUS);
        let area = Range::around(src, radius);
        self.field.reset(area, src, radius);
        if radius < 0 {
            return &self.field;
        }
        self.field.reveal(src);
        for quadrant in Quadrant::ALL {
            let depth_limit = quadrant.depth_within(src, area).min(radius);
            if depth_limit <= 0 {
                continue;
            }
            let scan = Scan {
                map,
                quadrant,
                origin: src,
                depth_limit,
                cols: quadrant.cols_within(src, area),
                diagonal_reveal: self.diagonal_reveal,
            };
            scan.run(&mut self.rows, &mut self.field);
        }
        self.field.finish(|p| map.resistance(p).clamp(0.0, OPAQUE));
        &self.field
    }
}

/// One quadrant pass. Cells are addressed by `(depth, col)`: depth counts
/// away from the origin, columns run across.
struct Scan<'m, M: ?Sized> {
    map: &'m M,
    quadrant: Quadrant,
    origin: Point,
    depth_limit: i32,
    cols: (i32, i32),
    diagonal_reveal: bool,
}

impl<M: ResistanceMap + ?Sized> Scan<'_, M> {
    fn open(&self, depth: i32, col: i32) -> bool {
        self.map
            .is_transparent(self.quadrant.to_world(self.origin, depth, col))
    }

    /// Without diagonal reveal, a cell shows only next to an open cell on
    /// its near side.
    fn revealable(&self, depth: i32, col: i32) -> bool {
        self.diagonal_reveal
            || (depth <= 1 && col == 0)
            || (depth > 1 && self.open(depth - 1, col))
            || (col >= 0 && self.open(depth, col - 1))
            || (col <= 0 && self.open(depth, col + 1))
    }

    /// Start slope of the open stretch that begins at `col` after a wall.
    fn start_after_wall(&self, depth: i32, col: i32) -> Slope {
        if !self.diagonal_reveal {
            if depth < self.depth_limit && !self.open(depth + 1, col) {
                return Slope::square(depth + 1, col);
            }
            if depth > 1 && !self.open(depth - 1, col) {
                return Slope::diamond(depth - 1, col + 1);
            }
        }
        Slope::diamond(depth, col)
    }

    /// End slope of the open stretch closed by the wall at `col`.
    fn end_before_wall(&self, depth: i32, col: i32) -> Slope {
        if !self.diagonal_reveal {
            if depth < self.depth_limit && !self.open(depth + 1, col - 1) {
                return Slope::square(depth + 1, col);
            }
            if depth > 1 && !self.open(depth - 1, col - 1) {
                return Slope::diamond(depth - 1, col - 1);
            }
        }
        Slope::diamond(depth, col)
    }

    fn run(&self, rows: &mut Vec<Row>, field: &mut SenseField) {
        rows.clear();
        rows.push(Row {
            depth: 1,
            start: Slope::new(-1, 1),
            end: Slope::new(1, 1),
        });
        while let Some(mut row) = rows.pop() {
            let mut prev_open = None;
            for col in row.columns(self.cols) {
                let open = self.open(row.depth, col);
                if (!open || row.is_symmetric(col)) && self.revealable(row.depth, col) {
                    field.reveal(self.quadrant.to_world(self.origin, row.depth, col));
                }
                match prev_open {
                    Some(false) if open => row.start = self.start_after_wall(row.depth, col),
                    Some(true) if !open => {
                        let below = Row {
                            end: self.end_before_wall(row.depth, col),
                            ..row.deeper()
                        };
                        if below.depth <= self.depth_limit {
                            rows.push(below);
                        }
                    }
                    _ => {}
                }
                prev_open = Some(open);
            }
            if prev_open == Some(true) && row.depth < self.depth_limit {
                rows.push(row.deeper());
            }
        }
    }
}

#[derive(Debug, Clone, Copy)]
enum Quadrant {
    North,
    East,
    South,
    West,
}

impl Quadrant {
    const ALL: [Quadrant; 4] = [Quadrant::North, Quadrant::East, Quadrant::South, Quadrant::West];

    fn to_world(self, o: Point, depth: i32, col: i32) -> Point {
        match self {
            Quadrant::North => Point::new(o.x + col, o.y - depth),
            Quadrant::East => Point::new(o.x + depth, o.y + col),
            Quadrant::South => Point::new(o.x + col, o.y + depth),
            Quadrant::West => Point::new(o.x - depth, o.y + col),
        }
    }

    /// Lowest and highest column of `area` as seen from `o`.
    fn cols_within(self, o: Point, area: Range) -> (i32, i32) {
        match self {
            Quadrant::North | Quadrant::South => (area.min.x - o.x, area.max.x - o.x - 1),
            Quadrant::East | Quadrant::West => (area.min.y - o.y, area.max.y - o.y - 1),
        }
    }

    fn depth_within(self, o: Point, area: Range) -> i32 {
        match self {
            Quadrant::North => o.y - area.min.y,
            Quadrant::East => area.max.x - o.x - 1,
            Quadrant::South => area.max.y - o.y - 1,
            Quadrant::West => o.x - area.min.x,
        }
    }
}

/// A slope `num / den` measured from the origin's centre.
#[derive(Debug, Clone, Copy)]
struct Slope {
    num: i32,
    den: i32,
}

impl Slope {
    const fn new(num: i32, den: i32) -> Self {
        Self { num, den }
    }

    /// Through the near corner of the cell's diamond.
    const fn diamond(depth: i32, col: i32) -> Self {
        Self::new(2 * col - 1, 2 * depth)
    }

    /// Through the near corner of the cell's square.
    const fn square(depth: i32, col: i32) -> Self {
        Self::new(2 * col - 1, 2 * depth + 1)
    }
}

#[derive(Debug, Clone, Copy)]
struct Row {
    depth: i32,
    start: Slope,
    end: Slope,
}

impl Row {
    fn columns(&self, (lo, hi): (i32, i32)) -> RangeInclusive<i32> {
        let first = round_slope(self.depth * self.start.num, self.start.den, true).max(lo);
        let last = round_slope(self.depth * self.end.num, self.end.den, false).min(hi);
        first..=last
    }

    fn deeper(self) -> Row {
        Row {
            depth: self.depth + 1,
            ..self
        }
    }

    fn is_symmetric(&self, col: i32) -> bool {
        col * self.start.den >= self.depth * self.start.num && col * self.end.den <= self.depth * self.end.num
    }
}

/// Round `n / den` to the nearest column. Halves round up for the start of a
/// row and down for its end, so the row never widens past its slopes.
fn round_slope(n: i32, den: i32, start: bool) -> i32 {
    let div = n / den;
    let rem = n % den;
    if rem > 0 {
        let up = if start { 2 * rem >= den } else { 2 * rem > den };
        if up { div + 1 } else { div }
    } else if rem < 0 {
        let down = if start { -2 * rem > den } else { -2 * rem >= den };
        if down { div - 1 } else { div }
    } else {
        div
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::resistance::ResistanceGrid;

    fn open_room() -> ResistanceGrid {
        ResistanceGrid::new(Range::new(0, 0, 21, 21))
    }

    #[test]
    fn open_room_lights_the_whole_disc() {
        let map = open_room();
        let mut caster = ShadowCaster::new();
        let src = Point::new(10, 10);
        let field = caster.propagate(&map, src, 5);

        for p in Range::around(src, 5) {
            let d = p - src;
            let inside = d.x * d.x + d.y * d.y <= 25;
            assert_eq!(field.is_lit(p), inside, "cell {p}");
        }
        assert!(field.strength(src) > field.strength(Point::new(15, 10)));
        assert!(field.strength(Point::new(15, 10)) > 0.0);
    }

    #[test]
    fn wall_casts_a_shadow() {
        let mut map = open_room();
        let src = Point::new(10, 10);
        let wall = Point::new(12, 10);
        map.set_opaque(wall);
        let mut caster = ShadowCaster::new();
        let field = caster.propagate(&map, src, 5);

        assert!(field.is_revealed(wall));
        assert!(!field.is_lit(wall), "opaque cells carry no signal");
        assert!(!field.is_lit(Point::new(13, 10)));
        assert!(!field.is_lit(Point::new(14, 10)));
        assert!(field.is_lit(Point::new(11, 10)));
        assert!(field.is_lit(Point::new(13, 12)));
    }

    #[test]
    fn partial_resistance_dampens() {
        let mut map = open_room();
        let src = Point::new(10, 10);
        let fog = Point::new(11, 10);
        map.set(fog, 0.5);
        let mut caster = ShadowCaster::new();
        let field = caster.propagate(&map, src, 4);
        let clear = field.strength(Point::new(10, 11));
        let dampened = field.strength(fog);
        assert!(dampened > 0.0);
        assert!((dampened - clear * 0.5).abs() < 1e-6);
    }

    #[test]
    fn propagation_is_symmetric() {
        let mut map = ResistanceGrid::new(Range::new(0, 0, 20, 20));
        map.set_opaque(Point::new(8, 10));
        let a = Point::new(10, 10);
        let b = Point::new(6, 10);

        let mut caster = ShadowCaster::new();
        let a_sees_b = caster.propagate(&map, a, 10).is_lit(b);
        let b_sees_a = caster.propagate(&map, b, 10).is_lit(a);
        assert_eq!(a_sees_b, b_sees_a);
    }

    #[test]
    fn negative_radius_lights_nothing() {
        let map = open_room();
        let mut caster = ShadowCaster::new();
        let field = caster.propagate(&map, Point::new(3, 3), -1);
        assert_eq!(field.iter_lit().count(), 0);
    }

    #[test]
    fn zero_radius_lights_the_source_only() {
        let map = open_room();
        let mut caster = ShadowCaster::without_diagonal_reveal();
        let field = caster.propagate(&map, Point::new(3, 3), 0);
        let lit: Vec<_> = field.iter_lit().map(|(p, _)| p).collect();
        assert_eq!(lit, vec![Point::new(3, 3)]);
    }

    #[test]
    fn huge_radius_is_clamped() {
        let map = open_room();
        let mut caster = ShadowCaster::new();
        let field = caster.propagate(&map, Point::new(10, 10), i32::MAX);
        assert_eq!(field.radius(), MAX_RADIUS);
        assert!(field.is_lit(Point::new(0, 0)));
        assert!(!field.is_lit(Point::new(21, 10)));
    }

    #[test]
    fn a_gap_in_a_wall_lets_a_narrow_beam_through() {
        // a wall column at x = 12 with a gap at y = 10
        let mut map = open_room();
        for y in 5..16 {
            if y != 10 {
                map.set_opaque(Point::new(12, y));
            }
        }
        let src = Point::new(10, 10);
        let mut caster = ShadowCaster::without_diagonal_reveal();
        let field = caster.propagate(&map, src, 6);
        assert!(field.is_lit(Point::new(13, 10)));
        assert!(field.is_lit(Point::new(14, 10)));
        assert!(field.is_revealed(Point::new(12, 11)));
        assert!(!field.is_lit(Point::new(14, 13)));
    }

    #[test]
    fn round_slope_matches_half_rules() {
        assert_eq!(round_slope(-3, 4, true), -1);
        assert_eq!(round_slope(-3, 4, false), -1);
        assert_eq!(round_slope(2, 4, true), 1);
        assert_eq!(round_slope(2, 4, false), 0);
        assert_eq!(round_slope(-2, 4, true), 0);
        assert_eq!(round_slope(-2, 4, false), -1);
        assert_eq!(round_slope(8, 4, true), 2);
    }
}
