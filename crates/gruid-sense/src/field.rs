//! The result of a sense propagation: signal strength per cell.

use gruid_core::{Point, Range};

/// Signal strengths produced by a [`ShadowCaster`](crate::ShadowCaster).
///
/// Only cells inside [`range`](Self::range) can carry a signal; every query
/// outside it reports zero.
#[derive(Debug, Clone, Default)]
pub struct SenseField {
    range: Range,
    source: Point,
    radius: i32,
    revealed: Vec<bool>,
    strength: Vec<f32>,
    touched: Vec<Point>,
}

impl SenseField {
    /// Clear for a new propagation over `range`, reusing the buffers.
    pub(crate) fn reset(&mut self, range: Range, source: Point, radius: i32) {
        self.range = range;
        self.source = source;
        self.radius = radius;
        let len = range.len();
        self.revealed.clear();
        self.revealed.resize(len, false);
        self.strength.clear();
        self.strength.resize(len, 0.0);
        self.touched.clear();
    }

    pub(crate) fn reveal(&mut self, p: Point) {
        let Some(i) = self.range.index_of(p) else {
            return;
        };
        if !self.revealed[i] {
            self.revealed[i] = true;
            self.touched.push(p);
        }
    }

    /// Assign strengths to the revealed cells, dropping those outside the
    /// Euclidean radius.
    pub(crate) fn finish(&mut self, resistance: impl Fn(Point) -> f32) {
        let r = self.radius as f32;
        let r_sq = (self.radius as i64) * (self.radius as i64);
        let src = self.source;
        self.touched.retain(|&p| {
            let dx = (p.x - src.x) as i64;
            let dy = (p.y - src.y) as i64;
            dx * dx + dy * dy <= r_sq
        });
        for &p in &self.touched {
            let Some(i) = self.range.index_of(p) else {
                continue;
            };
            let d = (((p.x - src.x) as f32).powi(2) + ((p.y - src.y) as f32).powi(2)).sqrt();
            let falloff = 1.0 - d / (r + 1.0);
            self.strength[i] = (falloff * (1.0 - resistance(p))).max(0.0);
        }
    }

    /// The area the last propagation could reach.
    pub fn range(&self) -> Range {
        self.range
    }

    pub fn source(&self) -> Point {
        self.source
    }

    pub fn radius(&self) -> i32 {
        self.radius
    }

    /// Whether shadow casting reached `p`, opaque cells included.
    pub fn is_revealed(&self, p: Point) -> bool {
        self.range
            .index_of(p)
            .is_some_and(|i| self.revealed[i])
    }

    /// Signal strength at `p`, in `[0, 1]`.
    pub fn strength(&self, p: Point) -> f32 {
        self.range.index_of(p).map_or(0.0, |i| self.strength[i])
    }

    /// Whether `p` carries a nonzero signal.
    pub fn is_lit(&self, p: Point) -> bool {
        self.strength(p) > 0.0
    }

    /// Every cell with a nonzero signal, in reveal order.
    pub fn iter_lit(&self) -> impl Iterator<Item = (Point, f32)> + '_ {
        self.touched.iter().filter_map(|&p| {
            let s = self.strength(p);
            (s > 0.0).then_some((p, s))
        })
    }
}
