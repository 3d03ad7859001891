use gruid_core::Point;

/// Manhattan (L1) distance between two points.
#[inline]
pub fn manhattan(a: Point, b: Point) -> i32 {
    (a.x - b.x).abs() + (a.y - b.y).abs()
}

/// Chebyshev (L∞) distance between two points.
#[inline]
pub fn chebyshev(a: Point, b: Point) -> i32 {
    (a.x - b.x).abs().max((a.y - b.y).abs())
}

/// Euclidean (L2) distance between two points.
#[inline]
pub fn euclidean(a: Point, b: Point) -> f32 {
    let dx = (a.x - b.x) as f32;
    let dy = (a.y - b.y) as f32;
    (dx * dx + dy * dy).sqrt()
}

/// How a movement mode measures distance on the grid.
///
/// Metrics are totally ordered by accuracy: `Manhattan < Chebyshev <
/// Euclidean`. A search over several modes estimates remaining cost with the
/// most accurate metric any of them prefers.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum DistanceMetric {
    Manhattan,
    Chebyshev,
    #[default]
    Euclidean,
}

impl DistanceMetric {
    /// Distance between `a` and `b` under this metric.
    #[inline]
    pub fn distance(self, a: Point, b: Point) -> f32 {
        match self {
            DistanceMetric::Manhattan => manhattan(a, b) as f32,
            DistanceMetric::Chebyshev => chebyshev(a, b) as f32,
            DistanceMetric::Euclidean => euclidean(a, b),
        }
    }

    /// Whether `self` estimates distances more accurately than `other`.
    #[inline]
    pub fn is_more_accurate_than(self, other: DistanceMetric) -> bool {
        self > other
    }

    /// The most accurate of `metrics`, or `None` when empty.
    pub fn most_accurate(metrics: impl IntoIterator<Item = DistanceMetric>) -> Option<DistanceMetric> {
        metrics.into_iter().max()
    }
}
