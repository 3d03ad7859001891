use crate::error::ConfigError;

/// Tuning knobs of a [`PathfinderSource`](crate::PathfinderSource).
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct PathfinderConfig {
    /// Side length of the square node tiles used by the A* worker.
    pub node_tile_size: i32,
    /// Node tiles a worker keeps between searches.
    pub retained_node_tiles: usize,
    /// Budget used by [`Pathfinder::find_path`](crate::Pathfinder::find_path).
    pub default_search_limit: usize,
    /// Idle builders kept for reuse.
    pub builder_pool_capacity: usize,
    /// Idle pathfinders kept for reuse.
    pub pathfinder_pool_capacity: usize,
    /// Idle paths kept for reuse.
    pub path_pool_capacity: usize,
    /// Idle line-of-sight evaluators kept for reuse.
    pub evaluator_pool_capacity: usize,
}

impl Default for PathfinderConfig {
    fn default() -> Self {
        Self {
            node_tile_size: 16,
            retained_node_tiles: 64,
            default_search_limit: 10_000,
            builder_pool_capacity: 4,
            pathfinder_pool_capacity: 4,
            path_pool_capacity: 16,
            evaluator_pool_capacity: 4,
        }
    }
}

impl PathfinderConfig {
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.node_tile_size < 1 {
            return Err(ConfigError::InvalidTileSize(self.node_tile_size));
        }
        let pools = [
            ("builder", self.builder_pool_capacity),
            ("pathfinder", self.pathfinder_pool_capacity),
            ("path", self.path_pool_capacity),
            ("line-of-sight evaluator", self.evaluator_pool_capacity),
        ];
        match pools.iter().find(|(_, cap)| *cap == 0) {
            Some((name, _)) => Err(ConfigError::ZeroPoolCapacity(*name)),
            None => Ok(()),
        }
    }
}
