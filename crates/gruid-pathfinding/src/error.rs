use std::fmt;

/// Errors raised while setting up searches.
///
/// Search outcomes are never errors: a search that finds nothing returns
/// `None`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConfigError {
    /// `build` was called before any target was set on the builder.
    MissingTarget,
    /// Node tiles must be at least one cell wide.
    InvalidTileSize(i32),
    /// The named pool was configured to keep no values.
    ZeroPoolCapacity(&'static str),
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::MissingTarget => f.write_str("pathfinder: no target evaluator or target position set"),
            Self::InvalidTileSize(size) => write!(f, "pathfinder: invalid node tile size {size}"),
            Self::ZeroPoolCapacity(pool) => write!(f, "pathfinder: {pool} pool capacity must be positive"),
        }
    }
}

impl std::error::Error for ConfigError {}
