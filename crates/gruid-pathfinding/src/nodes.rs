//! Search bookkeeping for the A* worker.
//!
//! Nodes live in square tiles keyed by tile coordinate, so a search only
//! allocates around the area it explores. Every search bumps a generation
//! counter instead of clearing; a node whose stamp is older than the current
//! generation reads as unvisited.

use std::collections::HashMap;

use gruid_core::{Direction, Point};

#[derive(Copy, Clone, Debug, PartialEq, Eq, Default)]
pub(crate) enum NodeState {
    #[default]
    Unvisited,
    Open,
    Closed,
}

#[derive(Copy, Clone, Debug)]
pub(crate) struct Node {
    pub(crate) g: f32,
    pub(crate) state: NodeState,
    /// Direction travelled to reach this node; `None` for the start.
    pub(crate) arrived_by: Option<Direction>,
    /// Index of the mode layer used for the last step.
    pub(crate) mode: usize,
    generation: u32,
}

impl Default for Node {
    fn default() -> Self {
        Self {
            g: f32::INFINITY,
            state: NodeState::Unvisited,
            arrived_by: None,
            mode: 0,
            generation: 0,
        }
    }
}

#[derive(Debug)]
struct NodeTile {
    nodes: Vec<Node>,
}

#[derive(Debug)]
pub(crate) struct NodeGrid {
    tile_size: i32,
    generation: u32,
    tiles: HashMap<Point, NodeTile>,
    spare: Vec<NodeTile>,
}

impl NodeGrid {
    pub(crate) fn new(tile_size: i32) -> Self {
        Self {
            tile_size: tile_size.max(1),
            generation: 0,
            tiles: HashMap::new(),
            spare: Vec::new(),
        }
    }

    /// Start a new search, keeping at most `retain` tiles around for reuse.
    pub(crate) fn begin(&mut self, retain: usize) {
        self.generation = self.generation.wrapping_add(1);
        if self.generation == 0 {
            // Wrapped: old stamps could collide with new ones.
            for tile in self.tiles.values_mut().chain(self.spare.iter_mut()) {
                tile.nodes.iter_mut().for_each(|n| n.generation = 0);
            }
            self.generation = 1;
        }
        if self.tiles.len() + self.spare.len() > retain {
            self.spare.extend(self.tiles.drain().map(|(_, t)| t));
            self.spare.truncate(retain);
        }
    }

    #[inline]
    fn locate(&self, p: Point) -> (Point, usize) {
        let s = self.tile_size;
        let key = Point::new(p.x.div_euclid(s), p.y.div_euclid(s));
        let local = (p.y.rem_euclid(s) * s + p.x.rem_euclid(s)) as usize;
        (key, local)
    }

    /// The node at `p` if it was touched during the current search.
    pub(crate) fn get(&self, p: Point) -> Option<&Node> {
        let (key, i) = self.locate(p);
        self.tiles
            .get(&key)
            .map(|t| &t.nodes[i])
            .filter(|n| n.generation == self.generation)
    }

    /// The node at `p`, freshly reset if it is stale.
    pub(crate) fn get_mut(&mut self, p: Point) -> &mut Node {
        let (key, i) = self.locate(p);
        let generation = self.generation;
        let len = (self.tile_size * self.tile_size) as usize;
        let spare = &mut self.spare;
        let tile = self.tiles.entry(key).or_insert_with(|| {
            spare.pop().unwrap_or_else(|| NodeTile {
                nodes: vec![Node::default(); len],
            })
        });
        let node = &mut tile.nodes[i];
        if node.generation != generation {
            *node = Node {
                generation,
                ..Node::default()
            };
        }
        node
    }

    pub(crate) fn tile_count(&self) -> usize {
        self.tiles.len()
    }

    #[cfg(test)]
    pub(crate) fn spare_count(&self) -> usize {
        self.spare.len()
    }
}
