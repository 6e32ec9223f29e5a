use crate::core::config::DEFAULT_FORK_AFTER;
use crate::maze::{Maze, NodeId};
use crate::solver::path::path_from_to;
use std::collections::{HashMap, HashSet};
use std::sync::Arc;
use tracing::debug;

/// Single-threaded depth-first solver.
///
/// Same walk as a fork/join task without forking, using plain collections
/// owned by the solver. Useful as a baseline and for cross-checking. The
/// fan-out threshold is carried but unused here; it seeds
/// [`ForkJoinSolver::from_sequential`](crate::ForkJoinSolver::from_sequential).
pub struct SequentialSolver<M: Maze> {
    maze: Arc<M>,
    start: NodeId,
    fork_after: usize,
    frontier: Vec<NodeId>,
    visited: HashSet<NodeId>,
    predecessor: HashMap<NodeId, NodeId>,
}

impl<M: Maze> SequentialSolver<M> {
    pub fn new(maze: Arc<M>, start: NodeId) -> Self {
        Self {
            maze,
            start,
            fork_after: DEFAULT_FORK_AFTER,
            frontier: Vec::new(),
            visited: HashSet::new(),
            predecessor: HashMap::new(),
        }
    }

    pub fn with_fork_after(mut self, fork_after: usize) -> Self {
        self.fork_after = fork_after;
        self
    }

    pub fn fork_after(&self) -> usize {
        self.fork_after
    }

    pub fn start(&self) -> NodeId {
        self.start
    }

    pub fn maze(&self) -> &Arc<M> {
        &self.maze
    }

    /// Search from the start cell. Calling it again starts from scratch.
    pub fn compute(&mut self) -> Option<Vec<NodeId>> {
        self.frontier.clear();
        self.visited.clear();
        self.predecessor.clear();

        let player = self.maze.new_player(self.start);
        self.frontier.push(self.start);

        while let Some(current) = self.frontier.pop() {
            if self.maze.has_goal(current) {
                self.maze.move_player(player, current);
                debug!(
                    "Sequential search reached goal {} after {} cells",
                    current,
                    self.visited.len()
                );
                return self.path_from_to(self.start, current);
            }
            if !self.visited.insert(current) {
                continue;
            }
            self.maze.move_player(player, current);
            for next in self.maze.neighbors(current) {
                self.frontier.push(next);
                if !self.visited.contains(&next) && next != self.start {
                    self.predecessor.insert(next, current);
                }
            }
        }

        debug!("Sequential search exhausted {} cells", self.visited.len());
        None
    }

    pub fn path_from_to(&self, from: NodeId, to: NodeId) -> Option<Vec<NodeId>> {
        path_from_to(from, to, |n| self.predecessor.get(&n).copied())
    }

    /// Cells expanded by the last search
    pub fn visited_count(&self) -> usize {
        self.visited.len()
    }
}
