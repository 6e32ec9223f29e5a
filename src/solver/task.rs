//! One fork/join search task
//!
//! A task walks the maze depth-first from its own start cell with a private
//! frontier. Whenever it expands a cell with more neighbors than the fan-out
//! threshold it hands every still-unvisited frontier entry to a new sibling
//! task, waits for all of them in spawn order, and returns the first path one
//! of them produced.

use crate::maze::{Maze, NodeId, PlayerId};
use crate::solver::events::SearchEvent;
use crate::solver::path::path_from_to;
use crate::solver::shared::SharedSearchState;
use futures::future::{BoxFuture, FutureExt};
use std::collections::HashSet;
use std::sync::Arc;
use tokio::task::JoinHandle;
use tracing::{debug, debug_span, error, trace, warn, Instrument};

pub struct SearchTask<M: Maze> {
    id: u64,
    maze: Arc<M>,
    shared: Arc<SharedSearchState>,
    start: NodeId,
    fork_after: usize,
    frontier: Vec<NodeId>,
}

impl<M: Maze> SearchTask<M> {
    /// Task that starts at the shared state's root cell
    pub fn root(maze: Arc<M>, shared: Arc<SharedSearchState>, fork_after: usize) -> Self {
        let start = shared.root();
        Self {
            id: shared.next_task_id(),
            maze,
            shared,
            start,
            fork_after,
            frontier: Vec::new(),
        }
    }

    /// Sibling task sharing this task's state, with a fresh frontier
    fn child(&self, start: NodeId) -> Self {
        Self {
            id: self.shared.next_task_id(),
            maze: Arc::clone(&self.maze),
            shared: Arc::clone(&self.shared),
            start,
            fork_after: self.fork_after,
            frontier: Vec::new(),
        }
    }

    pub fn id(&self) -> u64 {
        self.id
    }

    pub fn start(&self) -> NodeId {
        self.start
    }

    /// Run the task to completion. Yields the path from this task's start to
    /// a goal, or `None` if none was found from here.
    pub fn compute(self) -> BoxFuture<'static, Option<Vec<NodeId>>> {
        let span = debug_span!("task", task_id = self.id, start = self.start);
        self.run().instrument(span).boxed()
    }

    async fn run(mut self) -> Option<Vec<NodeId>> {
        let player = self.maze.new_player(self.start);
        self.shared.events.emit(SearchEvent::TaskStarted {
            task_id: self.id,
            start: self.start,
        });

        self.frontier.push(self.start);
        let path = self.explore(player).await;

        self.shared.events.emit(SearchEvent::TaskFinished {
            task_id: self.id,
            found: path.is_some(),
        });
        path
    }

    async fn explore(&mut self, player: PlayerId) -> Option<Vec<NodeId>> {
        while let Some(current) = self.frontier.pop() {
            if self.maze.has_goal(current) {
                if self.shared.goal.raise(current) {
                    debug!("Goal found at {}", current);
                }
                self.maze.move_player(player, current);
                self.shared.events.emit(SearchEvent::GoalFound {
                    task_id: self.id,
                    goal: current,
                });
                return self.path_to(current);
            }

            if self.shared.goal.is_set() || !self.shared.visited.insert(current) {
                continue;
            }

            self.maze.move_player(player, current);
            self.shared.metrics.record_expansion();

            let neighbors = self.maze.neighbors(current);
            for &next in &neighbors {
                self.frontier.push(next);
                if !self.shared.visited.contains(next) {
                    self.shared.record_predecessor(next, current);
                }
            }

            if neighbors.len() > self.fork_after {
                if let Some(path) = self.fork_and_join(current, &neighbors).await {
                    return Some(path);
                }
            }
        }
        None
    }

    /// Spawn one sibling per unvisited frontier cell and join them all in
    /// spawn order. Every handle is awaited even after a path turns up.
    async fn fork_and_join(
        &mut self,
        current: NodeId,
        neighbors: &[NodeId],
    ) -> Option<Vec<NodeId>> {
        let mut seen = HashSet::new();
        let starts: Vec<NodeId> = self
            .frontier
            .iter()
            .rev()
            .copied()
            .filter(|&node| !self.shared.visited.contains(node) && seen.insert(node))
            .collect();
        if starts.is_empty() {
            return None;
        }

        self.shared.metrics.record_fork(starts.len());
        debug!("Forking {} tasks at {}", starts.len(), current);
        self.shared.events.emit(SearchEvent::TasksForked {
            task_id: self.id,
            at: current,
            children: starts.clone(),
        });

        let handles: Vec<(NodeId, JoinHandle<Option<Vec<NodeId>>>)> = starts
            .into_iter()
            .map(|start| (start, tokio::spawn(self.child(start).compute())))
            .collect();

        let mut found = None;
        for (child_start, handle) in handles {
            let sub_path = match handle.await {
                Ok(sub_path) => sub_path,
                Err(e) => {
                    error!("Search task starting at {} failed: {}", child_start, e);
                    None
                }
            };
            if found.is_some() {
                continue;
            }
            if let Some(sub_path) = sub_path {
                found = self.splice(current, neighbors, sub_path);
            }
        }
        found
    }

    /// Prefix a child's path with the route from this task's start.
    ///
    /// The child started either next to `current` or at an older frontier
    /// entry; in the second case the prefix runs to that entry instead.
    fn splice(
        &self,
        current: NodeId,
        neighbors: &[NodeId],
        sub_path: Vec<NodeId>,
    ) -> Option<Vec<NodeId>> {
        let first = *sub_path.first()?;
        let mut path = if neighbors.contains(&first) {
            self.path_to(current)?
        } else {
            let mut prefix = self.path_to(first)?;
            prefix.pop();
            prefix
        };
        path.extend(sub_path);
        trace!("Spliced path of length {}", path.len());
        Some(path)
    }

    /// Reconstruct the path from this task's start to `node`. A broken chain
    /// is a local miss, not an error.
    fn path_to(&self, node: NodeId) -> Option<Vec<NodeId>> {
        let path = path_from_to(self.start, node, |n| self.shared.predecessors.get(n));
        if path.is_none() {
            warn!(
                "No predecessor chain from {} back to {}, skipping",
                node, self.start
            );
            self.shared.metrics.record_predecessor_miss();
            self.shared.events.emit(SearchEvent::PredecessorMiss {
                task_id: self.id,
                node,
            });
        }
        path
    }
}
