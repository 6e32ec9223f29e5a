//! Maze oracle consumed by the solvers
//!
//! The solvers never look at geometry. Everything they know about a maze comes
//! through the [`Maze`] trait: who is next to whom, where the goals are, and a
//! movement hook a renderer can observe.

pub mod graph;

pub use graph::GraphMaze;

/// Opaque identifier of a maze cell
pub type NodeId = usize;

/// Opaque identifier of a traversal marker handed out by [`Maze::new_player`]
pub type PlayerId = usize;

/// Graph oracle queried by every search task.
///
/// Implementations are shared by all tasks of a search and called from many
/// worker threads at once.
pub trait Maze: Send + Sync + 'static {
    /// Register a traversal marker at `start`. Called once per search task.
    fn new_player(&self, start: NodeId) -> PlayerId;

    /// Neighbors of `node`. Must return the same sequence every time for the
    /// same node.
    fn neighbors(&self, node: NodeId) -> Vec<NodeId>;

    /// Whether `node` holds a goal
    fn has_goal(&self, node: NodeId) -> bool;

    /// Record that `player` moved onto `node`. Safe to call concurrently for
    /// distinct players.
    fn move_player(&self, player: PlayerId, node: NodeId);
}
