//! # amazed: parallel fork/join maze search
//!
//! Depth-first maze search that splits itself into concurrently running
//! sub-searches at junctions. All sub-searches of one run share a visited
//! set, a predecessor map and a goal-found flag; the first path found while
//! joining is handed back to the caller.
//!
//! ```rust,no_run
//! use amazed::{ForkJoinSolver, GraphMaze};
//! use std::sync::Arc;
//!
//! fn main() -> amazed::Result<()> {
//!     let maze = GraphMaze::from_ascii("S..#\n.#.#\n...*\n")?;
//!     let start = maze.start().unwrap_or(0);
//!     let outcome = ForkJoinSolver::new(Arc::new(maze), start).solve_blocking()?;
//!     println!("{:?}", outcome.path);
//!     Ok(())
//! }
//! ```

// Infrastructure: config, errors, logging setup
pub mod core;

pub mod maze;
pub mod solver;

// Re-exports for convenience
pub use crate::core::{init_tracing, Result, SolverConfig, SolverError};
pub use maze::{GraphMaze, Maze, NodeId, PlayerId};
pub use solver::{
    BufferingEventSink, EventSink, ForkJoinSolver, LoggingEventSink, SearchEvent, SearchOutcome,
    SequentialSolver,
};
