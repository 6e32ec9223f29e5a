// Infrastructure shared by the solvers and the maze implementations

pub mod config;
pub mod errors;
pub mod telemetry;

// Re-export commonly used types
pub use config::{SolverConfig, DEFAULT_FORK_AFTER};
pub use errors::{Result, SolverError};
pub use telemetry::init_tracing;
