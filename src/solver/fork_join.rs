use crate::core::config::SolverConfig;
use crate::core::errors::{Result, SolverError};
use crate::maze::{Maze, NodeId};
use crate::solver::events::{EventEmitter, EventSink};
use crate::solver::path::path_from_to;
use crate::solver::sequential::SequentialSolver;
use crate::solver::shared::{MetricsSnapshot, SharedSearchState};
use crate::solver::task::SearchTask;
use serde::Serialize;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tracing::{error, info, info_span, warn, Instrument};

/// Result of one search run
#[derive(Debug, Clone, Serialize)]
pub struct SearchOutcome {
    /// Path from the start to a goal, if one was found
    pub path: Option<Vec<NodeId>>,
    pub run_id: String,
    pub metrics: MetricsSnapshot,
    /// Cells expanded by any task
    pub visited: usize,
    pub elapsed: Duration,
}

impl SearchOutcome {
    pub fn is_found(&self) -> bool {
        self.path.is_some()
    }

    /// Goal cell the path ends on
    pub fn goal(&self) -> Option<NodeId> {
        self.path.as_ref().and_then(|path| path.last().copied())
    }
}

/// Parallel depth-first maze solver.
///
/// Every call to [`solve`](Self::solve) builds a fresh shared state, runs a
/// root [`SearchTask`] on the tokio runtime and lets it fork sub-searches at
/// junctions. The path returned is valid but not necessarily the shortest,
/// and may differ between runs.
pub struct ForkJoinSolver<M: Maze> {
    maze: Arc<M>,
    start: NodeId,
    config: SolverConfig,
    sink: Option<Arc<dyn EventSink>>,
}

impl<M: Maze> ForkJoinSolver<M> {
    pub fn new(maze: Arc<M>, start: NodeId) -> Self {
        Self {
            maze,
            start,
            config: SolverConfig::default(),
            sink: None,
        }
    }

    /// Parallel counterpart of a sequential solver: same maze, start cell
    /// and fan-out threshold.
    pub fn from_sequential(base: &SequentialSolver<M>) -> Self {
        Self::new(Arc::clone(base.maze()), base.start()).with_fork_after(base.fork_after())
    }

    pub fn with_config(mut self, config: SolverConfig) -> Self {
        self.config = config;
        self
    }

    /// Set the fan-out threshold
    pub fn with_fork_after(mut self, fork_after: usize) -> Self {
        self.config.fork_after = fork_after;
        self
    }

    pub fn with_event_sink(mut self, sink: Arc<dyn EventSink>) -> Self {
        self.sink = Some(sink);
        self
    }

    pub fn config(&self) -> &SolverConfig {
        &self.config
    }

    pub fn maze(&self) -> &Arc<M> {
        &self.maze
    }

    /// Search on the current tokio runtime.
    ///
    /// Must be called from within a runtime. A multi-threaded runtime is
    /// needed for sub-searches to actually run in parallel.
    pub async fn solve(&self) -> Result<SearchOutcome> {
        self.config.validate()?;

        let run_id = cuid2::create_id();
        let span = info_span!("search", run_id = %run_id, start = self.start);
        self.run(run_id).instrument(span).await
    }

    /// Build a dedicated multi-threaded runtime from the configuration and
    /// search on it, blocking the calling thread.
    ///
    /// Fails with a configuration error when called from inside a tokio
    /// runtime; use [`solve`](Self::solve) there.
    pub fn solve_blocking(&self) -> Result<SearchOutcome> {
        self.config.validate()?;
        if tokio::runtime::Handle::try_current().is_ok() {
            return Err(SolverError::configuration(
                "solve_blocking cannot run inside a tokio runtime, use solve",
            ));
        }

        let mut builder = tokio::runtime::Builder::new_multi_thread();
        builder
            .enable_all()
            .thread_name(self.config.thread_name.clone());
        if let Some(workers) = self.config.worker_threads {
            builder.worker_threads(workers);
        }
        let runtime = builder
            .build()
            .map_err(|e| SolverError::runtime("build search runtime", e))?;

        runtime.block_on(self.solve())
    }

    async fn run(&self, run_id: String) -> Result<SearchOutcome> {
        let started = Instant::now();
        let sink = if self.config.emit_events {
            self.sink.clone()
        } else {
            None
        };
        let shared = Arc::new(SharedSearchState::new(
            self.start,
            EventEmitter::new(run_id.clone(), sink),
        ));

        info!(
            "Starting fork/join search from {} (fork_after = {})",
            self.start, self.config.fork_after
        );

        let root = SearchTask::root(
            Arc::clone(&self.maze),
            Arc::clone(&shared),
            self.config.fork_after,
        );
        let mut path = match tokio::spawn(root.compute()).await {
            Ok(path) => path,
            Err(e) => {
                error!("Root search task failed: {}", e);
                None
            }
        };

        if path.is_none() {
            path = recover_path(&shared, self.start);
        }

        let outcome = SearchOutcome {
            path,
            run_id,
            metrics: shared.metrics.snapshot(),
            visited: shared.visited.len(),
            elapsed: started.elapsed(),
        };
        info!(
            "Search finished: found = {}, visited = {}, tasks spawned = {}, elapsed = {:?}",
            outcome.is_found(),
            outcome.visited,
            outcome.metrics.tasks_spawned,
            outcome.elapsed
        );
        Ok(outcome)
    }
}

/// Walk the shared predecessor map from the first goal back to `start`.
///
/// Every task's own reconstruction can lose a race with a sibling that
/// rewrote a link; the shared map may still connect the goal to the root.
/// `None` when no goal was raised or the chain is broken.
pub(crate) fn recover_path(shared: &SharedSearchState, start: NodeId) -> Option<Vec<NodeId>> {
    let goal = shared.goal.first_goal()?;
    let path = path_from_to(start, goal, |n| shared.predecessors.get(n));
    match &path {
        Some(_) => info!("Recovered path to goal {} from the shared predecessor map", goal),
        None => warn!("Goal {} was found but no chain leads back to {}", goal, start),
    }
    path
}
