pub mod events;
pub mod fork_join;
pub mod path;
pub mod sequential;
pub mod shared;
pub mod task;

pub use events::{
    BufferingEventSink, EventEmitter, EventSink, LoggingEventSink, SearchEvent,
    SearchEventEnvelope,
};
pub use fork_join::{ForkJoinSolver, SearchOutcome};
pub use path::path_from_to;
pub use sequential::SequentialSolver;
pub use shared::{
    GoalFlag, MetricsSnapshot, PredecessorMap, SearchMetrics, SharedSearchState, VisitedSet,
};
pub use task::SearchTask;
