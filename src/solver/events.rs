//! Event stream for search runs
//!
//! Provides typed events for task lifecycle, forks and goal discovery

use crate::maze::NodeId;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

/// Search event types
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum SearchEvent {
    TaskStarted {
        task_id: u64,
        start: NodeId,
    },
    TasksForked {
        task_id: u64,
        at: NodeId,
        children: Vec<NodeId>,
    },
    GoalFound {
        task_id: u64,
        goal: NodeId,
    },
    PredecessorMiss {
        task_id: u64,
        node: NodeId,
    },
    TaskFinished {
        task_id: u64,
        found: bool,
    },
}

/// Event envelope with metadata
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SearchEventEnvelope {
    pub sequence: u64,
    pub run_id: String,
    pub timestamp: u64,
    pub event: SearchEvent,
}

/// Event sink trait for emitting events
pub trait EventSink: Send + Sync {
    /// Emit an event
    fn emit(&self, envelope: &SearchEventEnvelope);
}

/// Sink that writes every search event to the `debug` log
pub struct LoggingEventSink;

impl EventSink for LoggingEventSink {
    fn emit(&self, envelope: &SearchEventEnvelope) {
        tracing::debug!(
            run_id = %envelope.run_id,
            sequence = envelope.sequence,
            "Search event: {:?}",
            envelope.event
        );
    }
}

/// Sink that keeps a run's events in memory, in emission order, so a
/// caller can replay forks and task lifecycles after the search returns
#[derive(Default)]
pub struct BufferingEventSink {
    events: parking_lot::RwLock<Vec<SearchEventEnvelope>>,
}

impl BufferingEventSink {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get_events(&self) -> Vec<SearchEventEnvelope> {
        self.events.read().clone()
    }

    /// Cells at which a fork happened, in emission order
    pub fn fork_sites(&self) -> Vec<NodeId> {
        self.events
            .read()
            .iter()
            .filter_map(|envelope| match envelope.event {
                SearchEvent::TasksForked { at, .. } => Some(at),
                _ => None,
            })
            .collect()
    }

    pub fn clear(&self) {
        self.events.write().clear();
    }
}

impl EventSink for BufferingEventSink {
    fn emit(&self, envelope: &SearchEventEnvelope) {
        self.events.write().push(envelope.clone());
    }
}

/// Per-search emitter: stamps events with the run id and a sequence number
/// before handing them to the sink.
pub struct EventEmitter {
    run_id: String,
    sink: Option<Arc<dyn EventSink>>,
    sequence: AtomicU64,
}

impl EventEmitter {
    pub fn new<S: Into<String>>(run_id: S, sink: Option<Arc<dyn EventSink>>) -> Self {
        Self {
            run_id: run_id.into(),
            sink,
            sequence: AtomicU64::new(0),
        }
    }

    /// Emitter that drops everything
    pub fn disabled() -> Self {
        Self::new(String::new(), None)
    }

    pub fn run_id(&self) -> &str {
        &self.run_id
    }

    pub fn emit(&self, event: SearchEvent) {
        if let Some(sink) = &self.sink {
            let envelope = SearchEventEnvelope {
                sequence: self.sequence.fetch_add(1, Ordering::SeqCst),
                run_id: self.run_id.clone(),
                timestamp: now_ms(),
                event,
            };
            sink.emit(&envelope);
        }
    }
}

impl fmt::Debug for EventEmitter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("EventEmitter")
            .field("run_id", &self.run_id)
            .field("has_sink", &self.sink.is_some())
            .field("sequence", &self.sequence.load(Ordering::Relaxed))
            .finish()
    }
}

/// Get current timestamp in milliseconds
pub fn now_ms() -> u64 {
    std::time::SystemTime::now()
        .duration_since(std::time::UNIX_EPOCH)
        .map(|elapsed| elapsed.as_millis() as u64)
        .unwrap_or(0)
}
