//! State shared by every task of one search tree
//!
//! Each container is safe per operation and nothing more: there are no
//! multi-step transactions and no lock is ever held by a caller. The search
//! tolerates the resulting races (two tasks expanding neighbors of the same
//! cell, a predecessor overwritten by a sibling) and never needs more.

use crate::maze::NodeId;
use crate::solver::events::EventEmitter;
use dashmap::{DashMap, DashSet};
use serde::{Deserialize, Serialize};
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::OnceLock;

/// Cells that some task has expanded. Only ever grows.
#[derive(Debug, Default)]
pub struct VisitedSet {
    nodes: DashSet<NodeId>,
}

impl VisitedSet {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn contains(&self, node: NodeId) -> bool {
        self.nodes.contains(&node)
    }

    /// Insert `node`, returning true if this call added it
    pub fn insert(&self, node: NodeId) -> bool {
        self.nodes.insert(node)
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }
}

/// Cell -> the cell it was discovered from. Last writer wins.
#[derive(Debug, Default)]
pub struct PredecessorMap {
    links: DashMap<NodeId, NodeId>,
}

impl PredecessorMap {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, node: NodeId) -> Option<NodeId> {
        self.links.get(&node).map(|link| *link.value())
    }

    /// Record `predecessor` for `node`, replacing any earlier link.
    /// Self links are ignored.
    pub fn put(&self, node: NodeId, predecessor: NodeId) {
        if node != predecessor {
            self.links.insert(node, predecessor);
        }
    }

    /// Record `predecessor` only if `node` has no link yet
    pub fn put_if_absent(&self, node: NodeId, predecessor: NodeId) -> bool {
        if node == predecessor {
            return false;
        }
        let mut inserted = false;
        self.links.entry(node).or_insert_with(|| {
            inserted = true;
            predecessor
        });
        inserted
    }

    pub fn contains(&self, node: NodeId) -> bool {
        self.links.contains_key(&node)
    }

    pub fn len(&self) -> usize {
        self.links.len()
    }

    pub fn is_empty(&self) -> bool {
        self.links.is_empty()
    }
}

/// Cooperative termination signal.
///
/// Tasks poll it once per loop iteration. It also keeps the first goal that
/// raised it so the driver can rebuild a path if every task's own
/// reconstruction lost a race.
#[derive(Debug, Default)]
pub struct GoalFlag {
    found: AtomicBool,
    first: OnceLock<NodeId>,
}

impl GoalFlag {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_set(&self) -> bool {
        self.found.load(Ordering::Acquire)
    }

    /// Raise the flag for `goal`. Returns true for the first caller only, and
    /// only that caller's goal is kept.
    pub fn raise(&self, goal: NodeId) -> bool {
        if self.found.swap(true, Ordering::AcqRel) {
            return false;
        }
        let _ = self.first.set(goal);
        true
    }

    /// Goal of the caller that won [`raise`](Self::raise)
    pub fn first_goal(&self) -> Option<NodeId> {
        self.first.get().copied()
    }
}

/// Counters for one search
#[derive(Debug, Default)]
pub struct SearchMetrics {
    tasks_spawned: AtomicU64,
    forks: AtomicU64,
    nodes_expanded: AtomicU64,
    predecessor_misses: AtomicU64,
}

impl SearchMetrics {
    pub fn record_fork(&self, children: usize) {
        self.forks.fetch_add(1, Ordering::Relaxed);
        self.tasks_spawned
            .fetch_add(children as u64, Ordering::Relaxed);
    }

    pub fn record_expansion(&self) {
        self.nodes_expanded.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_predecessor_miss(&self) {
        self.predecessor_misses.fetch_add(1, Ordering::Relaxed);
    }

    pub fn snapshot(&self) -> MetricsSnapshot {
        MetricsSnapshot {
            tasks_spawned: self.tasks_spawned.load(Ordering::Relaxed),
            forks: self.forks.load(Ordering::Relaxed),
            nodes_expanded: self.nodes_expanded.load(Ordering::Relaxed),
            predecessor_misses: self.predecessor_misses.load(Ordering::Relaxed),
        }
    }
}

/// Point-in-time copy of [`SearchMetrics`]
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct MetricsSnapshot {
    pub tasks_spawned: u64,
    pub forks: u64,
    pub nodes_expanded: u64,
    pub predecessor_misses: u64,
}

/// Everything the tasks of one search tree share, handed around as an
/// `Arc<SharedSearchState>`.
#[derive(Debug)]
pub struct SharedSearchState {
    root: NodeId,
    pub visited: VisitedSet,
    pub predecessors: PredecessorMap,
    pub goal: GoalFlag,
    pub metrics: SearchMetrics,
    pub events: EventEmitter,
    next_task_id: AtomicU64,
}

impl SharedSearchState {
    pub fn new(root: NodeId, events: EventEmitter) -> Self {
        Self {
            root,
            visited: VisitedSet::new(),
            predecessors: PredecessorMap::new(),
            goal: GoalFlag::new(),
            metrics: SearchMetrics::default(),
            events,
            next_task_id: AtomicU64::new(0),
        }
    }

    /// Start cell of the root task
    pub fn root(&self) -> NodeId {
        self.root
    }

    pub fn next_task_id(&self) -> u64 {
        self.next_task_id.fetch_add(1, Ordering::Relaxed)
    }

    /// Best-effort predecessor link. The root never gets one.
    pub fn record_predecessor(&self, node: NodeId, predecessor: NodeId) {
        if node != self.root {
            self.predecessors.put(node, predecessor);
        }
    }
}
