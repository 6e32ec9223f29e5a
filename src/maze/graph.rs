use crate::core::errors::{Result, SolverError};
use crate::maze::{Maze, NodeId, PlayerId};
use dashmap::DashMap;
use petgraph::graphmap::UnGraphMap;
use std::collections::HashSet;
use std::sync::atomic::{AtomicUsize, Ordering};
use tracing::debug;

/// In-memory maze backed by an undirected adjacency graph.
///
/// Neighbor order is the order in which edges touching a node were added, so
/// it is stable for the lifetime of the maze. Every player gets a trail of the
/// cells it was moved onto, which stands in for on-screen rendering.
#[derive(Debug, Default)]
pub struct GraphMaze {
    graph: UnGraphMap<NodeId, ()>,
    goals: HashSet<NodeId>,
    start: Option<NodeId>,
    next_player: AtomicUsize,
    trails: DashMap<PlayerId, Vec<NodeId>>,
}

impl GraphMaze {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_node(&mut self, node: NodeId) -> &mut Self {
        self.graph.add_node(node);
        self
    }

    /// Connect two cells. Both cells are created if missing.
    pub fn add_edge(&mut self, a: NodeId, b: NodeId) -> &mut Self {
        self.graph.add_edge(a, b, ());
        self
    }

    /// Connect consecutive cells of `nodes`
    pub fn add_path(&mut self, nodes: &[NodeId]) -> &mut Self {
        for pair in nodes.windows(2) {
            self.add_edge(pair[0], pair[1]);
        }
        self
    }

    pub fn add_goal(&mut self, node: NodeId) -> &mut Self {
        self.graph.add_node(node);
        self.goals.insert(node);
        self
    }

    pub fn set_start(&mut self, node: NodeId) -> &mut Self {
        self.graph.add_node(node);
        self.start = Some(node);
        self
    }

    /// Start cell, if one was set or parsed
    pub fn start(&self) -> Option<NodeId> {
        self.start
    }

    pub fn goals(&self) -> impl Iterator<Item = NodeId> + '_ {
        self.goals.iter().copied()
    }

    pub fn node_count(&self) -> usize {
        self.graph.node_count()
    }

    pub fn is_edge(&self, a: NodeId, b: NodeId) -> bool {
        self.graph.contains_edge(a, b)
    }

    /// True when `path` is non-empty, starts at `from`, ends on a goal and
    /// every consecutive pair is an edge.
    pub fn is_solution(&self, from: NodeId, path: &[NodeId]) -> bool {
        match (path.first(), path.last()) {
            (Some(&first), Some(&last)) => {
                first == from
                    && self.goals.contains(&last)
                    && path.windows(2).all(|pair| self.is_edge(pair[0], pair[1]))
            }
            _ => false,
        }
    }

    /// Cells visited by `player`, starting with the cell it was registered at
    pub fn trail(&self, player: PlayerId) -> Option<Vec<NodeId>> {
        self.trails.get(&player).map(|trail| trail.value().clone())
    }

    pub fn player_count(&self) -> usize {
        self.next_player.load(Ordering::Acquire)
    }

    /// Parse an ASCII grid.
    ///
    /// `#` is a wall, `.` or a space is open floor, `S` is the (single) start
    /// and `*` is a goal. Cell `(row, col)` becomes node `row * width + col`;
    /// open cells are joined to their open right and lower neighbors.
    pub fn from_ascii(text: &str) -> Result<Self> {
        let rows: Vec<&str> = text
            .lines()
            .map(|line| line.trim_end_matches('\r'))
            .filter(|line| !line.is_empty())
            .collect();
        let width = match rows.first() {
            Some(row) => row.chars().count(),
            None => return Err(SolverError::maze_parse(0, "maze is empty")),
        };

        let mut maze = Self::new();
        let mut open = vec![false; rows.len() * width];

        for (row, line) in rows.iter().enumerate() {
            if line.chars().count() != width {
                return Err(SolverError::maze_parse(
                    row + 1,
                    format!("expected {} columns, found {}", width, line.chars().count()),
                ));
            }
            for (col, cell) in line.chars().enumerate() {
                let node = row * width + col;
                match cell {
                    '#' => continue,
                    '.' | ' ' => {}
                    'S' => {
                        if maze.start.is_some() {
                            return Err(SolverError::maze_parse(row + 1, "more than one start"));
                        }
                        maze.set_start(node);
                    }
                    '*' => {
                        maze.add_goal(node);
                    }
                    other => {
                        return Err(SolverError::maze_parse(
                            row + 1,
                            format!("unknown cell '{}'", other),
                        ));
                    }
                }
                open[node] = true;
                maze.add_node(node);
            }
        }

        if maze.start.is_none() {
            return Err(SolverError::maze_parse(rows.len(), "maze has no start"));
        }

        let height = rows.len();
        for row in 0..height {
            for col in 0..width {
                let node = row * width + col;
                if !open[node] {
                    continue;
                }
                if col + 1 < width && open[node + 1] {
                    maze.add_edge(node, node + 1);
                }
                if row + 1 < height && open[node + width] {
                    maze.add_edge(node, node + width);
                }
            }
        }

        debug!(
            "Parsed {}x{} maze with {} open cells and {} goals",
            width,
            height,
            maze.node_count(),
            maze.goals.len()
        );
        Ok(maze)
    }

    /// Carve a random `width` x `height` grid maze with a depth-first walk
    /// from cell 0, then knock out `loops` extra walls so that some cells
    /// become reachable along more than one route. No goal is placed.
    pub fn carve(width: usize, height: usize, loops: usize, seed: u64) -> Result<Self> {
        if width == 0 || height == 0 {
            return Err(SolverError::configuration_field(
                "maze dimensions must be greater than 0",
                "width",
            ));
        }

        let cells = width * height;
        let mut rng = fastrand::Rng::with_seed(seed);
        let mut maze = Self::new();
        for node in 0..cells {
            maze.add_node(node);
        }
        maze.set_start(0);

        let mut seen = vec![false; cells];
        let mut stack = vec![0];
        seen[0] = true;
        while let Some(&cell) = stack.last() {
            let unseen: Vec<NodeId> = grid_neighbors(cell, width, height)
                .into_iter()
                .filter(|n| !seen[*n])
                .collect();
            if unseen.is_empty() {
                stack.pop();
                continue;
            }
            let next = unseen[rng.usize(..unseen.len())];
            seen[next] = true;
            maze.add_edge(cell, next);
            stack.push(next);
        }

        for _ in 0..loops {
            let cell = rng.usize(..cells);
            let around = grid_neighbors(cell, width, height);
            if around.is_empty() {
                break;
            }
            maze.add_edge(cell, around[rng.usize(..around.len())]);
        }

        Ok(maze)
    }
}

fn grid_neighbors(cell: NodeId, width: usize, height: usize) -> Vec<NodeId> {
    let (row, col) = (cell / width, cell % width);
    let mut out = Vec::with_capacity(4);
    if row > 0 {
        out.push(cell - width);
    }
    if col + 1 < width {
        out.push(cell + 1);
    }
    if row + 1 < height {
        out.push(cell + width);
    }
    if col > 0 {
        out.push(cell - 1);
    }
    out
}

impl Maze for GraphMaze {
    fn new_player(&self, start: NodeId) -> PlayerId {
        let player = self.next_player.fetch_add(1, Ordering::AcqRel);
        self.trails.insert(player, vec![start]);
        player
    }

    fn neighbors(&self, node: NodeId) -> Vec<NodeId> {
        self.graph.neighbors(node).collect()
    }

    fn has_goal(&self, node: NodeId) -> bool {
        self.goals.contains(&node)
    }

    fn move_player(&self, player: PlayerId, node: NodeId) {
        self.trails.entry(player).or_default().push(node);
    }
}
