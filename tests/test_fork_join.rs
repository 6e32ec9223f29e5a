//! Scenario tests for the fork/join solver
//!
//! Each test builds a small hand-drawn maze and checks the path that comes
//! back together with the fork events the search emitted.

use amazed::{
    BufferingEventSink, ForkJoinSolver, GraphMaze, Maze, NodeId, PlayerId, SearchEvent,
    SearchOutcome, SolverConfig,
};
use anyhow::Result;
use pretty_assertions::assert_eq;
use std::sync::Arc;
use std::thread;
use std::time::Duration;

async fn solve_with_events(
    maze: Arc<GraphMaze>,
    start: usize,
    config: SolverConfig,
) -> Result<(SearchOutcome, Arc<BufferingEventSink>)> {
    let sink = Arc::new(BufferingEventSink::new());
    let outcome = ForkJoinSolver::new(maze, start)
        .with_config(config)
        .with_event_sink(sink.clone())
        .solve()
        .await?;
    Ok((outcome, sink))
}

/// 0-1-2-3-4-5, then three branches off 5; the middle one ends on a goal.
fn junction_maze() -> GraphMaze {
    let mut maze = GraphMaze::new();
    maze.add_path(&[0, 1, 2, 3, 4, 5])
        .add_path(&[5, 10, 11, 12])
        .add_path(&[5, 20, 21, 22])
        .add_path(&[5, 30, 31, 32])
        .add_goal(22);
    maze
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_corridor_never_forks() -> Result<()> {
    let mut maze = GraphMaze::new();
    maze.add_path(&(0..10).collect::<Vec<_>>()).add_goal(9);

    let (outcome, sink) =
        solve_with_events(Arc::new(maze), 0, SolverConfig::default()).await?;

    assert_eq!(outcome.path, Some((0..10).collect::<Vec<_>>()));
    assert!(sink.fork_sites().is_empty());
    assert_eq!(outcome.metrics.tasks_spawned, 0);
    Ok(())
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_junction_forks_once() -> Result<()> {
    let maze = Arc::new(junction_maze());

    let (outcome, sink) = solve_with_events(maze.clone(), 0, SolverConfig::default()).await?;

    assert_eq!(sink.fork_sites(), vec![5]);
    assert_eq!(outcome.path, Some(vec![0, 1, 2, 3, 4, 5, 20, 21, 22]));
    assert!(maze.is_solution(0, outcome.path.as_deref().unwrap_or_default()));
    Ok(())
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_fork_children_are_unvisited_frontier_cells() -> Result<()> {
    let (_, sink) =
        solve_with_events(Arc::new(junction_maze()), 0, SolverConfig::default()).await?;

    let children: Vec<Vec<usize>> = sink
        .get_events()
        .into_iter()
        .filter_map(|envelope| match envelope.event {
            SearchEvent::TasksForked { children, .. } => Some(children),
            _ => None,
        })
        .collect();
    // Top of the stack first; 4 is already visited
    assert_eq!(children, vec![vec![30, 20, 10]]);
    Ok(())
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_every_task_registers_one_player() -> Result<()> {
    let maze = Arc::new(junction_maze());

    let (outcome, sink) = solve_with_events(maze.clone(), 0, SolverConfig::default()).await?;

    let started = sink
        .get_events()
        .iter()
        .filter(|e| matches!(e.event, SearchEvent::TaskStarted { .. }))
        .count();
    let finished = sink
        .get_events()
        .iter()
        .filter(|e| matches!(e.event, SearchEvent::TaskFinished { .. }))
        .count();

    let tasks = 1 + outcome.metrics.tasks_spawned as usize;
    assert_eq!(started, tasks);
    assert_eq!(finished, tasks);
    assert_eq!(maze.player_count(), tasks);
    Ok(())
}

/// Delegates to a [`GraphMaze`] but stalls any task that starts on `slow`
struct SlowStartMaze {
    inner: GraphMaze,
    slow: NodeId,
    delay: Duration,
}

impl Maze for SlowStartMaze {
    fn new_player(&self, start: NodeId) -> PlayerId {
        if start == self.slow {
            thread::sleep(self.delay);
        }
        self.inner.new_player(start)
    }

    fn neighbors(&self, node: NodeId) -> Vec<NodeId> {
        self.inner.neighbors(node)
    }

    fn has_goal(&self, node: NodeId) -> bool {
        self.inner.has_goal(node)
    }

    fn move_player(&self, player: PlayerId, node: NodeId) {
        self.inner.move_player(player, node)
    }
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_spawner_joins_children_after_path_found() -> Result<()> {
    // 10 is spawned last, long after the child at 20 has found the goal
    let maze = Arc::new(SlowStartMaze {
        inner: junction_maze(),
        slow: 10,
        delay: Duration::from_millis(300),
    });
    let sink = Arc::new(BufferingEventSink::new());

    let outcome = ForkJoinSolver::new(maze.clone(), 0)
        .with_event_sink(sink.clone())
        .solve()
        .await?;

    assert_eq!(outcome.path, Some(vec![0, 1, 2, 3, 4, 5, 20, 21, 22]));
    let events = sink.get_events();
    let finished = events
        .iter()
        .filter(|e| matches!(e.event, SearchEvent::TaskFinished { .. }))
        .count();
    assert_eq!(finished, 4);
    assert!(events
        .iter()
        .any(|e| e.event == SearchEvent::TaskStarted { task_id: 3, start: 10 }));

    let players = maze.inner.player_count();
    assert_eq!(players, 4);
    let slow_trail = (0..players)
        .filter_map(|player| maze.inner.trail(player))
        .find(|trail| trail.first() == Some(&10));
    assert!(slow_trail.is_some());
    Ok(())
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_threshold_is_strict() -> Result<()> {
    // Node 1 has exactly three neighbors
    let mut maze = GraphMaze::new();
    maze.add_path(&[0, 1, 2, 3]).add_path(&[1, 4]).add_goal(3);
    let maze = Arc::new(maze);

    let (outcome, sink) = solve_with_events(
        maze.clone(),
        0,
        SolverConfig::default().with_fork_after(3),
    )
    .await?;
    assert!(sink.fork_sites().is_empty());
    assert_eq!(outcome.path, Some(vec![0, 1, 2, 3]));

    let (outcome, sink) = solve_with_events(maze, 0, SolverConfig::default()).await?;
    assert_eq!(sink.fork_sites(), vec![1]);
    assert_eq!(outcome.path, Some(vec![0, 1, 2, 3]));
    Ok(())
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_disconnected_goal_is_unreachable() -> Result<()> {
    let mut maze = GraphMaze::new();
    maze.add_path(&[0, 1, 2, 3])
        .add_path(&[1, 4, 5])
        .add_path(&[1, 6])
        .add_path(&[100, 101])
        .add_goal(101);

    let (outcome, sink) =
        solve_with_events(Arc::new(maze), 0, SolverConfig::default()).await?;

    assert_eq!(outcome.path, None);
    assert_eq!(outcome.visited, 7);
    assert!(!sink
        .get_events()
        .iter()
        .any(|e| matches!(e.event, SearchEvent::GoalFound { .. })));
    Ok(())
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_maze_without_goal() -> Result<()> {
    let maze = GraphMaze::carve(6, 6, 4, 3)?;
    let outcome = ForkJoinSolver::new(Arc::new(maze), 0).solve().await?;
    assert_eq!(outcome.path, None);
    assert_eq!(outcome.visited, 36);
    Ok(())
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_two_goals_yield_one_valid_path() -> Result<()> {
    let mut maze = GraphMaze::new();
    maze.add_path(&[0, 1, 2])
        .add_path(&[2, 10, 11, 12])
        .add_path(&[2, 20, 21, 22])
        .add_goal(12)
        .add_goal(22);
    let maze = Arc::new(maze);

    let outcome = ForkJoinSolver::new(maze.clone(), 0).solve().await?;

    let path = outcome.path.expect("a goal is reachable");
    assert!(maze.is_solution(0, &path));
    assert!(matches!(path.last(), Some(12) | Some(22)));
    Ok(())
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_star_of_goals_surfaces_single_path() -> Result<()> {
    let mut maze = GraphMaze::new();
    for leaf in 1..=8 {
        maze.add_edge(0, leaf).add_goal(leaf);
    }
    let maze = Arc::new(maze);

    let outcome = ForkJoinSolver::new(maze.clone(), 0).solve().await?;

    let path = outcome.path.expect("every leaf is a goal");
    assert_eq!(path.len(), 2);
    assert!(maze.is_solution(0, &path));
    Ok(())
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_start_on_goal() -> Result<()> {
    let mut maze = GraphMaze::new();
    maze.add_path(&[0, 1, 2]).add_goal(1);
    let outcome = ForkJoinSolver::new(Arc::new(maze), 1).solve().await?;
    assert_eq!(outcome.path, Some(vec![1]));
    Ok(())
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_ascii_maze_with_loops() -> Result<()> {
    let maze = Arc::new(GraphMaze::from_ascii(
        "\
S.....#....
.##.#.#.##.
.#..#...#..
.#.####.#.#
...#....#.*
",
    )?);
    let start = maze.start().unwrap_or_default();

    for _ in 0..10 {
        let outcome = ForkJoinSolver::new(maze.clone(), start).solve().await?;
        let path = outcome.path.expect("goal is reachable");
        assert!(maze.is_solution(start, &path));
    }
    Ok(())
}
