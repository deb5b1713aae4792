//! Graph traversals, shortest paths, orderings and spanning trees.
//!
//! Vertices are `0..vertex_count`. Edges are directed, except for the
//! spanning-tree algorithms which read them as undirected. Neighbours are
//! always visited in ascending vertex id (see [`Network`]).

use std::cmp::Reverse;
use std::collections::{BTreeSet, BinaryHeap, VecDeque};

use petgraph::unionfind::UnionFind;

use algoverse_core::{
    Distance, GraphState, InputShape, StateSnapshot, TraceError, WeightRule, WeightedEdge,
    MAX_VERTICES,
};

/// Floyd-Warshall copies its n * n matrix into every step.
pub const FLOYD_WARSHALL_MAX_VERTICES: usize = 16;

use crate::catalog::{AlgorithmDescriptor, Catalog, Category, Generator, GraphFn};
use crate::network::Network;
use crate::recorder::{Emission, Recorder};

pub(crate) fn register(catalog: &mut Catalog) {
    let graphs: [(&'static str, &'static str, WeightRule, GraphFn); 8] = [
        ("bfs", "Breadth-First Search", WeightRule::Any, bfs),
        ("dfs", "Depth-First Search", WeightRule::Any, dfs),
        ("topological-sort", "Topological Sort", WeightRule::Any, topological_sort),
        ("dijkstra", "Dijkstra's Shortest Paths", WeightRule::NonNegative, dijkstra),
        ("bellman-ford", "Bellman-Ford", WeightRule::Any, bellman_ford),
        ("floyd-warshall", "Floyd-Warshall", WeightRule::Any, floyd_warshall),
        ("kruskal", "Kruskal's Minimum Spanning Tree", WeightRule::Any, kruskal),
        ("prim", "Prim's Minimum Spanning Tree", WeightRule::Any, prim),
    ];
    for (id, name, weights, generate) in graphs {
        let max_vertices = if id == "floyd-warshall" {
            FLOYD_WARSHALL_MAX_VERTICES
        } else {
            MAX_VERTICES
        };
        catalog.register(AlgorithmDescriptor::new(
            id,
            name,
            Category::Graph,
            InputShape::Graph {
                weights,
                max_vertices,
            },
            Generator::Graph(generate),
        ));
    }
}

fn snap(state: &GraphState) -> StateSnapshot {
    StateSnapshot::graph(state)
}

fn unreached(visited: &[usize], n: usize) -> Vec<usize> {
    let seen: BTreeSet<usize> = visited.iter().copied().collect();
    (0..n).filter(|v| !seen.contains(v)).collect()
}

// ---------------------------------------------------------------------------
// Traversals
// ---------------------------------------------------------------------------

/// Breadth-first search from the source vertex.
pub fn bfs(rec: &mut Recorder, net: &Network) -> Result<Emission, TraceError> {
    let n = net.vertex_count();
    let source = net.source();
    let mut state = GraphState::default();
    let mut discovered = vec![false; n];
    let mut queue = VecDeque::from([source]);
    discovered[source] = true;
    state.frontier = vec![source];

    rec.emit(
        Emission::start(format!("Starting BFS from vertex {}", source), snap(&state))
            .highlight([source])
            .annotate("source", source),
    )?;

    while let Some(u) = queue.pop_front() {
        state.visited.push(u);
        state.frontier = queue.iter().copied().collect();
        rec.emit(
            Emission::visit(format!("Visiting vertex {}", u), snap(&state))
                .highlight([u])
                .annotate("order", state.visited.clone()),
        )?;

        for (v, w) in net.out_neighbors(u) {
            rec.emit(
                Emission::compare(format!("Checking edge {} -> {}", u, v), snap(&state))
                    .highlight([u, v]),
            )?;
            if discovered[v] {
                continue;
            }
            discovered[v] = true;
            queue.push_back(v);
            state.frontier.push(v);
            state.tree_edges.push(WeightedEdge::new(u, v, w));
            rec.emit(
                Emission::mutate(format!("Discovered vertex {}, enqueued", v), snap(&state))
                    .highlight([v]),
            )?;
        }
    }

    Ok(traversal_outcome("BFS", &state, n))
}

/// Depth-first search from the source vertex.
///
/// Runs on an explicit stack of frames, so deep graphs are bounded by the
/// step limit rather than the thread stack.
pub fn dfs(rec: &mut Recorder, net: &Network) -> Result<Emission, TraceError> {
    let n = net.vertex_count();
    let source = net.source();
    let mut state = GraphState::default();
    let mut visited = vec![false; n];

    rec.emit(
        Emission::start(format!("Starting DFS from vertex {}", source), snap(&state))
            .highlight([source])
            .annotate("source", source),
    )?;

    let mut stack = vec![dfs_enter(rec, net, source, &mut state, &mut visited)?];
    while let Some(frame) = stack.last_mut() {
        let u = frame.vertex;
        let Some((v, w)) = frame.neighbors.get(frame.next).copied() else {
            stack.pop();
            state.frontier.pop();
            rec.emit(
                Emission::decide(format!("Backtracking from vertex {}", u), snap(&state))
                    .highlight([u]),
            )?;
            continue;
        };
        frame.next += 1;

        rec.emit(
            Emission::compare(format!("Checking edge {} -> {}", u, v), snap(&state))
                .highlight([u, v]),
        )?;
        if visited[v] {
            rec.emit(
                Emission::decide(format!("Vertex {} already visited", v), snap(&state))
                    .highlight([v]),
            )?;
            continue;
        }
        state.tree_edges.push(WeightedEdge::new(u, v, w));
        stack.push(dfs_enter(rec, net, v, &mut state, &mut visited)?);
    }

    Ok(traversal_outcome("DFS", &state, n))
}

/// A vertex on the DFS path and the next neighbour to examine.
struct DfsFrame {
    vertex: usize,
    neighbors: Vec<(usize, i64)>,
    next: usize,
}

// `state.frontier` mirrors the frame stack.
fn dfs_enter(
    rec: &mut Recorder,
    net: &Network,
    u: usize,
    state: &mut GraphState,
    visited: &mut [bool],
) -> Result<DfsFrame, TraceError> {
    visited[u] = true;
    state.visited.push(u);
    state.frontier.push(u);
    rec.emit(
        Emission::visit(format!("Visiting vertex {}", u), snap(state))
            .highlight([u])
            .annotate("depth", state.frontier.len() - 1),
    )?;
    Ok(DfsFrame {
        vertex: u,
        neighbors: net.out_neighbors(u),
        next: 0,
    })
}

fn traversal_outcome(name: &str, state: &GraphState, n: usize) -> Emission {
    let missing = unreached(&state.visited, n);
    let description = if missing.is_empty() {
        format!("{} complete, visited order {:?}", name, state.visited)
    } else {
        format!(
            "{} complete, visited order {:?}; unreachable: {:?}",
            name, state.visited, missing
        )
    };
    Emission::outcome(description, snap(state))
        .highlight(state.visited.iter().copied())
        .annotate("order", state.visited.clone())
        .annotate("reachable", state.visited.len())
        .annotate("unreachable", missing)
}

/// Kahn's algorithm. Among ready vertices the smallest id goes first; a
/// cycle ends the run with the vertices left unordered.
pub fn topological_sort(rec: &mut Recorder, net: &Network) -> Result<Emission, TraceError> {
    let n = net.vertex_count();
    let mut indegree = net.in_degrees();
    let mut ready: BTreeSet<usize> = (0..n).filter(|&v| indegree[v] == 0).collect();
    let mut state = GraphState {
        frontier: ready.iter().copied().collect(),
        ..GraphState::default()
    };

    rec.emit(
        Emission::start(
            format!("Starting topological sort, {} vertices with in-degree 0", ready.len()),
            snap(&state),
        )
        .highlight(ready.iter().copied())
        .annotate("inDegrees", indegree.clone()),
    )?;

    while let Some(u) = ready.pop_first() {
        state.visited.push(u);
        state.frontier = ready.iter().copied().collect();
        rec.emit(
            Emission::visit(format!("Appending vertex {} to the order", u), snap(&state))
                .highlight([u])
                .annotate("order", state.visited.clone()),
        )?;

        for (v, w) in net.out_neighbors(u) {
            indegree[v] -= 1;
            state.tree_edges.push(WeightedEdge::new(u, v, w));
            rec.emit(
                Emission::mutate(
                    format!("Removed edge {} -> {}, in-degree of {} is now {}", u, v, v, indegree[v]),
                    snap(&state),
                )
                .highlight([u, v])
                .annotate("inDegree", indegree[v]),
            )?;
            if indegree[v] == 0 {
                ready.insert(v);
                state.frontier = ready.iter().copied().collect();
                rec.emit(
                    Emission::decide(format!("Vertex {} is ready", v), snap(&state))
                        .highlight([v]),
                )?;
            }
        }
    }

    if state.visited.len() < n {
        let remaining = unreached(&state.visited, n);
        return Ok(Emission::outcome(
            format!("Cycle detected: vertices {:?} cannot be ordered", remaining),
            snap(&state),
        )
        .highlight(remaining.iter().copied())
        .annotate("acyclic", false)
        .annotate("order", state.visited.clone())
        .annotate("remaining", remaining));
    }

    Ok(Emission::outcome(format!("Topological order: {:?}", state.visited), snap(&state))
        .highlight(0..n)
        .annotate("acyclic", true)
        .annotate("order", state.visited.clone()))
}

// ---------------------------------------------------------------------------
// Shortest paths
// ---------------------------------------------------------------------------

fn tree_from_parents(parents: &[Option<WeightedEdge>]) -> Vec<WeightedEdge> {
    parents.iter().flatten().copied().collect()
}

fn reachable_count(distances: &[Distance]) -> usize {
    distances.iter().filter(|d| d.is_finite()).count()
}

fn distances_text(distances: &[Distance]) -> String {
    let parts: Vec<String> = distances.iter().map(|d| d.to_string()).collect();
    format!("[{}]", parts.join(", "))
}

/// Dijkstra's algorithm with a binary heap. Equal tentative distances are
/// settled in ascending vertex id.
pub fn dijkstra(rec: &mut Recorder, net: &Network) -> Result<Emission, TraceError> {
    let n = net.vertex_count();
    let source = net.source();
    let mut state = GraphState {
        distances: vec![Distance::Infinite; n],
        ..GraphState::default()
    };
    let mut parents: Vec<Option<WeightedEdge>> = vec![None; n];
    let mut settled = vec![false; n];
    let mut heap = BinaryHeap::new();

    state.distances[source] = Distance::Finite(0);
    state.frontier = vec![source];
    heap.push(Reverse((0i64, source)));

    rec.emit(
        Emission::start(format!("Starting Dijkstra from vertex {}", source), snap(&state))
            .highlight([source])
            .annotate("source", source),
    )?;

    while let Some(Reverse((d, u))) = heap.pop() {
        if settled[u] {
            rec.emit(
                Emission::decide(
                    format!("Skipping stale queue entry for vertex {} ({})", u, d),
                    snap(&state),
                )
                .highlight([u]),
            )?;
            continue;
        }
        settled[u] = true;
        state.visited.push(u);
        state.frontier = open_vertices(&state.distances, &settled);
        rec.emit(
            Emission::visit(format!("Settled vertex {} at distance {}", u, d), snap(&state))
                .highlight([u])
                .annotate("distance", d),
        )?;

        for (v, w) in net.out_neighbors(u) {
            let candidate = Distance::Finite(d).plus(w);
            rec.emit(
                Emission::compare(
                    format!(
                        "Relaxing edge {} -> {}: {} + {} vs {}",
                        u, v, d, w, state.distances[v]
                    ),
                    snap(&state),
                )
                .highlight([u, v]),
            )?;
            if settled[v] || candidate >= state.distances[v] {
                continue;
            }
            state.distances[v] = candidate;
            parents[v] = Some(WeightedEdge::new(u, v, w));
            state.tree_edges = tree_from_parents(&parents);
            state.frontier = open_vertices(&state.distances, &settled);
            if let Distance::Finite(c) = candidate {
                heap.push(Reverse((c, v)));
            }
            rec.emit(
                Emission::mutate(
                    format!("Updated distance of vertex {} to {}", v, candidate),
                    snap(&state),
                )
                .highlight([v])
                .annotate("distance", candidate),
            )?;
        }
    }

    let reachable = reachable_count(&state.distances);
    Ok(Emission::outcome(
        format!(
            "Shortest distances from {}: {}",
            source,
            distances_text(&state.distances)
        ),
        snap(&state),
    )
    .highlight(state.visited.iter().copied())
    .annotate("reachable", reachable)
    .annotate("order", state.visited.clone()))
}

fn open_vertices(distances: &[Distance], settled: &[bool]) -> Vec<usize> {
    (0..distances.len())
        .filter(|&v| !settled[v] && distances[v].is_finite())
        .collect()
}

/// Bellman-Ford with early exit. Edges are relaxed in input order; a
/// further improvement after `n - 1` rounds reports a negative cycle.
pub fn bellman_ford(rec: &mut Recorder, net: &Network) -> Result<Emission, TraceError> {
    let n = net.vertex_count();
    let source = net.source();
    let mut state = GraphState {
        distances: vec![Distance::Infinite; n],
        ..GraphState::default()
    };
    let mut parents: Vec<Option<WeightedEdge>> = vec![None; n];
    state.distances[source] = Distance::Finite(0);

    rec.emit(
        Emission::start(format!("Starting Bellman-Ford from vertex {}", source), snap(&state))
            .highlight([source])
            .annotate("source", source),
    )?;

    for round in 1..n {
        rec.emit(
            Emission::decide(format!("Round {} of {}", round, n - 1), snap(&state))
                .annotate("round", round),
        )?;
        let mut changed = false;
        for edge in net.edges() {
            let from = state.distances[edge.from];
            rec.emit(
                Emission::compare(
                    format!(
                        "Relaxing edge {} -> {} ({}): {} + {} vs {}",
                        edge.from, edge.to, edge.weight, from, edge.weight, state.distances[edge.to]
                    ),
                    snap(&state),
                )
                .highlight([edge.from, edge.to]),
            )?;
            let candidate = from.plus(edge.weight);
            if !from.is_finite() || candidate >= state.distances[edge.to] {
                continue;
            }
            state.distances[edge.to] = candidate;
            parents[edge.to] = Some(*edge);
            state.tree_edges = tree_from_parents(&parents);
            changed = true;
            rec.emit(
                Emission::mutate(
                    format!("Updated distance of vertex {} to {}", edge.to, candidate),
                    snap(&state),
                )
                .highlight([edge.to])
                .annotate("distance", candidate),
            )?;
        }
        if !changed {
            rec.emit(Emission::decide(
                format!("Round {} changed nothing, stopping early", round),
                snap(&state),
            ))?;
            break;
        }
    }

    for edge in net.edges() {
        let from = state.distances[edge.from];
        rec.emit(
            Emission::compare(
                format!("Checking edge {} -> {} for a negative cycle", edge.from, edge.to),
                snap(&state),
            )
            .highlight([edge.from, edge.to]),
        )?;
        if from.is_finite() && from.plus(edge.weight) < state.distances[edge.to] {
            // Distances are meaningless once a cycle is reachable.
            let cyclic = GraphState::default();
            return Ok(Emission::outcome(
                format!(
                    "Negative cycle detected through edge {} -> {}",
                    edge.from, edge.to
                ),
                snap(&cyclic),
            )
            .highlight([edge.from, edge.to])
            .annotate("negativeCycle", true));
        }
    }

    let reachable = reachable_count(&state.distances);
    Ok(Emission::outcome(
        format!(
            "Shortest distances from {}: {}",
            source,
            distances_text(&state.distances)
        ),
        snap(&state),
    )
    .annotate("negativeCycle", false)
    .annotate("reachable", reachable))
}

/// All-pairs shortest paths. Highlights index matrix cells row-major.
pub fn floyd_warshall(rec: &mut Recorder, net: &Network) -> Result<Emission, TraceError> {
    let n = net.vertex_count();
    let mut dist = vec![vec![Distance::Infinite; n]; n];
    for (i, row) in dist.iter_mut().enumerate() {
        row[i] = Distance::Finite(0);
    }
    for edge in net.edges() {
        let w = Distance::Finite(edge.weight);
        if w < dist[edge.from][edge.to] {
            dist[edge.from][edge.to] = w;
        }
    }

    rec.emit(
        Emission::start(
            format!("Starting Floyd-Warshall on {} vertices", n),
            StateSnapshot::matrix(&dist),
        )
        .annotate("n", n),
    )?;

    let mut updates = 0usize;
    for k in 0..n {
        rec.emit(
            Emission::decide(
                format!("Allowing vertex {} as an intermediate", k),
                StateSnapshot::matrix(&dist),
            )
            .highlight((0..n).map(|j| k * n + j))
            .annotate("k", k),
        )?;
        for i in 0..n {
            if i == k || !dist[i][k].is_finite() {
                continue;
            }
            for j in 0..n {
                if j == k || !dist[k][j].is_finite() {
                    continue;
                }
                let through = dist[i][k].join(dist[k][j]);
                rec.emit(
                    Emission::compare(
                        format!(
                            "dist[{}][{}] = {} vs dist[{}][{}] + dist[{}][{}] = {}",
                            i, j, dist[i][j], i, k, k, j, through
                        ),
                        StateSnapshot::matrix(&dist),
                    )
                    .highlight([i * n + j, i * n + k, k * n + j]),
                )?;
                if through < dist[i][j] {
                    dist[i][j] = through;
                    updates += 1;
                    rec.emit(
                        Emission::mutate(
                            format!("Updated dist[{}][{}] to {}", i, j, through),
                            StateSnapshot::matrix(&dist),
                        )
                        .highlight([i * n + j]),
                    )?;
                }
            }
        }
    }

    let negative: Vec<usize> = (0..n)
        .filter(|&i| dist[i][i] < Distance::Finite(0))
        .collect();
    if !negative.is_empty() {
        return Ok(Emission::outcome(
            format!("Negative cycle detected through vertices {:?}", negative),
            StateSnapshot::matrix(&dist),
        )
        .highlight(negative.iter().map(|&i| i * n + i))
        .annotate("negativeCycle", true)
        .annotate("updates", updates));
    }

    Ok(Emission::outcome(
        "All-pairs shortest paths computed",
        StateSnapshot::matrix(&dist),
    )
    .annotate("negativeCycle", false)
    .annotate("updates", updates))
}

// ---------------------------------------------------------------------------
// Spanning trees
// ---------------------------------------------------------------------------

fn spanning_outcome(name: &str, state: &GraphState, n: usize) -> Emission {
    let total: i64 = state.tree_edges.iter().map(|e| e.weight).sum();
    let spanning = state.tree_edges.len() + 1 == n;
    let description = if spanning {
        format!("{} complete, total weight {}", name, total)
    } else {
        format!(
            "{} complete, graph is disconnected: forest of {} edges, total weight {}",
            name,
            state.tree_edges.len(),
            total
        )
    };
    Emission::outcome(description, snap(state))
        .annotate("spanning", spanning)
        .annotate("totalWeight", total)
        .annotate("edges", state.tree_edges.len())
}

/// Kruskal's algorithm. Edges are undirected; equal weights keep input
/// order.
pub fn kruskal(rec: &mut Recorder, net: &Network) -> Result<Emission, TraceError> {
    let n = net.vertex_count();
    let mut edges = net.edges().to_vec();
    edges.sort_by_key(|e| e.weight);
    let mut sets = UnionFind::<usize>::new(n);
    let mut state = GraphState::default();

    rec.emit(
        Emission::start(
            format!("Starting Kruskal with {} edges sorted by weight", edges.len()),
            snap(&state),
        )
        .annotate("edges", edges.len()),
    )?;

    for edge in edges {
        if state.tree_edges.len() + 1 >= n {
            break;
        }
        rec.emit(
            Emission::compare(
                format!(
                    "Considering edge {} - {} (weight {})",
                    edge.from, edge.to, edge.weight
                ),
                snap(&state),
            )
            .highlight([edge.from, edge.to]),
        )?;
        if sets.union(edge.from, edge.to) {
            state.tree_edges.push(edge);
            for v in [edge.from, edge.to] {
                if !state.visited.contains(&v) {
                    state.visited.push(v);
                }
            }
            rec.emit(
                Emission::mutate(
                    format!("Added edge {} - {} to the tree", edge.from, edge.to),
                    snap(&state),
                )
                .highlight([edge.from, edge.to]),
            )?;
        } else {
            rec.emit(
                Emission::decide(
                    format!("Skipped edge {} - {}: it would close a cycle", edge.from, edge.to),
                    snap(&state),
                )
                .highlight([edge.from, edge.to]),
            )?;
        }
    }

    Ok(spanning_outcome("Kruskal", &state, n))
}

/// Prim's algorithm from the source vertex, O(n^2) vertex selection.
/// Edges are undirected; equal keys pick the smaller vertex id.
pub fn prim(rec: &mut Recorder, net: &Network) -> Result<Emission, TraceError> {
    let n = net.vertex_count();
    let source = net.source();
    let mut in_tree = vec![false; n];
    let mut parents: Vec<Option<WeightedEdge>> = vec![None; n];
    let mut state = GraphState {
        distances: vec![Distance::Infinite; n],
        ..GraphState::default()
    };
    state.distances[source] = Distance::Finite(0);

    rec.emit(
        Emission::start(format!("Starting Prim from vertex {}", source), snap(&state))
            .highlight([source])
            .annotate("source", source),
    )?;

    loop {
        let next = (0..n)
            .filter(|&v| !in_tree[v] && state.distances[v].is_finite())
            .min_by_key(|&v| (state.distances[v], v));
        let Some(u) = next else {
            break;
        };

        in_tree[u] = true;
        state.visited.push(u);
        if let Some(edge) = parents[u] {
            state.tree_edges.push(edge);
        }
        state.frontier = (0..n)
            .filter(|&v| !in_tree[v] && state.distances[v].is_finite())
            .collect();
        rec.emit(
            Emission::visit(
                format!("Added vertex {} with key {}", u, state.distances[u]),
                snap(&state),
            )
            .highlight([u]),
        )?;

        for (v, w) in net.undirected_neighbors(u) {
            if in_tree[v] {
                continue;
            }
            rec.emit(
                Emission::compare(
                    format!(
                        "Edge {} - {} (weight {}) vs key {}",
                        u, v, w, state.distances[v]
                    ),
                    snap(&state),
                )
                .highlight([u, v]),
            )?;
            if Distance::Finite(w) < state.distances[v] {
                state.distances[v] = Distance::Finite(w);
                parents[v] = Some(WeightedEdge::new(u, v, w));
                state.frontier = (0..n)
                    .filter(|&x| !in_tree[x] && state.distances[x].is_finite())
                    .collect();
                rec.emit(
                    Emission::mutate(format!("Updated key of vertex {} to {}", v, w), snap(&state))
                        .highlight([v]),
                )?;
            }
        }
    }

    Ok(spanning_outcome("Prim", &state, n))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::recorder::{instrument, RecorderConfig};
    use algoverse_core::{StepKind, TraceRun, Value};

    fn run(f: GraphFn, n: usize, edges: &[(usize, usize, i64)], source: usize) -> TraceRun {
        let edges = edges
            .iter()
            .map(|&(a, b, w)| WeightedEdge::new(a, b, w))
            .collect();
        let net = Network::new(n, edges, source);
        instrument("graph", &RecorderConfig::default(), |rec| f(rec, &net)).unwrap()
    }

    fn final_graph(run: &TraceRun) -> GraphState {
        run.final_step()
            .and_then(|s| s.snapshot.as_graph())
            .cloned()
            .unwrap()
    }

    fn ann<'a>(run: &'a TraceRun, key: &str) -> &'a Value {
        run.final_step().and_then(|s| s.annotation(key)).unwrap()
    }

    // -----------------------------------------------------------------------
    // Traversals
    // -----------------------------------------------------------------------

    #[test]
    fn bfs_visits_neighbours_in_ascending_order() {
        let trace = run(bfs, 4, &[(0, 2, 1), (0, 1, 1), (2, 3, 1)], 0);
        assert_eq!(final_graph(&trace).visited, vec![0, 1, 2, 3]);
        assert_eq!(ann(&trace, "reachable"), &Value::Int(4));
    }

    #[test]
    fn bfs_reports_unreachable_vertices() {
        let trace = run(bfs, 3, &[(0, 1, 1)], 0);
        assert_eq!(ann(&trace, "unreachable"), &Value::Ints(vec![2]));
    }

    #[test]
    fn dfs_goes_deep_before_wide() {
        let trace = run(dfs, 4, &[(0, 1, 1), (0, 2, 1), (1, 3, 1)], 0);
        assert_eq!(final_graph(&trace).visited, vec![0, 1, 3, 2]);
        assert!(final_graph(&trace).frontier.is_empty());
    }

    #[test]
    fn dfs_walks_a_long_path_on_a_small_stack() {
        let n = 1000;
        // One recursive call per vertex would not fit in 128 KiB.
        let trace = std::thread::Builder::new()
            .stack_size(128 * 1024)
            .spawn(move || {
                let path: Vec<(usize, usize, i64)> = (1..n).map(|v| (v - 1, v, 1)).collect();
                run(dfs, n, &path, 0)
            })
            .unwrap()
            .join()
            .unwrap();
        assert!(trace.validate().is_ok());
        assert_eq!(final_graph(&trace).visited, (0..n).collect::<Vec<_>>());
        assert_eq!(ann(&trace, "reachable"), &Value::Int(n as i64));

        let deepest = trace
            .steps()
            .iter()
            .filter_map(|s| s.annotation("depth"))
            .last()
            .cloned();
        assert_eq!(deepest, Some(Value::Int(n as i64 - 1)));
    }

    #[test]
    fn dfs_step_kinds_follow_enter_check_backtrack() {
        let trace = run(dfs, 3, &[(0, 1, 1), (1, 0, 1), (0, 2, 1)], 0);
        let kinds: Vec<StepKind> = trace.steps().iter().map(|s| s.kind).collect();
        assert_eq!(
            kinds,
            vec![
                StepKind::Start,
                StepKind::Visit,   // 0
                StepKind::Compare, // 0 -> 1
                StepKind::Visit,   // 1
                StepKind::Compare, // 1 -> 0
                StepKind::Decide,  // already visited
                StepKind::Decide,  // backtrack 1
                StepKind::Compare, // 0 -> 2
                StepKind::Visit,   // 2
                StepKind::Decide,  // backtrack 2
                StepKind::Decide,  // backtrack 0
                StepKind::Outcome,
            ]
        );
    }

    #[test]
    fn topological_sort_prefers_smallest_ready_vertex() {
        let trace = run(topological_sort, 4, &[(2, 0, 1), (3, 1, 1), (0, 1, 1)], 0);
        assert_eq!(ann(&trace, "order"), &Value::Ints(vec![2, 0, 3, 1]));
        assert_eq!(ann(&trace, "acyclic"), &Value::Bool(true));
    }

    #[test]
    fn topological_sort_reports_cycle_as_outcome() {
        let trace = run(topological_sort, 3, &[(0, 1, 1), (1, 2, 1), (2, 1, 1)], 0);
        assert_eq!(ann(&trace, "acyclic"), &Value::Bool(false));
        assert_eq!(ann(&trace, "remaining"), &Value::Ints(vec![1, 2]));
    }

    // -----------------------------------------------------------------------
    // Shortest paths
    // -----------------------------------------------------------------------

    #[test]
    fn dijkstra_finds_shortest_distances() {
        let trace = run(
            dijkstra,
            4,
            &[(0, 1, 4), (0, 2, 1), (2, 1, 2), (1, 3, 1)],
            0,
        );
        let g = final_graph(&trace);
        assert_eq!(
            g.distances,
            vec![
                Distance::Finite(0),
                Distance::Finite(3),
                Distance::Finite(1),
                Distance::Finite(4)
            ]
        );
        assert_eq!(g.visited, vec![0, 2, 1, 3]);
        assert_eq!(g.tree_edges.len(), 3);
    }

    #[test]
    fn dijkstra_breaks_ties_by_vertex_id() {
        let trace = run(dijkstra, 3, &[(0, 2, 1), (0, 1, 1)], 0);
        assert_eq!(final_graph(&trace).visited, vec![0, 1, 2]);
    }

    #[test]
    fn dijkstra_leaves_unreachable_vertices_infinite() {
        let trace = run(dijkstra, 2, &[], 0);
        assert_eq!(final_graph(&trace).distances[1], Distance::Infinite);
        assert_eq!(ann(&trace, "reachable"), &Value::Int(1));
    }

    #[test]
    fn bellman_ford_handles_negative_edges() {
        let trace = run(bellman_ford, 3, &[(0, 1, 4), (0, 2, 5), (2, 1, -3)], 0);
        assert_eq!(final_graph(&trace).distances[1], Distance::Finite(2));
        assert_eq!(ann(&trace, "negativeCycle"), &Value::Bool(false));
    }

    #[test]
    fn bellman_ford_flags_negative_cycle() {
        let trace = run(bellman_ford, 2, &[(0, 1, 1), (1, 0, -3)], 0);
        assert_eq!(ann(&trace, "negativeCycle"), &Value::Bool(true));
        assert!(final_graph(&trace).distances.is_empty());
    }

    #[test]
    fn bellman_ford_stops_early_when_stable() {
        let trace = run(bellman_ford, 4, &[(0, 1, 1), (1, 2, 1), (2, 3, 1)], 0);
        let rounds = trace
            .iter()
            .filter(|s| s.kind == StepKind::Decide && s.description.starts_with("Round"))
            .count();
        // One round settles the chain, a second sees no change.
        assert_eq!(rounds, 3);
    }

    #[test]
    fn floyd_warshall_computes_all_pairs() {
        let trace = run(floyd_warshall, 3, &[(0, 1, 2), (1, 2, 3), (0, 2, 10)], 0);
        let cells = trace
            .final_step()
            .and_then(|s| s.snapshot.as_matrix())
            .unwrap()
            .to_vec();
        assert_eq!(cells[0][2], Distance::Finite(5));
        assert_eq!(cells[2][0], Distance::Infinite);
    }

    #[test]
    fn floyd_warshall_detects_negative_cycle() {
        let trace = run(floyd_warshall, 2, &[(0, 1, 1), (1, 0, -3)], 0);
        assert_eq!(ann(&trace, "negativeCycle"), &Value::Bool(true));
    }

    // -----------------------------------------------------------------------
    // Spanning trees
    // -----------------------------------------------------------------------

    const SQUARE: [(usize, usize, i64); 5] = [(0, 1, 1), (1, 2, 2), (2, 3, 1), (3, 0, 2), (0, 2, 3)];

    #[test]
    fn kruskal_and_prim_agree_on_total_weight() {
        for f in [kruskal as GraphFn, prim] {
            let trace = run(f, 4, &SQUARE, 0);
            assert_eq!(ann(&trace, "totalWeight"), &Value::Int(4));
            assert_eq!(ann(&trace, "spanning"), &Value::Bool(true));
        }
    }

    #[test]
    fn kruskal_keeps_input_order_for_equal_weights() {
        let trace = run(kruskal, 4, &SQUARE, 0);
        let tree = final_graph(&trace).tree_edges;
        assert_eq!(tree[0], WeightedEdge::new(0, 1, 1));
        assert_eq!(tree[1], WeightedEdge::new(2, 3, 1));
        assert_eq!(tree[2], WeightedEdge::new(1, 2, 2));
    }

    #[test]
    fn spanning_trees_report_disconnected_graphs() {
        for f in [kruskal as GraphFn, prim] {
            let trace = run(f, 3, &[(0, 1, 1)], 0);
            assert_eq!(ann(&trace, "spanning"), &Value::Bool(false));
        }
    }
}
