//! Point-in-time copies of an algorithm's working data.
//!
//! A [`StateSnapshot`] is always an owned deep copy taken at the moment a
//! step is emitted. Later mutation of the algorithm's working data cannot
//! reach back into a recorded step.

use std::fmt;

use serde::{Deserialize, Serialize};

/// A path length that may be unbounded.
///
/// Serialized untagged: finite distances are JSON numbers, infinity is
/// `null`. Ordering puts every finite distance below [`Distance::Infinite`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Distance {
    Finite(i64),
    Infinite,
}

impl Distance {
    pub fn finite(self) -> Option<i64> {
        match self {
            Distance::Finite(v) => Some(v),
            Distance::Infinite => None,
        }
    }

    pub fn is_finite(self) -> bool {
        matches!(self, Distance::Finite(_))
    }

    /// Extends a path by an edge of weight `w`. Infinity absorbs; finite sums
    /// saturate instead of wrapping.
    pub fn plus(self, w: i64) -> Distance {
        match self {
            Distance::Finite(v) => Distance::Finite(v.saturating_add(w)),
            Distance::Infinite => Distance::Infinite,
        }
    }

    /// Sum of two path lengths, infinite if either side is.
    pub fn join(self, other: Distance) -> Distance {
        match other {
            Distance::Finite(w) => self.plus(w),
            Distance::Infinite => Distance::Infinite,
        }
    }
}

impl fmt::Display for Distance {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Distance::Finite(v) => write!(f, "{}", v),
            Distance::Infinite => write!(f, "∞"),
        }
    }
}

/// A weighted edge between two vertices.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct WeightedEdge {
    pub from: usize,
    pub to: usize,
    pub weight: i64,
}

impl WeightedEdge {
    pub fn new(from: usize, to: usize, weight: i64) -> Self {
        WeightedEdge { from, to, weight }
    }
}

/// Graph traversal state for node/edge renderers.
///
/// Fields a given algorithm does not track stay empty.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GraphState {
    /// Vertices in the order they were visited/settled.
    pub visited: Vec<usize>,
    /// Vertices discovered but not yet visited (queue/stack contents).
    pub frontier: Vec<usize>,
    /// Tentative or final distance per vertex.
    pub distances: Vec<Distance>,
    /// Edges of the search/shortest-path/spanning tree built so far.
    pub tree_edges: Vec<WeightedEdge>,
}

/// Deep copy of the data structure an algorithm operates over.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "camelCase")]
pub enum StateSnapshot {
    /// An ordered sequence of numbers (sorting, searching, 1-D DP).
    Sequence { values: Vec<i64> },
    /// Graph traversal state.
    Graph(GraphState),
    /// A square or rectangular matrix of path lengths.
    Matrix { cells: Vec<Vec<Distance>> },
    /// A 2-D integer grid (DP tables, chess boards). Highlights index cells
    /// in row-major order.
    Grid { cells: Vec<Vec<i64>> },
    /// String matching state: `window` is the current alignment of the
    /// pattern against the text, `table` an auxiliary table (failure
    /// function, hashes).
    Text {
        text: String,
        pattern: String,
        window: usize,
        table: Vec<i64>,
    },
}

impl StateSnapshot {
    pub fn sequence(values: &[i64]) -> Self {
        StateSnapshot::Sequence {
            values: values.to_vec(),
        }
    }

    pub fn graph(state: &GraphState) -> Self {
        StateSnapshot::Graph(state.clone())
    }

    pub fn matrix(cells: &[Vec<Distance>]) -> Self {
        StateSnapshot::Matrix {
            cells: cells.to_vec(),
        }
    }

    pub fn grid(cells: &[Vec<i64>]) -> Self {
        StateSnapshot::Grid {
            cells: cells.to_vec(),
        }
    }

    pub fn text(text: &str, pattern: &str, window: usize, table: &[i64]) -> Self {
        StateSnapshot::Text {
            text: text.to_string(),
            pattern: pattern.to_string(),
            window,
            table: table.to_vec(),
        }
    }

    /// The sequence contents, when this is a sequence snapshot.
    pub fn as_sequence(&self) -> Option<&[i64]> {
        match self {
            StateSnapshot::Sequence { values } => Some(values),
            _ => None,
        }
    }

    pub fn as_graph(&self) -> Option<&GraphState> {
        match self {
            StateSnapshot::Graph(state) => Some(state),
            _ => None,
        }
    }

    pub fn as_grid(&self) -> Option<&[Vec<i64>]> {
        match self {
            StateSnapshot::Grid { cells } => Some(cells),
            _ => None,
        }
    }

    pub fn as_matrix(&self) -> Option<&[Vec<Distance>]> {
        match self {
            StateSnapshot::Matrix { cells } => Some(cells),
            _ => None,
        }
    }

    /// Short name of the snapshot variant, for renderers and logs.
    pub fn kind_name(&self) -> &'static str {
        match self {
            StateSnapshot::Sequence { .. } => "sequence",
            StateSnapshot::Graph(_) => "graph",
            StateSnapshot::Matrix { .. } => "matrix",
            StateSnapshot::Grid { .. } => "grid",
            StateSnapshot::Text { .. } => "text",
        }
    }
}
