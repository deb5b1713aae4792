//! Caller inputs and the shapes algorithms expect.
//!
//! [`AlgorithmInput`] is what a caller hands to the recorder. It is parsed
//! untagged from JSON, so each variant is recognized by its field names:
//!
//! ```text
//! {"sequence": [5, 3, 1], "target": 3}                     -> Sequence
//! {"vertexCount": 4, "edges": [{"from": 0, "to": 1}]}       -> Graph
//! {"text": "abcab", "pattern": "ab"}                        -> Text
//! {"n": 8}                                                  -> Scalar
//! ```
//!
//! [`InputShape`] is the contract an algorithm declares. Its `Display` form
//! is the `expected_shape` reported by
//! [`TraceError::InvalidInput`](crate::TraceError::InvalidInput).
//!
//! Every step deep-copies the working data, so shapes cap input sizes at
//! what a visualization can show.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::snapshot::WeightedEdge;

/// Longest sequence accepted by the sequence shapes.
pub const MAX_SEQUENCE_LEN: usize = 128;
/// Default vertex cap for graph shapes.
pub const MAX_VERTICES: usize = 64;
pub const MAX_EDGES: usize = 256;
/// Largest absolute edge weight. Path and tree sums stay far from overflow.
pub const MAX_EDGE_WEIGHT: i64 = 1_000_000;
/// Default cap, in chars, for text and pattern.
pub const MAX_TEXT_LEN: usize = 256;

/// Input for sorting, searching and sequence-based DP/backtracking.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct SequenceInput {
    pub sequence: Vec<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub target: Option<i64>,
}

/// One edge of a graph input. `weight` defaults to 1.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct EdgeInput {
    pub from: usize,
    pub to: usize,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub weight: Option<i64>,
}

impl EdgeInput {
    pub fn new(from: usize, to: usize) -> Self {
        EdgeInput {
            from,
            to,
            weight: None,
        }
    }

    pub fn weighted(from: usize, to: usize, weight: i64) -> Self {
        EdgeInput {
            from,
            to,
            weight: Some(weight),
        }
    }

    pub fn weight(&self) -> i64 {
        self.weight.unwrap_or(1)
    }

    pub fn to_weighted(&self) -> WeightedEdge {
        WeightedEdge::new(self.from, self.to, self.weight())
    }
}

/// Input for graph algorithms. `source` defaults to vertex 0.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct GraphInput {
    pub vertex_count: usize,
    #[serde(default)]
    pub edges: Vec<EdgeInput>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub source: Option<usize>,
}

/// Input for string algorithms.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct TextInput {
    pub text: String,
    pub pattern: String,
}

/// Single scalar parameter (board size, term index).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ScalarInput {
    pub n: usize,
}

/// Any algorithm input.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum AlgorithmInput {
    Sequence(SequenceInput),
    Graph(GraphInput),
    Text(TextInput),
    Scalar(ScalarInput),
}

impl AlgorithmInput {
    pub fn sequence(values: Vec<i64>) -> Self {
        AlgorithmInput::Sequence(SequenceInput {
            sequence: values,
            target: None,
        })
    }

    pub fn search(values: Vec<i64>, target: i64) -> Self {
        AlgorithmInput::Sequence(SequenceInput {
            sequence: values,
            target: Some(target),
        })
    }

    pub fn graph(vertex_count: usize, edges: Vec<EdgeInput>, source: Option<usize>) -> Self {
        AlgorithmInput::Graph(GraphInput {
            vertex_count,
            edges,
            source,
        })
    }

    pub fn text(text: &str, pattern: &str) -> Self {
        AlgorithmInput::Text(TextInput {
            text: text.to_string(),
            pattern: pattern.to_string(),
        })
    }

    pub fn scalar(n: usize) -> Self {
        AlgorithmInput::Scalar(ScalarInput { n })
    }

    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(json)
    }

    /// Short name of the variant, used in shape mismatch messages.
    pub fn shape_name(&self) -> &'static str {
        match self {
            AlgorithmInput::Sequence(_) => "sequence",
            AlgorithmInput::Graph(_) => "graph",
            AlgorithmInput::Text(_) => "text",
            AlgorithmInput::Scalar(_) => "scalar",
        }
    }
}

/// Edge weight constraint of a graph algorithm.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum WeightRule {
    Any,
    NonNegative,
}

/// The input contract an algorithm declares.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "shape", rename_all = "snake_case")]
pub enum InputShape {
    /// Any sequence; a target, if given, is ignored.
    Sequence,
    /// A sequence plus a required target.
    SearchSequence,
    /// An ascending sequence plus a required target.
    SortedSearchSequence,
    /// At most `max_coins` positive denominations plus an amount in
    /// `0..=max_amount`.
    Coins { max_amount: i64, max_coins: usize },
    /// At most `max_len` non-negative numbers plus a target sum.
    SubsetSum { max_len: usize },
    /// Up to `max_vertices` vertices, an edge list and optional source.
    Graph {
        weights: WeightRule,
        max_vertices: usize,
    },
    /// Text and pattern of at most `max_len` chars each.
    Text {
        allow_empty_pattern: bool,
        max_len: usize,
    },
    /// One non-negative integer in `min..=max`.
    Scalar { min: usize, max: usize },
}

impl InputShape {
    /// Parses JSON as the input variant this shape expects.
    ///
    /// Unlike [`AlgorithmInput::from_json`], the error names the offending
    /// field, e.g. a fractional or non-numeric element.
    pub fn parse_json(&self, json: &str) -> Result<AlgorithmInput, String> {
        let parsed = match self {
            InputShape::Sequence
            | InputShape::SearchSequence
            | InputShape::SortedSearchSequence
            | InputShape::Coins { .. }
            | InputShape::SubsetSum { .. } => {
                serde_json::from_str(json).map(AlgorithmInput::Sequence)
            }
            InputShape::Graph { .. } => serde_json::from_str(json).map(AlgorithmInput::Graph),
            InputShape::Text { .. } => serde_json::from_str(json).map(AlgorithmInput::Text),
            InputShape::Scalar { .. } => serde_json::from_str(json).map(AlgorithmInput::Scalar),
        };
        parsed.map_err(|e| e.to_string())
    }

    /// Largest input size this shape accepts: elements for sequences (coins
    /// for coin change), vertices for graphs, chars for text, `max` for
    /// scalars.
    pub fn size_limit(&self) -> usize {
        match *self {
            InputShape::Sequence
            | InputShape::SearchSequence
            | InputShape::SortedSearchSequence => MAX_SEQUENCE_LEN,
            InputShape::Coins { max_coins, .. } => max_coins,
            InputShape::SubsetSum { max_len } => max_len,
            InputShape::Graph { max_vertices, .. } => max_vertices,
            InputShape::Text { max_len, .. } => max_len,
            InputShape::Scalar { max, .. } => max,
        }
    }

    fn reads_sequence(&self) -> bool {
        matches!(
            self,
            InputShape::Sequence
                | InputShape::SearchSequence
                | InputShape::SortedSearchSequence
                | InputShape::Coins { .. }
                | InputShape::SubsetSum { .. }
        )
    }

    /// Checks `input` against this shape, returning the reason on mismatch.
    pub fn validate(&self, input: &AlgorithmInput) -> Result<(), String> {
        if let (true, AlgorithmInput::Sequence(s)) = (self.reads_sequence(), input) {
            check_len("sequence", s.sequence.len(), MAX_SEQUENCE_LEN)?;
        }
        match (self, input) {
            (InputShape::Sequence, AlgorithmInput::Sequence(_)) => Ok(()),

            (InputShape::SearchSequence, AlgorithmInput::Sequence(s)) => {
                require_target(s).map(|_| ())
            }

            (InputShape::SortedSearchSequence, AlgorithmInput::Sequence(s)) => {
                require_target(s)?;
                match s.sequence.windows(2).position(|w| w[0] > w[1]) {
                    Some(i) => Err(format!(
                        "sequence is not ascending at index {} ({} > {})",
                        i + 1,
                        s.sequence[i],
                        s.sequence[i + 1]
                    )),
                    None => Ok(()),
                }
            }

            (
                InputShape::Coins {
                    max_amount,
                    max_coins,
                },
                AlgorithmInput::Sequence(s),
            ) => {
                let amount = require_target(s)?;
                check_len("coin list", s.sequence.len(), *max_coins)?;
                if let Some(coin) = s.sequence.iter().find(|c| **c <= 0) {
                    return Err(format!("coin {} is not positive", coin));
                }
                if amount < 0 || amount > *max_amount {
                    return Err(format!(
                        "amount {} is outside [0, {}]",
                        amount, max_amount
                    ));
                }
                Ok(())
            }

            (InputShape::SubsetSum { max_len }, AlgorithmInput::Sequence(s)) => {
                require_target(s)?;
                check_len("sequence", s.sequence.len(), *max_len)?;
                if let Some(v) = s.sequence.iter().find(|v| **v < 0) {
                    return Err(format!("element {} is negative", v));
                }
                Ok(())
            }

            (
                InputShape::Graph {
                    weights,
                    max_vertices,
                },
                AlgorithmInput::Graph(g),
            ) => validate_graph(g, *weights, *max_vertices),

            (
                InputShape::Text {
                    allow_empty_pattern,
                    max_len,
                },
                AlgorithmInput::Text(t),
            ) => {
                check_len("text", t.text.chars().count(), *max_len)?;
                check_len("pattern", t.pattern.chars().count(), *max_len)?;
                if !allow_empty_pattern && t.pattern.is_empty() {
                    Err("pattern is empty".into())
                } else {
                    Ok(())
                }
            }

            (InputShape::Scalar { min, max }, AlgorithmInput::Scalar(s)) => {
                if s.n < *min || s.n > *max {
                    Err(format!("n = {} is outside [{}, {}]", s.n, min, max))
                } else {
                    Ok(())
                }
            }

            (_, other) => Err(format!("got {} input", other.shape_name())),
        }
    }
}

fn require_target(s: &SequenceInput) -> Result<i64, String> {
    s.target.ok_or_else(|| "missing target".to_string())
}

fn check_len(what: &str, len: usize, max: usize) -> Result<(), String> {
    if len > max {
        Err(format!("{} of length {} exceeds the limit of {}", what, len, max))
    } else {
        Ok(())
    }
}

fn validate_graph(g: &GraphInput, weights: WeightRule, max_vertices: usize) -> Result<(), String> {
    if g.vertex_count == 0 {
        return Err("vertexCount must be at least 1".into());
    }
    if g.vertex_count > max_vertices {
        return Err(format!(
            "vertexCount {} exceeds the limit of {}",
            g.vertex_count, max_vertices
        ));
    }
    check_len("edge list", g.edges.len(), MAX_EDGES)?;
    if let Some(source) = g.source {
        if source >= g.vertex_count {
            return Err(format!(
                "source {} is out of range for {} vertices",
                source, g.vertex_count
            ));
        }
    }
    for (i, edge) in g.edges.iter().enumerate() {
        if edge.from >= g.vertex_count || edge.to >= g.vertex_count {
            return Err(format!(
                "edge {} ({} -> {}) references a vertex outside 0..{}",
                i, edge.from, edge.to, g.vertex_count
            ));
        }
        if edge.weight().unsigned_abs() > MAX_EDGE_WEIGHT.unsigned_abs() {
            return Err(format!(
                "edge {} ({} -> {}) has weight {} outside [-{}, {}]",
                i,
                edge.from,
                edge.to,
                edge.weight(),
                MAX_EDGE_WEIGHT,
                MAX_EDGE_WEIGHT
            ));
        }
        if weights == WeightRule::NonNegative && edge.weight() < 0 {
            return Err(format!(
                "edge {} ({} -> {}) has negative weight {}",
                i,
                edge.from,
                edge.to,
                edge.weight()
            ));
        }
    }
    Ok(())
}

impl fmt::Display for InputShape {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            InputShape::Sequence => write!(f, "{{sequence: number[]}}"),
            InputShape::SearchSequence => write!(f, "{{sequence: number[], target: number}}"),
            InputShape::SortedSearchSequence => {
                write!(f, "{{sequence: number[] (ascending), target: number}}")
            }
            InputShape::Coins {
                max_amount,
                max_coins,
            } => write!(
                f,
                "{{sequence: positive number[] (at most {} coins), target: int in [0, {}] (amount)}}",
                max_coins, max_amount
            ),
            InputShape::SubsetSum { max_len } => write!(
                f,
                "{{sequence: non-negative number[] (at most {}), target: number}}",
                max_len
            ),
            InputShape::Graph {
                weights,
                max_vertices,
            } => {
                let weight = match weights {
                    WeightRule::Any => "int",
                    WeightRule::NonNegative => "non-negative int",
                };
                write!(
                    f,
                    "{{vertexCount: int in [1, {}], edges: {{from: int, to: int, weight?: {}}}[], source?: int}}",
                    max_vertices, weight
                )
            }
            InputShape::Text {
                allow_empty_pattern,
                ..
            } => {
                if *allow_empty_pattern {
                    write!(f, "{{text: string, pattern: string}}")
                } else {
                    write!(f, "{{text: string, pattern: non-empty string}}")
                }
            }
            InputShape::Scalar { min, max } => write!(f, "{{n: int in [{}, {}]}}", min, max),
        }
    }
}
