//! Graph model: input records, validated node/edge storage, initial placement
//!
//! `GraphData` is the wire-level contract with the loading collaborator
//! (lenient serde records). `Graph::build` turns it into the validated
//! runtime form the simulator and renderer operate on: indexed nodes with
//! positions and velocities, an edge list that never dangles, and adjacency
//! derived from symmetric `connections` lists without double-counting.

use std::collections::{HashMap, HashSet};

use rand::Rng;
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;
use serde::{Deserialize, Serialize};

use crate::camera::Bounds;
use crate::error::LoadResult;

/// Base disc radius for a node of weight 1.0, in world units
pub const BASE_RADIUS: f32 = 12.0;

/// Lower clamp for node radius
pub const MIN_RADIUS: f32 = 3.0;

/// Upper clamp for node radius
pub const MAX_RADIUS: f32 = 48.0;

/// Sphere radius used by the default placement
pub const DEFAULT_PLACEMENT_RADIUS: f32 = 100.0;

fn default_weight() -> f32 {
    1.0
}

/// Categorical palette for node groups (RGBA, normalized 0.0-1.0)
pub mod palette {
    /// d3 category10 scheme
    pub const CATEGORY: [[f32; 4]; 10] = [
        [0.122, 0.467, 0.706, 1.0], // #1f77b4 blue
        [1.000, 0.498, 0.055, 1.0], // #ff7f0e orange
        [0.173, 0.627, 0.173, 1.0], // #2ca02c green
        [0.839, 0.153, 0.157, 1.0], // #d62728 red
        [0.580, 0.404, 0.741, 1.0], // #9467bd purple
        [0.549, 0.337, 0.294, 1.0], // #8c564b brown
        [0.890, 0.467, 0.761, 1.0], // #e377c2 pink
        [0.498, 0.498, 0.498, 1.0], // #7f7f7f gray
        [0.737, 0.741, 0.133, 1.0], // #bcbd22 olive
        [0.090, 0.745, 0.812, 1.0], // #17becf cyan
    ];

    /// Resolve a group tag to its palette color (wraps past the table end)
    pub fn group_color(group: u32) -> [f32; 4] {
        CATEGORY[group as usize % CATEGORY.len()]
    }
}

/// A node record produced by the loading collaborator
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NodeRecord {
    /// Unique identifier for the node
    pub id: String,

    /// Human-readable label for display
    #[serde(default)]
    pub label: String,

    /// Relative importance; drives mass and visual size
    #[serde(default = "default_weight")]
    pub weight: f32,

    /// Categorical tag mapped to a palette color
    #[serde(default)]
    pub group: u32,

    /// Adjacent node ids (symmetric lists are deduplicated against `edges`)
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub connections: Vec<String>,
}

/// An edge record between two node ids
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EdgeRecord {
    /// Source node ID
    pub source: String,

    /// Target node ID
    pub target: String,

    /// Spring strength multiplier for this edge
    #[serde(default = "default_weight")]
    pub weight: f32,
}

/// Complete graph input from the loading collaborator
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct GraphData {
    /// All node records
    pub nodes: Vec<NodeRecord>,

    /// Explicit edges; may be empty when `connections` lists carry adjacency
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub edges: Vec<EdgeRecord>,
}

impl GraphData {
    /// Parse graph input from a JSON document
    pub fn from_json(json: &str) -> LoadResult<Self> {
        Ok(serde_json::from_str(json)?)
    }
}

/// How initial positions are assigned at build time
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Placement {
    /// Evenly distributed on a sphere (Fibonacci lattice); deterministic
    FibonacciSphere { radius: f32 },
    /// Uniform random inside a cube centered on the origin; seeded
    RandomCube { extent: f32 },
}

impl Default for Placement {
    fn default() -> Self {
        Placement::FibonacciSphere {
            radius: DEFAULT_PLACEMENT_RADIUS,
        }
    }
}

/// A laid-out node; position and velocity are owned by the simulator
#[derive(Debug, Clone)]
pub struct Node {
    /// Unique identifier (from NodeRecord)
    pub id: String,
    /// Human-readable label for display
    pub label: String,
    /// Position in world space
    pub x: f32,
    pub y: f32,
    pub z: f32,
    /// Velocity
    pub vx: f32,
    pub vy: f32,
    pub vz: f32,
    /// Mass and size driver
    pub weight: f32,
    /// Categorical tag
    pub group: u32,
    /// RGBA color resolved from the group palette
    pub color: [f32; 4],
    /// Disc radius in world units, derived from weight
    pub radius: f32,
}

/// An edge between node indices; read-only after construction
#[derive(Debug, Clone)]
pub struct Edge {
    pub source: usize,
    pub target: usize,
    /// Spring strength multiplier
    pub weight: f32,
}

/// Counts reported by `Graph::build` so callers can observe what was kept
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct LoadSummary {
    /// Nodes kept
    pub nodes: usize,
    /// Edges kept (explicit plus derived)
    pub edges: usize,
    /// Records skipped for an unusable (empty) id
    pub skipped_records: usize,
    /// Records skipped because their id was already taken
    pub duplicate_ids: usize,
    /// Edges dropped for dangling endpoints or self-loops
    pub dropped_edges: usize,
}

/// Validated node/edge container queried by every other component
#[derive(Debug, Clone, Default)]
pub struct Graph {
    pub nodes: Vec<Node>,
    pub edges: Vec<Edge>,
    index_by_id: HashMap<String, usize>,
}

impl Graph {
    /// Build a validated graph from loader records
    ///
    /// Never fails: records without a usable id and unresolvable edges are
    /// dropped with a warning and counted in the returned summary; a
    /// non-finite weight falls back to the default. Duplicate node ids keep
    /// the first record seen. Adjacency from `connections` is materialized
    /// once per unordered pair and skipped when an explicit edge already
    /// covers the pair, so symmetric lists do not double a spring.
    pub fn build(data: &GraphData, placement: Placement, seed: u64) -> (Self, LoadSummary) {
        let mut summary = LoadSummary::default();
        let mut nodes: Vec<Node> = Vec::with_capacity(data.nodes.len());
        let mut index_by_id: HashMap<String, usize> = HashMap::with_capacity(data.nodes.len());

        for record in &data.nodes {
            if record.id.is_empty() {
                tracing::warn!("skipping node record with empty id");
                summary.skipped_records += 1;
                continue;
            }
            if index_by_id.contains_key(&record.id) {
                tracing::warn!("skipping duplicate node id {}", record.id);
                summary.duplicate_ids += 1;
                continue;
            }
            let weight = if record.weight.is_finite() {
                record.weight.max(0.0)
            } else {
                tracing::warn!("node {} has non-finite weight, using default", record.id);
                default_weight()
            };
            let index = nodes.len();
            index_by_id.insert(record.id.clone(), index);
            nodes.push(Node {
                id: record.id.clone(),
                label: record.label.clone(),
                x: 0.0,
                y: 0.0,
                z: 0.0,
                vx: 0.0,
                vy: 0.0,
                vz: 0.0,
                weight,
                group: record.group,
                color: palette::group_color(record.group),
                radius: (BASE_RADIUS * weight.sqrt()).clamp(MIN_RADIUS, MAX_RADIUS),
            });
        }

        place_nodes(&mut nodes, placement, seed);

        // Explicit edges first; duplicates among them are permitted but still
        // register the pair so derived adjacency does not repeat it.
        let mut edges: Vec<Edge> = Vec::new();
        let mut seen: HashSet<(usize, usize)> = HashSet::new();
        for record in &data.edges {
            let (Some(&source), Some(&target)) = (
                index_by_id.get(&record.source),
                index_by_id.get(&record.target),
            ) else {
                tracing::warn!(
                    "dropping edge {} -> {}: unknown endpoint",
                    record.source,
                    record.target
                );
                summary.dropped_edges += 1;
                continue;
            };
            if source == target {
                tracing::warn!("dropping self-loop on {}", record.source);
                summary.dropped_edges += 1;
                continue;
            }
            let weight = if record.weight.is_finite() {
                record.weight.max(0.0)
            } else {
                default_weight()
            };
            seen.insert(ordered_pair(source, target));
            edges.push(Edge {
                source,
                target,
                weight,
            });
        }

        // Adjacency lists: one edge per unordered pair not already covered.
        for record in &data.nodes {
            let Some(&source) = index_by_id.get(&record.id) else {
                continue;
            };
            for other in &record.connections {
                let Some(&target) = index_by_id.get(other) else {
                    tracing::warn!("dropping connection {} -> {}: unknown id", record.id, other);
                    summary.dropped_edges += 1;
                    continue;
                };
                if source == target {
                    summary.dropped_edges += 1;
                    continue;
                }
                if seen.insert(ordered_pair(source, target)) {
                    edges.push(Edge {
                        source,
                        target,
                        weight: default_weight(),
                    });
                }
            }
        }

        summary.nodes = nodes.len();
        summary.edges = edges.len();
        (
            Self {
                nodes,
                edges,
                index_by_id,
            },
            summary,
        )
    }

    /// Look up a node index by id
    pub fn index_of(&self, id: &str) -> Option<usize> {
        self.index_by_id.get(id).copied()
    }

    /// Indices adjacent to the given node index
    pub fn neighbor_indices(&self, index: usize) -> HashSet<usize> {
        let mut neighbors = HashSet::new();
        for edge in &self.edges {
            if edge.source == index {
                neighbors.insert(edge.target);
            } else if edge.target == index {
                neighbors.insert(edge.source);
            }
        }
        neighbors
    }

    /// Ids adjacent to the given node id; empty for unknown ids
    pub fn neighbors_of(&self, id: &str) -> HashSet<&str> {
        match self.index_of(id) {
            Some(index) => self
                .neighbor_indices(index)
                .into_iter()
                .map(|i| self.nodes[i].id.as_str())
                .collect(),
            None => HashSet::new(),
        }
    }

    /// Axis-aligned bounds of every node's disc, for view fitting
    pub fn bounds(&self) -> Bounds {
        let mut bounds = Bounds::empty();
        for node in &self.nodes {
            bounds.include_sphere(node.x, node.y, node.z, node.radius);
        }
        bounds
    }
}

fn ordered_pair(a: usize, b: usize) -> (usize, usize) {
    if a <= b { (a, b) } else { (b, a) }
}

fn place_nodes(nodes: &mut [Node], placement: Placement, seed: u64) {
    match placement {
        Placement::FibonacciSphere { radius } => {
            let total = nodes.len();
            for (index, node) in nodes.iter_mut().enumerate() {
                let (x, y, z) = fibonacci_sphere(index, total, radius);
                node.x = x;
                node.y = y;
                node.z = z;
            }
        }
        Placement::RandomCube { extent } => {
            let mut rng = ChaCha8Rng::seed_from_u64(seed);
            let extent = extent.abs().max(1.0e-3);
            for node in nodes.iter_mut() {
                node.x = rng.gen_range(-extent..extent);
                node.y = rng.gen_range(-extent..extent);
                node.z = rng.gen_range(-extent..extent);
            }
        }
    }
}

/// Evenly distribute point `index` of `total` on a sphere (Fibonacci lattice)
fn fibonacci_sphere(index: usize, total: usize, radius: f32) -> (f32, f32, f32) {
    let golden_ratio = (1.0 + 5.0_f32.sqrt()) / 2.0;
    let i = index as f32;
    let n = total.max(1) as f32;

    let theta = 2.0 * std::f32::consts::PI * i / golden_ratio;
    let phi = (1.0 - 2.0 * (i + 0.5) / n).acos();

    (
        radius * phi.sin() * theta.cos(),
        radius * phi.sin() * theta.sin(),
        radius * phi.cos(),
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record(id: &str, connections: &[&str]) -> NodeRecord {
        NodeRecord {
            id: id.to_string(),
            label: id.to_uppercase(),
            weight: 1.0,
            group: 0,
            connections: connections.iter().map(|s| s.to_string()).collect(),
        }
    }

    fn edge(source: &str, target: &str) -> EdgeRecord {
        EdgeRecord {
            source: source.to_string(),
            target: target.to_string(),
            weight: 1.0,
        }
    }

    #[test]
    fn builds_nodes_and_edges_from_records() {
        let data = GraphData {
            nodes: vec![record("a", &[]), record("b", &[])],
            edges: vec![edge("a", "b")],
        };
        let (graph, summary) = Graph::build(&data, Placement::default(), 0);

        assert_eq!(graph.nodes.len(), 2);
        assert_eq!(graph.edges.len(), 1);
        assert_eq!(summary.nodes, 2);
        assert_eq!(summary.edges, 1);
        assert_eq!(summary.dropped_edges, 0);
        assert_eq!(graph.index_of("b"), Some(1));
    }

    #[test]
    fn parses_graph_data_from_json() {
        let json = r#"{
            "nodes": [
                {"id": "a", "label": "Alpha", "weight": 2.5, "group": 1, "connections": ["b"]},
                {"id": "b"}
            ]
        }"#;
        let data = GraphData::from_json(json).unwrap();

        assert_eq!(data.nodes.len(), 2);
        assert_eq!(data.nodes[0].weight, 2.5);
        assert_eq!(data.nodes[0].connections, vec!["b".to_string()]);
        // omitted fields fall back to defaults
        assert_eq!(data.nodes[1].weight, 1.0);
        assert_eq!(data.nodes[1].group, 0);
        assert!(data.edges.is_empty());
    }

    #[test]
    fn malformed_json_is_a_parse_error() {
        let result = GraphData::from_json("{nodes: oops");
        assert!(matches!(result, Err(crate::error::LoadError::Parse(_))));
    }

    #[test]
    fn missing_edge_endpoint_dropped() {
        let data = GraphData {
            nodes: vec![record("a", &[])],
            edges: vec![edge("a", "ghost")],
        };
        let (graph, summary) = Graph::build(&data, Placement::default(), 0);

        assert_eq!(graph.edges.len(), 0);
        assert_eq!(summary.dropped_edges, 1);
    }

    #[test]
    fn duplicate_id_first_record_wins() {
        let mut second = record("a", &[]);
        second.label = "SECOND".to_string();
        let data = GraphData {
            nodes: vec![record("a", &[]), second],
            edges: vec![],
        };
        let (graph, summary) = Graph::build(&data, Placement::default(), 0);

        assert_eq!(graph.nodes.len(), 1);
        assert_eq!(graph.nodes[0].label, "A");
        assert_eq!(summary.duplicate_ids, 1);
    }

    #[test]
    fn empty_id_record_skipped() {
        let data = GraphData {
            nodes: vec![record("", &[]), record("a", &[])],
            edges: vec![],
        };
        let (graph, summary) = Graph::build(&data, Placement::default(), 0);

        assert_eq!(graph.nodes.len(), 1);
        assert_eq!(summary.skipped_records, 1);
    }

    #[test]
    fn non_finite_weight_repaired_to_default() {
        let mut bad = record("a", &[]);
        bad.weight = f32::NAN;
        let data = GraphData {
            nodes: vec![bad],
            edges: vec![],
        };
        let (graph, summary) = Graph::build(&data, Placement::default(), 0);

        assert_eq!(graph.nodes.len(), 1);
        assert_eq!(graph.nodes[0].weight, 1.0);
        assert_eq!(graph.nodes[0].radius, BASE_RADIUS);
        assert_eq!(summary.skipped_records, 0);
    }

    #[test]
    fn connections_materialize_once_per_pair() {
        // symmetric adjacency: both sides list each other
        let data = GraphData {
            nodes: vec![record("a", &["b"]), record("b", &["a"])],
            edges: vec![],
        };
        let (graph, summary) = Graph::build(&data, Placement::default(), 0);

        assert_eq!(graph.edges.len(), 1);
        assert_eq!(summary.edges, 1);
    }

    #[test]
    fn explicit_edge_suppresses_derived_duplicate() {
        let data = GraphData {
            nodes: vec![record("a", &["b"]), record("b", &["a"])],
            edges: vec![edge("a", "b")],
        };
        let (graph, _) = Graph::build(&data, Placement::default(), 0);

        assert_eq!(graph.edges.len(), 1);
    }

    #[test]
    fn self_loop_dropped() {
        let data = GraphData {
            nodes: vec![record("a", &["a"])],
            edges: vec![edge("a", "a")],
        };
        let (graph, summary) = Graph::build(&data, Placement::default(), 0);

        assert_eq!(graph.edges.len(), 0);
        assert_eq!(summary.dropped_edges, 2);
    }

    #[test]
    fn neighbors_of_returns_adjacent_ids() {
        let data = GraphData {
            nodes: vec![record("a", &["b", "c"]), record("b", &[]), record("c", &[])],
            edges: vec![],
        };
        let (graph, _) = Graph::build(&data, Placement::default(), 0);

        let neighbors = graph.neighbors_of("a");
        assert_eq!(neighbors.len(), 2);
        assert!(neighbors.contains("b"));
        assert!(neighbors.contains("c"));
        assert!(graph.neighbors_of("ghost").is_empty());
    }

    #[test]
    fn fibonacci_sphere_distributes_nodes() {
        let data = GraphData {
            nodes: (0..10).map(|i| record(&format!("n{}", i), &[])).collect(),
            edges: vec![],
        };
        let (graph, _) = Graph::build(
            &data,
            Placement::FibonacciSphere { radius: 100.0 },
            0,
        );

        // All nodes should be roughly equidistant from origin
        let distances: Vec<f32> = graph
            .nodes
            .iter()
            .map(|n| (n.x.powi(2) + n.y.powi(2) + n.z.powi(2)).sqrt())
            .collect();
        let avg: f32 = distances.iter().sum::<f32>() / distances.len() as f32;
        for dist in distances {
            assert!(
                (dist - avg).abs() < avg * 0.2,
                "Fibonacci sphere should distribute evenly"
            );
        }
    }

    #[test]
    fn random_cube_same_seed_same_layout() {
        let data = GraphData {
            nodes: (0..5).map(|i| record(&format!("n{}", i), &[])).collect(),
            edges: vec![],
        };
        let placement = Placement::RandomCube { extent: 150.0 };
        let (first, _) = Graph::build(&data, placement, 42);
        let (second, _) = Graph::build(&data, placement, 42);
        let (other, _) = Graph::build(&data, placement, 43);

        for (a, b) in first.nodes.iter().zip(&second.nodes) {
            assert_eq!((a.x, a.y, a.z), (b.x, b.y, b.z));
        }
        let moved = first
            .nodes
            .iter()
            .zip(&other.nodes)
            .any(|(a, b)| (a.x, a.y, a.z) != (b.x, b.y, b.z));
        assert!(moved, "different seeds should give different layouts");
    }

    #[test]
    fn random_cube_stays_inside_extent() {
        let data = GraphData {
            nodes: (0..20).map(|i| record(&format!("n{}", i), &[])).collect(),
            edges: vec![],
        };
        let (graph, _) = Graph::build(&data, Placement::RandomCube { extent: 50.0 }, 7);

        for node in &graph.nodes {
            assert!(node.x.abs() <= 50.0);
            assert!(node.y.abs() <= 50.0);
            assert!(node.z.abs() <= 50.0);
        }
    }

    #[test]
    fn group_color_cycles_palette() {
        assert_eq!(palette::group_color(0), palette::CATEGORY[0]);
        assert_eq!(palette::group_color(3), palette::CATEGORY[3]);
        assert_eq!(palette::group_color(10), palette::CATEGORY[0]);
        assert_eq!(palette::group_color(13), palette::CATEGORY[3]);
    }

    #[test]
    fn radius_scales_with_weight() {
        let mut heavy = record("heavy", &[]);
        heavy.weight = 4.0;
        let data = GraphData {
            nodes: vec![record("unit", &[]), heavy],
            edges: vec![],
        };
        let (graph, _) = Graph::build(&data, Placement::default(), 0);

        assert_eq!(graph.nodes[0].radius, BASE_RADIUS);
        assert_eq!(graph.nodes[1].radius, BASE_RADIUS * 2.0);
    }

    #[test]
    fn bounds_cover_all_nodes() {
        let data = GraphData {
            nodes: (0..6).map(|i| record(&format!("n{}", i), &[])).collect(),
            edges: vec![],
        };
        let (graph, _) = Graph::build(
            &data,
            Placement::FibonacciSphere { radius: 80.0 },
            0,
        );
        let bounds = graph.bounds();

        for node in &graph.nodes {
            assert!(node.x >= bounds.min[0] && node.x <= bounds.max[0]);
            assert!(node.y >= bounds.min[1] && node.y <= bounds.max[1]);
            assert!(node.z >= bounds.min[2] && node.z <= bounds.max[2]);
        }
    }
}
