//! Force-directed relaxation for graph layout
//!
//! Each tick applies softened pairwise repulsion, one-sided spring attraction
//! along edges, and a weak centering pull, then integrates with semi-implicit
//! Euler under a damping factor. The simulator never panics on pathological
//! input: velocities are clamped per axis and non-finite coordinates are
//! repaired in place each tick.

use crate::graph::{Graph, Node};

/// Default repulsion coefficient (`k_repel`)
pub const DEFAULT_REPULSION: f32 = 6000.0;

/// Default attraction coefficient (`k_attract`)
pub const DEFAULT_ATTRACTION: f32 = 0.06;

/// Default rest length of an edge spring
pub const DEFAULT_IDEAL_DISTANCE: f32 = 60.0;

/// Default per-tick velocity retention
pub const DEFAULT_DAMPING: f32 = 0.85;

/// Default pull toward the origin
pub const DEFAULT_CENTER_GAIN: f32 = 0.02;

/// Default physics sub-steps per rendered frame
pub const DEFAULT_ITERATIONS: u32 = 2;

/// Default per-axis velocity limit
pub const DEFAULT_MAX_VELOCITY: f32 = 40.0;

/// Default softening added to squared distance in the repulsion denominator
pub const DEFAULT_SOFTENING: f32 = 100.0;

/// Default half-extent of the cube positions are clamped into on repair
pub const DEFAULT_BOUNDS_EXTENT: f32 = 1000.0;

/// Guards the distance normalization when nodes coincide
const DISTANCE_EPSILON: f32 = 1.0e-6;

/// Nodes lighter than this still respond to forces at this mass
const MIN_MASS: f32 = 0.1;

/// Tunable force and integration parameters
///
/// All coefficients are configuration inputs so different datasets can be
/// tuned without code changes.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SimulationConfig {
    /// Repulsion strength between every node pair
    pub repulsion: f32,
    /// Spring strength per unit of stretch beyond `ideal_distance`
    pub attraction: f32,
    /// Rest length of an edge spring
    pub ideal_distance: f32,
    /// Velocity retained per tick (0 < damping < 1)
    pub damping: f32,
    /// Pull toward the origin; zero disables centering
    pub center_gain: f32,
    /// Physics sub-steps per `step` call
    pub iterations: u32,
    /// Per-axis velocity clamp
    pub max_velocity: f32,
    /// Softening added to squared distance so coincident nodes cannot explode
    pub softening: f32,
    /// Half-extent of the volume positions are clamped into on repair
    pub bounds_extent: f32,
}

impl Default for SimulationConfig {
    fn default() -> Self {
        Self {
            repulsion: DEFAULT_REPULSION,
            attraction: DEFAULT_ATTRACTION,
            ideal_distance: DEFAULT_IDEAL_DISTANCE,
            damping: DEFAULT_DAMPING,
            center_gain: DEFAULT_CENTER_GAIN,
            iterations: DEFAULT_ITERATIONS,
            max_velocity: DEFAULT_MAX_VELOCITY,
            softening: DEFAULT_SOFTENING,
            bounds_extent: DEFAULT_BOUNDS_EXTENT,
        }
    }
}

/// Advances node positions and velocities toward a relaxed layout
#[derive(Debug, Clone, Default)]
pub struct ForceSimulator {
    pub config: SimulationConfig,
}

impl ForceSimulator {
    /// Create a simulator with the given tuning
    pub fn new(config: SimulationConfig) -> Self {
        Self { config }
    }

    /// Advance one rendered frame: `config.iterations` physics ticks
    pub fn step(&self, graph: &mut Graph) {
        for _ in 0..self.config.iterations {
            self.tick(graph);
        }
    }

    /// Run one physics tick
    pub fn tick(&self, graph: &mut Graph) {
        if graph.nodes.is_empty() {
            return;
        }

        self.apply_repulsion(graph);
        self.apply_attraction(graph);
        if self.config.center_gain != 0.0 {
            self.apply_centering(graph);
        }
        self.integrate(graph);
    }

    /// Run `ticks` physics ticks back to back
    pub fn run(&self, graph: &mut Graph, ticks: usize) {
        for _ in 0..ticks {
            self.tick(graph);
        }
    }

    /// Total kinetic energy of the layout; approaches zero as it settles
    pub fn kinetic_energy(&self, graph: &Graph) -> f32 {
        graph
            .nodes
            .iter()
            .map(|n| {
                let speed_sq = n.vx * n.vx + n.vy * n.vy + n.vz * n.vz;
                0.5 * n.weight.max(MIN_MASS) * speed_sq
            })
            .sum()
    }

    /// Softened inverse-square repulsion between every unordered pair
    fn apply_repulsion(&self, graph: &mut Graph) {
        if self.config.repulsion == 0.0 {
            return;
        }
        let n = graph.nodes.len();

        for i in 0..n {
            for j in (i + 1)..n {
                let dx = graph.nodes[i].x - graph.nodes[j].x;
                let dy = graph.nodes[i].y - graph.nodes[j].y;
                let dz = graph.nodes[i].z - graph.nodes[j].z;

                let dist_sq = dx * dx + dy * dy + dz * dz + DISTANCE_EPSILON;
                let dist = dist_sq.sqrt();

                // Bounded at zero distance by the softening term
                let force = self.config.repulsion / (dist_sq + self.config.softening);

                let fx = force * dx / dist;
                let fy = force * dy / dist;
                let fz = force * dz / dist;

                let mass_i = graph.nodes[i].weight.max(MIN_MASS);
                let mass_j = graph.nodes[j].weight.max(MIN_MASS);
                graph.nodes[i].vx += fx / mass_i;
                graph.nodes[i].vy += fy / mass_i;
                graph.nodes[i].vz += fz / mass_i;
                graph.nodes[j].vx -= fx / mass_j;
                graph.nodes[j].vy -= fy / mass_j;
                graph.nodes[j].vz -= fz / mass_j;
            }
        }
    }

    /// One-sided spring per edge: pulls once stretched past the rest length,
    /// never pushes, so dense clusters do not collapse into points
    fn apply_attraction(&self, graph: &mut Graph) {
        for edge in &graph.edges {
            let (source, target) = (edge.source, edge.target);

            let dx = graph.nodes[target].x - graph.nodes[source].x;
            let dy = graph.nodes[target].y - graph.nodes[source].y;
            let dz = graph.nodes[target].z - graph.nodes[source].z;

            let dist = (dx * dx + dy * dy + dz * dz).sqrt().max(DISTANCE_EPSILON);
            let stretch = dist - self.config.ideal_distance;
            if stretch <= 0.0 {
                continue;
            }

            // Hooke's law on the stretched side only: F = k * (x - x0)
            let force = self.config.attraction * stretch * edge.weight;

            let fx = force * dx / dist;
            let fy = force * dy / dist;
            let fz = force * dz / dist;

            let mass_s = graph.nodes[source].weight.max(MIN_MASS);
            let mass_t = graph.nodes[target].weight.max(MIN_MASS);
            graph.nodes[source].vx += fx / mass_s;
            graph.nodes[source].vy += fy / mass_s;
            graph.nodes[source].vz += fz / mass_s;
            graph.nodes[target].vx -= fx / mass_t;
            graph.nodes[target].vy -= fy / mass_t;
            graph.nodes[target].vz -= fz / mass_t;
        }
    }

    /// Weak pull toward the origin so uncoupled components cannot drift away
    fn apply_centering(&self, graph: &mut Graph) {
        let gain = self.config.center_gain;
        for node in &mut graph.nodes {
            let mass = node.weight.max(MIN_MASS);
            node.vx -= node.x * gain / mass;
            node.vy -= node.y * gain / mass;
            node.vz -= node.z * gain / mass;
        }
    }

    /// Semi-implicit Euler: damp, clamp, then move; repair non-finite state
    fn integrate(&self, graph: &mut Graph) {
        let damping = self.config.damping;
        let max_v = self.config.max_velocity;
        let extent = self.config.bounds_extent;

        for node in &mut graph.nodes {
            node.vx = (node.vx * damping).clamp(-max_v, max_v);
            node.vy = (node.vy * damping).clamp(-max_v, max_v);
            node.vz = (node.vz * damping).clamp(-max_v, max_v);

            node.x += node.vx;
            node.y += node.vy;
            node.z += node.vz;

            if repair_non_finite(node, extent) {
                tracing::warn!("repaired non-finite coordinates on node {}", node.id);
            }
        }
    }
}

/// Reset velocity and clamp position into the bounding volume if any
/// coordinate went non-finite. Returns whether a repair happened.
fn repair_non_finite(node: &mut Node, extent: f32) -> bool {
    let finite = node.x.is_finite()
        && node.y.is_finite()
        && node.z.is_finite()
        && node.vx.is_finite()
        && node.vy.is_finite()
        && node.vz.is_finite();
    if finite {
        return false;
    }

    node.vx = 0.0;
    node.vy = 0.0;
    node.vz = 0.0;
    node.x = clamp_or_zero(node.x, extent);
    node.y = clamp_or_zero(node.y, extent);
    node.z = clamp_or_zero(node.z, extent);
    true
}

fn clamp_or_zero(value: f32, extent: f32) -> f32 {
    if value.is_finite() {
        value.clamp(-extent, extent)
    } else {
        0.0
    }
}
