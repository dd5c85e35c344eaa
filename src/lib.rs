//! nodelens - force-directed 3D layout and perspective projection for
//! interactive node-link visualizations.
//!
//! The pipeline per frame: relax the layout with an N-body force
//! simulation, project every node through a perspective camera, render
//! depth-sorted (painter's algorithm) onto a raster-surface collaborator,
//! and resolve pointer gestures into camera motion and node picking.
//! `Engine` wires the pieces together; each module is usable on its own.

pub mod camera;
pub mod engine;
pub mod error;
pub mod graph;
pub mod interact;
pub mod render;
pub mod simulation;

pub use camera::{Bounds, Camera, ProjectedPoint, Projection, ProjectionSettings};
pub use engine::{ConfigPatch, Engine, EngineConfig};
pub use error::{LoadError, LoadResult};
pub use graph::{EdgeRecord, Graph, GraphData, LoadSummary, NodeRecord, Placement};
pub use interact::{
    DragMode, InteractionConfig, InteractionController, PointerButton, PointerEvent, pick_node,
};
pub use render::{DrawOp, RasterSurface, RenderOptions, Renderer};
pub use simulation::{ForceSimulator, SimulationConfig};
