//! Engine facade owning the full pipeline for one visualization
//!
//! An `Engine` owns its graph, simulator, camera, renderer, and controller,
//! so several independent instances can coexist in one process. The frame
//! loop is driven externally: the embedder calls `frame` once per display
//! refresh and forwards pointer events as they arrive. A cooperative
//! `running` flag checked at the top of `frame` makes stopping instant and
//! leaves the last rendered state on the surface.

use crate::camera::{
    Camera, DEFAULT_FAR, DEFAULT_FOV, DEFAULT_MAX_SCALE, DEFAULT_NEAR, Projection,
    ProjectionSettings,
};
use crate::error::LoadError;
use crate::graph::{Graph, GraphData, LoadSummary, Placement};
use crate::interact::{DragMode, InteractionConfig, InteractionController, PointerEvent, pick_node};
use crate::render::{RasterSurface, RenderOptions, Renderer};
use crate::simulation::{ForceSimulator, SimulationConfig};

/// Construction-time configuration for an engine instance
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct EngineConfig {
    pub simulation: SimulationConfig,
    pub interaction: InteractionConfig,
    pub render: RenderOptions,
    /// Initial node placement strategy
    pub placement: Placement,
    /// Seed for all randomness, so layouts reproduce in tests
    pub seed: u64,
    pub fov: f32,
    pub near: f32,
    pub far: f32,
    pub max_scale: f32,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            simulation: SimulationConfig::default(),
            interaction: InteractionConfig::default(),
            render: RenderOptions::default(),
            placement: Placement::default(),
            seed: 0,
            fov: DEFAULT_FOV,
            near: DEFAULT_NEAR,
            far: DEFAULT_FAR,
            max_scale: DEFAULT_MAX_SCALE,
        }
    }
}

/// Runtime tuning patch; unset fields keep their current value
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct ConfigPatch {
    pub repulsion: Option<f32>,
    pub attraction: Option<f32>,
    pub ideal_distance: Option<f32>,
    pub damping: Option<f32>,
    pub center_gain: Option<f32>,
    pub iterations: Option<u32>,
    pub rotate_speed: Option<f32>,
    pub auto_rotate: Option<bool>,
    pub show_labels: Option<bool>,
    pub fov: Option<f32>,
}

/// Force-directed layout and projection engine behind one visualization
pub struct Engine {
    graph: Graph,
    simulator: ForceSimulator,
    camera: Camera,
    settings: ProjectionSettings,
    renderer: Renderer,
    controller: InteractionController,
    placement: Placement,
    seed: u64,
    running: bool,
    load_failed: bool,
    hover: Option<usize>,
}

impl Engine {
    /// Create an engine for a viewport of the given pixel size
    pub fn new(config: EngineConfig, width: f32, height: f32) -> Self {
        let camera = Camera {
            fov: config.fov,
            ..Camera::default()
        };
        let settings = ProjectionSettings {
            width,
            height,
            near: config.near,
            far: config.far,
            max_scale: config.max_scale,
        };
        tracing::debug!("engine initialized for {}x{} viewport", width, height);
        Self {
            graph: Graph::default(),
            simulator: ForceSimulator::new(config.simulation),
            camera,
            settings,
            renderer: Renderer::new(config.render),
            controller: InteractionController::new(config.interaction),
            placement: config.placement,
            seed: config.seed,
            running: false,
            load_failed: false,
            hover: None,
        }
    }

    /// Adopt the loading collaborator's result
    ///
    /// On success the graph is built (with initial placement) and the
    /// summary of kept/dropped records is returned. On failure the error is
    /// recorded so `start` refuses until a later load succeeds.
    pub fn load(&mut self, result: Result<GraphData, LoadError>) -> Result<LoadSummary, LoadError> {
        self.hover = None;
        match result {
            Ok(data) => {
                let (graph, summary) = Graph::build(&data, self.placement, self.seed);
                tracing::debug!("loaded {} nodes, {} edges", summary.nodes, summary.edges);
                self.graph = graph;
                self.load_failed = false;
                Ok(summary)
            }
            Err(err) => {
                tracing::warn!("graph load failed: {}", err);
                self.graph = Graph::default();
                self.load_failed = true;
                self.running = false;
                Err(err)
            }
        }
    }

    /// Begin running frames; returns false after a failed load
    pub fn start(&mut self) -> bool {
        if self.load_failed {
            tracing::warn!("not starting: last load failed");
            return false;
        }
        self.running = true;
        tracing::debug!("engine started");
        true
    }

    /// Stop running frames; the last rendered state stays on the surface
    pub fn stop(&mut self) {
        self.running = false;
        tracing::debug!("engine stopped");
    }

    pub fn is_running(&self) -> bool {
        self.running
    }

    /// Adopt a new viewport size
    ///
    /// Only the projection settings change; node positions and velocities
    /// survive so the layout is preserved across window resizes.
    pub fn resize(&mut self, width: f32, height: f32) {
        self.settings.resize(width, height);
        tracing::debug!("viewport resized to {}x{}", width, height);
    }

    /// Run one frame: simulate, render, then per-frame input effects
    ///
    /// Returns false without touching the surface when stopped.
    pub fn frame<S: RasterSurface>(&mut self, surface: &mut S) -> bool {
        if !self.running {
            return false;
        }
        self.simulator.step(&mut self.graph);
        self.renderer
            .build_frame(&self.graph, &self.camera, &self.settings, self.hover);
        self.renderer.present(surface);
        self.controller.tick(&mut self.camera);
        true
    }

    /// Feed a pointer event; drags mutate the camera, idle moves track hover
    pub fn pointer_event(&mut self, event: PointerEvent) {
        self.controller.handle(event, &mut self.camera);
        match event {
            PointerEvent::Move { x, y } => {
                self.hover = if self.controller.mode() == DragMode::Idle {
                    pick_node(&self.graph, &self.camera, &self.settings, x, y)
                } else {
                    None
                };
            }
            PointerEvent::Leave => self.hover = None,
            _ => {}
        }
    }

    /// Map a world point into the viewport with the current camera
    pub fn project(&self, x: f32, y: f32, z: f32) -> Projection {
        self.camera.project(x, y, z, &self.settings)
    }

    /// Id of the node under the given screen point, if any
    pub fn hit_test(&self, sx: f32, sy: f32) -> Option<&str> {
        pick_node(&self.graph, &self.camera, &self.settings, sx, sy)
            .map(|index| self.graph.nodes[index].id.as_str())
    }

    /// Reposition the camera so the whole layout fits the viewport
    pub fn fit_view(&mut self) {
        self.camera.fit_to_bounds(&self.graph.bounds(), &self.settings);
    }

    /// Apply a runtime tuning patch
    pub fn update_config(&mut self, patch: ConfigPatch) {
        let sim = &mut self.simulator.config;
        if let Some(v) = patch.repulsion {
            sim.repulsion = v;
        }
        if let Some(v) = patch.attraction {
            sim.attraction = v;
        }
        if let Some(v) = patch.ideal_distance {
            sim.ideal_distance = v;
        }
        if let Some(v) = patch.damping {
            sim.damping = v;
        }
        if let Some(v) = patch.center_gain {
            sim.center_gain = v;
        }
        if let Some(v) = patch.iterations {
            sim.iterations = v;
        }
        if let Some(v) = patch.rotate_speed {
            self.controller.config.rotate_speed = v;
        }
        if let Some(v) = patch.auto_rotate {
            self.controller.config.auto_rotate = v;
        }
        if let Some(v) = patch.show_labels {
            self.renderer.options.show_labels = v;
        }
        if let Some(v) = patch.fov {
            self.camera.fov = v;
        }
    }

    pub fn graph(&self) -> &Graph {
        &self.graph
    }

    pub fn camera(&self) -> &Camera {
        &self.camera
    }

    pub fn settings(&self) -> &ProjectionSettings {
        &self.settings
    }

    /// Id of the currently hovered node, if any
    pub fn hovered(&self) -> Option<&str> {
        self.hover.map(|index| self.graph.nodes[index].id.as_str())
    }
}
