//! Depth-sorted rendering onto a raster surface
//!
//! Each frame is built as an ordered draw list: clear, edges, then nodes
//! farthest-to-nearest (painter's algorithm), then labels. Sorting ties are
//! broken by node id so a static scene renders in the same order every
//! frame. The raster surface is a collaborator trait, so the list can be
//! replayed onto a canvas, an image buffer, or a test recorder.

use std::collections::HashSet;

use crate::camera::{Camera, Projection, ProjectionSettings, fog_alpha};
use crate::graph::Graph;

/// Default clear color (dark blue-gray)
pub const DEFAULT_BACKGROUND: [f32; 4] = [0.102, 0.102, 0.180, 1.0];

/// Default edge color; the alpha channel is the base line alpha
pub const DEFAULT_EDGE_COLOR: [f32; 4] = [0.616, 0.663, 0.722, 0.5];

/// Default edge line width at scale 1.0
pub const DEFAULT_EDGE_WIDTH: f32 = 1.5;

/// Default label color
pub const DEFAULT_LABEL_COLOR: [f32; 4] = [0.920, 0.940, 0.980, 1.0];

/// Default label font size at scale 1.0
pub const DEFAULT_LABEL_SIZE: f32 = 13.0;

/// Smallest legible label size
pub const MIN_LABEL_SIZE: f32 = 8.0;

/// Default scale below which labels are not drawn
pub const DEFAULT_LABEL_MIN_SCALE: f32 = 0.3;

/// Default normalized depth where fog starts
pub const DEFAULT_FOG_START: f32 = 0.5;

/// Default normalized depth where fog reaches full strength
pub const DEFAULT_FOG_END: f32 = 1.0;

/// Default alpha multiplier for nodes unrelated to the hovered node
pub const DEFAULT_HIGHLIGHT_DIM: f32 = 0.25;

/// Placeholder drawn when the graph has no nodes
pub const NO_DATA_LABEL: &str = "no data";

/// Drawing backend contract
///
/// Coordinates are viewport pixels; colors are RGBA normalized 0.0-1.0.
pub trait RasterSurface {
    /// Fill the whole viewport
    fn clear(&mut self, color: [f32; 4]);

    /// Filled disc centered on (x, y)
    fn fill_circle(&mut self, x: f32, y: f32, radius: f32, color: [f32; 4]);

    /// Straight line segment
    fn line(&mut self, x1: f32, y1: f32, x2: f32, y2: f32, width: f32, color: [f32; 4]);

    /// Text centered on (x, y)
    fn text(&mut self, x: f32, y: f32, size: f32, text: &str, color: [f32; 4]);
}

/// One drawing operation; a frame is an ordered list of these
#[derive(Debug, Clone, PartialEq)]
pub enum DrawOp {
    Clear {
        color: [f32; 4],
    },
    Line {
        x1: f32,
        y1: f32,
        x2: f32,
        y2: f32,
        width: f32,
        color: [f32; 4],
    },
    Circle {
        x: f32,
        y: f32,
        radius: f32,
        color: [f32; 4],
    },
    Text {
        x: f32,
        y: f32,
        size: f32,
        text: String,
        color: [f32; 4],
    },
}

/// Visual tuning for the draw list
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RenderOptions {
    pub background: [f32; 4],
    pub edge_color: [f32; 4],
    /// Line width at scale 1.0; scales with perspective
    pub edge_width: f32,
    pub label_color: [f32; 4],
    /// Font size at scale 1.0
    pub label_size: f32,
    /// Labels are skipped below this perspective scale
    pub label_min_scale: f32,
    /// Master toggle for node labels
    pub show_labels: bool,
    /// Normalized depth where fog starts
    pub fog_start: f32,
    /// Normalized depth where fog is fully opaque
    pub fog_end: f32,
    /// Alpha multiplier for primitives unrelated to the hovered node
    pub highlight_dim: f32,
}

impl Default for RenderOptions {
    fn default() -> Self {
        Self {
            background: DEFAULT_BACKGROUND,
            edge_color: DEFAULT_EDGE_COLOR,
            edge_width: DEFAULT_EDGE_WIDTH,
            label_color: DEFAULT_LABEL_COLOR,
            label_size: DEFAULT_LABEL_SIZE,
            label_min_scale: DEFAULT_LABEL_MIN_SCALE,
            show_labels: true,
            fog_start: DEFAULT_FOG_START,
            fog_end: DEFAULT_FOG_END,
            highlight_dim: DEFAULT_HIGHLIGHT_DIM,
        }
    }
}

/// Builds the per-frame draw list and replays it onto a surface
#[derive(Debug, Default)]
pub struct Renderer {
    pub options: RenderOptions,
    ops: Vec<DrawOp>,
    projections: Vec<Projection>,
    order: Vec<usize>,
}

impl Renderer {
    pub fn new(options: RenderOptions) -> Self {
        Self {
            options,
            ops: Vec::new(),
            projections: Vec::new(),
            order: Vec::new(),
        }
    }

    /// The draw list built by the last `build_frame` call
    pub fn ops(&self) -> &[DrawOp] {
        &self.ops
    }

    /// Project, depth-sort, and emit the draw list for one frame
    ///
    /// `hover` optionally names a node index whose neighborhood is kept at
    /// full alpha while everything else is dimmed.
    pub fn build_frame(
        &mut self,
        graph: &Graph,
        camera: &Camera,
        settings: &ProjectionSettings,
        hover: Option<usize>,
    ) -> &[DrawOp] {
        self.ops.clear();
        self.ops.push(DrawOp::Clear {
            color: self.options.background,
        });

        if graph.nodes.is_empty() {
            // defined terminal state for an empty dataset
            self.ops.push(DrawOp::Text {
                x: settings.width / 2.0,
                y: settings.height / 2.0,
                size: self.options.label_size,
                text: NO_DATA_LABEL.to_string(),
                color: self.options.label_color,
            });
            return &self.ops;
        }

        self.projections.clear();
        self.projections.extend(
            graph
                .nodes
                .iter()
                .map(|n| camera.project(n.x, n.y, n.z, settings)),
        );

        self.order.clear();
        self.order
            .extend((0..graph.nodes.len()).filter(|&i| self.projections[i].is_visible()));
        // painter's algorithm: farthest first, ties broken by id so a static
        // scene keeps the same order every frame
        let projections = &self.projections;
        self.order.sort_by(|&a, &b| {
            let depth_a = projections[a].point().map_or(1.0, |p| p.depth);
            let depth_b = projections[b].point().map_or(1.0, |p| p.depth);
            depth_b
                .partial_cmp(&depth_a)
                .unwrap_or(std::cmp::Ordering::Equal)
                .then_with(|| graph.nodes[a].id.cmp(&graph.nodes[b].id))
        });

        let highlight: Option<(usize, HashSet<usize>)> = hover
            .filter(|&h| h < graph.nodes.len())
            .map(|h| (h, graph.neighbor_indices(h)));
        let dim = self.options.highlight_dim;
        let emphasis = |index: usize| -> f32 {
            match &highlight {
                Some((h, neighbors)) if index != *h && !neighbors.contains(&index) => dim,
                _ => 1.0,
            }
        };

        // edges under nodes; skipped entirely when an endpoint is behind the lens
        let options = self.options;
        for edge in &graph.edges {
            let (Some(s), Some(t)) = (
                self.projections[edge.source].point(),
                self.projections[edge.target].point(),
            ) else {
                continue;
            };
            let mean_scale = (s.scale + t.scale) / 2.0;
            let mean_depth = (s.depth + t.depth) / 2.0;
            let alpha = options.edge_color[3]
                * mean_scale
                * fog_alpha(mean_depth, options.fog_start, options.fog_end)
                * emphasis(edge.source).min(emphasis(edge.target));
            self.ops.push(DrawOp::Line {
                x1: s.x,
                y1: s.y,
                x2: t.x,
                y2: t.y,
                width: options.edge_width * mean_scale,
                color: [
                    options.edge_color[0],
                    options.edge_color[1],
                    options.edge_color[2],
                    alpha,
                ],
            });
        }

        for &index in &self.order {
            let Some(point) = self.projections[index].point() else {
                continue;
            };
            let node = &graph.nodes[index];
            let alpha = node.color[3]
                * fog_alpha(point.depth, options.fog_start, options.fog_end)
                * emphasis(index);
            self.ops.push(DrawOp::Circle {
                x: point.x,
                y: point.y,
                radius: node.radius * point.scale,
                color: [node.color[0], node.color[1], node.color[2], alpha],
            });
        }

        if options.show_labels {
            for &index in &self.order {
                let Some(point) = self.projections[index].point() else {
                    continue;
                };
                if point.scale < options.label_min_scale {
                    continue;
                }
                let node = &graph.nodes[index];
                if node.label.is_empty() {
                    continue;
                }
                let size = (options.label_size * point.scale)
                    .max(MIN_LABEL_SIZE)
                    .min(options.label_size.max(MIN_LABEL_SIZE));
                let alpha = options.label_color[3]
                    * fog_alpha(point.depth, options.fog_start, options.fog_end)
                    * emphasis(index);
                self.ops.push(DrawOp::Text {
                    x: point.x,
                    y: point.y + node.radius * point.scale + size,
                    size,
                    text: node.label.clone(),
                    color: [
                        options.label_color[0],
                        options.label_color[1],
                        options.label_color[2],
                        alpha,
                    ],
                });
            }
        }

        &self.ops
    }

    /// Replay the last built draw list onto a surface
    pub fn present<S: RasterSurface + ?Sized>(&self, surface: &mut S) {
        for op in &self.ops {
            match op {
                DrawOp::Clear { color } => surface.clear(*color),
                DrawOp::Line {
                    x1,
                    y1,
                    x2,
                    y2,
                    width,
                    color,
                } => surface.line(*x1, *y1, *x2, *y2, *width, *color),
                DrawOp::Circle {
                    x,
                    y,
                    radius,
                    color,
                } => surface.fill_circle(*x, *y, *radius, *color),
                DrawOp::Text {
                    x,
                    y,
                    size,
                    text,
                    color,
                } => surface.text(*x, *y, *size, text, *color),
            }
        }
    }
}
