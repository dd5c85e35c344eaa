//! Pointer input: camera gestures and node picking
//!
//! A small state machine turns normalized pointer events into camera
//! mutations: primary drag rotates, secondary drag pans, wheel and pinch
//! zoom. Released rotations can carry inertia, and an idle camera may
//! auto-rotate until the user interacts for the first time. This module is
//! the only interactive mutator of the camera.

use crate::camera::{Camera, ProjectionSettings};
use crate::graph::Graph;

/// Default radians per pixel of drag
pub const DEFAULT_ROTATE_SPEED: f32 = 0.005;

/// Default pan factor per pixel, multiplied by camera distance
pub const DEFAULT_PAN_SPEED: f32 = 0.002;

/// Default world units per wheel notch
pub const DEFAULT_ZOOM_STEP: f32 = 25.0;

/// Default farthest allowed camera z
pub const DEFAULT_MIN_ZOOM: f32 = -2000.0;

/// Default nearest allowed camera z; stays short of the origin
pub const DEFAULT_MAX_ZOOM: f32 = -50.0;

/// Default per-frame retention of inertial spin
pub const DEFAULT_INERTIA_DAMPING: f32 = 0.92;

/// Default idle yaw advance per frame, radians
pub const DEFAULT_AUTO_ROTATE_SPEED: f32 = 0.003;

/// Spin below this magnitude stops
const INERTIA_CUTOFF: f32 = 1.0e-4;

/// Pointer buttons distinguished by the gesture contract
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PointerButton {
    Primary,
    Secondary,
}

/// Normalized pointer events in viewport pixel coordinates
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum PointerEvent {
    Down { x: f32, y: f32, button: PointerButton },
    Move { x: f32, y: f32 },
    Up,
    Leave,
    /// Positive delta moves the camera closer
    Wheel { delta: f32 },
    /// Current distance between the two touch points
    Pinch { distance: f32 },
    PinchEnd,
}

/// Current gesture
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum DragMode {
    #[default]
    Idle,
    Rotating,
    Panning,
    PinchZooming,
}

/// Gesture tuning
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct InteractionConfig {
    pub rotate_speed: f32,
    pub pan_speed: f32,
    /// World units of zoom per wheel notch
    pub zoom_step: f32,
    /// Farthest camera z
    pub min_zoom: f32,
    /// Nearest camera z
    pub max_zoom: f32,
    /// Keep spinning after a rotation drag is released
    pub inertia: bool,
    pub inertia_damping: f32,
    /// Slowly advance yaw while the user has never interacted
    pub auto_rotate: bool,
    pub auto_rotate_speed: f32,
}

impl Default for InteractionConfig {
    fn default() -> Self {
        Self {
            rotate_speed: DEFAULT_ROTATE_SPEED,
            pan_speed: DEFAULT_PAN_SPEED,
            zoom_step: DEFAULT_ZOOM_STEP,
            min_zoom: DEFAULT_MIN_ZOOM,
            max_zoom: DEFAULT_MAX_ZOOM,
            inertia: true,
            inertia_damping: DEFAULT_INERTIA_DAMPING,
            auto_rotate: true,
            auto_rotate_speed: DEFAULT_AUTO_ROTATE_SPEED,
        }
    }
}

/// Translates pointer events into camera mutations and supports picking
#[derive(Debug, Clone, Default)]
pub struct InteractionController {
    pub config: InteractionConfig,
    mode: DragMode,
    last_x: f32,
    last_y: f32,
    pinch_distance: f32,
    /// Inertial angular velocity carried after a rotation release
    spin_pitch: f32,
    spin_yaw: f32,
    has_interacted: bool,
}

impl InteractionController {
    pub fn new(config: InteractionConfig) -> Self {
        Self {
            config,
            ..Self::default()
        }
    }

    pub fn mode(&self) -> DragMode {
        self.mode
    }

    /// Whether any deliberate gesture has occurred yet
    pub fn interacted(&self) -> bool {
        self.has_interacted
    }

    /// Feed one pointer event, mutating the camera as the gesture demands
    pub fn handle(&mut self, event: PointerEvent, camera: &mut Camera) {
        match event {
            PointerEvent::Down { x, y, button } => {
                self.has_interacted = true;
                self.last_x = x;
                self.last_y = y;
                self.spin_pitch = 0.0;
                self.spin_yaw = 0.0;
                self.mode = match button {
                    PointerButton::Primary => DragMode::Rotating,
                    PointerButton::Secondary => DragMode::Panning,
                };
            }
            PointerEvent::Move { x, y } => {
                let dx = x - self.last_x;
                let dy = y - self.last_y;
                match self.mode {
                    DragMode::Rotating => {
                        let delta_pitch = dy * self.config.rotate_speed;
                        let delta_yaw = dx * self.config.rotate_speed;
                        camera.rotate_by(delta_pitch, delta_yaw);
                        self.spin_pitch = delta_pitch;
                        self.spin_yaw = delta_yaw;
                        self.last_x = x;
                        self.last_y = y;
                    }
                    DragMode::Panning => {
                        // scale by distance so the gesture feels the same near and far
                        let reach = camera.position[2].abs();
                        camera.position[0] -= dx * self.config.pan_speed * reach;
                        camera.position[1] -= dy * self.config.pan_speed * reach;
                        self.last_x = x;
                        self.last_y = y;
                    }
                    DragMode::PinchZooming | DragMode::Idle => {}
                }
            }
            PointerEvent::Up | PointerEvent::Leave => {
                if self.mode != DragMode::Rotating || !self.config.inertia {
                    self.spin_pitch = 0.0;
                    self.spin_yaw = 0.0;
                }
                self.mode = DragMode::Idle;
                self.pinch_distance = 0.0;
            }
            PointerEvent::Wheel { delta } => {
                self.has_interacted = true;
                self.zoom(camera, camera.position[2] + delta * self.config.zoom_step);
            }
            PointerEvent::Pinch { distance } => {
                self.has_interacted = true;
                if self.mode == DragMode::PinchZooming {
                    let ratio = distance / self.pinch_distance.max(1.0);
                    if ratio > 0.0 {
                        self.zoom(camera, camera.position[2] / ratio);
                    }
                } else {
                    self.mode = DragMode::PinchZooming;
                }
                self.pinch_distance = distance;
            }
            PointerEvent::PinchEnd => {
                if self.mode == DragMode::PinchZooming {
                    self.mode = DragMode::Idle;
                }
                self.pinch_distance = 0.0;
            }
        }
    }

    /// Per-frame effects: inertial spin decay and idle auto-rotation
    pub fn tick(&mut self, camera: &mut Camera) {
        if self.mode == DragMode::Idle
            && (self.spin_pitch.abs() > INERTIA_CUTOFF || self.spin_yaw.abs() > INERTIA_CUTOFF)
        {
            camera.rotate_by(self.spin_pitch, self.spin_yaw);
            self.spin_pitch *= self.config.inertia_damping;
            self.spin_yaw *= self.config.inertia_damping;
            if self.spin_pitch.abs() <= INERTIA_CUTOFF && self.spin_yaw.abs() <= INERTIA_CUTOFF {
                self.spin_pitch = 0.0;
                self.spin_yaw = 0.0;
            }
        }

        if self.config.auto_rotate && !self.has_interacted && self.mode == DragMode::Idle {
            camera.rotate_by(0.0, self.config.auto_rotate_speed);
        }
    }

    fn zoom(&self, camera: &mut Camera, z: f32) {
        camera.position[2] = z.clamp(self.config.min_zoom, self.config.max_zoom);
    }
}

/// Nearest node under the pointer, by projected screen distance
///
/// A node qualifies when the pointer falls inside its own projected radius,
/// so large or near nodes are easier to pick than small or far ones. Exact
/// screen-distance ties go to the node drawn on top (smaller depth). Nodes
/// behind the lens are never hits.
pub fn pick_node(
    graph: &Graph,
    camera: &Camera,
    settings: &ProjectionSettings,
    sx: f32,
    sy: f32,
) -> Option<usize> {
    let mut best: Option<(f32, f32, usize)> = None;
    for (index, node) in graph.nodes.iter().enumerate() {
        let Some(point) = camera.project(node.x, node.y, node.z, settings).point() else {
            continue;
        };
        let radius = node.radius * point.scale;
        let dx = point.x - sx;
        let dy = point.y - sy;
        let dist_sq = dx * dx + dy * dy;
        if dist_sq > radius * radius {
            continue;
        }
        let closer = match best {
            None => true,
            Some((best_dist, best_depth, _)) => {
                dist_sq < best_dist || (dist_sq == best_dist && point.depth < best_depth)
            }
        };
        if closer {
            best = Some((dist_sq, point.depth, index));
        }
    }
    best.map(|(_, _, index)| index)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::camera::PITCH_LIMIT;
    use crate::graph::{GraphData, NodeRecord, Placement};

    fn graph_at(positions: &[(&str, f32, f32, f32)]) -> Graph {
        let data = GraphData {
            nodes: positions
                .iter()
                .map(|(id, ..)| NodeRecord {
                    id: id.to_string(),
                    label: id.to_string(),
                    weight: 1.0,
                    group: 0,
                    connections: vec![],
                })
                .collect(),
            edges: vec![],
        };
        let (mut graph, _) = Graph::build(&data, Placement::default(), 0);
        for (node, &(_, x, y, z)) in graph.nodes.iter_mut().zip(positions) {
            node.x = x;
            node.y = y;
            node.z = z;
        }
        graph
    }

    fn settings() -> ProjectionSettings {
        ProjectionSettings::new(800.0, 600.0)
    }

    fn press(controller: &mut InteractionController, camera: &mut Camera, button: PointerButton) {
        controller.handle(
            PointerEvent::Down {
                x: 100.0,
                y: 100.0,
                button,
            },
            camera,
        );
    }

    #[test]
    fn primary_drag_rotates_camera() {
        let mut controller = InteractionController::default();
        let mut camera = Camera::default();

        press(&mut controller, &mut camera, PointerButton::Primary);
        assert_eq!(controller.mode(), DragMode::Rotating);

        controller.handle(PointerEvent::Move { x: 110.0, y: 95.0 }, &mut camera);
        assert_eq!(camera.rotation[1], 10.0 * DEFAULT_ROTATE_SPEED);
        assert_eq!(camera.rotation[0], -5.0 * DEFAULT_ROTATE_SPEED);
    }

    #[test]
    fn idle_move_leaves_camera_alone() {
        let mut controller = InteractionController::default();
        let mut camera = Camera::default();

        controller.handle(PointerEvent::Move { x: 300.0, y: 200.0 }, &mut camera);
        assert_eq!(camera, Camera::default());
    }

    #[test]
    fn pitch_clamped_during_drag() {
        let mut controller = InteractionController::default();
        let mut camera = Camera::default();

        press(&mut controller, &mut camera, PointerButton::Primary);
        controller.handle(PointerEvent::Move { x: 100.0, y: 9000.0 }, &mut camera);
        assert_eq!(camera.rotation[0], PITCH_LIMIT);
    }

    #[test]
    fn secondary_drag_pans_scaled_by_distance() {
        let mut controller = InteractionController::default();
        let mut camera = Camera::default(); // z = -500

        press(&mut controller, &mut camera, PointerButton::Secondary);
        assert_eq!(controller.mode(), DragMode::Panning);

        controller.handle(PointerEvent::Move { x: 110.0, y: 104.0 }, &mut camera);
        assert_eq!(camera.position[0], -(10.0 * DEFAULT_PAN_SPEED * 500.0));
        assert_eq!(camera.position[1], -(4.0 * DEFAULT_PAN_SPEED * 500.0));
    }

    #[test]
    fn wheel_zoom_clamps_to_range() {
        let mut controller = InteractionController::default();
        let mut camera = Camera::default();

        for _ in 0..200 {
            controller.handle(PointerEvent::Wheel { delta: 1.0 }, &mut camera);
        }
        assert_eq!(camera.position[2], DEFAULT_MAX_ZOOM);

        for _ in 0..200 {
            controller.handle(PointerEvent::Wheel { delta: -1.0 }, &mut camera);
        }
        assert_eq!(camera.position[2], DEFAULT_MIN_ZOOM);
    }

    #[test]
    fn pinch_scales_camera_distance() {
        let mut controller = InteractionController::default();
        let mut camera = Camera::default();

        controller.handle(PointerEvent::Pinch { distance: 100.0 }, &mut camera);
        assert_eq!(controller.mode(), DragMode::PinchZooming);
        assert_eq!(camera.position[2], -500.0); // anchor only

        controller.handle(PointerEvent::Pinch { distance: 200.0 }, &mut camera);
        assert_eq!(camera.position[2], -250.0);

        controller.handle(PointerEvent::PinchEnd, &mut camera);
        assert_eq!(controller.mode(), DragMode::Idle);
    }

    #[test]
    fn release_returns_to_idle() {
        let mut controller = InteractionController::default();
        let mut camera = Camera::default();

        press(&mut controller, &mut camera, PointerButton::Primary);
        controller.handle(PointerEvent::Up, &mut camera);
        assert_eq!(controller.mode(), DragMode::Idle);

        press(&mut controller, &mut camera, PointerButton::Secondary);
        controller.handle(PointerEvent::Leave, &mut camera);
        assert_eq!(controller.mode(), DragMode::Idle);
    }

    #[test]
    fn inertia_decays_after_release() {
        let mut controller = InteractionController::default();
        let mut camera = Camera::default();

        press(&mut controller, &mut camera, PointerButton::Primary);
        controller.handle(PointerEvent::Move { x: 110.0, y: 100.0 }, &mut camera);
        controller.handle(PointerEvent::Up, &mut camera);

        let yaw0 = camera.rotation[1];
        controller.tick(&mut camera);
        let first_step = camera.rotation[1] - yaw0;
        controller.tick(&mut camera);
        let second_step = camera.rotation[1] - yaw0 - first_step;

        assert!(first_step > 0.0);
        assert!(second_step > 0.0);
        assert!(second_step < first_step);

        // spin runs out eventually
        for _ in 0..500 {
            controller.tick(&mut camera);
        }
        let settled = camera.rotation[1];
        controller.tick(&mut camera);
        assert_eq!(camera.rotation[1], settled);
    }

    #[test]
    fn inertia_disabled_stops_immediately() {
        let mut controller = InteractionController::new(InteractionConfig {
            inertia: false,
            auto_rotate: false,
            ..InteractionConfig::default()
        });
        let mut camera = Camera::default();

        press(&mut controller, &mut camera, PointerButton::Primary);
        controller.handle(PointerEvent::Move { x: 140.0, y: 100.0 }, &mut camera);
        controller.handle(PointerEvent::Up, &mut camera);

        let yaw = camera.rotation[1];
        controller.tick(&mut camera);
        assert_eq!(camera.rotation[1], yaw);
    }

    #[test]
    fn auto_rotate_advances_yaw_while_untouched() {
        let mut controller = InteractionController::default();
        let mut camera = Camera::default();

        controller.tick(&mut camera);
        assert_eq!(camera.rotation[1], DEFAULT_AUTO_ROTATE_SPEED);
        controller.tick(&mut camera);
        assert_eq!(camera.rotation[1], 2.0 * DEFAULT_AUTO_ROTATE_SPEED);
    }

    #[test]
    fn first_gesture_latches_auto_rotate_off() {
        let mut controller = InteractionController::default();
        let mut camera = Camera::default();

        press(&mut controller, &mut camera, PointerButton::Primary);
        controller.handle(PointerEvent::Up, &mut camera);
        assert!(controller.interacted());

        let yaw = camera.rotation[1];
        controller.tick(&mut camera);
        assert_eq!(camera.rotation[1], yaw);
    }

    #[test]
    fn bare_hover_does_not_latch() {
        let mut controller = InteractionController::default();
        let mut camera = Camera::default();

        controller.handle(PointerEvent::Move { x: 10.0, y: 10.0 }, &mut camera);
        assert!(!controller.interacted());

        controller.tick(&mut camera);
        assert_eq!(camera.rotation[1], DEFAULT_AUTO_ROTATE_SPEED);
    }

    #[test]
    fn pick_node_at_projected_center() {
        let graph = graph_at(&[("a", 0.0, 0.0, 0.0)]);
        let camera = Camera::default();

        // the origin projects to the viewport center
        assert_eq!(pick_node(&graph, &camera, &settings(), 400.0, 300.0), Some(0));
    }

    #[test]
    fn pick_misses_outside_projected_radius() {
        let graph = graph_at(&[("a", 0.0, 0.0, 0.0)]);
        let camera = Camera::default();

        // projected radius is 12 * 0.5 = 6 pixels
        assert_eq!(pick_node(&graph, &camera, &settings(), 420.0, 300.0), None);
    }

    #[test]
    fn nearer_node_wins_screen_tie() {
        let graph = graph_at(&[("far", 0.0, 0.0, 200.0), ("near", 0.0, 0.0, -200.0)]);
        let camera = Camera::default();

        assert_eq!(pick_node(&graph, &camera, &settings(), 400.0, 300.0), Some(1));
    }

    #[test]
    fn behind_camera_never_picked() {
        let graph = graph_at(&[("behind", 0.0, 0.0, -1200.0)]);
        let camera = Camera::default();

        assert_eq!(pick_node(&graph, &camera, &settings(), 400.0, 300.0), None);
    }
}
