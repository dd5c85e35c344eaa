//! Perspective camera and projection math
//!
//! Pure calculation logic that can be unit tested without a rendering
//! backend. The world is rotated opposite to the camera's own rotation
//! (the lens stays fixed), then scaled by the perspective divide
//! `fov / (fov + z)` and mapped into viewport coordinates.

/// Default perspective strength
pub const DEFAULT_FOV: f32 = 500.0;

/// Default camera distance behind the projection plane
pub const DEFAULT_CAMERA_Z: f32 = -500.0;

/// Default near clipping bound for depth normalization
pub const DEFAULT_NEAR: f32 = 0.0;

/// Default far clipping bound for depth normalization
pub const DEFAULT_FAR: f32 = 2000.0;

/// Default upper clamp on the perspective scale factor
pub const DEFAULT_MAX_SCALE: f32 = 1.0;

/// Pitch limit preventing the camera from flipping upside down
pub const PITCH_LIMIT: f32 = std::f32::consts::FRAC_PI_2;

/// Fraction of the viewport a fitted cluster should fill
const FIT_MARGIN: f32 = 0.9;

/// Below this denominator a point counts as at or behind the lens
const SCALE_EPSILON: f32 = 1.0e-6;

/// Viewport dimensions and depth-normalization bounds
///
/// Recomputed on resize; otherwise immutable per frame.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ProjectionSettings {
    pub width: f32,
    pub height: f32,
    /// Camera-space z mapped to depth 0.0
    pub near: f32,
    /// Camera-space z mapped to depth 1.0
    pub far: f32,
    /// Saturation point of the perspective scale factor
    pub max_scale: f32,
}

impl ProjectionSettings {
    /// Settings for a viewport with default clipping bounds
    pub fn new(width: f32, height: f32) -> Self {
        Self {
            width,
            height,
            near: DEFAULT_NEAR,
            far: DEFAULT_FAR,
            max_scale: DEFAULT_MAX_SCALE,
        }
    }

    /// Adopt a new viewport size, leaving clipping bounds untouched
    pub fn resize(&mut self, width: f32, height: f32) {
        self.width = width;
        self.height = height;
    }
}

/// A world point mapped into the viewport
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ProjectedPoint {
    /// Viewport x in pixels
    pub x: f32,
    /// Viewport y in pixels
    pub y: f32,
    /// Perspective scale factor; multiplies radii and font sizes
    pub scale: f32,
    /// Normalized depth in [0, 1] for sorting and fog
    pub depth: f32,
}

/// Outcome of projecting a world point
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Projection {
    /// In front of the lens at this viewport location
    Visible(ProjectedPoint),
    /// At or behind the lens; excluded from drawing and picking
    Behind,
}

impl Projection {
    /// The projected point, if in front of the lens
    pub fn point(self) -> Option<ProjectedPoint> {
        match self {
            Projection::Visible(point) => Some(point),
            Projection::Behind => None,
        }
    }

    pub fn is_visible(self) -> bool {
        matches!(self, Projection::Visible(_))
    }
}

/// Viewer state: position, Euler rotation (radians), perspective strength
///
/// Mutated interactively only by the interaction controller. Rotation is
/// composed X, then Y, then Z everywhere; `rotate_by` keeps pitch clamped
/// and yaw wrapped so the angles never overflow.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Camera {
    /// Position in world space
    pub position: [f32; 3],
    /// Euler angles in radians: pitch (x), yaw (y), roll (z)
    pub rotation: [f32; 3],
    /// Perspective strength; larger values flatten the projection
    pub fov: f32,
}

impl Default for Camera {
    fn default() -> Self {
        Self {
            position: [0.0, 0.0, DEFAULT_CAMERA_Z],
            rotation: [0.0, 0.0, 0.0],
            fov: DEFAULT_FOV,
        }
    }
}

impl Camera {
    pub fn new() -> Self {
        Self::default()
    }

    /// Map a world point into the viewport
    ///
    /// The translated point is rotated by the negated camera angles in
    /// X, Y, Z order, then scaled by `fov / (fov + z)` saturating at
    /// `settings.max_scale`. A denominator at or below zero classifies the
    /// point as `Behind`; that is a defined result, not an error.
    pub fn project(&self, x: f32, y: f32, z: f32, settings: &ProjectionSettings) -> Projection {
        let dx = x - self.position[0];
        let dy = y - self.position[1];
        let dz = z - self.position[2];

        let (dx, dy, dz) = rotate_x(dx, dy, dz, -self.rotation[0]);
        let (dx, dy, dz) = rotate_y(dx, dy, dz, -self.rotation[1]);
        let (dx, dy, dz) = rotate_z(dx, dy, dz, -self.rotation[2]);

        let denom = self.fov + dz;
        if denom <= SCALE_EPSILON {
            return Projection::Behind;
        }
        let scale = (self.fov / denom).min(settings.max_scale);
        if scale <= 0.0 {
            return Projection::Behind;
        }

        let range = (settings.far - settings.near).max(SCALE_EPSILON);
        let depth = ((dz - settings.near) / range).clamp(0.0, 1.0);

        Projection::Visible(ProjectedPoint {
            x: dx * scale + settings.width / 2.0,
            y: dy * scale + settings.height / 2.0,
            scale,
            depth,
        })
    }

    /// Apply a rotation delta, clamping pitch to ±π/2 and wrapping yaw
    pub fn rotate_by(&mut self, delta_pitch: f32, delta_yaw: f32) {
        self.rotation[0] = (self.rotation[0] + delta_pitch).clamp(-PITCH_LIMIT, PITCH_LIMIT);
        self.rotation[1] = wrap_angle(self.rotation[1] + delta_yaw);
    }

    /// Return position and rotation to their defaults, keeping the fov
    pub fn reset_view(&mut self) {
        self.position = [0.0, 0.0, DEFAULT_CAMERA_Z];
        self.rotation = [0.0, 0.0, 0.0];
    }

    /// Back the camera off along -z until the bounded cluster fits the view
    pub fn fit_to_bounds(&mut self, bounds: &Bounds, settings: &ProjectionSettings) {
        if bounds.is_empty() {
            return;
        }
        let center = bounds.center();
        let radius = bounds.radius().max(1.0);
        let half_view = settings.width.min(settings.height) / 2.0;

        let scale = (half_view * FIT_MARGIN / radius).min(settings.max_scale);
        let distance = (self.fov * (1.0 - scale) / scale).max(radius * 1.25);

        self.rotation = [0.0, 0.0, 0.0];
        self.position = [center[0], center[1], center[2] - distance];
    }
}

/// Wrap an angle into (-π, π]
pub fn wrap_angle(angle: f32) -> f32 {
    let wrapped = angle % std::f32::consts::TAU;
    if wrapped > std::f32::consts::PI {
        wrapped - std::f32::consts::TAU
    } else if wrapped <= -std::f32::consts::PI {
        wrapped + std::f32::consts::TAU
    } else {
        wrapped
    }
}

/// Alpha attenuation for normalized depth past `fog_start`
pub fn fog_alpha(depth: f32, fog_start: f32, fog_end: f32) -> f32 {
    if depth <= fog_start {
        return 1.0;
    }
    let range = (fog_end - fog_start).max(SCALE_EPSILON);
    (1.0 - (depth - fog_start) / range).clamp(0.0, 1.0)
}

fn rotate_x(x: f32, y: f32, z: f32, angle: f32) -> (f32, f32, f32) {
    let (sin, cos) = angle.sin_cos();
    (x, y * cos - z * sin, y * sin + z * cos)
}

fn rotate_y(x: f32, y: f32, z: f32, angle: f32) -> (f32, f32, f32) {
    let (sin, cos) = angle.sin_cos();
    (x * cos + z * sin, y, -x * sin + z * cos)
}

fn rotate_z(x: f32, y: f32, z: f32, angle: f32) -> (f32, f32, f32) {
    let (sin, cos) = angle.sin_cos();
    (x * cos - y * sin, x * sin + y * cos, z)
}

/// Axis-aligned bounding box in world space
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Bounds {
    pub min: [f32; 3],
    pub max: [f32; 3],
}

impl Bounds {
    /// A box containing nothing; grows as points are included
    pub fn empty() -> Self {
        Self {
            min: [f32::INFINITY; 3],
            max: [f32::NEG_INFINITY; 3],
        }
    }

    pub fn is_empty(&self) -> bool {
        self.min[0] > self.max[0]
    }

    /// Grow to contain a point
    pub fn include(&mut self, x: f32, y: f32, z: f32) {
        let point = [x, y, z];
        for axis in 0..3 {
            self.min[axis] = self.min[axis].min(point[axis]);
            self.max[axis] = self.max[axis].max(point[axis]);
        }
    }

    /// Grow to contain a sphere
    pub fn include_sphere(&mut self, x: f32, y: f32, z: f32, radius: f32) {
        self.include(x - radius, y - radius, z - radius);
        self.include(x + radius, y + radius, z + radius);
    }

    pub fn center(&self) -> [f32; 3] {
        if self.is_empty() {
            return [0.0; 3];
        }
        [
            (self.min[0] + self.max[0]) / 2.0,
            (self.min[1] + self.max[1]) / 2.0,
            (self.min[2] + self.max[2]) / 2.0,
        ]
    }

    /// Half the diagonal; radius of the enclosing sphere
    pub fn radius(&self) -> f32 {
        if self.is_empty() {
            return 0.0;
        }
        let dx = self.max[0] - self.min[0];
        let dy = self.max[1] - self.min[1];
        let dz = self.max[2] - self.min[2];
        0.5 * (dx * dx + dy * dy + dz * dz).sqrt()
    }
}
