use cgmath::{perspective, Deg, Matrix4, Point3, SquareMatrix, Vector3};

/// cgmath builds OpenGL-convention projections (z in -1..1); wgpu clips z to
/// 0..1. Pre-multiplying the projection by this remaps depth and leaves x/y
/// untouched.
#[rustfmt::skip]
pub const OPENGL_TO_WGPU_MATRIX: Matrix4<f32> = Matrix4::new(
    1.0, 0.0, 0.0, 0.0,
    0.0, 1.0, 0.0, 0.0,
    0.0, 0.0, 0.5, 0.0,
    0.0, 0.0, 0.5, 1.0,
);

/// A camera produces the combined view-projection transform for one frame.
pub trait Camera: Sized {
    fn build_view_projection_matrix(&self) -> Matrix4<f32>;
}

/// Camera circling the origin. The eye sits at
/// `(cos angle, sin angle, sin angle)`, so the path is a closed curve but not
/// a flat circle; it always looks at the origin with y up.
///
/// The projection is fixed at construction; only the view changes, driven by
/// an angle that grows by `step` once per presented frame and never wraps.
pub struct OrbitCamera {
    angle: f64,
    step: f64,
    projection: Matrix4<f32>,
}

impl OrbitCamera {
    pub fn new(fovy: Deg<f32>, aspect: f32, znear: f32, zfar: f32, step: f64) -> Self {
        Self {
            angle: 0.0,
            step,
            projection: OPENGL_TO_WGPU_MATRIX * perspective(fovy, aspect, znear, zfar),
        }
    }

    /// Orbit angle in radians, accumulated since startup.
    pub fn angle(&self) -> f64 {
        self.angle
    }

    /// Moves the orbit forward by one frame step.
    pub fn advance(&mut self) {
        self.angle += self.step;
    }

    pub fn eye(&self) -> Point3<f32> {
        let (sin, cos) = self.angle.sin_cos();
        Point3::new(cos as f32, sin as f32, sin as f32)
    }

    /// Look-at from the current eye toward the origin.
    pub fn view_matrix(&self) -> Matrix4<f32> {
        Matrix4::look_at_rh(self.eye(), Point3::new(0.0, 0.0, 0.0), Vector3::unit_y())
    }

    /// The fixed, depth-corrected perspective projection.
    pub fn projection_matrix(&self) -> Matrix4<f32> {
        self.projection
    }
}

impl Camera for OrbitCamera {
    fn build_view_projection_matrix(&self) -> Matrix4<f32> {
        self.projection_matrix() * self.view_matrix()
    }
}

/// Shader-side copy of the combined transform, bound as the uniform buffer at
/// group 0, binding 0.
#[repr(C)]
#[derive(Copy, Clone, bytemuck::Pod, bytemuck::Zeroable)]
pub struct TransformUniform {
    mvp: [[f32; 4]; 4],
}

impl TransformUniform {
    pub fn set_transform(&mut self, transform: Matrix4<f32>) {
        self.mvp = transform.into();
    }
}

impl Default for TransformUniform {
    fn default() -> Self {
        Self {
            mvp: Matrix4::identity().into(),
        }
    }
}
