//! Math utilities and types
//!
//! Provides the fundamental math types used by the piece pipeline. Matrices
//! follow the column-vector convention (`m * v`) with the translation stored
//! in the last column, matching what scene importers hand us.

pub use nalgebra::{Matrix3, Matrix4, Quaternion, Unit, Vector2, Vector3};

/// 2D vector type
pub type Vec2 = Vector2<f32>;

/// 3D vector type
pub type Vec3 = Vector3<f32>;

/// 3x3 matrix type
pub type Mat3 = Matrix3<f32>;

/// 4x4 matrix type
pub type Mat4 = Matrix4<f32>;

/// Quaternion type for rotations
pub type Quat = Unit<Quaternion<f32>>;

/// Transform representing position, rotation, and scale
#[derive(Debug, Clone, PartialEq)]
pub struct Transform {
    /// Position in 3D space
    pub position: Vec3,

    /// Rotation quaternion
    pub rotation: Quat,

    /// Scale factors
    pub scale: Vec3,
}

impl Transform {
    /// Convert to a transformation matrix (T * R * S)
    pub fn to_matrix(&self) -> Mat4 {
        Mat4::new_translation(&self.position)
            * self.rotation.to_homogeneous()
            * Mat4::new_nonuniform_scaling(&self.scale)
    }

    /// Decompose a transformation matrix into translation, rotation and scale
    ///
    /// Scale is the length of each basis column; a mirrored basis (negative
    /// determinant) is reported through negated scale components so the
    /// remaining rotation stays proper.
    pub fn from_matrix(matrix: &Mat4) -> Self {
        // Extract position
        let position = Vec3::new(matrix.m14, matrix.m24, matrix.m34);

        // Extract scale from the matrix columns
        let basis: Mat3 = matrix.fixed_view::<3, 3>(0, 0).into_owned();
        let mut scale = Vec3::new(
            basis.column(0).magnitude(),
            basis.column(1).magnitude(),
            basis.column(2).magnitude(),
        );
        if basis.determinant() < 0.0 {
            scale = -scale;
        }

        // Extract rotation by removing scale from the basis
        let mut rotation_matrix = basis;
        for (axis, s) in scale.iter().enumerate() {
            if s.abs() > f32::EPSILON {
                rotation_matrix.column_mut(axis).scale_mut(1.0 / s);
            }
        }
        let rotation = Quat::from_matrix(&rotation_matrix);

        Self {
            position,
            rotation,
            scale,
        }
    }
}

/// Math constants
pub mod constants {
    /// Pi constant
    pub const PI: f32 = std::f32::consts::PI;

    /// Pi / 2
    pub const HALF_PI: f32 = PI * 0.5;

    /// Degrees to radians conversion factor
    pub const DEG_TO_RAD: f32 = PI / 180.0;

    /// Radians to degrees conversion factor
    pub const RAD_TO_DEG: f32 = 180.0 / PI;
}

/// Math utility functions
pub mod utils {
    use super::{constants, Mat3, Mat4, Quat, Vec3};

    /// Component-wise minimum of two vectors
    pub fn vec_min(a: &Vec3, b: &Vec3) -> Vec3 {
        a.inf(b)
    }

    /// Component-wise maximum of two vectors
    pub fn vec_max(a: &Vec3, b: &Vec3) -> Vec3 {
        a.sup(b)
    }

    /// Whether the upper 3x3 block is orthonormal and the matrix carries
    /// no translation or projection
    pub fn is_orthonormal(m: &Mat4, tolerance: f32) -> bool {
        let basis: Mat3 = m.fixed_view::<3, 3>(0, 0).into_owned();
        let deviation = basis.transpose() * basis - Mat3::identity();
        let affine_ok = m.m14.abs() <= tolerance
            && m.m24.abs() <= tolerance
            && m.m34.abs() <= tolerance
            && m.m41.abs() <= tolerance
            && m.m42.abs() <= tolerance
            && m.m43.abs() <= tolerance
            && (m.m44 - 1.0).abs() <= tolerance;
        affine_ok && deviation.amax() <= tolerance
    }

    /// Convert a quaternion to (yaw, pitch, roll)-style radian angles
    ///
    /// Near the poles (`|x*y + z*w|` close to half the squared norm) only the
    /// first two angles are meaningful and the third is left at zero. The
    /// quaternion does not need to be normalized.
    pub fn quaternion_to_radian_angles(q: &Quat) -> Vec3 {
        let (x, y, z, w) = (q.i, q.j, q.k, q.w);
        let sqw = w * w;
        let sqx = x * x;
        let sqy = y * y;
        let sqz = z * z;
        // 1 if normalised, otherwise correction factor
        let unit = sqx + sqy + sqz + sqw;
        let test = x * y + z * w;

        if test > 0.499 * unit {
            // singularity at north pole
            Vec3::new(2.0 * x.atan2(w), constants::HALF_PI, 0.0)
        } else if test < -0.499 * unit {
            // singularity at south pole
            Vec3::new(-2.0 * x.atan2(w), -constants::HALF_PI, 0.0)
        } else {
            Vec3::new(
                (2.0 * y * w - 2.0 * x * z).atan2(sqx - sqy - sqz + sqw),
                (2.0 * test / unit).asin(),
                (2.0 * x * w - 2.0 * y * z).atan2(-sqx + sqy - sqz + sqw),
            )
        }
    }
}

/// Extension trait for Mat4 with additional convenience methods
pub trait Mat4Ext {
    /// Create a rotation matrix around the X axis
    fn rotation_x(angle: f32) -> Mat4;

    /// Create a rotation matrix around the Y axis
    fn rotation_y(angle: f32) -> Mat4;

    /// Create a rotation matrix around the Z axis
    fn rotation_z(angle: f32) -> Mat4;

    /// Build a matrix whose first three columns are the given basis axes
    fn from_basis(x_axis: &Vec3, y_axis: &Vec3, z_axis: &Vec3) -> Mat4;

    /// Basis axis `index` (0 = X, 1 = Y, 2 = Z) of the upper 3x3 block
    fn basis_axis(&self, index: usize) -> Vec3;
}

impl Mat4Ext for Mat4 {
    fn rotation_x(angle: f32) -> Mat4 {
        Mat4::from_axis_angle(&Vec3::x_axis(), angle)
    }

    fn rotation_y(angle: f32) -> Mat4 {
        Mat4::from_axis_angle(&Vec3::y_axis(), angle)
    }

    fn rotation_z(angle: f32) -> Mat4 {
        Mat4::from_axis_angle(&Vec3::z_axis(), angle)
    }

    fn from_basis(x_axis: &Vec3, y_axis: &Vec3, z_axis: &Vec3) -> Mat4 {
        Mat4::new(
            x_axis.x, y_axis.x, z_axis.x, 0.0,
            x_axis.y, y_axis.y, z_axis.y, 0.0,
            x_axis.z, y_axis.z, z_axis.z, 0.0,
            0.0, 0.0, 0.0, 1.0,
        )
    }

    fn basis_axis(&self, index: usize) -> Vec3 {
        Vec3::new(self[(0, index)], self[(1, index)], self[(2, index)])
    }
}
