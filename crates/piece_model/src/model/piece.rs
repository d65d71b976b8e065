//! Model pieces
//!
//! A piece is one node of a model's hierarchy: a local transform, optional
//! geometry, and links to its parent and children inside the owning
//! [`Model`](super::Model).

use bytemuck::{Pod, Zeroable};

use super::bounds::AABB;
use super::collision::CollisionVolume;
use super::PieceId;
use crate::foundation::math::{Mat4, Mat4Ext, Vec3};
use crate::import::MAX_UV_CHANNELS;

/// Vertex layout shared by every piece
///
/// `#[repr(C)]` and `Pod` so an upload adapter can hand the vertex list to
/// a graphics API as raw bytes.
#[repr(C)]
#[derive(Debug, Clone, Copy, Default, PartialEq, Pod, Zeroable)]
pub struct ModelVertex {
    /// Position in piece space
    pub position: [f32; 3],
    /// Surface normal (zero when the importer had none)
    pub normal: [f32; 3],
    /// Tangent along the texture s-axis
    pub s_tangent: [f32; 3],
    /// Tangent along the texture t-axis
    pub t_tangent: [f32; 3],
    /// Texture coordinates per channel
    pub tex_coords: [[f32; 2]; MAX_UV_CHANNELS],
}

/// How script rotation axes map onto model axes
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum AxisMapping {
    /// x→pitch, y→yaw, z→roll
    #[default]
    Xyz,
    /// x→yaw, z→pitch, y→roll
    Zxy,
    /// y→yaw, z→pitch, x→roll
    Xzy,
}

impl AxisMapping {
    /// Mapping for the metadata `rotAxisMap` integer, if in range
    pub fn from_index(index: i64) -> Option<Self> {
        match index {
            0 => Some(Self::Xyz),
            1 => Some(Self::Zxy),
            2 => Some(Self::Xzy),
            _ => None,
        }
    }

    /// Split `angles` into (yaw, pitch, roll), each with its axis sign applied
    pub fn yaw_pitch_roll(self, angles: &Vec3, signs: &Vec3) -> (f32, f32, f32) {
        let signed = angles.component_mul(signs);
        match self {
            Self::Xyz => (signed.y, signed.x, signed.z),
            Self::Zxy => (signed.x, signed.z, signed.y),
            Self::Xzy => (signed.y, signed.z, signed.x),
        }
    }
}

/// One piece of a model hierarchy
#[derive(Debug, Clone, PartialEq)]
pub struct Piece {
    /// Unique name within the model
    pub name: String,
    /// Name of the parent piece; empty for the root and for orphans
    pub parent_name: String,
    /// Resolved parent; `None` for the root and detached pieces
    pub parent: Option<PieceId>,
    /// Children in link order
    pub children: Vec<PieceId>,

    /// Offset relative to the parent
    pub offset: Vec3,
    /// Isotropic scale (all components equal)
    pub scales: Vec3,
    /// Imported orientation with the metadata pose rotation composed in
    pub baked_rot_matrix: Mat4,
    /// Metadata pose rotation in radians
    pub pose_rotation: Vec3,
    /// Per-axis sign applied to script rotations
    pub rot_axis_signs: Vec3,
    /// Script rotation axis mapping
    pub axis_map_type: AxisMapping,

    /// Flattened vertices of every mesh attached to the node
    pub vertices: Vec<ModelVertex>,
    /// Triangle list indices into `vertices`
    pub vertex_draw_indices: Vec<u32>,
    /// Local geometry bounds; `None` without geometry
    pub bounds: Option<AABB>,
    /// Number of populated texture-coordinate channels
    pub num_tex_coord_channels: usize,

    /// Offset in model space
    pub goffset: Vec3,
    /// Collision volume in local geometry space
    pub collision_volume: Option<CollisionVolume>,

    /// Whether `vertices` is non-empty
    pub has_geometry_data: bool,
    /// Whether `baked_rot_matrix` is the identity
    pub has_identity_rotation: bool,
}

impl Piece {
    /// Create an empty piece with default transform state
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            parent_name: String::new(),
            parent: None,
            children: Vec::new(),
            offset: Vec3::zeros(),
            scales: Vec3::new(1.0, 1.0, 1.0),
            baked_rot_matrix: Mat4::identity(),
            pose_rotation: Vec3::zeros(),
            rot_axis_signs: Vec3::new(-1.0, -1.0, -1.0),
            axis_map_type: AxisMapping::Xyz,
            vertices: Vec::new(),
            vertex_draw_indices: Vec::new(),
            bounds: None,
            num_tex_coord_channels: 0,
            goffset: Vec3::zeros(),
            collision_volume: None,
            has_geometry_data: false,
            has_identity_rotation: true,
        }
    }

    /// Local minimum extents (zero without geometry)
    pub fn mins(&self) -> Vec3 {
        self.bounds.map_or_else(Vec3::zeros, |b| b.min)
    }

    /// Local maximum extents (zero without geometry)
    pub fn maxs(&self) -> Vec3 {
        self.bounds.map_or_else(Vec3::zeros, |b| b.max)
    }

    /// Raise the tracked texture-coordinate channel count to at least `count`
    pub fn set_num_tex_coord_channels(&mut self, count: usize) {
        self.num_tex_coord_channels = self.num_tex_coord_channels.max(count);
    }

    /// Apply a yaw/pitch/roll rotation (radians) on top of `m`
    ///
    /// Rotations run in yaw, pitch, roll order after the axis mapping and
    /// signs of this piece have been applied; zero angles are skipped.
    pub fn compose_rotation(&self, m: &Mat4, angles: &Vec3) -> Mat4 {
        let (yaw, pitch, roll) = self.axis_map_type.yaw_pitch_roll(angles, &self.rot_axis_signs);
        let mut result = *m;
        if yaw != 0.0 {
            result *= Mat4::rotation_y(yaw);
        }
        if pitch != 0.0 {
            result *= Mat4::rotation_x(pitch);
        }
        if roll != 0.0 {
            result *= Mat4::rotation_z(roll);
        }
        result
    }

    /// Scale+rotation part of the piece transform (R * S, no translation)
    pub fn compose_scale_rotation(&self) -> Mat4 {
        let scaling = Mat4::new_nonuniform_scaling(&self.scales);
        if self.has_identity_rotation {
            scaling
        } else {
            self.baked_rot_matrix * scaling
        }
    }

    /// Vertex list as raw bytes for GPU upload
    pub fn vertex_bytes(&self) -> &[u8] {
        bytemuck::cast_slice(&self.vertices)
    }

    /// Index list as raw bytes for GPU upload
    pub fn index_bytes(&self) -> &[u8] {
        bytemuck::cast_slice(&self.vertex_draw_indices)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::foundation::math::constants::HALF_PI;
    use approx::assert_relative_eq;

    #[test]
    fn test_new_piece_defaults() {
        let piece = Piece::new("Turret");

        assert_eq!(piece.name, "Turret");
        assert_eq!(piece.rot_axis_signs, Vec3::new(-1.0, -1.0, -1.0));
        assert_eq!(piece.axis_map_type, AxisMapping::Xyz);
        assert!(piece.has_identity_rotation);
        assert!(!piece.has_geometry_data);
        assert_eq!(piece.mins(), Vec3::zeros());
        assert_eq!(piece.maxs(), Vec3::zeros());
    }

    #[test]
    fn test_axis_mapping_from_index() {
        assert_eq!(AxisMapping::from_index(0), Some(AxisMapping::Xyz));
        assert_eq!(AxisMapping::from_index(1), Some(AxisMapping::Zxy));
        assert_eq!(AxisMapping::from_index(2), Some(AxisMapping::Xzy));
        assert_eq!(AxisMapping::from_index(3), None);
        assert_eq!(AxisMapping::from_index(-1), None);
    }

    #[test]
    fn test_yaw_pitch_roll_mapping() {
        let angles = Vec3::new(1.0, 2.0, 3.0);
        let signs = Vec3::new(1.0, -1.0, 1.0);

        assert_eq!(AxisMapping::Xyz.yaw_pitch_roll(&angles, &signs), (-2.0, 1.0, 3.0));
        assert_eq!(AxisMapping::Zxy.yaw_pitch_roll(&angles, &signs), (1.0, 3.0, -2.0));
        assert_eq!(AxisMapping::Xzy.yaw_pitch_roll(&angles, &signs), (-2.0, 3.0, 1.0));
    }

    #[test]
    fn test_compose_rotation_applies_signs() {
        let mut piece = Piece::new("p");
        piece.rot_axis_signs = Vec3::new(1.0, 1.0, 1.0);

        let rotated = piece.compose_rotation(&Mat4::identity(), &Vec3::new(0.0, HALF_PI, 0.0));
        assert_relative_eq!(rotated, Mat4::rotation_y(HALF_PI), epsilon = 1e-6);

        piece.rot_axis_signs = Vec3::new(-1.0, -1.0, -1.0);
        let mirrored = piece.compose_rotation(&Mat4::identity(), &Vec3::new(0.0, HALF_PI, 0.0));
        assert_relative_eq!(mirrored, Mat4::rotation_y(-HALF_PI), epsilon = 1e-6);
    }

    #[test]
    fn test_compose_scale_rotation() {
        let mut piece = Piece::new("p");
        piece.scales = Vec3::new(2.0, 2.0, 2.0);
        piece.baked_rot_matrix = Mat4::rotation_z(HALF_PI);
        piece.has_identity_rotation = false;

        let m = piece.compose_scale_rotation();
        let moved = m.transform_vector(&Vec3::new(1.0, 0.0, 0.0));

        assert_relative_eq!(moved, Vec3::new(0.0, 2.0, 0.0), epsilon = 1e-6);
    }

    #[test]
    fn test_upload_views() {
        let mut piece = Piece::new("p");
        piece.vertices.push(ModelVertex::default());
        piece.vertex_draw_indices.extend_from_slice(&[0, 0, 0]);

        assert_eq!(piece.vertex_bytes().len(), std::mem::size_of::<ModelVertex>());
        assert_eq!(piece.index_bytes().len(), 12);
    }
}
