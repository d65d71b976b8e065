//! Per-piece collision volumes
//!
//! Volumes are stored in the piece's local geometry space; the physics side
//! places them using the piece's global offset at test time.

use super::bounds::AABB;
use crate::foundation::math::Vec3;

/// Shape of a collision volume
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum VolumeShape {
    /// Axis-aligned box
    Box,
}

/// Collision volume attached to a piece
#[derive(Debug, Clone, PartialEq)]
pub struct CollisionVolume {
    /// Volume shape
    pub shape: VolumeShape,
    /// Full edge lengths along each axis
    pub full_extents: Vec3,
    /// Center of the volume relative to the piece origin
    pub offset: Vec3,
}

impl CollisionVolume {
    /// Box sized to `full_extents`, centered on `offset`
    pub fn new_box(full_extents: Vec3, offset: Vec3) -> Self {
        Self {
            shape: VolumeShape::Box,
            full_extents,
            offset,
        }
    }

    /// Box exactly enclosing the given local bounds
    pub fn from_bounds(bounds: &AABB) -> Self {
        Self::new_box(bounds.size(), bounds.center())
    }

    /// Half edge lengths
    pub fn half_extents(&self) -> Vec3 {
        self.full_extents * 0.5
    }

    /// Radius of the sphere enclosing the volume, centered on `offset`
    pub fn bounding_radius(&self) -> f32 {
        match self.shape {
            VolumeShape::Box => self.half_extents().magnitude(),
        }
    }

    /// Volume as a local-space AABB
    pub fn local_aabb(&self) -> AABB {
        AABB::from_center_extents(self.offset, self.half_extents())
    }

    /// Check if a local-space point lies inside the volume
    pub fn contains_point(&self, point: Vec3) -> bool {
        match self.shape {
            VolumeShape::Box => self.local_aabb().contains_point(point),
        }
    }
}
