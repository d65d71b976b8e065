//! Axis-aligned bounding boxes

use crate::foundation::math::{utils, Vec3};

/// Axis-Aligned Bounding Box
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AABB {
    /// Minimum corner of the bounding box
    pub min: Vec3,
    /// Maximum corner of the bounding box
    pub max: Vec3,
}

impl AABB {
    /// Create a new AABB from min and max points
    pub fn new(min: Vec3, max: Vec3) -> Self {
        Self { min, max }
    }

    /// A degenerate box containing a single point
    pub fn from_point(point: Vec3) -> Self {
        Self { min: point, max: point }
    }

    /// Create an AABB centered at a point with given extents
    pub fn from_center_extents(center: Vec3, extents: Vec3) -> Self {
        Self {
            min: center - extents,
            max: center + extents,
        }
    }

    /// Get the center of the AABB
    pub fn center(&self) -> Vec3 {
        (self.min + self.max) * 0.5
    }

    /// Full edge lengths of the AABB
    pub fn size(&self) -> Vec3 {
        self.max - self.min
    }

    /// Grow the box to include a point
    pub fn extend(&mut self, point: &Vec3) {
        self.min = utils::vec_min(&self.min, point);
        self.max = utils::vec_max(&self.max, point);
    }

    /// Smallest box containing both boxes
    pub fn union(&self, other: &AABB) -> AABB {
        AABB {
            min: utils::vec_min(&self.min, &other.min),
            max: utils::vec_max(&self.max, &other.max),
        }
    }

    /// The same box moved by `offset`
    pub fn translated(&self, offset: &Vec3) -> AABB {
        AABB {
            min: self.min + offset,
            max: self.max + offset,
        }
    }

    /// Check if this AABB contains a point
    pub fn contains_point(&self, point: Vec3) -> bool {
        point.x >= self.min.x && point.x <= self.max.x &&
        point.y >= self.min.y && point.y <= self.max.y &&
        point.z >= self.min.z && point.z <= self.max.z
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_aabb_contains_point() {
        let aabb = AABB::new(
            Vec3::new(-1.0, -1.0, -1.0),
            Vec3::new(1.0, 1.0, 1.0),
        );

        assert!(aabb.contains_point(Vec3::zeros()));
        assert!(aabb.contains_point(Vec3::new(0.5, 0.5, 0.5)));
        assert!(!aabb.contains_point(Vec3::new(2.0, 0.0, 0.0)));
    }

    #[test]
    fn test_extend_from_point() {
        let mut aabb = AABB::from_point(Vec3::new(1.0, 2.0, 3.0));
        aabb.extend(&Vec3::new(-1.0, 5.0, 0.0));

        assert_eq!(aabb.min, Vec3::new(-1.0, 2.0, 0.0));
        assert_eq!(aabb.max, Vec3::new(1.0, 5.0, 3.0));
        assert_eq!(aabb.size(), Vec3::new(2.0, 3.0, 3.0));
    }

    #[test]
    fn test_union_and_translate() {
        let a = AABB::new(Vec3::new(0.0, 0.0, 0.0), Vec3::new(1.0, 1.0, 1.0));
        let b = AABB::new(Vec3::new(-1.0, 0.5, 0.5), Vec3::new(0.5, 3.0, 0.5))
            .translated(&Vec3::new(0.0, 1.0, 0.0));

        let merged = a.union(&b);
        assert_eq!(merged.min, Vec3::new(-1.0, 0.0, 0.0));
        assert_eq!(merged.max, Vec3::new(1.0, 4.0, 1.0));
        assert_eq!(merged.center(), Vec3::new(0.0, 2.0, 0.5));
    }
}
