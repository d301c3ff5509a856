use super::rigid_body::{BodyShape, RigidBody};
use glam::{Mat3A, Vec3A};

/// Oriented box in world space
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Obb {
    pub center: Vec3A,
    pub axes: Mat3A,
    pub half_extents: Vec3A,
}

/// Result of pushing a point or sphere out of a box
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct BoxContact {
    /// Point on the box surface
    pub point: Vec3A,
    /// Points out of the box, towards the other shape
    pub normal: Vec3A,
    /// Negative while penetrating
    pub distance: f32,
}

impl Obb {
    #[must_use]
    pub fn from_body(rb: &RigidBody) -> Option<Self> {
        let BodyShape::Box {
            half_extents,
            offset,
        } = rb.shape
        else {
            return None;
        };

        let trans = rb.get_world_transform();
        Some(Self {
            center: trans.transform_point3a(offset),
            axes: trans.matrix3,
            half_extents,
        })
    }

    #[inline]
    #[must_use]
    pub fn to_local(&self, point: Vec3A) -> Vec3A {
        self.axes.transpose() * (point - self.center)
    }

    #[inline]
    #[must_use]
    pub fn to_world(&self, local: Vec3A) -> Vec3A {
        self.center + self.axes * local
    }

    #[must_use]
    pub fn closest_point(&self, point: Vec3A) -> Vec3A {
        let local = self.to_local(point).clamp(-self.half_extents, self.half_extents);
        self.to_world(local)
    }

    #[must_use]
    pub fn contains_point(&self, point: Vec3A) -> bool {
        self.to_local(point).abs().cmple(self.half_extents).all()
    }

    /// Corners followed by edge midpoints, the points that hit another box first
    #[must_use]
    pub fn feature_points(&self) -> [Vec3A; 20] {
        const SIGNS: [f32; 3] = [-1.0, 0.0, 1.0];

        let mut points = [Vec3A::ZERO; 20];
        let mut num = 0;
        for zero_count_wanted in [0, 1] {
            for sx in SIGNS {
                for sy in SIGNS {
                    for sz in SIGNS {
                        let zeros = [sx, sy, sz].iter().filter(|s| **s == 0.0).count();
                        if zeros != zero_count_wanted {
                            continue;
                        }

                        points[num] = self.to_world(self.half_extents * Vec3A::new(sx, sy, sz));
                        num += 1;
                    }
                }
            }
        }

        debug_assert_eq!(num, points.len());
        points
    }

    /// Shortest way out of the box for a point inside it
    #[must_use]
    pub fn point_penetration(&self, point: Vec3A) -> Option<BoxContact> {
        let local = self.to_local(point);
        let gap = self.half_extents - local.abs();
        if gap.min_element() < 0.0 {
            return None;
        }

        let axis = if gap.x <= gap.y && gap.x <= gap.z {
            0
        } else if gap.y <= gap.z {
            1
        } else {
            2
        };

        let sign = if local[axis] < 0.0 { -1.0 } else { 1.0 };
        let normal = self.axes.col(axis) * sign;
        let depth = gap[axis];

        Some(BoxContact {
            point: point + normal * depth,
            normal,
            distance: -depth,
        })
    }

    /// Closest contact between this box and a sphere, if they are within `margin`
    #[must_use]
    pub fn sphere_contact(&self, center: Vec3A, radius: f32, margin: f32) -> Option<BoxContact> {
        let closest = self.closest_point(center);
        let delta = center - closest;
        let dist_sq = delta.length_squared();

        if dist_sq > f32::EPSILON {
            let dist = dist_sq.sqrt();
            if dist > radius + margin {
                return None;
            }

            return Some(BoxContact {
                point: closest,
                normal: delta / dist,
                distance: dist - radius,
            });
        }

        // Center is inside the box
        let inner = self.point_penetration(center)?;
        Some(BoxContact {
            point: inner.point,
            normal: inner.normal,
            distance: inner.distance - radius,
        })
    }
}
