//! Analytic static arena geometry.
//!
//! Every game mode is built from bounded one-sided rectangles and concave quarter-cylinder
//! fillets. Rectangles are left untrimmed where they meet, the fillets sit inside the
//! corner they round off, so a body always hits the fillet before the planes behind it.
//! All values are stored in bullet units.

use crate::{
    GameMode,
    consts::{
        ARENA_EXTENT_X, ARENA_EXTENT_X_HOOPS, ARENA_EXTENT_Y, ARENA_EXTENT_Y_HOOPS, ARENA_HEIGHT,
        ARENA_HEIGHT_HOOPS, UU_TO_BT,
        arena::{CORNER_CUT, FILLET_RADIUS, MAX_POINT_PENETRATION},
        goal::{SOCCAR_GOAL_DEPTH, SOCCAR_GOAL_HALF_WIDTH, SOCCAR_GOAL_HEIGHT},
    },
};
use glam::Vec3A;
use std::f32::consts::FRAC_1_SQRT_2;

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct GeometryContact {
    /// Point on the static surface
    pub point: Vec3A,
    /// Points into the arena
    pub normal: Vec3A,
    /// Negative while penetrating
    pub distance: f32,
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct RayHit {
    pub point: Vec3A,
    pub normal: Vec3A,
    /// Hit position along the ray, in `[0, 1]`
    pub fraction: f32,
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub enum StaticShape {
    /// Rectangle that only collides from the side `normal` points to
    Quad {
        center: Vec3A,
        normal: Vec3A,
        u: Vec3A,
        v: Vec3A,
        half_u: f32,
        half_v: f32,
    },
    /// Inside of a quarter cylinder, the surface spans from `dir_a` to `dir_b` around the axis
    Fillet {
        center: Vec3A,
        axis: Vec3A,
        half_len: f32,
        radius: f32,
        dir_a: Vec3A,
        dir_b: Vec3A,
    },
}

impl StaticShape {
    fn quad(center_uu: Vec3A, normal: Vec3A, u: Vec3A, half_u_uu: f32, half_v_uu: f32) -> Self {
        debug_assert!(normal.is_normalized() && u.is_normalized());
        debug_assert!(normal.dot(u).abs() < 1e-5);

        Self::Quad {
            center: center_uu * UU_TO_BT,
            normal,
            u,
            v: normal.cross(u),
            half_u: half_u_uu * UU_TO_BT,
            half_v: half_v_uu * UU_TO_BT,
        }
    }

    fn fillet(center_uu: Vec3A, axis: Vec3A, half_len_uu: f32, dir_a: Vec3A, dir_b: Vec3A) -> Self {
        debug_assert!(axis.dot(dir_a).abs() < 1e-5 && axis.dot(dir_b).abs() < 1e-5);

        Self::Fillet {
            center: center_uu * UU_TO_BT,
            axis,
            half_len: half_len_uu * UU_TO_BT,
            radius: FILLET_RADIUS * UU_TO_BT,
            dir_a,
            dir_b,
        }
    }

    #[must_use]
    pub fn sphere_contact(&self, pos: Vec3A, sphere_radius: f32) -> Option<GeometryContact> {
        match *self {
            Self::Quad {
                center,
                normal,
                u,
                v,
                half_u,
                half_v,
            } => {
                let rel = pos - center;
                let sd = rel.dot(normal);
                if sd >= sphere_radius || sd <= -sphere_radius {
                    return None;
                }

                let (lu, lv) = (rel.dot(u), rel.dot(v));
                if lu.abs() <= half_u && lv.abs() <= half_v {
                    return Some(GeometryContact {
                        point: pos - normal * sd,
                        normal,
                        distance: sd - sphere_radius,
                    });
                }

                if sd <= 0.0 {
                    return None;
                }

                // Rounded edge of the rectangle
                let closest = center
                    + u * lu.clamp(-half_u, half_u)
                    + v * lv.clamp(-half_v, half_v);
                let delta = pos - closest;
                let dist = delta.length();
                if dist >= sphere_radius || dist <= f32::EPSILON {
                    return None;
                }

                Some(GeometryContact {
                    point: closest,
                    normal: delta / dist,
                    distance: dist - sphere_radius,
                })
            }
            Self::Fillet { .. } => {
                let proj = self.fillet_projection(pos)?;
                let distance = (proj.radius - sphere_radius) - proj.dist;
                if distance >= 0.0 || distance < -2.0 * sphere_radius {
                    return None;
                }

                Some(proj.contact(distance))
            }
        }
    }

    #[must_use]
    pub fn point_contact(&self, pos: Vec3A) -> Option<GeometryContact> {
        let max_pen = MAX_POINT_PENETRATION * UU_TO_BT;

        match *self {
            Self::Quad {
                center,
                normal,
                u,
                v,
                half_u,
                half_v,
            } => {
                let rel = pos - center;
                let sd = rel.dot(normal);
                if sd >= 0.0 || sd <= -max_pen {
                    return None;
                }

                if rel.dot(u).abs() > half_u || rel.dot(v).abs() > half_v {
                    return None;
                }

                Some(GeometryContact {
                    point: pos - normal * sd,
                    normal,
                    distance: sd,
                })
            }
            Self::Fillet { .. } => {
                let proj = self.fillet_projection(pos)?;
                let distance = proj.radius - proj.dist;
                if distance >= 0.0 || distance <= -max_pen {
                    return None;
                }

                Some(proj.contact(distance))
            }
        }
    }

    /// Projection of `pos` onto the fillet axis, if it lies within the fillet's quadrant
    fn fillet_projection(&self, pos: Vec3A) -> Option<FilletProjection> {
        let Self::Fillet {
            center,
            axis,
            half_len,
            radius,
            dir_a,
            dir_b,
        } = *self
        else {
            return None;
        };

        let rel = pos - center;
        let along = rel.dot(axis);
        if along.abs() > half_len {
            return None;
        }

        let radial = rel - axis * along;
        if radial.dot(dir_a) < 0.0 || radial.dot(dir_b) < 0.0 {
            return None;
        }

        let dist = radial.length();
        (dist > f32::EPSILON).then(|| FilletProjection {
            axis_point: center + axis * along,
            dir: radial / dist,
            dist,
            radius,
        })
    }

    #[must_use]
    pub fn ray_cast(&self, from: Vec3A, to: Vec3A) -> Option<RayHit> {
        let delta = to - from;

        match *self {
            Self::Quad {
                center,
                normal,
                u,
                v,
                half_u,
                half_v,
            } => {
                let denom = delta.dot(normal);
                if denom >= -f32::EPSILON {
                    return None;
                }

                let fraction = (center - from).dot(normal) / denom;
                if !(0.0..=1.0).contains(&fraction) {
                    return None;
                }

                let point = from + delta * fraction;
                let rel = point - center;
                if rel.dot(u).abs() > half_u || rel.dot(v).abs() > half_v {
                    return None;
                }

                Some(RayHit {
                    point,
                    normal,
                    fraction,
                })
            }
            Self::Fillet {
                center,
                axis,
                radius,
                ..
            } => {
                let w = from - center;
                let wp = w - axis * w.dot(axis);
                let dp = delta - axis * delta.dot(axis);

                let a = dp.length_squared();
                if a <= f32::EPSILON {
                    return None;
                }

                let b = 2.0 * wp.dot(dp);
                let c = wp.length_squared() - radius * radius;
                let disc = b * b - 4.0 * a * c;
                if disc < 0.0 {
                    return None;
                }

                // Leaving the cylinder, the concave side faces the ray
                let fraction = (-b + disc.sqrt()) / (2.0 * a);
                if !(0.0..=1.0).contains(&fraction) {
                    return None;
                }

                let point = from + delta * fraction;
                let proj = self.fillet_projection(point)?;
                Some(RayHit {
                    point,
                    normal: -proj.dir,
                    fraction,
                })
            }
        }
    }
}

struct FilletProjection {
    axis_point: Vec3A,
    dir: Vec3A,
    dist: f32,
    radius: f32,
}

impl FilletProjection {
    fn contact(&self, distance: f32) -> GeometryContact {
        GeometryContact {
            point: self.axis_point + self.dir * self.radius,
            normal: -self.dir,
            distance,
        }
    }
}

#[derive(Clone, Debug, Default)]
pub struct ArenaGeometry {
    shapes: Vec<StaticShape>,
}

impl ArenaGeometry {
    #[must_use]
    pub fn new(game_mode: GameMode) -> Self {
        let shapes = match game_mode {
            GameMode::Soccar => Self::soccar_shapes(),
            GameMode::Hoops => Self::hoops_shapes(),
            GameMode::TheVoid => Vec::new(),
        };

        Self { shapes }
    }

    #[must_use]
    pub fn shapes(&self) -> &[StaticShape] {
        &self.shapes
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.shapes.is_empty()
    }

    pub fn sphere_contacts(&self, pos: Vec3A, radius: f32, out: &mut Vec<GeometryContact>) {
        out.extend(
            self.shapes
                .iter()
                .filter_map(|shape| shape.sphere_contact(pos, radius)),
        );
    }

    /// Deepest contact of a point that went through the arena surface
    #[must_use]
    pub fn point_contact(&self, pos: Vec3A) -> Option<GeometryContact> {
        self.shapes
            .iter()
            .filter_map(|shape| shape.point_contact(pos))
            .min_by(|a, b| a.distance.total_cmp(&b.distance))
    }

    /// Closest hit along the segment `from -> to`
    #[must_use]
    pub fn ray_cast(&self, from: Vec3A, to: Vec3A) -> Option<RayHit> {
        self.shapes
            .iter()
            .filter_map(|shape| shape.ray_cast(from, to))
            .min_by(|a, b| a.fraction.total_cmp(&b.fraction))
    }

    fn add_floor_ceiling_walls(
        shapes: &mut Vec<StaticShape>,
        extent_x: f32,
        extent_y: f32,
        height: f32,
        floor_extent_y: f32,
    ) {
        shapes.push(StaticShape::quad(
            Vec3A::ZERO,
            Vec3A::Z,
            Vec3A::X,
            extent_x,
            floor_extent_y,
        ));

        shapes.push(StaticShape::quad(
            Vec3A::new(0.0, 0.0, height),
            Vec3A::NEG_Z,
            Vec3A::X,
            extent_x,
            extent_y,
        ));

        for sx in [-1.0, 1.0] {
            shapes.push(StaticShape::quad(
                Vec3A::new(sx * extent_x, 0.0, height / 2.0),
                Vec3A::new(-sx, 0.0, 0.0),
                Vec3A::Z,
                height / 2.0,
                extent_y,
            ));
        }
    }

    fn soccar_shapes() -> Vec<StaticShape> {
        const EX: f32 = ARENA_EXTENT_X;
        const EY: f32 = ARENA_EXTENT_Y;
        const H: f32 = ARENA_HEIGHT;
        const R: f32 = FILLET_RADIUS;
        const C: f32 = CORNER_CUT;
        const GW: f32 = SOCCAR_GOAL_HALF_WIDTH;
        const GH: f32 = SOCCAR_GOAL_HEIGHT;
        const GD: f32 = SOCCAR_GOAL_DEPTH;

        let mut shapes = Vec::new();
        Self::add_floor_ceiling_walls(&mut shapes, EX, EY, H, EY + GD);

        for sx in [-1.0, 1.0] {
            let out = Vec3A::new(sx, 0.0, 0.0);
            shapes.push(StaticShape::fillet(
                Vec3A::new(sx * (EX - R), 0.0, R),
                Vec3A::Y,
                EY - C,
                Vec3A::NEG_Z,
                out,
            ));
            shapes.push(StaticShape::fillet(
                Vec3A::new(sx * (EX - R), 0.0, H - R),
                Vec3A::Y,
                EY - C,
                Vec3A::Z,
                out,
            ));
        }

        for sy in [-1.0, 1.0] {
            let inward = Vec3A::new(0.0, -sy, 0.0);
            let out = -inward;

            // Back wall beside and above the goal
            for sx in [-1.0, 1.0] {
                shapes.push(StaticShape::quad(
                    Vec3A::new(sx * (GW + EX) / 2.0, sy * EY, H / 2.0),
                    inward,
                    Vec3A::X,
                    (EX - GW) / 2.0,
                    H / 2.0,
                ));

                shapes.push(StaticShape::fillet(
                    Vec3A::new(sx * (GW + EX - C) / 2.0, sy * (EY - R), R),
                    Vec3A::X,
                    (EX - C - GW) / 2.0,
                    Vec3A::NEG_Z,
                    out,
                ));
            }

            shapes.push(StaticShape::quad(
                Vec3A::new(0.0, sy * EY, (GH + H) / 2.0),
                inward,
                Vec3A::X,
                GW,
                (H - GH) / 2.0,
            ));

            shapes.push(StaticShape::fillet(
                Vec3A::new(0.0, sy * (EY - R), H - R),
                Vec3A::X,
                EX - C,
                Vec3A::Z,
                out,
            ));

            // Goal box
            shapes.push(StaticShape::quad(
                Vec3A::new(0.0, sy * (EY + GD), GH / 2.0),
                inward,
                Vec3A::X,
                GW,
                GH / 2.0,
            ));

            for sx in [-1.0, 1.0] {
                shapes.push(StaticShape::quad(
                    Vec3A::new(sx * GW, sy * (EY + GD / 2.0), GH / 2.0),
                    Vec3A::new(-sx, 0.0, 0.0),
                    Vec3A::Z,
                    GH / 2.0,
                    GD / 2.0,
                ));
            }

            shapes.push(StaticShape::quad(
                Vec3A::new(0.0, sy * (EY + GD / 2.0), GH),
                Vec3A::NEG_Z,
                Vec3A::X,
                GW,
                GD / 2.0,
            ));

            // 45 degree corners
            for sx in [-1.0, 1.0] {
                let normal = Vec3A::new(-sx, -sy, 0.0) * FRAC_1_SQRT_2;
                let along = Vec3A::new(sx, -sy, 0.0) * FRAC_1_SQRT_2;
                let wall_center = Vec3A::new(sx * (EX - C / 2.0), sy * (EY - C / 2.0), H / 2.0);
                let half_len = C * FRAC_1_SQRT_2;

                shapes.push(StaticShape::quad(
                    wall_center,
                    normal,
                    Vec3A::Z,
                    H / 2.0,
                    half_len,
                ));

                for (z, toward_surface) in [(R, Vec3A::NEG_Z), (H - R, Vec3A::Z)] {
                    shapes.push(StaticShape::fillet(
                        wall_center.with_z(z) + normal * R,
                        along,
                        half_len,
                        toward_surface,
                        -normal,
                    ));
                }
            }
        }

        shapes
    }

    fn hoops_shapes() -> Vec<StaticShape> {
        const EX: f32 = ARENA_EXTENT_X_HOOPS;
        const EY: f32 = ARENA_EXTENT_Y_HOOPS;
        const H: f32 = ARENA_HEIGHT_HOOPS;
        const R: f32 = FILLET_RADIUS;

        let mut shapes = Vec::new();
        Self::add_floor_ceiling_walls(&mut shapes, EX, EY, H, EY);

        for sy in [-1.0, 1.0] {
            shapes.push(StaticShape::quad(
                Vec3A::new(0.0, sy * EY, H / 2.0),
                Vec3A::new(0.0, -sy, 0.0),
                Vec3A::X,
                EX,
                H / 2.0,
            ));

            shapes.push(StaticShape::fillet(
                Vec3A::new(0.0, sy * (EY - R), R),
                Vec3A::X,
                EX - R,
                Vec3A::NEG_Z,
                Vec3A::new(0.0, sy, 0.0),
            ));
        }

        for sx in [-1.0, 1.0] {
            shapes.push(StaticShape::fillet(
                Vec3A::new(sx * (EX - R), 0.0, R),
                Vec3A::Y,
                EY - R,
                Vec3A::NEG_Z,
                Vec3A::new(sx, 0.0, 0.0),
            ));
        }

        shapes
    }
}
