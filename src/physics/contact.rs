use super::{rigid_body::RigidBody, transform_util::plane_space};
use glam::Vec3A;

pub struct ContactSolverInfo;

impl ContactSolverInfo {
    pub const NUM_ITERATIONS: usize = 10;
    pub const SOR: f32 = 1.0;
    pub const ERP: f32 = 0.2;
    pub const ERP_2: f32 = 0.8;
    pub const SPLIT_IMPULSE_TURN_ERP: f32 = 0.1;
    pub const RESTITUTION_VELOCITY_THRESHOLD: f32 = 0.2;
}

/// A single contact between a dynamic body `a` and either another body or the static arena.
#[derive(Clone, Copy, Debug)]
pub struct ContactPoint {
    pub body_a: usize,
    /// `None` is the static arena geometry
    pub body_b: Option<usize>,
    pub position_world_on_b: Vec3A,
    /// Points from `b` towards `a`
    pub normal_world_on_b: Vec3A,
    /// Negative while penetrating
    pub distance: f32,
    pub local_point_a: Vec3A,
    pub local_point_b: Vec3A,
    pub combined_friction: f32,
    pub combined_restitution: f32,
    /// Merged with the other special contacts of the same body into one averaged contact
    pub is_special: bool,
}

impl ContactPoint {
    #[must_use]
    pub fn position_world_on_a(&self) -> Vec3A {
        self.position_world_on_b + self.normal_world_on_b * self.distance
    }
}

fn rel_pos(body: Option<&RigidBody>, pos: Vec3A) -> Vec3A {
    body.map_or(Vec3A::ZERO, |rb| pos - rb.get_world_transform().translation)
}

fn velocity_at(body: Option<&RigidBody>, rel_pos: Vec3A) -> Vec3A {
    body.map_or(Vec3A::ZERO, |rb| rb.get_velocity_in_local_point(rel_pos))
}

fn impulse_denominator(body: Option<&RigidBody>, pos: Vec3A, normal: Vec3A) -> f32 {
    body.map_or(0.0, |rb| rb.compute_impulse_denominator(pos, normal))
}

/// Impulse that would stop the bodies from approaching along `normal` and push out `distance`
#[must_use]
pub fn resolve_single_collision(
    body1: &RigidBody,
    body2: Option<&RigidBody>,
    contact_position_world: Vec3A,
    contact_normal_on_b: Vec3A,
    time_step: f32,
    distance: f32,
) -> f32 {
    let rel_pos1 = rel_pos(Some(body1), contact_position_world);
    let rel_pos2 = rel_pos(body2, contact_position_world);

    let vel = body1.get_velocity_in_local_point(rel_pos1) - velocity_at(body2, rel_pos2);
    let rel_vel = contact_normal_on_b.dot(vel);

    let positional_error = ContactSolverInfo::ERP * -distance / time_step;
    let velocity_error = -rel_vel;
    let denom0 = body1.compute_impulse_denominator(contact_position_world, contact_normal_on_b);
    let denom1 = impulse_denominator(body2, contact_position_world, contact_normal_on_b);
    let jac_diag_ab_inv = 1.0 / (denom0 + denom1);

    let normal_impulse = (positional_error + velocity_error) * jac_diag_ab_inv;
    normal_impulse.max(0.0)
}

#[must_use]
pub fn resolve_single_bilateral(
    body1: &RigidBody,
    body2: Option<&RigidBody>,
    pos: Vec3A,
    normal: Vec3A,
) -> f32 {
    const CONTACT_DAMPING: f32 = -0.2;

    let rel_pos1 = rel_pos(Some(body1), pos);
    let rel_pos2 = rel_pos(body2, pos);

    let vel = body1.get_velocity_in_local_point(rel_pos1) - velocity_at(body2, rel_pos2);
    let jac_diag = body1.compute_impulse_denominator(pos, normal)
        + impulse_denominator(body2, pos, normal);
    if jac_diag <= f32::EPSILON {
        return 0.0;
    }

    CONTACT_DAMPING * normal.dot(vel) / jac_diag
}

#[must_use]
pub fn restitution_curve(rel_vel: f32, restitution: f32) -> f32 {
    if rel_vel.abs() < ContactSolverInfo::RESTITUTION_VELOCITY_THRESHOLD {
        0.0
    } else {
        restitution * -rel_vel
    }
}

#[derive(Clone, Copy, Default)]
struct SolverBody {
    inv_mass: f32,
    delta_linear_velocity: Vec3A,
    delta_angular_velocity: Vec3A,
    push_velocity: Vec3A,
    turn_velocity: Vec3A,
}

#[derive(Clone, Copy, Default)]
struct ConstraintSide {
    normal: Vec3A,
    rel_pos_cross_normal: Vec3A,
    angular_component: Vec3A,
}

#[derive(Clone, Copy, Default)]
struct SolverConstraint {
    body_a: usize,
    body_b: usize,
    side_a: ConstraintSide,
    side_b: ConstraintSide,
    jac_diag_ab_inv: f32,
    rhs: f32,
    rhs_penetration: f32,
    applied_impulse: f32,
    applied_push_impulse: f32,
    friction: f32,
    friction_index: usize,
}

impl SolverConstraint {
    fn build(
        bodies: &[RigidBody],
        (idx_a, idx_b): (usize, Option<usize>),
        (rel_pos1, rel_pos2): (Vec3A, Vec3A),
        normal: Vec3A,
        fixed_id: usize,
    ) -> Self {
        let body_a = &bodies[idx_a];
        let torque_axis_a = rel_pos1.cross(normal);
        let angular_a = body_a.inv_inertia_tensor_world * torque_axis_a;
        let mut denom = body_a.inverse_mass + normal.dot(angular_a.cross(rel_pos1));

        let side_b = if let Some(idx_b) = idx_b {
            let body_b = &bodies[idx_b];
            let torque_axis_b = rel_pos2.cross(-normal);
            let angular_b = body_b.inv_inertia_tensor_world * torque_axis_b;
            denom += body_b.inverse_mass + (-normal).dot(angular_b.cross(rel_pos2));

            ConstraintSide {
                normal: -normal,
                rel_pos_cross_normal: torque_axis_b,
                angular_component: angular_b,
            }
        } else {
            ConstraintSide::default()
        };

        Self {
            body_a: idx_a,
            body_b: idx_b.unwrap_or(fixed_id),
            side_a: ConstraintSide {
                normal,
                rel_pos_cross_normal: torque_axis_a,
                angular_component: angular_a,
            },
            side_b,
            jac_diag_ab_inv: ContactSolverInfo::SOR / denom,
            ..Default::default()
        }
    }

    fn delta_vel_dot_n(&self, body_a: &SolverBody, body_b: &SolverBody) -> f32 {
        self.side_a.normal.dot(body_a.delta_linear_velocity)
            + self.side_a.rel_pos_cross_normal.dot(body_a.delta_angular_velocity)
            + self.side_b.normal.dot(body_b.delta_linear_velocity)
            + self.side_b.rel_pos_cross_normal.dot(body_b.delta_angular_velocity)
    }

    fn apply_delta(&self, body_a: &mut SolverBody, body_b: &mut SolverBody, delta_impulse: f32) {
        body_a.delta_linear_velocity += self.side_a.normal * body_a.inv_mass * delta_impulse;
        body_a.delta_angular_velocity += self.side_a.angular_component * delta_impulse;
        body_b.delta_linear_velocity += self.side_b.normal * body_b.inv_mass * delta_impulse;
        body_b.delta_angular_velocity += self.side_b.angular_component * delta_impulse;
    }

    fn resolve_row(
        &mut self,
        body_a: &mut SolverBody,
        body_b: &mut SolverBody,
        (lower_limit, upper_limit): (f32, f32),
    ) -> f32 {
        let mut delta_impulse =
            self.rhs - self.delta_vel_dot_n(body_a, body_b) * self.jac_diag_ab_inv;

        let sum = self.applied_impulse + delta_impulse;
        if sum < lower_limit {
            delta_impulse = lower_limit - self.applied_impulse;
            self.applied_impulse = lower_limit;
        } else if sum > upper_limit {
            delta_impulse = upper_limit - self.applied_impulse;
            self.applied_impulse = upper_limit;
        } else {
            self.applied_impulse = sum;
        }

        self.apply_delta(body_a, body_b, delta_impulse);
        delta_impulse / self.jac_diag_ab_inv
    }

    fn resolve_split_penetration(&mut self, body_a: &mut SolverBody, body_b: &mut SolverBody) -> f32 {
        if self.rhs_penetration == 0.0 {
            return 0.0;
        }

        let delta_vel_dot_n = self.side_a.normal.dot(body_a.push_velocity)
            + self.side_a.rel_pos_cross_normal.dot(body_a.turn_velocity)
            + self.side_b.normal.dot(body_b.push_velocity)
            + self.side_b.rel_pos_cross_normal.dot(body_b.turn_velocity);

        let mut delta_impulse = self.rhs_penetration - delta_vel_dot_n * self.jac_diag_ab_inv;
        let sum = self.applied_push_impulse + delta_impulse;
        if sum < 0.0 {
            delta_impulse = -self.applied_push_impulse;
            self.applied_push_impulse = 0.0;
        } else {
            self.applied_push_impulse = sum;
        }

        body_a.push_velocity += self.side_a.normal * body_a.inv_mass * delta_impulse;
        body_a.turn_velocity += self.side_a.angular_component * delta_impulse;
        body_b.push_velocity += self.side_b.normal * body_b.inv_mass * delta_impulse;
        body_b.turn_velocity += self.side_b.angular_component * delta_impulse;

        delta_impulse / self.jac_diag_ab_inv
    }
}

#[derive(Default)]
struct SpecialResolveInfo {
    num_collisions: u16,
    total_normal: Vec3A,
    total_dist: f32,
    total_rel_len: f32,
    friction: f32,
    restitution: f32,
}

/// Sequential impulse solver with split impulse position correction.
#[derive(Default)]
pub struct SequentialImpulseSolver {
    solver_bodies: Vec<SolverBody>,
    contacts: Vec<SolverConstraint>,
    frictions: Vec<SolverConstraint>,
    special: Vec<(usize, SpecialResolveInfo)>,
}

impl SequentialImpulseSolver {
    pub fn solve(&mut self, bodies: &mut [RigidBody], points: &[ContactPoint], time_step: f32) {
        if points.is_empty() {
            return;
        }

        self.setup(bodies, points, time_step);
        self.iterate();
        self.finish(bodies);
    }

    fn setup(&mut self, bodies: &[RigidBody], points: &[ContactPoint], time_step: f32) {
        self.solver_bodies.clear();
        self.solver_bodies
            .extend(bodies.iter().map(|rb| SolverBody {
                inv_mass: rb.inverse_mass,
                ..Default::default()
            }));
        // Stands in for the static world
        self.solver_bodies.push(SolverBody::default());

        for cp in points {
            if cp.is_special && cp.body_b.is_none() {
                let rel_len = rel_pos(Some(&bodies[cp.body_a]), cp.position_world_on_a()).length();
                let slot = match self.special.iter().position(|(idx, _)| *idx == cp.body_a) {
                    Some(slot) => slot,
                    None => {
                        self.special.push((cp.body_a, SpecialResolveInfo::default()));
                        self.special.len() - 1
                    }
                };
                let info = &mut self.special[slot].1;

                info.num_collisions += 1;
                info.total_normal += cp.normal_world_on_b;
                info.total_dist += cp.distance;
                info.total_rel_len += rel_len;
                info.friction = cp.combined_friction;
                info.restitution = cp.combined_restitution;
                continue;
            }

            let body_a = &bodies[cp.body_a];
            let body_b = cp.body_b.map(|idx| &bodies[idx]);
            let rel_pos1 = rel_pos(Some(body_a), cp.position_world_on_a());
            let rel_pos2 = rel_pos(body_b, cp.position_world_on_b);

            self.add_contact(
                bodies,
                (cp.body_a, cp.body_b),
                (rel_pos1, rel_pos2),
                cp.normal_world_on_b,
                cp.distance,
                (cp.combined_friction, cp.combined_restitution),
                time_step,
            );
        }

        for (body_idx, info) in std::mem::take(&mut self.special) {
            let num = f32::from(info.num_collisions);
            let Some(normal) = info.total_normal.try_normalize() else {
                continue;
            };

            let rel_pos1 = normal * -(info.total_rel_len / num);
            self.add_contact(
                bodies,
                (body_idx, None),
                (rel_pos1, Vec3A::ZERO),
                normal,
                info.total_dist / num,
                (info.friction, info.restitution),
                time_step,
            );
        }
    }

    #[allow(clippy::too_many_arguments)]
    fn add_contact(
        &mut self,
        bodies: &[RigidBody],
        indices: (usize, Option<usize>),
        rel_positions: (Vec3A, Vec3A),
        normal: Vec3A,
        distance: f32,
        (friction, restitution): (f32, f32),
        time_step: f32,
    ) {
        let fixed_id = bodies.len();
        let (rel_pos1, rel_pos2) = rel_positions;
        let body_a = &bodies[indices.0];
        let body_b = indices.1.map(|idx| &bodies[idx]);

        let vel = body_a.get_velocity_in_local_point(rel_pos1) - velocity_at(body_b, rel_pos2);
        let rel_vel = normal.dot(vel);

        let mut constraint =
            SolverConstraint::build(bodies, indices, rel_positions, normal, fixed_id);

        let restitution = restitution_curve(rel_vel, restitution).max(0.0);
        let positional_error = if distance > 0.0 {
            0.0
        } else {
            -distance * ContactSolverInfo::ERP_2 / time_step
        };

        constraint.rhs = (restitution - rel_vel) * constraint.jac_diag_ab_inv;
        constraint.rhs_penetration = positional_error * constraint.jac_diag_ab_inv;
        constraint.friction = friction;

        let friction_index = self.contacts.len();
        self.contacts.push(constraint);

        let mut lat_dir = vel - normal * rel_vel;
        let lat_rel_vel = lat_dir.length_squared();
        if lat_rel_vel > f32::EPSILON {
            lat_dir *= 1.0 / lat_rel_vel.sqrt();
        } else {
            lat_dir = plane_space(normal).0;
        }

        let mut friction_constraint =
            SolverConstraint::build(bodies, indices, rel_positions, lat_dir, fixed_id);
        friction_constraint.rhs = -lat_dir.dot(vel) * friction_constraint.jac_diag_ab_inv;
        friction_constraint.friction = friction;
        friction_constraint.friction_index = friction_index;
        self.frictions.push(friction_constraint);
    }

    fn body_pair(&mut self, a: usize, b: usize) -> (&mut SolverBody, &mut SolverBody) {
        debug_assert_ne!(a, b);
        if a < b {
            let (lo, hi) = self.solver_bodies.split_at_mut(b);
            (&mut lo[a], &mut hi[0])
        } else {
            let (lo, hi) = self.solver_bodies.split_at_mut(a);
            (&mut hi[0], &mut lo[b])
        }
    }

    fn iterate(&mut self) {
        for _ in 0..ContactSolverInfo::NUM_ITERATIONS {
            let mut residual = 0.0f32;
            for i in 0..self.contacts.len() {
                let mut contact = self.contacts[i];
                let (body_a, body_b) = self.body_pair(contact.body_a, contact.body_b);
                let delta = contact.resolve_split_penetration(body_a, body_b);
                residual = residual.max(delta * delta);
                self.contacts[i] = contact;
            }

            if residual == 0.0 {
                break;
            }
        }

        for _ in 0..ContactSolverInfo::NUM_ITERATIONS {
            let mut residual = 0.0f32;

            for i in 0..self.contacts.len() {
                let mut contact = self.contacts[i];
                let (body_a, body_b) = self.body_pair(contact.body_a, contact.body_b);
                let delta = contact.resolve_row(body_a, body_b, (0.0, f32::MAX));
                residual = residual.max(delta * delta);
                self.contacts[i] = contact;
            }

            for i in 0..self.frictions.len() {
                let mut friction = self.frictions[i];
                let total_impulse = self.contacts[friction.friction_index].applied_impulse;
                if total_impulse <= 0.0 {
                    continue;
                }

                let limit = friction.friction * total_impulse;
                let (body_a, body_b) = self.body_pair(friction.body_a, friction.body_b);
                let delta = friction.resolve_row(body_a, body_b, (-limit, limit));
                residual = residual.max(delta * delta);
                self.frictions[i] = friction;
            }

            if residual == 0.0 {
                break;
            }
        }
    }

    fn finish(&mut self, bodies: &mut [RigidBody]) {
        for (rb, solver) in bodies.iter_mut().zip(&self.solver_bodies) {
            if rb.inverse_mass == 0.0 {
                continue;
            }

            rb.linear_velocity += solver.delta_linear_velocity;
            rb.angular_velocity += solver.delta_angular_velocity;
            rb.push_velocity += solver.push_velocity;
            rb.turn_velocity += solver.turn_velocity * ContactSolverInfo::SPLIT_IMPULSE_TURN_ERP;
        }

        self.solver_bodies.clear();
        self.contacts.clear();
        self.frictions.clear();
    }
}
