use super::{
    contact::{ContactPoint, SequentialImpulseSolver},
    geometry::{ArenaGeometry, GeometryContact},
    obb::Obb,
    rigid_body::{BodyShape, RigidBody},
};
use crate::{GameMode, consts::MAX_ANG_VEL_PER_TICK, consts::arena::BASE_COEFS};
use glam::Vec3A;

/// Gets a chance to inspect and change every contact before it is solved
pub trait ContactAddedCallback {
    fn callback(&mut self, contact: &mut ContactPoint, body_a: &RigidBody, body_b: Option<&RigidBody>);
}

/// Dynamic bodies plus the static arena they collide with
#[derive(Clone, Debug)]
pub struct PhysicsWorld {
    bodies: Vec<RigidBody>,
    geometry: ArenaGeometry,
    gravity: Vec3A,
    contacts: Vec<ContactPoint>,
    geometry_contacts: Vec<GeometryContact>,
}

impl PhysicsWorld {
    #[must_use]
    pub fn new(game_mode: GameMode, gravity: Vec3A) -> Self {
        Self {
            bodies: Vec::new(),
            geometry: ArenaGeometry::new(game_mode),
            gravity,
            contacts: Vec::new(),
            geometry_contacts: Vec::new(),
        }
    }

    #[must_use]
    pub fn bodies(&self) -> &[RigidBody] {
        &self.bodies
    }

    #[must_use]
    pub fn bodies_mut(&mut self) -> &mut [RigidBody] {
        &mut self.bodies
    }

    #[must_use]
    pub const fn geometry(&self) -> &ArenaGeometry {
        &self.geometry
    }

    /// Mutable bodies alongside the static geometry they are traced against
    #[must_use]
    pub fn bodies_and_geometry_mut(&mut self) -> (&mut [RigidBody], &ArenaGeometry) {
        (&mut self.bodies, &self.geometry)
    }

    #[must_use]
    pub const fn get_gravity(&self) -> Vec3A {
        self.gravity
    }

    pub fn set_gravity(&mut self, gravity: Vec3A) {
        self.gravity = gravity;
        for rb in &mut self.bodies {
            rb.set_gravity(gravity);
        }
    }

    pub fn add_rigid_body(&mut self, mut body: RigidBody) -> usize {
        body.set_gravity(self.gravity);
        self.bodies.push(body);
        self.bodies.len() - 1
    }

    /// Contacts found during the last step, after the callback adjusted them
    #[must_use]
    pub fn contacts(&self) -> &[ContactPoint] {
        &self.contacts
    }

    pub fn step_simulation<C: ContactAddedCallback>(&mut self, time_step: f32, callback: &mut C) {
        for rb in self.bodies.iter_mut().filter(|rb| rb.enabled) {
            rb.apply_gravity();
            rb.integrate_velocities(time_step, MAX_ANG_VEL_PER_TICK);
            rb.apply_damping(time_step);
        }

        self.find_contacts();

        for contact in &mut self.contacts {
            let body_a = &self.bodies[contact.body_a];
            let body_b = contact.body_b.map(|idx| &self.bodies[idx]);
            callback.callback(contact, body_a, body_b);
        }

        let mut solver = SequentialImpulseSolver::default();
        solver.solve(&mut self.bodies, &self.contacts, time_step);

        for rb in &mut self.bodies {
            if rb.enabled {
                rb.integrate_transform(time_step);
            }
            rb.clear_forces();
        }
    }

    fn find_contacts(&mut self) {
        self.contacts.clear();

        for idx in 0..self.bodies.len() {
            if !self.bodies[idx].enabled || self.bodies[idx].inverse_mass == 0.0 {
                continue;
            }

            match self.bodies[idx].shape {
                BodyShape::Sphere { radius } => self.sphere_world_contacts(idx, radius),
                BodyShape::Box { .. } => self.box_world_contacts(idx),
            }

            for other in idx + 1..self.bodies.len() {
                if self.bodies[other].enabled {
                    self.body_pair_contacts(idx, other);
                }
            }
        }
    }

    fn make_contact(
        &self,
        (body_a, body_b): (usize, Option<usize>),
        position_world_on_b: Vec3A,
        normal_world_on_b: Vec3A,
        distance: f32,
    ) -> ContactPoint {
        let rb_a = &self.bodies[body_a];
        let position_world_on_a = position_world_on_b + normal_world_on_b * distance;

        let (local_point_b, friction_b, restitution_b) = match body_b {
            Some(idx) => {
                let rb_b = &self.bodies[idx];
                (
                    rb_b.get_world_transform()
                        .inverse()
                        .transform_point3a(position_world_on_b),
                    rb_b.friction,
                    rb_b.restitution,
                )
            }
            None => (
                position_world_on_b,
                BASE_COEFS.friction,
                BASE_COEFS.restitution,
            ),
        };

        ContactPoint {
            body_a,
            body_b,
            position_world_on_b,
            normal_world_on_b,
            distance,
            local_point_a: rb_a
                .get_world_transform()
                .inverse()
                .transform_point3a(position_world_on_a),
            local_point_b,
            combined_friction: rb_a.friction * friction_b,
            combined_restitution: rb_a.restitution * restitution_b,
            is_special: false,
        }
    }

    fn sphere_world_contacts(&mut self, idx: usize, radius: f32) {
        let pos = self.bodies[idx].get_world_transform().translation;

        let mut found = std::mem::take(&mut self.geometry_contacts);
        found.clear();
        self.geometry.sphere_contacts(pos, radius, &mut found);

        for gc in &found {
            let contact = self.make_contact((idx, None), gc.point, gc.normal, gc.distance);
            self.contacts.push(contact);
        }

        self.geometry_contacts = found;
    }

    fn box_world_contacts(&mut self, idx: usize) {
        let Some(obb) = Obb::from_body(&self.bodies[idx]) else {
            return;
        };

        for point in obb.feature_points() {
            if let Some(gc) = self.geometry.point_contact(point) {
                let contact = self.make_contact((idx, None), gc.point, gc.normal, gc.distance);
                self.contacts.push(contact);
            }
        }
    }

    fn body_pair_contacts(&mut self, a: usize, b: usize) {
        match (self.bodies[a].shape, self.bodies[b].shape) {
            (BodyShape::Box { .. }, BodyShape::Sphere { radius }) => {
                self.box_sphere_contact(a, b, radius);
            }
            (BodyShape::Sphere { radius }, BodyShape::Box { .. }) => {
                self.box_sphere_contact(b, a, radius);
            }
            (BodyShape::Box { .. }, BodyShape::Box { .. }) => {
                self.box_box_contacts(a, b);
                self.box_box_contacts(b, a);
            }
            (BodyShape::Sphere { .. }, BodyShape::Sphere { .. }) => {}
        }
    }

    /// The box is always `body_a` of the resulting contact
    fn box_sphere_contact(&mut self, box_idx: usize, sphere_idx: usize, radius: f32) {
        let Some(obb) = Obb::from_body(&self.bodies[box_idx]) else {
            return;
        };

        let center = self.bodies[sphere_idx].get_world_transform().translation;
        let Some(hit) = obb.sphere_contact(center, radius, 0.0) else {
            return;
        };

        if hit.distance >= 0.0 {
            return;
        }

        let normal_on_sphere = -hit.normal;
        let contact = self.make_contact(
            (box_idx, Some(sphere_idx)),
            center + normal_on_sphere * radius,
            normal_on_sphere,
            hit.distance,
        );
        self.contacts.push(contact);
    }

    /// Feature points of box `a` that went inside box `b`
    fn box_box_contacts(&mut self, a: usize, b: usize) {
        let (Some(obb_a), Some(obb_b)) = (
            Obb::from_body(&self.bodies[a]),
            Obb::from_body(&self.bodies[b]),
        ) else {
            return;
        };

        let reach = obb_a.half_extents.length() + obb_b.half_extents.length();
        if obb_a.center.distance_squared(obb_b.center) > reach * reach {
            return;
        }

        for point in obb_a.feature_points() {
            if let Some(hit) = obb_b.point_penetration(point) {
                let contact = self.make_contact((a, Some(b)), hit.point, hit.normal, hit.distance);
                self.contacts.push(contact);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        consts::{GRAVITY_Z, UU_TO_BT},
        physics::rigid_body::RigidBodyConstructionInfo,
    };
    use glam::Affine3A;

    struct CountContacts(usize);

    impl ContactAddedCallback for CountContacts {
        fn callback(&mut self, _: &mut ContactPoint, _: &RigidBody, _: Option<&RigidBody>) {
            self.0 += 1;
        }
    }

    fn sphere_at(pos: Vec3A) -> RigidBody {
        let mut info = RigidBodyConstructionInfo::new(30.0, BodyShape::Sphere { radius: 1.825 });
        info.start_world_transform = Affine3A::from_translation(pos.into());
        info.restitution = 0.6;
        info.friction = 0.35;
        RigidBody::new(info)
    }

    #[test]
    fn dropped_sphere_comes_to_rest_on_the_floor() {
        let mut world = PhysicsWorld::new(GameMode::Soccar, Vec3A::new(0.0, 0.0, GRAVITY_Z * UU_TO_BT));
        world.add_rigid_body(sphere_at(Vec3A::new(0.0, 0.0, 4.0)));

        let mut counter = CountContacts(0);
        for _ in 0..(120 * 8) {
            world.step_simulation(1.0 / 120.0, &mut counter);
        }

        let rb = &world.bodies()[0];
        let z = rb.get_world_transform().translation.z;
        assert!(counter.0 > 0);
        assert!((z - 1.825).abs() < 0.05, "{z}");
        assert!(rb.linear_velocity.length() < 0.1);
    }

    #[test]
    fn free_fall_without_geometry() {
        let mut world = PhysicsWorld::new(GameMode::TheVoid, Vec3A::new(0.0, 0.0, -10.0));
        world.add_rigid_body(sphere_at(Vec3A::ZERO));

        let mut counter = CountContacts(0);
        for _ in 0..10 {
            world.step_simulation(0.1, &mut counter);
        }

        assert_eq!(counter.0, 0);
        assert!((world.bodies()[0].linear_velocity.z + 10.0).abs() < 1e-4);
    }

    #[test]
    fn box_touching_sphere_reports_box_first() {
        let mut world = PhysicsWorld::new(GameMode::TheVoid, Vec3A::ZERO);
        world.add_rigid_body(sphere_at(Vec3A::new(2.5, 0.0, 0.0)));

        let mut info = RigidBodyConstructionInfo::new(
            180.0,
            BodyShape::Box {
                half_extents: Vec3A::new(1.0, 1.0, 1.0),
                offset: Vec3A::ZERO,
            },
        );
        info.start_world_transform = Affine3A::IDENTITY;
        world.add_rigid_body(RigidBody::new(info));

        let mut counter = CountContacts(0);
        world.step_simulation(1.0 / 120.0, &mut counter);

        assert_eq!(counter.0, 1);
        let contact = world.contacts()[0];
        assert_eq!(contact.body_a, 1);
        assert_eq!(contact.body_b, Some(0));
        assert!(contact.normal_world_on_b.abs_diff_eq(Vec3A::NEG_X, 1e-5));
        // Resting overlap is resolved by position, not by velocity
        assert_eq!(world.bodies()[0].linear_velocity, Vec3A::ZERO);
        assert!(world.bodies()[0].get_world_transform().translation.x > 2.5);
    }
}
