//! Orbital kinematics engine.
//!
//! Every live body carries a `BodyPose` (orbit angle, de-rotation angle, spin angle). Each tick
//! the poses advance by `rate * time_step` and the world frames are recomputed top-down from the
//! immutable descriptors, so no transform state survives between ticks except the poses.
//!
//! Frame chain for an orbiting body, outermost first:
//! 1. parent anchor
//! 2. inclination: rotate about Z by the orbital inclination
//! 3. orbit: rotate about Y by the orbit angle
//! 4. anchor: translate by the orbit radius along X, rotate about Y by the de-rotation angle and
//!    about Z by the negated inclination (satellites hang off this frame)
//! 5. body: rotate about Z by inclination + axial tilt, then about Y by the spin angle

use std::collections::HashMap;
use std::f32::consts::PI;
use std::f32::consts::TAU;
use std::sync::Arc;

use bevy::prelude::*;
use rand::Rng;

use crate::body::BodyError;
use crate::body::BodyNode;
use crate::body::validate_tree;

/// Mutable per-body animation state.
#[derive(Debug, Clone, Copy, PartialEq, Default, Reflect)]
pub struct BodyPose {
    /// Accumulated position along the orbit.
    pub orbit_angle:      f32,
    /// Counter-rotation that keeps the anchor frame fixed relative to the parent.
    pub derotation_angle: f32,
    /// Accumulated rotation about the body's own axis.
    pub spin_angle:       f32,
    /// Random starting offset along the orbit, in `[0, TAU)`.
    pub phase:            f32,
}

impl BodyPose {
    /// Initial pose for a body placed `phase` radians along its orbit.
    ///
    /// The phase enters the orbit and de-rotation angles with opposite signs so the anchor frame
    /// stays unrotated. Tidally locked bodies also turn by `phase + PI` so the same face points
    /// at the primary.
    pub fn new(phase: f32, tidally_locked: bool) -> Self {
        let spin_angle = if tidally_locked { phase + PI } else { 0.0 };
        Self {
            orbit_angle: phase,
            derotation_angle: -phase,
            spin_angle,
            phase,
        }
    }

    pub fn advance(&mut self, orbital_rate: f32, spin_rate: f32, time_step: f32) {
        let orbit_delta = orbital_rate * time_step;
        self.orbit_angle += orbit_delta;
        self.derotation_angle -= orbit_delta;
        self.spin_angle += spin_rate * time_step;
    }
}

/// Index of a body inside an `OrbitalSystem`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Reflect)]
pub struct BodyIndex(pub usize);

/// One body of the live scene: its descriptor, its pose and the frames derived from them.
#[derive(Debug, Clone)]
pub struct LiveBody {
    pub node:        Arc<BodyNode>,
    pub parent:      Option<BodyIndex>,
    pub pose:        BodyPose,
    orbit_plane:     Option<Transform>,
    anchor:          Transform,
    previous_anchor: Transform,
    body:            Transform,
}

impl LiveBody {
    pub fn name(&self) -> &str { &self.node.name }

    /// World position of the body's center after the latest tick.
    pub const fn world_position(&self) -> Vec3 { self.anchor.translation }

    /// World position of the body's center before the latest tick.
    pub const fn previous_world_position(&self) -> Vec3 { self.previous_anchor.translation }

    /// Frame the satellites of this body orbit in. Its rotation matches the parent anchor.
    pub const fn anchor(&self) -> Transform { self.anchor }

    /// Fully posed frame of the body's mesh, including tilt and spin.
    pub const fn body_transform(&self) -> Transform { self.body }

    /// Frame of the orbital plane (XZ plane), centered on the parent. `None` for the root.
    pub const fn orbit_plane(&self) -> Option<Transform> { self.orbit_plane }
}

/// The live body tree, flattened parent-first.
#[derive(Resource, Debug, Clone)]
pub struct OrbitalSystem {
    root:   Arc<BodyNode>,
    bodies: Vec<LiveBody>,
    lookup: HashMap<String, BodyIndex>,
}

impl OrbitalSystem {
    /// Validates `root` and instantiates every body with a random orbital phase.
    pub fn new(root: Arc<BodyNode>, rng: &mut impl Rng) -> Result<Self, BodyError> {
        Self::with_poses(root, rng, &HashMap::new())
    }

    fn with_poses(
        root: Arc<BodyNode>,
        rng: &mut impl Rng,
        poses: &HashMap<String, BodyPose>,
    ) -> Result<Self, BodyError> {
        validate_tree(&root)?;

        let mut bodies = Vec::with_capacity(root.body_count());
        flatten(&root, None, &mut bodies, rng, poses);

        let lookup = bodies
            .iter()
            .enumerate()
            .map(|(index, body)| (body.node.name.clone(), BodyIndex(index)))
            .collect();

        let mut system = Self {
            root,
            bodies,
            lookup,
        };
        system.recompute_frames();
        for body in &mut system.bodies {
            body.previous_anchor = body.anchor;
        }
        Ok(system)
    }

    /// Swaps in a new descriptor tree, keeping the pose of every body whose name survives.
    pub fn rebuild(&mut self, root: Arc<BodyNode>, rng: &mut impl Rng) -> Result<(), BodyError> {
        let poses: HashMap<String, BodyPose> = self
            .bodies
            .iter()
            .map(|body| (body.node.name.clone(), body.pose))
            .collect();
        *self = Self::with_poses(root, rng, &poses)?;
        Ok(())
    }

    pub const fn root(&self) -> &Arc<BodyNode> { &self.root }

    pub const fn len(&self) -> usize { self.bodies.len() }

    pub const fn is_empty(&self) -> bool { self.bodies.is_empty() }

    pub fn iter(&self) -> impl Iterator<Item = (BodyIndex, &LiveBody)> {
        self.bodies
            .iter()
            .enumerate()
            .map(|(index, body)| (BodyIndex(index), body))
    }

    pub fn get(&self, index: BodyIndex) -> Option<&LiveBody> { self.bodies.get(index.0) }

    pub fn index_of(&self, name: &str) -> Option<BodyIndex> { self.lookup.get(name).copied() }

    pub fn body(&self, name: &str) -> Option<&LiveBody> {
        self.index_of(name).and_then(|index| self.get(index))
    }

    /// The body flagged as the scene's light source, if any.
    pub fn light_source(&self) -> Option<&LiveBody> { self.bodies.iter().find(|body| body.node.is_light) }

    /// Advances every pose by one tick and recomputes all frames.
    ///
    /// When `moving` is false no pose changes at all, regardless of `time_step`.
    pub fn advance(&mut self, time_step: f32, moving: bool) {
        for body in &mut self.bodies {
            body.previous_anchor = body.anchor;
            if moving {
                let orbital_rate = body.node.orbit.as_ref().map_or(0.0, |orbit| orbit.angular_rate);
                body.pose.advance(orbital_rate, body.node.spin_rate, time_step);
            }
        }
        self.recompute_frames();
    }

    fn recompute_frames(&mut self) {
        // Parents precede their satellites, so each parent anchor is already current.
        for index in 0..self.bodies.len() {
            let parent_anchor = self.bodies[index]
                .parent
                .map_or(Transform::IDENTITY, |parent| self.bodies[parent.0].anchor);
            let body = &mut self.bodies[index];
            let (orbit_plane, anchor, body_frame) = compose_frames(&body.node, &body.pose, parent_anchor);
            body.orbit_plane = orbit_plane;
            body.anchor = anchor;
            body.body = body_frame;
        }
    }
}

fn flatten(
    node: &Arc<BodyNode>,
    parent: Option<BodyIndex>,
    bodies: &mut Vec<LiveBody>,
    rng: &mut impl Rng,
    poses: &HashMap<String, BodyPose>,
) {
    let pose = poses.get(&node.name).copied().unwrap_or_else(|| {
        let phase = if node.orbit.is_some() { rng.gen_range(0.0..TAU) } else { 0.0 };
        BodyPose::new(phase, node.tidally_locked)
    });

    let index = BodyIndex(bodies.len());
    bodies.push(LiveBody {
        node: Arc::clone(node),
        parent,
        pose,
        orbit_plane: None,
        anchor: Transform::IDENTITY,
        previous_anchor: Transform::IDENTITY,
        body: Transform::IDENTITY,
    });

    for satellite in &node.satellites {
        flatten(satellite, Some(index), bodies, rng, poses);
    }
}

/// Builds the orbit-plane, anchor and body frames of `node` below `parent_anchor`.
fn compose_frames(
    node: &BodyNode,
    pose: &BodyPose,
    parent_anchor: Transform,
) -> (Option<Transform>, Transform, Transform) {
    let (orbit_plane, anchor, inclination) = match &node.orbit {
        Some(orbit) => {
            let plane = parent_anchor
                .mul_transform(Transform::from_rotation(Quat::from_rotation_z(orbit.inclination)));
            let anchor = plane
                .mul_transform(Transform::from_rotation(Quat::from_rotation_y(pose.orbit_angle)))
                .mul_transform(
                    Transform::from_xyz(orbit.radius, 0.0, 0.0).with_rotation(
                        Quat::from_rotation_y(pose.derotation_angle)
                            * Quat::from_rotation_z(-orbit.inclination),
                    ),
                );
            (Some(plane), anchor, orbit.inclination)
        },
        None => (None, parent_anchor, 0.0),
    };

    let body = anchor.mul_transform(Transform::from_rotation(
        Quat::from_rotation_z(inclination + node.axial_tilt) * Quat::from_rotation_y(pose.spin_angle),
    ));

    (orbit_plane, anchor, body)
}
