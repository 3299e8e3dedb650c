//! Camera focus controller.
//!
//! Every frame the camera looks at the focused body's freshly advanced position. On the frame a
//! new focus is selected (or the scale changes) the camera snaps to a fixed offset from the body;
//! on every other frame it follows the body's displacement so the user's orbit and zoom survive
//! while the body moves through space.

use bevy::prelude::*;
use bevy_panorbit_camera::PanOrbitCamera;

use crate::components::OrreryCamera;
use crate::components::SunlightProxy;
use crate::events::FocusSnapped;
use crate::kinematics::OrbitalSystem;
use crate::settings::AppSettings;

/// Snap offset per unit of body radius, in world axes.
const SNAP_OFFSET: Vec3 = Vec3::new(-4.0, 1.25, 4.0);

/// What the controller did on a given frame.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FocusMode {
    Snap,
    Follow,
}

/// The camera as the focus controller sees it: a position, a look-at target and a zoom floor.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FocusRig {
    pub position:     Vec3,
    pub target:       Vec3,
    pub min_distance: f32,
}

impl FocusRig {
    /// Retargets the rig on `current_target`, a body of `radius`.
    ///
    /// `previous_target` is the body's position on the previous tick. `near` is the camera's
    /// near plane, kept clear of the body's surface after a snap.
    pub fn focus(
        &mut self,
        focusing: bool,
        previous_target: Vec3,
        current_target: Vec3,
        radius: f32,
        near: f32,
    ) -> FocusMode {
        self.target = current_target;

        if focusing {
            self.position = current_target + snap_offset(radius);
            self.min_distance = radius + near;
            FocusMode::Snap
        } else {
            self.position += current_target - previous_target;
            FocusMode::Follow
        }
    }

    /// Camera-to-target distance.
    pub fn distance(&self) -> f32 { self.position.distance(self.target) }
}

/// Camera offset from the center of a freshly focused body of `radius`.
pub fn snap_offset(radius: f32) -> Vec3 { SNAP_OFFSET * radius }

/// World-space camera position for orbital parameters around `focus`.
pub fn orbit_translation(focus: Vec3, yaw: f32, pitch: f32, radius: f32) -> Vec3 {
    let yaw_rot = Quat::from_axis_angle(Vec3::Y, yaw);
    let pitch_rot = Quat::from_axis_angle(Vec3::X, -pitch);
    focus + yaw_rot * pitch_rot * Vec3::new(0.0, 0.0, radius)
}

/// Decomposes a camera offset from its focus into `(yaw, pitch, radius)`.
pub fn orbital_params(offset: Vec3) -> (f32, f32, f32) {
    let radius = offset.length();
    let yaw = offset.x.atan2(offset.z);
    let horizontal_dist = offset.x.hypot(offset.z);
    let pitch = offset.y.atan2(horizontal_dist);
    (yaw, pitch, radius)
}

pub(crate) fn projection_near(projection: &Projection) -> f32 {
    match projection {
        Projection::Perspective(perspective) => perspective.near,
        Projection::Orthographic(orthographic) => orthographic.near,
        _ => 0.0,
    }
}

fn rig_from_camera(pan_orbit: &PanOrbitCamera) -> FocusRig {
    FocusRig {
        position:     orbit_translation(
            pan_orbit.target_focus,
            pan_orbit.target_yaw,
            pan_orbit.target_pitch,
            pan_orbit.target_radius,
        ),
        target:       pan_orbit.target_focus,
        min_distance: pan_orbit.zoom_lower_limit,
    }
}

/// Writes a rig's pose back into the orbit controls, skipping their smoothing.
fn apply_orbit(pan_orbit: &mut PanOrbitCamera, rig: &FocusRig) {
    let (yaw, pitch, radius) = orbital_params(rig.position - rig.target);

    pan_orbit.target_focus = rig.target;
    pan_orbit.target_yaw = yaw;
    pan_orbit.target_pitch = pitch;
    pan_orbit.target_radius = radius;
    pan_orbit.focus = rig.target;
    pan_orbit.yaw = Some(yaw);
    pan_orbit.pitch = Some(pitch);
    pan_orbit.radius = Some(radius);
    pan_orbit.force_update = true;
}

fn apply_snap(pan_orbit: &mut PanOrbitCamera, rig: &FocusRig) {
    apply_orbit(pan_orbit, rig);
    pan_orbit.zoom_lower_limit = rig.min_distance;
}

/// Points the orbit controls back at the moved target.
///
/// While the controls still look at `previous_target` only the focus moves, so yaw, pitch and
/// radius stay as the user left them. After a pan the camera keeps its panned position, shifted
/// by the target's displacement, and is re-aimed from there.
fn apply_follow(pan_orbit: &mut PanOrbitCamera, rig: &FocusRig, previous_target: Vec3) {
    if pan_orbit.target_focus != previous_target {
        apply_orbit(pan_orbit, rig);
        return;
    }
    if rig.target == previous_target {
        return;
    }
    pan_orbit.target_focus = rig.target;
    pan_orbit.focus = rig.target;
    pan_orbit.force_update = true;
}

/// System that runs the focus controller for every orrery camera.
///
/// Runs after the kinematics tick so it always reads the current frame's positions.
pub fn focus_camera(
    mut commands: Commands,
    mut settings: ResMut<AppSettings>,
    system: Res<OrbitalSystem>,
    mut camera_query: Query<(Entity, &mut PanOrbitCamera, &Projection), With<OrreryCamera>>,
) {
    let Some(name) = settings.focused_body() else {
        return;
    };
    let Some(body) = system.body(name) else {
        warn_once!("Focused body '{name}' is not in the scene; camera focus disabled");
        return;
    };

    let focusing = settings.focusing_body();
    let previous = body.previous_world_position();
    let current = body.world_position();
    let radius = body.node.radius;
    let mut snapped = false;

    for (entity, mut pan_orbit, projection) in &mut camera_query {
        let mut rig = rig_from_camera(&pan_orbit);
        let near = projection_near(projection);

        match rig.focus(focusing, previous, current, radius, near) {
            FocusMode::Snap => {
                apply_snap(&mut pan_orbit, &rig);
                info!(
                    "Focus snapped to {}: camera={:.1?} min_distance={:.1}",
                    body.name(),
                    rig.position,
                    rig.min_distance
                );
                commands.trigger(FocusSnapped {
                    camera_entity:   entity,
                    body:            body.name().to_string(),
                    camera_position: rig.position,
                    min_distance:    rig.min_distance,
                });
                snapped = true;
            },
            FocusMode::Follow => apply_follow(&mut pan_orbit, &rig, previous),
        }
    }

    if snapped {
        settings.finish_focusing();
    }
}

/// Points the actual-scale sunlight from the light source through the mirrored camera target,
/// so the lit side of the focused body faces away from the star.
pub fn aim_sunlight(
    settings: Res<AppSettings>,
    system: Res<OrbitalSystem>,
    camera_query: Query<&PanOrbitCamera, With<OrreryCamera>>,
    mut light_query: Query<&mut Transform, With<SunlightProxy>>,
) {
    if !settings.actual_scale() {
        return;
    }
    let Some(light) = system.light_source() else {
        return;
    };
    let Ok(pan_orbit) = camera_query.single() else {
        return;
    };

    if let Some(transform) = sunlight_transform(light.world_position(), pan_orbit.target_focus) {
        for mut light_transform in &mut light_query {
            *light_transform = transform;
        }
    }
}

/// Directional light placed opposite `target` across `source`, shining through `source`.
/// `None` when the target sits on the source.
pub fn sunlight_transform(source: Vec3, target: Vec3) -> Option<Transform> {
    let toward_target = target - source;
    if toward_target.length_squared() <= f32::EPSILON {
        return None;
    }
    let up = if toward_target.cross(Vec3::Y).length_squared() <= f32::EPSILON {
        Vec3::Z
    } else {
        Vec3::Y
    };
    Some(Transform::from_translation(source - toward_target).looking_at(source, up))
}
