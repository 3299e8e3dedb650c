//! Observers that apply focus requests to the settings store and configure new cameras.

use bevy::prelude::*;
use bevy_panorbit_camera::PanOrbitCamera;

use crate::components::OrreryCamera;
use crate::config::OrreryConfig;
use crate::events::ClearFocus;
use crate::events::FocusBody;
use crate::events::RefocusRequested;
use crate::kinematics::OrbitalSystem;
use crate::settings::AppSettings;

/// Observer for `FocusBody`. Unknown names are rejected so the camera never chases a body that
/// is not in the scene.
pub fn on_focus_body(
    focus: On<FocusBody>,
    mut settings: ResMut<AppSettings>,
    system: Option<Res<OrbitalSystem>>,
) {
    if let Some(system) = system
        && system.body(&focus.name).is_none()
    {
        warn!("FocusBody: no body named '{}'", focus.name);
        return;
    }

    if settings.focus_body(focus.name.clone()) {
        info!("FocusBody: focusing {}", focus.name);
    }
}

pub fn on_clear_focus(_clear: On<ClearFocus>, mut settings: ResMut<AppSettings>) {
    if let Some(name) = settings.focused_body() {
        info!("ClearFocus: releasing {name}");
    }
    settings.clear_focus();
}

pub fn on_refocus_requested(_refocus: On<RefocusRequested>, mut settings: ResMut<AppSettings>) {
    settings.request_refocus();
}

/// Applies the configured clip planes and zoom ceiling to a camera as soon as it is marked.
pub fn on_orrery_camera_added(
    add: On<Add, OrreryCamera>,
    config: Res<OrreryConfig>,
    mut camera_query: Query<(&mut PanOrbitCamera, Option<&mut Projection>)>,
) {
    let Ok((mut pan_orbit, projection)) = camera_query.get_mut(add.entity) else {
        warn!("OrreryCamera on {:?} has no PanOrbitCamera; focus control disabled", add.entity);
        return;
    };

    pan_orbit.zoom_upper_limit = Some(config.max_camera_distance);
    pan_orbit.zoom_lower_limit = pan_orbit.zoom_lower_limit.min(config.max_camera_distance);

    if let Some(mut projection) = projection
        && let Projection::Perspective(perspective) = &mut *projection
    {
        perspective.near = config.camera_near;
        perspective.far = config.camera_far;
    }
}
