//! Scene driver: builds the scene at startup and sequences the per-frame work.
//!
//! Each frame runs, in order: settings upkeep (time step, scale rebuild), the kinematics tick,
//! the camera focus controller, then telemetry. The camera therefore always reads positions
//! advanced in the same frame.

use bevy::prelude::*;
use bevy_panorbit_camera::PanOrbitCamera;

use crate::catalog;
use crate::catalog::BodyScale;
use crate::components::OrreryCamera;
use crate::config::OrreryConfig;
use crate::events::SceneRebuilt;
use crate::kinematics::OrbitalSystem;
use crate::settings::AppSettings;

/// Per-frame phases of the orrery, chained in declaration order.
#[derive(SystemSet, Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum OrrerySystems {
    Settings,
    Kinematics,
    Camera,
    Telemetry,
}

/// Scale the live `OrbitalSystem` was built at.
#[derive(Resource, Reflect, Debug, Clone, Copy, PartialEq, Eq)]
#[reflect(Resource)]
pub struct ActiveScale(pub BodyScale);

/// Startup system that seeds the settings store and instantiates the catalog.
///
/// A catalog that fails validation is a programming error and aborts startup.
pub fn setup_orrery(mut commands: Commands, config: Res<OrreryConfig>) -> Result {
    let settings = AppSettings::from_config(&config);
    let scale = BodyScale::from_actual_scale(settings.actual_scale());
    let system = OrbitalSystem::new(catalog::root_body(scale)?, &mut rand::thread_rng())?;

    info!(
        "Orrery ready: {} bodies at {scale:?} scale, focus={:?}, time_step={:.6}",
        system.len(),
        settings.focused_body(),
        settings.time_step()
    );

    commands.insert_resource(settings);
    commands.insert_resource(ActiveScale(scale));
    commands.insert_resource(system);
    Ok(())
}

/// Recomputes the time step when the speed modifier moved.
pub fn apply_time_speed(mut settings: ResMut<AppSettings>) {
    if settings.bypass_change_detection().apply_time_speed() {
        debug!(
            "Time speed modifier {:.3} -> time_step {:.6}",
            settings.time_speed_modifier(),
            settings.time_step()
        );
        settings.set_changed();
    }
}

/// Swaps the descriptor tree when the user toggles between toon and actual scale.
pub fn rebuild_on_scale_change(
    mut commands: Commands,
    settings: Res<AppSettings>,
    mut active: ResMut<ActiveScale>,
    mut system: ResMut<OrbitalSystem>,
) -> Result {
    let scale = BodyScale::from_actual_scale(settings.actual_scale());
    if active.0 == scale {
        return Ok(());
    }

    system.rebuild(catalog::root_body(scale)?, &mut rand::thread_rng())?;
    active.0 = scale;
    info!("Rebuilt {} bodies at {scale:?} scale", system.len());
    commands.trigger(SceneRebuilt { scale });
    Ok(())
}

/// Kinematics tick.
pub fn advance_orbital_system(settings: Res<AppSettings>, mut system: ResMut<OrbitalSystem>) {
    system.advance(settings.time_step(), settings.is_moving());
}

/// Publishes the orbit camera's distance to its target.
pub fn publish_camera_distance(
    mut settings: ResMut<AppSettings>,
    camera_query: Query<&PanOrbitCamera, With<OrreryCamera>>,
) {
    let Ok(pan_orbit) = camera_query.single() else {
        return;
    };
    let distance = pan_orbit.radius.unwrap_or(pan_orbit.target_radius);
    if settings.camera_distance() != distance {
        settings.set_camera_distance(distance);
    }
}
