// bevy_orrery
// Interactive solar system model for Bevy:
// - Body descriptor tree and built-in solar system catalog
// - Orbital kinematics with hierarchical frames
// - Camera focus controller driving `bevy_panorbit_camera`
// - Settings store, scene driver and optional visualization

use bevy::prelude::*;

pub mod body;
pub mod camera;
pub mod catalog;
mod components;
mod config;
mod driver;
mod events;
pub mod kinematics;
mod observers;
pub mod prelude;
mod settings;
#[cfg(feature = "visualization")]
mod visualization;

// Public API - Events
pub use events::ClearFocus;
pub use events::FocusBody;
pub use events::FocusSnapped;
pub use events::RefocusRequested;
pub use events::SceneRebuilt;

// Public API - Components
pub use components::OrreryCamera;
pub use components::SunlightProxy;

// Public API - Resources
pub use config::OrreryConfig;
pub use driver::ActiveScale;
pub use kinematics::OrbitalSystem;
pub use settings::AppSettings;

// Public API - Settings types
pub use settings::DerivedSettings;
pub use settings::Quality;
pub use settings::UserSettings;
pub use settings::time_step_for;

// Public API - System ordering
pub use driver::OrrerySystems;

// Public API - Plugins
#[cfg(feature = "visualization")]
pub use visualization::OrreryVisualizationPlugin;
#[cfg(feature = "visualization")]
pub use visualization::OrreryVisualizationConfig;

// Public API - Visualization components and gizmo groups
#[cfg(feature = "visualization")]
pub use visualization::BodyAxesGizmo;
#[cfg(feature = "visualization")]
pub use visualization::BodyLabel;
#[cfg(feature = "visualization")]
pub use visualization::BodyVisual;
#[cfg(feature = "visualization")]
pub use visualization::OrbitPathGizmo;

// Internal - used by plugin, not for external use
use camera::aim_sunlight;
use camera::focus_camera;
use driver::advance_orbital_system;
use driver::apply_time_speed;
use driver::publish_camera_distance;
use driver::rebuild_on_scale_change;
use driver::setup_orrery;
use observers::on_clear_focus;
use observers::on_focus_body;
use observers::on_orrery_camera_added;
use observers::on_refocus_requested;

/// Plugin that adds the orrery core: settings, kinematics, camera focus and scene driver.
///
/// Reads `OrreryConfig` from the environment unless one is already inserted.
pub struct OrreryPlugin;

impl Plugin for OrreryPlugin {
    fn build(&self, app: &mut App) {
        if !app.world().contains_resource::<OrreryConfig>() {
            app.insert_resource(OrreryConfig::from_env());
        }

        app.register_type::<OrreryConfig>()
            .register_type::<AppSettings>()
            .register_type::<ActiveScale>()
            .register_type::<OrreryCamera>()
            .register_type::<SunlightProxy>()
            // Register observers for component lifecycle events
            .add_observer(on_orrery_camera_added)
            // Register observers for custom events
            .add_observer(on_focus_body)
            .add_observer(on_clear_focus)
            .add_observer(on_refocus_requested)
            .configure_sets(
                Update,
                (
                    OrrerySystems::Settings,
                    OrrerySystems::Kinematics,
                    OrrerySystems::Camera,
                    OrrerySystems::Telemetry,
                )
                    .chain(),
            )
            .add_systems(Startup, setup_orrery)
            .add_systems(
                Update,
                (
                    (apply_time_speed, rebuild_on_scale_change)
                        .chain()
                        .in_set(OrrerySystems::Settings),
                    advance_orbital_system.in_set(OrrerySystems::Kinematics),
                    (focus_camera, aim_sunlight)
                        .chain()
                        .in_set(OrrerySystems::Camera),
                    publish_camera_distance.in_set(OrrerySystems::Telemetry),
                ),
            );
    }
}

#[cfg(test)]
mod tests {
    use bevy_panorbit_camera::PanOrbitCamera;

    use super::*;
    use crate::catalog::BodyScale;

    #[derive(Resource, Default)]
    struct SnapCount(usize);

    fn test_app(config: OrreryConfig) -> App {
        let mut app = App::new();
        app.insert_resource(config)
            .add_plugins(OrreryPlugin)
            .init_resource::<SnapCount>()
            .add_observer(|_snap: On<FocusSnapped>, mut count: ResMut<SnapCount>| count.0 += 1);
        app.world_mut().spawn((
            PanOrbitCamera::default(),
            Projection::Perspective(PerspectiveProjection::default()),
            OrreryCamera,
        ));
        app
    }

    fn config(initial_focus: Option<&str>, speed: f32) -> OrreryConfig {
        OrreryConfig {
            initial_focus: initial_focus.map(str::to_string),
            initial_time_speed_modifier: speed,
            ..OrreryConfig::default()
        }
    }

    fn pan_orbit(app: &mut App) -> PanOrbitCamera {
        let mut query = app.world_mut().query_filtered::<&PanOrbitCamera, With<OrreryCamera>>();
        query.single(app.world()).unwrap().clone()
    }

    fn camera_position(app: &mut App) -> Vec3 {
        let pan_orbit = pan_orbit(app);
        camera::orbit_translation(
            pan_orbit.target_focus,
            pan_orbit.target_yaw,
            pan_orbit.target_pitch,
            pan_orbit.target_radius,
        )
    }

    fn body_position(app: &App, name: &str) -> Vec3 {
        app.world()
            .resource::<OrbitalSystem>()
            .body(name)
            .unwrap()
            .world_position()
    }

    fn settings(app: &App) -> &AppSettings { app.world().resource::<AppSettings>() }

    fn snaps(app: &App) -> usize { app.world().resource::<SnapCount>().0 }

    #[test]
    fn new_camera_gets_configured_limits() {
        let mut app = test_app(config(None, 0.5));
        app.update();

        let pan_orbit = pan_orbit(&mut app);
        assert_eq!(pan_orbit.zoom_upper_limit, Some(1e11));

        let mut query = app.world_mut().query_filtered::<&Projection, With<OrreryCamera>>();
        let Projection::Perspective(perspective) = query.single(app.world()).unwrap() else {
            panic!("expected a perspective projection");
        };
        assert_eq!(perspective.near, 100.0);
        assert_eq!(perspective.far, 1.1e11);
    }

    #[test]
    fn no_focus_leaves_camera_alone() {
        let mut app = test_app(config(None, 0.5));
        let before = pan_orbit(&mut app);
        app.update();
        app.update();

        let after = pan_orbit(&mut app);
        assert_eq!(after.target_focus, before.target_focus);
        assert_eq!(after.target_radius, before.target_radius);
        assert_eq!(snaps(&app), 0);
    }

    #[test]
    fn snap_is_edge_triggered_per_focus_change() {
        let mut app = test_app(config(None, 0.5));
        app.update();

        app.world_mut().trigger(FocusBody::new("Earth"));
        assert!(settings(&app).focusing_body());
        app.update();
        assert!(!settings(&app).focusing_body());
        assert_eq!(snaps(&app), 1);

        app.update();
        assert!(!settings(&app).focusing_body());
        assert_eq!(snaps(&app), 1);

        // Re-selecting the focused body is not a focus change.
        app.world_mut().trigger(FocusBody::new("Earth"));
        assert!(!settings(&app).focusing_body());

        app.world_mut().trigger(FocusBody::new("Mars"));
        assert!(settings(&app).focusing_body());
        app.update();
        assert!(!settings(&app).focusing_body());
        assert_eq!(snaps(&app), 2);
        assert_eq!(pan_orbit(&mut app).target_focus, body_position(&app, "Mars"));
    }

    #[test]
    fn snap_offsets_camera_and_clamps_min_distance() {
        let mut app = test_app(config(Some("Earth"), 0.5));
        app.update();

        let system = app.world().resource::<OrbitalSystem>();
        let earth = system.body("Earth").unwrap();
        let radius = earth.node.radius;
        let target = earth.world_position();

        let pan_orbit = pan_orbit(&mut app);
        assert_eq!(pan_orbit.target_focus, target);
        assert_eq!(pan_orbit.zoom_lower_limit, radius + 100.0);
        assert!(camera_position(&mut app).distance(target + camera::snap_offset(radius)) < 1.0);
        assert_eq!(snaps(&app), 1);
    }

    #[test]
    fn follow_moves_camera_with_target() {
        let mut app = test_app(config(Some("Earth"), 0.8));
        app.update();

        let camera_before = camera_position(&mut app);
        let target_before = body_position(&app, "Earth");
        app.update();
        let camera_delta = camera_position(&mut app) - camera_before;
        let target_delta = body_position(&app, "Earth") - target_before;

        assert!(target_delta.length() > 1.0);
        assert!((camera_delta - target_delta).length() < 0.25);
        assert_eq!(pan_orbit(&mut app).target_focus, body_position(&app, "Earth"));
    }

    #[test]
    fn follow_reaims_at_body_after_user_pan() {
        let mut app = test_app(config(Some("Earth"), 0.8));
        app.update();

        let pan = Vec3::new(5000.0, 0.0, 0.0);
        let mut query = app
            .world_mut()
            .query_filtered::<&mut PanOrbitCamera, With<OrreryCamera>>();
        let mut controls = query.single_mut(app.world_mut()).unwrap();
        controls.target_focus += pan;
        controls.focus += pan;
        let panned_camera = camera::orbit_translation(
            controls.target_focus,
            controls.target_yaw,
            controls.target_pitch,
            controls.target_radius,
        );
        let target_before = body_position(&app, "Earth");

        app.update();
        let earth = body_position(&app, "Earth");
        let pan_orbit = pan_orbit(&mut app);

        assert_eq!(pan_orbit.target_focus, earth);
        assert_eq!(pan_orbit.focus, earth);
        let expected_camera = panned_camera + (earth - target_before);
        assert!(camera_position(&mut app).distance(expected_camera) < 1.0);
    }

    #[test]
    fn sunlight_is_aimed_at_the_new_target_in_the_same_tick() {
        let mut app = test_app(OrreryConfig {
            actual_scale: true,
            ..config(Some("Earth"), 0.5)
        });
        let light = app.world_mut().spawn((Transform::default(), SunlightProxy)).id();
        app.update();

        let earth = body_position(&app, "Earth");
        let sun = body_position(&app, "Sun");
        assert_eq!(pan_orbit(&mut app).target_focus, earth);

        let transform = *app.world().get::<Transform>(light).unwrap();
        let expected = sun - (earth - sun);
        assert!(transform.translation.distance(expected) < earth.length() * 1e-6);
        assert!(transform.forward().dot((earth - sun).normalize()) > 1.0 - 1e-4);
    }

    #[test]
    fn sunlight_is_left_alone_at_toon_scale() {
        let mut app = test_app(config(Some("Earth"), 0.5));
        let placed = Transform::from_xyz(1.0, 2.0, 3.0);
        let light = app.world_mut().spawn((placed, SunlightProxy)).id();
        app.update();
        app.update();

        assert!(!settings(&app).actual_scale());
        assert_eq!(*app.world().get::<Transform>(light).unwrap(), placed);
    }

    #[test]
    fn zero_speed_freezes_every_body() {
        let mut app = test_app(config(Some("Moon"), 0.0));
        app.update();
        let before: Vec<_> = app
            .world()
            .resource::<OrbitalSystem>()
            .iter()
            .map(|(_, body)| body.pose)
            .collect();
        let camera_before = camera_position(&mut app);

        app.update();
        app.update();

        let after: Vec<_> = app
            .world()
            .resource::<OrbitalSystem>()
            .iter()
            .map(|(_, body)| body.pose)
            .collect();
        assert_eq!(before, after);
        assert!(camera_position(&mut app).distance(camera_before) < 1e-3);
    }

    #[test]
    fn unknown_focus_is_ignored() {
        let mut app = test_app(config(Some("Earth"), 0.5));
        app.update();

        app.world_mut().trigger(FocusBody::new("Vulcan"));
        assert_eq!(settings(&app).focused_body(), Some("Earth"));

        // Written around the observer, the controller still treats it as a no-op.
        app.world_mut()
            .resource_mut::<AppSettings>()
            .focus_body("Vulcan");
        let before = pan_orbit(&mut app).target_focus;
        app.update();
        assert_eq!(pan_orbit(&mut app).target_focus, before);
        assert!(settings(&app).focusing_body());
    }

    #[test]
    fn clear_focus_stops_following() {
        let mut app = test_app(config(Some("Earth"), 0.8));
        app.update();
        app.world_mut().trigger(ClearFocus);
        let before = pan_orbit(&mut app).target_focus;
        app.update();
        assert_eq!(settings(&app).focused_body(), None);
        assert_eq!(pan_orbit(&mut app).target_focus, before);
    }

    #[test]
    fn refocus_snaps_again() {
        let mut app = test_app(config(Some("Jupiter"), 0.5));
        app.update();
        app.world_mut().trigger(RefocusRequested);
        app.update();
        assert_eq!(snaps(&app), 2);
    }

    #[test]
    fn scale_toggle_rebuilds_and_snaps() {
        let mut app = test_app(config(Some("Earth"), 0.5));
        app.update();
        let moon_pose = app.world().resource::<OrbitalSystem>().body("Moon").unwrap().pose;

        app.world_mut()
            .resource_mut::<AppSettings>()
            .set_actual_scale(true);
        app.update();

        assert_eq!(app.world().resource::<ActiveScale>().0, BodyScale::Actual);
        assert_eq!(snaps(&app), 2);
        let system = app.world().resource::<OrbitalSystem>();
        let earth = system.body("Earth").unwrap();
        assert_eq!(earth.node.radius, 6378.0);
        assert_eq!(pan_orbit(&mut app).zoom_lower_limit, 6378.0 + 100.0);

        // One tick at the same rate separates the rebuilt pose from the original.
        let moon = app.world().resource::<OrbitalSystem>().body("Moon").unwrap();
        let rate = moon.node.orbit.as_ref().unwrap().angular_rate;
        let step = settings(&app).time_step();
        assert!((moon.pose.orbit_angle - (moon_pose.orbit_angle + rate * step)).abs() < 1e-4);
    }

    #[test]
    fn time_step_and_distance_are_published() {
        let mut app = test_app(config(Some("Earth"), 0.5));
        app.update();
        let radius = pan_orbit(&mut app).radius.unwrap();
        assert_eq!(settings(&app).camera_distance(), radius);

        app.world_mut()
            .resource_mut::<AppSettings>()
            .set_time_speed_modifier(0.25);
        app.update();
        assert!((settings(&app).time_step() - time_step_for(0.25)).abs() < 1e-9);
    }
}
