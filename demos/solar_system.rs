//! Interactive solar system built on `bevy_orrery`.
//!
//! - Click a body or its label to focus it
//! - 'Tab' / 'Shift+Tab' cycle the focus, 'Esc' clears it, 'Enter' snaps back to it
//! - 'Up' / 'Down' change the time speed
//! - 'L' labels, 'D' debug axes, 'O' orbit paths, 'S' actual scale, 'Q' quality

use bevy::prelude::*;
use bevy_brp_extras::BrpExtrasPlugin;
use bevy_orrery::ClearFocus;
use bevy_orrery::FocusBody;
use bevy_orrery::FocusSnapped;
use bevy_orrery::OrbitPathGizmo;
use bevy_orrery::OrreryCamera;
use bevy_orrery::OrreryPlugin;
use bevy_orrery::OrreryVisualizationPlugin;
use bevy_orrery::RefocusRequested;
use bevy_orrery::prelude::AppSettings;
use bevy_orrery::prelude::OrbitalSystem;
use bevy_panorbit_camera::PanOrbitCamera;
use bevy_panorbit_camera::PanOrbitCameraPlugin;

const TIME_SPEED_STEP: f32 = 0.05;
const STATUS_FONT_SIZE: f32 = 13.0;

fn main() {
    App::new()
        .add_plugins((
            DefaultPlugins,
            PanOrbitCameraPlugin,
            MeshPickingPlugin,
            OrreryPlugin,
            OrreryVisualizationPlugin,
            BrpExtrasPlugin::default(),
        ))
        .insert_resource(ClearColor(Color::BLACK))
        .add_systems(Startup, setup)
        .add_systems(
            Update,
            (
                cycle_focus,
                adjust_time_speed,
                toggle_settings,
                toggle_orbit_paths,
                update_status_text,
            ),
        )
        .add_observer(log_focus_snapped)
        .run();
}

#[derive(Component)]
struct StatusText;

fn setup(mut commands: Commands) {
    // Clip planes and zoom limits come from `OrreryConfig`; the first frame snaps to the focus.
    commands.spawn((
        PanOrbitCamera {
            button_orbit: MouseButton::Left,
            button_pan: MouseButton::Right,
            ..default()
        },
        Projection::Perspective(PerspectiveProjection::default()),
        OrreryCamera,
    ));

    commands.spawn((
        Text::new(""),
        TextFont {
            font_size: STATUS_FONT_SIZE,
            ..default()
        },
        Node {
            position_type: PositionType::Absolute,
            top: Val::Px(12.0),
            left: Val::Px(12.0),
            ..default()
        },
        StatusText,
    ));
}

fn cycle_focus(
    keyboard: Res<ButtonInput<KeyCode>>,
    mut commands: Commands,
    settings: Res<AppSettings>,
    system: Res<OrbitalSystem>,
) {
    if keyboard.just_pressed(KeyCode::Escape) {
        commands.trigger(ClearFocus);
    }
    if keyboard.just_pressed(KeyCode::Enter) {
        commands.trigger(RefocusRequested);
    }
    if !keyboard.just_pressed(KeyCode::Tab) || system.is_empty() {
        return;
    }

    let names: Vec<&str> = system.iter().map(|(_, body)| body.name()).collect();
    let current = settings
        .focused_body()
        .and_then(|name| names.iter().position(|candidate| *candidate == name));
    let backwards = keyboard.pressed(KeyCode::ShiftLeft) || keyboard.pressed(KeyCode::ShiftRight);
    let next = match (current, backwards) {
        (None, false) => 0,
        (None, true) => names.len() - 1,
        (Some(index), false) => (index + 1) % names.len(),
        (Some(index), true) => (index + names.len() - 1) % names.len(),
    };
    commands.trigger(FocusBody::new(names[next]));
}

fn adjust_time_speed(keyboard: Res<ButtonInput<KeyCode>>, mut settings: ResMut<AppSettings>) {
    let delta = if keyboard.just_pressed(KeyCode::ArrowUp) {
        TIME_SPEED_STEP
    } else if keyboard.just_pressed(KeyCode::ArrowDown) {
        -TIME_SPEED_STEP
    } else {
        return;
    };
    let modifier = (settings.time_speed_modifier() + delta).clamp(0.0, 1.0);
    settings.set_time_speed_modifier(modifier);
}

fn toggle_settings(keyboard: Res<ButtonInput<KeyCode>>, mut settings: ResMut<AppSettings>) {
    if keyboard.just_pressed(KeyCode::KeyL) {
        let show = !settings.show_labels();
        settings.set_show_labels(show);
    }
    if keyboard.just_pressed(KeyCode::KeyD) {
        let show = !settings.show_debug_info();
        settings.set_show_debug_info(show);
    }
    if keyboard.just_pressed(KeyCode::KeyS) {
        let actual_scale = !settings.actual_scale();
        settings.set_actual_scale(actual_scale);
    }
    if keyboard.just_pressed(KeyCode::KeyQ) {
        let quality = settings.quality().toggled();
        settings.set_quality(quality);
    }
}

fn toggle_orbit_paths(
    keyboard: Res<ButtonInput<KeyCode>>,
    mut config_store: ResMut<GizmoConfigStore>,
) {
    if keyboard.just_pressed(KeyCode::KeyO) {
        let (config, _) = config_store.config_mut::<OrbitPathGizmo>();
        config.enabled = !config.enabled;
    }
}

fn update_status_text(settings: Res<AppSettings>, mut text_query: Query<&mut Text, With<StatusText>>) {
    let Ok(mut text) = text_query.single_mut() else {
        return;
    };
    **text = format!(
        "Focus: {}\nSpeed: {:.2} ({:.4} h/frame)\nDistance: {:.0}\nScale: {}\nQuality: {:?}",
        settings.focused_body().unwrap_or("none"),
        settings.time_speed_modifier(),
        settings.time_step(),
        settings.camera_distance(),
        if settings.actual_scale() { "actual" } else { "toon" },
        settings.quality(),
    );
}

fn log_focus_snapped(snapped: On<FocusSnapped>) {
    info!(
        "Camera {:?} snapped to {} (min distance {:.0})",
        snapped.camera_entity, snapped.body, snapped.min_distance
    );
}
