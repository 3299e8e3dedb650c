//! Visualization of the live orrery.
//!
//! Spawns a sphere per body (plus Saturn-style rings), the two light rigs, and screen-space
//! name labels, then keeps them in step with `OrbitalSystem` every frame. Orbit paths and
//! debug axes are drawn through dedicated `GizmoConfigGroup`s so they can be toggled like any
//! other gizmo group.

use std::f32::consts::FRAC_PI_2;

use bevy::camera::visibility::RenderLayers;
use bevy::light::GlobalAmbientLight;
use bevy::prelude::*;
use bevy::transform::TransformSystems;

use crate::OrrerySystems;
use crate::catalog::BodyScale;
use crate::components::OrreryCamera;
use crate::components::SunlightProxy;
use crate::driver::ActiveScale;
use crate::events::FocusBody;
use crate::kinematics::BodyIndex;
use crate::kinematics::LiveBody;
use crate::kinematics::OrbitalSystem;
use crate::settings::AppSettings;
use crate::settings::Quality;

/// Gizmo config group for orbit paths.
/// Toggle via `GizmoConfigStore::config_mut::<OrbitPathGizmo>().enabled`
#[derive(Default, Reflect, GizmoConfigGroup)]
pub struct OrbitPathGizmo {}

/// Gizmo config group for per-body debug axes, drawn while `show_debug_info` is on.
#[derive(Default, Reflect, GizmoConfigGroup)]
pub struct BodyAxesGizmo {}

/// Sphere mesh of a live body.
#[derive(Component, Reflect, Debug, Clone, Copy)]
#[reflect(Component)]
pub struct BodyVisual(pub BodyIndex);

/// Screen-space name label of a live body.
#[derive(Component, Reflect, Debug, Clone, Copy)]
#[reflect(Component)]
pub struct BodyLabel(pub BodyIndex);

/// Light spawned for the light-source body. Visible at toon scale only.
#[derive(Component)]
struct StarLight;

/// Anything spawned by `respawn_scene`, despawned on the next rebuild.
#[derive(Component)]
struct SceneVisual;

const ORBIT_PATH_RESOLUTION: u32 = 256;
const STAR_LIGHT_RANGE: f32 = 1.0e12;

/// Configuration for body materials, lights, labels and gizmos.
#[derive(Resource, Reflect, Debug, Clone)]
#[reflect(Resource)]
pub struct OrreryVisualizationConfig {
    pub label_font_size:         f32,
    pub label_color:             Color,
    /// Screen-space offset of a label from its body's center, in pixels.
    pub label_offset:            Vec2,
    pub orbit_line_width:        f32,
    /// Debug axis length as a multiple of the body radius.
    pub axes_length:             f32,
    pub star_emissive:           f32,
    pub point_light_intensity:   f32,
    pub directional_illuminance: f32,
    /// Brightness of the ambient fill, tinted with the light source's color.
    pub ambient_brightness:      f32,
}

impl Default for OrreryVisualizationConfig {
    fn default() -> Self {
        Self {
            label_font_size:         14.0,
            label_color:             Color::WHITE,
            label_offset:            Vec2::new(8.0, -8.0),
            orbit_line_width:        1.0,
            axes_length:             2.0,
            star_emissive:           4.0,
            point_light_intensity:   1.0e17,
            directional_illuminance: 10_000.0,
            ambient_brightness:      20.0,
        }
    }
}

/// Plugin that renders the orrery built by `OrreryPlugin`.
pub struct OrreryVisualizationPlugin;

impl Plugin for OrreryVisualizationPlugin {
    fn build(&self, app: &mut App) {
        app.init_gizmo_group::<OrbitPathGizmo>()
            .init_gizmo_group::<BodyAxesGizmo>()
            .init_resource::<OrreryVisualizationConfig>()
            .register_type::<BodyVisual>()
            .register_type::<BodyLabel>()
            .add_systems(
                Update,
                (
                    respawn_scene,
                    sync_body_transforms,
                    sync_light_visibility,
                    sync_gizmo_config,
                    draw_orbit_paths,
                    draw_debug_axes,
                )
                    .chain()
                    .after(OrrerySystems::Camera),
            )
            .add_systems(PostUpdate, layout_body_labels.after(TransformSystems::Propagate));
    }
}

/// Latitude and longitude segment counts for a body sphere.
const fn sphere_segments(quality: Quality) -> (u32, u32) {
    let divisions = quality.sphere_divisions();
    (divisions * 2, divisions)
}

/// Frame a gizmo circle must be drawn in to trace a body's orbit. Gizmo circles lie in their
/// local XY plane while orbits lie in the orbit plane's XZ plane.
fn orbit_path_isometry(orbit_plane: Transform) -> Isometry3d {
    Isometry3d::new(
        orbit_plane.translation,
        orbit_plane.rotation * Quat::from_rotation_x(FRAC_PI_2),
    )
}

/// Dim fill light so the night side of a body is not pitch black.
fn ambient_light(light_color: Option<Color>, brightness: f32) -> GlobalAmbientLight {
    GlobalAmbientLight {
        color: light_color.unwrap_or(Color::WHITE),
        brightness,
        ..default()
    }
}

/// Rebuilds every body entity when the quality or the scale changes, and on the first frame.
#[allow(clippy::too_many_arguments)]
fn respawn_scene(
    mut commands: Commands,
    settings: Res<AppSettings>,
    active: Res<ActiveScale>,
    system: Res<OrbitalSystem>,
    config: Res<OrreryVisualizationConfig>,
    asset_server: Res<AssetServer>,
    mut meshes: ResMut<Assets<Mesh>>,
    mut materials: ResMut<Assets<StandardMaterial>>,
    mut spawned: Local<Option<(Quality, BodyScale)>>,
    existing: Query<Entity, With<SceneVisual>>,
) {
    let wanted = (settings.quality(), active.0);
    if *spawned == Some(wanted) {
        return;
    }

    for entity in &existing {
        commands.entity(entity).despawn();
    }

    let (sectors, stacks) = sphere_segments(settings.quality());
    for (index, body) in system.iter() {
        spawn_body(
            &mut commands,
            &asset_server,
            &mut meshes,
            &mut materials,
            &config,
            index,
            body,
            (sectors, stacks),
            settings.actual_scale(),
        );

        commands
            .spawn((
                Text::new(body.name()),
                TextFont {
                    font_size: config.label_font_size,
                    ..default()
                },
                TextColor(config.label_color),
                Node {
                    position_type: PositionType::Absolute,
                    display: Display::None,
                    ..default()
                },
                BodyLabel(index),
                SceneVisual,
            ))
            .observe(on_label_clicked);
    }

    commands.spawn((
        DirectionalLight {
            illuminance: config.directional_illuminance,
            ..default()
        },
        Transform::default(),
        visibility_for(settings.actual_scale()),
        SunlightProxy,
        SceneVisual,
    ));
    commands.insert_resource(ambient_light(
        system.light_source().map(|light| light.node.color),
        config.ambient_brightness,
    ));

    info!(
        "Spawned {} body visuals at {:?} quality, {:?} scale",
        system.len(),
        wanted.0,
        wanted.1
    );
    *spawned = Some(wanted);
}

#[allow(clippy::too_many_arguments)]
fn spawn_body(
    commands: &mut Commands,
    asset_server: &AssetServer,
    meshes: &mut Assets<Mesh>,
    materials: &mut Assets<StandardMaterial>,
    config: &OrreryVisualizationConfig,
    index: BodyIndex,
    body: &LiveBody,
    (sectors, stacks): (u32, u32),
    actual_scale: bool,
) {
    let node = &body.node;
    let material = StandardMaterial {
        base_color: node.color,
        base_color_texture: node.texture.as_ref().map(|path| asset_server.load(path.clone())),
        reflectance: node.albedo,
        emissive: if node.is_light {
            LinearRgba::from(node.color) * config.star_emissive
        } else {
            LinearRgba::BLACK
        },
        unlit: node.is_light,
        ..default()
    };

    let mut entity = commands.spawn((
        Mesh3d(meshes.add(Sphere::new(node.radius).mesh().uv(sectors, stacks))),
        MeshMaterial3d(materials.add(material)),
        body.body_transform(),
        BodyVisual(index),
        SceneVisual,
    ));
    entity.observe(on_body_clicked);

    entity.with_children(|parent| {
        if let Some(ring) = &node.ring {
            parent.spawn((
                Mesh3d(
                    meshes.add(
                        Annulus::new(ring.inner_radius, ring.outer_radius)
                            .mesh()
                            .resolution(sectors * 2),
                    ),
                ),
                MeshMaterial3d(materials.add(StandardMaterial {
                    base_color: node.color.with_alpha(0.8),
                    base_color_texture: ring.texture.as_ref().map(|path| asset_server.load(path.clone())),
                    alpha_mode: AlphaMode::Blend,
                    double_sided: true,
                    cull_mode: None,
                    ..default()
                })),
                Transform::from_rotation(Quat::from_rotation_x(-FRAC_PI_2)),
            ));
        }

        if node.is_light {
            parent.spawn((
                PointLight {
                    intensity: config.point_light_intensity,
                    range: STAR_LIGHT_RANGE,
                    shadows_enabled: false,
                    ..default()
                },
                visibility_for(!actual_scale),
                StarLight,
            ));
        }
    });
}

const fn visibility_for(visible: bool) -> Visibility {
    if visible { Visibility::Inherited } else { Visibility::Hidden }
}

fn sync_body_transforms(
    system: Res<OrbitalSystem>,
    mut body_query: Query<(&BodyVisual, &mut Transform)>,
) {
    for (visual, mut transform) in &mut body_query {
        if let Some(body) = system.get(visual.0) {
            *transform = body.body_transform();
        }
    }
}

/// Point light at toon scale, directional proxy at actual scale.
fn sync_light_visibility(
    settings: Res<AppSettings>,
    mut star_query: Query<&mut Visibility, (With<StarLight>, Without<SunlightProxy>)>,
    mut proxy_query: Query<&mut Visibility, (With<SunlightProxy>, Without<StarLight>)>,
) {
    let actual_scale = settings.actual_scale();
    for mut visibility in &mut star_query {
        visibility.set_if_neq(visibility_for(!actual_scale));
    }
    for mut visibility in &mut proxy_query {
        visibility.set_if_neq(visibility_for(actual_scale));
    }
}

/// Syncs the gizmo render layers and line width with the camera and visualization config.
fn sync_gizmo_config(
    mut config_store: ResMut<GizmoConfigStore>,
    config: Res<OrreryVisualizationConfig>,
    camera_query: Query<Option<&RenderLayers>, With<OrreryCamera>>,
) {
    let render_layers = camera_query.single().ok().flatten();

    let (orbit_config, _) = config_store.config_mut::<OrbitPathGizmo>();
    orbit_config.line.width = config.orbit_line_width;
    if let Some(layers) = render_layers {
        orbit_config.render_layers = layers.clone();
    }

    let (axes_config, _) = config_store.config_mut::<BodyAxesGizmo>();
    if let Some(layers) = render_layers {
        axes_config.render_layers = layers.clone();
    }
}

fn draw_orbit_paths(mut gizmos: Gizmos<OrbitPathGizmo>, system: Res<OrbitalSystem>) {
    for (_, body) in system.iter() {
        let (Some(plane), Some(orbit)) = (body.orbit_plane(), body.node.orbit.as_ref()) else {
            continue;
        };
        gizmos
            .circle(orbit_path_isometry(plane), orbit.radius, orbit.path_color)
            .resolution(ORBIT_PATH_RESOLUTION);
    }
}

fn draw_debug_axes(
    mut gizmos: Gizmos<BodyAxesGizmo>,
    settings: Res<AppSettings>,
    config: Res<OrreryVisualizationConfig>,
    system: Res<OrbitalSystem>,
) {
    if !settings.show_debug_info() {
        return;
    }
    for (_, body) in system.iter() {
        gizmos.axes(body.body_transform(), body.node.radius * config.axes_length);
    }
}

/// Pins each label next to its body on screen, hiding it when labels are off or the body is
/// off screen.
fn layout_body_labels(
    settings: Res<AppSettings>,
    config: Res<OrreryVisualizationConfig>,
    system: Res<OrbitalSystem>,
    camera_query: Query<(&Camera, &GlobalTransform), With<OrreryCamera>>,
    mut label_query: Query<(&BodyLabel, &mut Node)>,
) {
    let camera = camera_query.single().ok();

    for (label, mut node) in &mut label_query {
        let screen_position = camera
            .filter(|_| settings.show_labels())
            .zip(system.get(label.0))
            .and_then(|((cam, cam_global), body)| {
                cam.world_to_viewport(cam_global, body.world_position()).ok()
            });

        let Some(position) = screen_position else {
            if node.display != Display::None {
                node.display = Display::None;
            }
            continue;
        };

        node.display = Display::Flex;
        node.left = Val::Px(position.x + config.label_offset.x);
        node.top = Val::Px(position.y + config.label_offset.y);
    }
}

fn on_body_clicked(
    click: On<Pointer<Click>>,
    mut commands: Commands,
    system: Res<OrbitalSystem>,
    visual_query: Query<&BodyVisual>,
) {
    let Ok(visual) = visual_query.get(click.entity) else {
        return;
    };
    if let Some(body) = system.get(visual.0) {
        commands.trigger(FocusBody::new(body.name()));
    }
}

fn on_label_clicked(
    click: On<Pointer<Click>>,
    mut commands: Commands,
    system: Res<OrbitalSystem>,
    label_query: Query<&BodyLabel>,
) {
    let Ok(label) = label_query.get(click.entity) else {
        return;
    };
    if let Some(body) = system.get(label.0) {
        commands.trigger(FocusBody::new(body.name()));
    }
}

#[cfg(test)]
mod tests {
    use rand::SeedableRng;
    use rand::rngs::StdRng;

    use super::*;
    use crate::catalog;

    #[test]
    fn sphere_segments_follow_quality() {
        assert_eq!(sphere_segments(Quality::High), (64, 32));
        assert_eq!(sphere_segments(Quality::Low), (32, 16));
    }

    #[test]
    fn orbit_paths_pass_through_their_bodies() {
        let root = catalog::root_body(BodyScale::Toon).unwrap();
        let mut system = OrbitalSystem::new(root, &mut StdRng::seed_from_u64(3)).unwrap();
        system.advance(50.0, true);

        for (_, body) in system.iter() {
            let (Some(plane), Some(orbit)) = (body.orbit_plane(), body.node.orbit.as_ref()) else {
                continue;
            };
            let isometry = orbit_path_isometry(plane);
            let local = isometry.rotation.inverse() * (body.world_position() - Vec3::from(isometry.translation));
            let tolerance = orbit.radius * 1e-4;
            assert!(local.z.abs() < tolerance, "{} is off its orbit plane", body.name());
            assert!((local.truncate().length() - orbit.radius).abs() < tolerance);
        }
    }

    #[test]
    fn ambient_light_is_a_dim_tint_of_the_light_source() {
        let root = catalog::root_body(BodyScale::Toon).unwrap();
        let system = OrbitalSystem::new(root, &mut StdRng::seed_from_u64(1)).unwrap();
        let sun = system.light_source().unwrap();
        let config = OrreryVisualizationConfig::default();

        let ambient = ambient_light(Some(sun.node.color), config.ambient_brightness);
        assert_eq!(ambient.color, sun.node.color);
        assert_eq!(ambient.brightness, config.ambient_brightness);
        assert!(ambient.brightness < GlobalAmbientLight::default().brightness);

        assert_eq!(ambient_light(None, 5.0).color, Color::WHITE);
    }

    #[test]
    fn lights_swap_with_scale() {
        assert_eq!(visibility_for(true), Visibility::Inherited);
        assert_eq!(visibility_for(false), Visibility::Hidden);
    }
}
