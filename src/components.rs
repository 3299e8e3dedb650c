//! Components the orrery systems look for.

use bevy::prelude::*;

/// Marks the camera the focus controller drives. It must also carry a `PanOrbitCamera`.
#[derive(Component, Reflect, Debug, Default, Clone, Copy)]
#[reflect(Component)]
pub struct OrreryCamera;

/// Marks the directional light that stands in for the light-source body at actual scale.
/// Its transform is rewritten every frame to shine through the light source onto the camera
/// target.
#[derive(Component, Reflect, Debug, Default, Clone, Copy)]
#[reflect(Component)]
pub struct SunlightProxy;
