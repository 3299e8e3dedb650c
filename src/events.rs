//! Requests that drive the settings store, and notifications the orrery emits back.

use bevy::prelude::*;

use crate::catalog::BodyScale;

// ============================================================================
// Focus requests
// ============================================================================

/// Focuses the body with this name. The camera snaps to it on the next frame.
/// Re-selecting the body that is already focused does nothing.
#[derive(Event, Reflect, Debug, Clone)]
#[reflect(Event, FromReflect)]
pub struct FocusBody {
    pub name: String,
}

impl FocusBody {
    pub fn new(name: impl Into<String>) -> Self { Self { name: name.into() } }
}

/// Drops the current focus. The camera stays where it is and stops following.
#[derive(Event, Reflect, Debug, Clone, Default)]
#[reflect(Event, FromReflect)]
pub struct ClearFocus;

/// Snaps the camera back to the focused body, e.g. after a startup dialog closes.
#[derive(Event, Reflect, Debug, Clone, Default)]
#[reflect(Event, FromReflect)]
pub struct RefocusRequested;

// ============================================================================
// Scene notifications
// ============================================================================

/// Fired after the live bodies were rebuilt at a new scale.
#[derive(Event, Reflect, Debug, Clone)]
#[reflect(Event, FromReflect)]
pub struct SceneRebuilt {
    pub scale: BodyScale,
}

// ============================================================================
// Camera notifications
// ============================================================================

/// Fired on the frame the camera snaps to a newly focused body.
#[derive(EntityEvent, Reflect)]
#[reflect(Event, FromReflect)]
pub struct FocusSnapped {
    #[event_target]
    pub camera_entity:   Entity,
    pub body:            String,
    pub camera_position: Vec3,
    pub min_distance:    f32,
}
