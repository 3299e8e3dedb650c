//! Settings store shared by every orrery system.
//!
//! `AppSettings` holds the user-facing preferences and the state derived from them each frame.
//! Fields are private; writes go through the named mutators so the derived values stay in step
//! with the preferences that drive them.

use bevy::prelude::*;

use crate::config::OrreryConfig;

/// Sphere tessellation level.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Reflect)]
pub enum Quality {
    Low,
    #[default]
    High,
}

impl Quality {
    /// Latitude segments for a body sphere; longitude uses twice as many.
    pub const fn sphere_divisions(self) -> u32 {
        match self {
            Self::Low => 16,
            Self::High => 32,
        }
    }

    pub const fn toggled(self) -> Self {
        match self {
            Self::Low => Self::High,
            Self::High => Self::Low,
        }
    }
}

/// Preferences written by user interaction.
#[derive(Debug, Clone, PartialEq, Reflect)]
pub struct UserSettings {
    pub focused_body:        Option<String>,
    pub time_speed_modifier: f32,
    pub show_labels:         bool,
    pub show_debug_info:     bool,
    pub actual_scale:        bool,
    pub quality:             Quality,
}

/// State derived from `UserSettings` by the scene driver and the camera controller.
#[derive(Debug, Clone, PartialEq, Reflect)]
pub struct DerivedSettings {
    /// Simulated hours per frame.
    pub time_step:              f32,
    /// Modifier the current `time_step` was computed from.
    pub applied_speed_modifier: f32,
    /// True for exactly the frame on which the camera must snap to the focused body.
    pub focusing_body:          bool,
    /// Last observed camera-to-target distance.
    pub camera_distance:        f32,
}

/// Maps the linear speed slider onto an exponential time step.
pub fn time_step_for(time_speed_modifier: f32) -> f32 { (time_speed_modifier * 20.0).exp() * 0.00001 }

#[derive(Resource, Debug, Clone, PartialEq, Reflect)]
#[reflect(Resource)]
pub struct AppSettings {
    user:    UserSettings,
    derived: DerivedSettings,
}

impl Default for AppSettings {
    fn default() -> Self { Self::from_config(&OrreryConfig::default()) }
}

impl AppSettings {
    /// Seeds the store from configuration. The first frame snaps to the initial focus.
    pub fn from_config(config: &OrreryConfig) -> Self {
        let modifier = config.initial_time_speed_modifier;
        Self {
            user:    UserSettings {
                focused_body:        config.initial_focus.clone(),
                time_speed_modifier: modifier,
                show_labels:         config.show_labels,
                show_debug_info:     config.show_debug_info,
                actual_scale:        config.actual_scale,
                quality:             config.quality,
            },
            derived: DerivedSettings {
                time_step:              time_step_for(modifier),
                applied_speed_modifier: modifier,
                focusing_body:          true,
                camera_distance:        0.0,
            },
        }
    }

    pub const fn user(&self) -> &UserSettings { &self.user }

    pub const fn derived(&self) -> &DerivedSettings { &self.derived }

    // ------------------------------------------------------------------------
    // Focus
    // ------------------------------------------------------------------------

    pub fn focused_body(&self) -> Option<&str> { self.user.focused_body.as_deref() }

    /// Focuses `name`. Returns false, and changes nothing, if it is already focused.
    pub fn focus_body(&mut self, name: impl Into<String>) -> bool {
        let name = name.into();
        if self.user.focused_body.as_deref() == Some(name.as_str()) {
            return false;
        }
        self.user.focused_body = Some(name);
        self.derived.focusing_body = true;
        true
    }

    /// Drops the focus. The camera keeps its last pose.
    pub fn clear_focus(&mut self) { self.user.focused_body = None; }

    pub const fn focusing_body(&self) -> bool { self.derived.focusing_body }

    /// Forces a snap to the focused body on the next frame.
    pub const fn request_refocus(&mut self) { self.derived.focusing_body = true; }

    /// Ends the snap frame.
    pub const fn finish_focusing(&mut self) { self.derived.focusing_body = false; }

    // ------------------------------------------------------------------------
    // Time
    // ------------------------------------------------------------------------

    pub const fn time_speed_modifier(&self) -> f32 { self.user.time_speed_modifier }

    pub const fn set_time_speed_modifier(&mut self, modifier: f32) { self.user.time_speed_modifier = modifier; }

    /// Motion stops entirely at or below a zero modifier.
    pub fn is_moving(&self) -> bool { self.user.time_speed_modifier > 0.0 }

    pub const fn time_step(&self) -> f32 { self.derived.time_step }

    /// Recomputes `time_step` if the modifier changed since it was last applied.
    /// Returns true when a recomputation happened.
    pub fn apply_time_speed(&mut self) -> bool {
        let modifier = self.user.time_speed_modifier;
        if self.derived.applied_speed_modifier == modifier {
            return false;
        }
        self.derived.applied_speed_modifier = modifier;
        self.derived.time_step = time_step_for(modifier);
        true
    }

    // ------------------------------------------------------------------------
    // Toggles
    // ------------------------------------------------------------------------

    pub const fn actual_scale(&self) -> bool { self.user.actual_scale }

    /// Switching scale invalidates every camera distance, so it also forces a snap.
    pub const fn set_actual_scale(&mut self, actual_scale: bool) {
        if self.user.actual_scale != actual_scale {
            self.user.actual_scale = actual_scale;
            self.derived.focusing_body = true;
        }
    }

    pub const fn show_labels(&self) -> bool { self.user.show_labels }

    pub const fn set_show_labels(&mut self, show: bool) { self.user.show_labels = show; }

    pub const fn show_debug_info(&self) -> bool { self.user.show_debug_info }

    pub const fn set_show_debug_info(&mut self, show: bool) { self.user.show_debug_info = show; }

    pub const fn quality(&self) -> Quality { self.user.quality }

    pub const fn set_quality(&mut self, quality: Quality) { self.user.quality = quality; }

    // ------------------------------------------------------------------------
    // Telemetry
    // ------------------------------------------------------------------------

    pub const fn camera_distance(&self) -> f32 { self.derived.camera_distance }

    pub const fn set_camera_distance(&mut self, distance: f32) { self.derived.camera_distance = distance; }
}
