//! Startup configuration, with `ORRERY_*` environment overrides.

use bevy::prelude::*;

use crate::settings::Quality;

const DEFAULT_CAMERA_NEAR: f32 = 100.0;
const DEFAULT_CAMERA_FAR: f32 = 110_000_000_000.0;
const DEFAULT_MAX_CAMERA_DISTANCE: f32 = 100_000_000_000.0;
const DEFAULT_FOCUS: &str = "Earth";
const DEFAULT_TIME_SPEED_MODIFIER: f32 = 0.5;

/// Values the plugin starts from. Insert before adding `OrreryPlugin` to bypass the environment.
#[derive(Resource, Reflect, Debug, Clone, PartialEq)]
#[reflect(Resource)]
pub struct OrreryConfig {
    /// Perspective near plane, also the clearance kept between the camera and a body's surface.
    pub camera_near:                 f32,
    pub camera_far:                  f32,
    /// Upper zoom limit of the orbit controls.
    pub max_camera_distance:         f32,
    pub initial_focus:               Option<String>,
    pub initial_time_speed_modifier: f32,
    pub quality:                     Quality,
    pub show_labels:                 bool,
    pub show_debug_info:             bool,
    pub actual_scale:                bool,
}

impl Default for OrreryConfig {
    fn default() -> Self {
        Self {
            camera_near:                 DEFAULT_CAMERA_NEAR,
            camera_far:                  DEFAULT_CAMERA_FAR,
            max_camera_distance:         DEFAULT_MAX_CAMERA_DISTANCE,
            initial_focus:               Some(DEFAULT_FOCUS.to_string()),
            initial_time_speed_modifier: DEFAULT_TIME_SPEED_MODIFIER,
            quality:                     Quality::High,
            show_labels:                 true,
            show_debug_info:             false,
            actual_scale:                false,
        }
    }
}

impl OrreryConfig {
    /// Default configuration overridden by any valid `ORRERY_*` environment variables.
    pub fn from_env() -> Self { load_config_from(|key| std::env::var(key).ok()) }
}

fn load_config_from<F>(lookup: F) -> OrreryConfig
where
    F: Fn(&str) -> Option<String>,
{
    let mut config = OrreryConfig::default();

    if let Some(value) = parse_f32(&lookup, "ORRERY_CAMERA_NEAR")
        && value.is_finite() && value > 0.0
    {
        config.camera_near = value;
    }
    if let Some(value) = parse_f32(&lookup, "ORRERY_CAMERA_FAR")
        && value.is_finite() && value > 0.0
    {
        config.camera_far = value;
    }
    if let Some(value) = parse_f32(&lookup, "ORRERY_MAX_CAMERA_DISTANCE")
        && value.is_finite() && value > 0.0
    {
        config.max_camera_distance = value;
    }
    if let Some(raw) = lookup("ORRERY_FOCUS") {
        let name = raw.trim();
        match name.to_ascii_lowercase().as_str() {
            "" => {},
            "none" => config.initial_focus = None,
            _ => config.initial_focus = Some(name.to_string()),
        }
    }
    if let Some(value) = parse_f32(&lookup, "ORRERY_TIME_SPEED")
        && value.is_finite()
    {
        config.initial_time_speed_modifier = value;
    }
    if let Some(raw) = lookup("ORRERY_QUALITY") {
        match raw.trim().to_ascii_lowercase().as_str() {
            "low" => config.quality = Quality::Low,
            "high" => config.quality = Quality::High,
            _ => {},
        }
    }
    if let Some(value) = parse_bool(&lookup, "ORRERY_SHOW_LABELS") {
        config.show_labels = value;
    }
    if let Some(value) = parse_bool(&lookup, "ORRERY_SHOW_DEBUG_INFO") {
        config.show_debug_info = value;
    }
    if let Some(value) = parse_bool(&lookup, "ORRERY_ACTUAL_SCALE") {
        config.actual_scale = value;
    }

    if config.camera_far <= config.camera_near {
        config.camera_far = DEFAULT_CAMERA_FAR.max(config.camera_near * 2.0);
    }

    config
}

fn parse_bool<F>(lookup: &F, key: &str) -> Option<bool>
where
    F: Fn(&str) -> Option<String>,
{
    lookup(key).and_then(|raw| match raw.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Some(true),
        "0" | "false" | "no" | "off" => Some(false),
        _ => None,
    })
}

fn parse_f32<F>(lookup: &F, key: &str) -> Option<f32>
where
    F: Fn(&str) -> Option<String>,
{
    lookup(key).and_then(|raw| raw.trim().parse::<f32>().ok())
}
