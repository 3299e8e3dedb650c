//! Convenient re-exports for common types and traits

pub use crate::ActiveScale;
pub use crate::AppSettings;
pub use crate::ClearFocus;
pub use crate::FocusBody;
pub use crate::FocusSnapped;
pub use crate::OrbitalSystem;
pub use crate::OrreryCamera;
pub use crate::OrreryConfig;
pub use crate::OrreryPlugin;
pub use crate::OrrerySystems;
pub use crate::Quality;
pub use crate::RefocusRequested;
pub use crate::SceneRebuilt;
pub use crate::SunlightProxy;
pub use crate::body::BodyError;
pub use crate::body::BodyNode;
pub use crate::catalog::BodyScale;
#[cfg(feature = "visualization")]
pub use crate::OrreryVisualizationConfig;
#[cfg(feature = "visualization")]
pub use crate::OrreryVisualizationPlugin;
