//! Editor configuration.

use crate::error::{EditorError, EditorResult};
use crate::shapes::CssColor;
use serde::{Deserialize, Serialize};

/// Defaults for newly created frames.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct FrameDefaults {
    pub left: f64,
    pub top: f64,
    pub width: f64,
    pub height: f64,
    /// Border colour.
    pub accent: CssColor,
}

impl Default for FrameDefaults {
    fn default() -> Self {
        Self {
            left: 100.0,
            top: 100.0,
            width: 200.0,
            height: 200.0,
            accent: CssColor::new("#07FE3D"),
        }
    }
}

/// Configuration for an editor session.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct EditorConfig {
    pub canvas_width: u32,
    pub canvas_height: u32,
    pub background: CssColor,
    /// Placed images are scaled to this width, then to this height.
    pub image_target_size: f64,
    pub frame: FrameDefaults,
    /// Template loaded when the session starts, if any.
    pub initial_template: Option<String>,
}

impl Default for EditorConfig {
    fn default() -> Self {
        Self {
            canvas_width: 500,
            canvas_height: 500,
            background: CssColor::new("#ffffff"),
            image_target_size: 400.0,
            frame: FrameDefaults::default(),
            initial_template: Some("T-Shirt.png".to_string()),
        }
    }
}

impl EditorConfig {
    /// Parse a JSON configuration. Missing keys take their defaults.
    pub fn from_json(json: &str) -> EditorResult<Self> {
        let config: Self = serde_json::from_str(json)
            .map_err(|e| EditorError::Validation(format!("invalid editor config: {e}")))?;
        if config.image_target_size <= 0.0 {
            return Err(EditorError::Validation(
                "image_target_size must be positive".to_string(),
            ));
        }
        Ok(config)
    }

    pub fn to_json(&self) -> EditorResult<String> {
        serde_json::to_string_pretty(self).map_err(|e| EditorError::Internal(e.to_string()))
    }
}
