//=========================================================================
// Platform Configuration
//=========================================================================
//
// Entry configuration for the browser platform. Deserialised from the
// JSON object a host page passes in, or built with `PlatformBuilder`.
//
//=========================================================================

//=== External Dependencies ===============================================

use std::str::FromStr;

use log::LevelFilter;
use serde::{Deserialize, Serialize};

//=== Internal Dependencies ===============================================

use crate::core::geometry::{GameSize, SizingStrategy};
use crate::core::platform_bridge::PlatformError;

//=== Defaults ============================================================

pub const DEFAULT_IMAGE_RESOLUTION: f64 = 3.0;
pub const DEFAULT_TARGET_FPS: f64 = 60.0;
pub const DEFAULT_LOG_LEVEL: &str = "info";

fn default_image_resolution() -> f64 {
    DEFAULT_IMAGE_RESOLUTION
}

fn default_target_fps() -> f64 {
    DEFAULT_TARGET_FPS
}

fn default_log_level() -> String {
    DEFAULT_LOG_LEVEL.to_owned()
}

//=== CanvasSource ========================================================

/// Where the drawing canvas comes from.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum CanvasSource {
    /// Create a canvas and append it to the element with `parent_id`, or
    /// to `<body>`.
    Create {
        #[serde(default, rename = "parentId", skip_serializing_if = "Option::is_none")]
        parent_id: Option<String>,
    },

    /// Reuse the canvas element with this id.
    Existing { id: String },
}

impl Default for CanvasSource {
    fn default() -> Self {
        Self::Create { parent_id: None }
    }
}

//=== WindowSize ==========================================================

/// Fixed viewport size used instead of the browser window (tests, embeds).
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct WindowSize {
    pub width: f64,
    pub height: f64,
}

//=== PlatformConfig ======================================================

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PlatformConfig {
    #[serde(default)]
    pub dimensions: SizingStrategy,

    pub game_size: GameSize,

    #[serde(default)]
    pub canvas: CanvasSource,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub window_size: Option<WindowSize>,

    /// Asset pixels per game unit.
    #[serde(default = "default_image_resolution")]
    pub image_resolution: f64,

    /// Backing-buffer pixel budget.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_pixels: Option<u32>,

    #[serde(default = "default_target_fps")]
    pub target_fps: f64,

    #[serde(default)]
    pub native_sprite_map: Vec<String>,

    #[serde(default = "default_log_level")]
    pub log_level: String,
}

impl PlatformConfig {
    pub fn new(game_size: GameSize) -> Self {
        Self {
            dimensions: SizingStrategy::default(),
            game_size,
            canvas: CanvasSource::default(),
            window_size: None,
            image_resolution: DEFAULT_IMAGE_RESOLUTION,
            max_pixels: None,
            target_fps: DEFAULT_TARGET_FPS,
            native_sprite_map: Vec::new(),
            log_level: default_log_level(),
        }
    }

    /// Parses and validates a JSON configuration object.
    pub fn from_json(json: &str) -> Result<Self, PlatformError> {
        let config: Self = serde_json::from_str(json)
            .map_err(|e| PlatformError::InvalidConfig(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), PlatformError> {
        self.game_size.validate()?;

        if !(self.image_resolution.is_finite() && self.image_resolution > 0.0) {
            return Err(PlatformError::InvalidConfig(format!(
                "imageResolution must be positive, got {}",
                self.image_resolution
            )));
        }
        if !(self.target_fps.is_finite() && self.target_fps > 0.0) {
            return Err(PlatformError::InvalidConfig(format!(
                "targetFps must be positive, got {}",
                self.target_fps
            )));
        }
        if self.max_pixels == Some(0) {
            return Err(PlatformError::InvalidConfig("maxPixels must be positive".into()));
        }
        if let Some(window) = self.window_size {
            if !(window.width > 0.0 && window.height > 0.0) {
                return Err(PlatformError::InvalidConfig(format!(
                    "windowSize must be positive, got {}x{}",
                    window.width, window.height
                )));
            }
        }
        self.log_level()?;

        Ok(())
    }

    pub fn log_level(&self) -> Result<LevelFilter, PlatformError> {
        LevelFilter::from_str(&self.log_level)
            .map_err(|_| {
                PlatformError::InvalidConfig(format!("unknown logLevel {:?}", self.log_level))
            })
    }

    /// Pixel budget widened for the resolution controller.
    pub fn pixel_budget(&self) -> Option<u64> {
        self.max_pixels.map(u64::from)
    }
}

//=========================================================================
// Unit Tests
//=========================================================================
