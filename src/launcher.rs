//=========================================================================
// Platform Launcher
//
// Entry configuration for the browser platform.
//
// Architecture:
// ```text
//     PlatformBuilder  ──build()──>  Launcher  ──into_controller()──>  ViewportController
//         │                             │
//         ├─ with_dimensions()          └─ (wasm32) platform::start()
//         ├─ with_max_pixels()              attaches the DOM and runs
//         ├─ with_stats_hooks()             the animation-frame loop
//         └─ ...
// ```
//
//=========================================================================

//=== External Dependencies ===============================================

use crossbeam_channel::{bounded, Receiver, Sender};
use log::info;

//=== Internal Dependencies ===============================================

use crate::core::collaborators::{GameEngine, RenderSurface, StatsHooks};
use crate::core::config::{CanvasSource, PlatformConfig, WindowSize};
use crate::core::geometry::{GameSize, SizingStrategy};
use crate::core::input::InputMode;
use crate::core::platform_bridge::{PlatformError, PlatformEvent};
use crate::core::viewport::{Collaborators, ViewportController};

//=== PlatformBuilder =====================================================

/// Builder for the browser platform configuration.
///
/// # Default Values
///
/// - **Dimensions**: `SizingStrategy::GameCoords`
/// - **Canvas**: created and appended to `<body>`
/// - **Image resolution**: 3.0 asset pixels per game unit
/// - **Pixel budget**: none
/// - **Target FPS**: 60.0
/// - **Channel capacity**: 512 events
///
/// # Examples
///
/// ```
/// use aetheric_web::core::geometry::{GameSize, SizingStrategy};
/// use aetheric_web::launcher::PlatformBuilder;
///
/// let launcher = PlatformBuilder::new(GameSize::new(400.0, 300.0).unwrap())
///     .with_dimensions(SizingStrategy::FitToWidth)
///     .with_max_pixels(1_000_000)
///     .build()
///     .unwrap();
///
/// assert_eq!(launcher.config().max_pixels, Some(1_000_000));
/// ```
pub struct PlatformBuilder {
    config: PlatformConfig,
    stats: StatsHooks,
    channel_capacity: usize,
}

impl PlatformBuilder {
    pub const DEFAULT_CHANNEL_CAPACITY: usize = 512;

    pub fn new(game_size: GameSize) -> Self {
        Self::from_config(PlatformConfig::new(game_size))
    }

    /// Starts from a deserialised configuration object.
    pub fn from_config(config: PlatformConfig) -> Self {
        Self {
            config,
            stats: StatsHooks::default(),
            channel_capacity: Self::DEFAULT_CHANNEL_CAPACITY,
        }
    }

    pub fn with_dimensions(mut self, dimensions: SizingStrategy) -> Self {
        self.config.dimensions = dimensions;
        self
    }

    pub fn with_canvas(mut self, canvas: CanvasSource) -> Self {
        self.config.canvas = canvas;
        self
    }

    /// Uses a fixed viewport size instead of the browser window.
    pub fn with_window_size(mut self, width: f64, height: f64) -> Self {
        self.config.window_size = Some(WindowSize { width, height });
        self
    }

    pub fn with_image_resolution(mut self, image_resolution: f64) -> Self {
        self.config.image_resolution = image_resolution;
        self
    }

    pub fn with_max_pixels(mut self, max_pixels: u32) -> Self {
        self.config.max_pixels = Some(max_pixels);
        self
    }

    /// # Panics
    ///
    /// Panics if `fps <= 0.0`.
    pub fn with_target_fps(mut self, fps: f64) -> Self {
        assert!(fps > 0.0, "Target FPS must be positive, got {}", fps);
        self.config.target_fps = fps;
        self
    }

    pub fn with_native_sprite_map(mut self, names: Vec<String>) -> Self {
        self.config.native_sprite_map = names;
        self
    }

    pub fn with_log_level(mut self, level: impl Into<String>) -> Self {
        self.config.log_level = level.into();
        self
    }

    pub fn with_stats_hooks(mut self, stats: StatsHooks) -> Self {
        self.stats = stats;
        self
    }

    /// # Panics
    ///
    /// Panics if `capacity == 0`.
    pub fn with_channel_capacity(mut self, capacity: usize) -> Self {
        assert!(capacity > 0, "Channel capacity must be positive");
        self.channel_capacity = capacity;
        self
    }

    /// Validates the configuration.
    ///
    /// # Errors
    ///
    /// Returns [`PlatformError::InvalidConfig`] for non-positive sizes,
    /// image resolution, FPS or pixel budget, or an unknown log level.
    pub fn build(self) -> Result<Launcher, PlatformError> {
        self.config.validate()?;

        info!(
            target: "platform",
            "Building platform ({:?}, channel: {})",
            self.config.dimensions,
            self.channel_capacity
        );

        Ok(Launcher {
            config: self.config,
            stats: self.stats,
            channel_capacity: self.channel_capacity,
        })
    }
}

//=== Launcher ============================================================

/// Validated platform configuration, ready to be attached to a page.
pub struct Launcher {
    config: PlatformConfig,
    stats: StatsHooks,
    channel_capacity: usize,
}

impl Launcher {
    pub fn config(&self) -> &PlatformConfig {
        &self.config
    }

    pub fn channel_capacity(&self) -> usize {
        self.channel_capacity
    }

    /// Creates the bounded platform event queue.
    pub fn channel(&self) -> (Sender<PlatformEvent>, Receiver<PlatformEvent>) {
        bounded(self.channel_capacity)
    }

    /// Builds the controller around the given collaborators and queue.
    /// `parts.stats` is replaced by the hooks configured on the builder.
    pub fn into_controller<R, E>(
        self,
        input_mode: InputMode,
        (sender, receiver): (Sender<PlatformEvent>, Receiver<PlatformEvent>),
        mut parts: Collaborators<R, E>,
    ) -> ViewportController<R, E>
    where
        R: RenderSurface,
        E: GameEngine<Handles = R::Handles>,
    {
        parts.stats = self.stats;
        ViewportController::new(self.config, input_mode, sender, receiver, parts)
    }
}

//=========================================================================
// Unit Tests
//=========================================================================
