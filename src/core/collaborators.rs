//=========================================================================
// Collaborators
//=========================================================================
//
// Contracts between the viewport core and the systems it drives or is
// driven by: the renderer, persistent storage, audio, asset loading and
// the game engine itself.
//
// Architecture:
//   ViewportController ──resize()──────────► RenderSurface ──► Handles
//          │          ──platform_changed()─► GameEngine ◄── Handles
//          │          ──run_next_frame()───► GameEngine (InputFrame)
//          ├── get_item()/set_item() ──────► KeyValueStore
//          ├── apply() ────────────────────► AudioControl
//          └── schedule_resize() ──────────► ResizeScheduler
//
// The browser runtime supplies the real implementations; tests supply
// recording fakes.
//
//=========================================================================

//=== Standard Library Imports ============================================

use std::fmt;
use std::future::Future;
use std::pin::Pin;

//=== Internal Dependencies ===============================================

use crate::core::clock::AudioCommand;
use crate::core::geometry::{CoordinateTransform, DeviceSize, Geometry};
use crate::core::input::{InputMode, InputSnapshot, InputState, PointerDispatcher};
use crate::core::platform_bridge::AssetError;
use crate::core::resolution::BufferSize;

//=== Rendering ===========================================================

/// The drawing surface (canvas plus graphics context).
pub trait RenderSurface {
    /// Whatever the engine's renderer needs; passed through untouched.
    type Handles;

    /// Applies a new CSS box and backing buffer, returning fresh handles.
    fn resize(&mut self, size: &DeviceSize, buffer: BufferSize) -> Self::Handles;

    /// Canvas top-left relative to the document origin, in CSS pixels.
    /// Read after `resize`, since the canvas may have moved.
    fn canvas_origin(&self) -> (f64, f64);
}

//=== Storage =============================================================

pub type StoreReply = Box<dyn FnOnce(Option<String>)>;

/// Persistent string store. Reads may complete later; the reply is
/// invoked exactly once.
pub trait KeyValueStore {
    fn get_item(&self, key: &str, reply: StoreReply);
    fn set_item(&mut self, key: &str, value: &str);
}

//=== Audio ===============================================================

pub trait AudioControl {
    /// Applies the commands in order, each after the previous completes.
    fn apply(&mut self, commands: &[AudioCommand]);
}

//=== Deferred Resize =====================================================

/// Re-measures the viewport after a delay, for browsers that briefly
/// report a zero-sized window.
pub trait ResizeScheduler {
    fn schedule_resize(&mut self, delay_ms: u32);
}

//=== Assets ==============================================================

pub type AssetFuture<T> = Pin<Box<dyn Future<Output = Result<T, AssetError>>>>;

/// Loads game assets by file name. Failures are reported once and never
/// retried.
pub trait AssetLoader {
    type Image;
    type Audio;

    /// `sharp_scaling` requests nearest-neighbour sampling (pixel art).
    fn load_image(&self, name: &str, sharp_scaling: bool) -> AssetFuture<Self::Image>;
    fn load_audio(&self, name: &str) -> AssetFuture<Self::Audio>;

    fn cleanup_image(&self, image: Self::Image);
    fn cleanup_audio(&self, audio: Self::Audio);
}

//=== StatsHooks ==========================================================

type Hook = Box<dyn FnMut()>;

/// Optional profiling callbacks wrapped around every engine frame.
#[derive(Default)]
pub struct StatsHooks {
    begin: Option<Hook>,
    end: Option<Hook>,
}

impl StatsHooks {
    pub fn new(begin: impl FnMut() + 'static, end: impl FnMut() + 'static) -> Self {
        Self {
            begin: Some(Box::new(begin)),
            end: Some(Box::new(end)),
        }
    }

    pub fn begin(&mut self) {
        if let Some(hook) = self.begin.as_mut() {
            hook();
        }
    }

    pub fn end(&mut self) {
        if let Some(hook) = self.end.as_mut() {
            hook();
        }
    }
}

impl fmt::Debug for StatsHooks {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("StatsHooks")
            .field("begin", &self.begin.is_some())
            .field("end", &self.end.is_some())
            .finish()
    }
}

//=== NativeSpriteUtils ===================================================

/// Placement data for DOM elements overlaid on the canvas (text inputs,
/// videos), refreshed on every geometry change.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct NativeSpriteUtils {
    pub is_last_frame: bool,
    /// True on the first engine frame after a geometry change.
    pub did_resize: bool,
    /// CSS pixels per game unit.
    pub scale: f64,
    pub size: DeviceSize,
    pub transform: CoordinateTransform,
}

impl NativeSpriteUtils {
    pub fn from_geometry(geometry: &Geometry) -> Self {
        Self {
            is_last_frame: false,
            did_resize: true,
            scale: 1.0 / geometry.transform.scale_x(),
            size: geometry.size,
            transform: geometry.transform,
        }
    }

    pub fn game_x_to_platform_x(&self, x: f64) -> f64 {
        self.transform.game_to_platform_x(x)
    }

    pub fn game_y_to_platform_y(&self, y: f64) -> f64 {
        self.transform.game_to_platform_y(y)
    }
}

//=== PlatformInfo ========================================================

/// Static facts about the platform, handed to the engine at start.
#[derive(Debug, Clone, PartialEq)]
pub struct PlatformInfo {
    pub is_test_platform: bool,
    pub input_mode: InputMode,
    pub native_sprite_map: Vec<String>,
}

//=== InputFrame ==========================================================

/// Per-frame view handed to [`GameEngine::run_next_frame`].
pub struct InputFrame<'a> {
    state: &'a mut InputState,
    dispatcher: &'a PointerDispatcher,
    utils: &'a NativeSpriteUtils,
}

impl<'a> InputFrame<'a> {
    pub(crate) fn new(
        state: &'a mut InputState,
        dispatcher: &'a PointerDispatcher,
        utils: &'a NativeSpriteUtils,
    ) -> Self {
        Self {
            state,
            dispatcher,
            utils,
        }
    }

    /// Input accumulated since the last `reset_inputs`.
    pub fn inputs(&self) -> InputSnapshot {
        self.state.snapshot(self.dispatcher.active_samples())
    }

    /// Starts a new input frame; held keys and pointers are kept.
    pub fn reset_inputs(&mut self) {
        self.state.clear();
    }

    pub fn native_sprite_utils(&self) -> &NativeSpriteUtils {
        self.utils
    }

    pub fn is_in_focus(&self) -> bool {
        self.dispatcher.is_in_focus()
    }
}

//=== GameEngine ==========================================================

/// The engine side of the platform contract.
pub trait GameEngine {
    type Handles;

    fn start(&mut self, platform: &PlatformInfo);

    /// Called after every geometry change and once more at cleanup (with
    /// `utils.is_last_frame` set).
    fn platform_changed(&mut self, handles: &Self::Handles, utils: &NativeSpriteUtils);

    /// Steps the game to `elapsed` milliseconds of corrected game time.
    fn run_next_frame(&mut self, elapsed: f64, frame: &mut InputFrame<'_>);
}

//=========================================================================
// Unit Tests
//=========================================================================
