//=========================================================================
// Core
//
// Platform-independent half of the browser adapter: everything here runs
// (and is tested) natively; the `platform` module only feeds it events.
//
// Responsibilities:
// - Viewport sizing and coordinate mapping (`geometry`)
// - Adaptive backing-buffer resolution (`resolution`)
// - Pointer/touch/keyboard normalisation (`input`)
// - Gap-corrected frame timing (`clock`)
// - Orchestration of all of the above (`viewport`)
//
//=========================================================================

//=== Module Declarations =================================================

pub mod clock;
pub mod collaborators;
pub mod config;
pub mod geometry;
pub mod input;
pub mod platform_bridge;
pub mod resolution;
pub mod viewport;

//=== Public API ==========================================================

pub use clock::{AudioCommand, FrameClock};
pub use collaborators::{
    AssetFuture, AssetLoader, AudioControl, GameEngine, InputFrame, KeyValueStore,
    NativeSpriteUtils, PlatformInfo, RenderSurface, ResizeScheduler, StatsHooks,
};
pub use config::{CanvasSource, PlatformConfig, WindowSize};
pub use geometry::{DeviceSize, GameSize, Geometry, SizingStrategy};
pub use platform_bridge::{AssetError, AssetKind, PlatformError, PlatformEvent, TickControl};
pub use resolution::{BufferSize, ResolutionController};
pub use viewport::{Collaborators, GeometryUpdate, ShutdownHandle, ViewportController};
