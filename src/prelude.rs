//=========================================================================
// Prelude
//=========================================================================
//
// Convenience module that re-exports commonly used types and traits.
//
// Usage:
//   use aetheric_web::prelude::*;
//
//=========================================================================

//=== Public API ==========================================================

// Entry configuration
pub use crate::launcher::{Launcher, PlatformBuilder};
pub use crate::core::config::{CanvasSource, PlatformConfig};

// Geometry and resolution
pub use crate::core::geometry::{DeviceSize, GameSize, Geometry, SizingStrategy};
pub use crate::core::resolution::BufferSize;

// Engine contract
pub use crate::core::collaborators::{
    AssetLoader, GameEngine, InputFrame, NativeSpriteUtils, PlatformInfo, StatsHooks,
};

// Input
pub use crate::core::input::{InputMode, InputSnapshot, KeyCode, PointerId, PointerSample};

// Errors and control flow
pub use crate::core::platform_bridge::{AssetError, PlatformError, TickControl};

// Browser runtime
#[cfg(target_arch = "wasm32")]
pub use crate::platform::{ImageAsset, WebAssetLoader, WebGlHandles, WebPlatform};
