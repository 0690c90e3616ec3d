//=========================================================================
// Geometry
//=========================================================================
//
// Viewport sizing and coordinate mapping.
//
// Architecture:
//   RawViewport ─► DeviceSize ─► (ResolutionController) ─► BufferSize
//                      │
//                      └──► CoordinateTransform
//                                   │
//   Geometry { size, transform, buffer }  ◄── swapped as one value
//
//=========================================================================

//=== Module Declarations =================================================

mod device_size;
mod transform;

//=== Public API ==========================================================

pub use device_size::{DeviceSize, GameSize, RawViewport, SizingStrategy};
pub use transform::{CoordinateTransform, ViewportOffsets};

use crate::core::resolution::BufferSize;

//=== Geometry ============================================================

/// Current viewport geometry, recomputed and replaced as a whole.
///
/// Input dispatch and native sprite placement read through this single
/// value, so a resize can never leave one of them on stale offsets.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Geometry {
    pub size: DeviceSize,
    pub transform: CoordinateTransform,
    pub buffer: BufferSize,
}
