//=========================================================================
// Input System
//
// Pointer, touch and keyboard normalisation.
//
// Responsibilities:
// - Portable event types and DOM key-code mapping (`event`)
// - Bounds/focus state machine over every pointer source (`dispatcher`)
// - Per-frame input view consumed by the engine (`input_state`)
//
// Notes:
// The dispatcher and state are owned by the `ViewportController`, which
// feeds them the current geometry on every event.
//
//=========================================================================

//=== Submodules ==========================================================

pub mod dispatcher;
pub mod event;
pub mod input_state;

//=== Public API ==========================================================

pub use dispatcher::{InputMode, PointerDispatcher, PointerRecord};
pub use event::{InputEvent, KeyCode, PointerId, PointerPhase, RawPointer, MOUSE_POINTER_ID};
pub use input_state::{InputSnapshot, InputState, PointerSample};
