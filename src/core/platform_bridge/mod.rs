//=========================================================================
// Platform Bridge
//=========================================================================
//
// Bridges the browser (DOM listeners, animation frames, async storage)
// with the platform-independent core.
//
// Components:
// - `interface`: Event types and error definitions (the contract)
// - `event_collector`: Core-side draining of the event queue
//
//=========================================================================

//=== Module Declarations =================================================

pub(crate) mod event_collector;
pub(crate) mod interface;

//=== Public API ==========================================================

pub(crate) use event_collector::EventCollector;
pub use event_collector::TickControl;
pub use interface::{AssetError, AssetKind, PlatformError, PlatformEvent, ViewportMetrics};
