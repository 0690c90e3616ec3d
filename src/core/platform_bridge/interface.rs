//=========================================================================
// Platform Bridge Interface
//=========================================================================
//
// Browser-to-core interface types (events and errors).
//
// Defines the contract between the DOM glue and the platform-independent
// core. DOM listeners translate browser events into `PlatformEvent`s; the
// core never sees a `web_sys` type.
//
//=========================================================================

//=== External Dependencies ===============================================

use std::fmt;

use thiserror::Error;

//=== Internal Dependencies ===============================================

use crate::core::input::event::{KeyCode, PointerPhase, RawPointer};

//=== ViewportMetrics =====================================================

/// Raw browser viewport readings taken at event time.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ViewportMetrics {
    /// `window.innerWidth` in CSS pixels.
    pub width: f64,
    /// `window.innerHeight` in CSS pixels.
    pub height: f64,
    pub device_pixel_ratio: f64,
    pub scroll_x: f64,
    pub scroll_y: f64,
}

//=== PlatformEvent =======================================================

/// Events posted by the DOM glue (and async completions) to the core.
#[derive(Debug, Clone, PartialEq)]
pub enum PlatformEvent {
    /// Viewport resized (or initial measurement / deferred retry).
    Resized(ViewportMetrics),

    /// Page scrolled without a resize.
    Scrolled { scroll_x: f64, scroll_y: f64 },

    /// Document visibility flipped. `timestamp` is `performance.now()`.
    VisibilityChanged { visible: bool, timestamp: f64 },

    /// Single-pointer source (pointer events or mouse).
    Pointer { phase: PointerPhase, pointer: RawPointer },

    /// Multi-touch source: the event's changed-touch list.
    Touches { phase: PointerPhase, touches: Vec<RawPointer> },

    /// Keyboard event (unmapped keys are dropped by the glue).
    Key { key: KeyCode, pressed: bool, repeat: bool },

    /// Reply to the startup read of the persisted resolution override.
    StoredResolution(Option<String>),

    /// User-requested resolution multiplier.
    ResolutionRequested(f64),

    /// Tear everything down.
    Shutdown,
}

//=== PlatformError =======================================================

/// Startup and configuration errors.
///
/// Only returned before any listener is attached; steady-state handling
/// never fails.
#[derive(Debug, Error)]
pub enum PlatformError {
    /// A required browser capability is missing.
    #[error("unsupported environment: {capability} is not available")]
    Unsupported { capability: &'static str },

    /// Entry configuration rejected.
    #[error("invalid configuration: {0}")]
    InvalidConfig(String),

    /// A DOM call failed during startup.
    #[error("browser call failed: {0}")]
    Js(String),
}

//=== AssetError ==========================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum AssetKind {
    Image,
    Audio,
}

impl fmt::Display for AssetKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Image => write!(f, "image"),
            Self::Audio => write!(f, "audio"),
        }
    }
}

/// Asset load failure. Not retried; the slot stays failed.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("failed to load {kind} file {name}: {reason}")]
pub struct AssetError {
    pub kind: AssetKind,
    pub name: String,
    pub reason: String,
}

impl AssetError {
    pub fn new(kind: AssetKind, name: impl Into<String>, reason: impl Into<String>) -> Self {
        Self {
            kind,
            name: name.into(),
            reason: reason.into(),
        }
    }
}

//=========================================================================
// Unit Tests
//=========================================================================
