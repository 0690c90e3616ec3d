//=========================================================================
// Frame Clock
//=========================================================================
//
// Gap-corrected, monotonic game time for the animation-frame loop.
//
// Architecture:
//   rAF timestamp ─► on_frame() ─► now - init_time - not_visible ─► engine
//                        ▲
//   visibilitychange ─► set_visibility() ─► pending gap (folded in on the
//                                           next visible frame)
//
// Responsibilities:
// - Report exactly one frame interval on the first frame
// - Withhold time while the page is hidden
// - Remove hidden intervals so the game never jumps forward
// - Go inert on cleanup so a late frame callback is a no-op
//
//=========================================================================

//=== External Dependencies ===============================================

use log::debug;

//=== AudioCommand ========================================================

/// Audio context transitions issued alongside visibility changes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AudioCommand {
    Suspend,
    Resume,
}

/// Issued when the page is hidden.
pub const SUSPEND_SEQUENCE: &[AudioCommand] = &[AudioCommand::Suspend];

/// Issued when the page becomes visible again. Some mobile browsers leave
/// the context silent after a single resume; cycling it once more fixes it.
pub const RESUME_SEQUENCE: &[AudioCommand] =
    &[AudioCommand::Resume, AudioCommand::Suspend, AudioCommand::Resume];

/// Audio commands for a visibility transition.
pub fn audio_commands_for(visible: bool) -> &'static [AudioCommand] {
    if visible {
        RESUME_SEQUENCE
    } else {
        SUSPEND_SEQUENCE
    }
}

//=== ClockState ==========================================================

/// All times in milliseconds on the `performance.now()` timeline.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ClockState {
    /// Set on the first visible frame.
    pub init_time: Option<f64>,
    pub last_visible_time: Option<f64>,
    pub is_page_visible: bool,
    /// Total hidden time already subtracted from reported values.
    pub not_visible_accumulator: f64,
    /// Hidden time waiting to be folded in on the next visible frame.
    pub pending_visibility_gap: f64,
    pub hidden_since: Option<f64>,
    pub last_reported: f64,
    pub is_inert: bool,
}

//=== FrameClock ==========================================================

pub struct FrameClock {
    frame_interval: f64,
    state: ClockState,
}

impl FrameClock {
    /// # Panics
    ///
    /// Panics if `target_fps` is not positive.
    pub fn new(target_fps: f64) -> Self {
        assert!(target_fps > 0.0, "Target FPS must be positive");

        Self {
            frame_interval: 1000.0 / target_fps,
            state: ClockState {
                init_time: None,
                last_visible_time: None,
                is_page_visible: true,
                not_visible_accumulator: 0.0,
                pending_visibility_gap: 0.0,
                hidden_since: None,
                last_reported: 0.0,
                is_inert: false,
            },
        }
    }

    //--- Frame Step -------------------------------------------------------

    /// Corrected elapsed time for an animation frame, or `None` when the
    /// engine must not step (page hidden, clock inert).
    pub fn on_frame(&mut self, timestamp: f64) -> Option<f64> {
        let state = &mut self.state;

        if state.is_inert || !state.is_page_visible {
            return None;
        }

        if state.pending_visibility_gap > 0.0 {
            state.not_visible_accumulator += state.pending_visibility_gap;
            state.pending_visibility_gap = 0.0;
        }

        let init_time = *state.init_time.get_or_insert(timestamp - self.frame_interval);

        let elapsed =
            (timestamp - init_time - state.not_visible_accumulator).max(state.last_reported);

        state.last_reported = elapsed;
        state.last_visible_time = Some(timestamp);

        Some(elapsed)
    }

    //--- Visibility -------------------------------------------------------

    /// Records a visibility transition. Returns `false` if nothing changed.
    pub fn set_visibility(&mut self, visible: bool, timestamp: f64) -> bool {
        let state = &mut self.state;

        if state.is_page_visible == visible {
            return false;
        }
        state.is_page_visible = visible;

        if !visible {
            state.hidden_since = Some(timestamp);
            debug!(target: "clock", "Page hidden at {:.1}ms", timestamp);
            return true;
        }

        if let Some(since) = state.hidden_since.take() {
            // Time hidden before the clock started is never counted anyway
            if state.init_time.is_some() {
                state.pending_visibility_gap += (timestamp - since).max(0.0);
            }
            debug!(
                target: "clock",
                "Page visible at {:.1}ms after {:.1}ms hidden",
                timestamp,
                timestamp - since
            );
        }
        true
    }

    //--- Lifecycle --------------------------------------------------------

    pub fn make_inert(&mut self) {
        self.state.is_inert = true;
    }

    //--- Accessors --------------------------------------------------------

    pub fn state(&self) -> ClockState {
        self.state
    }

    /// Milliseconds per frame at the target rate.
    pub fn frame_interval(&self) -> f64 {
        self.frame_interval
    }

    pub fn is_page_visible(&self) -> bool {
        self.state.is_page_visible
    }

    pub fn is_inert(&self) -> bool {
        self.state.is_inert
    }
}

//=========================================================================
// Unit Tests
//=========================================================================
