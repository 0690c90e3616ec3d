//=========================================================================
// Resize Retry
//=========================================================================

//=== External Dependencies ===============================================

use crossbeam_channel::Sender;
use gloo_timers::callback::Timeout;
use log::trace;
use web_sys::Window;

//=== Internal Dependencies ===============================================

use crate::core::collaborators::ResizeScheduler;
use crate::core::platform_bridge::PlatformEvent;
use crate::core::viewport::post;

use super::dom_events::read_metrics;

//=== TimeoutScheduler ====================================================

/// Re-measures the window after a delay and queues the result as a
/// resize. Only the latest pending retry is kept.
pub(crate) struct TimeoutScheduler {
    window: Window,
    sender: Sender<PlatformEvent>,
    pending: Option<Timeout>,
}

impl TimeoutScheduler {
    pub(crate) fn new(window: &Window, sender: Sender<PlatformEvent>) -> Self {
        Self {
            window: window.clone(),
            sender,
            pending: None,
        }
    }
}

impl ResizeScheduler for TimeoutScheduler {
    fn schedule_resize(&mut self, delay_ms: u32) {
        let window = self.window.clone();
        let sender = self.sender.clone();

        trace!(target: "platform", "Re-measuring viewport in {}ms", delay_ms);

        // Replacing the handle cancels the previous timeout
        self.pending = Some(Timeout::new(delay_ms, move || {
            post(&sender, PlatformEvent::Resized(read_metrics(&window)));
        }));
    }
}
