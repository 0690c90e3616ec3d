//=========================================================================
// Event Collector
//=========================================================================
//
// Core-side drain of the platform event queue, with bounded polling and
// shutdown detection.
//
// Architecture:
//   Receiver<PlatformEvent> → collect() → pending events → TickControl
//
// Bounded draining keeps a flood of pointer moves from monopolising a
// single browser callback; the remainder is picked up by the next pump.
//
//=========================================================================

//=== External Dependencies ===============================================

use crossbeam_channel::{Receiver, TryRecvError};
use log::warn;

//=== Internal Dependencies ===============================================

use super::PlatformEvent;

//=== TickControl =========================================================

/// Loop control signal for pumps and animation frames.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TickControl {
    Continue,
    Exit,
}

//=== EventCollector ======================================================

pub(crate) struct EventCollector {
    receiver: Receiver<PlatformEvent>,
    pending: Vec<PlatformEvent>,
}

impl EventCollector {
    pub(crate) const MAX_EVENTS_PER_PUMP: usize = 256;

    pub(crate) fn new(receiver: Receiver<PlatformEvent>) -> Self {
        Self {
            receiver,
            pending: Vec::with_capacity(16),
        }
    }

    /// Moves queued events into the pending list.
    ///
    /// Returns `Exit` once `Shutdown` is seen or when every sender is gone.
    /// `Shutdown` is kept as the last pending event so the owner tears down
    /// after applying what was queued before it; later events are left
    /// unread.
    pub(crate) fn collect(&mut self) -> TickControl {
        self.pending.clear();
        let mut drained = 0;

        while drained < Self::MAX_EVENTS_PER_PUMP {
            match self.receiver.try_recv() {
                Ok(PlatformEvent::Shutdown) => {
                    self.pending.push(PlatformEvent::Shutdown);
                    return TickControl::Exit;
                }
                Ok(event) => {
                    self.pending.push(event);
                    drained += 1;
                }
                Err(TryRecvError::Disconnected) => return TickControl::Exit,
                Err(TryRecvError::Empty) => break,
            }
        }

        if drained >= Self::MAX_EVENTS_PER_PUMP {
            warn!(target: "platform", "Event queue backlog: drained {} events this pump", drained);
        }

        TickControl::Continue
    }

    /// Takes the collected events, leaving an empty list.
    pub(crate) fn take_events(&mut self) -> Vec<PlatformEvent> {
        std::mem::take(&mut self.pending)
    }
}

//=========================================================================
// Unit Tests
//=========================================================================
