//=========================================================================
// Pointer Dispatcher
//=========================================================================
//
// Unifies single-pointer (pointer events, mouse) and multi-touch sources
// into one multi-pointer model with per-pointer identity and engine focus.
//
// Architecture:
//   RawPointer ─► Geometry.transform ─► game (x, y) ─► bounds check
//                                                         │
//            ┌────────────────────────────────────────────┘
//            ▼
//   records: PointerId → PointerRecord      is_in_focus
//            │                                   │
//            └──► InputEvent ──► InputState ◄────┘ (gates keyboard)
//
// Per-pointer lifecycle:
//   absent ─down(in)─► held ─move─► held ─up(in)──► absent  (PointerUp)
//                        │              └─up(out)─► absent  (PointerCancel)
//                        └─cancel──────────────────► absent  (PointerCancel)
//   absent ─down(out)─► absent   (single pointer: clears focus)
//
// Responsibilities:
// - Convert every sample through the current geometry (never a cached one)
// - Filter out-of-bounds downs and moves
// - Treat "drag out and release" as abandonment, not a click
// - Gate keyboard input on focus and drop auto-repeat key-downs
//
//=========================================================================

//=== Standard Library Imports ============================================

use std::collections::HashMap;

//=== External Dependencies ===============================================

use log::trace;

//=== Internal Dependencies ===============================================

use super::event::{InputEvent, KeyCode, PointerId, PointerPhase, RawPointer};
use super::input_state::{InputState, PointerSample};
use crate::core::geometry::Geometry;

//=== InputMode ===========================================================

/// Which DOM event family feeds the dispatcher, resolved once at startup.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum InputMode {
    /// Unified `PointerEvent`s (mouse, pen and touch).
    Pointer,

    /// Legacy `TouchEvent` multi-touch plus `MouseEvent`.
    TouchAndMouse,
}

//=== PointerRecord =======================================================

/// Last accepted game-space position of a held pointer.
///
/// `in_bounds` turns false while the pointer is dragged outside the play
/// area; the coordinates then keep their last in-bounds value.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PointerRecord {
    pub x: f64,
    pub y: f64,
    pub in_bounds: bool,
}

//--- Source ---------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Source {
    Single,
    Touch,
}

//=== PointerDispatcher ===================================================

pub struct PointerDispatcher {
    mode: InputMode,
    records: HashMap<PointerId, PointerRecord>,
    is_in_focus: bool,
}

impl PointerDispatcher {
    pub fn new(mode: InputMode) -> Self {
        Self {
            mode,
            records: HashMap::new(),
            is_in_focus: true,
        }
    }

    //--- Pointer Sources --------------------------------------------------

    /// Handles one sample from a single-pointer source.
    pub fn pointer(
        &mut self,
        phase: PointerPhase,
        raw: RawPointer,
        geometry: &Geometry,
        state: &mut InputState,
    ) {
        self.dispatch(Source::Single, phase, raw, geometry, state);
    }

    /// Handles the changed-touch list of one touch event. Each touch is
    /// bounds-checked on its own.
    pub fn touches(
        &mut self,
        phase: PointerPhase,
        touches: &[RawPointer],
        geometry: &Geometry,
        state: &mut InputState,
    ) {
        for raw in touches {
            self.dispatch(Source::Touch, phase, *raw, geometry, state);
        }
    }

    fn dispatch(
        &mut self,
        source: Source,
        phase: PointerPhase,
        raw: RawPointer,
        geometry: &Geometry,
        state: &mut InputState,
    ) {
        let (x, y) = geometry.transform.platform_to_game(raw.client_x, raw.client_y);
        let in_bounds = geometry.size.contains(x, y);
        let id = raw.id;

        trace!(
            target: "input",
            "{:?} {:?} at ({:.1}, {:.1}) in_bounds={}",
            phase,
            id,
            x,
            y,
            in_bounds
        );

        match phase {
            PointerPhase::Down => {
                if !in_bounds {
                    if source == Source::Single {
                        self.set_focus(false, state);
                    }
                    return;
                }
                self.set_focus(true, state);
                self.records.insert(id, PointerRecord { x, y, in_bounds: true });
                state.apply(&InputEvent::PointerDown { id, x, y });
            }

            PointerPhase::Move => match self.records.get_mut(&id) {
                Some(record) => {
                    record.in_bounds = in_bounds;
                    if in_bounds {
                        record.x = x;
                        record.y = y;
                        state.apply(&InputEvent::PointerMove { id, x, y });
                    }
                }
                // Hover: a mouse moving with no button held
                None if in_bounds && source == Source::Single => {
                    state.apply(&InputEvent::PointerMove { id, x, y });
                }
                None => {}
            },

            PointerPhase::Up => {
                if self.records.remove(&id).is_none() {
                    return;
                }
                if in_bounds {
                    state.apply(&InputEvent::PointerUp { id, x, y });
                } else {
                    state.apply(&InputEvent::PointerCancel { id });
                }
            }

            PointerPhase::Cancel => {
                if self.records.remove(&id).is_some() {
                    state.apply(&InputEvent::PointerCancel { id });
                }
            }
        }
    }

    //--- Keyboard ---------------------------------------------------------

    pub fn key(&mut self, key: KeyCode, pressed: bool, repeat: bool, state: &mut InputState) {
        if !self.is_in_focus {
            trace!(target: "input", "Ignoring {:?} while unfocused", key);
            return;
        }
        if pressed && repeat {
            return;
        }

        let event = if pressed {
            InputEvent::KeyDown { key }
        } else {
            InputEvent::KeyUp { key }
        };
        state.apply(&event);
    }

    //--- Focus ------------------------------------------------------------

    /// Losing focus releases held keys; their key-ups would be ignored.
    fn set_focus(&mut self, focused: bool, state: &mut InputState) {
        if self.is_in_focus && !focused {
            trace!(target: "input", "Focus lost");
            state.release_all_keys();
        }
        self.is_in_focus = focused;
    }

    //--- Lifecycle --------------------------------------------------------

    /// Cancels every held pointer, e.g. on teardown.
    pub fn cancel_all(&mut self, state: &mut InputState) {
        let mut ids: Vec<_> = self.records.drain().map(|(id, _)| id).collect();
        ids.sort();
        for id in ids {
            state.apply(&InputEvent::PointerCancel { id });
        }
    }

    //--- Accessors --------------------------------------------------------

    pub fn mode(&self) -> InputMode {
        self.mode
    }

    pub fn is_in_focus(&self) -> bool {
        self.is_in_focus
    }

    pub fn record(&self, id: PointerId) -> Option<&PointerRecord> {
        self.records.get(&id)
    }

    pub fn active_count(&self) -> usize {
        self.records.len()
    }

    /// Held pointers that are currently inside the play area.
    pub fn active_samples(&self) -> Vec<PointerSample> {
        self.records
            .iter()
            .filter(|(_, r)| r.in_bounds)
            .map(|(&id, r)| PointerSample { id, x: r.x, y: r.y })
            .collect()
    }
}

//=========================================================================
// Unit Tests
//=========================================================================
