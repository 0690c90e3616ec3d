//=========================================================================
// Input State
//
// Per-frame input view handed to the engine.
//
// Architecture:
//   InputEvent → apply() → held keys + this-frame deltas → snapshot()
//
// Held keys and the hover position persist across frames; pressed,
// released and cancelled lists only live until the engine calls
// `reset_inputs` at the end of its frame step.
//
//=========================================================================

//=== Standard Library Imports ============================================

use std::collections::HashSet;

//=== Internal Dependencies ===============================================

use super::event::{InputEvent, KeyCode, PointerId};

//=== PointerSample =======================================================

/// A pointer position in game units.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PointerSample {
    pub id: PointerId,
    pub x: f64,
    pub y: f64,
}

//=== InputSnapshot =======================================================

/// Owned copy of the input state for one engine frame.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct InputSnapshot {
    pub keys_down: HashSet<KeyCode>,
    pub keys_pressed: HashSet<KeyCode>,
    pub keys_released: HashSet<KeyCode>,

    /// Pointers currently held inside the play area, ordered by id.
    pub active_pointers: Vec<PointerSample>,
    pub pointers_pressed: Vec<PointerSample>,
    pub pointers_released: Vec<PointerSample>,
    pub pointers_cancelled: Vec<PointerId>,

    /// Last in-bounds pointer position (hover included).
    pub pointer_position: Option<(f64, f64)>,
    pub pointer_moved: bool,
}

impl InputSnapshot {
    pub fn is_key_down(&self, key: KeyCode) -> bool {
        self.keys_down.contains(&key)
    }

    pub fn is_key_pressed(&self, key: KeyCode) -> bool {
        self.keys_pressed.contains(&key)
    }

    pub fn is_key_released(&self, key: KeyCode) -> bool {
        self.keys_released.contains(&key)
    }
}

//=== InputState ==========================================================

#[derive(Debug, Default)]
pub struct InputState {
    keys_down: HashSet<KeyCode>,
    keys_pressed_this_frame: HashSet<KeyCode>,
    keys_released_this_frame: HashSet<KeyCode>,

    pointers_pressed_this_frame: Vec<PointerSample>,
    pointers_released_this_frame: Vec<PointerSample>,
    pointers_cancelled_this_frame: Vec<PointerId>,

    pointer_position: Option<(f64, f64)>,
    pointer_moved: bool,
}

impl InputState {
    pub fn new() -> Self {
        Self::default()
    }

    //--- Event Processing -------------------------------------------------

    pub fn apply(&mut self, event: &InputEvent) {
        match *event {
            InputEvent::KeyDown { key } => {
                if self.keys_down.insert(key) {
                    self.keys_pressed_this_frame.insert(key);
                }
            }
            InputEvent::KeyUp { key } => {
                if self.keys_down.remove(&key) {
                    self.keys_released_this_frame.insert(key);
                }
            }
            InputEvent::PointerDown { id, x, y } => {
                self.pointers_pressed_this_frame.push(PointerSample { id, x, y });
                self.pointer_position = Some((x, y));
            }
            InputEvent::PointerMove { x, y, .. } => {
                self.pointer_position = Some((x, y));
                self.pointer_moved = true;
            }
            InputEvent::PointerUp { id, x, y } => {
                self.pointers_released_this_frame.push(PointerSample { id, x, y });
                self.pointer_position = Some((x, y));
            }
            InputEvent::PointerCancel { id } => {
                self.pointers_cancelled_this_frame.push(id);
            }
        }
    }

    /// Releases every held key, recording each as released this frame.
    pub fn release_all_keys(&mut self) {
        self.keys_released_this_frame.extend(self.keys_down.drain());
    }

    /// Clears per-frame deltas. Held keys and hover position survive.
    pub fn clear(&mut self) {
        self.keys_pressed_this_frame.clear();
        self.keys_released_this_frame.clear();
        self.pointers_pressed_this_frame.clear();
        self.pointers_released_this_frame.clear();
        self.pointers_cancelled_this_frame.clear();
        self.pointer_moved = false;
    }

    //--- Queries ----------------------------------------------------------

    pub fn is_key_down(&self, key: KeyCode) -> bool {
        self.keys_down.contains(&key)
    }

    pub fn pointer_position(&self) -> Option<(f64, f64)> {
        self.pointer_position
    }

    pub fn snapshot(&self, mut active_pointers: Vec<PointerSample>) -> InputSnapshot {
        active_pointers.sort_by_key(|p| p.id);

        InputSnapshot {
            keys_down: self.keys_down.clone(),
            keys_pressed: self.keys_pressed_this_frame.clone(),
            keys_released: self.keys_released_this_frame.clone(),
            active_pointers,
            pointers_pressed: self.pointers_pressed_this_frame.clone(),
            pointers_released: self.pointers_released_this_frame.clone(),
            pointers_cancelled: self.pointers_cancelled_this_frame.clone(),
            pointer_position: self.pointer_position,
            pointer_moved: self.pointer_moved,
        }
    }
}

//=========================================================================
// Unit Tests
//=========================================================================

#[cfg(test)]
mod tests {
    use super::*;

    fn down(id: i32, x: f64, y: f64) -> InputEvent {
        InputEvent::PointerDown { id: PointerId(id), x, y }
    }

    //=====================================================================
    // Keyboard
    //=====================================================================

    #[test]
    fn key_press_and_release_within_frame() {
        let mut state = InputState::new();
        state.apply(&InputEvent::KeyDown { key: KeyCode::KeyA });

        let snap = state.snapshot(Vec::new());
        assert!(snap.is_key_pressed(KeyCode::KeyA));
        assert!(snap.is_key_down(KeyCode::KeyA));

        state.clear();
        state.apply(&InputEvent::KeyUp { key: KeyCode::KeyA });

        let snap = state.snapshot(Vec::new());
        assert!(!snap.is_key_pressed(KeyCode::KeyA));
        assert!(!snap.is_key_down(KeyCode::KeyA));
        assert!(snap.is_key_released(KeyCode::KeyA));
    }

    #[test]
    fn held_key_survives_clear() {
        let mut state = InputState::new();
        state.apply(&InputEvent::KeyDown { key: KeyCode::Space });
        state.clear();

        assert!(state.is_key_down(KeyCode::Space));
        assert!(!state.snapshot(Vec::new()).is_key_pressed(KeyCode::Space));
    }

    #[test]
    fn key_up_without_down_is_ignored() {
        let mut state = InputState::new();
        state.apply(&InputEvent::KeyUp { key: KeyCode::KeyQ });

        assert!(!state.snapshot(Vec::new()).is_key_released(KeyCode::KeyQ));
    }

    #[test]
    fn release_all_keys_marks_released() {
        let mut state = InputState::new();
        state.apply(&InputEvent::KeyDown { key: KeyCode::KeyW });
        state.apply(&InputEvent::KeyDown { key: KeyCode::KeyD });

        state.release_all_keys();

        let snap = state.snapshot(Vec::new());
        assert!(snap.keys_down.is_empty());
        assert!(snap.is_key_released(KeyCode::KeyW));
        assert!(snap.is_key_released(KeyCode::KeyD));
    }

    //=====================================================================
    // Pointers
    //=====================================================================

    #[test]
    fn pointer_deltas_clear_but_position_survives() {
        let mut state = InputState::new();
        state.apply(&down(1, 10.0, 20.0));
        state.apply(&InputEvent::PointerMove { id: PointerId(1), x: 12.0, y: 22.0 });

        let snap = state.snapshot(Vec::new());
        assert_eq!(snap.pointers_pressed.len(), 1);
        assert!(snap.pointer_moved);
        assert_eq!(snap.pointer_position, Some((12.0, 22.0)));

        state.clear();

        let snap = state.snapshot(Vec::new());
        assert!(snap.pointers_pressed.is_empty());
        assert!(!snap.pointer_moved);
        assert_eq!(snap.pointer_position, Some((12.0, 22.0)));
    }

    #[test]
    fn cancel_does_not_move_position() {
        let mut state = InputState::new();
        state.apply(&down(1, 1.0, 1.0));
        state.apply(&InputEvent::PointerCancel { id: PointerId(1) });

        let snap = state.snapshot(Vec::new());
        assert_eq!(snap.pointers_cancelled, vec![PointerId(1)]);
        assert_eq!(snap.pointer_position, Some((1.0, 1.0)));
    }

    #[test]
    fn snapshot_orders_active_pointers() {
        let state = InputState::new();
        let snap = state.snapshot(vec![
            PointerSample { id: PointerId(7), x: 0.0, y: 0.0 },
            PointerSample { id: PointerId(2), x: 0.0, y: 0.0 },
        ]);

        let ids: Vec<_> = snap.active_pointers.iter().map(|p| p.id).collect();
        assert_eq!(ids, vec![PointerId(2), PointerId(7)]);
    }
}
