//=========================================================================
// Input Event Types
//
// Defines the portable representation of pointer and keyboard input.
//
// The DOM glue reduces `PointerEvent`, `MouseEvent`, `TouchEvent` and
// `KeyboardEvent` to the raw types here; the dispatcher turns raw input
// into game-space `InputEvent`s.
//
// Responsibilities:
// - Identify pointers uniformly (pointer id, touch identifier, mouse)
// - Represent keyboard keys by physical location
// - Map DOM `KeyboardEvent.code` strings to `KeyCode`
//
// Event Flow:
// ```text
// DOM event (web_sys)
//         ↓
//    RawPointer / KeyCode (this module)
//         ↓
//    PointerDispatcher (bounds, focus, records)
//         ↓
//    InputEvent → InputState (per-frame view for the engine)
// ```
//
//=========================================================================

//=== PointerId ===========================================================

/// Native pointer identity: `PointerEvent.pointerId` or
/// `Touch.identifier`. Plain mouse input uses [`MOUSE_POINTER_ID`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct PointerId(pub i32);

/// Identity used for `MouseEvent` sources, which carry no pointer id.
pub const MOUSE_POINTER_ID: PointerId = PointerId(-1);

//=== PointerPhase ========================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PointerPhase {
    Down,
    Move,
    Up,
    Cancel,
}

//=== RawPointer ==========================================================

/// One pointer sample in browser client coordinates (CSS pixels).
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RawPointer {
    pub id: PointerId,
    pub client_x: f64,
    pub client_y: f64,
}

impl RawPointer {
    pub fn new(id: i32, client_x: f64, client_y: f64) -> Self {
        Self {
            id: PointerId(id),
            client_x,
            client_y,
        }
    }

    pub fn mouse(client_x: f64, client_y: f64) -> Self {
        Self {
            id: MOUSE_POINTER_ID,
            client_x,
            client_y,
        }
    }
}

//=== KeyCode =============================================================

/// Physical keyboard key identifier.
///
/// Represents the physical key location, not the character produced, so
/// `KeyA` is the same key on QWERTY and AZERTY layouts. Names match the
/// DOM `KeyboardEvent.code` values they are parsed from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum KeyCode {
    //--- Numeric Keys -----------------------------------------------------

    Digit0, Digit1, Digit2, Digit3, Digit4,
    Digit5, Digit6, Digit7, Digit8, Digit9,

    //--- Alphabetic Keys --------------------------------------------------

    KeyA, KeyB, KeyC, KeyD, KeyE, KeyF, KeyG, KeyH, KeyI,
    KeyJ, KeyK, KeyL, KeyM, KeyN, KeyO, KeyP, KeyQ, KeyR,
    KeyS, KeyT, KeyU, KeyV, KeyW, KeyX, KeyY, KeyZ,

    //--- Arrow Keys -------------------------------------------------------

    ArrowDown,
    ArrowLeft,
    ArrowRight,
    ArrowUp,

    //--- Special Keys -----------------------------------------------------

    Space,
    Enter,
    Escape,
    Tab,
    Backspace,
    Delete,
    ShiftLeft,
    ShiftRight,
}

impl KeyCode {
    /// Parses a DOM `KeyboardEvent.code` value.
    ///
    /// Returns `None` for keys the engine does not consume; callers drop
    /// those events.
    pub fn from_dom_code(code: &str) -> Option<Self> {
        use KeyCode::*;

        let key = match code {
            "Digit0" => Digit0,
            "Digit1" => Digit1,
            "Digit2" => Digit2,
            "Digit3" => Digit3,
            "Digit4" => Digit4,
            "Digit5" => Digit5,
            "Digit6" => Digit6,
            "Digit7" => Digit7,
            "Digit8" => Digit8,
            "Digit9" => Digit9,

            "KeyA" => KeyA,
            "KeyB" => KeyB,
            "KeyC" => KeyC,
            "KeyD" => KeyD,
            "KeyE" => KeyE,
            "KeyF" => KeyF,
            "KeyG" => KeyG,
            "KeyH" => KeyH,
            "KeyI" => KeyI,
            "KeyJ" => KeyJ,
            "KeyK" => KeyK,
            "KeyL" => KeyL,
            "KeyM" => KeyM,
            "KeyN" => KeyN,
            "KeyO" => KeyO,
            "KeyP" => KeyP,
            "KeyQ" => KeyQ,
            "KeyR" => KeyR,
            "KeyS" => KeyS,
            "KeyT" => KeyT,
            "KeyU" => KeyU,
            "KeyV" => KeyV,
            "KeyW" => KeyW,
            "KeyX" => KeyX,
            "KeyY" => KeyY,
            "KeyZ" => KeyZ,

            "ArrowDown" => ArrowDown,
            "ArrowLeft" => ArrowLeft,
            "ArrowRight" => ArrowRight,
            "ArrowUp" => ArrowUp,

            "Space" => Space,
            "Enter" | "NumpadEnter" => Enter,
            "Escape" => Escape,
            "Tab" => Tab,
            "Backspace" => Backspace,
            "Delete" => Delete,
            "ShiftLeft" => ShiftLeft,
            "ShiftRight" => ShiftRight,

            _ => return None,
        };

        Some(key)
    }
}

//=== InputEvent ==========================================================

/// Input already filtered by bounds and focus, with pointer positions in
/// game units (origin at canvas center, y up).
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum InputEvent {
    PointerDown { id: PointerId, x: f64, y: f64 },
    PointerMove { id: PointerId, x: f64, y: f64 },
    PointerUp { id: PointerId, x: f64, y: f64 },

    /// Pointer abandoned: browser cancel, or released outside the play area.
    PointerCancel { id: PointerId },

    KeyDown { key: KeyCode },
    KeyUp { key: KeyCode },
}

//=========================================================================
// Unit Tests
//=========================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn dom_codes_map_to_physical_keys() {
        assert_eq!(KeyCode::from_dom_code("KeyW"), Some(KeyCode::KeyW));
        assert_eq!(KeyCode::from_dom_code("Digit7"), Some(KeyCode::Digit7));
        assert_eq!(KeyCode::from_dom_code("ArrowUp"), Some(KeyCode::ArrowUp));
        assert_eq!(KeyCode::from_dom_code("Space"), Some(KeyCode::Space));
    }

    #[test]
    fn numpad_enter_is_enter() {
        assert_eq!(KeyCode::from_dom_code("NumpadEnter"), Some(KeyCode::Enter));
    }

    #[test]
    fn unknown_codes_are_dropped() {
        assert_eq!(KeyCode::from_dom_code("F13"), None);
        assert_eq!(KeyCode::from_dom_code(""), None);
        // DOM codes are case-sensitive
        assert_eq!(KeyCode::from_dom_code("keya"), None);
    }

    #[test]
    fn mouse_pointer_uses_reserved_id() {
        let raw = RawPointer::mouse(4.0, 5.0);
        assert_eq!(raw.id, MOUSE_POINTER_ID);
        assert_ne!(RawPointer::new(0, 4.0, 5.0).id, MOUSE_POINTER_ID);
    }
}
