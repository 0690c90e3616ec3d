//=========================================================================
// DOM Events
//=========================================================================
//
// Converts browser DOM events into `PlatformEvent`s.
//
// Architecture:
//   DOM Event → Closure → PlatformEvent → EventSink (queue + pump)
//
// One stable listener per event type; listeners never see geometry, the
// controller applies the current transform when it drains the queue.
// Every listener is recorded so cleanup can remove it again.
//
//=========================================================================

//=== Standard Library Imports ============================================

use std::rc::Rc;

//=== External Dependencies ===============================================

use log::{debug, trace};
use wasm_bindgen::closure::Closure;
use wasm_bindgen::JsCast;
use web_sys::{
    AddEventListenerOptions, Document, Event, EventTarget, KeyboardEvent, MouseEvent,
    PointerEvent, TouchEvent, TouchList, VisibilityState, Window,
};

//=== Internal Dependencies ===============================================

use crate::core::input::{InputMode, KeyCode, PointerPhase, RawPointer};
use crate::core::platform_bridge::{PlatformError, PlatformEvent, ViewportMetrics};

//=== EventSink ===========================================================

/// Queues an event and pumps the controller if it is not already busy.
pub(crate) type EventSink = Rc<dyn Fn(PlatformEvent)>;

//=== Readings ============================================================

/// Current viewport metrics. Missing values read as zero, which the
/// controller treats as a degenerate viewport and retries.
pub(crate) fn read_metrics(window: &Window) -> ViewportMetrics {
    let number = |value: Result<wasm_bindgen::JsValue, wasm_bindgen::JsValue>| {
        value.ok().and_then(|v| v.as_f64()).unwrap_or(0.0)
    };

    ViewportMetrics {
        width: number(window.inner_width()),
        height: number(window.inner_height()),
        device_pixel_ratio: window.device_pixel_ratio(),
        scroll_x: window.scroll_x().unwrap_or(0.0),
        scroll_y: window.scroll_y().unwrap_or(0.0),
    }
}

pub(crate) fn now(window: &Window) -> f64 {
    window.performance().map(|p| p.now()).unwrap_or(0.0)
}

pub(crate) fn is_visible(document: &Document) -> bool {
    document.visibility_state() == VisibilityState::Visible
}

/// `PointerEvent` support decides the input mode once, at startup.
pub(crate) fn detect_input_mode(window: &Window) -> InputMode {
    let has_pointer_events =
        js_sys::Reflect::has(window, &wasm_bindgen::JsValue::from_str("PointerEvent"))
            .unwrap_or(false);

    if has_pointer_events {
        InputMode::Pointer
    } else {
        InputMode::TouchAndMouse
    }
}

//=== Conversion ==========================================================

fn pointer_phase(kind: &str) -> Option<PointerPhase> {
    match kind {
        "pointerdown" | "mousedown" | "touchstart" => Some(PointerPhase::Down),
        "pointermove" | "mousemove" | "touchmove" => Some(PointerPhase::Move),
        "pointerup" | "mouseup" | "touchend" => Some(PointerPhase::Up),
        "pointercancel" | "touchcancel" => Some(PointerPhase::Cancel),
        _ => None,
    }
}

fn changed_touches(list: &TouchList) -> Vec<RawPointer> {
    (0..list.length())
        .filter_map(|i| list.get(i))
        .map(|t| RawPointer::new(t.identifier(), f64::from(t.client_x()), f64::from(t.client_y())))
        .collect()
}

fn key_event(event: &KeyboardEvent, pressed: bool) -> Option<PlatformEvent> {
    let code = event.code();
    let Some(key) = KeyCode::from_dom_code(&code) else {
        trace!(target: "platform::dom", "Unmapped key code {:?}", code);
        return None;
    };

    Some(PlatformEvent::Key {
        key,
        pressed,
        repeat: event.repeat(),
    })
}

//=== Listener ============================================================

struct Listener {
    target: EventTarget,
    kind: &'static str,
    closure: Closure<dyn FnMut(Event)>,
}

//=== ListenerSet =========================================================

/// Owns every registered DOM listener; removes them on `detach_all` or
/// drop.
#[derive(Default)]
pub(crate) struct ListenerSet {
    listeners: Vec<Listener>,
}

impl ListenerSet {
    //--- Construction -----------------------------------------------------

    /// Registers the full listener set for the chosen input mode.
    pub(crate) fn attach(
        window: &Window,
        document: &Document,
        canvas: &EventTarget,
        mode: InputMode,
        sink: EventSink,
    ) -> Result<Self, PlatformError> {
        let mut set = Self { listeners: Vec::new() };
        let window_target: &EventTarget = window.as_ref();

        //--- Viewport ---------------------------------------------------------

        {
            let sink = sink.clone();
            let window = window.clone();
            set.add(window_target, "resize", false, move |_| {
                sink(PlatformEvent::Resized(read_metrics(&window)))
            })?;
        }
        {
            let sink = sink.clone();
            let window = window.clone();
            set.add(window_target, "scroll", false, move |_| {
                let metrics = read_metrics(&window);
                sink(PlatformEvent::Scrolled {
                    scroll_x: metrics.scroll_x,
                    scroll_y: metrics.scroll_y,
                })
            })?;
        }
        {
            let sink = sink.clone();
            let window = window.clone();
            let doc = document.clone();
            set.add(document.as_ref(), "visibilitychange", false, move |_| {
                sink(PlatformEvent::VisibilityChanged {
                    visible: is_visible(&doc),
                    timestamp: now(&window),
                })
            })?;
        }

        //--- Keyboard ---------------------------------------------------------

        for (kind, pressed) in [("keydown", true), ("keyup", false)] {
            let sink = sink.clone();
            set.add(window_target, kind, false, move |e: Event| {
                let event = e.dyn_ref::<KeyboardEvent>().and_then(|k| key_event(k, pressed));
                if let Some(event) = event {
                    sink(event);
                }
            })?;
        }

        //--- Pointers ---------------------------------------------------------

        match mode {
            InputMode::Pointer => {
                for kind in ["pointerdown", "pointermove", "pointerup", "pointercancel"] {
                    let Some(phase) = pointer_phase(kind) else { continue };
                    let sink = sink.clone();
                    set.add(window_target, kind, false, move |e: Event| {
                        if let Some(p) = e.dyn_ref::<PointerEvent>() {
                            sink(PlatformEvent::Pointer {
                                phase,
                                pointer: RawPointer::new(
                                    p.pointer_id(),
                                    f64::from(p.client_x()),
                                    f64::from(p.client_y()),
                                ),
                            });
                        }
                    })?;
                }
            }

            InputMode::TouchAndMouse => {
                for kind in ["touchstart", "touchmove", "touchend", "touchcancel"] {
                    let Some(phase) = pointer_phase(kind) else { continue };
                    let sink = sink.clone();
                    let canvas = canvas.clone();
                    // Non-passive so touches on the canvas can suppress the
                    // emulated mouse events and page scrolling
                    set.add(window_target, kind, true, move |e: Event| {
                        let Some(t) = e.dyn_ref::<TouchEvent>() else { return };
                        if e.target().as_ref() == Some(&canvas) {
                            e.prevent_default();
                        }
                        sink(PlatformEvent::Touches {
                            phase,
                            touches: changed_touches(&t.changed_touches()),
                        });
                    })?;
                }
                for kind in ["mousedown", "mousemove", "mouseup"] {
                    let Some(phase) = pointer_phase(kind) else { continue };
                    let sink = sink.clone();
                    set.add(window_target, kind, false, move |e: Event| {
                        if let Some(m) = e.dyn_ref::<MouseEvent>() {
                            sink(PlatformEvent::Pointer {
                                phase,
                                pointer: RawPointer::mouse(
                                    f64::from(m.client_x()),
                                    f64::from(m.client_y()),
                                ),
                            });
                        }
                    })?;
                }
            }
        }

        debug!(target: "platform::dom", "Attached {} listeners ({:?})", set.listeners.len(), mode);
        Ok(set)
    }

    fn add(
        &mut self,
        target: &EventTarget,
        kind: &'static str,
        non_passive: bool,
        handler: impl FnMut(Event) + 'static,
    ) -> Result<(), PlatformError> {
        let closure = Closure::<dyn FnMut(Event)>::new(handler);
        let callback: &js_sys::Function = closure.as_ref().unchecked_ref();

        let result = if non_passive {
            let options = AddEventListenerOptions::new();
            options.set_passive(false);
            target.add_event_listener_with_callback_and_add_event_listener_options(
                kind, callback, &options,
            )
        } else {
            target.add_event_listener_with_callback(kind, callback)
        };
        result.map_err(|e| PlatformError::Js(format!("addEventListener({kind}): {e:?}")))?;

        self.listeners.push(Listener {
            target: target.clone(),
            kind,
            closure,
        });
        Ok(())
    }

    //--- Teardown ---------------------------------------------------------

    pub(crate) fn detach_all(&mut self) {
        let count = self.listeners.len();
        for listener in self.listeners.drain(..) {
            let callback: &js_sys::Function = listener.closure.as_ref().unchecked_ref();
            if let Err(e) = listener
                .target
                .remove_event_listener_with_callback(listener.kind, callback)
            {
                debug!(target: "platform::dom", "removeEventListener({}): {:?}", listener.kind, e);
            }
        }
        if count > 0 {
            debug!(target: "platform::dom", "Detached {} listeners", count);
        }
    }
}

impl Drop for ListenerSet {
    fn drop(&mut self) {
        self.detach_all();
    }
}
