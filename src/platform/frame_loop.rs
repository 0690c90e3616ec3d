//=========================================================================
// Frame Loop
//=========================================================================
//
// `requestAnimationFrame` loop driving `ViewportController::on_frame`.
//
// Frames keep being requested while the page is hidden (the controller
// withholds them from the engine) until the callback returns `Exit` or
// `stop` is called.
//
//=========================================================================

//=== Standard Library Imports ============================================

use std::cell::{Cell, RefCell};
use std::rc::Rc;

//=== External Dependencies ===============================================

use log::{debug, error};
use wasm_bindgen::closure::Closure;
use wasm_bindgen::JsCast;
use web_sys::Window;

//=== Internal Dependencies ===============================================

use crate::core::platform_bridge::{PlatformError, TickControl};

//=== FrameLoop ===========================================================

type FrameClosure = Rc<RefCell<Option<Closure<dyn FnMut(f64)>>>>;

pub(crate) struct FrameLoop {
    window: Window,
    running: Rc<Cell<bool>>,
    request_id: Rc<Cell<Option<i32>>>,
    closure: FrameClosure,
}

impl FrameLoop {
    pub(crate) fn start<F>(window: &Window, mut on_frame: F) -> Result<Self, PlatformError>
    where
        F: FnMut(f64) -> TickControl + 'static,
    {
        let running = Rc::new(Cell::new(true));
        let request_id = Rc::new(Cell::new(None));
        let closure: FrameClosure = Rc::new(RefCell::new(None));

        let tick = {
            let window = window.clone();
            let running = running.clone();
            let request_id = request_id.clone();
            let this = closure.clone();

            move |timestamp: f64| {
                request_id.set(None);
                if !running.get() {
                    return;
                }

                if on_frame(timestamp) == TickControl::Exit {
                    running.set(false);
                    debug!(target: "platform", "Frame loop finished");
                    // Dropping a closure from inside itself is not allowed
                    if let Some(done) = this.borrow_mut().take() {
                        wasm_bindgen_futures::spawn_local(async move { drop(done) });
                    }
                    return;
                }

                if let Some(next) = this.borrow().as_ref() {
                    match window.request_animation_frame(next.as_ref().unchecked_ref()) {
                        Ok(id) => request_id.set(Some(id)),
                        Err(e) => {
                            error!(target: "platform", "requestAnimationFrame failed: {:?}", e);
                            running.set(false);
                        }
                    }
                }
            }
        };
        *closure.borrow_mut() = Some(Closure::new(tick));

        let id = match closure.borrow().as_ref() {
            Some(first) => window
                .request_animation_frame(first.as_ref().unchecked_ref())
                .map_err(|e| PlatformError::Js(format!("requestAnimationFrame: {e:?}")))?,
            None => return Err(PlatformError::Js("frame callback missing".into())),
        };
        request_id.set(Some(id));

        Ok(Self {
            window: window.clone(),
            running,
            request_id,
            closure,
        })
    }

    /// Cancels the pending frame and releases the callback.
    pub(crate) fn stop(&mut self) {
        self.running.set(false);
        if let Some(id) = self.request_id.take() {
            let _ = self.window.cancel_animation_frame(id);
        }
        self.closure.borrow_mut().take();
    }

    pub(crate) fn is_running(&self) -> bool {
        self.running.get()
    }
}
