//=========================================================================
// Platform Subsystem (wasm32)
//
// Attaches a `ViewportController` to the browser page.
//
// Architecture:
// ```text
//  Browser:                               Controller (Rc<RefCell<_>>):
//  ┌────────────────────────────────┐    ┌───────────────────────────┐
//  │  DOM listeners (ListenerSet)   │    │  ViewportController       │
//  │   resize/scroll/visibility     │    │   ├─ DeviceSize           │
//  │   pointer | touch+mouse, keys  │    │   ├─ ResolutionController │
//  │   ↓                            │    │   ├─ PointerDispatcher    │
//  │  EventSink ── try_send ────────┼───►│   ├─ FrameClock           │
//  │   └─ try_borrow_mut → pump()   │    │   └─ GameEngine           │
//  │                                │    │          ↑                │
//  │  FrameLoop (rAF) ──────────────┼───►│  on_frame(ts)             │
//  │  Timeout (zero-size retry) ────┼───►│  (queued Resized)         │
//  └────────────────────────────────┘    └───────────────────────────┘
// ```
//
// Key Design Decisions:
// - **Single-threaded**: everything runs on the page's main thread; the
//   channel only decouples DOM dispatch from controller borrows
// - **Re-entrant dispatch**: a listener that fires while the controller is
//   borrowed leaves its event queued for the outer pump
// - **Capability check first**: a missing WebGL context aborts startup
//   before any listener is attached
//
// Responsibilities:
// - Install console logging and the panic hook
// - Acquire the canvas and WebGL context
// - Wire localStorage, AudioContext and the resize retry timer
// - Run the animation-frame loop until cleanup
//
//=========================================================================

//=== Submodules ==========================================================

mod assets;
mod audio;
mod canvas;
mod dom_events;
mod frame_loop;
mod retry;
mod storage;

//=== Standard Library Imports ============================================

use std::cell::RefCell;
use std::rc::Rc;

//=== External Crates =====================================================

use crossbeam_channel::Sender;
use log::*;
use wasm_bindgen_futures::spawn_local;
use web_sys::{AudioContext, Document, HtmlCanvasElement, Window};

//=== Internal Imports ====================================================

use crate::core::collaborators::{GameEngine, StatsHooks};
use crate::core::input::InputMode;
use crate::core::platform_bridge::{PlatformError, PlatformEvent, TickControl};
use crate::core::viewport::{post, Collaborators, ShutdownHandle, ViewportController};
use crate::launcher::Launcher;

use audio::WebAudio;
use dom_events::{detect_input_mode, is_visible, now, read_metrics, EventSink, ListenerSet};
use frame_loop::FrameLoop;
use retry::TimeoutScheduler;
use storage::LocalStorageStore;

pub use assets::{ImageAsset, WebAssetLoader};
pub use canvas::{WebGlHandles, WebGlSurface};

//=== WebPlatform =========================================================

type SharedController<E> = Rc<RefCell<ViewportController<WebGlSurface, E>>>;

/// A running game attached to the page.
///
/// Keep this handle alive for as long as the game runs; dropping it
/// performs [`WebPlatform::cleanup`].
pub struct WebPlatform<E>
where
    E: GameEngine<Handles = WebGlHandles> + 'static,
{
    controller: SharedController<E>,
    sender: Sender<PlatformEvent>,
    shutdown: ShutdownHandle,
    listeners: ListenerSet,
    frames: FrameLoop,
    assets: WebAssetLoader,
}

/// Attaches `engine` to the page described by `launcher` and starts the
/// animation-frame loop.
///
/// # Errors
///
/// - [`PlatformError::Unsupported`] when `window`, `document` or a WebGL
///   context is missing
/// - [`PlatformError::InvalidConfig`] when the configured canvas or parent
///   element cannot be found
/// - [`PlatformError::Js`] when a DOM call fails during startup
pub fn start<E>(launcher: Launcher, engine: E) -> Result<WebPlatform<E>, PlatformError>
where
    E: GameEngine<Handles = WebGlHandles> + 'static,
{
    init_logging(&launcher);

    attach(launcher, engine).map_err(|e| {
        error!(target: "platform", "Startup failed: {}", e);
        e
    })
}

fn attach<E>(launcher: Launcher, engine: E) -> Result<WebPlatform<E>, PlatformError>
where
    E: GameEngine<Handles = WebGlHandles> + 'static,
{
    let window = web_sys::window().ok_or(PlatformError::Unsupported { capability: "window" })?;
    let document = window
        .document()
        .ok_or(PlatformError::Unsupported { capability: "document" })?;

    //--- Capabilities -----------------------------------------------------

    // The WebGL check runs on a detached canvas
    let acquired = canvas::acquire(&document, &launcher.config().canvas)?;
    let canvas = acquired.canvas.clone();
    let surface = WebGlSurface::new(&window, canvas.clone())?;
    acquired.attach()?;
    let input_mode = detect_input_mode(&window);

    let audio_context = match AudioContext::new() {
        Ok(context) => Some(context),
        Err(e) => {
            warn!(target: "platform", "AudioContext unavailable: {:?}", e);
            None
        }
    };

    //--- Controller -------------------------------------------------------

    let (sender, receiver) = launcher.channel();
    let parts = Collaborators {
        surface,
        engine,
        store: Box::new(LocalStorageStore::new(&window)),
        audio: Box::new(WebAudio::new(audio_context.clone())),
        scheduler: Box::new(TimeoutScheduler::new(&window, sender.clone())),
        stats: StatsHooks::default(),
    };

    let mut controller = launcher.into_controller(input_mode, (sender.clone(), receiver), parts);
    controller.start(read_metrics(&window));
    if !is_visible(&document) {
        controller.on_visibility(false, now(&window));
    }
    let shutdown = controller.shutdown_handle();
    let controller: SharedController<E> = Rc::new(RefCell::new(controller));

    //--- DOM Wiring -------------------------------------------------------

    let wired = wire(&window, &document, &canvas, input_mode, &sender, &controller);
    let (listeners, frames) = match wired {
        Ok(wired) => wired,
        Err(e) => {
            if let Ok(mut controller) = controller.try_borrow_mut() {
                controller.cleanup();
            }
            acquired.detach();
            return Err(e);
        }
    };

    info!(target: "platform", "Web platform running ({:?})", input_mode);

    Ok(WebPlatform {
        controller,
        sender,
        shutdown,
        listeners,
        frames,
        assets: WebAssetLoader::new(&window, audio_context),
    })
}

fn wire<E>(
    window: &Window,
    document: &Document,
    canvas: &HtmlCanvasElement,
    input_mode: InputMode,
    sender: &Sender<PlatformEvent>,
    controller: &SharedController<E>,
) -> Result<(ListenerSet, FrameLoop), PlatformError>
where
    E: GameEngine<Handles = WebGlHandles> + 'static,
{
    let sink: EventSink = {
        let sender = sender.clone();
        let weak = Rc::downgrade(controller);
        Rc::new(move |event| {
            post(&sender, event);
            if let Some(controller) = weak.upgrade() {
                if let Ok(mut controller) = controller.try_borrow_mut() {
                    controller.pump();
                }
            }
        })
    };
    let listeners = ListenerSet::attach(window, document, canvas.as_ref(), input_mode, sink)?;

    let frames = {
        let weak = Rc::downgrade(controller);
        FrameLoop::start(window, move |timestamp| {
            let Some(controller) = weak.upgrade() else {
                return TickControl::Exit;
            };
            let result = controller.try_borrow_mut();
            match result {
                Ok(mut controller) => controller.on_frame(timestamp),
                Err(_) => TickControl::Continue,
            }
        })?
    };

    Ok((listeners, frames))
}

impl<E> WebPlatform<E>
where
    E: GameEngine<Handles = WebGlHandles> + 'static,
{
    /// Sets the user resolution multiplier (clamped, persisted) and
    /// resizes immediately. Returns the multiplier in effect, or `None`
    /// when called from inside a frame and the request was queued.
    pub fn set_resolution(&self, multiplier: f64) -> Option<f64> {
        match self.controller.try_borrow_mut() {
            Ok(mut controller) => Some(controller.set_resolution(multiplier)),
            Err(_) => {
                post(&self.sender, PlatformEvent::ResolutionRequested(multiplier));
                None
            }
        }
    }

    pub fn resolution_multiplier(&self) -> Option<f64> {
        self.controller
            .try_borrow()
            .ok()
            .map(|controller| controller.resolution().multiplier())
    }

    pub fn assets(&self) -> &WebAssetLoader {
        &self.assets
    }

    /// Queue into the controller, for host code that wants to post events.
    pub fn sender(&self) -> Sender<PlatformEvent> {
        self.sender.clone()
    }

    pub fn controller(&self) -> &SharedController<E> {
        &self.controller
    }

    pub fn is_running(&self) -> bool {
        self.frames.is_running()
    }

    /// Removes every listener, cancels the pending frame and tells the
    /// engine it has seen its last frame. Idempotent.
    ///
    /// Called from inside a frame or DOM dispatch, the controller is busy:
    /// the listeners are released once the current callback returns and
    /// the frame loop stays alive until its next frame performs the
    /// cleanup.
    pub fn cleanup(&mut self) {
        match self.controller.try_borrow_mut() {
            Ok(mut controller) => {
                self.listeners.detach_all();
                self.frames.stop();
                controller.cleanup();
            }
            Err(_) => {
                debug!(target: "platform", "Controller busy, deferring cleanup");
                self.shutdown.request();

                // A listener may be the closure currently executing
                let mut listeners = std::mem::take(&mut self.listeners);
                spawn_local(async move { listeners.detach_all() });
            }
        }
    }
}

impl<E> Drop for WebPlatform<E>
where
    E: GameEngine<Handles = WebGlHandles> + 'static,
{
    fn drop(&mut self) {
        self.cleanup();
    }
}

//=== Logging =============================================================

fn init_logging(launcher: &Launcher) {
    console_error_panic_hook::set_once();

    let filter = launcher.config().log_level().unwrap_or(LevelFilter::Info);
    let Some(level) = filter.to_level() else {
        log::set_max_level(LevelFilter::Off);
        return;
    };

    if console_log::init_with_level(level).is_err() {
        debug!(target: "platform", "Logger already installed, keeping it");
    }
}
