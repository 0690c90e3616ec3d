//=========================================================================
// Viewport Controller
//=========================================================================
//
// Orchestrates geometry, resolution, input and frame timing for the one
// game canvas on the page.
//
// Architecture:
// ```text
//   DOM listeners ──try_send──► Sender<PlatformEvent>
//                                      │
//                                      ▼
//   pump() ◄── EventCollector ◄── Receiver
//     ├─ Resized ──► DeviceSize::compute ─► ResolutionController
//     │                 ─► RenderSurface::resize ─► CoordinateTransform
//     │                 ─► Geometry (swapped whole) ─► GameEngine::platform_changed
//     ├─ Scrolled ─► transform rebuilt, DeviceSize retained
//     ├─ Pointer / Touches / Key ─► PointerDispatcher ─► InputState
//     ├─ VisibilityChanged ─► FrameClock + AudioControl
//     └─ StoredResolution / ResolutionRequested ─► ResolutionController
//
//   on_frame(ts) ─► pump() ─► FrameClock ─► StatsHooks ─► GameEngine::run_next_frame
// ```
//
// Responsibilities:
// - Own every piece of mutable platform state (no globals)
// - Recompute geometry synchronously on every resize
// - Defer zero-sized viewports instead of accepting them
// - Tear down deterministically on cleanup
//
//=========================================================================

//=== Standard Library Imports ============================================

use std::cell::Cell;
use std::rc::Rc;

//=== External Dependencies ===============================================

use crossbeam_channel::{Receiver, Sender, TrySendError};
use log::{debug, info, trace, warn};

//=== Internal Dependencies ===============================================

use crate::core::clock::{audio_commands_for, FrameClock};
use crate::core::collaborators::{
    AudioControl, GameEngine, InputFrame, KeyValueStore, NativeSpriteUtils, PlatformInfo,
    RenderSurface, ResizeScheduler, StatsHooks,
};
use crate::core::config::PlatformConfig;
use crate::core::geometry::{
    CoordinateTransform, DeviceSize, Geometry, RawViewport, ViewportOffsets,
};
use crate::core::input::{InputMode, InputState, PointerDispatcher};
use crate::core::platform_bridge::{EventCollector, PlatformEvent, TickControl, ViewportMetrics};
use crate::core::resolution::{BufferSize, ResolutionController, RESOLUTION_STORAGE_KEY};

//=== Constants ===========================================================

/// Delay before re-measuring a viewport reported as zero-sized.
pub const RESIZE_RETRY_DELAY_MS: u32 = 100;

//=== GeometryUpdate ======================================================

/// Outcome of a resize or scroll.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GeometryUpdate {
    /// Device size, buffer and transform recomputed.
    Applied,
    /// Viewport was zero-sized; a re-measure has been scheduled.
    Deferred,
    /// Device size kept, transform rebuilt (scroll).
    Retained,
    /// Controller already cleaned up; nothing changed.
    Stopped,
}

//=== ShutdownHandle ======================================================

/// Asks for cleanup from code that cannot borrow the controller (a host
/// callback running inside a frame or DOM dispatch). The next `pump` or
/// frame performs it.
#[derive(Debug, Clone, Default)]
pub struct ShutdownHandle(Rc<Cell<bool>>);

impl ShutdownHandle {
    pub fn request(&self) {
        self.0.set(true);
    }

    pub fn is_requested(&self) -> bool {
        self.0.get()
    }
}

//=== Collaborators =======================================================

/// Everything the controller drives.
pub struct Collaborators<R, E> {
    pub surface: R,
    pub engine: E,
    pub store: Box<dyn KeyValueStore>,
    pub audio: Box<dyn AudioControl>,
    pub scheduler: Box<dyn ResizeScheduler>,
    pub stats: StatsHooks,
}

//=== ViewportController ==================================================

pub struct ViewportController<R, E>
where
    R: RenderSurface,
    E: GameEngine<Handles = R::Handles>,
{
    config: PlatformConfig,
    parts: Collaborators<R, E>,

    sender: Sender<PlatformEvent>,
    collector: EventCollector,
    shutdown: ShutdownHandle,

    resolution: ResolutionController,
    dispatcher: PointerDispatcher,
    input: InputState,
    clock: FrameClock,

    geometry: Option<Geometry>,
    handles: Option<R::Handles>,
    utils: Option<NativeSpriteUtils>,
    last_metrics: Option<ViewportMetrics>,

    is_running: bool,
}

impl<R, E> ViewportController<R, E>
where
    R: RenderSurface,
    E: GameEngine<Handles = R::Handles>,
{
    //--- Construction -----------------------------------------------------

    /// `sender` and `receiver` are the two ends of the platform event
    /// queue; other clones of `sender` may already be held by the DOM glue.
    ///
    /// # Panics
    ///
    /// Panics if the target FPS is not positive (checked earlier by
    /// `PlatformBuilder`).
    pub fn new(
        config: PlatformConfig,
        input_mode: InputMode,
        sender: Sender<PlatformEvent>,
        receiver: Receiver<PlatformEvent>,
        parts: Collaborators<R, E>,
    ) -> Self {
        let clock = FrameClock::new(config.target_fps);

        Self {
            config,
            parts,
            sender,
            collector: EventCollector::new(receiver),
            shutdown: ShutdownHandle::default(),
            resolution: ResolutionController::new(),
            dispatcher: PointerDispatcher::new(input_mode),
            input: InputState::new(),
            clock,
            geometry: None,
            handles: None,
            utils: None,
            last_metrics: None,
            is_running: true,
        }
    }

    /// Sender for DOM listeners and async completions.
    pub fn sender(&self) -> Sender<PlatformEvent> {
        self.sender.clone()
    }

    pub fn shutdown_handle(&self) -> ShutdownHandle {
        self.shutdown.clone()
    }

    //--- Startup ----------------------------------------------------------

    /// Starts the engine, requests the persisted resolution override and
    /// computes the first geometry.
    pub fn start(&mut self, metrics: ViewportMetrics) -> GeometryUpdate {
        info!(
            target: "viewport",
            "Starting platform ({:?}, game {}x{}, input {:?})",
            self.config.dimensions,
            self.config.game_size.width,
            self.config.game_size.height,
            self.dispatcher.mode()
        );

        let platform = PlatformInfo {
            is_test_platform: false,
            input_mode: self.dispatcher.mode(),
            native_sprite_map: self.config.native_sprite_map.clone(),
        };
        self.parts.engine.start(&platform);

        let sender = self.sender.clone();
        self.parts.store.get_item(
            RESOLUTION_STORAGE_KEY,
            Box::new(move |value| post(&sender, PlatformEvent::StoredResolution(value))),
        );

        self.on_resize(metrics)
    }

    //--- Event Pump -------------------------------------------------------

    /// Drains queued platform events. Returns `Exit` once shut down.
    pub fn pump(&mut self) -> TickControl {
        if !self.is_running {
            return TickControl::Exit;
        }
        if self.shutdown.is_requested() {
            debug!(target: "viewport", "Deferred shutdown requested");
            return self.cleanup();
        }

        let control = self.collector.collect();
        for event in self.collector.take_events() {
            self.handle_event(event);
        }

        match control {
            TickControl::Continue => TickControl::Continue,
            TickControl::Exit => self.cleanup(),
        }
    }

    fn handle_event(&mut self, event: PlatformEvent) {
        match event {
            PlatformEvent::Resized(metrics) => {
                self.on_resize(metrics);
            }
            PlatformEvent::Scrolled { scroll_x, scroll_y } => {
                self.on_scroll(scroll_x, scroll_y);
            }
            PlatformEvent::VisibilityChanged { visible, timestamp } => {
                self.on_visibility(visible, timestamp);
            }
            PlatformEvent::Pointer { phase, pointer } => match &self.geometry {
                Some(geometry) => {
                    self.dispatcher.pointer(phase, pointer, geometry, &mut self.input)
                }
                None => trace!(target: "input", "Dropping pointer event before first layout"),
            },
            PlatformEvent::Touches { phase, touches } => match &self.geometry {
                Some(geometry) => {
                    self.dispatcher.touches(phase, &touches, geometry, &mut self.input)
                }
                None => trace!(target: "input", "Dropping touch event before first layout"),
            },
            PlatformEvent::Key { key, pressed, repeat } => {
                self.dispatcher.key(key, pressed, repeat, &mut self.input);
            }
            PlatformEvent::StoredResolution(value) => self.apply_stored_resolution(value),
            PlatformEvent::ResolutionRequested(multiplier) => {
                self.set_resolution(multiplier);
            }
            PlatformEvent::Shutdown => {
                self.cleanup();
            }
        }
    }

    //--- Geometry ---------------------------------------------------------

    /// Recomputes device size, buffer size and transform from scratch.
    pub fn on_resize(&mut self, metrics: ViewportMetrics) -> GeometryUpdate {
        if !self.is_running {
            return GeometryUpdate::Stopped;
        }

        let (width, height) = match self.config.window_size {
            Some(window) => (window.width, window.height),
            None => (metrics.width, metrics.height),
        };

        let Some(raw) = RawViewport::new(width, height) else {
            warn!(
                target: "viewport",
                "Viewport reported as {}x{}, retrying in {}ms",
                width,
                height,
                RESIZE_RETRY_DELAY_MS
            );
            self.parts.scheduler.schedule_resize(RESIZE_RETRY_DELAY_MS);
            return GeometryUpdate::Deferred;
        };

        self.last_metrics = Some(metrics);

        let dpr = if metrics.device_pixel_ratio.is_finite() && metrics.device_pixel_ratio > 0.0 {
            metrics.device_pixel_ratio
        } else {
            1.0
        };

        let size = DeviceSize::compute(raw, self.config.dimensions, &self.config.game_size);
        let buffer = self.resolution.recompute_after_resize(
            &size,
            dpr,
            self.config.image_resolution,
            self.config.pixel_budget(),
        );

        let handles = self.parts.surface.resize(&size, buffer);
        self.handles = Some(handles);
        self.publish(size, buffer, metrics.scroll_x, metrics.scroll_y);

        info!(
            target: "viewport",
            "Geometry {}x{} css, {}x{} buffer (multiplier {})",
            size.device_width,
            size.device_height,
            buffer.width,
            buffer.height,
            self.resolution.multiplier()
        );

        GeometryUpdate::Applied
    }

    /// Rebuilds the transform for a new scroll offset. The device size is
    /// kept: mobile browsers resize while collapsing their toolbars.
    pub fn on_scroll(&mut self, scroll_x: f64, scroll_y: f64) -> GeometryUpdate {
        if !self.is_running {
            return GeometryUpdate::Stopped;
        }
        if let Some(metrics) = self.last_metrics.as_mut() {
            metrics.scroll_x = scroll_x;
            metrics.scroll_y = scroll_y;
        }

        let Some(geometry) = self.geometry else {
            return GeometryUpdate::Deferred;
        };

        debug!(target: "viewport", "Scrolled to ({}, {})", scroll_x, scroll_y);
        self.publish(geometry.size, geometry.buffer, scroll_x, scroll_y);
        GeometryUpdate::Retained
    }

    /// Swaps in a new geometry and republishes it to the engine.
    fn publish(&mut self, size: DeviceSize, buffer: BufferSize, scroll_x: f64, scroll_y: f64) {
        let (canvas_left, canvas_top) = self.parts.surface.canvas_origin();
        let offsets = ViewportOffsets {
            canvas_left,
            canvas_top,
            scroll_x,
            scroll_y,
        };

        let geometry = Geometry {
            size,
            transform: CoordinateTransform::new(&size, offsets),
            buffer,
        };
        let utils = NativeSpriteUtils::from_geometry(&geometry);

        self.geometry = Some(geometry);
        self.utils = Some(utils);

        if let Some(handles) = &self.handles {
            self.parts.engine.platform_changed(handles, &utils);
        }
    }

    //--- Resolution -------------------------------------------------------

    /// User-requested multiplier: persisted, then a full resize. After
    /// cleanup the request is ignored and the current multiplier returned.
    pub fn set_resolution(&mut self, multiplier: f64) -> f64 {
        if !self.is_running {
            return self.resolution.multiplier();
        }
        let value = self.resolution.set(multiplier);
        info!(target: "viewport::resolution", "Resolution multiplier set to {}", value);

        self.parts.store.set_item(RESOLUTION_STORAGE_KEY, &value.to_string());
        self.refresh();
        value
    }

    /// Applies the persisted override read at startup. A choice the user
    /// made while the read was in flight wins.
    pub fn apply_stored_resolution(&mut self, stored: Option<String>) {
        if !self.is_running {
            return;
        }
        let Some(raw) = stored else {
            return;
        };
        let Some(value) = ResolutionController::parse_stored(&raw) else {
            warn!(target: "viewport::resolution", "Ignoring stored resolution {:?}", raw);
            return;
        };
        if self.resolution.has_user_override() {
            return;
        }

        let value = self.resolution.set(value);
        debug!(target: "viewport::resolution", "Restored resolution multiplier {}", value);
        self.refresh();
    }

    fn refresh(&mut self) {
        if let Some(metrics) = self.last_metrics {
            self.on_resize(metrics);
        }
    }

    //--- Visibility -------------------------------------------------------

    pub fn on_visibility(&mut self, visible: bool, timestamp: f64) {
        if !self.is_running {
            return;
        }
        if self.clock.set_visibility(visible, timestamp) {
            info!(target: "viewport", "Page {}", if visible { "visible" } else { "hidden" });
            self.parts.audio.apply(audio_commands_for(visible));
        }
    }

    //--- Frame Step -------------------------------------------------------

    /// Animation-frame entry point. `Exit` means stop requesting frames.
    pub fn on_frame(&mut self, timestamp: f64) -> TickControl {
        if self.pump() == TickControl::Exit {
            return TickControl::Exit;
        }

        // The clock starts with the first frame the engine can actually run
        let Some(utils) = self.utils else {
            return TickControl::Continue;
        };
        let Some(elapsed) = self.clock.on_frame(timestamp) else {
            return TickControl::Continue;
        };

        self.parts.stats.begin();
        let mut frame = InputFrame::new(&mut self.input, &self.dispatcher, &utils);
        self.parts.engine.run_next_frame(elapsed, &mut frame);
        self.parts.stats.end();

        if let Some(utils) = self.utils.as_mut() {
            utils.did_resize = false;
        }

        TickControl::Continue
    }

    //--- Lifecycle --------------------------------------------------------

    /// Stops the clock, cancels held pointers and tells the engine this was
    /// the last frame. Idempotent.
    pub fn cleanup(&mut self) -> TickControl {
        if !self.is_running {
            return TickControl::Exit;
        }
        self.is_running = false;

        self.clock.make_inert();
        self.dispatcher.cancel_all(&mut self.input);

        if let (Some(handles), Some(utils)) = (&self.handles, self.utils.as_mut()) {
            utils.is_last_frame = true;
            self.parts.engine.platform_changed(handles, utils);
        }

        info!(target: "viewport", "Platform cleaned up");
        TickControl::Exit
    }

    //--- Accessors --------------------------------------------------------

    pub fn geometry(&self) -> Option<&Geometry> {
        self.geometry.as_ref()
    }

    pub fn native_sprite_utils(&self) -> Option<&NativeSpriteUtils> {
        self.utils.as_ref()
    }

    pub fn resolution(&self) -> &ResolutionController {
        &self.resolution
    }

    pub fn dispatcher(&self) -> &PointerDispatcher {
        &self.dispatcher
    }

    pub fn clock(&self) -> &FrameClock {
        &self.clock
    }

    pub fn config(&self) -> &PlatformConfig {
        &self.config
    }

    pub fn engine(&self) -> &E {
        &self.parts.engine
    }

    pub fn surface(&self) -> &R {
        &self.parts.surface
    }

    pub fn is_running(&self) -> bool {
        self.is_running
    }
}

//--- Helpers --------------------------------------------------------------

/// Queues an event, dropping it (with a warning) if the queue is full.
pub(crate) fn post(sender: &Sender<PlatformEvent>, event: PlatformEvent) {
    match sender.try_send(event) {
        Ok(()) => {}
        Err(TrySendError::Full(event)) => {
            warn!(target: "platform", "Event queue full, dropping {:?}", event)
        }
        Err(TrySendError::Disconnected(_)) => {
            debug!(target: "platform", "Event queue closed")
        }
    }
}

//=========================================================================
// Unit Tests
//=========================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::clock::AudioCommand;
    use crate::core::collaborators::StoreReply;
    use crate::core::config::WindowSize;
    use crate::core::geometry::{GameSize, SizingStrategy};
    use crate::core::input::{InputSnapshot, PointerId, PointerPhase, RawPointer};
    use crossbeam_channel::bounded;
    use std::cell::{Cell, RefCell};
    use std::collections::HashMap;
    use std::rc::Rc;

    //=====================================================================
    // Recording Fakes
    //=====================================================================

    #[derive(Default)]
    struct RecordingSurface {
        resizes: Vec<(DeviceSize, BufferSize)>,
        origin: (f64, f64),
    }

    impl RenderSurface for RecordingSurface {
        type Handles = BufferSize;

        fn resize(&mut self, size: &DeviceSize, buffer: BufferSize) -> BufferSize {
            self.resizes.push((*size, buffer));
            buffer
        }

        fn canvas_origin(&self) -> (f64, f64) {
            self.origin
        }
    }

    #[derive(Default)]
    struct RecordingEngine {
        started: Option<PlatformInfo>,
        changes: Vec<(BufferSize, NativeSpriteUtils)>,
        frames: Vec<(f64, InputSnapshot, bool)>,
    }

    impl GameEngine for RecordingEngine {
        type Handles = BufferSize;

        fn start(&mut self, platform: &PlatformInfo) {
            self.started = Some(platform.clone());
        }

        fn platform_changed(&mut self, handles: &BufferSize, utils: &NativeSpriteUtils) {
            self.changes.push((*handles, *utils));
        }

        fn run_next_frame(&mut self, elapsed: f64, frame: &mut InputFrame<'_>) {
            let did_resize = frame.native_sprite_utils().did_resize;
            self.frames.push((elapsed, frame.inputs(), did_resize));
            frame.reset_inputs();
        }
    }

    #[derive(Default, Clone)]
    struct RecordingStore {
        items: Rc<RefCell<HashMap<String, String>>>,
        writes: Rc<Cell<usize>>,
    }

    impl KeyValueStore for RecordingStore {
        fn get_item(&self, key: &str, reply: StoreReply) {
            reply(self.items.borrow().get(key).cloned());
        }

        fn set_item(&mut self, key: &str, value: &str) {
            self.writes.set(self.writes.get() + 1);
            self.items.borrow_mut().insert(key.to_owned(), value.to_owned());
        }
    }

    #[derive(Default, Clone)]
    struct RecordingAudio(Rc<RefCell<Vec<AudioCommand>>>);

    impl AudioControl for RecordingAudio {
        fn apply(&mut self, commands: &[AudioCommand]) {
            self.0.borrow_mut().extend_from_slice(commands);
        }
    }

    #[derive(Default, Clone)]
    struct RecordingScheduler(Rc<RefCell<Vec<u32>>>);

    impl ResizeScheduler for RecordingScheduler {
        fn schedule_resize(&mut self, delay_ms: u32) {
            self.0.borrow_mut().push(delay_ms);
        }
    }

    //=====================================================================
    // Harness
    //=====================================================================

    struct Harness {
        controller: ViewportController<RecordingSurface, RecordingEngine>,
        store: RecordingStore,
        audio: RecordingAudio,
        scheduler: RecordingScheduler,
    }

    fn metrics(width: f64, height: f64) -> ViewportMetrics {
        ViewportMetrics {
            width,
            height,
            device_pixel_ratio: 1.0,
            scroll_x: 0.0,
            scroll_y: 0.0,
        }
    }

    fn config(width: f64, height: f64, dimensions: SizingStrategy) -> PlatformConfig {
        let mut config = PlatformConfig::new(GameSize::new(width, height).unwrap());
        config.dimensions = dimensions;
        config
    }

    fn harness_with(config: PlatformConfig, store: RecordingStore, stats: StatsHooks) -> Harness {
        let audio = RecordingAudio::default();
        let scheduler = RecordingScheduler::default();
        let parts = Collaborators {
            surface: RecordingSurface::default(),
            engine: RecordingEngine::default(),
            store: Box::new(store.clone()),
            audio: Box::new(audio.clone()),
            scheduler: Box::new(scheduler.clone()),
            stats,
        };

        Harness {
            controller: {
                let (tx, rx) = bounded(64);
                ViewportController::new(config, InputMode::Pointer, tx, rx, parts)
            },
            store,
            audio,
            scheduler,
        }
    }

    /// 400x300 game, fit-to-width in an 800x600 window: 2 CSS px per unit.
    fn started() -> Harness {
        let mut h = harness_with(
            config(400.0, 300.0, SizingStrategy::FitToWidth),
            RecordingStore::default(),
            StatsHooks::default(),
        );
        assert_eq!(h.controller.start(metrics(800.0, 600.0)), GeometryUpdate::Applied);
        h
    }

    fn send(h: &Harness, event: PlatformEvent) {
        h.controller.sender().send(event).unwrap();
    }

    //=====================================================================
    // Startup & Geometry
    //=====================================================================

    #[test]
    fn start_publishes_first_geometry() {
        let h = started();
        let engine = h.controller.engine();

        let info = engine.started.as_ref().unwrap();
        assert!(!info.is_test_platform);
        assert_eq!(info.input_mode, InputMode::Pointer);

        let geometry = h.controller.geometry().unwrap();
        assert_eq!(geometry.size.device_width, 800.0);
        assert_eq!(geometry.size.device_height, 600.0);
        assert_eq!(geometry.buffer, BufferSize { width: 800, height: 600 });

        assert_eq!(h.controller.surface().resizes.len(), 1);
        assert_eq!(engine.changes.len(), 1);
        assert!(engine.changes[0].1.did_resize);
        assert_eq!(engine.changes[0].1.scale, 2.0);
    }

    #[test]
    fn zero_viewport_is_deferred_then_retried() {
        let mut h = harness_with(
            config(400.0, 300.0, SizingStrategy::GameCoords),
            RecordingStore::default(),
            StatsHooks::default(),
        );

        assert_eq!(h.controller.start(metrics(0.0, 0.0)), GeometryUpdate::Deferred);
        assert_eq!(*h.scheduler.0.borrow(), vec![RESIZE_RETRY_DELAY_MS]);
        assert!(h.controller.geometry().is_none());
        assert!(h.controller.surface().resizes.is_empty());

        // Frames before the first layout do not reach the engine
        h.controller.on_frame(0.0);
        assert!(h.controller.engine().frames.is_empty());

        send(&h, PlatformEvent::Resized(metrics(400.0, 300.0)));
        h.controller.on_frame(16.0);

        assert!(h.controller.geometry().is_some());
        assert_eq!(h.controller.engine().frames.len(), 1);
    }

    #[test]
    fn window_size_overrides_browser_metrics() {
        let mut config = config(400.0, 300.0, SizingStrategy::GameCoords);
        config.window_size = Some(WindowSize { width: 200.0, height: 150.0 });
        let mut h = harness_with(config, RecordingStore::default(), StatsHooks::default());

        h.controller.start(metrics(1920.0, 1080.0));

        let size = h.controller.geometry().unwrap().size;
        assert_eq!((size.device_width, size.device_height), (200.0, 150.0));
    }

    #[test]
    fn each_resize_recomputes_from_scratch() {
        let mut h = started();

        h.controller.on_resize(metrics(400.0, 600.0));
        h.controller.on_resize(metrics(800.0, 600.0));

        let resizes = &h.controller.surface().resizes;
        assert_eq!(resizes.len(), 3);
        assert_eq!(resizes[0], resizes[2]);
        assert_eq!(resizes[1].0.device_width, 400.0);
    }

    #[test]
    fn scroll_keeps_device_size_and_rebuilds_transform() {
        let mut h = started();
        let before = *h.controller.geometry().unwrap();

        assert_eq!(h.controller.on_scroll(0.0, 40.0), GeometryUpdate::Retained);

        let after = *h.controller.geometry().unwrap();
        assert_eq!(after.size, before.size);
        assert_eq!(after.buffer, before.buffer);
        assert_eq!(after.transform.offsets().scroll_y, 40.0);
        assert_eq!(h.controller.surface().resizes.len(), 1);
        assert_eq!(h.controller.engine().changes.len(), 2);

        // Client y 260 plus 40 scroll is the canvas centre
        assert_eq!(after.transform.platform_to_game_y(260.0), 0.0);
    }

    #[test]
    fn canvas_origin_feeds_transform() {
        let mut h = harness_with(
            config(400.0, 300.0, SizingStrategy::GameCoords),
            RecordingStore::default(),
            StatsHooks::default(),
        );
        h.controller.parts.surface.origin = (100.0, 50.0);
        h.controller.start(metrics(400.0, 300.0));

        let transform = h.controller.geometry().unwrap().transform;
        assert_eq!(transform.platform_to_game(300.0, 200.0), (0.0, 0.0));
    }

    //=====================================================================
    // Resolution
    //=====================================================================

    #[test]
    fn pixel_budget_steps_down_through_controller() {
        let mut config = config(500.0, 400.0, SizingStrategy::GameCoords);
        config.max_pixels = Some(100_000);
        let mut h = harness_with(config, RecordingStore::default(), StatsHooks::default());

        h.controller.start(metrics(500.0, 400.0));

        assert_eq!(h.controller.resolution().multiplier(), 0.7);
        assert_eq!(
            h.controller.geometry().unwrap().buffer,
            BufferSize { width: 350, height: 280 }
        );
    }

    #[test]
    fn set_resolution_persists_and_resizes() {
        let mut h = started();

        assert_eq!(h.controller.set_resolution(0.5), 0.5);

        assert_eq!(
            h.store.items.borrow().get(RESOLUTION_STORAGE_KEY).map(String::as_str),
            Some("0.5")
        );
        assert!(h.controller.resolution().has_user_override());
        assert_eq!(h.controller.surface().resizes.len(), 2);
        assert_eq!(
            h.controller.geometry().unwrap().buffer,
            BufferSize { width: 400, height: 300 }
        );
    }

    #[test]
    fn resolution_request_event_is_applied_on_pump() {
        let mut h = started();

        send(&h, PlatformEvent::ResolutionRequested(2.0));
        h.controller.pump();

        assert_eq!(h.controller.resolution().multiplier(), 1.0);
        assert!(h.controller.resolution().has_user_override());
    }

    #[test]
    fn stored_resolution_is_restored_without_rewrite() {
        let store = RecordingStore::default();
        store
            .items
            .borrow_mut()
            .insert(RESOLUTION_STORAGE_KEY.to_owned(), "0.6".to_owned());
        let mut h = harness_with(
            config(400.0, 300.0, SizingStrategy::FitToWidth),
            store,
            StatsHooks::default(),
        );

        h.controller.start(metrics(800.0, 600.0));
        assert_eq!(h.controller.resolution().multiplier(), 1.0);

        h.controller.pump();

        assert_eq!(h.controller.resolution().multiplier(), 0.6);
        assert_eq!(
            h.controller.geometry().unwrap().buffer,
            BufferSize { width: 480, height: 360 }
        );
        assert_eq!(h.store.writes.get(), 0);
    }

    #[test]
    fn user_choice_beats_late_stored_value() {
        let mut h = started();

        h.controller.set_resolution(0.3);
        h.controller.apply_stored_resolution(Some("0.9".into()));

        assert_eq!(h.controller.resolution().multiplier(), 0.3);
    }

    #[test]
    fn garbage_stored_value_is_ignored() {
        let mut h = started();

        h.controller.apply_stored_resolution(Some("ultra".into()));
        h.controller.apply_stored_resolution(None);

        assert!(!h.controller.resolution().has_user_override());
        assert_eq!(h.controller.surface().resizes.len(), 1);
    }

    //=====================================================================
    // Input
    //=====================================================================

    #[test]
    fn pointer_events_reach_engine_in_game_units() {
        let mut h = started();

        send(
            &h,
            PlatformEvent::Pointer {
                phase: PointerPhase::Down,
                pointer: RawPointer::new(1, 400.0, 300.0),
            },
        );
        send(
            &h,
            PlatformEvent::Pointer {
                phase: PointerPhase::Move,
                pointer: RawPointer::new(1, 600.0, 100.0),
            },
        );
        h.controller.on_frame(0.0);

        let (_, inputs, _) = &h.controller.engine().frames[0];
        assert_eq!(inputs.pointers_pressed.len(), 1);
        assert_eq!((inputs.pointers_pressed[0].x, inputs.pointers_pressed[0].y), (0.0, 0.0));
        assert_eq!(inputs.active_pointers[0].id, PointerId(1));
        assert_eq!(inputs.pointer_position, Some((100.0, 100.0)));

        // Engine reset its inputs; the pointer is still held
        h.controller.on_frame(16.0);
        let (_, inputs, _) = &h.controller.engine().frames[1];
        assert!(inputs.pointers_pressed.is_empty());
        assert_eq!(inputs.active_pointers.len(), 1);
    }

    #[test]
    fn input_before_first_layout_is_dropped() {
        let mut h = harness_with(
            config(400.0, 300.0, SizingStrategy::GameCoords),
            RecordingStore::default(),
            StatsHooks::default(),
        );

        send(
            &h,
            PlatformEvent::Touches {
                phase: PointerPhase::Down,
                touches: vec![RawPointer::new(1, 10.0, 10.0)],
            },
        );

        assert_eq!(h.controller.pump(), TickControl::Continue);
        assert_eq!(h.controller.dispatcher().active_count(), 0);
    }

    #[test]
    fn keyboard_is_gated_by_focus() {
        let mut h = started();

        send(
            &h,
            PlatformEvent::Key {
                key: crate::core::input::KeyCode::KeyA,
                pressed: true,
                repeat: false,
            },
        );
        // Click outside the 800x600 canvas, then press another key
        send(
            &h,
            PlatformEvent::Pointer {
                phase: PointerPhase::Down,
                pointer: RawPointer::mouse(900.0, 10.0),
            },
        );
        send(
            &h,
            PlatformEvent::Key {
                key: crate::core::input::KeyCode::KeyB,
                pressed: true,
                repeat: false,
            },
        );
        h.controller.on_frame(0.0);

        let (_, inputs, _) = &h.controller.engine().frames[0];
        assert!(!h.controller.dispatcher().is_in_focus());
        assert!(inputs.is_key_released(crate::core::input::KeyCode::KeyA));
        assert!(!inputs.is_key_down(crate::core::input::KeyCode::KeyB));
    }

    //=====================================================================
    // Frames, Visibility, Stats
    //=====================================================================

    #[test]
    fn frames_report_corrected_time_and_resize_flag() {
        let mut h = started();
        let interval = h.controller.clock().frame_interval();

        h.controller.on_frame(1000.0);
        h.controller.on_frame(1016.0);

        let frames = &h.controller.engine().frames;
        assert_eq!(frames.len(), 2);
        assert!((frames[0].0 - interval).abs() < 1e-9);
        assert!((frames[1].0 - (interval + 16.0)).abs() < 1e-9);
        assert!(frames[0].2);
        assert!(!frames[1].2);
    }

    #[test]
    fn hidden_page_suspends_audio_and_engine() {
        let mut h = started();
        h.controller.on_frame(0.0);

        send(&h, PlatformEvent::VisibilityChanged { visible: false, timestamp: 100.0 });
        h.controller.on_frame(116.0);
        assert_eq!(h.controller.engine().frames.len(), 1);
        assert_eq!(*h.audio.0.borrow(), vec![AudioCommand::Suspend]);

        send(&h, PlatformEvent::VisibilityChanged { visible: true, timestamp: 5000.0 });
        send(&h, PlatformEvent::VisibilityChanged { visible: true, timestamp: 5001.0 });
        h.controller.on_frame(5016.0);

        assert_eq!(h.controller.engine().frames.len(), 2);
        assert_eq!(
            *h.audio.0.borrow(),
            vec![
                AudioCommand::Suspend,
                AudioCommand::Resume,
                AudioCommand::Suspend,
                AudioCommand::Resume
            ]
        );
    }

    #[test]
    fn stats_hooks_wrap_each_frame() {
        let log = Rc::new(RefCell::new(Vec::new()));
        let (b, e) = (log.clone(), log.clone());
        let stats = StatsHooks::new(
            move || b.borrow_mut().push("begin"),
            move || e.borrow_mut().push("end"),
        );
        let mut h = harness_with(
            config(400.0, 300.0, SizingStrategy::GameCoords),
            RecordingStore::default(),
            stats,
        );
        h.controller.start(metrics(400.0, 300.0));

        h.controller.on_frame(0.0);
        h.controller.on_frame(16.0);

        assert_eq!(*log.borrow(), vec!["begin", "end", "begin", "end"]);
    }

    //=====================================================================
    // Cleanup
    //=====================================================================

    #[test]
    fn cleanup_notifies_engine_and_stops_frames() {
        let mut h = started();
        send(
            &h,
            PlatformEvent::Pointer {
                phase: PointerPhase::Down,
                pointer: RawPointer::new(3, 400.0, 300.0),
            },
        );
        h.controller.pump();

        assert_eq!(h.controller.cleanup(), TickControl::Exit);
        assert_eq!(h.controller.cleanup(), TickControl::Exit);

        let engine = h.controller.engine();
        let last = engine.changes.last().unwrap().1;
        assert!(last.is_last_frame);
        assert_eq!(engine.changes.len(), 2);

        assert!(h.controller.clock().is_inert());
        assert_eq!(h.controller.dispatcher().active_count(), 0);
        assert_eq!(h.controller.on_frame(16.0), TickControl::Exit);
        assert!(h.controller.engine().frames.is_empty());
        assert!(!h.controller.is_running());
    }

    #[test]
    fn entry_points_are_inert_after_cleanup() {
        let mut h = started();
        h.controller.cleanup();
        let changes = h.controller.engine().changes.len();

        assert_eq!(h.controller.set_resolution(0.5), 1.0);
        assert_eq!(h.controller.on_resize(metrics(400.0, 300.0)), GeometryUpdate::Stopped);
        assert_eq!(h.controller.on_scroll(0.0, 40.0), GeometryUpdate::Stopped);
        h.controller.apply_stored_resolution(Some("0.6".into()));
        h.controller.on_visibility(false, 10.0);

        let engine = h.controller.engine();
        assert_eq!(engine.changes.len(), changes);
        assert!(engine.changes.last().unwrap().1.is_last_frame);
        assert_eq!(h.controller.surface().resizes.len(), 1);
        assert_eq!(h.controller.resolution().multiplier(), 1.0);
        assert_eq!(h.store.writes.get(), 0);
        assert!(h.audio.0.borrow().is_empty());
        assert!(h.scheduler.0.borrow().is_empty());
    }

    #[test]
    fn queued_events_before_shutdown_are_applied() {
        let mut h = started();

        send(&h, PlatformEvent::ResolutionRequested(0.5));
        send(&h, PlatformEvent::Shutdown);
        send(&h, PlatformEvent::ResolutionRequested(0.3));

        assert_eq!(h.controller.pump(), TickControl::Exit);
        assert_eq!(h.controller.resolution().multiplier(), 0.5);
        assert!(h.controller.engine().changes.last().unwrap().1.is_last_frame);
        assert!(!h.controller.is_running());
    }

    #[test]
    fn shutdown_request_is_honoured_by_next_frame() {
        let mut h = started();
        h.controller.on_frame(0.0);
        let shutdown = h.controller.shutdown_handle();

        // Requested while the controller could not be borrowed
        shutdown.request();
        assert!(h.controller.is_running());

        assert_eq!(h.controller.on_frame(16.0), TickControl::Exit);
        assert!(shutdown.is_requested());
        assert!(!h.controller.is_running());
        assert!(h.controller.clock().is_inert());
        assert_eq!(h.controller.engine().frames.len(), 1);
        assert!(h.controller.engine().changes.last().unwrap().1.is_last_frame);
    }

    #[test]
    fn shutdown_event_exits_frame_loop() {
        let mut h = started();

        send(&h, PlatformEvent::Shutdown);

        assert_eq!(h.controller.on_frame(0.0), TickControl::Exit);
        assert!(h.controller.engine().frames.is_empty());
        assert!(h.controller.clock().is_inert());
    }
}
