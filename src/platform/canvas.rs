//=========================================================================
// Canvas Surface
//=========================================================================
//
// Canvas acquisition and the WebGL `RenderSurface`.
//
// Resizing sets the CSS box from `DeviceSize` and the backing buffer from
// the resolution controller's `BufferSize`; draw submission belongs to
// the engine's renderer, which receives `WebGlHandles`.
//
//=========================================================================

//=== External Dependencies ===============================================

use log::debug;
use wasm_bindgen::JsCast;
use web_sys::{Document, Element, HtmlCanvasElement, WebGlRenderingContext, Window};

//=== Internal Dependencies ===============================================

use crate::core::collaborators::RenderSurface;
use crate::core::config::CanvasSource;
use crate::core::geometry::DeviceSize;
use crate::core::platform_bridge::PlatformError;
use crate::core::resolution::BufferSize;

//=== Acquisition =========================================================

/// The game canvas. A created canvas stays detached until [`AcquiredCanvas::attach`], so
/// a failed capability check leaves the page untouched.
pub(crate) struct AcquiredCanvas {
    pub(crate) canvas: HtmlCanvasElement,
    parent: Option<Element>,
}

pub(crate) fn acquire(
    document: &Document,
    source: &CanvasSource,
) -> Result<AcquiredCanvas, PlatformError> {
    match source {
        CanvasSource::Existing { id } => {
            let canvas = document
                .get_element_by_id(id)
                .ok_or_else(|| {
                    PlatformError::InvalidConfig(format!("no element with id {id:?}"))
                })?
                .dyn_into::<HtmlCanvasElement>()
                .map_err(|_| {
                    PlatformError::InvalidConfig(format!("element {id:?} is not a canvas"))
                })?;

            Ok(AcquiredCanvas { canvas, parent: None })
        }

        CanvasSource::Create { parent_id } => {
            let parent = match parent_id {
                Some(id) => document.get_element_by_id(id).ok_or_else(|| {
                    PlatformError::InvalidConfig(format!("no parent element with id {id:?}"))
                })?,
                None => document
                    .body()
                    .ok_or(PlatformError::Unsupported { capability: "document.body" })?
                    .into(),
            };

            let canvas = document
                .create_element("canvas")
                .map_err(|e| PlatformError::Js(format!("createElement: {e:?}")))?
                .dyn_into::<HtmlCanvasElement>()
                .map_err(|_| PlatformError::Js("created element is not a canvas".into()))?;

            Ok(AcquiredCanvas { canvas, parent: Some(parent) })
        }
    }
}

impl AcquiredCanvas {
    /// Appends a created canvas to its parent. No-op for an existing one.
    pub(crate) fn attach(&self) -> Result<(), PlatformError> {
        let Some(parent) = &self.parent else {
            return Ok(());
        };
        parent
            .append_child(&self.canvas)
            .map_err(|e| PlatformError::Js(format!("appendChild: {e:?}")))?;
        Ok(())
    }

    /// Takes a created canvas back out of the page after a failed startup.
    pub(crate) fn detach(&self) {
        if self.parent.is_some() {
            self.canvas.remove();
            debug!(target: "platform", "Removed created canvas");
        }
    }
}

//=== WebGlHandles ========================================================

/// What the renderer needs after each resize.
#[derive(Debug, Clone)]
pub struct WebGlHandles {
    pub gl: WebGlRenderingContext,
    pub canvas: HtmlCanvasElement,
    pub buffer: BufferSize,
    /// Logical canvas size in game units, margins included.
    pub logical_width: f64,
    pub logical_height: f64,
}

//=== WebGlSurface ========================================================

pub struct WebGlSurface {
    window: Window,
    canvas: HtmlCanvasElement,
    gl: WebGlRenderingContext,
}

impl WebGlSurface {
    /// Fails with `Unsupported` when the browser has no WebGL.
    pub(crate) fn new(window: &Window, canvas: HtmlCanvasElement) -> Result<Self, PlatformError> {
        let gl = canvas
            .get_context("webgl")
            .ok()
            .flatten()
            .and_then(|ctx| ctx.dyn_into::<WebGlRenderingContext>().ok())
            .ok_or(PlatformError::Unsupported { capability: "webgl" })?;

        let style = canvas.style();
        let _ = style.set_property("display", "block");
        let _ = style.set_property("margin", "0 auto");

        Ok(Self {
            window: window.clone(),
            canvas,
            gl,
        })
    }

    pub fn canvas(&self) -> &HtmlCanvasElement {
        &self.canvas
    }
}

impl RenderSurface for WebGlSurface {
    type Handles = WebGlHandles;

    fn resize(&mut self, size: &DeviceSize, buffer: BufferSize) -> WebGlHandles {
        self.canvas.set_width(buffer.width);
        self.canvas.set_height(buffer.height);

        let style = self.canvas.style();
        let _ = style.set_property("width", &format!("{}px", size.device_width));
        let _ = style.set_property("height", &format!("{}px", size.device_height));

        let (w, h) = (buffer.width as i32, buffer.height as i32);
        self.gl.viewport(0, 0, w, h);

        debug!(target: "platform", "Canvas buffer {}x{}", buffer.width, buffer.height);

        WebGlHandles {
            gl: self.gl.clone(),
            canvas: self.canvas.clone(),
            buffer,
            logical_width: size.logical_width(),
            logical_height: size.logical_height(),
        }
    }

    fn canvas_origin(&self) -> (f64, f64) {
        let rect = self.canvas.get_bounding_client_rect();
        let scroll_x = self.window.scroll_x().unwrap_or(0.0);
        let scroll_y = self.window.scroll_y().unwrap_or(0.0);
        (rect.left() + scroll_x, rect.top() + scroll_y)
    }
}
