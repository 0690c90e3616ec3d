//=========================================================================
// Asset Loader
//=========================================================================
//
// Browser implementation of `AssetLoader`.
//
// Images load through an `<img>` element's load/error events; audio is
// fetched and decoded by the shared `AudioContext`. Failures resolve to
// an `AssetError` naming the kind and file, nothing is retried.
//
//=========================================================================

//=== External Dependencies ===============================================

use js_sys::{ArrayBuffer, Promise};
use log::debug;
use wasm_bindgen::{JsCast, JsValue};
use wasm_bindgen_futures::JsFuture;
use web_sys::{AudioBuffer, AudioContext, HtmlImageElement, Response, Window};

//=== Internal Dependencies ===============================================

use crate::core::collaborators::{AssetFuture, AssetLoader};
use crate::core::platform_bridge::{AssetError, AssetKind};

//=== Assets ==============================================================

/// A decoded image plus its scaling hint.
#[derive(Debug, Clone)]
pub struct ImageAsset {
    pub element: HtmlImageElement,
    /// Nearest-neighbour sampling requested (`image-rendering: pixelated`).
    pub sharp_scaling: bool,
}

impl ImageAsset {
    pub fn width(&self) -> u32 {
        self.element.natural_width()
    }

    pub fn height(&self) -> u32 {
        self.element.natural_height()
    }
}

//=== WebAssetLoader ======================================================

#[derive(Clone)]
pub struct WebAssetLoader {
    window: Window,
    audio: Option<AudioContext>,
    base_url: String,
}

impl WebAssetLoader {
    pub(crate) fn new(window: &Window, audio: Option<AudioContext>) -> Self {
        Self {
            window: window.clone(),
            audio,
            base_url: String::new(),
        }
    }

    /// Prefix joined to every asset name, e.g. `"assets/"`.
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }

    fn url(&self, name: &str) -> String {
        format!("{}{}", self.base_url, name)
    }
}

fn js_reason(value: JsValue) -> String {
    value
        .as_string()
        .unwrap_or_else(|| format!("{:?}", value))
}

impl AssetLoader for WebAssetLoader {
    type Image = ImageAsset;
    type Audio = AudioBuffer;

    fn load_image(&self, name: &str, sharp_scaling: bool) -> AssetFuture<ImageAsset> {
        let url = self.url(name);
        let name = name.to_owned();

        Box::pin(async move {
            let fail = |reason: String| AssetError::new(AssetKind::Image, &name, reason);

            let element = HtmlImageElement::new().map_err(|e| fail(js_reason(e)))?;
            if sharp_scaling {
                let _ = element.style().set_property("image-rendering", "pixelated");
            }

            let loaded = Promise::new(&mut |resolve, reject| {
                element.set_onload(Some(&resolve));
                element.set_onerror(Some(&reject));
            });
            element.set_src(&url);

            let result = JsFuture::from(loaded).await;
            element.set_onload(None);
            element.set_onerror(None);
            result.map_err(|_| fail(format!("could not load {url}")))?;

            debug!(
                target: "platform",
                "Loaded image {} ({}x{})",
                name,
                element.natural_width(),
                element.natural_height()
            );
            Ok(ImageAsset { element, sharp_scaling })
        })
    }

    fn load_audio(&self, name: &str) -> AssetFuture<AudioBuffer> {
        let url = self.url(name);
        let name = name.to_owned();
        let window = self.window.clone();
        let audio = self.audio.clone();

        Box::pin(async move {
            let fail = |reason: String| AssetError::new(AssetKind::Audio, &name, reason);

            let context = audio.ok_or_else(|| fail("audio is not supported".into()))?;

            let response: Response = JsFuture::from(window.fetch_with_str(&url))
                .await
                .map_err(|e| fail(js_reason(e)))?
                .dyn_into()
                .map_err(|_| fail("fetch did not return a response".into()))?;
            if !response.ok() {
                return Err(fail(format!("HTTP {}", response.status())));
            }

            let body = response.array_buffer().map_err(|e| fail(js_reason(e)))?;
            let bytes: ArrayBuffer = JsFuture::from(body)
                .await
                .map_err(|e| fail(js_reason(e)))?
                .dyn_into()
                .map_err(|_| fail("response body is not an ArrayBuffer".into()))?;

            let decoding = context
                .decode_audio_data(&bytes)
                .map_err(|e| fail(js_reason(e)))?;
            let decoded: AudioBuffer = JsFuture::from(decoding)
                .await
                .map_err(|e| fail(js_reason(e)))?
                .dyn_into()
                .map_err(|_| fail("decoder did not return an AudioBuffer".into()))?;

            debug!(target: "platform", "Decoded audio {} ({:.2}s)", name, decoded.duration());
            Ok(decoded)
        })
    }

    fn cleanup_image(&self, image: ImageAsset) {
        image.element.set_src("");
    }

    fn cleanup_audio(&self, audio: AudioBuffer) {
        drop(audio);
    }
}
