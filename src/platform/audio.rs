//=========================================================================
// Audio Context Control
//=========================================================================
//
// Applies visibility-driven suspend/resume sequences to the shared
// `AudioContext`. Each command waits for the previous promise, so the
// resume/suspend/resume workaround reaches the context in order.
//
//=========================================================================

//=== External Dependencies ===============================================

use log::{trace, warn};
use wasm_bindgen_futures::{spawn_local, JsFuture};
use web_sys::AudioContext;

//=== Internal Dependencies ===============================================

use crate::core::clock::AudioCommand;
use crate::core::collaborators::AudioControl;

//=== WebAudio ============================================================

pub(crate) struct WebAudio {
    context: Option<AudioContext>,
}

impl WebAudio {
    pub(crate) fn new(context: Option<AudioContext>) -> Self {
        Self { context }
    }
}

impl AudioControl for WebAudio {
    fn apply(&mut self, commands: &[AudioCommand]) {
        let Some(context) = self.context.clone() else {
            return;
        };
        let commands = commands.to_vec();

        spawn_local(async move {
            for command in commands {
                let promise = match command {
                    AudioCommand::Suspend => context.suspend(),
                    AudioCommand::Resume => context.resume(),
                };
                let result = match promise {
                    Ok(promise) => JsFuture::from(promise).await.map(|_| ()),
                    Err(e) => Err(e),
                };
                match result {
                    Ok(()) => {
                        trace!(target: "platform", "Audio {:?} -> {:?}", command, context.state())
                    }
                    Err(e) => warn!(target: "platform", "Audio {:?} failed: {:?}", command, e),
                }
            }
        });
    }
}
