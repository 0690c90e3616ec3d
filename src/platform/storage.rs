//=========================================================================
// Local Storage
//=========================================================================

//=== External Dependencies ===============================================

use log::{debug, warn};
use web_sys::{Storage, Window};

//=== Internal Dependencies ===============================================

use crate::core::collaborators::{KeyValueStore, StoreReply};

//=== LocalStorageStore ===================================================

/// `window.localStorage`. Private browsing modes may deny access, in which
/// case reads answer `None` and writes are dropped.
pub(crate) struct LocalStorageStore {
    storage: Option<Storage>,
}

impl LocalStorageStore {
    pub(crate) fn new(window: &Window) -> Self {
        let storage = window.local_storage().ok().flatten();
        if storage.is_none() {
            warn!(target: "platform", "localStorage unavailable, settings will not persist");
        }
        Self { storage }
    }
}

impl KeyValueStore for LocalStorageStore {
    fn get_item(&self, key: &str, reply: StoreReply) {
        let value = self
            .storage
            .as_ref()
            .and_then(|storage| storage.get_item(key).ok().flatten());
        debug!(target: "platform", "localStorage[{:?}] = {:?}", key, value);
        reply(value);
    }

    fn set_item(&mut self, key: &str, value: &str) {
        let Some(storage) = &self.storage else {
            return;
        };
        if let Err(e) = storage.set_item(key, value) {
            warn!(target: "platform", "Could not persist {:?}: {:?}", key, e);
        }
    }
}
