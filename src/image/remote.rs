use image::ImageFormat;
use tracing::{debug, trace};

use super::{ChatKind, Image, Origin, RemoteState};
use crate::config::AutoDownload;
use crate::remote::{LoadFrom, LoaderFactory, LoaderSlot, StorageLocation};

impl Image {
    fn remote(&self) -> Option<&RemoteState> {
        match &self.origin {
            Origin::Remote(remote) => Some(remote),
            _ => None,
        }
    }

    fn remote_mut(&mut self) -> Option<&mut RemoteState> {
        match &mut self.origin {
            Origin::Remote(remote) => Some(remote),
            _ => None,
        }
    }

    pub fn location(&self) -> Option<&StorageLocation> {
        self.remote().map(|remote| &remote.location)
    }

    /// Adopt the result of a finished loader
    ///
    /// A loader that finishes without a decodable image leaves the slot
    /// cancelled, so it is not retried automatically.
    pub fn check_load(&mut self) {
        let Some(remote) = self.remote_mut() else {
            return;
        };
        let Some(loader) = remote.loader.active_mut() else {
            return;
        };
        if !loader.done() {
            return;
        }

        let decoded = loader.take_decoded();
        let bytes = loader.take_bytes();
        let Some(decoded) = decoded else {
            debug!("load of {:?} finished empty", remote.location.storage_key());
            remote.loader = LoaderSlot::Cancelled;
            return;
        };

        remote.loader = LoaderSlot::Absent;
        remote.size = bytes.len() as u64;
        (remote.location.width, remote.location.height) = decoded.bitmap.dimensions();
        trace!("adopted {} bytes for {:?}", bytes.len(), remote.location.storage_key());

        self.format = Some(decoded.format);
        self.saved = bytes;
        self.loaded_once = true;
        self.set_bitmap(Some(decoded.bitmap), decoded.has_alpha);
    }

    /// True once the bytes are here; always true for non-remote images
    pub fn loaded(&mut self) -> bool {
        self.check_load();
        match &self.origin {
            Origin::Remote(remote) => {
                !remote.loader.is_active() && (self.data.is_some() || !self.saved.is_empty())
            }
            _ => true,
        }
    }

    pub fn loading(&self) -> bool {
        self.remote().is_some_and(|remote| remote.loader.is_active())
    }

    /// Whether a spinner should be shown
    ///
    /// Automatic loads that are still only looking at the local cache stay quiet.
    pub fn display_loading(&self) -> bool {
        self.remote()
            .and_then(|remote| remote.loader.active())
            .is_some_and(|loader| !loader.loading_local() || !loader.auto_loading())
    }

    pub fn is_cancelled(&self) -> bool {
        self.remote().is_some_and(|remote| remote.loader.is_cancelled())
    }

    /// Fraction loaded in `[0, 1]`
    pub fn progress(&mut self) -> f64 {
        if self.loaded() {
            return 1.0;
        }
        self.remote()
            .and_then(|remote| remote.loader.active())
            .map_or(0.0, |loader| loader.current_progress().clamp(0.0, 1.0))
    }

    /// Bytes received so far
    pub fn offset(&mut self) -> u64 {
        if self.loaded() {
            return self.remote().map_or(self.saved.len() as u64, |remote| remote.size);
        }
        self.remote()
            .and_then(|remote| remote.loader.active())
            .map_or(0, |loader| loader.current_offset())
    }

    /// Start or widen a download on behalf of a chat
    ///
    /// The network is only used when `policy` allows it for `chat`; otherwise
    /// the loader stays on the local cache. A running local-only loader is
    /// permitted to go to the network once the policy allows it.
    pub fn automatic_load(&mut self, loaders: &dyn LoaderFactory, policy: AutoDownload, chat: ChatKind) {
        if self.loaded() {
            return;
        }
        let Some(remote) = self.remote_mut() else {
            return;
        };
        if remote.loader.is_cancelled() {
            return;
        }

        let from_cloud = match chat {
            ChatKind::Private => !policy.no_private,
            ChatKind::Group => !policy.no_groups,
        };
        if let Some(loader) = remote.loader.active_mut() {
            if from_cloud {
                loader.permit_load_from_cloud();
            }
            return;
        }

        let from = if from_cloud {
            LoadFrom::CloudOrLocal
        } else {
            LoadFrom::LocalOnly
        };
        let mut loader = loaders.create(&remote.location, remote.size, from, true);
        loader.start(false, false);
        remote.loader = LoaderSlot::Active(loader);
    }

    /// Let automatic loads retry an image whose previous attempt was cancelled
    pub fn automatic_load_settings_changed(&mut self) {
        if self.loaded() {
            return;
        }
        if let Some(remote) = self.remote_mut() {
            if remote.loader.is_cancelled() {
                remote.loader = LoaderSlot::Absent;
            }
        }
    }

    pub(super) fn load_remote(&mut self, loaders: &dyn LoaderFactory, load_first: bool, priority: bool) {
        if self.loaded() {
            return;
        }
        let Some(remote) = self.remote_mut() else {
            return;
        };
        if matches!(remote.loader, LoaderSlot::Absent) {
            let loader = loaders.create(&remote.location, remote.size, LoadFrom::CloudOrLocal, false);
            remote.loader = LoaderSlot::Active(loader);
        }
        if let Some(loader) = remote.loader.active_mut() {
            loader.start(load_first, priority);
        }
    }

    /// `load`, clearing an earlier cancellation first
    pub fn load_even_cancelled(&mut self, loaders: &dyn LoaderFactory, load_first: bool, priority: bool) {
        if let Some(remote) = self.remote_mut() {
            if remote.loader.is_cancelled() {
                remote.loader = LoaderSlot::Absent;
            }
        }
        self.load(loaders, load_first, priority);
    }

    /// Stop an active loader; automatic loads will not restart it
    pub fn cancel(&mut self) {
        let Some(remote) = self.remote_mut() else {
            return;
        };
        if !remote.loader.is_active() {
            return;
        }
        if let LoaderSlot::Active(mut loader) = std::mem::replace(&mut remote.loader, LoaderSlot::Cancelled) {
            loader.cancel();
            debug!("cancelled load of {:?}", remote.location.storage_key());
        }
    }

    /// Replace the encoded bytes, dropping any loader and every variant
    pub fn set_data(&mut self, bytes: Vec<u8>, format: Option<ImageFormat>) {
        if let Some(remote) = self.remote_mut() {
            if let LoaderSlot::Active(mut loader) = std::mem::take(&mut remote.loader) {
                loader.cancel();
            }
            remote.size = bytes.len() as u64;
        }

        self.adopt_bytes(bytes, format);

        let dimensions = self.data.as_ref().map(|data| data.dimensions());
        if let (Some((w, h)), Some(remote)) = (dimensions, self.remote_mut()) {
            remote.location.width = w;
            remote.location.height = h;
        }
    }
}
