use std::fmt;

use super::location::StorageLocation;
use crate::image::codec::Decoded;

/// Where a loader may look for bytes
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoadFrom {
    /// Only the local persistent cache
    LocalOnly,
    /// Local cache first, then the network
    CloudOrLocal,
}

/// A single in-flight fetch of a remote image
///
/// Loaders run on their own schedule and only publish state; the owning
/// entity polls `done()` before every read. Dropping a loader releases it.
pub trait FileLoader {
    /// Begin or re-prioritise the fetch
    fn start(&mut self, load_first: bool, priority: bool);

    fn cancel(&mut self);

    /// The loader has finished, successfully or not
    fn done(&self) -> bool;

    /// Raw bytes received, empty when the fetch failed
    fn take_bytes(&mut self) -> Vec<u8>;

    /// The decoded bitmap, `None` when nothing usable arrived
    fn take_decoded(&mut self) -> Option<Decoded>;

    /// Fraction of the expected size received so far
    fn current_progress(&self) -> f64;

    fn current_offset(&self) -> u64;

    /// Upgrade a local-only loader to also use the network
    fn permit_load_from_cloud(&mut self);

    /// Still reading the local cache
    fn loading_local(&self) -> bool;

    /// Started automatically rather than by a user action
    fn auto_loading(&self) -> bool;
}

/// Creates loaders for remote-backed entities
pub trait LoaderFactory {
    fn create(
        &self,
        location: &StorageLocation,
        size: u64,
        from: LoadFrom,
        auto_loading: bool,
    ) -> Box<dyn FileLoader>;
}

/// Loader handle held by a remote-backed entity
///
/// `Cancelled` is a terminal sentinel: automatic loads leave it alone and
/// only an explicit "load even if cancelled" request clears it.
#[derive(Default)]
pub enum LoaderSlot {
    #[default]
    Absent,
    Active(Box<dyn FileLoader>),
    Cancelled,
}

impl LoaderSlot {
    pub fn is_active(&self) -> bool {
        matches!(self, LoaderSlot::Active(_))
    }

    pub fn is_cancelled(&self) -> bool {
        matches!(self, LoaderSlot::Cancelled)
    }

    pub fn active(&self) -> Option<&dyn FileLoader> {
        match self {
            LoaderSlot::Active(loader) => Some(loader.as_ref()),
            _ => None,
        }
    }

    pub fn active_mut(&mut self) -> Option<&mut Box<dyn FileLoader>> {
        match self {
            LoaderSlot::Active(loader) => Some(loader),
            _ => None,
        }
    }
}

impl fmt::Debug for LoaderSlot {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LoaderSlot::Absent => f.write_str("Absent"),
            LoaderSlot::Active(loader) => write!(f, "Active({:.2})", loader.current_progress()),
            LoaderSlot::Cancelled => f.write_str("Cancelled"),
        }
    }
}
