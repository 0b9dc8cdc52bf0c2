/// Remote-backed image support
///
/// This module handles:
/// - Storage locations and their de-duplication keys (location.rs)
/// - The loader contract entities poll (loader.rs)
/// - An offline loader that only reads the local cache (local.rs)
/// - A tokio loader that reads the local cache, then the network (task.rs)
pub mod loader;
pub mod local;
pub mod location;
pub mod task;

pub use loader::{FileLoader, LoadFrom, LoaderFactory, LoaderSlot};
pub use local::LocalLoaderFactory;
pub use location::{StorageKey, StorageLocation};
pub use task::{Progress, RemoteSource, TaskLoader, TaskLoaderFactory};
