//! Tokio-backed remote loader
//!
//! The fetch runs as a task on a runtime handle. It never touches entity
//! state; it only fills a shared slot that the entity polls through
//! `FileLoader::done`. Storage reads, writes and decoding are CPU or disk
//! bound and go through `spawn_blocking`.

use std::path::PathBuf;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use async_trait::async_trait;
use tokio::runtime::Handle;
use tokio::task::JoinHandle;
use tracing::{debug, trace, warn};

use super::loader::{FileLoader, LoadFrom, LoaderFactory};
use super::location::StorageLocation;
use crate::error::Result;
use crate::image::codec::{self, Decoded};
use crate::state::storage::LocalStorage;

/// Network side of the loader: something that can produce the bytes of a location
#[async_trait]
pub trait RemoteSource: Send + Sync {
    async fn fetch(&self, location: StorageLocation, progress: Progress) -> Result<Vec<u8>>;
}

#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
enum Phase {
    #[default]
    Idle,
    Local,
    /// Local cache missed and the cloud is not permitted yet
    AwaitingCloud,
    Cloud,
    Done,
    Cancelled,
}

#[derive(Debug, Default)]
struct Shared {
    phase: Phase,
    /// The network may be used once the local cache misses
    cloud: bool,
    offset: u64,
    bytes: Vec<u8>,
    decoded: Option<Decoded>,
}

fn lock(shared: &Mutex<Shared>) -> MutexGuard<'_, Shared> {
    shared.lock().unwrap_or_else(PoisonError::into_inner)
}

/// Handle a `RemoteSource` uses to report how many bytes it has received
#[derive(Debug, Clone)]
pub struct Progress(Arc<Mutex<Shared>>);

impl Progress {
    pub fn report(&self, offset: u64) {
        lock(&self.0).offset = offset;
    }
}

/// Creates `TaskLoader`s sharing one runtime, source and storage file
#[derive(Clone)]
pub struct TaskLoaderFactory {
    runtime: Handle,
    source: Arc<dyn RemoteSource>,
    storage_path: Option<PathBuf>,
}

impl TaskLoaderFactory {
    pub fn new(runtime: Handle, source: Arc<dyn RemoteSource>, storage_path: Option<PathBuf>) -> Self {
        Self {
            runtime,
            source,
            storage_path,
        }
    }
}

impl LoaderFactory for TaskLoaderFactory {
    fn create(
        &self,
        location: &StorageLocation,
        size: u64,
        from: LoadFrom,
        auto_loading: bool,
    ) -> Box<dyn FileLoader> {
        Box::new(TaskLoader {
            job: Job {
                location: *location,
                shared: Arc::new(Mutex::new(Shared {
                    cloud: from == LoadFrom::CloudOrLocal,
                    ..Shared::default()
                })),
                source: self.source.clone(),
                storage_path: self.storage_path.clone(),
            },
            runtime: self.runtime.clone(),
            size,
            auto_loading,
            task: None,
        })
    }
}

/// Everything the background task needs, cheap to clone into it
#[derive(Clone)]
struct Job {
    location: StorageLocation,
    shared: Arc<Mutex<Shared>>,
    source: Arc<dyn RemoteSource>,
    storage_path: Option<PathBuf>,
}

impl Job {
    fn set_phase(&self, phase: Phase) -> bool {
        let mut shared = lock(&self.shared);
        if shared.phase == Phase::Cancelled {
            return false;
        }
        shared.phase = phase;
        true
    }

    async fn run(self, check_local: bool) {
        if check_local && self.set_phase(Phase::Local) {
            if let Some(bytes) = self.read_local().await {
                self.finish(bytes, false).await;
                return;
            }
        }

        // permission is read under the same lock `permit_load_from_cloud` takes
        {
            let mut shared = lock(&self.shared);
            match (shared.phase, shared.cloud) {
                (Phase::Cancelled, _) => return,
                (_, false) => {
                    shared.phase = Phase::AwaitingCloud;
                    return;
                }
                (_, true) => shared.phase = Phase::Cloud,
            }
        }

        let progress = Progress(self.shared.clone());
        match self.source.fetch(self.location, progress).await {
            Ok(bytes) => self.finish(bytes, true).await,
            Err(e) => {
                warn!("failed to fetch {:?}: {}", self.location.storage_key(), e);
                self.finish(Vec::new(), false).await;
            }
        }
    }

    async fn read_local(&self) -> Option<Vec<u8>> {
        let path = self.storage_path.clone()?;
        let key = self.location.storage_key();
        tokio::task::spawn_blocking(move || LocalStorage::open(&path)?.read(key))
            .await
            .ok()?
            .unwrap_or_else(|e| {
                warn!("local storage read failed: {}", e);
                None
            })
    }

    async fn finish(&self, bytes: Vec<u8>, persist: bool) {
        let path = self.storage_path.clone();
        let key = self.location.storage_key();
        let joined = tokio::task::spawn_blocking(move || {
            let decoded = codec::decode(&bytes, None);
            if persist && decoded.is_some() {
                if let Some(path) = path {
                    match LocalStorage::open(&path) {
                        Ok(storage) => storage.write(key, &bytes),
                        Err(e) => warn!("failed to open local storage: {}", e),
                    }
                }
            }
            (bytes, decoded)
        })
        .await;

        let (bytes, decoded) = match joined {
            Ok(result) => result,
            Err(e) => {
                warn!("decode task failed: {}", e);
                (Vec::new(), None)
            }
        };

        let mut shared = lock(&self.shared);
        if shared.phase == Phase::Cancelled {
            return;
        }
        debug!(
            "loader for {:?} finished with {} bytes",
            key,
            bytes.len()
        );
        shared.offset = bytes.len() as u64;
        shared.bytes = bytes;
        shared.decoded = decoded;
        shared.phase = Phase::Done;
    }
}

/// A fetch running on a tokio runtime
pub struct TaskLoader {
    job: Job,
    runtime: Handle,
    size: u64,
    auto_loading: bool,
    task: Option<JoinHandle<()>>,
}

impl TaskLoader {
    fn phase(&self) -> Phase {
        lock(&self.job.shared).phase
    }

    fn spawn(&mut self, check_local: bool) {
        let job = self.job.clone();
        self.task = Some(self.runtime.spawn(job.run(check_local)));
    }
}

impl FileLoader for TaskLoader {
    fn start(&mut self, load_first: bool, priority: bool) {
        if self.phase() != Phase::Idle || self.task.is_some() {
            trace!("loader already running (first: {}, priority: {})", load_first, priority);
            return;
        }
        self.spawn(true);
    }

    fn cancel(&mut self) {
        lock(&self.job.shared).phase = Phase::Cancelled;
        if let Some(task) = self.task.take() {
            task.abort();
        }
    }

    fn done(&self) -> bool {
        self.phase() == Phase::Done
    }

    fn take_bytes(&mut self) -> Vec<u8> {
        std::mem::take(&mut lock(&self.job.shared).bytes)
    }

    fn take_decoded(&mut self) -> Option<Decoded> {
        lock(&self.job.shared).decoded.take()
    }

    fn current_progress(&self) -> f64 {
        let shared = lock(&self.job.shared);
        if shared.phase == Phase::Done {
            return 1.0;
        }
        if self.size == 0 {
            return 0.0;
        }
        (shared.offset as f64 / self.size as f64).min(1.0)
    }

    fn current_offset(&self) -> u64 {
        lock(&self.job.shared).offset
    }

    fn permit_load_from_cloud(&mut self) {
        let mut shared = lock(&self.job.shared);
        if shared.cloud {
            return;
        }
        shared.cloud = true;
        // a task still before its local check will see the flag itself
        if shared.phase == Phase::AwaitingCloud {
            let job = self.job.clone();
            self.task = Some(self.runtime.spawn(job.run(false)));
        }
    }

    fn loading_local(&self) -> bool {
        matches!(self.phase(), Phase::Idle | Phase::Local | Phase::AwaitingCloud)
    }

    fn auto_loading(&self) -> bool {
        self.auto_loading
    }
}

impl Drop for TaskLoader {
    fn drop(&mut self) {
        if let Some(task) = self.task.take() {
            task.abort();
        }
    }
}
