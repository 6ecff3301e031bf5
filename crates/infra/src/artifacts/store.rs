use std::fs;
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex, PoisonError, RwLock};

use thiserror::Error;
use tracing::{error, info, warn};

use noshow_ai::{BundleProvider, PersistedBundle, ServingBundle};
use noshow_core::ArtifactLoadError;

#[derive(Debug, Error)]
pub enum PersistError {
    #[error("failed to encode artifact bundle: {0}")]
    Encode(#[from] serde_json::Error),

    #[error("failed to write artifact bundle: {0}")]
    Io(#[from] io::Error),
}

/// Holds the bundle the serving path predicts with.
///
/// Constructed once at startup and shared by reference. The loaded bundle is
/// never mutated; a successful [`reload`](Self::reload) swaps in a new `Arc`
/// and a failed one leaves the previous bundle in place.
#[derive(Debug)]
pub struct ArtifactStore {
    source: PathBuf,
    current: RwLock<Option<Arc<ServingBundle>>>,
    /// Set once the lazy first load has been attempted, successful or not.
    first_load: Mutex<bool>,
}

impl ArtifactStore {
    /// Store bound to `source`; nothing is read until first use.
    pub fn new(source: impl Into<PathBuf>) -> Self {
        Self {
            source: source.into(),
            current: RwLock::new(None),
            first_load: Mutex::new(false),
        }
    }

    /// Store with its bundle loaded eagerly.
    pub fn open(source: impl Into<PathBuf>) -> Result<Self, ArtifactLoadError> {
        let store = Self::new(source);
        let mut attempted = store.first_load.lock().unwrap_or_else(PoisonError::into_inner);
        *attempted = true;
        let loaded = store.load_serving()?;
        store.install(loaded);
        drop(attempted);
        Ok(store)
    }

    /// Store already holding `bundle`; its source is only used by reload.
    pub fn with_bundle(source: impl Into<PathBuf>, bundle: ServingBundle) -> Self {
        let store = Self::new(source);
        store.install(Arc::new(bundle));
        *store.first_load.lock().unwrap_or_else(PoisonError::into_inner) = true;
        store
    }

    pub fn source(&self) -> &Path {
        &self.source
    }

    pub fn is_ready(&self) -> bool {
        self.snapshot().is_some()
    }

    /// The loaded bundle, attempting the first load if nobody has yet.
    ///
    /// Concurrent first callers block on a single load attempt. A failed first
    /// attempt is not retried here; use [`reload`](Self::reload).
    pub fn ensure_loaded(&self) -> Option<Arc<ServingBundle>> {
        if let Some(bundle) = self.snapshot() {
            return Some(bundle);
        }

        let mut attempted = self.first_load.lock().unwrap_or_else(PoisonError::into_inner);
        if *attempted {
            return self.snapshot();
        }
        *attempted = true;

        match self.load_serving() {
            Ok(bundle) => {
                self.install(bundle.clone());
                Some(bundle)
            }
            Err(_) => None,
        }
    }

    /// Re-read the source. On failure the previously loaded bundle stays.
    pub fn reload(&self) -> Result<Arc<ServingBundle>, ArtifactLoadError> {
        *self.first_load.lock().unwrap_or_else(PoisonError::into_inner) = true;
        match self.load_serving() {
            Ok(bundle) => {
                self.install(bundle.clone());
                Ok(bundle)
            }
            Err(e) => {
                if let Some(kept) = self.snapshot() {
                    warn!(
                        source = %self.source.display(),
                        kept_version = %kept.version(),
                        "reload failed; keeping previously loaded bundle: {e}"
                    );
                }
                Err(e)
            }
        }
    }

    /// Read and decode a bundle blob.
    pub fn load(path: &Path) -> Result<PersistedBundle, ArtifactLoadError> {
        let bytes = match fs::read(path) {
            Ok(bytes) => bytes,
            Err(e) if e.kind() == io::ErrorKind::NotFound => {
                return Err(ArtifactLoadError::Missing(path.to_path_buf()));
            }
            Err(e) => return Err(e.into()),
        };
        PersistedBundle::from_slice(&bytes)
    }

    /// Write `bundle` to `path` atomically (temp sibling, then rename).
    pub fn persist(path: &Path, bundle: &PersistedBundle) -> Result<(), PersistError> {
        let bytes = bundle.to_bytes()?;
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent)?;
        }

        let tmp = temp_sibling(path);
        let written = fs::File::create(&tmp).and_then(|mut file| {
            file.write_all(&bytes)?;
            file.sync_all()
        });
        if let Err(e) = written.and_then(|()| fs::rename(&tmp, path)) {
            let _ = fs::remove_file(&tmp);
            return Err(e.into());
        }

        info!(
            path = %path.display(),
            version = %bundle.version,
            variant = bundle.bundle.variant_name(),
            "persisted artifact bundle"
        );
        Ok(())
    }

    fn load_serving(&self) -> Result<Arc<ServingBundle>, ArtifactLoadError> {
        match Self::load(&self.source) {
            Ok(persisted) => {
                let horizons: Vec<&str> = persisted.bundle.horizons().iter().map(|h| h.as_str()).collect();
                info!(
                    source = %self.source.display(),
                    variant = persisted.bundle.variant_name(),
                    version = %persisted.version,
                    horizons = ?horizons,
                    "loaded artifact bundle"
                );
                Ok(Arc::new(ServingBundle::new(persisted)))
            }
            Err(e) => {
                error!(source = %self.source.display(), "failed to load artifact bundle: {e}");
                Err(e)
            }
        }
    }

    fn snapshot(&self) -> Option<Arc<ServingBundle>> {
        self.current.read().unwrap_or_else(PoisonError::into_inner).clone()
    }

    fn install(&self, bundle: Arc<ServingBundle>) {
        *self.current.write().unwrap_or_else(PoisonError::into_inner) = Some(bundle);
    }
}

impl BundleProvider for ArtifactStore {
    fn current(&self) -> Option<Arc<ServingBundle>> {
        self.ensure_loaded()
    }
}

fn temp_sibling(path: &Path) -> PathBuf {
    let mut name = path.file_name().map(|n| n.to_os_string()).unwrap_or_default();
    name.push(".tmp");
    path.with_file_name(name)
}
