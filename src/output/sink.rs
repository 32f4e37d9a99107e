//! Filesystem sink for harvested pages
//!
//! A [`FilesystemSink`] owns one output directory for the lifetime of a run,
//! together with the [`CollisionTable`] that keeps every written name unique.

use crate::BenchError;
use std::collections::{HashMap, HashSet};
use std::path::{Path, PathBuf};
use std::sync::{Mutex, PoisonError};

/// Per-run registry of output names
///
/// The first claim of an identifier yields it unchanged; later claims get
/// ` (1)`, ` (2)`, … in the order the claims arrive. A suffixed name that was
/// already handed out (e.g. a page literally titled `Rust (1)`) is skipped, so
/// no two claims ever return the same name.
#[derive(Debug, Default)]
pub struct CollisionTable {
    state: Mutex<Claims>,
}

#[derive(Debug, Default)]
struct Claims {
    /// Next suffix to try per identifier
    counts: HashMap<String, u32>,
    /// Every name returned so far
    issued: HashSet<String>,
}

impl CollisionTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// Reserves the next free name for `identifier`
    ///
    /// Reading the count, incrementing it and recording the name happen under
    /// one lock, so concurrent claims never collide.
    pub fn claim(&self, identifier: &str) -> String {
        let mut state = self.state.lock().unwrap_or_else(PoisonError::into_inner);
        let Claims { counts, issued } = &mut *state;
        let next = counts.entry(identifier.to_string()).or_insert(0);

        loop {
            let candidate = if *next > 0 {
                format!("{} ({})", identifier, next)
            } else {
                identifier.to_string()
            };
            *next += 1;
            if issued.insert(candidate.clone()) {
                return candidate;
            }
        }
    }

    /// Whether `name` has already been handed out
    pub fn is_claimed(&self, name: &str) -> bool {
        self.state
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .issued
            .contains(name)
    }
}

/// Writes payloads into a freshly created directory
#[derive(Debug)]
pub struct FilesystemSink {
    dir: PathBuf,
    extension: String,
    names: CollisionTable,
}

impl FilesystemSink {
    /// Clears `dir` if it exists and creates it empty
    ///
    /// # Arguments
    ///
    /// * `dir` - The output directory; existing contents are destroyed
    /// * `extension` - Extension appended to every written file (without dot)
    ///
    /// # Returns
    ///
    /// * `Ok(FilesystemSink)` - The directory exists and is empty
    /// * `Err(BenchError::Persist)` - The directory could not be cleared or created
    pub async fn create_fresh(dir: &Path, extension: &str) -> Result<Self, BenchError> {
        let persist_error = |source| BenchError::Persist {
            path: dir.to_path_buf(),
            source,
        };

        if tokio::fs::try_exists(dir).await.map_err(persist_error)? {
            tracing::info!("Clearing existing output directory {}", dir.display());
            tokio::fs::remove_dir_all(dir).await.map_err(persist_error)?;
        }
        tokio::fs::create_dir_all(dir).await.map_err(persist_error)?;

        Ok(Self {
            dir: dir.to_path_buf(),
            extension: extension.to_string(),
            names: CollisionTable::new(),
        })
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Writes `content` as `<dir>/<identifier>[ (N)].<extension>`
    ///
    /// The name is claimed before the write starts, so two concurrent writes
    /// for the same identifier always land in different files.
    ///
    /// # Returns
    ///
    /// * `Ok(PathBuf)` - Path of the written file
    /// * `Err(BenchError::Persist)` - The write failed
    pub async fn write(&self, identifier: &str, content: &[u8]) -> Result<PathBuf, BenchError> {
        let name = self.names.claim(identifier);
        let path = self.dir.join(format!("{}.{}", name, self.extension));

        tokio::fs::write(&path, content)
            .await
            .map_err(|source| BenchError::Persist {
                path: path.clone(),
                source,
            })?;

        tracing::debug!("Wrote {} ({} bytes)", path.display(), content.len());
        Ok(path)
    }
}
