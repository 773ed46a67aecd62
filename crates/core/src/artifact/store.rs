use std::collections::HashMap;
use std::fs;
use std::path::PathBuf;
use std::sync::Mutex;
use std::time::{Duration, Instant};

use uuid::Uuid;

use crate::shared::constants::ARTIFACT_TTL_SECS;
use crate::shared::error::AnonymizeError;

/// Opaque reference to a stored processing output.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct ArtifactId(String);

impl ArtifactId {
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for ArtifactId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

struct Entry {
    path: PathBuf,
    created: Instant,
}

/// On-disk store for processed outputs awaiting download.
///
/// A pipeline run owns its output file until it commits it here; only
/// committed entries are retrievable. Entries expire after a fixed TTL and
/// are swept opportunistically on access. Nothing survives a process restart
/// by design.
pub struct ArtifactStore {
    dir: PathBuf,
    ttl: Duration,
    entries: Mutex<HashMap<ArtifactId, Entry>>,
}

impl ArtifactStore {
    pub fn new(dir: impl Into<PathBuf>) -> Result<Self, AnonymizeError> {
        Self::with_ttl(dir, Duration::from_secs(ARTIFACT_TTL_SECS))
    }

    pub fn with_ttl(dir: impl Into<PathBuf>, ttl: Duration) -> Result<Self, AnonymizeError> {
        let dir = dir.into();
        fs::create_dir_all(&dir)?;
        Ok(Self {
            dir,
            ttl,
            entries: Mutex::new(HashMap::new()),
        })
    }

    /// Reserves a unique output path for a job about to run.
    ///
    /// The path is not retrievable until the job commits it; a failed job
    /// simply never commits (and removes whatever it wrote).
    pub fn allocate(&self, extension: &str) -> (ArtifactId, PathBuf) {
        let id = ArtifactId(Uuid::new_v4().simple().to_string());
        let path = self.dir.join(format!("anonymized_{id}.{extension}"));
        (id, path)
    }

    /// Registers a finished output file under its reserved id.
    pub fn commit(&self, id: ArtifactId, path: PathBuf) {
        let mut entries = self.entries.lock().unwrap();
        entries.insert(
            id,
            Entry {
                path,
                created: Instant::now(),
            },
        );
    }

    /// Reads a committed artifact's bytes. Unknown and expired references
    /// both surface as `UnknownArtifact`.
    pub fn fetch(&self, id: &ArtifactId) -> Result<Vec<u8>, AnonymizeError> {
        let path = {
            let mut entries = self.entries.lock().unwrap();
            sweep(&mut entries, self.ttl);
            entries
                .get(id)
                .map(|e| e.path.clone())
                .ok_or_else(|| AnonymizeError::UnknownArtifact(id.to_string()))?
        };
        Ok(fs::read(path)?)
    }

    /// Path a committed artifact lives at, for callers that stream files.
    pub fn path_of(&self, id: &ArtifactId) -> Result<PathBuf, AnonymizeError> {
        let mut entries = self.entries.lock().unwrap();
        sweep(&mut entries, self.ttl);
        entries
            .get(id)
            .map(|e| e.path.clone())
            .ok_or_else(|| AnonymizeError::UnknownArtifact(id.to_string()))
    }
}

fn sweep(entries: &mut HashMap<ArtifactId, Entry>, ttl: Duration) {
    entries.retain(|id, entry| {
        if entry.created.elapsed() <= ttl {
            return true;
        }
        log::debug!("expiring artifact {id}");
        if let Err(e) = fs::remove_file(&entry.path) {
            log::warn!("failed to remove expired artifact {}: {e}", entry.path.display());
        }
        false
    });
}
