use std::collections::BTreeMap;
use std::fs;
use std::io::Write;

use camino::{Utf8Path, Utf8PathBuf};

use crate::error::SyncError;

/// Output filename -> last-processed modification stamp, persisted next to
/// the downloaded files. Keys are only ever inserted after a dataset was
/// downloaded and transformed successfully.
pub type Snapshot = BTreeMap<String, String>;

pub const METADATA_FILE: &str = "metadata.json";

#[derive(Debug, Clone)]
pub struct Store {
    output_root: Utf8PathBuf,
}

impl Store {
    pub fn new(output_root: Utf8PathBuf) -> Self {
        Self { output_root }
    }

    pub fn output_root(&self) -> &Utf8Path {
        &self.output_root
    }

    pub fn metadata_path(&self) -> Utf8PathBuf {
        self.output_root.join(METADATA_FILE)
    }

    pub fn dataset_path(&self, file_name: &str) -> Utf8PathBuf {
        self.output_root.join(file_name)
    }

    pub fn ensure_output_root(&self) -> Result<(), SyncError> {
        fs::create_dir_all(self.output_root.as_std_path())
            .map_err(|err| SyncError::Filesystem(err.to_string()))
    }

    /// Empty snapshot when no sidecar exists yet. A sidecar that exists but
    /// does not parse is a hard error: trusting it would produce wrong skip
    /// decisions.
    pub fn load_snapshot(&self) -> Result<Snapshot, SyncError> {
        let path = self.metadata_path();
        if !path.as_std_path().exists() {
            return Ok(Snapshot::new());
        }
        let content = fs::read_to_string(path.as_std_path())
            .map_err(|_| SyncError::MetadataRead(path.clone().into_std_path_buf()))?;
        serde_json::from_str(&content).map_err(|err| SyncError::MetadataParse(err.to_string()))
    }

    pub fn save_snapshot(&self, snapshot: &Snapshot) -> Result<(), SyncError> {
        self.ensure_output_root()?;
        let content = serde_json::to_vec_pretty(snapshot)
            .map_err(|err| SyncError::Filesystem(err.to_string()))?;
        Self::write_bytes_atomic(&self.metadata_path(), &content)
    }

    /// Full-file replace through a sibling temp file, so a reader never
    /// observes a half-written dataset or sidecar.
    pub fn write_bytes_atomic(path: &Utf8Path, content: &[u8]) -> Result<(), SyncError> {
        let parent = path
            .parent()
            .ok_or_else(|| SyncError::Filesystem("invalid destination path".to_string()))?;
        fs::create_dir_all(parent.as_std_path())
            .map_err(|err| SyncError::Filesystem(err.to_string()))?;
        let mut temp = tempfile::Builder::new()
            .prefix(".cms-sync")
            .tempfile_in(parent.as_std_path())
            .map_err(|err| SyncError::Filesystem(err.to_string()))?;
        temp.write_all(content)
            .map_err(|err| SyncError::Filesystem(err.to_string()))?;
        if path.as_std_path().exists() {
            fs::remove_file(path.as_std_path())
                .map_err(|err| SyncError::Filesystem(err.to_string()))?;
        }
        temp.persist(path.as_std_path())
            .map_err(|err| SyncError::Filesystem(err.to_string()))?;
        Ok(())
    }
}
