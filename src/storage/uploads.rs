//! Upload Storage
//!
//! Stores uploaded files on the local file system under
//! `<root>/<owner>/<job_id>/<filename>`, so concurrent uploads from different
//! owners or jobs never share a directory. Processed outputs are written by
//! the task body next to their input and read back through the same layout.

use crate::error::StorageError;

use std::path::PathBuf;

pub struct UploadStore {
    root: PathBuf,
}

impl UploadStore {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    /// Directory holding every file of one job.
    pub fn job_dir(&self, owner: &str, job_id: &str) -> Result<PathBuf, StorageError> {
        Ok(self
            .root
            .join(validate_component(owner)?)
            .join(validate_component(job_id)?))
    }

    /// Where a file of a job is stored, once every component is validated.
    pub fn file_path(
        &self,
        owner: &str,
        job_id: &str,
        filename: &str,
    ) -> Result<PathBuf, StorageError> {
        Ok(self.job_dir(owner, job_id)?.join(validate_component(filename)?))
    }

    /// Writes one uploaded file and returns where it landed.
    pub async fn save(
        &self,
        owner: &str,
        job_id: &str,
        filename: &str,
        content: &[u8],
    ) -> Result<PathBuf, StorageError> {
        let dir = self.job_dir(owner, job_id)?;
        let path = self.file_path(owner, job_id, filename)?;

        tokio::fs::create_dir_all(&dir).await?;
        tokio::fs::write(&path, content).await?;

        tracing::info!("File saved successfully: {} ({} bytes)", path.display(), content.len());
        Ok(path)
    }

    /// Reads back a stored artifact (upload or processed output).
    pub async fn read(
        &self,
        owner: &str,
        job_id: &str,
        filename: &str,
    ) -> Result<Vec<u8>, StorageError> {
        let path = self.file_path(owner, job_id, filename)?;

        match tokio::fs::read(&path).await {
            Ok(bytes) => Ok(bytes),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                Err(StorageError::NotFound(path.display().to_string()))
            }
            Err(e) => Err(StorageError::Io(e)),
        }
    }
}

/// Accepts only names that stay a single path component.
fn validate_component(name: &str) -> Result<&str, StorageError> {
    let invalid = name.is_empty()
        || name == "."
        || name == ".."
        || name.contains('/')
        || name.contains('\\')
        || name.contains('\0');

    if invalid {
        return Err(StorageError::InvalidName(name.to_string()));
    }

    Ok(name)
}
