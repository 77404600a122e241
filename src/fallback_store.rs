use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use tokio::sync::Mutex;

use crate::domain::SubmissionPayload;

#[derive(thiserror::Error, Debug)]
pub enum StoreError {
    #[error("Failed to access the fallback store at {path}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("The fallback store at {path} does not hold a JSON array of submissions")]
    Corrupt {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
}

/// A JSON array of submissions kept in a single file.
///
/// Every append rewrites the whole file. Appends made through the same
/// `FallbackStore` are serialised, but nothing protects the file from another
/// process doing the same read-modify-write cycle: concurrent writers in
/// different processes can lose records.
pub struct FallbackStore {
    path: PathBuf,
    write_lock: Mutex<()>,
}

impl FallbackStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            write_lock: Mutex::new(()),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    #[tracing::instrument(name = "Append a submission to the fallback store", skip_all, fields(path = %self.path.display()))]
    pub async fn append(&self, record: &SubmissionPayload) -> Result<(), StoreError> {
        let _guard = self.write_lock.lock().await;

        if let Some(directory) = self.path.parent() {
            tokio::fs::create_dir_all(directory)
                .await
                .map_err(|e| self.io_error(e))?;
        }

        let mut records = self.load().await?;
        records.push(serde_json::to_value(record).map_err(|e| self.corrupt(e))?);
        let contents = serde_json::to_string_pretty(&records).map_err(|e| self.corrupt(e))?;
        tokio::fs::write(&self.path, contents)
            .await
            .map_err(|e| self.io_error(e))?;
        Ok(())
    }

    /// Every stored submission, oldest first.
    pub async fn read_all(&self) -> Result<Vec<SubmissionPayload>, StoreError> {
        self.load()
            .await?
            .into_iter()
            .map(|value| serde_json::from_value(value).map_err(|e| self.corrupt(e)))
            .collect()
    }

    // Records are kept as raw JSON so entries written by older versions
    // survive a rewrite untouched.
    async fn load(&self) -> Result<Vec<serde_json::Value>, StoreError> {
        match tokio::fs::read_to_string(&self.path).await {
            Ok(contents) => serde_json::from_str(&contents).map_err(|e| self.corrupt(e)),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(Vec::new()),
            Err(e) => Err(self.io_error(e)),
        }
    }

    fn io_error(&self, source: std::io::Error) -> StoreError {
        StoreError::Io {
            path: self.path.clone(),
            source,
        }
    }

    fn corrupt(&self, source: serde_json::Error) -> StoreError {
        StoreError::Corrupt {
            path: self.path.clone(),
            source,
        }
    }
}
