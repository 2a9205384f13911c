//! Upload Storage Module
//!
//! Writes uploaded image bytes beneath the static content root and hands
//! back the relative path that gets recorded on the inspection image row.
//! The rest of the service only ever sees that path.

use std::path::{Path, PathBuf};

use tokio::fs;
use uuid::Uuid;

use crate::utils::error::{ServiceError, ServiceResult};

/// Directory under the content root where uploads are written
const UPLOAD_DIR: &str = "uploads";

/// File storage rooted at the served content directory
#[derive(Debug, Clone)]
pub struct FileStorage {
    content_root: PathBuf,
}

impl FileStorage {
    pub fn new(content_root: impl Into<PathBuf>) -> Self {
        Self {
            content_root: content_root.into(),
        }
    }

    /// Persist uploaded bytes and return the relative path to record.
    ///
    /// The stored name is prefixed with a fresh UUID so concurrent uploads
    /// of identically named files never collide, and the client-supplied
    /// name is reduced to its file name component so it cannot escape the
    /// upload directory.
    pub async fn save(&self, bytes: &[u8], suggested_name: &str) -> ServiceResult<String> {
        let file_name = sanitize_file_name(suggested_name);
        let stored_name = format!("{}_{}", Uuid::new_v4(), file_name);

        let dir = self.content_root.join(UPLOAD_DIR);
        fs::create_dir_all(&dir)
            .await
            .map_err(|e| ServiceError::Internal(format!("Failed to create upload dir: {}", e)))?;

        let path = dir.join(&stored_name);
        fs::write(&path, bytes)
            .await
            .map_err(|e| ServiceError::Internal(format!("Failed to write upload: {}", e)))?;

        Ok(format!("{}/{}", UPLOAD_DIR, stored_name))
    }
}

/// Strip any directory components from a client-supplied file name
fn sanitize_file_name(name: &str) -> String {
    Path::new(name)
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .filter(|n| !n.is_empty())
        .unwrap_or_else(|| "upload".to_string())
}
