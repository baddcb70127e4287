//! Simulated image upload.
//!
//! Uploads read the file immediately, encode it as a base64 data URL, and
//! hold the result behind a deadline so the demo shows the placeholder
//! phase. The event loop polls [`PendingUpload::is_ready`]; no threads are
//! involved. Whatever the outcome, the associated placeholder is resolved:
//! success swaps it for an image node, failure removes it and surfaces the
//! error.

use std::fs;
use std::path::{Path, PathBuf};
use std::time::{Duration, Instant};

use base64::Engine;
use thiserror::Error;

use crate::placeholder::PlaceholderId;

/// Artificial delay before an upload resolves.
pub const UPLOAD_LATENCY: Duration = Duration::from_millis(1500);

#[derive(Debug, Error)]
pub enum UploadError {
    #[error("unsupported image type: {0}")]
    UnsupportedType(PathBuf),
    #[error("failed to read {path}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

/// An upload whose result is held until its deadline passes.
#[derive(Debug)]
pub struct PendingUpload {
    placeholder: PlaceholderId,
    ready_at: Instant,
    result: Result<String, UploadError>,
}

impl PendingUpload {
    /// Start an upload for `path`, tied to a placeholder decoration.
    pub fn start(placeholder: PlaceholderId, path: &Path) -> Self {
        let result = data_url(path);
        if let Err(err) = &result {
            tracing::warn!(path = %path.display(), %err, "upload will fail");
        }
        Self {
            placeholder,
            ready_at: Instant::now() + UPLOAD_LATENCY,
            result,
        }
    }

    pub const fn placeholder(&self) -> PlaceholderId {
        self.placeholder
    }

    pub fn is_ready(&self, now: Instant) -> bool {
        now >= self.ready_at
    }

    /// Consume the upload, yielding its placeholder and outcome.
    pub fn finish(self) -> (PlaceholderId, Result<String, UploadError>) {
        (self.placeholder, self.result)
    }

    #[cfg(test)]
    pub(crate) fn resolve_now(&mut self) {
        self.ready_at = Instant::now();
    }
}

/// Encode the file at `path` as a `data:` URL.
pub fn data_url(path: &Path) -> Result<String, UploadError> {
    let mime = path
        .extension()
        .and_then(|ext| ext.to_str())
        .and_then(|ext| mime_for(&ext.to_ascii_lowercase()))
        .ok_or_else(|| UploadError::UnsupportedType(path.to_path_buf()))?;
    let bytes = fs::read(path).map_err(|source| UploadError::Read {
        path: path.to_path_buf(),
        source,
    })?;
    let encoded = base64::engine::general_purpose::STANDARD.encode(&bytes);
    Ok(format!("data:{mime};base64,{encoded}"))
}

const fn mime_for(ext: &str) -> Option<&'static str> {
    match ext.as_bytes() {
        b"png" => Some("image/png"),
        b"jpg" | b"jpeg" => Some("image/jpeg"),
        b"gif" => Some("image/gif"),
        b"webp" => Some("image/webp"),
        b"svg" => Some("image/svg+xml"),
        _ => None,
    }
}
