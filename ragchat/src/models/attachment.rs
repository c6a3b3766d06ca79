//! A document selected for upload but not yet sent.

use std::path::{Path, PathBuf};

use thiserror::Error;

/// Extensions the input surface accepts, lowercase.
pub const ACCEPTED_EXTENSIONS: &[&str] = &["pdf", "doc", "docx", "txt", "md"];

/// Why a path could not be selected as an attachment.
#[derive(Debug, Error)]
pub enum AttachmentError {
    #[error(
        "unsupported file type '{}' (accepted: {})",
        .0.display(),
        ACCEPTED_EXTENSIONS.join(", ")
    )]
    UnsupportedType(PathBuf),

    #[error("{} is not a regular file", .0.display())]
    NotAFile(PathBuf),

    #[error("cannot access {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

/// Reference to a local document. Bytes are read at upload time.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Attachment {
    /// Location on disk.
    pub path: PathBuf,
    /// Final path component, sent as the multipart file name.
    pub file_name: String,
    /// Size in bytes when selected.
    pub size: u64,
}

impl Attachment {
    /// Select a document from disk, checking its extension and that it exists.
    pub fn open(path: impl AsRef<Path>) -> Result<Self, AttachmentError> {
        let path = path.as_ref();

        if !is_accepted(path) {
            return Err(AttachmentError::UnsupportedType(path.to_path_buf()));
        }

        let metadata = std::fs::metadata(path).map_err(|source| AttachmentError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        if !metadata.is_file() {
            return Err(AttachmentError::NotAFile(path.to_path_buf()));
        }

        let file_name = path
            .file_name()
            .map_or_else(|| path.to_string_lossy(), |n| n.to_string_lossy())
            .to_string();

        Ok(Self {
            path: path.to_path_buf(),
            file_name,
            size: metadata.len(),
        })
    }

    /// MIME type sent with the multipart part.
    pub fn content_type(&self) -> &'static str {
        match extension(&self.path).as_deref() {
            Some("pdf") => "application/pdf",
            Some("doc") => "application/msword",
            Some("docx") => {
                "application/vnd.openxmlformats-officedocument.wordprocessingml.document"
            }
            Some("txt") => "text/plain",
            Some("md") => "text/markdown",
            _ => "application/octet-stream",
        }
    }
}

/// Whether the input surface lets this path be selected.
pub fn is_accepted(path: &Path) -> bool {
    extension(path).is_some_and(|ext| ACCEPTED_EXTENSIONS.contains(&ext.as_str()))
}

fn extension(path: &Path) -> Option<String> {
    path.extension()
        .map(|ext| ext.to_string_lossy().to_ascii_lowercase())
}
