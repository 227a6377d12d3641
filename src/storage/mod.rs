mod in_memory;
mod local_fs;

pub use in_memory::{InMemoryRecordStore, MemoryBlobStore};
pub use local_fs::{FileRecordStore, LocalBlobStore};

use crate::errors::ApiError;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use mime::Mime;
use serde::{Deserialize, Serialize};
use std::path::Path;
use uuid::Uuid;

/// Hard cap on an uploaded file. 5 MiB, matching the intake form's limit.
pub const MAX_UPLOAD_BYTES: usize = 5 * 1024 * 1024;

const ALLOWED_EXTENSIONS: [&str; 4] = ["jpg", "jpeg", "png", "gif"];
const ALLOWED_MIME_TYPES: [&str; 4] = ["image/jpeg", "image/jpg", "image/png", "image/gif"];

/// An uploaded file as pulled off the multipart stream.
#[derive(Debug)]
pub struct Upload {
    pub bytes: Vec<u8>,
    pub content_type: Option<Mime>,
    pub filename: Option<String>,
}

/// A persisted intake entry. `id` and `created_at` are assigned by the record
/// store and never change afterwards.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Record {
    pub id: String,
    pub name: String,
    pub mobile: String,
    pub occupation: String,
    pub image: Option<String>,
    pub created_at: DateTime<Utc>,
}

/// Caller-supplied fields for a record about to be created.
#[derive(Debug)]
pub struct NewRecord {
    pub name: String,
    pub mobile: String,
    pub occupation: String,
    pub image: Option<String>,
}

impl NewRecord {
    fn into_record(self) -> Record {
        Record {
            id: Uuid::new_v4().to_string(),
            name: self.name,
            mobile: self.mobile,
            occupation: self.occupation,
            image: self.image,
            created_at: Utc::now(),
        }
    }
}

#[async_trait]
pub trait BlobStore: Send + Sync + 'static {
    /// Validates and durably stores an upload, returning the generated
    /// filename. Rejects anything that is not an accepted image type or that
    /// exceeds [`MAX_UPLOAD_BYTES`].
    async fn store(&self, upload: Upload) -> Result<String, ApiError>;
}

#[async_trait]
pub trait RecordStore: Send + Sync + 'static {
    async fn create(&self, fields: NewRecord) -> Result<Record, ApiError>;
    /// All records, newest first.
    async fn list(&self) -> Result<Vec<Record>, ApiError>;
    async fn get(&self, id: &str) -> Result<Record, ApiError>;
}

/// Both checks are required: a whitelisted extension with a non-image MIME
/// type (or the reverse) is rejected. Returns the lowercased extension.
fn checked_extension(upload: &Upload) -> Result<String, ApiError> {
    let filename = upload
        .filename
        .as_deref()
        .ok_or(ApiError::UnsupportedFileType)?;
    let ext = Path::new(filename)
        .extension()
        .and_then(|e| e.to_str())
        .map(|e| e.to_ascii_lowercase())
        .ok_or(ApiError::UnsupportedFileType)?;
    if !ALLOWED_EXTENSIONS.contains(&ext.as_str()) {
        return Err(ApiError::UnsupportedFileType);
    }

    let declared = upload
        .content_type
        .as_ref()
        .ok_or(ApiError::UnsupportedFileType)?;
    if !ALLOWED_MIME_TYPES.contains(&declared.essence_str()) {
        return Err(ApiError::UnsupportedFileType);
    }

    if upload.bytes.len() > MAX_UPLOAD_BYTES {
        return Err(ApiError::FileTooLarge);
    }

    Ok(ext)
}

/// `<unix-millis>.<ext>` — best-effort uniqueness from wall-clock time, which
/// is enough for a low-volume intake form.
fn generated_name(ext: &str) -> String {
    format!("{}.{ext}", Utc::now().timestamp_millis())
}

fn parse_id(id: &str) -> Result<Uuid, ApiError> {
    Uuid::parse_str(id).map_err(|_| ApiError::InvalidId)
}

fn newest_first(records: &mut [Record]) {
    records.sort_by(|a, b| b.created_at.cmp(&a.created_at));
}
