use axum::extract::Multipart;
use axum::extract::multipart::Field;
use serde::Serialize;

use crate::errors::ApiError;
use crate::routes::AppState;
use crate::storage::{NewRecord, Upload};

/// Response body for a successful POST /save. `image` carries the generated
/// filename (not the public URL), or null when nothing was uploaded.
#[derive(Debug, Serialize)]
pub struct SavedEntry {
    pub message: &'static str,
    pub image: Option<String>,
}

/// Single pass over the multipart stream: a file part is handed to the blob
/// store the moment it arrives, then the text fields are validated. A blob
/// stored before a failed field validation stays behind as an orphan; no
/// rollback is attempted.
pub async fn save_entry(
    state: &AppState,
    host: Option<&str>,
    mut multipart: Multipart,
) -> Result<SavedEntry, ApiError> {
    let mut name = None;
    let mut mobile = None;
    let mut occupation = None;
    let mut stored_image = None;

    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| ApiError::BadRequest(e.to_string()))?
    {
        match field.name() {
            Some("image") => {
                // An empty file input still submits a part, without a filename.
                if field.file_name().is_none_or(str::is_empty) {
                    continue;
                }
                let filename = field.file_name().map(str::to_string);
                let content_type = field.content_type().and_then(|m| m.parse().ok());
                let bytes = field
                    .bytes()
                    .await
                    .map_err(|e| ApiError::BadRequest(e.to_string()))?;
                let upload = Upload {
                    bytes: bytes.to_vec(),
                    content_type,
                    filename,
                };
                stored_image = Some(state.blobs.store(upload).await?);
            }
            Some("name") => name = Some(text(field).await?),
            Some("mobile") => mobile = Some(text(field).await?),
            Some("occupation") => occupation = Some(text(field).await?),
            _ => {}
        }
    }

    tracing::debug!(?name, ?mobile, ?occupation, image = ?stored_image, "intake form received");

    let (name, mobile, occupation) =
        match (non_empty(name), non_empty(mobile), non_empty(occupation)) {
            (Some(n), Some(m), Some(o)) => (n, m, o),
            _ => return Err(ApiError::MissingFields),
        };

    let image = stored_image.as_deref().map(|f| image_url(host, f));
    let record = state
        .records
        .create(NewRecord {
            name,
            mobile,
            occupation,
            image,
        })
        .await
        .inspect_err(|e| tracing::error!(error = %e, "failed to persist entry"))?;
    tracing::info!(id = %record.id, "entry saved");

    Ok(SavedEntry {
        message: "entry saved successfully",
        image: stored_image,
    })
}

async fn text(field: Field<'_>) -> Result<String, ApiError> {
    field
        .text()
        .await
        .map_err(|e| ApiError::BadRequest(e.to_string()))
}

fn non_empty(value: Option<String>) -> Option<String> {
    value.filter(|v| !v.trim().is_empty())
}

fn image_url(host: Option<&str>, filename: &str) -> String {
    match host {
        Some(host) => format!("http://{host}/uploads/{filename}"),
        None => format!("/uploads/{filename}"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn image_url_uses_request_host() {
        assert_eq!(
            image_url(Some("localhost:5000"), "17.png"),
            "http://localhost:5000/uploads/17.png"
        );
        assert_eq!(image_url(None, "17.png"), "/uploads/17.png");
    }

    #[test]
    fn whitespace_only_fields_count_as_missing() {
        assert_eq!(non_empty(Some("  ".to_string())), None);
        assert_eq!(non_empty(None), None);
        assert_eq!(non_empty(Some("Alice".to_string())).as_deref(), Some("Alice"));
    }
}
