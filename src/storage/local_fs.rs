use super::*;
use std::path::PathBuf;
use tokio::fs;

/// Writes accepted uploads into the directory that `/uploads` is served from.
pub struct LocalBlobStore {
    upload_dir: PathBuf,
}

impl LocalBlobStore {
    /// Creates the directory if it does not exist yet.
    pub fn new(upload_dir: PathBuf) -> Result<Self, ApiError> {
        if !upload_dir.exists() {
            std::fs::create_dir_all(&upload_dir)
                .map_err(|e| ApiError::Persistence(e.to_string()))?;
        }
        Ok(Self { upload_dir })
    }
}

#[async_trait]
impl BlobStore for LocalBlobStore {
    async fn store(&self, upload: Upload) -> Result<String, ApiError> {
        let ext = checked_extension(&upload)?;
        let name = generated_name(&ext);
        fs::write(self.upload_dir.join(&name), upload.bytes)
            .await
            .map_err(|e| ApiError::Persistence(e.to_string()))?;
        tracing::debug!(filename = %name, "stored upload");
        Ok(name)
    }
}

/// Record backend for `file://<dir>`: one `<id>.json` document per record.
pub struct FileRecordStore {
    data_dir: PathBuf,
}

impl FileRecordStore {
    pub fn new(data_dir: PathBuf) -> Result<Self, ApiError> {
        if !data_dir.exists() {
            std::fs::create_dir_all(&data_dir)
                .map_err(|e| ApiError::Persistence(e.to_string()))?;
        }
        Ok(Self { data_dir })
    }

    fn document_path(&self, id: &Uuid) -> PathBuf {
        self.data_dir.join(format!("{id}.json"))
    }
}

#[async_trait]
impl RecordStore for FileRecordStore {
    async fn create(&self, fields: NewRecord) -> Result<Record, ApiError> {
        let record = fields.into_record();
        let json = serde_json::to_vec(&record).map_err(|e| ApiError::Persistence(e.to_string()))?;
        // id is a freshly generated v4 uuid, so the path cannot collide.
        let path = self.data_dir.join(format!("{}.json", record.id));
        fs::write(path, json)
            .await
            .map_err(|e| ApiError::Persistence(e.to_string()))?;
        Ok(record)
    }

    async fn list(&self) -> Result<Vec<Record>, ApiError> {
        let mut entries = fs::read_dir(&self.data_dir)
            .await
            .map_err(|e| ApiError::Persistence(e.to_string()))?;

        let mut records = Vec::new();
        while let Some(entry) = entries
            .next_entry()
            .await
            .map_err(|e| ApiError::Persistence(e.to_string()))?
        {
            if entry.path().extension().is_some_and(|e| e == "json") {
                let json = fs::read(entry.path())
                    .await
                    .map_err(|e| ApiError::Persistence(e.to_string()))?;
                let record = serde_json::from_slice(&json)
                    .map_err(|e| ApiError::Persistence(e.to_string()))?;
                records.push(record);
            }
        }

        newest_first(&mut records);
        Ok(records)
    }

    async fn get(&self, id: &str) -> Result<Record, ApiError> {
        // Parsing first also keeps arbitrary path segments out of the join.
        let id = parse_id(id)?;
        let json = match fs::read(self.document_path(&id)).await {
            Ok(json) => json,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Err(ApiError::NotFound),
            Err(e) => return Err(ApiError::Persistence(e.to_string())),
        };
        serde_json::from_slice(&json).map_err(|e| ApiError::Persistence(e.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[tokio::test]
    async fn blob_lands_on_disk_under_generated_name() {
        let dir = tempdir().unwrap();
        let blobs = LocalBlobStore::new(dir.path().to_path_buf()).unwrap();

        let name = blobs
            .store(Upload {
                bytes: b"png bytes".to_vec(),
                content_type: Some("image/png".parse().unwrap()),
                filename: Some("photo.PNG".to_string()),
            })
            .await
            .unwrap();

        assert!(name.ends_with(".png"));
        assert_eq!(std::fs::read(dir.path().join(&name)).unwrap(), b"png bytes");
    }

    #[tokio::test]
    async fn rejected_upload_writes_nothing() {
        let dir = tempdir().unwrap();
        let blobs = LocalBlobStore::new(dir.path().to_path_buf()).unwrap();

        let err = blobs
            .store(Upload {
                bytes: b"plain text".to_vec(),
                content_type: Some("text/plain".parse().unwrap()),
                filename: Some("notes.jpg".to_string()),
            })
            .await;

        assert!(matches!(err, Err(ApiError::UnsupportedFileType)));
        assert_eq!(std::fs::read_dir(dir.path()).unwrap().count(), 0);
    }

    #[tokio::test]
    async fn records_survive_a_store_reopen() {
        let dir = tempdir().unwrap();
        let created = {
            let store = FileRecordStore::new(dir.path().to_path_buf()).unwrap();
            store
                .create(NewRecord {
                    name: "Alice".to_string(),
                    mobile: "555".to_string(),
                    occupation: "Eng".to_string(),
                    image: Some("http://localhost:5000/uploads/1.png".to_string()),
                })
                .await
                .unwrap()
        };

        let reopened = FileRecordStore::new(dir.path().to_path_buf()).unwrap();
        let fetched = reopened.get(&created.id).await.unwrap();
        assert_eq!(fetched.name, "Alice");
        assert_eq!(fetched.image.as_deref(), Some("http://localhost:5000/uploads/1.png"));
        assert_eq!(fetched.created_at, created.created_at);
    }

    #[tokio::test]
    async fn list_orders_by_created_at_descending() {
        let dir = tempdir().unwrap();
        let store = FileRecordStore::new(dir.path().to_path_buf()).unwrap();
        for name in ["A", "B", "C"] {
            store
                .create(NewRecord {
                    name: name.to_string(),
                    mobile: "555".to_string(),
                    occupation: "Eng".to_string(),
                    image: None,
                })
                .await
                .unwrap();
            // created_at drives the ordering, so keep the timestamps apart.
            tokio::time::sleep(std::time::Duration::from_millis(2)).await;
        }

        let names: Vec<String> = store
            .list()
            .await
            .unwrap()
            .into_iter()
            .map(|r| r.name)
            .collect();
        assert_eq!(names, ["C", "B", "A"]);
    }

    #[tokio::test]
    async fn get_maps_missing_and_malformed_ids() {
        let dir = tempdir().unwrap();
        let store = FileRecordStore::new(dir.path().to_path_buf()).unwrap();
        let absent = Uuid::new_v4().to_string();
        assert!(matches!(store.get(&absent).await, Err(ApiError::NotFound)));
        assert!(matches!(
            store.get("../escape").await,
            Err(ApiError::InvalidId)
        ));
    }
}
