use async_trait::async_trait;
use snafu::ResultExt;

use quill_composer::{FileStore, FileUpload, StoredFile, TransferFailure};

use crate::error::{
    ParseBodySnafu, ReadBodySnafu, SendRequestSnafu, StoreResult, StoreStatusSnafu,
};

/// Uploads file bytes to the workspace file store over multipart HTTP.
///
/// The store replies with a JSON body carrying `file_id` and `filename`; the
/// returned filename is canonical and may differ from the uploaded one.
pub struct HttpFileStore {
    client: reqwest::Client,
    endpoint: String,
}

impl HttpFileStore {
    pub fn new(endpoint: impl Into<String>) -> Self {
        Self {
            client: reqwest::Client::new(),
            endpoint: endpoint.into(),
        }
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }

    async fn upload(&self, upload: FileUpload) -> StoreResult<StoredFile> {
        let part = reqwest::multipart::Part::bytes(upload.bytes)
            .file_name(upload.file_name.clone());
        let form = reqwest::multipart::Form::new().part("file", part);

        let response = self
            .client
            .post(&self.endpoint)
            .multipart(form)
            .send()
            .await
            .context(SendRequestSnafu {
                stage: "send-store-request",
                endpoint: self.endpoint.clone(),
            })?;

        let status = response.status();
        let body = response.text().await.context(ReadBodySnafu {
            stage: "read-store-response",
        })?;

        interpret_store_response(status.as_u16(), &body)
    }
}

/// Maps a store response to its stored-file reference.
fn interpret_store_response(status: u16, body: &str) -> StoreResult<StoredFile> {
    if !(200..300).contains(&status) {
        return StoreStatusSnafu {
            stage: "store-http-status",
            status,
            body: body.to_string(),
        }
        .fail();
    }

    let stored: StoredFile = serde_json::from_str(body).map_err(|source| {
        ParseBodySnafu {
            stage: "parse-store-response",
            details: source.to_string(),
        }
        .build()
    })?;

    if stored.file_id.trim().is_empty() {
        return ParseBodySnafu {
            stage: "parse-store-response-file-id",
            details: "store response carried an empty file_id".to_string(),
        }
        .fail();
    }

    Ok(stored)
}

#[async_trait]
impl FileStore for HttpFileStore {
    async fn store_file(&self, upload: FileUpload) -> Result<StoredFile, TransferFailure> {
        let file_name = upload.file_name.clone();
        match self.upload(upload).await {
            Ok(stored) => Ok(stored),
            Err(error) => {
                tracing::warn!("store upload of '{}' failed: {}", file_name, error);
                Err(TransferFailure::new(error.to_string()))
            }
        }
    }
}
