//! DataGateway over HTTP. Raw tables, trend series, and CSV uploads.

use super::client::ApiClient;
use crate::domain::{
    BatchRecord, CapaRecord, ComplaintRecord, DomainError, TrendSeries, UploadRecord, UploadResult,
};
use crate::ports::DataGateway;
use tracing::info;

#[async_trait::async_trait]
impl DataGateway for ApiClient {
    async fn dashboard(&self) -> Result<serde_json::Value, DomainError> {
        self.get_json("/data/dashboard", &[]).await
    }

    async fn batches(&self, limit: u32) -> Result<Vec<BatchRecord>, DomainError> {
        self.get_json("/data/batches", &[("limit", limit.to_string())])
            .await
    }

    async fn trends(&self, parameter: &str, days: u32) -> Result<TrendSeries, DomainError> {
        self.get_json(
            &format!("/data/trends/{parameter}"),
            &[("days", days.to_string())],
        )
        .await
    }

    async fn complaints(&self, status: Option<&str>) -> Result<Vec<ComplaintRecord>, DomainError> {
        let query = match status {
            Some(s) => vec![("status", s.to_string())],
            None => Vec::new(),
        };
        self.get_json("/data/complaints", &query).await
    }

    async fn capas(&self, status: Option<&str>) -> Result<Vec<CapaRecord>, DomainError> {
        let query = match status {
            Some(s) => vec![("status", s.to_string())],
            None => Vec::new(),
        };
        self.get_json("/data/capas", &query).await
    }

    async fn upload(
        &self,
        data_type: &str,
        filename: &str,
        bytes: Vec<u8>,
    ) -> Result<UploadResult, DomainError> {
        info!(data_type, filename, size = bytes.len(), "uploading CSV");
        let part = reqwest::multipart::Part::bytes(bytes)
            .file_name(filename.to_string())
            .mime_str("text/csv")
            .map_err(|e| DomainError::Transport(format!("invalid upload part: {e}")))?;
        let form = reqwest::multipart::Form::new().part("file", part);
        self.post_multipart(
            "/data/upload",
            &[("data_type", data_type.to_string())],
            form,
        )
        .await
    }

    async fn uploads(&self) -> Result<Vec<UploadRecord>, DomainError> {
        self.get_json("/data/uploads", &[]).await
    }
}
