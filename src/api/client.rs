//! HTTP implementation of [`ExtractionApi`] using reqwest

use super::types::{
    ProcessRequest, ProcessResponse, Schema, SchemaListResponse, SchemaPayload, SchemaResponse,
    UploadResponse,
};
use super::ExtractionApi;
use crate::config::ClientConfig;
use crate::error::{Error, Result};
use crate::upload::PdfUpload;
use async_trait::async_trait;
use futures_util::StreamExt;
use reqwest::{Method, RequestBuilder, Response};
use serde::de::DeserializeOwned;
use url::Url;

pub(crate) const NO_RESPONSE: &str = "No response from server. Please check your connection.";
pub(crate) const SERVER_ERROR: &str = "Server error occurred";
pub(crate) const UNEXPECTED: &str = "An unexpected error occurred";
pub(crate) const BACKEND_UNAVAILABLE: &str = "Backend service is not available";
pub(crate) const EXPORT_FAILED: &str = "Failed to export results";
const INVALID_RESPONSE: &str = "Invalid response from server";

/// Client for the extraction backend REST API
#[derive(Clone)]
pub struct ApiClient {
    http: reqwest::Client,
    config: ClientConfig,
}

impl ApiClient {
    pub fn new(config: ClientConfig) -> Result<Self> {
        let http = reqwest::Client::builder()
            .timeout(config.upload_timeout)
            .build()
            .map_err(|e| Error::request(transport_error_message(&e)))?;
        Ok(Self { http, config })
    }

    pub fn config(&self) -> &ClientConfig {
        &self.config
    }

    fn url(&self, segments: &[&str]) -> Result<Url> {
        let mut url = self.config.endpoint("")?;
        url.path_segments_mut()
            .map_err(|_| Error::request("Invalid server URL"))?
            .pop_if_empty()
            .extend(segments);
        Ok(url)
    }

    fn request(&self, method: Method, segments: &[&str]) -> Result<RequestBuilder> {
        let url = self.url(segments)?;
        tracing::debug!("Making {} request to /{}", method, segments.join("/"));
        Ok(self.http.request(method, url))
    }

    /// Send a request and turn transport failures and non-2xx statuses
    /// into [`Error::Request`].
    async fn send(&self, request: RequestBuilder) -> Result<Response> {
        let response = request.send().await.map_err(|e| {
            tracing::warn!(error = %e, "API request failed without response");
            Error::request(transport_error_message(&e))
        })?;

        let status = response.status();
        if !status.is_success() {
            let body = response.bytes().await.unwrap_or_default();
            let message = server_error_message(&body);
            tracing::warn!(status = %status, message = %message, "API error");
            return Err(Error::request(message));
        }

        Ok(response)
    }

    async fn read_json<T: DeserializeOwned>(response: Response) -> Result<T> {
        let body = response
            .bytes()
            .await
            .map_err(|e| Error::request(transport_error_message(&e)))?;
        serde_json::from_slice(&body).map_err(|e| {
            tracing::warn!(error = %e, "Unexpected response body");
            Error::request(INVALID_RESPONSE)
        })
    }

    async fn fetch_export(&self, result_id: &str) -> Result<Vec<u8>> {
        let request = self
            .request(Method::GET, &["export", result_id])?
            .timeout(self.config.export_timeout);
        let response = self.send(request).await?;

        let mut data = Vec::new();
        let mut stream = response.bytes_stream();
        while let Some(chunk) = stream.next().await {
            let chunk = chunk.map_err(|e| Error::request(transport_error_message(&e)))?;
            data.extend_from_slice(&chunk);
        }

        if data.is_empty() {
            return Err(Error::request("Export returned an empty file"));
        }
        Ok(data)
    }
}

#[async_trait]
impl ExtractionApi for ApiClient {
    async fn health(&self) -> Result<serde_json::Value> {
        let outcome: Result<serde_json::Value> = async {
            let response = self.send(self.request(Method::GET, &["health"])?).await?;
            Self::read_json(response).await
        }
        .await;
        outcome.map_err(|e| {
            tracing::warn!(error = %e, "Health check failed");
            Error::request(BACKEND_UNAVAILABLE)
        })
    }

    async fn upload_file(&self, file: &PdfUpload) -> Result<UploadResponse> {
        let part = reqwest::multipart::Part::bytes(file.bytes.clone())
            .file_name(file.file_name.clone())
            .mime_str(&file.mime_type)
            .map_err(|e| Error::request(transport_error_message(&e)))?;
        let form = reqwest::multipart::Form::new().part("file", part);

        let request = self.request(Method::POST, &["upload"])?.multipart(form);
        let response = self.send(request).await?;
        let uploaded: UploadResponse = Self::read_json(response).await?;
        tracing::info!(
            session_id = %uploaded.session_id,
            bytes = uploaded.file.size_bytes,
            "Uploaded {}",
            uploaded.file.original_name
        );
        Ok(uploaded)
    }

    async fn list_schemas(&self) -> Result<Vec<Schema>> {
        let response = self.send(self.request(Method::GET, &["schemas"])?).await?;
        let list: SchemaListResponse = Self::read_json(response).await?;
        Ok(list.schemas)
    }

    async fn create_schema(&self, payload: &SchemaPayload) -> Result<Schema> {
        let request = self.request(Method::POST, &["schemas"])?.json(payload);
        let response = self.send(request).await?;
        let created: SchemaResponse = Self::read_json(response).await?;
        Ok(created.schema)
    }

    async fn update_schema(&self, schema_id: &str, payload: &SchemaPayload) -> Result<Schema> {
        let request = self
            .request(Method::PUT, &["schemas", schema_id])?
            .json(payload);
        let response = self.send(request).await?;
        let updated: SchemaResponse = Self::read_json(response).await?;
        Ok(updated.schema)
    }

    async fn delete_schema(&self, schema_id: &str) -> Result<()> {
        self.send(self.request(Method::DELETE, &["schemas", schema_id])?)
            .await?;
        Ok(())
    }

    async fn process_documents(
        &self,
        session_id: &str,
        schema_id: &str,
    ) -> Result<ProcessResponse> {
        let request = self
            .request(Method::POST, &["process"])?
            .json(&ProcessRequest {
                session_id,
                schema_id,
            });
        let response = self.send(request).await?;
        Self::read_json(response).await
    }

    async fn export_results(&self, result_id: &str) -> Result<Vec<u8>> {
        self.fetch_export(result_id).await.map_err(|e| {
            tracing::warn!(error = %e, result_id, "Export error");
            Error::export(EXPORT_FAILED)
        })
    }

    async fn reset_session(&self, session_id: &str) -> Result<()> {
        self.send(self.request(Method::DELETE, &["reset", session_id])?)
            .await?;
        Ok(())
    }
}

/// Message for a non-2xx response: the body's `error` field, then its
/// `message` field, then a generic fallback.
pub(crate) fn server_error_message(body: &[u8]) -> String {
    let parsed: Option<serde_json::Value> = serde_json::from_slice(body).ok();
    parsed
        .as_ref()
        .and_then(|v| {
            v.get("error")
                .and_then(|e| e.as_str())
                .or_else(|| v.get("message").and_then(|m| m.as_str()))
        })
        .filter(|s| !s.trim().is_empty())
        .map(str::to_string)
        .unwrap_or_else(|| SERVER_ERROR.to_string())
}

/// Message for a request that produced no usable response.
pub(crate) fn transport_error_message(err: &reqwest::Error) -> String {
    if err.is_builder() {
        let text = err.to_string();
        if text.is_empty() {
            UNEXPECTED.to_string()
        } else {
            text
        }
    } else {
        NO_RESPONSE.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_server_error_prefers_error_field() {
        let body = br#"{"error": "Schema not found", "message": "ignored"}"#;
        assert_eq!(server_error_message(body), "Schema not found");
    }

    #[test]
    fn test_server_error_falls_back_to_message() {
        let body = br#"{"message": "Session expired"}"#;
        assert_eq!(server_error_message(body), "Session expired");
    }

    #[test]
    fn test_server_error_generic_fallback() {
        assert_eq!(server_error_message(b""), SERVER_ERROR);
        assert_eq!(server_error_message(b"<html>502</html>"), SERVER_ERROR);
        assert_eq!(server_error_message(br#"{"error": ""}"#), SERVER_ERROR);
        assert_eq!(server_error_message(br#"{"error": 42}"#), SERVER_ERROR);
    }

    #[test]
    fn test_url_encodes_segments() {
        let client = ApiClient::new(ClientConfig::local().unwrap()).unwrap();
        let url = client.url(&["schemas", "a b/c"]).unwrap();
        assert_eq!(url.as_str(), "http://localhost:5000/api/schemas/a%20b%2Fc");
    }

    #[test]
    fn test_url_without_base_path() {
        let client =
            ApiClient::new(ClientConfig::with_base_url("http://example.com").unwrap()).unwrap();
        let url = client.url(&["health"]).unwrap();
        assert_eq!(url.as_str(), "http://example.com/health");
    }
}
