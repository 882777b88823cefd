//! Generator backend client
//!
//! `GeneratorApi` is the seam the wizard talks to; `HttpGeneratorApi` is the
//! reqwest implementation. Calls are blocking and run on worker threads
//! spawned by `RequestRunner`.

use crate::error::ApiError;
use reqwest::blocking::Client;
use reqwest::header::CONTENT_DISPOSITION;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::time::Duration;

pub const DATABASES_PATH: &str = "/api/generator/databases";
pub const TABLES_PATH: &str = "/api/generator/tables";
pub const GENERATE_PATH: &str = "/api/generator/generate";
pub const GENERATE_DOWNLOAD_PATH: &str = "/api/generator/generate-download";

/// Shown when a failed download response carries no usable body
pub const GENERATE_FAILED: &str = "生成失败";

/// Database credentials, sent with every request
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ConnectionInfo {
    pub db_url: String,
    pub db_username: String,
    pub db_password: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TablesRequest {
    #[serde(flatten)]
    pub connection: ConnectionInfo,
    pub database_name: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GenerateRequest {
    #[serde(flatten)]
    pub connection: ConnectionInfo,
    pub database_name: String,
    pub table_name: String,
    pub package_name: String,
    pub output_dir: String,
}

/// JSON envelope returned by the list and generate endpoints
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct ApiResponse<T> {
    pub success: bool,
    pub message: Option<String>,
    pub data: Option<T>,
}

impl<T> ApiResponse<T> {
    /// Server message, treating an empty string as absent
    pub fn message_or<'a>(&'a self, fallback: &'a str) -> &'a str {
        self.message
            .as_deref()
            .filter(|m| !m.is_empty())
            .unwrap_or(fallback)
    }
}

/// Successful `generate-download` response
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DownloadPayload {
    pub content_disposition: Option<String>,
    pub bytes: Vec<u8>,
}

pub trait GeneratorApi: Send + Sync {
    fn list_databases(&self, connection: &ConnectionInfo)
        -> Result<ApiResponse<Vec<String>>, ApiError>;

    fn list_tables(&self, request: &TablesRequest) -> Result<ApiResponse<Vec<String>>, ApiError>;

    /// Generate into the server-side output directory
    fn generate(&self, request: &GenerateRequest) -> Result<ApiResponse<Value>, ApiError>;

    /// Generate and stream the archive back
    fn generate_download(&self, request: &GenerateRequest) -> Result<DownloadPayload, ApiError>;
}

pub struct HttpGeneratorApi {
    client: Client,
    base_url: String,
}

impl HttpGeneratorApi {
    pub fn new(base_url: &str, timeout: Duration) -> Result<Self, ApiError> {
        let client = Client::builder().timeout(timeout).build()?;
        Ok(Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
        })
    }

    fn endpoint(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    /// POST a JSON body and decode the JSON envelope
    ///
    /// The status code is not checked: these endpoints report failures
    /// through `success: false`, and anything that is not the envelope is a
    /// decode error.
    fn post_json<B, T>(&self, path: &str, body: &B) -> Result<ApiResponse<T>, ApiError>
    where
        B: Serialize + ?Sized,
        T: DeserializeOwned,
    {
        log::debug!("POST {}", path);
        let response = self.client.post(self.endpoint(path)).json(body).send()?;
        let status = response.status();
        let text = response.text()?;
        serde_json::from_str(&text).map_err(|e| {
            log::warn!("POST {} returned HTTP {} with a non-envelope body", path, status);
            ApiError::Decode(e.to_string())
        })
    }
}

impl GeneratorApi for HttpGeneratorApi {
    fn list_databases(
        &self,
        connection: &ConnectionInfo,
    ) -> Result<ApiResponse<Vec<String>>, ApiError> {
        self.post_json(DATABASES_PATH, connection)
    }

    fn list_tables(&self, request: &TablesRequest) -> Result<ApiResponse<Vec<String>>, ApiError> {
        self.post_json(TABLES_PATH, request)
    }

    fn generate(&self, request: &GenerateRequest) -> Result<ApiResponse<Value>, ApiError> {
        self.post_json(GENERATE_PATH, request)
    }

    fn generate_download(&self, request: &GenerateRequest) -> Result<DownloadPayload, ApiError> {
        log::debug!("POST {}", GENERATE_DOWNLOAD_PATH);
        let response = self
            .client
            .post(self.endpoint(GENERATE_DOWNLOAD_PATH))
            .json(request)
            .send()?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text()?;
            return Err(ApiError::Status {
                status: status.as_u16(),
                body,
            });
        }

        let content_disposition = response
            .headers()
            .get(CONTENT_DISPOSITION)
            .and_then(|value| value.to_str().ok())
            .map(str::to_string);
        let bytes = response.bytes()?.to_vec();

        Ok(DownloadPayload {
            content_disposition,
            bytes,
        })
    }
}

/// Human-readable message from a failed download response body
///
/// JSON bodies yield `message`, then `msg`, then the raw body; anything else
/// is shown as-is; an empty body gives the generic failure text.
pub fn extract_error_message(body: &str) -> String {
    match serde_json::from_str::<Value>(body) {
        Ok(json) => ["message", "msg"]
            .iter()
            .filter_map(|key| json.get(key).and_then(Value::as_str))
            .find(|m| !m.is_empty())
            .unwrap_or(body)
            .to_string(),
        Err(_) if body.is_empty() => GENERATE_FAILED.to_string(),
        Err(_) => body.to_string(),
    }
}
