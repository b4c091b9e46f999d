//! HTTP JSON client for the playground backend.
//!
//! # Architecture
//!
//! - [`Backend`] - the seam the engine talks to; one method per endpoint
//! - [`PlaygroundClient`] - the `reqwest` implementation
//! - [`fetch_versions`] - concurrent fan-out over every toolchain component
//!
//! # Error Handling
//!
//! Every call resolves to `Result<_, ApiError>`. Failures are normalized into
//! three kinds:
//!
//! | Variant | Cause |
//! |---------|-------|
//! | `Network` | The request never produced a response |
//! | `Protocol` | The body was not JSON, or not the expected shape |
//! | `Application` | HTTP 4xx/5xx, or a 2xx body carrying an `error` field |
//!
//! Nothing is retried.

use std::future::Future;
use std::pin::Pin;
use std::time::Duration;

use futures_util::future::try_join_all;
use serde::Serialize;
use serde::de::DeserializeOwned;
use thiserror::Error;
use url::Url;

use playground_types::ToolchainComponent;
use playground_types::wire::{
    ClippyRequest, CompileRequest, CompileResponse, CrateInfo, CratesResponse, EditionRequest,
    ExecuteRequest, ExecuteResponse, FormatResponse, GistResponse, SaveGistRequest, ToolResponse,
    Version, Versions,
};

pub use playground_types;

const CONNECT_TIMEOUT_SECS: u64 = 30;
const POOL_MAX_IDLE_PER_HOST: usize = 16;
const POOL_IDLE_TIMEOUT_SECS: u64 = 90;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ApiError {
    #[error("Network error: {0}")]
    Network(String),
    #[error("Response was not JSON: {0}")]
    Protocol(String),
    #[error("{message}")]
    Application { status: u16, message: String },
}

impl ApiError {
    /// The descriptor stored on a failed request record.
    #[must_use]
    pub fn message(&self) -> String {
        self.to_string()
    }
}

/// Owned future returned by every [`Backend`] call.
pub type ApiFut<T> = Pin<Box<dyn Future<Output = Result<T, ApiError>> + Send + 'static>>;

/// The remote playground service.
///
/// Calls take owned payloads and return `'static` futures so callers can
/// spawn them and keep using the backend while they run.
pub trait Backend: Send + Sync {
    fn execute(&self, request: ExecuteRequest) -> ApiFut<ExecuteResponse>;
    fn compile(&self, request: CompileRequest) -> ApiFut<CompileResponse>;
    fn format(&self, request: EditionRequest) -> ApiFut<FormatResponse>;
    fn clippy(&self, request: ClippyRequest) -> ApiFut<ToolResponse>;
    fn miri(&self, request: EditionRequest) -> ApiFut<ToolResponse>;
    fn macro_expansion(&self, request: EditionRequest) -> ApiFut<ToolResponse>;
    fn load_gist(&self, id: String) -> ApiFut<GistResponse>;
    fn save_gist(&self, request: SaveGistRequest) -> ApiFut<GistResponse>;
    fn version(&self, component: ToolchainComponent) -> ApiFut<Version>;
    /// Available crates, sorted by name.
    fn crates(&self) -> ApiFut<Vec<CrateInfo>>;
}

/// Fetches every component version concurrently. One failure fails the lot.
pub async fn fetch_versions<B: Backend + ?Sized>(backend: &B) -> Result<Versions, ApiError> {
    let calls = ToolchainComponent::ALL.map(|component| backend.version(component));
    let [stable, beta, nightly, rustfmt, clippy, miri]: [Version; 6] = try_join_all(calls)
        .await?
        .try_into()
        .map_err(|_| ApiError::Protocol("incomplete version list".to_string()))?;
    Ok(Versions {
        stable,
        beta,
        nightly,
        rustfmt,
        clippy,
        miri,
    })
}

#[derive(Debug, Clone)]
pub struct PlaygroundClient {
    http: reqwest::Client,
    base: Url,
}

impl PlaygroundClient {
    pub fn new(base: Url, timeout: Duration) -> Result<Self, ApiError> {
        let http = reqwest::Client::builder()
            .connect_timeout(Duration::from_secs(CONNECT_TIMEOUT_SECS))
            .timeout(timeout)
            .pool_max_idle_per_host(POOL_MAX_IDLE_PER_HOST)
            .pool_idle_timeout(Some(Duration::from_secs(POOL_IDLE_TIMEOUT_SECS)))
            .build()
            .map_err(|e| ApiError::Network(e.to_string()))?;
        Ok(Self::with_http(http, base))
    }

    /// Uses an existing `reqwest` client. The base URL is treated as a
    /// directory, so `https://host/api` and `https://host/api/` are the same.
    #[must_use]
    pub fn with_http(http: reqwest::Client, mut base: Url) -> Self {
        if !base.path().ends_with('/') {
            let path = format!("{}/", base.path());
            base.set_path(&path);
        }
        Self { http, base }
    }

    #[must_use]
    pub fn base_url(&self) -> &Url {
        &self.base
    }

    fn endpoint(&self, path: &str) -> Result<Url, ApiError> {
        self.base
            .join(path)
            .map_err(|e| ApiError::Network(format!("invalid endpoint {path}: {e}")))
    }

    fn post<B, T>(&self, path: &str, body: B) -> ApiFut<T>
    where
        B: Serialize + Send + 'static,
        T: DeserializeOwned + Send + 'static,
    {
        let url = self.endpoint(path);
        let http = self.http.clone();
        Box::pin(async move {
            let url = url?;
            tracing::debug!(%url, "POST");
            fetch_json(http.post(url).json(&body)).await
        })
    }

    fn get<T>(&self, path: &str) -> ApiFut<T>
    where
        T: DeserializeOwned + Send + 'static,
    {
        let url = self.endpoint(path);
        let http = self.http.clone();
        Box::pin(async move {
            let url = url?;
            tracing::debug!(%url, "GET");
            fetch_json(http.get(url)).await
        })
    }
}

/// Sends a request and decodes its JSON body.
///
/// Error statuses become [`ApiError::Application`] whatever the body holds;
/// a JSON `error` field supplies the message when present. A success status
/// carrying an `error` field is a failure too.
async fn fetch_json<T: DeserializeOwned>(request: reqwest::RequestBuilder) -> Result<T, ApiError> {
    let response = request
        .send()
        .await
        .map_err(|e| ApiError::Network(e.to_string()))?;
    let status = response.status();
    let body = response
        .bytes()
        .await
        .map_err(|e| ApiError::Network(e.to_string()))?;
    let parsed = serde_json::from_slice::<serde_json::Value>(&body);

    if !status.is_success() {
        let message = parsed
            .ok()
            .as_ref()
            .and_then(|value| value.get("error"))
            .map(error_text)
            .unwrap_or_else(|| format!("HTTP {status}"));
        return Err(application_error(status, message));
    }

    let value = parsed.map_err(|e| ApiError::Protocol(e.to_string()))?;
    if let Some(error) = value.get("error") {
        return Err(application_error(status, error_text(error)));
    }
    serde_json::from_value(value).map_err(|e| ApiError::Protocol(e.to_string()))
}

fn error_text(error: &serde_json::Value) -> String {
    match error {
        serde_json::Value::String(text) => text.clone(),
        other => other.to_string(),
    }
}

fn application_error(status: reqwest::StatusCode, message: String) -> ApiError {
    tracing::warn!(status = status.as_u16(), %message, "Backend reported an error");
    ApiError::Application {
        status: status.as_u16(),
        message,
    }
}

impl Backend for PlaygroundClient {
    fn execute(&self, request: ExecuteRequest) -> ApiFut<ExecuteResponse> {
        self.post("execute", request)
    }

    fn compile(&self, request: CompileRequest) -> ApiFut<CompileResponse> {
        self.post("compile", request)
    }

    fn format(&self, request: EditionRequest) -> ApiFut<FormatResponse> {
        self.post("format", request)
    }

    fn clippy(&self, request: ClippyRequest) -> ApiFut<ToolResponse> {
        self.post("clippy", request)
    }

    fn miri(&self, request: EditionRequest) -> ApiFut<ToolResponse> {
        self.post("miri", request)
    }

    fn macro_expansion(&self, request: EditionRequest) -> ApiFut<ToolResponse> {
        self.post("macro-expansion", request)
    }

    fn load_gist(&self, id: String) -> ApiFut<GistResponse> {
        let path = format!("meta/gist/{}", urlencode_segment(&id));
        self.get(&path)
    }

    fn save_gist(&self, request: SaveGistRequest) -> ApiFut<GistResponse> {
        self.post("meta/gist", request)
    }

    fn version(&self, component: ToolchainComponent) -> ApiFut<Version> {
        self.get(&format!("meta/version/{component}"))
    }

    fn crates(&self) -> ApiFut<Vec<CrateInfo>> {
        let list: ApiFut<CratesResponse> = self.get("meta/crates");
        Box::pin(async move {
            let mut crates = list.await?.crates;
            crates.sort_by(|a, b| a.name.cmp(&b.name));
            Ok(crates)
        })
    }
}

/// Keeps a snippet id inside a single path segment.
fn urlencode_segment(segment: &str) -> String {
    url::form_urlencoded::byte_serialize(segment.as_bytes()).collect()
}
