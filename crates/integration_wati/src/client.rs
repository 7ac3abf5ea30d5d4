//! HTTP transport for the Wati REST API
//!
//! Every request goes to `<base_url>/<tenant_id>/<path>` with the bearer
//! token attached. Status codes are mapped to [`WatiError`] here so that
//! callers only ever see successful, parsed bodies. No retries happen at
//! this layer.

use std::{
    path::{Path, PathBuf},
    time::Duration,
};

use futures::StreamExt;
use reqwest::{Client, Method, RequestBuilder, Response, StatusCode, multipart::Form};
use secrecy::ExposeSecret;
use serde_json::Value;
use tokio::io::AsyncWriteExt;
use tracing::{debug, instrument, warn};

use crate::{config::WatiClientConfig, error::WatiError, normalize};

/// Query parameters as key/value pairs
pub type Query<'a> = [(&'a str, String)];

/// Client for the Wati API
///
/// Cheap to clone; clones share the connection pool and are safe to use
/// from concurrent tasks.
#[derive(Debug, Clone)]
pub struct WatiClient {
    client: Client,
    config: WatiClientConfig,
    api_root: String,
}

impl WatiClient {
    /// Create a new Wati client
    ///
    /// # Errors
    ///
    /// Returns an error if the configuration is incomplete or the HTTP
    /// client cannot be created.
    pub fn new(config: WatiClientConfig) -> Result<Self, WatiError> {
        config.validate()?;

        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()
            .map_err(|e| WatiError::Configuration(format!("HTTP client: {e}")))?;

        Ok(Self {
            api_root: config.api_root(),
            client,
            config,
        })
    }

    /// The configuration this client was built with
    #[must_use]
    pub const fn config(&self) -> &WatiClientConfig {
        &self.config
    }

    fn url(&self, path: &str) -> String {
        format!("{}/{}", self.api_root, path.trim_start_matches('/'))
    }

    fn request(&self, method: Method, path: &str, query: &Query<'_>) -> RequestBuilder {
        let mut builder = self
            .client
            .request(method, self.url(path))
            .bearer_auth(self.config.auth_token.expose_secret());
        if !query.is_empty() {
            builder = builder.query(query);
        }
        builder
    }

    /// Issue a JSON request and return the status with the parsed body
    ///
    /// An empty response body parses to `Value::Null`.
    ///
    /// # Errors
    ///
    /// Fails with the mapped [`WatiError`] for 401/403, 429, other non-2xx
    /// statuses, transport failures and unparseable bodies.
    #[instrument(skip(self, query, body), fields(method = %method, path = %path))]
    pub async fn call(
        &self,
        method: Method,
        path: &str,
        query: &Query<'_>,
        body: Option<&Value>,
    ) -> Result<(StatusCode, Value), WatiError> {
        let mut builder = self.request(method, path, query);
        if let Some(body) = body {
            builder = builder.json(body);
        }
        self.execute(builder).await
    }

    /// Issue a multipart POST and return the status with the parsed body
    ///
    /// # Errors
    ///
    /// Same mapping as [`Self::call`].
    #[instrument(skip(self, query, form), fields(path = %path))]
    pub async fn post_multipart(
        &self,
        path: &str,
        query: &Query<'_>,
        form: Form,
    ) -> Result<(StatusCode, Value), WatiError> {
        let builder = self.request(Method::POST, path, query).multipart(form);
        self.execute(builder).await
    }

    /// Stream a GET response body into `destination`
    ///
    /// Bytes are written to a temporary sibling file first and renamed into
    /// place once complete, so an existing file is replaced atomically and a
    /// failed transfer never leaves a truncated file behind.
    ///
    /// # Errors
    ///
    /// Fails with the mapped [`WatiError`] for error statuses or transport
    /// failures and with [`WatiError::Io`] if the file cannot be written.
    #[instrument(skip(self, query), fields(path = %path, destination = %destination.display()))]
    pub async fn download(
        &self,
        path: &str,
        query: &Query<'_>,
        destination: &Path,
    ) -> Result<u64, WatiError> {
        let response = self.send(self.request(Method::GET, path, query)).await?;
        let response = Self::check_status(response).await?;

        let partial = partial_path(destination);
        let written = match write_stream(response, &partial, self.config.timeout_secs).await {
            Ok(written) => written,
            Err(e) => {
                if let Err(cleanup) = tokio::fs::remove_file(&partial).await {
                    warn!(error = %cleanup, "Failed to remove partial download");
                }
                return Err(e);
            },
        };
        tokio::fs::rename(&partial, destination).await?;

        debug!(bytes = written, "Download complete");
        Ok(written)
    }

    /// Fetch an arbitrary `http(s)` URL into memory
    ///
    /// Used for media the caller references by URL. The Wati bearer token is
    /// not sent to third-party hosts.
    ///
    /// # Errors
    ///
    /// Same status and transport mapping as [`Self::call`].
    #[instrument(skip(self))]
    pub async fn fetch_url(&self, url: &str) -> Result<Vec<u8>, WatiError> {
        let response = self.send(self.client.get(url)).await?;
        let response = Self::check_status(response).await?;
        let bytes = response
            .bytes()
            .await
            .map_err(|e| WatiError::from_transport(&e, self.config.timeout_secs))?;

        debug!(bytes = bytes.len(), "Fetched remote file");
        Ok(bytes.to_vec())
    }

    async fn execute(&self, builder: RequestBuilder) -> Result<(StatusCode, Value), WatiError> {
        let response = self.send(builder).await?;
        let response = Self::check_status(response).await?;
        let status = response.status();

        let text = response
            .text()
            .await
            .map_err(|e| WatiError::from_transport(&e, self.config.timeout_secs))?;

        if text.trim().is_empty() {
            return Ok((status, Value::Null));
        }

        let body = serde_json::from_str(&text)
            .map_err(|e| WatiError::schema(format!("response is not valid JSON: {e}")))?;
        Ok((status, body))
    }

    async fn send(&self, builder: RequestBuilder) -> Result<Response, WatiError> {
        let response = builder
            .send()
            .await
            .map_err(|e| WatiError::from_transport(&e, self.config.timeout_secs))?;
        debug!(status = %response.status(), "Received Wati response");
        Ok(response)
    }

    async fn check_status(response: Response) -> Result<Response, WatiError> {
        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }

        if status == StatusCode::TOO_MANY_REQUESTS {
            let retry_after = response
                .headers()
                .get("Retry-After")
                .and_then(|h| h.to_str().ok())
                .and_then(|s| s.trim().parse().ok());

            return Err(WatiError::RateLimitExceeded {
                retry_after_secs: retry_after,
            });
        }

        let error_text = response.text().await.unwrap_or_default();
        let message = serde_json::from_str::<Value>(&error_text)
            .ok()
            .and_then(|body| normalize::error_message(&body))
            .unwrap_or(error_text);

        if status == StatusCode::UNAUTHORIZED || status == StatusCode::FORBIDDEN {
            return Err(WatiError::AuthenticationFailed {
                status: status.as_u16(),
                message,
            });
        }

        warn!(status = %status, message = %message, "Wati API returned an error");
        Err(WatiError::Api {
            status: status.as_u16(),
            message,
        })
    }
}

fn partial_path(destination: &Path) -> PathBuf {
    let name = destination
        .file_name()
        .map_or_else(|| "download".into(), |n| n.to_string_lossy());
    destination.with_file_name(format!(".{name}.{}.part", uuid::Uuid::new_v4()))
}

async fn write_stream(response: Response, path: &Path, timeout_secs: u64) -> Result<u64, WatiError> {
    let mut file = tokio::fs::File::create(path).await?;
    let mut stream = response.bytes_stream();
    let mut written = 0u64;

    while let Some(chunk) = stream.next().await {
        let chunk = chunk.map_err(|e| WatiError::from_transport(&e, timeout_secs))?;
        file.write_all(&chunk).await?;
        written += chunk.len() as u64;
    }

    file.flush().await?;
    file.sync_all().await?;
    Ok(written)
}
