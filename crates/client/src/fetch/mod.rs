//! HTTP fetch pipeline backing the worker's network seam.
//!
//! ### URL Canonicalization
//! - Trim whitespace, resolve relative paths against the origin
//! - Lowercase host, remove fragments
//! - Preserve query string
//!
//! ### Limits
//! - Max redirects: 5
//! - Max body bytes: 5MB (configurable)
//!
//! Non-2xx statuses come back as ordinary responses; only transport failures,
//! timeouts and oversized bodies are errors.

pub mod url;

use async_trait::async_trait;
use reqwest::{Client, Method, Url, header};
use std::time::{Duration, Instant};

pub use self::url::{UrlError, canonicalize, same_origin};

use shellcache_core::config::AppConfig;
use shellcache_core::fetcher::NetworkFetcher;
use shellcache_core::request::RequestDescriptor;
use shellcache_core::response::{Response, ResponseType};
use shellcache_core::Error;

/// Configuration for the HTTP fetcher.
#[derive(Debug, Clone)]
pub struct FetchConfig {
    /// Site origin; decides between `basic` and `cors` response types.
    pub origin: Url,

    /// User agent string (default: "shellcache/0.1")
    pub user_agent: String,

    /// Maximum response body size in bytes (default: 5MB)
    pub max_bytes: usize,

    /// Request timeout (default: 20s)
    pub timeout: Duration,

    /// Maximum number of redirects to follow (default: 5)
    pub max_redirects: usize,
}

impl FetchConfig {
    pub fn new(origin: Url) -> Self {
        Self {
            origin,
            user_agent: "shellcache/0.1".to_string(),
            max_bytes: 5 * 1024 * 1024,
            timeout: Duration::from_millis(20000),
            max_redirects: 5,
        }
    }

    /// Build from application config.
    pub fn from_app(config: &AppConfig) -> Result<Self, Error> {
        let origin = config.origin_url().map_err(|e| Error::InvalidUrl(e.to_string()))?;
        Ok(Self {
            user_agent: config.user_agent.clone(),
            max_bytes: config.max_bytes,
            timeout: config.timeout(),
            ..Self::new(origin)
        })
    }
}

/// reqwest-backed [`NetworkFetcher`].
pub struct HttpFetcher {
    http: Client,
    config: FetchConfig,
}

impl HttpFetcher {
    /// Create a new fetcher with the given configuration.
    pub fn new(config: FetchConfig) -> Result<Self, Error> {
        let http = Client::builder()
            .user_agent(&config.user_agent)
            .timeout(config.timeout)
            .redirect(reqwest::redirect::Policy::limited(config.max_redirects))
            .use_rustls_tls()
            .gzip(true)
            .brotli(true)
            .deflate(true)
            .build()
            .map_err(|e| Error::NetworkFailure(format!("failed to build HTTP client: {e}")))?;

        Ok(Self { http, config })
    }

    pub fn from_config(config: &AppConfig) -> Result<Self, Error> {
        Self::new(FetchConfig::from_app(config)?)
    }

    /// Get reference to the configuration.
    pub fn config(&self) -> &FetchConfig {
        &self.config
    }

    fn response_type(&self, final_url: &Url) -> ResponseType {
        if same_origin(final_url, &self.config.origin) { ResponseType::Basic } else { ResponseType::Cors }
    }

    fn too_large(&self, len: usize) -> Error {
        Error::NetworkFailure(format!("{len} bytes exceeds {}", self.config.max_bytes))
    }
}

#[async_trait]
impl NetworkFetcher for HttpFetcher {
    async fn fetch(&self, request: &RequestDescriptor) -> Result<Response, Error> {
        let start = Instant::now();
        let url = canonicalize(request.url().as_str(), &self.config.origin).map_err(|e| Error::InvalidUrl(e.to_string()))?;
        let method = Method::from_bytes(request.method().as_bytes())
            .map_err(|e| Error::InvalidRequest(format!("method {}: {e}", request.method())))?;

        let mut builder = self.http.request(method, url.as_str());
        if let Some(accept) = request.accept() {
            builder = builder.header(header::ACCEPT, accept);
        }

        let response = builder.send().await.map_err(|e| {
            if e.is_timeout() {
                Error::NetworkFailure(format!("timeout fetching {url}"))
            } else {
                Error::NetworkFailure(format!("network error: {e}"))
            }
        })?;

        if let Some(len) = response.content_length()
            && len as usize > self.config.max_bytes
        {
            return Err(self.too_large(len as usize));
        }

        let status = response.status();
        let final_url = response.url().clone();
        let headers = response.headers().clone();

        let bytes = response
            .bytes()
            .await
            .map_err(|e| Error::NetworkFailure(format!("failed to read response: {e}")))?;

        if bytes.len() > self.config.max_bytes {
            return Err(self.too_large(bytes.len()));
        }

        tracing::debug!(
            url = %url,
            final_url = %final_url,
            status = status.as_u16(),
            bytes = bytes.len(),
            fetch_ms = start.elapsed().as_millis() as u64,
            "fetched"
        );

        let mut out = Response::new(status.as_u16(), bytes)
            .with_status_text(status.canonical_reason().unwrap_or_default())
            .with_type(self.response_type(&final_url))
            .with_url(final_url.as_str());
        for (name, value) in headers.iter() {
            if let Ok(value) = value.to_str() {
                out = out.with_header(name.as_str(), value);
            }
        }
        Ok(out)
    }
}
