//! Blocking HTTP page source.
//!
//! Uses async reqwest internally on a shared tokio runtime, but presents a
//! sync interface so the pipelines stay plain sequential loops.

use std::sync::{LazyLock, OnceLock};
use std::time::Duration;

use reqwest::StatusCode;
use reqwest::header::{ACCEPT, HeaderMap, HeaderValue};

use crate::error::FetchError;
use crate::paginate::{Bundle, PageSource};

/// Media type for FHIR JSON resources
pub const FHIR_JSON: &str = "application/fhir+json";

/// Client-wide HTTP settings, fixed once before the first request.
#[derive(Debug, Clone)]
pub struct HttpConfig {
    /// Whole-request timeout (`None` = wait indefinitely)
    pub timeout: Option<Duration>,
    pub connect_timeout: Duration,
}

impl Default for HttpConfig {
    fn default() -> Self {
        Self {
            timeout: Some(Duration::from_secs(60)),
            connect_timeout: Duration::from_secs(30),
        }
    }
}

static HTTP_CONFIG: OnceLock<HttpConfig> = OnceLock::new();

/// Install HTTP settings. Only the first call takes effect.
pub fn set_http_config(config: HttpConfig) {
    if HTTP_CONFIG.set(config).is_err() {
        log::warn!("HTTP config already initialized, ignoring new settings");
    }
}

/// Current HTTP settings (defaults if never set)
pub fn http_config() -> &'static HttpConfig {
    HTTP_CONFIG.get_or_init(HttpConfig::default)
}

static SHARED_CLIENT: LazyLock<reqwest::Client> = LazyLock::new(|| {
    let config = http_config();
    let mut builder = reqwest::Client::builder()
        .connect_timeout(config.connect_timeout)
        .user_agent(concat!("plannet/", env!("CARGO_PKG_VERSION")));
    if let Some(timeout) = config.timeout {
        builder = builder.timeout(timeout);
    }
    builder.build().expect("failed to build HTTP client")
});

/// Get shared HTTP client.
pub fn http_client() -> &'static reqwest::Client {
    &SHARED_CLIENT
}

/// Shared tokio runtime for HTTP operations.
///
/// Multi-thread flavor: `Handle::block_on` cannot drive IO on a
/// current-thread runtime.
pub static SHARED_RUNTIME: LazyLock<tokio::runtime::Runtime> = LazyLock::new(|| {
    tokio::runtime::Builder::new_multi_thread()
        .worker_threads(1)
        .enable_all()
        .build()
        .expect("failed to build tokio runtime")
});

/// [`PageSource`] that GETs each page over HTTP with a fixed header set.
#[derive(Debug, Clone)]
pub struct HttpPageSource {
    headers: HeaderMap,
}

impl HttpPageSource {
    pub fn new(headers: HeaderMap) -> Self {
        Self { headers }
    }

    /// Source sending only an `Accept` header. Empty `accept` sends none.
    pub fn with_accept(accept: &str) -> Result<Self, FetchError> {
        let mut headers = HeaderMap::new();
        if !accept.is_empty() {
            let value = HeaderValue::from_str(accept).map_err(|e| FetchError::Http {
                status: None,
                message: format!("invalid Accept header {accept:?}: {e}"),
            })?;
            headers.insert(ACCEPT, value);
        }
        Ok(Self::new(headers))
    }

    pub fn headers(&self) -> &HeaderMap {
        &self.headers
    }
}

impl PageSource for HttpPageSource {
    fn fetch(&mut self, url: &str) -> Result<Bundle, FetchError> {
        SHARED_RUNTIME.handle().block_on(async {
            let response = http_client()
                .get(url)
                .headers(self.headers.clone())
                .send()
                .await
                .map_err(|e| FetchError::from_reqwest(&e))?;

            let status = response.status();
            if status != StatusCode::OK {
                return Err(FetchError::unexpected_status(status));
            }

            let body = response
                .bytes()
                .await
                .map_err(|e| FetchError::from_reqwest(&e))?;
            Ok::<Bundle, FetchError>(serde_json::from_slice(&body)?)
        })
    }
}
