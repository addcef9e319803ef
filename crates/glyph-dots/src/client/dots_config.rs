//! Configuration for the OCR service client.

use std::time::Duration;

use url::Url;

use crate::{Error, Result};

/// Base URL used when none is configured.
pub const DEFAULT_BASE_URL: &str = "http://localhost:8501";

/// Default request timeout.
const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);

/// Default ceiling on a response body.
pub const DEFAULT_MAX_RESPONSE_SIZE: usize = 8 * 1024 * 1024;

/// Connection settings for [`DotsClient`].
///
/// # Examples
///
/// ```ignore
/// use std::time::Duration;
/// use glyph_dots::DotsConfig;
///
/// let config = DotsConfig::new("http://dots-ocr:8000")?
///     .with_timeout(Duration::from_secs(60))
///     .with_api_key("secret");
/// ```
///
/// [`DotsClient`]: crate::DotsClient
#[derive(Clone)]
#[must_use = "config does nothing unless you use it"]
pub struct DotsConfig {
    /// Base URL of the service, always ending in `/`.
    base_url: Url,

    /// Bearer token, if the service requires one.
    api_key: Option<String>,

    /// Timeout for a whole request, body included.
    timeout: Duration,

    /// User agent sent with every request.
    user_agent: String,

    /// Extra headers sent with every request.
    custom_headers: Vec<(String, String)>,

    /// Largest response body read before giving up.
    max_response_size: usize,
}

impl std::fmt::Debug for DotsConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DotsConfig")
            .field("base_url", &self.base_url.as_str())
            .field("api_key", &self.api_key.as_ref().map(|_| "****"))
            .field("timeout", &self.timeout)
            .field("user_agent", &self.user_agent)
            .field("custom_headers", &self.custom_headers)
            .field("max_response_size", &self.max_response_size)
            .finish()
    }
}

impl DotsConfig {
    /// Creates a configuration for the given base URL.
    ///
    /// Only `http` and `https` URLs are accepted. A path prefix such as
    /// `http://gateway/dots` is kept, so endpoints resolve beneath it.
    pub fn new(base_url: impl AsRef<str>) -> Result<Self> {
        let raw = base_url.as_ref().trim();
        let mut base_url = Url::parse(raw)
            .map_err(|e| Error::config(format!("Invalid OCR service URL '{raw}': {e}")))?;

        if !matches!(base_url.scheme(), "http" | "https") {
            return Err(Error::config(format!(
                "OCR service URL must use http or https, got '{}'",
                base_url.scheme()
            )));
        }

        if !base_url.path().ends_with('/') {
            let path = format!("{}/", base_url.path());
            base_url.set_path(&path);
        }

        Ok(Self {
            base_url,
            api_key: None,
            timeout: DEFAULT_TIMEOUT,
            user_agent: format!("glyph-dots/{}", env!("CARGO_PKG_VERSION")),
            custom_headers: Vec::new(),
            max_response_size: DEFAULT_MAX_RESPONSE_SIZE,
        })
    }

    /// Get the base URL of the service.
    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    /// Bearer token sent with every request.
    pub fn api_key(&self) -> Option<&str> {
        self.api_key.as_deref()
    }

    /// Per-request deadline.
    pub fn timeout(&self) -> Duration {
        self.timeout
    }

    /// User agent sent with every request, `glyph-dots/<version>` by default.
    pub fn user_agent(&self) -> &str {
        &self.user_agent
    }

    /// Get custom headers.
    pub fn custom_headers(&self) -> &[(String, String)] {
        &self.custom_headers
    }

    /// Largest response body accepted from the service, in bytes.
    pub fn max_response_size(&self) -> usize {
        self.max_response_size
    }

    /// Set the API key. Blank keys are ignored.
    pub fn with_api_key(mut self, api_key: impl Into<String>) -> Self {
        let api_key = api_key.into();
        self.api_key = (!api_key.trim().is_empty()).then_some(api_key);
        self
    }

    /// Overrides the per-request deadline.
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Overrides the user agent.
    pub fn with_user_agent(mut self, user_agent: impl Into<String>) -> Self {
        self.user_agent = user_agent.into();
        self
    }

    /// Extra header attached to every call, e.g. a routing key.
    pub fn with_header(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.custom_headers.push((key.into(), value.into()));
        self
    }

    /// Caps the response body; larger answers are treated as malformed.
    pub fn with_max_response_size(mut self, max_response_size: usize) -> Self {
        self.max_response_size = max_response_size;
        self
    }

    /// Resolves an endpoint path beneath the base URL.
    pub(crate) fn endpoint(&self, path: &str) -> Result<Url> {
        self.base_url
            .join(path)
            .map_err(|e| Error::config(format!("Failed to construct URL for '{path}': {e}")))
    }
}
