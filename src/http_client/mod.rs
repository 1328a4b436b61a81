//! HTTP client used for the manifest and sheet downloads.

mod response;

pub use response::{parse_content_disposition_filename, HttpResponse};

use std::collections::HashMap;
use std::time::{Duration, Instant};

use reqwest::redirect::Policy;
use reqwest::Client;

/// Default user agent.
pub const USER_AGENT: &str = concat!("roadworks/", env!("CARGO_PKG_VERSION"));

/// Maximum redirects followed for a single request.
const MAX_REDIRECTS: usize = 10;

/// Thin wrapper over `reqwest` with per-request timeouts and request logging.
#[derive(Clone)]
pub struct HttpClient {
    client: Client,
}

impl HttpClient {
    /// Create a new HTTP client.
    pub fn new(user_agent: Option<&str>) -> Result<Self, reqwest::Error> {
        let client = Client::builder()
            .user_agent(user_agent.unwrap_or(USER_AGENT))
            .redirect(Policy::limited(MAX_REDIRECTS))
            .gzip(true)
            .brotli(true)
            .build()?;

        Ok(Self { client })
    }

    /// GET `url`, giving up after `timeout`. Redirects are followed.
    pub async fn get(&self, url: &str, timeout: Duration) -> Result<HttpResponse, reqwest::Error> {
        let start = Instant::now();
        let response = self.client.get(url).timeout(timeout).send().await?;

        let mut headers = HashMap::new();
        for (name, value) in response.headers() {
            if let Ok(v) = value.to_str() {
                headers.insert(name.as_str().to_lowercase(), v.to_string());
            }
        }

        tracing::debug!(
            "GET {} -> {} in {}ms",
            url,
            response.status().as_u16(),
            start.elapsed().as_millis()
        );

        Ok(HttpResponse {
            status: response.status(),
            headers,
            response,
        })
    }
}
