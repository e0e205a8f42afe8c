//! A shared HTTP client with an explicit request timeout

use std::time::Duration;

use reqwest::{Client, IntoUrl, RequestBuilder, Response};

pub(crate) const DEFAULT_TIMEOUT: Duration = Duration::from_secs(60);

#[derive(Debug, Clone)]
pub(crate) struct HttpClient {
    inner: Client,
    timeout: Duration,
}

impl Default for HttpClient {
    fn default() -> Self {
        HttpClient::with_timeout(DEFAULT_TIMEOUT)
    }
}

impl HttpClient {
    pub(crate) fn with_timeout(timeout: Duration) -> HttpClient {
        HttpClient {
            inner: Client::new(),
            timeout,
        }
    }

    pub(crate) fn get<U: IntoUrl>(&self, url: U) -> RequestBuilder {
        self.inner.get(url).timeout(self.timeout)
    }

    pub(crate) fn post<U: IntoUrl>(&self, url: U) -> RequestBuilder {
        self.inner.post(url).timeout(self.timeout)
    }
}

/// Reads the body of an unsuccessful response. Error bodies are not trusted to be
/// well-formed, so this never fails; the caller decides whether the text parses.
pub(crate) async fn error_body(res: Response) -> String {
    match res.text().await {
        Ok(text) if !text.trim().is_empty() => text,
        Ok(_) => "the response body was empty".to_string(),
        Err(err) => format!("failed to read the response body: {}", err),
    }
}
