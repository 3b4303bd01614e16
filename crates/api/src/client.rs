//! HTTP request handle shared by the controllers

use reqwest::header::{HeaderMap, HeaderName, HeaderValue};
use reqwest::{Method, RequestBuilder};
use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::Value;
use std::time::{Duration, Instant};
use tracing::{debug, info};

use shopcheck_common::{ApiConfig, CheckError, CheckResult, LlmConfig};

const JSON_HEADERS: [(&str, &str); 2] = [
    ("content-type", "application/json"),
    ("accept", "application/json"),
];

/// A configured client bound to one base URL
#[derive(Debug, Clone)]
pub struct ApiClient {
    http: reqwest::Client,
    base_url: String,
    log_requests: bool,
    log_responses: bool,
}

impl ApiClient {
    pub fn new(base_url: &str, timeout: Duration) -> CheckResult<Self> {
        let mut headers = HeaderMap::new();
        for (name, value) in JSON_HEADERS {
            headers.insert(HeaderName::from_static(name), HeaderValue::from_static(value));
        }

        let http = reqwest::Client::builder()
            .timeout(timeout)
            .default_headers(headers)
            .build()?;

        Ok(Self {
            http,
            base_url: base_url.trim_end_matches('/').to_string(),
            log_requests: false,
            log_responses: false,
        })
    }

    /// Client for the mock REST API
    pub fn for_api(config: &ApiConfig) -> CheckResult<Self> {
        Ok(Self::new(&config.base_url, config.timeout())?
            .with_logging(config.log_requests, config.log_responses))
    }

    /// Client for the OpenAI-style local endpoint
    pub fn for_llm(config: &LlmConfig) -> CheckResult<Self> {
        Self::new(&config.base_url, config.timeout())
    }

    pub fn with_logging(mut self, requests: bool, responses: bool) -> Self {
        self.log_requests = requests;
        self.log_responses = responses;
        self
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    pub fn url(&self, path: &str) -> String {
        format!("{}/{}", self.base_url, path.trim_start_matches('/'))
    }

    pub async fn get(&self, path: &str) -> CheckResult<ApiResponse> {
        self.send(Method::GET, path, None, |r| r).await
    }

    pub async fn get_with_query(
        &self,
        path: &str,
        query: &[(&str, String)],
    ) -> CheckResult<ApiResponse> {
        let query = query.to_vec();
        self.send(Method::GET, path, None, move |r| r.query(&query)).await
    }

    pub async fn post_json<T: Serialize + ?Sized>(
        &self,
        path: &str,
        body: &T,
    ) -> CheckResult<ApiResponse> {
        let body = serde_json::to_string(body)?;
        self.send(Method::POST, path, Some(body), |r| r).await
    }

    /// POST `body` verbatim, whether or not it is valid JSON
    pub async fn post_raw(&self, path: &str, body: impl Into<String>) -> CheckResult<ApiResponse> {
        self.send(Method::POST, path, Some(body.into()), |r| r).await
    }

    pub async fn put_json<T: Serialize + ?Sized>(
        &self,
        path: &str,
        body: &T,
    ) -> CheckResult<ApiResponse> {
        let body = serde_json::to_string(body)?;
        self.send(Method::PUT, path, Some(body), |r| r).await
    }

    pub async fn delete(&self, path: &str) -> CheckResult<ApiResponse> {
        self.send(Method::DELETE, path, None, |r| r).await
    }

    async fn send<F>(
        &self,
        method: Method,
        path: &str,
        body: Option<String>,
        customize: F,
    ) -> CheckResult<ApiResponse>
    where
        F: FnOnce(RequestBuilder) -> RequestBuilder,
    {
        let url = self.url(path);
        if self.log_requests {
            info!("→ {} {}", method, url);
            if let Some(body) = &body {
                debug!("  request body: {}", body);
            }
        }

        let mut request = customize(self.http.request(method.clone(), &url));
        if let Some(body) = body {
            request = request.body(body);
        }

        let start = Instant::now();
        let response = request.send().await.map_err(|e| transport_error(e, &method, &url))?;
        let status = response.status().as_u16();
        let headers = response.headers().clone();
        let body = response.text().await.map_err(|e| transport_error(e, &method, &url))?;
        let elapsed = start.elapsed();

        if self.log_responses {
            info!("← {} {} {} ({} ms)", status, method, url, elapsed.as_millis());
            debug!("  response body: {}", body);
        }

        Ok(ApiResponse {
            method: method.to_string(),
            url,
            status,
            headers,
            body,
            elapsed,
        })
    }
}

fn transport_error(error: reqwest::Error, method: &Method, url: &str) -> CheckError {
    if error.is_timeout() {
        CheckError::Timeout(format!("{} {}", method, url))
    } else {
        CheckError::Http(error)
    }
}

/// A fully read response.
///
/// The body is buffered so validators can inspect it as often as they like.
#[derive(Debug, Clone)]
pub struct ApiResponse {
    pub method: String,
    pub url: String,
    pub status: u16,
    pub headers: HeaderMap,
    pub body: String,
    pub elapsed: Duration,
}

impl ApiResponse {
    pub fn status(&self) -> u16 {
        self.status
    }

    /// Any 2xx status
    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }

    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers.get(name).and_then(|v| v.to_str().ok())
    }

    pub fn text(&self) -> &str {
        &self.body
    }

    pub fn json<T: DeserializeOwned>(&self) -> CheckResult<T> {
        serde_json::from_str(&self.body).map_err(|e| {
            CheckError::assertion(format!(
                "{} {}: body is not the expected JSON: {}",
                self.method, self.url, e
            ))
        })
    }

    pub fn value(&self) -> CheckResult<Value> {
        self.json()
    }

    pub fn elapsed(&self) -> Duration {
        self.elapsed
    }
}
