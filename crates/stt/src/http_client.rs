use std::time::Duration;

use reqwest::Client;

/// HTTP client shared by both providers of a controller
pub(crate) fn http_client(timeout: Duration) -> crate::error::Result<Client> {
    let mut headers = http::HeaderMap::new();
    headers.insert(http::header::CONNECTION, http::HeaderValue::from_static("keep-alive"));

    Client::builder()
        .timeout(timeout)
        .pool_idle_timeout(Some(Duration::from_secs(5)))
        .tcp_nodelay(true)
        .tcp_keepalive(Some(Duration::from_secs(60)))
        .default_headers(headers)
        .build()
        .map_err(|e| crate::error::SttError::ConfigError(format!("failed to build HTTP client: {e}")))
}
