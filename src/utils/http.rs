use std::collections::HashMap;
use std::time::Duration;

use log::debug;
use reqwest::{Client, StatusCode};

/// Default timeout for HTTP requests in seconds
pub const DEFAULT_TIMEOUT: u64 = 30;

/// Default User-Agent sent with outbound requests
pub const DEFAULT_USER_AGENT: &str = "subprofile/0.1";

/// Options for a single outbound GET.
#[derive(Debug, Clone)]
pub struct FetchOptions {
    pub timeout: Duration,
    pub user_agent: String,
    pub headers: HashMap<String, String>,
}

impl Default for FetchOptions {
    fn default() -> Self {
        FetchOptions {
            timeout: Duration::from_secs(DEFAULT_TIMEOUT),
            user_agent: DEFAULT_USER_AGENT.to_string(),
            headers: HashMap::new(),
        }
    }
}

impl FetchOptions {
    pub fn new(timeout_secs: u64, user_agent: &str) -> Self {
        FetchOptions {
            timeout: Duration::from_secs(timeout_secs),
            user_agent: user_agent.to_string(),
            headers: HashMap::new(),
        }
    }

    pub fn header(mut self, key: &str, value: &str) -> Self {
        self.headers.insert(key.to_string(), value.to_string());
        self
    }
}

/// Any 2xx status counts as a successful fetch.
fn check_status(status: StatusCode) -> Result<(), String> {
    if status.is_success() {
        Ok(())
    } else {
        Err(format!("HTTP error: {}", status))
    }
}

/// Makes an HTTP GET request to the specified URL
///
/// # Returns
/// * `Ok((body, headers))` on a 2xx response
/// * `Err(String)` - Error message if the request failed or the status was not 2xx
pub async fn web_get_async(
    url: &str,
    options: &FetchOptions,
) -> Result<(String, HashMap<String, String>), String> {
    let client = Client::builder()
        .timeout(options.timeout)
        .user_agent(options.user_agent.as_str())
        .build()
        .map_err(|e| format!("Failed to build HTTP client: {}", e))?;

    let mut request_builder = client.get(url);
    for (key, value) in &options.headers {
        request_builder = request_builder.header(key.as_str(), value.as_str());
    }

    debug!("GET {}", url);
    let response = request_builder
        .send()
        .await
        .map_err(|e| format!("Failed to send request: {}", e))?;

    let mut resp_headers = HashMap::new();
    for (key, value) in response.headers() {
        if let Ok(v) = value.to_str() {
            resp_headers.insert(key.to_string(), v.to_string());
        }
    }

    check_status(response.status())?;

    match response.text().await {
        Ok(body) => Ok((body, resp_headers)),
        Err(e) => Err(format!("Failed to read response body: {}", e)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_check_status() {
        assert!(check_status(StatusCode::OK).is_ok());
        assert!(check_status(StatusCode::NO_CONTENT).is_ok());
        assert!(check_status(StatusCode::PARTIAL_CONTENT).is_ok());
        assert_eq!(
            check_status(StatusCode::NOT_FOUND),
            Err("HTTP error: 404 Not Found".to_string())
        );
        assert!(check_status(StatusCode::MOVED_PERMANENTLY).is_err());
    }

    #[test]
    fn test_fetch_options_builder() {
        let options = FetchOptions::new(5, "agent/1").header("Accept", "*/*");
        assert_eq!(options.timeout, Duration::from_secs(5));
        assert_eq!(options.user_agent, "agent/1");
        assert_eq!(options.headers.get("Accept").map(String::as_str), Some("*/*"));
    }
}
