//! HTTP transport abstraction.
//!
//! The fetcher only depends on the `Transport` trait and never constructs a
//! client itself, so tests can substitute a scripted double keyed by URL.

use anyhow::{Context, Result};
use std::collections::HashMap;
use std::sync::Mutex;
use std::time::Duration;

/// A completed GET: status code plus the full response body.
#[derive(Debug, Clone)]
pub struct Response {
    pub status: u32,
    pub body: Vec<u8>,
}

impl Response {
    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }

    /// Body as UTF-8 text (e.g. the checksum manifest).
    pub fn text(&self) -> Result<&str> {
        std::str::from_utf8(&self.body).context("response body is not valid UTF-8")
    }
}

/// Minimal blocking HTTP capability consumed by the fetcher.
pub trait Transport {
    fn get(&self, url: &str) -> Result<Response>;
}

/// Production transport over libcurl. Follows redirects and applies
/// connect/total timeouts; everything else is left at libcurl defaults.
pub struct CurlTransport {
    connect_timeout: Duration,
    timeout: Duration,
}

impl CurlTransport {
    pub fn new() -> Self {
        Self {
            connect_timeout: Duration::from_secs(30),
            timeout: Duration::from_secs(3600),
        }
    }
}

impl Default for CurlTransport {
    fn default() -> Self {
        Self::new()
    }
}

impl Transport for CurlTransport {
    fn get(&self, url: &str) -> Result<Response> {
        let mut body: Vec<u8> = Vec::new();

        let mut easy = curl::easy::Easy::new();
        easy.url(url).context("invalid URL")?;
        easy.get(true)?;
        easy.follow_location(true)?;
        easy.max_redirections(10)?;
        easy.connect_timeout(self.connect_timeout)?;
        easy.timeout(self.timeout)?;

        {
            let mut transfer = easy.transfer();
            transfer.write_function(|data| {
                body.extend_from_slice(data);
                Ok(data.len())
            })?;
            transfer.perform().context("GET request failed")?;
        }

        let status = easy.response_code().context("no response code")?;
        Ok(Response { status, body })
    }
}

/// Scripted transport for tests: exact URL -> (status, body).
///
/// Records every requested URL so tests can count GETs (idempotent skip runs,
/// exactly-one-redownload). Unknown URLs answer 404 with an empty body.
#[derive(Debug, Default)]
pub struct ScriptedTransport {
    responses: Mutex<HashMap<String, (u32, Vec<u8>)>>,
    requests: Mutex<Vec<String>>,
}

impl ScriptedTransport {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder-style registration of a response.
    pub fn respond(self, url: &str, status: u32, body: impl Into<Vec<u8>>) -> Self {
        self.set_response(url, status, body);
        self
    }

    /// Replace the scripted response for `url` (e.g. to simulate remote
    /// content changing between runs).
    pub fn set_response(&self, url: &str, status: u32, body: impl Into<Vec<u8>>) {
        self.responses
            .lock()
            .unwrap()
            .insert(url.to_string(), (status, body.into()));
    }

    /// Every URL requested so far, in order.
    pub fn requests(&self) -> Vec<String> {
        self.requests.lock().unwrap().clone()
    }

    /// How many GETs were issued for `url`.
    pub fn request_count(&self, url: &str) -> usize {
        self.requests
            .lock()
            .unwrap()
            .iter()
            .filter(|r| r.as_str() == url)
            .count()
    }
}

impl Transport for ScriptedTransport {
    fn get(&self, url: &str) -> Result<Response> {
        self.requests.lock().unwrap().push(url.to_string());
        let (status, body) = self
            .responses
            .lock()
            .unwrap()
            .get(url)
            .cloned()
            .unwrap_or((404, Vec::new()));
        Ok(Response { status, body })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn success_status_bounds() {
        assert!(Response { status: 200, body: vec![] }.is_success());
        assert!(Response { status: 299, body: vec![] }.is_success());
        assert!(!Response { status: 199, body: vec![] }.is_success());
        assert!(!Response { status: 404, body: vec![] }.is_success());
    }

    #[test]
    fn text_rejects_invalid_utf8() {
        let resp = Response { status: 200, body: vec![0xff, 0xfe] };
        assert!(resp.text().is_err());
        let resp = Response { status: 200, body: b"abc".to_vec() };
        assert_eq!(resp.text().unwrap(), "abc");
    }

    #[test]
    fn scripted_transport_serves_and_records() {
        let t = ScriptedTransport::new().respond("http://x/a", 200, "hello");
        let resp = t.get("http://x/a").unwrap();
        assert_eq!(resp.status, 200);
        assert_eq!(resp.body, b"hello");

        let resp = t.get("http://x/missing").unwrap();
        assert_eq!(resp.status, 404);
        assert!(resp.body.is_empty());

        assert_eq!(t.requests(), vec!["http://x/a", "http://x/missing"]);
        assert_eq!(t.request_count("http://x/a"), 1);
        assert_eq!(t.request_count("http://x/never"), 0);
    }

    #[test]
    fn scripted_transport_response_can_be_replaced() {
        let t = ScriptedTransport::new().respond("http://x/f", 200, "old");
        assert_eq!(t.get("http://x/f").unwrap().body, b"old");
        t.set_response("http://x/f", 200, "new");
        assert_eq!(t.get("http://x/f").unwrap().body, b"new");
        assert_eq!(t.request_count("http://x/f"), 2);
    }
}
