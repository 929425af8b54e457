//! HTTP adapter for the woopra.com tracking API.

use async_trait::async_trait;
use reqwest::Client;
use serde_json::Value;
use std::time::Duration;
use tracing::debug;

use super::{Tracker, TrackerConnector};
use crate::events::{Event, UserProperties};
use crate::types::{ClientConfig, Error, Result, DEFAULT_IDLE_TIMEOUT_MS};

/// Connects [`WoopraTracker`] sessions sharing one HTTP client.
#[derive(Debug, Clone)]
pub struct WoopraConnector {
    client: Client,
    endpoint_host: String,
}

impl WoopraConnector {
    pub fn new(config: &ClientConfig) -> Result<Self> {
        let client = Client::builder()
            .timeout(config.request_timeout)
            .user_agent(config.user_agent.as_str())
            .build()?;

        Ok(Self {
            client,
            endpoint_host: config.endpoint_host.clone(),
        })
    }
}

impl TrackerConnector for WoopraConnector {
    fn connect(&self, url: &str) -> Result<Box<dyn Tracker>> {
        if url.is_empty() {
            return Err(Error::validation("woopra project domain cannot be empty"));
        }

        Ok(Box::new(WoopraTracker {
            client: self.client.clone(),
            endpoint_host: self.endpoint_host.clone(),
            domain: url.to_string(),
            secure: true,
            idle_timeout: Duration::from_millis(DEFAULT_IDLE_TIMEOUT_MS),
            visitor: UserProperties::new(),
        }))
    }
}

/// Tracking session for one project domain.
///
/// `identify` only records the visitor; every `track` request carries the
/// visitor properties as `cv_*` parameters next to the `ce_*` event fields.
#[derive(Debug)]
pub struct WoopraTracker {
    client: Client,
    endpoint_host: String,
    domain: String,
    secure: bool,
    idle_timeout: Duration,
    visitor: UserProperties,
}

impl WoopraTracker {
    fn endpoint(&self) -> String {
        let scheme = if self.secure { "https" } else { "http" };
        format!("{}://{}/track/ce/", scheme, self.endpoint_host)
    }

    /// Query parameters for a custom-event request.
    fn track_query(&self, event_name: &str, event: &Event) -> Vec<(String, String)> {
        let cookie = self.visitor.get("id").map(query_value).unwrap_or_default();

        let mut params = vec![
            ("host".to_string(), self.domain.clone()),
            ("response".to_string(), "json".to_string()),
            ("cookie".to_string(), cookie),
            ("timeout".to_string(), self.idle_timeout.as_millis().to_string()),
            ("event".to_string(), event_name.to_string()),
        ];
        params.extend(
            self.visitor
                .iter()
                .map(|(key, value)| (format!("cv_{key}"), query_value(value))),
        );
        params.extend(
            event
                .iter()
                .map(|(key, value)| (format!("ce_{key}"), query_value(value))),
        );
        params
    }
}

/// Text goes out as-is (UTF-8, percent-encoded by the client); anything else
/// as compact JSON.
fn query_value(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        Value::Null => String::new(),
        other => other.to_string(),
    }
}

#[async_trait]
impl Tracker for WoopraTracker {
    fn set_secure(&mut self, secure: bool) {
        self.secure = secure;
    }

    fn set_idle_timeout(&mut self, timeout: Duration) {
        self.idle_timeout = timeout;
    }

    async fn identify(&mut self, properties: &UserProperties) -> Result<()> {
        self.visitor = properties.clone();
        Ok(())
    }

    async fn track(&mut self, event_name: &str, event: &Event) -> Result<()> {
        let url = self.endpoint();
        let params = self.track_query(event_name, event);
        debug!(event = event_name, domain = %self.domain, "woopra track request");

        let response = self.client.get(&url).query(&params).send().await?;
        let status = response.status();
        if !status.is_success() {
            let body = response
                .text()
                .await
                .unwrap_or_else(|_| "Unknown error".to_string());
            return Err(Error::tracking(format!(
                "woopra returned {} for {}: {}",
                status, event_name, body
            )));
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn tracker() -> WoopraTracker {
        let connector = WoopraConnector::new(&ClientConfig::default()).unwrap();
        WoopraTracker {
            client: connector.client,
            endpoint_host: connector.endpoint_host,
            domain: "learn.example.com".to_string(),
            secure: true,
            idle_timeout: Duration::from_millis(DEFAULT_IDLE_TIMEOUT_MS),
            visitor: UserProperties::new(),
        }
    }

    fn object(value: Value) -> serde_json::Map<String, Value> {
        value.as_object().cloned().unwrap()
    }

    #[test]
    fn test_endpoint_scheme_follows_secure_flag() {
        let mut t = tracker();
        assert_eq!(t.endpoint(), "https://www.woopra.com/track/ce/");
        t.set_secure(false);
        assert_eq!(t.endpoint(), "http://www.woopra.com/track/ce/");
    }

    #[test]
    fn test_connect_rejects_empty_domain() {
        let connector = WoopraConnector::new(&ClientConfig::default()).unwrap();
        assert!(matches!(connector.connect(""), Err(Error::Validation(_))));
        assert!(connector.connect("learn.example.com").is_ok());
    }

    #[tokio::test]
    async fn test_track_query_carries_visitor_and_event() {
        let mut t = tracker();
        t.set_idle_timeout(Duration::from_secs(60));
        t.identify(&object(json!({"id": "alice", "username": "alice", "progress": 50})))
            .await
            .unwrap();

        let event = object(json!({"title": "Über", "context": {"course_id": "c"}, "referer": null}));
        let params = t.track_query("pv", &event);
        let get = |key: &str| {
            params
                .iter()
                .find(|(k, _)| k == key)
                .map(|(_, v)| v.as_str())
        };

        assert_eq!(get("host"), Some("learn.example.com"));
        assert_eq!(get("cookie"), Some("alice"));
        assert_eq!(get("timeout"), Some("60000"));
        assert_eq!(get("event"), Some("pv"));
        assert_eq!(get("cv_username"), Some("alice"));
        assert_eq!(get("cv_progress"), Some("50"));
        assert_eq!(get("ce_title"), Some("Über"));
        assert_eq!(get("ce_context"), Some(r#"{"course_id":"c"}"#));
        assert_eq!(get("ce_referer"), Some(""));
    }

    /// Accept one request on a local port, answer with `status` and `body`,
    /// and hand back the request line.
    async fn serve_once(
        status: &'static str,
        body: &'static str,
    ) -> (String, tokio::task::JoinHandle<String>) {
        use tokio::io::{AsyncReadExt, AsyncWriteExt};

        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();

        let handle = tokio::spawn(async move {
            let (mut stream, _) = listener.accept().await.unwrap();
            let mut request = Vec::new();
            let mut chunk = [0u8; 1024];
            while !request.windows(4).any(|w| w == b"\r\n\r\n") {
                let n = stream.read(&mut chunk).await.unwrap();
                if n == 0 {
                    break;
                }
                request.extend_from_slice(&chunk[..n]);
            }

            let response = format!(
                "HTTP/1.1 {}\r\ncontent-length: {}\r\nconnection: close\r\n\r\n{}",
                status,
                body.len(),
                body
            );
            stream.write_all(response.as_bytes()).await.unwrap();
            stream.shutdown().await.unwrap();

            String::from_utf8_lossy(&request)
                .lines()
                .next()
                .unwrap_or_default()
                .to_string()
        });

        (addr.to_string(), handle)
    }

    async fn plain_http_tracker(endpoint_host: String) -> Box<dyn Tracker> {
        let config = ClientConfig {
            endpoint_host,
            ..ClientConfig::default()
        };
        let connector = WoopraConnector::new(&config).unwrap();
        let mut tracker = connector.connect("learn.example.com").unwrap();
        tracker.set_secure(false);
        tracker
            .identify(&object(json!({"id": "ü", "username": "ü"})))
            .await
            .unwrap();
        tracker
    }

    #[tokio::test]
    async fn test_track_sends_get_request() {
        let (host, server) = serve_once("200 OK", r#"{"success":1}"#).await;
        let mut tracker = plain_http_tracker(host).await;

        tracker
            .track("pv", &object(json!({"title": "/dashboard"})))
            .await
            .unwrap();

        let request_line = server.await.unwrap();
        assert!(request_line.starts_with("GET /track/ce/?host=learn.example.com&response=json"));
        assert!(request_line.contains("cookie=%C3%BC"));
        assert!(request_line.contains("timeout=300000"));
        assert!(request_line.contains("event=pv"));
        assert!(request_line.contains("cv_id=%C3%BC"));
        assert!(request_line.contains("ce_title=%2Fdashboard"));
    }

    #[tokio::test]
    async fn test_track_non_success_status_is_tracking_error() {
        let (host, server) = serve_once("503 Service Unavailable", "busy").await;
        let mut tracker = plain_http_tracker(host).await;

        let result = tracker.track("pv", &serde_json::Map::new()).await;
        server.await.unwrap();

        match result {
            Err(Error::Tracking(msg)) => {
                assert!(msg.contains("503"), "{msg}");
                assert!(msg.contains("busy"), "{msg}");
            }
            other => panic!("expected tracking error, got {other:?}"),
        }
    }

    #[test]
    fn test_track_query_without_identify() {
        let t = tracker();
        let params = t.track_query("seq_goto", &serde_json::Map::new());
        assert!(params.contains(&("cookie".to_string(), String::new())));
        assert!(!params.iter().any(|(k, _)| k.starts_with("cv_")));
    }
}
