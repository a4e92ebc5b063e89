// Submission gateways
//
// The boundary between the forms and whatever receives leads. `MockSubmissionGateway`
// reproduces the site's placeholder (fixed delay, coin flip); `HttpSubmissionGateway`
// posts the payload to a real endpoint and classifies what comes back.

use crate::models::requests::SubmissionPayload;
use crate::models::responses::{
    SubmissionReceipt, SubmissionResult, FAILURE_MESSAGE, SUCCESS_MESSAGE,
};
use crate::settings::{GatewayMode, GatewaySettings, MockGatewaySettings, Settings};

use async_trait::async_trait;
use log::{debug, info, warn};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use reqwest::header::RETRY_AFTER;
use reqwest::StatusCode;
use std::sync::{Arc, Mutex};
use thiserror::Error;
use tokio::time::{sleep, Duration};
use tokio_retry::strategy::{jitter, ExponentialBackoff};
use tokio_retry::RetryIf;
use url::Url;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum GatewayError {
    #[error("submission failed")]
    Failed,
    #[error("request timed out after {0:?}")]
    Timeout(Duration),
    #[error("rate limited by server (retry after {retry_after_secs:?}s)")]
    RateLimited { retry_after_secs: Option<u64> },
    #[error("rejected by server: {0}")]
    Rejected(String),
    #[error("server error: HTTP {0}")]
    Server(u16),
    #[error("network error: {0}")]
    Transport(String),
}

impl GatewayError {
    /// The single line shown to the user. Every variant can be retried by resubmitting.
    pub fn user_message(&self) -> String {
        match self {
            GatewayError::Timeout(_) => {
                "The request timed out. Please check your connection and try again.".to_string()
            }
            GatewayError::RateLimited { .. } => {
                "Too many requests. Please wait a moment and try again.".to_string()
            }
            GatewayError::Rejected(msg) if !msg.trim().is_empty() => msg.trim().to_string(),
            _ => FAILURE_MESSAGE.to_string(),
        }
    }
}

impl From<Result<SubmissionReceipt, GatewayError>> for SubmissionResult {
    fn from(outcome: Result<SubmissionReceipt, GatewayError>) -> Self {
        match outcome {
            Ok(receipt) => SubmissionResult::ok(
                receipt
                    .message
                    .filter(|m| !m.trim().is_empty())
                    .unwrap_or_else(|| SUCCESS_MESSAGE.to_string()),
            ),
            Err(e) => SubmissionResult::fail(e.user_message()),
        }
    }
}

#[async_trait]
pub trait SubmissionGateway: Send + Sync {
    async fn submit(&self, payload: &SubmissionPayload) -> Result<SubmissionReceipt, GatewayError>;

    fn name(&self) -> &'static str;
}

/// Build the gateway selected by configuration.
pub fn gateway_from_settings(settings: &Settings) -> anyhow::Result<Arc<dyn SubmissionGateway>> {
    match settings.gateway.mode {
        GatewayMode::Mock => Ok(Arc::new(MockSubmissionGateway::from_settings(
            &settings.gateway.mock,
        ))),
        GatewayMode::Http => {
            let endpoint = settings.endpoint_url()?;
            Ok(Arc::new(HttpSubmissionGateway::from_settings(
                endpoint,
                &settings.gateway,
            )?))
        }
    }
}

// =========================
// Mock
// =========================

pub struct MockSubmissionGateway {
    delay: Duration,
    success_rate: f64,
    rng: Mutex<StdRng>,
}

impl MockSubmissionGateway {
    pub const DEFAULT_DELAY: Duration = Duration::from_millis(2000);
    pub const DEFAULT_SUCCESS_RATE: f64 = 0.9;

    pub fn new(delay: Duration, success_rate: f64) -> Self {
        let success_rate = if success_rate.is_nan() {
            0.0
        } else {
            success_rate.clamp(0.0, 1.0)
        };
        Self {
            delay,
            success_rate,
            rng: Mutex::new(StdRng::from_entropy()),
        }
    }

    pub fn from_settings(settings: &MockGatewaySettings) -> Self {
        Self::new(
            Duration::from_millis(settings.delay_ms),
            settings.success_rate,
        )
    }

    /// Deterministic outcomes, for tests and smoke runs.
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.rng = Mutex::new(StdRng::seed_from_u64(seed));
        self
    }

    pub fn delay(&self) -> Duration {
        self.delay
    }

    pub fn success_rate(&self) -> f64 {
        self.success_rate
    }

    fn roll(&self) -> bool {
        let mut rng = self.rng.lock().unwrap_or_else(|p| p.into_inner());
        rng.gen_bool(self.success_rate)
    }
}

impl Default for MockSubmissionGateway {
    fn default() -> Self {
        Self::new(Self::DEFAULT_DELAY, Self::DEFAULT_SUCCESS_RATE)
    }
}

#[async_trait]
impl SubmissionGateway for MockSubmissionGateway {
    async fn submit(&self, payload: &SubmissionPayload) -> Result<SubmissionReceipt, GatewayError> {
        sleep(self.delay).await;

        if self.roll() {
            info!(
                "[PHASE: submission] [STEP: mock] {} submission accepted (correlation_id={})",
                payload.form.as_str(),
                payload.correlation_id
            );
            Ok(SubmissionReceipt {
                correlation_id: payload.correlation_id.clone(),
                message: None,
            })
        } else {
            warn!(
                "[PHASE: submission] [STEP: mock] {} submission failed (correlation_id={})",
                payload.form.as_str(),
                payload.correlation_id
            );
            Err(GatewayError::Failed)
        }
    }

    fn name(&self) -> &'static str {
        "mock"
    }
}

// =========================
// HTTP
// =========================

#[derive(Debug, Default, serde::Deserialize)]
#[serde(rename_all = "camelCase")]
struct ServerReply {
    success: Option<bool>,
    message: Option<String>,
    error: Option<String>,
}

impl ServerReply {
    fn text(&self) -> Option<String> {
        self.message
            .clone()
            .or_else(|| self.error.clone())
            .filter(|m| !m.trim().is_empty())
    }
}

pub struct HttpSubmissionGateway {
    client: reqwest::Client,
    endpoint: Url,
    timeout: Duration,
    retry_attempts: usize,
}

impl HttpSubmissionGateway {
    pub fn new(endpoint: Url, timeout: Duration, retry_attempts: usize) -> anyhow::Result<Self> {
        let client = reqwest::Client::builder().timeout(timeout).build()?;
        Ok(Self {
            client,
            endpoint,
            timeout,
            retry_attempts,
        })
    }

    pub fn from_settings(endpoint: Url, settings: &GatewaySettings) -> anyhow::Result<Self> {
        Self::new(
            endpoint,
            Duration::from_secs(settings.timeout_secs),
            settings.retry_attempts,
        )
    }

    fn classify(&self, e: reqwest::Error) -> GatewayError {
        if e.is_timeout() {
            GatewayError::Timeout(self.timeout)
        } else {
            GatewayError::Transport(e.to_string())
        }
    }

    async fn post_once(
        &self,
        payload: &SubmissionPayload,
    ) -> Result<SubmissionReceipt, GatewayError> {
        let resp = self
            .client
            .post(self.endpoint.clone())
            .json(payload)
            .send()
            .await
            .map_err(|e| self.classify(e))?;

        let status = resp.status();
        if status == StatusCode::TOO_MANY_REQUESTS {
            let retry_after_secs = resp
                .headers()
                .get(RETRY_AFTER)
                .and_then(|v| v.to_str().ok())
                .and_then(|s| s.trim().parse::<u64>().ok());
            return Err(GatewayError::RateLimited { retry_after_secs });
        }

        // Body is optional; a bare 2xx is still an acceptance.
        let reply: ServerReply = match resp.json().await {
            Ok(reply) => reply,
            Err(e) => {
                debug!(
                    "[PHASE: submission] [STEP: http] Unreadable response body (HTTP {}): {} (correlation_id={})",
                    status.as_u16(),
                    e,
                    payload.correlation_id
                );
                ServerReply::default()
            }
        };

        if status.is_success() {
            if reply.success == Some(false) {
                return Err(GatewayError::Rejected(reply.text().unwrap_or_default()));
            }
            return Ok(SubmissionReceipt {
                correlation_id: payload.correlation_id.clone(),
                message: reply.message.filter(|m| !m.trim().is_empty()),
            });
        }

        if status == StatusCode::BAD_REQUEST || status == StatusCode::UNPROCESSABLE_ENTITY {
            return Err(GatewayError::Rejected(reply.text().unwrap_or_default()));
        }

        Err(GatewayError::Server(status.as_u16()))
    }
}

#[async_trait]
impl SubmissionGateway for HttpSubmissionGateway {
    async fn submit(&self, payload: &SubmissionPayload) -> Result<SubmissionReceipt, GatewayError> {
        info!(
            "[PHASE: submission] [STEP: http] Posting {} submission to {} (correlation_id={})",
            payload.form.as_str(),
            self.endpoint,
            payload.correlation_id
        );

        let retry_strategy = ExponentialBackoff::from_millis(150)
            .factor(2)
            .max_delay(Duration::from_secs(2))
            .take(self.retry_attempts)
            .map(jitter);

        // Only connection-level failures are retried; anything the server answered is final.
        let result = RetryIf::start(
            retry_strategy,
            || self.post_once(payload),
            |e: &GatewayError| matches!(e, GatewayError::Transport(_)),
        )
        .await;

        if let Err(e) = &result {
            warn!(
                "[PHASE: submission] [STEP: http] Submission failed: {} (correlation_id={})",
                e, payload.correlation_id
            );
        }
        result
    }

    fn name(&self) -> &'static str {
        "http"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::fields::{ContactField, FieldValues};
    use crate::models::requests::FormKind;
    use tokio::io::{AsyncReadExt, AsyncWriteExt};
    use tokio::net::TcpListener;

    fn payload() -> SubmissionPayload {
        let mut values = FieldValues::<ContactField>::new();
        values.set(ContactField::Name, "Jo");
        values.set(ContactField::Email, "a@b.co");
        values.set(ContactField::Phone, "+1 555-123-4567");
        values.set(ContactField::Message, "Hello there!");
        SubmissionPayload::from_fields(FormKind::Contact, &values)
    }

    // -------------------------------------------------------------------------
    // A) Result mapping
    // -------------------------------------------------------------------------

    #[test]
    fn receipt_without_message_maps_to_default_thank_you() {
        let result = SubmissionResult::from(Ok(SubmissionReceipt {
            correlation_id: "c".to_string(),
            message: None,
        }));
        assert_eq!(result, SubmissionResult::ok(SUCCESS_MESSAGE));
    }

    #[test]
    fn mock_failure_maps_to_retry_message() {
        let result = SubmissionResult::from(Err(GatewayError::Failed));
        assert_eq!(
            result,
            SubmissionResult::fail("Failed to submit form. Please try again.")
        );
    }

    #[test]
    fn server_rejection_surfaces_server_text() {
        let e = GatewayError::Rejected("Email domain not accepted".to_string());
        assert_eq!(e.user_message(), "Email domain not accepted");
        assert_eq!(GatewayError::Rejected(String::new()).user_message(), FAILURE_MESSAGE);
        assert!(GatewayError::RateLimited { retry_after_secs: None }
            .user_message()
            .contains("Too many requests"));
    }

    // -------------------------------------------------------------------------
    // B) Mock gateway
    // -------------------------------------------------------------------------

    #[tokio::test(start_paused = true)]
    async fn mock_waits_the_configured_delay() {
        let gateway = MockSubmissionGateway::default().with_seed(7);
        let started = tokio::time::Instant::now();
        let _ = gateway.submit(&payload()).await;
        assert!(started.elapsed() >= Duration::from_millis(2000));
    }

    #[tokio::test(start_paused = true)]
    async fn mock_success_rate_converges() {
        let gateway = MockSubmissionGateway::default().with_seed(42);
        let p = payload();
        let trials = 1000;
        let mut successes = 0;
        for _ in 0..trials {
            if gateway.submit(&p).await.is_ok() {
                successes += 1;
            }
        }
        let rate = successes as f64 / trials as f64;
        // ~5 standard deviations for n=1000, p=0.9
        assert!((rate - 0.9).abs() < 0.05, "observed success rate {}", rate);
    }

    #[tokio::test]
    async fn mock_extremes_are_deterministic() {
        let always = MockSubmissionGateway::new(Duration::ZERO, 1.0);
        let never = MockSubmissionGateway::new(Duration::ZERO, 0.0);
        for _ in 0..20 {
            assert!(always.submit(&payload()).await.is_ok());
            assert_eq!(never.submit(&payload()).await, Err(GatewayError::Failed));
        }
    }

    #[test]
    fn mock_clamps_bad_rates() {
        assert_eq!(MockSubmissionGateway::new(Duration::ZERO, 3.0).success_rate(), 1.0);
        assert_eq!(MockSubmissionGateway::new(Duration::ZERO, f64::NAN).success_rate(), 0.0);
    }

    // -------------------------------------------------------------------------
    // C) HTTP gateway against a canned local server
    // -------------------------------------------------------------------------

    async fn read_request(stream: &mut tokio::net::TcpStream) -> String {
        let mut buf = Vec::new();
        let mut chunk = [0u8; 1024];
        loop {
            let n = stream.read(&mut chunk).await.unwrap_or(0);
            if n == 0 {
                break;
            }
            buf.extend_from_slice(&chunk[..n]);
            let text = String::from_utf8_lossy(&buf).to_string();
            if let Some(header_end) = text.find("\r\n\r\n") {
                let content_length = text[..header_end]
                    .lines()
                    .find_map(|l| {
                        let (k, v) = l.split_once(':')?;
                        k.eq_ignore_ascii_case("content-length")
                            .then(|| v.trim().parse::<usize>().ok())
                            .flatten()
                    })
                    .unwrap_or(0);
                if buf.len() >= header_end + 4 + content_length {
                    return text;
                }
            }
        }
        String::from_utf8_lossy(&buf).to_string()
    }

    /// Serve one canned response and hand back the raw request text.
    async fn serve_once(
        response: &'static str,
    ) -> (Url, tokio::task::JoinHandle<String>) {
        let listener = TcpListener::bind("127.0.0.1:0").await.expect("bind");
        let addr = listener.local_addr().expect("addr");
        let handle = tokio::spawn(async move {
            let (mut stream, _) = listener.accept().await.expect("accept");
            let request = read_request(&mut stream).await;
            stream.write_all(response.as_bytes()).await.expect("write");
            stream.shutdown().await.ok();
            request
        });
        let url = Url::parse(&format!("http://{}/api/leads", addr)).expect("url");
        (url, handle)
    }

    /// Loopback client that ignores any proxy configured in the environment.
    fn local_gateway(endpoint: Url, timeout: Duration) -> HttpSubmissionGateway {
        HttpSubmissionGateway {
            client: reqwest::Client::builder()
                .no_proxy()
                .timeout(timeout)
                .build()
                .expect("client"),
            endpoint,
            timeout,
            retry_attempts: 0,
        }
    }

    #[tokio::test]
    async fn http_accepts_2xx_and_uses_server_message() {
        let (url, server) = serve_once(
            "HTTP/1.1 200 OK\r\nContent-Type: application/json\r\nContent-Length: 38\r\nConnection: close\r\n\r\n{\"success\":true,\"message\":\"Got it!\"}\r\n",
        )
        .await;
        let gateway = local_gateway(url, Duration::from_secs(5));
        let p = payload();

        let receipt = gateway.submit(&p).await.expect("accepted");
        assert_eq!(receipt.correlation_id, p.correlation_id);
        assert_eq!(receipt.message.as_deref(), Some("Got it!"));

        let request = server.await.expect("server task");
        assert!(request.starts_with("POST /api/leads"));
        assert!(request.contains("\"correlationId\""));
        assert!(request.contains("\"message\":\"Hello there!\""));
    }

    #[tokio::test]
    async fn http_maps_429_to_rate_limited() {
        let (url, _server) = serve_once(
            "HTTP/1.1 429 Too Many Requests\r\nRetry-After: 7\r\nContent-Length: 0\r\nConnection: close\r\n\r\n",
        )
        .await;
        let gateway = local_gateway(url, Duration::from_secs(5));
        assert_eq!(
            gateway.submit(&payload()).await,
            Err(GatewayError::RateLimited {
                retry_after_secs: Some(7)
            })
        );
    }

    #[tokio::test]
    async fn http_maps_422_to_rejected_with_server_text() {
        let body = "{\"error\":\"Phone number not reachable\"}";
        let response: &'static str = Box::leak(
            format!(
                "HTTP/1.1 422 Unprocessable Entity\r\nContent-Type: application/json\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{}",
                body.len(),
                body
            )
            .into_boxed_str(),
        );
        let (url, _server) = serve_once(response).await;
        let gateway = local_gateway(url, Duration::from_secs(5));
        assert_eq!(
            gateway.submit(&payload()).await,
            Err(GatewayError::Rejected("Phone number not reachable".to_string()))
        );
    }

    #[tokio::test]
    async fn http_maps_5xx_to_server_error() {
        let (url, _server) = serve_once(
            "HTTP/1.1 503 Service Unavailable\r\nContent-Length: 0\r\nConnection: close\r\n\r\n",
        )
        .await;
        let gateway = local_gateway(url, Duration::from_secs(5));
        assert_eq!(gateway.submit(&payload()).await, Err(GatewayError::Server(503)));
    }

    #[tokio::test]
    async fn http_connection_refused_is_a_transport_error() {
        let listener = TcpListener::bind("127.0.0.1:0").await.expect("bind");
        let addr = listener.local_addr().expect("addr");
        drop(listener);

        let url = Url::parse(&format!("http://{}/api/leads", addr)).expect("url");
        let gateway = local_gateway(url, Duration::from_secs(2));
        assert!(matches!(
            gateway.submit(&payload()).await,
            Err(GatewayError::Transport(_))
        ));
    }

    #[tokio::test]
    async fn http_422_with_unreadable_body_is_rejected_with_generic_text() {
        let (url, _server) = serve_once(
            "HTTP/1.1 422 Unprocessable Entity\r\nContent-Type: text/html\r\nContent-Length: 13\r\nConnection: close\r\n\r\n<h1>Bad</h1>\n",
        )
        .await;
        let gateway = local_gateway(url, Duration::from_secs(5));
        let err = gateway.submit(&payload()).await.expect_err("rejected");
        assert_eq!(err, GatewayError::Rejected(String::new()));
        assert_eq!(err.user_message(), FAILURE_MESSAGE);
    }

    #[tokio::test]
    async fn http_retries_a_dropped_connection_then_succeeds() {
        let listener = TcpListener::bind("127.0.0.1:0").await.expect("bind");
        let addr = listener.local_addr().expect("addr");
        let server = tokio::spawn(async move {
            // First attempt: read the request and hang up without answering.
            let (mut first, _) = listener.accept().await.expect("accept first");
            read_request(&mut first).await;
            drop(first);

            let (mut second, _) = listener.accept().await.expect("accept second");
            read_request(&mut second).await;
            second
                .write_all(
                    b"HTTP/1.1 200 OK\r\nContent-Length: 0\r\nConnection: close\r\n\r\n",
                )
                .await
                .expect("write");
            second.shutdown().await.ok();
        });

        let url = Url::parse(&format!("http://{}/api/leads", addr)).expect("url");
        let mut gateway = local_gateway(url, Duration::from_secs(5));
        gateway.retry_attempts = 2;

        let receipt = gateway.submit(&payload()).await.expect("accepted on retry");
        assert_eq!(receipt.message, None);
        server.await.expect("server task");
    }

    #[test]
    fn settings_select_the_gateway() {
        let mut settings = Settings::default();
        let gateway = gateway_from_settings(&settings).expect("mock gateway");
        assert_eq!(gateway.name(), "mock");

        settings.gateway.mode = GatewayMode::Http;
        assert!(gateway_from_settings(&settings).is_err());

        settings.gateway.endpoint = Some("https://leads.example.com/api/submit".to_string());
        let gateway = gateway_from_settings(&settings).expect("http gateway");
        assert_eq!(gateway.name(), "http");
    }
}
