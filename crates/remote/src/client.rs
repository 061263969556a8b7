use std::sync::Arc;
use std::time::Instant;

use configs::{CircuitBreakerConfig, RemoteConfig};
use reqwest::header::{ACCEPT, CONTENT_TYPE};
use reqwest::{Method, StatusCode, Url};
use serde::{de::DeserializeOwned, Serialize};
use tracing::{debug, warn};

use crate::circuit_breaker::CircuitBreaker;
use crate::errors::RemoteError;
use crate::observability::{
    CIRCUIT_OPEN_TOTAL, REMOTE_FAILURES_TOTAL, REMOTE_REQUESTS_TOTAL, REMOTE_REQUEST_DURATION,
    REMOTE_RETRIES_TOTAL,
};
use crate::retry::{retry_with_policy, RetryPolicy};

/// Build the process-wide HTTP client. Clones share one connection pool.
pub fn build_http_client(cfg: &RemoteConfig) -> Result<reqwest::Client, RemoteError> {
    reqwest::Client::builder()
        .connect_timeout(cfg.connect_timeout())
        .timeout(cfg.timeout())
        .pool_max_idle_per_host(cfg.pool_max_idle_per_host)
        .pool_idle_timeout(cfg.pool_idle_timeout())
        .build()
        .map_err(|e| RemoteError::InvalidConfig {
            service: "http-client".into(),
            message: e.to_string(),
        })
}

/// A 2xx answer with its raw body.
#[derive(Debug, Clone)]
pub struct RemoteResponse {
    pub status: StatusCode,
    pub body: Vec<u8>,
}

fn is_idempotent(method: &Method) -> bool {
    [Method::GET, Method::HEAD, Method::PUT, Method::DELETE, Method::OPTIONS].contains(method)
}

fn body_snippet(body: &[u8]) -> String {
    const MAX: usize = 256;
    let text = String::from_utf8_lossy(&body[..body.len().min(MAX)]);
    text.into_owned()
}

/// Client for one dependency: base URL, retry budget and circuit breaker
/// on top of the shared `reqwest::Client`.
#[derive(Clone)]
pub struct RemoteClient {
    service: Arc<str>,
    base_url: Arc<str>,
    http: reqwest::Client,
    retry: RetryPolicy,
    breaker: CircuitBreaker,
}

impl RemoteClient {
    pub fn new(
        service: &str,
        base_url: &str,
        http: reqwest::Client,
        retry: RetryPolicy,
        breaker: CircuitBreaker,
    ) -> Result<Self, RemoteError> {
        let parsed = Url::parse(base_url).map_err(|e| RemoteError::InvalidConfig {
            service: service.to_string(),
            message: format!("{base_url}: {e}"),
        })?;
        if !matches!(parsed.scheme(), "http" | "https") {
            return Err(RemoteError::InvalidConfig {
                service: service.to_string(),
                message: format!("{base_url}: unsupported scheme"),
            });
        }
        Ok(Self {
            service: Arc::from(service),
            base_url: Arc::from(base_url.trim_end_matches('/')),
            http,
            retry,
            breaker,
        })
    }

    pub fn from_config(
        service: &str,
        base_url: &str,
        http: reqwest::Client,
        remote: &RemoteConfig,
        breaker: &CircuitBreakerConfig,
    ) -> Result<Self, RemoteError> {
        let retry = RetryPolicy::with_retries(remote.retry_count, remote.backoff_base(), remote.backoff_max());
        Self::new(service, base_url, http, retry, CircuitBreaker::from_config(service, breaker))
    }

    pub fn service(&self) -> &str {
        &self.service
    }

    pub fn breaker(&self) -> &CircuitBreaker {
        &self.breaker
    }

    pub fn url(&self, path: &str) -> String {
        format!("{}/{}", self.base_url, path.trim_start_matches('/'))
    }

    /// Send `method path` with an optional JSON body and return the 2xx response.
    /// Idempotent methods are retried within the budget; POST is sent once.
    pub async fn request<B>(&self, method: Method, path: &str, body: Option<&B>) -> Result<RemoteResponse, RemoteError>
    where
        B: Serialize + ?Sized,
    {
        let url = self.url(path);
        let payload = body
            .map(|b| serde_json::to_vec(b))
            .transpose()
            .map_err(|e| RemoteError::Encode { service: self.service.to_string(), message: e.to_string() })?;
        let policy = if is_idempotent(&method) { self.retry.clone() } else { RetryPolicy::disabled() };

        let (method, url, payload) = (&method, url.as_str(), payload.as_deref());
        let mut attempts = 0u32;
        retry_with_policy(&policy, move || {
            attempts += 1;
            if attempts > 1 {
                REMOTE_RETRIES_TOTAL.with_label_values(&[self.service()]).inc();
            }
            self.attempt(method, url, payload)
        })
        .await
    }

    async fn attempt(&self, method: &Method, url: &str, payload: Option<&[u8]>) -> Result<RemoteResponse, RemoteError> {
        let service = self.service();
        if !self.breaker.can_execute().await {
            CIRCUIT_OPEN_TOTAL.with_label_values(&[service]).inc();
            warn!(service, %method, url, "circuit open, request not sent");
            return Err(RemoteError::CircuitOpen { service: service.to_string() });
        }

        REMOTE_REQUESTS_TOTAL.with_label_values(&[service, method.as_str()]).inc();
        let started = Instant::now();
        let result = self.send(method, url, payload).await;
        REMOTE_REQUEST_DURATION
            .with_label_values(&[service])
            .observe(started.elapsed().as_secs_f64());

        match &result {
            Ok(resp) => {
                self.breaker.record_success().await;
                debug!(service, %method, url, status = resp.status.as_u16(), elapsed_ms = started.elapsed().as_millis() as u64, "remote call ok");
            }
            Err(e) => {
                REMOTE_FAILURES_TOTAL.with_label_values(&[service, e.kind()]).inc();
                if e.counts_against_circuit() {
                    if self.breaker.record_failure().await {
                        warn!(service, "circuit opened");
                    }
                } else {
                    self.breaker.record_success().await;
                }
                warn!(service, %method, url, kind = e.kind(), error = %e, "remote call failed");
            }
        }
        result
    }

    async fn send(&self, method: &Method, url: &str, payload: Option<&[u8]>) -> Result<RemoteResponse, RemoteError> {
        let mut req = self.http.request(method.clone(), url).header(ACCEPT, "application/json");
        if let Some(bytes) = payload {
            req = req.header(CONTENT_TYPE, "application/json").body(bytes.to_vec());
        }
        let resp = req.send().await.map_err(|e| self.transport_error(e))?;
        let status = resp.status();
        let body = resp.bytes().await.map_err(|e| self.transport_error(e))?.to_vec();
        if !status.is_success() {
            return Err(RemoteError::Rejected {
                service: self.service.to_string(),
                status: status.as_u16(),
                body: body_snippet(&body),
            });
        }
        Ok(RemoteResponse { status, body })
    }

    fn transport_error(&self, e: reqwest::Error) -> RemoteError {
        let service = self.service.to_string();
        if e.is_timeout() {
            RemoteError::Timeout { service, message: e.to_string() }
        } else {
            RemoteError::Unreachable { service, message: e.to_string() }
        }
    }

    fn malformed(&self, message: impl Into<String>) -> RemoteError {
        RemoteError::Malformed { service: self.service.to_string(), message: message.into() }
    }

    fn decode<T: DeserializeOwned>(&self, body: &[u8]) -> Result<T, RemoteError> {
        if body.iter().all(u8::is_ascii_whitespace) {
            return Err(self.malformed("empty body"));
        }
        serde_json::from_slice(body).map_err(|e| self.malformed(e.to_string()))
    }

    /// Empty body and JSON `null` both mean "absent".
    fn decode_optional<T: DeserializeOwned>(&self, body: &[u8]) -> Result<Option<T>, RemoteError> {
        if body.iter().all(u8::is_ascii_whitespace) {
            return Ok(None);
        }
        serde_json::from_slice::<Option<T>>(body).map_err(|e| self.malformed(e.to_string()))
    }

    pub async fn get_json<T: DeserializeOwned>(&self, path: &str) -> Result<T, RemoteError> {
        let resp = self.request::<()>(Method::GET, path, None).await?;
        self.decode(&resp.body)
    }

    /// GET that reports a 404, an empty body or `null` as `Ok(None)`.
    pub async fn get_optional<T: DeserializeOwned>(&self, path: &str) -> Result<Option<T>, RemoteError> {
        match self.request::<()>(Method::GET, path, None).await {
            Ok(resp) => self.decode_optional(&resp.body),
            Err(e) if e.is_not_found() => Ok(None),
            Err(e) => Err(e),
        }
    }

    pub async fn post_json<B, T>(&self, path: &str, body: &B) -> Result<T, RemoteError>
    where
        B: Serialize + ?Sized,
        T: DeserializeOwned,
    {
        let resp = self.request(Method::POST, path, Some(body)).await?;
        self.decode(&resp.body)
    }

    /// PUT whose response body, if any, is discarded.
    pub async fn put_json<B>(&self, path: &str, body: &B) -> Result<(), RemoteError>
    where
        B: Serialize + ?Sized,
    {
        self.request(Method::PUT, path, Some(body)).await.map(|_| ())
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use std::net::{Ipv4Addr, SocketAddr};
    use std::sync::atomic::{AtomicBool, AtomicU32, Ordering};
    use std::time::Duration;

    use axum::{http::StatusCode as AxumStatus, routing::get, Router};
    use crate::circuit_breaker::CircuitState;
    use models::pets::PetType;
    use tokio::net::TcpListener;

    pub(crate) async fn spawn_server(router: Router) -> String {
        let listener = TcpListener::bind((Ipv4Addr::LOCALHOST, 0)).await.expect("bind");
        let addr: SocketAddr = listener.local_addr().expect("addr");
        tokio::spawn(async move {
            if let Err(e) = axum::serve(listener, router).await {
                eprintln!("fake server error: {}", e);
            }
        });
        format!("http://{}", addr)
    }

    pub(crate) fn test_client(service: &str, base_url: &str, retry_count: u32, failure_threshold: u64) -> RemoteClient {
        let cfg = RemoteConfig {
            timeout_ms: 200,
            connect_timeout_ms: 200,
            retry_count,
            backoff_base_ms: 1,
            backoff_max_ms: 5,
            ..RemoteConfig::default()
        };
        let breaker = CircuitBreakerConfig { failure_threshold, ..CircuitBreakerConfig::default() };
        let http = build_http_client(&cfg).expect("http client");
        RemoteClient::from_config(service, base_url, http, &cfg, &breaker).expect("remote client")
    }

    fn counting_router(hits: Arc<AtomicU32>) -> Router {
        let flaky = hits.clone();
        let failing = hits.clone();
        let slow = hits;
        Router::new()
            .route(
                "/flaky",
                get(move || {
                    let hits = flaky.clone();
                    async move {
                        if hits.fetch_add(1, Ordering::SeqCst) == 0 {
                            (AxumStatus::SERVICE_UNAVAILABLE, String::new())
                        } else {
                            (AxumStatus::OK, r#"[{"id":1,"name":"cat"}]"#.to_string())
                        }
                    }
                }),
            )
            .route(
                "/down",
                get({
                    let hits = failing.clone();
                    move || {
                        let hits = hits.clone();
                        async move {
                            hits.fetch_add(1, Ordering::SeqCst);
                            (AxumStatus::SERVICE_UNAVAILABLE, String::new())
                        }
                    }
                })
                .post(move || {
                    let hits = failing.clone();
                    async move {
                        hits.fetch_add(1, Ordering::SeqCst);
                        (AxumStatus::SERVICE_UNAVAILABLE, String::new())
                    }
                }),
            )
            .route(
                "/slow",
                get(move || {
                    let hits = slow.clone();
                    async move {
                        hits.fetch_add(1, Ordering::SeqCst);
                        tokio::time::sleep(Duration::from_millis(600)).await;
                        (AxumStatus::OK, "[]".to_string())
                    }
                }),
            )
            .route("/missing", get(|| async { (AxumStatus::NOT_FOUND, String::new()) }))
            .route("/null", get(|| async { (AxumStatus::OK, "null".to_string()) }))
            .route("/garbage", get(|| async { (AxumStatus::OK, "<html>oops</html>".to_string()) }))
    }

    #[tokio::test]
    async fn get_is_retried_once_then_succeeds() {
        let hits = Arc::new(AtomicU32::new(0));
        let base = spawn_server(counting_router(hits.clone())).await;
        let client = test_client("pets-service", &base, 1, 10);

        let types: Vec<PetType> = client.get_json("/flaky").await.unwrap();
        assert_eq!(types, vec![PetType { id: 1, name: "cat".into() }]);
        assert_eq!(hits.load(Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn get_gives_up_after_retry_budget() {
        let hits = Arc::new(AtomicU32::new(0));
        let base = spawn_server(counting_router(hits.clone())).await;
        let client = test_client("pets-service", &base, 1, 10);

        let err = client.get_json::<Vec<PetType>>("/down").await.unwrap_err();
        assert_eq!(err.status(), Some(503));
        assert_eq!(hits.load(Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn post_is_never_retried() {
        let hits = Arc::new(AtomicU32::new(0));
        let base = spawn_server(counting_router(hits.clone())).await;
        let client = test_client("people-service", &base, 3, 10);

        let err = client
            .post_json::<_, serde_json::Value>("/down", &serde_json::json!({"firstName": "Jean"}))
            .await
            .unwrap_err();
        assert!(matches!(err, RemoteError::Rejected { status: 503, .. }));
        assert_eq!(hits.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn absent_results_are_none() {
        let base = spawn_server(counting_router(Arc::new(AtomicU32::new(0)))).await;
        let client = test_client("pets-service", &base, 0, 10);

        assert_eq!(client.get_optional::<PetType>("/missing").await.unwrap(), None);
        assert_eq!(client.get_optional::<PetType>("/null").await.unwrap(), None);
        // A null body is not a valid required value
        assert!(matches!(
            client.get_json::<PetType>("/null").await,
            Err(RemoteError::Malformed { .. })
        ));
    }

    #[tokio::test]
    async fn unparseable_body_is_malformed() {
        let base = spawn_server(counting_router(Arc::new(AtomicU32::new(0)))).await;
        let client = test_client("pets-service", &base, 1, 10);

        let err = client.get_json::<Vec<PetType>>("/garbage").await.unwrap_err();
        assert_eq!(err.kind(), "malformed");
    }

    #[tokio::test]
    async fn slow_dependency_times_out() {
        let hits = Arc::new(AtomicU32::new(0));
        let base = spawn_server(counting_router(hits.clone())).await;
        let client = test_client("pets-service", &base, 0, 10);

        let err = client.get_json::<Vec<PetType>>("/slow").await.unwrap_err();
        assert!(matches!(err, RemoteError::Timeout { .. }), "got {err:?}");
        assert_eq!(hits.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn closed_port_is_unreachable() {
        let listener = TcpListener::bind((Ipv4Addr::LOCALHOST, 0)).await.unwrap();
        let addr = listener.local_addr().unwrap();
        drop(listener);
        let client = test_client("people-service", &format!("http://{}", addr), 0, 10);

        let err = client.get_json::<serde_json::Value>("/people").await.unwrap_err();
        assert!(matches!(err, RemoteError::Unreachable { .. }), "got {err:?}");
    }

    #[tokio::test]
    async fn circuit_opens_after_consecutive_failures() {
        let hits = Arc::new(AtomicU32::new(0));
        let base = spawn_server(counting_router(hits.clone())).await;
        let client = test_client("people-service", &base, 0, 2);
        let body = serde_json::json!({});

        for _ in 0..2 {
            let err = client.post_json::<_, serde_json::Value>("/down", &body).await.unwrap_err();
            assert_eq!(err.status(), Some(503));
        }
        let err = client.post_json::<_, serde_json::Value>("/down", &body).await.unwrap_err();
        assert!(matches!(err, RemoteError::CircuitOpen { .. }));
        assert_eq!(hits.load(Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn circuit_recovers_after_half_open_call_is_cancelled() {
        let healthy = Arc::new(AtomicBool::new(false));
        let flag = healthy.clone();
        let router = Router::new().route(
            "/petTypes",
            get(move || {
                let healthy = flag.clone();
                async move {
                    if healthy.load(Ordering::SeqCst) {
                        (AxumStatus::OK, "[]".to_string())
                    } else {
                        tokio::time::sleep(Duration::from_millis(100)).await;
                        (AxumStatus::SERVICE_UNAVAILABLE, String::new())
                    }
                }
            }),
        );
        let base = spawn_server(router).await;
        let cfg = RemoteConfig { timeout_ms: 500, connect_timeout_ms: 200, ..RemoteConfig::default() };
        let http = build_http_client(&cfg).unwrap();
        let breaker = CircuitBreaker::new("pets-service", 1, Duration::from_millis(50), 1, true);
        let client = RemoteClient::new("pets-service", &base, http, RetryPolicy::disabled(), breaker).unwrap();

        let err = client.get_json::<Vec<PetType>>("/petTypes").await.unwrap_err();
        assert_eq!(err.status(), Some(503));
        assert_eq!(client.breaker().get_state().await, CircuitState::Open);

        tokio::time::sleep(Duration::from_millis(60)).await;
        let cancelled = tokio::time::timeout(Duration::from_millis(20), client.get_json::<Vec<PetType>>("/petTypes")).await;
        assert!(cancelled.is_err());
        assert_eq!(client.breaker().get_state().await, CircuitState::HalfOpen);

        healthy.store(true, Ordering::SeqCst);
        tokio::time::sleep(Duration::from_millis(60)).await;
        let types: Vec<PetType> = client.get_json("/petTypes").await.unwrap();
        assert!(types.is_empty());
        assert_eq!(client.breaker().get_state().await, CircuitState::Closed);
    }

    #[test]
    fn rejects_non_http_base_url() {
        let http = reqwest::Client::new();
        let breaker = CircuitBreaker::new("pets-service", 1, Duration::from_secs(1), 1, false);
        let res = RemoteClient::new("pets-service", "ftp://pets", http, RetryPolicy::disabled(), breaker);
        assert!(matches!(res, Err(RemoteError::InvalidConfig { .. })));
    }

    #[test]
    fn joins_paths() {
        let http = reqwest::Client::new();
        let breaker = CircuitBreaker::new("pets-service", 1, Duration::from_secs(1), 1, false);
        let client = RemoteClient::new("pets-service", "http://pets:8085/", http, RetryPolicy::disabled(), breaker).unwrap();
        assert_eq!(client.url("/pets/7"), "http://pets:8085/pets/7");
        assert_eq!(client.url("petTypes"), "http://pets:8085/petTypes");
    }
}
