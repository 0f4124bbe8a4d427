//! ---
//! herd_section: "05-networking-external-interfaces"
//! herd_subsection: "module"
//! herd_type: "source"
//! herd_scope: "code"
//! herd_description: "Telemetry sinks: tracking API over HTTP and stdout dry-run."
//! herd_version: "v0.1.0"
//! herd_owner: "tbd"
//! ---
use std::io::Write;
use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, Result};
use async_trait::async_trait;
use herd_common::ApiConfig;
use herd_sim::TelemetryRecord;
use reqwest::header::ACCEPT;
use reqwest::{Client, StatusCode, Url};
use tracing::debug;

/// Longest response body kept in a [`SinkError::Rejected`].
const MAX_BODY_CHARS: usize = 256;

/// Why a single record could not be delivered. Every variant is transient:
/// the driver logs it and moves on to the next scheduled tick.
#[derive(Debug, thiserror::Error)]
pub enum SinkError {
    /// The endpoint answered with something other than the accepted status.
    #[error("rejected with http {status}: {body}")]
    Rejected { status: u16, body: String },
    #[error("request timed out")]
    Timeout,
    #[error("connection failed: {0}")]
    Connect(String),
    #[error("transport error: {0}")]
    Transport(String),
    #[error("output error: {0}")]
    Output(String),
}

impl SinkError {
    fn from_reqwest(err: reqwest::Error) -> Self {
        if err.is_timeout() {
            SinkError::Timeout
        } else if err.is_connect() {
            SinkError::Connect(err.to_string())
        } else {
            SinkError::Transport(err.to_string())
        }
    }
}

/// Destination for telemetry records.
#[async_trait]
pub trait TelemetrySink: Send + Sync + 'static {
    /// Deliver one record. No retries happen inside a call.
    async fn deliver(&self, record: &TelemetryRecord) -> Result<(), SinkError>;

    /// Short human readable description used in startup logs.
    fn describe(&self) -> String;
}

#[async_trait]
impl<S: TelemetrySink + ?Sized> TelemetrySink for Arc<S> {
    async fn deliver(&self, record: &TelemetryRecord) -> Result<(), SinkError> {
        (**self).deliver(record).await
    }

    fn describe(&self) -> String {
        (**self).describe()
    }
}

/// Posts records as JSON to the tracking API.
#[derive(Debug, Clone)]
pub struct HttpSink {
    client: Client,
    endpoint: Url,
    accepted: StatusCode,
}

impl HttpSink {
    pub fn new(endpoint: Url, timeout: Duration, accepted: u16) -> Result<Self> {
        let client = Client::builder()
            .timeout(timeout)
            .build()
            .context("failed to build http client")?;
        let accepted = StatusCode::from_u16(accepted)
            .with_context(|| format!("{} is not a valid http status", accepted))?;
        Ok(Self {
            client,
            endpoint,
            accepted,
        })
    }

    pub fn from_config(config: &ApiConfig) -> Result<Self> {
        Self::new(
            config.endpoint_url()?,
            config.request_timeout,
            config.accepted_status,
        )
    }

    pub fn endpoint(&self) -> &Url {
        &self.endpoint
    }
}

#[async_trait]
impl TelemetrySink for HttpSink {
    async fn deliver(&self, record: &TelemetryRecord) -> Result<(), SinkError> {
        let response = self
            .client
            .post(self.endpoint.clone())
            .header(ACCEPT, "application/json")
            .json(record)
            .send()
            .await
            .map_err(SinkError::from_reqwest)?;

        let status = response.status();
        if status == self.accepted {
            debug!(device_id = %record.device_id, status = status.as_u16(), "record accepted");
            return Ok(());
        }
        let body = response.text().await.unwrap_or_default();
        Err(SinkError::Rejected {
            status: status.as_u16(),
            body: body.chars().take(MAX_BODY_CHARS).collect(),
        })
    }

    fn describe(&self) -> String {
        format!("http {}", self.endpoint)
    }
}

/// Prints each record as one JSON line instead of sending it (dry run).
#[derive(Debug, Default, Clone, Copy)]
pub struct StdoutSink;

#[async_trait]
impl TelemetrySink for StdoutSink {
    async fn deliver(&self, record: &TelemetryRecord) -> Result<(), SinkError> {
        let line =
            serde_json::to_string(record).map_err(|err| SinkError::Output(err.to_string()))?;
        let mut stdout = std::io::stdout().lock();
        writeln!(stdout, "{line}").map_err(|err| SinkError::Output(err.to_string()))
    }

    fn describe(&self) -> String {
        "stdout (dry run)".to_owned()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::extract::State;
    use axum::routing::post;
    use axum::{Json, Router};
    use herd_sim::BehaviorState;
    use serde_json::Value;
    use std::net::SocketAddr;
    use std::sync::Mutex;
    use tokio::net::TcpListener;

    type Received = Arc<Mutex<Vec<Value>>>;

    fn record() -> TelemetryRecord {
        TelemetryRecord {
            device_id: "COW_GPS_ER_01".into(),
            latitude: -33.0167,
            longitude: -58.5167,
            altitude: 20.0,
            speed: 1.5,
            activity_level: 5,
            temperature: 38.2,
            battery_level: 90,
            signal_strength: 80,
            timestamp: chrono::Utc::now(),
            tag: "ER001".into(),
            behavior: BehaviorState::Grazing,
        }
    }

    async fn spawn(router: Router) -> SocketAddr {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            axum::serve(listener, router).await.unwrap();
        });
        addr
    }

    fn endpoint(addr: SocketAddr) -> Url {
        format!("http://{addr}/api/tracking/tracker-data")
            .parse()
            .unwrap()
    }

    async fn accept(State(received): State<Received>, Json(body): Json<Value>) -> StatusCode {
        received.lock().unwrap().push(body);
        StatusCode::OK
    }

    #[tokio::test]
    async fn http_sink_posts_wire_schema() {
        let received: Received = Arc::default();
        let router = Router::new()
            .route("/api/tracking/tracker-data", post(accept))
            .with_state(received.clone());
        let addr = spawn(router).await;

        let sink = HttpSink::new(endpoint(addr), Duration::from_secs(5), 200).unwrap();
        sink.deliver(&record()).await.unwrap();

        let bodies = received.lock().unwrap();
        assert_eq!(bodies.len(), 1);
        assert_eq!(bodies[0]["deviceId"], "COW_GPS_ER_01");
        assert_eq!(bodies[0]["batteryLevel"], 90);
        assert!(bodies[0].get("tag").is_none());
    }

    #[tokio::test]
    async fn non_accepted_status_is_rejection() {
        let router = Router::new().route(
            "/api/tracking/tracker-data",
            post(|| async { (StatusCode::NOT_FOUND, "tracker not registered") }),
        );
        let addr = spawn(router).await;

        let sink = HttpSink::new(endpoint(addr), Duration::from_secs(5), 200).unwrap();
        match sink.deliver(&record()).await {
            Err(SinkError::Rejected { status, body }) => {
                assert_eq!(status, 404);
                assert_eq!(body, "tracker not registered");
            }
            other => panic!("unexpected outcome: {other:?}"),
        }
    }

    #[tokio::test]
    async fn other_success_codes_are_not_accepted() {
        let router = Router::new().route(
            "/api/tracking/tracker-data",
            post(|| async { StatusCode::CREATED }),
        );
        let addr = spawn(router).await;
        let sink = HttpSink::new(endpoint(addr), Duration::from_secs(5), 200).unwrap();
        assert!(matches!(
            sink.deliver(&record()).await,
            Err(SinkError::Rejected { status: 201, .. })
        ));
    }

    #[tokio::test]
    async fn slow_endpoint_times_out() {
        let router = Router::new().route(
            "/api/tracking/tracker-data",
            post(|| async {
                tokio::time::sleep(Duration::from_secs(5)).await;
                StatusCode::OK
            }),
        );
        let addr = spawn(router).await;
        let sink = HttpSink::new(endpoint(addr), Duration::from_millis(100), 200).unwrap();
        assert!(matches!(
            sink.deliver(&record()).await,
            Err(SinkError::Timeout)
        ));
    }

    #[tokio::test]
    async fn refused_connection_is_connect_error() {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        drop(listener);
        let sink = HttpSink::new(endpoint(addr), Duration::from_secs(2), 200).unwrap();
        assert!(matches!(
            sink.deliver(&record()).await,
            Err(SinkError::Connect(_))
        ));
    }

    #[tokio::test]
    async fn from_config_joins_endpoint() {
        let config = ApiConfig {
            base_url: "http://127.0.0.1:5191".into(),
            ..ApiConfig::default()
        };
        let sink = HttpSink::from_config(&config).unwrap();
        assert_eq!(
            sink.endpoint().as_str(),
            "http://127.0.0.1:5191/api/tracking/tracker-data"
        );
        assert!(sink.describe().starts_with("http "));
    }

    #[tokio::test]
    async fn stdout_sink_always_succeeds() {
        StdoutSink.deliver(&record()).await.unwrap();
        let shared: Arc<dyn TelemetrySink> = Arc::new(StdoutSink);
        shared.deliver(&record()).await.unwrap();
    }
}
