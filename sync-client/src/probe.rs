//! Endpoint probing.
//!
//! A probe is one unauthenticated `GET /rest/noauth/health` against a
//! candidate's sync-daemon GUI port. The daemon answers that path without
//! credentials and stamps its device identity into a response header, so no
//! SSH access or API key is needed to learn who is on the other end.
//!
//! Every way the request can end maps onto exactly one [`ProbeStatus`]:
//!
//! | what happened                         | status               |
//! |---------------------------------------|----------------------|
//! | 200 + identity header                 | `SUCCESS`            |
//! | 200, no identity header               | `NO_IDENTITY_HEADER` |
//! | non-200                               | `HTTP_ERROR`         |
//! | connection refused                    | `CONNECTION_REFUSED` |
//! | no answer within the timeout          | `TIMEOUT`            |
//! | anything else                         | `UNKNOWN_ERROR`      |
//!
//! There are no retries. A missing identity header is a soft failure: the
//! header is an implementation detail of the daemon, not a versioned
//! protocol, and may disappear in a future release.

use crate::error::{ClientError, Result};
use async_trait::async_trait;
use reqwest::header::HeaderMap;
use scratch_sync_types::{
    PeerIdentity, ProbeFailure, ProbeOutcome, DATA_PORT, DEVICE_ID_HEADER, HEALTH_PATH,
    VERSION_HEADER,
};
use std::collections::HashMap;
use std::io::ErrorKind;
use std::sync::{Arc, Mutex};
use std::time::Duration;

/// Default probe timeout in seconds.
pub const DEFAULT_PROBE_TIMEOUT_SECS: u64 = 3;

/// Probes a single candidate.
#[async_trait]
pub trait Prober: Send + Sync {
    /// Probe `ip:port` within `timeout`.
    async fn probe(&self, ip: &str, port: u16, timeout: Duration) -> ProbeOutcome;
}

/// Probe over HTTP with reqwest.
#[derive(Debug, Clone)]
pub struct HttpProbe {
    client: reqwest::Client,
}

impl HttpProbe {
    /// Build a probe client.
    ///
    /// Proxies from the environment are ignored; overlay addresses are
    /// always dialled directly.
    pub fn new() -> Result<Self> {
        let client = reqwest::Client::builder()
            .no_proxy()
            .build()
            .map_err(ClientError::Http)?;
        Ok(Self { client })
    }
}

fn health_url(ip: &str, port: u16) -> String {
    if ip.contains(':') {
        format!("http://[{}]:{}{}", ip, port, HEALTH_PATH)
    } else {
        format!("http://{}:{}{}", ip, port, HEALTH_PATH)
    }
}

#[async_trait]
impl Prober for HttpProbe {
    async fn probe(&self, ip: &str, port: u16, timeout: Duration) -> ProbeOutcome {
        let url = health_url(ip, port);
        let request = self.client.get(&url).timeout(timeout).send();

        let outcome = match tokio::time::timeout(timeout, request).await {
            Err(_) => ProbeOutcome::failure(
                ProbeFailure::Timeout,
                format!("no response within {}ms", timeout.as_millis()),
            ),
            Ok(Err(e)) => classify_error(&e),
            Ok(Ok(response)) => {
                classify_response(ip, response.status().as_u16(), response.headers())
            }
        };

        tracing::debug!("probe {} -> {}", url, outcome.status());
        outcome
    }
}

/// Classify an HTTP response from the health endpoint.
pub fn classify_response(ip: &str, status: u16, headers: &HeaderMap) -> ProbeOutcome {
    if status != 200 {
        return ProbeOutcome::failure(ProbeFailure::HttpError, format!("HTTP {}", status));
    }

    let device_id = match headers.get(DEVICE_ID_HEADER).map(|v| v.to_str()) {
        Some(Ok(id)) if !id.trim().is_empty() => id.trim().to_string(),
        Some(Ok(_)) | None => {
            return ProbeOutcome::failure(
                ProbeFailure::NoIdentityHeader,
                format!("port answered without {}; not a Syncthing GUI?", DEVICE_ID_HEADER),
            );
        }
        Some(Err(_)) => {
            return ProbeOutcome::failure(
                ProbeFailure::NoIdentityHeader,
                format!("{} is not valid text", DEVICE_ID_HEADER),
            );
        }
    };

    let version = headers
        .get(VERSION_HEADER)
        .and_then(|v| v.to_str().ok())
        .map(str::trim)
        .filter(|v| !v.is_empty())
        .unwrap_or("unknown")
        .to_string();

    ProbeOutcome::success(PeerIdentity {
        hostname: None,
        overlay_ip: ip.to_string(),
        device_id,
        version,
        data_port: DATA_PORT,
    })
}

fn io_kind(err: &(dyn std::error::Error + 'static)) -> Option<ErrorKind> {
    let mut current = Some(err);
    while let Some(e) = current {
        if let Some(io) = e.downcast_ref::<std::io::Error>() {
            return Some(io.kind());
        }
        current = e.source();
    }
    None
}

fn error_chain(err: &(dyn std::error::Error + 'static)) -> String {
    let mut parts = vec![err.to_string()];
    let mut current = err.source();
    while let Some(e) = current {
        let text = e.to_string();
        if !parts.iter().any(|p| p == &text) {
            parts.push(text);
        }
        current = e.source();
    }
    parts.join(": ")
}

/// Classify a transport-level failure.
pub fn classify_error(err: &reqwest::Error) -> ProbeOutcome {
    let message = error_chain(err);
    if err.is_timeout() {
        return ProbeOutcome::failure(ProbeFailure::Timeout, message);
    }
    match io_kind(err) {
        Some(ErrorKind::ConnectionRefused) => {
            ProbeOutcome::failure(ProbeFailure::ConnectionRefused, message)
        }
        Some(ErrorKind::TimedOut) => ProbeOutcome::failure(ProbeFailure::Timeout, message),
        _ => ProbeOutcome::failure(ProbeFailure::UnknownError, message),
    }
}

/// Probe that answers from a script, for tests and demos.
///
/// IPs without a scripted outcome are reported as refused.
#[derive(Debug, Clone, Default)]
pub struct ScriptedProbe {
    inner: Arc<Mutex<ScriptedInner>>,
}

#[derive(Debug, Default)]
struct ScriptedInner {
    outcomes: HashMap<String, ProbeOutcome>,
    probed: Vec<String>,
}

impl ScriptedProbe {
    /// An empty script.
    pub fn new() -> Self {
        Self::default()
    }

    /// Script the outcome for `ip`.
    pub fn respond(&self, ip: &str, outcome: ProbeOutcome) {
        let mut inner = self.inner.lock().unwrap();
        inner.outcomes.insert(ip.to_string(), outcome);
    }

    /// Script a successful probe for `ip` with the given device id.
    pub fn respond_ok(&self, ip: &str, device_id: &str) {
        self.respond(
            ip,
            ProbeOutcome::success(PeerIdentity {
                hostname: None,
                overlay_ip: ip.to_string(),
                device_id: device_id.to_string(),
                version: "unknown".to_string(),
                data_port: DATA_PORT,
            }),
        );
    }

    /// IPs probed so far, in call order.
    pub fn probed(&self) -> Vec<String> {
        self.inner.lock().unwrap().probed.clone()
    }
}

#[async_trait]
impl Prober for ScriptedProbe {
    async fn probe(&self, ip: &str, _port: u16, _timeout: Duration) -> ProbeOutcome {
        let mut inner = self.inner.lock().unwrap();
        inner.probed.push(ip.to_string());
        inner.outcomes.get(ip).cloned().unwrap_or_else(|| {
            ProbeOutcome::failure(ProbeFailure::ConnectionRefused, "connection refused")
        })
    }
}
