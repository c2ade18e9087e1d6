//! Backend liveness polling.
//!
//! The poller runs for the whole process lifetime, independent of the
//! conversation session. It probes `GET /health` once at startup and then on
//! a fixed interval, publishing a [`Status`] on a `watch` channel.

use std::fmt;
use std::sync::Arc;
use std::time::Duration;

use tokio::sync::watch;
use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;

use crate::api::HealthResponse;
use crate::error::Result;

/// Default probe interval.
pub const DEFAULT_INTERVAL: Duration = Duration::from_secs(15);

/// Default probe timeout.
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(5);

/// Backend availability as shown in the header.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum Status {
    /// No probe has completed yet.
    #[default]
    Unknown,
    /// Agent fully initialized.
    Ready,
    /// Server reachable, agent still loading.
    Starting,
    /// Probe failed or timed out.
    Unreachable,
}

impl Status {
    /// Map a probe outcome to a status.
    #[must_use]
    pub fn from_probe(result: &Result<HealthResponse>) -> Self {
        match result {
            Ok(HealthResponse {
                agent_ready: Some(true),
                ..
            }) => Self::Ready,
            Ok(HealthResponse {
                agent_ready: Some(false),
                ..
            }) => Self::Starting,
            Ok(_) | Err(_) => Self::Unreachable,
        }
    }

    /// Short label for the status indicator.
    #[must_use]
    pub fn label(self) -> &'static str {
        match self {
            Self::Unknown => "connecting",
            Self::Ready => "ready",
            Self::Starting => "starting",
            Self::Unreachable => "unreachable",
        }
    }
}

impl fmt::Display for Status {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Something that can answer a health probe.
#[async_trait::async_trait]
pub trait LivenessProbe: Send + Sync {
    /// Query the backend health endpoint.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails, times out, or the backend
    /// answers with a non-success status.
    async fn health(&self, timeout: Duration) -> Result<HealthResponse>;
}

/// Interval poller settings.
#[derive(Debug, Clone, Copy)]
pub struct PollerSettings {
    /// Time between probes.
    pub interval: Duration,
    /// Upper bound on a single probe.
    pub timeout: Duration,
}

impl Default for PollerSettings {
    fn default() -> Self {
        Self {
            interval: DEFAULT_INTERVAL,
            timeout: DEFAULT_TIMEOUT,
        }
    }
}

/// Run one probe and translate the outcome.
pub async fn probe_once<P: LivenessProbe + ?Sized>(probe: &P, timeout: Duration) -> Status {
    // The outer timeout also covers probes that ignore the hint.
    let result = match tokio::time::timeout(timeout, probe.health(timeout)).await {
        Ok(result) => result,
        Err(_) => {
            tracing::debug!(name: "liveness.probe.timeout", "Health probe timed out");
            return Status::Unreachable;
        }
    };
    if let Err(e) = &result {
        tracing::debug!(name: "liveness.probe.failed", error = %e, "Health probe failed");
    }
    Status::from_probe(&result)
}

/// Spawn the poller.
///
/// The first probe runs immediately; later probes follow `settings.interval`.
/// The task stops only when every receiver is dropped.
pub fn spawn_poller<P>(probe: Arc<P>, settings: PollerSettings) -> (watch::Receiver<Status>, JoinHandle<()>)
where
    P: LivenessProbe + ?Sized + 'static,
{
    let (tx, rx) = watch::channel(Status::Unknown);
    let handle = tokio::spawn(async move {
        let mut ticker = tokio::time::interval(settings.interval);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
        loop {
            ticker.tick().await;
            let status = probe_once(probe.as_ref(), settings.timeout).await;
            let changed = tx.send_if_modified(|current| {
                if *current == status {
                    false
                } else {
                    *current = status;
                    true
                }
            });
            if changed {
                tracing::info!(name: "liveness.status.changed", status = %status, "Backend status changed");
            }
            if tx.is_closed() {
                break;
            }
        }
    });
    (rx, handle)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ExchangeError;
    use std::sync::Mutex;

    struct Scripted {
        replies: Mutex<Vec<Option<bool>>>,
    }

    #[async_trait::async_trait]
    impl LivenessProbe for Scripted {
        async fn health(&self, _timeout: Duration) -> Result<HealthResponse> {
            let next = self.replies.lock().unwrap().remove(0);
            match next {
                Some(ready) => Ok(HealthResponse {
                    status: Some("ok".to_string()),
                    agent_ready: Some(ready),
                }),
                None => Err(ExchangeError::Api {
                    status: 502,
                    detail: None,
                }),
            }
        }
    }

    struct Hanging;

    #[async_trait::async_trait]
    impl LivenessProbe for Hanging {
        async fn health(&self, _timeout: Duration) -> Result<HealthResponse> {
            std::future::pending().await
        }
    }

    #[test]
    fn test_status_mapping() {
        let ready = Ok(HealthResponse {
            status: None,
            agent_ready: Some(true),
        });
        let starting = Ok(HealthResponse {
            status: None,
            agent_ready: Some(false),
        });
        let missing = Ok(HealthResponse {
            status: Some("ok".to_string()),
            agent_ready: None,
        });
        let failed = Err(ExchangeError::Api {
            status: 500,
            detail: None,
        });
        assert_eq!(Status::from_probe(&ready), Status::Ready);
        assert_eq!(Status::from_probe(&starting), Status::Starting);
        assert_eq!(Status::from_probe(&missing), Status::Unreachable);
        assert_eq!(Status::from_probe(&failed), Status::Unreachable);
    }

    #[tokio::test(start_paused = true)]
    async fn test_probe_timeout_is_unreachable() {
        let status = probe_once(&Hanging, Duration::from_secs(5)).await;
        assert_eq!(status, Status::Unreachable);
    }

    #[tokio::test(start_paused = true)]
    async fn test_poller_runs_immediately_then_on_interval() {
        let probe = Arc::new(Scripted {
            replies: Mutex::new(vec![Some(false), Some(true), None]),
        });
        let (mut rx, handle) = spawn_poller(probe, PollerSettings::default());

        rx.changed().await.unwrap();
        assert_eq!(*rx.borrow_and_update(), Status::Starting);

        rx.changed().await.unwrap();
        assert_eq!(*rx.borrow_and_update(), Status::Ready);

        rx.changed().await.unwrap();
        assert_eq!(*rx.borrow_and_update(), Status::Unreachable);

        handle.abort();
    }
}
