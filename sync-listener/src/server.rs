//! Running the listener.

use crate::config::ListenerConfig;
use crate::error::{ListenerError, Result};
use crate::http::build_router;
use crate::identity::IdentitySource;
use std::future::Future;
use std::net::SocketAddr;
use std::sync::Arc;
use tokio::net::TcpListener;
use tokio::sync::oneshot;
use tokio::task::JoinHandle;
use tracing::info;

/// Bind the configured address.
pub async fn bind(config: &ListenerConfig) -> Result<TcpListener> {
    let addr = config.socket_addr()?;
    TcpListener::bind(addr).await.map_err(|source| ListenerError::Bind {
        address: config.bind_address.clone(),
        source,
    })
}

/// Serve `/info` on `listener` until `shutdown` resolves.
pub async fn serve<I, F>(listener: TcpListener, identity: I, shutdown: F) -> Result<()>
where
    I: IdentitySource,
    F: Future<Output = ()> + Send + 'static,
{
    let app = build_router(Arc::new(identity));
    axum::serve(
        listener,
        app.into_make_service_with_connect_info::<SocketAddr>(),
    )
    .with_graceful_shutdown(shutdown)
    .await
    .map_err(ListenerError::Serve)
}

/// A listener running in the background.
#[derive(Debug)]
pub struct ListenerHandle {
    local_addr: SocketAddr,
    shutdown: oneshot::Sender<()>,
    task: JoinHandle<Result<()>>,
}

impl ListenerHandle {
    /// The bound address.
    pub fn local_addr(&self) -> SocketAddr {
        self.local_addr
    }

    /// Stop the listener and wait for it to finish.
    pub async fn shutdown(self) -> Result<()> {
        // The task may already have exited; its result is reported below.
        let _ = self.shutdown.send(());
        match self.task.await {
            Ok(result) => result,
            Err(e) => Err(ListenerError::Serve(std::io::Error::other(e))),
        }
    }
}

/// Bind and serve in a background task.
pub async fn spawn<I: IdentitySource>(
    config: &ListenerConfig,
    identity: I,
) -> Result<ListenerHandle> {
    let listener = bind(config).await?;
    let local_addr = listener.local_addr().map_err(ListenerError::Serve)?;
    let (tx, rx) = oneshot::channel::<()>();

    info!("discovery listener on {}", local_addr);
    let task = tokio::spawn(serve(listener, identity, async move {
        let _ = rx.await;
    }));

    Ok(ListenerHandle {
        local_addr,
        shutdown: tx,
        task,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::identity::DaemonIdentity;
    use scratch_sync_client::{MockDaemon, StaticMembership};

    fn loopback() -> ListenerConfig {
        ListenerConfig {
            bind_address: "127.0.0.1:0".into(),
            enabled_during_pair: true,
        }
    }

    fn identity() -> DaemonIdentity<MockDaemon, StaticMembership> {
        DaemonIdentity::new(
            MockDaemon::new("LOCAL-ID"),
            Some(StaticMembership::new(vec![]).with_hostname("workstation")),
        )
    }

    #[tokio::test]
    async fn spawned_listener_answers_and_shuts_down() {
        let handle = spawn(&loopback(), identity()).await.unwrap();
        let url = format!("http://{}/info", handle.local_addr());

        let client = reqwest::Client::builder()
            .no_proxy()
            .pool_max_idle_per_host(0)
            .build()
            .unwrap();
        let response = client.get(&url).send().await.unwrap();
        // Loopback is not on the overlay.
        assert_eq!(response.status().as_u16(), 403);

        let response = client
            .get(format!("http://{}/missing", handle.local_addr()))
            .send()
            .await
            .unwrap();
        assert_eq!(response.status().as_u16(), 404);

        handle.shutdown().await.unwrap();
        assert!(client.get(&url).send().await.is_err());
    }

    #[tokio::test]
    async fn port_in_use_is_bind_error() {
        let first = spawn(&loopback(), identity()).await.unwrap();
        let taken = ListenerConfig {
            bind_address: first.local_addr().to_string(),
            enabled_during_pair: true,
        };
        let err = spawn(&taken, identity()).await.unwrap_err();
        assert!(matches!(err, ListenerError::Bind { .. }));
        first.shutdown().await.unwrap();
    }
}
