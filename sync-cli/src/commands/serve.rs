//! Run the discovery listener in the foreground.

use anyhow::{Context, Result};
use scratch_sync_client::TailscaleCli;
use scratch_sync_listener::{bind, serve, DaemonIdentity, IdentitySource};
use std::future::Future;
use std::io;
use tokio::net::TcpListener;
use tokio::sync::oneshot;

use crate::config::Config;

/// Run the serve command until Ctrl+C.
pub async fn run(config: &Config, port: Option<u16>) -> Result<()> {
    let daemon = super::syncthing(config)?;
    // The overlay only names this machine; without it the system hostname is used.
    let overlay = config.prerequisites().tailscale().ok().map(TailscaleCli::new);

    let mut listener_config = config.listener.clone();
    if let Some(port) = port {
        listener_config = listener_config.with_port(port)?;
    }
    let listener = bind(&listener_config).await?;
    let addr = listener.local_addr().context("Listener has no local address")?;

    println!("Starting discovery server on {}...", addr);
    println!("Press Ctrl+C to stop");

    let identity = DaemonIdentity::new(daemon, overlay);
    serve_until(listener, identity, tokio::signal::ctrl_c()).await?;

    println!();
    println!("Stopping...");
    Ok(())
}

/// Serve until `stop` resolves. A failed `stop` shuts the listener down and is returned.
async fn serve_until<I, S>(listener: TcpListener, identity: I, stop: S) -> Result<()>
where
    I: IdentitySource,
    S: Future<Output = io::Result<()>>,
{
    let (tx, rx) = oneshot::channel::<()>();
    let server = serve(listener, identity, async move {
        let _ = rx.await;
    });
    tokio::pin!(server);

    tokio::select! {
        result = &mut server => result?,
        signal = stop => {
            let _ = tx.send(());
            server.await?;
            signal.context("Cannot listen for Ctrl+C")?;
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use scratch_sync_client::{MockDaemon, StaticMembership};

    async fn loopback() -> TcpListener {
        TcpListener::bind("127.0.0.1:0").await.unwrap()
    }

    fn identity() -> DaemonIdentity<MockDaemon, StaticMembership> {
        DaemonIdentity::new(MockDaemon::new("LOCAL-ID"), None)
    }

    #[tokio::test]
    async fn stops_cleanly_on_signal() {
        let result = serve_until(loopback().await, identity(), async { Ok(()) }).await;
        assert!(result.is_ok());
    }

    #[tokio::test]
    async fn unavailable_signal_handler_is_an_error() {
        let stop = async { Err(io::Error::other("signal driver gone")) };
        let err = serve_until(loopback().await, identity(), stop)
            .await
            .unwrap_err();
        assert!(err.to_string().contains("Ctrl+C"));
    }
}
