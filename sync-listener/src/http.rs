//! HTTP routes for the discovery listener.

use crate::identity::IdentitySource;
use axum::extract::ConnectInfo;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::{routing::get, Extension, Json, Router};
use std::net::{IpAddr, Ipv4Addr, Ipv6Addr, SocketAddr};
use std::sync::Arc;
use tracing::{debug, warn};

/// Build the router. Everything but `GET /info` is 404.
pub fn build_router(identity: Arc<dyn IdentitySource>) -> Router {
    Router::new()
        .route("/info", get(info_handler))
        .layer(Extension(identity))
}

fn is_overlay_v4(ip: Ipv4Addr) -> bool {
    // 100.64.0.0/10
    let [a, b, ..] = ip.octets();
    a == 100 && (b & 0xc0) == 64
}

fn is_overlay_v6(ip: Ipv6Addr) -> bool {
    // fd7a:115c:a1e0::/48
    let s = ip.segments();
    s[0] == 0xfd7a && s[1] == 0x115c && s[2] == 0xa1e0
}

/// Whether `ip` is inside the overlay's address blocks.
///
/// IPv4-mapped IPv6 addresses are judged by their IPv4 part.
pub fn is_overlay_addr(ip: IpAddr) -> bool {
    match ip {
        IpAddr::V4(v4) => is_overlay_v4(v4),
        IpAddr::V6(v6) => match v6.to_ipv4_mapped() {
            Some(v4) => is_overlay_v4(v4),
            None => is_overlay_v6(v6),
        },
    }
}

async fn info_handler(
    ConnectInfo(caller): ConnectInfo<SocketAddr>,
    Extension(identity): Extension<Arc<dyn IdentitySource>>,
) -> Response {
    if !is_overlay_addr(caller.ip()) {
        warn!("rejecting /info from {}", caller.ip());
        return (StatusCode::FORBIDDEN, "Forbidden: not an overlay address").into_response();
    }

    match identity.node_info().await {
        Ok(info) => {
            debug!("served /info to {}", caller.ip());
            Json(info).into_response()
        }
        Err(e) => {
            warn!("identity lookup failed: {}", e);
            (StatusCode::INTERNAL_SERVER_ERROR, e.to_string()).into_response()
        }
    }
}
