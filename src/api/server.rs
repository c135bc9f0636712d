use crate::api::routes;
use crate::snapshot::SnapshotCell;
use metrics_exporter_prometheus::PrometheusHandle;
use std::future::Future;
use std::net::SocketAddr;
use std::time::Duration;

#[derive(Clone)]
pub(super) struct AppState {
    pub snapshots: SnapshotCell,
    pub prometheus: Option<PrometheusHandle>,
}

/// Serve the status API on `bind_addr`.
///
/// # Panics
///
/// Panics if `bind_addr` can't be bound.
pub fn new(
    bind_addr: SocketAddr,
    timeout: Duration,
    snapshots: SnapshotCell,
    prometheus: Option<PrometheusHandle>,
) -> impl Future<Output = hyper::Result<()>> {
    axum::Server::bind(&bind_addr).serve(
        routes::new(
            AppState {
                snapshots,
                prometheus,
            },
            timeout,
        )
        .into_make_service(),
    )
}
