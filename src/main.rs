use anyhow::{anyhow, Result};
use metrics_exporter_prometheus::PrometheusBuilder;
use nomad_dns::error::Error::DNSError;
use nomad_dns::metrics::{DynMetricsSink, FacadeMetrics};
use nomad_dns::{Config, NomadClient, RefreshLoop, Resolver, SharedConfig, SnapshotCell};
use std::sync::Arc;
use tokio::signal;
use tokio_util::sync::CancellationToken;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> Result<()> {
    tracing_init();

    let mut first_args = std::env::args().take(2);
    let (program_name, config_file) = (
        first_args.next().unwrap_or("nomad-dns".to_string()),
        first_args.next(),
    );

    let config = config_init(&program_name, config_file)?;
    let snapshots = SnapshotCell::new();
    let metrics: DynMetricsSink = Arc::new(FacadeMetrics);
    let stop = CancellationToken::new();

    // The recorder has to be in place before anything reports into the facade.
    let prometheus = match config.api_bind_addr {
        Some(_) => Some(PrometheusBuilder::new().install_recorder()?),
        None => None,
    };

    tracing::info!(
        "refreshing from {} every {}s",
        &config.nomad_addr,
        config.refresh_interval.as_secs()
    );
    let refresh = RefreshLoop::new(
        Arc::new(NomadClient::new(&config)?),
        snapshots.clone(),
        metrics.clone(),
        config.refresh_interval,
        stop.clone(),
    );
    let refresh_handle = tokio::spawn(refresh.run());

    let resolver = Resolver::new(
        snapshots.clone(),
        config.domain.clone(),
        config.dns_ttl,
        metrics,
    );
    tracing::info!(
        "DNS listening on UDP {} for *{}",
        &config.dns_udp_bind_addr,
        &config.domain
    );
    if let Some(tcp_addr) = &config.dns_tcp_bind_addr {
        tracing::info!("DNS listening on TCP {tcp_addr}");
    }
    let dns_server = nomad_dns::dns::new(&config, resolver).await?;
    let dns_handle = tokio::spawn(dns_server.block_until_done());

    let api_handle = match config.api_bind_addr {
        Some(api_addr) => {
            tracing::info!("API listening on {api_addr}");
            let api_server =
                nomad_dns::api::new(api_addr, config.api_timeout, snapshots, prometheus);
            Some(tokio::spawn(api_server))
        }
        None => None,
    };
    let api_done = async {
        match api_handle {
            Some(handle) => handle.await,
            None => std::future::pending().await,
        }
    };

    tokio::select! {
        _ = signal::ctrl_c() => {
            tracing::info!("quitting from signal");
        },
        Ok(dns_res) = dns_handle => {
            if let Err(err) = dns_res {
                return Err(DNSError(err).into())
            }
        }
        Ok(api_res) = api_done => {
            if let Err(err) = api_res {
                return Err(err.into())
            }
        }
    }

    stop.cancel();
    refresh_handle.await?;
    tracing::info!("goodbye");
    Ok(())
}

fn tracing_init() {
    tracing_subscriber::registry()
        .with(tracing_subscriber::fmt::layer())
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "nomad_dns=info".into()),
        )
        .init();
}

fn config_init(program_name: &str, config_file: Option<String>) -> Result<SharedConfig> {
    match config_file {
        None => Err(anyhow!("usage: {program_name} /path/to/config.json")),
        Some(config_file) => {
            let config = Config::try_from_file(&config_file)?;
            tracing::debug!("loaded config from {config_file}");
            Ok(Arc::new(config))
        }
    }
}
