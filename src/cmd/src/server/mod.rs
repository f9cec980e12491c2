use std::net::SocketAddr;

use common::config::Config;
use tokio::net::TcpListener;
use tokio::select;
use tokio::signal::unix::signal;
use tokio::signal::unix::SignalKind;
use tracing::debug;
use tracing::info;

use crate::error::Result;
use crate::init_metrics;
use crate::router;

pub async fn start(cfg: Config) -> Result<()> {
    debug!("trust proxy: {}", cfg.server.trust_proxy);

    if let Some(listen) = cfg.metrics.listen {
        info!("metrics initialization on {listen}...");
        init_metrics(listen)?;
    }

    let router = router(&cfg)?;

    let mut sig_int = signal(SignalKind::interrupt())?;
    let mut sig_term = signal(SignalKind::terminate())?;
    let signal = async move {
        select! {
            _=sig_int.recv()=>info!("SIGINT received"),
            _=sig_term.recv()=>info!("SIGTERM received"),
        }
    };

    let listener = TcpListener::bind(cfg.server.host).await?;
    info!("listening on http://{}", listener.local_addr()?);
    axum::serve(
        listener,
        router.into_make_service_with_connect_info::<SocketAddr>(),
    )
    .with_graceful_shutdown(signal)
    .await?;

    info!("server stopped");
    Ok(())
}
