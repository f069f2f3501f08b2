use crate::api;
use crate::commands::Context;
use crate::lookup::LookupService;
use anyhow::{Context as _, Result};
use clap::Args;
use opsdesk_store::Store;
use std::net::SocketAddr;
use std::sync::Arc;
use tokio::net::TcpListener;
use tracing::{debug, info, warn};

#[derive(Debug, Args)]
pub struct ServeArgs {
    /// Address to listen on, overriding server.bind
    #[arg(long)]
    pub bind: Option<SocketAddr>,
}

pub fn serve(ctx: &Context<'_>, args: ServeArgs) -> Result<()> {
    match ctx.db_path.as_deref() {
        Some(path) => {
            let store = Store::open(path)
                .with_context(|| format!("open database {}", path.display()))?;
            store.migrate().with_context(|| "run migrations")?;
            let version = store
                .schema_version()
                .with_context(|| "read schema version")?;
            debug!(path = %path.display(), version, "primary store ready");
        }
        None => warn!("no primary store configured, lookups use the directory only"),
    }
    if ctx.config.directory.is_none() {
        warn!("no directory configured, lookups use the primary store only");
    }

    // The blocking directory client has to be built before the runtime starts.
    let service = Arc::new(
        LookupService::from_config(ctx.db_path.clone(), ctx.config.directory.as_ref())
            .with_context(|| "configure directory client")?,
    );
    let bind = args.bind.unwrap_or(ctx.config.server.bind);

    let runtime = tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .build()
        .with_context(|| "start async runtime")?;
    runtime.block_on(run_server(bind, Arc::clone(&service)))
}

async fn run_server(bind: SocketAddr, service: Arc<LookupService>) -> Result<()> {
    let listener = TcpListener::bind(bind)
        .await
        .with_context(|| format!("bind {bind}"))?;
    info!(address = %bind, "listening");
    axum::serve(listener, api::router(service))
        .with_graceful_shutdown(shutdown_signal())
        .await
        .with_context(|| "serve http")?;
    info!("server stopped");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(err) = tokio::signal::ctrl_c().await {
        warn!(error = %err, "failed to listen for shutdown signal");
        std::future::pending::<()>().await;
    }
}
