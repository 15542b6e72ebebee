use std::{net::SocketAddr, sync::Arc, time::Duration};

use axum::Router;
use clap::Args;
use petmetrics_query::{HttpQueryServer, StubQueryProvider};
use petmetrics_store::{InMemoryTimeSeriesStore, TimeSeriesStore};
use petmetrics_store_http::HttpStoreServer;
use snafu::ResultExt;
use tokio_util::sync::CancellationToken;
use tracing::info;

use crate::{
    error::{InvalidServerUrlSnafu, IoSnafu, Result},
    provision::TableArgs,
};

#[derive(Debug, Args)]
pub struct DevArgs {
    /// The address of the HTTP server.
    #[arg(long, default_value = "127.0.0.1:7780")]
    address: String,
    /// Delay every query answer by this many milliseconds.
    #[arg(long, default_value = "0")]
    query_latency_ms: u64,
    /// Create the database and table on startup.
    #[arg(long)]
    provision: bool,
    #[clap(flatten)]
    table: TableArgs,
}

impl DevArgs {
    pub async fn run(self, ct: CancellationToken) -> Result<()> {
        let address = self
            .address
            .parse::<SocketAddr>()
            .context(InvalidServerUrlSnafu {})?;

        let store: Arc<dyn TimeSeriesStore> = Arc::new(InMemoryTimeSeriesStore::new());

        if self.provision {
            self.table.ensure(store.as_ref()).await?;
        }

        let queries = StubQueryProvider::new()
            .with_latency(Duration::from_millis(self.query_latency_ms));

        let app = Router::new()
            .merge(HttpStoreServer::new(store).into_router())
            .merge(HttpQueryServer::new(Arc::new(queries)).into_router());

        info!(%address, "Starting PetMetrics in development mode");

        let listener = tokio::net::TcpListener::bind(&address)
            .await
            .context(IoSnafu {})?;

        let server = axum::serve(listener, app).with_graceful_shutdown(async move {
            ct.cancelled().await;
        });

        server.await.context(IoSnafu {})?;

        info!("Development server stopped");

        Ok(())
    }
}
