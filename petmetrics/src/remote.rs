use std::sync::Arc;

use clap::Args;
use petmetrics_store::TimeSeriesStore;
use petmetrics_store_client::HttpStoreClient;

/// Arguments for configuring the remote server connection.
#[derive(Args, Debug, Clone)]
pub struct RemoteArgs {
    /// The address of the remote PetMetrics server.
    ///
    /// Should match the address used in the 'petmetrics dev' command.
    #[arg(long, default_value = "http://127.0.0.1:7780")]
    pub remote_address: String,
}

impl RemoteArgs {
    /// Create a store client for the remote server.
    pub fn store_client(&self) -> Arc<dyn TimeSeriesStore> {
        Arc::new(HttpStoreClient::new(self.remote_address.clone()))
    }

    pub fn url(&self, path: &str) -> String {
        format!("{}{}", self.remote_address.trim_end_matches('/'), path)
    }
}
