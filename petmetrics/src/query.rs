use clap::Args;
use petmetrics_query::{Granularity, types::ErrorResponse};
use serde_json::Value;
use snafu::ResultExt;
use tokio_util::sync::CancellationToken;

use crate::{
    error::{HttpSnafu, JsonParseSnafu, QueryFailedSnafu, Result},
    remote::RemoteArgs,
};

#[derive(Debug, Args)]
pub struct QueryArgs {
    /// Bucket granularity: all, yearly, monthly, weekly or daily.
    granularity: Granularity,
    /// JSON event sent with the query.
    #[arg(long)]
    event: Option<String>,
    #[clap(flatten)]
    remote: RemoteArgs,
}

impl QueryArgs {
    pub async fn run(self, ct: CancellationToken) -> Result<()> {
        let event = match &self.event {
            Some(event) => serde_json::from_str::<Value>(event).context(JsonParseSnafu {})?,
            None => Value::Null,
        };

        let url = self.remote.url(&format!("/v1/metrics/{}", self.granularity));
        let request = reqwest::Client::new().post(url).json(&event).send();

        let response = tokio::select! {
            _ = ct.cancelled() => return Ok(()),
            response = request => response.context(HttpSnafu {})?,
        };

        let status = response.status();
        if !status.is_success() {
            let message = match response.json::<ErrorResponse>().await {
                Ok(body) => body.message,
                Err(_) => status.to_string(),
            };
            return QueryFailedSnafu {
                status: status.as_u16(),
                message,
            }
            .fail();
        }

        let body = response.json::<Value>().await.context(HttpSnafu {})?;
        let pretty = serde_json::to_string_pretty(&body).context(JsonParseSnafu {})?;
        println!("{pretty}");

        Ok(())
    }
}
