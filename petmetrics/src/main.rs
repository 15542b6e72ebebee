use std::process::ExitCode;

use clap::{Parser, Subcommand};
use snafu::{Report, ResultExt};
use tokio_util::sync::CancellationToken;

use crate::{
    dev::DevArgs,
    error::{ObservabilitySnafu, Result},
    insert::InsertArgs,
    provision::ProvisionArgs,
    query::QueryArgs,
};

mod dev;
mod error;
mod insert;
mod provision;
mod query;
mod remote;

#[derive(Parser)]
#[command(name = "petmetrics")]
#[command(about = "PetMetrics CLI")]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Serve an in-memory store and the query API
    Dev {
        #[clap(flatten)]
        inner: DevArgs,
    },
    /// Create the database and table if they don't exist
    Provision {
        #[clap(flatten)]
        inner: ProvisionArgs,
    },
    /// Generate synthetic measurements and write them in batches
    Insert {
        #[clap(flatten)]
        inner: InsertArgs,
    },
    /// Run a time-bucketed query
    Query {
        #[clap(flatten)]
        inner: QueryArgs,
    },
}

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();

    match run(cli).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            let exit_code = err.kind().exit_code() as u8;
            eprintln!("{}", Report::from_error(err));
            ExitCode::from(exit_code)
        }
    }
}

async fn run(cli: Cli) -> Result<()> {
    petmetrics_observability::init_observability(
        env!("CARGO_PKG_NAME"),
        env!("CARGO_PKG_VERSION"),
    )
    .context(ObservabilitySnafu {})?;

    let ct = CancellationToken::new();

    let ct_clone = ct.clone();
    tokio::spawn(async move {
        let _ = tokio::signal::ctrl_c().await;
        ct_clone.cancel();
    });

    match cli.command {
        Commands::Dev { inner } => inner.run(ct).await,
        Commands::Provision { inner } => inner.run(ct).await,
        Commands::Insert { inner } => inner.run(ct).await,
        Commands::Query { inner } => inner.run(ct).await,
    }
}
