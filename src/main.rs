mod catalog;
mod cli;
mod db;
mod download;
mod error;
mod ingest;
mod parquet;
mod reading;
mod reconcile;

use anyhow::Result;
use clap::Parser;
use tracing::error;
use tracing_subscriber::EnvFilter;

use cli::{
    command::{self, query, Settings},
    Cli, Commands,
};
use db::ObservationFilter;

#[tokio::main]
async fn main() {
    init_tracing();

    if let Err(err) = run().await {
        error!(error = %err, "command failed");
        for cause in err.chain().skip(1) {
            error!(cause = %cause, "caused by");
        }
        std::process::exit(1);
    }
}

fn init_tracing() {
    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));

    tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();
}

async fn run() -> Result<()> {
    let cli = Cli::parse();
    let settings = Settings::from_args(&cli.settings)?;

    match cli.command {
        Commands::Ingest {
            region,
            parameter,
            json,
        } => command::ingest(&settings, region, parameter, json).await,
        Commands::Load {
            region,
            parameter,
            file,
            format,
        } => command::load(&settings, &region, &parameter, &file, format),
        Commands::Regions {} => query::regions(&settings),
        Commands::Parameters {} => query::parameters(&settings),
        Commands::Observations {
            region,
            parameter,
            year,
            year_from,
            year_to,
            limit,
            offset,
        } => {
            let filter = ObservationFilter {
                region,
                parameter,
                year,
                year_from,
                year_to,
                limit: Some(limit),
                offset,
            };
            query::observations(&settings, &filter)
        }
        Commands::Observation { id } => query::observation(&settings, id),
        Commands::Summary { region, parameter } => query::summary(&settings, &region, &parameter),
        Commands::Sources {} => query::sources(&settings),
        Commands::Chart { region, parameter } => query::chart(&settings, &region, &parameter),
        Commands::Stats {} => query::stats(&settings),
        Commands::Export {
            region,
            parameter,
            output,
        } => {
            let filename = command::export(&settings, region, parameter, output)?;
            println!("File saved to `{}`", filename);
            Ok(())
        }
    }
}
