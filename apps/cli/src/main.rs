mod cli;
mod commands;
mod config;
mod subprocess;

use clap::Parser;
use tracing_subscriber::prelude::*;
use tracing_subscriber::{fmt, EnvFilter};

use cli::{selected_parts, Cli, Commands};
use commands::App;
use config::{Config, LogFormat};
use contentimport_core::batch::BatchRequest;

fn init_tracing(format: LogFormat) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let registry = tracing_subscriber::registry().with(filter);

    match format {
        LogFormat::Json => registry
            .with(
                fmt::layer()
                    .json()
                    .with_current_span(false)
                    .with_writer(std::io::stderr),
            )
            .init(),
        LogFormat::Text => registry
            .with(fmt::layer().with_target(true).with_writer(std::io::stderr))
            .init(),
    }
}

async fn run(cli: Cli, config: Config) -> anyhow::Result<()> {
    let app = App::new(config)?;

    match cli.command {
        Commands::Batch {
            preset,
            parts,
            batch_size,
            external_import_id,
            force,
            in_process,
        } => {
            let request = BatchRequest {
                preset,
                parts: selected_parts(parts),
                batch_size,
                external_run_id: external_import_id,
                force,
            };
            app.batch(request, in_process).await
        }
        Commands::ExecuteBatch(args) => app.execute_batch(args.into()).await,
        Commands::Init { preset, parts } => app.init(&preset, selected_parts(parts)).await,
        Commands::Show { preset } => app.show(&preset),
        Commands::FlushEventLog => app.flush_event_log().await,
        Commands::CreateSite { path, node_type } => app.create_site(&path, &node_type).await,
    }
}

#[tokio::main]
async fn main() {
    dotenvy::dotenv().ok();
    let cli = Cli::parse();
    let config = Config::from_env();
    init_tracing(config.log_format);

    if let Err(err) = run(cli, config).await {
        tracing::error!("{:#}", err);
        std::process::exit(1);
    }
}
