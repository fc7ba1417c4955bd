//! Gateway binary

use anyhow::Context;
use clap::Parser;
use litellm_ws_gateway::config::{Config, DEFAULT_CONFIG_PATH};
use litellm_ws_gateway::utils::logging::init_logging;
use litellm_ws_gateway::{build_info, server};
use std::path::PathBuf;
use std::process::ExitCode;
use tracing::{error, info};

#[derive(Debug, Parser)]
#[command(name = "gateway", version, about = "Multi-tenant WebSocket LLM gateway")]
struct Args {
    /// Path to the YAML configuration file
    #[arg(short, long, env = "GATEWAY_CONFIG", default_value = DEFAULT_CONFIG_PATH)]
    config: PathBuf,
}

#[actix_web::main]
async fn main() -> ExitCode {
    // A missing .env is fine
    let _ = dotenvy::dotenv();
    let args = Args::parse();

    match run(args).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            error!("{:#}", e);
            eprintln!("Error: {:#}", e);
            ExitCode::FAILURE
        }
    }
}

async fn run(args: Args) -> anyhow::Result<()> {
    let config = Config::from_file(&args.config)
        .await
        .with_context(|| format!("loading {}", args.config.display()))?;

    init_logging(config.logging()).context("initializing logging")?;

    let build = build_info();
    info!(
        version = build.version,
        git_hash = build.git_hash,
        config = %args.config.display(),
        "Starting gateway"
    );

    server::run_server(config).await.context("gateway server")?;
    Ok(())
}
