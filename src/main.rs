use anyhow::Context;
use clap::Parser;
use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};

use payplan::api::cli::{Cli, Command};
use payplan::api::{build_request, run_http_server};
use payplan::core::build_plan;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| "payplan=info".into()))
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let cli = Cli::parse();
    match cli.command {
        Command::Serve { port } => run_http_server(port)
            .await
            .with_context(|| format!("HTTP server on port {port} failed")),
        Command::Plan(args) => {
            let request = build_request(&args)?;
            let plan = build_plan(&request.tax_year, &request.inputs);
            println!("{}", serde_json::to_string_pretty(&plan)?);
            Ok(())
        }
    }
}
