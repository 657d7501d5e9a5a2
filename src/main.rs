use anyhow::Result;
use clap::Parser;
use reqwest::Client;
use std::path::PathBuf;
use tracing::info;
use tracing_subscriber::{fmt, EnvFilter};
use varselscraper::{model::Period, Pipeline, Source};

/// Download the current varsel statistics and write them as JSON.
#[derive(Debug, Parser)]
#[command(version, about)]
struct Cli {
    /// Path of the JSON file to write
    output: Option<PathBuf>,
}

#[tokio::main]
async fn main() -> Result<()> {
    let env = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    fmt::Subscriber::builder()
        .with_env_filter(env)
        .with_writer(std::io::stderr)
        .init();

    let Some(output) = Cli::parse().output else {
        println!("Specify an output");
        return Ok(());
    };

    let pipeline = Pipeline::new(Client::new(), Source::arbetsformedlingen()?);
    let period = Period::current();
    info!(%period, "startup");

    pipeline.run(period, &output).await?;

    println!("File saved as {}", output.display());
    Ok(())
}
