use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use secretgate::config::ConfigLoader;
use secretgate::logging::init_logging;
use secretgate::Processor;

use std::io::Write;
use std::path::PathBuf;
use tokio::io::AsyncReadExt;

#[derive(Parser)]
#[command(name = "secretgate", about = "Secret-scan gate for agent hooks")]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,

    /// Hook framework the payload comes from (e.g. claude)
    #[arg(long)]
    framework: Option<String>,

    /// Path to a config.yaml file
    #[arg(long, value_name = "PATH")]
    config: Option<PathBuf>,

    /// Log level: debug, info, warn or error
    #[arg(long)]
    log_level: Option<String>,

    /// Log format: json or text
    #[arg(long)]
    log_format: Option<String>,
}

#[derive(Subcommand)]
enum Commands {
    /// Print version information
    Version,
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    if let Some(Commands::Version) = cli.command {
        println!("secretgate {}", env!("CARGO_PKG_VERSION"));
        return;
    }

    match run(cli).await {
        Ok(code) => std::process::exit(code),
        Err(err) => {
            eprintln!("Error: {err:#}");
            std::process::exit(1);
        }
    }
}

async fn run(cli: Cli) -> Result<i32> {
    let mut loader = ConfigLoader::new();
    if let Some(path) = cli.config {
        loader = loader.with_path(path);
    }
    let mut config = loader.load().context("failed to load configuration")?;

    if let Some(framework) = cli.framework {
        config.framework = framework;
    }
    if let Some(level) = cli.log_level {
        config.logging.level = level;
    }
    if let Some(format) = cli.log_format {
        config.logging.format = format;
    }

    init_logging(&config.logging).context("failed to initialize logging")?;

    let mut input = Vec::new();
    tokio::io::stdin()
        .read_to_end(&mut input)
        .await
        .context("failed to read hook input from stdin")?;

    let processor = Processor::new(config);
    let outcome = processor.process(&input).await?;

    let mut stdout = std::io::stdout().lock();
    stdout.write_all(&outcome.output)?;
    stdout.write_all(b"\n")?;
    stdout.flush()?;

    Ok(outcome.exit_code)
}
