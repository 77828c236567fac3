//! Load test CLI for the PathPlanner gRPC service.

use clap::{Parser, Subcommand};
use plan_load_test::{
    summarize, GrpcPlanClient, LoadRunner, OutputFormat, ResultsReport, TestConfig,
};
use std::path::PathBuf;
use std::sync::Arc;
use tracing::{info, Level};
use tracing_subscriber::FmtSubscriber;

#[derive(Parser)]
#[command(name = "plan-load-test")]
#[command(about = "Load testing tool for the PathPlanner gRPC service", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Log level
    #[arg(long, global = true, default_value = "info")]
    log_level: String,

    /// Output format
    #[arg(short, long, global = true, value_enum, default_value_t = OutputFormat::Table)]
    output: OutputFormat,

    /// Disable the interactive progress bar
    #[arg(long, global = true)]
    no_progress: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Run a load test configured from flags
    Run {
        /// gRPC server host
        #[arg(long, env = "PLAN_LOAD_HOST", default_value = "localhost")]
        host: String,

        /// gRPC server port
        #[arg(long, env = "PLAN_LOAD_PORT", default_value = "50051")]
        port: u16,

        /// Total number of requests
        #[arg(short, long, default_value = "2000")]
        requests: u64,

        /// Max concurrent requests
        #[arg(short, long, default_value = "50")]
        concurrent: u32,

        /// RNG seed for reproducible payloads
        #[arg(long)]
        seed: Option<u64>,
    },

    /// Run a load test from a scenario file
    Scenario {
        /// Path to scenario YAML file
        #[arg(short, long)]
        scenario: PathBuf,

        /// Override total requests
        #[arg(short, long)]
        requests: Option<u64>,

        /// Override concurrency level
        #[arg(short, long)]
        concurrent: Option<u32>,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load environment from .env file if present
    dotenvy::dotenv().ok();

    let cli = Cli::parse();

    let level = match cli.log_level.to_lowercase().as_str() {
        "trace" => Level::TRACE,
        "debug" => Level::DEBUG,
        "info" => Level::INFO,
        "warn" => Level::WARN,
        "error" => Level::ERROR,
        _ => Level::INFO,
    };

    // Logs go to stderr so stdout carries only the report
    let subscriber = FmtSubscriber::builder()
        .with_max_level(level)
        .with_target(false)
        .with_writer(std::io::stderr)
        .finish();

    tracing::subscriber::set_global_default(subscriber)?;

    let config = match cli.command {
        Commands::Run {
            host,
            port,
            requests,
            concurrent,
            seed,
        } => TestConfig {
            host,
            port,
            requests,
            concurrency: concurrent,
            seed,
            ..Default::default()
        },
        Commands::Scenario {
            scenario,
            requests,
            concurrent,
        } => {
            info!(path = %scenario.display(), "Loading scenario");
            let mut config = TestConfig::from_file(&scenario)?;

            // Apply overrides
            if let Some(r) = requests {
                config.requests = r;
            }
            if let Some(c) = concurrent {
                config.concurrency = c;
            }
            config
        }
    };

    config.validate()?;

    ResultsReport::write_preamble(
        &config,
        cli.output,
        &mut std::io::stdout(),
        &mut std::io::stderr(),
    )?;

    // Unreachable targets abort here, before any request is issued
    let client = GrpcPlanClient::connect(&config).await?;

    let runner = LoadRunner::new(&config).with_progress_bar(!cli.no_progress);
    let result = runner.run(Arc::new(client)).await?;
    let stats = summarize(&result);

    println!("{}", ResultsReport::render(&config, &stats, cli.output)?);

    Ok(())
}
