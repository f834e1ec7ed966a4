//! Flyback - booster telemetry replay

use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::Context;
use clap::{Parser, Subcommand};
use flyback_replay::{PlaybackConfig, TelemetryStore};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[derive(Parser)]
#[command(name = "flyback")]
#[command(about = "2D replay of booster flight telemetry")]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Render a replay to files
    Cli {
        /// Pass remaining arguments to flyback-cli
        #[arg(trailing_var_arg = true, allow_hyphen_values = true)]
        args: Vec<String>,
    },
    /// Launch web viewer
    Gui {
        /// Telemetry CSV to serve
        input: PathBuf,

        /// JSON playback config used as the base for every request
        #[arg(short, long)]
        config: Option<PathBuf>,

        /// Port to bind to
        #[arg(short, long, default_value_t = 8080)]
        port: u16,

        /// Host to bind to
        #[arg(short = 'H', long, default_value = "0.0.0.0")]
        host: String,
    },
}

fn main() -> anyhow::Result<()> {
    tracing_subscriber::registry()
        .with(tracing_subscriber::fmt::layer())
        .init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Cli { args } => {
            let cli_args: Vec<&str> = args.iter().map(|s| s.as_str()).collect();
            run_cli(&cli_args)
        }
        Commands::Gui {
            input,
            config,
            port,
            host,
        } => run_gui(&input, config.as_deref(), port, &host),
    }
}

fn run_cli(args: &[&str]) -> anyhow::Result<()> {
    let mut full_args = vec!["flyback-cli"];
    full_args.extend(args);

    match flyback_cli::run_cli_main(&full_args) {
        Ok(_) => Ok(()),
        Err(e) => {
            eprintln!("CLI error: {:#}", e);
            std::process::exit(1);
        }
    }
}

fn run_gui(input: &Path, config: Option<&Path>, port: u16, host: &str) -> anyhow::Result<()> {
    use std::net::SocketAddr;
    use tokio::net::TcpListener;
    use tokio::runtime::Runtime;

    // Load before binding so bad input fails fast
    let store = TelemetryStore::from_path(input)
        .with_context(|| format!("loading telemetry from {}", input.display()))?;
    let base = match config {
        Some(path) => PlaybackConfig::from_json_file(path)
            .with_context(|| format!("reading config {}", path.display()))?,
        None => PlaybackConfig::default(),
    };

    let rt = Runtime::new()?;
    rt.block_on(async {
        let addr: SocketAddr = format!("{}:{}", host, port).parse()?;
        let app = flyback_gui::create_router(Arc::new(store), base);
        println!("listening on http://{}", addr);
        tracing::info!("viewer started on {}", addr);
        let listener = TcpListener::bind(addr).await?;
        axum::serve(listener, app).await?;
        Ok(())
    })
}
