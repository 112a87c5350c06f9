//! turnipd — the Turnip daemon.
//!
//! Assembles the wake controller over the AWS adapters and serves it:
//! - Config (turnip.toml + CLI overrides)
//! - AWS SDK clients (ECS, ELBv2)
//! - Wake controller
//! - HTTP entry point
//!
//! # Usage
//!
//! ```text
//! turnipd serve --config /etc/turnip/turnip.toml --listen 0.0.0.0:8080
//! turnipd wake --cluster demo --service svc-a
//! ```

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::Context;
use clap::{Parser, Subcommand, ValueEnum};
use tracing::info;

use turnip_aws::{load_sdk_config, EcsOrchestrator, ElbLoadBalancing};
use turnip_core::{ServiceRef, TurnipConfig};
use turnip_wake::{WakeController, WakeSettings};

#[derive(Parser)]
#[command(name = "turnipd", about = "Turnip wake-and-redirect daemon")]
struct Cli {
    /// Log output format.
    #[arg(long, value_enum, default_value = "text", global = true)]
    log_format: LogFormat,

    #[command(subcommand)]
    command: Command,
}

#[derive(Clone, Copy, ValueEnum)]
enum LogFormat {
    Text,
    Json,
}

/// Overrides shared by every subcommand.
#[derive(clap::Args)]
struct ConfigArgs {
    /// Path to turnip.toml.
    #[arg(long)]
    config: Option<PathBuf>,

    /// AWS region (overrides the config file).
    #[arg(long)]
    region: Option<String>,

    /// Endpoint override for ECS and ELBv2, e.g. LocalStack.
    #[arg(long)]
    endpoint_url: Option<String>,
}

#[derive(Subcommand)]
enum Command {
    /// Serve wake requests over HTTP.
    Serve {
        #[command(flatten)]
        config: ConfigArgs,

        /// Address to listen on (overrides the config file).
        #[arg(long)]
        listen: Option<String>,
    },
    /// Run a single wake request and print the response.
    Wake {
        #[command(flatten)]
        config: ConfigArgs,

        #[arg(long)]
        cluster: String,

        #[arg(long)]
        service: String,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.log_format);

    match cli.command {
        Command::Serve { config, listen } => run_serve(serve_config(&config, listen)?).await,
        Command::Wake {
            config,
            cluster,
            service,
        } => {
            let turnip = load_config(&config)?;
            run_wake(turnip, ServiceRef::new(cluster, service)).await
        }
    }
}

fn init_tracing(format: LogFormat) {
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info,turnipd=debug,turnip=debug"));

    match format {
        LogFormat::Text => tracing_subscriber::fmt().with_env_filter(filter).init(),
        LogFormat::Json => tracing_subscriber::fmt().json().with_env_filter(filter).init(),
    }
}

fn load_config(args: &ConfigArgs) -> anyhow::Result<TurnipConfig> {
    let mut config = match &args.config {
        Some(path) => TurnipConfig::from_file(path)
            .with_context(|| format!("loading {}", path.display()))?,
        None => TurnipConfig::default(),
    };

    if let Some(region) = &args.region {
        config.aws.region = Some(region.clone());
    }
    if let Some(endpoint_url) = &args.endpoint_url {
        config.aws.endpoint_url = Some(endpoint_url.clone());
    }
    Ok(config)
}

fn serve_config(args: &ConfigArgs, listen: Option<String>) -> anyhow::Result<TurnipConfig> {
    let mut config = load_config(args)?;
    if let Some(listen) = listen {
        config.server.listen = listen;
    }
    config.validate()?;
    Ok(config)
}

async fn build_controller(config: &TurnipConfig) -> anyhow::Result<WakeController> {
    let settings = WakeSettings::from_config(config)?;
    let sdk = load_sdk_config(&config.aws, settings.call_timeout).await;

    Ok(WakeController::new(
        Arc::new(EcsOrchestrator::from_conf(&sdk)),
        Arc::new(ElbLoadBalancing::from_conf(&sdk)),
        settings,
    ))
}

async fn run_serve(config: TurnipConfig) -> anyhow::Result<()> {
    info!("Turnip daemon starting");

    let controller = build_controller(&config).await?;
    info!(
        refresh_secs = controller.settings().refresh_secs,
        "wake controller initialized"
    );

    let router = turnip_api::build_router(controller);
    let addr = config.listen_addr()?;

    info!(%addr, "HTTP server starting");
    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .with_context(|| format!("binding {addr}"))?;

    // Graceful shutdown on Ctrl-C.
    axum::serve(listener, router)
        .with_graceful_shutdown(async {
            if tokio::signal::ctrl_c().await.is_ok() {
                info!("shutdown signal received");
            }
        })
        .await?;

    info!("Turnip daemon stopped");
    Ok(())
}

async fn run_wake(config: TurnipConfig, target: ServiceRef) -> anyhow::Result<()> {
    let controller = build_controller(&config).await?;
    let resp = controller.handle(&target).await?;

    println!("{}", resp.status());
    for (name, value) in resp.headers() {
        println!("{name}: {}", value.to_str().unwrap_or("<binary>"));
    }
    if !resp.body().is_empty() {
        println!();
        println!("{}", resp.body());
    }
    Ok(())
}
