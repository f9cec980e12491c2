use std::path::PathBuf;

use clap::Parser;
use clap::Subcommand;
use cmd::config;
use cmd::config::LogLevel;
use cmd::error::Error;
use cmd::error::Result;
use cmd::server;
use tracing::info;
use tracing_subscriber::FmtSubscriber;

#[derive(Parser, Clone)]
pub struct Cfg {
    /// Config file (toml, yaml or json)
    #[arg(long)]
    config: Option<PathBuf>,
    /// Overrides `log.level` of the config file
    #[arg(long, value_enum)]
    log_level: Option<LogLevel>,
}

#[derive(Subcommand, Clone)]
enum Commands {
    /// Run server
    Server(Cfg),
}

#[derive(Parser)]
#[command(propagate_version = true)]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Cli::parse();
    let Some(Commands::Server(args)) = args.command else {
        return Err(Error::BadRequest("no command specified".to_string()));
    };

    // .env is optional
    let dotenv = dotenvy::dotenv();

    let mut cfg = config::load(args.config.as_deref(), |k| std::env::var(k).ok())?;
    if let Some(level) = args.log_level {
        cfg.log.level = level;
    }

    let subscriber = FmtSubscriber::builder()
        .with_max_level(tracing::level_filters::LevelFilter::from(cfg.log.level))
        .finish();
    tracing::subscriber::set_global_default(subscriber)?;

    let version = env!("CARGO_PKG_VERSION");
    info!("linkpage v{version}");
    if let Ok(path) = dotenv {
        info!("environment loaded from {:?}", path);
    }

    server::start(cfg.try_into()?).await
}
