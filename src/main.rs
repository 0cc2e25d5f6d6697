use clap::Parser;
use floodgate::config::{self, Config, PolicyKind};
use floodgate::controller::{Firewall, Hub};
use floodgate::runtime::serve;
use floodgate::telemetry::{init_logging, LogConfig, MetricsRegistry};
use std::path::PathBuf;
use std::sync::Arc;
use tracing::info;

#[derive(Parser)]
#[command(name = "floodgate")]
#[command(about = "An OpenFlow 1.0 controller running switches as hubs or as a blacklist firewall")]
struct Cli {
    /// Path to config.toml
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Policy to run: hub or firewall
    #[arg(short, long)]
    policy: Option<String>,

    /// Comma-separated destination addresses to block
    #[arg(long)]
    blacklist: Option<String>,

    /// Comma-separated source addresses exempt from blocking
    #[arg(long)]
    whitelist: Option<String>,

    /// Listen address for switch connections
    #[arg(long)]
    listen: Option<String>,

    /// Check the configuration and exit
    #[arg(long)]
    validate: bool,
}

fn main() {
    let cli = Cli::parse();

    let cfg = match resolve_config(&cli) {
        Ok(cfg) => cfg,
        Err(e) => {
            eprintln!("[ERROR] {}", e);
            std::process::exit(1);
        }
    };

    // Initialize logging (RUST_LOG env var takes priority)
    init_logging(Some(&LogConfig {
        level: cfg.log.level.clone(),
        format: cfg.log.format.clone(),
    }));

    let validation = config::validate(&cfg);
    validation.print_diagnostics();
    if validation.has_errors() {
        eprintln!("[ERROR] Validation failed");
        std::process::exit(1);
    }

    if cli.validate {
        println!("[INFO] Configuration is valid");
        return;
    }

    if let Err(e) = cmd_run(cfg) {
        eprintln!("[ERROR] {}", e);
        std::process::exit(1);
    }
}

/// Load the config file (or defaults) and fold in command-line overrides
fn resolve_config(cli: &Cli) -> Result<Config, String> {
    let mut cfg = match &cli.config {
        Some(path) => config::load(path)
            .map_err(|e| format!("Failed to load {}: {}", path.display(), e))?,
        None => Config::default(),
    };

    if let Some(ref policy) = cli.policy {
        cfg.controller.policy = policy.parse::<PolicyKind>().map_err(|e| e.to_string())?;
    }
    if let Some(ref listen) = cli.listen {
        cfg.controller.listen = listen.clone();
    }
    if let Some(ref blacklist) = cli.blacklist {
        cfg.firewall.blacklist = split_addresses(blacklist);
    }
    if let Some(ref whitelist) = cli.whitelist {
        cfg.firewall.whitelist = split_addresses(whitelist);
    }

    Ok(cfg)
}

fn split_addresses(csv: &str) -> Vec<String> {
    csv.split(',')
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty())
        .collect()
}

fn cmd_run(cfg: Config) -> Result<(), String> {
    use tokio::net::TcpListener;
    use tokio::runtime::Runtime;

    let rt = Runtime::new().map_err(|e| format!("Failed to create runtime: {}", e))?;

    rt.block_on(async move {
        let metrics = Arc::new(MetricsRegistry::new());

        let listener = TcpListener::bind(&cfg.controller.listen)
            .await
            .map_err(|e| format!("Failed to bind {}: {}", cfg.controller.listen, e))?;

        info!(
            "listening on {}, policy: {:?}",
            cfg.controller.listen, cfg.controller.policy
        );

        let result = match cfg.controller.policy {
            PolicyKind::Hub => serve(listener, Hub::new(metrics.clone()), metrics).await,
            PolicyKind::Firewall => {
                let firewall = Firewall::from_config(&cfg.firewall, metrics.clone())
                    .map_err(|e| format!("Invalid firewall config: {}", e))?;
                serve(listener, firewall, metrics).await
            }
        };

        result.map_err(|e| format!("Controller failed: {}", e))
    })
}
