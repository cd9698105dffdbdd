mod cli;
mod codec;
mod dispatchers;
mod irc;
mod runtime;

use std::process::ExitCode;
use std::time::Duration;

use notbot_common::CancellationToken;
use notbot_watchers::{FetchLimits, HttpFetcher};
use tracing_subscriber::EnvFilter;

/// Exit status for configuration problems; nothing has been started yet.
const EXIT_CONFIG: u8 = 2;

fn init_logging(directive: &str) {
    let mut filter = EnvFilter::from_default_env();
    for part in directive.split(',').map(str::trim).filter(|p| !p.is_empty()) {
        match part.parse() {
            Ok(d) => filter = filter.add_directive(d),
            Err(e) => eprintln!("ignoring log directive '{part}': {e}"),
        }
    }
    tracing_subscriber::fmt().with_env_filter(filter).init();
}

#[tokio::main]
async fn main() -> ExitCode {
    let args = cli::parse();

    let loaded = notbot_config::load_config(args.config.as_deref());
    let directive = args
        .log_level
        .clone()
        .or_else(|| loaded.as_ref().ok().map(|(c, _)| c.logging.level.clone()))
        .unwrap_or_else(|| "notbot=info".into());
    init_logging(&directive);

    tracing::info!("notbot v{} starting...", env!("CARGO_PKG_VERSION"));

    let mut config = match loaded {
        Ok((config, source)) => {
            tracing::info!(source = %source, "config loaded");
            config
        }
        Err(e) => {
            tracing::error!(error = %e, "failed to load config");
            return ExitCode::from(EXIT_CONFIG);
        }
    };
    args.apply(&mut config);

    let topology = match notbot_config::resolve(&config) {
        Ok(topology) => topology,
        Err(e) => {
            tracing::error!(error = %e, "refusing to start");
            return ExitCode::from(EXIT_CONFIG);
        }
    };
    tracing::debug!(config = %notbot_config::config_to_json(&config), "effective config");
    tracing::info!(
        watchers = topology.watcher_count(),
        jitsi = topology.jitsi.len(),
        spaceapi = topology.spaceapi.len(),
        checkin = config.checkin.enabled,
        "topology resolved"
    );

    let fetcher = match HttpFetcher::new(FetchLimits {
        timeout: Duration::from_secs(config.http.timeout_secs),
        max_body_bytes: config.http.max_body_bytes,
    }) {
        Ok(fetcher) => fetcher,
        Err(e) => {
            tracing::error!(error = %e, "failed to build HTTP client");
            return ExitCode::FAILURE;
        }
    };

    let registry = runtime::build_registry(&config, &topology, fetcher);

    let shutdown = CancellationToken::new();
    let signal = shutdown.clone();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            tracing::info!("interrupt received, shutting down");
            signal.cancel();
        }
    });

    match runtime::run(&config.irc, registry, shutdown).await {
        Ok(()) => {
            tracing::info!("Shutdown complete");
            ExitCode::SUCCESS
        }
        Err(_) => ExitCode::FAILURE,
    }
}
