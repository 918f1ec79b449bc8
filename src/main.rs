use std::process::ExitCode;

use tracing::{error, info, warn};
use tracing_subscriber::{EnvFilter, prelude::*};

use user_registry::config::LogFormat;
use user_registry::{Config, Server, app};

#[tokio::main]
async fn main() -> ExitCode {
    let config = match Config::from_env() {
        Ok(config) => config,
        Err(e) => {
            eprintln!("invalid configuration: {e}");
            return ExitCode::FAILURE;
        }
    };
    init_tracing(config.log_format);

    if config.uses_default_secret() {
        warn!("JWT_SECRET is not set; signing tokens with the built-in development secret");
    }
    info!(
        addr = %config.addr,
        https_port = ?config.https_port,
        issuer = %config.token.issuer,
        "starting user-registry"
    );

    match Server::bind(config.addr).serve(app::build(&config)).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            error!(error = %e, "server failed");
            ExitCode::FAILURE
        }
    }
}

/// `RUST_LOG` wins; otherwise `info`.
fn init_tracing(format: LogFormat) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));

    let result = match format {
        LogFormat::Json => tracing_subscriber::registry()
            .with(tracing_subscriber::fmt::layer().json().with_target(false).flatten_event(true))
            .with(filter)
            .try_init(),
        LogFormat::Pretty => tracing_subscriber::registry()
            .with(tracing_subscriber::fmt::layer().with_target(false))
            .with(filter)
            .try_init(),
    };

    if let Err(e) = result {
        eprintln!("failed to initialize tracing: {e}");
    }
}
