mod cli;
mod feed;
mod logging;

use std::process::ExitCode;

use navicord_config::schema::ActivityNameMode;
use navicord_gateway::{GatewayEvent, PresencePublisher};
use tokio::io::{AsyncBufReadExt, BufReader};
use tokio::sync::broadcast::error::RecvError;
use tracing::{debug, error, info, warn};

use crate::feed::FeedCommand;

/// Load environment variables from a .env file (KEY=VALUE lines).
/// Variables already set in the process win.
fn load_dotenv() {
    let candidates = [
        std::path::PathBuf::from(".env"),
        navicord_config::toml_loader::default_dotenv_path().unwrap_or_default(),
    ];

    for path in candidates.iter().filter(|p| !p.as_os_str().is_empty()) {
        if let Ok(contents) = std::fs::read_to_string(path) {
            for line in contents.lines() {
                let line = line.trim();
                if line.is_empty() || line.starts_with('#') {
                    continue;
                }
                if let Some((key, value)) = line.split_once('=') {
                    let key = key.trim();
                    let value = value.trim().trim_matches('"').trim_matches('\'');
                    if std::env::var(key).is_err() {
                        std::env::set_var(key, value);
                    }
                }
            }
            return;
        }
    }
}

fn main() -> ExitCode {
    // Before the runtime starts any worker threads.
    load_dotenv();
    start()
}

#[tokio::main]
async fn start() -> ExitCode {
    let args = cli::parse();

    let loaded = navicord_config::load_config(args.config.as_deref());
    let level = loaded
        .as_ref()
        .map(|c| c.logging.level.clone())
        .unwrap_or_default();
    logging::init_logging(args.log_level.as_deref(), &level);

    info!("navicord v{} starting...", env!("CARGO_PKG_VERSION"));

    let config = match loaded {
        Ok(config) => config,
        Err(e) => {
            error!(error = %e, "Failed to load configuration");
            return ExitCode::FAILURE;
        }
    };
    if let Some(ref path) = args.config {
        info!("Using config override: {}", path.display());
    }

    if args.check_config {
        println!("{}", navicord_config::config_to_json(&config));
        return ExitCode::SUCCESS;
    }

    if let Err(e) = navicord_config::require_credentials(&config) {
        error!(error = %e, "Cannot connect without credentials");
        return ExitCode::FAILURE;
    }

    let publisher = PresencePublisher::from_config(&config);
    publisher.gateway().start();

    if let Err(e) = run(&publisher, &config.presence.activity_name).await {
        error!(error = %e, "Input loop failed");
    }

    publisher.shutdown().await;
    info!("Shutdown complete");
    ExitCode::SUCCESS
}

/// Feed stdin commands to the publisher until EOF or a termination signal.
///
/// The last command is replayed whenever a new session becomes Ready, so
/// an update that arrived during a reconnect is not lost for good.
async fn run(
    publisher: &PresencePublisher,
    mode: &ActivityNameMode,
) -> navicord_common::Result<()> {
    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    let mut events = publisher.gateway().subscribe();
    let mut last: Option<FeedCommand> = None;

    let shutdown = shutdown_signal();
    tokio::pin!(shutdown);

    loop {
        tokio::select! {
            _ = &mut shutdown => {
                info!("Termination signal received");
                break;
            }
            line = lines.next_line() => match line? {
                Some(line) => {
                    match feed::parse_line(&line, mode, feed::now_epoch_secs()) {
                        Ok(Some(command)) => {
                            apply(publisher, &command).await;
                            last = Some(command);
                        }
                        Ok(None) => {}
                        Err(e) => warn!(error = %e, "Skipping malformed input line"),
                    }
                }
                None => {
                    info!("Input closed");
                    break;
                }
            },
            event = events.recv() => match event {
                Ok(GatewayEvent::Ready { session }) => {
                    if let Some(command) = &last {
                        debug!(session, "Replaying last presence on new session");
                        apply(publisher, command).await;
                    }
                }
                Ok(_) | Err(RecvError::Lagged(_)) => {}
                Err(RecvError::Closed) => break,
            },
        }
    }
    Ok(())
}

async fn apply(publisher: &PresencePublisher, command: &FeedCommand) {
    match command {
        FeedCommand::Publish(update) => {
            if let Err(e) = publisher.publish(update).await {
                warn!(title = %update.title, error = %e, "Presence update failed");
            }
        }
        FeedCommand::Clear => {
            if let Err(e) = publisher.clear().await {
                warn!(error = %e, "Presence clear failed");
            }
        }
    }
}

/// Resolves on Ctrl-C, or SIGTERM on Unix.
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            warn!(error = %e, "Failed to listen for Ctrl-C");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(e) => {
                warn!(error = %e, "Failed to listen for SIGTERM");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {}
        _ = terminate => {}
    }
}
