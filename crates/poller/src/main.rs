use chrono::Utc;

use homework_common::config::AppConfig;
use homework_notifier::telegram::TelegramNotifier;
use homework_poller::cycle::{PollLoop, PollState};
use homework_poller::poller::StatusPoller;

#[tokio::main(flavor = "current_thread")]
async fn main() -> anyhow::Result<()> {
    // Initialize tracing
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| {
                "homework_poller=info,homework_engine=info,homework_notifier=info".into()
            }),
        )
        .json()
        .init();

    tracing::info!("Homework bot starting...");

    // Load configuration; nothing touches the network before this succeeds
    let config = AppConfig::from_env()
        .inspect_err(|e| tracing::error!(error = %e, "Invalid configuration, aborting"))?;

    let poller = StatusPoller::from_config(&config)?;
    let notifier = TelegramNotifier::from_config(&config)?;

    tracing::info!(
        endpoint = %poller.endpoint(),
        chat_id = %config.telegram_chat_id,
        report_errors_to_chat = config.report_errors_to_chat,
        "Configuration loaded"
    );

    let poll_loop = PollLoop::new(poller, notifier, config.poll_interval())
        .with_error_reports(config.report_errors_to_chat);
    let state = PollState::new(Utc::now().timestamp());

    // Run until Ctrl+C
    let shutdown = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::error!(error = %e, "Failed to listen for shutdown signal");
            std::future::pending::<()>().await;
        }
        tracing::info!("Received shutdown signal, stopping...");
    };
    poll_loop.run_until(state, shutdown).await;

    tracing::info!("Homework bot stopped.");
    Ok(())
}
