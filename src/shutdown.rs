//! Stops a running copy on SIGINT (Ctrl+C) or SIGTERM.
//!
//! The first signal cancels a [`CancellationToken`]; the copier notices it
//! between tracks or while waiting on the network, writes its session summary
//! and returns. A second signal exits immediately.

use std::sync::Arc;
use std::sync::atomic::{AtomicU32, Ordering};

use color_eyre::eyre::{Result, WrapErr};
use tokio_util::sync::CancellationToken;

/// Exit status used after an interrupted run.
pub const INTERRUPTED_EXIT_CODE: i32 = 130;

pub fn install_signal_handler() -> Result<CancellationToken> {
    let token = CancellationToken::new();
    let count = Arc::new(AtomicU32::new(0));

    #[cfg(unix)]
    let mut sigterm = tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate())
        .wrap_err("Failed to register SIGTERM handler")?;

    let handler_token = token.clone();
    tokio::spawn(async move {
        loop {
            #[cfg(unix)]
            {
                tokio::select! {
                    _ = tokio::signal::ctrl_c() => {}
                    _ = sigterm.recv() => {}
                }
            }

            #[cfg(not(unix))]
            {
                if let Err(e) = tokio::signal::ctrl_c().await {
                    tracing::error!("Failed to listen for Ctrl+C: {}", e);
                    return;
                }
            }

            let prev = count.fetch_add(1, Ordering::SeqCst);
            if prev == 0 {
                tracing::warn!("Received shutdown signal, stopping after the current track...");
                tracing::warn!("Press Ctrl+C again to force exit");
                handler_token.cancel();
            } else {
                tracing::warn!("Force exit requested");
                std::process::exit(INTERRUPTED_EXIT_CODE);
            }
        }
    });

    Ok(token)
}
