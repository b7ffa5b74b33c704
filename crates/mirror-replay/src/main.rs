//! # mirror-replay
//!
//! Mirror the buffers of a remote from a recorded message stream.
//!
//! Messages are read from stdin, one JSON document per line, and applied to
//! an in-memory or SQLite mirror. Requests the mirror sends back to the
//! remote (sync, input) are written to stdout, one JSON document per line.
//! Logs go to stderr.

mod config;
mod replay;

use std::sync::Arc;

use mirror_client::{OutboundMessage, Remote, RemoteSession};
use mirror_store::{Database, MemoryStore, MirrorStore, Report, ReportLevel};
use tokio::io::{AsyncWriteExt, BufReader};
use tokio::sync::mpsc;
use tracing::{error, info, warn};
use tracing_subscriber::EnvFilter;

use crate::config::{ReplayConfig, StoreBackend};
use crate::replay::{replay_until, ReplayStats, Stop};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // -----------------------------------------------------------------------
    // 1. Initialize tracing (respects RUST_LOG env var)
    // -----------------------------------------------------------------------
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("info,mirror_client=debug")),
        )
        .init();

    info!("Starting mirror replay v{}", env!("CARGO_PKG_VERSION"));

    // -----------------------------------------------------------------------
    // 2. Load configuration
    // -----------------------------------------------------------------------
    let config = ReplayConfig::from_env();
    info!(?config, "Loaded configuration");

    // -----------------------------------------------------------------------
    // 3. Outbound requests are written to stdout by a dedicated task
    // -----------------------------------------------------------------------
    let (tx, rx) = mpsc::unbounded_channel::<OutboundMessage>();
    let writer = tokio::spawn(write_requests(rx));

    let remote = Remote::new(config.remote_name.clone()).with_debug_raw(config.debug_raw);
    let session = RemoteSession::new(remote, Arc::new(tx));

    // -----------------------------------------------------------------------
    // 4. Replay stdin into the selected store
    // -----------------------------------------------------------------------
    let stop = match &config.store {
        StoreBackend::Memory => {
            let mut store = MemoryStore::new();
            let (stats, stop) = run(session, &mut store).await?;
            finish(&stats, store.reports(), store.buffer_count());
            stop
        }
        StoreBackend::Sqlite(path) => {
            let mut db = match path {
                Some(path) => Database::open_at(path)?,
                None => Database::new()?,
            };
            let (stats, stop) = run(session, &mut db).await?;
            let buffers = db.list_buffer_handles()?.len();
            finish(&stats, db.reports(), buffers);
            stop
        }
    };

    // -----------------------------------------------------------------------
    // 5. Flush pending requests
    // -----------------------------------------------------------------------
    // Every sender (session and input callbacks) is gone once the store and
    // the session are dropped, which ends the writer.
    writer.await??;

    info!("Replay finished");
    if stop == Stop::Interrupted {
        // The blocked stdin reader would hold up runtime shutdown.
        std::process::exit(0);
    }
    Ok(())
}

/// Replay stdin until it ends or Ctrl+C is received.
///
/// The session is consumed so its sender is dropped on return. A stdin read
/// in progress cannot be cancelled: after Ctrl+C the caller has to exit the
/// process instead of waiting for the runtime to shut down.
async fn run<S>(mut session: RemoteSession, store: &mut S) -> anyhow::Result<(ReplayStats, Stop)>
where
    S: MirrorStore + ?Sized,
{
    let stdin = BufReader::new(tokio::io::stdin());
    let shutdown = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            warn!(error = %e, "failed to listen for Ctrl+C");
            std::future::pending::<()>().await;
        }
        info!("Received Ctrl+C, stopping replay");
    };

    Ok(replay_until(&mut session, store, stdin, shutdown).await?)
}

fn finish(stats: &ReplayStats, reports: &[Report], buffers: usize) {
    for report in reports {
        match report.level {
            ReportLevel::Info => info!(date = %report.date, "{}", report.message),
            ReportLevel::Error => error!(date = %report.date, "{}", report.message),
        }
    }

    info!(
        messages = stats.messages,
        handled = stats.handled,
        ignored = stats.ignored,
        acks = stats.acks,
        failed = stats.failed,
        syncs = stats.syncs,
        buffers,
        "Replay summary"
    );
}

async fn write_requests(mut rx: mpsc::UnboundedReceiver<OutboundMessage>) -> std::io::Result<()> {
    let mut stdout = tokio::io::stdout();
    while let Some(message) = rx.recv().await {
        match message.request.to_json() {
            Ok(json) => {
                stdout.write_all(json.as_bytes()).await?;
                stdout.write_all(b"\n").await?;
                stdout.flush().await?;
            }
            Err(e) => {
                warn!(remote = %message.remote, error = %e, "failed to encode request");
            }
        }
    }
    Ok(())
}
