use std::sync::Arc;

use tokio::io::{self, AsyncBufReadExt, AsyncWriteExt, BufReader};
use tokio::sync::{broadcast, mpsc};

mod config;
mod error;
mod host;
mod model;
mod protocol;
mod render;
mod services;

use config::Settings;
use host::WebPartHost;

fn init_tracing() {
    // stdout carries the protocol, so logs go to stderr.
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("warn")),
        )
        .with_writer(std::io::stderr)
        .init();
}

#[tokio::main]
async fn main() {
    let settings = Settings::from_env();
    init_tracing();

    let host = Arc::new(WebPartHost::new(settings));
    let (tx, mut rx) = mpsc::unbounded_channel::<String>();

    let writer = tokio::spawn(async move {
        let mut stdout = io::stdout();
        while let Some(line) = rx.recv().await {
            if stdout.write_all(line.as_bytes()).await.is_err()
                || stdout.write_all(b"\n").await.is_err()
            {
                break;
            }
            let _ = stdout.flush().await;
        }
    });

    let mut events = host.subscribe();
    let event_tx = tx.clone();
    tokio::spawn(async move {
        loop {
            match events.recv().await {
                Ok(event) => match serde_json::to_string(&event) {
                    Ok(line) => {
                        if event_tx.send(line).is_err() {
                            break;
                        }
                    }
                    Err(e) => tracing::warn!(error = %e, "failed to serialize event"),
                },
                Err(broadcast::error::RecvError::Lagged(skipped)) => {
                    tracing::warn!(skipped, "category events dropped");
                }
                Err(broadcast::error::RecvError::Closed) => break,
            }
        }
    });

    let mut lines = BufReader::new(io::stdin()).lines();
    loop {
        let line = match lines.next_line().await {
            Ok(Some(l)) => l,
            Ok(None) => break,
            Err(e) => {
                tracing::warn!(error = %e, "failed to read request line");
                continue;
            }
        };

        if line.trim().is_empty() {
            continue;
        }

        let host = host.clone();
        let tx = tx.clone();
        tokio::spawn(async move {
            let id = protocol::request_id(&line);
            let response = protocol::respond(id, protocol::handle(&host, &line)).await;

            let _ = tx.send(response);
        });
    }

    // The event forwarder exits once the last handle to the host is gone.
    drop(host);
    drop(tx);
    let _ = writer.await;
}
