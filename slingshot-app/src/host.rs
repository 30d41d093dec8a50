//! Terminal host: viewport size, connectivity probe and window title

use std::collections::BTreeMap;
use std::io::{self, Write};
use std::time::Duration;

use crossterm::{execute, terminal::SetTitle};
use slingshot::{MetaKey, MetadataDocument};
use tokio::net::TcpStream;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;

/// Viewport width in logical pixels for a terminal `columns` wide
pub fn viewport_width_px(columns: u16, cell_width_px: u32) -> u32 {
    u32::from(columns).saturating_mul(cell_width_px)
}

/// Whether a TCP connection to `addr` succeeds within `timeout`
pub async fn probe_once(addr: &str, timeout: Duration) -> bool {
    match tokio::time::timeout(timeout, TcpStream::connect(addr)).await {
        Ok(Ok(_)) => true,
        Ok(Err(e)) => {
            tracing::debug!(addr, error = %e, "connectivity probe failed");
            false
        }
        Err(_) => {
            tracing::debug!(addr, ?timeout, "connectivity probe timed out");
            false
        }
    }
}

/// Spawn a task that probes `addr` every `interval` and reports the result
///
/// Every result is sent, repeats included; the connectivity watcher drops
/// repeats.
pub fn spawn_connectivity_probe(
    addr: String,
    interval: Duration,
    timeout: Duration,
    tx: mpsc::UnboundedSender<bool>,
    cancel_token: CancellationToken,
) -> JoinHandle<()> {
    tokio::spawn(async move {
        let mut ticker = tokio::time::interval(interval);
        ticker.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Delay);
        loop {
            tokio::select! {
                _ = cancel_token.cancelled() => break,
                _ = ticker.tick() => {
                    let online = probe_once(&addr, timeout).await;
                    if tx.send(online).is_err() {
                        tracing::debug!("connectivity receiver closed, stopping probe");
                        break;
                    }
                }
            }
        }
    })
}

/// Metadata sink for a terminal: the title goes to the window title, meta
/// tags are kept in memory
#[derive(Debug, Default)]
pub struct TerminalDocument {
    title: String,
    meta: BTreeMap<MetaKey, String>,
}

impl TerminalDocument {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn title(&self) -> &str {
        &self.title
    }

    pub fn meta(&self, key: MetaKey) -> Option<&str> {
        self.meta.get(&key).map(String::as_str)
    }
}

impl MetadataDocument for TerminalDocument {
    fn set_title(&mut self, title: &str) {
        self.title = title.to_string();
        let mut stdout = io::stdout();
        if let Err(e) = execute!(stdout, SetTitle(title)).and_then(|_| stdout.flush()) {
            tracing::warn!(error = %e, "failed to set terminal title");
        }
    }

    fn set_meta(&mut self, key: MetaKey, content: &str) {
        self.meta.insert(key, content.to_string());
    }
}
