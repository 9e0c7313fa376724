//! Watch command implementation
//!
//! Runs the full engine and streams applied changes plus the sampled
//! connectivity signal until interrupted.

use anyhow::Result;
use tokio::sync::broadcast;

use gw_core::config::EngineConfig;
use gw_engine::{ChangeNotice, SyncEngine};
use gw_protocol::InvitationId;

use crate::output::{print_info, print_success, print_warning};

/// Execute the watch command
pub async fn watch_command(config: &EngineConfig) -> Result<()> {
    let mut engine = SyncEngine::new(config.clone());
    let mut changes = engine.subscribe_changes();
    engine.activate().await?;
    let mut health = engine.health()?;

    print_info(&format!(
        "Watching {} guests — Ctrl+C to stop",
        engine.snapshot().await.len()
    ));

    loop {
        tokio::select! {
            _ = tokio::signal::ctrl_c() => break,

            changed = health.changed() => {
                if changed.is_err() {
                    break;
                }
                if *health.borrow_and_update() {
                    print_success("Channel up — live updates on");
                } else {
                    print_warning("Channel down — showing last known state");
                }
            }

            notice = changes.recv() => match notice {
                Ok(ChangeNotice::Snapshot { count }) => {
                    print_info(&format!("Snapshot: {} guests", count));
                }
                Ok(ChangeNotice::Added(id)) => describe(&engine, &id, "added").await,
                Ok(ChangeNotice::Updated(id)) => describe(&engine, &id, "updated").await,
                Ok(ChangeNotice::Removed(id)) => {
                    print_info(&format!("Guest {} removed", id));
                }
                Err(broadcast::error::RecvError::Lagged(skipped)) => {
                    print_warning(&format!("Display fell behind; skipped {} updates", skipped));
                }
                Err(broadcast::error::RecvError::Closed) => break,
            },
        }
    }

    engine.shutdown().await;
    Ok(())
}

async fn describe(engine: &SyncEngine, id: &InvitationId, verb: &str) {
    if let Some(guest) = engine.get(id).await {
        let seat = match (guest.table_number, guest.table_position) {
            (Some(table), Some(position)) => format!(" [table {} seat {}]", table, position),
            (Some(table), None) => format!(" [table {}]", table),
            _ => String::new(),
        };
        print_info(&format!(
            "Guest {} {} — {} ({}){}",
            id,
            verb,
            guest.name,
            guest.rsvp_status(),
            seat
        ));
    }
}
