//! Assign command implementation

use anyhow::Result;

use gw_core::config::EngineConfig;
use gw_engine::SyncEngine;
use gw_protocol::GuestPatch;

use crate::output::{print_error, print_success};

/// Seat a guest: submit a table (and optionally seat) assignment through
/// the engine's validated, debounced mutation path.
pub async fn assign_command(
    config: &EngineConfig,
    id: &str,
    table: u32,
    seat: Option<u32>,
) -> Result<()> {
    let mut engine = SyncEngine::new(config.clone());
    engine.activate().await?;

    let mut patch = GuestPatch::new(id).with_table(table);
    if let Some(seat) = seat {
        patch = patch.with_position(seat);
    }

    let outcome = engine.submit(patch).await;
    engine.shutdown().await;

    match outcome {
        Ok(confirmed) => {
            let seat_note = confirmed
                .table_position
                .map(|p| format!(", seat {}", p))
                .unwrap_or_default();
            print_success(&format!(
                "{} assigned to table {}{}",
                confirmed.name,
                confirmed.table_number.unwrap_or(table),
                seat_note
            ));
            Ok(())
        }
        Err(e) => {
            print_error(&format!("Assignment failed: {}", e));
            Err(e.into())
        }
    }
}
