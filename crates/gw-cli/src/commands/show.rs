//! Show command implementation

use anyhow::Result;

use gw_core::config::EngineConfig;
use gw_core::traits::RemoteApi;
use gw_engine::HttpApi;
use gw_protocol::InvitationId;

use crate::output::{format_guest, print_error};

/// Fetch and print one canonical record
pub async fn show_command(config: &EngineConfig, id: &str) -> Result<()> {
    let api = HttpApi::new(&config.api_url);

    match api.fetch_guest(&InvitationId::new(id)).await {
        Ok(guest) => {
            print!("{}", format_guest(&guest));
            Ok(())
        }
        Err(e) => {
            print_error(&format!("Failed to fetch guest {}: {}", id, e));
            Err(e.into())
        }
    }
}
