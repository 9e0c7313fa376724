//! List command implementation

use anyhow::Result;

use gw_core::config::EngineConfig;
use gw_core::traits::RemoteApi;
use gw_engine::HttpApi;
use gw_protocol::GuestStats;

use crate::output::{format_guests, format_stats, print_error};

/// Fetch the collection once and print it with the aggregate counters
pub async fn list_command(config: &EngineConfig, long: bool) -> Result<()> {
    let api = HttpApi::new(&config.api_url);

    let guests = match api.fetch_guests().await {
        Ok(guests) => guests,
        Err(e) => {
            print_error(&format!("Failed to fetch guests: {}", e));
            return Err(e.into());
        }
    };

    let stats = GuestStats::from_records(&guests);
    println!("{}", format_guests(&guests, long));
    println!("{}", format_stats(&stats));

    Ok(())
}
