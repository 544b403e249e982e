//! Command-line entry point.
//!
//! Without arguments it loads the backend configuration, checks
//! connectivity and refreshes every screen once, logging what it finds.
//!
//! - `remember`: store the configured URL and anon key in the OS keyring
//! - `forget`: delete stored credentials
//! - `about`: print build information as JSON

use std::sync::Arc;

use anyhow::{bail, Context};
use tracing::{info, warn};

use fuel_station_dashboard::diagnostics;
use fuel_station_dashboard::navigation::Section;
use fuel_station_dashboard::reports::summarize;
use fuel_station_dashboard::{storage, Dashboard, DashboardConfig, Entity, Screen, TracingSink};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let command = std::env::args().nth(1);

    match command.as_deref() {
        Some("about") => {
            let about = serde_json::to_string_pretty(&diagnostics::about_info())?;
            println!("{about}");
            return Ok(());
        }
        Some("forget") => {
            storage::factory_reset().context("Failed to clear stored credentials")?;
            println!("Stored backend credentials removed");
            return Ok(());
        }
        Some("remember") | None => {}
        Some(other) => bail!("Unknown command '{other}' (expected remember, forget or about)"),
    }

    let config = DashboardConfig::from_env().context("Failed to load backend configuration")?;
    let _guard = fuel_station_dashboard::init_logging(config.log_dir.as_deref());

    if command.as_deref() == Some("remember") {
        storage::save_backend_credentials(&config.supabase_url, config.anon_key())
            .context("Failed to store backend credentials")?;
    }

    let dashboard = Dashboard::new(&config, Arc::new(TracingSink))
        .context("Failed to build backend client")?;

    let connectivity = dashboard.test_connectivity().await;
    if !connectivity.success {
        bail!(
            "Backend unreachable: {}",
            connectivity.error.unwrap_or_else(|| "unknown error".into())
        );
    }
    info!(latency_ms = ?connectivity.latency_ms, "backend reachable");

    let mut employees = dashboard.employees();
    let mut fuel_types = dashboard.fuel_types();
    let mut transactions = dashboard.transactions();

    load(Section::Employees, &mut employees).await;
    load(Section::FuelTypes, &mut fuel_types).await;
    load(Section::Transactions, &mut transactions).await;

    let summary = summarize(transactions.list.snapshot());
    info!(
        section = Section::Reports.label(),
        completed = summary.completed_count,
        total_amount = summary.total_amount,
        total_liters = summary.total_liters,
        "sales summary"
    );
    Ok(())
}

async fn load<T: Entity>(section: Section, screen: &mut Screen<T>) {
    match screen.list.refresh().await {
        Ok(count) => info!(section = section.label(), count, "loaded {}", T::PLURAL),
        Err(e) => warn!(section = section.label(), error = %e, "load failed"),
    }
}
