//! Command line client that signs in and prints every account, service and pickup date.

#![expect(clippy::print_stdout, reason = "printing the schedule is the point of this tool")]

mod args;

use anyhow::{Context, Result};
use chrono::Local;
use curbside_core::ClientConfig;
use curbside_provider_wm::WmClient;
use tracing_subscriber::{EnvFilter, fmt};

use crate::args::parse_args;

#[tokio::main]
async fn main() -> Result<()> {
    init_logging();

    let credentials = parse_args(std::env::args())?;
    let config = ClientConfig::from_env().context("reading CURBSIDE_* configuration")?;

    let mut client = WmClient::new(config)?;
    tracing::info!(email = %credentials.email, "signing in");
    client
        .authenticate(&credentials.email, &credentials.password)
        .await?;
    client.authorize().await?;

    let today = Local::now().date_naive();

    for account in client.get_accounts().await? {
        println!("{}", account.name);

        for service in client.get_services(&account.id).await? {
            println!("  {}", service.name);

            let schedule = client
                .service_pickup_as_of(&account.id, &service.id, today)
                .await?;
            for date in &schedule.dates {
                let marker = if Some(*date) == schedule.next_after(today) {
                    " (next)"
                } else {
                    ""
                };
                println!("    {}{marker}", date.format("%a %Y-%m-%d"));
            }
        }
    }

    Ok(())
}

fn init_logging() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    fmt()
        .with_env_filter(filter)
        .with_target(true)
        .with_writer(std::io::stderr)
        .init();
}
