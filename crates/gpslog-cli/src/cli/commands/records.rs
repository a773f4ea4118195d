//! Records listing command.

use anyhow::{Result, bail};
use gpslog_core::config::Config;
use gpslog_core::services::{Services, notices};

pub async fn run(config: &Config, email: &str, password: &str) -> Result<()> {
    let services = Services::from_config(config)?;

    let session = match services.identity.sign_in(email, password).await {
        Ok(session) => session,
        Err(err) => {
            tracing::warn!(error = %err, "sign-in failed");
            bail!("{}", notices::BAD_CREDENTIALS);
        }
    };

    let records = services.store.snapshot(&session).await?;

    println!("{:<16} {:<16} {}", "Latitude", "Longitude", "Captured");
    for record in &records {
        println!(
            "{:<16} {:<16} {}",
            record.latitude,
            record.longitude,
            record.formatted_local_time()
        );
    }

    services.identity.sign_out(session);
    Ok(())
}
