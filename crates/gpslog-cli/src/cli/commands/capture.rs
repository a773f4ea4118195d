//! One-shot capture command.
//!
//! The headless counterpart of the interactive capture flow: sign in,
//! run the permission gate, read the last known position, append it to
//! the store. Failures exit non-zero with the same notice text the UI
//! shows; the structured error goes to the log.

use std::io::{self, BufRead, Write};

use anyhow::{Result, bail};
use gpslog_core::config::Config;
use gpslog_core::services::{CoordinateRecord, Services, notices};

pub async fn run(
    config: &Config,
    email: &str,
    password: &str,
    allow_location: bool,
) -> Result<()> {
    let services = Services::from_config(config)?;

    let session = match services.identity.sign_in(email, password).await {
        Ok(session) => session,
        Err(err) => {
            tracing::warn!(error = %err, "sign-in failed");
            bail!("{}", notices::BAD_CREDENTIALS);
        }
    };

    // Permission gate. `--allow-location` stands in for a prior grant;
    // otherwise ask on stdin. Denial never reaches the locator.
    if !allow_location && !prompt_for_permission()? {
        bail!("{}", notices::PERMISSION_DENIED);
    }

    let position = match services.locator.last_known().await {
        Ok(Some(position)) => position,
        Ok(None) => bail!("{}", notices::NO_LOCATION),
        Err(err) => {
            tracing::warn!(error = %err, "location fetch failed");
            bail!("{}", notices::NO_LOCATION);
        }
    };

    let record = CoordinateRecord::captured_now(position);
    match services.store.append(&session, &record).await {
        Ok(key) => tracing::debug!(%key, "capture stored"),
        Err(err) => {
            tracing::warn!(error = %err, "store append failed");
            bail!("{}", notices::SAVE_FAILED);
        }
    }

    println!(
        "Saved {} {} at {}",
        record.latitude,
        record.longitude,
        record.formatted_local_time()
    );

    services.identity.sign_out(session);
    Ok(())
}

/// Asks for the location permission on stdin. Anything but y/yes denies.
fn prompt_for_permission() -> Result<bool> {
    print!("Allow gpslog to read the device's current location? [y/N] ");
    io::stdout().flush()?;

    let mut answer = String::new();
    io::stdin().lock().read_line(&mut answer)?;
    Ok(matches!(
        answer.trim().to_ascii_lowercase().as_str(),
        "y" | "yes"
    ))
}
