use solana_sdk::signature::Signature;
use std::time::Duration;
use tokio::time::{sleep, Instant};
use tracing::{debug, info, warn};

use crate::gateway::TransactionGateway;
use crate::types::SignatureStatus;

/// Polling schedule for confirmation, with capped exponential backoff
#[derive(Debug, Clone)]
pub struct PollConfig {
    /// Delay before the second status query
    pub interval: Duration,
    /// Upper bound for any single delay
    pub max_interval: Duration,
    pub backoff_multiplier: f64,
    /// Overall budget for the wait, independent of the blockhash window
    pub timeout: Duration,
}

impl Default for PollConfig {
    fn default() -> Self {
        Self {
            interval: Duration::from_millis(500),
            max_interval: Duration::from_secs(4),
            backoff_multiplier: 1.5,
            timeout: Duration::from_secs(90),
        }
    }
}

impl PollConfig {
    pub fn new(interval: Duration, timeout: Duration) -> Self {
        Self {
            interval,
            timeout,
            ..Self::default()
        }
    }

    /// Delay after the given poll attempt (0-indexed)
    pub fn delay_for(&self, attempt: u32) -> Duration {
        let delay_ms =
            (self.interval.as_millis() as f64) * self.backoff_multiplier.powi(attempt as i32);
        Duration::from_millis(delay_ms as u64).min(self.max_interval)
    }
}

/// How a confirmation wait ended
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConfirmationOutcome {
    Confirmed,
    Reverted(String),
    /// Block height moved past the blockhash's valid window
    Expired,
    TimedOut,
}

/// Poll until `signature` is confirmed, fails on chain, or can no longer land.
///
/// Transport errors while polling are logged and treated as "still pending".
pub async fn await_confirmation(
    gateway: &dyn TransactionGateway,
    signature: &Signature,
    last_valid_block_height: u64,
    config: &PollConfig,
) -> ConfirmationOutcome {
    let deadline = Instant::now() + config.timeout;
    let mut attempt = 0u32;

    loop {
        if let Some(outcome) = check_status(gateway, signature).await {
            return outcome;
        }

        match gateway.block_height().await {
            Ok(height) if height > last_valid_block_height => {
                // It may have landed between the two queries.
                if let Some(outcome) = check_status(gateway, signature).await {
                    return outcome;
                }
                info!(
                    "Blockhash expired for {} (height {} > {})",
                    signature, height, last_valid_block_height
                );
                return ConfirmationOutcome::Expired;
            }
            Ok(_) => {}
            Err(e) => warn!("Failed to read block height while confirming {}: {}", signature, e),
        }

        let now = Instant::now();
        if now >= deadline {
            info!("Confirmation timed out for {}", signature);
            return ConfirmationOutcome::TimedOut;
        }

        let delay = config.delay_for(attempt).min(deadline - now);
        debug!(
            "Signature {} pending, polling again in {:?} (attempt {})",
            signature,
            delay,
            attempt + 1
        );
        sleep(delay).await;
        attempt += 1;
    }
}

async fn check_status(
    gateway: &dyn TransactionGateway,
    signature: &Signature,
) -> Option<ConfirmationOutcome> {
    match gateway.signature_status(signature).await {
        Ok(SignatureStatus::Confirmed) => Some(ConfirmationOutcome::Confirmed),
        Ok(SignatureStatus::Reverted(reason)) => Some(ConfirmationOutcome::Reverted(reason)),
        Ok(SignatureStatus::Pending) => None,
        Err(e) => {
            warn!("Failed to query status for {}: {}", signature, e);
            None
        }
    }
}
