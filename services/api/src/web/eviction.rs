//! services/api/src/web/eviction.rs
//!
//! Background task that drops practice sessions nobody has touched for a while.

use crate::web::state::AppState;
use chrono::Utc;
use std::sync::Arc;
use std::time::Duration;
use tokio::time::MissedTickBehavior;
use tokio_util::sync::CancellationToken;
use tracing::{error, info};

/// Periodically evicts sessions idle for longer than `max_idle`.
///
/// Runs until `cancellation_token` is cancelled.
pub async fn eviction_process(
    app_state: Arc<AppState>,
    max_idle: Duration,
    interval: Duration,
    cancellation_token: CancellationToken,
) {
    let max_idle = match chrono::Duration::from_std(max_idle) {
        Ok(max_idle) => max_idle,
        Err(e) => {
            error!("Idle timeout out of range, eviction disabled: {}", e);
            return;
        }
    };
    info!("Session eviction started (idle limit {}s).", max_idle.num_seconds());

    let mut ticker = tokio::time::interval(interval);
    ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

    loop {
        tokio::select! {
            _ = cancellation_token.cancelled() => {
                info!("Session eviction stopped.");
                return;
            }
            _ = ticker.tick() => {
                app_state.sessions.evict_idle(Utc::now(), max_idle);
            }
        }
    }
}
