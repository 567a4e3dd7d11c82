use std::time::Duration;

use tokio::time::timeout;
use tracing::info;

use crate::Error;

/// Where notifications go. The chat transport lives outside this crate; the
/// scheduler only needs someone to hand the message to.
#[allow(async_fn_in_trait)]
pub trait Notifier {
    async fn notify(&self, user_id: i64, message: &str) -> Result<(), Error>;
}

/// Transport that writes deliveries to the log. Stands in wherever a real
/// front end is not wired up.
#[derive(Debug, Clone, Copy)]
pub struct LogNotifier;

impl Notifier for LogNotifier {
    async fn notify(&self, user_id: i64, message: &str) -> Result<(), Error> {
        info!(user_id, "notification: {message}");
        Ok(())
    }
}

/// A stuck transport must not stall the rest of a poll batch.
///
/// Deliberately a constant rather than a `Config` knob: a timed-out delivery
/// is treated exactly like a rejected one (logged, occurrence stays spent), so
/// the bound only guards batch liveness. It just has to sit well below the
/// shortest job interval, and 10 s is far under the 60 s default poll.
pub const DISPATCH_TIMEOUT: Duration = Duration::from_secs(10);

pub async fn notify_with_timeout<N: Notifier>(
    notifier: &N, user_id: i64, message: &str,
) -> Result<(), Error> {
    dispatch(notifier, user_id, message, DISPATCH_TIMEOUT).await
}

async fn dispatch<N: Notifier>(
    notifier: &N, user_id: i64, message: &str, limit: Duration,
) -> Result<(), Error> {
    match timeout(limit, notifier.notify(user_id, message)).await {
        Ok(result) => result,
        Err(_) => Err(format!("notification to user {user_id} timed out").into()),
    }
}
