use chrono::Utc;
use tracing::{error, warn};

use crate::db::Db;
use crate::notify::{notify_with_timeout, Notifier};

const SECS_PER_DAY: i64 = 86_400;

pub const TRIAL_EXPIRED_MSG: &str =
    "🚫 Your trial period has ended. Features are limited until you subscribe.";
pub const PREMIUM_EXPIRED_MSG: &str =
    "🚫 Your Premium subscription has expired. Renew to keep the full feature set.";
pub const TRIAL_LAST_DAY_MSG: &str = "⏳ Your trial ends in 24 hours!";
pub const PREMIUM_LAST_DAY_MSG: &str = "⏳ 1 day of Premium left! Don't forget to renew.";
pub const THREE_DAYS_LEFT_MSG: &str = "📅 3 days of Premium left. A good moment to renew.";

/// Walks every premium account and compares its expiry to the current time.
/// Demotion is the only persisted side effect; the threshold messages are not
/// deduplicated, so the job is meant to run at most once per day.
pub async fn check_subscriptions<N: Notifier>(db: &Db, notifier: &N) {
    let users = match db.all_users().await {
        Ok(users) => users,
        Err(e) => {
            error!("subscription check abandoned, user fetch failed: {e}");
            return;
        }
    };
    let now = Utc::now().timestamp();

    for user in users {
        if !user.is_premium {
            continue;
        }
        let Some(premium_until) = user.premium_until else {
            continue;
        };

        let delta = premium_until - now;
        let message = if delta < 0 {
            if let Err(e) = db.revoke_premium(user.id).await {
                error!(user_id = user.id, "failed to demote expired account: {e}");
                continue;
            }
            if user.trial_used {
                TRIAL_EXPIRED_MSG
            } else {
                PREMIUM_EXPIRED_MSG
            }
        } else {
            match delta / SECS_PER_DAY {
                0 => {
                    if user.trial_used {
                        TRIAL_LAST_DAY_MSG
                    } else {
                        PREMIUM_LAST_DAY_MSG
                    }
                }
                // trials are short enough that the 3-day warning is noise
                2 if !user.trial_used => THREE_DAYS_LEFT_MSG,
                _ => continue,
            }
        };

        if let Err(e) = notify_with_timeout(notifier, user.id, message).await {
            warn!(user_id = user.id, "failed to send subscription notice: {e}");
        }
    }
}
