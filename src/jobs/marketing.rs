use chrono::Utc;
use tracing::{error, info, warn};

use crate::db::Db;
use crate::notify::{notify_with_timeout, Notifier};

pub const WELCOME_PROMO: &str = "👋 How is the bot working out for you?\n\
    Unlock voice input, unlimited categories and the morning digest with Premium. 🚀";
pub const PERIODIC_PROMO: &str = "🌟 Take the next step towards perfect order!\n\
    Premium gives you voice input, unlimited categories, themes and the morning digest. 💎";
pub const FORCED_PROMO: &str = "🌟 A special offer for you!\n\
    Try Premium and feel the difference. 💎";

/// How long a fresh signup is left alone before the first promo.
const NEW_USER_DELAY_SECS: i64 = 24 * 3600;
/// Minimum gap between two promos to the same user.
const PROMO_COOLDOWN_SECS: i64 = 3 * 24 * 3600;

/// Promotional mailing to non-premium users. `force` skips the time checks
/// (manual trigger from an admin). Successful sends stamp `last_promo_sent`,
/// and the first admin gets a run summary.
pub async fn send_marketing_mail<N: Notifier>(
    db: &Db, notifier: &N, admin_ids: &[i64], force: bool,
) {
    let users = match db.all_users().await {
        Ok(users) => users,
        Err(e) => {
            error!("marketing mail abandoned, user fetch failed: {e}");
            return;
        }
    };
    let now = Utc::now().timestamp();
    let mut sent_count = 0u32;
    info!(total = users.len(), force, "starting marketing mail");

    for user in users {
        if user.is_premium || admin_ids.contains(&user.id) {
            continue;
        }
        let message = match (force, user.last_promo_sent) {
            (true, _) => Some(FORCED_PROMO),
            (false, None) => {
                (now - user.created_at > NEW_USER_DELAY_SECS).then_some(WELCOME_PROMO)
            }
            (false, Some(last_promo)) => {
                (now - last_promo > PROMO_COOLDOWN_SECS).then_some(PERIODIC_PROMO)
            }
        };
        let Some(message) = message else {
            continue;
        };
        match notify_with_timeout(notifier, user.id, message).await {
            Ok(()) => {
                if let Err(e) = db.touch_last_promo(user.id, now).await {
                    error!(user_id = user.id, "failed to stamp promo marker: {e}");
                }
                sent_count += 1;
            }
            Err(e) => error!(user_id = user.id, "failed to send promo: {e}"),
        }
    }

    if let Some(admin_id) = admin_ids.first() {
        if force || sent_count > 0 {
            let summary = format!("Marketing mail finished. Users reached: {sent_count}");
            if let Err(e) = notify_with_timeout(notifier, *admin_id, &summary).await {
                warn!("failed to send marketing summary to admin: {e}");
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use chrono::Utc;

    use super::*;
    use crate::db::{open_memory, Db};
    use crate::notify::test_support::RecordingNotifier;

    async fn backdate_signup(db: &Db, user_id: i64, secs_ago: i64) {
        let created_at = Utc::now().timestamp() - secs_ago;
        sqlx::query("UPDATE users SET created_at = ? WHERE id = ?")
            .bind(created_at)
            .bind(user_id)
            .execute(&db.pool)
            .await
            .unwrap();
    }

    #[tokio::test]
    async fn fresh_signups_are_left_alone_then_welcomed() {
        let db = open_memory().await;
        db.upsert_user(1, None).await.unwrap();
        let notifier = RecordingNotifier::default();

        send_marketing_mail(&db, &notifier, &[], false).await;
        assert_eq!(notifier.count(), 0);

        backdate_signup(&db, 1, 2 * 24 * 3600).await;
        send_marketing_mail(&db, &notifier, &[], false).await;
        assert_eq!(notifier.messages_for(1), vec![WELCOME_PROMO.to_string()]);

        // promo marker was stamped, so an immediate re-run sends nothing
        send_marketing_mail(&db, &notifier, &[], false).await;
        assert_eq!(notifier.messages_for(1).len(), 1);
    }

    #[tokio::test]
    async fn periodic_promo_respects_the_cooldown() {
        let db = open_memory().await;
        db.upsert_user(1, None).await.unwrap();
        backdate_signup(&db, 1, 30 * 24 * 3600).await;
        let last_promo = Utc::now().timestamp() - 4 * 24 * 3600;
        db.touch_last_promo(1, last_promo).await.unwrap();
        let notifier = RecordingNotifier::default();

        send_marketing_mail(&db, &notifier, &[], false).await;

        assert_eq!(notifier.messages_for(1), vec![PERIODIC_PROMO.to_string()]);
    }

    #[tokio::test]
    async fn premium_and_admin_users_are_skipped() {
        let db = open_memory().await;
        db.upsert_user(1, None).await.unwrap();
        db.set_premium(1, Utc::now().timestamp() + 3600).await.unwrap();
        db.upsert_user(99, Some("admin")).await.unwrap();
        backdate_signup(&db, 99, 10 * 24 * 3600).await;
        let notifier = RecordingNotifier::default();

        send_marketing_mail(&db, &notifier, &[99], false).await;

        assert!(notifier.messages_for(1).is_empty());
        // admin only receives the summary when something was sent; here nothing was
        assert_eq!(notifier.count(), 0);
    }

    #[tokio::test]
    async fn forced_run_reaches_everyone_and_reports_to_admin() {
        let db = open_memory().await;
        db.upsert_user(1, None).await.unwrap();
        db.upsert_user(99, Some("admin")).await.unwrap();
        let notifier = RecordingNotifier::default();

        send_marketing_mail(&db, &notifier, &[99], true).await;

        assert_eq!(notifier.messages_for(1), vec![FORCED_PROMO.to_string()]);
        let admin_messages = notifier.messages_for(99);
        assert_eq!(admin_messages.len(), 1);
        assert!(admin_messages[0].contains("Users reached: 1"));
    }
}
