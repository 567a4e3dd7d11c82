use std::fmt::Write;

use tracing::{error, warn};

use crate::db::Db;
use crate::notify::{notify_with_timeout, Notifier};

pub const DIGEST_HEADER: &str = "☀️ Good morning! Your plan for today:";

/// Morning summary of active tasks, premium users only.
pub async fn send_morning_digest<N: Notifier>(db: &Db, notifier: &N) {
    let users = match db.all_users().await {
        Ok(users) => users,
        Err(e) => {
            error!("morning digest abandoned, user fetch failed: {e}");
            return;
        }
    };

    for user in users {
        if !user.is_premium {
            continue;
        }
        let tasks = match db.active_tasks(user.id).await {
            Ok(tasks) => tasks,
            Err(e) => {
                error!(user_id = user.id, "failed to load tasks for digest: {e}");
                continue;
            }
        };
        if tasks.is_empty() {
            continue;
        }

        let mut body = format!("{DIGEST_HEADER}\n\n");
        for task in &tasks {
            writeln!(body, "• {}", task.text).unwrap();
        }
        if let Err(e) = notify_with_timeout(notifier, user.id, &body).await {
            warn!(user_id = user.id, "failed to send digest: {e}");
        }
    }
}

#[cfg(test)]
mod tests {
    use chrono::Utc;

    use super::*;
    use crate::db::open_memory;
    use crate::notify::test_support::RecordingNotifier;

    #[tokio::test]
    async fn digest_lists_active_tasks_for_premium_users_only() {
        let db = open_memory().await;
        db.upsert_user(1, None).await.unwrap();
        db.set_premium(1, Utc::now().timestamp() + 3600).await.unwrap();
        db.add_task(1, "ship the release", "work").await.unwrap();
        let done = db.add_task(1, "already handled", "work").await.unwrap();
        db.mark_task_done(done).await.unwrap();
        db.upsert_user(2, None).await.unwrap();
        db.add_task(2, "free user task", "misc").await.unwrap();
        let notifier = RecordingNotifier::default();

        send_morning_digest(&db, &notifier).await;

        let messages = notifier.messages_for(1);
        assert_eq!(messages.len(), 1);
        assert!(messages[0].starts_with(DIGEST_HEADER));
        assert!(messages[0].contains("• ship the release"));
        assert!(!messages[0].contains("already handled"));
        assert!(notifier.messages_for(2).is_empty());
    }

    #[tokio::test]
    async fn no_active_tasks_means_no_digest() {
        let db = open_memory().await;
        db.upsert_user(1, None).await.unwrap();
        db.set_premium(1, Utc::now().timestamp() + 3600).await.unwrap();
        let notifier = RecordingNotifier::default();

        send_morning_digest(&db, &notifier).await;

        assert_eq!(notifier.count(), 0);
    }
}
