use crate::db::Db;
use crate::models::{DueReminder, Reminder};
use crate::Error;

impl Db {
    /// Schedules a reminder for a task. Always inserts a fresh unsent row;
    /// nothing stops a caller from double-scheduling a task, which degrades to
    /// duplicate notifications rather than corruption.
    pub async fn add_reminder(
        &self, task_id: i64, user_id: i64, remind_at: i64, kind: &str,
        recurrence_rule: Option<&str>,
    ) -> Result<i64, Error> {
        let id = sqlx::query(
            "INSERT INTO reminders (task_id, user_id, remind_at, kind, recurrence_rule) \
             VALUES (?, ?, ?, ?, ?)",
        )
        .bind(task_id)
        .bind(user_id)
        .bind(remind_at)
        .bind(kind)
        .bind(recurrence_rule)
        .execute(&self.pool)
        .await?
        .last_insert_rowid();
        Ok(id)
    }

    /// Every unsent reminder that is due at `now`, joined with its task text
    /// so delivery doesn't go back to the store per row.
    pub async fn fetch_due_unsent(&self, now: i64) -> Result<Vec<DueReminder>, Error> {
        let due = sqlx::query_as::<_, DueReminder>(
            "SELECT r.id, r.task_id, r.user_id, r.remind_at, r.kind, r.recurrence_rule, t.text \
             FROM reminders r JOIN tasks t ON r.task_id = t.id \
             WHERE r.is_sent = 0 AND r.remind_at <= ? \
             ORDER BY r.remind_at ASC",
        )
        .bind(now)
        .fetch_all(&self.pool)
        .await?;
        Ok(due)
    }

    /// Idempotent: marking an already-sent reminder is a no-op.
    pub async fn mark_reminder_sent(&self, reminder_id: i64) -> Result<(), Error> {
        sqlx::query("UPDATE reminders SET is_sent = 1 WHERE id = ?")
            .bind(reminder_id)
            .execute(&self.pool)
            .await?;
        Ok(())
    }

    /// Read-only listing for the front end: a user's not-yet-sent reminders.
    pub async fn pending_reminders(&self, user_id: i64) -> Result<Vec<Reminder>, Error> {
        let pending = sqlx::query_as::<_, Reminder>(
            "SELECT * FROM reminders WHERE user_id = ? AND is_sent = 0 ORDER BY remind_at ASC",
        )
        .bind(user_id)
        .fetch_all(&self.pool)
        .await?;
        Ok(pending)
    }
}

#[cfg(test)]
mod tests {
    use chrono::Utc;

    use crate::db::open_memory;

    #[tokio::test]
    async fn due_query_returns_past_but_never_future() {
        let db = open_memory().await;
        db.upsert_user(1, None).await.unwrap();
        let task = db.add_task(1, "stretch", "health").await.unwrap();
        let now = Utc::now().timestamp();
        let past = db.add_reminder(task, 1, now - 1, "once", None).await.unwrap();
        db.add_reminder(task, 1, now + 3600, "once", None).await.unwrap();

        let due = db.fetch_due_unsent(now).await.unwrap();
        assert_eq!(due.len(), 1);
        assert_eq!(due[0].id, past);
        assert_eq!(due[0].text, "stretch");
    }

    #[tokio::test]
    async fn mark_sent_is_idempotent_and_monotonic() {
        let db = open_memory().await;
        db.upsert_user(1, None).await.unwrap();
        let task = db.add_task(1, "call mom", "family").await.unwrap();
        let now = Utc::now().timestamp();
        let id = db.add_reminder(task, 1, now - 10, "once", None).await.unwrap();

        db.mark_reminder_sent(id).await.unwrap();
        db.mark_reminder_sent(id).await.unwrap();

        assert!(db.fetch_due_unsent(now).await.unwrap().is_empty());
        assert!(db.pending_reminders(1).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn pending_listing_is_ordered_by_due_time() {
        let db = open_memory().await;
        db.upsert_user(1, None).await.unwrap();
        let task = db.add_task(1, "read", "leisure").await.unwrap();
        let now = Utc::now().timestamp();
        db.add_reminder(task, 1, now + 200, "once", None).await.unwrap();
        db.add_reminder(task, 1, now + 100, "once", Some("daily")).await.unwrap();

        let pending = db.pending_reminders(1).await.unwrap();
        assert_eq!(pending.len(), 2);
        assert!(pending[0].remind_at < pending[1].remind_at);
        assert_eq!(pending[0].recurrence_rule.as_deref(), Some("daily"));
        assert!(!pending[0].is_sent);
    }
}
