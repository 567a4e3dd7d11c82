use chrono::{DateTime, Utc};
use tracing::{error, warn};

use crate::db::Db;
use crate::models::DueReminder;
use crate::notify::{notify_with_timeout, Notifier};
use crate::recurrence::{next_due, RecurrenceRule};
use crate::Error;

/// One poll cycle: fetch the due batch, then process each reminder on its own.
/// A failure in one reminder never aborts the rest of the batch; a failed
/// fetch abandons the whole cycle until the next tick.
pub async fn check_reminders<N: Notifier>(db: &Db, notifier: &N) {
    let now = Utc::now().timestamp();
    let due = match db.fetch_due_unsent(now).await {
        Ok(due) => due,
        Err(e) => {
            error!("due reminder fetch failed, cycle abandoned: {e}");
            return;
        }
    };
    for reminder in due {
        if let Err(e) = process_due(db, notifier, &reminder).await {
            error!(reminder_id = reminder.id, "failed to process reminder: {e}");
        }
    }
}

async fn process_due<N: Notifier>(
    db: &Db, notifier: &N, reminder: &DueReminder,
) -> Result<(), Error> {
    let message = format!("🔔 Reminder!\n{}", reminder.text);
    if let Err(e) = notify_with_timeout(notifier, reminder.user_id, &message).await {
        // One delivery attempt per occurrence; the row is marked sent below
        // either way, so a flaky transport can't cause duplicate deliveries.
        warn!(
            reminder_id = reminder.id,
            user_id = reminder.user_id,
            "reminder delivery failed: {e}"
        );
    }
    db.mark_reminder_sent(reminder.id).await?;

    let Some(raw_rule) = reminder.recurrence_rule.as_deref() else {
        return Ok(());
    };
    let Some(rule) = RecurrenceRule::decode(raw_rule) else {
        // Malformed rule: already logged, the recurrence silently ends.
        return Ok(());
    };
    let Some(previous) = DateTime::from_timestamp(reminder.remind_at, 0) else {
        error!(reminder_id = reminder.id, "stored due time out of range, recurrence ends");
        return Ok(());
    };
    let next = next_due(previous, rule);
    db.add_reminder(
        reminder.task_id,
        reminder.user_id,
        next.timestamp(),
        &reminder.kind,
        Some(raw_rule),
    )
    .await?;
    Ok(())
}
