use serde::Serialize;
use sqlx::FromRow;

/// A user's task. `status` is `"active"` until the user marks it done;
/// rows only ever disappear through a full account wipe.
#[derive(Debug, Clone, Serialize, FromRow)]
pub struct Task {
    pub id: i64,
    pub user_id: i64,
    pub text: String,
    pub category: String,
    pub status: String,
    pub created_at: i64,
}

/// One scheduled occurrence. `is_sent` flips 0 -> 1 exactly once, inside the
/// poll cycle; recurring reminders get a fresh row instead of being reopened.
#[derive(Debug, Clone, Serialize, FromRow)]
pub struct Reminder {
    pub id: i64,
    pub task_id: i64,
    /// Copy of the task's owner so delivery doesn't need a join per row.
    pub user_id: i64,
    /// Unix seconds, UTC. Compared against `Utc::now().timestamp()` only.
    pub remind_at: i64,
    pub kind: String,
    pub recurrence_rule: Option<String>,
    pub is_sent: bool,
}

/// A due reminder joined with its task text, as fetched on the delivery path.
#[derive(Debug, Clone, FromRow)]
pub struct DueReminder {
    pub id: i64,
    pub task_id: i64,
    pub user_id: i64,
    pub remind_at: i64,
    pub kind: String,
    pub recurrence_rule: Option<String>,
    pub text: String,
}

#[derive(Debug, Clone, Serialize, FromRow)]
pub struct User {
    pub id: i64,
    pub username: Option<String>,
    pub is_premium: bool,
    /// Unix seconds, UTC. NULL while the user has never held premium.
    pub premium_until: Option<i64>,
    pub trial_used: bool,
    pub last_promo_sent: Option<i64>,
    pub created_at: i64,
}

#[derive(Debug, Clone, Copy, Serialize)]
pub struct TaskStats {
    pub total: i64,
    pub done: i64,
}
