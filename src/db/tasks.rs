use chrono::Utc;

use crate::db::Db;
use crate::models::{Task, TaskStats};
use crate::Error;

impl Db {
    /// Creates a task for a user. The category label is free-form; user-defined
    /// categories are allowed.
    pub async fn add_task(&self, user_id: i64, text: &str, category: &str) -> Result<i64, Error> {
        let created_at = Utc::now().timestamp();
        let id = sqlx::query(
            "INSERT INTO tasks (user_id, text, category, created_at) VALUES (?, ?, ?, ?)",
        )
        .bind(user_id)
        .bind(text)
        .bind(category)
        .bind(created_at)
        .execute(&self.pool)
        .await?
        .last_insert_rowid();
        Ok(id)
    }

    pub async fn active_tasks(&self, user_id: i64) -> Result<Vec<Task>, Error> {
        let tasks = sqlx::query_as::<_, Task>(
            "SELECT * FROM tasks WHERE user_id = ? AND status = 'active' ORDER BY created_at DESC",
        )
        .bind(user_id)
        .fetch_all(&self.pool)
        .await?;
        Ok(tasks)
    }

    pub async fn done_tasks(&self, user_id: i64) -> Result<Vec<Task>, Error> {
        let tasks = sqlx::query_as::<_, Task>(
            "SELECT * FROM tasks WHERE user_id = ? AND status = 'done' ORDER BY created_at DESC",
        )
        .bind(user_id)
        .fetch_all(&self.pool)
        .await?;
        Ok(tasks)
    }

    /// The only status transition a task ever makes.
    pub async fn mark_task_done(&self, task_id: i64) -> Result<(), Error> {
        sqlx::query("UPDATE tasks SET status = 'done' WHERE id = ?")
            .bind(task_id)
            .execute(&self.pool)
            .await?;
        Ok(())
    }

    pub async fn task_stats(&self, user_id: i64) -> Result<TaskStats, Error> {
        let total = sqlx::query_scalar::<_, i64>("SELECT COUNT(*) FROM tasks WHERE user_id = ?")
            .bind(user_id)
            .fetch_one(&self.pool)
            .await?;
        let done = sqlx::query_scalar::<_, i64>(
            "SELECT COUNT(*) FROM tasks WHERE user_id = ? AND status = 'done'",
        )
        .bind(user_id)
        .fetch_one(&self.pool)
        .await?;
        Ok(TaskStats { total, done })
    }

    /// Bulk account wipe: reminders first, then tasks and categories.
    pub async fn delete_all_user_data(&self, user_id: i64) -> Result<(), Error> {
        sqlx::query("DELETE FROM reminders WHERE user_id = ?")
            .bind(user_id)
            .execute(&self.pool)
            .await?;
        sqlx::query("DELETE FROM tasks WHERE user_id = ?")
            .bind(user_id)
            .execute(&self.pool)
            .await?;
        sqlx::query("DELETE FROM categories WHERE user_id = ?")
            .bind(user_id)
            .execute(&self.pool)
            .await?;
        Ok(())
    }
}
