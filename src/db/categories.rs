use crate::db::Db;
use crate::Error;

impl Db {
    pub async fn add_category(&self, user_id: i64, name: &str) -> Result<(), Error> {
        sqlx::query("INSERT OR IGNORE INTO categories (user_id, name) VALUES (?, ?)")
            .bind(user_id)
            .bind(name)
            .execute(&self.pool)
            .await?;
        Ok(())
    }

    pub async fn user_categories(&self, user_id: i64) -> Result<Vec<String>, Error> {
        let names = sqlx::query_scalar::<_, String>(
            "SELECT name FROM categories WHERE user_id = ? ORDER BY name",
        )
        .bind(user_id)
        .fetch_all(&self.pool)
        .await?;
        Ok(names)
    }

    /// Renames the label and keeps existing tasks pointing at the new name.
    pub async fn rename_category(
        &self, user_id: i64, old_name: &str, new_name: &str,
    ) -> Result<(), Error> {
        sqlx::query("UPDATE categories SET name = ? WHERE user_id = ? AND name = ?")
            .bind(new_name)
            .bind(user_id)
            .bind(old_name)
            .execute(&self.pool)
            .await?;
        sqlx::query("UPDATE tasks SET category = ? WHERE user_id = ? AND category = ?")
            .bind(new_name)
            .bind(user_id)
            .bind(old_name)
            .execute(&self.pool)
            .await?;
        Ok(())
    }

    pub async fn delete_category(&self, user_id: i64, name: &str) -> Result<(), Error> {
        sqlx::query("DELETE FROM categories WHERE user_id = ? AND name = ?")
            .bind(user_id)
            .bind(name)
            .execute(&self.pool)
            .await?;
        Ok(())
    }
}
