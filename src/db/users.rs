use chrono::Utc;

use crate::db::Db;
use crate::models::User;
use crate::Error;

impl Db {
    /// Registers a user on first contact; repeat calls are no-ops.
    pub async fn upsert_user(&self, user_id: i64, username: Option<&str>) -> Result<(), Error> {
        let created_at = Utc::now().timestamp();
        sqlx::query("INSERT OR IGNORE INTO users (id, username, created_at) VALUES (?, ?, ?)")
            .bind(user_id)
            .bind(username)
            .bind(created_at)
            .execute(&self.pool)
            .await?;
        Ok(())
    }

    pub async fn get_user(&self, user_id: i64) -> Result<Option<User>, Error> {
        let user = sqlx::query_as::<_, User>("SELECT * FROM users WHERE id = ?")
            .bind(user_id)
            .fetch_optional(&self.pool)
            .await?;
        Ok(user)
    }

    pub async fn all_users(&self) -> Result<Vec<User>, Error> {
        let users = sqlx::query_as::<_, User>("SELECT * FROM users")
            .fetch_all(&self.pool)
            .await?;
        Ok(users)
    }

    pub async fn set_premium(&self, user_id: i64, premium_until: i64) -> Result<(), Error> {
        sqlx::query("UPDATE users SET is_premium = 1, premium_until = ? WHERE id = ?")
            .bind(premium_until)
            .bind(user_id)
            .execute(&self.pool)
            .await?;
        Ok(())
    }

    /// Demotes an account: flag off, expiry cleared.
    pub async fn revoke_premium(&self, user_id: i64) -> Result<(), Error> {
        sqlx::query("UPDATE users SET is_premium = 0, premium_until = NULL WHERE id = ?")
            .bind(user_id)
            .execute(&self.pool)
            .await?;
        Ok(())
    }

    /// Grants trial premium and burns the one-shot trial flag.
    pub async fn activate_trial(&self, user_id: i64, premium_until: i64) -> Result<(), Error> {
        sqlx::query(
            "UPDATE users SET is_premium = 1, premium_until = ?, trial_used = 1 WHERE id = ?",
        )
        .bind(premium_until)
        .bind(user_id)
        .execute(&self.pool)
        .await?;
        Ok(())
    }

    pub async fn touch_last_promo(&self, user_id: i64, now: i64) -> Result<(), Error> {
        sqlx::query("UPDATE users SET last_promo_sent = ? WHERE id = ?")
            .bind(now)
            .bind(user_id)
            .execute(&self.pool)
            .await?;
        Ok(())
    }
}
