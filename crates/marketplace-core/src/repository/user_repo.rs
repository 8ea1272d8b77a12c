//! 用户仓储
//!
//! 用户查询总是带上角色名；刷新令牌以摘要形式存放在 `users.refresh_tokens` 数组中

use async_trait::async_trait;
use sqlx::PgPool;

use super::traits::UserRepositoryTrait;
use crate::error::Result;
use crate::models::User;

const USER_COLUMNS: &str = r#"
    u.id, u.email, u.full_name, u.password_hash, u.role_id, r.name AS role_name,
    u.is_active, u.is_deleted, u.latitude, u.longitude, u.profile_image_url, u.created_at
"#;

/// 用户仓储
pub struct UserRepository {
    pool: PgPool,
}

impl UserRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    // ==================== 查询操作 ====================

    pub async fn find_by_id(&self, id: i64) -> Result<Option<User>> {
        let sql = format!(
            "SELECT {USER_COLUMNS} FROM users u JOIN roles r ON r.id = u.role_id WHERE u.id = $1"
        );
        let user = sqlx::query_as::<_, User>(&sql)
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;

        Ok(user)
    }

    /// 按邮箱查询（调用方负责小写化）
    pub async fn find_by_email(&self, email: &str) -> Result<Option<User>> {
        let sql = format!(
            "SELECT {USER_COLUMNS} FROM users u JOIN roles r ON r.id = u.role_id \
             WHERE LOWER(u.email) = $1"
        );
        let user = sqlx::query_as::<_, User>(&sql)
            .bind(email)
            .fetch_optional(&self.pool)
            .await?;

        Ok(user)
    }

    pub async fn existing_ids(&self, ids: &[i64]) -> Result<Vec<i64>> {
        if ids.is_empty() {
            return Ok(Vec::new());
        }

        let found: Vec<(i64,)> = sqlx::query_as(
            r#"
            SELECT id FROM users
            WHERE id = ANY($1) AND is_deleted = false
            ORDER BY id
            "#,
        )
        .bind(ids)
        .fetch_all(&self.pool)
        .await?;

        Ok(found.into_iter().map(|(id,)| id).collect())
    }

    // ==================== 刷新令牌 ====================

    pub async fn add_refresh_token(&self, user_id: i64, digest: &str) -> Result<()> {
        sqlx::query(
            r#"
            UPDATE users
            SET refresh_tokens = array_append(COALESCE(refresh_tokens, '{}'), $2),
                updated_at = NOW()
            WHERE id = $1
            "#,
        )
        .bind(user_id)
        .bind(digest)
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    /// 旧令牌仍在列表中时才替换，避免同一刷新令牌被并发使用两次
    pub async fn rotate_refresh_token(&self, user_id: i64, old: &str, new: &str) -> Result<bool> {
        let result = sqlx::query(
            r#"
            UPDATE users
            SET refresh_tokens = array_append(array_remove(refresh_tokens, $2), $3),
                updated_at = NOW()
            WHERE id = $1 AND $2 = ANY(refresh_tokens)
            "#,
        )
        .bind(user_id)
        .bind(old)
        .bind(new)
        .execute(&self.pool)
        .await?;

        Ok(result.rows_affected() > 0)
    }

    pub async fn remove_refresh_token(&self, user_id: i64, digest: &str) -> Result<()> {
        sqlx::query(
            r#"
            UPDATE users
            SET refresh_tokens = array_remove(refresh_tokens, $2), updated_at = NOW()
            WHERE id = $1
            "#,
        )
        .bind(user_id)
        .bind(digest)
        .execute(&self.pool)
        .await?;

        Ok(())
    }
}

#[async_trait]
impl UserRepositoryTrait for UserRepository {
    async fn find_by_id(&self, id: i64) -> Result<Option<User>> {
        self.find_by_id(id).await
    }

    async fn find_by_email(&self, email: &str) -> Result<Option<User>> {
        self.find_by_email(email).await
    }

    async fn existing_ids(&self, ids: &[i64]) -> Result<Vec<i64>> {
        self.existing_ids(ids).await
    }

    async fn add_refresh_token(&self, user_id: i64, digest: &str) -> Result<()> {
        self.add_refresh_token(user_id, digest).await
    }

    async fn rotate_refresh_token(&self, user_id: i64, old: &str, new: &str) -> Result<bool> {
        self.rotate_refresh_token(user_id, old, new).await
    }

    async fn remove_refresh_token(&self, user_id: i64, digest: &str) -> Result<()> {
        self.remove_refresh_token(user_id, digest).await
    }
}
