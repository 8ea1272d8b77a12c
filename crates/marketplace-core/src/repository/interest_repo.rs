//! 意向与邀请仓储

use async_trait::async_trait;
use sqlx::PgPool;

use super::traits::InterestRepositoryTrait;
use crate::error::Result;
use crate::models::{Interest, InterestInvite, InterestStatus, InviteResponse, NewInterest};

const INTEREST_COLUMNS: &str = r#"
    i.id, i.user_id, i.interest_type, i.producer_id, i.event_id, i.slot_id,
    i.suggested_time, i.message, i.status, i.created_at
"#;

const INVITE_COLUMNS: &str = r#"
    id, interest_id, invited_user_id, status, decline_reason, suggested_slot_id,
    suggested_time, suggested_message, responded_at, created_at
"#;

/// 意向仓储
pub struct InterestRepository {
    pool: PgPool,
}

impl InterestRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    // ==================== 意向 ====================

    pub async fn create(&self, interest: &NewInterest) -> Result<Interest> {
        let sql = format!(
            r#"
            INSERT INTO interests AS i
                (user_id, interest_type, producer_id, event_id, slot_id, suggested_time,
                 message, status, created_at)
            VALUES ($1, $2, $3, $4, $5, $6, $7, 'Pending', NOW())
            RETURNING {INTEREST_COLUMNS}
            "#
        );
        let created = sqlx::query_as::<_, Interest>(&sql)
            .bind(interest.user_id)
            .bind(interest.interest_type)
            .bind(interest.producer_id)
            .bind(interest.event_id)
            .bind(interest.slot_id)
            .bind(interest.suggested_time)
            .bind(&interest.message)
            .fetch_one(&self.pool)
            .await?;

        Ok(created)
    }

    pub async fn find_by_id(&self, id: i64) -> Result<Option<Interest>> {
        let sql = format!("SELECT {INTEREST_COLUMNS} FROM interests i WHERE i.id = $1");
        let interest = sqlx::query_as::<_, Interest>(&sql)
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;

        Ok(interest)
    }

    pub async fn find_for_user(&self, user_id: i64, id: i64) -> Result<Option<Interest>> {
        let sql =
            format!("SELECT {INTEREST_COLUMNS} FROM interests i WHERE i.id = $1 AND i.user_id = $2");
        let interest = sqlx::query_as::<_, Interest>(&sql)
            .bind(id)
            .bind(user_id)
            .fetch_optional(&self.pool)
            .await?;

        Ok(interest)
    }

    pub async fn list_by_user(&self, user_id: i64) -> Result<Vec<Interest>> {
        let sql = format!(
            "SELECT {INTEREST_COLUMNS} FROM interests i WHERE i.user_id = $1 \
             ORDER BY i.created_at DESC"
        );
        let interests = sqlx::query_as::<_, Interest>(&sql)
            .bind(user_id)
            .fetch_all(&self.pool)
            .await?;

        Ok(interests)
    }

    /// 用户被邀请参与的意向
    pub async fn list_invited(&self, user_id: i64) -> Result<Vec<Interest>> {
        let sql = format!(
            r#"
            SELECT {INTEREST_COLUMNS}
            FROM interests i
            WHERE EXISTS (
                SELECT 1 FROM interest_invites inv
                WHERE inv.interest_id = i.id AND inv.invited_user_id = $1
            )
            ORDER BY i.created_at DESC
            "#
        );
        let interests = sqlx::query_as::<_, Interest>(&sql)
            .bind(user_id)
            .fetch_all(&self.pool)
            .await?;

        Ok(interests)
    }

    pub async fn set_status(&self, id: i64, status: InterestStatus) -> Result<()> {
        sqlx::query("UPDATE interests SET status = $2 WHERE id = $1")
            .bind(id)
            .bind(status)
            .execute(&self.pool)
            .await?;

        Ok(())
    }

    // ==================== 邀请 ====================

    /// 批量创建邀请（调用方保证受邀人已去重）
    pub async fn add_invites(
        &self,
        interest_id: i64,
        user_ids: &[i64],
    ) -> Result<Vec<InterestInvite>> {
        if user_ids.is_empty() {
            return Ok(Vec::new());
        }

        let sql = format!(
            r#"
            INSERT INTO interest_invites (interest_id, invited_user_id, status, created_at)
            SELECT $1, invited, 'pending', NOW()
            FROM UNNEST($2::bigint[]) AS invited
            RETURNING {INVITE_COLUMNS}
            "#
        );
        let invites = sqlx::query_as::<_, InterestInvite>(&sql)
            .bind(interest_id)
            .bind(user_ids)
            .fetch_all(&self.pool)
            .await?;

        Ok(invites)
    }

    pub async fn invites_for(&self, interest_ids: &[i64]) -> Result<Vec<InterestInvite>> {
        if interest_ids.is_empty() {
            return Ok(Vec::new());
        }

        let sql = format!(
            "SELECT {INVITE_COLUMNS} FROM interest_invites \
             WHERE interest_id = ANY($1) ORDER BY id ASC"
        );
        let invites = sqlx::query_as::<_, InterestInvite>(&sql)
            .bind(interest_ids)
            .fetch_all(&self.pool)
            .await?;

        Ok(invites)
    }

    pub async fn find_invite(
        &self,
        interest_id: i64,
        user_id: i64,
    ) -> Result<Option<InterestInvite>> {
        let sql = format!(
            "SELECT {INVITE_COLUMNS} FROM interest_invites \
             WHERE interest_id = $1 AND invited_user_id = $2"
        );
        let invite = sqlx::query_as::<_, InterestInvite>(&sql)
            .bind(interest_id)
            .bind(user_id)
            .fetch_optional(&self.pool)
            .await?;

        Ok(invite)
    }

    /// 写入受邀人的答复，同时记录答复时间
    pub async fn update_invite(
        &self,
        invite_id: i64,
        response: &InviteResponse,
    ) -> Result<InterestInvite> {
        let sql = format!(
            r#"
            UPDATE interest_invites
            SET status = $2, decline_reason = $3, suggested_slot_id = $4,
                suggested_time = $5, suggested_message = $6, responded_at = NOW()
            WHERE id = $1
            RETURNING {INVITE_COLUMNS}
            "#
        );
        let invite = sqlx::query_as::<_, InterestInvite>(&sql)
            .bind(invite_id)
            .bind(response.status)
            .bind(&response.decline_reason)
            .bind(response.suggested_slot_id)
            .bind(response.suggested_time)
            .bind(&response.suggested_message)
            .fetch_one(&self.pool)
            .await?;

        Ok(invite)
    }
}

#[async_trait]
impl InterestRepositoryTrait for InterestRepository {
    async fn create(&self, interest: &NewInterest) -> Result<Interest> {
        self.create(interest).await
    }

    async fn add_invites(&self, interest_id: i64, user_ids: &[i64]) -> Result<Vec<InterestInvite>> {
        self.add_invites(interest_id, user_ids).await
    }

    async fn find_by_id(&self, id: i64) -> Result<Option<Interest>> {
        self.find_by_id(id).await
    }

    async fn find_for_user(&self, user_id: i64, id: i64) -> Result<Option<Interest>> {
        self.find_for_user(user_id, id).await
    }

    async fn list_by_user(&self, user_id: i64) -> Result<Vec<Interest>> {
        self.list_by_user(user_id).await
    }

    async fn list_invited(&self, user_id: i64) -> Result<Vec<Interest>> {
        self.list_invited(user_id).await
    }

    async fn set_status(&self, id: i64, status: InterestStatus) -> Result<()> {
        self.set_status(id, status).await
    }

    async fn invites_for(&self, interest_ids: &[i64]) -> Result<Vec<InterestInvite>> {
        self.invites_for(interest_ids).await
    }

    async fn find_invite(&self, interest_id: i64, user_id: i64) -> Result<Option<InterestInvite>> {
        self.find_invite(interest_id, user_id).await
    }

    async fn update_invite(
        &self,
        invite_id: i64,
        response: &InviteResponse,
    ) -> Result<InterestInvite> {
        self.update_invite(invite_id, response).await
    }
}
