//! 登录、刷新与登出
//!
//! 会话状态只有一份：`users.refresh_tokens` 中保存的 refresh token 摘要

use std::sync::Arc;

use marketplace_core::models::{ADMIN_ROLE_ID, User};
use marketplace_core::repository::UserRepositoryTrait;
use marketplace_shared::observability::metrics;
use tracing::{info, instrument, warn};

use super::jwt::{JwtManager, TokenPair};
use super::password::{token_digest, verify_password};
use crate::error::{ApiError, Result};

/// 登录或刷新成功后的会话
#[derive(Debug, Clone)]
pub struct Session {
    pub user: User,
    pub tokens: TokenPair,
}

/// 认证服务
pub struct AuthService<U>
where
    U: UserRepositoryTrait,
{
    users: Arc<U>,
    jwt: Arc<JwtManager>,
}

impl<U> AuthService<U>
where
    U: UserRepositoryTrait,
{
    pub fn new(users: Arc<U>, jwt: Arc<JwtManager>) -> Self {
        Self { users, jwt }
    }

    /// 邮箱 + 密码登录；`admin_only` 时要求管理员角色
    #[instrument(skip(self, password))]
    pub async fn login(&self, email: &str, password: &str, admin_only: bool) -> Result<Session> {
        let flow = if admin_only { "admin_login" } else { "login" };
        let result = self.authenticate(email, password, admin_only).await;
        metrics::record_auth_attempt(flow, result.is_ok());
        result
    }

    async fn authenticate(&self, email: &str, password: &str, admin_only: bool) -> Result<Session> {
        let email = email.trim().to_lowercase();
        let user = self
            .users
            .find_by_email(&email)
            .await?
            .ok_or_else(|| ApiError::NotFound("No account with this email exists".to_string()))?;

        if admin_only && user.role_id != ADMIN_ROLE_ID {
            return Err(ApiError::bad_request("user is not an admin"));
        }
        if !user.is_usable() {
            return Err(ApiError::forbidden("Your account has been deactivated"));
        }

        let valid = match user.password_hash.as_deref() {
            Some(hash) => verify_password(password, hash)?,
            None => false,
        };
        if !valid {
            warn!(user_id = user.id, "密码校验失败");
            return Err(ApiError::bad_request("Invalid email or password"));
        }

        let tokens = self.jwt.issue_pair(&user)?;
        self.users
            .add_refresh_token(user.id, &token_digest(&tokens.refresh_token))
            .await?;

        info!(user_id = user.id, role = %user.role_name, "用户登录成功");
        Ok(Session { user, tokens })
    }

    /// 轮换 refresh token：旧 token 必须仍在库中
    #[instrument(skip_all)]
    pub async fn refresh(&self, refresh_token: &str) -> Result<Session> {
        let result = self.rotate(refresh_token).await;
        metrics::record_auth_attempt("refresh", result.is_ok());
        result
    }

    async fn rotate(&self, refresh_token: &str) -> Result<Session> {
        let claims = self.jwt.verify_refresh(refresh_token)?;
        let user_id = claims
            .user_id()
            .map_err(|_| ApiError::bad_request("Invalid refresh token"))?;

        let user = self
            .users
            .find_by_id(user_id)
            .await?
            .ok_or_else(|| ApiError::bad_request("Invalid refresh token"))?;
        if !user.is_usable() {
            return Err(ApiError::forbidden("Your account has been deactivated"));
        }

        let tokens = self.jwt.issue_pair(&user)?;
        let rotated = self
            .users
            .rotate_refresh_token(
                user.id,
                &token_digest(refresh_token),
                &token_digest(&tokens.refresh_token),
            )
            .await?;
        if !rotated {
            warn!(user_id = user.id, "refresh token 不在已签发列表中");
            return Err(ApiError::bad_request("Invalid refresh token"));
        }

        info!(user_id = user.id, "refresh token 已轮换");
        Ok(Session { user, tokens })
    }

    /// 吊销指定的 refresh token
    #[instrument(skip(self, refresh_token))]
    pub async fn logout(&self, user_id: i64, refresh_token: &str) -> Result<()> {
        let user = self.current_user(user_id).await?;
        self.users
            .remove_refresh_token(user.id, &token_digest(refresh_token))
            .await?;
        info!(user_id, "用户已登出");
        Ok(())
    }

    pub async fn current_user(&self, user_id: i64) -> Result<User> {
        self.users
            .find_by_id(user_id)
            .await?
            .ok_or_else(|| ApiError::NotFound("User not found".to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::auth::hash_password;
    use crate::auth::jwt::tests::sample_user;
    use async_trait::async_trait;
    use marketplace_shared::config::AuthConfig;
    use mockall::mock;
    use mockall::predicate::eq;

    mock! {
        pub Users {}

        #[async_trait]
        impl UserRepositoryTrait for Users {
            async fn find_by_id(&self, id: i64) -> marketplace_core::Result<Option<User>>;
            async fn find_by_email(&self, email: &str) -> marketplace_core::Result<Option<User>>;
            async fn existing_ids(&self, ids: &[i64]) -> marketplace_core::Result<Vec<i64>>;
            async fn add_refresh_token(&self, user_id: i64, digest: &str) -> marketplace_core::Result<()>;
            async fn rotate_refresh_token(&self, user_id: i64, old: &str, new: &str) -> marketplace_core::Result<bool>;
            async fn remove_refresh_token(&self, user_id: i64, digest: &str) -> marketplace_core::Result<()>;
        }
    }

    fn jwt() -> Arc<JwtManager> {
        Arc::new(JwtManager::new(&AuthConfig::default()))
    }

    fn user_with_password(id: i64, role_id: i64, role: &str, password: &str) -> User {
        User {
            password_hash: Some(hash_password(password).unwrap()),
            ..sample_user(id, role_id, role)
        }
    }

    #[tokio::test]
    async fn test_login_lowercases_email_and_stores_refresh_digest() {
        let user = user_with_password(5, 2, "user", "s3cret");
        let mut users = MockUsers::new();
        users
            .expect_find_by_email()
            .withf(|email| email == "guest@example.com")
            .returning(move |_| Ok(Some(user.clone())));
        users
            .expect_add_refresh_token()
            .withf(|id, digest| *id == 5 && digest.len() == 44)
            .times(1)
            .returning(|_, _| Ok(()));

        let service = AuthService::new(Arc::new(users), jwt());
        let session = service
            .login("  Guest@Example.COM ", "s3cret", false)
            .await
            .unwrap();

        assert_eq!(session.user.id, 5);
        assert!(!session.tokens.access_token.is_empty());
        assert_ne!(session.tokens.access_token, session.tokens.refresh_token);
    }

    #[tokio::test]
    async fn test_login_failures() {
        struct Case {
            name: &'static str,
            user: Option<User>,
            password: &'static str,
            admin_only: bool,
            expected: &'static str,
        }

        let inactive = User {
            is_active: false,
            ..user_with_password(1, 2, "user", "pw")
        };
        let cases = vec![
            Case {
                name: "unknown email",
                user: None,
                password: "pw",
                admin_only: false,
                expected: "No account with this email exists",
            },
            Case {
                name: "wrong password",
                user: Some(user_with_password(1, 2, "user", "pw")),
                password: "nope",
                admin_only: false,
                expected: "Invalid email or password",
            },
            Case {
                name: "inactive account",
                user: Some(inactive),
                password: "pw",
                admin_only: false,
                expected: "Your account has been deactivated",
            },
            Case {
                name: "admin login by regular user",
                user: Some(user_with_password(1, 2, "user", "pw")),
                password: "pw",
                admin_only: true,
                expected: "user is not an admin",
            },
        ];

        for case in cases {
            let found = case.user.clone();
            let mut users = MockUsers::new();
            users
                .expect_find_by_email()
                .returning(move |_| Ok(found.clone()));
            users.expect_add_refresh_token().never();

            let service = AuthService::new(Arc::new(users), jwt());
            let err = service
                .login("user@example.com", case.password, case.admin_only)
                .await
                .unwrap_err();
            assert_eq!(err.to_string(), case.expected, "case: {}", case.name);
        }
    }

    #[tokio::test]
    async fn test_admin_login_succeeds_for_admin_role() {
        let admin = user_with_password(1, ADMIN_ROLE_ID, "admin", "root");
        let mut users = MockUsers::new();
        users
            .expect_find_by_email()
            .returning(move |_| Ok(Some(admin.clone())));
        users.expect_add_refresh_token().returning(|_, _| Ok(()));

        let service = AuthService::new(Arc::new(users), jwt());
        let session = service.login("admin@example.com", "root", true).await.unwrap();
        assert_eq!(session.user.role_id, ADMIN_ROLE_ID);
    }

    #[tokio::test]
    async fn test_refresh_rotates_stored_token() {
        let jwt = jwt();
        let user = sample_user(9, 2, "user");
        let old = jwt.issue_pair(&user).unwrap().refresh_token;
        let old_digest = token_digest(&old);

        let mut users = MockUsers::new();
        let found = user.clone();
        users
            .expect_find_by_id()
            .with(eq(9))
            .returning(move |_| Ok(Some(found.clone())));
        users
            .expect_rotate_refresh_token()
            .withf(move |id, previous, _| *id == 9 && previous == old_digest)
            .times(1)
            .returning(|_, _, _| Ok(true));

        let service = AuthService::new(Arc::new(users), jwt);
        let session = service.refresh(&old).await.unwrap();
        assert_eq!(session.user.id, 9);
    }

    #[tokio::test]
    async fn test_refresh_rejects_revoked_token() {
        let jwt = jwt();
        let user = sample_user(9, 2, "user");
        let old = jwt.issue_pair(&user).unwrap().refresh_token;

        let mut users = MockUsers::new();
        users
            .expect_find_by_id()
            .returning(move |_| Ok(Some(user.clone())));
        users
            .expect_rotate_refresh_token()
            .returning(|_, _, _| Ok(false));

        let service = AuthService::new(Arc::new(users), jwt);
        let err = service.refresh(&old).await.unwrap_err();
        assert!(matches!(err, ApiError::BadRequest(_)));
        assert_eq!(err.to_string(), "Invalid refresh token");
    }

    #[tokio::test]
    async fn test_refresh_rejects_access_token() {
        let jwt = jwt();
        let pair = jwt.issue_pair(&sample_user(9, 2, "user")).unwrap();
        let mut users = MockUsers::new();
        users.expect_find_by_id().never();

        let service = AuthService::new(Arc::new(users), jwt);
        let err = service.refresh(&pair.access_token).await.unwrap_err();
        assert_eq!(err.to_string(), "Invalid refresh token");
    }

    #[tokio::test]
    async fn test_logout_removes_digest() {
        let user = sample_user(3, 2, "user");
        let expected = token_digest("refresh-token");

        let mut users = MockUsers::new();
        users
            .expect_find_by_id()
            .returning(move |_| Ok(Some(user.clone())));
        users
            .expect_remove_refresh_token()
            .withf(move |id, digest| *id == 3 && digest == expected)
            .times(1)
            .returning(|_, _| Ok(()));

        let service = AuthService::new(Arc::new(users), jwt());
        service.logout(3, "refresh-token").await.unwrap();
    }

    #[tokio::test]
    async fn test_logout_unknown_user() {
        let mut users = MockUsers::new();
        users.expect_find_by_id().returning(|_| Ok(None));

        let service = AuthService::new(Arc::new(users), jwt());
        let err = service.logout(404, "t").await.unwrap_err();
        assert_eq!(err.to_string(), "User not found");
    }
}
