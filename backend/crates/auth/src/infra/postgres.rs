//! PostgreSQL Repository Implementations

use chrono::{DateTime, Utc};
use platform::password::HashedPassword;
use sqlx::PgPool;
use uuid::Uuid;

use crate::domain::entity::{
    account::{Account, AccountChanges, AccountProfile, NewAccount},
    session_token::{NewSessionToken, SessionToken, SessionTokenChanges},
};
use crate::domain::repository::{
    AccountMaintenance, AccountRepository, SessionMaintenance, SessionTokenRepository,
};
use crate::domain::value_object::{
    account_id::AccountId, account_role::AccountRole, email::Email,
    session_token_id::SessionTokenId,
};
use crate::error::{AuthError, AuthResult};

macro_rules! account_columns {
    () => {
        r#"
            id,
            email,
            username,
            password_hash,
            role,
            is_verified,
            is_active,
            verification_token,
            verification_expires_at,
            reset_token,
            reset_expires_at,
            last_login_at,
            last_login_ip,
            created_at,
            updated_at
        "#
    };
}

macro_rules! session_columns {
    () => {
        r#"
            id,
            account_id,
            token,
            last_activity_at,
            expires_at,
            created_at
        "#
    };
}

/// PostgreSQL-backed auth repository
#[derive(Clone)]
pub struct PgAuthRepository {
    pool: PgPool,
}

impl PgAuthRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    async fn fetch_account(&self, sql: &str, value: &str) -> AuthResult<Option<Account>> {
        let row = sqlx::query_as::<_, AccountRow>(sql)
            .bind(value)
            .fetch_optional(&self.pool)
            .await?;

        row.map(AccountRow::into_account).transpose()
    }

    async fn set_one_shot(
        &self,
        sql: &str,
        id: &AccountId,
        token: Option<&str>,
        expires_at: Option<DateTime<Utc>>,
    ) -> AuthResult<()> {
        let affected = sqlx::query(sql)
            .bind(id.as_uuid())
            .bind(token)
            .bind(expires_at)
            .bind(Utc::now())
            .execute(&self.pool)
            .await?
            .rows_affected();

        if affected == 0 {
            return Err(AuthError::AccountNotFound);
        }
        Ok(())
    }
}

// ============================================================================
// Account Repository Implementation
// ============================================================================

impl AccountRepository for PgAuthRepository {
    async fn find_by_email(&self, email: &Email) -> AuthResult<Option<Account>> {
        self.fetch_account(
            concat!("SELECT", account_columns!(), "FROM accounts WHERE email = $1"),
            email.as_str(),
        )
        .await
    }

    async fn find_by_username(&self, username: &str) -> AuthResult<Option<Account>> {
        self.fetch_account(
            concat!("SELECT", account_columns!(), "FROM accounts WHERE username = $1"),
            username,
        )
        .await
    }

    async fn find_by_id(&self, id: &AccountId) -> AuthResult<Option<Account>> {
        let row = sqlx::query_as::<_, AccountRow>(concat!(
            "SELECT",
            account_columns!(),
            "FROM accounts WHERE id = $1"
        ))
        .bind(id.as_uuid())
        .fetch_optional(&self.pool)
        .await?;

        row.map(AccountRow::into_account).transpose()
    }

    async fn find_profile_by_id(&self, id: &AccountId) -> AuthResult<Option<AccountProfile>> {
        let row = sqlx::query_as::<_, ProfileRow>(
            r#"
            SELECT
                id,
                email,
                username,
                role,
                is_verified
            FROM accounts
            WHERE id = $1
            "#,
        )
        .bind(id.as_uuid())
        .fetch_optional(&self.pool)
        .await?;

        row.map(ProfileRow::into_profile).transpose()
    }

    async fn create(&self, data: NewAccount) -> AuthResult<Account> {
        let account = Account::from_new(data, Utc::now());

        let result = sqlx::query(
            r#"
            INSERT INTO accounts (
                id,
                email,
                username,
                password_hash,
                role,
                is_verified,
                is_active,
                verification_token,
                verification_expires_at,
                created_at,
                updated_at
            ) VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11)
            "#,
        )
        .bind(account.id.as_uuid())
        .bind(account.email.as_str())
        .bind(&account.username)
        .bind(account.password_hash.as_phc_string())
        .bind(account.role.code())
        .bind(account.is_verified)
        .bind(account.is_active)
        .bind(&account.verification_token)
        .bind(account.verification_expires_at)
        .bind(account.created_at)
        .bind(account.updated_at)
        .execute(&self.pool)
        .await;

        match result {
            Ok(_) => Ok(account),
            Err(sqlx::Error::Database(db_err)) if db_err.is_unique_violation() => {
                Err(AuthError::AccountAlreadyExists)
            }
            Err(e) => Err(e.into()),
        }
    }

    async fn update(&self, id: &AccountId, changes: AccountChanges) -> AuthResult<Account> {
        let row = sqlx::query_as::<_, AccountRow>(concat!(
            r#"
            UPDATE accounts SET
                password_hash = COALESCE($2, password_hash),
                role = COALESCE($3, role),
                is_active = COALESCE($4, is_active),
                reset_token = CASE WHEN $5 THEN NULL ELSE reset_token END,
                reset_expires_at = CASE WHEN $5 THEN NULL ELSE reset_expires_at END,
                updated_at = $6
            WHERE id = $1
            RETURNING
            "#,
            account_columns!()
        ))
        .bind(id.as_uuid())
        .bind(changes.password_hash.as_ref().map(HashedPassword::as_phc_string))
        .bind(changes.role.map(|r| r.code()))
        .bind(changes.is_active)
        .bind(changes.clear_reset_token)
        .bind(Utc::now())
        .fetch_optional(&self.pool)
        .await?;

        row.ok_or(AuthError::AccountNotFound)?.into_account()
    }

    async fn set_verified(&self, id: &AccountId, verified: bool) -> AuthResult<()> {
        let affected = sqlx::query(
            "UPDATE accounts SET is_verified = $2, updated_at = $3 WHERE id = $1",
        )
        .bind(id.as_uuid())
        .bind(verified)
        .bind(Utc::now())
        .execute(&self.pool)
        .await?
        .rows_affected();

        if affected == 0 {
            return Err(AuthError::AccountNotFound);
        }
        Ok(())
    }

    async fn set_verification_token(
        &self,
        id: &AccountId,
        token: Option<&str>,
        expires_at: Option<DateTime<Utc>>,
    ) -> AuthResult<()> {
        self.set_one_shot(
            r#"
            UPDATE accounts SET
                verification_token = $2,
                verification_expires_at = $3,
                updated_at = $4
            WHERE id = $1
            "#,
            id,
            token,
            expires_at,
        )
        .await
    }

    async fn set_reset_token(
        &self,
        id: &AccountId,
        token: Option<&str>,
        expires_at: Option<DateTime<Utc>>,
    ) -> AuthResult<()> {
        self.set_one_shot(
            r#"
            UPDATE accounts SET
                reset_token = $2,
                reset_expires_at = $3,
                updated_at = $4
            WHERE id = $1
            "#,
            id,
            token,
            expires_at,
        )
        .await
    }

    async fn find_by_verification_token(&self, token: &str) -> AuthResult<Option<Account>> {
        self.fetch_account(
            concat!(
                "SELECT",
                account_columns!(),
                "FROM accounts WHERE verification_token = $1"
            ),
            token,
        )
        .await
    }

    async fn find_by_reset_token(&self, token: &str) -> AuthResult<Option<Account>> {
        self.fetch_account(
            concat!("SELECT", account_columns!(), "FROM accounts WHERE reset_token = $1"),
            token,
        )
        .await
    }

    async fn consume_verification_token(&self, id: &AccountId, token: &str) -> AuthResult<bool> {
        let affected = sqlx::query(
            r#"
            UPDATE accounts SET
                is_verified = TRUE,
                verification_expires_at = NULL,
                updated_at = $3
            WHERE id = $1
              AND verification_token = $2
              AND is_verified = FALSE
            "#,
        )
        .bind(id.as_uuid())
        .bind(token)
        .bind(Utc::now())
        .execute(&self.pool)
        .await?
        .rows_affected();

        Ok(affected == 1)
    }

    async fn consume_reset_token(
        &self,
        id: &AccountId,
        token: &str,
        password_hash: &HashedPassword,
    ) -> AuthResult<bool> {
        let affected = sqlx::query(
            r#"
            UPDATE accounts SET
                password_hash = $3,
                reset_token = NULL,
                reset_expires_at = NULL,
                updated_at = $4
            WHERE id = $1
              AND reset_token = $2
            "#,
        )
        .bind(id.as_uuid())
        .bind(token)
        .bind(password_hash.as_phc_string())
        .bind(Utc::now())
        .execute(&self.pool)
        .await?
        .rows_affected();

        Ok(affected == 1)
    }

    async fn update_login_tracking(
        &self,
        id: &AccountId,
        at: DateTime<Utc>,
        ip: Option<&str>,
    ) -> AuthResult<()> {
        sqlx::query("UPDATE accounts SET last_login_at = $2, last_login_ip = $3 WHERE id = $1")
            .bind(id.as_uuid())
            .bind(at)
            .bind(ip)
            .execute(&self.pool)
            .await?;

        Ok(())
    }
}

impl AccountMaintenance for PgAuthRepository {
    async fn clean_expired_verification_tokens(&self, now: DateTime<Utc>) -> AuthResult<u64> {
        let cleaned = sqlx::query(
            r#"
            UPDATE accounts SET
                verification_token = NULL,
                verification_expires_at = NULL,
                updated_at = $1
            WHERE is_verified = FALSE
              AND verification_token IS NOT NULL
              AND (verification_expires_at IS NULL OR verification_expires_at < $1)
            "#,
        )
        .bind(now)
        .execute(&self.pool)
        .await?
        .rows_affected();

        Ok(cleaned)
    }
}

// ============================================================================
// Session Token Repository Implementation
// ============================================================================

impl SessionTokenRepository for PgAuthRepository {
    async fn create(&self, data: NewSessionToken) -> AuthResult<SessionToken> {
        let session = SessionToken::from_new(data, Utc::now());

        sqlx::query(
            r#"
            INSERT INTO session_tokens (
                id,
                account_id,
                token,
                last_activity_at,
                expires_at,
                created_at
            ) VALUES ($1, $2, $3, $4, $5, $6)
            "#,
        )
        .bind(session.id.as_uuid())
        .bind(session.account_id.as_uuid())
        .bind(&session.token)
        .bind(session.last_activity_at)
        .bind(session.expires_at)
        .bind(session.created_at)
        .execute(&self.pool)
        .await?;

        Ok(session)
    }

    async fn find_by_token(&self, token: &str) -> AuthResult<Option<SessionToken>> {
        let row = sqlx::query_as::<_, SessionTokenRow>(concat!(
            "SELECT",
            session_columns!(),
            "FROM session_tokens WHERE token = $1"
        ))
        .bind(token)
        .fetch_optional(&self.pool)
        .await?;

        Ok(row.map(SessionTokenRow::into_session))
    }

    async fn update(
        &self,
        id: &SessionTokenId,
        changes: SessionTokenChanges,
    ) -> AuthResult<SessionToken> {
        let row = sqlx::query_as::<_, SessionTokenRow>(concat!(
            r#"
            UPDATE session_tokens SET
                token = COALESCE($2, token),
                last_activity_at = COALESCE($3, last_activity_at),
                expires_at = COALESCE($4, expires_at)
            WHERE id = $1
            RETURNING
            "#,
            session_columns!()
        ))
        .bind(id.as_uuid())
        .bind(changes.token)
        .bind(changes.last_activity_at)
        .bind(changes.expires_at)
        .fetch_optional(&self.pool)
        .await?;

        row.map(SessionTokenRow::into_session)
            .ok_or_else(|| AuthError::Store("session not found".to_string()))
    }

    async fn replace_token(
        &self,
        id: &SessionTokenId,
        current: &str,
        next: &str,
        expires_at: DateTime<Utc>,
        last_activity_at: DateTime<Utc>,
    ) -> AuthResult<bool> {
        let affected = sqlx::query(
            r#"
            UPDATE session_tokens SET
                token = $3,
                expires_at = $4,
                last_activity_at = $5
            WHERE id = $1 AND token = $2
            "#,
        )
        .bind(id.as_uuid())
        .bind(current)
        .bind(next)
        .bind(expires_at)
        .bind(last_activity_at)
        .execute(&self.pool)
        .await?
        .rows_affected();

        Ok(affected == 1)
    }

    async fn delete_by_id(&self, id: &SessionTokenId) -> AuthResult<()> {
        sqlx::query("DELETE FROM session_tokens WHERE id = $1")
            .bind(id.as_uuid())
            .execute(&self.pool)
            .await?;

        Ok(())
    }

    async fn delete_by_token(&self, token: &str) -> AuthResult<u64> {
        let deleted = sqlx::query("DELETE FROM session_tokens WHERE token = $1")
            .bind(token)
            .execute(&self.pool)
            .await?
            .rows_affected();

        Ok(deleted)
    }

    async fn delete_all_for_account(&self, account_id: &AccountId) -> AuthResult<u64> {
        let deleted = sqlx::query("DELETE FROM session_tokens WHERE account_id = $1")
            .bind(account_id.as_uuid())
            .execute(&self.pool)
            .await?
            .rows_affected();

        Ok(deleted)
    }
}

impl SessionMaintenance for PgAuthRepository {
    async fn delete_expired(&self, now: DateTime<Utc>) -> AuthResult<u64> {
        let deleted = sqlx::query("DELETE FROM session_tokens WHERE expires_at < $1")
            .bind(now)
            .execute(&self.pool)
            .await?
            .rows_affected();

        tracing::info!(sessions_deleted = deleted, "Cleaned up expired sessions");

        Ok(deleted)
    }
}

// ============================================================================
// Row Types for sqlx mapping
// ============================================================================

#[derive(sqlx::FromRow)]
struct AccountRow {
    id: Uuid,
    email: String,
    username: String,
    password_hash: String,
    role: String,
    is_verified: bool,
    is_active: bool,
    verification_token: Option<String>,
    verification_expires_at: Option<DateTime<Utc>>,
    reset_token: Option<String>,
    reset_expires_at: Option<DateTime<Utc>>,
    last_login_at: Option<DateTime<Utc>>,
    last_login_ip: Option<String>,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl AccountRow {
    fn into_account(self) -> AuthResult<Account> {
        let password_hash = HashedPassword::from_phc_string(self.password_hash)
            .map_err(|e| AuthError::Internal(format!("Invalid password_hash: {}", e)))?;

        Ok(Account {
            id: AccountId::from(self.id),
            email: Email::from_db(self.email),
            username: self.username,
            password_hash,
            role: parse_role(&self.role)?,
            is_verified: self.is_verified,
            is_active: self.is_active,
            verification_token: self.verification_token,
            verification_expires_at: self.verification_expires_at,
            reset_token: self.reset_token,
            reset_expires_at: self.reset_expires_at,
            last_login_at: self.last_login_at,
            last_login_ip: self.last_login_ip,
            created_at: self.created_at,
            updated_at: self.updated_at,
        })
    }
}

#[derive(sqlx::FromRow)]
struct ProfileRow {
    id: Uuid,
    email: String,
    username: String,
    role: String,
    is_verified: bool,
}

impl ProfileRow {
    fn into_profile(self) -> AuthResult<AccountProfile> {
        Ok(AccountProfile {
            id: AccountId::from(self.id),
            email: Email::from_db(self.email),
            username: self.username,
            role: parse_role(&self.role)?,
            is_verified: self.is_verified,
        })
    }
}

#[derive(sqlx::FromRow)]
struct SessionTokenRow {
    id: Uuid,
    account_id: Uuid,
    token: String,
    last_activity_at: DateTime<Utc>,
    expires_at: DateTime<Utc>,
    created_at: DateTime<Utc>,
}

impl SessionTokenRow {
    fn into_session(self) -> SessionToken {
        SessionToken {
            id: SessionTokenId::from(self.id),
            account_id: AccountId::from(self.account_id),
            token: self.token,
            last_activity_at: self.last_activity_at,
            expires_at: self.expires_at,
            created_at: self.created_at,
        }
    }
}

fn parse_role(code: &str) -> AuthResult<AccountRole> {
    AccountRole::from_code(code)
        .ok_or_else(|| AuthError::Internal(format!("Invalid role: {}", code)))
}
