//! Service-level scenarios against the in-memory store

use std::sync::{Arc, Mutex};

use chrono::{DateTime, Duration, Utc};
use platform::password::{HashedPassword, PasswordHashCost};
use tokio::sync::Barrier;

use crate::application::{AuthConfig, AuthService, TokenCodec, VerificationStatus};
use crate::domain::entity::{
    account::{Account, AccountChanges, AccountProfile, AccountView, NewAccount},
    session_token::{NewSessionToken, SessionToken, SessionTokenChanges},
};
use crate::domain::repository::{AccountRepository, MailSender, SessionTokenRepository};
use crate::domain::value_object::{
    account_id::AccountId, account_role::AccountRole, email::Email,
    session_token_id::SessionTokenId,
};
use crate::error::{AuthError, AuthResult, MailError};
use crate::infra::memory::InMemoryAuthStore;

const PASSWORD: &str = "Secret123!";

// ============================================================================
// Fakes
// ============================================================================

struct SentMail {
    to: String,
    subject: String,
    body: String,
}

#[derive(Default)]
struct RecordingMailer {
    sent: Mutex<Vec<SentMail>>,
    fail: bool,
}

impl RecordingMailer {
    fn failing() -> Self {
        Self {
            fail: true,
            ..Default::default()
        }
    }

    fn count(&self) -> usize {
        self.sent.lock().unwrap().len()
    }

    /// One-shot token embedded in the most recent mail
    fn last_token(&self) -> String {
        let sent = self.sent.lock().unwrap();
        let body = &sent.last().expect("no mail sent").body;
        let start = body.find("token=").expect("no token in mail") + "token=".len();
        body[start..start + 36].to_string()
    }
}

impl MailSender for RecordingMailer {
    async fn send(&self, to: &str, subject: &str, html_body: &str) -> Result<(), MailError> {
        if self.fail {
            return Err(MailError("smtp unavailable".to_string()));
        }
        self.sent.lock().unwrap().push(SentMail {
            to: to.to_string(),
            subject: subject.to_string(),
            body: html_body.to_string(),
        });
        Ok(())
    }
}

/// Session store whose every call fails
struct UnavailableSessionStore;

fn unavailable<T>() -> AuthResult<T> {
    Err(AuthError::Store("session store unavailable".to_string()))
}

impl SessionTokenRepository for UnavailableSessionStore {
    async fn create(&self, _data: NewSessionToken) -> AuthResult<SessionToken> {
        unavailable()
    }

    async fn find_by_token(&self, _token: &str) -> AuthResult<Option<SessionToken>> {
        unavailable()
    }

    async fn update(
        &self,
        _id: &SessionTokenId,
        _changes: SessionTokenChanges,
    ) -> AuthResult<SessionToken> {
        unavailable()
    }

    async fn replace_token(
        &self,
        _id: &SessionTokenId,
        _current: &str,
        _next: &str,
        _expires_at: DateTime<Utc>,
        _last_activity_at: DateTime<Utc>,
    ) -> AuthResult<bool> {
        unavailable()
    }

    async fn delete_by_id(&self, _id: &SessionTokenId) -> AuthResult<()> {
        unavailable()
    }

    async fn delete_by_token(&self, _token: &str) -> AuthResult<u64> {
        unavailable()
    }

    async fn delete_all_for_account(&self, _account_id: &AccountId) -> AuthResult<u64> {
        unavailable()
    }
}

/// Store that holds every caller of a compare-and-swap write until two of
/// them have arrived, so both have already read the row they race on.
struct RendezvousStore {
    inner: InMemoryAuthStore,
    barrier: Barrier,
}

impl RendezvousStore {
    fn new(inner: &InMemoryAuthStore) -> Self {
        Self {
            inner: inner.clone(),
            barrier: Barrier::new(2),
        }
    }
}

impl AccountRepository for RendezvousStore {
    async fn find_by_email(&self, email: &Email) -> AuthResult<Option<Account>> {
        self.inner.find_by_email(email).await
    }

    async fn find_by_username(&self, username: &str) -> AuthResult<Option<Account>> {
        self.inner.find_by_username(username).await
    }

    async fn find_by_id(&self, id: &AccountId) -> AuthResult<Option<Account>> {
        AccountRepository::find_by_id(&self.inner, id).await
    }

    async fn find_profile_by_id(&self, id: &AccountId) -> AuthResult<Option<AccountProfile>> {
        self.inner.find_profile_by_id(id).await
    }

    async fn create(&self, data: NewAccount) -> AuthResult<Account> {
        AccountRepository::create(&self.inner, data).await
    }

    async fn update(&self, id: &AccountId, changes: AccountChanges) -> AuthResult<Account> {
        AccountRepository::update(&self.inner, id, changes).await
    }

    async fn set_verified(&self, id: &AccountId, verified: bool) -> AuthResult<()> {
        self.inner.set_verified(id, verified).await
    }

    async fn set_verification_token(
        &self,
        id: &AccountId,
        token: Option<&str>,
        expires_at: Option<DateTime<Utc>>,
    ) -> AuthResult<()> {
        self.inner
            .set_verification_token(id, token, expires_at)
            .await
    }

    async fn set_reset_token(
        &self,
        id: &AccountId,
        token: Option<&str>,
        expires_at: Option<DateTime<Utc>>,
    ) -> AuthResult<()> {
        self.inner.set_reset_token(id, token, expires_at).await
    }

    async fn find_by_verification_token(&self, token: &str) -> AuthResult<Option<Account>> {
        self.inner.find_by_verification_token(token).await
    }

    async fn find_by_reset_token(&self, token: &str) -> AuthResult<Option<Account>> {
        self.inner.find_by_reset_token(token).await
    }

    async fn consume_verification_token(&self, id: &AccountId, token: &str) -> AuthResult<bool> {
        self.barrier.wait().await;
        self.inner.consume_verification_token(id, token).await
    }

    async fn consume_reset_token(
        &self,
        id: &AccountId,
        token: &str,
        password_hash: &HashedPassword,
    ) -> AuthResult<bool> {
        self.barrier.wait().await;
        self.inner
            .consume_reset_token(id, token, password_hash)
            .await
    }

    async fn update_login_tracking(
        &self,
        id: &AccountId,
        at: DateTime<Utc>,
        ip: Option<&str>,
    ) -> AuthResult<()> {
        self.inner.update_login_tracking(id, at, ip).await
    }
}

impl SessionTokenRepository for RendezvousStore {
    async fn create(&self, data: NewSessionToken) -> AuthResult<SessionToken> {
        SessionTokenRepository::create(&self.inner, data).await
    }

    async fn find_by_token(&self, token: &str) -> AuthResult<Option<SessionToken>> {
        self.inner.find_by_token(token).await
    }

    async fn update(
        &self,
        id: &SessionTokenId,
        changes: SessionTokenChanges,
    ) -> AuthResult<SessionToken> {
        SessionTokenRepository::update(&self.inner, id, changes).await
    }

    async fn replace_token(
        &self,
        id: &SessionTokenId,
        current: &str,
        next: &str,
        expires_at: DateTime<Utc>,
        last_activity_at: DateTime<Utc>,
    ) -> AuthResult<bool> {
        self.barrier.wait().await;
        self.inner
            .replace_token(id, current, next, expires_at, last_activity_at)
            .await
    }

    async fn delete_by_id(&self, id: &SessionTokenId) -> AuthResult<()> {
        self.inner.delete_by_id(id).await
    }

    async fn delete_by_token(&self, token: &str) -> AuthResult<u64> {
        self.inner.delete_by_token(token).await
    }

    async fn delete_all_for_account(&self, account_id: &AccountId) -> AuthResult<u64> {
        self.inner.delete_all_for_account(account_id).await
    }
}

// ============================================================================
// Fixture
// ============================================================================

type Service<S = InMemoryAuthStore> = AuthService<InMemoryAuthStore, S, RecordingMailer>;

struct Fixture<S: SessionTokenRepository = InMemoryAuthStore> {
    service: Service<S>,
    store: Arc<InMemoryAuthStore>,
    mailer: Arc<RecordingMailer>,
    codec: Arc<TokenCodec>,
    config: Arc<AuthConfig>,
}

fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_test_writer()
        .try_init();
}

fn config() -> Arc<AuthConfig> {
    Arc::new(AuthConfig {
        password_hash_cost: PasswordHashCost::minimal(),
        ..AuthConfig::with_random_secrets()
    })
}

fn fixture() -> Fixture {
    fixture_with(RecordingMailer::default())
}

fn fixture_with(mailer: RecordingMailer) -> Fixture {
    init_tracing();
    let store = Arc::new(InMemoryAuthStore::new());
    let mailer = Arc::new(mailer);
    let config = config();
    let service = AuthService::new(
        Arc::clone(&store),
        Arc::clone(&store),
        Arc::clone(&mailer),
        Arc::clone(&config),
    );
    let codec = service.codec();
    Fixture {
        service,
        store,
        mailer,
        codec,
        config,
    }
}

fn fixture_without_sessions() -> Fixture<UnavailableSessionStore> {
    init_tracing();
    let store = Arc::new(InMemoryAuthStore::new());
    let mailer = Arc::new(RecordingMailer::default());
    let config = config();
    let service = AuthService::new(
        Arc::clone(&store),
        Arc::new(UnavailableSessionStore),
        Arc::clone(&mailer),
        Arc::clone(&config),
    );
    let codec = service.codec();
    Fixture {
        service,
        store,
        mailer,
        codec,
        config,
    }
}

impl<S: SessionTokenRepository> Fixture<S> {
    /// Second service over the same data whose one-shot and rotation
    /// writes wait for a concurrent partner
    fn racing(&self) -> AuthService<RendezvousStore, RendezvousStore, RecordingMailer> {
        let store = Arc::new(RendezvousStore::new(&self.store));
        AuthService::new(
            Arc::clone(&store),
            store,
            Arc::clone(&self.mailer),
            Arc::clone(&self.config),
        )
    }

    async fn register(&self, email: &str, username: &str) -> AccountView {
        self.service
            .register(email, username, PASSWORD)
            .await
            .unwrap()
            .account
    }

    /// Register and consume the mailed verification token
    async fn verified(&self, email: &str, username: &str) -> AccountView {
        let account = self.register(email, username).await;
        self.service
            .verify_email(&self.mailer.last_token())
            .await
            .unwrap();
        account
    }
}

fn assert_err<T: std::fmt::Debug>(result: AuthResult<T>, expected: &str) {
    match result {
        Err(e) => assert_eq!(e.code(), expected, "{e}"),
        Ok(v) => panic!("expected {expected}, got Ok({v:?})"),
    }
}

// ============================================================================
// Registration
// ============================================================================

#[tokio::test]
async fn test_register_creates_unverified_account() {
    let f = fixture();
    let output = f
        .service
        .register("a@x.com", "alice", PASSWORD)
        .await
        .unwrap();

    assert!(!output.account.is_verified);
    assert_eq!(output.account.email.as_str(), "a@x.com");
    assert!(output.email_sent);
    assert!(output.email_error.is_none());

    let sent = f.mailer.sent.lock().unwrap();
    assert_eq!(sent.len(), 1);
    assert_eq!(sent[0].to, "a@x.com");
    assert_eq!(sent[0].subject, "Verify your email address");
}

#[tokio::test]
async fn test_register_duplicate_is_rejected() {
    let f = fixture();
    f.register("a@x.com", "alice").await;

    assert_err(
        f.service.register("a@x.com", "alice2", PASSWORD).await,
        "ACCOUNT_ALREADY_EXISTS",
    );
    assert_err(
        f.service.register(" A@X.COM ", "alice3", PASSWORD).await,
        "ACCOUNT_ALREADY_EXISTS",
    );
    assert_err(
        f.service.register("b@x.com", "alice", PASSWORD).await,
        "ACCOUNT_ALREADY_EXISTS",
    );
}

#[tokio::test]
async fn test_register_survives_mail_failure() {
    let f = fixture_with(RecordingMailer::failing());
    let output = f
        .service
        .register("a@x.com", "alice", PASSWORD)
        .await
        .unwrap();

    assert!(!output.email_sent);
    assert!(output.email_error.unwrap().contains("smtp unavailable"));
    assert!(
        f.store
            .find_by_email(&Email::new("a@x.com"))
            .await
            .unwrap()
            .is_some()
    );
}

#[tokio::test]
async fn test_register_rejects_blank_password() {
    let f = fixture();
    assert_err(
        f.service.register("a@x.com", "alice", "   ").await,
        "PASSWORD_REJECTED",
    );
}

// ============================================================================
// Email verification
// ============================================================================

#[tokio::test]
async fn test_verify_email_is_single_success() {
    let f = fixture();
    f.register("a@x.com", "alice").await;
    let token = f.mailer.last_token();

    let first = f.service.verify_email(&token).await.unwrap();
    assert_eq!(first.status, VerificationStatus::Success);
    assert!(!first.resend_required);

    assert_err(f.service.verify_email(&token).await, "ALREADY_VERIFIED");

    let account = f
        .store
        .find_by_email(&Email::new("a@x.com"))
        .await
        .unwrap()
        .unwrap();
    assert!(account.is_verified);
    assert!(account.verification_expires_at.is_none());
}

#[tokio::test]
async fn test_concurrent_verify_email_succeeds_once() {
    let f = fixture();
    f.register("a@x.com", "alice").await;
    let token = f.mailer.last_token();

    let racing = f.racing();
    let (a, b) = tokio::join!(racing.verify_email(&token), racing.verify_email(&token));

    assert_eq!(a.is_ok() as u8 + b.is_ok() as u8, 1);
    let loser = a.and(b).unwrap_err();
    assert!(matches!(loser, AuthError::AlreadyVerified));
    f.service.login("a@x.com", PASSWORD, None).await.unwrap();
}

#[tokio::test]
async fn test_verify_email_rejects_unknown_or_malformed() {
    let f = fixture();
    assert_err(f.service.verify_email("not-a-uuid").await, "INVALID_TOKEN");
    assert_err(
        f.service
            .verify_email("7f9c3a52-0d7e-4b8e-9b1e-5d2a7c1f0e4b")
            .await,
        "INVALID_TOKEN",
    );
}

#[tokio::test]
async fn test_verify_email_expired_requires_resend() {
    let f = fixture();
    let account = f.register("a@x.com", "alice").await;
    let token = f.mailer.last_token();

    f.store
        .set_verification_token(
            &account.id,
            Some(token.as_str()),
            Some(Utc::now() - Duration::milliseconds(1)),
        )
        .await
        .unwrap();

    let err = f.service.verify_email(&token).await.unwrap_err();
    assert!(matches!(err, AuthError::TokenExpired));
    assert!(err.resend_required());

    let resent = f.service.resend_verification("a@x.com").await.unwrap();
    assert!(resent.email_sent);
    let fresh = f.mailer.last_token();
    assert_ne!(fresh, token);

    assert_err(f.service.verify_email(&token).await, "INVALID_TOKEN");
    f.service.verify_email(&fresh).await.unwrap();
}

#[tokio::test]
async fn test_resend_verification_errors() {
    let f = fixture();
    assert_err(
        f.service.resend_verification("nobody@x.com").await,
        "ACCOUNT_NOT_FOUND",
    );

    f.verified("a@x.com", "alice").await;
    assert_err(
        f.service.resend_verification("a@x.com").await,
        "ALREADY_VERIFIED",
    );
}

// ============================================================================
// Login
// ============================================================================

#[tokio::test]
async fn test_login_rejections() {
    let f = fixture();
    f.register("a@x.com", "alice").await;

    assert_err(
        f.service.login("a@x.com", "wrong-password", None).await,
        "INVALID_CREDENTIALS",
    );
    assert_err(
        f.service.login("nobody@x.com", PASSWORD, None).await,
        "INVALID_CREDENTIALS",
    );
    assert_err(
        f.service.login("a@x.com", PASSWORD, None).await,
        "EMAIL_NOT_VERIFIED",
    );
}

#[tokio::test]
async fn test_login_issues_matching_pair() {
    let f = fixture();
    let account = f.verified("a@x.com", "alice").await;

    let output = f
        .service
        .login("A@x.com", PASSWORD, Some("203.0.113.7"))
        .await
        .unwrap();

    let access = f
        .codec
        .verify_access_token(&output.tokens.access_token)
        .unwrap();
    let refresh = f
        .codec
        .verify_refresh_token(&output.tokens.refresh_token)
        .unwrap();
    assert_eq!(access.account_id, account.id);
    assert_eq!(refresh.account_id, account.id);
    assert_eq!(access.role, AccountRole::Player);

    let session = f
        .store
        .find_by_token(&output.tokens.refresh_token)
        .await
        .unwrap()
        .unwrap();
    assert_eq!(session.account_id, account.id);
    assert!(session.expires_at > Utc::now() + Duration::days(6));

    let stored = AccountRepository::find_by_id(&*f.store, &account.id)
        .await
        .unwrap()
        .unwrap();
    assert!(stored.last_login_at.is_some());
    assert_eq!(stored.last_login_ip.as_deref(), Some("203.0.113.7"));
    assert!(output.account.last_login_at.is_some());
}

#[tokio::test]
async fn test_login_survives_session_store_failure() {
    let f = fixture_without_sessions();
    let account = f.verified("a@x.com", "alice").await;

    let output = f.service.login("a@x.com", PASSWORD, None).await.unwrap();
    let claims = f
        .codec
        .verify_access_token(&output.tokens.access_token)
        .unwrap();
    assert_eq!(claims.account_id, account.id);

    // Unpersisted session cannot be rotated; store errors stay opaque
    assert_err(
        f.service.refresh_token(&output.tokens.refresh_token).await,
        "INVALID_REFRESH_TOKEN",
    );
}

// ============================================================================
// Refresh rotation
// ============================================================================

#[tokio::test]
async fn test_refresh_rotates_once() {
    let f = fixture();
    f.verified("a@x.com", "alice").await;
    let login = f.service.login("a@x.com", PASSWORD, None).await.unwrap();
    let original = login.tokens.refresh_token;

    let rotated = f.service.refresh_token(&original).await.unwrap();
    assert_ne!(rotated.refresh_token, original);
    assert_eq!(f.store.session_count().await, 1);

    assert_err(
        f.service.refresh_token(&original).await,
        "INVALID_REFRESH_TOKEN",
    );

    // The replacement works, exactly once as well
    let again = f.service.refresh_token(&rotated.refresh_token).await.unwrap();
    assert_err(
        f.service.refresh_token(&rotated.refresh_token).await,
        "INVALID_REFRESH_TOKEN",
    );
    f.codec.verify_access_token(&again.access_token).unwrap();
}

#[tokio::test]
async fn test_concurrent_refresh_has_one_winner() {
    let f = fixture();
    f.verified("a@x.com", "alice").await;
    let login = f.service.login("a@x.com", PASSWORD, None).await.unwrap();
    let token = login.tokens.refresh_token;

    // Both callers pass the lookup before either swaps
    let racing = f.racing();
    let (a, b) = tokio::join!(racing.refresh_token(&token), racing.refresh_token(&token));

    assert_eq!(a.is_ok() as u8 + b.is_ok() as u8, 1);
    let winner = a.as_ref().or(b.as_ref()).unwrap();
    let loser = a.as_ref().and(b.as_ref()).err();
    assert!(matches!(loser, Some(AuthError::InvalidRefreshToken)));

    assert_eq!(f.store.session_count().await, 1);
    assert!(f.store.find_by_token(&token).await.unwrap().is_none());
    assert!(
        f.store
            .find_by_token(&winner.refresh_token)
            .await
            .unwrap()
            .is_some()
    );
}

#[tokio::test]
async fn test_refresh_unknown_token() {
    let f = fixture();
    assert_err(
        f.service.refresh_token("never-issued").await,
        "INVALID_REFRESH_TOKEN",
    );
}

#[tokio::test]
async fn test_refresh_expired_row_is_pruned() {
    let f = fixture();
    let account = f.verified("a@x.com", "alice").await;
    let now = Utc::now();

    SessionTokenRepository::create(
        &*f.store,
        NewSessionToken {
            account_id: account.id,
            token: "stale-token".to_string(),
            last_activity_at: now - Duration::days(8),
            expires_at: now - Duration::seconds(1),
        },
    )
    .await
    .unwrap();

    assert_err(
        f.service.refresh_token("stale-token").await,
        "INVALID_REFRESH_TOKEN",
    );
    assert!(f.store.find_by_token("stale-token").await.unwrap().is_none());
}

#[tokio::test]
async fn test_refresh_rejects_unsigned_row() {
    let f = fixture();
    let account = f.verified("a@x.com", "alice").await;

    SessionTokenRepository::create(
        &*f.store,
        NewSessionToken {
            account_id: account.id,
            token: "forged-token".to_string(),
            last_activity_at: Utc::now(),
            expires_at: Utc::now() + Duration::days(1),
        },
    )
    .await
    .unwrap();

    assert_err(
        f.service.refresh_token("forged-token").await,
        "INVALID_REFRESH_TOKEN",
    );
}

#[tokio::test]
async fn test_refresh_picks_up_role_change() {
    let f = fixture();
    let account = f.verified("a@x.com", "alice").await;
    let login = f.service.login("a@x.com", PASSWORD, None).await.unwrap();

    AccountRepository::update(
        &*f.store,
        &account.id,
        AccountChanges {
            role: Some(AccountRole::Manager),
            ..Default::default()
        },
    )
    .await
    .unwrap();

    let rotated = f
        .service
        .refresh_token(&login.tokens.refresh_token)
        .await
        .unwrap();
    let claims = f.codec.verify_access_token(&rotated.access_token).unwrap();
    assert_eq!(claims.role, AccountRole::Manager);
}

// ============================================================================
// Logout
// ============================================================================

#[tokio::test]
async fn test_logout_revokes_refresh_token() {
    let f = fixture();
    f.verified("a@x.com", "alice").await;
    let login = f.service.login("a@x.com", PASSWORD, None).await.unwrap();
    let token = login.tokens.refresh_token;

    f.service.logout(&token).await.unwrap();

    assert_err(f.service.refresh_token(&token).await, "INVALID_REFRESH_TOKEN");
    assert_err(f.service.logout(&token).await, "INVALID_REFRESH_TOKEN");
}

// ============================================================================
// Password reset
// ============================================================================

#[tokio::test]
async fn test_forgot_password_unknown_email() {
    let f = fixture();
    assert_err(
        f.service.forgot_password("nobody@x.com").await,
        "ACCOUNT_NOT_FOUND",
    );
    assert_eq!(f.mailer.count(), 0);
}

#[tokio::test]
async fn test_reset_password_flow() {
    let f = fixture();
    f.verified("a@x.com", "alice").await;
    let login = f.service.login("a@x.com", PASSWORD, None).await.unwrap();

    f.service.forgot_password("a@x.com").await.unwrap();
    let reset_token = f.mailer.last_token();

    f.service
        .reset_password(&reset_token, "N3w-Passphrase")
        .await
        .unwrap();

    assert_err(
        f.service.login("a@x.com", PASSWORD, None).await,
        "INVALID_CREDENTIALS",
    );
    f.service
        .login("a@x.com", "N3w-Passphrase", None)
        .await
        .unwrap();

    // Sessions from before the reset are gone
    assert_err(
        f.service.refresh_token(&login.tokens.refresh_token).await,
        "INVALID_REFRESH_TOKEN",
    );

    // Token is spent
    assert_err(
        f.service.reset_password(&reset_token, "Another-1").await,
        "INVALID_RESET_TOKEN",
    );
}

#[tokio::test]
async fn test_concurrent_reset_consumes_token_once() {
    let f = fixture();
    f.verified("a@x.com", "alice").await;
    f.service.forgot_password("a@x.com").await.unwrap();
    let reset_token = f.mailer.last_token();

    let racing = f.racing();
    let (a, b) = tokio::join!(
        racing.reset_password(&reset_token, "First-Passphrase1"),
        racing.reset_password(&reset_token, "Second-Passphrase2")
    );

    assert_eq!(a.is_ok() as u8 + b.is_ok() as u8, 1);
    let (kept, dropped, lost) = if a.is_ok() {
        ("First-Passphrase1", "Second-Passphrase2", b)
    } else {
        ("Second-Passphrase2", "First-Passphrase1", a)
    };
    assert!(matches!(lost, Err(AuthError::InvalidResetToken)));

    f.service.login("a@x.com", kept, None).await.unwrap();
    for rejected in [PASSWORD, dropped] {
        assert_err(
            f.service.login("a@x.com", rejected, None).await,
            "INVALID_CREDENTIALS",
        );
    }
}

#[tokio::test]
async fn test_reset_password_expired_token() {
    let f = fixture();
    let account = f.verified("a@x.com", "alice").await;
    f.service.forgot_password("a@x.com").await.unwrap();
    let reset_token = f.mailer.last_token();

    f.store
        .set_reset_token(
            &account.id,
            Some(reset_token.as_str()),
            Some(Utc::now() - Duration::milliseconds(1)),
        )
        .await
        .unwrap();

    assert_err(
        f.service.reset_password(&reset_token, "N3w-Passphrase").await,
        "INVALID_RESET_TOKEN",
    );
    assert_err(
        f.service.reset_password("garbage", "N3w-Passphrase").await,
        "INVALID_RESET_TOKEN",
    );
    f.service.login("a@x.com", PASSWORD, None).await.unwrap();
}

// ============================================================================
// Request authentication
// ============================================================================

#[tokio::test]
async fn test_authenticate_header() {
    let f = fixture();
    let account = f.verified("a@x.com", "alice").await;
    let login = f.service.login("a@x.com", PASSWORD, None).await.unwrap();

    let header = format!("Bearer {}", login.tokens.access_token);
    let profile = f.service.authenticate(Some(&header)).await.unwrap();
    assert_eq!(profile.id, account.id);
    assert_eq!(profile.username, "alice");

    assert_err(f.service.authenticate(None).await, "UNAUTHORIZED");
    assert_err(
        f.service.authenticate(Some(&login.tokens.access_token)).await,
        "INVALID_TOKEN",
    );

    // A refresh token is not an access token
    let header = format!("Bearer {}", login.tokens.refresh_token);
    assert_err(f.service.authenticate(Some(&header)).await, "INVALID_TOKEN");
}
