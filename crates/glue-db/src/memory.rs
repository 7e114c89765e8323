//! In-memory implementation of the persistence port
//!
//! Suitable for tests and single-process deployments. Every operation takes
//! the store lock once, so each call is atomic with respect to the others.

use async_trait::async_trait;
use base64::{engine::general_purpose::URL_SAFE_NO_PAD, Engine};
use chrono::{DateTime, Duration, Utc};
use rand::RngCore;
use std::collections::HashMap;
use tokio::sync::RwLock;
use tracing::{debug, info, instrument};

use glue_core::{
    Account, AccountId, AuthStore, CsrfToken, CsrfTokenId, Session, SessionId, StoreError,
    StoreResult, User, UserId, VerificationToken, DEFAULT_ROLE,
};

/// Bytes of entropy in generated session and CSRF tokens
const TOKEN_BYTES: usize = 32;

struct StoredSession {
    session: Session,
    /// Lifetime the session was issued with, reapplied on refresh
    lifetime: Duration,
}

#[derive(Default)]
struct Inner {
    users: HashMap<UserId, User>,
    accounts: HashMap<AccountId, Account>,
    sessions: HashMap<String, StoredSession>,
    verification_tokens: HashMap<(String, String), VerificationToken>,
}

impl Inner {
    fn live_user(&self, id: UserId) -> StoreResult<&User> {
        self.users
            .get(&id)
            .filter(|u| !u.is_deleted())
            .ok_or_else(|| StoreError::not_found("user", id.to_string()))
    }

    fn user_by_email(&self, email: &str) -> Option<&User> {
        self.users.values().find(|u| {
            !u.is_deleted() && u.email().is_some_and(|e| e.eq_ignore_ascii_case(email))
        })
    }

    fn account_matching(&self, candidate: &Account) -> Option<&Account> {
        self.accounts
            .values()
            .find(|a| a.deleted_at.is_none() && a.same_identity(candidate))
    }

    /// User record with its linked accounts attached
    fn hydrate(&self, user: &User) -> User {
        let mut user = user.clone();
        let mut accounts: Vec<Account> = self
            .accounts
            .values()
            .filter(|a| a.deleted_at.is_none() && a.user_id == Some(user.id))
            .cloned()
            .collect();
        accounts.sort_by_key(|a| a.created_at);
        user.accounts = accounts;
        user
    }

    /// Resolve which stored user a candidate belongs to, if any
    fn owner_of(&self, candidate: &User) -> Option<UserId> {
        let by_account = candidate
            .accounts
            .iter()
            .filter_map(|a| self.account_matching(a))
            .filter_map(|a| a.user_id)
            .find(|id| self.live_user(*id).is_ok());

        by_account.or_else(|| {
            candidate
                .email()
                .and_then(|email| self.user_by_email(email))
                .map(|u| u.id)
        })
    }
}

/// Persistence port backed by process memory
#[derive(Default)]
pub struct MemoryAuthStore {
    inner: RwLock<Inner>,
}

impl MemoryAuthStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of live (non-deleted) users
    pub async fn user_count(&self) -> usize {
        self.inner
            .read()
            .await
            .users
            .values()
            .filter(|u| !u.is_deleted())
            .count()
    }

    /// Drop sessions and verification tokens that expired before `now`.
    /// Returns how many entries were removed.
    pub async fn purge_expired(&self, now: DateTime<Utc>) -> usize {
        let mut inner = self.inner.write().await;
        let before = inner.sessions.len() + inner.verification_tokens.len();

        inner.sessions.retain(|_, s| !s.session.is_expired(now));
        inner.verification_tokens.retain(|_, t| !t.is_expired(now));

        let purged = before - inner.sessions.len() - inner.verification_tokens.len();
        if purged > 0 {
            debug!("Purged {} expired sessions and verification tokens", purged);
        }
        purged
    }
}

/// Generate an opaque URL-safe random token
pub fn generate_token() -> String {
    let mut bytes = [0u8; TOKEN_BYTES];
    rand::thread_rng().fill_bytes(&mut bytes);
    URL_SAFE_NO_PAD.encode(bytes)
}

#[async_trait]
impl AuthStore for MemoryAuthStore {
    #[instrument(skip(self, candidate), fields(candidate_id = %candidate.id))]
    async fn create_user(&self, mut candidate: User) -> StoreResult<User> {
        let now = Utc::now();
        let mut inner = self.inner.write().await;

        let user_id = match inner.owner_of(&candidate) {
            Some(existing_id) => {
                debug!("Reusing existing user {}", existing_id);
                let user = inner
                    .users
                    .get_mut(&existing_id)
                    .ok_or_else(|| StoreError::not_found("user", existing_id.to_string()))?;

                if user.email().is_none() {
                    user.email = candidate.email.clone();
                }
                if user.email_verified_at.is_none() {
                    user.email_verified_at = candidate.email_verified_at;
                }
                user.user_metadata.extend(candidate.user_metadata.drain());
                user.last_signed_in_at = candidate.last_signed_in_at.or(Some(now));
                user.updated_at = now;
                existing_id
            }
            None => {
                let id = UserId::new();
                let mut user = candidate.clone();
                user.id = id;
                if user.role.is_empty() {
                    user.role = DEFAULT_ROLE.to_string();
                }
                user.accounts = vec![];
                user.created_at = now;
                user.updated_at = now;
                user.deleted_at = None;
                if user.last_signed_in_at.is_none() {
                    user.last_signed_in_at = Some(now);
                }
                inner.users.insert(id, user);
                info!("Created user {}", id);
                id
            }
        };

        for account in std::mem::take(&mut candidate.accounts) {
            let existing = inner.account_matching(&account).map(|a| a.id);
            match existing.and_then(|id| inner.accounts.get_mut(&id)) {
                Some(stored) => {
                    stored.access_token = account.access_token;
                    stored.refresh_token = account.refresh_token;
                    stored.expires_at = account.expires_at;
                    stored.token_type = account.token_type;
                    stored.scope = account.scope;
                    stored.id_token = account.id_token;
                    stored.session_state = account.session_state;
                    stored.user_id = Some(user_id);
                    stored.updated_at = now;
                }
                None => {
                    let mut account = account;
                    account.user_id = Some(user_id);
                    account.created_at = now;
                    account.updated_at = now;
                    account.deleted_at = None;
                    debug!("Created {} account {}", account.provider, account.id);
                    inner.accounts.insert(account.id, account);
                }
            }
        }

        let user = inner.live_user(user_id)?;
        Ok(inner.hydrate(user))
    }

    #[instrument(skip(self))]
    async fn get_user(&self, id: UserId) -> StoreResult<User> {
        let inner = self.inner.read().await;
        let user = inner.live_user(id)?;
        Ok(inner.hydrate(user))
    }

    #[instrument(skip(self))]
    async fn get_user_by_email(&self, email: &str) -> StoreResult<User> {
        let inner = self.inner.read().await;
        let user = inner
            .user_by_email(email)
            .ok_or_else(|| StoreError::not_found("user", email))?;
        Ok(inner.hydrate(user))
    }

    #[instrument(skip(self, user), fields(user_id = %user.id))]
    async fn update_user(&self, mut user: User) -> StoreResult<User> {
        let mut inner = self.inner.write().await;
        let created_at = inner.live_user(user.id)?.created_at;

        if let Some(email) = user.email() {
            if let Some(other) = inner.user_by_email(email) {
                if other.id != user.id {
                    return Err(StoreError::conflict(format!(
                        "email {} already belongs to another user",
                        email
                    )));
                }
            }
        }

        user.created_at = created_at;
        user.updated_at = Utc::now();
        user.deleted_at = None;
        user.accounts = vec![];
        let id = user.id;
        inner.users.insert(id, user);

        let user = inner.live_user(id)?;
        Ok(inner.hydrate(user))
    }

    #[instrument(skip(self))]
    async fn delete_user(&self, id: UserId) -> StoreResult<()> {
        let mut inner = self.inner.write().await;
        inner.live_user(id)?;

        if let Some(user) = inner.users.get_mut(&id) {
            user.deleted_at = Some(Utc::now());
        }
        inner.sessions.retain(|_, s| s.session.user_id != id);

        info!("Soft-deleted user {}", id);
        Ok(())
    }

    #[instrument(skip(self))]
    async fn link_account(&self, account_id: AccountId, user_id: UserId) -> StoreResult<()> {
        let mut inner = self.inner.write().await;
        inner.live_user(user_id)?;

        let account = inner
            .accounts
            .get_mut(&account_id)
            .filter(|a| a.deleted_at.is_none())
            .ok_or_else(|| StoreError::not_found("account", account_id.to_string()))?;

        match account.user_id {
            Some(owner) if owner != user_id => Err(StoreError::conflict(format!(
                "account {} is linked to another user",
                account_id
            ))),
            _ => {
                account.user_id = Some(user_id);
                account.updated_at = Utc::now();
                Ok(())
            }
        }
    }

    #[instrument(skip(self))]
    async fn unlink_account(&self, account_id: AccountId, user_id: UserId) -> StoreResult<()> {
        let mut inner = self.inner.write().await;
        let account = inner
            .accounts
            .get_mut(&account_id)
            .filter(|a| a.user_id == Some(user_id))
            .ok_or_else(|| StoreError::not_found("account", account_id.to_string()))?;

        account.user_id = None;
        account.updated_at = Utc::now();
        Ok(())
    }

    #[instrument(skip(self))]
    #[instrument(skip(self))]
    async fn get_account(&self, id: AccountId) -> StoreResult<Account> {
        self.inner
            .read()
            .await
            .accounts
            .get(&id)
            .filter(|a| a.deleted_at.is_none())
            .cloned()
            .ok_or_else(|| StoreError::not_found("account", id.to_string()))
    }

    async fn create_session(
        &self,
        user_id: UserId,
        expires_at: DateTime<Utc>,
    ) -> StoreResult<Session> {
        let now = Utc::now();
        let mut inner = self.inner.write().await;
        inner.live_user(user_id)?;

        let session = Session {
            id: SessionId::new(),
            session_token: generate_token(),
            csrf_token: CsrfToken {
                id: CsrfTokenId::new(),
                token: generate_token(),
                expires_at,
                created_at: now,
                updated_at: now,
            },
            user_id,
            expires_at,
            created_at: now,
            updated_at: now,
        };

        inner.sessions.insert(
            session.session_token.clone(),
            StoredSession {
                session: session.clone(),
                lifetime: expires_at - now,
            },
        );

        debug!("Created session {} for user {}", session.id, user_id);
        Ok(session)
    }

    #[instrument(skip(self, session_token))]
    async fn get_session(&self, session_token: &str) -> StoreResult<Session> {
        let now = Utc::now();
        let mut inner = self.inner.write().await;

        let expired = match inner.sessions.get(session_token) {
            Some(stored) => stored.session.is_expired(now),
            None => return Err(StoreError::not_found("session", "<token>")),
        };
        if expired {
            inner.sessions.remove(session_token);
            return Err(StoreError::not_found("session", "<token>"));
        }

        inner
            .sessions
            .get(session_token)
            .map(|s| s.session.clone())
            .ok_or_else(|| StoreError::not_found("session", "<token>"))
    }

    #[instrument(skip(self, session), fields(session_id = %session.id))]
    async fn update_session(&self, mut session: Session) -> StoreResult<Session> {
        let mut inner = self.inner.write().await;
        inner.live_user(session.user_id)?;

        let stored = inner
            .sessions
            .get_mut(&session.session_token)
            .ok_or_else(|| StoreError::not_found("session", session.id.to_string()))?;

        session.created_at = stored.session.created_at;
        session.updated_at = Utc::now();
        stored.session = session.clone();
        Ok(session)
    }

    #[instrument(skip(self, session), fields(session_id = %session.id))]
    async fn refresh_session(&self, session: Session) -> StoreResult<Session> {
        let now = Utc::now();
        let mut inner = self.inner.write().await;

        let stored = inner
            .sessions
            .get_mut(&session.session_token)
            .filter(|s| !s.session.is_expired(now))
            .ok_or_else(|| StoreError::not_found("session", session.id.to_string()))?;

        let expires_at = now + stored.lifetime;
        stored.session.expires_at = expires_at;
        stored.session.updated_at = now;
        stored.session.csrf_token.expires_at = expires_at;
        stored.session.csrf_token.updated_at = now;

        debug!("Refreshed session {} until {}", stored.session.id, expires_at);
        Ok(stored.session.clone())
    }

    #[instrument(skip(self, session_token))]
    async fn delete_session(&self, session_token: &str) -> StoreResult<()> {
        self.inner
            .write()
            .await
            .sessions
            .remove(session_token)
            .map(|_| ())
            .ok_or_else(|| StoreError::not_found("session", "<token>"))
    }

    #[instrument(skip(self, token), fields(identifier = %token.identifier))]
    async fn create_verification_token(
        &self,
        token: VerificationToken,
    ) -> StoreResult<VerificationToken> {
        let mut inner = self.inner.write().await;
        let key = (token.identifier.clone(), token.token.clone());

        if inner.verification_tokens.contains_key(&key) {
            return Err(StoreError::conflict(format!(
                "verification token for {} already exists",
                token.identifier
            )));
        }

        inner.verification_tokens.insert(key, token.clone());
        Ok(token)
    }

    #[instrument(skip(self, token))]
    async fn use_verification_token(
        &self,
        identifier: &str,
        token: &str,
    ) -> StoreResult<VerificationToken> {
        let key = (identifier.to_string(), token.to_string());
        let consumed = self
            .inner
            .write()
            .await
            .verification_tokens
            .remove(&key)
            .ok_or_else(|| StoreError::not_found("verification_token", identifier))?;

        if consumed.is_expired(Utc::now()) {
            return Err(StoreError::not_found("verification_token", identifier));
        }

        Ok(consumed)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use glue_core::AccountType;

    fn github_candidate(account_id: &str, email: Option<&str>) -> User {
        let mut user = User::new();
        user.email = email.map(String::from);
        let mut account = Account::new(AccountType::OAuth2, "github");
        account.provider_account_id = Some(account_id.to_string());
        account.access_token = Some(format!("token-{}", account_id));
        user.accounts.push(account);
        user
    }

    #[tokio::test]
    async fn test_create_user_assigns_defaults() {
        let store = MemoryAuthStore::new();
        let candidate = github_candidate("1", Some("octo@example.com"));
        let candidate_id = candidate.id;

        let user = store.create_user(candidate).await.unwrap();
        assert_ne!(user.id, candidate_id);
        assert_eq!(user.role, DEFAULT_ROLE);
        assert!(user.last_signed_in_at.is_some());
        assert_eq!(user.accounts.len(), 1);
        assert_eq!(user.accounts[0].user_id, Some(user.id));
    }

    #[tokio::test]
    async fn test_create_user_is_idempotent_per_provider_account() {
        let store = MemoryAuthStore::new();

        let first = store
            .create_user(github_candidate("42", Some("octo@example.com")))
            .await
            .unwrap();

        let mut again = github_candidate("42", Some("octo@example.com"));
        again.accounts[0].access_token = Some("fresh".to_string());
        let second = store.create_user(again).await.unwrap();

        assert_eq!(first.id, second.id);
        assert_eq!(store.user_count().await, 1);
        assert_eq!(second.accounts.len(), 1);
        assert_eq!(second.accounts[0].access_token.as_deref(), Some("fresh"));
    }

    #[tokio::test]
    async fn test_create_user_links_by_email() {
        let store = MemoryAuthStore::new();
        let first = store
            .create_user(github_candidate("1", Some("octo@example.com")))
            .await
            .unwrap();

        let mut other = github_candidate("2", Some("OCTO@example.com"));
        other.accounts[0].provider = "gitlab".to_string();
        let second = store.create_user(other).await.unwrap();

        assert_eq!(first.id, second.id);
        assert_eq!(second.accounts.len(), 2);
    }

    #[tokio::test]
    async fn test_get_user_not_found() {
        let store = MemoryAuthStore::new();
        let err = store.get_user(UserId::new()).await.unwrap_err();
        assert!(err.is_not_found());
    }

    #[tokio::test]
    async fn test_delete_user_is_soft_and_drops_sessions() {
        let store = MemoryAuthStore::new();
        let user = store
            .create_user(github_candidate("1", Some("octo@example.com")))
            .await
            .unwrap();
        let session = store
            .create_session(user.id, Utc::now() + Duration::hours(1))
            .await
            .unwrap();

        store.delete_user(user.id).await.unwrap();

        assert!(store.get_user(user.id).await.unwrap_err().is_not_found());
        assert!(store
            .get_session(&session.session_token)
            .await
            .unwrap_err()
            .is_not_found());
        assert!(store
            .create_session(user.id, Utc::now() + Duration::hours(1))
            .await
            .is_err());

        // Soft delete keeps the account record and its owner reference
        let account = store.get_account(user.accounts[0].id).await.unwrap();
        assert_eq!(account.user_id, Some(user.id));
    }

    #[tokio::test]
    async fn test_update_user_rejects_duplicate_email() {
        let store = MemoryAuthStore::new();
        store
            .create_user(github_candidate("1", Some("a@example.com")))
            .await
            .unwrap();
        let mut b = store
            .create_user(github_candidate("2", Some("b@example.com")))
            .await
            .unwrap();

        b.email = Some("a@example.com".to_string());
        let err = store.update_user(b).await.unwrap_err();
        assert!(matches!(err, StoreError::Conflict { .. }));
    }

    #[tokio::test]
    async fn test_unlink_and_relink_account() {
        let store = MemoryAuthStore::new();
        let user = store
            .create_user(github_candidate("1", Some("octo@example.com")))
            .await
            .unwrap();
        let account_id = user.accounts[0].id;

        store.unlink_account(account_id, user.id).await.unwrap();
        let account = store.get_account(account_id).await.unwrap();
        assert!(!account.is_linked());
        assert!(store.get_user(user.id).await.unwrap().accounts.is_empty());

        // Unlinking twice fails: the account no longer belongs to the user
        assert!(store.unlink_account(account_id, user.id).await.is_err());

        store.link_account(account_id, user.id).await.unwrap();
        assert_eq!(store.get_user(user.id).await.unwrap().accounts.len(), 1);
    }

    #[tokio::test]
    async fn test_link_account_owned_by_other_user_conflicts() {
        let store = MemoryAuthStore::new();
        let a = store
            .create_user(github_candidate("1", Some("a@example.com")))
            .await
            .unwrap();
        let b = store
            .create_user(github_candidate("2", Some("b@example.com")))
            .await
            .unwrap();

        let err = store.link_account(a.accounts[0].id, b.id).await.unwrap_err();
        assert!(matches!(err, StoreError::Conflict { .. }));
    }

    #[tokio::test]
    async fn test_session_lifecycle() {
        let store = MemoryAuthStore::new();
        let user = store
            .create_user(github_candidate("1", Some("octo@example.com")))
            .await
            .unwrap();

        let session = store
            .create_session(user.id, Utc::now() + Duration::hours(1))
            .await
            .unwrap();
        assert_ne!(session.session_token, session.csrf_token.token);

        let fetched = store.get_session(&session.session_token).await.unwrap();
        assert_eq!(fetched.id, session.id);

        let refreshed = store.refresh_session(fetched).await.unwrap();
        assert!(refreshed.expires_at >= session.expires_at);
        assert_eq!(refreshed.csrf_token.expires_at, refreshed.expires_at);

        store.delete_session(&session.session_token).await.unwrap();
        assert!(store.get_session(&session.session_token).await.is_err());
        assert!(store.delete_session(&session.session_token).await.is_err());
    }

    #[tokio::test]
    async fn test_expired_session_not_returned() {
        let store = MemoryAuthStore::new();
        let user = store
            .create_user(github_candidate("1", Some("octo@example.com")))
            .await
            .unwrap();
        let session = store
            .create_session(user.id, Utc::now() - Duration::seconds(1))
            .await
            .unwrap();

        assert!(store
            .get_session(&session.session_token)
            .await
            .unwrap_err()
            .is_not_found());
    }

    #[tokio::test]
    async fn test_verification_token_used_once() {
        let store = MemoryAuthStore::new();
        let token = VerificationToken::new(
            "octo@example.com",
            generate_token(),
            Utc::now() + Duration::minutes(10),
        );
        store.create_verification_token(token.clone()).await.unwrap();

        let used = store
            .use_verification_token(&token.identifier, &token.token)
            .await
            .unwrap();
        assert_eq!(used.token, token.token);

        let second = store
            .use_verification_token(&token.identifier, &token.token)
            .await;
        assert!(second.unwrap_err().is_not_found());
    }

    #[tokio::test]
    async fn test_verification_token_duplicate_and_expired() {
        let store = MemoryAuthStore::new();
        let expired = VerificationToken::new("id", "tok", Utc::now() - Duration::minutes(1));
        store.create_verification_token(expired.clone()).await.unwrap();

        let dup = store.create_verification_token(expired).await.unwrap_err();
        assert!(matches!(dup, StoreError::Conflict { .. }));

        assert!(store.use_verification_token("id", "tok").await.is_err());
    }

    #[tokio::test]
    async fn test_concurrent_verification_token_use() {
        let store = std::sync::Arc::new(MemoryAuthStore::new());
        store
            .create_verification_token(VerificationToken::new(
                "id",
                "tok",
                Utc::now() + Duration::minutes(10),
            ))
            .await
            .unwrap();

        let handles: Vec<_> = (0..8)
            .map(|_| {
                let store = store.clone();
                tokio::spawn(async move { store.use_verification_token("id", "tok").await })
            })
            .collect();

        let mut successes = 0;
        for handle in handles {
            if handle.await.unwrap().is_ok() {
                successes += 1;
            }
        }
        assert_eq!(successes, 1);
    }

    #[tokio::test]
    async fn test_get_account_not_found() {
        let store = MemoryAuthStore::new();
        let err = store.get_account(AccountId::new()).await.unwrap_err();
        assert!(err.is_not_found());
    }

    #[tokio::test]
    async fn test_purge_expired_keeps_live_entries() {
        let store = MemoryAuthStore::new();
        let user = store
            .create_user(github_candidate("1", Some("octo@example.com")))
            .await
            .unwrap();

        let stale = store
            .create_session(user.id, Utc::now() - Duration::minutes(5))
            .await
            .unwrap();
        let live = store
            .create_session(user.id, Utc::now() + Duration::hours(1))
            .await
            .unwrap();
        store
            .create_verification_token(VerificationToken::new(
                "old",
                "tok",
                Utc::now() - Duration::minutes(5),
            ))
            .await
            .unwrap();
        store
            .create_verification_token(VerificationToken::new(
                "new",
                "tok",
                Utc::now() + Duration::minutes(10),
            ))
            .await
            .unwrap();

        assert_eq!(store.purge_expired(Utc::now()).await, 2);
        assert_eq!(store.purge_expired(Utc::now()).await, 0);

        assert!(store.delete_session(&stale.session_token).await.is_err());
        assert!(store.get_session(&live.session_token).await.is_ok());
        assert!(store.use_verification_token("new", "tok").await.is_ok());

        // The stale token is gone, so it can be issued again
        store
            .create_verification_token(VerificationToken::new(
                "old",
                "tok",
                Utc::now() + Duration::minutes(10),
            ))
            .await
            .unwrap();
    }
}
