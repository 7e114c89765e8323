//! Persistence port consumed by the provider framework
//!
//! Storage adapters implement [`AuthStore`]. The framework treats every call
//! as atomic and never retries; locking and transactions belong to the
//! adapter.

use crate::{
    error::StoreResult,
    ids::{AccountId, UserId},
    models::*,
};
use async_trait::async_trait;
use chrono::{DateTime, Utc};

/// Identity storage operations
#[async_trait]
pub trait AuthStore: Send + Sync {
    /// Create a user, or reuse the existing one.
    ///
    /// Must not fail on a benign duplicate: a candidate whose account
    /// `(provider, provider_account_id)` is already stored resolves to the
    /// owning user, and a candidate whose email matches an existing user is
    /// linked to that user.
    async fn create_user(&self, user: User) -> StoreResult<User>;

    /// Fetch a user by id. Fails with `NotFound` when absent or soft-deleted.
    async fn get_user(&self, id: UserId) -> StoreResult<User>;

    async fn get_user_by_email(&self, email: &str) -> StoreResult<User>;

    async fn update_user(&self, user: User) -> StoreResult<User>;

    /// Soft-delete a user
    async fn delete_user(&self, id: UserId) -> StoreResult<()>;

    async fn link_account(&self, account_id: AccountId, user_id: UserId) -> StoreResult<()>;

    /// Clear the account's owner. Fails with `NotFound` if the account is not
    /// linked to `user_id`.
    async fn unlink_account(&self, account_id: AccountId, user_id: UserId) -> StoreResult<()>;

    /// Fetch an account, linked or not. Fails with `NotFound` when absent or
    /// deleted.
    async fn get_account(&self, id: AccountId) -> StoreResult<Account>;

    async fn create_session(
        &self,
        user_id: UserId,
        expires_at: DateTime<Utc>,
    ) -> StoreResult<Session>;

    /// Fetch a live session by its token
    async fn get_session(&self, session_token: &str) -> StoreResult<Session>;

    async fn update_session(&self, session: Session) -> StoreResult<Session>;

    /// Extend the session by its original lifetime (sliding expiry)
    async fn refresh_session(&self, session: Session) -> StoreResult<Session>;

    async fn delete_session(&self, session_token: &str) -> StoreResult<()>;

    async fn create_verification_token(
        &self,
        token: VerificationToken,
    ) -> StoreResult<VerificationToken>;

    /// Consume a verification token. Succeeds at most once per
    /// `(identifier, token)`.
    async fn use_verification_token(
        &self,
        identifier: &str,
        token: &str,
    ) -> StoreResult<VerificationToken>;
}
