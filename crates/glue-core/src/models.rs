//! Domain models for the Glue auth platform
//!
//! These are plain data records. Durable storage and every mutation of them
//! belong to an [`AuthStore`](crate::ports::AuthStore) implementation; the
//! provider framework only builds transient candidates during a sign-in.

use crate::{error::GlueError, error::Result, ids::*};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Role assigned by stores to users created without one
pub const DEFAULT_ROLE: &str = "authenticated";

// =============================================================================
// User
// =============================================================================

/// User represents an identity record
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct User {
    pub id: UserId,
    pub role: String,
    /// Canonical de-duplication key for account linking once set
    pub email: Option<String>,
    pub email_verified_at: Option<DateTime<Utc>>,
    pub phone: Option<String>,
    pub phone_verified_at: Option<DateTime<Utc>>,
    pub confirmed_at: Option<DateTime<Utc>>,
    pub confirmation_sent_at: Option<DateTime<Utc>>,
    pub reauthenticated_at: Option<DateTime<Utc>>,
    pub last_signed_in_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub app_metadata: HashMap<String, String>,
    #[serde(default)]
    pub user_metadata: HashMap<String, String>,
    pub banned_until: Option<DateTime<Utc>>,
    pub is_anonymous: bool,
    #[serde(default)]
    pub identities: Vec<Identity>,
    #[serde(default)]
    pub mfa_factors: Vec<MfaFactor>,
    /// External accounts linked to this user
    #[serde(default)]
    pub accounts: Vec<Account>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub deleted_at: Option<DateTime<Utc>>,
}

impl User {
    /// Create an empty candidate user with a fresh id
    pub fn new() -> Self {
        let now = Utc::now();
        Self {
            id: UserId::new(),
            role: String::new(),
            email: None,
            email_verified_at: None,
            phone: None,
            phone_verified_at: None,
            confirmed_at: None,
            confirmation_sent_at: None,
            reauthenticated_at: None,
            last_signed_in_at: None,
            app_metadata: HashMap::new(),
            user_metadata: HashMap::new(),
            banned_until: None,
            is_anonymous: false,
            identities: vec![],
            mfa_factors: vec![],
            accounts: vec![],
            created_at: now,
            updated_at: now,
            deleted_at: None,
        }
    }

    pub fn is_deleted(&self) -> bool {
        self.deleted_at.is_some()
    }

    pub fn is_banned(&self, now: DateTime<Utc>) -> bool {
        self.banned_until.is_some_and(|until| until > now)
    }

    /// Email if one is set and non-empty
    pub fn email(&self) -> Option<&str> {
        self.email.as_deref().filter(|e| !e.is_empty())
    }

    /// Find the linked account for a provider
    pub fn account_for(&self, provider: &str) -> Option<&Account> {
        self.accounts.iter().find(|a| a.provider == provider)
    }
}

impl Default for User {
    fn default() -> Self {
        Self::new()
    }
}

// =============================================================================
// Account
// =============================================================================

/// Kind of credential an account holds
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AccountType {
    OAuth2,
    Oidc,
    Saml,
    Email,
    WebAuthn,
}

impl std::fmt::Display for AccountType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::OAuth2 => write!(f, "oauth2"),
            Self::Oidc => write!(f, "oidc"),
            Self::Saml => write!(f, "saml"),
            Self::Email => write!(f, "email"),
            Self::WebAuthn => write!(f, "webauthn"),
        }
    }
}

/// External account linked to a user.
///
/// `(provider, provider_account_id)` is unique. `user_id` is `None` only
/// while the account is unlinked; unlinking never deletes the record.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Account {
    pub id: AccountId,
    pub account_type: AccountType,
    pub provider: String,
    pub provider_account_id: Option<String>,
    #[serde(skip_serializing)]
    pub refresh_token: Option<String>,
    #[serde(skip_serializing)]
    pub access_token: Option<String>,
    pub expires_at: Option<DateTime<Utc>>,
    pub token_type: Option<String>,
    pub scope: Option<String>,
    #[serde(skip_serializing)]
    pub id_token: Option<String>,
    #[serde(default)]
    pub session_state: String,
    pub user_id: Option<UserId>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub deleted_at: Option<DateTime<Utc>>,
}

impl Account {
    pub fn new(account_type: AccountType, provider: impl Into<String>) -> Self {
        let now = Utc::now();
        Self {
            id: AccountId::new(),
            account_type,
            provider: provider.into(),
            provider_account_id: None,
            refresh_token: None,
            access_token: None,
            expires_at: None,
            token_type: None,
            scope: None,
            id_token: None,
            session_state: String::new(),
            user_id: None,
            created_at: now,
            updated_at: now,
            deleted_at: None,
        }
    }

    pub fn is_linked(&self) -> bool {
        self.user_id.is_some()
    }

    /// True when both accounts point at the same provider-side identity
    pub fn same_identity(&self, other: &Account) -> bool {
        self.provider == other.provider
            && self.provider_account_id.is_some()
            && self.provider_account_id == other.provider_account_id
    }
}

// =============================================================================
// Sessions & Tokens
// =============================================================================

/// CSRF token bound 1:1 to a session
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CsrfToken {
    pub id: CsrfTokenId,
    pub token: String,
    pub expires_at: DateTime<Utc>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Server-side login session
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Session {
    pub id: SessionId,
    pub session_token: String,
    pub csrf_token: CsrfToken,
    pub user_id: UserId,
    pub expires_at: DateTime<Utc>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Session {
    pub fn is_expired(&self, now: DateTime<Utc>) -> bool {
        self.expires_at <= now
    }
}

/// Single-use token for out-of-band verification, keyed by (identifier, token)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VerificationToken {
    pub identifier: String,
    pub token: String,
    pub expires_at: DateTime<Utc>,
    pub created_at: DateTime<Utc>,
}

impl VerificationToken {
    pub fn new(
        identifier: impl Into<String>,
        token: impl Into<String>,
        expires_at: DateTime<Utc>,
    ) -> Self {
        Self {
            identifier: identifier.into(),
            token: token.into(),
            expires_at,
            created_at: Utc::now(),
        }
    }

    pub fn is_expired(&self, now: DateTime<Utc>) -> bool {
        self.expires_at <= now
    }
}

// =============================================================================
// Identities & MFA
// =============================================================================

/// External identity claim attached to a user
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Identity {
    pub id: IdentityId,
    pub user_id: UserId,
    pub provider: String,
    pub email: Option<String>,
    #[serde(default)]
    pub data: HashMap<String, String>,
    pub last_signed_in_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub deleted_at: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MfaFactorType {
    #[default]
    Unspecified,
    Totp,
    Biometric,
    HardwareToken,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MfaFactorStatus {
    #[default]
    Unspecified,
    /// Verification is in progress
    Pending,
    Verified,
    /// Verification was rejected
    Unverified,
}

impl MfaFactorStatus {
    pub fn can_transition_to(self, next: MfaFactorStatus) -> bool {
        matches!(
            (self, next),
            (Self::Unspecified, Self::Pending)
                | (Self::Pending, Self::Verified)
                | (Self::Pending, Self::Unverified)
        )
    }
}

/// Multi-factor credential
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MfaFactor {
    pub id: MfaFactorId,
    pub status: MfaFactorStatus,
    pub factor_type: MfaFactorType,
    pub friendly_name: Option<String>,
    #[serde(skip_serializing)]
    pub web_authn_credential: Option<Vec<u8>>,
    pub phone_number: Option<String>,
    pub last_challenged_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub deleted_at: Option<DateTime<Utc>>,
}

impl MfaFactor {
    pub fn new(factor_type: MfaFactorType) -> Self {
        let now = Utc::now();
        Self {
            id: MfaFactorId::new(),
            status: MfaFactorStatus::Unspecified,
            factor_type,
            friendly_name: None,
            web_authn_credential: None,
            phone_number: None,
            last_challenged_at: None,
            created_at: now,
            updated_at: now,
            deleted_at: None,
        }
    }

    /// Move the factor along its status machine
    pub fn transition_to(&mut self, next: MfaFactorStatus) -> Result<()> {
        if !self.status.can_transition_to(next) {
            return Err(GlueError::invalid_state(format!(
                "MFA factor cannot move from {:?} to {:?}",
                self.status, next
            )));
        }
        self.status = next;
        self.updated_at = Utc::now();
        Ok(())
    }
}
