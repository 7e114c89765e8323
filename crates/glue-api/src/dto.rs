//! Data Transfer Objects for API responses

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

use glue_core::{Account, AccountType, ProviderType, Session, User};

// ============================================================================
// Generic Response Types
// ============================================================================

#[derive(Debug, Serialize, Deserialize)]
pub struct ApiResponse<T> {
    pub success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<T>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<ApiError>,
}

impl<T> ApiResponse<T> {
    pub fn ok(data: T) -> Self {
        Self {
            success: true,
            data: Some(data),
            error: None,
        }
    }
}

impl ApiResponse<()> {
    pub fn error(code: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            success: false,
            data: None,
            error: Some(ApiError {
                code: code.into(),
                message: message.into(),
            }),
        }
    }
}

#[derive(Debug, Serialize, Deserialize)]
pub struct ApiError {
    pub code: String,
    pub message: String,
}

// ============================================================================
// Provider DTOs
// ============================================================================

#[derive(Debug, Serialize, Deserialize)]
pub struct ProviderSummary {
    pub id: String,
    pub name: String,
    pub provider_type: ProviderType,
}

// ============================================================================
// Sign-in DTOs
// ============================================================================

#[derive(Debug, Serialize, Deserialize)]
pub struct AccountResponse {
    pub id: String,
    pub account_type: AccountType,
    pub provider: String,
    pub provider_account_id: Option<String>,
    pub scope: Option<String>,
}

impl From<&Account> for AccountResponse {
    fn from(account: &Account) -> Self {
        Self {
            id: account.id.to_prefixed(),
            account_type: account.account_type,
            provider: account.provider.clone(),
            provider_account_id: account.provider_account_id.clone(),
            scope: account.scope.clone(),
        }
    }
}

#[derive(Debug, Serialize, Deserialize)]
pub struct UserResponse {
    pub id: String,
    pub role: String,
    pub email: Option<String>,
    pub email_verified_at: Option<DateTime<Utc>>,
    pub user_metadata: HashMap<String, String>,
    pub accounts: Vec<AccountResponse>,
    pub created_at: DateTime<Utc>,
    pub last_signed_in_at: Option<DateTime<Utc>>,
}

impl From<&User> for UserResponse {
    fn from(user: &User) -> Self {
        Self {
            id: user.id.to_prefixed(),
            role: user.role.clone(),
            email: user.email.clone(),
            email_verified_at: user.email_verified_at,
            user_metadata: user.user_metadata.clone(),
            accounts: user.accounts.iter().map(AccountResponse::from).collect(),
            created_at: user.created_at,
            last_signed_in_at: user.last_signed_in_at,
        }
    }
}

#[derive(Debug, Serialize, Deserialize)]
pub struct SignInResponse {
    pub user: UserResponse,
    pub session_token: String,
    pub csrf_token: String,
    pub expires_at: DateTime<Utc>,
}

impl SignInResponse {
    pub fn new(user: &User, session: &Session) -> Self {
        Self {
            user: user.into(),
            session_token: session.session_token.clone(),
            csrf_token: session.csrf_token.token.clone(),
            expires_at: session.expires_at,
        }
    }
}
