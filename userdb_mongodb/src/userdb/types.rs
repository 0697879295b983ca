use serde::{Deserialize, Serialize};
use std::{fmt, str::FromStr};
use uuid::Uuid;

use super::errors::UserDbError;

/// Logical user identifier handed out to the user-management core.
///
/// The database stores it as a UUID binary under `_id`; see
/// [`crate::userdb::mapper`] for the conversion.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct UserId(Uuid);

impl UserId {
    /// Generate a fresh random identifier
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }

    pub fn as_uuid(&self) -> &Uuid {
        &self.0
    }
}

impl Default for UserId {
    fn default() -> Self {
        Self::new()
    }
}

impl From<Uuid> for UserId {
    fn from(uuid: Uuid) -> Self {
        Self(uuid)
    }
}

impl From<UserId> for Uuid {
    fn from(id: UserId) -> Self {
        id.0
    }
}

impl fmt::Display for UserId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

impl FromStr for UserId {
    type Err = UserDbError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(Self(Uuid::parse_str(s)?))
    }
}

/// A third-party identity linked to a user, embedded in the user document
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct OAuthAccount {
    pub id: Uuid,
    /// Provider name, e.g. "google"
    pub oauth_name: String,
    pub access_token: String,
    /// Token expiry as unix seconds
    pub expires_at: Option<i64>,
    pub refresh_token: Option<String>,
    /// Provider-assigned account id, unique within a provider
    pub account_id: String,
    pub account_email: String,
}

impl OAuthAccount {
    pub fn new(
        oauth_name: String,
        access_token: String,
        account_id: String,
        account_email: String,
    ) -> Self {
        Self {
            id: Uuid::new_v4(),
            oauth_name,
            access_token,
            expires_at: None,
            refresh_token: None,
            account_id,
            account_email,
        }
    }
}

/// User record as persisted by the adapter
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct User {
    pub id: UserId,
    pub email: String,
    pub hashed_password: String,
    pub is_active: bool,
    pub is_superuser: bool,
    pub is_verified: bool,
    #[serde(default)]
    pub oauth_accounts: Vec<OAuthAccount>,
}

impl User {
    /// Create an active, unverified, non-superuser account with no OAuth links
    pub fn new(email: String, hashed_password: String) -> Self {
        Self {
            id: UserId::new(),
            email,
            hashed_password,
            is_active: true,
            is_superuser: false,
            is_verified: false,
            oauth_accounts: Vec::new(),
        }
    }

    pub fn with_oauth_account(mut self, account: OAuthAccount) -> Self {
        self.oauth_accounts.push(account);
        self
    }

    /// Whether an embedded account matches both provider and account id
    pub fn has_oauth_account(&self, oauth_name: &str, account_id: &str) -> bool {
        self.oauth_accounts
            .iter()
            .any(|a| a.oauth_name == oauth_name && a.account_id == account_id)
    }
}

/// Changes applied by `UserDatabase::update`.
///
/// `None` keeps the current value. The id is never changed.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct UserUpdate {
    pub email: Option<String>,
    pub hashed_password: Option<String>,
    pub is_active: Option<bool>,
    pub is_superuser: Option<bool>,
    pub is_verified: Option<bool>,
    pub oauth_accounts: Option<Vec<OAuthAccount>>,
}

impl UserUpdate {
    pub fn is_empty(&self) -> bool {
        self == &Self::default()
    }

    /// Produce the replacement record
    pub fn apply(self, mut user: User) -> User {
        if let Some(email) = self.email {
            user.email = email;
        }
        if let Some(hashed_password) = self.hashed_password {
            user.hashed_password = hashed_password;
        }
        if let Some(is_active) = self.is_active {
            user.is_active = is_active;
        }
        if let Some(is_superuser) = self.is_superuser {
            user.is_superuser = is_superuser;
        }
        if let Some(is_verified) = self.is_verified {
            user.is_verified = is_verified;
        }
        if let Some(oauth_accounts) = self.oauth_accounts {
            user.oauth_accounts = oauth_accounts;
        }
        user
    }
}
