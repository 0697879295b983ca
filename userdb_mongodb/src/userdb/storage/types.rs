use async_trait::async_trait;
use mongodb::bson::Document;
use mongodb::{Collection, options::Collation};
use std::fmt;
use tokio::sync::Mutex;

use crate::userdb::errors::UserDbError;
use crate::userdb::types::{User, UserId, UserUpdate};

/// Selects at most one user document
#[derive(Debug, Clone, PartialEq)]
pub enum UserFilter {
    Id(UserId),
    /// Matched case-insensitively
    Email(String),
    /// Matched against a single embedded account carrying both values
    OAuthAccount {
        oauth_name: String,
        account_id: String,
    },
}

impl fmt::Display for UserFilter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            UserFilter::Id(id) => write!(f, "id={id}"),
            UserFilter::Email(email) => write!(f, "email={email}"),
            UserFilter::OAuthAccount {
                oauth_name,
                account_id,
            } => write!(f, "oauth={oauth_name}:{account_id}"),
        }
    }
}

pub struct MongoUserCollection {
    pub(super) collection: Collection<Document>,
    pub(super) email_collation: Collation,
}

/// Process-local collection with the same uniqueness rules as MongoDB
#[derive(Default)]
pub struct InMemoryUserCollection {
    pub(super) state: Mutex<MemoryState>,
}

#[derive(Default)]
pub(super) struct MemoryState {
    pub(super) documents: Vec<Document>,
    pub(super) email_index: bool,
    pub(super) index_requests: usize,
}

/// Document primitives the store needs from a backing engine.
///
/// Each call must be atomic for the single document it touches.
#[async_trait]
pub trait UserCollection: Send + Sync + 'static {
    /// Create the unique email index. Must succeed when it already exists.
    async fn ensure_email_index(&self) -> Result<(), UserDbError>;

    async fn find_one(&self, filter: &UserFilter) -> Result<Option<Document>, UserDbError>;

    /// Fails with `DuplicateKey` on an `_id` or (indexed) email conflict.
    async fn insert_one(&self, document: Document) -> Result<(), UserDbError>;

    /// Returns whether a document matched the filter.
    async fn replace_one(
        &self,
        filter: &UserFilter,
        document: Document,
    ) -> Result<bool, UserDbError>;

    /// Returns whether a document was removed.
    async fn delete_one(&self, filter: &UserFilter) -> Result<bool, UserDbError>;
}

/// CRUD contract consumed by the user-management core
#[async_trait]
pub trait UserDatabase: Send + Sync {
    async fn get_by_id(&self, id: &UserId) -> Result<Option<User>, UserDbError>;

    async fn get_by_email(&self, email: &str) -> Result<Option<User>, UserDbError>;

    async fn get_by_oauth_account(
        &self,
        oauth_name: &str,
        account_id: &str,
    ) -> Result<Option<User>, UserDbError>;

    async fn create(&self, user: User) -> Result<User, UserDbError>;

    async fn update(&self, user: User, changes: UserUpdate) -> Result<User, UserDbError>;

    async fn delete(&self, user: &User) -> Result<(), UserDbError>;
}
