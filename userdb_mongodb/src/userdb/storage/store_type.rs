use async_trait::async_trait;
use tokio::sync::OnceCell;

use crate::userdb::errors::UserDbError;
use crate::userdb::mapper::{from_document, to_document};
use crate::userdb::types::{User, UserId, UserUpdate};

use super::types::{UserCollection, UserDatabase, UserFilter};

/// User persistence over a single document collection.
///
/// The unique email index is provisioned by [`UserStore::init`], which every
/// operation calls first. The index is requested from the collection at most
/// once per store; a failed attempt is retried on the next call.
pub struct UserStore<C: UserCollection> {
    collection: C,
    index_ready: OnceCell<()>,
}

impl<C: UserCollection> UserStore<C> {
    pub fn new(collection: C) -> Self {
        Self {
            collection,
            index_ready: OnceCell::new(),
        }
    }

    pub fn collection(&self) -> &C {
        &self.collection
    }

    /// Ensure the unique email index exists
    pub async fn init(&self) -> Result<(), UserDbError> {
        self.index_ready
            .get_or_try_init(|| async {
                tracing::debug!("Ensuring unique email index");
                self.collection.ensure_email_index().await.inspect_err(|e| {
                    tracing::error!(error = %e, "Email index provisioning failed");
                })
            })
            .await?;
        Ok(())
    }

    #[tracing::instrument(skip(self), fields(user_field = %filter))]
    async fn get_user_by(&self, filter: UserFilter) -> Result<Option<User>, UserDbError> {
        self.init().await?;

        let result = match self.collection.find_one(&filter).await {
            Ok(Some(document)) => from_document(&document).map(Some),
            Ok(None) => Ok(None),
            Err(e) => Err(e),
        };

        match &result {
            Ok(Some(_)) => {
                tracing::info!(found = true, "User lookup completed");
            }
            Ok(None) => {
                tracing::info!(found = false, "User lookup completed - not found");
            }
            Err(e) => {
                tracing::error!(error = %e, "User lookup failed");
            }
        }

        result
    }
}

#[async_trait]
impl<C: UserCollection> UserDatabase for UserStore<C> {
    async fn get_by_id(&self, id: &UserId) -> Result<Option<User>, UserDbError> {
        self.get_user_by(UserFilter::Id(*id)).await
    }

    async fn get_by_email(&self, email: &str) -> Result<Option<User>, UserDbError> {
        self.get_user_by(UserFilter::Email(email.to_string())).await
    }

    async fn get_by_oauth_account(
        &self,
        oauth_name: &str,
        account_id: &str,
    ) -> Result<Option<User>, UserDbError> {
        self.get_user_by(UserFilter::OAuthAccount {
            oauth_name: oauth_name.to_string(),
            account_id: account_id.to_string(),
        })
        .await
    }

    #[tracing::instrument(skip(self, user), fields(user_id = %user.id))]
    async fn create(&self, user: User) -> Result<User, UserDbError> {
        self.init().await?;

        match self.collection.insert_one(to_document(&user)).await {
            Ok(()) => {
                tracing::info!(
                    oauth_accounts = user.oauth_accounts.len(),
                    "User created"
                );
                Ok(user)
            }
            Err(e) => {
                tracing::error!(error = %e, "User creation failed");
                Err(e)
            }
        }
    }

    #[tracing::instrument(skip(self, user, changes), fields(user_id = %user.id))]
    async fn update(&self, user: User, changes: UserUpdate) -> Result<User, UserDbError> {
        self.init().await?;

        if changes.is_empty() {
            tracing::debug!("No field changes, rewriting current record");
        }
        let updated = changes.apply(user);

        let matched = self
            .collection
            .replace_one(&UserFilter::Id(updated.id), to_document(&updated))
            .await
            .inspect_err(|e| tracing::error!(error = %e, "User update failed"))?;

        if !matched {
            tracing::info!("User update skipped - not found");
            return Err(UserDbError::NotFound);
        }

        tracing::info!(
            is_active = updated.is_active,
            is_verified = updated.is_verified,
            "User updated"
        );
        Ok(updated)
    }

    #[tracing::instrument(skip(self, user), fields(user_id = %user.id))]
    async fn delete(&self, user: &User) -> Result<(), UserDbError> {
        self.init().await?;

        let deleted = self
            .collection
            .delete_one(&UserFilter::Id(user.id))
            .await
            .inspect_err(|e| tracing::error!(error = %e, "User deletion failed"))?;

        tracing::info!(deleted, "User delete completed");
        Ok(())
    }
}
