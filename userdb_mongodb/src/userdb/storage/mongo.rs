use async_trait::async_trait;
use mongodb::bson::{Document, doc};
use mongodb::options::{Collation, CollationStrength, FindOneOptions, IndexOptions};
use mongodb::{Collection, IndexModel};

use crate::userdb::errors::{UserDbError, classify_write_error};
use crate::userdb::mapper::{
    ACCOUNT_ID_KEY, EMAIL_KEY, ID_KEY, OAUTH_ACCOUNTS_KEY, OAUTH_NAME_KEY, id_to_bson,
};

use super::config::{EMAIL_COLLATION_LOCALE, EMAIL_INDEX_NAME};
use super::types::{MongoUserCollection, UserCollection, UserFilter};

/// Case-insensitive collation used for the email index and email lookups
pub fn default_email_collation() -> Collation {
    Collation::builder()
        .locale(EMAIL_COLLATION_LOCALE.to_string())
        .strength(CollationStrength::Secondary)
        .build()
}

impl MongoUserCollection {
    pub fn new(collection: Collection<Document>) -> Self {
        Self::with_email_collation(collection, default_email_collation())
    }

    /// Use a custom collation for email uniqueness and lookups
    pub fn with_email_collation(
        collection: Collection<Document>,
        email_collation: Collation,
    ) -> Self {
        tracing::info!(
            collection = %collection.name(),
            locale = %email_collation.locale,
            "Creating MongoDB user collection"
        );
        Self {
            collection,
            email_collation,
        }
    }

    pub fn collection(&self) -> &Collection<Document> {
        &self.collection
    }

    fn filter_document(filter: &UserFilter) -> Document {
        match filter {
            UserFilter::Id(id) => doc! { ID_KEY: id_to_bson(id) },
            UserFilter::Email(email) => doc! { EMAIL_KEY: email.as_str() },
            UserFilter::OAuthAccount {
                oauth_name,
                account_id,
            } => doc! {
                OAUTH_ACCOUNTS_KEY: {
                    "$elemMatch": {
                        OAUTH_NAME_KEY: oauth_name.as_str(),
                        ACCOUNT_ID_KEY: account_id.as_str(),
                    }
                }
            },
        }
    }

    fn find_options(&self, filter: &UserFilter) -> Option<FindOneOptions> {
        match filter {
            UserFilter::Email(_) => Some(
                FindOneOptions::builder()
                    .collation(self.email_collation.clone())
                    .build(),
            ),
            _ => None,
        }
    }
}

#[async_trait]
impl UserCollection for MongoUserCollection {
    async fn ensure_email_index(&self) -> Result<(), UserDbError> {
        let options = IndexOptions::builder()
            .name(EMAIL_INDEX_NAME.to_string())
            .unique(true)
            .collation(self.email_collation.clone())
            .build();
        let index = IndexModel::builder()
            .keys(doc! { EMAIL_KEY: 1 })
            .options(options)
            .build();

        // create_index is a no-op when an identical index exists
        self.collection.create_index(index).await?;
        Ok(())
    }

    async fn find_one(&self, filter: &UserFilter) -> Result<Option<Document>, UserDbError> {
        let document = self
            .collection
            .find_one(Self::filter_document(filter))
            .with_options(self.find_options(filter))
            .await?;
        Ok(document)
    }

    async fn insert_one(&self, document: Document) -> Result<(), UserDbError> {
        self.collection
            .insert_one(document)
            .await
            .map_err(classify_write_error)?;
        Ok(())
    }

    async fn replace_one(
        &self,
        filter: &UserFilter,
        document: Document,
    ) -> Result<bool, UserDbError> {
        let result = self
            .collection
            .replace_one(Self::filter_document(filter), document)
            .await
            .map_err(classify_write_error)?;
        Ok(result.matched_count > 0)
    }

    async fn delete_one(&self, filter: &UserFilter) -> Result<bool, UserDbError> {
        let result = self
            .collection
            .delete_one(Self::filter_document(filter))
            .await?;
        Ok(result.deleted_count > 0)
    }
}
