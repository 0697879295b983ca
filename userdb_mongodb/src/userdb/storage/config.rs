use std::{env, sync::LazyLock};

use mongodb::{Client, bson::Document};

use crate::userdb::errors::UserDbError;

use super::types::MongoUserCollection;

/// Name of the unique index on the email field
pub(crate) const EMAIL_INDEX_NAME: &str = "email_unique";

pub(crate) static MONGODB_URI: LazyLock<String> = LazyLock::new(|| {
    env::var("MONGODB_URI").unwrap_or_else(|_| "mongodb://localhost:27017".to_string())
});

pub(crate) static MONGODB_DATABASE: LazyLock<String> =
    LazyLock::new(|| env::var("MONGODB_DATABASE").unwrap_or_else(|_| "userdb".to_string()));

/// Collection prefix from environment variable
pub(crate) static DB_COLLECTION_PREFIX: LazyLock<String> =
    LazyLock::new(|| env::var("DB_COLLECTION_PREFIX").unwrap_or_default());

/// Users collection name
pub(crate) static DB_COLLECTION_USERS: LazyLock<String> = LazyLock::new(|| {
    env::var("DB_COLLECTION_USERS")
        .unwrap_or_else(|_| format!("{}{}", *DB_COLLECTION_PREFIX, "users"))
});

/// Locale of the case-insensitive email collation
pub(crate) static EMAIL_COLLATION_LOCALE: LazyLock<String> = LazyLock::new(|| {
    env::var("EMAIL_COLLATION_LOCALE").unwrap_or_else(|_| "en".to_string())
});

/// Connect to the configured MongoDB deployment and open the users collection
pub async fn connect_user_collection() -> Result<MongoUserCollection, UserDbError> {
    connect_user_collection_with(
        MONGODB_URI.as_str(),
        MONGODB_DATABASE.as_str(),
        DB_COLLECTION_USERS.as_str(),
    )
    .await
}

pub async fn connect_user_collection_with(
    uri: &str,
    database: &str,
    collection: &str,
) -> Result<MongoUserCollection, UserDbError> {
    tracing::info!(database, collection, "Connecting to MongoDB");

    let client = Client::with_uri_str(uri).await?;
    let collection = client.database(database).collection::<Document>(collection);

    Ok(MongoUserCollection::new(collection))
}
