mod errors;
pub mod mapper;
mod storage;
mod types;

pub use errors::UserDbError;
pub use storage::{
    InMemoryUserCollection, MongoUserCollection, UserCollection, UserDatabase, UserFilter,
    UserStore, connect_user_collection, connect_user_collection_with, default_email_collation,
};
pub use types::{OAuthAccount, User, UserId, UserUpdate};

/// Connect with the environment configuration and provision the email index
pub async fn init() -> Result<UserStore<MongoUserCollection>, UserDbError> {
    let store = UserStore::new(connect_user_collection().await?);
    store.init().await?;
    Ok(store)
}
