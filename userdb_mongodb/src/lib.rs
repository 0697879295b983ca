//! userdb_mongodb - MongoDB persistence for user-management libraries
//!
//! This crate stores user records, with their linked OAuth accounts embedded,
//! as one document per user and exposes the asynchronous CRUD contract
//! ([`UserDatabase`]) a user-management core calls without knowing the
//! storage engine behind it.

mod userdb;

#[cfg(test)]
mod test_utils;

pub use userdb::{
    InMemoryUserCollection, MongoUserCollection, OAuthAccount, User, UserCollection,
    UserDatabase, UserDbError, UserFilter, UserId, UserStore, UserUpdate, connect_user_collection,
    connect_user_collection_with, default_email_collation, init, mapper,
};
