mod config;
mod memory;
mod mongo;
mod store_type;
mod types;

// Re-export only the specific items needed for the public API
pub use config::{connect_user_collection, connect_user_collection_with};
pub use mongo::default_email_collation;
pub use store_type::UserStore;
pub use types::{
    InMemoryUserCollection, MongoUserCollection, UserCollection, UserDatabase, UserFilter,
};
