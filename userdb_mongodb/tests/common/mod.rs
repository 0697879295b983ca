use std::sync::Once;

use userdb_mongodb::{
    MongoUserCollection, OAuthAccount, User, UserStore, connect_user_collection_with,
};

const TEST_DATABASE: &str = "userdb_mongodb_test";

/// Load `.env_test` (falling back to `.env`) once per test binary
pub fn init_test_environment() {
    static ENV_INIT: Once = Once::new();
    ENV_INIT.call_once(|| {
        if dotenvy::from_filename(".env_test").is_err() {
            dotenvy::dotenv().ok();
        }
    });
}

/// Store over a fresh, uniquely named collection, or `None` when no test
/// deployment is configured
pub async fn test_store(name: &str) -> Option<UserStore<MongoUserCollection>> {
    init_test_environment();

    let Ok(uri) = std::env::var("MONGODB_TEST_URI") else {
        println!("MONGODB_TEST_URI not set, skipping {name}");
        return None;
    };

    let collection_name = format!("users_{name}_{}", uuid::Uuid::new_v4().simple());
    let collection = connect_user_collection_with(&uri, TEST_DATABASE, &collection_name)
        .await
        .expect("Failed to connect to test MongoDB");

    Some(UserStore::new(collection))
}

/// Drop the collection behind a test store
pub async fn cleanup(store: UserStore<MongoUserCollection>) {
    if let Err(e) = store.collection().collection().drop().await {
        eprintln!("Warning: Failed to drop test collection: {e}");
    }
}

pub fn test_user(suffix: &str) -> User {
    User::new(
        format!("{suffix}-{}@example.com", uuid::Uuid::new_v4().simple()),
        format!("$2b$12$hash-{suffix}"),
    )
}

pub fn test_user_with_oauth(suffix: &str, oauth_name: &str, account_id: &str) -> User {
    let mut account = OAuthAccount::new(
        oauth_name.to_string(),
        format!("access-{suffix}"),
        account_id.to_string(),
        format!("{suffix}@{oauth_name}.example.com"),
    );
    account.expires_at = Some(1_700_000_000);

    test_user(suffix).with_oauth_account(account)
}
