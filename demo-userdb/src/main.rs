use dotenvy::dotenv;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use userdb_mongodb::{OAuthAccount, User, UserDatabase, UserUpdate};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    dotenv().ok();
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| {
                format!("{}=debug,userdb_mongodb=debug", env!("CARGO_CRATE_NAME")).into()
            }),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    // Connect with MONGODB_URI / MONGODB_DATABASE / DB_COLLECTION_USERS
    let store = userdb_mongodb::init().await?;

    let account = OAuthAccount::new(
        "google".to_string(),
        "demo-access-token".to_string(),
        "google-demo-account".to_string(),
        "demo@gmail.com".to_string(),
    );
    let user = User::new(
        "demo.user@example.com".to_string(),
        "$2b$12$not-a-real-hash".to_string(),
    )
    .with_oauth_account(account);

    let user = store.create(user).await?;
    tracing::info!(user_id = %user.id, "Created demo user");

    if let Some(found) = store.get_by_email("DEMO.USER@example.com").await? {
        tracing::info!(user_id = %found.id, "Found demo user by email");
    }
    if let Some(found) = store
        .get_by_oauth_account("google", "google-demo-account")
        .await?
    {
        tracing::info!(user_id = %found.id, "Found demo user by OAuth account");
    }

    let changes = UserUpdate {
        is_verified: Some(true),
        ..Default::default()
    };
    let user = store.update(user, changes).await?;
    tracing::info!(is_verified = user.is_verified, "Updated demo user");

    store.delete(&user).await?;
    tracing::info!("Deleted demo user");

    Ok(())
}
