//! Shared helpers for unit tests across the crate

use crate::userdb::{OAuthAccount, User};

/// Helper function to create a test user with a unique email
pub fn create_test_user(suffix: &str) -> User {
    let user = User::new(String::new(), format!("$2b$12$hash-{suffix}"));
    let email = format!("user-{suffix}-{}@example.com", user.id);
    User { email, ..user }
}

/// Test user with one linked OAuth account
pub fn create_test_user_with_oauth(suffix: &str, oauth_name: &str, account_id: &str) -> User {
    let mut account = OAuthAccount::new(
        oauth_name.to_string(),
        format!("access-{suffix}"),
        account_id.to_string(),
        format!("{suffix}@{oauth_name}.example.com"),
    );
    account.expires_at = Some(1_700_000_000);
    account.refresh_token = Some(format!("refresh-{suffix}"));

    create_test_user(suffix).with_oauth_account(account)
}
