use std::sync::Arc;

use userdb_mongodb::{
    MongoUserCollection, UserDatabase, UserDbError, UserId, UserStore, UserUpdate,
};

use crate::common::{cleanup, test_store, test_user, test_user_with_oauth};

#[tokio::test]
async fn test_create_then_lookup_by_every_key() {
    let Some(store) = test_store("lookup").await else {
        return;
    };
    let user = test_user_with_oauth("lookup", "google", "google-lookup");

    store
        .create(user.clone())
        .await
        .expect("Failed to create user");

    let by_id = store.get_by_id(&user.id).await.expect("get_by_id failed");
    let by_email = store
        .get_by_email(&user.email.to_uppercase())
        .await
        .expect("get_by_email failed");
    let by_oauth = store
        .get_by_oauth_account("google", "google-lookup")
        .await
        .expect("get_by_oauth_account failed");

    assert_eq!(by_id.as_ref(), Some(&user));
    assert_eq!(by_email.as_ref(), Some(&user), "Email lookup should ignore case");
    assert_eq!(by_oauth.as_ref(), Some(&user));

    cleanup(store).await;
}

#[tokio::test]
async fn test_absent_keys_return_none() {
    let Some(store) = test_store("absent").await else {
        return;
    };

    let by_id = store.get_by_id(&UserId::new()).await.expect("get_by_id failed");
    let by_email = store
        .get_by_email("nobody@example.com")
        .await
        .expect("get_by_email failed");
    let by_oauth = store
        .get_by_oauth_account("google", "nobody")
        .await
        .expect("get_by_oauth_account failed");

    assert!(by_id.is_none());
    assert!(by_email.is_none());
    assert!(by_oauth.is_none());

    cleanup(store).await;
}

/// Provider and account id must belong to the same embedded account
#[tokio::test]
async fn test_oauth_lookup_does_not_mix_accounts() {
    let Some(store) = test_store("mix").await else {
        return;
    };
    let user = test_user_with_oauth("mix", "google", "a");
    let github = test_user_with_oauth("mix-gh", "github", "b").oauth_accounts;
    let user = user.with_oauth_account(github[0].clone());

    store
        .create(user.clone())
        .await
        .expect("Failed to create user");

    let mixed = store
        .get_by_oauth_account("google", "b")
        .await
        .expect("get_by_oauth_account failed");
    assert!(mixed.is_none());

    cleanup(store).await;
}

#[tokio::test]
async fn test_duplicate_email_rejected() {
    let Some(store) = test_store("duplicate").await else {
        return;
    };
    let user = test_user("duplicate");
    store
        .create(user.clone())
        .await
        .expect("Failed to create user");

    let mut other = test_user("duplicate-other");
    other.email = user.email.to_uppercase();
    let result = store.create(other).await;

    assert!(
        matches!(result, Err(UserDbError::DuplicateKey(_))),
        "Expected DuplicateKey, got {result:?}"
    );

    cleanup(store).await;
}

#[tokio::test]
async fn test_update_and_delete() {
    let Some(store) = test_store("update").await else {
        return;
    };
    let user = test_user("update");
    store
        .create(user.clone())
        .await
        .expect("Failed to create user");

    let changes = UserUpdate {
        is_active: Some(false),
        ..Default::default()
    };
    store
        .update(user.clone(), changes)
        .await
        .expect("Failed to update user");

    let fetched = store
        .get_by_id(&user.id)
        .await
        .expect("get_by_id failed")
        .expect("User should exist");
    assert!(!fetched.is_active);
    assert_eq!(fetched.email, user.email);
    assert_eq!(fetched.hashed_password, user.hashed_password);

    store.delete(&user).await.expect("Failed to delete user");
    store
        .delete(&user)
        .await
        .expect("Repeated delete should not fail");
    assert!(
        store
            .get_by_id(&user.id)
            .await
            .expect("get_by_id failed")
            .is_none()
    );

    let result = store.update(user, UserUpdate::default()).await;
    assert!(matches!(result, Err(UserDbError::NotFound)));

    cleanup(store).await;
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn test_concurrent_create_same_email() {
    let Some(store) = test_store("race").await else {
        return;
    };
    // Provision the index first so both inserts race on it
    store.init().await.expect("Failed to init store");
    let store = Arc::new(store);

    let a = test_user("race");
    let mut b = test_user("race-other");
    b.email = a.email.clone();

    let (ra, rb) = tokio::join!(
        tokio::spawn({
            let store = Arc::clone(&store);
            async move { store.create(a).await }
        }),
        tokio::spawn({
            let store = Arc::clone(&store);
            async move { store.create(b).await }
        }),
    );
    let results = [ra.expect("task panicked"), rb.expect("task panicked")];

    assert_eq!(results.iter().filter(|r| r.is_ok()).count(), 1);
    assert_eq!(
        results
            .iter()
            .filter(|r| matches!(r, Err(UserDbError::DuplicateKey(_))))
            .count(),
        1
    );

    if let Ok(store) = Arc::try_unwrap(store) {
        cleanup(store).await;
    }
}

/// Running the startup path twice neither fails nor adds a second index
#[tokio::test]
async fn test_index_provisioning_idempotent() {
    let Some(store) = test_store("index").await else {
        return;
    };

    store.init().await.expect("First init failed");
    store.init().await.expect("Second init failed");

    // A second store over the same collection repeats the server-side creation
    let second = UserStore::new(MongoUserCollection::new(
        store.collection().collection().clone(),
    ));
    second.init().await.expect("Init from a second store failed");

    let names = store
        .collection()
        .collection()
        .list_index_names()
        .await
        .expect("Failed to list indexes");
    assert_eq!(
        names.iter().filter(|n| n.as_str() == "email_unique").count(),
        1
    );

    cleanup(store).await;
}
