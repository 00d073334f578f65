use super::*;

async fn test_store(admin_emails: Vec<String>) -> AuthStore {
    let pool = sqlx::sqlite::SqlitePoolOptions::new()
        .max_connections(1)
        .connect("sqlite::memory:")
        .await
        .unwrap();
    AuthStore::new(pool, admin_emails).await.unwrap()
}

#[tokio::test]
async fn test_register_and_login() {
    let store = test_store(vec![]).await;

    let user = store
        .create_user("ana@example.com", Some("Ana"), "hunter2!")
        .await
        .unwrap();
    assert_eq!(user.email, "ana@example.com");

    let verified = store
        .verify_credentials("ana@example.com", "hunter2!")
        .await
        .unwrap();
    assert_eq!(verified.id, user.id);

    assert!(matches!(
        store.verify_credentials("ana@example.com", "wrong").await,
        Err(AuthError::InvalidCredentials)
    ));
    assert!(matches!(
        store.verify_credentials("nobody@example.com", "hunter2!").await,
        Err(AuthError::InvalidCredentials)
    ));
}

#[tokio::test]
async fn test_duplicate_email_rejected() {
    let store = test_store(vec![]).await;
    store
        .create_user("ana@example.com", None, "pw-one")
        .await
        .unwrap();

    let result = store.create_user("ana@example.com", None, "pw-two").await;
    assert!(matches!(result, Err(AuthError::EmailTaken)));
}

#[tokio::test]
async fn test_session_round_trip() {
    let store = test_store(vec!["ops@example.com".to_string()]).await;
    let user = store
        .create_user("ana@example.com", None, "hunter2!")
        .await
        .unwrap();

    let token = store.create_session(&user.id).await.unwrap();
    assert!(token.starts_with("aegis_"));

    let ctx = store.validate_session(&token).await.unwrap();
    assert_eq!(ctx.user_id, user.id);
    assert_eq!(ctx.email, "ana@example.com");
    assert!(!ctx.is_admin);

    assert!(matches!(
        store.validate_session("aegis_bogus").await,
        Err(AuthError::InvalidCredentials)
    ));
}

#[tokio::test]
async fn test_admin_allowlist() {
    let store = test_store(vec!["ops@example.com".to_string()]).await;
    let user = store
        .create_user("ops@example.com", None, "hunter2!")
        .await
        .unwrap();

    let token = store.create_session(&user.id).await.unwrap();
    let ctx = store.validate_session(&token).await.unwrap();
    assert!(ctx.is_admin);
}

#[tokio::test]
async fn test_revoke_sessions() {
    let store = test_store(vec![]).await;
    let user = store
        .create_user("ana@example.com", None, "hunter2!")
        .await
        .unwrap();

    let t1 = store.create_session(&user.id).await.unwrap();
    let t2 = store.create_session(&user.id).await.unwrap();

    assert_eq!(store.revoke_sessions(&user.id).await.unwrap(), 2);
    assert!(store.validate_session(&t1).await.is_err());
    assert!(store.validate_session(&t2).await.is_err());
}

#[tokio::test]
async fn test_reset_token_is_single_use() {
    let store = test_store(vec![]).await;
    let user = store
        .create_user("ana@example.com", None, "old-password")
        .await
        .unwrap();

    let token = store.create_reset_token(&user.id).await.unwrap();
    let user_id = store.consume_reset_token(&token).await.unwrap();
    assert_eq!(user_id, user.id);

    // Second use fails
    assert!(matches!(
        store.consume_reset_token(&token).await,
        Err(AuthError::InvalidResetToken)
    ));
}

#[tokio::test]
async fn test_new_reset_token_invalidates_previous() {
    let store = test_store(vec![]).await;
    let user = store
        .create_user("ana@example.com", None, "old-password")
        .await
        .unwrap();

    let first = store.create_reset_token(&user.id).await.unwrap();
    let second = store.create_reset_token(&user.id).await.unwrap();

    assert!(store.consume_reset_token(&first).await.is_err());
    assert!(store.consume_reset_token(&second).await.is_ok());
}

#[tokio::test]
async fn test_password_reset_flow() {
    let store = test_store(vec![]).await;
    let user = store
        .create_user("ana@example.com", None, "old-password")
        .await
        .unwrap();

    let token = store.create_reset_token(&user.id).await.unwrap();
    let user_id = store.consume_reset_token(&token).await.unwrap();
    store.set_password(&user_id, "new-password").await.unwrap();

    assert!(store
        .verify_credentials("ana@example.com", "old-password")
        .await
        .is_err());
    assert!(store
        .verify_credentials("ana@example.com", "new-password")
        .await
        .is_ok());
}

#[test]
fn test_password_hashes_are_salted() {
    let a = hash_password("same-password");
    let b = hash_password("same-password");
    assert_ne!(a, b);
    assert!(verify_password("same-password", &a));
    assert!(verify_password("same-password", &b));
    assert!(!verify_password("other", &a));
    assert!(!verify_password("same-password", "malformed-hash"));
}
