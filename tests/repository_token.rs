use linkup::domain::repositories::{TokenRepository, UserRepository};
use linkup::error::AppError;
use linkup::infrastructure::persistence::{PgTokenRepository, PgUserRepository};
use sqlx::PgPool;
use std::sync::Arc;

async fn setup(pool: PgPool) -> (PgTokenRepository, i64) {
    let pool = Arc::new(pool);
    let user = PgUserRepository::new(pool.clone())
        .create("owner@example.com")
        .await
        .unwrap();
    (PgTokenRepository::new(pool), user.id)
}

#[sqlx::test]
async fn test_create_token(pool: PgPool) {
    let (repo, user_id) = setup(pool).await;

    let token = repo.create_token(user_id, "laptop", "hash123").await.unwrap();

    assert_eq!(token.user_id, user_id);
    assert_eq!(token.name, "laptop");
    assert_eq!(token.token_hash, "hash123");
    assert!(token.revoked_at.is_none());
    assert!(token.last_used_at.is_none());
}

#[sqlx::test]
async fn test_find_owner(pool: PgPool) {
    let (repo, user_id) = setup(pool).await;
    repo.create_token(user_id, "laptop", "validhash").await.unwrap();

    assert_eq!(repo.find_owner("validhash").await.unwrap(), Some(user_id));
    assert_eq!(repo.find_owner("nonexistent").await.unwrap(), None);
}

#[sqlx::test]
async fn test_revoked_token_has_no_owner(pool: PgPool) {
    let (repo, user_id) = setup(pool).await;
    let token = repo.create_token(user_id, "old", "oldhash").await.unwrap();

    repo.revoke_token(token.id).await.unwrap();

    assert_eq!(repo.find_owner("oldhash").await.unwrap(), None);
    let revoked = repo.find_by_id(token.id).await.unwrap().unwrap();
    assert!(revoked.revoked_at.is_some());
}

#[sqlx::test]
async fn test_update_last_used(pool: PgPool) {
    let (repo, user_id) = setup(pool).await;
    repo.create_token(user_id, "ci", "cihash").await.unwrap();

    repo.update_last_used("cihash").await.unwrap();

    let token = repo.find_by_name("ci").await.unwrap().unwrap();
    assert!(token.last_used_at.is_some());
}

#[sqlx::test]
async fn test_duplicate_name_is_conflict(pool: PgPool) {
    let (repo, user_id) = setup(pool).await;
    repo.create_token(user_id, "dup", "hash-a").await.unwrap();

    let result = repo.create_token(user_id, "dup", "hash-b").await;

    assert!(matches!(result, Err(AppError::Conflict { .. })));
}

#[sqlx::test]
async fn test_list_tokens(pool: PgPool) {
    let (repo, user_id) = setup(pool).await;
    repo.create_token(user_id, "one", "h1").await.unwrap();
    repo.create_token(user_id, "two", "h2").await.unwrap();

    let mut names: Vec<String> = repo
        .list_tokens()
        .await
        .unwrap()
        .into_iter()
        .map(|t| t.name)
        .collect();
    names.sort();

    assert_eq!(names, vec!["one".to_string(), "two".to_string()]);
}
