use linkup::domain::entities::NewLink;
use linkup::domain::repositories::{ClickRepository, LinkRepository, UserRepository};
use linkup::infrastructure::persistence::{
    PgClickRepository, PgLinkRepository, PgUserRepository,
};
use sqlx::PgPool;
use sqlx::postgres::{PgConnectOptions, PgPoolOptions};
use std::sync::Arc;

const HOT_LINK_VISITS: i64 = 64;

async fn link(pool: &Arc<PgPool>, path: &str) -> i64 {
    let user = PgUserRepository::new(pool.clone())
        .create(&format!("{}@example.com", path))
        .await
        .unwrap();

    PgLinkRepository::new(pool.clone())
        .create(NewLink {
            path: path.to_string(),
            destination: "https://example.com".to_string(),
            user_id: user.id,
            tag: None,
        })
        .await
        .unwrap()
        .id
}

async fn stored_clicks(pool: &PgPool, link_id: i64) -> i64 {
    sqlx::query_scalar("SELECT COUNT(*) FROM link_clicks WHERE link_id = $1")
        .bind(link_id)
        .fetch_one(pool)
        .await
        .unwrap()
}

#[sqlx::test]
async fn test_append_returns_running_count(pool: PgPool) {
    let pool = Arc::new(pool);
    let link_id = link(&pool, "abc").await;
    let repo = PgClickRepository::new(pool.clone());

    assert_eq!(repo.append_click(link_id).await.unwrap(), 1);
    assert_eq!(repo.append_click(link_id).await.unwrap(), 2);
    assert_eq!(repo.append_click(link_id).await.unwrap(), 3);
    assert_eq!(stored_clicks(&pool, link_id).await, 3);
}

#[sqlx::test]
async fn test_counts_are_per_link(pool: PgPool) {
    let pool = Arc::new(pool);
    let a = link(&pool, "aaa").await;
    let b = link(&pool, "bbb").await;
    let repo = PgClickRepository::new(pool.clone());

    repo.append_click(a).await.unwrap();
    repo.append_click(a).await.unwrap();

    assert_eq!(repo.append_click(b).await.unwrap(), 1);
    assert_eq!(stored_clicks(&pool, a).await, 2);
}

#[sqlx::test]
async fn test_parallel_appends_on_one_link_are_all_stored(
    pool_options: PgPoolOptions,
    connect_options: PgConnectOptions,
) {
    let pool = Arc::new(
        pool_options
            .max_connections(HOT_LINK_VISITS as u32)
            .connect_with(connect_options)
            .await
            .unwrap(),
    );
    let link_id = link(&pool, "hot").await;
    let repo = Arc::new(PgClickRepository::new(pool.clone()));

    let handles: Vec<_> = (0..HOT_LINK_VISITS)
        .map(|_| {
            let repo = repo.clone();
            tokio::spawn(async move { repo.append_click(link_id).await })
        })
        .collect();

    let mut counts = Vec::new();
    for handle in handles {
        counts.push(handle.await.unwrap().unwrap());
    }
    counts.sort();

    assert_eq!(counts, (1..=HOT_LINK_VISITS).collect::<Vec<i64>>());
    assert_eq!(stored_clicks(&pool, link_id).await, HOT_LINK_VISITS);
}

#[sqlx::test]
async fn test_parallel_appends_across_links_keep_separate_sequences(
    pool_options: PgPoolOptions,
    connect_options: PgConnectOptions,
) {
    let pool = Arc::new(
        pool_options
            .max_connections(16)
            .connect_with(connect_options)
            .await
            .unwrap(),
    );
    let a = link(&pool, "left").await;
    let b = link(&pool, "right").await;
    let repo = Arc::new(PgClickRepository::new(pool.clone()));

    let handles: Vec<_> = (0..32)
        .map(|i| {
            let repo = repo.clone();
            let link_id = if i % 2 == 0 { a } else { b };
            tokio::spawn(async move { (link_id, repo.append_click(link_id).await) })
        })
        .collect();

    let (mut seq_a, mut seq_b) = (Vec::new(), Vec::new());
    for handle in handles {
        let (link_id, seq) = handle.await.unwrap();
        if link_id == a {
            seq_a.push(seq.unwrap());
        } else {
            seq_b.push(seq.unwrap());
        }
    }
    seq_a.sort();
    seq_b.sort();

    assert_eq!(seq_a, (1..=16).collect::<Vec<i64>>());
    assert_eq!(seq_b, (1..=16).collect::<Vec<i64>>());
}
