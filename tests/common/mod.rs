#![allow(dead_code)]

use async_trait::async_trait;
use axum::{Router, middleware, routing::get};
use chrono::{Duration, Utc};
use serde_json::json;
use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use tokio::sync::mpsc;
use tokio::task::JoinHandle;

use linkup::api;
use linkup::api::handlers::{health_handler, missing_path_handler, redirect_handler};
use linkup::api::middleware::auth;
use linkup::application::services::auth_service::hash_token;
use linkup::application::services::{AuthService, LinkService, RedirectService, TrackingService};
use linkup::domain::alert_policy::AlertPolicy;
use linkup::domain::entities::{Link, LinkSummary, NewLink, TrackingRecord};
use linkup::domain::repositories::{ApiToken, ClickRepository, LinkRepository, TokenRepository};
use linkup::domain::visit::Visit;
use linkup::domain::visit_worker::run_visit_worker;
use linkup::error::AppError;
use linkup::infrastructure::cache::NullCache;
use linkup::infrastructure::classifier::{DEFAULT_PREVIEW_IP_RANGES, SignatureClassifier};
use linkup::infrastructure::notifier::{Notifier, NotifyError};
use linkup::state::AppState;

pub const SIGNING_SECRET: &str = "test-signing-secret";
pub const SHORT_URL_BASE: &str = "https://lnk.test/redirect";
pub const ERROR_URL: &str = "https://lnk.test/not-found";
pub const CONTACT_EMAIL: &str = "support@lnk.test";

pub const BROWSER_UA: &str =
    "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 Chrome/126.0 Safari/537.36";
pub const SLACK_UA: &str = "Slackbot-LinkExpanding 1.0 (+https://api.slack.com/robots)";
pub const LINKEDIN_PREVIEW_IP: &str = "172.176.75.89";

const SIGNATURES: &str = r#"[
    { "pattern": "Slackbot" },
    { "pattern": "Googlebot" },
    { "pattern": "facebookexternalhit" },
    { "pattern": "LinkedInBot" }
]"#;

#[derive(Default)]
struct Inner {
    users: HashMap<i64, String>,
    links: Vec<Link>,
    clicks: HashMap<i64, i64>,
    tokens: Vec<ApiToken>,
    events: Vec<String>,
    unavailable: bool,
}

/// In-memory link, click and token store.
///
/// Every store call is appended to an event log so tests can assert what
/// happened, and in which order.
#[derive(Default)]
pub struct MemoryStore {
    inner: Mutex<Inner>,
}

impl MemoryStore {
    pub fn add_user(&self, id: i64, email: &str) {
        self.inner
            .lock()
            .unwrap()
            .users
            .insert(id, email.to_string());
    }

    pub fn add_link(&self, path: &str, destination: &str, user_id: i64, tag: Option<&str>) -> i64 {
        let mut inner = self.inner.lock().unwrap();
        let id = inner.links.len() as i64 + 1;
        let created_at = Utc::now() + Duration::seconds(id);
        inner.links.push(Link::new(
            id,
            path.to_string(),
            destination.to_string(),
            user_id,
            tag.map(str::to_string),
            created_at,
        ));
        id
    }

    /// Stores a token for `user_id` and returns the raw bearer value.
    pub fn add_token(&self, user_id: i64, raw: &str) -> String {
        let mut inner = self.inner.lock().unwrap();
        let id = inner.tokens.len() as i64 + 1;
        inner.tokens.push(ApiToken {
            id,
            user_id,
            name: format!("token-{}", id),
            token_hash: hash_token(SIGNING_SECRET, raw),
            created_at: Utc::now(),
            last_used_at: None,
            revoked_at: None,
        });
        raw.to_string()
    }

    pub fn clicks(&self, link_id: i64) -> i64 {
        self.inner
            .lock()
            .unwrap()
            .clicks
            .get(&link_id)
            .copied()
            .unwrap_or(0)
    }

    pub fn link_count(&self) -> usize {
        self.inner.lock().unwrap().links.len()
    }

    pub fn events(&self) -> Vec<String> {
        self.inner.lock().unwrap().events.clone()
    }

    pub fn clear_events(&self) {
        self.inner.lock().unwrap().events.clear();
    }

    /// Makes every subsequent store call fail.
    pub fn set_unavailable(&self, unavailable: bool) {
        self.inner.lock().unwrap().unavailable = unavailable;
    }

    fn record(&self, event: String) -> Result<std::sync::MutexGuard<'_, Inner>, AppError> {
        let mut inner = self.inner.lock().unwrap();
        inner.events.push(event);
        if inner.unavailable {
            return Err(AppError::internal(
                "Database error",
                json!({"reason": "store unavailable"}),
            ));
        }
        Ok(inner)
    }
}

#[async_trait]
impl LinkRepository for MemoryStore {
    async fn create(&self, new_link: NewLink) -> Result<Link, AppError> {
        let mut inner = self.record(format!("create:{}", new_link.path))?;
        if inner.links.iter().any(|l| l.path == new_link.path) {
            return Err(AppError::conflict(
                "Unique constraint violation",
                json!({"constraint": "links_path_key"}),
            ));
        }

        let id = inner.links.len() as i64 + 1;
        let link = Link::new(
            id,
            new_link.path,
            new_link.destination,
            new_link.user_id,
            new_link.tag,
            Utc::now() + Duration::seconds(id),
        );
        inner.links.push(link.clone());
        Ok(link)
    }

    async fn resolve_destination(&self, path: &str) -> Result<Option<String>, AppError> {
        let inner = self.record(format!("resolve:{}", path))?;
        Ok(inner
            .links
            .iter()
            .find(|l| l.path == path)
            .map(|l| l.destination.clone()))
    }

    async fn fetch_tracking_record(
        &self,
        path: &str,
    ) -> Result<Option<TrackingRecord>, AppError> {
        let inner = self.record(format!("fetch_record:{}", path))?;
        Ok(inner.links.iter().find(|l| l.path == path).map(|l| TrackingRecord {
            link_id: l.id,
            path: l.path.clone(),
            destination: l.destination.clone(),
            owner_email: inner.users.get(&l.user_id).cloned().unwrap_or_default(),
            tag: l.tag.clone(),
            clicks_before: inner.clicks.get(&l.id).copied().unwrap_or(0),
        }))
    }

    async fn list_by_owner(
        &self,
        user_id: i64,
        offset: i64,
        limit: i64,
    ) -> Result<Vec<LinkSummary>, AppError> {
        let inner = self.record(format!("list:{}", user_id))?;
        let mut owned: Vec<&Link> = inner.links.iter().filter(|l| l.user_id == user_id).collect();
        owned.sort_by(|a, b| b.created_at.cmp(&a.created_at).then(b.id.cmp(&a.id)));

        Ok(owned
            .into_iter()
            .skip(offset as usize)
            .take(limit as usize)
            .map(|l| LinkSummary {
                link: l.clone(),
                clicks: inner.clicks.get(&l.id).copied().unwrap_or(0),
            })
            .collect())
    }

    async fn count_by_owner(&self, user_id: i64) -> Result<i64, AppError> {
        let inner = self.record(format!("count:{}", user_id))?;
        Ok(inner.links.iter().filter(|l| l.user_id == user_id).count() as i64)
    }

    async fn health_check(&self) -> Result<(), AppError> {
        self.record("health".to_string()).map(|_| ())
    }
}

#[async_trait]
impl ClickRepository for MemoryStore {
    async fn append_click(&self, link_id: i64) -> Result<i64, AppError> {
        let mut inner = self.record(format!("append:{}", link_id))?;
        let count = inner.clicks.entry(link_id).or_insert(0);
        *count += 1;
        Ok(*count)
    }

}

#[async_trait]
impl TokenRepository for MemoryStore {
    async fn find_owner(&self, token_hash: &str) -> Result<Option<i64>, AppError> {
        let inner = self.record("find_owner".to_string())?;
        Ok(inner
            .tokens
            .iter()
            .find(|t| t.token_hash == token_hash && t.revoked_at.is_none())
            .map(|t| t.user_id))
    }

    async fn update_last_used(&self, token_hash: &str) -> Result<(), AppError> {
        let mut inner = self.record("update_last_used".to_string())?;
        if let Some(token) = inner.tokens.iter_mut().find(|t| t.token_hash == token_hash) {
            token.last_used_at = Some(Utc::now());
        }
        Ok(())
    }

    async fn create_token(
        &self,
        user_id: i64,
        name: &str,
        token_hash: &str,
    ) -> Result<ApiToken, AppError> {
        let mut inner = self.record("create_token".to_string())?;
        let token = ApiToken {
            id: inner.tokens.len() as i64 + 1,
            user_id,
            name: name.to_string(),
            token_hash: token_hash.to_string(),
            created_at: Utc::now(),
            last_used_at: None,
            revoked_at: None,
        };
        inner.tokens.push(token.clone());
        Ok(token)
    }

    async fn list_tokens(&self) -> Result<Vec<ApiToken>, AppError> {
        Ok(self.record("list_tokens".to_string())?.tokens.clone())
    }

    async fn find_by_id(&self, id: i64) -> Result<Option<ApiToken>, AppError> {
        let inner = self.record("find_token".to_string())?;
        Ok(inner.tokens.iter().find(|t| t.id == id).cloned())
    }

    async fn find_by_name(&self, name: &str) -> Result<Option<ApiToken>, AppError> {
        let inner = self.record("find_token".to_string())?;
        Ok(inner.tokens.iter().find(|t| t.name == name).cloned())
    }

    async fn revoke_token(&self, id: i64) -> Result<(), AppError> {
        let mut inner = self.record("revoke_token".to_string())?;
        if let Some(token) = inner.tokens.iter_mut().find(|t| t.id == id) {
            token.revoked_at = Some(Utc::now());
        }
        Ok(())
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SentAlert {
    pub recipient: String,
    pub subject: String,
    pub body: String,
}

/// Notifier that keeps every message it is asked to send.
#[derive(Default)]
pub struct RecordingNotifier {
    sent: Mutex<Vec<SentAlert>>,
    failing: Mutex<bool>,
}

impl RecordingNotifier {
    pub fn sent(&self) -> Vec<SentAlert> {
        self.sent.lock().unwrap().clone()
    }

    pub fn set_failing(&self, failing: bool) {
        *self.failing.lock().unwrap() = failing;
    }
}

#[async_trait]
impl Notifier for RecordingNotifier {
    async fn send(&self, recipient: &str, subject: &str, body: &str) -> Result<(), NotifyError> {
        if *self.failing.lock().unwrap() {
            return Err(NotifyError::Rejected { status: 500 });
        }

        self.sent.lock().unwrap().push(SentAlert {
            recipient: recipient.to_string(),
            subject: subject.to_string(),
            body: body.to_string(),
        });
        Ok(())
    }
}

pub fn classifier() -> SignatureClassifier {
    SignatureClassifier::from_json(SIGNATURES, DEFAULT_PREVIEW_IP_RANGES).unwrap()
}

/// Services wired to in-memory fakes.
pub struct TestApp {
    pub store: Arc<MemoryStore>,
    pub notifier: Arc<RecordingNotifier>,
    pub state: AppState,
    pub tracker: Arc<TrackingService>,
    pub visits: mpsc::Receiver<Visit>,
}

impl TestApp {
    pub fn new(max_alerts: u32) -> Self {
        Self::with_queue(max_alerts, 100)
    }

    pub fn with_queue(max_alerts: u32, queue_capacity: usize) -> Self {
        let store = Arc::new(MemoryStore::default());
        let notifier = Arc::new(RecordingNotifier::default());

        let tracker = Arc::new(TrackingService::new(
            store.clone(),
            store.clone(),
            Arc::new(classifier()),
            notifier.clone(),
            AlertPolicy::new(max_alerts, SHORT_URL_BASE, CONTACT_EMAIL),
        ));

        let (tx, rx) = mpsc::channel(queue_capacity);
        let cache = Arc::new(NullCache::new());

        let state = AppState {
            redirect_service: Arc::new(RedirectService::new(store.clone(), cache.clone())),
            link_service: Arc::new(LinkService::new(store.clone(), 20, SHORT_URL_BASE)),
            auth_service: Arc::new(AuthService::new(store.clone(), SIGNING_SECRET.to_string())),
            cache,
            visit_sender: tx,
            error_redirect_url: Arc::from(ERROR_URL),
        };

        Self {
            store,
            notifier,
            state,
            tracker,
            visits: rx,
        }
    }

    /// Same routes as the server, without the rate limiter.
    pub fn router(&self) -> Router {
        let api_router = api::routes::protected_routes().route_layer(
            middleware::from_fn_with_state(self.state.clone(), auth::layer),
        );

        Router::new()
            .route("/redirect/{path}", get(redirect_handler))
            .route("/redirect", get(missing_path_handler))
            .route("/health", get(health_handler))
            .nest("/api", api_router)
            .with_state(self.state.clone())
    }

    /// Hands the visit queue to a real worker; `visits` is left closed.
    pub fn spawn_worker(&mut self, concurrency: usize) -> JoinHandle<()> {
        let (_, closed) = mpsc::channel(1);
        let rx = std::mem::replace(&mut self.visits, closed);
        tokio::spawn(run_visit_worker(rx, self.tracker.clone(), concurrency))
    }

    /// Polls until the link has `expected` clicks or a second has passed.
    pub async fn wait_for_clicks(&self, link_id: i64, expected: i64) -> i64 {
        for _ in 0..100 {
            if self.store.clicks(link_id) >= expected {
                break;
            }
            tokio::time::sleep(std::time::Duration::from_millis(10)).await;
        }
        self.store.clicks(link_id)
    }

    /// Tracks every queued visit, one at a time.
    pub async fn drain_visits(&mut self) -> usize {
        let mut tracked = 0;
        while let Ok(visit) = self.visits.try_recv() {
            self.tracker.track(visit).await;
            tracked += 1;
        }
        tracked
    }
}
