//! Shared application state.

use std::sync::Arc;
use tokio::sync::mpsc;

use crate::application::services::{AuthService, LinkService, RedirectService};
use crate::domain::visit::Visit;
use crate::infrastructure::cache::CacheService;

/// State shared by every handler.
///
/// Cloned per request; everything inside is reference counted.
#[derive(Clone)]
pub struct AppState {
    pub redirect_service: Arc<RedirectService>,
    pub link_service: Arc<LinkService>,
    pub auth_service: Arc<AuthService>,
    pub cache: Arc<dyn CacheService>,
    pub visit_sender: mpsc::Sender<Visit>,
    /// Where visitors go when a short path cannot be resolved.
    pub error_redirect_url: Arc<str>,
}
