use std::path::PathBuf;
use std::sync::Arc;

use domains::{
    CredentialVerifier, IdentityProvider, Mailbox, Mailer, PostRepository, TextGenerator,
    TriviaRepository, UserRepository,
};
use services::{
    Authenticator, InsightService, InsightSettings, NotificationService, PostService,
    TriviaService, UserService,
};

use crate::metrics::HttpMetrics;

/// Every adapter the application needs, already constructed.
#[derive(Clone)]
pub struct Ports {
    pub users: Arc<dyn UserRepository>,
    pub posts: Arc<dyn PostRepository>,
    pub trivia: Arc<dyn TriviaRepository>,
    pub verifier: Arc<dyn CredentialVerifier>,
    pub identity: Arc<dyn IdentityProvider>,
    pub generator: Arc<dyn TextGenerator>,
    pub mailer: Arc<dyn Mailer>,
}

#[derive(Debug, Clone, Default)]
pub struct RouterOptions {
    /// Raw error messages and the `error` field in responses. Off in production.
    pub expose_error_details: bool,
    /// Mount `/api/dev/*` (only honoured with the `dev-routes` feature)
    pub dev_routes: bool,
    /// Serve a built frontend from here for unmatched paths
    pub static_dir: Option<PathBuf>,
}

/// State shared by every handler. Cheap to clone.
#[derive(Clone)]
pub struct AppState {
    pub authenticator: Arc<Authenticator>,
    pub users: Arc<UserService>,
    pub posts: Arc<PostService>,
    pub trivia: Arc<TriviaService>,
    pub insights: Arc<InsightService>,
    pub notifications: Arc<NotificationService>,
    pub metrics: Arc<HttpMetrics>,
    pub options: Arc<RouterOptions>,
}

impl AppState {
    pub fn assemble(
        ports: Ports,
        insight_settings: InsightSettings,
        sender: Mailbox,
        options: RouterOptions,
    ) -> Self {
        Self {
            authenticator: Arc::new(Authenticator::new(ports.verifier)),
            users: Arc::new(UserService::new(ports.users.clone(), ports.identity)),
            posts: Arc::new(PostService::new(ports.posts, ports.users.clone())),
            trivia: Arc::new(TriviaService::new(ports.trivia)),
            insights: Arc::new(InsightService::new(
                ports.users.clone(),
                ports.generator,
                insight_settings,
            )),
            notifications: Arc::new(NotificationService::new(ports.users, ports.mailer, sender)),
            metrics: Arc::new(HttpMetrics::new()),
            options: Arc::new(options),
        }
    }
}
