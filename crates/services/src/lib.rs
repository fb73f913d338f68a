//! # services
//!
//! Application services for roam. Each service owns one area of the API and
//! talks to the outside world only through the ports defined in `domains`.

pub mod auth;
pub mod insights;
pub mod notifications;
pub mod posts;
pub mod trivia;
pub mod users;

pub use auth::Authenticator;
pub use insights::{InsightService, InsightSettings};
pub use notifications::NotificationService;
pub use posts::PostService;
pub use trivia::TriviaService;
pub use users::UserService;
