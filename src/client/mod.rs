//! Review API and Telegram client modules
//!
//! The review API client, response validation, Telegram delivery and the
//! polling loop each live in their own component.

pub mod api;
pub mod config;
pub mod error;
pub mod notifier;
pub mod poller;
pub mod response;
pub mod service;

// Re-export main types for convenience
pub use api::PracticumApi;
pub use config::ClientConfig;
pub use error::ClientError;
pub use notifier::TelegramNotifier;
pub use poller::HomeworkPoller;
pub use service::HomeworkService;
