/// Adressen Meister - contact directory with magic-link logins
///
/// Contacts are invited by an administrator, receive a mailed login link and
/// decide themselves which of their data the public directory shows.
pub mod api;
pub mod clock;
pub mod config;
pub mod context;
pub mod db;
pub mod directory;
pub mod error;
pub mod mailer;
pub mod notifier;
pub mod projection;
pub mod rate_limit;
pub mod secret;
pub mod server;
pub mod store;
pub mod token;

pub use context::AppContext;
pub use error::{DirectoryError, DirectoryResult};
