//! Shared types for the postq outbound delivery queue: the message model,
//! address parsing, the backoff ladder and worker configuration.

pub mod address;
pub mod binding;
pub mod config;
pub mod domain;
pub mod error;
pub mod logging;
pub mod message;

pub use binding::DelayedBinding;
pub use config::{Config, MAX_TRY_CONNECTION_COUNT, Timeout};
pub use domain::Domain;
pub use message::{MailError, MailMessage};
pub use tracing;
