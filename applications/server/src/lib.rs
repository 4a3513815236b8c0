//! RemoteJob Server Library
//!
//! HTTP backend for the RemoteJob task marketplace: accounts, the task
//! submission workflow, PIN-gated wallet withdrawals and admin tooling.
//!
//! This library exposes the core components for testing purposes.

pub mod api;
pub mod config;
pub mod error;
pub mod middleware;
pub mod services;
pub mod state;

// Re-export commonly used types for convenience
pub use api::create_router;
pub use config::ServerConfig;
pub use error::{Result, ServerError};
pub use services::{AuthService, SubmissionService, WalletEvents, WalletService};
pub use state::{AdminCredentials, AppState};
