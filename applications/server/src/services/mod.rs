/// Server services
pub mod auth;
pub mod events;
pub mod notifier;
pub mod submissions;
pub mod wallet;

pub use auth::{AuthService, Principal};
pub use events::{WalletEvent, WalletEvents};
pub use submissions::SubmissionService;
pub use wallet::WalletService;
