//! # Tasklist Authentication
//!
//! Session synchronization and auth actions for the tasklist service.
//!
//! ## Features
//!
//! - **Session Store**: one application-visible `{current_user, is_loading}`
//!   value, fed by the identity provider's session-change broadcast
//! - **Auth Actions**: sign-up, password sign-in, Google and GitHub sign-in,
//!   sign-out, display-name update; every outcome is reported as a notice
//! - **Local identity provider**: bcrypt passwords, Redis sessions,
//!   PostgreSQL accounts, OAuth account linking
//! - **Testable**: in-memory mocks for every provider trait
//!
//! ## Architecture
//!
//! ```text
//! IdentityProvider ──broadcast──► observe() ──► SessionReducer ──► SessionState
//!        ▲                                           │
//!        └───────────── AuthActions ◄────────────────┘ set_user / sign_out
//! ```
//!
//! ## Example: sign up and follow the session
//!
//! ```rust,ignore
//! use tasklist_auth::*;
//!
//! let provider = Arc::new(provider);
//! let store = session::session_store(SessionEnvironment::new(
//!     Arc::clone(&provider),
//!     Arc::new(TracingNotifier),
//! ));
//! let _observer = session::observe(&store);
//!
//! let actions = AuthActions::new(provider, Arc::new(TracingNotifier))
//!     .with_session(store.clone());
//! actions.sign_up("ana", "ana@example.com", "hunter22").await?;
//!
//! assert!(store.state(|s| s.current_user.is_some()).await);
//! ```

#![deny(missing_docs)]
#![deny(clippy::unwrap_used)]
#![deny(clippy::expect_used)]
#![deny(clippy::panic)]
#![deny(clippy::todo)]
#![deny(clippy::unimplemented)]

// Public modules
pub mod actions;
pub mod config;
pub mod environment;
pub mod error;
pub mod providers;
pub mod session;
pub mod state;
pub mod stores;

#[cfg(any(test, feature = "test-utils"))]
pub mod mocks;

// Re-export main types for convenience
pub use actions::AuthActions;
pub use config::{OAuthConfig, SessionConfig};
pub use environment::SessionEnvironment;
pub use error::{AuthError, Result};
pub use session::{SessionAction, SessionObserver, SessionReducer, SessionStore};
pub use state::{
    OAuthProvider, ProviderUser, Session, SessionChange, SessionId, SessionPhase, SessionState,
    User, UserCredential, UserId,
};
