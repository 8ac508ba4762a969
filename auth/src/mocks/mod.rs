//! Mock provider implementations for testing.
//!
//! Simple, in-memory implementations of every provider trait for unit and
//! integration tests.

pub mod oauth;
pub mod session;
pub mod user;

pub use oauth::MockOAuth2Provider;
pub use session::MockSessionRepository;
pub use user::MockUserRepository;

use crate::providers::LocalIdentityProvider;

/// Local identity provider wired to the in-memory mocks.
pub type MockIdentityProvider =
    LocalIdentityProvider<MockUserRepository, MockSessionRepository, MockOAuth2Provider>;
