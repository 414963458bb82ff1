//! API trait definitions
//!
//! [`AuthApi`] is the seam between the login loop and the HTTP client, so the
//! loop can be driven by a mock in tests.

mod auth;

pub use auth::AuthApi;
