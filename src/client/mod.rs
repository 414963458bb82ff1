//! Auth endpoint client

pub mod api;
pub mod login;
#[cfg(test)]
pub mod mock;
pub mod models;

pub use api::AuthApi;
pub use login::LoginClient;
#[cfg(test)]
pub use mock::{MockAuthClient, MockOutcome};
