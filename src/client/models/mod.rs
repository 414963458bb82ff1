//! Request and response models for the auth endpoint

mod auth;

pub use auth::{AuthRequest, AuthResponse};
