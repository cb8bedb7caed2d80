//! REST client module for the tsuru control plane.
//!
//! This module provides the `ApiClient` used by every command, and the
//! `ApiError` taxonomy that maps HTTP statuses to user-facing errors.
//!
//! Authenticated requests carry the session token as a bearer credential.

pub mod client;
pub mod error;

pub use client::ApiClient;
pub use error::ApiError;
