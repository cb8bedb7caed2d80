//! Core library for the tsuru command-line client.
//!
//! Holds everything the commands share: configuration, the HTTP transport,
//! response models, and the authentication core.

pub mod api;
pub mod auth;
pub mod config;
pub mod console;
pub mod models;

pub use api::{ApiClient, ApiError};
pub use config::Config;
pub use console::Console;
