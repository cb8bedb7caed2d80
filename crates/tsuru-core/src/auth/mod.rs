//! Authentication core: credential input, scheme discovery, login flows and
//! the local session token.
//!
//! - `Prompt` / `read_password`: password capture, masked on terminals
//! - `SchemeResolver`: which scheme the server runs, fetched once per invocation
//! - `LoginFlow`: native password login or an `ExternalLogin` such as `OAuthLogin`
//! - `SessionStore`: the token file written by login and removed by logout

pub mod credentials;
pub mod error;
pub mod login;
pub mod oauth;
pub mod scheme;
pub mod session;

pub use credentials::{read_password, BufReadPrompt, Prompt, StdinPrompt};
pub use error::AuthError;
pub use login::{describe, logout, CommandInfo, ExternalLogin, LoginFlow, LogoutOutcome};
pub use oauth::{BrowserOpener, OAuthLogin};
pub use scheme::{AuthScheme, SchemeKind, SchemeResolver, SCHEME_PATH};
pub use session::SessionStore;
