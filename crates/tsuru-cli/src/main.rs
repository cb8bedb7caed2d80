//! tsuru - command-line client for the tsuru platform-as-a-service.
//!
//! Manages users, teams, passwords and API keys against a tsuru server,
//! and handles login/logout for both native and OAuth schemes.

mod cli;
mod commands;

use std::io;

use anyhow::Result;
use clap::{CommandFactory, FromArgMatches};
use tracing::{debug, info, warn};
use tracing_subscriber::{fmt, prelude::*, EnvFilter};
use tsuru_core::auth::{describe, OAuthLogin, SchemeKind, SchemeResolver, SessionStore, StdinPrompt};
use tsuru_core::{ApiClient, Config, Console};

use cli::Cli;
use commands::Context;

/// Initialize the tracing subscriber for logging
fn init_tracing() {
    // Use RUST_LOG env var to control log level (e.g., RUST_LOG=debug)
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));

    tracing_subscriber::registry()
        .with(fmt::layer().with_writer(io::stderr))
        .with(filter)
        .init();
}

/// Resolve the scheme ahead of argument parsing so login help and arity
/// match the server. Any failure here falls back to native usage.
async fn early_scheme(args: &[String]) -> Option<SchemeResolver> {
    if !cli::mentions_login(args) {
        return None;
    }
    let config = Config::load(cli::target_hint(args)).ok()?;
    let api = ApiClient::new(&config).ok()?;
    let resolver = SchemeResolver::new(api);
    resolver.resolve().await;
    Some(resolver)
}

/// Token for this run: the environment override, else the stored session.
///
/// An unreadable session file is logged and treated as logged out, so
/// commands that need no session (logout among them) still run.
fn session_token(config: &Config, session: &SessionStore) -> Option<String> {
    if let Some(token) = config.token_override() {
        return Some(token.to_string());
    }
    match session.load() {
        Ok(token) => token,
        Err(e) => {
            warn!(error = %e, path = %session.path().display(), "Could not read session token");
            None
        }
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    // Load .env file if present (silently ignore if not found)
    let _ = dotenvy::dotenv();

    init_tracing();

    let args: Vec<String> = std::env::args().collect();
    let early = early_scheme(&args).await;
    let kind = early
        .as_ref()
        .and_then(|r| r.cached())
        .map(|s| s.kind())
        .unwrap_or(SchemeKind::Native);

    let command = cli::with_login_info(Cli::command(), describe(kind));
    let matches = command.get_matches_from(&args);
    let cli = Cli::from_arg_matches(&matches).unwrap_or_else(|e| e.exit());

    let config = Config::load(cli.target.clone())?;
    let session = SessionStore::new(config.token_path());

    let mut api = ApiClient::new(&config)?;
    if let Some(token) = session_token(&config, &session) {
        api.set_token(token);
    } else {
        debug!("No session token found");
    }

    let resolver = early.unwrap_or_else(|| SchemeResolver::new(api.clone()));
    let external = OAuthLogin::new(api.clone());

    let mut stdout = io::stdout();
    let mut prompt = StdinPrompt;
    let mut ctx = Context {
        console: Console::new(&mut stdout, &mut prompt),
        api,
        session,
    };

    info!(server = %config.target(), "Running command");
    commands::run(cli.command, &mut ctx, &resolver, &external).await
}
