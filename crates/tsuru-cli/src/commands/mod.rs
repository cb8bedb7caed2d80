//! Command implementations.
//!
//! Each command builds one request through the shared `ApiClient`, then
//! renders a fixed line to the console. Errors bubble up to `main`.

pub mod password;
pub mod session;
pub mod team;
pub mod token;
pub mod user;

use std::io;

use anyhow::Result;
use tsuru_core::auth::{ExternalLogin, SchemeResolver, SessionStore};
use tsuru_core::{ApiClient, Console};

use crate::cli::Commands;

/// Everything a command needs for one invocation
pub struct Context<'a> {
    pub console: Console<'a>,
    pub api: ApiClient,
    pub session: SessionStore,
}

/// Asks a yes/no question before destructive operations
#[derive(Debug, Clone, Copy, Default)]
pub struct Confirmation {
    assume_yes: bool,
}

impl Confirmation {
    pub fn new(assume_yes: bool) -> Self {
        Self { assume_yes }
    }

    /// Returns true only when the answer is exactly `y`; otherwise prints "Abort."
    pub fn confirm(&self, console: &mut Console<'_>, question: &str) -> io::Result<bool> {
        if self.assume_yes {
            return Ok(true);
        }
        console.prompt(&format!("{} (y/n) ", question))?;
        let answer = console.input.read_word()?;
        if answer != "y" {
            writeln!(console.out, "Abort.")?;
            return Ok(false);
        }
        Ok(true)
    }
}

pub async fn run(
    command: Commands,
    ctx: &mut Context<'_>,
    resolver: &SchemeResolver,
    external: &dyn ExternalLogin,
) -> Result<()> {
    match command {
        Commands::UserCreate { email } => user::create(ctx, &email).await,
        Commands::UserRemove => user::remove(ctx).await,
        Commands::Login { email } => session::login(ctx, resolver, external, email).await,
        Commands::Logout => session::logout(ctx).await,
        Commands::TeamCreate { team } => team::create(ctx, &team).await,
        Commands::TeamRemove { team, assume_yes } => {
            team::remove(ctx, &team, Confirmation::new(assume_yes)).await
        }
        Commands::TeamUserAdd { team, user } => team::add_user(ctx, &team, &user).await,
        Commands::TeamUserRemove { team, user } => team::remove_user(ctx, &team, &user).await,
        Commands::TeamUserList { team } => team::list_users(ctx, &team).await,
        Commands::TeamList => team::list(ctx).await,
        Commands::ChangePassword => password::change(ctx).await,
        Commands::ResetPassword { email, token } => {
            password::reset(ctx, &email, token.as_deref()).await
        }
        Commands::TokenShow => token::show(ctx).await,
        Commands::TokenRegenerate => token::regenerate(ctx).await,
    }
}
