use anyhow::{bail, Result};
use tracing::warn;
use tsuru_core::auth::{read_password, AuthError};

use super::Context;

pub async fn create(ctx: &mut Context<'_>, email: &str) -> Result<()> {
    ctx.console.prompt("Password: ")?;
    let password = read_password(&mut *ctx.console.input)?;
    ctx.console.prompt("\nConfirm: ")?;
    let confirm = read_password(&mut *ctx.console.input)?;
    writeln!(ctx.console.out)?;

    if password != confirm {
        bail!("Passwords didn't match.");
    }

    if let Err(e) = ctx.api.create_user(email, &password).await {
        if e.is_route_unavailable() {
            bail!("User creation is disabled.");
        }
        return Err(e.into());
    }

    writeln!(ctx.console.out, "User \"{}\" successfully created!", email)?;
    Ok(())
}

pub async fn remove(ctx: &mut Context<'_>) -> Result<()> {
    ctx.console
        .prompt("Are you sure you want to remove your user from tsuru? (y/n) ")?;
    let answer = ctx.console.input.read_word()?;
    if answer != "y" {
        writeln!(ctx.console.out, "Abort.")?;
        return Ok(());
    }

    ctx.api.remove_user().await?;

    match ctx.session.clear() {
        Ok(()) | Err(AuthError::NotLoggedIn) => {}
        Err(e) => warn!(error = %e, "Could not remove the local session token"),
    }

    writeln!(ctx.console.out, "User successfully removed.")?;
    Ok(())
}
