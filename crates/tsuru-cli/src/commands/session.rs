use anyhow::Result;
use tsuru_core::auth::{ExternalLogin, LoginFlow, LogoutOutcome, SchemeResolver};

use super::Context;

pub async fn login(
    ctx: &mut Context<'_>,
    resolver: &SchemeResolver,
    external: &dyn ExternalLogin,
    email: Option<String>,
) -> Result<()> {
    let scheme = resolver.resolve().await;
    let args: Vec<String> = email.into_iter().collect();
    LoginFlow::new(&ctx.api, &ctx.session, external)
        .login(scheme, &args, &mut ctx.console)
        .await?;
    Ok(())
}

pub async fn logout(ctx: &mut Context<'_>) -> Result<()> {
    match tsuru_core::auth::logout(&ctx.api, &ctx.session).await? {
        LogoutOutcome::LoggedOut => writeln!(ctx.console.out, "Successfully logged out!")?,
        LogoutOutcome::NotLoggedIn => writeln!(ctx.console.out, "You're not logged in!")?,
    }
    Ok(())
}
