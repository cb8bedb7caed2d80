use anyhow::Result;
use tracing::debug;

use super::Context;

pub async fn show(ctx: &mut Context<'_>) -> Result<()> {
    match ctx.api.show_api_key().await? {
        Some(key) => writeln!(ctx.console.out, "API key: {}", key)?,
        None => debug!("API key request returned no content"),
    }
    Ok(())
}

pub async fn regenerate(ctx: &mut Context<'_>) -> Result<()> {
    match ctx.api.regenerate_api_key().await? {
        Some(key) => writeln!(ctx.console.out, "Your new API key is: {}", key)?,
        None => debug!("API key regeneration returned no content"),
    }
    Ok(())
}
