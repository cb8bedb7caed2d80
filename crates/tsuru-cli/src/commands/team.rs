use anyhow::Result;
use tracing::debug;

use super::{Confirmation, Context};

pub async fn create(ctx: &mut Context<'_>, team: &str) -> Result<()> {
    ctx.api.create_team(team).await?;
    writeln!(ctx.console.out, "Team \"{}\" successfully created!", team)?;
    Ok(())
}

pub async fn remove(ctx: &mut Context<'_>, team: &str, confirmation: Confirmation) -> Result<()> {
    let question = format!("Are you sure you want to remove team {:?}?", team);
    if !confirmation.confirm(&mut ctx.console, &question)? {
        return Ok(());
    }
    ctx.api.remove_team(team).await?;
    writeln!(ctx.console.out, "Team \"{}\" successfully removed!", team)?;
    Ok(())
}

pub async fn add_user(ctx: &mut Context<'_>, team: &str, user: &str) -> Result<()> {
    ctx.api.add_team_user(team, user).await?;
    writeln!(ctx.console.out, "User \"{}\" was added to the \"{}\" team", user, team)?;
    Ok(())
}

pub async fn remove_user(ctx: &mut Context<'_>, team: &str, user: &str) -> Result<()> {
    ctx.api.remove_team_user(team, user).await?;
    writeln!(ctx.console.out, "User \"{}\" was removed from the \"{}\" team", user, team)?;
    Ok(())
}

pub async fn list_users(ctx: &mut Context<'_>, team: &str) -> Result<()> {
    let members = ctx.api.team_members(team).await?;
    for user in members.sorted_users() {
        writeln!(ctx.console.out, "- {}", user)?;
    }
    Ok(())
}

pub async fn list(ctx: &mut Context<'_>) -> Result<()> {
    let Some(teams) = ctx.api.list_teams().await? else {
        debug!("Team list returned no content");
        return Ok(());
    };
    write!(ctx.console.out, "Teams:\n\n")?;
    for team in teams {
        writeln!(ctx.console.out, "  - {}", team.name)?;
    }
    Ok(())
}
