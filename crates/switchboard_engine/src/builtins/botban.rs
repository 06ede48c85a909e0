//! `botban [@member]`
//!
//! Flips a member's botban, or lists the botbanned members when no target
//! is given. The guild owner, authors of the bot and admins cannot be
//! botbanned.

use switchboard_foundation::{AuthorityLevel, Response, Result, UserId};
use switchboard_parser::{Args, Converter, Param};
use tracing::info;

use crate::context::Context;
use crate::handler::{CommandError, CommandResult, Registry, command};

pub(super) fn register(tree: &mut Registry) -> Result<()> {
    tree.register(
        &["botban"],
        command(botban)
            .authority(AuthorityLevel::BotMod)
            .guild_only()
            .param(Param::optional("member", Converter::user())),
    )?;
    Ok(())
}

async fn botban(ctx: Context, args: Args) -> CommandResult {
    let guild = ctx.require_guild()?;
    let Some(target) = args.get::<Option<UserId>>("member")? else {
        return list(&ctx).await;
    };

    if ctx.transport().guild_owner(guild).await == Some(target) {
        return Err(CommandError::abort("target_owner"));
    }
    if ctx.is_author(target) {
        return Err(CommandError::abort("target_bot_owner"));
    }
    let level = ctx
        .transport()
        .member_authority(guild, target)
        .await
        .unwrap_or_default();
    if level.satisfies(AuthorityLevel::Admin) {
        return Err(CommandError::abort("target_admin"));
    }

    let banned = ctx.store().toggle_botban(guild, target).await?;
    info!(%guild, user = %target, banned, "botban toggled");

    let key = if banned { "success_ban" } else { "success_unban" };
    ctx.reply(Response::new(key).arg(target.mention())).await;
    Ok(())
}

async fn list(ctx: &Context) -> CommandResult {
    let guild = ctx.require_guild()?;
    let banned = ctx.store().get_botbans(guild).await?;
    if banned.is_empty() {
        return Err(CommandError::abort("no_botbanned_users"));
    }

    let mentions: Vec<String> = banned.iter().map(|user| user.mention()).collect();
    ctx.reply(
        Response::new("botban_list")
            .arg(mentions.join(", "))
            .count(i64::try_from(mentions.len()).unwrap_or(i64::MAX)),
    )
    .await;
    Ok(())
}
