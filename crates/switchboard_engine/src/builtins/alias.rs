//! `alias`, `alias add <invoker>`, `alias remove <invoker>`
//!
//! Invokers are the prefixes that mark a message as a command. A mention of
//! the bot is always an invoker and cannot be removed; the process-default
//! invoker can be removed and re-added per guild.

use switchboard_foundation::{AuthorityLevel, Response, Result};
use switchboard_parser::{Args, Converter, Param};
use tracing::info;

use crate::context::Context;
use crate::handler::{CommandError, CommandResult, Registry, command};

pub(super) fn register(tree: &mut Registry) -> Result<()> {
    tree.register(&["alias"], command(list).alias("prefix").guild_only())?;
    tree.register(
        &["alias", "add"],
        command(add)
            .authority(AuthorityLevel::Admin)
            .param(Param::required("invoker", Converter::rest_of_line())),
    )?;
    tree.register(
        &["alias", "remove"],
        command(remove)
            .alias("rm")
            .authority(AuthorityLevel::Admin)
            .param(Param::required("invoker", Converter::rest_of_line())),
    )?;
    Ok(())
}

/// Every invoker active in the guild, mentions first.
async fn list(ctx: Context, _args: Args) -> CommandResult {
    let guild = ctx.require_guild()?;
    let mut invokers = Vec::new();
    if let Some(bot) = ctx.config().bot_user {
        invokers.push(bot.mention());
    }
    if ctx.store().default_invoker_enabled(guild).await? {
        invokers.push(ctx.config().default_invoker.clone());
    }
    invokers.extend(ctx.store().get_invokers(guild).await?);

    let shown: Vec<String> = invokers.iter().map(|invoker| format!("`{invoker}`")).collect();
    ctx.reply(
        Response::new("alias_list")
            .arg(shown.join(", "))
            .count(i64::try_from(shown.len()).unwrap_or(i64::MAX)),
    )
    .await;
    Ok(())
}

fn is_bot_mention(ctx: &Context, invoker: &str) -> bool {
    ctx.config()
        .bot_user
        .is_some_and(|bot| invoker == bot.mention() || invoker == bot.nick_mention())
}

async fn add(ctx: Context, args: Args) -> CommandResult {
    let guild = ctx.require_guild()?;
    let invoker: String = args.get("invoker")?;
    if invoker.contains('@') {
        return Err(CommandError::abort("no_pings"));
    }

    let added = if invoker == ctx.config().default_invoker {
        !ctx.store().set_default_invoker(guild, true).await?
    } else {
        ctx.store().add_invoker(guild, &invoker).await?
    };
    if !added {
        return Err(CommandError::Abort(Response::new("alias_exists").arg(&invoker)));
    }

    info!(%guild, %invoker, "invoker added");
    ctx.reply(Response::new("add_alias").arg(invoker)).await;
    Ok(())
}

async fn remove(ctx: Context, args: Args) -> CommandResult {
    let guild = ctx.require_guild()?;
    let invoker: String = args.get("invoker")?;
    if is_bot_mention(&ctx, &invoker) {
        return Err(CommandError::abort("mention_permanent"));
    }

    let removed = if invoker == ctx.config().default_invoker {
        ctx.store().set_default_invoker(guild, false).await?
    } else {
        ctx.store().remove_invoker(guild, &invoker).await?
    };
    if !removed {
        return Err(CommandError::Abort(Response::new("alias_missing").arg(&invoker)));
    }

    info!(%guild, %invoker, "invoker removed");
    ctx.reply(Response::new("remove_alias").arg(invoker)).await;
    Ok(())
}
