//! `toggle <path...>`, `toggle enable <path...>`, `toggle disable <path...>`, `toggle list`
//!
//! Paths are dotted (`example.create`); `example.*` covers every
//! subcommand of `example` and `*` covers everything. Each named path must
//! exist in the command tree.

use std::collections::BTreeSet;

use switchboard_foundation::{AuthorityLevel, GuildId, PathPattern, Response, Result};
use switchboard_parser::{Args, Converter, Param};
use tracing::info;

use crate::context::Context;
use crate::handler::{CommandError, CommandResult, Registry, command};

fn paths_param() -> Param {
    Param::required("paths", Converter::greedy(Converter::path_pattern(), 1))
}

pub(super) fn register(tree: &mut Registry) -> Result<()> {
    tree.register(
        &["toggle"],
        command(toggle)
            .authority(AuthorityLevel::BotMod)
            .guild_only()
            .param(paths_param()),
    )?;
    tree.register(&["toggle", "enable"], command(enable).param(paths_param()))?;
    tree.register(&["toggle", "disable"], command(disable).param(paths_param()))?;
    tree.register(&["toggle", "list"], command(list))?;
    Ok(())
}

/// Reads the `paths` argument, dropping duplicates and rejecting unknown paths.
fn patterns(ctx: &Context, args: &Args) -> std::result::Result<Vec<PathPattern>, CommandError> {
    let mut seen = BTreeSet::new();
    let mut patterns = Vec::new();
    for pattern in args.get::<Vec<PathPattern>>("paths")? {
        if ctx.tree().lookup(&pattern.anchor()).is_none() {
            return Err(CommandError::Abort(
                Response::new("TOGGLE_PATH_error").arg(&pattern),
            ));
        }
        if seen.insert(pattern.clone()) {
            patterns.push(pattern);
        }
    }
    Ok(patterns)
}

fn joined(patterns: &[PathPattern]) -> String {
    patterns
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join(", ")
}

fn count(len: usize) -> i64 {
    i64::try_from(len).unwrap_or(i64::MAX)
}

/// Flips each path.
async fn toggle(ctx: Context, args: Args) -> CommandResult {
    let guild = ctx.require_guild()?;
    let mut disabled = Vec::new();
    let mut enabled = Vec::new();
    for pattern in patterns(&ctx, &args)? {
        if ctx.store().toggle_path(guild, &pattern).await? {
            disabled.push(pattern);
        } else {
            enabled.push(pattern);
        }
    }
    info!(%guild, disabled = %joined(&disabled), enabled = %joined(&enabled), "paths toggled");

    if !disabled.is_empty() {
        ctx.reply(
            Response::new("disabled")
                .arg(joined(&disabled))
                .count(count(disabled.len())),
        )
        .await;
    }
    if !enabled.is_empty() {
        ctx.reply(
            Response::new("enabled")
                .arg(joined(&enabled))
                .count(count(enabled.len())),
        )
        .await;
    }
    Ok(())
}

async fn set(ctx: Context, args: Args, disable: bool) -> CommandResult {
    let guild: GuildId = ctx.require_guild()?;
    let patterns = patterns(&ctx, &args)?;
    let changed = ctx.store().set_paths(guild, &patterns, disable).await?;
    info!(%guild, paths = %joined(&patterns), disable, changed, "paths set");

    ctx.reply(
        Response::new("success")
            .arg(joined(&patterns))
            .count(count(patterns.len())),
    )
    .await;
    Ok(())
}

async fn enable(ctx: Context, args: Args) -> CommandResult {
    set(ctx, args, false).await
}

async fn disable(ctx: Context, args: Args) -> CommandResult {
    set(ctx, args, true).await
}

/// Shows every disabled entry, sorted.
async fn list(ctx: Context, _args: Args) -> CommandResult {
    let guild = ctx.require_guild()?;
    let disabled: Vec<PathPattern> = ctx.store().get_disabled_paths(guild).await?.into_iter().collect();
    if disabled.is_empty() {
        return Err(CommandError::abort("no_toggles"));
    }
    ctx.reply(
        Response::new("toggle_list")
            .arg(joined(&disabled))
            .count(count(disabled.len())),
    )
    .await;
    Ok(())
}
