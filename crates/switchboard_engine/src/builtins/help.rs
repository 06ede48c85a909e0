//! `help [command [subcommand...]]`
//!
//! Commands are named and looked up in the conversation's language.

use switchboard_foundation::{AuthorityLevel, Response, Result};
use switchboard_parser::{Args, Converter, NodeId, Param};

use crate::context::Context;
use crate::gate::{authorize, disabling_pattern, is_guild_only, required_authority};
use crate::handler::{CommandError, CommandResult, Registry, command};
use crate::ratelimit::whole_secs;

pub(super) fn register(tree: &mut Registry) -> Result<()> {
    tree.register(
        &["help"],
        command(help).param(Param::optional(
            "command",
            Converter::greedy(Converter::string(), 1),
        )),
    )?;
    Ok(())
}

async fn help(ctx: Context, args: Args) -> CommandResult {
    let words: Vec<String> = args.get::<Option<Vec<String>>>("command")?.unwrap_or_default();
    if words.is_empty() {
        let names = usable_children(&ctx, NodeId::ROOT);
        ctx.reply(Response::new("command_list").arg(names.join(", ")))
            .await;
        return Ok(());
    }

    // `help toggle.enable` and `help toggle enable` name the same node.
    let segments: Vec<&str> = words.iter().flat_map(|word| word.split('.')).collect();
    let Some(node) = ctx.lookup(segments.iter().copied()) else {
        return Err(CommandError::Abort(
            Response::new("command_not_found").arg(words.join(" ")),
        ));
    };

    let lines = describe(&ctx, node);
    ctx.say(lines.join("\n")).await;
    Ok(())
}

/// Names of `parent`'s children the invoker may run right now.
fn usable_children(ctx: &Context, parent: NodeId) -> Vec<String> {
    let tree = ctx.tree();
    tree.node(parent)
        .children()
        .iter()
        .filter(|&&child| authorize(tree, child, ctx.authority(), ctx.access()).is_ok())
        .map(|&child| ctx.command_name(child))
        .collect()
}

fn describe(ctx: &Context, id: NodeId) -> Vec<String> {
    let tree = ctx.tree();
    let node = tree.node(id);
    let mut lines = Vec::new();

    let mut words: Vec<String> = tree
        .ancestry(id)
        .into_iter()
        .rev()
        .map(|ancestor| ctx.command_name(ancestor))
        .collect();
    for param in node.params() {
        if param.required {
            words.push(format!("<{}>", param.name));
        } else {
            words.push(format!("[{}]", param.name));
        }
    }
    let usage = ctx.render(&Response::new("usage").arg(words.join(" ")));
    if node.is_invokable() || node.children().is_empty() {
        lines.push(usage.clone());
    }

    let required = required_authority(tree, id);
    if required > AuthorityLevel::Regular {
        lines.push(ctx.render(&Response::new("authority").arg(required.name())));
    }
    if is_guild_only(tree, id) {
        lines.push(ctx.render(&Response::new("guild_only")));
    }
    if let Some(limit) = node.rate_limit() {
        let window = whole_secs(limit.window);
        lines.push(ctx.render(
            &Response::new("rate_limit")
                .arg(limit.max)
                .arg(window)
                .count(i64::try_from(window).unwrap_or(i64::MAX)),
        ));
    }
    if disabling_pattern(&ctx.access().disabled, node.path()).is_some() {
        lines.push(ctx.render(&Response::new("disabled")));
    }

    let children = usable_children(ctx, id);
    if !children.is_empty() {
        lines.push(ctx.render(&Response::new("subcommands").arg(children.join(", "))));
    }
    if lines.is_empty() {
        lines.push(usage);
    }
    lines
}
