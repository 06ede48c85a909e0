//! `language [code [guild|server]]`
//!
//! Without arguments, lists the supported languages. With a code, sets the
//! channel's language, or the guild's when followed by `guild` or `server`
//! inside a guild.
//! Changing it inside a guild requires admin.

use switchboard_foundation::{AuthorityLevel, Response, Result};
use switchboard_parser::{Args, Converter, Param};
use tracing::info;

use crate::context::Context;
use crate::handler::{CommandError, CommandResult, Registry, command};
use crate::store::LanguageTarget;

pub(super) fn register(tree: &mut Registry) -> Result<()> {
    tree.register(
        &["language"],
        command(language)
            .alias("lang")
            .param(Param::optional("code", Converter::string()))
            .param(Param::optional(
                "target",
                Converter::choice(["guild", "server"]),
            )),
    )?;
    Ok(())
}

async fn language(ctx: Context, args: Args) -> CommandResult {
    let Some(code) = args.get::<Option<String>>("code")? else {
        let mut lines = vec![ctx.render(&Response::new("lang_list"))];
        for (code, name) in ctx.localizer().languages() {
            lines.push(ctx.render(&Response::new("lang_list_entry").arg(code).arg(name)));
        }
        ctx.say(lines.join("\n")).await;
        return Ok(());
    };

    if ctx.guild().is_some() {
        ctx.require_authority(AuthorityLevel::Admin)?;
    }

    let code = code.to_lowercase();
    let Some(name) = ctx
        .localizer()
        .languages()
        .into_iter()
        .find_map(|(known, name)| (known == code).then_some(name))
    else {
        return Err(CommandError::Abort(Response::new("invalid_lang").arg(code)));
    };

    // A direct conversation has no guild; `guild` there sets the channel.
    let (target, key) = match (args.get::<Option<String>>("target")?, ctx.guild()) {
        (Some(_), Some(guild)) => (LanguageTarget::Guild(guild), "success_guild"),
        _ => (LanguageTarget::Channel(ctx.channel()), "success_channel"),
    };

    ctx.store().set_language(target, &code).await?;
    info!(?target, language = %code, "language changed");

    let text = ctx.render_in(&Response::new(key).arg(name), &code);
    ctx.say(text).await;
    Ok(())
}
