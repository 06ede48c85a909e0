//! Built-in command tests: help, language, alias, toggle and botban.

use switchboard_engine::{Catalog, Denial, GuildStore, Outcome};
use switchboard_foundation::{AuthorityLevel, ChannelId, CommandPath, UserId};

use crate::support::{GUILD, Harness};

const FRENCH: &str = r#"
[languages.fr]
name = "Français"

[languages.fr.lines]
"language.success_channel" = "Langue du salon : {0}."
"error_ratelimit" = { one = "Doucement ! Réessayez dans {count} seconde.", other = "Doucement ! Réessayez dans {count} secondes." }

[languages.fr.commands.help]
name = "aide"

[languages.fr.commands.example]
name = "exemple"

[languages.fr.commands."example.create"]
name = "créer"

[languages.fr.commands."example.delete"]
name = "supprimer"
aliases = ["create"]
"#;

fn bilingual() -> Catalog {
    Catalog::english().merged(Catalog::from_toml(FRENCH).unwrap())
}

// =============================================================================
// help
// =============================================================================

#[tokio::test]
async fn help_lists_usable_commands() {
    let h = Harness::new();
    h.send(1, AuthorityLevel::Regular, "+help").await;
    let replies = h.replies();
    assert_eq!(replies.len(), 1);
    assert!(replies[0].starts_with("Commands: help, language, alias"));
    assert!(replies[0].contains("example"));
    assert!(!replies[0].contains("toggle"));
    assert!(!replies[0].contains("botban"));

    h.send(1, AuthorityLevel::BotMod, "+help").await;
    assert!(h.replies()[0].contains("toggle"));
}

#[tokio::test]
async fn help_describes_a_subcommand() {
    let h = Harness::new();
    h.send(1, AuthorityLevel::Regular, "+help toggle enable").await;
    assert_eq!(
        h.replies(),
        vec!["Usage: `toggle enable <paths>`\nRequires: bot-mod\nOnly usable in servers."]
    );

    h.send(1, AuthorityLevel::Regular, "+help ping").await;
    assert_eq!(
        h.replies(),
        vec!["Usage: `ping`\nLimited to 1 uses every second."]
    );
}

#[tokio::test]
async fn help_accepts_dotted_paths_and_reports_disablement() {
    let h = Harness::new();
    h.send(2, AuthorityLevel::BotMod, "+toggle example.*").await;
    h.replies();

    h.send(1, AuthorityLevel::Regular, "+help example.create").await;
    assert_eq!(
        h.replies(),
        vec!["Usage: `example create`\nDisabled in this server."]
    );

    // Both subcommands are hidden, so only the usage line is left.
    h.send(1, AuthorityLevel::Regular, "+help example").await;
    assert_eq!(h.replies(), vec!["Usage: `example`"]);
}

#[tokio::test]
async fn help_lists_subcommands_of_a_group() {
    let h = Harness::new();
    h.send(1, AuthorityLevel::Regular, "+help example").await;
    assert_eq!(h.replies(), vec!["Subcommands: create, delete"]);
}

#[tokio::test]
async fn help_for_unknown_command_aborts() {
    let h = Harness::new();
    let outcome = h.send(1, AuthorityLevel::Regular, "+help frobnicate").await;
    assert!(matches!(outcome, Outcome::Aborted(_)));
    assert_eq!(h.replies(), vec!["No command named `frobnicate`."]);
}

// =============================================================================
// language
// =============================================================================

#[tokio::test]
async fn language_lists_supported_languages() {
    let h = Harness::with_catalog(bilingual());
    h.send(1, AuthorityLevel::Regular, "+lang").await;
    assert_eq!(
        h.replies(),
        vec!["Available languages:\n`en` English\n`fr` Français"]
    );
}

#[tokio::test]
async fn language_change_needs_admin_in_a_guild() {
    let h = Harness::with_catalog(bilingual());
    h.send(1, AuthorityLevel::Regular, "+language fr").await;
    assert_eq!(
        h.replies(),
        vec!["You need to be admin or higher to use this command."]
    );

    h.send(1, AuthorityLevel::Admin, "+language fr").await;
    assert_eq!(h.replies(), vec!["Langue du salon : Français."]);

    // Later replies use the new language, falling back to English.
    h.send(1, AuthorityLevel::Regular, "+ping").await;
    h.send(1, AuthorityLevel::Regular, "+ping").await;
    h.send(1, AuthorityLevel::Regular, "+help frobnicate").await;
    assert_eq!(
        h.replies(),
        vec![
            "done ping",
            "Doucement ! Réessayez dans 1 seconde.",
            "No command named `frobnicate`."
        ]
    );
}

#[tokio::test]
async fn language_rejects_unknown_codes() {
    let h = Harness::new();
    let outcome = h.send(1, AuthorityLevel::Admin, "+language xx").await;
    assert!(matches!(outcome, Outcome::Aborted(_)));
    assert_eq!(h.replies(), vec!["`xx` is not a supported language."]);
}

#[tokio::test]
async fn language_guild_target_applies_to_every_channel() {
    let h = Harness::with_catalog(bilingual());
    h.send(1, AuthorityLevel::Admin, "+language fr server").await;
    assert_eq!(h.replies(), vec!["Server language set to Français."]);

    h.send(1, AuthorityLevel::Regular, "+ping").await;
    h.send(1, AuthorityLevel::Regular, "+ping").await;
    assert_eq!(
        h.replies(),
        vec!["done ping", "Doucement ! Réessayez dans 1 seconde."]
    );
}

#[tokio::test]
async fn language_guild_target_in_a_direct_conversation_sets_the_channel() {
    let h = Harness::with_catalog(bilingual());
    assert_eq!(
        h.send_dm(1, "+language fr guild").await,
        Outcome::Completed(CommandPath::new(["language"]))
    );
    assert_eq!(h.replies(), vec!["Langue du salon : Français."]);
    assert_eq!(
        h.store.get_language(None, ChannelId(1)).await.unwrap(),
        Some("fr".to_string())
    );
}

#[tokio::test]
async fn commands_answer_to_their_translated_names() {
    let h = Harness::with_catalog(bilingual());

    // Translated names only apply once the conversation is in French.
    assert_eq!(
        h.send(1, AuthorityLevel::Regular, "+exemple créer").await,
        Outcome::ResolutionMiss
    );

    h.send(1, AuthorityLevel::Admin, "+language fr").await;
    h.replies();

    assert_eq!(
        h.send(1, AuthorityLevel::Regular, "+EXEMPLE créer").await,
        Outcome::Completed(CommandPath::new(["example", "create"]))
    );
    // Canonical names still work when no translation shadows them.
    assert_eq!(
        h.send(1, AuthorityLevel::Regular, "+example delete").await,
        Outcome::Completed(CommandPath::new(["example", "delete"]))
    );
    assert_eq!(
        h.replies(),
        vec!["done example.create", "done example.delete"]
    );

    h.send(1, AuthorityLevel::Regular, "+aide exemple").await;
    assert_eq!(h.replies(), vec!["Subcommands: créer, supprimer"]);
}

#[tokio::test]
async fn trailing_underscore_reaches_a_shadowed_command() {
    let h = Harness::with_catalog(bilingual());
    h.send(1, AuthorityLevel::Admin, "+language fr").await;
    h.replies();

    // `create` is a French alias of `example.delete`.
    assert_eq!(
        h.send(1, AuthorityLevel::Regular, "+example create").await,
        Outcome::Completed(CommandPath::new(["example", "delete"]))
    );
    assert_eq!(
        h.send(1, AuthorityLevel::Regular, "+example create_").await,
        Outcome::Completed(CommandPath::new(["example", "create"]))
    );
    assert_eq!(
        h.send(1, AuthorityLevel::Regular, "+help_ example create_").await,
        Outcome::Completed(CommandPath::new(["help"]))
    );
}

// =============================================================================
// alias
// =============================================================================

#[tokio::test]
async fn alias_lists_active_invokers() {
    let h = Harness::new();
    h.send(1, AuthorityLevel::Admin, "+alias add ?? ").await;
    h.replies();

    h.send(1, AuthorityLevel::Regular, "+prefix").await;
    assert_eq!(h.replies(), vec!["Invokers: `<@999>`, `+`, `??`"]);
}

#[tokio::test]
async fn alias_rejects_mentions_duplicates_and_unknowns() {
    let h = Harness::new();
    h.send(1, AuthorityLevel::Admin, "+alias add @everyone").await;
    h.send(1, AuthorityLevel::Admin, "+alias add +").await;
    h.send(1, AuthorityLevel::Admin, "+alias rm !").await;
    h.send(1, AuthorityLevel::Admin, "+alias remove <@999>").await;
    assert_eq!(
        h.replies(),
        vec![
            "Invokers may not contain mentions.",
            "`+` is already an invoker.",
            "`!` is not an invoker.",
            "The mention invoker cannot be removed.",
        ]
    );
}

// =============================================================================
// toggle
// =============================================================================

#[tokio::test]
async fn toggle_set_operations_and_listing() {
    let h = Harness::new();
    h.send(2, AuthorityLevel::BotMod, "+toggle list").await;
    assert_eq!(h.replies(), vec!["Nothing is disabled."]);

    h.send(
        2,
        AuthorityLevel::BotMod,
        "+toggle disable example.create example.* example.create",
    )
    .await;
    assert_eq!(
        h.replies(),
        vec!["Disabled 2 entries: example.create, example.*."]
    );

    h.send(2, AuthorityLevel::BotMod, "+toggle list").await;
    let listing = h.replies();
    assert_eq!(listing.len(), 1);
    assert!(listing[0].starts_with("Disabled: "));
    assert!(listing[0].contains("example.create"));
    assert!(listing[0].contains("example.*"));

    h.send(2, AuthorityLevel::BotMod, "+toggle enable example.*").await;
    assert_eq!(h.replies(), vec!["Enabled example.*."]);
}

#[tokio::test]
async fn toggle_rejects_unknown_paths() {
    let h = Harness::new();
    let outcome = h
        .send(2, AuthorityLevel::BotMod, "+toggle nothing.here")
        .await;
    assert!(matches!(outcome, Outcome::Aborted(_)));
    assert_eq!(h.replies(), vec!["There is no command `nothing.here`."]);
}

#[tokio::test]
async fn toggle_everything_spares_bot_mods() {
    let h = Harness::new();
    h.send(2, AuthorityLevel::BotMod, "+toggle *").await;
    assert!(matches!(
        h.send(1, AuthorityLevel::Regular, "+help").await,
        Outcome::Denied(Denial::Disabled { .. })
    ));
    assert!(matches!(
        h.send(2, AuthorityLevel::BotMod, "+help").await,
        Outcome::Completed(_)
    ));
}

// =============================================================================
// botban
// =============================================================================

#[tokio::test]
async fn botban_protects_owner_authors_and_admins() {
    let h = Harness::new();
    h.transport
        .set_member_authority(GUILD, UserId(9), AuthorityLevel::Admin);

    h.send(2, AuthorityLevel::BotMod, "+botban <@8>").await;
    h.send(2, AuthorityLevel::BotMod, "+botban <@7>").await;
    h.send(2, AuthorityLevel::BotMod, "+botban <@!9>").await;
    assert_eq!(
        h.replies(),
        vec![
            "The server owner cannot be botbanned.",
            "That user cannot be botbanned.",
            "Administrators cannot be botbanned.",
        ]
    );
}

#[tokio::test]
async fn botban_flips_and_lists() {
    let h = Harness::new();
    h.send(2, AuthorityLevel::BotMod, "+botban").await;
    assert_eq!(h.replies(), vec!["Nobody is botbanned."]);

    h.send(2, AuthorityLevel::BotMod, "+botban <@5>").await;
    assert_eq!(h.replies(), vec!["<@5> can no longer use the bot here."]);
    assert_eq!(
        h.send(5, AuthorityLevel::Regular, "+help").await,
        Outcome::Denied(Denial::Botbanned)
    );

    h.send(2, AuthorityLevel::BotMod, "+botban").await;
    assert_eq!(h.replies(), vec!["Botbanned: <@5>"]);

    h.send(2, AuthorityLevel::BotMod, "+botban <@5>").await;
    assert_eq!(h.replies(), vec!["<@5> can use the bot again."]);
    assert!(matches!(
        h.send(5, AuthorityLevel::Regular, "+help").await,
        Outcome::Completed(_)
    ));
}
