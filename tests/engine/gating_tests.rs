//! Dispatch gating tests.
//!
//! Resolution misses, authority, toggles, botbans, scope, invokers and
//! rate limits as seen through whole messages.

use switchboard_engine::{Denial, GuildStore, Outcome};
use switchboard_foundation::{AuthorityLevel, CommandPath, PathPattern, UserId};

use crate::support::{AUTHOR, GUILD, Harness};

fn pattern(text: &str) -> PathPattern {
    PathPattern::parse(text).unwrap()
}

#[tokio::test]
async fn toggled_subcommands_are_denied_below_bot_mod() {
    let h = Harness::new();

    let outcome = h.send(1, AuthorityLevel::Regular, "+toggle example.*").await;
    assert_eq!(
        outcome,
        Outcome::Denied(Denial::InsufficientPermission {
            required: AuthorityLevel::BotMod,
            actual: AuthorityLevel::Regular,
        })
    );
    assert_eq!(
        h.replies(),
        vec!["You need to be bot-mod or higher to use this command."]
    );

    let outcome = h.send(2, AuthorityLevel::BotMod, "+toggle example.*").await;
    assert_eq!(outcome, Outcome::Completed(CommandPath::new(["toggle"])));
    assert_eq!(h.replies(), vec!["Disabled example.*."]);

    let outcome = h.send(1, AuthorityLevel::Regular, "+example create").await;
    assert_eq!(
        outcome,
        Outcome::Denied(Denial::Disabled {
            pattern: pattern("example.*")
        })
    );

    let outcome = h.send(2, AuthorityLevel::BotMod, "+example create").await;
    assert_eq!(
        outcome,
        Outcome::Completed(CommandPath::new(["example", "create"]))
    );
}

#[tokio::test]
async fn unknown_and_handlerless_commands_are_misses() {
    let h = Harness::new();
    assert_eq!(
        h.send(1, AuthorityLevel::Regular, "+frobnicate").await,
        Outcome::ResolutionMiss
    );
    assert_eq!(
        h.send(1, AuthorityLevel::Regular, "+example").await,
        Outcome::ResolutionMiss
    );
    assert_eq!(
        h.send(1, AuthorityLevel::Regular, "frobnicate").await,
        Outcome::Ignored
    );
    assert!(h.replies().is_empty());
}

#[tokio::test]
async fn rate_limit_allows_then_refuses() {
    let h = Harness::new();
    assert_eq!(
        h.send(1, AuthorityLevel::Regular, "+ping").await,
        Outcome::Completed(CommandPath::new(["ping"]))
    );
    assert!(matches!(
        h.send(1, AuthorityLevel::Regular, "+ping").await,
        Outcome::RateLimited { .. }
    ));
    assert_eq!(
        h.replies(),
        vec!["done ping", "Slow down! Try again in 1 second."]
    );

    // Limits are per user.
    assert_eq!(
        h.send(2, AuthorityLevel::Regular, "+ping").await,
        Outcome::Completed(CommandPath::new(["ping"]))
    );
}

#[tokio::test]
async fn botbanned_users_are_denied_at_every_level() {
    let h = Harness::new();
    h.store.ban_user(GUILD, UserId(5)).await.unwrap();

    for level in AuthorityLevel::ALL {
        assert_eq!(
            h.send(5, level, "+example create").await,
            Outcome::Denied(Denial::Botbanned)
        );
    }
    assert!(h.replies().is_empty());
}

#[tokio::test]
async fn toggling_twice_restores_the_disabled_set() {
    let h = Harness::new();
    let before = h.store.get_disabled_paths(GUILD).await.unwrap();

    h.send(2, AuthorityLevel::BotMod, "+toggle example.create").await;
    assert!(
        h.store
            .get_disabled_paths(GUILD)
            .await
            .unwrap()
            .contains(&pattern("example.create"))
    );
    h.send(2, AuthorityLevel::BotMod, "+toggle example.create").await;

    assert_eq!(h.store.get_disabled_paths(GUILD).await.unwrap(), before);
    assert_eq!(
        h.replies(),
        vec!["Disabled example.create.", "Enabled example.create."]
    );
}

#[tokio::test]
async fn exact_toggle_leaves_siblings_and_parent_usable() {
    let h = Harness::new();
    h.send(2, AuthorityLevel::BotMod, "+toggle example.create").await;

    assert!(matches!(
        h.send(1, AuthorityLevel::Regular, "+example create").await,
        Outcome::Denied(Denial::Disabled { .. })
    ));
    assert_eq!(
        h.send(1, AuthorityLevel::Regular, "+example delete").await,
        Outcome::Completed(CommandPath::new(["example", "delete"]))
    );
}

#[tokio::test]
async fn denial_notices_respect_the_cooldown() {
    let h = Harness::new();
    h.send(1, AuthorityLevel::Regular, "+toggle help").await;
    h.send(1, AuthorityLevel::Regular, "+toggle help").await;
    assert_eq!(h.replies().len(), 1);

    // Another user gets their own notice.
    h.send(3, AuthorityLevel::Regular, "+toggle help").await;
    assert_eq!(h.replies().len(), 1);
}

#[tokio::test]
async fn guild_only_commands_are_refused_in_direct_conversations() {
    let h = Harness::new();
    assert_eq!(
        h.send_dm(1, "+botban").await,
        Outcome::Denied(Denial::GuildOnly)
    );
    assert_eq!(
        h.replies(),
        vec!["This command can only be used in a server."]
    );
    assert_eq!(
        h.send_dm(1, "+example create").await,
        Outcome::Completed(CommandPath::new(["example", "create"]))
    );
}

#[tokio::test]
async fn authors_act_at_author_level() {
    let h = Harness::new();
    assert_eq!(
        h.send(AUTHOR.0, AuthorityLevel::Regular, "+toggle help").await,
        Outcome::Completed(CommandPath::new(["toggle"]))
    );
}

#[tokio::test]
async fn mention_invoker_is_always_available() {
    let h = Harness::new();
    assert_eq!(
        h.send(1, AuthorityLevel::Regular, "<@999> example create").await,
        Outcome::Completed(CommandPath::new(["example", "create"]))
    );
    assert_eq!(
        h.send(1, AuthorityLevel::Regular, "<@!999>example delete").await,
        Outcome::Completed(CommandPath::new(["example", "delete"]))
    );
}

#[tokio::test]
async fn custom_invokers_and_default_removal() {
    let h = Harness::new();
    h.send(1, AuthorityLevel::Admin, "+alias add !").await;
    h.send(1, AuthorityLevel::Admin, "+alias remove +").await;
    assert_eq!(
        h.replies(),
        vec!["Added invoker `!`.", "Removed invoker `+`."]
    );

    assert_eq!(
        h.send(1, AuthorityLevel::Regular, "+example create").await,
        Outcome::Ignored
    );
    assert_eq!(
        h.send(1, AuthorityLevel::Regular, "!example create").await,
        Outcome::Completed(CommandPath::new(["example", "create"]))
    );

    h.send(1, AuthorityLevel::Admin, "!alias add +").await;
    assert_eq!(
        h.send(1, AuthorityLevel::Regular, "+example create").await,
        Outcome::Completed(CommandPath::new(["example", "create"]))
    );
}

#[tokio::test]
async fn mentions_then_limit_bind_through_dispatch() {
    let h = Harness::new();
    assert_eq!(
        h.send(1, AuthorityLevel::Regular, "+remove user <@1> <@!2> 50").await,
        Outcome::Completed(CommandPath::new(["remove", "user"]))
    );
    assert_eq!(h.replies(), vec!["removing 1, 2 (limit 50)"]);

    // The group alone has no handler.
    assert_eq!(
        h.send(1, AuthorityLevel::Regular, "+remove <@1> 50").await,
        Outcome::ResolutionMiss
    );
    assert!(matches!(
        h.send(1, AuthorityLevel::Regular, "+remove user 50").await,
        Outcome::BindingFailed(_)
    ));
}
