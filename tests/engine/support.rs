//! Shared fixtures: a dispatcher over an in-memory store and a recording
//! transport, with a small `example` command family and `remove user`.

use std::sync::Arc;
use std::time::Duration;

use switchboard_engine::{
    Catalog, CommandResult, Context, DispatchConfig, Dispatcher, GuildStore, Incoming,
    MemoryStore, Outcome, RecordingTransport, Transport, command, group,
};
use switchboard_foundation::{AuthorityLevel, ChannelId, GuildId, UserId};
use switchboard_parser::{Args, Converter, Param, RateLimitSpec};

pub const GUILD: GuildId = GuildId(100);
pub const CHANNEL: ChannelId = ChannelId(200);
pub const BOT: UserId = UserId(999);
pub const AUTHOR: UserId = UserId(7);
pub const OWNER: UserId = UserId(8);

async fn done(ctx: Context, _args: Args) -> CommandResult {
    ctx.say(format!("done {}", ctx.path())).await;
    Ok(())
}

/// Echoes its bound arguments: `removing 1, 2 (limit 50)`.
async fn remove_users(ctx: Context, args: Args) -> CommandResult {
    let users: Vec<UserId> = args.get("users")?;
    let limit: i64 = args.get("limit")?;
    let users: Vec<String> = users.iter().map(ToString::to_string).collect();
    ctx.say(format!("removing {} (limit {limit})", users.join(", ")))
        .await;
    Ok(())
}

pub struct Harness {
    pub dispatcher: Dispatcher,
    pub store: Arc<MemoryStore>,
    pub transport: Arc<RecordingTransport>,
}

impl Harness {
    pub fn new() -> Self {
        Self::with_catalog(Catalog::english())
    }

    pub fn with_catalog(catalog: Catalog) -> Self {
        let store = Arc::new(MemoryStore::new());
        let transport = Arc::new(RecordingTransport::new());
        transport.set_owner(GUILD, OWNER);

        let dispatcher = Dispatcher::builder(
            Arc::clone(&store) as Arc<dyn GuildStore>,
            Arc::new(catalog),
            Arc::clone(&transport) as Arc<dyn Transport>,
        )
        .unwrap()
        .config(DispatchConfig {
            bot_user: Some(BOT),
            authors: vec![AUTHOR],
            ..DispatchConfig::default()
        })
        .command(&["example"], group())
        .unwrap()
        .command(&["example", "create"], command(done))
        .unwrap()
        .command(&["example", "delete"], command(done))
        .unwrap()
        .command(
            &["ping"],
            command(done).rate_limit(RateLimitSpec::per_user(1, Duration::from_secs(1))),
        )
        .unwrap()
        .command(
            &["remove", "user"],
            command(remove_users)
                .param(Param::required("users", Converter::greedy(Converter::user(), 1)))
                .param(Param::required("limit", Converter::int())),
        )
        .unwrap()
        .build();

        Self {
            dispatcher,
            store,
            transport,
        }
    }

    /// Sends `text` in the test guild as `user` at `level`.
    pub async fn send(&self, user: u64, level: AuthorityLevel, text: &str) -> Outcome {
        let incoming = Incoming::new(text, UserId(user), Some(GUILD), CHANNEL).with_authority(level);
        self.dispatcher.dispatch(incoming).await
    }

    /// Sends `text` in a direct conversation as `user`.
    pub async fn send_dm(&self, user: u64, text: &str) -> Outcome {
        self.dispatcher
            .dispatch(Incoming::new(text, UserId(user), None, ChannelId(user)))
            .await
    }

    /// Takes the replies sent so far.
    pub fn replies(&self) -> Vec<String> {
        self.transport.take()
    }
}
