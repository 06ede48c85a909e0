//! The console: a terminal standing in for a chat platform.
//!
//! Each typed line is dispatched as a message from a simulated author.
//! Lines starting with `:` change who that author is:
//!
//! | Command | Effect |
//! |---------|--------|
//! | `:as <user> [level]` | become another user, optionally with a level |
//! | `:guild <id>` | move to a guild |
//! | `:dm` | move to a direct conversation |
//! | `:channel <id>` | move to another channel |
//! | `:whoami` | show the current identity |
//! | `:quit` | leave |

use std::collections::BTreeSet;
use std::fmt;

use async_trait::async_trait;
use switchboard_engine::{Dispatcher, Incoming, Outcome, Transport};
use switchboard_foundation::{AuthorityLevel, ChannelId, GuildId, Result, UserId};
use tracing::debug;

use crate::editor::{LineEditor, ReadResult};

/// Prints every reply to standard output.
#[derive(Debug, Default)]
pub struct ConsoleTransport;

#[async_trait]
impl Transport for ConsoleTransport {
    async fn send(&self, channel: ChannelId, text: String) -> Result<()> {
        for line in text.lines() {
            println!("\x1b[36m[{channel}]\x1b[0m {line}");
        }
        Ok(())
    }
}

/// Who the console is speaking as.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Identity {
    /// Simulated author.
    pub user: UserId,
    /// Simulated author level.
    pub authority: AuthorityLevel,
    /// Simulated guild; `None` for a direct conversation.
    pub guild: Option<GuildId>,
    /// Simulated channel.
    pub channel: ChannelId,
}

impl Identity {
    /// Builds the message for `text` sent as this identity.
    #[must_use]
    pub fn message(&self, text: &str) -> Incoming {
        Incoming::new(text, self.user, self.guild, self.channel).with_authority(self.authority)
    }
}

impl fmt::Display for Identity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} ({})", self.user, self.authority)?;
        match self.guild {
            Some(guild) => write!(f, " in guild {guild}"),
            None => f.write_str(" in a direct conversation"),
        }?;
        write!(f, ", channel {}", self.channel)
    }
}

/// A console meta-command.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Meta {
    /// `:as <user> [level]`
    As(UserId, AuthorityLevel),
    /// `:guild <id>`
    Guild(GuildId),
    /// `:dm`
    Direct,
    /// `:channel <id>`
    Channel(ChannelId),
    /// `:whoami`
    WhoAmI,
    /// `:quit`
    Quit,
}

/// Parses a meta-command. Returns `None` for ordinary lines.
///
/// # Errors
///
/// The inner result is an error message for a malformed meta-command.
#[must_use]
pub fn parse_meta(line: &str) -> Option<std::result::Result<Meta, String>> {
    let rest = line.trim().strip_prefix(':')?;
    let mut words = rest.split_whitespace();
    let command = words.next().unwrap_or_default();
    let args: Vec<&str> = words.collect();

    let id = |index: usize| -> std::result::Result<u64, String> {
        let raw = args
            .get(index)
            .ok_or_else(|| format!(":{command} needs an id"))?;
        raw.parse().map_err(|_| format!("invalid id: {raw}"))
    };

    let meta = match command {
        "as" => {
            let user = UserId::parse_mention(args.first().copied().unwrap_or_default())
                .ok_or_else(|| ":as needs a user id or mention".to_string());
            let level = args.get(1).map_or(Ok(AuthorityLevel::Regular), |raw| {
                raw.parse::<AuthorityLevel>().map_err(|e| e.to_string())
            });
            user.and_then(|user| level.map(|level| Meta::As(user, level)))
        }
        "guild" => id(0).map(|raw| Meta::Guild(GuildId(raw))),
        "dm" => Ok(Meta::Direct),
        "channel" => id(0).map(|raw| Meta::Channel(ChannelId(raw))),
        "whoami" => Ok(Meta::WhoAmI),
        "quit" | "q" | "exit" => Ok(Meta::Quit),
        other => Err(format!("unknown console command :{other}")),
    };
    Some(meta)
}

/// Drives a dispatcher from a line editor.
pub struct Console<E> {
    dispatcher: Dispatcher,
    editor: E,
    identity: Identity,
}

impl<E: LineEditor> Console<E> {
    /// Creates a console speaking as `identity`.
    pub fn new(dispatcher: Dispatcher, mut editor: E, identity: Identity) -> Self {
        editor.set_keywords(keywords(&dispatcher));
        Self {
            dispatcher,
            editor,
            identity,
        }
    }

    /// Returns the current identity.
    #[must_use]
    pub fn identity(&self) -> Identity {
        self.identity
    }

    /// Reads and dispatches lines until end of input or `:quit`.
    ///
    /// # Errors
    ///
    /// Returns an error if the editor fails.
    pub async fn run(&mut self) -> Result<()> {
        loop {
            let prompt = self.prompt();
            let line = match self.editor.read_line(&prompt)? {
                ReadResult::Line(line) => line,
                ReadResult::Interrupted => continue,
                ReadResult::Eof => return Ok(()),
            };
            if line.trim().is_empty() {
                continue;
            }
            self.editor.add_history(&line);

            if !self.handle_line(&line).await {
                return Ok(());
            }
        }
    }

    /// Handles one line. Returns false when the console should stop.
    pub async fn handle_line(&mut self, line: &str) -> bool {
        match parse_meta(line) {
            Some(Ok(Meta::Quit)) => return false,
            Some(Ok(meta)) => self.apply(meta),
            Some(Err(message)) => eprintln!("\x1b[31m{message}\x1b[0m"),
            None => {
                let outcome = self.dispatcher.dispatch(self.identity.message(line)).await;
                debug!(?outcome, "dispatched console line");
                if let Some(note) = describe(&outcome) {
                    println!("\x1b[2m({note})\x1b[0m");
                }
            }
        }
        true
    }

    fn apply(&mut self, meta: Meta) {
        match meta {
            Meta::As(user, authority) => {
                self.identity.user = user;
                self.identity.authority = authority;
            }
            Meta::Guild(guild) => self.identity.guild = Some(guild),
            Meta::Direct => self.identity.guild = None,
            Meta::Channel(channel) => self.identity.channel = channel,
            Meta::WhoAmI | Meta::Quit => {}
        }
        println!("\x1b[2m(speaking as {})\x1b[0m", self.identity);
    }

    fn prompt(&self) -> String {
        match self.identity.guild {
            Some(guild) => format!("{}@{guild}> ", self.identity.user),
            None => format!("{}@dm> ", self.identity.user),
        }
    }
}

/// Outcomes that produce no reply but deserve a note on the console.
fn describe(outcome: &Outcome) -> Option<&'static str> {
    match outcome {
        Outcome::Ignored => Some("not a command"),
        Outcome::ResolutionMiss => Some("no such command"),
        Outcome::Denied(switchboard_engine::Denial::Botbanned) => Some("botbanned"),
        _ => None,
    }
}

/// Completion words: every command name, the invoked top-level names and
/// the meta-commands.
fn keywords(dispatcher: &Dispatcher) -> Vec<String> {
    let tree = dispatcher.tree();
    let invoker = &dispatcher.config().default_invoker;
    let mut words = BTreeSet::new();
    for (_, node) in tree.iter() {
        words.insert(node.name().to_string());
        if node.path().len() == 1 {
            words.insert(format!("{invoker}{}", node.name()));
        }
    }
    for meta in [":as", ":guild", ":dm", ":channel", ":whoami", ":quit"] {
        words.insert(meta.to_string());
    }
    words.into_iter().collect()
}
