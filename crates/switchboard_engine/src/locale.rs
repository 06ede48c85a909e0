//! Localization.
//!
//! The engine hands every [`Response`] to a [`Localizer`] together with the
//! language selected for the conversation. [`Catalog`] is the bundled
//! implementation: a set of languages, each mapping fully-qualified keys to
//! templates, loadable from TOML.
//!
//! Templates substitute `{0}`, `{1}`, ... with positional arguments,
//! `{count}` with the pluralization count and `{name}` with named arguments.
//! A line may instead be a `{ one, other }` table chosen by the count.
//!
//! A language may also rename commands: `[languages.fr.commands."toggle"]`
//! with a `name` and `aliases` gives `toggle` French words. The resolver
//! tries these before the canonical names.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use switchboard_foundation::{CommandPath, Error, ErrorKind, Response, Result};

/// Turns render requests into text.
pub trait Localizer: Send + Sync {
    /// Renders `response` in `language`.
    ///
    /// Must always produce some text, falling back to the default language
    /// and finally to the key itself.
    fn render(&self, response: &Response, language: &str) -> String;

    /// Returns `(code, display name)` for every supported language.
    fn languages(&self) -> Vec<(String, String)>;

    /// Returns true if `code` is supported.
    fn has_language(&self, code: &str) -> bool {
        self.languages().iter().any(|(known, _)| known == code)
    }

    /// Returns the words naming `path` in `language`, display name first.
    ///
    /// Empty when the language keeps the canonical names.
    fn command_names(&self, _path: &CommandPath, _language: &str) -> Vec<String> {
        Vec::new()
    }
}

/// One template, optionally pluralized.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Line {
    /// A single template.
    Text(String),
    /// Singular and plural templates, chosen by the response count.
    Plural {
        /// Used when the count is exactly one.
        one: String,
        /// Used otherwise.
        other: String,
    },
}

impl Line {
    fn template(&self, count: Option<i64>) -> &str {
        match self {
            Self::Text(text) => text,
            Self::Plural { one, other } => {
                if count == Some(1) {
                    one
                } else {
                    other
                }
            }
        }
    }
}

/// A command's words in one language.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CommandWords {
    /// Display name.
    pub name: Option<String>,
    /// Further accepted words.
    #[serde(default)]
    pub aliases: Vec<String>,
}

/// The lines of one language.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Language {
    /// Display name, in the language itself.
    pub name: String,
    /// Fully-qualified key to template.
    #[serde(default)]
    pub lines: BTreeMap<String, Line>,
    /// Dotted command path to its words in this language.
    #[serde(default)]
    pub commands: BTreeMap<String, CommandWords>,
}

fn default_language() -> String {
    "en".to_string()
}

/// A multi-language template catalog.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Catalog {
    /// Language used when a key is missing from the requested one.
    #[serde(default = "default_language")]
    pub default_language: String,
    /// Languages by code.
    #[serde(default)]
    pub languages: BTreeMap<String, Language>,
}

impl Default for Catalog {
    fn default() -> Self {
        Self {
            default_language: default_language(),
            languages: BTreeMap::new(),
        }
    }
}

impl Catalog {
    /// Returns the bundled English catalog.
    #[must_use]
    pub fn english() -> Self {
        let lines = ENGLISH
            .iter()
            .map(|(key, text)| ((*key).to_string(), Line::Text((*text).to_string())))
            .chain(ENGLISH_PLURAL.iter().map(|(key, one, other)| {
                (
                    (*key).to_string(),
                    Line::Plural {
                        one: (*one).to_string(),
                        other: (*other).to_string(),
                    },
                )
            }))
            .collect();

        let mut languages = BTreeMap::new();
        languages.insert(
            "en".to_string(),
            Language {
                name: "English".to_string(),
                lines,
                commands: BTreeMap::new(),
            },
        );
        Self {
            default_language: default_language(),
            languages,
        }
    }

    /// Parses a catalog from TOML.
    ///
    /// # Errors
    ///
    /// Returns a `Config` error if the text is not a valid catalog.
    pub fn from_toml(text: &str) -> Result<Self> {
        toml::from_str(text).map_err(|e| Error::new(ErrorKind::Config(e.to_string())))
    }

    /// Adds every language and line of `other`, replacing existing lines.
    #[must_use]
    pub fn merged(mut self, other: Self) -> Self {
        for (code, language) in other.languages {
            let entry = self.languages.entry(code).or_default();
            if !language.name.is_empty() {
                entry.name = language.name;
            }
            entry.lines.extend(language.lines);
            entry.commands.extend(language.commands);
        }
        self.default_language = other.default_language;
        self
    }

    fn lookup(&self, language: &str, keys: &[String]) -> Option<&Line> {
        let lines = &self.languages.get(language)?.lines;
        keys.iter().find_map(|key| lines.get(key))
    }
}

impl Localizer for Catalog {
    fn render(&self, response: &Response, language: &str) -> String {
        let keys = response.candidate_keys();
        self.lookup(language, &keys)
            .or_else(|| self.lookup(&self.default_language, &keys))
            .map_or_else(
                || response.to_string(),
                |line| fill(line.template(response.plural_count()), response),
            )
    }

    fn languages(&self) -> Vec<(String, String)> {
        self.languages
            .iter()
            .map(|(code, language)| (code.clone(), language.name.clone()))
            .collect()
    }

    fn has_language(&self, code: &str) -> bool {
        self.languages.contains_key(code)
    }

    fn command_names(&self, path: &CommandPath, language: &str) -> Vec<String> {
        self.languages
            .get(language)
            .and_then(|language| language.commands.get(&path.dotted()))
            .map(|words| {
                words
                    .name
                    .iter()
                    .chain(&words.aliases)
                    .map(|word| word.to_lowercase())
                    .collect()
            })
            .unwrap_or_default()
    }
}

/// Substitutes placeholders in `template`. Unknown placeholders are kept.
fn fill(template: &str, response: &Response) -> String {
    let mut out = String::with_capacity(template.len());
    let mut rest = template;

    while let Some(open) = rest.find('{') {
        out.push_str(&rest[..open]);
        let after = &rest[open + 1..];
        let Some(close) = after.find('}') else {
            out.push_str(&rest[open..]);
            return out;
        };
        let name = &after[..close];
        match placeholder(name, response) {
            Some(value) => out.push_str(&value),
            None => {
                out.push('{');
                out.push_str(name);
                out.push('}');
            }
        }
        rest = &after[close + 1..];
    }

    out.push_str(rest);
    out
}

fn placeholder(name: &str, response: &Response) -> Option<String> {
    if let Ok(index) = name.parse::<usize>() {
        return response.args().get(index).cloned();
    }
    if name == "count" {
        return response.plural_count().map(|n| n.to_string());
    }
    response.named_args().get(name).cloned()
}

const ENGLISH: &[(&str, &str)] = &[
    // Engine
    ("error_no_pm", "This command can only be used in a server."),
    ("error_authority", "You need to be {0} or higher to use this command."),
    ("error_toggle", "This command has been disabled here ({0})."),
    ("error_internal", "Something went wrong while running that command. Sorry!"),
    // Arguments
    ("ARG_MISSING", "Missing argument `{param}`."),
    ("ARG_ERROR", "Invalid value `{0}` for `{param}`."),
    ("ARG_TRAILING", "Unexpected text after the command: `{0}`."),
    ("INT_RESOLVE_error", "`{0}` is not a whole number."),
    ("FLOAT_RESOLVE_error", "`{0}` is not a number."),
    ("BOOL_RESOLVE_error", "`{0}` is not yes or no."),
    ("MEMBER_RESOLVE_not_found", "Could not find member `{0}`."),
    ("PATH_RESOLVE_error", "`{0}` is not a command path."),
    ("CHOICE_RESOLVE_error", "`{0}` is not one of the options."),
    ("UNION_RESOLVE_error", "Could not understand `{0}`."),
    // help
    ("help.command_not_found", "No command named `{0}`."),
    ("help.command_list", "Commands: {0}"),
    ("help.usage", "Usage: `{0}`"),
    ("help.authority", "Requires: {0}"),
    ("help.guild_only", "Only usable in servers."),
    ("help.disabled", "Disabled in this server."),
    ("help.subcommands", "Subcommands: {0}"),
    // language
    ("language.lang_list", "Available languages:"),
    ("language.lang_list_entry", "`{0}` {1}"),
    ("language.invalid_lang", "`{0}` is not a supported language."),
    ("language.success_guild", "Server language set to {0}."),
    ("language.success_channel", "Channel language set to {0}."),
    // alias
    ("alias.alias_list", "Invokers: {0}"),
    ("alias.no_pings", "Invokers may not contain mentions."),
    ("alias.add_alias", "Added invoker `{0}`."),
    ("alias.remove_alias", "Removed invoker `{0}`."),
    ("alias.alias_exists", "`{0}` is already an invoker."),
    ("alias.alias_missing", "`{0}` is not an invoker."),
    ("alias.mention_permanent", "The mention invoker cannot be removed."),
    // toggle
    ("toggle.TOGGLE_PATH_error", "There is no command `{0}`."),
    ("toggle.no_toggles", "Nothing is disabled."),
    ("toggle.toggle_list", "Disabled: {0}"),
    // botban
    ("botban.target_owner", "The server owner cannot be botbanned."),
    ("botban.target_bot_owner", "That user cannot be botbanned."),
    ("botban.target_admin", "Administrators cannot be botbanned."),
    ("botban.success_ban", "{0} can no longer use the bot here."),
    ("botban.success_unban", "{0} can use the bot again."),
    ("botban.no_botbanned_users", "Nobody is botbanned."),
];

const ENGLISH_PLURAL: &[(&str, &str, &str)] = &[
    (
        "error_ratelimit",
        "Slow down! Try again in {count} second.",
        "Slow down! Try again in {count} seconds.",
    ),
    (
        "help.rate_limit",
        "Limited to {0} uses every second.",
        "Limited to {0} uses every {count} seconds.",
    ),
    ("toggle.disabled", "Disabled {0}.", "Disabled {count} entries: {0}."),
    ("toggle.enabled", "Enabled {0}.", "Enabled {count} entries: {0}."),
    ("toggle.disable.success", "Disabled {0}.", "Disabled {count} entries: {0}."),
    ("toggle.enable.success", "Enabled {0}.", "Enabled {count} entries: {0}."),
    ("botban.botban_list", "Botbanned: {0}", "{count} botbanned users: {0}"),
];
