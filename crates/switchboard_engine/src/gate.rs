//! The authority gate.
//!
//! [`authorize`] decides whether an invoker may run a resolved command.
//! Checks run in a fixed order and the first failure wins:
//!
//! 1. botban (absolute, no level bypasses it)
//! 2. guild-only scope
//! 3. authority, taken as the highest requirement along the node's ancestry
//! 4. toggles: the path, or a wildcard covering it, is in the disabled set
//!    and the invoker is below bot-mod
//!
//! The gate is a pure function over an [`AccessState`] loaded beforehand, so
//! no store call happens while deciding.

use std::collections::BTreeSet;

use switchboard_foundation::{AuthorityLevel, CommandPath, PathPattern, Response};
use switchboard_parser::{CommandTree, NodeId, Scope};

/// Per-guild facts the gate needs for one invocation.
#[derive(Clone, Debug, Default)]
pub struct AccessState {
    /// The invoker is botbanned in this guild.
    pub botbanned: bool,
    /// The invocation happens inside a guild.
    pub in_guild: bool,
    /// The guild's disabled set.
    pub disabled: BTreeSet<PathPattern>,
}

/// Why the gate refused.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Denial {
    /// The invoker is botbanned.
    Botbanned,
    /// A guild-only command was used in a direct conversation.
    GuildOnly,
    /// The invoker's level is below the command's requirement.
    InsufficientPermission {
        /// Required level.
        required: AuthorityLevel,
        /// Invoker's level.
        actual: AuthorityLevel,
    },
    /// The command is disabled in this guild.
    Disabled {
        /// The entry that disables it.
        pattern: PathPattern,
    },
}

impl Denial {
    /// Returns the response announcing this denial, if any.
    ///
    /// Botbanned users get no response at all.
    #[must_use]
    pub fn response(&self) -> Option<Response> {
        match self {
            Self::Botbanned => None,
            Self::GuildOnly => Some(Response::new("error_no_pm")),
            Self::InsufficientPermission { required, .. } => {
                Some(Response::new("error_authority").arg(required.name()))
            }
            Self::Disabled { pattern } => Some(Response::new("error_toggle").arg(pattern)),
        }
    }
}

/// Returns the first entry of `disabled` covering `path`, if any.
#[must_use]
pub fn disabling_pattern<'a>(
    disabled: &'a BTreeSet<PathPattern>,
    path: &CommandPath,
) -> Option<&'a PathPattern> {
    disabled.iter().find(|pattern| pattern.covers(path))
}

/// Returns the highest authority required by `node` or any of its ancestors.
#[must_use]
pub fn required_authority<H>(tree: &CommandTree<H>, node: NodeId) -> AuthorityLevel {
    tree.ancestry(node)
        .into_iter()
        .map(|id| tree.node(id).authority())
        .max()
        .unwrap_or_default()
}

/// Returns true if `node` or an ancestor is restricted to guilds.
#[must_use]
pub fn is_guild_only<H>(tree: &CommandTree<H>, node: NodeId) -> bool {
    tree.ancestry(node)
        .into_iter()
        .any(|id| tree.node(id).scope() == Scope::GuildOnly)
}

/// Decides whether `level` may invoke `node`.
///
/// # Errors
///
/// Returns the first [`Denial`] in check order.
pub fn authorize<H>(
    tree: &CommandTree<H>,
    node: NodeId,
    level: AuthorityLevel,
    access: &AccessState,
) -> Result<(), Denial> {
    if access.botbanned {
        return Err(Denial::Botbanned);
    }

    if !access.in_guild && is_guild_only(tree, node) {
        return Err(Denial::GuildOnly);
    }

    let required = required_authority(tree, node);
    if !level.satisfies(required) {
        return Err(Denial::InsufficientPermission {
            required,
            actual: level,
        });
    }

    if !level.bypasses_toggles() {
        if let Some(pattern) = disabling_pattern(&access.disabled, tree.node(node).path()) {
            return Err(Denial::Disabled {
                pattern: pattern.clone(),
            });
        }
    }

    Ok(())
}
