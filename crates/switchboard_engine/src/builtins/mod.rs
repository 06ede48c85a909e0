//! Built-in commands, registered into every dispatcher.
//!
//! | Command | Authority | Scope |
//! |---------|-----------|-------|
//! | `help` | regular | anywhere |
//! | `language` | admin to change inside a guild | anywhere |
//! | `alias` | regular to list, admin to change | guild |
//! | `toggle` | bot-mod | guild |
//! | `botban` | bot-mod | guild |

mod alias;
mod botban;
mod help;
mod language;
mod toggle;

use switchboard_foundation::Result;

use crate::handler::Registry;

/// Registers every built-in command into `tree`.
///
/// # Errors
///
/// Returns a registration error if `tree` already holds a colliding name.
pub fn register(tree: &mut Registry) -> Result<()> {
    help::register(tree)?;
    language::register(tree)?;
    alias::register(tree)?;
    toggle::register(tree)?;
    botban::register(tree)?;
    Ok(())
}
