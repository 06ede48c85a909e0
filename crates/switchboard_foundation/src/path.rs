//! Command paths and toggle patterns.
//!
//! A [`CommandPath`] names a node of the command tree by the canonical names
//! of its ancestors, root excluded (`["toggle", "enable"]`, written
//! `toggle.enable`). A [`PathPattern`] is an entry of a guild's disabled set:
//! an exact path, every descendant of a path (`a.*`), or everything (`*`).

use std::fmt;
use std::str::FromStr;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use crate::error::{Error, ErrorKind, Result};

/// Segment separator in dotted paths.
pub const SEPARATOR: char = '.';

/// Wildcard segment.
pub const WILDCARD: &str = "*";

/// Ordered list of canonical command names from the root (exclusive).
#[derive(Clone, Debug, Default, Eq, PartialEq, Ord, PartialOrd, Hash)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct CommandPath {
    segments: Vec<String>,
}

impl CommandPath {
    /// The root path (no segments).
    #[must_use]
    pub const fn root() -> Self {
        Self {
            segments: Vec::new(),
        }
    }

    /// Creates a path from its segments.
    #[must_use]
    pub fn new<I, S>(segments: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            segments: segments.into_iter().map(Into::into).collect(),
        }
    }

    /// Parses a dotted path (`toggle.enable`).
    ///
    /// # Errors
    ///
    /// Returns an error if a segment is empty or contains a wildcard.
    pub fn parse(dotted: &str) -> Result<Self> {
        let dotted = dotted.trim();
        if dotted.is_empty() {
            return Ok(Self::root());
        }

        let mut segments = Vec::new();
        for segment in dotted.split(SEPARATOR) {
            if segment.is_empty() || segment.contains('*') || segment.contains(char::is_whitespace)
            {
                return Err(Error::new(ErrorKind::InvalidPattern(dotted.to_string())));
            }
            segments.push(segment.to_lowercase());
        }
        Ok(Self { segments })
    }

    /// Returns the segments of this path.
    #[must_use]
    pub fn segments(&self) -> &[String] {
        &self.segments
    }

    /// Returns the number of segments.
    #[must_use]
    pub fn len(&self) -> usize {
        self.segments.len()
    }

    /// Returns true for the root path.
    #[must_use]
    pub fn is_root(&self) -> bool {
        self.segments.is_empty()
    }

    /// Returns the last segment, or `None` for the root.
    #[must_use]
    pub fn name(&self) -> Option<&str> {
        self.segments.last().map(String::as_str)
    }

    /// Returns the parent path, or `None` for the root.
    #[must_use]
    pub fn parent(&self) -> Option<Self> {
        if self.is_root() {
            return None;
        }
        Some(Self {
            segments: self.segments[..self.segments.len() - 1].to_vec(),
        })
    }

    /// Returns a new path extended by one segment.
    #[must_use]
    pub fn child(&self, name: impl Into<String>) -> Self {
        let mut segments = self.segments.clone();
        segments.push(name.into());
        Self { segments }
    }

    /// Returns true if `self` is a strict ancestor of `other`.
    #[must_use]
    pub fn is_ancestor_of(&self, other: &Self) -> bool {
        other.segments.len() > self.segments.len() && other.segments.starts_with(&self.segments)
    }

    /// Returns the dotted form (`toggle.enable`); the root is the empty string.
    #[must_use]
    pub fn dotted(&self) -> String {
        self.segments.join(".")
    }

    /// Returns the space-separated form used when echoing a command.
    #[must_use]
    pub fn spaced(&self) -> String {
        self.segments.join(" ")
    }
}

impl fmt::Display for CommandPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.dotted())
    }
}

impl FromStr for CommandPath {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        Self::parse(s)
    }
}

/// An entry of a guild's disabled set.
#[derive(Clone, Debug, Eq, PartialEq, Ord, PartialOrd, Hash)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum PathPattern {
    /// `*` - every command.
    All,
    /// `a.b` - exactly this command.
    Exact(CommandPath),
    /// `a.*` - every descendant of `a`, but not `a` itself.
    Descendants(CommandPath),
}

impl PathPattern {
    /// Parses a toggle pattern: `*`, `a.b` or `a.b.*`.
    ///
    /// # Errors
    ///
    /// Returns an error for empty input, empty segments, or a wildcard
    /// anywhere but the final segment.
    pub fn parse(text: &str) -> Result<Self> {
        let text = text.trim();
        if text == WILDCARD {
            return Ok(Self::All);
        }
        if text.is_empty() {
            return Err(Error::new(ErrorKind::InvalidPattern(text.to_string())));
        }

        match text.strip_suffix(".*") {
            Some(prefix) => {
                let path = CommandPath::parse(prefix)?;
                if path.is_root() {
                    return Err(Error::new(ErrorKind::InvalidPattern(text.to_string())));
                }
                Ok(Self::Descendants(path))
            }
            None => Ok(Self::Exact(CommandPath::parse(text)?)),
        }
    }

    /// Returns true if this pattern disables `path`.
    #[must_use]
    pub fn covers(&self, path: &CommandPath) -> bool {
        match self {
            Self::All => true,
            Self::Exact(exact) => exact == path,
            Self::Descendants(prefix) => prefix.is_ancestor_of(path),
        }
    }

    /// Returns the path named by this pattern without its wildcard.
    ///
    /// This is the node that must exist for the pattern to be meaningful;
    /// the root for `*`.
    #[must_use]
    pub fn anchor(&self) -> CommandPath {
        match self {
            Self::All => CommandPath::root(),
            Self::Exact(path) | Self::Descendants(path) => path.clone(),
        }
    }
}

impl fmt::Display for PathPattern {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::All => f.write_str(WILDCARD),
            Self::Exact(path) => write!(f, "{path}"),
            Self::Descendants(path) => write!(f, "{path}.*"),
        }
    }
}

impl FromStr for PathPattern {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        Self::parse(s)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn path(dotted: &str) -> CommandPath {
        CommandPath::parse(dotted).unwrap()
    }

    #[test]
    fn parse_dotted_path() {
        let p = path("toggle.enable");
        assert_eq!(p.segments(), &["toggle".to_string(), "enable".to_string()]);
        assert_eq!(p.dotted(), "toggle.enable");
        assert_eq!(p.spaced(), "toggle enable");
    }

    #[test]
    fn parse_rejects_empty_segment() {
        assert!(CommandPath::parse("a..b").is_err());
        assert!(CommandPath::parse("a.*").is_err());
    }

    #[test]
    fn parent_and_child() {
        let p = path("a.b");
        assert_eq!(p.parent(), Some(path("a")));
        assert_eq!(path("a").child("b"), p);
        assert_eq!(CommandPath::root().parent(), None);
    }

    #[test]
    fn ancestry_is_strict() {
        assert!(path("a").is_ancestor_of(&path("a.b")));
        assert!(path("a").is_ancestor_of(&path("a.b.c")));
        assert!(!path("a").is_ancestor_of(&path("a")));
        assert!(!path("a").is_ancestor_of(&path("ab")));
        assert!(CommandPath::root().is_ancestor_of(&path("a")));
    }

    #[test]
    fn pattern_parse_forms() {
        assert_eq!(PathPattern::parse("*").unwrap(), PathPattern::All);
        assert_eq!(
            PathPattern::parse("a.*").unwrap(),
            PathPattern::Descendants(path("a"))
        );
        assert_eq!(
            PathPattern::parse("a.b").unwrap(),
            PathPattern::Exact(path("a.b"))
        );
        assert!(PathPattern::parse("").is_err());
        assert!(PathPattern::parse("*.a").is_err());
        assert!(PathPattern::parse(".*").is_err());
    }

    #[test]
    fn pattern_display_round_trips() {
        for text in ["*", "a", "a.b", "a.*", "a.b.*"] {
            assert_eq!(PathPattern::parse(text).unwrap().to_string(), text);
        }
    }

    #[test]
    fn wildcard_covers_descendants_only() {
        let pattern = PathPattern::parse("a.*").unwrap();
        assert!(pattern.covers(&path("a.b")));
        assert!(pattern.covers(&path("a.b.c")));
        assert!(!pattern.covers(&path("a")));
        assert!(!pattern.covers(&path("b")));
    }

    #[test]
    fn exact_covers_only_itself() {
        let pattern = PathPattern::parse("a").unwrap();
        assert!(pattern.covers(&path("a")));
        assert!(!pattern.covers(&path("a.b")));
    }

    #[test]
    fn all_covers_everything() {
        assert!(PathPattern::All.covers(&path("a")));
        assert!(PathPattern::All.covers(&path("x.y.z")));
    }

    mod props {
        use super::*;
        use proptest::prelude::*;

        fn segments() -> impl Strategy<Value = Vec<String>> {
            prop::collection::vec("[a-z][a-z0-9_-]{0,6}", 1..5)
        }

        proptest! {
            #[test]
            fn dotted_form_parses_back(segments in segments()) {
                let path = CommandPath::new(segments);
                prop_assert_eq!(CommandPath::parse(&path.dotted()).unwrap(), path);
            }

            #[test]
            fn descendants_never_cover_their_anchor(segments in segments()) {
                let anchor = CommandPath::new(segments);
                let pattern = PathPattern::Descendants(anchor.clone());
                prop_assert!(!pattern.covers(&anchor));
                prop_assert!(pattern.covers(&anchor.child("x")));
                prop_assert_eq!(PathPattern::parse(&pattern.to_string()).unwrap(), pattern);
            }
        }
    }
}
